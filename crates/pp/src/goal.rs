//! Goal rendering: hypotheses above a conclusion.

use serde::Deserialize;

use crate::hypothesis::{Hypothesis, HypothesisLine};
use crate::model::PpModel;
use crate::ppcmd::deserialize_flat;
use crate::render::{Fragment, render};

/// A proof goal as sent by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Goal {
	/// Backend identifier of the goal.
	#[serde(default)]
	pub id: Option<String>,
	/// Hypotheses in display order.
	#[serde(default)]
	pub hypotheses: Vec<Hypothesis>,
	/// The statement left to prove.
	#[serde(rename = "goal", deserialize_with = "deserialize_flat")]
	pub conclusion: PpModel,
}

/// A rendered goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedGoal {
	/// One line per hypothesis.
	pub hypotheses: Vec<HypothesisLine>,
	/// Fragments of the conclusion.
	pub conclusion: Vec<Fragment>,
}

impl std::fmt::Display for RenderedGoal {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for line in &self.hypotheses {
			writeln!(f, "{line}")?;
		}
		for fragment in &self.conclusion {
			f.write_str(&fragment.text)?;
		}
		Ok(())
	}
}

/// Renders every hypothesis and the conclusion of a goal.
pub fn render_goal(goal: &Goal) -> RenderedGoal {
	RenderedGoal {
		hypotheses: goal.hypotheses.iter().map(Hypothesis::render).collect(),
		conclusion: render(&goal.conclusion),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_render_goal_from_backend_json() {
		let goal: Goal = serde_json::from_value(json!({
			"id": "3",
			"hypotheses": [
				{"identifiers": ["n", "m"], "type": ["Ppcmd_string", "nat"]},
				{"identifiers": ["H"], "type": ["Ppcmd_string", "n = m"]},
			],
			"goal": ["Ppcmd_glue", [
				["Ppcmd_string", "m"],
				["Ppcmd_print_break", 1, 0],
				["Ppcmd_tag", "constr.notation", ["Ppcmd_string", "="]],
				["Ppcmd_string", " n"]
			]]
		}))
		.unwrap();

		let rendered = render_goal(&goal);
		assert_eq!(rendered.hypotheses.len(), 2);
		assert_eq!(rendered.to_string(), "n, m : nat\nH : n = m\nm = n");
	}

	#[test]
	fn test_goal_with_empty_hypothesis_still_renders() {
		let goal: Goal = serde_json::from_value(json!({
			"hypotheses": [{"identifiers": [], "type": "True"}],
			"goal": "False"
		}))
		.unwrap();

		assert_eq!(render_goal(&goal).to_string(), "True\nFalse");
	}
}
