//! Flat, style-tagged pretty-print documents.

use serde::{Deserialize, Serialize};

/// Semantic display category the backend attaches to a run of text.
///
/// Tags are advisory: they only select a display style and never change the
/// text itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleTag {
	/// Language keyword (`forall`, `fun`, `match`).
	Keyword,
	/// Notation symbol (`+`, `->`, `=`).
	Notation,
	/// Reference to a global identifier.
	Reference,
	/// Bound or local variable.
	Variable,
	/// Sort or type name.
	Type,
	/// Existential variable.
	Evar,
	/// Module path.
	Path,
}

impl StyleTag {
	/// Parses a backend tag such as `constr.keyword`.
	///
	/// Only the last dot-separated segment is significant. Returns `None` for
	/// tags outside the vocabulary; callers render those as plain text.
	pub fn from_backend_tag(tag: &str) -> Option<Self> {
		let name = tag.rsplit('.').next().unwrap_or(tag);
		match name {
			"keyword" => Some(Self::Keyword),
			"notation" => Some(Self::Notation),
			"reference" => Some(Self::Reference),
			"variable" => Some(Self::Variable),
			"type" => Some(Self::Type),
			"evar" => Some(Self::Evar),
			"path" => Some(Self::Path),
			_ => None,
		}
	}

	/// Returns the canonical lowercase name of the tag.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Keyword => "keyword",
			Self::Notation => "notation",
			Self::Reference => "reference",
			Self::Variable => "variable",
			Self::Type => "type",
			Self::Evar => "evar",
			Self::Path => "path",
		}
	}
}

impl std::fmt::Display for StyleTag {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A contiguous span of text sharing one display category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Run {
	/// The text of the run, including any whitespace.
	pub text: String,
	/// Raw backend tag, kept verbatim so unknown tags survive a round trip.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tag: Option<String>,
}

impl Run {
	/// Creates an untagged run.
	pub fn plain(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			tag: None,
		}
	}

	/// Creates a run carrying a backend tag.
	pub fn tagged(text: impl Into<String>, tag: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			tag: Some(tag.into()),
		}
	}

	/// Returns the tag if it belongs to the known vocabulary.
	pub fn style_tag(&self) -> Option<StyleTag> {
		self.tag.as_deref().and_then(StyleTag::from_backend_tag)
	}
}

/// An ordered sequence of style-tagged runs.
///
/// Concatenating [`Run::text`] in order yields [`PpModel::text`]; no operation
/// on this type reorders or drops text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PpModel {
	runs: Vec<Run>,
}

impl PpModel {
	/// Creates an empty document.
	#[must_use]
	pub const fn new() -> Self {
		Self { runs: Vec::new() }
	}

	/// Creates a document holding a single untagged run.
	pub fn plain(text: impl Into<String>) -> Self {
		Self {
			runs: vec![Run::plain(text)],
		}
	}

	/// Appends a run without merging it into its neighbour.
	pub fn push(&mut self, run: Run) {
		self.runs.push(run);
	}

	/// Appends text, extending the last run when it carries the same tag.
	///
	/// Empty text is ignored. Merging never changes [`Self::text`].
	pub fn push_coalesced(&mut self, text: &str, tag: Option<&str>) {
		if text.is_empty() {
			return;
		}
		match self.runs.last_mut() {
			Some(last) if last.tag.as_deref() == tag => last.text.push_str(text),
			_ => self.runs.push(Run {
				text: text.to_owned(),
				tag: tag.map(str::to_owned),
			}),
		}
	}

	/// Returns the runs in order.
	pub fn runs(&self) -> &[Run] {
		&self.runs
	}

	/// Consumes the document, returning its runs.
	pub fn into_runs(self) -> Vec<Run> {
		self.runs
	}

	/// Returns true if the document has no runs.
	pub fn is_empty(&self) -> bool {
		self.runs.is_empty()
	}

	/// Returns the source text: every run's text concatenated in order.
	pub fn text(&self) -> String {
		self.runs.iter().map(|run| run.text.as_str()).collect()
	}
}

impl From<Vec<Run>> for PpModel {
	fn from(runs: Vec<Run>) -> Self {
		Self { runs }
	}
}

impl FromIterator<Run> for PpModel {
	fn from_iter<I: IntoIterator<Item = Run>>(iter: I) -> Self {
		Self {
			runs: iter.into_iter().collect(),
		}
	}
}

impl std::fmt::Display for PpModel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for run in &self.runs {
			f.write_str(&run.text)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_style_tag_from_backend_tag() {
		assert_eq!(StyleTag::from_backend_tag("constr.keyword"), Some(StyleTag::Keyword));
		assert_eq!(StyleTag::from_backend_tag("constr.notation"), Some(StyleTag::Notation));
		assert_eq!(StyleTag::from_backend_tag("reference"), Some(StyleTag::Reference));
		assert_eq!(StyleTag::from_backend_tag("module.definition"), None);
		assert_eq!(StyleTag::from_backend_tag(""), None);
	}

	#[test]
	fn test_push_coalesced_merges_same_tag_only() {
		let mut model = PpModel::new();
		model.push_coalesced("forall", Some("constr.keyword"));
		model.push_coalesced(" ", None);
		model.push_coalesced("n", Some("constr.variable"));
		model.push_coalesced("", Some("constr.keyword"));
		model.push_coalesced(" m", Some("constr.variable"));

		assert_eq!(model.runs().len(), 3);
		assert_eq!(model.runs()[2], Run::tagged("n m", "constr.variable"));
		assert_eq!(model.text(), "forall n m");
	}

	#[test]
	fn test_unknown_tag_is_kept_verbatim() {
		let run = Run::tagged("x", "message.debug");
		assert_eq!(run.style_tag(), None);
		assert_eq!(run.tag.as_deref(), Some("message.debug"));
	}

	#[test]
	fn test_runs_serialize_as_array() {
		let model = PpModel::from(vec![Run::tagged("nat", "constr.reference"), Run::plain(" ")]);
		let json = serde_json::to_value(&model).unwrap();
		assert_eq!(
			json,
			serde_json::json!([{"text": "nat", "tag": "constr.reference"}, {"text": " "}])
		);
		let back: PpModel = serde_json::from_value(json).unwrap();
		assert_eq!(back, model);
	}
}
