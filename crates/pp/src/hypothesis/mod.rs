//! Hypothesis lines: identifiers sharing one type, rendered as `a, b : T`.
//!
//! Identifiers grouped upstream stay on one line. The exact punctuation
//! (`", "` between identifiers, [`SEPARATOR`] before the type) is what the
//! display layer expects.

use serde::Deserialize;
use tracing::warn;

use crate::model::PpModel;
use crate::ppcmd::deserialize_flat;
use crate::render::{Fragment, StyleKey, render};
use crate::{PpError, Result};

/// Text placed between the identifier block and the type.
pub const SEPARATOR: &str = " : ";

/// Text placed between two identifiers.
const IDENTIFIER_JOIN: &str = ", ";

/// One or more identifiers sharing a type, as sent by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Hypothesis {
	/// Identifier names in display order.
	pub identifiers: Vec<String>,
	/// The shared type.
	#[serde(rename = "type", deserialize_with = "deserialize_flat")]
	pub ty: PpModel,
}

impl Hypothesis {
	/// Renders this hypothesis, falling back to the type alone when the
	/// identifier list is empty.
	pub fn render(&self) -> HypothesisLine {
		format_or_type_only(&self.identifiers, &self.ty)
	}
}

/// A rendered hypothesis line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HypothesisLine {
	identifiers: Option<String>,
	ty: Vec<Fragment>,
}

impl HypothesisLine {
	/// The comma-joined identifier block, or `None` for a type-only fallback line.
	pub fn identifiers(&self) -> Option<&str> {
		self.identifiers.as_deref()
	}

	/// Fragments of the rendered type.
	pub fn type_fragments(&self) -> &[Fragment] {
		&self.ty
	}

	/// All fragments of the line in display order.
	pub fn fragments(&self) -> Vec<Fragment> {
		let mut out = Vec::with_capacity(self.ty.len() + 2);
		if let Some(ids) = &self.identifiers {
			out.push(Fragment::new(ids.clone(), StyleKey::Identifier));
			out.push(Fragment::new(SEPARATOR, StyleKey::Separator));
		}
		out.extend(self.ty.iter().cloned());
		out
	}
}

impl std::fmt::Display for HypothesisLine {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if let Some(ids) = &self.identifiers {
			f.write_str(ids)?;
			f.write_str(SEPARATOR)?;
		}
		for fragment in &self.ty {
			f.write_str(&fragment.text)?;
		}
		Ok(())
	}
}

/// Formats identifiers and their shared type into one line.
///
/// # Errors
///
/// Returns [`PpError::EmptyHypothesis`] if `identifiers` is empty.
pub fn format<S: AsRef<str>>(identifiers: &[S], ty: &PpModel) -> Result<HypothesisLine> {
	let (first, rest) = identifiers.split_first().ok_or(PpError::EmptyHypothesis)?;
	let joined = rest.iter().fold(first.as_ref().to_owned(), |mut acc, id| {
		acc.push_str(IDENTIFIER_JOIN);
		acc.push_str(id.as_ref());
		acc
	});
	Ok(HypothesisLine {
		identifiers: Some(joined),
		ty: render(ty),
	})
}

/// Like [`format`], but reports an empty identifier list as a rendering
/// anomaly and returns a line holding only the type.
pub fn format_or_type_only<S: AsRef<str>>(identifiers: &[S], ty: &PpModel) -> HypothesisLine {
	match format(identifiers, ty) {
		Ok(line) => line,
		Err(err) => {
			warn!(error = %err, ty = %ty, "rendering hypothesis without identifiers");
			HypothesisLine {
				identifiers: None,
				ty: render(ty),
			}
		}
	}
}
