//! Conversion of pretty-print documents into styled display fragments.

use serde::Serialize;

use crate::model::{PpModel, StyleTag};

/// Display style of a fragment.
///
/// Covers the [`StyleTag`] vocabulary plus the structural styles used by
/// hypothesis lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleKey {
	/// Untagged text, or text with a tag outside the vocabulary.
	#[default]
	Plain,
	/// See [`StyleTag::Keyword`].
	Keyword,
	/// See [`StyleTag::Notation`].
	Notation,
	/// See [`StyleTag::Reference`].
	Reference,
	/// See [`StyleTag::Variable`].
	Variable,
	/// See [`StyleTag::Type`].
	Type,
	/// See [`StyleTag::Evar`].
	Evar,
	/// See [`StyleTag::Path`].
	Path,
	/// The comma-joined identifier block of a hypothesis.
	Identifier,
	/// The `" : "` between identifiers and type.
	Separator,
}

impl StyleKey {
	/// CSS class the display layer uses for this style.
	pub fn css_class(self) -> &'static str {
		match self {
			Self::Plain => "pp-plain",
			Self::Keyword => "pp-keyword",
			Self::Notation => "pp-notation",
			Self::Reference => "pp-reference",
			Self::Variable => "pp-variable",
			Self::Type => "pp-type",
			Self::Evar => "pp-evar",
			Self::Path => "pp-path",
			Self::Identifier => "hyp-identifier",
			Self::Separator => "hyp-separator",
		}
	}
}

impl From<Option<StyleTag>> for StyleKey {
	fn from(tag: Option<StyleTag>) -> Self {
		match tag {
			None => Self::Plain,
			Some(StyleTag::Keyword) => Self::Keyword,
			Some(StyleTag::Notation) => Self::Notation,
			Some(StyleTag::Reference) => Self::Reference,
			Some(StyleTag::Variable) => Self::Variable,
			Some(StyleTag::Type) => Self::Type,
			Some(StyleTag::Evar) => Self::Evar,
			Some(StyleTag::Path) => Self::Path,
		}
	}
}

/// A piece of text with one display style.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Fragment {
	/// Text to display, verbatim.
	pub text: String,
	/// Style to display it with.
	pub style: StyleKey,
}

impl Fragment {
	/// Creates a fragment.
	pub fn new(text: impl Into<String>, style: StyleKey) -> Self {
		Self {
			text: text.into(),
			style,
		}
	}
}

/// Renders a document into one fragment per run.
///
/// Runs map one-to-one onto fragments, so text, whitespace and order are
/// preserved exactly. Tags outside the vocabulary render as [`StyleKey::Plain`].
pub fn render(model: &PpModel) -> Vec<Fragment> {
	model
		.runs()
		.iter()
		.map(|run| Fragment::new(run.text.clone(), run.style_tag().into()))
		.collect()
}
