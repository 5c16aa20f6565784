//! The language server's nested pretty-print command tree.
//!
//! Commands arrive as JSON arrays headed by a constructor name:
//!
//! ```text
//! ["Ppcmd_empty"]
//! ["Ppcmd_string", "plus"]
//! ["Ppcmd_glue", [cmd, ...]]
//! ["Ppcmd_box", ["Pp_hovbox", 2], cmd]
//! ["Ppcmd_tag", "constr.reference", cmd]
//! ["Ppcmd_print_break", 1, 0]
//! ["Ppcmd_force_newline"]
//! ["Ppcmd_comment", ["(*", "text", "*)"]]
//! ```
//!
//! A bare JSON string is accepted as a single untagged string. The panel never
//! lays out boxes itself: [`PpCmd::flatten`] resolves the tree into a flat
//! [`PpModel`] before rendering.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::model::PpModel;
use crate::{PpError, Result};

/// Deepest command nesting the decoder accepts.
pub const MAX_DEPTH: usize = 256;

/// Widest break hint the decoder accepts, in spaces.
pub const MAX_BREAK_WIDTH: usize = 1024;

/// Layout mode of a `Ppcmd_box`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
	/// `Pp_hbox`: never breaks.
	Horizontal,
	/// `Pp_vbox`: breaks every break hint, with the given indent.
	Vertical(i64),
	/// `Pp_hvbox`: all on one line or one item per line.
	HorizontalVertical(i64),
	/// `Pp_hovbox`: fills lines, breaking as needed.
	HorizontalOrVertical(i64),
}

/// One node of the backend's pretty-print tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PpCmd {
	/// Produces nothing.
	Empty,
	/// Literal text.
	String(String),
	/// Concatenation of children.
	Glue(Vec<PpCmd>),
	/// Layout box around a child.
	Box(BlockType, Box<PpCmd>),
	/// Semantic tag around a child.
	Tag(String, Box<PpCmd>),
	/// Break hint; rendered flat as `nspaces` spaces, capped at [`MAX_BREAK_WIDTH`].
	PrintBreak {
		/// Spaces printed when the break is not taken.
		nspaces: usize,
		/// Indent offset applied when the break is taken.
		offset: i64,
	},
	/// Mandatory line break.
	ForceNewline,
	/// Comment fragments.
	Comment(Vec<String>),
}

impl PpCmd {
	/// Decodes a command tree from its JSON representation.
	pub fn from_value(value: &Value) -> Result<Self> {
		decode(value, 0)
	}

	/// Flattens the tree into style-tagged runs.
	///
	/// Text carries the innermost enclosing tag. Boxes and glue are
	/// transparent, breaks become spaces and forced newlines become `"\n"`.
	/// Adjacent runs with the same tag are merged.
	pub fn flatten(&self) -> PpModel {
		let mut model = PpModel::new();
		flatten_into(self, None, &mut model);
		model
	}
}

impl<'de> Deserialize<'de> for PpCmd {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let value = Value::deserialize(deserializer)?;
		Self::from_value(&value).map_err(serde::de::Error::custom)
	}
}

impl PpModel {
	/// Decodes a backend pretty-print value and flattens it.
	pub fn from_backend(value: &Value) -> Result<Self> {
		PpCmd::from_value(value).map(|cmd| cmd.flatten())
	}
}

/// Deserializes a backend pretty-print value straight into a flat [`PpModel`].
///
/// Intended for `#[serde(deserialize_with = "...")]` on fields carrying backend output.
pub fn deserialize_flat<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<PpModel, D::Error> {
	PpCmd::deserialize(deserializer).map(|cmd| cmd.flatten())
}

fn decode(value: &Value, depth: usize) -> Result<PpCmd> {
	if depth > MAX_DEPTH {
		return Err(PpError::TooDeep(MAX_DEPTH));
	}
	let items = match value {
		Value::String(s) => return Ok(PpCmd::String(s.clone())),
		Value::Array(items) => items,
		other => return Err(PpError::Decode(format!("expected array or string, got {other}"))),
	};
	let Some(head) = items.first().and_then(Value::as_str) else {
		return Err(PpError::Decode("missing constructor name".into()));
	};
	let args = &items[1..];

	match (head, args) {
		("Ppcmd_empty", []) => Ok(PpCmd::Empty),
		("Ppcmd_string", [Value::String(s)]) => Ok(PpCmd::String(s.clone())),
		("Ppcmd_glue", [Value::Array(children)]) => children
			.iter()
			.map(|child| decode(child, depth + 1))
			.collect::<Result<Vec<_>>>()
			.map(PpCmd::Glue),
		("Ppcmd_box", [block, child]) => Ok(PpCmd::Box(
			decode_block(block)?,
			Box::new(decode(child, depth + 1)?),
		)),
		("Ppcmd_tag", [Value::String(tag), child]) => {
			Ok(PpCmd::Tag(tag.clone(), Box::new(decode(child, depth + 1)?)))
		}
		("Ppcmd_print_break", [nspaces, offset]) => {
			let nspaces = nspaces
				.as_u64()
				.and_then(|n| usize::try_from(n).ok())
				.filter(|&n| n <= MAX_BREAK_WIDTH)
				.ok_or_else(|| PpError::Decode(format!("invalid break width {nspaces}")))?;
			let offset = offset
				.as_i64()
				.ok_or_else(|| PpError::Decode(format!("invalid break offset {offset}")))?;
			Ok(PpCmd::PrintBreak {
				nspaces,
				offset,
			})
		}
		("Ppcmd_force_newline", []) => Ok(PpCmd::ForceNewline),
		("Ppcmd_comment", [Value::Array(parts)]) => parts
			.iter()
			.map(|part| {
				part.as_str()
					.map(str::to_owned)
					.ok_or_else(|| PpError::Decode(format!("invalid comment fragment {part}")))
			})
			.collect::<Result<Vec<_>>>()
			.map(PpCmd::Comment),
		_ => Err(PpError::Decode(format!(
			"unexpected {head} with {} argument(s)",
			args.len()
		))),
	}
}

fn decode_block(value: &Value) -> Result<BlockType> {
	let invalid = || PpError::Decode(format!("invalid box type {value}"));
	let items = value.as_array().ok_or_else(invalid)?;
	let mode = items.first().and_then(Value::as_str).ok_or_else(invalid)?;
	let indent = || items.get(1).and_then(Value::as_i64).ok_or_else(invalid);

	match mode {
		"Pp_hbox" => Ok(BlockType::Horizontal),
		"Pp_vbox" => Ok(BlockType::Vertical(indent()?)),
		"Pp_hvbox" => Ok(BlockType::HorizontalVertical(indent()?)),
		"Pp_hovbox" => Ok(BlockType::HorizontalOrVertical(indent()?)),
		_ => Err(invalid()),
	}
}

fn flatten_into<'a>(cmd: &'a PpCmd, tag: Option<&'a str>, out: &mut PpModel) {
	match cmd {
		PpCmd::Empty => {}
		PpCmd::String(s) => out.push_coalesced(s, tag),
		PpCmd::Glue(children) => {
			for child in children {
				flatten_into(child, tag, out);
			}
		}
		PpCmd::Box(_, child) => flatten_into(child, tag, out),
		PpCmd::Tag(inner, child) => flatten_into(child, Some(inner.as_str()), out),
		PpCmd::PrintBreak { nspaces, .. } => out.push_coalesced(&" ".repeat((*nspaces).min(MAX_BREAK_WIDTH)), tag),
		PpCmd::ForceNewline => out.push_coalesced("\n", tag),
		PpCmd::Comment(parts) => out.push_coalesced(&parts.join(" "), tag),
	}
}
