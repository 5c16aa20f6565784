//! Queries and the backend requests built from them.

use lsp_types::{Position, VersionedTextDocumentIdentifier};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Correlation id chosen by the panel for one query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryId(pub String);

impl QueryId {
	/// Creates an id.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Returns the id as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for QueryId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for QueryId {
	fn from(id: &str) -> Self {
		Self(id.to_owned())
	}
}

/// Kind of query; serialized as `"Search"` / `"About"` on the panel wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryKind {
	/// Streamed: one handshake, then zero or more pushed results.
	Search,
	/// Single-shot: exactly one reply.
	About,
}

impl std::fmt::Display for QueryKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Search => "Search",
			Self::About => "About",
		})
	}
}

/// A query issued from the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
	/// Correlation id.
	pub id: QueryId,
	/// Search or About.
	pub kind: QueryKind,
	/// Pattern typed by the user.
	pub pattern: String,
}

/// Parameters of the backend `search` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
	/// Id under which results will be pushed.
	pub id: QueryId,
	/// Document the query runs against.
	pub text_document: VersionedTextDocumentIdentifier,
	/// Search pattern.
	pub pattern: String,
	/// Cursor position; the query sees the proof state there.
	pub position: Position,
}

/// Parameters of the backend `about` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutParams {
	/// Document the query runs against.
	pub text_document: VersionedTextDocumentIdentifier,
	/// Name to describe.
	pub pattern: String,
	/// Cursor position.
	pub position: Position,
}

/// A request ready to hand to a [`crate::Backend`].
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
	/// Method name, e.g. `vscoq/search`.
	pub method: String,
	/// JSON parameters.
	pub params: Value,
}
