//! Panel wire messages.
//!
//! Both directions are JSON objects tagged by their `command` field. Payloads coming from
//! the backend are forwarded verbatim; the panel renders them.

use coqpanel_pp::PpModel;
use coqpanel_pp::ppcmd::deserialize_flat;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;
use crate::correlator::Delivery;
use crate::query::{Query, QueryId, QueryKind};

/// A command posted by the panel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command")]
pub enum UiCommand {
	/// Run a query at the current cursor.
	#[serde(rename = "coqQuery")]
	SubmitQuery {
		/// Panel-chosen correlation id.
		id: QueryId,
		/// Pattern typed by the user.
		#[serde(rename = "text")]
		pattern: String,
		/// `"Search"` or `"About"`.
		#[serde(rename = "type")]
		kind: QueryKind,
	},
	/// Copy a result line to the clipboard.
	#[serde(rename = "copySearchResult")]
	CopyToClipboard {
		/// Text to copy.
		text: String,
	},
	/// Any other command tag.
	#[serde(other)]
	Unknown,
}

impl UiCommand {
	/// Decodes a raw panel message.
	///
	/// # Errors
	///
	/// [`crate::Error::Decode`] when the message has no `command` tag or a known tag with
	/// missing or mistyped fields.
	pub fn decode(value: Value) -> Result<Self> {
		Ok(serde_json::from_value(value)?)
	}

	/// The query carried by a [`UiCommand::SubmitQuery`].
	pub fn into_query(self) -> Option<Query> {
		match self {
			Self::SubmitQuery { id, pattern, kind } => Some(Query { id, kind, pattern }),
			_ => None,
		}
	}
}

/// A message posted to the panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum PanelMessage {
	/// Prefill the query input and run it.
	Query {
		/// Pattern.
		text: String,
		/// Query kind.
		#[serde(rename = "type")]
		kind: QueryKind,
	},
	/// A search was accepted by the backend.
	LaunchedSearch {
		/// Query id.
		id: QueryId,
		/// Handshake payload.
		text: Value,
	},
	/// One search result.
	SearchResponse {
		/// Query id.
		id: QueryId,
		/// `{id, name, statement}` payload.
		text: Value,
	},
	/// The answer to an About query.
	AboutResponse {
		/// Query id.
		id: QueryId,
		/// Pretty-print payload.
		text: Value,
	},
	/// The backend could not answer the query.
	QueryError {
		/// Query id.
		id: QueryId,
		/// Human-readable message.
		text: String,
	},
}

impl PanelMessage {
	/// The id the message belongs to, if it answers a query.
	pub fn id(&self) -> Option<&QueryId> {
		match self {
			Self::Query { .. } => None,
			Self::LaunchedSearch { id, .. }
			| Self::SearchResponse { id, .. }
			| Self::AboutResponse { id, .. }
			| Self::QueryError { id, .. } => Some(id),
		}
	}

	/// Encodes the message as panel JSON.
	pub fn to_value(&self) -> Result<Value> {
		Ok(serde_json::to_value(self)?)
	}
}

impl From<Delivery> for PanelMessage {
	fn from(delivery: Delivery) -> Self {
		match delivery {
			Delivery::AboutResult { id, payload } => Self::AboutResponse { id, text: payload },
			Delivery::SearchLaunched { id, payload } => Self::LaunchedSearch { id, text: payload },
			Delivery::SearchResult { id, payload } => Self::SearchResponse { id, text: payload },
		}
	}
}

/// Decoded view of a search-result push.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResult {
	/// The search the result belongs to.
	pub id: QueryId,
	/// Name of the matching constant.
	#[serde(deserialize_with = "deserialize_flat")]
	pub name: PpModel,
	/// Its statement.
	#[serde(deserialize_with = "deserialize_flat")]
	pub statement: PpModel,
}

impl SearchResult {
	/// Decodes push params.
	pub fn decode(params: &Value) -> Result<Self> {
		Ok(Self::deserialize(params)?)
	}

	/// Reads only the `id` of push params.
	pub fn peek_id(params: &Value) -> Option<QueryId> {
		params.get("id").and_then(Value::as_str).map(QueryId::from)
	}
}
