//! Error types for the panel bridge.

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::QueryId;

/// A convenient type alias for `Result` with `E` = [`enum@Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Possible bridge errors.
///
/// None of these is fatal to the panel: each is reported or dropped at the
/// component boundary where it is detected.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// A query was submitted while no editor (document, version or cursor) was active.
	#[error("no active text editor")]
	NoActiveEditor,
	/// The backend could not answer the request sent for `id`.
	#[error("backend unavailable for query {id}: {reason}")]
	BackendUnavailable {
		/// The query whose request failed.
		id: QueryId,
		/// Human-readable cause.
		reason: String,
	},
	/// An id already awaiting its reply was submitted again.
	#[error("query {0} is already awaiting a reply")]
	DuplicateRequest(QueryId),
	/// A reply or push arrived for an id with no registered slot.
	#[error("no pending query with id {0}")]
	UnmatchedResolution(QueryId),
	/// A message could not be decoded.
	#[error("decode failed: {0}")]
	Decode(#[from] serde_json::Error),
	/// The configuration file is invalid.
	#[error("invalid configuration: {0}")]
	Config(#[from] toml::de::Error),
	/// The backend replied with an error.
	#[error("{0}")]
	Response(#[from] ResponseError),
	/// The peer violated the JSON-RPC framing or message shape.
	#[error("protocol error: {0}")]
	Protocol(String),
	/// Input/output errors from the underlying channels.
	#[error("{0}")]
	Io(#[from] io::Error),
	/// The task serving the request or panel stopped.
	#[error("service stopped")]
	ServiceStopped,
}

/// Error object of a JSON-RPC error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct ResponseError {
	/// Numeric error code.
	pub code: i64,
	/// Error message.
	pub message: String,
	/// Optional additional data.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,
}

impl ResponseError {
	/// Creates an error object without data.
	pub fn new(code: i64, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
			data: None,
		}
	}
}
