//! Turns one query into one backend request.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::config::PanelConfig;
use crate::context::EditorContext;
use crate::query::{AboutParams, BackendRequest, Query, QueryId, QueryKind, SearchParams};
use crate::{Error, Result};

/// What the backend answered to a dispatched query.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
	/// A search was accepted; results will be pushed under `id`.
	SearchLaunched {
		/// Query id.
		id: QueryId,
		/// Handshake payload.
		handshake: Value,
	},
	/// The answer to an About query.
	About {
		/// Query id.
		id: QueryId,
		/// Pretty-print payload.
		result: Value,
	},
}

impl DispatchOutcome {
	/// The id the outcome belongs to.
	pub fn id(&self) -> &QueryId {
		match self {
			Self::SearchLaunched { id, .. } | Self::About { id, .. } => id,
		}
	}

	/// The reply payload.
	pub fn into_payload(self) -> Value {
		match self {
			Self::SearchLaunched { handshake, .. } => handshake,
			Self::About { result, .. } => result,
		}
	}
}

/// Sends queries to a [`Backend`] with a timeout.
#[derive(Clone)]
pub struct QueryDispatcher {
	backend: Arc<dyn Backend>,
	search_method: String,
	about_method: String,
	timeout: Duration,
}

impl std::fmt::Debug for QueryDispatcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("QueryDispatcher")
			.field("search_method", &self.search_method)
			.field("about_method", &self.about_method)
			.field("timeout", &self.timeout)
			.finish_non_exhaustive()
	}
}

impl QueryDispatcher {
	/// Creates a dispatcher using the method names and timeout from `config`.
	pub fn new(backend: Arc<dyn Backend>, config: &PanelConfig) -> Self {
		Self {
			backend,
			search_method: config.search_method.clone(),
			about_method: config.about_method.clone(),
			timeout: config.request_timeout(),
		}
	}

	/// Builds the request for `query` at `ctx`.
	pub fn build_request(&self, query: &Query, ctx: &EditorContext) -> Result<BackendRequest> {
		let (method, params) = match query.kind {
			QueryKind::Search => (
				&self.search_method,
				serde_json::to_value(SearchParams {
					id: query.id.clone(),
					text_document: ctx.text_document(),
					pattern: query.pattern.clone(),
					position: ctx.position,
				})?,
			),
			QueryKind::About => (
				&self.about_method,
				serde_json::to_value(AboutParams {
					text_document: ctx.text_document(),
					pattern: query.pattern.clone(),
					position: ctx.position,
				})?,
			),
		};
		Ok(BackendRequest {
			method: method.clone(),
			params,
		})
	}

	/// Sends `query` and waits for its single reply.
	///
	/// # Errors
	///
	/// Every failure (encoding, transport, error reply, timeout) is reported as
	/// [`Error::BackendUnavailable`] for `query.id`.
	pub async fn dispatch(&self, query: &Query, ctx: &EditorContext) -> Result<DispatchOutcome> {
		let unavailable = |reason: String| Error::BackendUnavailable {
			id: query.id.clone(),
			reason,
		};

		let request = self.build_request(query, ctx).map_err(|e| unavailable(e.to_string()))?;
		debug!(id = %query.id, kind = %query.kind, method = %request.method, "dispatching query");

		let reply = match tokio::time::timeout(self.timeout, self.backend.request(&request.method, request.params)).await {
			Ok(Ok(reply)) => reply,
			Ok(Err(e)) => {
				warn!(id = %query.id, error = %e, "backend request failed");
				return Err(unavailable(e.to_string()));
			}
			Err(_) => {
				warn!(id = %query.id, timeout_ms = self.timeout.as_millis() as u64, "backend request timed out");
				return Err(unavailable(format!("timed out after {}s", self.timeout.as_secs())));
			}
		};

		let id = query.id.clone();
		Ok(match query.kind {
			QueryKind::Search => DispatchOutcome::SearchLaunched { id, handshake: reply },
			QueryKind::About => DispatchOutcome::About { id, result: reply },
		})
	}
}
