//! The request channel to the language server.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::Result;
use crate::bridge::PanelHandle;

/// An opaque request/reply channel to the backend.
///
/// Implementations must be safe to call from many tasks at once; each call is
/// one request and resolves to its one reply.
#[async_trait]
pub trait Backend: Send + Sync {
	/// Sends `method` with `params` and waits for the reply.
	async fn request(&self, method: &str, params: Value) -> Result<Value>;
}

/// A notification sent by the backend on its own initiative.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendNotification {
	/// Notification method.
	pub method: String,
	/// Notification params.
	pub params: Value,
}

/// Feeds every `method` notification from `rx` into the panel as a search result.
///
/// Other notifications are skipped. The task ends when either side closes.
pub fn spawn_search_forwarder(
	mut rx: mpsc::UnboundedReceiver<BackendNotification>,
	method: String,
	panel: PanelHandle,
) -> JoinHandle<()> {
	tokio::spawn(async move {
		while let Some(notification) = rx.recv().await {
			if notification.method != method {
				trace!(method = %notification.method, "ignoring backend notification");
				continue;
			}
			if panel.search_result(notification.params).await.is_err() {
				debug!("panel closed, stopping search forwarder");
				break;
			}
		}
	})
}
