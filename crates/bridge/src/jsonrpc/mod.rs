//! JSON-RPC 2.0 [`Backend`] over an async byte stream.
//!
//! # Mental model
//!
//! - [`JsonRpcBackend`] is a cheap cloneable handle. Each [`Backend::request`] allocates a
//!   numeric id, hands the request to the I/O task and awaits a oneshot.
//! - The I/O task owns the writer and the pending map. A separate reader task parses framed
//!   messages and feeds them to the I/O task, so a half-read message is never dropped by a
//!   `select!`.
//! - Responses complete their pending request. Notifications go out on the channel returned
//!   by [`JsonRpcBackend::start`]. Requests from the server are answered with `null`.
//!
//! # Invariants
//!
//! - On EOF or an I/O error, every pending request fails with [`Error::ServiceStopped`].
//! - A response for an unknown id is logged and dropped.

mod io;

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};

use crate::backend::{Backend, BackendNotification};
use crate::{Error, Result};

pub(crate) enum Outbound {
	Request {
		id: i64,
		method: String,
		params: Value,
		reply: oneshot::Sender<Result<Value>>,
	},
	Notification {
		method: String,
		params: Value,
	},
}

/// JSON-RPC client handle.
#[derive(Debug, Clone)]
pub struct JsonRpcBackend {
	tx: mpsc::UnboundedSender<Outbound>,
	next_id: Arc<AtomicI64>,
}

impl JsonRpcBackend {
	/// Spawns the I/O tasks for `reader`/`writer`.
	///
	/// Returns the handle and the stream of server notifications. Must be called within a
	/// tokio runtime.
	pub fn start<R, W>(reader: R, writer: W) -> (Self, mpsc::UnboundedReceiver<BackendNotification>)
	where
		R: AsyncBufRead + Unpin + Send + 'static,
		W: AsyncWrite + Unpin + Send + 'static,
	{
		let (tx, rx) = mpsc::unbounded_channel();
		let (notif_tx, notif_rx) = mpsc::unbounded_channel();
		tokio::spawn(io::run(reader, writer, rx, notif_tx));
		(
			Self {
				tx,
				next_id: Arc::new(AtomicI64::new(1)),
			},
			notif_rx,
		)
	}

	/// Sends a notification; no reply is expected.
	pub fn notify(&self, method: &str, params: Value) -> Result<()> {
		self.tx
			.send(Outbound::Notification {
				method: method.to_owned(),
				params,
			})
			.map_err(|_| Error::ServiceStopped)
	}

	/// Whether the I/O task has stopped.
	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}
}

#[async_trait]
impl Backend for JsonRpcBackend {
	async fn request(&self, method: &str, params: Value) -> Result<Value> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let (reply, rx) = oneshot::channel();
		self.tx
			.send(Outbound::Request {
				id,
				method: method.to_owned(),
				params,
				reply,
			})
			.map_err(|_| Error::ServiceStopped)?;
		rx.await.map_err(|_| Error::ServiceStopped)?
	}
}
