//! Framing and the I/O loop.
//!
//! ```text
//! Content-Length: <n>\r\n
//! \r\n
//! <n bytes of UTF-8 JSON>
//! ```

use std::collections::HashMap;

use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

use super::Outbound;
use crate::backend::BackendNotification;
use crate::error::ResponseError;
use crate::{Error, Result};

/// Longest header line accepted, terminator included.
pub(crate) const MAX_HEADER_LINE: usize = 8 * 1024;

/// Largest message body accepted.
pub(crate) const MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

/// Reads one framed message. `Ok(None)` on clean EOF.
pub(crate) async fn read_message<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<Value>> {
	let mut content_length: Option<usize> = None;
	let mut line = String::new();

	loop {
		line.clear();
		let read = (&mut *reader).take(MAX_HEADER_LINE as u64).read_line(&mut line).await?;
		if read == 0 {
			return Ok(None);
		}
		if read >= MAX_HEADER_LINE && !line.ends_with('\n') {
			return Err(Error::Protocol(format!("header line exceeds {MAX_HEADER_LINE} bytes")));
		}

		let trimmed = line.trim_end_matches(['\r', '\n']);
		if trimmed.is_empty() {
			break;
		}

		if let Some((name, rest)) = trimmed.split_once(':')
			&& name.trim().eq_ignore_ascii_case("Content-Length")
		{
			let len = rest
				.trim()
				.parse::<usize>()
				.map_err(|e| Error::Protocol(format!("invalid Content-Length: {e}")))?;
			content_length = Some(len);
		}
	}

	let len = content_length.ok_or_else(|| Error::Protocol("missing Content-Length header".into()))?;
	if len > MAX_FRAME_BYTES {
		return Err(Error::Protocol(format!("message of {len} bytes exceeds {MAX_FRAME_BYTES}")));
	}
	let mut body = vec![0u8; len];
	reader.read_exact(&mut body).await?;
	Ok(Some(serde_json::from_slice(&body)?))
}

/// Writes one framed message and flushes.
pub(crate) async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, value: &Value) -> Result<()> {
	let body = serde_json::to_vec(value)?;
	writer.write_all(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes()).await?;
	writer.write_all(&body).await?;
	writer.flush().await?;
	Ok(())
}

async fn read_loop<R: AsyncBufRead + Unpin>(mut reader: R, tx: mpsc::UnboundedSender<Value>) {
	loop {
		match read_message(&mut reader).await {
			Ok(Some(msg)) => {
				if tx.send(msg).is_err() {
					break;
				}
			}
			Ok(None) => {
				debug!("backend stream closed");
				break;
			}
			Err(Error::Decode(e)) => warn!(error = %e, "dropping undecodable backend message"),
			Err(e) => {
				warn!(error = %e, "backend stream failed");
				break;
			}
		}
	}
}

struct IoLoop<W> {
	writer: W,
	pending: HashMap<i64, oneshot::Sender<Result<Value>>>,
	notifications: mpsc::UnboundedSender<BackendNotification>,
}

pub(crate) async fn run<R, W>(
	reader: R,
	writer: W,
	mut outbound: mpsc::UnboundedReceiver<Outbound>,
	notifications: mpsc::UnboundedSender<BackendNotification>,
) where
	R: AsyncBufRead + Unpin + Send + 'static,
	W: AsyncWrite + Unpin,
{
	let (in_tx, mut inbound) = mpsc::unbounded_channel();
	let reader_task = tokio::spawn(read_loop(reader, in_tx));

	let mut io = IoLoop {
		writer,
		pending: HashMap::new(),
		notifications,
	};

	loop {
		let step = tokio::select! {
			msg = outbound.recv() => match msg {
				Some(msg) => io.send(msg).await,
				None => break,
			},
			msg = inbound.recv() => match msg {
				Some(msg) => io.receive(msg).await,
				None => break,
			},
		};
		if let Err(e) = step {
			warn!(error = %e, "backend write failed");
			break;
		}
	}

	reader_task.abort();
	let stopped = io.pending.len();
	for (_, reply) in io.pending.drain() {
		let _ = reply.send(Err(Error::ServiceStopped));
	}
	debug!(pending = stopped, "backend I/O loop stopped");
}

impl<W: AsyncWrite + Unpin> IoLoop<W> {
	async fn send(&mut self, msg: Outbound) -> Result<()> {
		match msg {
			Outbound::Request { id, method, params, reply } => {
				trace!(id, method = %method, "backend request");
				// Callers that timed out dropped their receiver.
				self.pending.retain(|_, waiting| !waiting.is_closed());
				self.pending.insert(id, reply);
				let frame = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params});
				write_message(&mut self.writer, &frame).await
			}
			Outbound::Notification { method, params } => {
				let frame = json!({"jsonrpc": "2.0", "method": method, "params": params});
				write_message(&mut self.writer, &frame).await
			}
		}
	}

	async fn receive(&mut self, mut msg: Value) -> Result<()> {
		let method = msg.get("method").and_then(Value::as_str).map(str::to_owned);
		let id = msg.get_mut("id").map(Value::take);

		match (method, id) {
			(Some(method), Some(id)) => {
				debug!(method = %method, "answering server request with null");
				write_message(&mut self.writer, &json!({"jsonrpc": "2.0", "id": id, "result": null})).await
			}
			(Some(method), None) => {
				let params = msg.get_mut("params").map(Value::take).unwrap_or(Value::Null);
				let _ = self.notifications.send(BackendNotification { method, params });
				Ok(())
			}
			(None, Some(id)) => {
				self.complete(&id, msg);
				Ok(())
			}
			(None, None) => {
				warn!(payload = %msg, "backend message is neither request, response nor notification");
				Ok(())
			}
		}
	}

	fn complete(&mut self, id: &Value, mut msg: Value) {
		let Some(reply) = id.as_i64().and_then(|id| self.pending.remove(&id)) else {
			debug!(id = %id, "response for unknown request");
			return;
		};

		let result = match msg.get_mut("error").map(Value::take) {
			Some(error) => match serde_json::from_value::<ResponseError>(error) {
				Ok(error) => Err(Error::Response(error)),
				Err(e) => Err(Error::Protocol(format!("malformed error object: {e}"))),
			},
			None => Ok(msg.get_mut("result").map(Value::take).unwrap_or(Value::Null)),
		};
		let _ = reply.send(result);
	}
}
