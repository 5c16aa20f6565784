//! Panel actor: decodes panel commands, runs queries and routes replies by id.
//!
//! One [`PanelBridge`] task exists per open panel. It is the only owner of that panel's
//! [`RequestCorrelator`], so no locking is involved. Backend calls run as tasks in a
//! [`JoinSet`] polled by the same loop; a slow About never holds up a Search handshake.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::{Level, debug, info, trace, warn};

use crate::backend::Backend;
use crate::config::PanelConfig;
use crate::context::{self, EditorHost};
use crate::correlator::RequestCorrelator;
use crate::dispatcher::{DispatchOutcome, QueryDispatcher};
use crate::protocol::{PanelMessage, SearchResult, UiCommand};
use crate::query::{Query, QueryId, QueryKind};
use crate::{Error, Result};

/// Commands for the panel actor.
#[derive(Debug)]
pub(crate) enum PanelCmd {
	/// Raw message posted by the panel.
	Ui(Value),
	/// Params of a backend search-result push.
	SearchResult(Value),
	/// Host-initiated query prefill.
	LaunchQuery {
		/// Pattern to prefill.
		pattern: String,
		/// Query kind.
		kind: QueryKind,
	},
	/// Number of live correlation slots.
	Pending {
		/// Reply channel.
		reply: oneshot::Sender<usize>,
	},
	/// Tear the panel down.
	Dispose,
}

/// Cloneable handle to a running [`PanelBridge`].
#[derive(Clone, Debug)]
pub struct PanelHandle {
	tx: mpsc::Sender<PanelCmd>,
}

impl PanelHandle {
	async fn send(&self, cmd: PanelCmd) -> Result<()> {
		self.tx.send(cmd).await.map_err(|_| Error::ServiceStopped)
	}

	/// Delivers a raw message posted by the panel.
	pub async fn post(&self, message: Value) -> Result<()> {
		self.send(PanelCmd::Ui(message)).await
	}

	/// Delivers the params of a backend search-result push.
	pub async fn search_result(&self, params: Value) -> Result<()> {
		self.send(PanelCmd::SearchResult(params)).await
	}

	/// Asks the panel to prefill and run a query.
	pub async fn launch_query(&self, pattern: impl Into<String>, kind: QueryKind) -> Result<()> {
		self.send(PanelCmd::LaunchQuery {
			pattern: pattern.into(),
			kind,
		})
		.await
	}

	/// Number of queries awaiting a reply or still receiving search results.
	pub async fn pending_queries(&self) -> Result<usize> {
		let (reply, rx) = oneshot::channel();
		self.send(PanelCmd::Pending { reply }).await?;
		rx.await.map_err(|_| Error::ServiceStopped)
	}

	/// Tears the panel down; in-flight queries are abandoned.
	pub async fn dispose(&self) -> Result<()> {
		self.send(PanelCmd::Dispose).await
	}

	/// Whether the panel task has stopped.
	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}
}

/// The panel actor.
pub struct PanelBridge {
	rx: mpsc::Receiver<PanelCmd>,
	host: Arc<dyn EditorHost>,
	dispatcher: QueryDispatcher,
	correlator: RequestCorrelator,
	outbound: mpsc::UnboundedSender<PanelMessage>,
	tasks: JoinSet<(QueryId, Result<DispatchOutcome>)>,
}

impl PanelBridge {
	/// Spawns the panel actor.
	///
	/// Returns the handle and the stream of messages to post to the panel.
	pub fn start(
		config: &PanelConfig,
		host: Arc<dyn EditorHost>,
		backend: Arc<dyn Backend>,
	) -> (PanelHandle, mpsc::UnboundedReceiver<PanelMessage>) {
		let (tx, rx) = mpsc::channel(config.command_capacity.max(1));
		let (outbound, messages) = mpsc::unbounded_channel();

		let service = Self {
			rx,
			host,
			dispatcher: QueryDispatcher::new(backend, config),
			correlator: RequestCorrelator::new(config.search_retention),
			outbound,
			tasks: JoinSet::new(),
		};
		tokio::spawn(service.run());

		(PanelHandle { tx }, messages)
	}

	async fn run(mut self) {
		loop {
			tokio::select! {
				done = self.tasks.join_next(), if !self.tasks.is_empty() => match done {
					Some(Ok((id, outcome))) => self.handle_completion(id, outcome),
					Some(Err(e)) => warn!(error = %e, "query task panicked or was cancelled"),
					None => {}
				},
				cmd = self.rx.recv() => match cmd {
					Some(PanelCmd::Ui(message)) => self.handle_ui(message),
					Some(PanelCmd::SearchResult(params)) => self.handle_search_result(params),
					Some(PanelCmd::LaunchQuery { pattern, kind }) => {
						self.emit(PanelMessage::Query { text: pattern, kind });
					}
					Some(PanelCmd::Pending { reply }) => {
						let _ = reply.send(self.correlator.len());
					}
					Some(PanelCmd::Dispose) | None => break,
				},
			}
		}

		self.tasks.abort_all();
		debug!(dropped = self.correlator.len(), "panel disposed");
		self.correlator.clear();
	}

	fn handle_ui(&mut self, message: Value) {
		let is_query = message.get("command").and_then(Value::as_str) == Some("coqQuery");
		match UiCommand::decode(message) {
			Ok(UiCommand::SubmitQuery { id, pattern, kind }) => self.handle_submit(Query { id, kind, pattern }),
			Ok(UiCommand::CopyToClipboard { text }) => self.handle_copy(&text),
			Ok(UiCommand::Unknown) => debug!("ignoring unknown panel command"),
			Err(e) if is_query => {
				warn!(error = %e, "rejecting malformed query");
				self.host.show_error(&format!("Query rejected: {e}"));
			}
			Err(e) => warn!(error = %e, "ignoring malformed panel message"),
		}
	}

	fn handle_submit(&mut self, query: Query) {
		let ctx = match context::resolve(self.host.as_ref()) {
			Ok(ctx) => ctx,
			Err(_) => {
				info!(id = %query.id, "query without active editor");
				self.host
					.show_error(&format!("Search: {} impossible. No active text editor.", query.pattern));
				return;
			}
		};

		if let Err(e) = self.correlator.begin(query.id.clone(), query.kind) {
			warn!(id = %query.id, error = %e, "rejecting query");
			self.host.show_error(&e.to_string());
			return;
		}

		let dispatcher = self.dispatcher.clone();
		self.tasks.spawn(async move {
			let outcome = dispatcher.dispatch(&query, &ctx).await;
			(query.id, outcome)
		});
	}

	fn handle_completion(&mut self, id: QueryId, outcome: Result<DispatchOutcome>) {
		match outcome {
			Ok(outcome) => match self.correlator.resolve(&id, outcome.into_payload()) {
				Ok(deliveries) => {
					for delivery in deliveries {
						self.emit(delivery.into());
					}
				}
				Err(e) => debug!(id = %id, error = %e, "dropping reply"),
			},
			Err(e) => {
				if let Err(unmatched) = self.correlator.fail(&id) {
					debug!(id = %id, error = %unmatched, "dropping failure");
					return;
				}
				let text = e.to_string();
				self.host.show_error(&text);
				self.emit(PanelMessage::QueryError { id, text });
			}
		}
	}

	fn handle_search_result(&mut self, params: Value) {
		let Some(id) = SearchResult::peek_id(&params) else {
			warn!("search result without id");
			return;
		};

		if tracing::enabled!(Level::TRACE) {
			match SearchResult::decode(&params) {
				Ok(result) => trace!(id = %id, name = %result.name, "search result"),
				Err(e) => trace!(id = %id, error = %e, "search result not decodable, forwarding verbatim"),
			}
		}

		match self.correlator.push(&id, params) {
			Ok(deliveries) => {
				for delivery in deliveries {
					self.emit(delivery.into());
				}
			}
			Err(e) => debug!(id = %id, error = %e, "dropping search result"),
		}
	}

	fn handle_copy(&self, text: &str) {
		match self.host.write_clipboard(text) {
			Ok(()) => self
				.host
				.show_info(&format!("Successfully copied command {text} to clipboard.")),
			Err(e) => {
				warn!(error = %e, "clipboard write failed");
				self.host.show_error(&format!("Could not copy {text} to clipboard: {e}"));
			}
		}
	}

	fn emit(&self, message: PanelMessage) {
		if self.outbound.send(message).is_err() {
			trace!("panel message sink closed");
		}
	}
}
