//! End-to-end panel scenarios: panel JSON in, panel JSON out.

#![allow(unused_crate_dependencies)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use coqpanel_bridge::{
	Backend, DocumentSnapshot, EditorHost, JsonRpcBackend, PanelBridge, PanelConfig, PanelHandle, PanelMessage,
	Result, spawn_search_forwarder,
};
use lsp_types::Position;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

#[derive(Default)]
struct Host {
	editor: Option<(DocumentSnapshot, Position)>,
	clipboard: Mutex<Vec<String>>,
	errors: Mutex<Vec<String>>,
	infos: Mutex<Vec<String>>,
}

impl Host {
	fn at_v3() -> Arc<Self> {
		Arc::new(Self {
			editor: Some((
				DocumentSnapshot {
					uri: "file:///proofs/Plus.v".parse().unwrap(),
					version: 3,
				},
				Position::new(10, 4),
			)),
			..Default::default()
		})
	}

	fn without_editor() -> Arc<Self> {
		Arc::new(Self::default())
	}
}

impl EditorHost for Host {
	fn active_document(&self) -> Option<DocumentSnapshot> {
		self.editor.as_ref().map(|(doc, _)| doc.clone())
	}

	fn active_position(&self) -> Option<Position> {
		self.editor.as_ref().map(|(_, pos)| *pos)
	}

	fn write_clipboard(&self, text: &str) -> Result<()> {
		self.clipboard.lock().push(text.to_owned());
		Ok(())
	}

	fn show_error(&self, message: &str) {
		self.errors.lock().push(message.to_owned());
	}

	fn show_info(&self, message: &str) {
		self.infos.lock().push(message.to_owned());
	}
}

#[derive(Default)]
struct Recorder {
	calls: Mutex<Vec<(String, Value)>>,
}

#[async_trait]
impl Backend for Recorder {
	async fn request(&self, method: &str, params: Value) -> Result<Value> {
		self.calls.lock().push((method.to_owned(), params));
		Ok(json!(["Ppcmd_string", "plus : nat -> nat -> nat"]))
	}
}

fn open(host: Arc<Host>, backend: Arc<dyn Backend>) -> (PanelHandle, mpsc::UnboundedReceiver<PanelMessage>) {
	let _ = tracing_subscriber::fmt::try_init();
	PanelBridge::start(&PanelConfig::default(), host, backend)
}

async fn next(messages: &mut mpsc::UnboundedReceiver<PanelMessage>) -> Value {
	let msg = tokio::time::timeout(Duration::from_secs(5), messages.recv())
		.await
		.expect("timed out")
		.expect("panel closed");
	msg.to_value().unwrap()
}

#[tokio::test]
async fn about_with_active_editor() {
	let backend = Arc::new(Recorder::default());
	let (panel, mut messages) = open(Host::at_v3(), backend.clone());

	panel
		.post(json!({"command": "coqQuery", "id": "q1", "text": "plus", "type": "About"}))
		.await
		.unwrap();

	assert_eq!(
		next(&mut messages).await,
		json!({
			"command": "aboutResponse",
			"id": "q1",
			"text": ["Ppcmd_string", "plus : nat -> nat -> nat"],
		})
	);

	let calls = backend.calls.lock();
	assert_eq!(
		*calls,
		vec![(
			"vscoq/about".to_owned(),
			json!({
				"textDocument": {"uri": "file:///proofs/Plus.v", "version": 3},
				"pattern": "plus",
				"position": {"line": 10, "character": 4},
			})
		)]
	);
}

#[tokio::test]
async fn about_without_editor() {
	let backend = Arc::new(Recorder::default());
	let host = Host::without_editor();
	let (panel, mut messages) = open(host.clone(), backend.clone());

	panel
		.post(json!({"command": "coqQuery", "id": "q1", "text": "plus", "type": "About"}))
		.await
		.unwrap();
	assert_eq!(panel.pending_queries().await.unwrap(), 0);

	assert_eq!(*host.errors.lock(), vec!["Search: plus impossible. No active text editor.".to_owned()]);
	assert!(backend.calls.lock().is_empty());
	assert!(messages.try_recv().is_err());
}

#[tokio::test]
async fn copy_search_result() {
	let host = Host::at_v3();
	let (panel, _messages) = open(host.clone(), Arc::new(Recorder::default()));

	panel
		.post(json!({"command": "copySearchResult", "text": "plus_comm"}))
		.await
		.unwrap();
	assert_eq!(panel.pending_queries().await.unwrap(), 0);

	assert_eq!(*host.clipboard.lock(), vec!["plus_comm".to_owned()]);
	assert_eq!(
		*host.infos.lock(),
		vec!["Successfully copied command plus_comm to clipboard.".to_owned()]
	);
}

/// Minimal language server on the far end of a duplex pipe.
struct FakeServer {
	reader: BufReader<tokio::io::ReadHalf<tokio::io::DuplexStream>>,
	writer: tokio::io::WriteHalf<tokio::io::DuplexStream>,
}

impl FakeServer {
	async fn recv(&mut self) -> Value {
		let mut len = 0;
		let mut line = String::new();
		loop {
			line.clear();
			self.reader.read_line(&mut line).await.unwrap();
			let line = line.trim_end();
			if line.is_empty() {
				break;
			}
			if let Some(n) = line.strip_prefix("Content-Length: ") {
				len = n.parse().unwrap();
			}
		}
		let mut body = vec![0; len];
		self.reader.read_exact(&mut body).await.unwrap();
		serde_json::from_slice(&body).unwrap()
	}

	async fn send(&mut self, value: Value) {
		let body = serde_json::to_vec(&value).unwrap();
		self.writer
			.write_all(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes())
			.await
			.unwrap();
		self.writer.write_all(&body).await.unwrap();
		self.writer.flush().await.unwrap();
	}
}

#[tokio::test]
async fn interleaved_searches_over_json_rpc() {
	let _ = tracing_subscriber::fmt::try_init();
	let (client, server) = tokio::io::duplex(64 * 1024);
	let (client_r, client_w) = tokio::io::split(client);
	let (server_r, server_w) = tokio::io::split(server);
	let mut server = FakeServer {
		reader: BufReader::new(server_r),
		writer: server_w,
	};

	let config = PanelConfig::default();
	let (backend, notifications) = JsonRpcBackend::start(BufReader::new(client_r), client_w);
	let (panel, mut messages) = PanelBridge::start(&config, Host::at_v3(), Arc::new(backend));
	let _forwarder = spawn_search_forwarder(notifications, config.search_result_notification.clone(), panel.clone());

	panel
		.post(json!({"command": "coqQuery", "id": "A", "text": "_ + 0", "type": "Search"}))
		.await
		.unwrap();
	let req_a = server.recv().await;
	panel
		.post(json!({"command": "coqQuery", "id": "B", "text": "0 + _", "type": "Search"}))
		.await
		.unwrap();
	let req_b = server.recv().await;
	assert_eq!(req_a["params"]["id"], json!("A"));
	assert_eq!(req_b["params"]["id"], json!("B"));

	// B is accepted first; A's result still lands in A.
	server.send(json!({"jsonrpc": "2.0", "id": req_b["id"].clone(), "result": null})).await;
	assert_eq!(next(&mut messages).await, json!({"command": "launchedSearch", "id": "B", "text": null}));

	server.send(json!({"jsonrpc": "2.0", "id": req_a["id"].clone(), "result": null})).await;
	assert_eq!(next(&mut messages).await, json!({"command": "launchedSearch", "id": "A", "text": null}));

	let result = json!({"id": "A", "name": ["Ppcmd_string", "plus_n_O"], "statement": ["Ppcmd_string", "forall n, n = n + 0"]});
	server
		.send(json!({"jsonrpc": "2.0", "method": "vscoq/searchResult", "params": result.clone()}))
		.await;
	server
		.send(json!({"jsonrpc": "2.0", "method": "vscoq/searchResult", "params": {"id": "X", "name": "ghost", "statement": "ghost"}}))
		.await;
	server.send(json!({"jsonrpc": "2.0", "method": "vscoq/proofView", "params": {}})).await;

	assert_eq!(next(&mut messages).await, json!({"command": "searchResponse", "id": "A", "text": result}));

	assert_eq!(panel.pending_queries().await.unwrap(), 2);
	assert!(messages.try_recv().is_err());
}
