//! Id-correlated message bridge between a Coq query panel and the language server.
//!
//! # Purpose
//!
//! - Decode tagged commands posted by the query panel (`coqQuery`, `copySearchResult`).
//! - Snapshot the editor context a query needs and send exactly one backend request per query.
//! - Route every asynchronous reply and search-result push back to the panel under the id
//!   that caused it, never under another one.
//!
//! # Mental model
//!
//! - [`PanelBridge`] is an actor: one task per panel owns the [`RequestCorrelator`] and the
//!   outbound message sink. [`PanelHandle`] is the cloneable front door.
//! - [`context::resolve`] reads the [`EditorHost`] once per query. No editor, no request.
//! - [`QueryDispatcher`] turns a [`Query`] plus [`EditorContext`] into one [`Backend`] call.
//!   Each call runs in its own task; completions come back to the actor.
//! - [`JsonRpcBackend`] is a [`Backend`] over any JSON-RPC byte stream. Its notifications are
//!   fed back into the panel by [`spawn_search_forwarder`].
//!
//! # Invariants
//!
//! - Per id, the search handshake is delivered before any search result for that id.
//! - A reply or push for an unknown or retired id is dropped and never reaches another id.
//! - The correlator forgets an About id once answered and a Search id once retired.
//! - No failure in this crate ends the panel; all are reported and recovered at the boundary.

#![warn(missing_docs)]

pub mod backend;
pub mod bridge;
pub mod config;
pub mod context;
pub mod correlator;
pub mod dispatcher;
pub mod error;
pub mod jsonrpc;
pub mod protocol;
pub mod query;

pub use backend::{Backend, BackendNotification, spawn_search_forwarder};
pub use bridge::{PanelBridge, PanelHandle};
pub use config::PanelConfig;
pub use context::{DocumentSnapshot, EditorContext, EditorHost};
pub use correlator::{Delivery, RequestCorrelator};
pub use dispatcher::{DispatchOutcome, QueryDispatcher};
pub use error::{Error, ResponseError, Result};
pub use jsonrpc::JsonRpcBackend;
pub use protocol::{PanelMessage, SearchResult, UiCommand};
pub use query::{Query, QueryId, QueryKind};
