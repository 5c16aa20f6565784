//! Id-keyed table of in-flight queries.
//!
//! Every backend reply and every search-result push passes through here before it reaches
//! the panel. The table decides whether the message belongs to a live query and in which
//! order the panel sees it.
//!
//! # Invariants
//!
//! - A delivery carries the id it was received under. Nothing is ever re-keyed.
//! - Pushes for a search that has not been launched yet are held back and released right
//!   after its handshake.
//! - About slots are removed by their reply. Launched search slots are removed by
//!   [`RequestCorrelator::retire`], by re-beginning the id, or by retention eviction.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;
use tracing::debug;

use crate::query::{QueryId, QueryKind};
use crate::{Error, Result};

/// A payload ready to be sent to the panel under its id.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
	/// The single reply to an About query.
	AboutResult {
		/// Query id.
		id: QueryId,
		/// Pretty-print payload.
		payload: Value,
	},
	/// The handshake of a Search query.
	SearchLaunched {
		/// Query id.
		id: QueryId,
		/// Handshake payload.
		payload: Value,
	},
	/// One pushed search result.
	SearchResult {
		/// Query id.
		id: QueryId,
		/// `{id, name, statement}` as pushed by the backend.
		payload: Value,
	},
}

impl Delivery {
	/// The id this delivery belongs to.
	pub fn id(&self) -> &QueryId {
		match self {
			Self::AboutResult { id, .. } | Self::SearchLaunched { id, .. } | Self::SearchResult { id, .. } => id,
		}
	}
}

#[derive(Debug)]
enum Slot {
	Awaiting { kind: QueryKind, early: Vec<Value> },
	Launched,
}

/// Tracks which ids may still receive replies or pushes.
#[derive(Debug)]
pub struct RequestCorrelator {
	slots: HashMap<QueryId, Slot>,
	launched: VecDeque<QueryId>,
	retention: usize,
}

impl RequestCorrelator {
	/// Creates an empty correlator keeping at most `retention` launched searches (at least one).
	pub fn new(retention: usize) -> Self {
		Self {
			slots: HashMap::new(),
			launched: VecDeque::new(),
			retention: retention.max(1),
		}
	}

	/// Registers a query about to be sent.
	///
	/// Re-beginning the id of a launched search retires that search first.
	///
	/// # Errors
	///
	/// [`Error::DuplicateRequest`] if `id` is still awaiting its reply.
	pub fn begin(&mut self, id: QueryId, kind: QueryKind) -> Result<()> {
		match self.slots.get(&id) {
			Some(Slot::Awaiting { .. }) => return Err(Error::DuplicateRequest(id)),
			Some(Slot::Launched) => {
				debug!(id = %id, "re-issued search id, retiring previous search");
				self.retire(&id);
			}
			None => {}
		}
		self.slots.insert(id, Slot::Awaiting { kind, early: Vec::new() });
		Ok(())
	}

	/// Accepts the single reply for `id`.
	///
	/// For a search this is the handshake; any held-back pushes follow it in arrival order.
	///
	/// # Errors
	///
	/// [`Error::UnmatchedResolution`] if `id` is not awaiting a reply.
	pub fn resolve(&mut self, id: &QueryId, payload: Value) -> Result<Vec<Delivery>> {
		let kind = match self.slots.get(id) {
			Some(Slot::Awaiting { kind, .. }) => *kind,
			_ => return Err(Error::UnmatchedResolution(id.clone())),
		};

		match kind {
			QueryKind::About => {
				self.slots.remove(id);
				Ok(vec![Delivery::AboutResult {
					id: id.clone(),
					payload,
				}])
			}
			QueryKind::Search => {
				let early = match self.slots.insert(id.clone(), Slot::Launched) {
					Some(Slot::Awaiting { early, .. }) => early,
					_ => Vec::new(),
				};
				let mut out = Vec::with_capacity(early.len() + 1);
				out.push(Delivery::SearchLaunched {
					id: id.clone(),
					payload,
				});
				out.extend(early.into_iter().map(|payload| Delivery::SearchResult {
					id: id.clone(),
					payload,
				}));

				self.launched.push_back(id.clone());
				while self.launched.len() > self.retention {
					if let Some(oldest) = self.launched.pop_front() {
						debug!(id = %oldest, "search retention exceeded, retiring");
						self.slots.remove(&oldest);
					}
				}
				Ok(out)
			}
		}
	}

	/// Accepts one pushed search result for `id`.
	///
	/// Returns nothing while the search is still awaiting its handshake.
	///
	/// # Errors
	///
	/// [`Error::UnmatchedResolution`] if `id` is not a live search.
	pub fn push(&mut self, id: &QueryId, payload: Value) -> Result<Vec<Delivery>> {
		match self.slots.get_mut(id) {
			Some(Slot::Launched) => Ok(vec![Delivery::SearchResult {
				id: id.clone(),
				payload,
			}]),
			Some(Slot::Awaiting {
				kind: QueryKind::Search,
				early,
			}) => {
				early.push(payload);
				Ok(Vec::new())
			}
			_ => Err(Error::UnmatchedResolution(id.clone())),
		}
	}

	/// Drops the slot of a query whose backend call failed.
	///
	/// # Errors
	///
	/// [`Error::UnmatchedResolution`] if `id` has no slot.
	pub fn fail(&mut self, id: &QueryId) -> Result<()> {
		if self.retire(id) {
			Ok(())
		} else {
			Err(Error::UnmatchedResolution(id.clone()))
		}
	}

	/// Forgets `id` in whatever state it is. Returns whether a slot existed.
	pub fn retire(&mut self, id: &QueryId) -> bool {
		self.launched.retain(|launched| launched != id);
		self.slots.remove(id).is_some()
	}

	/// Whether `id` still awaits its reply.
	pub fn is_pending(&self, id: &QueryId) -> bool {
		matches!(self.slots.get(id), Some(Slot::Awaiting { .. }))
	}

	/// Whether `id` has a slot in any state.
	pub fn contains(&self, id: &QueryId) -> bool {
		self.slots.contains_key(id)
	}

	/// Number of live slots.
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Whether no slot is live.
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Drops every slot.
	pub fn clear(&mut self) {
		self.slots.clear();
		self.launched.clear();
	}
}

#[cfg(test)]
mod tests;
