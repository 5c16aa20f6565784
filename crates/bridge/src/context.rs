//! Editor context snapshot taken once per query.

use lsp_types::{Position, Uri, VersionedTextDocumentIdentifier};

use crate::{Error, Result};

/// Identity of the document in the active editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
	/// Document URI.
	pub uri: Uri,
	/// Document version the backend has seen.
	pub version: i32,
}

/// Everything the backend needs to know about where a query runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorContext {
	/// Document URI.
	pub uri: Uri,
	/// Document version.
	pub version: i32,
	/// Cursor position at submission time.
	pub position: Position,
}

impl EditorContext {
	/// The versioned document identifier sent with every query.
	pub fn text_document(&self) -> VersionedTextDocumentIdentifier {
		VersionedTextDocumentIdentifier::new(self.uri.clone(), self.version)
	}
}

/// The editor surface the panel depends on.
///
/// Read accessors are plain snapshots and must not block.
pub trait EditorHost: Send + Sync + 'static {
	/// The document in the active editor, if any.
	fn active_document(&self) -> Option<DocumentSnapshot>;

	/// The active selection's position, if any.
	fn active_position(&self) -> Option<Position>;

	/// Writes `text` to the system clipboard.
	fn write_clipboard(&self, text: &str) -> Result<()>;

	/// Shows an error notification.
	fn show_error(&self, message: &str);

	/// Shows an informational notification.
	fn show_info(&self, message: &str);
}

/// Samples the host once.
///
/// # Errors
///
/// Returns [`Error::NoActiveEditor`] when the document or the position is missing.
pub fn resolve(host: &dyn EditorHost) -> Result<EditorContext> {
	let document = host.active_document().ok_or(Error::NoActiveEditor)?;
	let position = host.active_position().ok_or(Error::NoActiveEditor)?;
	Ok(EditorContext {
		uri: document.uri,
		version: document.version,
		position,
	})
}
