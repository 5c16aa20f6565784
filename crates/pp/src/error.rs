//! Error types for pretty-print decoding and rendering.

/// A convenient type alias for `Result` with `E` = [`PpError`].
pub type Result<T, E = PpError> = std::result::Result<T, E>;

/// Possible pretty-print errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PpError {
	/// A hypothesis was given no identifiers to attach its type to.
	#[error("hypothesis has no identifiers")]
	EmptyHypothesis,
	/// The backend sent a pretty-print command that does not match any known shape.
	#[error("malformed pretty-print command: {0}")]
	Decode(String),
	/// The pretty-print command tree nests deeper than the decoder accepts.
	#[error("pretty-print command nested deeper than {0} levels")]
	TooDeep(usize),
}
