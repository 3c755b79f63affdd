use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the bridge engine.
///
/// Mirrors `examples/Alb-O-xeno/crates/config/src/error.rs`'s shape: one
/// flat enum per crate boundary, each variant documenting the condition
/// that produces it (spec §7).
#[derive(Debug, Error)]
pub enum Error {
	/// tsserver could not be located or spawned at startup (spec §7.1).
	#[error("could not start tsserver at {path}: {source}")]
	MissingTsServer { path: PathBuf, source: std::io::Error },

	/// A stdout line from tsserver was not valid JSON, or a response
	/// referenced a sequence number with no pending entry (spec §7.2).
	#[error("tsserver protocol desync: {0}")]
	Protocol(String),

	/// tsserver replied with `success: false` (spec §7.3).
	#[error("tsserver command failed: {0}")]
	CommandFailed(String),

	/// tsserver's "No content available." completion error, treated as a
	/// null result rather than a hard failure (spec §7.4).
	#[error("no content available")]
	NoContentAvailable,

	/// `didChange` targeted a document the mirror doesn't know about, or
	/// carried a null version (spec §7.5).
	#[error("invalid document state for {path}: {reason}")]
	InvalidDocument { path: PathBuf, reason: String },

	/// The tsserver child process has exited; the transport is no longer
	/// usable (spec §7.7).
	#[error("tsserver process has exited")]
	TransportDead,

	/// A URI could not be converted to a filesystem path (spec §4.2 `uriToPath`).
	#[error("not a file:// uri or not representable as a path: {0}")]
	InvalidUri(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
