//! `tsbridge`: the engine that sits between an LSP client and a `tsserver`
//! subprocess, translating one protocol into the other.
//!
//! This crate owns no I/O loop of its own — [`cli`](../tsbridge_cli/index.html)
//! wires stdio framing to [`dispatcher::Dispatcher`]; everything in here is
//! the engine itself: the document mirror (C2), translation (C3), transport
//! (C4), diagnostics (C5), completion (C6), and command (C8) pipelines.

pub mod completion;
pub mod config;
pub mod diagnostics;
pub mod dispatcher;
pub mod document;
pub mod error;
pub mod kinds;
pub mod position;
pub mod transport;
pub mod translate;
pub mod ts_types;
pub mod uri;

pub use document::{Document, OpenDocumentSet};
pub use error::{Error, Result};
