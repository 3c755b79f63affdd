//! Wire types for tsserver's JSON-over-stdio protocol.
//!
//! tsserver reads one JSON object per line on stdin and writes one JSON
//! object per line on stdout. This crate only models that shape — it does
//! no I/O and knows nothing about LSP; [`tsbridge`](../tsbridge) sits on top
//! and translates between this protocol and `lsp-types`.

mod message;
mod seq;

pub use message::{Event, Request, Response, ResponseBody};
pub use seq::Seq;

/// `command` names tsserver understands, as sent in [`Request::command`].
///
/// Kept as a plain string newtype rather than an enum: tsserver's command
/// set is open-ended (plugins add their own) and the bridge only ever
/// constructs a fixed subset of these by name.
pub mod commands {
	pub const OPEN: &str = "open";
	pub const CLOSE: &str = "close";
	pub const CHANGE: &str = "change";
	pub const SAVETO: &str = "saveto";
	pub const CONFIGURE: &str = "configure";
	pub const COMPILER_OPTIONS_FOR_INFERRED_PROJECTS: &str = "compilerOptionsForInferredProjects";
	pub const GETERR: &str = "geterr";
	pub const QUICKINFO: &str = "quickinfo";
	pub const DEFINITION: &str = "definition";
	pub const IMPLEMENTATION: &str = "implementation";
	pub const TYPE_DEFINITION: &str = "typeDefinition";
	pub const REFERENCES: &str = "references";
	pub const RENAME: &str = "rename";
	pub const NAVTREE: &str = "navtree";
	pub const NAVTO: &str = "navto";
	pub const DOCUMENT_HIGHLIGHTS: &str = "documentHighlights";
	pub const SIGNATURE_HELP: &str = "signatureHelp";
	pub const FORMAT: &str = "format";
	pub const COMPLETION_INFO: &str = "completionInfo";
	pub const COMPLETION_ENTRY_DETAILS: &str = "completionEntryDetails";
	pub const GET_CODE_FIXES: &str = "getCodeFixes";
	pub const GET_APPLICABLE_REFACTORS: &str = "getApplicableRefactors";
	pub const GET_EDITS_FOR_REFACTOR: &str = "getEditsForRefactor";
	pub const ORGANIZE_IMPORTS: &str = "organizeImports";
	pub const GET_EDITS_FOR_FILE_RENAME: &str = "getEditsForFileRename";
	pub const GET_OUTLINING_SPANS: &str = "getOutliningSpans";
	pub const APPLY_CODE_ACTION_COMMAND: &str = "applyCodeActionCommand";
}

/// Event names carried in [`Event::event`].
pub mod events {
	pub const SEMANTIC_DIAG: &str = "semanticDiag";
	pub const SYNTAX_DIAG: &str = "syntaxDiag";
	pub const SUGGESTION_DIAG: &str = "suggestionDiag";
	pub const REQUEST_COMPLETED: &str = "requestCompleted";
}
