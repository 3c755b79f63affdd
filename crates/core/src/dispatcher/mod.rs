//! C7: the LSP request dispatcher.
//!
//! Orchestrates C2 (document mirror), C3 (translation), C4 (transport), C5
//! (diagnostics), and C6 (completion) to implement each LSP method (spec
//! §4.6). Runs on one logical task per spec §5 — every method here takes
//! `&mut self` and only ever suspends at a transport request.

mod commands;
mod diagnostics_loop;
mod events;
mod requests;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lsp_types::{
	CodeActionProviderCapability, CompletionOptions, ExecuteCommandOptions, HoverProviderCapability, OneOf,
	PublishDiagnosticsParams, RenameOptions, RenameProviderCapability, SaveOptions, ServerCapabilities,
	SignatureHelpOptions, TextDocumentContentChangeEvent, TextDocumentSyncCapability, TextDocumentSyncKind,
	TextDocumentSyncOptions, TextDocumentSyncSaveOptions, Uri, WorkDoneProgressOptions,
};
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::mpsc;
use tsbridge_proto::commands as ts_commands;

pub use commands::COMMANDS;

use crate::config::{self, ServerOptions};
use crate::diagnostics::DiagnosticQueue;
use crate::document::{Document, OpenDocumentSet};
use crate::error::Result;
use crate::transport::{TransportHandle, TsServerOptions};
use crate::translate;

/// Completion trigger characters (spec §6.1).
pub const COMPLETION_TRIGGERS: &[&str] = &[".", "\"", "'", "/", "@", "<"];
/// Signature-help trigger characters (spec §6.1).
pub const SIGNATURE_HELP_TRIGGERS: &[&str] = &["(", ",", "<"];

pub struct Dispatcher {
	transport: TransportHandle,
	documents: OpenDocumentSet,
	diagnostics: Arc<Mutex<DiagnosticQueue>>,
	diag_loop: Arc<diagnostics_loop::DiagnosticsCoordinator>,
	publish: mpsc::Sender<PublishDiagnosticsParams>,
	options: ServerOptions,
	hierarchical_symbols: bool,
}

impl Dispatcher {
	/// Spawns tsserver, configures it, and starts the background event loop
	/// that turns its diagnostic events into `publishDiagnostics`
	/// notifications (spec §4.6 `initialize`).
	pub async fn new(ts_options: TsServerOptions, options: ServerOptions) -> Result<(Self, mpsc::Receiver<PublishDiagnosticsParams>)> {
		let (transport, events_rx) = TransportHandle::spawn(&ts_options).await?;

		transport
			.request(
				ts_commands::CONFIGURE,
				Some(json!({
					"hostInfo": "tsbridge",
					"preferences": { "providePrefixAndSuffixTextForRename": true },
				})),
				None,
			)
			.await?;
		transport
			.notify(ts_commands::COMPILER_OPTIONS_FOR_INFERRED_PROJECTS, Some(json!({
				"options": config::compiler_options_for_inferred_projects(),
			})))
			.await;

		let diagnostics = Arc::new(Mutex::new(DiagnosticQueue::new()));
		let (publish_tx, publish_rx) = mpsc::channel(256);
		tokio::spawn(events::run(events_rx, Arc::clone(&diagnostics), publish_tx.clone()));

		let dispatcher = Self {
			diag_loop: diagnostics_loop::DiagnosticsCoordinator::new(transport.clone()),
			transport,
			documents: OpenDocumentSet::new(),
			diagnostics,
			publish: publish_tx,
			options,
			hierarchical_symbols: false,
		};
		Ok((dispatcher, publish_rx))
	}

	/// Server capabilities advertised in the `initialize` response (spec
	/// §4.6). `hierarchical_document_symbol_support` flips how
	/// `documentSymbol` shapes its response for the rest of the session.
	pub fn capabilities(&mut self, hierarchical_document_symbol_support: bool) -> ServerCapabilities {
		self.hierarchical_symbols = hierarchical_document_symbol_support;
		ServerCapabilities {
			text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
				open_close: Some(true),
				change: Some(TextDocumentSyncKind::INCREMENTAL),
				save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions { include_text: Some(false) })),
				..Default::default()
			})),
			completion_provider: Some(CompletionOptions {
				resolve_provider: Some(true),
				trigger_characters: Some(COMPLETION_TRIGGERS.iter().map(|s| (*s).to_string()).collect()),
				..Default::default()
			}),
			signature_help_provider: Some(SignatureHelpOptions {
				trigger_characters: Some(SIGNATURE_HELP_TRIGGERS.iter().map(|s| (*s).to_string()).collect()),
				retrigger_characters: None,
				work_done_progress_options: WorkDoneProgressOptions::default(),
			}),
			definition_provider: Some(OneOf::Left(true)),
			implementation_provider: Some(lsp_types::ImplementationProviderCapability::Simple(true)),
			type_definition_provider: Some(lsp_types::TypeDefinitionProviderCapability::Simple(true)),
			references_provider: Some(OneOf::Left(true)),
			hover_provider: Some(HoverProviderCapability::Simple(true)),
			rename_provider: Some(RenameProviderCapability::Options(RenameOptions {
				prepare_provider: Some(false),
				work_done_progress_options: WorkDoneProgressOptions::default(),
			})),
			document_highlight_provider: Some(OneOf::Left(true)),
			document_symbol_provider: Some(OneOf::Left(true)),
			workspace_symbol_provider: Some(OneOf::Left(true)),
			document_formatting_provider: Some(OneOf::Left(true)),
			code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
			folding_range_provider: Some(lsp_types::FoldingRangeProviderCapability::Simple(true)),
			execute_command_provider: Some(ExecuteCommandOptions {
				commands: COMMANDS.iter().map(|s| (*s).to_string()).collect(),
				work_done_progress_options: WorkDoneProgressOptions::default(),
			}),
			..Default::default()
		}
	}

	fn path_of(&self, uri: &Uri) -> Option<PathBuf> {
		crate::uri::uri_to_path(uri).ok()
	}

	/// `textDocument/didOpen` (spec §4.6). Re-opening an already-open path
	/// downgrades to a full-text `change`.
	pub async fn did_open(&mut self, uri: &Uri, language_id: &str, version: i32, text: String) {
		let Some(path) = self.path_of(uri) else { return };
		let document = Document::new(path.clone(), language_id.to_string(), version, &text);

		if !self.documents.open(document) {
			let change = TextDocumentContentChangeEvent { range: None, range_length: None, text };
			if let Ok(doc) = self.documents.require_mut(&path) {
				doc.apply_change(version, &change);
			}
			self.send_full_text_change(&path, version).await;
		} else {
			self.transport
				.notify(
					ts_commands::OPEN,
					Some(json!({
						"file": path_string(&path),
						"fileContent": text,
						"scriptKindName": translate::script_kind_name(language_id),
						"projectRootPath": self.options.workspace_root.as_ref().map(|p| path_string(p)),
					})),
				)
				.await;
		}
		self.diag_loop.schedule([path_string(&path)]);
	}

	/// `textDocument/didChange` (spec §4.6): mirrors every change both
	/// locally and to tsserver, 1-based.
	pub async fn did_change(&mut self, uri: &Uri, version: i32, changes: Vec<TextDocumentContentChangeEvent>) {
		let Some(path) = self.path_of(uri) else { return };
		for change in changes {
			let Ok(doc) = self.documents.require_mut(&path) else {
				tracing::warn!(path = %path.display(), "didChange on an unknown document");
				return;
			};
			match change.range {
				Some(range) => {
					let ts_range = translate::to_file_range_request_args(&path_string(&path), range);
					doc.apply_change(version, &change);
					self.transport
						.notify(
							ts_commands::CHANGE,
							Some(json!({
								"file": ts_range.file,
								"line": ts_range.start_line,
								"offset": ts_range.start_offset,
								"endLine": ts_range.end_line,
								"endOffset": ts_range.end_offset,
								"insertString": change.text,
							})),
						)
						.await;
				}
				None => {
					doc.apply_change(version, &change);
					self.send_full_text_change(&path, version).await;
				}
			}
		}
		self.diag_loop.schedule([path_string(&path)]);
	}

	async fn send_full_text_change(&mut self, path: &Path, _version: i32) {
		// Cloning is acceptable here: only hit on the full-text-replace path
		// (didOpen-of-an-open-file, or a client that never sends ranges).
		let Some(doc) = self.documents.get(path).cloned() else { return };
		let end = doc.position_at(doc.text().len());
		self.transport
			.notify(
				ts_commands::CHANGE,
				Some(json!({
					"file": path_string(path),
					"line": 1,
					"offset": 1,
					"endLine": end.line + 1,
					"endOffset": end.character + 1,
					"insertString": doc.text(),
				})),
			)
			.await;
	}

	/// `textDocument/didClose` (spec §4.6).
	pub async fn did_close(&mut self, uri: &Uri) {
		let Some(path) = self.path_of(uri) else { return };
		if self.documents.close(&path).is_some() {
			self.transport.notify(ts_commands::CLOSE, Some(json!({ "file": path_string(&path) }))).await;
		}
		events::publish_empty(&self.diagnostics, &self.publish, &path).await;
	}

	/// `textDocument/didSave` is a no-op (spec §4.6).
	pub fn did_save(&self) {}

	pub fn transport(&self) -> &TransportHandle {
		&self.transport
	}

	pub fn diagnostics_coordinator(&self) -> &Arc<diagnostics_loop::DiagnosticsCoordinator> {
		&self.diag_loop
	}

	pub fn options(&self) -> &ServerOptions {
		&self.options
	}

	pub fn document(&mut self, path: &Path) -> Option<&Document> {
		self.documents.get(path)
	}

	pub fn document_symbol_is_hierarchical(&self) -> bool {
		self.hierarchical_symbols
	}

	pub fn most_recent_document(&self) -> Option<&Path> {
		self.documents.most_recent()
	}
}

fn path_string(path: &Path) -> String {
	path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn completion_triggers_match_spec() {
		assert_eq!(COMPLETION_TRIGGERS, &[".", "\"", "'", "/", "@", "<"]);
	}

	#[test]
	fn signature_help_triggers_match_spec() {
		assert_eq!(SIGNATURE_HELP_TRIGGERS, &["(", ",", "<"]);
	}
}
