//! C8: `workspace/executeCommand` handlers (spec §4.7, §6.4).
//!
//! Each command is a thin wrapper that issues one or two tsserver requests
//! and applies the resulting edits as a `workspace/applyEdit` back-call —
//! represented here as an [`AppliedEdit`] the caller (CLI layer) sends to
//! the client, since this crate does not own the LSP transport.

use std::collections::HashMap;
use std::path::Path;

use lsp_types::{Position, TextEdit, Uri, WorkspaceEdit};
use serde_json::{json, Value};
use tsbridge_proto::commands as ts_commands;

use super::Dispatcher;
use crate::error::Result;
use crate::translate;
use crate::ts_types::{RefactorEditInfo, TsFileCodeEdits};

/// Names accepted by `workspace/executeCommand` (spec §6.4).
pub const COMMANDS: &[&str] = &[
	"_typescript.applyWorkspaceEdit",
	"_typescript.applyCodeAction",
	"_typescript.applyRefactoring",
	"_typescript.organizeImports",
	"_typescript.applyRenameFile",
	"_typescript.applyCompletionCodeAction",
];

/// What a command handler asks the caller to do after it returns.
#[derive(Debug, Clone, Default)]
pub struct CommandOutcome {
	pub edit: Option<WorkspaceEdit>,
	/// A position the client should start an interactive rename at, set only
	/// by `_typescript.applyRefactoring` when the refactor result carries a
	/// `renameLocation` (spec §4.7).
	pub trigger_rename_at: Option<(Uri, Position)>,
}

fn edits_to_workspace_edit(file_edits: &[TsFileCodeEdits]) -> Result<WorkspaceEdit> {
	let mut changes: HashMap<Uri, Vec<TextEdit>> = HashMap::new();
	for file_edit in file_edits {
		let uri = crate::uri::path_to_uri(Path::new(&file_edit.file_name))?;
		let edits = changes.entry(uri).or_default();
		for change in &file_edit.text_changes {
			edits.push(translate::to_text_edit(change.span, change.new_text.clone()));
		}
	}
	Ok(WorkspaceEdit { changes: Some(changes), document_changes: None, change_annotations: None })
}

impl Dispatcher {
	/// Dispatches one `workspace/executeCommand` call by name (spec §4.7).
	pub async fn execute_command(&mut self, command: &str, arguments: &[Value]) -> Result<CommandOutcome> {
		match command {
			"_typescript.applyWorkspaceEdit" => self.apply_workspace_edit(arguments),
			"_typescript.applyCodeAction" => self.apply_code_action(arguments).await,
			"_typescript.applyRefactoring" => self.apply_refactoring(arguments).await,
			"_typescript.organizeImports" => self.organize_imports(arguments).await,
			"_typescript.applyRenameFile" => self.apply_rename_file(arguments).await,
			_ => Ok(CommandOutcome::default()),
		}
	}

	fn apply_workspace_edit(&self, arguments: &[Value]) -> Result<CommandOutcome> {
		let edit = arguments.first().and_then(|v| serde_json::from_value::<WorkspaceEdit>(v.clone()).ok());
		Ok(CommandOutcome { edit, trigger_rename_at: None })
	}

	/// `_typescript.applyCodeAction`: applies a `CodeFixAction`'s changes,
	/// then runs any attached commands via `applyCodeActionCommand` (spec §4.7).
	async fn apply_code_action(&mut self, arguments: &[Value]) -> Result<CommandOutcome> {
		let Some(fix) = arguments.first().and_then(|v| serde_json::from_value::<crate::ts_types::CodeFixAction>(v.clone()).ok()) else {
			return Ok(CommandOutcome::default());
		};
		let edit = edits_to_workspace_edit(&fix.changes)?;
		if let Some(commands) = &fix.commands {
			for command in commands {
				let _ = self.transport.request(ts_commands::APPLY_CODE_ACTION_COMMAND, Some(json!({ "action": command })), None).await;
			}
		}
		Ok(CommandOutcome { edit: Some(edit), trigger_rename_at: None })
	}

	/// `_typescript.applyRefactoring`: `getEditsForRefactor`, applies the
	/// result, and surfaces a client-side rename trigger when present
	/// (spec §4.7).
	async fn apply_refactoring(&mut self, arguments: &[Value]) -> Result<CommandOutcome> {
		let [file, range_args, refactor_name, action_name] = arguments else {
			return Ok(CommandOutcome::default());
		};
		let mut args = range_args.clone();
		args["refactor"] = refactor_name.clone();
		args["action"] = action_name.clone();

		let body = self.transport.request(ts_commands::GET_EDITS_FOR_REFACTOR, Some(args), None).await?;
		let info: RefactorEditInfo = serde_json::from_value(body)?;
		let edit = edits_to_workspace_edit(&info.edits)?;

		let trigger_rename_at = match (&info.rename_filename, info.rename_location) {
			(Some(rename_file), Some(location)) => {
				let uri = crate::uri::path_to_uri(Path::new(rename_file))?;
				Some((uri, translate::to_position(location)))
			}
			_ => None,
		};
		let _ = file;
		Ok(CommandOutcome { edit: Some(edit), trigger_rename_at })
	}

	/// `_typescript.organizeImports` (spec §4.7, §8 scenario 6).
	async fn organize_imports(&mut self, arguments: &[Value]) -> Result<CommandOutcome> {
		let Some(file) = arguments.first().and_then(Value::as_str) else {
			return Ok(CommandOutcome::default());
		};
		let body = self
			.transport
			.request(ts_commands::ORGANIZE_IMPORTS, Some(json!({ "scope": { "type": "file", "args": { "file": file } } })), None)
			.await?;
		let edits: Vec<TsFileCodeEdits> = serde_json::from_value(body)?;
		Ok(CommandOutcome { edit: Some(edits_to_workspace_edit(&edits)?), trigger_rename_at: None })
	}

	/// `_typescript.applyRenameFile` (spec §4.7).
	async fn apply_rename_file(&mut self, arguments: &[Value]) -> Result<CommandOutcome> {
		let [Value::String(old_path), Value::String(new_path)] = arguments else {
			return Ok(CommandOutcome::default());
		};
		let body = self
			.transport
			.request(ts_commands::GET_EDITS_FOR_FILE_RENAME, Some(json!({ "oldFilePath": old_path, "newFilePath": new_path })), None)
			.await?;
		let edits: Vec<TsFileCodeEdits> = serde_json::from_value(body)?;
		Ok(CommandOutcome { edit: Some(edits_to_workspace_edit(&edits)?), trigger_rename_at: None })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn commands_match_spec_six_four() {
		assert_eq!(
			COMMANDS,
			&[
				"_typescript.applyWorkspaceEdit",
				"_typescript.applyCodeAction",
				"_typescript.applyRefactoring",
				"_typescript.organizeImports",
				"_typescript.applyRenameFile",
				"_typescript.applyCompletionCodeAction",
			]
		);
	}
}
