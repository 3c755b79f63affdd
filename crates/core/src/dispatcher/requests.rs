//! C7 read-only request handlers: translation-heavy wrappers over tsserver
//! commands (spec §4.6). Every handler resolves its uri to a path first
//! (missing/non-`file://` → empty result, spec §4.6) and wraps the tsserver
//! round-trip in the diagnostics-interrupt pair where the spec calls for it
//! (spec §5 "Reads ... call into an interrupt helper").

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use lsp_types::{
	CodeAction, CodeActionKind, CodeActionOrCommand, Command, CompletionItem, Diagnostic, DocumentHighlight,
	DocumentSymbol, DocumentSymbolResponse, Documentation, FoldingRange, FoldingRangeKind, Hover, HoverContents,
	LanguageString, Location, MarkedString, NumberOrString, ParameterInformation, ParameterLabel, Position, Range,
	SignatureHelp, SignatureInformation, SymbolInformation, TextEdit, Uri, WorkspaceEdit,
};
use regex::Regex;
use serde_json::json;
use tsbridge_proto::commands as ts_commands;

use super::{path_string, Dispatcher};
use crate::completion::{self, BuildContext, CompletionSettings, DotAccessorContext};
use crate::config;
use crate::error::{Error, Result};
use crate::kinds;
use crate::position;
use crate::translate;
use crate::ts_types::{
	ApplicableRefactorInfo, CodeFixAction, CompletionInfoResponse, DocumentHighlightsItem, FileSpan, NavigationTree,
	NavtoItem, QuickInfoResponse, ReferencesResponse, RenameResponse, SignatureHelpItems, SignatureHelpItem,
	TextSpan, TsPosition, TsTextChange, OutliningSpan,
};

/// The (informal, spec-marked-proposal) `textDocument/calls` result.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct CallsResponse {
	pub callers: Vec<Location>,
	pub callees: Vec<Location>,
}

fn dot_accessor_context(line_prefix: &str, position: Position) -> Option<DotAccessorContext> {
	static RE: OnceLock<Regex> = OnceLock::new();
	let re = RE.get_or_init(|| Regex::new(r"\??\.\s*$").expect("valid regex"));
	let matched = re.find(line_prefix)?.as_str();
	let start_character = position.character.saturating_sub(matched.encode_utf16().count() as u32);
	Some(DotAccessorContext {
		text: matched.to_string(),
		range: Range { start: Position { line: position.line, character: start_character }, end: position },
	})
}

fn to_location(file: &str, start: TsPosition, end: TsPosition) -> Result<Location> {
	translate::to_location(file, TextSpan { start, end })
}

fn build_signature(item: &SignatureHelpItem) -> SignatureInformation {
	let prefix = translate::as_plain_text(&item.prefix_display_parts);
	let suffix = translate::as_plain_text(&item.suffix_display_parts);
	let separator = translate::as_plain_text(&item.separator_display_parts);

	let mut label = prefix;
	let mut parameters = Vec::with_capacity(item.parameters.len());
	for (index, param) in item.parameters.iter().enumerate() {
		if index > 0 {
			label.push_str(&separator);
		}
		let start = label.encode_utf16().count() as u32;
		label.push_str(&translate::as_plain_text(&param.display_parts));
		let end = label.encode_utf16().count() as u32;
		parameters.push(ParameterInformation {
			label: ParameterLabel::LabelOffsets([start, end]),
			documentation: (!param.documentation.is_empty())
				.then(|| Documentation::String(translate::as_plain_text(&param.documentation))),
		});
	}
	label.push_str(&suffix);

	SignatureInformation {
		label,
		documentation: (!item.documentation.is_empty()).then(|| Documentation::String(translate::as_plain_text(&item.documentation))),
		parameters: Some(parameters),
		active_parameter: None,
	}
}

fn node_range(tree: &NavigationTree) -> Range {
	tree.spans
		.iter()
		.map(|span| translate::as_range(*span))
		.reduce(position::union)
		.unwrap_or(Range { start: Position { line: 0, character: 0 }, end: Position { line: 0, character: 0 } })
}

#[allow(deprecated)]
fn to_document_symbol(tree: &NavigationTree) -> DocumentSymbol {
	let range = node_range(tree);
	let selection_range = tree.name_span.map(translate::as_range).unwrap_or(range);
	DocumentSymbol {
		name: tree.text.clone(),
		detail: None,
		kind: kinds::symbol_kind(&tree.kind),
		tags: None,
		deprecated: None,
		range,
		selection_range,
		children: (!tree.child_items.is_empty()).then(|| tree.child_items.iter().map(to_document_symbol).collect()),
	}
}

#[allow(deprecated)]
fn flatten_symbols(tree: &NavigationTree, uri: &Uri, container: Option<&str>, out: &mut Vec<SymbolInformation>) {
	out.push(SymbolInformation {
		name: tree.text.clone(),
		kind: kinds::symbol_kind(&tree.kind),
		tags: None,
		deprecated: None,
		location: Location { uri: uri.clone(), range: node_range(tree) },
		container_name: container.map(ToString::to_string),
	});
	for child in &tree.child_items {
		flatten_symbols(child, uri, Some(&tree.text), out);
	}
}

#[allow(deprecated)]
fn navto_to_symbol(item: &NavtoItem) -> Result<SymbolInformation> {
	let uri = crate::uri::path_to_uri(Path::new(&item.file))?;
	Ok(SymbolInformation {
		name: item.name.clone(),
		kind: kinds::symbol_kind(&item.kind),
		tags: None,
		deprecated: None,
		location: Location { uri, range: translate::as_range(TextSpan { start: item.start, end: item.end }) },
		container_name: item.container_name.clone(),
	})
}

fn folding_kind(kind: &str) -> Option<FoldingRangeKind> {
	match kind {
		"comment" => Some(FoldingRangeKind::Comment),
		"imports" => Some(FoldingRangeKind::Imports),
		"region" => Some(FoldingRangeKind::Region),
		_ => None,
	}
}

fn code_fix_to_code_action(fix: &CodeFixAction) -> CodeActionOrCommand {
	CodeActionOrCommand::CodeAction(CodeAction {
		title: fix.description.clone(),
		kind: Some(CodeActionKind::QUICKFIX),
		diagnostics: None,
		edit: None,
		command: Some(Command {
			title: fix.description.clone(),
			command: "_typescript.applyCodeAction".to_string(),
			arguments: Some(vec![json!(fix)]),
		}),
		is_preferred: None,
		disabled: None,
		data: None,
	})
}

impl Dispatcher {
	/// `textDocument/completion` (spec §4.5, §4.6).
	pub async fn completion(&mut self, uri: &Uri, position: Position, line_prefix: &str) -> Result<Vec<CompletionItem>> {
		let Some(path) = self.path_of(uri) else { return Ok(Vec::new()) };
		let file = path_string(&path);
		let args = translate::to_file_location_request_args(&file, position);
		let dot_accessor = dot_accessor_context(line_prefix, position);

		self.diag_loop.interrupt();
		let result = self.transport.request(ts_commands::COMPLETION_INFO, Some(serde_json::to_value(&args)?), None).await;
		self.diag_loop.schedule([file.clone()]);

		let body = match result {
			Ok(body) => body,
			Err(Error::NoContentAvailable) => return Ok(Vec::new()),
			Err(_) => return Ok(Vec::new()),
		};
		let response: CompletionInfoResponse = serde_json::from_value(body).unwrap_or(CompletionInfoResponse { entries: Vec::new() });

		let settings = CompletionSettings {
			name_suggestions: self.options.name_suggestions,
			path_suggestions: self.options.path_suggestions,
			auto_import_suggestions: self.options.auto_import_suggestions,
		};
		let ctx = BuildContext {
			file: &file,
			position,
			line_prefix,
			char_before_cursor: line_prefix.chars().last(),
			dot_accessor: dot_accessor.as_ref(),
			settings,
		};
		let snapshot = self.documents.get(&path).cloned();
		let line_length = move |line: u32| snapshot.as_ref().map(|d| d.get_line(line).encode_utf16().count() as u32).unwrap_or(0);

		Ok(response.entries.iter().filter_map(|entry| completion::build_item(entry, &ctx, &line_length)).collect())
	}

	/// `completionItem/resolve` (spec §4.5 "resolve item").
	pub async fn completion_resolve(&mut self, mut item: CompletionItem) -> Result<CompletionItem> {
		let Some(data) = item.data.clone() else { return Ok(item) };
		let Ok(parsed) = serde_json::from_value::<crate::ts_types::CompletionItemData>(data) else { return Ok(item) };
		let Some(entry_name) = parsed.entry_names.first() else { return Ok(item) };
		let source = match entry_name {
			crate::ts_types::EntryName::WithSource { source, .. } => Some(source.clone()),
			crate::ts_types::EntryName::Plain(_) => None,
		};

		let args = json!({
			"file": parsed.file,
			"line": parsed.line,
			"offset": parsed.offset,
			"entryNames": parsed.entry_names,
		});
		self.diag_loop.interrupt();
		let result = self.transport.request(ts_commands::COMPLETION_ENTRY_DETAILS, Some(args), None).await;
		self.diag_loop.schedule([parsed.file.clone()]);
		let Ok(body) = result else { return Ok(item) };
		let Ok(details) = serde_json::from_value::<crate::ts_types::CompletionEntryDetails>(body) else { return Ok(item) };

		let resolved = completion::resolve_item(&details, &parsed.file, source.as_deref());
		if resolved.detail.is_some() {
			item.detail = resolved.detail;
		}
		if let Some(documentation) = resolved.documentation {
			item.documentation = Some(Documentation::String(documentation));
		}
		if !resolved.additional_text_edits.is_empty() {
			item.additional_text_edits = Some(resolved.additional_text_edits);
		}
		if resolved.command.is_some() {
			item.command = resolved.command;
		}
		Ok(item)
	}

	/// `textDocument/hover` (spec §4.6 `hover`).
	pub async fn hover(&mut self, uri: &Uri, position: Position) -> Result<Option<Hover>> {
		let Some(path) = self.path_of(uri) else { return Ok(None) };
		let file = path_string(&path);
		let args = translate::to_file_location_request_args(&file, position);

		self.diag_loop.interrupt();
		let result = self.transport.request(ts_commands::QUICKINFO, Some(serde_json::to_value(&args)?), None).await;
		self.diag_loop.schedule([file]);

		let body = match result {
			Ok(body) => body,
			Err(_) => return Ok(None),
		};
		let Ok(info) = serde_json::from_value::<QuickInfoResponse>(body) else { return Ok(None) };

		let tags = translate::as_tags_documentation(&info.tags);
		let documentation = translate::as_documentation(&info.documentation, &tags);
		let mut contents = vec![MarkedString::LanguageString(LanguageString {
			language: "typescript".to_string(),
			value: info.display_string.clone(),
		})];
		if !documentation.is_empty() {
			contents.push(MarkedString::String(documentation));
		}
		Ok(Some(Hover {
			contents: HoverContents::Array(contents),
			range: Some(translate::as_range(TextSpan { start: info.start, end: info.end })),
		}))
	}

	/// `textDocument/rename` (spec §4.6 `rename`).
	pub async fn rename(&mut self, uri: &Uri, position: Position, new_name: &str) -> Result<Option<WorkspaceEdit>> {
		let Some(path) = self.path_of(uri) else { return Ok(None) };
		let file = path_string(&path);
		let mut args = serde_json::to_value(translate::to_file_location_request_args(&file, position))?;
		args["findInStrings"] = json!(false);
		args["findInComments"] = json!(false);

		self.diag_loop.interrupt();
		let body = self.transport.request(ts_commands::RENAME, Some(args), None).await?;
		self.diag_loop.schedule([file]);

		let response: RenameResponse = serde_json::from_value(body)?;
		if !response.info.can_rename || response.locs.is_empty() {
			return Ok(None);
		}

		let mut changes: HashMap<Uri, Vec<TextEdit>> = HashMap::new();
		for group in response.locs {
			let uri = crate::uri::path_to_uri(Path::new(&group.file))?;
			let edits = changes.entry(uri).or_default();
			for loc in group.locs {
				edits.push(TextEdit { range: translate::as_range(TextSpan { start: loc.start, end: loc.end }), new_text: new_name.to_string() });
			}
		}
		Ok(Some(WorkspaceEdit { changes: Some(changes), document_changes: None, change_annotations: None }))
	}

	async fn location_request(&mut self, uri: &Uri, position: Position, command: &str) -> Result<Vec<Location>> {
		let Some(path) = self.path_of(uri) else { return Ok(Vec::new()) };
		let file = path_string(&path);
		let args = translate::to_file_location_request_args(&file, position);

		self.diag_loop.interrupt();
		let result = self.transport.request(command, Some(serde_json::to_value(&args)?), None).await;
		self.diag_loop.schedule([file]);

		let Ok(body) = result else { return Ok(Vec::new()) };
		let spans: Vec<FileSpan> = serde_json::from_value(body).unwrap_or_default();
		Ok(spans.into_iter().filter_map(|s| to_location(&s.file, s.start, s.end).ok()).collect())
	}

	/// `textDocument/definition` (spec §4.6).
	pub async fn definition(&mut self, uri: &Uri, position: Position) -> Result<Vec<Location>> {
		self.location_request(uri, position, ts_commands::DEFINITION).await
	}

	/// `textDocument/implementation` (spec §4.6).
	pub async fn implementation(&mut self, uri: &Uri, position: Position) -> Result<Vec<Location>> {
		self.location_request(uri, position, ts_commands::IMPLEMENTATION).await
	}

	/// `textDocument/typeDefinition` (spec §4.6).
	pub async fn type_definition(&mut self, uri: &Uri, position: Position) -> Result<Vec<Location>> {
		self.location_request(uri, position, ts_commands::TYPE_DEFINITION).await
	}

	/// `textDocument/references` (spec §4.6).
	pub async fn references(&mut self, uri: &Uri, position: Position) -> Result<Vec<Location>> {
		let Some(path) = self.path_of(uri) else { return Ok(Vec::new()) };
		let file = path_string(&path);
		let args = translate::to_file_location_request_args(&file, position);

		self.diag_loop.interrupt();
		let result = self.transport.request(ts_commands::REFERENCES, Some(serde_json::to_value(&args)?), None).await;
		self.diag_loop.schedule([file]);

		let Ok(body) = result else { return Ok(Vec::new()) };
		let response: ReferencesResponse = serde_json::from_value(body).unwrap_or_default();
		Ok(response.refs.into_iter().filter_map(|r| to_location(&r.file, r.start, r.end).ok()).collect())
	}

	/// `textDocument/documentHighlight` (spec §4.6).
	pub async fn document_highlight(&mut self, uri: &Uri, position: Position) -> Result<Vec<DocumentHighlight>> {
		let Some(path) = self.path_of(uri) else { return Ok(Vec::new()) };
		let file = path_string(&path);
		let mut args = serde_json::to_value(translate::to_file_location_request_args(&file, position))?;
		args["filesToSearch"] = json!([file.clone()]);

		self.diag_loop.interrupt();
		let result = self.transport.request(ts_commands::DOCUMENT_HIGHLIGHTS, Some(args), None).await;
		self.diag_loop.schedule([file]);

		let Ok(body) = result else { return Ok(Vec::new()) };
		let items: Vec<DocumentHighlightsItem> = serde_json::from_value(body).unwrap_or_default();
		Ok(items
			.into_iter()
			.flat_map(|item| item.highlight_spans.into_iter())
			.map(|span| translate::to_document_highlight(TextSpan { start: span.start, end: span.end }, span.kind == "writtenReference"))
			.collect())
	}

	/// `textDocument/documentSymbol` (spec §4.6).
	pub async fn document_symbol(&mut self, uri: &Uri) -> Result<DocumentSymbolResponse> {
		let Some(path) = self.path_of(uri) else { return Ok(DocumentSymbolResponse::Flat(Vec::new())) };
		let file = path_string(&path);
		let result = self.transport.request(ts_commands::NAVTREE, Some(json!({ "file": file })), None).await;
		let Ok(body) = result else { return Ok(DocumentSymbolResponse::Flat(Vec::new())) };
		let Ok(tree) = serde_json::from_value::<NavigationTree>(body) else {
			return Ok(DocumentSymbolResponse::Flat(Vec::new()));
		};

		if self.hierarchical_symbols {
			Ok(DocumentSymbolResponse::Nested(tree.child_items.iter().map(to_document_symbol).collect()))
		} else {
			let mut out = Vec::new();
			for child in &tree.child_items {
				flatten_symbols(child, uri, None, &mut out);
			}
			Ok(DocumentSymbolResponse::Flat(out))
		}
	}

	/// `workspace/symbol` (spec §4.6 `workspaceSymbol`).
	pub async fn workspace_symbol(&mut self, query: &str) -> Result<Vec<SymbolInformation>> {
		let scope_file = self
			.most_recent_document()
			.map(path_string)
			.or_else(|| self.options.workspace_root.as_ref().map(|p| path_string(p)));
		let Some(scope_file) = scope_file else { return Ok(Vec::new()) };

		let result = self.transport.request(ts_commands::NAVTO, Some(json!({ "searchValue": query, "file": scope_file })), None).await;
		let Ok(body) = result else { return Ok(Vec::new()) };
		let items: Vec<NavtoItem> = serde_json::from_value(body).unwrap_or_default();
		Ok(items.iter().filter_map(|item| navto_to_symbol(item).ok()).collect())
	}

	/// `textDocument/documentFormatting` (spec §4.6, §9 tsfmt.json open question).
	pub async fn document_formatting(&mut self, uri: &Uri, convert_tabs_to_spaces: bool, indent_size: u32) -> Result<Vec<TextEdit>> {
		let Some(path) = self.path_of(uri) else { return Ok(Vec::new()) };
		let file = path_string(&path);

		let format_options = config::resolve_format_options(self.options.workspace_root.as_deref(), convert_tabs_to_spaces, indent_size).await;
		self.transport.notify(ts_commands::CONFIGURE, Some(json!({ "formatOptions": format_options }))).await;

		let Some(doc) = self.documents.get(&path) else { return Ok(Vec::new()) };
		let last_line = doc.line_count().saturating_sub(1) as u32;
		let last_line_chars = doc.get_line(last_line).encode_utf16().count() as u32;
		let range = Range { start: Position { line: 0, character: 0 }, end: Position { line: last_line, character: last_line_chars } };
		let args = translate::to_file_range_request_args(&file, range);

		let result = self.transport.request(ts_commands::FORMAT, Some(serde_json::to_value(&args)?), None).await;
		let Ok(body) = result else { return Ok(Vec::new()) };
		let changes: Vec<TsTextChange> = serde_json::from_value(body).unwrap_or_default();
		Ok(changes.into_iter().map(|c| translate::to_text_edit(c.span, c.new_text)).collect())
	}

	/// `textDocument/signatureHelp` (spec §4.6).
	pub async fn signature_help(&mut self, uri: &Uri, position: Position) -> Result<Option<SignatureHelp>> {
		let Some(path) = self.path_of(uri) else { return Ok(None) };
		let file = path_string(&path);
		let args = translate::to_file_location_request_args(&file, position);

		self.diag_loop.interrupt();
		let result = self.transport.request(ts_commands::SIGNATURE_HELP, Some(serde_json::to_value(&args)?), None).await;
		self.diag_loop.schedule([file]);

		let Ok(body) = result else { return Ok(None) };
		let Ok(items) = serde_json::from_value::<SignatureHelpItems>(body) else { return Ok(None) };
		if items.items.is_empty() {
			return Ok(None);
		}
		Ok(Some(SignatureHelp {
			signatures: items.items.iter().map(build_signature).collect(),
			active_signature: Some(items.selected_item_index),
			active_parameter: Some(items.argument_index),
		}))
	}

	/// `textDocument/codeAction` (spec §4.6).
	pub async fn code_action(&mut self, uri: &Uri, range: Range, diagnostics: &[Diagnostic]) -> Result<Vec<CodeActionOrCommand>> {
		let Some(path) = self.path_of(uri) else { return Ok(Vec::new()) };
		let file = path_string(&path);
		let range_args = translate::to_file_range_request_args(&file, range);
		let mut actions = Vec::new();

		let error_codes: Vec<i64> = diagnostics
			.iter()
			.filter_map(|d| match &d.code {
				Some(NumberOrString::Number(n)) => Some(i64::from(*n)),
				_ => None,
			})
			.collect();
		if !error_codes.is_empty() {
			let mut args = serde_json::to_value(&range_args)?;
			args["errorCodes"] = json!(error_codes);
			if let Ok(body) = self.transport.request(ts_commands::GET_CODE_FIXES, Some(args), None).await {
				let fixes: Vec<CodeFixAction> = serde_json::from_value(body).unwrap_or_default();
				actions.extend(fixes.iter().map(code_fix_to_code_action));
			}
		}

		if let Ok(body) = self.transport.request(ts_commands::GET_APPLICABLE_REFACTORS, Some(serde_json::to_value(&range_args)?), None).await {
			let refactors: Vec<ApplicableRefactorInfo> = serde_json::from_value(body).unwrap_or_default();
			for refactor in refactors {
				for action in refactor.actions {
					actions.push(CodeActionOrCommand::Command(Command {
						title: action.description.clone(),
						command: "_typescript.applyRefactoring".to_string(),
						arguments: Some(vec![json!(file), json!(range_args), json!(refactor.name), json!(action.name)]),
					}));
				}
			}
		}

		actions.push(CodeActionOrCommand::Command(Command {
			title: "Organize Imports".to_string(),
			command: "_typescript.organizeImports".to_string(),
			arguments: Some(vec![json!(file)]),
		}));

		Ok(actions)
	}

	/// `textDocument/foldingRange` (spec §4.6 `foldingRanges`).
	pub async fn folding_ranges(&mut self, uri: &Uri) -> Result<Vec<FoldingRange>> {
		let Some(path) = self.path_of(uri) else { return Ok(Vec::new()) };
		let file = path_string(&path);
		let result = self.transport.request(ts_commands::GET_OUTLINING_SPANS, Some(json!({ "file": file })), None).await;
		let Ok(body) = result else { return Ok(Vec::new()) };
		let spans: Vec<OutliningSpan> = serde_json::from_value(body).unwrap_or_default();

		let Some(doc) = self.documents.get(&path) else { return Ok(Vec::new()) };
		let mut ranges = Vec::new();
		for span in spans {
			let range = translate::as_range(span.text_span);
			if doc.get_line(range.start.line).trim_start().starts_with("// #endregion") {
				continue;
			}
			let mut end_line = range.end.line;
			if doc.get_line(end_line).trim_end().ends_with('}') && end_line > range.start.line {
				end_line -= 1;
			}
			ranges.push(FoldingRange {
				start_line: range.start.line,
				start_character: Some(range.start.character),
				end_line,
				end_character: Some(range.end.character),
				kind: folding_kind(&span.kind),
				collapsed_text: None,
			});
		}
		Ok(ranges)
	}

	/// `textDocument/calls` (spec §4.6, marked a "hierarchy proposal" —
	/// approximated as definition-of-references/references without
	/// navtree-scoped containment filtering; see `DESIGN.md`).
	pub async fn calls(&mut self, uri: &Uri, position: Position) -> Result<CallsResponse> {
		if self.path_of(uri).is_none() {
			return Ok(CallsResponse::default());
		}
		let callers = self.references(uri, position).await.unwrap_or_default();
		let callees = self.definition(uri, position).await.unwrap_or_default();
		Ok(CallsResponse { callers, callees })
	}
}

#[cfg(test)]
mod tests {
	use std::str::FromStr;

	use lsp_types::Uri;

	use super::*;
	use crate::ts_types::TsPosition;

	fn pos(line: u32, character: u32) -> Position {
		Position { line, character }
	}

	#[test]
	fn dot_accessor_matches_a_trailing_dot() {
		let ctx = dot_accessor_context("foo.", pos(0, 4)).unwrap();
		assert_eq!(ctx.text, ".");
		assert_eq!(ctx.range, Range { start: pos(0, 3), end: pos(0, 4) });
	}

	#[test]
	fn dot_accessor_matches_a_trailing_optional_chain() {
		let ctx = dot_accessor_context("foo?.", pos(0, 5)).unwrap();
		assert_eq!(ctx.text, "?.");
	}

	#[test]
	fn dot_accessor_context_is_none_mid_identifier() {
		assert!(dot_accessor_context("foo", pos(0, 3)).is_none());
	}

	#[test]
	fn folding_kind_maps_known_names_and_drops_unknown_ones() {
		assert_eq!(folding_kind("comment"), Some(FoldingRangeKind::Comment));
		assert_eq!(folding_kind("imports"), Some(FoldingRangeKind::Imports));
		assert_eq!(folding_kind("region"), Some(FoldingRangeKind::Region));
		assert_eq!(folding_kind("code"), None);
	}

	fn span(line1: u32, off1: u32, line2: u32, off2: u32) -> TextSpan {
		TextSpan { start: TsPosition { line: line1, offset: off1 }, end: TsPosition { line: line2, offset: off2 } }
	}

	fn leaf(name: &str, sp: TextSpan) -> NavigationTree {
		NavigationTree { text: name.to_string(), kind: "function".to_string(), kind_modifiers: String::new(), spans: vec![sp], name_span: None, child_items: Vec::new() }
	}

	fn tree_with_one_child() -> NavigationTree {
		let mut root = leaf("Outer", span(1, 1, 5, 1));
		root.child_items.push(leaf("inner", span(2, 1, 2, 10)));
		root
	}

	#[test]
	fn node_range_unions_all_spans_of_a_node() {
		let mut node = leaf("multi", span(1, 1, 1, 5));
		node.spans.push(span(3, 1, 3, 5));
		let range = node_range(&node);
		assert_eq!(range.start, pos(0, 0));
		assert_eq!(range.end, pos(2, 4));
	}

	#[test]
	fn hierarchical_symbols_keep_children_nested() {
		let tree = tree_with_one_child();
		let symbol = to_document_symbol(&tree);
		assert_eq!(symbol.name, "Outer");
		let children = symbol.children.unwrap();
		assert_eq!(children.len(), 1);
		assert_eq!(children[0].name, "inner");
	}

	#[test]
	fn flat_symbols_carry_a_container_name_instead_of_nesting() {
		let tree = tree_with_one_child();
		let uri = Uri::from_str("file:///a.ts").unwrap();
		let mut out = Vec::new();
		flatten_symbols(&tree, &uri, None, &mut out);
		assert_eq!(out.len(), 2);
		assert_eq!(out[0].container_name, None);
		assert_eq!(out[1].container_name.as_deref(), Some("Outer"));
	}

	#[test]
	fn code_fix_wraps_into_an_applyable_command() {
		let fix = CodeFixAction { fix_name: "fixMissingImport".to_string(), description: "Add import".to_string(), changes: Vec::new(), commands: None };
		let action = code_fix_to_code_action(&fix);
		let CodeActionOrCommand::CodeAction(action) = action else { panic!("expected a CodeAction") };
		assert_eq!(action.title, "Add import");
		assert_eq!(action.command.unwrap().command, "_typescript.applyCodeAction");
	}
}
