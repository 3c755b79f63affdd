//! Typed tsserver wire shapes.
//!
//! tsserver's request `arguments` and response `body` are untyped JSON at
//! the transport boundary (spec §6.2); this module gives each shape this
//! bridge actually sends or reads a concrete Rust type, per spec §9's design
//! note to "reimplement each wire type as a tagged variant" rather than
//! relying on structural duck-typing the way the original JS source did.

use serde::{Deserialize, Serialize};

/// A 1-based tsserver line/offset pair (spec §4.2 `asRange`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TsPosition {
	pub line: u32,
	pub offset: u32,
}

/// A 1-based tsserver span, as returned in most response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
	pub start: TsPosition,
	pub end: TsPosition,
}

/// `{file, startLine, startOffset, endLine, endOffset}`, the shape most
/// range-taking tsserver requests expect (spec §4.2 `toFileRangeRequestArgs`).
#[derive(Debug, Clone, Serialize)]
pub struct FileRangeRequestArgs {
	pub file: String,
	#[serde(rename = "startLine")]
	pub start_line: u32,
	#[serde(rename = "startOffset")]
	pub start_offset: u32,
	#[serde(rename = "endLine")]
	pub end_line: u32,
	#[serde(rename = "endOffset")]
	pub end_offset: u32,
}

/// `{file, line, offset}`, used by position-only requests (`quickinfo`,
/// `definition`, `completionInfo`, ...).
#[derive(Debug, Clone, Serialize)]
pub struct FileLocationRequestArgs {
	pub file: String,
	pub line: u32,
	pub offset: u32,
}

/// A tsserver diagnostic (spec §4.4), as embedded in `semanticDiag` /
/// `syntaxDiag` / `suggestionDiag` event bodies.
#[derive(Debug, Clone, Deserialize)]
pub struct TsDiagnostic {
	pub start: TsPosition,
	pub end: TsPosition,
	pub text: String,
	#[serde(default)]
	pub code: Option<i64>,
	#[serde(default)]
	pub category: String,
	#[serde(default, rename = "relatedInformation")]
	pub related_information: Vec<TsRelatedInformation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TsRelatedInformation {
	pub message: String,
	#[serde(default)]
	pub span: Option<TsFileSpan>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TsFileSpan {
	pub file: String,
	pub start: TsPosition,
	pub end: TsPosition,
}

/// Body of `semanticDiag`/`syntaxDiag`/`suggestionDiag` events (spec §4.4).
#[derive(Debug, Clone, Deserialize)]
pub struct DiagEventBody {
	pub file: String,
	pub diagnostics: Vec<TsDiagnostic>,
}

/// Body of the `requestCompleted` event (spec §4.3).
#[derive(Debug, Clone, Deserialize)]
pub struct RequestCompletedBody {
	pub request_seq: tsbridge_proto::Seq,
}

/// A single `documentation`/`tags`-bearing display part (spec §4.2 `asPlainText`).
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolDisplayPart {
	pub text: String,
	#[serde(default)]
	pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsDocTagInfo {
	pub name: String,
	#[serde(default)]
	pub text: Option<Vec<SymbolDisplayPart>>,
}

/// One entry of a `completionInfo` response (spec §4.5 "build list").
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionEntry {
	pub name: String,
	pub kind: String,
	#[serde(default, rename = "kindModifiers")]
	pub kind_modifiers: String,
	#[serde(default, rename = "sortText")]
	pub sort_text: String,
	#[serde(default, rename = "insertText")]
	pub insert_text: Option<String>,
	#[serde(default, rename = "isRecommended")]
	pub is_recommended: bool,
	#[serde(default, rename = "replacementSpan")]
	pub replacement_span: Option<TextSpan>,
	#[serde(default, rename = "hasAction")]
	pub has_action: bool,
	#[serde(default)]
	pub source: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionInfoResponse {
	pub entries: Vec<CompletionEntry>,
}

/// The `completionItem/resolve` request payload (spec §4.5 "data").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionItemData {
	pub file: String,
	pub line: u32,
	pub offset: u32,
	#[serde(rename = "entryNames")]
	pub entry_names: Vec<EntryName>,
}

/// Either a plain completion-entry name, or `{name, source}` for an
/// auto-import candidate (spec §4.5 step 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryName {
	Plain(String),
	WithSource { name: String, source: String },
}

/// Response to `completionEntryDetails` (spec §4.5 "resolve item").
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionEntryDetails {
	#[serde(default, rename = "displayParts")]
	pub display_parts: Vec<SymbolDisplayPart>,
	#[serde(default)]
	pub documentation: Vec<SymbolDisplayPart>,
	#[serde(default)]
	pub tags: Vec<JsDocTagInfo>,
	#[serde(default, rename = "codeActions")]
	pub code_actions: Vec<TsCodeAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TsCodeAction {
	pub description: String,
	pub changes: Vec<TsFileCodeEdits>,
	#[serde(default)]
	pub commands: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TsFileCodeEdits {
	#[serde(rename = "fileName")]
	pub file_name: String,
	#[serde(rename = "textChanges")]
	pub text_changes: Vec<TsTextChange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TsTextChange {
	pub span: TextSpan,
	#[serde(rename = "newText")]
	pub new_text: String,
}

/// A tsserver `quickinfo` response (spec §4.6 `hover`).
#[derive(Debug, Clone, Deserialize)]
pub struct QuickInfoResponse {
	pub start: TsPosition,
	pub end: TsPosition,
	#[serde(rename = "displayString")]
	pub display_string: String,
	#[serde(default)]
	pub documentation: Vec<SymbolDisplayPart>,
	#[serde(default)]
	pub tags: Vec<JsDocTagInfo>,
}

/// One entry of a `definition`/`implementation`/`typeDefinition` response.
#[derive(Debug, Clone, Deserialize)]
pub struct FileSpan {
	pub file: String,
	pub start: TsPosition,
	pub end: TsPosition,
}

/// One entry of a `references` response's `refs` array.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceEntry {
	pub file: String,
	pub start: TsPosition,
	pub end: TsPosition,
	#[serde(default, rename = "isWriteAccess")]
	pub is_write_access: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferencesResponse {
	#[serde(default)]
	pub refs: Vec<ReferenceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameResponseInfo {
	#[serde(rename = "canRename")]
	pub can_rename: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameTextSpan {
	pub start: TsPosition,
	pub end: TsPosition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameSpanGroup {
	pub file: String,
	pub locs: Vec<RenameTextSpan>,
}

/// Response to the `rename` command (spec §4.6 `rename`).
#[derive(Debug, Clone, Deserialize)]
pub struct RenameResponse {
	pub info: RenameResponseInfo,
	#[serde(default)]
	pub locs: Vec<RenameSpanGroup>,
}

/// One node of a `navtree` response, recursively (spec §4.6 `documentSymbol`).
#[derive(Debug, Clone, Deserialize)]
pub struct NavigationTree {
	pub text: String,
	pub kind: String,
	#[serde(default, rename = "kindModifiers")]
	pub kind_modifiers: String,
	pub spans: Vec<TextSpan>,
	#[serde(default, rename = "nameSpan")]
	pub name_span: Option<TextSpan>,
	#[serde(default, rename = "childItems")]
	pub child_items: Vec<NavigationTree>,
}

/// One entry of a `navto` response (spec §4.6 `workspaceSymbol`).
#[derive(Debug, Clone, Deserialize)]
pub struct NavtoItem {
	pub name: String,
	pub kind: String,
	pub file: String,
	pub start: TsPosition,
	pub end: TsPosition,
	#[serde(default, rename = "containerName")]
	pub container_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignatureHelpParameter {
	#[serde(rename = "displayParts")]
	pub display_parts: Vec<SymbolDisplayPart>,
	#[serde(default)]
	pub documentation: Vec<SymbolDisplayPart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignatureHelpItem {
	#[serde(rename = "prefixDisplayParts")]
	pub prefix_display_parts: Vec<SymbolDisplayPart>,
	#[serde(rename = "suffixDisplayParts")]
	pub suffix_display_parts: Vec<SymbolDisplayPart>,
	#[serde(rename = "separatorDisplayParts")]
	pub separator_display_parts: Vec<SymbolDisplayPart>,
	pub parameters: Vec<SignatureHelpParameter>,
	#[serde(default)]
	pub documentation: Vec<SymbolDisplayPart>,
}

/// Response to `signatureHelp` (spec §4.6 `signatureHelp`).
#[derive(Debug, Clone, Deserialize)]
pub struct SignatureHelpItems {
	pub items: Vec<SignatureHelpItem>,
	#[serde(rename = "selectedItemIndex")]
	pub selected_item_index: u32,
	#[serde(rename = "argumentIndex")]
	pub argument_index: u32,
}

/// One span of a `documentHighlights` response entry (spec §4.6 `documentHighlight`).
#[derive(Debug, Clone, Deserialize)]
pub struct HighlightSpan {
	pub start: TsPosition,
	pub end: TsPosition,
	pub kind: String,
}

/// One file's worth of a `documentHighlights` response.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentHighlightsItem {
	#[serde(rename = "highlightSpans")]
	pub highlight_spans: Vec<HighlightSpan>,
}

/// One entry of a `getOutliningSpans` response (spec §4.6 `foldingRanges`).
#[derive(Debug, Clone, Deserialize)]
pub struct OutliningSpan {
	#[serde(rename = "textSpan")]
	pub text_span: TextSpan,
	pub kind: String,
}

/// One entry of a `getCodeFixes` response (spec §4.6 `codeAction`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeFixAction {
	#[serde(rename = "fixName")]
	pub fix_name: String,
	pub description: String,
	pub changes: Vec<TsFileCodeEdits>,
	#[serde(default)]
	pub commands: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefactorActionInfo {
	pub name: String,
	pub description: String,
}

/// One entry of a `getApplicableRefactors` response (spec §4.6 `codeAction`).
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicableRefactorInfo {
	pub name: String,
	pub actions: Vec<RefactorActionInfo>,
}

/// Response to `getEditsForRefactor` (spec §4.7 `_typescript.applyRefactoring`).
#[derive(Debug, Clone, Deserialize)]
pub struct RefactorEditInfo {
	pub edits: Vec<TsFileCodeEdits>,
	#[serde(default, rename = "renameFilename")]
	pub rename_filename: Option<String>,
	#[serde(default, rename = "renameLocation")]
	pub rename_location: Option<TsPosition>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn text_span_deserializes_from_tsserver_shape() {
		let raw = r#"{"start":{"line":1,"offset":5},"end":{"line":1,"offset":9}}"#;
		let span: TextSpan = serde_json::from_str(raw).unwrap();
		assert_eq!(span.start.line, 1);
		assert_eq!(span.end.offset, 9);
	}

	#[test]
	fn file_range_request_args_serializes_with_camel_case_keys() {
		let args = FileRangeRequestArgs {
			file: "/a.ts".into(),
			start_line: 1,
			start_offset: 1,
			end_line: 1,
			end_offset: 5,
		};
		let value = serde_json::to_value(&args).unwrap();
		assert_eq!(value["startLine"], 1);
		assert_eq!(value["endOffset"], 5);
	}
}
