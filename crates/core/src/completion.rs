//! C6: the completion pipeline — build list and resolve item (spec §4.5).

use std::sync::OnceLock;

use lsp_types::{
	Command, CompletionItem, CompletionItemKind, CompletionTextEdit, InsertTextFormat, Position, Range, TextEdit,
};
use regex::Regex;
use serde_json::json;

use crate::kinds;
use crate::position::{clamp_to_start_line, is_single_line, union};
use crate::ts_types::{CompletionEntry, CompletionEntryDetails, CompletionItemData, EntryName, TsTextChange};

/// Prefix tsserver auto-import entries get in `sortText`, pushing them below
/// every same-named local candidate (spec §4.5 step 1).
const AUTO_IMPORT_SORT_PREFIX: char = '\u{ffff}';

/// The textual prefix directly before a member-completion cursor (`.` or
/// `?.`), widening both the filter text and the replacement range (spec §9
/// "dot-accessor context").
#[derive(Debug, Clone)]
pub struct DotAccessorContext {
	pub text: String,
	pub range: Range,
}

/// Feature toggles the dispatcher derives from client/workspace settings
/// (spec §4.5 step 7).
#[derive(Debug, Clone, Copy)]
pub struct CompletionSettings {
	pub name_suggestions: bool,
	pub path_suggestions: bool,
	pub auto_import_suggestions: bool,
}

impl Default for CompletionSettings {
	fn default() -> Self {
		Self { name_suggestions: true, path_suggestions: true, auto_import_suggestions: true }
	}
}

/// Everything [`build_item`] needs about the request beyond the entry
/// itself.
#[derive(Debug, Clone)]
pub struct BuildContext<'a> {
	pub file: &'a str,
	pub position: Position,
	/// Text of the current line up to (not including) the cursor.
	pub line_prefix: &'a str,
	/// Character immediately before the cursor, if any.
	pub char_before_cursor: Option<char>,
	pub dot_accessor: Option<&'a DotAccessorContext>,
	pub settings: CompletionSettings,
}

/// Regex matching a bracketed string-subscript insert text, e.g. `["abc"]`
/// (spec §4.5 step 4).
fn bracket_subscript_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r#"^\[['"](.+)['"]\]$"#).expect("valid regex"))
}

/// Translates one `completionInfo` entry into an LSP item, or `None` if it
/// should be filtered out entirely (spec §4.5 step 7).
#[must_use]
pub fn build_item(entry: &CompletionEntry, ctx: &BuildContext<'_>, line_length: impl Fn(u32) -> u32) -> Option<CompletionItem> {
	if entry.kind == "warning" && !ctx.settings.name_suggestions {
		return None;
	}
	if matches!(entry.kind.as_str(), "directory" | "script" | "externalModuleName") && !ctx.settings.path_suggestions {
		return None;
	}
	if entry.has_action && !ctx.settings.auto_import_suggestions {
		return None;
	}

	let kind = kinds::completion_kind(&entry.kind);
	let mut label = entry.name.clone();

	let mut sort_text = entry.sort_text.clone();
	if entry.source.is_some() {
		sort_text = format!("{AUTO_IMPORT_SORT_PREFIX}{sort_text}");
	}

	let insert_text_format =
		matches!(kind, CompletionItemKind::FUNCTION | CompletionItemKind::METHOD).then_some(InsertTextFormat::SNIPPET);

	let mut filter_text = filter_text_for(entry, ctx.char_before_cursor);

	let mut range = replacement_range(entry, ctx, &line_length);
	if let Some(dot) = ctx.dot_accessor {
		filter_text = Some(format!("{}{}", dot.text, filter_text.unwrap_or_default()));
		range = union(range, dot.range);
	}

	if kinds::modifiers::has(&entry.kind_modifiers, kinds::modifiers::OPTIONAL) {
		label.push('?');
	}
	let mut detail = None;
	if entry.kind == "script" {
		if let Some(ext) = kinds::modifiers::file_extension(&entry.kind_modifiers) {
			detail = Some(format!("{}{ext}", entry.name));
		}
	}

	let insert_text = entry.insert_text.clone().unwrap_or_else(|| entry.name.clone());
	let text_edit = TextEdit { range, new_text: insert_text };

	let data = CompletionItemData {
		file: ctx.file.to_string(),
		line: ctx.position.line + 1,
		offset: ctx.position.character + 1,
		entry_names: vec![match &entry.source {
			Some(source) => EntryName::WithSource { name: entry.name.clone(), source: source.clone() },
			None => EntryName::Plain(entry.name.clone()),
		}],
	};

	Some(CompletionItem {
		label,
		kind: Some(kind),
		detail,
		sort_text: Some(sort_text),
		filter_text,
		preselect: entry.is_recommended.then_some(true),
		insert_text_format,
		commit_characters: non_empty(kinds::commit_characters(&entry.kind)),
		text_edit: Some(CompletionTextEdit::Edit(text_edit)),
		data: serde_json::to_value(&data).ok(),
		..Default::default()
	})
}

fn non_empty(values: &'static [&'static str]) -> Option<Vec<String>> {
	if values.is_empty() {
		None
	} else {
		Some(values.iter().map(|s| (*s).to_string()).collect())
	}
}

/// Step 4: filter text, including the `#private` field special-casing.
fn filter_text_for(entry: &CompletionEntry, char_before_cursor: Option<char>) -> Option<String> {
	if let Some(name) = entry.name.strip_prefix('#') {
		return Some(private_field_filter_text(name, entry.insert_text.as_deref(), char_before_cursor));
	}
	let insert_text = entry.insert_text.as_deref()?;
	if insert_text.starts_with("this.") {
		return None;
	}
	if let Some(captures) = bracket_subscript_re().captures(insert_text) {
		return Some(format!(".{}", &captures[1]));
	}
	Some(insert_text.to_string())
}

fn private_field_filter_text(name_without_hash: &str, insert_text: Option<&str>, char_before_cursor: Option<char>) -> String {
	match insert_text {
		Some(insert) if insert.starts_with("this.#") => {
			if char_before_cursor == Some('#') {
				insert.to_string()
			} else {
				insert.strip_prefix("this.").expect("checked above").to_string()
			}
		}
		Some(insert) => insert.to_string(),
		None => {
			if char_before_cursor == Some('#') {
				format!("#{name_without_hash}")
			} else {
				name_without_hash.to_string()
			}
		}
	}
}

/// Step 5: the replacement range, either from `replacementSpan` or by
/// scanning backward from the cursor for the longest label prefix match.
fn replacement_range(entry: &CompletionEntry, ctx: &BuildContext<'_>, line_length: impl Fn(u32) -> u32) -> Range {
	if let Some(span) = entry.replacement_span {
		let range = crate::translate::as_range(span);
		return if is_single_line(range) { range } else { clamp_to_start_line(range, line_length) };
	}
	local_replacement_range(&entry.name, ctx.line_prefix, ctx.position)
}

fn local_replacement_range(label: &str, line_prefix: &str, position: Position) -> Range {
	let prefix_chars: Vec<char> = line_prefix.chars().collect();
	let label_chars: Vec<char> = label.chars().collect();
	let max_len = label_chars.len().min(prefix_chars.len());

	for len in (0..=max_len).rev() {
		let tail: String = prefix_chars[prefix_chars.len() - len..].iter().collect();
		let head: String = label_chars[..len].iter().collect();
		if tail.eq_ignore_ascii_case(&head) {
			let start = Position { line: position.line, character: position.character - len as u32 };
			return Range { start, end: position };
		}
	}
	Range { start: position, end: position }
}

/// The decoded result of a `completionItem/resolve` call (spec §4.5
/// "resolve item").
#[derive(Debug, Clone, Default)]
pub struct ResolvedCompletion {
	pub detail: Option<String>,
	pub documentation: Option<String>,
	pub additional_text_edits: Vec<TextEdit>,
	pub command: Option<Command>,
}

/// Translates a `completionEntryDetails` response into the fields a
/// `CompletionItem` fills in on resolve.
#[must_use]
pub fn resolve_item(details: &CompletionEntryDetails, file: &str, source: Option<&str>) -> ResolvedCompletion {
	let display = crate::translate::as_plain_text(&details.display_parts);
	let detail = match source {
		Some(source) => Some(format!("Auto import from '{source}'\n{display}")),
		None if display.is_empty() => None,
		None => Some(display),
	};

	let tags = crate::translate::as_tags_documentation(&details.tags);
	let documentation_text = crate::translate::as_documentation(&details.documentation, &tags);
	let documentation = (!documentation_text.is_empty()).then_some(documentation_text);

	let mut additional_text_edits = Vec::new();
	let mut remaining_actions = Vec::new();
	for action in &details.code_actions {
		let mut touches_other_files = false;
		for change in &action.changes {
			if change.file_name == file {
				additional_text_edits.extend(change.text_changes.iter().map(to_text_edit));
			} else {
				touches_other_files = true;
			}
		}
		let has_commands = action.commands.as_ref().is_some_and(|c| !c.is_empty());
		if touches_other_files || has_commands {
			remaining_actions.push(action.clone());
		}
	}

	let command = (!remaining_actions.is_empty()).then(|| Command {
		title: "Apply remaining code action".to_string(),
		command: "_typescript.applyCompletionCodeAction".to_string(),
		arguments: Some(vec![json!(file), json!(remaining_actions)]),
	});

	ResolvedCompletion { detail, documentation, additional_text_edits, command }
}

fn to_text_edit(change: &TsTextChange) -> TextEdit {
	crate::translate::to_text_edit(change.span, change.new_text.clone())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entry(name: &str) -> CompletionEntry {
		CompletionEntry {
			name: name.to_string(),
			kind: "memberVariableElement".to_string(),
			kind_modifiers: String::new(),
			sort_text: "0".to_string(),
			insert_text: None,
			is_recommended: false,
			replacement_span: None,
			has_action: false,
			source: None,
		}
	}

	fn ctx<'a>(file: &'a str, prefix: &'a str, position: Position) -> BuildContext<'a> {
		BuildContext {
			file,
			position,
			line_prefix: prefix,
			char_before_cursor: prefix.chars().last(),
			dot_accessor: None,
			settings: CompletionSettings::default(),
		}
	}

	#[test]
	fn filters_name_suggestions_when_disabled() {
		let mut e = entry("foo");
		e.kind = "warning".to_string();
		let mut c = ctx("/a.ts", "f", Position { line: 0, character: 1 });
		c.settings.name_suggestions = false;
		assert!(build_item(&e, &c, |_| 0).is_none());
	}

	#[test]
	fn sort_text_gets_deprioritized_for_auto_imports() {
		let mut e = entry("Foo");
		e.source = Some("./foo".to_string());
		let c = ctx("/a.ts", "Fo", Position { line: 0, character: 2 });
		let item = build_item(&e, &c, |_| 0).unwrap();
		assert!(item.sort_text.unwrap().starts_with(AUTO_IMPORT_SORT_PREFIX));
	}

	#[test]
	fn local_range_scans_backward_for_the_longest_label_prefix() {
		let range = local_replacement_range("console", "con", Position { line: 0, character: 3 });
		assert_eq!(range, Range { start: Position { line: 0, character: 0 }, end: Position { line: 0, character: 3 } });
	}

	#[test]
	fn local_range_falls_back_to_empty_range_at_cursor() {
		let range = local_replacement_range("foo", "xyz", Position { line: 0, character: 3 });
		assert_eq!(range.start, range.end);
	}

	#[test]
	fn private_field_with_this_hash_insert_and_hash_before_cursor_keeps_full_insert() {
		let text = private_field_filter_text("bar", Some("this.#bar"), Some('#'));
		assert_eq!(text, "this.#bar");
	}

	#[test]
	fn private_field_with_this_hash_insert_without_hash_before_strips_this() {
		let text = private_field_filter_text("bar", Some("this.#bar"), Some('x'));
		assert_eq!(text, "#bar");
	}

	#[test]
	fn private_field_without_insert_text_strips_hash_when_none_precedes() {
		let text = private_field_filter_text("bar", None, Some('x'));
		assert_eq!(text, "bar");
	}

	#[test]
	fn bracket_subscript_insert_becomes_dot_prefixed_filter_text() {
		let mut e = entry("abc");
		e.insert_text = Some(r#"["abc"]"#.to_string());
		let filter = filter_text_for(&e, None);
		assert_eq!(filter, Some(".abc".to_string()));
	}

	#[test]
	fn this_prefixed_insert_text_has_no_filter_text() {
		let mut e = entry("x");
		e.insert_text = Some("this.x".to_string());
		assert_eq!(filter_text_for(&e, None), None);
	}

	#[test]
	fn resolve_item_formats_auto_import_detail() {
		let details = CompletionEntryDetails {
			display_parts: vec![crate::ts_types::SymbolDisplayPart { text: "const Foo".into(), kind: "text".into() }],
			..Default::default()
		};
		let resolved = resolve_item(&details, "/a.ts", Some("./foo"));
		assert_eq!(resolved.detail.unwrap(), "Auto import from './foo'\nconst Foo");
	}

	#[test]
	fn resolve_item_splits_current_file_edits_from_remaining_actions() {
		let details = CompletionEntryDetails {
			code_actions: vec![crate::ts_types::TsCodeAction {
				description: "Add import".into(),
				changes: vec![
					crate::ts_types::TsFileCodeEdits {
						file_name: "/a.ts".into(),
						text_changes: vec![crate::ts_types::TsTextChange {
							span: crate::ts_types::TextSpan {
								start: crate::ts_types::TsPosition { line: 1, offset: 1 },
								end: crate::ts_types::TsPosition { line: 1, offset: 1 },
							},
							new_text: "import Foo from './foo';\n".into(),
						}],
					},
					crate::ts_types::TsFileCodeEdits { file_name: "/b.ts".into(), text_changes: vec![] },
				],
				commands: None,
			}],
			..Default::default()
		};
		let resolved = resolve_item(&details, "/a.ts", None);
		assert_eq!(resolved.additional_text_edits.len(), 1);
		assert!(resolved.command.is_some());
	}
}
