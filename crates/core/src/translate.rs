//! C3: pure LSP ↔ tsserver translation functions (spec §4.2).
//!
//! Every function here is total and side-effect free — the dispatcher (C7)
//! is the only place that talks to documents or the transport.

use lsp_types::{
	DocumentHighlight, DocumentHighlightKind, Location, Position, Range, TextEdit, Uri,
};

use crate::ts_types::{FileLocationRequestArgs, FileRangeRequestArgs, SymbolDisplayPart, TextSpan, TsPosition};
use crate::uri;

/// 1-based tsserver position → 0-based LSP position (spec §4.2 `toPosition`
/// inverse direction).
#[must_use]
pub fn to_position(pos: TsPosition) -> Position {
	Position {
		line: pos.line.saturating_sub(1),
		character: pos.offset.saturating_sub(1),
	}
}

/// 0-based LSP position → 1-based tsserver position.
#[must_use]
pub fn to_ts_position(pos: Position) -> TsPosition {
	TsPosition {
		line: pos.line + 1,
		offset: pos.character + 1,
	}
}

/// `textSpan{start,end}` → LSP [`Range`] (spec §4.2 `asRange`).
#[must_use]
pub fn as_range(span: TextSpan) -> Range {
	Range {
		start: to_position(span.start),
		end: to_position(span.end),
	}
}

/// LSP [`Range`] → `textSpan{start,end}`, the inverse of [`as_range`].
#[must_use]
pub fn to_text_span(range: Range) -> TextSpan {
	TextSpan {
		start: to_ts_position(range.start),
		end: to_ts_position(range.end),
	}
}

/// `{file, line, offset}` for position-only tsserver requests (spec §4.2 `toPosition` argument builder).
#[must_use]
pub fn to_file_location_request_args(file: &str, position: Position) -> FileLocationRequestArgs {
	let ts = to_ts_position(position);
	FileLocationRequestArgs {
		file: file.to_string(),
		line: ts.line,
		offset: ts.offset,
	}
}

/// `{file, startLine, startOffset, endLine, endOffset}`, all 1-based (spec §4.2 `toFileRangeRequestArgs`).
#[must_use]
pub fn to_file_range_request_args(file: &str, range: Range) -> FileRangeRequestArgs {
	let start = to_ts_position(range.start);
	let end = to_ts_position(range.end);
	FileRangeRequestArgs {
		file: file.to_string(),
		start_line: start.line,
		start_offset: start.offset,
		end_line: end.line,
		end_offset: end.offset,
	}
}

/// A tsserver file span plus replacement text → LSP [`Location`] (spec §4.2 `toLocation`).
pub fn to_location(file: &str, span: TextSpan) -> crate::error::Result<Location> {
	Ok(Location {
		uri: uri::path_to_uri(std::path::Path::new(file))?,
		range: as_range(span),
	})
}

/// A tsserver span + new text → LSP [`TextEdit`] (spec §4.2 `toTextEdit`).
#[must_use]
pub fn to_text_edit(span: TextSpan, new_text: impl Into<String>) -> TextEdit {
	TextEdit {
		range: as_range(span),
		new_text: new_text.into(),
	}
}

/// A reference entry span → LSP [`DocumentHighlight`] (spec §4.2 `toDocumentHighlight`).
#[must_use]
pub fn to_document_highlight(span: TextSpan, is_write_access: bool) -> DocumentHighlight {
	DocumentHighlight {
		range: as_range(span),
		kind: Some(if is_write_access {
			DocumentHighlightKind::WRITE
		} else {
			DocumentHighlightKind::READ
		}),
	}
}

/// Concatenates display-part text with newline separators (spec §4.2 `asPlainText`).
#[must_use]
pub fn as_plain_text(parts: &[SymbolDisplayPart]) -> String {
	parts.iter().map(|p| p.text.as_str()).collect::<Vec<_>>().join("")
}

/// Joins documentation parts and rendered JSDoc tags into one display string
/// (spec §4.2 `asDocumentation`).
#[must_use]
pub fn as_documentation(documentation: &[SymbolDisplayPart], tags: &str) -> String {
	let doc = as_plain_text(documentation);
	if tags.is_empty() {
		doc
	} else if doc.is_empty() {
		tags.to_string()
	} else {
		format!("{doc}\n\n{tags}")
	}
}

/// Renders JSDoc tags as `@tag text` lines, one per tag, newline-joined
/// (spec §4.2 `asTagsDocumentation`).
#[must_use]
pub fn as_tags_documentation(tags: &[crate::ts_types::JsDocTagInfo]) -> String {
	tags.iter()
		.map(|tag| {
			let text = tag
				.text
				.as_ref()
				.map(|parts| as_plain_text(parts))
				.unwrap_or_default();
			if text.is_empty() {
				format!("@{}", tag.name)
			} else {
				format!("@{} {}", tag.name, text)
			}
		})
		.collect::<Vec<_>>()
		.join("\n")
}

/// Script-kind name tsserver expects in `open{scriptKindName}`, derived from
/// the LSP `languageId` (spec §4.6 `didOpen`).
#[must_use]
pub fn script_kind_name(language_id: &str) -> &'static str {
	match language_id {
		"typescript" => "TS",
		"typescriptreact" => "TSX",
		"javascript" => "JS",
		"javascriptreact" => "JSX",
		_ => "TS",
	}
}

pub fn path_str(uri_value: &Uri) -> crate::error::Result<String> {
	Ok(uri::uri_to_path(uri_value)?.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn span(sl: u32, so: u32, el: u32, eo: u32) -> TextSpan {
		TextSpan {
			start: TsPosition { line: sl, offset: so },
			end: TsPosition { line: el, offset: eo },
		}
	}

	#[test]
	fn as_range_converts_one_based_to_zero_based() {
		let range = as_range(span(1, 1, 1, 5));
		assert_eq!(range.start, Position { line: 0, character: 0 });
		assert_eq!(range.end, Position { line: 0, character: 4 });
	}

	#[test]
	fn to_file_range_request_args_round_trips_through_as_range() {
		let range = Range {
			start: Position { line: 2, character: 3 },
			end: Position { line: 2, character: 9 },
		};
		let args = to_file_range_request_args("/a.ts", range);
		let rebuilt = as_range(TextSpan {
			start: TsPosition { line: args.start_line, offset: args.start_offset },
			end: TsPosition { line: args.end_line, offset: args.end_offset },
		});
		assert_eq!(rebuilt, range);
	}

	#[test]
	fn as_plain_text_concatenates_without_separators() {
		let parts = vec![
			SymbolDisplayPart { text: "function".into(), kind: "keyword".into() },
			SymbolDisplayPart { text: " foo()".into(), kind: "text".into() },
		];
		assert_eq!(as_plain_text(&parts), "function foo()");
	}

	#[test]
	fn as_tags_documentation_renders_at_tag_text() {
		let tags = vec![crate::ts_types::JsDocTagInfo {
			name: "param".into(),
			text: Some(vec![SymbolDisplayPart { text: "x the input".into(), kind: "text".into() }]),
		}];
		assert_eq!(as_tags_documentation(&tags), "@param x the input");
	}

	#[test]
	fn as_tags_documentation_handles_tag_without_text() {
		let tags = vec![crate::ts_types::JsDocTagInfo { name: "readonly".into(), text: None }];
		assert_eq!(as_tags_documentation(&tags), "@readonly");
	}

	#[test]
	fn script_kind_name_maps_all_four_language_ids() {
		assert_eq!(script_kind_name("typescript"), "TS");
		assert_eq!(script_kind_name("typescriptreact"), "TSX");
		assert_eq!(script_kind_name("javascript"), "JS");
		assert_eq!(script_kind_name("javascriptreact"), "JSX");
	}
}
