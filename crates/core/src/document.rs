//! C2: the open-document mirror (spec §3 `Document`/`OpenDocumentSet`, §4.1).
//!
//! Keeps tsserver's view of file buffers synchronized with incremental LSP
//! edits. Text is stored as a [`ropey::Rope`] the way the teacher workspace
//! stores buffer text throughout (`xeno-editor`, `fresh-core`); positions are
//! LSP's `(line, UTF-16 code unit)` pairs, converted to/from rope char
//! indices at the boundary.

use std::path::{Path, PathBuf};

use lru::LruCache;
use lsp_types::{Position, Range, TextDocumentContentChangeEvent};
use ropey::Rope;

use crate::error::{Error, Result};

/// One open document: its identity, language, version, and text (spec §3 `Document`).
#[derive(Debug, Clone)]
pub struct Document {
	pub path: PathBuf,
	pub language_id: String,
	pub version: i32,
	text: Rope,
}

impl Document {
	#[must_use]
	pub fn new(path: PathBuf, language_id: String, version: i32, text: &str) -> Self {
		Self {
			path,
			language_id,
			version,
			text: Rope::from_str(text),
		}
	}

	#[must_use]
	pub fn text(&self) -> String {
		self.text.to_string()
	}

	#[must_use]
	pub fn line_count(&self) -> usize {
		self.text.len_lines()
	}

	/// The text of a single 0-based line, without its line terminator.
	#[must_use]
	pub fn get_line(&self, line: u32) -> String {
		let Some(slice) = self.text.get_line(line as usize) else {
			return String::new();
		};
		let mut s = slice.to_string();
		while matches!(s.chars().last(), Some('\n' | '\r')) {
			s.pop();
		}
		s
	}

	/// The range spanning a whole 0-based line, terminator excluded.
	#[must_use]
	pub fn get_line_range(&self, line: u32) -> Range {
		let text = self.get_line(line);
		Range {
			start: Position { line, character: 0 },
			end: Position {
				line,
				character: utf16_len(&text),
			},
		}
	}

	/// Converts a `(line, UTF-16 code unit)` position to an absolute char
	/// offset into the rope (spec §4.1).
	#[must_use]
	pub fn offset_at(&self, position: Position) -> usize {
		let line = (position.line as usize).min(self.text.len_lines().saturating_sub(1));
		let line_start = self.text.line_to_char(line);
		let line_slice = self.text.line(line);
		let line_chars = line_slice.len_chars();
		let char_in_line = line_slice
			.try_utf16_cu_to_char(position.character as usize)
			.unwrap_or(line_chars)
			.min(line_chars);
		line_start + char_in_line
	}

	/// Converts an absolute char offset back into a `(line, UTF-16 code unit)` position.
	#[must_use]
	pub fn position_at(&self, offset: usize) -> Position {
		let offset = offset.min(self.text.len_chars());
		let line = self.text.char_to_line(offset);
		let line_start = self.text.line_to_char(line);
		let char_in_line = offset - line_start;
		let character = self.text.line(line).char_to_utf16_cu(char_in_line);
		Position {
			line: line as u32,
			character: character as u32,
		}
	}

	/// Applies one incremental (or full-text) change and bumps the version
	/// (spec §4.1 `applyEdit`).
	pub fn apply_change(&mut self, new_version: i32, change: &TextDocumentContentChangeEvent) {
		match change.range {
			Some(range) => {
				let start = self.offset_at(range.start);
				let end = self.offset_at(range.end);
				self.text.remove(start..end);
				self.text.insert(start, &change.text);
			}
			None => {
				self.text = Rope::from_str(&change.text);
			}
		}
		self.version = new_version;
	}

	/// The maximal run of non-whitespace characters surrounding `position`;
	/// `None` if whitespace sits on both sides (spec §4.1 `getWordRangeAtPosition`).
	#[must_use]
	pub fn get_word_range_at_position(&self, position: Position) -> Option<Range> {
		let offset = self.offset_at(position);
		let len = self.text.len_chars();

		let before_is_word = offset > 0 && !self.text.char(offset - 1).is_whitespace();
		let after_is_word = offset < len && !self.text.char(offset).is_whitespace();
		if !before_is_word && !after_is_word {
			return None;
		}

		let mut start = offset;
		while start > 0 && !self.text.char(start - 1).is_whitespace() {
			start -= 1;
		}
		let mut end = offset;
		while end < len && !self.text.char(end).is_whitespace() {
			end += 1;
		}

		Some(Range {
			start: self.position_at(start),
			end: self.position_at(end),
		})
	}
}

/// Number of UTF-16 code units a string encodes to.
fn utf16_len(s: &str) -> u32 {
	s.encode_utf16().count() as u32
}

/// Path → [`Document`], most-recently-accessed first (spec §3 `OpenDocumentSet`).
///
/// Backed by [`LruCache`], whose `get`/`get_mut` already implement the
/// "every successful `get(path)` moves the path to the front" invariant
/// (I2 in spec §3) — no separate bookkeeping needed.
pub struct OpenDocumentSet {
	documents: LruCache<PathBuf, Document>,
}

impl Default for OpenDocumentSet {
	fn default() -> Self {
		Self::new()
	}
}

impl OpenDocumentSet {
	#[must_use]
	pub fn new() -> Self {
		Self {
			documents: LruCache::unbounded(),
		}
	}

	/// Inserts a newly opened document. Returns `false` if `path` was
	/// already open (spec §3: "re-opening an already-open path is
	/// forbidden").
	pub fn open(&mut self, document: Document) -> bool {
		if self.documents.contains(&document.path) {
			return false;
		}
		self.documents.put(document.path.clone(), document);
		true
	}

	pub fn close(&mut self, path: &Path) -> Option<Document> {
		self.documents.pop(path)
	}

	pub fn is_open(&self, path: &Path) -> bool {
		self.documents.contains(path)
	}

	/// Looks up a document, promoting it to most-recently-accessed.
	pub fn get_mut(&mut self, path: &Path) -> Option<&mut Document> {
		self.documents.get_mut(path)
	}

	pub fn get(&mut self, path: &Path) -> Option<&Document> {
		self.documents.get(path)
	}

	/// Fails with [`Error::InvalidDocument`] when `path` isn't open, per
	/// spec §7.5 ("`didChange` on an unknown file ... logged and responded
	/// with an error").
	pub fn require_mut(&mut self, path: &Path) -> Result<&mut Document> {
		self.documents.get_mut(path).ok_or_else(|| Error::InvalidDocument {
			path: path.to_path_buf(),
			reason: "document is not open".to_string(),
		})
	}

	/// The most-recently-accessed open path, used by `workspace/symbol`
	/// when no file scope is given (spec §4.6 `workspaceSymbol`).
	pub fn most_recent(&self) -> Option<&Path> {
		self.documents.iter().next().map(|(path, _)| path.as_path())
	}

	pub fn len(&self) -> usize {
		self.documents.len()
	}

	pub fn is_empty(&self) -> bool {
		self.documents.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pos(line: u32, character: u32) -> Position {
		Position { line, character }
	}

	fn change(range: Option<Range>, text: &str) -> TextDocumentContentChangeEvent {
		TextDocumentContentChangeEvent {
			range,
			range_length: None,
			text: text.to_string(),
		}
	}

	#[test]
	fn offset_and_position_round_trip_across_lines() {
		let doc = Document::new(PathBuf::from("/a.ts"), "typescript".into(), 1, "let x = 1;\nlet y = 2;\n");
		let offset = doc.offset_at(pos(1, 4));
		assert_eq!(doc.position_at(offset), pos(1, 4));
	}

	#[test]
	fn apply_change_replaces_the_given_range() {
		let mut doc = Document::new(PathBuf::from("/a.ts"), "typescript".into(), 1, "x");
		doc.apply_change(2, &change(Some(Range { start: pos(0, 0), end: pos(0, 1) }), "y"));
		assert_eq!(doc.text(), "y");
		assert_eq!(doc.version, 2);
	}

	#[test]
	fn apply_change_without_range_replaces_whole_document() {
		let mut doc = Document::new(PathBuf::from("/a.ts"), "typescript".into(), 1, "old text");
		doc.apply_change(2, &change(None, "brand new"));
		assert_eq!(doc.text(), "brand new");
	}

	#[test]
	fn apply_change_handles_utf16_surrogate_pairs() {
		// "😀" is one UTF-16 surrogate pair (2 code units) but one rope char.
		let mut doc = Document::new(PathBuf::from("/a.ts"), "typescript".into(), 1, "😀x");
		let range = Range { start: pos(0, 2), end: pos(0, 3) };
		doc.apply_change(2, &change(Some(range), "y"));
		assert_eq!(doc.text(), "😀y");
	}

	#[test]
	fn word_range_returns_none_between_whitespace() {
		let doc = Document::new(PathBuf::from("/a.ts"), "typescript".into(), 1, "foo  bar");
		assert!(doc.get_word_range_at_position(pos(0, 4)).is_none());
	}

	#[test]
	fn word_range_covers_the_maximal_non_whitespace_run() {
		let doc = Document::new(PathBuf::from("/a.ts"), "typescript".into(), 1, "foo.bar baz");
		let range = doc.get_word_range_at_position(pos(0, 2)).unwrap();
		assert_eq!(range, Range { start: pos(0, 0), end: pos(0, 7) });
	}

	#[test]
	fn open_document_set_rejects_reopen_of_the_same_path() {
		let mut set = OpenDocumentSet::new();
		let path = PathBuf::from("/a.ts");
		assert!(set.open(Document::new(path.clone(), "typescript".into(), 1, "x")));
		assert!(!set.open(Document::new(path, "typescript".into(), 1, "y")));
	}

	#[test]
	fn get_promotes_to_most_recently_used() {
		let mut set = OpenDocumentSet::new();
		let a = PathBuf::from("/a.ts");
		let b = PathBuf::from("/b.ts");
		set.open(Document::new(a.clone(), "typescript".into(), 1, ""));
		set.open(Document::new(b.clone(), "typescript".into(), 1, ""));
		assert_eq!(set.most_recent(), Some(b.as_path()));
		set.get(&a);
		assert_eq!(set.most_recent(), Some(a.as_path()));
	}

	#[test]
	fn close_removes_the_document() {
		let mut set = OpenDocumentSet::new();
		let path = PathBuf::from("/a.ts");
		set.open(Document::new(path.clone(), "typescript".into(), 1, "x"));
		assert!(set.close(&path).is_some());
		assert!(!set.is_open(&path));
	}
}
