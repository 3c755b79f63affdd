//! C5: per-file diagnostic aggregation (spec §3 `DiagnosticBucket`, §4.4).
//!
//! Pure bookkeeping — debouncing the `geterr` request loop is the
//! dispatcher's job (C7); this module only remembers the last diagnostics
//! of each kind per file and decides when a publish is due.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lsp_types::{Diagnostic, DiagnosticRelatedInformation, DiagnosticSeverity, NumberOrString, Uri};

use crate::ts_types::TsDiagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
	Syntax,
	Semantic,
	Suggestion,
}

#[derive(Debug, Default)]
struct Buckets {
	syntax: Vec<Diagnostic>,
	semantic: Vec<Diagnostic>,
	suggestion: Vec<Diagnostic>,
}

impl Buckets {
	/// Publication order is fixed: syntax, then semantic, then suggestion
	/// (spec §3 `DiagnosticBucket`).
	fn concat(&self) -> Vec<Diagnostic> {
		let mut all = Vec::with_capacity(self.syntax.len() + self.semantic.len() + self.suggestion.len());
		all.extend(self.syntax.iter().cloned());
		all.extend(self.semantic.iter().cloned());
		all.extend(self.suggestion.iter().cloned());
		all
	}
}

/// Aggregates `semanticDiag`/`syntaxDiag`/`suggestionDiag` events into one
/// published list per file.
#[derive(Debug, Default)]
pub struct DiagnosticQueue {
	files: HashMap<PathBuf, Buckets>,
}

impl DiagnosticQueue {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the bucket for `(file, kind)` and returns the file's new
	/// published list — always called, even when the list happens to be
	/// unchanged, since this queue never know the caller's prior state.
	pub fn update(&mut self, file: &Path, kind: DiagnosticKind, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
		let buckets = self.files.entry(file.to_path_buf()).or_default();
		match kind {
			DiagnosticKind::Syntax => buckets.syntax = diagnostics,
			DiagnosticKind::Semantic => buckets.semantic = diagnostics,
			DiagnosticKind::Suggestion => buckets.suggestion = diagnostics,
		}
		buckets.concat()
	}

	/// Clears all buckets for a closed file; callers publish an empty list
	/// for its uri afterwards (spec §8 P2).
	pub fn clear(&mut self, file: &Path) {
		self.files.remove(file);
	}
}

/// Converts one tsserver diagnostic into an LSP [`Diagnostic`] (spec §4.4).
#[must_use]
pub fn to_lsp_diagnostic(diag: &TsDiagnostic, severity: DiagnosticSeverity, uri: &Uri) -> Diagnostic {
	Diagnostic {
		range: crate::translate::as_range(crate::ts_types::TextSpan { start: diag.start, end: diag.end }),
		severity: Some(severity),
		code: diag.code.map(|c| NumberOrString::Number(c as i32)),
		code_description: None,
		source: Some("tsserver".to_string()),
		message: diag.text.clone(),
		related_information: related_information(diag, uri),
		tags: None,
		data: None,
	}
}

/// tsserver reports a plain category string; there is no "hint" bucket, so
/// anything unrecognized degrades to `Information` rather than being dropped.
#[must_use]
pub fn severity_for_category(category: &str) -> DiagnosticSeverity {
	match category {
		"error" => DiagnosticSeverity::ERROR,
		"warning" => DiagnosticSeverity::WARNING,
		"suggestion" => DiagnosticSeverity::HINT,
		_ => DiagnosticSeverity::INFORMATION,
	}
}

fn related_information(diag: &TsDiagnostic, fallback_uri: &Uri) -> Option<Vec<DiagnosticRelatedInformation>> {
	if diag.related_information.is_empty() {
		return None;
	}
	Some(
		diag.related_information
			.iter()
			.map(|info| {
				let (uri, range) = match &info.span {
					Some(span) => {
						let uri = crate::uri::path_to_uri(std::path::Path::new(&span.file)).unwrap_or_else(|_| fallback_uri.clone());
						let range = crate::translate::as_range(crate::ts_types::TextSpan { start: span.start, end: span.end });
						(uri, range)
					}
					None => (fallback_uri.clone(), lsp_types::Range::default()),
				};
				DiagnosticRelatedInformation {
					location: lsp_types::Location { uri, range },
					message: info.message.clone(),
				}
			})
			.collect(),
	)
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use lsp_types::Position;

	use super::*;

	fn diag(text: &str) -> Diagnostic {
		let zero = Position { line: 0, character: 0 };
		Diagnostic {
			range: lsp_types::Range { start: zero, end: zero },
			severity: None,
			code: None,
			code_description: None,
			source: None,
			message: text.to_string(),
			related_information: None,
			tags: None,
			data: None,
		}
	}

	#[test]
	fn concatenates_buckets_in_syntax_semantic_suggestion_order() {
		let mut queue = DiagnosticQueue::new();
		let path = PathBuf::from("/a.ts");
		queue.update(&path, DiagnosticKind::Semantic, vec![diag("semantic")]);
		let published = queue.update(&path, DiagnosticKind::Syntax, vec![diag("syntax")]);
		assert_eq!(published.iter().map(|d| d.message.as_str()).collect::<Vec<_>>(), vec!["syntax", "semantic"]);
	}

	#[test]
	fn update_replaces_the_same_kind_atomically() {
		let mut queue = DiagnosticQueue::new();
		let path = PathBuf::from("/a.ts");
		queue.update(&path, DiagnosticKind::Semantic, vec![diag("first")]);
		let published = queue.update(&path, DiagnosticKind::Semantic, vec![diag("second")]);
		assert_eq!(published.len(), 1);
		assert_eq!(published[0].message, "second");
	}

	#[test]
	fn clear_drops_all_buckets_for_the_file() {
		let mut queue = DiagnosticQueue::new();
		let path = PathBuf::from("/a.ts");
		queue.update(&path, DiagnosticKind::Syntax, vec![diag("x")]);
		queue.clear(&path);
		let published = queue.update(&path, DiagnosticKind::Semantic, vec![]);
		assert!(published.is_empty());
	}
}
