//! C1: pure arithmetic on `(line, character)` coordinates and ranges.
//!
//! Character offsets are UTF-16 code units within a line, per LSP
//! convention; nothing in this module touches document text or encodings,
//! it only orders and combines [`Position`]/[`Range`] values (spec §4.1).

use lsp_types::{Position, Range};

/// Total order on positions: earlier line wins, then earlier character.
#[must_use]
pub fn compare(a: Position, b: Position) -> std::cmp::Ordering {
	(a.line, a.character).cmp(&(b.line, b.character))
}

#[must_use]
pub fn is_before(a: Position, b: Position) -> bool {
	compare(a, b) == std::cmp::Ordering::Less
}

#[must_use]
pub fn is_before_or_equal(a: Position, b: Position) -> bool {
	compare(a, b) != std::cmp::Ordering::Greater
}

/// Smallest position of the two.
#[must_use]
pub fn min(a: Position, b: Position) -> Position {
	if is_before_or_equal(a, b) { a } else { b }
}

/// Largest position of the two.
#[must_use]
pub fn max(a: Position, b: Position) -> Position {
	if is_before_or_equal(a, b) { b } else { a }
}

/// Whether `pos` lies within `[range.start, range.end)`... except LSP
/// ranges are conventionally treated as inclusive of `end` for containment
/// checks against a cursor sitting at the boundary (e.g. "cursor just after
/// the inserted text"); this matches how the completion pipeline uses it
/// (spec §8 P7: "textEdit.range ... contains the cursor position").
#[must_use]
pub fn range_contains(range: Range, pos: Position) -> bool {
	is_before_or_equal(range.start, pos) && is_before_or_equal(pos, range.end)
}

/// True when a range's start and end share the same line.
#[must_use]
pub fn is_single_line(range: Range) -> bool {
	range.start.line == range.end.line
}

/// The smallest range containing both `a` and `b` (spec §4.5 step 5: "the
/// range is extended to the union with the dot-accessor range").
#[must_use]
pub fn union(a: Range, b: Range) -> Range {
	Range {
		start: min(a.start, b.start),
		end: max(a.end, b.end),
	}
}

/// Clamps `range`'s end to the end of its starting line, used for
/// multi-line `replacementSpan`s (spec §4.5 step 5) and folding-range
/// workarounds (spec §4.6 `foldingRanges`).
#[must_use]
pub fn clamp_to_start_line(range: Range, line_lengths: impl Fn(u32) -> u32) -> Range {
	if is_single_line(range) {
		return range;
	}
	Range {
		start: range.start,
		end: Position {
			line: range.start.line,
			character: line_lengths(range.start.line),
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pos(line: u32, character: u32) -> Position {
		Position { line, character }
	}

	#[test]
	fn compares_by_line_then_character() {
		assert!(is_before(pos(0, 5), pos(1, 0)));
		assert!(is_before(pos(2, 1), pos(2, 3)));
		assert!(!is_before(pos(2, 3), pos(2, 3)));
	}

	#[test]
	fn range_contains_is_inclusive_of_end() {
		let range = Range { start: pos(0, 0), end: pos(0, 4) };
		assert!(range_contains(range, pos(0, 0)));
		assert!(range_contains(range, pos(0, 4)));
		assert!(!range_contains(range, pos(0, 5)));
	}

	#[test]
	fn union_takes_min_start_and_max_end() {
		let a = Range { start: pos(1, 2), end: pos(1, 5) };
		let b = Range { start: pos(1, 0), end: pos(1, 3) };
		let u = union(a, b);
		assert_eq!(u.start, pos(1, 0));
		assert_eq!(u.end, pos(1, 5));
	}

	#[test]
	fn clamp_to_start_line_leaves_single_line_ranges_alone() {
		let range = Range { start: pos(2, 0), end: pos(2, 10) };
		let clamped = clamp_to_start_line(range, |_| 99);
		assert_eq!(clamped, range);
	}

	#[test]
	fn clamp_to_start_line_shrinks_multiline_ranges() {
		let range = Range { start: pos(2, 0), end: pos(5, 10) };
		let clamped = clamp_to_start_line(range, |_| 7);
		assert_eq!(clamped.start, pos(2, 0));
		assert_eq!(clamped.end, pos(2, 7));
	}
}
