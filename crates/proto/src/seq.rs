use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

/// A tsserver request sequence number.
///
/// Assigned to every outbound request and notification from a single
/// process-wide counter starting at 1 (spec §3, `PendingRequest`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seq(pub u32);

impl Seq {
	#[must_use]
	pub fn get(self) -> u32 {
		self.0
	}
}

impl std::fmt::Display for Seq {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Process-unique, monotonically increasing sequence generator.
///
/// One instance is shared by the whole transport: both requests and
/// fire-and-forget notifications draw from it (spec §4.3 "Sequencing").
#[derive(Debug, Default)]
pub struct SeqCounter {
	next: AtomicU32,
}

impl SeqCounter {
	#[must_use]
	pub fn new() -> Self {
		Self { next: AtomicU32::new(1) }
	}

	/// Returns the next sequence number and advances the counter.
	pub fn next(&self) -> Seq {
		Seq(self.next.fetch_add(1, Ordering::Relaxed))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn starts_at_one_and_increases_strictly() {
		let counter = SeqCounter::new();
		let first = counter.next();
		let second = counter.next();
		assert_eq!(first, Seq(1));
		assert_eq!(second, Seq(2));
		assert!(second > first);
	}

	#[test]
	fn unique_across_many_calls() {
		let counter = SeqCounter::new();
		let seqs: Vec<_> = (0..1000).map(|_| counter.next()).collect();
		let mut sorted = seqs.clone();
		sorted.sort();
		sorted.dedup();
		assert_eq!(sorted.len(), seqs.len(), "all sequence numbers must be unique");
	}
}
