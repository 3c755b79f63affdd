//! The debounced `geterr` loop (spec §5 "Diagnostics debounce loop").
//!
//! Kept separate from [`crate::diagnostics::DiagnosticQueue`] (pure
//! aggregation) and from the dispatcher's per-request handlers (which only
//! call [`DiagnosticsCoordinator::interrupt`] / `schedule`).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tsbridge_proto::commands;

use crate::transport::TransportHandle;

/// 200ms of quiescence before a scheduled `geterr` actually fires (spec §5).
pub const DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Default)]
struct State {
	dirty: HashSet<String>,
	in_flight: Option<CancellationToken>,
	generation: u64,
}

/// Ensures at most one `geterr` is outstanding at any instant (spec §8 P5),
/// debounced to 200ms of quiescence, and interruptible by read requests.
pub struct DiagnosticsCoordinator {
	transport: TransportHandle,
	debounce: Duration,
	state: Mutex<State>,
}

impl DiagnosticsCoordinator {
	#[must_use]
	pub fn new(transport: TransportHandle) -> Arc<Self> {
		Arc::new(Self { transport, debounce: DEBOUNCE, state: Mutex::new(State::default()) })
	}

	/// Marks `files` dirty and (re)starts the debounce window. Safe to call
	/// with an empty iterator to simply restart the window over whatever
	/// is already dirty (used after [`Self::interrupt`]).
	pub fn schedule(self: &Arc<Self>, files: impl IntoIterator<Item = String>) {
		let my_generation = {
			let mut state = self.state.lock();
			state.dirty.extend(files);
			state.generation += 1;
			state.generation
		};

		let this = Arc::clone(self);
		tokio::spawn(async move {
			tokio::time::sleep(this.debounce).await;
			let files: Vec<String> = {
				let mut state = this.state.lock();
				if state.generation != my_generation {
					return;
				}
				state.dirty.drain().collect()
			};
			if files.is_empty() {
				return;
			}
			this.fire(files).await;
		});
	}

	/// Cancels any in-flight `geterr` so a read request can run uncontested;
	/// the caller is responsible for calling [`Self::schedule`] again
	/// afterward (spec §5 "cancel it, run the read, then re-schedule").
	pub fn interrupt(&self) {
		if let Some(token) = self.state.lock().in_flight.take() {
			token.cancel();
		}
	}

	async fn fire(&self, files: Vec<String>) {
		let token = CancellationToken::new();
		let previous = std::mem::replace(&mut self.state.lock().in_flight, Some(token.clone()));
		if let Some(previous) = previous {
			previous.cancel();
		}
		let result = self
			.transport
			.request(commands::GETERR, Some(serde_json::json!({ "files": files })), Some(token))
			.await;
		self.state.lock().in_flight = None;
		if let Err(err) = result {
			debug!(%err, "geterr did not complete normally");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn debounce_constant_matches_spec() {
		assert_eq!(DEBOUNCE, Duration::from_millis(200));
	}
}
