//! Routes unsolicited tsserver events (diagnostics) into publishable LSP
//! notifications (spec §4.4, §6.2).

use std::path::Path;
use std::sync::Arc;

use lsp_types::PublishDiagnosticsParams;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::warn;
use tsbridge_proto::{Event, events};

use crate::diagnostics::{DiagnosticKind, DiagnosticQueue};
use crate::ts_types::DiagEventBody;

/// Consumes tsserver events until the channel closes (transport died or was
/// dropped), publishing merged diagnostics as they arrive.
pub async fn run(
	mut events: mpsc::Receiver<Event>,
	queue: Arc<Mutex<DiagnosticQueue>>,
	publish: mpsc::Sender<PublishDiagnosticsParams>,
) {
	while let Some(event) = events.recv().await {
		let kind = match event.event.as_str() {
			events::SYNTAX_DIAG => DiagnosticKind::Syntax,
			events::SEMANTIC_DIAG => DiagnosticKind::Semantic,
			events::SUGGESTION_DIAG => DiagnosticKind::Suggestion,
			other => {
				warn!(event = other, "unhandled tsserver event");
				continue;
			}
		};
		let Some(body) = event.body else { continue };
		let Ok(body) = serde_json::from_value::<DiagEventBody>(body) else {
			warn!(event = %event.event, "malformed diagnostic event body");
			continue;
		};
		publish_for_file(&queue, &publish, Path::new(&body.file), kind, body).await;
	}
}

async fn publish_for_file(
	queue: &Arc<Mutex<DiagnosticQueue>>,
	publish: &mpsc::Sender<PublishDiagnosticsParams>,
	file: &Path,
	kind: DiagnosticKind,
	body: DiagEventBody,
) {
	let Ok(uri) = crate::uri::path_to_uri(file) else {
		return;
	};
	let category_severity = |diag: &crate::ts_types::TsDiagnostic| crate::diagnostics::severity_for_category(&diag.category);
	let diagnostics = body
		.diagnostics
		.iter()
		.map(|d| crate::diagnostics::to_lsp_diagnostic(d, category_severity(d), &uri))
		.collect();

	let merged = queue.lock().update(file, kind, diagnostics);
	let _ = publish.send(PublishDiagnosticsParams { uri, diagnostics: merged, version: None }).await;
}

/// Publishes an empty diagnostics list for a closed file (spec §8 P2).
pub async fn publish_empty(queue: &Arc<Mutex<DiagnosticQueue>>, publish: &mpsc::Sender<PublishDiagnosticsParams>, file: &Path) {
	queue.lock().clear(file);
	if let Ok(uri) = crate::uri::path_to_uri(file) {
		let _ = publish.send(PublishDiagnosticsParams { uri, diagnostics: Vec::new(), version: None }).await;
	}
}
