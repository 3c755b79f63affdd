//! Ambient configuration: the fixed compiler-options default (spec §4.6
//! `initialize`) and `tsfmt.json` loading (spec §4.6 `documentFormatting`,
//! §9 open question).

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

/// Runtime options the dispatcher needs beyond what arrives per-request.
#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
	pub workspace_root: Option<PathBuf>,
	pub name_suggestions: bool,
	pub path_suggestions: bool,
	pub auto_import_suggestions: bool,
}

impl ServerOptions {
	#[must_use]
	pub fn new(workspace_root: Option<PathBuf>) -> Self {
		Self { workspace_root, name_suggestions: true, path_suggestions: true, auto_import_suggestions: true }
	}
}

/// The fixed `compilerOptionsForInferredProjects` tsserver is configured
/// with at startup (spec §4.6 `initialize`). Not user-overridable — the
/// spec pins these exact values.
#[must_use]
pub fn compiler_options_for_inferred_projects() -> Value {
	json!({
		"module": "commonjs",
		"target": "es2016",
		"jsx": "preserve",
		"allowJs": true,
		"allowSyntheticDefaultImports": true,
		"allowNonTsExtensions": true,
		"resolveJsonModule": true,
		"sourceMap": true,
		"strictNullChecks": true,
	})
}

/// Format options derived from LSP's `FormattingOptions`, used only when no
/// `tsfmt.json` is present.
#[must_use]
pub fn format_options_from_lsp(convert_tabs_to_spaces: bool, indent_size: u32) -> Value {
	json!({
		"convertTabsToSpaces": convert_tabs_to_spaces,
		"indentSize": indent_size,
		"tabSize": indent_size,
	})
}

/// Reads `<workspace root>/tsfmt.json` if present.
///
/// Per spec §9's open question, this is preserved exactly as observed in
/// the source: when present, it silently overrides whatever the LSP
/// client requested. That is flagged here, not fixed.
pub async fn read_tsfmt(workspace_root: &Path) -> Option<Value> {
	let path = workspace_root.join("tsfmt.json");
	let contents = tokio::fs::read_to_string(&path).await.ok()?;
	serde_json::from_str(&contents).ok()
}

/// Resolves `formatOptions` for a `documentFormatting` request: `tsfmt.json`
/// wins unconditionally when it exists (spec §9).
pub async fn resolve_format_options(workspace_root: Option<&Path>, convert_tabs_to_spaces: bool, indent_size: u32) -> Value {
	if let Some(root) = workspace_root {
		if let Some(tsfmt) = read_tsfmt(root).await {
			return tsfmt;
		}
	}
	format_options_from_lsp(convert_tabs_to_spaces, indent_size)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn compiler_options_match_the_pinned_defaults() {
		let opts = compiler_options_for_inferred_projects();
		assert_eq!(opts["module"], "commonjs");
		assert_eq!(opts["target"], "es2016");
		assert_eq!(opts["strictNullChecks"], true);
	}

	#[tokio::test]
	async fn resolve_format_options_prefers_tsfmt_json_when_present() {
		let dir = tempfile::tempdir().unwrap();
		tokio::fs::write(dir.path().join("tsfmt.json"), r#"{"indentSize": 2}"#).await.unwrap();
		let opts = resolve_format_options(Some(dir.path()), true, 8).await;
		assert_eq!(opts["indentSize"], 2);
	}

	#[tokio::test]
	async fn resolve_format_options_falls_back_to_lsp_options_without_tsfmt() {
		let dir = tempfile::tempdir().unwrap();
		let opts = resolve_format_options(Some(dir.path()), false, 4).await;
		assert_eq!(opts["indentSize"], 4);
		assert_eq!(opts["convertTabsToSpaces"], false);
	}
}
