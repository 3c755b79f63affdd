use std::path::PathBuf;

/// Parameters for spawning the `tsserver` child process (spec §4.3).
#[derive(Debug, Clone, Default)]
pub struct TsServerOptions {
	/// Path to the tsserver entry point. Launched via `node` when it ends in
	/// `.js`, otherwise executed directly as a native binary.
	pub tsserver_path: PathBuf,
	pub log_file: Option<PathBuf>,
	pub log_verbosity: Option<String>,
	pub global_plugins: Vec<String>,
	pub plugin_probe_locations: Vec<String>,
	/// Prefix tsserver was told to watch for cancellation files; a request
	/// is cancelled by creating an empty file `<prefix><seq>`.
	pub cancellation_pipe_prefix: Option<String>,
}

impl TsServerOptions {
	/// Command-line arguments tsserver expects, in the order the spec lists
	/// them, omitting any that weren't configured.
	#[must_use]
	pub fn to_args(&self) -> Vec<String> {
		let mut args = Vec::new();
		if let Some(log_file) = &self.log_file {
			args.push("--logFile".to_string());
			args.push(log_file.display().to_string());
		}
		if let Some(verbosity) = &self.log_verbosity {
			args.push("--logVerbosity".to_string());
			args.push(verbosity.clone());
		}
		if !self.global_plugins.is_empty() {
			args.push("--globalPlugins".to_string());
			args.push(self.global_plugins.join(","));
		}
		if !self.plugin_probe_locations.is_empty() {
			args.push("--pluginProbeLocations".to_string());
			args.push(self.plugin_probe_locations.join(","));
		}
		if let Some(prefix) = &self.cancellation_pipe_prefix {
			args.push("--cancellationPipeName".to_string());
			args.push(format!("{prefix}*"));
		}
		args
	}

	/// Whether tsserver should be launched as a `node`-loaded script rather
	/// than executed directly.
	#[must_use]
	pub fn is_script(&self) -> bool {
		self.tsserver_path.extension().is_some_and(|ext| ext == "js")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn to_args_includes_only_configured_flags() {
		let opts = TsServerOptions {
			tsserver_path: PathBuf::from("tsserver.js"),
			log_file: Some(PathBuf::from("/tmp/ts.log")),
			cancellation_pipe_prefix: Some("/tmp/cancel-".to_string()),
			..Default::default()
		};
		let args = opts.to_args();
		assert_eq!(args, vec!["--logFile", "/tmp/ts.log", "--cancellationPipeName", "/tmp/cancel-*"]);
	}

	#[test]
	fn is_script_detects_js_extension() {
		assert!(TsServerOptions { tsserver_path: PathBuf::from("a/tsserver.js"), ..Default::default() }.is_script());
		assert!(!TsServerOptions { tsserver_path: PathBuf::from("/usr/bin/tsserver"), ..Default::default() }.is_script());
	}
}
