//! `file://` URI ↔ filesystem path conversion (spec §4.2 `uriToPath`/`pathToUri`).
//!
//! Only `file://` URIs are supported; anything else is rejected rather than
//! guessed at, matching the dispatcher's "missing/non-`file://` → empty
//! result" contract (spec §4.6).

use std::path::{Path, PathBuf};
use std::str::FromStr;

use lsp_types::Uri;

use crate::error::{Error, Result};

/// Converts a `file://` URI to an absolute filesystem path.
///
/// Percent-decodes the path component and normalizes it to the host OS's
/// separator convention via [`Path`]'s own parsing (spec §4.2).
pub fn uri_to_path(uri: &Uri) -> Result<PathBuf> {
	let url = url::Url::parse(uri.as_str()).map_err(|e| Error::InvalidUri(e.to_string()))?;
	if url.scheme() != "file" {
		return Err(Error::InvalidUri(format!("unsupported scheme: {}", url.scheme())));
	}
	url.to_file_path().map_err(|()| Error::InvalidUri(uri.as_str().to_string()))
}

/// Converts an absolute filesystem path to a `file://` URI.
pub fn path_to_uri(path: &Path) -> Result<Uri> {
	let url = url::Url::from_file_path(path).map_err(|()| Error::InvalidUri(format!("{}", path.display())))?;
	Uri::from_str(url.as_str()).map_err(|e| Error::InvalidUri(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_a_simple_path() {
		let path = PathBuf::from("/project/src/main.ts");
		let uri = path_to_uri(&path).unwrap();
		assert_eq!(uri_to_path(&uri).unwrap(), path);
	}

	#[test]
	fn round_trips_a_path_with_spaces_and_percent_decoding() {
		let path = PathBuf::from("/project/my docs/a b.ts");
		let uri = path_to_uri(&path).unwrap();
		assert!(uri.as_str().contains("%20"));
		assert_eq!(uri_to_path(&uri).unwrap(), path);
	}

	#[test]
	fn rejects_non_file_schemes() {
		let uri = Uri::from_str("untitled:Untitled-1").unwrap();
		assert!(uri_to_path(&uri).is_err());
	}
}
