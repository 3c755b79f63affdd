//! Fixed tsserver ↔ LSP enum mappings (spec §6.3).

use lsp_types::{CompletionItemKind, SymbolKind};

/// tsserver completion-entry `kind` string → LSP [`CompletionItemKind`].
#[must_use]
pub fn completion_kind(kind: &str) -> CompletionItemKind {
	match kind {
		"primitiveType" | "keyword" => CompletionItemKind::KEYWORD,
		"constElement" | "string" => CompletionItemKind::CONSTANT,
		"letElement" | "variableElement" | "localVariableElement" | "alias" => CompletionItemKind::VARIABLE,
		"memberVariableElement" | "memberGetAccessorElement" | "memberSetAccessorElement" => CompletionItemKind::FIELD,
		"functionElement" => CompletionItemKind::FUNCTION,
		"memberFunctionElement" | "constructSignatureElement" | "callSignatureElement" | "indexSignatureElement" => {
			CompletionItemKind::METHOD
		}
		"enumElement" => CompletionItemKind::ENUM,
		"moduleElement" | "externalModuleName" => CompletionItemKind::MODULE,
		"classElement" | "typeElement" => CompletionItemKind::CLASS,
		"interfaceElement" => CompletionItemKind::INTERFACE,
		"warning" | "scriptElement" => CompletionItemKind::FILE,
		"directory" => CompletionItemKind::FOLDER,
		_ => CompletionItemKind::PROPERTY,
	}
}

/// tsserver navtree/navto `kind` string → LSP [`SymbolKind`].
#[must_use]
pub fn symbol_kind(kind: &str) -> SymbolKind {
	match kind {
		"class" => SymbolKind::CLASS,
		"interface" => SymbolKind::INTERFACE,
		"enum" => SymbolKind::ENUM,
		"module" => SymbolKind::MODULE,
		"method" => SymbolKind::METHOD,
		"property" | "getset" => SymbolKind::PROPERTY,
		"memberVariable" | "parameter" | "local var" => SymbolKind::FIELD,
		"var" | "let" | "const" => SymbolKind::VARIABLE,
		"constructor" => SymbolKind::CONSTRUCTOR,
		"function" | "local function" => SymbolKind::FUNCTION,
		"script" | "module file" => SymbolKind::FILE,
		_ => SymbolKind::VARIABLE,
	}
}

/// Commit characters for a completion entry, keyed by its tsserver `kind`
/// (spec §4.5 step 2).
#[must_use]
pub fn commit_characters(kind: &str) -> &'static [&'static str] {
	match kind {
		"memberGetAccessorElement" | "memberSetAccessorElement" | "constructSignatureElement" | "callSignatureElement"
		| "indexSignatureElement" | "enumElement" | "interfaceElement" => &["."],
		"moduleElement" | "alias" | "constElement" | "letElement" | "variableElement" | "localVariableElement"
		| "memberVariableElement" | "classElement" | "functionElement" | "memberFunctionElement" => &[".", ",", "("],
		_ => &[],
	}
}

/// Kind modifiers of interest (spec §6.3).
pub mod modifiers {
	pub const OPTIONAL: &str = "optional";
	pub const DEPRECATED: &str = "deprecated";
	pub const DECLARE_FILE: &str = ".d.ts";
	pub const TS_FILE: &str = ".ts";
	pub const TSX_FILE: &str = ".tsx";
	pub const JS_FILE: &str = ".js";
	pub const JSX_FILE: &str = ".jsx";

	pub const FILE_EXTENSIONS: &[&str] = &[DECLARE_FILE, TS_FILE, TSX_FILE, JS_FILE, JSX_FILE];

	#[must_use]
	pub fn split(kind_modifiers: &str) -> impl Iterator<Item = &str> {
		kind_modifiers.split(',').map(str::trim).filter(|s| !s.is_empty())
	}

	#[must_use]
	pub fn has(kind_modifiers: &str, modifier: &str) -> bool {
		split(kind_modifiers).any(|m| m == modifier)
	}

	#[must_use]
	pub fn file_extension(kind_modifiers: &str) -> Option<&'static str> {
		split(kind_modifiers).find_map(|m| FILE_EXTENSIONS.iter().find(|ext| **ext == m).copied())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn maps_known_completion_kinds() {
		assert_eq!(completion_kind("keyword"), CompletionItemKind::KEYWORD);
		assert_eq!(completion_kind("memberFunctionElement"), CompletionItemKind::METHOD);
		assert_eq!(completion_kind("directory"), CompletionItemKind::FOLDER);
	}

	#[test]
	fn falls_back_to_property_for_unknown_kinds() {
		assert_eq!(completion_kind("somethingNew"), CompletionItemKind::PROPERTY);
	}

	#[test]
	fn commit_characters_groups_match_spec() {
		assert_eq!(commit_characters("interfaceElement"), &["."]);
		assert_eq!(commit_characters("classElement"), &[".", ",", "("]);
		assert!(commit_characters("keyword").is_empty());
	}

	#[test]
	fn modifiers_split_handles_multiple_flags() {
		assert!(modifiers::has("export,optional", "optional"));
		assert_eq!(modifiers::file_extension("export,.d.ts"), Some(".d.ts"));
		assert_eq!(modifiers::file_extension("export"), None);
	}
}
