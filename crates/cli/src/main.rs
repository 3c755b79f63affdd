//! `tsbridge`: the stdio-facing binary. Owns the process entry point, the
//! `Content-Length` framing loop, and the JSON-RPC method dispatch that the
//! core crate's [`Dispatcher`] doesn't know about (spec §6.5, §6.2).
//!
//! Everything protocol-shaped lives in `tsbridge`; this binary only turns
//! wire JSON into calls on it and calls back into wire JSON.

mod framing;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use lsp_types::{
	CodeActionOrCommand, CompletionItem, Diagnostic, InitializeResult, Position, PublishDiagnosticsParams, Range,
	ServerInfo, TextDocumentContentChangeEvent, Uri,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncWrite, BufReader};
use tokio::sync::mpsc;
use tsbridge::config::ServerOptions;
use tsbridge::dispatcher::Dispatcher;
use tsbridge::transport::TsServerOptions;

#[derive(Parser, Debug)]
#[command(name = "tsbridge", version, about = "LSP bridge for tsserver")]
#[command(group(ArgGroup::new("transport").multiple(false).args(["stdio", "node_ipc", "socket"])))]
struct Cli {
	/// Speak LSP over stdin/stdout. The only transport this binary actually runs.
	#[arg(long)]
	stdio: bool,

	/// Accepted for compatibility with editors that always pass a transport flag; not implemented.
	#[arg(long = "node-ipc")]
	node_ipc: bool,

	/// Accepted for compatibility; not implemented.
	#[arg(long, value_name = "PORT")]
	socket: Option<u16>,

	#[arg(long = "tsserver-path", value_name = "PATH")]
	tsserver_path: PathBuf,

	#[arg(long = "tsserver-logFile", env = "TSSERVER_LOG_FILE", value_name = "PATH")]
	tsserver_log_file: Option<PathBuf>,

	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
	tracing_subscriber::fmt()
		.with_max_level(level)
		.with_writer(std::io::stderr)
		.init();

	if !cli.stdio && !cli.node_ipc && cli.socket.is_none() {
		eprintln!("exactly one of --stdio, --node-ipc, --socket <port> is required");
		std::process::exit(1);
	}
	if !cli.stdio {
		bail!("only --stdio is implemented by this binary");
	}

	serve_stdio(cli).await
}

/// Waits on the dispatcher's diagnostics channel, or forever if it doesn't
/// exist yet (before `initialize`). Lets the channel live inside the
/// `tokio::select!` loop without special-casing the pre-initialize state.
async fn recv_publish(rx: &mut Option<mpsc::Receiver<PublishDiagnosticsParams>>) -> Option<PublishDiagnosticsParams> {
	match rx {
		Some(rx) => rx.recv().await,
		None => std::future::pending().await,
	}
}

/// The line up to `character`, measured in UTF-16 code units like every LSP
/// position (spec §4.1). `completion` needs this to recognize a dot-accessor.
fn line_prefix_at(line: &str, character: u32) -> String {
	let mut units = 0u32;
	let mut out = String::new();
	for ch in line.chars() {
		if units >= character {
			break;
		}
		units += ch.len_utf16() as u32;
		out.push(ch);
	}
	out
}

async fn send_message<W: AsyncWrite + Unpin>(out: &mut W, value: &Value) -> Result<()> {
	framing::write_message(out, value).await.context("writing a framed message to stdout")
}

async fn send_response<W: AsyncWrite + Unpin>(out: &mut W, id: Value, result: Value) -> Result<()> {
	send_message(out, &json!({ "jsonrpc": "2.0", "id": id, "result": result })).await
}

async fn send_error<W: AsyncWrite + Unpin>(out: &mut W, id: Value, code: i32, message: &str) -> Result<()> {
	send_message(out, &json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })).await
}

async fn send_notification<W: AsyncWrite + Unpin>(out: &mut W, method: &str, params: Value) -> Result<()> {
	send_message(out, &json!({ "jsonrpc": "2.0", "method": method, "params": params })).await
}

// Local wire shapes for incoming `params`. These mirror the literal
// camelCase JSON-RPC payloads directly rather than leaning on whichever
// internal field layout `lsp_types`'s own `*Params` structs happen to use,
// so nested values (`Position`, `Uri`, `Range`, ...) are still the real
// `lsp_types` types, just not behind a `TextDocumentPositionParams` we'd be
// guessing the shape of.

#[derive(Deserialize)]
struct TextDocumentIdWire {
	uri: Uri,
}

#[derive(Deserialize)]
struct TextDocumentItemWire {
	uri: Uri,
	#[serde(rename = "languageId")]
	language_id: String,
	version: i32,
	text: String,
}

#[derive(Deserialize)]
struct DidOpenWireParams {
	#[serde(rename = "textDocument")]
	text_document: TextDocumentItemWire,
}

#[derive(Deserialize)]
struct VersionedTextDocumentIdentifierWire {
	uri: Uri,
	version: i32,
}

#[derive(Deserialize)]
struct DidChangeWireParams {
	#[serde(rename = "textDocument")]
	text_document: VersionedTextDocumentIdentifierWire,
	#[serde(rename = "contentChanges")]
	content_changes: Vec<TextDocumentContentChangeEvent>,
}

#[derive(Deserialize)]
struct TextDocumentIdWireParams {
	#[serde(rename = "textDocument")]
	text_document: TextDocumentIdWire,
}

#[derive(Deserialize)]
struct PositionWireParams {
	#[serde(rename = "textDocument")]
	text_document: TextDocumentIdWire,
	position: Position,
}

#[derive(Deserialize)]
struct RenameWireParams {
	#[serde(rename = "textDocument")]
	text_document: TextDocumentIdWire,
	position: Position,
	#[serde(rename = "newName")]
	new_name: String,
}

#[derive(Deserialize)]
struct FormattingOptionsWire {
	#[serde(rename = "tabSize")]
	tab_size: u32,
	#[serde(rename = "insertSpaces")]
	insert_spaces: bool,
}

#[derive(Deserialize)]
struct FormattingWireParams {
	#[serde(rename = "textDocument")]
	text_document: TextDocumentIdWire,
	options: FormattingOptionsWire,
}

#[derive(Deserialize)]
struct CodeActionContextWire {
	diagnostics: Vec<Diagnostic>,
}

#[derive(Deserialize)]
struct CodeActionWireParams {
	#[serde(rename = "textDocument")]
	text_document: TextDocumentIdWire,
	range: Range,
	context: CodeActionContextWire,
}

#[derive(Deserialize)]
struct ExecuteCommandWireParams {
	command: String,
	#[serde(default)]
	arguments: Vec<Value>,
}

#[derive(Deserialize)]
struct WorkspaceSymbolWireParams {
	query: String,
}

#[derive(Deserialize, Default)]
struct InitializeWireParams {
	#[serde(rename = "rootUri")]
	root_uri: Option<Uri>,
	#[serde(default)]
	capabilities: Value,
}

fn wants_hierarchical_symbols(capabilities: &Value) -> bool {
	capabilities
		.pointer("/textDocument/documentSymbol/hierarchicalDocumentSymbolSupport")
		.and_then(Value::as_bool)
		.unwrap_or(false)
}

/// Holds everything that only exists once `initialize` has run.
struct Session {
	dispatcher: Dispatcher,
	next_server_request_id: u64,
}

async fn serve_stdio(cli: Cli) -> Result<()> {
	let mut stdin = BufReader::new(tokio::io::stdin());
	let mut stdout = tokio::io::stdout();

	let mut session: Option<Session> = None;
	let mut publish_rx: Option<mpsc::Receiver<PublishDiagnosticsParams>> = None;
	let mut shutdown_received = false;

	loop {
		tokio::select! {
			biased;

			diagnostic = recv_publish(&mut publish_rx) => {
				let Some(params) = diagnostic else { continue };
				send_notification(&mut stdout, "textDocument/publishDiagnostics", json!(params)).await?;
			}

			message = framing::read_message(&mut stdin) => {
				let Some(message) = message? else {
					tracing::info!("stdin closed, exiting");
					break;
				};
				let method = message.get("method").and_then(Value::as_str).map(str::to_string);
				let id = message.get("id").cloned();
				let params = message.get("params").cloned().unwrap_or(Value::Null);

				let Some(method) = method else {
					// A response to a server-initiated request we don't track replies for.
					continue;
				};

				if method == "exit" {
					std::process::exit(if shutdown_received { 0 } else { 1 });
				}

				match handle_method(&cli, &method, params, &mut session, &mut publish_rx, &mut stdout).await {
					Ok(Some(result)) => {
						if let Some(id) = id {
							send_response(&mut stdout, id, result).await?;
						}
					}
					Ok(None) => {
						if let Some(id) = id {
							send_error(&mut stdout, id, -32601, &format!("method not found: {method}")).await?;
						}
					}
					Err(err) => {
						tracing::warn!(%method, error = %err, "request failed");
						if let Some(id) = id {
							send_error(&mut stdout, id, -32603, &err.to_string()).await?;
						}
					}
				}

				if method == "shutdown" {
					shutdown_received = true;
				}
			}
		}
	}

	Ok(())
}

/// Dispatches one JSON-RPC method. `Ok(None)` means "unrecognized method";
/// the caller turns that into a `-32601` for requests and silently drops it
/// for notifications.
async fn handle_method(
	cli: &Cli,
	method: &str,
	params: Value,
	session: &mut Option<Session>,
	publish_rx: &mut Option<mpsc::Receiver<PublishDiagnosticsParams>>,
	stdout: &mut (impl AsyncWrite + Unpin),
) -> Result<Option<Value>> {
	if method == "initialize" {
		let params: InitializeWireParams = serde_json::from_value(params).unwrap_or_default();
		let workspace_root = params.root_uri.as_ref().and_then(|uri| tsbridge::uri::uri_to_path(uri).ok());
		let hierarchical = wants_hierarchical_symbols(&params.capabilities);

		let ts_options = TsServerOptions { tsserver_path: cli.tsserver_path.clone(), log_file: cli.tsserver_log_file.clone(), ..Default::default() };
		let server_options = ServerOptions::new(workspace_root);

		let (mut dispatcher, rx) = Dispatcher::new(ts_options, server_options).await?;
		let capabilities = dispatcher.capabilities(hierarchical);
		*publish_rx = Some(rx);
		*session = Some(Session { dispatcher, next_server_request_id: 1 });

		return Ok(Some(json!(InitializeResult {
			capabilities,
			server_info: Some(ServerInfo { name: "tsbridge".to_string(), version: Some(env!("CARGO_PKG_VERSION").to_string()) }),
		})));
	}

	if method == "initialized" || method == "workspace/didChangeConfiguration" {
		return Ok(Some(Value::Null));
	}

	if method == "$/cancelRequest" {
		tracing::debug!(?params, "cancelRequest received (best-effort no-op, not wired to tsserver's cancellation pipe)");
		return Ok(Some(Value::Null));
	}

	if method == "shutdown" {
		return Ok(Some(Value::Null));
	}

	let Some(session) = session else {
		tracing::warn!(%method, "request before initialize");
		return Ok(Some(Value::Null));
	};
	let dispatcher = &mut session.dispatcher;

	let result = match method {
		"textDocument/didOpen" => {
			let p: DidOpenWireParams = serde_json::from_value(params)?;
			dispatcher.did_open(&p.text_document.uri, &p.text_document.language_id, p.text_document.version, p.text_document.text).await;
			Value::Null
		}
		"textDocument/didChange" => {
			let p: DidChangeWireParams = serde_json::from_value(params)?;
			dispatcher.did_change(&p.text_document.uri, p.text_document.version, p.content_changes).await;
			Value::Null
		}
		"textDocument/didClose" => {
			let p: TextDocumentIdWireParams = serde_json::from_value(params)?;
			dispatcher.did_close(&p.text_document.uri).await;
			Value::Null
		}
		"textDocument/didSave" => {
			dispatcher.did_save();
			Value::Null
		}
		"textDocument/completion" => {
			let p: PositionWireParams = serde_json::from_value(params)?;
			let line_prefix = match tsbridge::uri::uri_to_path(&p.text_document.uri).ok() {
				Some(path) => dispatcher.document(&path).map(|doc| line_prefix_at(&doc.get_line(p.position.line), p.position.character)).unwrap_or_default(),
				None => String::new(),
			};
			json!(dispatcher.completion(&p.text_document.uri, p.position, &line_prefix).await?)
		}
		"completionItem/resolve" => {
			let item: CompletionItem = serde_json::from_value(params)?;
			json!(dispatcher.completion_resolve(item).await?)
		}
		"textDocument/hover" => {
			let p: PositionWireParams = serde_json::from_value(params)?;
			json!(dispatcher.hover(&p.text_document.uri, p.position).await?)
		}
		"textDocument/definition" => {
			let p: PositionWireParams = serde_json::from_value(params)?;
			json!(dispatcher.definition(&p.text_document.uri, p.position).await?)
		}
		"textDocument/implementation" => {
			let p: PositionWireParams = serde_json::from_value(params)?;
			json!(dispatcher.implementation(&p.text_document.uri, p.position).await?)
		}
		"textDocument/typeDefinition" => {
			let p: PositionWireParams = serde_json::from_value(params)?;
			json!(dispatcher.type_definition(&p.text_document.uri, p.position).await?)
		}
		"textDocument/references" => {
			let p: PositionWireParams = serde_json::from_value(params)?;
			json!(dispatcher.references(&p.text_document.uri, p.position).await?)
		}
		"textDocument/documentHighlight" => {
			let p: PositionWireParams = serde_json::from_value(params)?;
			json!(dispatcher.document_highlight(&p.text_document.uri, p.position).await?)
		}
		"textDocument/documentSymbol" => {
			let p: TextDocumentIdWireParams = serde_json::from_value(params)?;
			json!(dispatcher.document_symbol(&p.text_document.uri).await?)
		}
		"textDocument/rename" => {
			let p: RenameWireParams = serde_json::from_value(params)?;
			json!(dispatcher.rename(&p.text_document.uri, p.position, &p.new_name).await?)
		}
		"textDocument/documentFormatting" => {
			let p: FormattingWireParams = serde_json::from_value(params)?;
			json!(dispatcher.document_formatting(&p.text_document.uri, p.options.insert_spaces, p.options.tab_size).await?)
		}
		"textDocument/signatureHelp" => {
			let p: PositionWireParams = serde_json::from_value(params)?;
			json!(dispatcher.signature_help(&p.text_document.uri, p.position).await?)
		}
		"textDocument/codeAction" => {
			let p: CodeActionWireParams = serde_json::from_value(params)?;
			let actions: Vec<CodeActionOrCommand> = dispatcher.code_action(&p.text_document.uri, p.range, &p.context.diagnostics).await?;
			json!(actions)
		}
		"textDocument/foldingRange" => {
			let p: TextDocumentIdWireParams = serde_json::from_value(params)?;
			json!(dispatcher.folding_ranges(&p.text_document.uri).await?)
		}
		"textDocument/calls" => {
			let p: PositionWireParams = serde_json::from_value(params)?;
			json!(dispatcher.calls(&p.text_document.uri, p.position).await?)
		}
		"workspace/symbol" => {
			let p: WorkspaceSymbolWireParams = serde_json::from_value(params)?;
			json!(dispatcher.workspace_symbol(&p.query).await?)
		}
		"workspace/executeCommand" => {
			let p: ExecuteCommandWireParams = serde_json::from_value(params)?;
			let outcome = dispatcher.execute_command(&p.command, &p.arguments).await?;
			if let Some(edit) = outcome.edit {
				session.next_server_request_id += 1;
				send_message(
					stdout,
					&json!({
						"jsonrpc": "2.0",
						"id": session.next_server_request_id,
						"method": "workspace/applyEdit",
						"params": { "edit": edit },
					}),
				)
				.await?;
			}
			if let Some((uri, position)) = outcome.trigger_rename_at {
				send_notification(stdout, "_typescript.rename", json!({ "uri": uri, "position": position })).await?;
			}
			Value::Null
		}
		_ => return Ok(None),
	};
	Ok(Some(result))
}
