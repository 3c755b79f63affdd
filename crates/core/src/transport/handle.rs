use std::process::Stdio;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tsbridge_proto::{Event, Seq};

use super::actor::Actor;
use super::cmd::Cmd;
use super::options::TsServerOptions;
use crate::error::{Error, Result};

const CMD_CHANNEL_CAPACITY: usize = 64;
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Handle to a running tsserver transport (spec §4.3 `C4`).
///
/// Cloning shares the same underlying process; every clone's `request`/
/// `notify` calls are serialized through the single actor task that owns
/// the child's stdin.
#[derive(Clone)]
pub struct TransportHandle {
	tx: mpsc::Sender<Cmd>,
}

impl TransportHandle {
	/// Spawns tsserver and starts its actor and stdout reader tasks.
	///
	/// Returns the handle plus a receiver of events tsserver emits that
	/// aren't request/response traffic (diagnostics, `requestCompleted` is
	/// consumed internally and never appears here).
	pub async fn spawn(options: &TsServerOptions) -> Result<(Self, mpsc::Receiver<Event>)> {
		let mut command = if options.is_script() {
			let mut cmd = Command::new("node");
			cmd.arg(&options.tsserver_path);
			cmd
		} else {
			Command::new(&options.tsserver_path)
		};
		command
			.args(options.to_args())
			.stdin(Stdio::piped())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.kill_on_drop(true);

		let mut child = command.spawn().map_err(|source| Error::MissingTsServer {
			path: options.tsserver_path.clone(),
			source,
		})?;

		let stdin = child.stdin.take().expect("stdin was piped");
		let stdout = child.stdout.take().expect("stdout was piped");
		let stderr = child.stderr.take().expect("stderr was piped");

		let (cmd_tx, cmd_rx) = mpsc::channel(CMD_CHANNEL_CAPACITY);
		let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

		tokio::spawn(read_stdout(stdout, cmd_tx.clone()));
		tokio::spawn(forward_stderr(stderr));

		let actor = Actor::new(cmd_rx, stdin, child, options, event_tx);
		tokio::spawn(actor.run());

		Ok((Self { tx: cmd_tx }, event_rx))
	}

	/// Fire-and-forget send; used for `open`, `close`, `change`, `saveto`
	/// (spec §4.3 `notify`).
	pub async fn notify(&self, command: impl Into<String>, arguments: Option<Value>) {
		let _ = self.tx.send(Cmd::Notify { command: command.into(), arguments }).await;
	}

	/// Sends a request and awaits its correlated response.
	///
	/// If `cancel` fires before the response arrives, an empty cancellation
	/// file is written for the request's `seq`; the response may still
	/// arrive afterwards and is returned normally. The actor removes that
	/// file once the request settles, cancelled or not (spec §4.3, §5).
	pub async fn request(
		&self,
		command: impl Into<String>,
		arguments: Option<Value>,
		cancel: Option<CancellationToken>,
	) -> Result<Value> {
		let (reply, mut reply_rx) = oneshot::channel();
		let (seq_reply, seq_rx) = oneshot::channel();
		self.tx
			.send(Cmd::Request { command: command.into(), arguments, reply, seq_reply })
			.await
			.map_err(|_| Error::TransportDead)?;
		let seq: Seq = seq_rx.await.map_err(|_| Error::TransportDead)?;

		if let Some(token) = cancel {
			tokio::select! {
				biased;
				result = &mut reply_rx => return result.map_err(|_| Error::TransportDead)?,
				() = token.cancelled() => {
					let _ = self.tx.send(Cmd::Cancel { seq }).await;
				}
			}
		}
		reply_rx.await.map_err(|_| Error::TransportDead)?
	}
}

async fn read_stdout(stdout: tokio::process::ChildStdout, cmd_tx: mpsc::Sender<Cmd>) {
	let mut lines = BufReader::new(stdout).lines();
	loop {
		match lines.next_line().await {
			Ok(Some(line)) => {
				let trimmed = line.trim();
				if trimmed.is_empty() || trimmed.starts_with("Content-Length:") {
					continue;
				}
				match serde_json::from_str(trimmed) {
					Ok(message) => {
						if cmd_tx.send(Cmd::Inbound(message)).await.is_err() {
							return;
						}
					}
					Err(err) => {
						error!(%err, line = trimmed, "malformed tsserver output line; dropping");
					}
				}
			}
			Ok(None) => break,
			Err(err) => {
				error!(%err, "error reading tsserver stdout");
				break;
			}
		}
	}
	let _ = cmd_tx.send(Cmd::ChildExited).await;
	info!("tsserver stdout closed; transport is now dead");
}

async fn forward_stderr(stderr: tokio::process::ChildStderr) {
	let mut lines = BufReader::new(stderr).lines();
	while let Ok(Some(line)) = lines.next_line().await {
		error!(target: "tsserver", "{line}");
	}
}
