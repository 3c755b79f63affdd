use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use tsbridge_proto::{Event, Request as TsRequest, Seq, SeqCounter, ServerMessage};

use super::cmd::Cmd;
use super::options::TsServerOptions;
use crate::error::{Error, Result};

struct Pending {
	reply: oneshot::Sender<Result<Value>>,
}

/// Owns the tsserver child process and serializes every write to its stdin.
///
/// Runs as a single task (spec §5 "single-threaded cooperative"); there is
/// no separate writer lock because only this task ever touches `stdin`.
pub(crate) struct Actor {
	rx: mpsc::Receiver<Cmd>,
	stdin: ChildStdin,
	child: Child,
	seq: SeqCounter,
	pending: FxHashMap<Seq, Pending>,
	cancellation_pipe_prefix: Option<String>,
	events: mpsc::Sender<Event>,
	dead: bool,
}

impl Actor {
	pub(crate) fn new(
		rx: mpsc::Receiver<Cmd>,
		stdin: ChildStdin,
		child: Child,
		options: &TsServerOptions,
		events: mpsc::Sender<Event>,
	) -> Self {
		Self {
			rx,
			stdin,
			child,
			seq: SeqCounter::new(),
			pending: FxHashMap::default(),
			cancellation_pipe_prefix: options.cancellation_pipe_prefix.clone(),
			events,
			dead: false,
		}
	}

	pub(crate) async fn run(mut self) {
		while let Some(cmd) = self.rx.recv().await {
			self.handle(cmd).await;
		}
		let _ = self.child.kill().await;
	}

	async fn handle(&mut self, cmd: Cmd) {
		match cmd {
			Cmd::Request { command, arguments, reply, seq_reply } => {
				self.handle_request(command, arguments, reply, seq_reply).await;
			}
			Cmd::Notify { command, arguments } => self.handle_notify(command, arguments).await,
			Cmd::Cancel { seq } => self.handle_cancel(seq).await,
			Cmd::Inbound(message) => self.handle_inbound(message).await,
			Cmd::ChildExited => self.handle_child_exited().await,
		}
	}

	async fn handle_request(
		&mut self,
		command: String,
		arguments: Option<Value>,
		reply: oneshot::Sender<Result<Value>>,
		seq_reply: oneshot::Sender<Seq>,
	) {
		let seq = self.seq.next();
		let _ = seq_reply.send(seq);

		if self.dead {
			let _ = reply.send(Err(Error::TransportDead));
			return;
		}
		if let Err(err) = self.write_line(TsRequest::new(seq, command, arguments)).await {
			let _ = reply.send(Err(err));
			self.fail_all_pending().await;
			return;
		}
		self.pending.insert(seq, Pending { reply });
	}

	async fn handle_notify(&mut self, command: String, arguments: Option<Value>) {
		let seq = self.seq.next();
		if self.dead {
			return;
		}
		if let Err(err) = self.write_line(TsRequest::new(seq, command, arguments)).await {
			warn!(%err, "dropping notification: transport is dead");
		}
	}

	async fn handle_cancel(&mut self, seq: Seq) {
		let Some(prefix) = &self.cancellation_pipe_prefix else {
			return;
		};
		let path = format!("{prefix}{}", seq.get());
		if let Err(err) = tokio::fs::write(&path, []).await {
			debug!(%err, path, "failed to create cancellation pipe file (best-effort)");
		}
	}

	async fn handle_inbound(&mut self, message: ServerMessage) {
		match message {
			ServerMessage::Response(response) => {
				let seq = response.request_seq;
				if let Some(pending) = self.pending.remove(&seq) {
					remove_cancellation_file(self.cancellation_pipe_prefix.as_deref(), seq).await;
					let _ = pending.reply.send(decode(response));
				} else {
					warn!(seq = seq.get(), "response for unknown or already-resolved request");
				}
			}
			ServerMessage::Event(event) => {
				if event.event == tsbridge_proto::events::REQUEST_COMPLETED {
					if let Some(seq) = request_completed_seq(&event) {
						if let Some(pending) = self.pending.remove(&seq) {
							remove_cancellation_file(self.cancellation_pipe_prefix.as_deref(), seq).await;
							let _ = pending.reply.send(Ok(Value::Null));
						}
					}
					return;
				}
				if self.events.try_send(event).is_err() {
					warn!("event channel full or closed; dropping tsserver event");
				}
			}
		}
	}

	async fn handle_child_exited(&mut self) {
		self.dead = true;
		self.fail_all_pending().await;
	}

	async fn fail_all_pending(&mut self) {
		let prefix = self.cancellation_pipe_prefix.clone();
		for (seq, pending) in self.pending.drain() {
			remove_cancellation_file(prefix.as_deref(), seq).await;
			let _ = pending.reply.send(Err(Error::TransportDead));
		}
	}

	async fn write_line(&mut self, request: TsRequest) -> Result<()> {
		let line = request.to_line()?;
		self.stdin.write_all(line.as_bytes()).await?;
		self.stdin.flush().await?;
		Ok(())
	}
}

fn decode(response: tsbridge_proto::Response) -> Result<Value> {
	match response.into_body() {
		tsbridge_proto::ResponseBody::Ok(value) => Ok(value),
		tsbridge_proto::ResponseBody::Err(message) if message == "No content available." => {
			Err(Error::NoContentAvailable)
		}
		tsbridge_proto::ResponseBody::Err(message) => Err(Error::CommandFailed(message)),
	}
}

fn request_completed_seq(event: &Event) -> Option<Seq> {
	let body = event.body.clone()?;
	serde_json::from_value::<crate::ts_types::RequestCompletedBody>(body).ok().map(|b| b.request_seq)
}

/// Removes a request's cancellation pipe file once it has settled (spec §4.3,
/// §5). Most requests are never cancelled and the file never existed; that's
/// the common, silently-ignored case.
async fn remove_cancellation_file(prefix: Option<&str>, seq: Seq) {
	let Some(prefix) = prefix else {
		return;
	};
	let path = format!("{prefix}{}", seq.get());
	let _ = tokio::fs::remove_file(&path).await;
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use tsbridge_proto::Response;

	use super::*;

	#[test]
	fn decode_maps_no_content_available_to_its_own_error() {
		let response = Response {
			request_seq: Seq(1),
			command: "completionInfo".into(),
			success: false,
			message: Some("No content available.".into()),
			body: None,
		};
		assert!(matches!(decode(response), Err(Error::NoContentAvailable)));
	}

	#[test]
	fn decode_maps_other_failures_to_command_failed() {
		let response = Response {
			request_seq: Seq(1),
			command: "rename".into(),
			success: false,
			message: Some("cannot rename this element".into()),
			body: None,
		};
		assert!(matches!(decode(response), Err(Error::CommandFailed(_))));
	}

	#[test]
	fn request_completed_seq_reads_body() {
		let event = Event { event: "requestCompleted".into(), body: Some(json!({ "request_seq": 7 })) };
		assert_eq!(request_completed_seq(&event), Some(Seq(7)));
	}

	#[tokio::test]
	async fn remove_cancellation_file_deletes_an_existing_pipe_file() {
		let dir = tempfile::tempdir().unwrap();
		let prefix = format!("{}/cancellation-", dir.path().display());
		let path = format!("{prefix}{}", 42);
		tokio::fs::write(&path, []).await.unwrap();

		remove_cancellation_file(Some(&prefix), Seq(42)).await;

		assert!(!std::path::Path::new(&path).exists());
	}

	#[tokio::test]
	async fn remove_cancellation_file_is_a_noop_when_nothing_was_written() {
		let dir = tempfile::tempdir().unwrap();
		let prefix = format!("{}/cancellation-", dir.path().display());

		remove_cancellation_file(Some(&prefix), Seq(1)).await;
	}

	#[tokio::test]
	async fn remove_cancellation_file_is_a_noop_without_a_prefix() {
		remove_cancellation_file(None, Seq(1)).await;
	}
}
