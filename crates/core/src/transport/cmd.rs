use serde_json::Value;
use tokio::sync::oneshot;
use tsbridge_proto::{Seq, ServerMessage};

use crate::error::Result;

/// Commands accepted by the transport actor.
///
/// Both the public [`super::TransportHandle`] and the stdout reader task
/// send these over the same channel, so inbound server messages are
/// interleaved with outbound commands in arrival order rather than
/// processed on a separate lock (spec §5 "one writer path ... under a
/// mutex or a serialized channel").
pub(crate) enum Cmd {
	Request {
		command: String,
		arguments: Option<Value>,
		reply: oneshot::Sender<Result<Value>>,
		seq_reply: oneshot::Sender<Seq>,
	},
	Notify {
		command: String,
		arguments: Option<Value>,
	},
	Cancel {
		seq: Seq,
	},
	Inbound(ServerMessage),
	ChildExited,
}
