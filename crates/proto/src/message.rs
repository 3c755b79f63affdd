use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Seq;

/// An outbound message to tsserver: `{"seq":N,"type":"request","command":C,"arguments":A}`.
///
/// Used both for requests that expect a correlated [`Response`] and for
/// fire-and-forget notifications (spec §4.3) — tsserver does not
/// distinguish the two at the wire level, only by whether the command name
/// is one that replies.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
	pub seq: Seq,
	#[serde(rename = "type")]
	pub kind: RequestKind,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub arguments: Option<Value>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
	Request,
}

impl Request {
	#[must_use]
	pub fn new(seq: Seq, command: impl Into<String>, arguments: Option<Value>) -> Self {
		Self {
			seq,
			kind: RequestKind::Request,
			command: command.into(),
			arguments,
		}
	}

	/// Serializes this request as a single newline-terminated JSON line,
	/// the exact framing tsserver expects on stdin (spec §4.3, §6.2).
	pub fn to_line(&self) -> Result<String, serde_json::Error> {
		let mut line = serde_json::to_string(self)?;
		line.push('\n');
		Ok(line)
	}
}

/// An inbound message read from tsserver's stdout: either a correlated
/// [`Response`] or an unsolicited [`Event`] (spec §6.2).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
	Response(Response),
	Event(Event),
}

/// `{"type":"response","request_seq":N,"success":bool,"body"?:...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
	pub request_seq: Seq,
	#[serde(default)]
	pub command: String,
	pub success: bool,
	#[serde(default)]
	pub message: Option<String>,
	#[serde(default)]
	pub body: Option<Value>,
}

impl Response {
	/// Decodes the response body into `T`, or fails with the server's
	/// `message` if `success` was false (spec §7, "Command failure").
	pub fn into_body(self) -> ResponseBody {
		if self.success {
			ResponseBody::Ok(self.body.unwrap_or(Value::Null))
		} else {
			ResponseBody::Err(self.message.unwrap_or_else(|| "tsserver request failed".to_string()))
		}
	}
}

/// The decoded outcome of a [`Response`]: success body or failure message.
#[derive(Debug, Clone)]
pub enum ResponseBody {
	Ok(Value),
	Err(String),
}

/// `{"type":"event","event":name,"body"?:...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
	pub event: String,
	#[serde(default)]
	pub body: Option<Value>,
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn request_serializes_with_expected_shape() {
		let req = Request::new(Seq(3), "open", Some(json!({"file": "/a.ts"})));
		let line = req.to_line().unwrap();
		assert!(line.ends_with('\n'));
		let value: Value = serde_json::from_str(line.trim_end()).unwrap();
		assert_eq!(value["seq"], 3);
		assert_eq!(value["type"], "request");
		assert_eq!(value["command"], "open");
		assert_eq!(value["arguments"]["file"], "/a.ts");
	}

	#[test]
	fn request_without_arguments_omits_the_field() {
		let req = Request::new(Seq(1), "geterr", None);
		let line = req.to_line().unwrap();
		let value: Value = serde_json::from_str(line.trim_end()).unwrap();
		assert!(value.get("arguments").is_none());
	}

	#[test]
	fn response_parses_as_server_message() {
		let raw = r#"{"type":"response","request_seq":5,"success":true,"command":"quickinfo","body":{"a":1}}"#;
		let msg: ServerMessage = serde_json::from_str(raw).unwrap();
		match msg {
			ServerMessage::Response(resp) => {
				assert_eq!(resp.request_seq, Seq(5));
				assert!(resp.success);
				assert_eq!(resp.body.unwrap()["a"], 1);
			}
			ServerMessage::Event(_) => panic!("expected response"),
		}
	}

	#[test]
	fn event_parses_as_server_message() {
		let raw = r#"{"type":"event","event":"semanticDiag","body":{"file":"/a.ts","diagnostics":[]}}"#;
		let msg: ServerMessage = serde_json::from_str(raw).unwrap();
		match msg {
			ServerMessage::Event(event) => {
				assert_eq!(event.event, "semanticDiag");
				assert_eq!(event.body.unwrap()["file"], "/a.ts");
			}
			ServerMessage::Response(_) => panic!("expected event"),
		}
	}

	#[test]
	fn failed_response_decodes_to_err() {
		let raw = r#"{"type":"response","request_seq":1,"success":false,"message":"No content available."}"#;
		let ServerMessage::Response(resp) = serde_json::from_str(raw).unwrap() else {
			panic!("expected response");
		};
		match resp.into_body() {
			ResponseBody::Err(msg) => assert_eq!(msg, "No content available."),
			ResponseBody::Ok(_) => panic!("expected failure"),
		}
	}
}
