//! Thinnest possible `Content-Length`-framed JSON-RPC channel over stdio.
//!
//! The LSP transport framing itself is explicitly out of scope for this
//! system (named-pipe and socket framing are not elaborated at all); this
//! gives the binary just enough of the stdio variant to be runnable.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Reads one `Content-Length`-framed message, or `None` at EOF.
pub async fn read_message<R>(reader: &mut R) -> std::io::Result<Option<Value>>
where
	R: AsyncBufRead + AsyncRead + Unpin,
{
	let mut content_length = None;
	loop {
		let mut line = String::new();
		if reader.read_line(&mut line).await? == 0 {
			return Ok(None);
		}
		let line = line.trim_end();
		if line.is_empty() {
			break;
		}
		if let Some(value) = line.strip_prefix("Content-Length:") {
			content_length = value.trim().parse::<usize>().ok();
		}
	}
	let Some(len) = content_length else {
		return Ok(None);
	};
	let mut body = vec![0u8; len];
	reader.read_exact(&mut body).await?;
	Ok(serde_json::from_slice(&body).ok())
}

/// Writes one `Content-Length`-framed message.
pub async fn write_message<W>(writer: &mut W, value: &Value) -> std::io::Result<()>
where
	W: AsyncWrite + Unpin,
{
	let body = serde_json::to_vec(value)?;
	writer.write_all(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes()).await?;
	writer.write_all(&body).await?;
	writer.flush().await
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn write_then_read_round_trips_a_message() {
		let mut buf = Vec::new();
		let value = serde_json::json!({"jsonrpc": "2.0", "method": "initialized"});
		write_message(&mut buf, &value).await.unwrap();

		let mut reader = tokio::io::BufReader::new(buf.as_slice());
		let read = read_message(&mut reader).await.unwrap().unwrap();
		assert_eq!(read, value);
	}

	#[tokio::test]
	async fn read_message_returns_none_at_eof() {
		let mut reader = tokio::io::BufReader::new(&b""[..]);
		assert!(read_message(&mut reader).await.unwrap().is_none());
	}
}
