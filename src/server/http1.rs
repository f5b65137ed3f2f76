//! Minimal HTTP/1.1 framing for the reference authority.
//!
//! The authority only ever answers small, fully buffered exchanges, so this module reads a
//! request head (and discards any body) within a fixed byte budget and writes
//! `Content-Length`-framed responses. Anything that violates the budget or the framing is an
//! `InvalidData` error, which the connection loop turns into a silent close.

// std
use std::io;
// crates.io
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Byte budget for one request's head + body.
pub(crate) const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Parsed request head; the body, if any, has already been discarded.
#[derive(Clone, Debug)]
pub(crate) struct Http1Request {
	pub method: String,
	pub target: String,
}

/// Buffered response frame written back to the peer.
#[derive(Clone, Debug)]
pub(crate) struct Http1Response {
	pub status: u16,
	pub body: Vec<u8>,
}
impl Http1Response {
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}

	pub fn empty(status: u16) -> Self {
		Self::new(status, Vec::new())
	}
}

/// Reads one request from `reader`; `Ok(None)` signals a clean EOF before a request line.
pub(crate) async fn read_request<R>(reader: &mut R) -> io::Result<Option<Http1Request>>
where
	R: AsyncBufRead + Unpin,
{
	let mut budget = MAX_REQUEST_BYTES;
	let Some(request_line) = read_line_bounded(reader, &mut budget).await? else {
		return Ok(None);
	};
	let mut parts = request_line.split_whitespace();
	let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
		return Err(io::Error::new(io::ErrorKind::InvalidData, "malformed request line"));
	};
	let method = method.to_owned();
	let target = target.to_owned();
	let mut content_length = 0usize;

	loop {
		let Some(line) = read_line_bounded(reader, &mut budget).await? else {
			return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "request head cut short"));
		};

		if line.is_empty() {
			break;
		}
		if let Some((name, value)) = line.split_once(':')
			&& name.trim().eq_ignore_ascii_case("content-length")
		{
			content_length = value
				.trim()
				.parse()
				.map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "bad content-length"))?;
		}
	}

	if content_length > budget {
		return Err(io::Error::new(io::ErrorKind::InvalidData, "request body over budget"));
	}

	discard_body(reader, content_length).await?;

	Ok(Some(Http1Request { method, target }))
}

/// Writes `response` with `Content-Length` framing; the caller closes the connection after.
pub(crate) async fn write_response<W>(writer: &mut W, response: &Http1Response) -> io::Result<()>
where
	W: AsyncWrite + Unpin,
{
	let head = format!(
		"HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
		response.status,
		reason_phrase(response.status),
		response.body.len(),
	);

	writer.write_all(head.as_bytes()).await?;
	writer.write_all(&response.body).await?;
	writer.flush().await
}

fn reason_phrase(status: u16) -> &'static str {
	match status {
		200 => "OK",
		400 => "Bad Request",
		401 => "Unauthorized",
		405 => "Method Not Allowed",
		_ => "Unknown",
	}
}

/// Reads one CRLF- or LF-terminated line, charging the consumed bytes against `budget`.
async fn read_line_bounded<R>(reader: &mut R, budget: &mut usize) -> io::Result<Option<String>>
where
	R: AsyncBufRead + Unpin,
{
	let mut line = Vec::new();

	loop {
		let available = reader.fill_buf().await?;

		if available.is_empty() {
			if line.is_empty() {
				return Ok(None);
			}

			return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "line cut short"));
		}

		let (consumed, done) = match available.iter().position(|byte| *byte == b'\n') {
			Some(at) => {
				line.extend_from_slice(&available[..at]);

				(at + 1, true)
			},
			None => {
				line.extend_from_slice(available);

				(available.len(), false)
			},
		};

		if consumed > *budget {
			return Err(io::Error::new(io::ErrorKind::InvalidData, "request head over budget"));
		}

		*budget -= consumed;

		reader.consume(consumed);

		if done {
			if line.last() == Some(&b'\r') {
				line.pop();
			}

			return String::from_utf8(line)
				.map(Some)
				.map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "non-UTF-8 head"));
		}
	}
}

async fn discard_body<R>(reader: &mut R, mut remaining: usize) -> io::Result<()>
where
	R: AsyncBufRead + Unpin,
{
	let mut sink = [0u8; 1024];

	while remaining > 0 {
		let n = reader.read(&mut sink[..remaining.min(sink.len())]).await?;

		if n == 0 {
			return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "body cut short"));
		}

		remaining -= n;
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// std
	use std::io::Cursor;
	// crates.io
	use tokio::io::BufReader;
	// self
	use super::*;

	async fn parse(raw: &[u8]) -> io::Result<Option<Http1Request>> {
		read_request(&mut BufReader::new(Cursor::new(raw.to_vec()))).await
	}

	#[tokio::test]
	async fn parses_a_bare_get() {
		let request = parse(b"GET /renewDelegationToken?kind=K HTTP/1.1\r\nHost: x\r\n\r\n")
			.await
			.expect("Well-formed request should parse.")
			.expect("A request line should be present.");

		assert_eq!(request.method, "GET");
		assert_eq!(request.target, "/renewDelegationToken?kind=K");
	}

	#[tokio::test]
	async fn discards_declared_bodies() {
		let raw = b"POST /x HTTP/1.1\r\nContent-Length: 4\r\n\r\nbodyGET /y HTTP/1.1\r\n\r\n";
		let mut reader = BufReader::new(Cursor::new(raw.to_vec()));
		let first = read_request(&mut reader)
			.await
			.expect("First request should parse.")
			.expect("First request line should be present.");
		let second = read_request(&mut reader)
			.await
			.expect("Second request should parse.")
			.expect("Second request line should be present.");

		assert_eq!(first.method, "POST");
		assert_eq!(second.target, "/y");
	}

	#[tokio::test]
	async fn eof_before_a_request_is_clean() {
		assert!(parse(b"").await.expect("Bare EOF should not error.").is_none());
	}

	#[tokio::test]
	async fn oversized_heads_are_rejected() {
		let mut raw = b"GET /".to_vec();

		raw.extend(std::iter::repeat_n(b'a', MAX_REQUEST_BYTES));
		raw.extend_from_slice(b" HTTP/1.1\r\n\r\n");

		assert!(parse(&raw).await.is_err());
	}

	#[tokio::test]
	async fn responses_carry_content_length_framing() {
		let mut written = Vec::new();

		write_response(&mut written, &Http1Response::new(200, b"12345".to_vec()))
			.await
			.expect("Writing to a buffer should succeed.");

		let rendered = String::from_utf8(written).expect("Response head should be UTF-8.");

		assert!(rendered.starts_with("HTTP/1.1 200 OK\r\n"));
		assert!(rendered.contains("Content-Length: 5\r\n"));
		assert!(rendered.ends_with("\r\n\r\n12345"));
	}
}
