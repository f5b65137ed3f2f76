//! Length-prefixed binary codec for credential sets.
//!
//! The frame is the interoperability contract between client and authority and must stay
//! stable across implementations in other languages:
//!
//! ```text
//! magic  b"DTKS" | version u8 (= 1) | count u32 BE
//! per record: alias | kind | service | identifier | password
//! ```
//!
//! Each record field carries a big-endian `u32` length prefix; alias, kind, and service are
//! UTF-8 strings, identifier and password are raw bytes. Decoding fails on truncation,
//! inconsistent prefixes, invalid UTF-8, and trailing bytes after the declared records.

// crates.io
use bytes::BufMut;
// self
use crate::{
	_prelude::*,
	auth::{Credentials, Token, TokenError},
};

/// Leading magic bytes of every credential frame.
pub const MAGIC: [u8; 4] = *b"DTKS";
/// Frame layout version this build reads and writes.
pub const VERSION: u8 = 1;

/// Errors produced while encoding or decoding a credential frame.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CodecError {
	/// The frame does not start with the expected magic bytes.
	#[error("Credential data does not start with the `DTKS` magic.")]
	BadMagic,
	/// The frame declares a layout version this build cannot read.
	#[error("Credential data uses unsupported layout version {found}.")]
	UnsupportedVersion {
		/// Version byte found in the frame.
		found: u8,
	},
	/// The buffer ended before a declared length prefix was satisfied.
	#[error("Credential data is truncated while reading {context}.")]
	Truncated {
		/// Field or prefix being read when the buffer ran out.
		context: &'static str,
	},
	/// A string field holds bytes that are not valid UTF-8.
	#[error("Credential data holds invalid UTF-8 in {context}.")]
	InvalidUtf8 {
		/// Field being decoded when validation failed.
		context: &'static str,
	},
	/// Bytes remain after all declared records were read.
	#[error("Credential data carries {count} trailing bytes after the declared records.")]
	TrailingBytes {
		/// Number of unparsed trailing bytes.
		count: usize,
	},
	/// A field is too long to fit the 32-bit length prefix.
	#[error("Credential field {context} is too long for the frame's length prefix.")]
	FieldTooLong {
		/// Field being encoded when the overflow was detected.
		context: &'static str,
	},
	/// A decoded record fails token validation.
	#[error(transparent)]
	Token(#[from] TokenError),
}

/// Serializes a credential set into a binary frame.
pub fn encode(credentials: &Credentials) -> Result<Vec<u8>, CodecError> {
	let mut frame = Vec::with_capacity(MAGIC.len() + 1 + 4);

	frame.put_slice(&MAGIC);
	frame.put_u8(VERSION);
	frame.put_u32(prefix(credentials.len(), "record count")?);

	for (alias, token) in credentials.iter() {
		put_block(&mut frame, alias.as_bytes(), "alias")?;
		put_block(&mut frame, token.kind().as_bytes(), "kind")?;
		put_block(&mut frame, token.service().as_bytes(), "service")?;
		put_block(&mut frame, token.identifier(), "identifier")?;
		put_block(&mut frame, token.password().expose(), "password")?;
	}

	Ok(frame)
}

/// Deserializes a binary frame back into a credential set.
pub fn decode(frame: &[u8]) -> Result<Credentials, CodecError> {
	let mut cursor = Cursor { buf: frame };

	if cursor.take(MAGIC.len(), "magic")? != MAGIC {
		return Err(CodecError::BadMagic);
	}

	let version = cursor.take(1, "version")?[0];

	if version != VERSION {
		return Err(CodecError::UnsupportedVersion { found: version });
	}

	let count = cursor.take_u32("record count")?;
	let mut credentials = Credentials::new();

	for _ in 0..count {
		let alias = cursor.take_string("alias")?;
		let kind = cursor.take_string("kind")?;
		let service = cursor.take_string("service")?;
		let identifier = cursor.take_block("identifier")?.to_vec();
		let password = cursor.take_block("password")?.to_vec();

		credentials.insert(alias, Token::new(identifier, password, kind, service)?);
	}

	if !cursor.buf.is_empty() {
		return Err(CodecError::TrailingBytes { count: cursor.buf.len() });
	}

	Ok(credentials)
}

fn prefix(len: usize, context: &'static str) -> Result<u32, CodecError> {
	u32::try_from(len).map_err(|_| CodecError::FieldTooLong { context })
}

fn put_block(frame: &mut Vec<u8>, block: &[u8], context: &'static str) -> Result<(), CodecError> {
	frame.put_u32(prefix(block.len(), context)?);
	frame.put_slice(block);

	Ok(())
}

struct Cursor<'a> {
	buf: &'a [u8],
}
impl<'a> Cursor<'a> {
	fn take(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], CodecError> {
		if self.buf.len() < n {
			return Err(CodecError::Truncated { context });
		}

		let (head, tail) = self.buf.split_at(n);

		self.buf = tail;

		Ok(head)
	}

	fn take_u32(&mut self, context: &'static str) -> Result<u32, CodecError> {
		let bytes = self.take(4, context)?;

		Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
	}

	fn take_block(&mut self, context: &'static str) -> Result<&'a [u8], CodecError> {
		let len = self.take_u32(context)? as usize;

		self.take(len, context)
	}

	fn take_string(&mut self, context: &'static str) -> Result<String, CodecError> {
		let block = self.take_block(context)?;

		std::str::from_utf8(block)
			.map(str::to_owned)
			.map_err(|_| CodecError::InvalidUtf8 { context })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn sample_set() -> Credentials {
		let mut credentials = Credentials::new();

		credentials.insert(
			"http://localhost:50470",
			Token::new(
				b"ident-bytes".to_vec(),
				b"password-bytes".to_vec(),
				"DELEGATION_TOKEN",
				"http://localhost:50470",
			)
			.expect("Codec token fixture should be valid."),
		);
		credentials.insert(
			"http://localhost:50471",
			Token::new(vec![0, 1, 2, 255], vec![42], "OTHER_KIND", "http://localhost:50471")
				.expect("Codec token fixture should be valid."),
		);

		credentials
	}

	#[test]
	fn round_trip_preserves_content() {
		let credentials = sample_set();
		let frame = encode(&credentials).expect("Encoding a valid set should succeed.");
		let decoded = decode(&frame).expect("Decoding a freshly encoded frame should succeed.");

		assert_eq!(decoded, credentials);
	}

	#[test]
	fn empty_set_round_trips() {
		let frame = encode(&Credentials::new()).expect("Encoding an empty set should succeed.");
		let decoded = decode(&frame).expect("Decoding an empty frame should succeed.");

		assert!(decoded.is_empty());
	}

	#[test]
	fn truncation_is_detected_at_every_boundary() {
		let frame =
			encode(&sample_set()).expect("Encoding the truncation fixture should succeed.");

		for cut in 0..frame.len() {
			assert!(
				matches!(decode(&frame[..cut]), Err(CodecError::Truncated { .. })),
				"Cut at {cut} should report truncation."
			);
		}
	}

	#[test]
	fn bad_magic_and_version_are_rejected() {
		let mut frame =
			encode(&sample_set()).expect("Encoding the header fixture should succeed.");

		frame[0] = b'X';

		assert_eq!(decode(&frame), Err(CodecError::BadMagic));

		frame[0] = MAGIC[0];
		frame[4] = 9;

		assert_eq!(decode(&frame), Err(CodecError::UnsupportedVersion { found: 9 }));
	}

	#[test]
	fn trailing_bytes_are_rejected() {
		let mut frame =
			encode(&sample_set()).expect("Encoding the trailing-bytes fixture should succeed.");

		frame.extend_from_slice(b"junk");

		assert_eq!(decode(&frame), Err(CodecError::TrailingBytes { count: 4 }));
	}

	#[test]
	fn oversized_length_prefix_reports_truncation() {
		let mut frame =
			encode(&sample_set()).expect("Encoding the length-prefix fixture should succeed.");

		// First record field prefix sits right after magic + version + count.
		frame[9] = 0xFF;

		assert!(matches!(decode(&frame), Err(CodecError::Truncated { .. })));
	}

	#[test]
	fn invalid_utf8_in_string_fields_is_rejected() {
		let credentials = sample_set();
		let mut frame =
			encode(&credentials).expect("Encoding the UTF-8 fixture should succeed.");
		// Corrupt the first byte of the first alias, which follows the 13-byte header and the
		// 4-byte alias prefix.
		frame[13] = 0xFF;

		assert!(matches!(decode(&frame), Err(CodecError::InvalidUtf8 { context: "alias" })));
	}

	#[test]
	fn records_decode_with_empty_material_fail_validation() {
		let mut frame = Vec::new();

		frame.extend_from_slice(&MAGIC);
		frame.push(VERSION);
		frame.extend_from_slice(&1u32.to_be_bytes());

		let fields: [&[u8]; 5] = [b"a", b"k", b"s", b"", b"p"];

		for field in fields {
			frame.extend_from_slice(&(field.len() as u32).to_be_bytes());
			frame.extend_from_slice(field);
		}

		assert_eq!(decode(&frame), Err(CodecError::Token(TokenError::EmptyIdentifier)));
	}
}
