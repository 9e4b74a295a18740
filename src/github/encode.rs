//! Chunked base64 encoding for blob payloads.
//!
//! Attachments can be multi-megabyte. Encoding goes through a streaming
//! writer in fixed 32 KiB chunks instead of one monolithic conversion,
//! so peak memory stays at output-size plus one chunk.

use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderStringWriter;
use std::io::Write;

/// Chunk size fed to the streaming encoder.
const CHUNK_SIZE: usize = 32 * 1024;

/// Encode arbitrary bytes as standard (padded) base64.
///
/// Deterministic and pure; empty input yields an empty string.
///
/// # Panics
///
/// Panics if the in-memory writer fails, which cannot happen for a
/// `String`-backed sink.
#[must_use]
pub fn to_base64(bytes: &[u8]) -> String {
    let mut encoder = EncoderStringWriter::new(&STANDARD);
    for chunk in bytes.chunks(CHUNK_SIZE) {
        encoder
            .write_all(chunk)
            .expect("in-memory base64 write should not fail");
    }
    encoder.into_inner()
}

/// Decode a base64 payload as returned by the contents API.
///
/// The API wraps encoded content with newlines; all ASCII whitespace is
/// stripped before decoding.
///
/// # Errors
///
/// Returns an error if the payload is not valid base64.
pub fn from_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    use base64::Engine;
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(compact.as_bytes())
}
