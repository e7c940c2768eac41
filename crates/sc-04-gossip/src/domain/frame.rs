//! Frame codec.

use serde::Serialize;

use super::{GossipError, GossipResult};

/// Frame terminator.
pub const FRAME_DELIMITER: u8 = b'\n';

/// A decoded frame borrowing from the raw line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub name: &'a str,
    /// JSON payload, without the trailing newline.
    pub payload: &'a [u8],
}

/// Encode `name` and `payload` into one newline-terminated frame.
pub fn encode_frame<T: Serialize + ?Sized>(name: &str, payload: &T) -> GossipResult<Vec<u8>> {
    validate_name(name)?;
    let mut frame = Vec::with_capacity(name.len() + 64);
    frame.extend_from_slice(name.as_bytes());
    frame.push(b' ');
    serde_json::to_writer(&mut frame, payload)?;
    frame.push(FRAME_DELIMITER);
    Ok(frame)
}

/// Split a raw line at its first space.
///
/// The trailing newline is optional. A line with no space is a message with
/// an empty payload, which handlers read as `null`.
pub fn decode_frame(raw: &[u8]) -> GossipResult<Frame<'_>> {
    let line = raw.strip_suffix(&[FRAME_DELIMITER]).unwrap_or(raw);
    let (name, payload) = match line.iter().position(|&b| b == b' ') {
        Some(split) => (&line[..split], &line[split + 1..]),
        None => (line, &line[line.len()..]),
    };
    let name = std::str::from_utf8(name)
        .map_err(|e| GossipError::MalformedFrame(format!("name is not UTF-8: {e}")))?;
    if name.is_empty() {
        return Err(GossipError::MalformedFrame("empty message name".into()));
    }
    Ok(Frame { name, payload })
}

/// Payload bytes as JSON, with an empty payload read as `null`.
pub fn payload_or_null(payload: &[u8]) -> &[u8] {
    if payload.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        payload
    }
}

fn validate_name(name: &str) -> GossipResult<()> {
    if name.is_empty() || name.bytes().any(|b| b == b' ' || b == FRAME_DELIMITER) {
        return Err(GossipError::InvalidName(name.to_string()));
    }
    Ok(())
}
