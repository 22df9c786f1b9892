//! Protocol codec
//!
//! Encoding and decoding functions for request and response payloads.
//!
//! ## Payload Encoding
//!
//! Payloads are bincode with varint integers and trailing bytes rejected.
//! Enums are encoded as `tag (varint) + fields`, so the first bytes of a
//! request are:
//! ```text
//! ┌────────────┬──────────────────┬──────────┬──────────────────┐
//! │ Version(1) │ Request id (16)  │ Tag (1)  │ Operation fields │
//! └────────────┴──────────────────┴──────────┴──────────────────┘
//! ```
//! (version and tag occupy one byte while below 251)

use std::io::{Read, Write};

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, WaddleError};
use crate::transport::{read_frame, write_frame};

use super::{Request, Response, PROTOCOL_VERSION};

// Size is enforced by the frame layer on the way out; on the way in the
// limit is the frame itself, so a bogus length field cannot over-allocate.
fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::DefaultOptions::new().serialize(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T> {
    bincode::DefaultOptions::new()
        .with_limit(bytes.len() as u64)
        .deserialize(bytes)
        .map_err(|e| WaddleError::Protocol(format!("malformed {}: {}", what, e)))
}

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request payload (without the frame prefix)
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    encode(request)
}

/// Decode a request payload
///
/// Rejects versions other than [`PROTOCOL_VERSION`].
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    let request: Request = decode(bytes, "request")?;
    if request.version != PROTOCOL_VERSION {
        return Err(WaddleError::Protocol(format!(
            "Unsupported protocol version: {} (expected {})",
            request.version, PROTOCOL_VERSION
        )));
    }
    Ok(request)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response payload (without the frame prefix)
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    encode(response)
}

/// Decode a response payload
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    decode(bytes, "response")
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete request frame from a stream
pub fn read_request<R: Read>(reader: &mut R, max_frame_size: usize) -> Result<Request> {
    let payload = read_frame(reader, max_frame_size)?;
    decode_request(&payload)
}

/// Write a request frame to a stream
pub fn write_request<W: Write>(
    writer: &mut W,
    request: &Request,
    max_frame_size: usize,
) -> Result<()> {
    let payload = encode_request(request)?;
    write_frame(writer, &payload, max_frame_size)
}

/// Read a complete response frame from a stream
pub fn read_response<R: Read>(reader: &mut R, max_frame_size: usize) -> Result<Response> {
    let payload = read_frame(reader, max_frame_size)?;
    decode_response(&payload)
}

/// Write a response frame to a stream
pub fn write_response<W: Write>(
    writer: &mut W,
    response: &Response,
    max_frame_size: usize,
) -> Result<()> {
    let payload = encode_response(response)?;
    write_frame(writer, &payload, max_frame_size)
}
