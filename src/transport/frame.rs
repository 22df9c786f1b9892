//! Frame encoding and stream helpers

use std::io::{self, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, WaddleError};

/// Size of the big-endian length prefix
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default maximum payload size (16 MB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Encode a payload as a single frame: length prefix + payload
pub fn encode_frame(payload: &[u8], max_frame_size: usize) -> Result<Bytes> {
    let limit = max_frame_size.min(u32::MAX as usize);
    if payload.len() > limit {
        return Err(WaddleError::FrameTooLarge {
            size: payload.len(),
            max: limit,
        });
    }

    let mut frame = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    frame.put_u32(payload.len() as u32);
    frame.put_slice(payload);
    Ok(frame.freeze())
}

/// Write one frame to a stream
///
/// The prefix and payload go out in a single `write_all`, then the writer is
/// flushed.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8], max_frame_size: usize) -> Result<()> {
    let frame = encode_frame(payload, max_frame_size)?;
    writer.write_all(&frame).map_err(map_io_error)?;
    writer.flush().map_err(map_io_error)?;
    Ok(())
}

/// Read one frame from a stream
///
/// Blocks until the 4-byte prefix and then the full payload have arrived.
/// A stream ending at either stage yields `ConnectionClosed`; a declared
/// length above `max_frame_size` is rejected before allocating.
pub fn read_frame<R: Read>(reader: &mut R, max_frame_size: usize) -> Result<Vec<u8>> {
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    reader.read_exact(&mut prefix).map_err(map_io_error)?;

    let payload_len = u32::from_be_bytes(prefix) as usize;
    if payload_len > max_frame_size {
        return Err(WaddleError::FrameTooLarge {
            size: payload_len,
            max: max_frame_size,
        });
    }

    let mut payload = vec![0u8; payload_len];
    if payload_len > 0 {
        reader.read_exact(&mut payload).map_err(map_io_error)?;
    }

    tracing::trace!(bytes = payload_len, "read frame");
    Ok(payload)
}

/// Fold socket failures into the transport error variants
pub(crate) fn map_io_error(err: io::Error) -> WaddleError {
    match err.kind() {
        io::ErrorKind::UnexpectedEof
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::NotConnected => WaddleError::ConnectionClosed,
        // Unix reports an expired read timeout as WouldBlock, Windows as TimedOut
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => WaddleError::Timeout,
        _ => WaddleError::Io(err),
    }
}
