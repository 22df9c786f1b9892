//! Transport Module
//!
//! Length-prefixed framing over a persistent TCP stream.
//!
//! ## Frame Format (both directions)
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │ Len (4)  │         Payload (Len)       │
//! └──────────┴─────────────────────────────┘
//! ```
//! `Len` is an unsigned 32-bit big-endian integer. The payload is an encoded
//! request or response (see [`crate::protocol`]).

mod frame;
mod stream;

pub use frame::{encode_frame, read_frame, write_frame, DEFAULT_MAX_FRAME_SIZE, LENGTH_PREFIX_SIZE};
pub use stream::FramedStream;
