//! Protocol Module
//!
//! Typed request/response messages and their payload codec.
//!
//! ## Protocol Format (V1)
//!
//! Every message travels in one frame (see [`crate::transport`]).
//!
//! ### Request
//! ```text
//! ┌──────────┬──────────────┬────────────────────────────────┐
//! │ Version  │ Request id   │ Operation (exactly one variant)│
//! └──────────┴──────────────┴────────────────────────────────┘
//! ```
//!
//! ### Response
//! ```text
//! ┌──────────────┬─────────┬──────────────────┬──────────────────┐
//! │ Request id   │ Success │ Error message?   │ Result variant?  │
//! └──────────────┴─────────┴──────────────────┴──────────────────┘
//! ```
//!
//! ### Operation Generations
//! - Collections/blocks/search: 0x00 - 0x0C
//! - Flat key -> value-list API: 0x0D - 0x15
//!
//! Both generations share one tag space and are kept side by side; neither
//! supersedes the other.

mod codec;
mod request;
mod response;
mod types;

pub use codec::{
    decode_request, decode_response, encode_request, encode_response, read_request,
    read_response, write_request, write_response,
};
pub use request::{Operation, OperationKind, Request};
pub use response::{Response, ResponseResult};
pub use types::{
    AppendItem, BatchOutcome, BlockData, CollectionInfo, DataItem, DistanceMetric, KeywordMode,
    SearchResultItem, SearchScope,
};

/// Protocol version written into every request
pub const PROTOCOL_VERSION: u16 = 1;
