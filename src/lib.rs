//! # WaddleMap Client
//!
//! A blocking TCP client for the WaddleMap block and vector store:
//! - Length-prefixed framing over a persistent connection
//! - Versioned, tagged request/response messages (bincode)
//! - Collection API: append-only blocks per key, vector and keyword search
//! - The older flat key -> value-list API, side by side
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Client / Collection / ClientPool                │
//! │                  (typed operations)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  Operation + RequestId
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Message Codec                              │
//! │          (Request / Response <-> bytes)                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  payload
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Transport                                │
//! │          (u32 BE length prefix + payload, TCP)               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use waddlemap::{BlockData, Client, DistanceMetric, KeywordMode};
//!
//! # fn main() -> waddlemap::Result<()> {
//! let mut client = Client::connect_addr("127.0.0.1:6969")?;
//! let mut docs = client.create_collection("docs", 2, DistanceMetric::L2)?;
//! docs.append_block("a", BlockData::new("A").with_vector(vec![0.0, 0.0]))?;
//! let hits = docs.search(&[0.1, 0.1], 1, &[] as &[&str], KeywordMode::Exact)?;
//! assert_eq!(hits[0].key, "a");
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod transport;
pub mod protocol;
pub mod correlator;
pub mod keywords;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ApplicationError, ApplicationErrorKind, Result, ResultExt, WaddleError};
pub use config::ClientConfig;
pub use client::{Client, ClientPool, Collection, PooledClient, ShutdownHandle};
pub use protocol::{
    AppendItem, BatchOutcome, BlockData, CollectionInfo, DataItem, DistanceMetric, KeywordMode,
    SearchResultItem,
};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
