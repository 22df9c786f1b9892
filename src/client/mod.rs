//! Client Module
//!
//! Blocking client API over the framed protocol.
//!
//! ## Architecture
//! - [`Client`]: one TCP connection, one request in flight
//! - [`Collection`]: block/search operations scoped to a collection
//! - Flat value-list operations live directly on [`Client`]
//! - [`ClientPool`]: connection-per-worker reuse

mod collection;
mod connection;
mod flat;
mod pool;

pub use collection::Collection;
pub use connection::{Client, ShutdownHandle};
pub use pool::{ClientPool, PooledClient};
