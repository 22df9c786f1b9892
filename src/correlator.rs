//! Request Correlator
//!
//! Every outgoing request carries a statistically unique identifier. The
//! transport is strictly synchronous, so the client never needs the id to
//! pair a response with its request; it exists for server-side logging and
//! idempotency.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 128-bit request identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RequestId([u8; 16]);

impl RequestId {
    /// The all-zero id (used by servers that do not echo ids)
    pub const NIL: RequestId = RequestId([0u8; 16]);

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn is_nil(&self) -> bool {
        self.0 == [0u8; 16]
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(*uuid.as_bytes())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Uuid::from_bytes(self.0).hyphenated(), f)
    }
}

/// Source of request ids
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> RequestId;
}

/// Random (v4) UUIDs
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> RequestId {
        Uuid::new_v4().into()
    }
}

/// Counter-based ids, for deterministic tests and log replay
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialGenerator {
    next: u64,
}

impl SequentialGenerator {
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }
}

impl IdGenerator for SequentialGenerator {
    fn next_id(&mut self) -> RequestId {
        let mut bytes = [0u8; 16];
        bytes[8..].copy_from_slice(&self.next.to_be_bytes());
        self.next += 1;
        RequestId(bytes)
    }
}
