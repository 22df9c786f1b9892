//! Error types for the WaddleMap client
//!
//! Three families of failure exist and must stay distinguishable:
//! - transport: the connection died or timed out mid-exchange
//! - protocol: a frame arrived but does not decode to a sane response
//! - application: the server answered `success = false` with a message
//!
//! Callers asking "does this exist" should only ever swallow a
//! specific [`ApplicationErrorKind`], never a transport or protocol error.

use std::fmt;

use thiserror::Error;

/// Result type alias using WaddleError
pub type Result<T> = std::result::Result<T, WaddleError>;

/// Unified error type for client operations
#[derive(Debug, Error)]
pub enum WaddleError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Timed out waiting for the server")]
    Timeout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unexpected result for {operation}: got {received}")]
    UnexpectedResult {
        operation: &'static str,
        received: &'static str,
    },

    // -------------------------------------------------------------------------
    // Application Errors
    // -------------------------------------------------------------------------
    #[error(transparent)]
    Application(#[from] ApplicationError),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WaddleError {
    /// True for failures of the connection itself
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            WaddleError::ConnectionClosed | WaddleError::Timeout | WaddleError::Io(_)
        )
    }

    /// True when a frame arrived but could not be understood
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            WaddleError::FrameTooLarge { .. }
                | WaddleError::Protocol(_)
                | WaddleError::Serialization(_)
                | WaddleError::UnexpectedResult { .. }
        )
    }

    /// The application error kind, if the server (or local validation)
    /// rejected the request
    pub fn application_kind(&self) -> Option<ApplicationErrorKind> {
        match self {
            WaddleError::Application(e) => Some(e.kind),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.application_kind() == Some(ApplicationErrorKind::NotFound)
    }
}

impl From<bincode::Error> for WaddleError {
    fn from(err: bincode::Error) -> Self {
        WaddleError::Serialization(err.to_string())
    }
}

// =============================================================================
// Application Errors
// =============================================================================

/// Domain failure categories reported with `success = false`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationErrorKind {
    /// Missing collection, key, or block index out of range
    NotFound,

    /// Vector length differs from the collection's dimensionality
    DimensionMismatch,

    /// Collection name already taken
    AlreadyExists,

    /// Keyword contains a character outside `[a-z0-9_-]`
    InvalidKeyword,

    /// Malformed argument (empty names, bad collection name, ...)
    InvalidArgument,

    /// Operation known to the protocol but not served
    NotImplemented,

    Other,
}

impl ApplicationErrorKind {
    /// Classify a server-supplied error message
    ///
    /// The server reports failures as free text, so this matches on the
    /// phrases it uses for each category. Quoted spans are names chosen by
    /// the caller (`collection "duplicates" not found`) and are skipped.
    pub fn classify(message: &str) -> Self {
        let msg = strip_quoted(message).to_ascii_lowercase();
        if msg.contains("dimension mismatch") || msg.contains("dimensions mismatch") {
            ApplicationErrorKind::DimensionMismatch
        } else if msg.contains("already exists") || msg.contains("duplicate") {
            ApplicationErrorKind::AlreadyExists
        } else if msg.contains("keyword") && msg.contains("invalid") {
            ApplicationErrorKind::InvalidKeyword
        } else if msg.contains("not found")
            || msg.contains("out of range")
            || msg.contains("does not exist")
        {
            ApplicationErrorKind::NotFound
        } else if msg.contains("not implemented") {
            ApplicationErrorKind::NotImplemented
        } else if msg.contains("invalid") {
            ApplicationErrorKind::InvalidArgument
        } else {
            ApplicationErrorKind::Other
        }
    }
}

/// Drop every `"..."` span, honoring backslash escapes inside quotes
fn strip_quoted(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut in_quote = false;
    let mut escaped = false;
    for c in message.chars() {
        if in_quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quote = false,
                _ => {}
            }
        } else if c == '"' {
            in_quote = true;
        } else {
            out.push(c);
        }
    }
    out
}

impl fmt::Display for ApplicationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApplicationErrorKind::NotFound => "not found",
            ApplicationErrorKind::DimensionMismatch => "dimension mismatch",
            ApplicationErrorKind::AlreadyExists => "already exists",
            ApplicationErrorKind::InvalidKeyword => "invalid keyword",
            ApplicationErrorKind::InvalidArgument => "invalid argument",
            ApplicationErrorKind::NotImplemented => "not implemented",
            ApplicationErrorKind::Other => "application error",
        };
        f.write_str(name)
    }
}

/// A request the server understood but refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Server error ({kind}): {message}")]
pub struct ApplicationError {
    pub kind: ApplicationErrorKind,
    pub message: String,
}

impl ApplicationError {
    pub fn new(kind: ApplicationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build from a server message, classifying it
    pub fn from_server(message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = ApplicationErrorKind::classify(&message);
        Self { kind, message }
    }

    pub fn dimension_mismatch(expected: u32, got: usize) -> Self {
        Self::new(
            ApplicationErrorKind::DimensionMismatch,
            format!("vector dimension mismatch: expected {}, got {}", expected, got),
        )
    }
}

// =============================================================================
// Selective Suppression
// =============================================================================

/// Suppress exactly one kind of application error
pub trait ResultExt<T> {
    /// Map an application error of `kind` to `Ok(None)`; every other error,
    /// transport and protocol failures included, is passed through.
    ///
    /// ```ignore
    /// client.delete_collection("scratch").ignore_kind(ApplicationErrorKind::NotFound)?;
    /// ```
    fn ignore_kind(self, kind: ApplicationErrorKind) -> Result<Option<T>>;
}

impl<T> ResultExt<T> for Result<T> {
    fn ignore_kind(self, kind: ApplicationErrorKind) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.application_kind() == Some(kind) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
