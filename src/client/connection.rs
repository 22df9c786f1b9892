//! Client connection
//!
//! One TCP connection, one request in flight, full blocking round trip per
//! call.

use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::correlator::{IdGenerator, UuidGenerator};
use crate::error::{ApplicationError, ApplicationErrorKind, Result, WaddleError};
use crate::protocol::{
    decode_response, encode_request, CollectionInfo, DistanceMetric, Operation, OperationKind,
    Request, Response, ResponseResult,
};
use crate::transport::FramedStream;

use super::collection::Collection;

/// A connection to a WaddleMap server
///
/// Calls take `&mut self`, so a client never has more than one request
/// outstanding. Open one client per worker for concurrency (or use
/// [`ClientPool`](super::ClientPool)).
pub struct Client {
    stream: FramedStream,

    ids: Box<dyn IdGenerator>,

    /// Set once the connection is unusable; shared with shutdown handles
    closed: Arc<AtomicBool>,
}

impl Client {
    /// Connect using the given config
    pub fn connect(config: ClientConfig) -> Result<Self> {
        if config.max_frame_size == 0 || config.max_frame_size > u32::MAX as usize {
            return Err(WaddleError::Config(format!(
                "max_frame_size must be between 1 and {}, got {}",
                u32::MAX,
                config.max_frame_size
            )));
        }

        let stream = FramedStream::connect(&config)?;
        tracing::debug!("Connected to {}", stream.peer_addr());

        Ok(Self {
            stream,
            ids: Box::new(UuidGenerator),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Connect to `addr` with default settings
    pub fn connect_addr(addr: impl Into<String>) -> Result<Self> {
        Self::connect(ClientConfig::builder().addr(addr).build())
    }

    /// Replace the request id source
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Close the connection
    pub fn close(self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        tracing::debug!("Closing connection to {}", self.stream.peer_addr());
        self.stream.shutdown()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// A handle that can close this connection from another thread
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        Ok(ShutdownHandle {
            socket: Arc::new(self.stream.try_clone_socket()?),
            closed: Arc::clone(&self.closed),
        })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        self.stream.peer_addr()
    }

    // =========================================================================
    // Request / Response
    // =========================================================================

    /// Send one operation and wait for its response
    ///
    /// Returns the result payload of a successful response, or
    /// `WaddleError::Application` when the server answered `success = false`.
    /// Any transport or protocol failure leaves the client closed.
    pub fn call(&mut self, operation: Operation) -> Result<Option<ResponseResult>> {
        if self.is_closed() {
            return Err(WaddleError::ConnectionClosed);
        }

        let request = Request::new(self.ids.next_id(), operation);
        let kind = request.kind();
        let request_id = request.request_id;

        // Nothing has been written yet if encoding fails or the frame is too
        // large, so the connection stays usable.
        let payload = encode_request(&request)?;
        if payload.len() > self.stream.max_frame_size() {
            return Err(WaddleError::FrameTooLarge {
                size: payload.len(),
                max: self.stream.max_frame_size(),
            });
        }

        tracing::debug!(%request_id, op = kind.name(), bytes = payload.len(), "sending request");

        let response = match self.exchange(&payload) {
            Ok(response) => response,
            Err(e) => {
                // A shutdown from another thread surfaces as whatever the
                // socket reported; callers only need to know it was closed.
                let e = if self.is_closed() { WaddleError::ConnectionClosed } else { e };
                self.poison();
                tracing::debug!(%request_id, op = kind.name(), error = %e, "request aborted");
                return Err(e);
            }
        };

        if !response.request_id.is_nil() && response.request_id != request_id {
            tracing::warn!(
                sent = %request_id,
                received = %response.request_id,
                "response carries a different request id"
            );
        }

        tracing::debug!(
            %request_id,
            op = kind.name(),
            success = response.success,
            "received response"
        );
        response.into_result()
    }

    fn exchange(&mut self, payload: &[u8]) -> Result<Response> {
        self.stream.send(payload)?;
        let bytes = self.stream.receive()?;
        decode_response(&bytes)
    }

    /// Call and pull a specific result variant out of the response
    pub(crate) fn call_expecting<T>(
        &mut self,
        operation: Operation,
        extract: impl FnOnce(
            Option<ResponseResult>,
        ) -> std::result::Result<T, Option<ResponseResult>>,
    ) -> Result<T> {
        let kind = operation.kind();
        let result = self.call(operation)?;
        extract(result).map_err(|received| self.unexpected(kind, received.as_ref()))
    }

    /// Call and discard whatever result payload came back
    pub(crate) fn call_unit(&mut self, operation: Operation) -> Result<()> {
        self.call(operation).map(|_| ())
    }

    /// Record a malformed-but-complete response and give up on the connection
    pub(crate) fn protocol_violation(&mut self, message: String) -> WaddleError {
        self.poison();
        WaddleError::Protocol(message)
    }

    fn unexpected(
        &mut self,
        kind: OperationKind,
        received: Option<&ResponseResult>,
    ) -> WaddleError {
        self.poison();
        WaddleError::UnexpectedResult {
            operation: kind.name(),
            received: received.map_or("nothing", ResponseResult::name),
        }
    }

    fn poison(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        let _ = self.stream.shutdown();
    }

    // =========================================================================
    // Collection Management
    // =========================================================================

    /// Create a collection and return a handle to it
    ///
    /// `dimensions == 0` creates a collection without vectors.
    pub fn create_collection(
        &mut self,
        name: &str,
        dimensions: u32,
        metric: DistanceMetric,
    ) -> Result<Collection<'_>> {
        require_name(name, "collection name")?;
        self.call_unit(Operation::CreateCollection {
            name: name.to_string(),
            dimensions,
            metric,
        })?;
        tracing::info!(collection = name, dimensions, %metric, "created collection");
        Ok(Collection::known(self, name, dimensions, metric))
    }

    /// Delete a collection with all its keys, blocks and indexes
    pub fn delete_collection(&mut self, name: &str) -> Result<()> {
        require_name(name, "collection name")?;
        self.call_unit(Operation::DeleteCollection { name: name.to_string() })?;
        tracing::info!(collection = name, "deleted collection");
        Ok(())
    }

    pub fn list_collections(&mut self) -> Result<Vec<CollectionInfo>> {
        self.call_expecting(Operation::ListCollections, |result| match result {
            Some(ResponseResult::CollectionList(list)) => Ok(list),
            other => Err(other),
        })
    }

    /// Handle to an existing collection, without a round trip
    ///
    /// The dimensionality is unknown, so vector lengths are only checked by
    /// the server.
    pub fn collection(&mut self, name: &str) -> Collection<'_> {
        Collection::unknown(self, name)
    }

    /// Handle to an existing collection, looked up on the server
    pub fn open_collection(&mut self, name: &str) -> Result<Collection<'_>> {
        let info = self
            .list_collections()?
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| {
                ApplicationError::new(
                    ApplicationErrorKind::NotFound,
                    format!("collection {:?} not found", name),
                )
            })?;
        Ok(Collection::known(self, &info.name, info.dimensions, info.metric))
    }
}

/// Reject empty identifiers before they reach the wire
pub(crate) fn require_name(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ApplicationError::new(
            ApplicationErrorKind::InvalidArgument,
            format!("invalid {}: empty", what),
        )
        .into());
    }
    Ok(())
}

// =============================================================================
// Shutdown Handle
// =============================================================================

/// Closes a client's connection from another thread
///
/// A call blocked on the connection returns `ConnectionClosed`, and so does
/// every later call on that client.
#[derive(Clone)]
pub struct ShutdownHandle {
    socket: Arc<TcpStream>,
    closed: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        match self.socket.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(WaddleError::Io(e)),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
