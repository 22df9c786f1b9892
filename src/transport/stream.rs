//! Framed TCP stream
//!
//! Owns one TCP connection and exchanges whole frames over it.

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

use crate::config::ClientConfig;
use crate::error::{Result, WaddleError};

use super::frame::{map_io_error, read_frame, write_frame};

/// A TCP stream speaking length-prefixed frames
pub struct FramedStream {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Largest frame accepted or sent
    max_frame_size: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl FramedStream {
    /// Connect to the configured address and apply socket options
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let stream = match config.connect_timeout() {
            Some(timeout) => {
                let addr = resolve(&config.addr)?;
                TcpStream::connect_timeout(&addr, timeout).map_err(map_io_error)?
            }
            None => TcpStream::connect(&config.addr)?,
        };

        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        Self::from_stream(stream, config.nodelay, config.max_frame_size)
    }

    /// Wrap an already-connected stream
    pub fn from_stream(stream: TcpStream, nodelay: bool, max_frame_size: usize) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(nodelay)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            max_frame_size,
            peer_addr,
        })
    }

    /// Send one frame
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        write_frame(&mut self.writer, payload, self.max_frame_size)
    }

    /// Block until one whole frame has been received
    pub fn receive(&mut self) -> Result<Vec<u8>> {
        read_frame(&mut self.reader, self.max_frame_size)
    }

    /// Another handle to the same socket, used to shut it down from
    /// a different thread
    pub fn try_clone_socket(&self) -> Result<TcpStream> {
        Ok(self.writer.get_ref().try_clone()?)
    }

    /// Close both directions of the socket
    pub fn shutdown(&self) -> Result<()> {
        match self.writer.get_ref().shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // Already torn down by the peer or another handle
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(WaddleError::Io(e)),
        }
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn resolve(addr: &str) -> Result<SocketAddr> {
    addr.to_socket_addrs()?
        .next()
        .ok_or_else(|| WaddleError::Config(format!("address resolved to nothing: {}", addr)))
}
