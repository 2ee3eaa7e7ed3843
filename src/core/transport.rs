//! The socket seam between a session and whatever actually moves frames.
//!
//! This crate never speaks WebSocket itself. The embedding application
//! supplies a [`Connector`] whose connections expose the four primitives a
//! session needs: connect, send a frame, receive a frame, close.

use async_trait::async_trait;

use crate::error::SparkError;

/// Dials one connection per call. Implementations are shared across
/// sessions, so they must not hold per-connection state themselves.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens a connection to the fully signed `wss://` URL.
    async fn connect(&self, url: &str) -> Result<Box<dyn Connection>, SparkError>;
}

/// One open socket.
///
/// A session issues exactly one `send` and then reads until the terminal
/// chunk; the write side is never shut down by the send path, and only the
/// session's terminal transition calls `close`.
#[async_trait]
pub trait Connection: Send {
    /// Writes one application frame.
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), SparkError>;

    /// Next inbound frame; `Ok(None)` signals a clean remote close.
    async fn receive(&mut self) -> Result<Option<Vec<u8>>, SparkError>;

    /// Tears the connection down. Must be safe to call more than once.
    async fn close(&mut self);
}
