//! Sparkstream is a client library for the iFlytek Spark streaming
//! chat-completion protocol.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`auth`] produces the time-bound, HMAC-signed authorization query that
//!   guards every connection attempt.
//! - [`api`] defines the JSON payloads exchanged with the service and the
//!   codec that encodes requests and decodes completion chunks.
//! - [`core`] owns per-session runtime state: client configuration, the
//!   transport seam, and the stream session state machine.
//! - [`utils`] holds small URL helpers shared by the layers above.
//!
//! Each chat request runs as exactly one session:
//! [`crate::core::session::StreamSession`] signs a fresh connection URL, dials the
//! caller-supplied transport, writes the single request frame, and delivers
//! decoded chunks in order until the terminal chunk or a failure. Sessions
//! are fully independent of one another; there is no pooling, retry, or
//! connection reuse.

pub mod api;
pub mod auth;
pub mod core;
pub mod error;
pub mod utils;
