//! One streaming chat session: connect, send the single request frame,
//! deliver decoded chunks in order until the terminal chunk or a failure.
//!
//! A session moves through `Idle -> Connecting -> Streaming` and ends in
//! exactly one of `Completed` or `Failed`. The session task is the only
//! owner of the connection and of the state, so every transition happens
//! exactly once; cancellation races are resolved by `tokio::select!` at each
//! suspension point.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::codec;
use crate::api::{ChatChunk, ChatRequest, TokenUsage};
use crate::auth;
use crate::core::config::ClientConfig;
use crate::core::transport::{Connection, Connector};
use crate::error::SparkError;
use crate::utils::url::request_url;

/// One event in a session's outcome sequence.
///
/// Chunks arrive in delivery order; the sequence ends with exactly one
/// `Completed` or `Failed`, after which nothing further is emitted.
#[derive(Debug)]
pub enum StreamEvent {
    Chunk(ChatChunk),
    /// The terminal chunk was seen; carries its token accounting when the
    /// server sent any.
    Completed { usage: Option<TokenUsage> },
    Failed(SparkError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionState {
    Idle,
    Connecting,
    Streaming,
    Completed,
    Failed,
}

/// Owns one chat request's lifecycle over a caller-supplied transport.
///
/// `start` consumes the session: one logical request maps to exactly one
/// connection, with no reuse across requests.
pub struct StreamSession<C> {
    config: ClientConfig,
    connector: C,
}

impl<C: Connector + 'static> StreamSession<C> {
    pub fn new(config: ClientConfig, connector: C) -> Self {
        Self { config, connector }
    }

    /// Spawns the session task and hands back the event stream.
    ///
    /// Errors during connect or the single send surface as the stream's one
    /// `Failed` event; they are never raised through the chunk path. Must be
    /// called from within a tokio runtime.
    pub fn start(self, request: ChatRequest) -> ChatStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            run_session(self.config, self.connector, request, tx, task_cancel).await;
        });
        ChatStream { rx, cancel }
    }
}

/// Caller's handle to one running session: an ordered event sequence plus
/// the cancellation switch. Dropping the handle cancels the session.
pub struct ChatStream {
    rx: mpsc::UnboundedReceiver<StreamEvent>,
    cancel: CancellationToken,
}

impl ChatStream {
    /// Next event, or `None` once the session task has finished and all
    /// buffered events were drained.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.rx.recv().await
    }

    /// Asks the session to stop. The socket closes within a bounded time and
    /// nothing is emitted after the cancellation is observed; at most one
    /// already received chunk may still be in the channel.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drains the stream, concatenating chunk text in delivery order.
    ///
    /// Convenience for callers that do not need incremental delivery.
    /// Returns the assembled text and the terminal chunk's usage totals, or
    /// the failure that ended the session.
    pub async fn collect(mut self) -> Result<(String, Option<TokenUsage>), SparkError> {
        let mut assembled = String::new();
        while let Some(event) = self.recv().await {
            match event {
                StreamEvent::Chunk(chunk) => {
                    if let Some(payload) = &chunk.payload {
                        for piece in &payload.choices.text {
                            assembled.push_str(&piece.content);
                        }
                    }
                }
                StreamEvent::Completed { usage } => return Ok((assembled, usage)),
                StreamEvent::Failed(err) => return Err(err),
            }
        }
        Err(SparkError::Connection(
            "session ended without an outcome".to_string(),
        ))
    }
}

impl Stream for ChatStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for ChatStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn transition(state: &mut SessionState, next: SessionState) {
    debug!(from = ?*state, to = ?next, "session state");
    *state = next;
}

fn fail(tx: &mpsc::UnboundedSender<StreamEvent>, state: &mut SessionState, err: SparkError) {
    transition(state, SessionState::Failed);
    let _ = tx.send(StreamEvent::Failed(err));
}

async fn run_session<C: Connector>(
    config: ClientConfig,
    connector: C,
    request: ChatRequest,
    tx: mpsc::UnboundedSender<StreamEvent>,
    cancel: CancellationToken,
) {
    let mut state = SessionState::Idle;

    // The deadline spans the whole session, connect included.
    let deadline = tokio::time::sleep(config.session_timeout);
    tokio::pin!(deadline);

    transition(&mut state, SessionState::Connecting);

    // Fresh signature per attempt; the credential is clock-bound.
    let query = match auth::sign(&config.credential, config.model.path()) {
        Ok(query) => query,
        Err(err) => return fail(&tx, &mut state, err),
    };
    let url = request_url(&config.credential.host, config.model.path(), &query);
    debug!(%url, "connecting");

    let mut conn = tokio::select! {
        connected = connector.connect(&url) => match connected {
            Ok(conn) => conn,
            Err(err) => return fail(&tx, &mut state, err),
        },
        _ = &mut deadline => {
            return fail(
                &tx,
                &mut state,
                SparkError::Connection("session timed out while connecting".to_string()),
            );
        }
        _ = cancel.cancelled() => {
            transition(&mut state, SessionState::Failed);
            return;
        }
    };

    // Exactly one outbound frame per session. The write side stays open
    // afterwards; only the terminal transition closes the connection.
    let frame = match codec::encode(&request) {
        Ok(frame) => frame,
        Err(err) => {
            conn.close().await;
            return fail(&tx, &mut state, err);
        }
    };
    debug!(bytes = frame.len(), "sending request frame");
    tokio::select! {
        sent = conn.send(frame) => {
            if let Err(err) = sent {
                conn.close().await;
                return fail(&tx, &mut state, err);
            }
        }
        _ = &mut deadline => {
            conn.close().await;
            return fail(
                &tx,
                &mut state,
                SparkError::Connection("session timed out while sending the request".to_string()),
            );
        }
        _ = cancel.cancelled() => {
            conn.close().await;
            transition(&mut state, SessionState::Failed);
            return;
        }
    }

    transition(&mut state, SessionState::Streaming);
    let mut last_seq: Option<i64> = None;

    loop {
        let received = tokio::select! {
            received = conn.receive() => received,
            _ = &mut deadline => {
                conn.close().await;
                return fail(
                    &tx,
                    &mut state,
                    SparkError::Connection("session timed out before the terminal chunk".to_string()),
                );
            }
            _ = cancel.cancelled() => {
                conn.close().await;
                transition(&mut state, SessionState::Failed);
                return;
            }
        };

        let frame = match received {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                conn.close().await;
                return fail(
                    &tx,
                    &mut state,
                    SparkError::Connection("connection closed before the terminal chunk".to_string()),
                );
            }
            Err(err) => {
                conn.close().await;
                return fail(&tx, &mut state, err);
            }
        };

        let chunk = match codec::decode(&frame) {
            Ok(chunk) => chunk,
            Err(err) => {
                conn.close().await;
                return fail(&tx, &mut state, err);
            }
        };

        // Protocol-level rejection ends the session regardless of any
        // choices status the frame may carry.
        if chunk.header.code != 0 {
            let err = SparkError::Protocol {
                code: Some(chunk.header.code),
                message: chunk
                    .header
                    .message
                    .clone()
                    .unwrap_or_else(|| "request rejected".to_string()),
                raw: None,
            };
            conn.close().await;
            return fail(&tx, &mut state, err);
        }

        let (terminal, seq, usage) = match chunk.payload.as_ref() {
            Some(payload) => (
                payload.choices.is_terminal(),
                payload.choices.seq,
                payload.usage.as_ref().map(|usage| usage.text),
            ),
            None => {
                conn.close().await;
                return fail(
                    &tx,
                    &mut state,
                    SparkError::Protocol {
                        code: None,
                        message: "chunk is missing its payload".to_string(),
                        raw: None,
                    },
                );
            }
        };

        if let Some(last) = last_seq {
            if seq < last {
                warn!(seq, last, sid = %chunk.header.sid, "chunk sequence went backwards");
            }
        }
        last_seq = Some(seq);

        let _ = tx.send(StreamEvent::Chunk(chunk));

        if terminal {
            transition(&mut state, SessionState::Completed);
            let _ = tx.send(StreamEvent::Completed { usage });
            conn.close().await;
            return;
        }
    }
}
