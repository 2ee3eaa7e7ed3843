use thiserror::Error;

/// Errors produced while signing, encoding, or running a chat session.
#[derive(Debug, Error)]
pub enum SparkError {
    /// The signing computation failed (bad key material or HMAC setup).
    /// Fatal to the attempted session; never retried here.
    #[error("signature computation failed: {0}")]
    Signature(String),

    /// The outbound request could not be encoded. This signals a programming
    /// or schema error rather than a runtime condition.
    #[error("failed to encode chat request: {0}")]
    Serialization(#[source] serde_json::Error),

    /// An inbound message failed to decode, or the server rejected the
    /// session with a nonzero header code.
    #[error("protocol error{}: {}", code_suffix(.code), .message)]
    Protocol {
        /// Server-assigned error code, when the frame decoded far enough to
        /// carry one.
        code: Option<i64>,
        message: String,
        /// Raw frame text, kept for diagnostics when decoding failed.
        raw: Option<String>,
    },

    /// Transport-level failure: connect error, unexpected disconnect before
    /// the terminal chunk, or session timeout.
    #[error("connection error: {0}")]
    Connection(String),
}

fn code_suffix(code: &Option<i64>) -> String {
    match code {
        Some(code) => format!(" (code {code})"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_display_includes_code_when_present() {
        let err = SparkError::Protocol {
            code: Some(10163),
            message: "invalid parameter".to_string(),
            raw: None,
        };
        assert_eq!(err.to_string(), "protocol error (code 10163): invalid parameter");

        let err = SparkError::Protocol {
            code: None,
            message: "unreadable frame".to_string(),
            raw: Some("{oops".to_string()),
        };
        assert_eq!(err.to_string(), "protocol error: unreadable frame");
    }

    #[test]
    fn connection_display_carries_detail() {
        let err = SparkError::Connection("dial refused".to_string());
        assert_eq!(err.to_string(), "connection error: dial refused");
    }
}
