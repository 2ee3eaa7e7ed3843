//! Client configuration: credentials, model variants, session limits.
//!
//! Everything here is supplied by the embedding application; the session
//! only reads it.

use std::time::Duration;

use crate::auth::Credential;

/// Maximum wall-clock duration of one streaming session unless overridden.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(60);

/// Spark model variants. Each variant maps to a fixed chat endpoint path and
/// a backend domain selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Model {
    /// Spark3.5 Max.
    Max3_5,
    /// Spark Pro.
    Pro,
    /// Spark v2.0.
    V2,
    /// Spark Lite.
    Lite,
}

impl Model {
    /// Endpoint path for this variant's chat route.
    pub fn path(&self) -> &'static str {
        match self {
            Model::Max3_5 => "/v3.5/chat",
            Model::Pro => "/v3.1/chat",
            Model::V2 => "/v2.1/chat",
            Model::Lite => "/v1.1/chat",
        }
    }

    /// The `parameter.chat.domain` value that selects this variant's backend.
    pub fn domain(&self) -> &'static str {
        match self {
            Model::Max3_5 => "generalv3.5",
            Model::Pro => "generalv3",
            Model::V2 => "generalv2",
            Model::Lite => "general",
        }
    }

    /// Human-readable variant label.
    pub fn label(&self) -> &'static str {
        match self {
            Model::Max3_5 => "Spark3.5 Max",
            Model::Pro => "Spark Pro",
            Model::V2 => "Spark v2.0",
            Model::Lite => "Spark Lite",
        }
    }
}

/// Per-client settings shared by every session the caller starts.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub credential: Credential,
    pub model: Model,
    /// A session that has not seen its terminal chunk within this window
    /// fails with a connection error.
    pub session_timeout: Duration,
}

impl ClientConfig {
    pub fn new(credential: Credential, model: Model) -> Self {
        Self {
            credential,
            model,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }

    pub fn with_session_timeout(mut self, session_timeout: Duration) -> Self {
        self.session_timeout = session_timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_paths_match_the_protocol_routes() {
        assert_eq!(Model::Max3_5.path(), "/v3.5/chat");
        assert_eq!(Model::Pro.path(), "/v3.1/chat");
        assert_eq!(Model::V2.path(), "/v2.1/chat");
        assert_eq!(Model::Lite.path(), "/v1.1/chat");
    }

    #[test]
    fn config_defaults_and_overrides() {
        let config = ClientConfig::new(
            Credential::new("k", "s", "spark-api.xf-yun.com"),
            Model::Max3_5,
        );
        assert_eq!(config.session_timeout, DEFAULT_SESSION_TIMEOUT);

        let config = config.with_session_timeout(Duration::from_secs(5));
        assert_eq!(config.session_timeout, Duration::from_secs(5));
    }
}
