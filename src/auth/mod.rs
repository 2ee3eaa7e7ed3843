//! Request signing for the Spark WebSocket endpoints.
//!
//! Every connection attempt is guarded by a time-limited signature: the
//! current GMT wall-clock time is bound into an HMAC-SHA256 digest over the
//! host, date, and request line, and the result travels as query parameters
//! on the connection URL. Servers reject requests outside a small clock-skew
//! window, so the query must be computed immediately before each connect and
//! never cached or reused across sessions.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::Sha256;

use crate::error::SparkError;

/// Default service host for the hosted Spark endpoints.
pub const DEFAULT_HOST: &str = "spark-api.xf-yun.com";

/// RFC-1123 date layout with a literal GMT zone, as the signature scheme
/// requires regardless of the local clock.
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Query-string escaping: RFC 3986 unreserved characters pass through,
/// everything else is percent-encoded.
const QUERY_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

type HmacSha256 = Hmac<Sha256>;

/// Credential material for one Spark application.
///
/// Owned by the caller; [`sign_at`] only borrows it.
#[derive(Clone, Debug)]
pub struct Credential {
    pub app_key: String,
    pub app_secret: String,
    pub host: String,
}

impl Credential {
    pub fn new(
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret: app_secret.into(),
            host: host.into(),
        }
    }

    /// Reads `SPARK_APP_KEY` and `SPARK_APP_SECRET` from the environment.
    /// `SPARK_HOST` overrides the default service host when set.
    pub fn from_env() -> Result<Self, std::env::VarError> {
        Ok(Self {
            app_key: std::env::var("SPARK_APP_KEY")?,
            app_secret: std::env::var("SPARK_APP_SECRET")?,
            host: std::env::var("SPARK_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
        })
    }
}

/// Builds the authorization query for `path` as of the current wall-clock
/// time. Call once per connection attempt, right before dialing.
pub fn sign(credential: &Credential, path: &str) -> Result<String, SparkError> {
    sign_at(credential, path, Utc::now())
}

/// Builds the authorization query for `path` as of `timestamp`.
///
/// Pure function of its inputs, which keeps the signature reproducible under
/// a fixed clock; [`sign`] is the wall-clock wrapper. The returned string is
/// ready to append after `?` on the connection URL:
/// `authorization=<..>&date=<..>&host=<host>`. The `authorization` and
/// `date` values are percent-encoded; `host` is a plain hostname and passes
/// through unescaped.
pub fn sign_at(
    credential: &Credential,
    path: &str,
    timestamp: DateTime<Utc>,
) -> Result<String, SparkError> {
    let date = timestamp.format(DATE_FORMAT).to_string();
    let canonical = format!(
        "host: {}\ndate: {}\nGET {} HTTP/1.1",
        credential.host, date, path
    );

    let mut mac = HmacSha256::new_from_slice(credential.app_secret.as_bytes())
        .map_err(|err| SparkError::Signature(err.to_string()))?;
    mac.update(canonical.as_bytes());
    let digest = base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());

    let header_value = format!(
        "api_key=\"{}\", algorithm=\"hmac-sha256\", headers=\"host date request-line\", signature=\"{}\"",
        credential.app_key, digest
    );
    let authorization = base64::engine::general_purpose::STANDARD.encode(header_value);

    Ok(format!(
        "authorization={}&date={}&host={}",
        utf8_percent_encode(&authorization, QUERY_SET),
        utf8_percent_encode(&date, QUERY_SET),
        credential.host
    ))
}
