//! Error types for the Bybit P2P client library.

use reqwest::header::HeaderMap;
use thiserror::Error;
use time::OffsetDateTime;
use time::macros::format_description;

/// The main error type for all P2P client operations.
#[derive(Error, Debug)]
pub enum P2pError {
    /// One or more required parameters were not supplied.
    ///
    /// Raised before any signing or network work happens.
    #[error("Missing required parameters for {path}: {}", missing.join(", "))]
    MissingParameter {
        /// Path of the operation that was called
        path: &'static str,
        /// Every required name absent from the caller's parameters
        missing: Vec<&'static str>,
    },

    /// A parameter value could not be coerced to the type the API expects.
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Connection, TLS or timeout failure, surfaced as reported by the transport.
    #[error("HTTP request to {} failed: {source}", context.target)]
    Network {
        /// The request that was attempted
        context: Box<RequestContext>,
        /// The underlying transport error
        #[source]
        source: reqwest_middleware::Error,
    },

    /// The server answered with a status other than 200.
    #[error("{message} (HTTP {status}, request: {context})")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Human-readable classification of the status
        message: String,
        /// The request that was attempted
        context: Box<RequestContext>,
        /// Response headers
        headers: HeaderMap,
    },

    /// The server answered 200 but the body was not a valid response envelope.
    #[error("Could not decode JSON (HTTP {status}): {reason}")]
    Decode {
        /// HTTP status code
        status: u16,
        /// Decoder error message
        reason: String,
        /// Raw response body, lossily decoded as UTF-8
        body: String,
        /// The request that was attempted
        context: Box<RequestContext>,
    },

    /// The server answered 200 with a non-zero `retCode`.
    #[error("{error} (request: {context})")]
    Api {
        /// Code and message reported by the API
        error: ApiError,
        /// The request that was attempted
        context: Box<RequestContext>,
        /// Response headers
        headers: HeaderMap,
    },

    /// No credentials were configured on the client
    #[error("Missing credentials: API key and secret required for signed endpoints")]
    MissingCredentials,

    /// Key material could not be loaded or signing failed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Client or credential configuration is incomplete
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading an upload file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),
}

impl P2pError {
    /// The HTTP status for status and decode failures, or the API code for
    /// application errors.
    pub fn status(&self) -> Option<i64> {
        match self {
            P2pError::HttpStatus { status, .. } | P2pError::Decode { status, .. } => {
                Some(i64::from(*status))
            }
            P2pError::Api { error, .. } => Some(error.code),
            _ => None,
        }
    }

    /// The request context attached to failures that happened after dispatch.
    pub fn context(&self) -> Option<&RequestContext> {
        match self {
            P2pError::Network { context, .. }
            | P2pError::HttpStatus { context, .. }
            | P2pError::Decode { context, .. }
            | P2pError::Api { context, .. } => Some(context),
            _ => None,
        }
    }

    /// The application error, if the API rejected the call.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            P2pError::Api { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Check if this is a transport-level failure.
    pub fn is_network(&self) -> bool {
        matches!(self, P2pError::Network { .. })
    }
}

/// Everything needed to reproduce a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Absolute URL of the endpoint, without the query string
    pub target: String,
    /// The canonical payload that was signed
    pub payload: String,
    /// Millisecond timestamp sent in `X-BAPI-TIMESTAMP`
    pub timestamp: u64,
    /// UTC wall-clock time at which the failure was observed
    pub observed_at: OffsetDateTime,
}

impl RequestContext {
    /// Create a context stamped with the current UTC time.
    pub fn new(target: impl Into<String>, payload: impl Into<String>, timestamp: u64) -> Self {
        Self {
            target: target.into(),
            payload: payload.into(),
            timestamp,
            observed_at: OffsetDateTime::now_utc(),
        }
    }
}

impl std::fmt::Display for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clock = self
            .observed_at
            .format(format_description!("[hour]:[minute]:[second]"))
            .unwrap_or_default();
        write!(
            f,
            "{}: {} (timestamp {}, at {} UTC)",
            self.target, self.payload, self.timestamp, clock
        )
    }
}

/// Application-level error returned in the response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The `retCode` / `ret_code` value
    pub code: i64,
    /// The `retMsg` / `ret_msg` value
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (ErrCode: {})", self.message, self.code)
    }
}

impl ApiError {
    /// Create a new API error from code and message.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Check if the request parameters were rejected.
    pub fn is_params_error(&self) -> bool {
        self.code == error_codes::PARAMS_ERROR
    }

    /// Check if the timestamp fell outside the receive window.
    pub fn is_timestamp_expired(&self) -> bool {
        self.code == error_codes::TIMESTAMP_EXPIRED
    }

    /// Check if the API key was rejected.
    pub fn is_invalid_api_key(&self) -> bool {
        self.code == error_codes::INVALID_API_KEY
    }

    /// Check if the signature did not match.
    pub fn is_invalid_signature(&self) -> bool {
        self.code == error_codes::INVALID_SIGNATURE
    }

    /// Check if the key lacks permission for the endpoint.
    pub fn is_permission_denied(&self) -> bool {
        self.code == error_codes::PERMISSION_DENIED
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limit(&self) -> bool {
        self.code == error_codes::TOO_MANY_VISITS
    }

    /// Check if the calling IP is not bound to the API key.
    pub fn is_ip_not_allowed(&self) -> bool {
        self.code == error_codes::UNMATCHED_IP
    }
}

/// Known Bybit `retCode` values for pattern matching.
pub mod error_codes {
    /// Request parameter error
    pub const PARAMS_ERROR: i64 = 10001;
    /// Request time exceeds the receive window
    pub const TIMESTAMP_EXPIRED: i64 = 10002;
    /// API key is invalid, or belongs to the other environment
    pub const INVALID_API_KEY: i64 = 10003;
    /// Signature error
    pub const INVALID_SIGNATURE: i64 = 10004;
    /// Permission denied
    pub const PERMISSION_DENIED: i64 = 10005;
    /// Too many visits
    pub const TOO_MANY_VISITS: i64 = 10006;
    /// Unmatched IP
    pub const UNMATCHED_IP: i64 = 10010;
}
