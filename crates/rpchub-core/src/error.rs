//! Shared error type across rpchub crates.

use serde_json::Value;
use thiserror::Error;

use crate::protocol::envelope::ErrorObject;

/// Wire error codes (stable API).
///
/// The first five are the reserved JSON-RPC 2.0 codes. The hub's own
/// server errors live in the implementation-defined `-32000..=-32099` range.
/// `Domain` carries whatever a handler chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Payload is not JSON, or has trailing data after the value.
    ParseError,
    /// JSON, but not a valid request envelope.
    InvalidRequest,
    /// No handler registered under the method name.
    MethodNotFound,
    /// Params did not parse into the handler's type.
    InvalidParams,
    /// Anything else that went wrong server-side.
    InternalError,
    /// Handler exceeded the dispatch timeout.
    Timeout,
    /// Event name was never registered.
    UnknownEvent,
    /// Subscription attempted from a transport that cannot receive events.
    SubscriptionsUnavailable,
    /// Connection is tearing down.
    ConnectionClosed,
    /// Bounded queue is full.
    QueueFull,
    /// Handler-defined code.
    Domain(i64),
}

impl ErrorCode {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
    pub const TIMEOUT: i64 = -32000;
    pub const UNKNOWN_EVENT: i64 = -32001;
    pub const SUBSCRIPTIONS_UNAVAILABLE: i64 = -32002;
    pub const CONNECTION_CLOSED: i64 = -32003;
    pub const QUEUE_FULL: i64 = -32004;

    /// Integer representation used in JSON error objects.
    pub fn as_i64(self) -> i64 {
        match self {
            ErrorCode::ParseError => Self::PARSE_ERROR,
            ErrorCode::InvalidRequest => Self::INVALID_REQUEST,
            ErrorCode::MethodNotFound => Self::METHOD_NOT_FOUND,
            ErrorCode::InvalidParams => Self::INVALID_PARAMS,
            ErrorCode::InternalError => Self::INTERNAL_ERROR,
            ErrorCode::Timeout => Self::TIMEOUT,
            ErrorCode::UnknownEvent => Self::UNKNOWN_EVENT,
            ErrorCode::SubscriptionsUnavailable => Self::SUBSCRIPTIONS_UNAVAILABLE,
            ErrorCode::ConnectionClosed => Self::CONNECTION_CLOSED,
            ErrorCode::QueueFull => Self::QUEUE_FULL,
            ErrorCode::Domain(c) => c,
        }
    }

    /// Inverse of [`ErrorCode::as_i64`]; unknown codes become `Domain`.
    pub fn from_i64(code: i64) -> Self {
        match code {
            Self::PARSE_ERROR => ErrorCode::ParseError,
            Self::INVALID_REQUEST => ErrorCode::InvalidRequest,
            Self::METHOD_NOT_FOUND => ErrorCode::MethodNotFound,
            Self::INVALID_PARAMS => ErrorCode::InvalidParams,
            Self::INTERNAL_ERROR => ErrorCode::InternalError,
            Self::TIMEOUT => ErrorCode::Timeout,
            Self::UNKNOWN_EVENT => ErrorCode::UnknownEvent,
            Self::SUBSCRIPTIONS_UNAVAILABLE => ErrorCode::SubscriptionsUnavailable,
            Self::CONNECTION_CLOSED => ErrorCode::ConnectionClosed,
            Self::QUEUE_FULL => ErrorCode::QueueFull,
            other => ErrorCode::Domain(other),
        }
    }

    /// Short label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::MethodNotFound => "METHOD_NOT_FOUND",
            ErrorCode::InvalidParams => "INVALID_PARAMS",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::UnknownEvent => "UNKNOWN_EVENT",
            ErrorCode::SubscriptionsUnavailable => "SUBSCRIPTIONS_UNAVAILABLE",
            ErrorCode::ConnectionClosed => "CONNECTION_CLOSED",
            ErrorCode::QueueFull => "QUEUE_FULL",
            ErrorCode::Domain(_) => "DOMAIN",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, HubError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("method not found: {0}")]
    MethodNotFound(String),
    #[error("invalid params for {method}: {reason}")]
    InvalidParams { method: String, reason: String },
    #[error("internal error: {0}")]
    Internal(String),
    #[error("{method} timed out after {after_ms}ms")]
    Timeout { method: String, after_ms: u64 },
    #[error("unknown event: {0}")]
    UnknownEvent(String),
    #[error("subscriptions are not available on the {0} transport")]
    SubscriptionsUnavailable(&'static str),
    #[error("connection closed")]
    ConnectionClosed,
    #[error("queue full")]
    QueueFull,
    #[error("{message}")]
    Domain {
        code: i64,
        message: String,
        data: Option<Value>,
    },
    #[error("method already registered: {0}")]
    DuplicateMethod(String),
    #[error("config: {0}")]
    Config(String),
}

impl HubError {
    /// Handler-defined error with its own code and message.
    pub fn domain(code: i64, message: impl Into<String>) -> Self {
        HubError::Domain {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attach debug data to a domain error. Other variants are returned unchanged.
    pub fn with_data(self, value: Value) -> Self {
        match self {
            HubError::Domain { code, message, .. } => HubError::Domain {
                code,
                message,
                data: Some(value),
            },
            other => other,
        }
    }

    /// Map to a stable wire code.
    pub fn code(&self) -> ErrorCode {
        match self {
            HubError::Parse(_) => ErrorCode::ParseError,
            HubError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            HubError::MethodNotFound(_) => ErrorCode::MethodNotFound,
            HubError::InvalidParams { .. } => ErrorCode::InvalidParams,
            HubError::Internal(_) => ErrorCode::InternalError,
            HubError::Timeout { .. } => ErrorCode::Timeout,
            HubError::UnknownEvent(_) => ErrorCode::UnknownEvent,
            HubError::SubscriptionsUnavailable(_) => ErrorCode::SubscriptionsUnavailable,
            HubError::ConnectionClosed => ErrorCode::ConnectionClosed,
            HubError::QueueFull => ErrorCode::QueueFull,
            HubError::Domain { code, .. } => ErrorCode::from_i64(*code),
            HubError::DuplicateMethod(_) | HubError::Config(_) => ErrorCode::InternalError,
        }
    }

    /// Errors whose code and message are passed to clients verbatim.
    /// Everything else gets wrapped as an internal error by the dispatcher.
    pub fn is_client_facing(&self) -> bool {
        matches!(
            self,
            HubError::Domain { .. }
                | HubError::InvalidParams { .. }
                | HubError::MethodNotFound(_)
                | HubError::Timeout { .. }
                | HubError::UnknownEvent(_)
                | HubError::SubscriptionsUnavailable(_)
                | HubError::ConnectionClosed
                | HubError::QueueFull
        )
    }

    /// Build the JSON-RPC error object for this error.
    pub fn to_error_object(&self) -> ErrorObject {
        let data = match self {
            HubError::Domain { data, .. } => data.clone(),
            _ => None,
        };
        ErrorObject {
            code: self.code().as_i64(),
            message: self.to_string(),
            data,
        }
    }
}

impl From<ErrorObject> for HubError {
    fn from(obj: ErrorObject) -> Self {
        HubError::Domain {
            code: obj.code,
            message: obj.message,
            data: obj.data,
        }
    }
}
