//! Error types for the collection provider.
//!
//! Backend failures surface as [`ClientError`]. At the execution boundary they
//! are translated into the uniform [`ApiError`] shape, except for failure kinds
//! that have no translation rule, which are passed through untouched inside
//! [`ProviderError::Backend`].
//!
//! | Client Error | Translated To |
//! |--------------|---------------|
//! | `NotFound` (legacy protocol) | `ApiError { status: code, title: message, detail: message }` |
//! | `Response` (current protocol) | `ApiError { status, title: reason, detail: body }` |
//! | anything else | `ProviderError::Backend` (untranslated) |

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::sync::Arc;

use serde_json::{Value, json};
use thiserror::Error;

/// The primary error type returned by [`CollectionProvider::provide`](crate::CollectionProvider::provide).
#[derive(Error, Debug)]
pub enum ProviderError {
    /// A backend failure translated into the uniform error shape.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A backend failure with no translation rule.
    #[error("unhandled search backend failure: {0}")]
    Backend(#[source] ClientError),

    /// A query extension failed while composing the request body.
    #[error(transparent)]
    Extension(#[from] ExtensionError),

    /// `size` or `from` ended up holding something other than a non-negative integer.
    #[error("invalid pagination value for '{key}': {value}")]
    InvalidPagination { key: String, value: Value },
}

impl From<ClientError> for ProviderError {
    fn from(err: ClientError) -> Self {
        translate(err)
    }
}

/// Translates a backend client failure.
///
/// Legacy not-found failures and current-protocol response failures become an
/// [`ApiError`]; every other failure is returned as [`ProviderError::Backend`].
pub fn translate(err: ClientError) -> ProviderError {
    match err {
        ClientError::NotFound {
            code,
            message,
            trace,
        } => ProviderError::Api(ApiError::new(code, message.clone(), message, trace)),
        ClientError::Response { response, trace } => ProviderError::Api(ApiError::new(
            response.status,
            response.reason,
            response.body,
            trace,
        )),
        other => {
            tracing::warn!("Search backend failure has no translation: {}", other);
            ProviderError::Backend(other)
        }
    }
}

/// The uniform error raised for translated backend failures.
///
/// Carries enough structure to render an API error response. The original
/// failure's trace is kept for diagnostics but never interpreted.
#[derive(Error, Debug, Clone)]
#[error("{status} {title}: {detail}")]
pub struct ApiError {
    status: u16,
    title: String,
    detail: String,
    original_trace: OriginalTrace,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(
        status: u16,
        title: impl Into<String>,
        detail: impl Into<String>,
        original_trace: OriginalTrace,
    ) -> Self {
        Self {
            status,
            title: title.into(),
            detail: detail.into(),
            original_trace,
        }
    }

    /// Returns the HTTP-like status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the short, human-readable title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the detailed explanation.
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Returns the trace captured where the backend failure occurred.
    pub fn original_trace(&self) -> &OriginalTrace {
        &self.original_trace
    }

    /// Renders the error as an RFC 7807 problem details object.
    pub fn to_problem_details(&self) -> Value {
        json!({
            "type": "about:blank",
            "title": self.title,
            "detail": self.detail,
            "status": self.status,
        })
    }
}

/// Opaque trace data captured when a backend failure is constructed.
#[derive(Clone)]
pub struct OriginalTrace(Arc<Backtrace>);

impl OriginalTrace {
    /// Captures the current backtrace (honors `RUST_BACKTRACE`/`RUST_LIB_BACKTRACE`).
    pub fn capture() -> Self {
        Self(Arc::new(Backtrace::capture()))
    }

    /// A trace that records nothing.
    pub fn disabled() -> Self {
        Self(Arc::new(Backtrace::disabled()))
    }

    /// Returns the underlying backtrace.
    pub fn backtrace(&self) -> &Backtrace {
        &self.0
    }

    /// Returns whether frames were actually captured.
    pub fn status(&self) -> BacktraceStatus {
        self.0.status()
    }
}

impl fmt::Debug for OriginalTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OriginalTrace")
            .field(&self.0.status())
            .finish()
    }
}

impl fmt::Display for OriginalTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Failures reported by a [`SearchClient`](crate::client::SearchClient).
#[derive(Error, Debug)]
pub enum ClientError {
    /// Legacy-protocol not-found failure (missing index or document).
    #[error("search backend returned {code}: {message}")]
    NotFound {
        code: u16,
        message: String,
        trace: OriginalTrace,
    },

    /// Current-protocol client-response failure (any non-2xx response).
    #[error("search backend responded {response}")]
    Response {
        response: ErrorResponse,
        trace: OriginalTrace,
    },

    /// Legacy-protocol non-2xx response other than 404.
    #[error("search backend returned unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The request never produced a response.
    #[error("search transport failed: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The response body could not be decoded.
    #[error("invalid search response: {message}")]
    InvalidResponse { message: String },

    /// The client could not be built from its configuration.
    #[error("invalid search client configuration: {message}")]
    Configuration { message: String },
}

impl ClientError {
    /// Builds a legacy not-found failure, capturing the current trace.
    pub fn not_found(code: u16, message: impl Into<String>) -> Self {
        ClientError::NotFound {
            code,
            message: message.into(),
            trace: OriginalTrace::capture(),
        }
    }

    /// Builds a current-protocol response failure, capturing the current trace.
    pub fn response(status: u16, reason: impl Into<String>, body: impl Into<String>) -> Self {
        ClientError::Response {
            response: ErrorResponse {
                status,
                reason: reason.into(),
                body: body.into(),
            },
            trace: OriginalTrace::capture(),
        }
    }
}

/// The HTTP response embedded in a current-protocol failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase for the status code.
    pub reason: String,
    /// Raw response body text.
    pub body: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.reason)
    }
}

/// Errors raised by query extensions.
#[derive(Error, Debug)]
pub enum ExtensionError {
    /// The extension could not contribute its fragment.
    #[error("collection extension '{extension}' failed: {message}")]
    Failed { extension: String, message: String },

    /// A request filter value cannot be turned into a query clause.
    #[error("invalid value for filter '{parameter}': {message}")]
    InvalidFilter { parameter: String, message: String },
}

/// Errors raised while turning a search hit into a domain object.
#[derive(Error, Debug)]
pub enum DenormalizeError {
    /// The hit has no `_source` document.
    #[error("search hit {id} has no _source")]
    MissingSource { id: String },

    /// The source document does not match the target type.
    #[error("cannot denormalize {resource_class}: {source}")]
    Deserialize {
        resource_class: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
