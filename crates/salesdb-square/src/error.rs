use salesdb_core::ExtractionFailureKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SquareError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Square server error: HTTP {status}")]
    ServerError { status: u16 },

    #[error("rate limited by Square (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Square rejected the access token: HTTP {status}")]
    Unauthorized { status: u16 },

    #[error("Square rejected the request: HTTP {status}: {detail}")]
    BadRequest { status: u16, detail: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("pagination limit reached for location {location_id}: exceeded {max_pages} pages")]
    PaginationLimit {
        location_id: String,
        max_pages: usize,
    },

    #[error("gave up after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<SquareError>,
    },

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("request cancelled")]
    Cancelled,
}

/// Network failures worth another attempt: timeouts, refused or reset
/// connections, connections closed mid-response, and body reads. Builder,
/// redirect and decode errors repeat identically and are not.
pub(crate) fn is_transient_http(err: &reqwest::Error) -> bool {
    !(err.is_builder() || err.is_redirect() || err.is_decode())
}

impl SquareError {
    /// Which extraction failure this error escalates to once retrying stops.
    #[must_use]
    pub fn kind(&self) -> ExtractionFailureKind {
        match self {
            SquareError::Http(e) if is_transient_http(e) => ExtractionFailureKind::Transient,
            SquareError::ServerError { .. } => ExtractionFailureKind::Transient,
            SquareError::RateLimited { .. } => ExtractionFailureKind::RateLimited,
            SquareError::RetriesExhausted { source, .. } => source.kind(),
            SquareError::Http(_)
            | SquareError::Unauthorized { .. }
            | SquareError::BadRequest { .. }
            | SquareError::UnexpectedStatus { .. }
            | SquareError::Deserialize { .. }
            | SquareError::PaginationLimit { .. }
            | SquareError::InvalidConfig(_)
            | SquareError::Cancelled => ExtractionFailureKind::Fatal,
        }
    }

    /// Number of requests made for the failing page.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            SquareError::RetriesExhausted { attempts, .. } => *attempts,
            _ => 1,
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SquareError::Cancelled)
    }
}
