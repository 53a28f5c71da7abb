use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("{endpoint} request failed{}: {message}", StatusSuffix(.status))]
    Transport {
        endpoint: &'static str,
        status: Option<u16>,
        message: String,
    },

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl SearchError {
    /// Build a transport error for `endpoint` from a `reqwest` failure,
    /// keeping the HTTP status when the server answered.
    pub fn transport(endpoint: &'static str, err: reqwest::Error) -> Self {
        SearchError::Transport {
            endpoint,
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }

    /// A response arrived but did not have the expected shape.
    pub fn shape(endpoint: &'static str, message: impl Into<String>) -> Self {
        SearchError::Transport {
            endpoint,
            status: None,
            message: format!("unexpected response shape: {}", message.into()),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, SearchError::Transport { .. })
    }

    /// HTTP status carried by a transport error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SearchError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

struct StatusSuffix<'a>(&'a Option<u16>);

impl fmt::Display for StatusSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(code) => write!(f, " with status {}", code),
            None => Ok(()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
