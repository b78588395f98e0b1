//! Error types for the Segment client.

/// Errors that can occur when building or sending requests.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration, or no usable transport could be built.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A request that cannot be part of a batch was added to one.
    #[error("Cannot batch request of type \"{kind}\"")]
    InvalidBatchRequest { kind: &'static str },

    /// Serialization error.
    #[error("Cannot encode JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a 5xx status.
    #[error("Server error (HTTP status {status})")]
    Server { status: u16 },

    /// The API answered with a 4xx status.
    #[error("HTTP status {status} {body}")]
    Client { status: u16, body: String },

    /// The API answered with anything other than 200 that is not a 4xx or 5xx.
    #[error("Could not complete request (HTTP status {status})")]
    UnknownApi { status: u16 },
}

impl Error {
    /// HTTP status code carried by a response failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Server { status }
            | Error::Client { status, .. }
            | Error::UnknownApi { status } => Some(*status),
            _ => None,
        }
    }
}
