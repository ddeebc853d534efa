//! Error types for sheetsync-sheets.

use thiserror::Error;

/// All errors that can arise from spreadsheet API operations.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Bearer token env var is unset — the client cannot be built.
    #[error("missing API credentials: environment variable {0} is not set")]
    MissingCredentials(String),

    /// Non-2xx response from the remote API.
    #[error("sheets API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// Connection-level failure (DNS, TLS, timeout, …).
    #[error("transport error: {0}")]
    Transport(#[from] Box<ureq::Transport>),

    /// The response body did not match the expected wire shape.
    #[error("malformed sheets response: {0}")]
    Json(#[from] serde_json::Error),

    /// Injected failure from the in-memory test double.
    #[error("injected failure: {0}")]
    Injected(String),
}

impl From<ureq::Error> for SheetsError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => SheetsError::Api {
                status,
                body: response
                    .into_string()
                    .unwrap_or_else(|_| "<unreadable body>".to_string()),
            },
            ureq::Error::Transport(transport) => SheetsError::Transport(Box::new(transport)),
        }
    }
}
