//! Error types for sheetsync-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::OrderNumber;

/// All errors that can arise from order-store and config operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None` — cannot locate `~/.sheetsync/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The order book file did not exist at the expected path.
    #[error("order store not found at {path}")]
    StoreNotFound { path: PathBuf },

    /// An order number that is not present in the store.
    #[error("unknown order '{0}'")]
    UnknownOrder(OrderNumber),
}
