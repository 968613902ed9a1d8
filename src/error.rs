use crate::claims::ClaimError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    /// Single ownership broken inside one pass; the pass is abandoned.
    #[error("duplicate claim: {0}")]
    DuplicateClaim(#[from] ClaimError),

    #[error("ledger has no local head")]
    NoLocalHead,

    #[cfg(feature = "export")]
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlotError>;
