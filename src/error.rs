//! Error taxonomy for the coaching core.
//!
//! Nothing in the core retries automatically; every failure surfaces here typed,
//! and the HTTP boundary decides how each variant maps to a status code. The one
//! exception is assessment scoring, which absorbs gateway failures into a
//! sentinel result instead of returning `Generation` (see `assessment`).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The referenced chat session does not exist.
    #[error("chat session {0} not found")]
    SessionNotFound(i64),

    /// The authenticated user does not own the referenced session.
    #[error("chat session {0} does not belong to the requesting user")]
    Forbidden(i64),

    /// Client input failed validation before any external call was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An underlying persistent-store operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// The language-model gateway failed or returned unusable content.
    #[error("text generation failed: {0}")]
    Generation(String),
}
