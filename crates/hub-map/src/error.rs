//! Resolution errors surfaced to callers.

use thiserror::Error;

use hub_model::ModelError;

/// The only failures `suggest` surfaces.
///
/// Transport and oracle problems are recovered inside the pipeline; a
/// malformed foreign item is a precondition violation and fails fast.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    InvalidItem(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
