use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid entity id: {0:?}")]
    InvalidEntityId(String),
    #[error("invalid partner id: {0:?}")]
    InvalidPartnerId(String),
    #[error("foreign item has no code")]
    MissingCode,
}

pub type Result<T> = std::result::Result<T, ModelError>;
