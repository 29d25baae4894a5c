use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] common::CoreError),
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn persistence(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Persistence(format!("{context}: {err}"))
    }
}
