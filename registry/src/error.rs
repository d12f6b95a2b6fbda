use thiserror::Error;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry backend unavailable: {reason}")]
    Backend { reason: String },

    #[error("registry query failed: {reason}")]
    Query { reason: String }
}
