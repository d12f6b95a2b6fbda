use directory::DirectoryError;
use registry::RegistryError;
use thiserror::Error;

pub type ConnectorResult<T> = Result<T, ConnectorError>;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError)
}
