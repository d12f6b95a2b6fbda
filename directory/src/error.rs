use thiserror::Error;

pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory transport error: {message}")]
    Transport { message: String },

    #[error("directory API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("user not found: {key}")]
    UserNotFound { key: String },

    #[error("group not found: {key}")]
    GroupNotFound { key: String },

    #[error("member not found: {key}")]
    MemberNotFound { key: String },

    #[error("rate limited: retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 }
}

impl DirectoryError {
    /// Structured "entity absent" responses, treated as a miss on reads.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound { .. } | Self::GroupNotFound { .. } | Self::MemberNotFound { .. }
        )
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::RateLimited { .. })
    }

    pub fn retry_after(&self) -> Option<u64> {
        if let Self::RateLimited {
            retry_after_seconds
        } = self
        {
            Some(*retry_after_seconds)
        } else {
            None
        }
    }
}
