use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Host with alias '{0}' already exists")]
    DuplicateAlias(String),

    #[error("Host with alias '{0}' not found")]
    NotFound(String),

    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("SSH connection failed: {0}")]
    ConnectionError(String),

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Transfer failed: {0}")]
    TransferError(String),

    #[error("Failed to launch ssh client: {0}")]
    LaunchError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("Russh error: {0}")]
    RusshError(#[from] russh::Error),

    #[error("Russh Sftp error: {0}")]
    RusshSftpError(#[from] russh_sftp::client::error::Error),
}

impl AppError {
    /// Whether the presentation layer can show this as a status message and carry on.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AppError::ConfigError(_) | AppError::IOError(_))
    }
}

/// Application result type alias
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_recoverable() {
        assert!(AppError::NotFound("db1".to_string()).is_recoverable());
        assert!(AppError::ConnectionError("refused".to_string()).is_recoverable());
        assert!(AppError::ValidationError("port".to_string()).is_recoverable());
        assert!(!AppError::ConfigError("bad toml".to_string()).is_recoverable());
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!AppError::from(io).is_recoverable());
    }
}
