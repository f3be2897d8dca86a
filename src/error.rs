use thiserror::Error;

/// Unified error type for git-release-manager operations
#[derive(Error, Debug)]
pub enum GitReleaseError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Function {0} not implemented")]
    Unimplemented(String),

    #[error("Operation already in progress: {0}")]
    Busy(String),

    #[error("Hook error: {0}")]
    Hook(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-release-manager
pub type Result<T> = std::result::Result<T, GitReleaseError>;

impl GitReleaseError {
    /// Create a validation error with context
    pub fn validation(msg: impl Into<String>) -> Self {
        GitReleaseError::Validation(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GitReleaseError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        GitReleaseError::Version(msg.into())
    }

    /// Create an API error from a status code and GitHub's message
    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        GitReleaseError::Api {
            status,
            message: msg.into(),
        }
    }

    /// Create a hook error with context
    pub fn hook(msg: impl Into<String>) -> Self {
        GitReleaseError::Hook(msg.into())
    }

    /// Error returned by stubbed operations of test doubles
    pub fn unimplemented(function: impl Into<String>) -> Self {
        GitReleaseError::Unimplemented(function.into())
    }

    /// True when the remote answered 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitReleaseError::Api { status: 404, .. })
    }

    /// True for errors raised before any network call was attempted
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GitReleaseError::Validation(_) | GitReleaseError::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GitReleaseError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GitReleaseError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_api_error_display() {
        let err = GitReleaseError::api(422, "Reference already exists");
        assert_eq!(
            err.to_string(),
            "GitHub API error (422): Reference already exists"
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(GitReleaseError::api(404, "Branch not found").is_not_found());
        assert!(!GitReleaseError::api(422, "Validation Failed").is_not_found());
        assert!(!GitReleaseError::validation("x").is_not_found());
    }

    #[test]
    fn test_is_validation() {
        assert!(GitReleaseError::validation("owner is empty").is_validation());
        assert!(GitReleaseError::config("bad toml").is_validation());
        assert!(!GitReleaseError::api(500, "boom").is_validation());
    }

    #[test]
    fn test_unimplemented_message() {
        let err = GitReleaseError::unimplemented("getHost");
        assert_eq!(err.to_string(), "Function getHost not implemented");
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (GitReleaseError::validation("x"), "Validation failed"),
            (GitReleaseError::config("x"), "Configuration error"),
            (GitReleaseError::version("x"), "Version parsing error"),
            (GitReleaseError::hook("x"), "Hook error"),
            (GitReleaseError::Busy("x".to_string()), "Operation already in progress"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
