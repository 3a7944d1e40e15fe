#[derive(Debug, thiserror::Error)]
pub enum RcmpError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A test-definition file could not be loaded. The run skips the file.
    #[error("Setup error in {path}: {reason}")]
    Setup { path: String, reason: String },
}
