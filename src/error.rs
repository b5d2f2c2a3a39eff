//! Error types for the spring element

use thiserror::Error;

/// Main error type for spring element operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpringError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Element {0} is not bound to a domain - call set_domain() first")]
    Unbound(i32),

    #[error("Node {0} not found in domain")]
    NodeNotFound(i32),

    #[error("Node {0} already exists")]
    DuplicateNode(i32),

    #[error("Unknown response '{0}'")]
    UnknownResponse(String),

    #[error("Response '{0}' is not available for this element")]
    ResponseUnavailable(String),

    #[error("Invalid load: {0}")]
    InvalidLoad(String),
}

/// Result type for spring element operations
pub type SpringResult<T> = Result<T, SpringError>;

/// Non-fatal failure of a state update.
///
/// The step controller is expected to shrink or abort the increment and call
/// `revert_to_last_commit`. Trial state is left untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpdateError {
    #[error("Element {0} is not bound to a domain")]
    Unbound(i32),

    #[error("Node {0} no longer resolves in the domain")]
    NodeMissing(i32),

    #[error("Expected {expected} values for {what}, got {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl UpdateError {
    /// Negative status code reported to the analysis driver
    pub fn status_code(&self) -> i32 {
        match self {
            UpdateError::Unbound(_) => -1,
            UpdateError::NodeMissing(_) => -2,
            UpdateError::SizeMismatch { .. } => -3,
        }
    }
}

/// Failure to reconstruct an element from its wire representation
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Unsupported packet format version {found} (expected {expected})")]
    Version { expected: u32, found: u32 },

    #[error("Stale snapshot: commit tag {found} does not match expected {expected}")]
    StaleCommitTag { expected: i32, found: i32 },

    #[error("Field count mismatch in {section}: expected {expected}, got {actual}")]
    FieldCount {
        section: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid packet contents: {0}")]
    Invalid(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl From<SpringError> for DecodeError {
    fn from(err: SpringError) -> Self {
        DecodeError::Invalid(err.to_string())
    }
}
