//! # Session Store Error Types

use thiserror::Error;

/// Local store operation errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation targeted the principal admin record.
    ///
    /// Raised before any persistence happens: the protected identity can
    /// never be deleted, deactivated, or edited.
    #[error("El administrador principal no puede ser modificado ni eliminado")]
    ProtectedAdmin,

    /// User not found in the local directory.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Duplicate username or email in the local directory.
    #[error("Duplicate {field}: '{value}' already exists")]
    DuplicateUser { field: String, value: String },

    /// Filesystem failure while persisting.
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted document could not be encoded or decoded.
    #[error("Store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for session-store operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_admin_message() {
        assert_eq!(
            SessionError::ProtectedAdmin.to_string(),
            "El administrador principal no puede ser modificado ni eliminado"
        );
    }
}
