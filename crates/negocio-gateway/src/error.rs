//! # Gateway Error Types
//!
//! Error types for remote service operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  HTTP failure (reqwest::Error / non-2xx status)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GatewayError (this module) ← adds categorization; 401 is singled      │
//! │       │                        out so screens can say "session         │
//! │       ▼                        expired" instead of a raw status        │
//! │  ServiceError (negocio-services) ← what the screens display            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Remote service operation errors.
///
/// The service's own message is surfaced where it is safe to show; transport
/// details are logged and replaced with a generic message.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP 401 from the service.
    ///
    /// Distinguished from other statuses so the user sees a "session
    /// expired" message instead of a raw error.
    #[error("Sesión expirada, inicia sesión nuevamente")]
    Unauthorized,

    /// Resource not found on the service.
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Any other non-success HTTP status.
    #[error("Service error {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection, DNS, or timeout failure before a status was received.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered 2xx but the payload didn't match the schema.
    #[error("Invalid payload from service: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Creates a NotFound error for a given resource type and ID.
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        GatewayError::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Creates a Status error.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        GatewayError::Status {
            status,
            message: message.into(),
        }
    }
}

/// Convert reqwest errors to GatewayError.
///
/// ## Error Mapping
/// ```text
/// timeout / connect             → GatewayError::Transport
/// body decode                   → GatewayError::Decode
/// anything else pre-status      → GatewayError::Transport
/// ```
/// Non-2xx statuses never reach this path; they are mapped explicitly when
/// the response is checked.
impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_message_is_user_facing() {
        assert_eq!(
            GatewayError::Unauthorized.to_string(),
            "Sesión expirada, inicia sesión nuevamente"
        );
    }

    #[test]
    fn test_not_found_ctor() {
        let err = GatewayError::not_found("Product", "p-1");
        assert_eq!(err.to_string(), "Product not found: p-1");
    }
}
