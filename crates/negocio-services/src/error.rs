//! # Service Error Type
//!
//! Unified error type for the workflow layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Mi Negocio                             │
//! │                                                                         │
//! │  Screen action                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Workflow (Result<T, ServiceError>)                                     │
//! │       │                                                                 │
//! │       ├── CoreError     (business rule)    ──┐                          │
//! │       ├── GatewayError  (remote failure)   ──┼──► ServiceError ──► UI   │
//! │       ├── SessionError  (local store)      ──┘                          │
//! │       └── workflow-level states (empty cart, no client, forbidden,     │
//! │           invalid credentials)                                          │
//! │                                                                         │
//! │  Nothing is fatal: every failure is scoped to the triggering action    │
//! │  and the rest of the session stays usable.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use negocio_core::CoreError;
use negocio_gateway::GatewayError;
use negocio_session::SessionError;

/// Errors surfaced by the workflow layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Checkout attempted on an empty cart.
    #[error("El carrito está vacío")]
    EmptyCart,

    /// Checkout attempted with no resolvable client.
    #[error("No hay clientes registrados; registra un cliente antes de facturar")]
    NoClient,

    /// Login failed.
    ///
    /// Covers both credential mismatch and service unreachability on
    /// purpose: the user-facing message never reveals which one happened.
    /// The underlying detail is logged.
    #[error("Credenciales inválidas")]
    InvalidCredentials,

    /// The current user lacks the Admin role (or there is no current user).
    #[error("Acceso restringido a administradores")]
    Forbidden,

    /// Business rule violation from negocio-core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Remote service failure.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Local store failure.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Result type for workflow operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_errors_convert() {
        let core: ServiceError = CoreError::CartTooLarge { max: 100 }.into();
        assert!(matches!(core, ServiceError::Core(_)));

        let gateway: ServiceError = GatewayError::Unauthorized.into();
        assert!(matches!(gateway, ServiceError::Gateway(_)));

        let session: ServiceError = SessionError::ProtectedAdmin.into();
        assert!(matches!(session, ServiceError::Session(_)));
    }

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(ServiceError::EmptyCart.to_string(), "El carrito está vacío");
        assert_eq!(
            ServiceError::InvalidCredentials.to_string(),
            "Credenciales inválidas"
        );
    }
}
