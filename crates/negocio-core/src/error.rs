//! # Error Types
//!
//! Domain-specific error types for negocio-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  negocio-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  negocio-gateway errors (separate crate)                               │
//! │  └── GatewayError     - Remote service failures                        │
//! │                                                                         │
//! │  negocio-services errors (separate crate)                              │
//! │  └── ServiceError     - What the screens see                           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → screen             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, quantities, ...)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are caught at the
/// service boundary and translated to user-facing messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Not enough stock to satisfy the requested quantity.
    ///
    /// Raised both when a cart mutation would exceed available stock and
    /// when an outbound kardex movement would drive stock negative.
    #[error("Stock insuficiente para {name}: disponibles {available}, solicitadas {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Movement quantity below 1, or a malformed movement request.
    #[error("Movimiento inválido: {reason}")]
    InvalidMovement { reason: String },

    /// Cart has exceeded maximum allowed distinct items.
    #[error("El carrito no puede tener más de {max} productos")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("La cantidad {requested} excede el máximo permitido ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Referenced product is not in the cart.
    #[error("El producto {product_id} no está en el carrito")]
    ItemNotInCart { product_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Error de validación: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements. Used for early
/// validation before business logic runs; they never reach the gateway.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Mochila Wayuu".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Stock insuficiente para Mochila Wayuu: disponibles 3, solicitadas 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
