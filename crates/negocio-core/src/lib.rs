//! # negocio-core: Pure Business Logic for Mi Negocio
//!
//! This crate is the **heart** of Mi Negocio. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Mi Negocio Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                       Screens (frontend)                        │   │
//! │  │   Catálogo ──► Carrito ──► Checkout ──► Facturas ──► Kardex     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                     negocio-services                            │   │
//! │  │    checkout, kardex engine, session & role gate                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ negocio-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  kardex   │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │ stock math│  │   │
//! │  │   │  Invoice  │  │ IVA split │  │  totals   │  │ valuation │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, Invoice, KardexMovement, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart state and the dual-total derivation
//! - [`kardex`] - Stock-movement arithmetic and valuation
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Network, file system, and local storage access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are whole pesos (i64), never floats
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod kardex;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use negocio_core::Money` instead of
// `use negocio_core::money::Money`

pub use cart::{parse_shipping, Cart, CartItem, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use kardex::{apply_movement, existencias, ExistenciasRow, ExistenciasSummary};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Email of the principal admin account.
///
/// This identity is protected everywhere: it can never be deleted,
/// deactivated, or have its role or credentials changed. Guards reject such
/// attempts before any persistence call is made.
pub const PRINCIPAL_ADMIN_EMAIL: &str = "admin@minegocio.co";

/// Maximum distinct items allowed in a single cart.
///
/// Prevents runaway carts and keeps order sizes reasonable for a
/// single-operator shop.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in cart.
///
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum IVA rate in basis points (100%).
pub const MAX_TAX_RATE_BPS: u32 = 10_000;

/// Maximum entries retained in the activity log.
///
/// The log is a most-recent-first ring: appending past the cap evicts the
/// oldest entry.
pub const ACTIVITY_LOG_CAPACITY: usize = 100;
