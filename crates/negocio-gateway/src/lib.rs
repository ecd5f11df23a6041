//! # negocio-gateway: Remote Resource Layer for Mi Negocio
//!
//! This crate provides access to the remote backend-as-a-service that stores
//! clients, products, orders, order lines, invoices, and kardex movements,
//! plus the auth endpoints.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Mi Negocio Data Flow                               │
//! │                                                                         │
//! │  Workflow (checkout, kardex engine, login)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  negocio-gateway (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  api (traits) │    │  HttpGateway  │    │MemoryGateway │  │   │
//! │  │   │  per entity   │◄───│  reqwest/JSON │    │ test double  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Remote service: /clientes /productos /pedidos /detalle_pedidos        │
//! │                  /facturas /kardex /auth                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`api`] - Resource traits and typed payloads
//! - [`http`] - reqwest implementation against the remote service
//! - [`memory`] - In-process implementation with failure injection
//! - [`error`] - Gateway error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod error;
pub mod http;
pub mod memory;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{AuthGateway, AuthSession, Gateway};
pub use error::{GatewayError, GatewayResult};
pub use http::HttpGateway;
pub use memory::MemoryGateway;
