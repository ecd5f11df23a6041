//! # Domain Types
//!
//! Core domain types used throughout Mi Negocio.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Invoice      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  price_pesos    │   │  client_id      │   │  order_id       │       │
//! │  │  stock          │   │  status         │   │  subtotal/tax   │       │
//! │  │  tax_rate_bps   │   │  total_pesos    │   │  shipping/total │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  KardexMovement │   │   OrderStatus   │   │  MovementType   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  stock_before   │   │  Pendiente      │   │  Entrada/Salida │       │
//! │  │  stock_after    │   │  Completado     │   │  Compra/Venta   │       │
//! │  │  quantity       │   │  Enviado        │   │  AjusteEntrada  │       │
//! │  └─────────────────┘   │  Cancelado      │   │  AjusteSalida   │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Vocabulary
//! The remote service speaks Spanish on the wire (`pendiente`, `venta`,
//! `ajuste_entrada`, ...). Enum variants keep those names and serde maps
//! them to lowercase/snake_case strings, so payloads stay compatible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// IVA rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1900 bps = 19% (the common IVA rate here)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
///
/// Stock is mutated only through kardex movements (and checkout fulfillment,
/// which records a `venta` movement per line); never edited directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in catalog and on invoices.
    pub name: String,

    /// Catalog category (e.g. "tejidos", "cerámica").
    pub category: String,

    /// Tax-inclusive unit price in whole pesos.
    pub price_pesos: i64,

    /// Current stock level.
    pub stock: i64,

    /// IVA rate in basis points (1900 = 19%). Zero for exempt goods.
    pub tax_rate_bps: u32,

    /// Optional image reference.
    pub image_url: Option<String>,

    /// Optional description for product details.
    pub description: Option<String>,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_pesos(self.price_pesos)
    }

    /// Returns the tax rate.
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Checks whether the requested quantity is currently in stock.
    #[inline]
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Client
// =============================================================================

/// A client of the shop.
///
/// Referenced by orders and invoices by id (weak reference; deleting a
/// client does not cascade).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

/// The status of an order.
///
/// After creation only the status transitions; no other field is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created at checkout, awaiting handling.
    Pendiente,
    /// Fulfilled.
    Completado,
    /// Handed to the courier.
    Enviado,
    /// Cancelled.
    Cancelado,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pendiente
    }
}

/// An order created from a completed checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub client_id: String,
    pub status: OrderStatus,
    /// Grand total in whole pesos (tax-inclusive lines + shipping).
    pub total_pesos: i64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_pesos(self.total_pesos)
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line item of an order.
///
/// Uses the snapshot pattern: name and unit price are frozen at sale time
/// and stay fixed when the catalog changes later. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Unit price in pesos at time of sale (frozen).
    pub unit_price_pesos: i64,
    /// Line subtotal (unit_price × quantity).
    pub subtotal_pesos: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_pesos(self.unit_price_pesos)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_pesos(self.subtotal_pesos)
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// The status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pendiente,
    Pagada,
}

/// An invoice issued for an order at checkout time.
///
/// Carries both monetary views: the ex-tax subtotal with its IVA split, and
/// the grand total derived from the tax-inclusive line path plus shipping.
/// The two are persisted side by side, not reconciled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub order_id: String,
    pub client_id: String,
    pub issued_at: DateTime<Utc>,
    /// Pre-tax subtotal in pesos.
    pub subtotal_pesos: i64,
    /// IVA amount in pesos.
    pub tax_pesos: i64,
    /// Shipping amount in pesos.
    pub shipping_pesos: i64,
    /// Grand total in pesos.
    pub total_pesos: i64,
    pub status: InvoiceStatus,
}

impl Invoice {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_pesos(self.subtotal_pesos)
    }

    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_pesos(self.tax_pesos)
    }

    #[inline]
    pub fn shipping(&self) -> Money {
        Money::from_pesos(self.shipping_pesos)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_pesos(self.total_pesos)
    }
}

// =============================================================================
// Kardex
// =============================================================================

/// Direction a movement applies to stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
    Inbound,
    Outbound,
}

/// The type of a kardex movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Generic stock intake.
    Entrada,
    /// Generic stock release.
    Salida,
    /// Purchase from a supplier.
    Compra,
    /// Sale to a client.
    Venta,
    /// Positive inventory correction.
    AjusteEntrada,
    /// Negative inventory correction.
    AjusteSalida,
}

impl MovementType {
    /// Returns whether this movement adds to or subtracts from stock.
    pub const fn direction(&self) -> StockDirection {
        match self {
            MovementType::Entrada | MovementType::Compra | MovementType::AjusteEntrada => {
                StockDirection::Inbound
            }
            MovementType::Salida | MovementType::Venta | MovementType::AjusteSalida => {
                StockDirection::Outbound
            }
        }
    }

    /// Returns the signed stock delta for a (positive) movement quantity.
    pub const fn signed_delta(&self, quantity: i64) -> i64 {
        match self.direction() {
            StockDirection::Inbound => quantity,
            StockDirection::Outbound => -quantity,
        }
    }
}

/// A single entry in the inventory ledger.
///
/// Append-only: movements are never edited or individually deleted.
/// `stock_after` of movement *i* is `stock_before` of movement *i+1* for
/// the same product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KardexMovement {
    pub id: String,
    pub product_id: String,
    pub movement_type: MovementType,
    /// Moved quantity, always positive; the type carries the sign.
    pub quantity: i64,
    pub stock_before: i64,
    pub stock_after: i64,
    /// Free-form reference (order id, supplier invoice, ...).
    pub reference: Option<String>,
    pub notes: Option<String>,
    /// Name of the user who recorded the movement.
    pub user: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Users & Activity
// =============================================================================

/// Role of a local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Vendedor,
}

/// A user of the application.
///
/// The password is an opaque value stored and compared as-is in the
/// local-fallback model; hashing is the remote auth service's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Checks whether this user holds the Admin role.
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Category of an activity log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Login,
    Logout,
    Create,
    Update,
    Delete,
    View,
}

/// One entry in the capped activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    /// Short action label ("crear producto", "eliminar cliente", ...).
    pub action: String,
    pub description: String,
    pub entry_type: ActivityType,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
