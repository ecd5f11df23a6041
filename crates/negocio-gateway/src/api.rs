//! # Gateway API
//!
//! Per-entity resource traits and the typed payloads that cross the wire.
//!
//! ## Why Traits Here?
//! Workflows in `negocio-services` are written against these traits, never
//! against a concrete client. [`crate::HttpGateway`] implements them over
//! the remote service; [`crate::MemoryGateway`] implements them in-process
//! for tests and offline use. Payloads are explicit structs, so the core never
//! operates on partially-shaped data.
//!
//! ## Accessor Pattern
//! [`Gateway`] bundles the per-entity traits behind accessor methods
//! (`gateway.products().list()`), so call sites stay unambiguous even
//! though every resource exposes the same CRUD verbs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use negocio_core::{
    Client, Invoice, InvoiceStatus, KardexMovement, MovementType, Order, OrderLine, OrderStatus,
    Product, Role, User,
};

use crate::error::GatewayResult;

// =============================================================================
// Creation Payloads
// =============================================================================

/// Fields for creating a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub address: Option<String>,
}

/// Fields for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price_pesos: i64,
    pub stock: i64,
    pub tax_rate_bps: u32,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

/// Fields for creating an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub client_id: String,
    pub status: OrderStatus,
    pub total_pesos: i64,
}

/// Fields for creating an order line (a frozen sale snapshot).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub order_id: String,
    pub product_id: String,
    pub name_snapshot: String,
    pub quantity: i64,
    pub unit_price_pesos: i64,
    pub subtotal_pesos: i64,
}

/// Fields for creating an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvoice {
    pub order_id: String,
    pub client_id: String,
    pub subtotal_pesos: i64,
    pub tax_pesos: i64,
    pub shipping_pesos: i64,
    pub total_pesos: i64,
    pub status: InvoiceStatus,
}

/// Fields for appending a kardex movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMovement {
    pub product_id: String,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub stock_before: i64,
    pub stock_after: i64,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub user: String,
}

// =============================================================================
// Patch Payloads
// =============================================================================
// Optional fields with skip_serializing_if, so a PATCH only carries what
// actually changed.

/// Partial update for a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Partial update for a product.
///
/// `stock` is here for the kardex engine's post-movement write; nothing
/// else in the system patches stock directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_pesos: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate_bps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update for an order (status transitions only).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

/// Partial update for an invoice (status transitions only).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoicePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InvoiceStatus>,
}

// =============================================================================
// Auth Payloads
// =============================================================================

/// A successful authentication: the user plus a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

/// Fields for registering a user with the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

// =============================================================================
// Resource Traits
// =============================================================================

/// Client resource operations.
#[async_trait]
pub trait ClientsGateway: Send + Sync {
    async fn list(&self) -> GatewayResult<Vec<Client>>;
    async fn get(&self, id: &str) -> GatewayResult<Client>;
    async fn create(&self, fields: NewClient) -> GatewayResult<Client>;
    async fn update(&self, id: &str, patch: ClientPatch) -> GatewayResult<Client>;
    async fn delete(&self, id: &str) -> GatewayResult<()>;
}

/// Product resource operations.
#[async_trait]
pub trait ProductsGateway: Send + Sync {
    async fn list(&self) -> GatewayResult<Vec<Product>>;
    async fn get(&self, id: &str) -> GatewayResult<Product>;
    async fn create(&self, fields: NewProduct) -> GatewayResult<Product>;
    async fn update(&self, id: &str, patch: ProductPatch) -> GatewayResult<Product>;
    async fn delete(&self, id: &str) -> GatewayResult<()>;
}

/// Order resource operations.
#[async_trait]
pub trait OrdersGateway: Send + Sync {
    async fn list(&self) -> GatewayResult<Vec<Order>>;
    async fn get(&self, id: &str) -> GatewayResult<Order>;
    async fn create(&self, fields: NewOrder) -> GatewayResult<Order>;
    async fn update(&self, id: &str, patch: OrderPatch) -> GatewayResult<Order>;
    async fn delete(&self, id: &str) -> GatewayResult<()>;
}

/// Order line resource operations. Lines are immutable once created.
#[async_trait]
pub trait OrderLinesGateway: Send + Sync {
    async fn list(&self) -> GatewayResult<Vec<OrderLine>>;
    async fn list_by_order(&self, order_id: &str) -> GatewayResult<Vec<OrderLine>>;
    async fn create(&self, fields: NewOrderLine) -> GatewayResult<OrderLine>;
    async fn delete(&self, id: &str) -> GatewayResult<()>;
}

/// Invoice resource operations.
#[async_trait]
pub trait InvoicesGateway: Send + Sync {
    async fn list(&self) -> GatewayResult<Vec<Invoice>>;
    async fn get(&self, id: &str) -> GatewayResult<Invoice>;
    async fn create(&self, fields: NewInvoice) -> GatewayResult<Invoice>;
    async fn update(&self, id: &str, patch: InvoicePatch) -> GatewayResult<Invoice>;
    async fn delete(&self, id: &str) -> GatewayResult<()>;
}

/// Kardex movement resource operations. The ledger is append-only: there is
/// no update and no individual delete.
#[async_trait]
pub trait KardexGateway: Send + Sync {
    async fn list_movements(&self) -> GatewayResult<Vec<KardexMovement>>;
    async fn list_movements_by_product(
        &self,
        product_id: &str,
    ) -> GatewayResult<Vec<KardexMovement>>;
    async fn create_movement(&self, fields: NewMovement) -> GatewayResult<KardexMovement>;
}

/// Authentication operations.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Verifies credentials. `identifier` may be an email or a username.
    async fn login(&self, identifier: &str, secret: &str) -> GatewayResult<AuthSession>;
    /// Registers a new user.
    async fn signup(&self, fields: NewUser) -> GatewayResult<User>;
    /// Invalidates the current token, if any.
    async fn logout(&self) -> GatewayResult<()>;
}

/// The full resource surface, bundled behind per-entity accessors.
///
/// ## Usage
/// ```rust,ignore
/// let products = gateway.products().list().await?;
/// let order = gateway.orders().create(fields).await?;
/// ```
pub trait Gateway: Send + Sync {
    fn clients(&self) -> &dyn ClientsGateway;
    fn products(&self) -> &dyn ProductsGateway;
    fn orders(&self) -> &dyn OrdersGateway;
    fn order_lines(&self) -> &dyn OrderLinesGateway;
    fn invoices(&self) -> &dyn InvoicesGateway;
    fn kardex(&self) -> &dyn KardexGateway;
}
