//! # Memory Gateway
//!
//! In-process implementation of the resource traits.
//!
//! ## Why This Exists
//! The workflows in `negocio-services` are written against the gateway
//! traits. This implementation backs them with plain vectors behind a
//! `tokio::sync::Mutex`, which makes it:
//!
//! - the test double for every service test (no network, deterministic),
//! - a seedable offline catalog for demos.
//!
//! ## Failure Injection
//! Tests exercise partial-failure paths by queueing a failure for a named
//! operation:
//!
//! ```rust,ignore
//! gateway.fail_next("order_lines.create").await;
//! // the next create() on order lines returns a 500-style error,
//! // subsequent calls succeed again
//! ```

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use negocio_core::{Client, Invoice, KardexMovement, Order, OrderLine, Product, User};

use crate::api::{
    AuthGateway, AuthSession, ClientPatch, ClientsGateway, Gateway, InvoicePatch, InvoicesGateway,
    KardexGateway, NewClient, NewInvoice, NewMovement, NewOrder, NewOrderLine, NewProduct,
    NewUser, OrderLinesGateway, OrderPatch, OrdersGateway, ProductPatch, ProductsGateway,
};
use crate::error::{GatewayError, GatewayResult};

#[derive(Debug, Default)]
struct State {
    clients: Vec<Client>,
    products: Vec<Product>,
    orders: Vec<Order>,
    order_lines: Vec<OrderLine>,
    invoices: Vec<Invoice>,
    movements: Vec<KardexMovement>,
    users: Vec<User>,
    /// Operation names queued to fail exactly once each.
    fail_next: Vec<String>,
}

impl State {
    fn take_failure(&mut self, op: &str) -> GatewayResult<()> {
        if let Some(pos) = self.fail_next.iter().position(|f| f == op) {
            self.fail_next.remove(pos);
            return Err(GatewayError::status(500, format!("injected failure: {}", op)));
        }
        Ok(())
    }
}

/// In-memory gateway with seeding and failure injection.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<State>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        MemoryGateway::default()
    }

    /// Queues a one-shot failure for the named operation
    /// (e.g. `"orders.create"`, `"order_lines.create"`).
    pub async fn fail_next(&self, op: &str) {
        self.state.lock().await.fail_next.push(op.to_string());
    }

    pub async fn seed_client(&self, client: Client) {
        self.state.lock().await.clients.push(client);
    }

    pub async fn seed_product(&self, product: Product) {
        self.state.lock().await.products.push(product);
    }

    pub async fn seed_user(&self, user: User) {
        self.state.lock().await.users.push(user);
    }

    /// Number of orders currently stored (used by retry-safety tests).
    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }

    /// Number of invoices currently stored.
    pub async fn invoice_count(&self) -> usize {
        self.state.lock().await.invoices.len()
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Resource Implementations
// =============================================================================

#[async_trait]
impl ClientsGateway for MemoryGateway {
    async fn list(&self) -> GatewayResult<Vec<Client>> {
        let mut state = self.state.lock().await;
        state.take_failure("clients.list")?;
        Ok(state.clients.clone())
    }

    async fn get(&self, id: &str) -> GatewayResult<Client> {
        let state = self.state.lock().await;
        state
            .clients
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found("Client", id))
    }

    async fn create(&self, fields: NewClient) -> GatewayResult<Client> {
        let mut state = self.state.lock().await;
        state.take_failure("clients.create")?;
        let client = Client {
            id: new_id(),
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            city: fields.city,
            address: fields.address,
            created_at: Utc::now(),
        };
        state.clients.push(client.clone());
        Ok(client)
    }

    async fn update(&self, id: &str, patch: ClientPatch) -> GatewayResult<Client> {
        let mut state = self.state.lock().await;
        state.take_failure("clients.update")?;
        let client = state
            .clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| GatewayError::not_found("Client", id))?;
        if let Some(name) = patch.name {
            client.name = name;
        }
        if let Some(email) = patch.email {
            client.email = email;
        }
        if let Some(phone) = patch.phone {
            client.phone = phone;
        }
        if let Some(city) = patch.city {
            client.city = city;
        }
        if let Some(address) = patch.address {
            client.address = Some(address);
        }
        Ok(client.clone())
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        let mut state = self.state.lock().await;
        let before = state.clients.len();
        state.clients.retain(|c| c.id != id);
        if state.clients.len() == before {
            return Err(GatewayError::not_found("Client", id));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductsGateway for MemoryGateway {
    async fn list(&self) -> GatewayResult<Vec<Product>> {
        let mut state = self.state.lock().await;
        state.take_failure("products.list")?;
        Ok(state.products.clone())
    }

    async fn get(&self, id: &str) -> GatewayResult<Product> {
        let state = self.state.lock().await;
        state
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found("Product", id))
    }

    async fn create(&self, fields: NewProduct) -> GatewayResult<Product> {
        let mut state = self.state.lock().await;
        state.take_failure("products.create")?;
        let now = Utc::now();
        let product = Product {
            id: new_id(),
            name: fields.name,
            category: fields.category,
            price_pesos: fields.price_pesos,
            stock: fields.stock,
            tax_rate_bps: fields.tax_rate_bps,
            image_url: fields.image_url,
            description: fields.description,
            created_at: now,
            updated_at: now,
        };
        state.products.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: &str, patch: ProductPatch) -> GatewayResult<Product> {
        let mut state = self.state.lock().await;
        state.take_failure("products.update")?;
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| GatewayError::not_found("Product", id))?;
        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(category) = patch.category {
            product.category = category;
        }
        if let Some(price_pesos) = patch.price_pesos {
            product.price_pesos = price_pesos;
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(tax_rate_bps) = patch.tax_rate_bps {
            product.tax_rate_bps = tax_rate_bps;
        }
        if let Some(image_url) = patch.image_url {
            product.image_url = Some(image_url);
        }
        if let Some(description) = patch.description {
            product.description = Some(description);
        }
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        let mut state = self.state.lock().await;
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        if state.products.len() == before {
            return Err(GatewayError::not_found("Product", id));
        }
        Ok(())
    }
}

#[async_trait]
impl OrdersGateway for MemoryGateway {
    async fn list(&self) -> GatewayResult<Vec<Order>> {
        Ok(self.state.lock().await.orders.clone())
    }

    async fn get(&self, id: &str) -> GatewayResult<Order> {
        let state = self.state.lock().await;
        state
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found("Order", id))
    }

    async fn create(&self, fields: NewOrder) -> GatewayResult<Order> {
        let mut state = self.state.lock().await;
        state.take_failure("orders.create")?;
        let order = Order {
            id: new_id(),
            client_id: fields.client_id,
            status: fields.status,
            total_pesos: fields.total_pesos,
            created_at: Utc::now(),
        };
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn update(&self, id: &str, patch: OrderPatch) -> GatewayResult<Order> {
        let mut state = self.state.lock().await;
        state.take_failure("orders.update")?;
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| GatewayError::not_found("Order", id))?;
        if let Some(status) = patch.status {
            order.status = status;
        }
        Ok(order.clone())
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        let mut state = self.state.lock().await;
        let before = state.orders.len();
        state.orders.retain(|o| o.id != id);
        if state.orders.len() == before {
            return Err(GatewayError::not_found("Order", id));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderLinesGateway for MemoryGateway {
    async fn list(&self) -> GatewayResult<Vec<OrderLine>> {
        Ok(self.state.lock().await.order_lines.clone())
    }

    async fn list_by_order(&self, order_id: &str) -> GatewayResult<Vec<OrderLine>> {
        let state = self.state.lock().await;
        Ok(state
            .order_lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn create(&self, fields: NewOrderLine) -> GatewayResult<OrderLine> {
        let mut state = self.state.lock().await;
        state.take_failure("order_lines.create")?;
        let line = OrderLine {
            id: new_id(),
            order_id: fields.order_id,
            product_id: fields.product_id,
            name_snapshot: fields.name_snapshot,
            quantity: fields.quantity,
            unit_price_pesos: fields.unit_price_pesos,
            subtotal_pesos: fields.subtotal_pesos,
            created_at: Utc::now(),
        };
        state.order_lines.push(line.clone());
        Ok(line)
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        let mut state = self.state.lock().await;
        let before = state.order_lines.len();
        state.order_lines.retain(|l| l.id != id);
        if state.order_lines.len() == before {
            return Err(GatewayError::not_found("OrderLine", id));
        }
        Ok(())
    }
}

#[async_trait]
impl InvoicesGateway for MemoryGateway {
    async fn list(&self) -> GatewayResult<Vec<Invoice>> {
        Ok(self.state.lock().await.invoices.clone())
    }

    async fn get(&self, id: &str) -> GatewayResult<Invoice> {
        let state = self.state.lock().await;
        state
            .invoices
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found("Invoice", id))
    }

    async fn create(&self, fields: NewInvoice) -> GatewayResult<Invoice> {
        let mut state = self.state.lock().await;
        state.take_failure("invoices.create")?;
        let invoice = Invoice {
            id: new_id(),
            order_id: fields.order_id,
            client_id: fields.client_id,
            issued_at: Utc::now(),
            subtotal_pesos: fields.subtotal_pesos,
            tax_pesos: fields.tax_pesos,
            shipping_pesos: fields.shipping_pesos,
            total_pesos: fields.total_pesos,
            status: fields.status,
        };
        state.invoices.push(invoice.clone());
        Ok(invoice)
    }

    async fn update(&self, id: &str, patch: InvoicePatch) -> GatewayResult<Invoice> {
        let mut state = self.state.lock().await;
        state.take_failure("invoices.update")?;
        let invoice = state
            .invoices
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| GatewayError::not_found("Invoice", id))?;
        if let Some(status) = patch.status {
            invoice.status = status;
        }
        Ok(invoice.clone())
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        let mut state = self.state.lock().await;
        let before = state.invoices.len();
        state.invoices.retain(|i| i.id != id);
        if state.invoices.len() == before {
            return Err(GatewayError::not_found("Invoice", id));
        }
        Ok(())
    }
}

#[async_trait]
impl KardexGateway for MemoryGateway {
    async fn list_movements(&self) -> GatewayResult<Vec<KardexMovement>> {
        Ok(self.state.lock().await.movements.clone())
    }

    async fn list_movements_by_product(
        &self,
        product_id: &str,
    ) -> GatewayResult<Vec<KardexMovement>> {
        let state = self.state.lock().await;
        Ok(state
            .movements
            .iter()
            .filter(|m| m.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn create_movement(&self, fields: NewMovement) -> GatewayResult<KardexMovement> {
        let mut state = self.state.lock().await;
        state.take_failure("kardex.create_movement")?;
        let movement = KardexMovement {
            id: new_id(),
            product_id: fields.product_id,
            movement_type: fields.movement_type,
            quantity: fields.quantity,
            stock_before: fields.stock_before,
            stock_after: fields.stock_after,
            reference: fields.reference,
            notes: fields.notes,
            user: fields.user,
            created_at: Utc::now(),
        };
        state.movements.push(movement.clone());
        Ok(movement)
    }
}

#[async_trait]
impl AuthGateway for MemoryGateway {
    async fn login(&self, identifier: &str, secret: &str) -> GatewayResult<AuthSession> {
        let mut state = self.state.lock().await;
        state.take_failure("auth.login")?;
        let user = state
            .users
            .iter()
            .find(|u| (u.email == identifier || u.username == identifier) && u.active)
            .cloned();

        match user {
            Some(user) if user.password == secret => Ok(AuthSession {
                user,
                token: new_id(),
            }),
            _ => Err(GatewayError::Unauthorized),
        }
    }

    async fn signup(&self, fields: NewUser) -> GatewayResult<User> {
        let mut state = self.state.lock().await;
        state.take_failure("auth.signup")?;
        if state
            .users
            .iter()
            .any(|u| u.email == fields.email || u.username == fields.username)
        {
            return Err(GatewayError::status(409, "user already exists"));
        }
        let user = User {
            id: new_id(),
            name: fields.name,
            username: fields.username,
            email: fields.email,
            password: fields.password,
            role: fields.role,
            active: true,
            created_at: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn logout(&self) -> GatewayResult<()> {
        Ok(())
    }
}

impl Gateway for MemoryGateway {
    fn clients(&self) -> &dyn ClientsGateway {
        self
    }

    fn products(&self) -> &dyn ProductsGateway {
        self
    }

    fn orders(&self) -> &dyn OrdersGateway {
        self
    }

    fn order_lines(&self) -> &dyn OrderLinesGateway {
        self
    }

    fn invoices(&self) -> &dyn InvoicesGateway {
        self
    }

    fn kardex(&self) -> &dyn KardexGateway {
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use negocio_core::{OrderStatus, Role};

    #[tokio::test]
    async fn test_client_crud_round_trip() {
        let gateway = MemoryGateway::new();

        let created = ClientsGateway::create(
            &gateway,
            NewClient {
                name: "Ana Torres".to_string(),
                email: "ana@example.com".to_string(),
                phone: "3001234567".to_string(),
                city: "Bogotá".to_string(),
                address: None,
            },
        )
        .await
        .unwrap();

        let fetched = ClientsGateway::get(&gateway, &created.id).await.unwrap();
        assert_eq!(fetched.name, "Ana Torres");

        let updated = ClientsGateway::update(
            &gateway,
            &created.id,
            ClientPatch {
                city: Some("Medellín".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.city, "Medellín");
        assert_eq!(updated.name, "Ana Torres");

        ClientsGateway::delete(&gateway, &created.id).await.unwrap();
        assert!(ClientsGateway::get(&gateway, &created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_failure_injection_fires_once() {
        let gateway = MemoryGateway::new();
        gateway.fail_next("orders.create").await;

        let fields = NewOrder {
            client_id: "c-1".to_string(),
            status: OrderStatus::Pendiente,
            total_pesos: 1000,
        };

        assert!(OrdersGateway::create(&gateway, fields.clone()).await.is_err());
        assert!(OrdersGateway::create(&gateway, fields).await.is_ok());
        assert_eq!(gateway.order_count().await, 1);
    }

    #[tokio::test]
    async fn test_signup_registers_once() {
        let gateway = MemoryGateway::new();

        let fields = NewUser {
            name: "Ana".to_string(),
            username: "ana".to_string(),
            email: "ana@minegocio.co".to_string(),
            password: "secreto".to_string(),
            role: Role::Vendedor,
        };

        let user = gateway.signup(fields.clone()).await.unwrap();
        assert!(user.active);
        assert!(gateway.login("ana", "secreto").await.is_ok());

        // Same identity again is a conflict
        assert!(matches!(
            gateway.signup(fields).await,
            Err(GatewayError::Status { status: 409, .. })
        ));
    }

    #[tokio::test]
    async fn test_login_checks_credentials_and_active_flag() {
        let gateway = MemoryGateway::new();
        gateway
            .seed_user(User {
                id: "u-1".to_string(),
                name: "Ana".to_string(),
                username: "ana".to_string(),
                email: "ana@minegocio.co".to_string(),
                password: "secreto".to_string(),
                role: Role::Vendedor,
                active: true,
                created_at: Utc::now(),
            })
            .await;

        assert!(gateway.login("ana", "secreto").await.is_ok());
        assert!(gateway.login("ana@minegocio.co", "secreto").await.is_ok());
        assert!(matches!(
            gateway.login("ana", "wrong").await,
            Err(GatewayError::Unauthorized)
        ));
        assert!(matches!(
            gateway.login("nadie", "secreto").await,
            Err(GatewayError::Unauthorized)
        ));
    }
}
