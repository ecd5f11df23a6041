//! # Checkout Workflow
//!
//! Turns a non-empty cart into a persisted order, its lines, and an invoice,
//! then clears the cart.
//!
//! ## Workflow Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout Steps                                     │
//! │                                                                         │
//! │  1. snapshot cart + compute totals     (pure, under the cart lock)      │
//! │  2. resolve client                     (explicit id, else first listed) │
//! │  3. create order (pendiente)           ── failure aborts, cart intact   │
//! │  4. create one line per item           ── failures collected as         │
//! │                                           warnings, NOT rolled back     │
//! │  5. create invoice (pagada)            ── failure aborts, cart intact   │
//! │  6. record venta movement per line     ── failures collected as         │
//! │                                           warnings                      │
//! │  7. clear cart + snapshot, notify                                       │
//! │                                                                         │
//! │  There is no compensating transaction. A failure after step 3 leaves    │
//! │  the order (and possibly some lines) behind; the receipt's warnings     │
//! │  tell the operator reconciliation may be needed.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{info, warn};

use negocio_core::{CartItem, CartTotals, InvoiceStatus, MovementType, OrderStatus};
use negocio_gateway::api::{NewInvoice, NewOrder, NewOrderLine};
use negocio_gateway::Gateway;
use negocio_session::SessionStore;

use crate::error::{ServiceError, ServiceResult};
use crate::kardex::{KardexEngine, MovementRequest};
use crate::state::CartState;

/// Name recorded on fulfillment movements when no user is logged in.
const FALLBACK_MOVEMENT_USER: &str = "sistema";

// =============================================================================
// Receipt
// =============================================================================

/// The outcome of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub order_id: String,
    /// Short order identifier fragment for the success notification.
    pub order_ref: String,
    pub invoice_id: String,
    pub client_id: String,
    pub totals: CartTotals,
    /// Grand total formatted for display ("$ 290.000").
    pub formatted_total: String,
    /// One message per order line or fulfillment movement that failed.
    /// Non-empty means the order/invoice exist but need manual
    /// reconciliation, which is distinct from a failed checkout.
    pub line_warnings: Vec<String>,
}

impl CheckoutReceipt {
    /// Whether some lines or movements failed while the order and invoice
    /// were still created.
    pub fn needs_reconciliation(&self) -> bool {
        !self.line_warnings.is_empty()
    }

    /// Success notification text.
    pub fn notification(&self) -> String {
        format!("Pedido #{} creado, total {}", self.order_ref, self.formatted_total)
    }
}

// =============================================================================
// Checkout Service
// =============================================================================

/// The checkout workflow.
pub struct CheckoutService {
    gateway: Arc<dyn Gateway>,
    store: Arc<dyn SessionStore>,
}

impl CheckoutService {
    pub fn new(gateway: Arc<dyn Gateway>, store: Arc<dyn SessionStore>) -> Self {
        CheckoutService { gateway, store }
    }

    /// Runs the checkout workflow.
    ///
    /// `shipping_input` is the operator's free-form shipping field (empty
    /// or non-numeric clamps to zero). `client_id` selects the invoice
    /// client explicitly; `None` falls back to the first listed client.
    ///
    /// Any failure before the invoice exists leaves the cart intact so the
    /// operator can retry. Order-line and fulfillment failures after that
    /// point do not abort; they surface in the receipt's warnings.
    pub async fn checkout(
        &self,
        cart_state: &CartState,
        shipping_input: &str,
        client_id: Option<&str>,
    ) -> ServiceResult<CheckoutReceipt> {
        let shipping = negocio_core::parse_shipping(shipping_input);
        let (items, totals) = cart_state.with_cart(|cart| {
            (cart.items.clone(), CartTotals::compute(cart, shipping))
        });

        if items.is_empty() {
            return Err(ServiceError::EmptyCart);
        }

        let client_id = self.resolve_client(client_id).await?;

        let order = self
            .gateway
            .orders()
            .create(NewOrder {
                client_id: client_id.clone(),
                status: OrderStatus::Pendiente,
                total_pesos: totals.grand_total.pesos(),
            })
            .await?;

        let mut line_warnings = Vec::new();
        let mut created_lines: Vec<&CartItem> = Vec::new();
        for item in &items {
            let result = self
                .gateway
                .order_lines()
                .create(NewOrderLine {
                    order_id: order.id.clone(),
                    product_id: item.product_id.clone(),
                    name_snapshot: item.name.clone(),
                    quantity: item.quantity,
                    unit_price_pesos: item.unit_price_pesos,
                    subtotal_pesos: item.line_subtotal().pesos(),
                })
                .await;

            match result {
                Ok(_) => created_lines.push(item),
                Err(err) => {
                    warn!(order_id = %order.id, product = %item.name, %err,
                        "order line creation failed, continuing without rollback");
                    line_warnings.push(format!(
                        "La línea de {} no se pudo registrar: {}",
                        item.name, err
                    ));
                }
            }
        }

        let invoice = self
            .gateway
            .invoices()
            .create(NewInvoice {
                order_id: order.id.clone(),
                client_id: client_id.clone(),
                subtotal_pesos: totals.subtotal_ex_tax.pesos(),
                tax_pesos: totals.total_tax.pesos(),
                shipping_pesos: totals.shipping.pesos(),
                total_pesos: totals.grand_total.pesos(),
                status: InvoiceStatus::Pagada,
            })
            .await?;

        self.fulfill(&order.id, &created_lines, &mut line_warnings)
            .await;

        // Order and invoice exist: the sale happened. Clear the cart and
        // its crash-recovery snapshot.
        cart_state.with_cart_mut(|cart| cart.clear());
        self.store.clear_cart()?;

        let order_ref: String = order.id.chars().take(8).collect();
        info!(
            order_id = %order.id,
            invoice_id = %invoice.id,
            total = %totals.grand_total,
            warnings = line_warnings.len(),
            "checkout completed"
        );

        Ok(CheckoutReceipt {
            order_id: order.id,
            order_ref,
            invoice_id: invoice.id,
            client_id,
            totals,
            formatted_total: totals.grand_total.to_string(),
            line_warnings,
        })
    }

    /// Resolves the invoice client: explicit id wins, otherwise the first
    /// listed client. No clients at all fails the checkout before anything
    /// is created.
    async fn resolve_client(&self, client_id: Option<&str>) -> ServiceResult<String> {
        if let Some(id) = client_id {
            let client = self.gateway.clients().get(id).await?;
            return Ok(client.id);
        }

        let clients = self.gateway.clients().list().await?;
        clients
            .into_iter()
            .next()
            .map(|c| c.id)
            .ok_or(ServiceError::NoClient)
    }

    /// Records a `venta` movement for every successfully created line, so
    /// product stock tracks the sale. Failures become warnings; the sale
    /// itself already happened.
    async fn fulfill(
        &self,
        order_id: &str,
        lines: &[&CartItem],
        warnings: &mut Vec<String>,
    ) {
        let user = match self.store.current_user() {
            Ok(Some(user)) => user.name,
            _ => FALLBACK_MOVEMENT_USER.to_string(),
        };

        let kardex = KardexEngine::new(self.gateway.clone());
        for item in lines {
            let request = MovementRequest {
                product_id: item.product_id.clone(),
                movement_type: MovementType::Venta,
                quantity: item.quantity,
                reference: Some(format!("pedido:{}", order_id)),
                notes: None,
                user: user.clone(),
            };
            if let Err(err) = kardex.record_movement(request).await {
                warn!(order_id = %order_id, product = %item.name, %err,
                    "fulfillment movement failed");
                warnings.push(format!(
                    "El stock de {} no se pudo descontar: {}",
                    item.name, err
                ));
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use negocio_core::{Client, Product};
    use negocio_gateway::api::{InvoicesGateway, OrderLinesGateway, OrdersGateway, ProductsGateway};
    use negocio_gateway::MemoryGateway;
    use negocio_session::{MemorySessionStore, SessionStore};

    fn client(id: &str) -> Client {
        Client {
            id: id.to_string(),
            name: "Ana Torres".to_string(),
            email: "ana@example.com".to_string(),
            phone: "3001234567".to_string(),
            city: "Bogotá".to_string(),
            address: None,
            created_at: Utc::now(),
        }
    }

    fn product(id: &str, price: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Producto {}", id),
            category: "artesanías".to_string(),
            price_pesos: price,
            stock,
            tax_rate_bps: 0,
            image_url: None,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Logs from the workflow show up under `RUST_LOG=debug cargo test`.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    async fn setup() -> (Arc<MemoryGateway>, Arc<MemorySessionStore>, CartState) {
        init_tracing();
        let gateway = Arc::new(MemoryGateway::new());
        gateway.seed_client(client("c-1")).await;
        gateway.seed_product(product("p-1", 180_000, 5)).await;
        gateway.seed_product(product("p-2", 50_000, 9)).await;
        (gateway, Arc::new(MemorySessionStore::new()), CartState::new())
    }

    fn service(
        gateway: &Arc<MemoryGateway>,
        store: &Arc<MemorySessionStore>,
    ) -> CheckoutService {
        CheckoutService::new(gateway.clone(), store.clone())
    }

    fn fill_cart(cart: &CartState) {
        cart.with_cart_mut(|c| c.add_item(&product("p-1", 180_000, 5), 1))
            .unwrap();
        cart.with_cart_mut(|c| c.add_item(&product("p-2", 50_000, 9), 2))
            .unwrap();
    }

    #[tokio::test]
    async fn test_checkout_happy_path() {
        let (gateway, store, cart) = setup().await;
        fill_cart(&cart);

        let receipt = service(&gateway, &store)
            .checkout(&cart, "10000", None)
            .await
            .unwrap();

        assert_eq!(receipt.totals.lines_subtotal.pesos(), 280_000);
        assert_eq!(receipt.totals.total_tax.pesos(), 0);
        assert_eq!(receipt.totals.grand_total.pesos(), 290_000);
        assert_eq!(receipt.formatted_total, "$ 290.000");
        assert_eq!(receipt.order_ref.len(), 8);
        assert!(!receipt.needs_reconciliation());

        // Order, lines, and invoice persisted
        let order = OrdersGateway::get(&*gateway, &receipt.order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pendiente);
        assert_eq!(order.total_pesos, 290_000);

        let lines = OrderLinesGateway::list_by_order(&*gateway, &receipt.order_id)
            .await
            .unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.subtotal_pesos == l.unit_price_pesos * l.quantity));

        let invoice = InvoicesGateway::get(&*gateway, &receipt.invoice_id).await.unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Pagada);
        assert_eq!(invoice.subtotal_pesos, 280_000);
        assert_eq!(invoice.tax_pesos, 0);
        assert_eq!(invoice.shipping_pesos, 10_000);
        assert_eq!(invoice.total_pesos, 290_000);

        // Cart and its snapshot cleared
        assert!(cart.with_cart(|c| c.is_empty()));
        assert!(store.load_cart().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_checkout_decrements_stock_through_kardex() {
        let (gateway, store, cart) = setup().await;
        cart.with_cart_mut(|c| c.add_item(&product("p-1", 180_000, 5), 2))
            .unwrap();

        service(&gateway, &store)
            .checkout(&cart, "", None)
            .await
            .unwrap();

        let after = ProductsGateway::get(&*gateway, "p-1").await.unwrap();
        assert_eq!(after.stock, 3);

        let movements = negocio_gateway::api::KardexGateway::list_movements_by_product(
            &*gateway, "p-1",
        )
        .await
        .unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].movement_type, MovementType::Venta);
        assert_eq!(movements[0].stock_before, 5);
        assert_eq!(movements[0].stock_after, 3);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_rejected() {
        let (gateway, store, cart) = setup().await;

        let err = service(&gateway, &store)
            .checkout(&cart, "5000", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmptyCart));
        assert_eq!(gateway.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_checkout_without_clients_rejected() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway.seed_product(product("p-1", 180_000, 5)).await;
        let store = Arc::new(MemorySessionStore::new());
        let cart = CartState::new();
        cart.with_cart_mut(|c| c.add_item(&product("p-1", 180_000, 5), 1))
            .unwrap();

        let err = service(&gateway, &store)
            .checkout(&cart, "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NoClient));
        assert_eq!(gateway.order_count().await, 0);
        assert!(!cart.with_cart(|c| c.is_empty()));
    }

    #[tokio::test]
    async fn test_full_failure_keeps_cart_and_retry_creates_one_order() {
        let (gateway, store, cart) = setup().await;
        fill_cart(&cart);
        gateway.fail_next("orders.create").await;

        let svc = service(&gateway, &store);

        // First attempt fails before anything is created; cart stays intact
        assert!(svc.checkout(&cart, "10000", None).await.is_err());
        assert_eq!(gateway.order_count().await, 0);
        assert_eq!(gateway.invoice_count().await, 0);
        assert!(!cart.with_cart(|c| c.is_empty()));

        // Retry succeeds with exactly one order, no duplicate side effects
        svc.checkout(&cart, "10000", None).await.unwrap();
        assert_eq!(gateway.order_count().await, 1);
        assert_eq!(gateway.invoice_count().await, 1);
    }

    #[tokio::test]
    async fn test_invoice_failure_aborts_and_keeps_cart() {
        let (gateway, store, cart) = setup().await;
        fill_cart(&cart);
        gateway.fail_next("invoices.create").await;

        assert!(service(&gateway, &store)
            .checkout(&cart, "0", None)
            .await
            .is_err());

        // The order already exists (documented non-atomicity), but the cart
        // is intact for retry
        assert_eq!(gateway.order_count().await, 1);
        assert_eq!(gateway.invoice_count().await, 0);
        assert!(!cart.with_cart(|c| c.is_empty()));
    }

    #[tokio::test]
    async fn test_partial_line_failure_surfaces_warning() {
        let (gateway, store, cart) = setup().await;
        fill_cart(&cart);
        gateway.fail_next("order_lines.create").await;

        let receipt = service(&gateway, &store)
            .checkout(&cart, "10000", None)
            .await
            .unwrap();

        // The checkout still completes: order + invoice exist, cart cleared
        assert!(receipt.needs_reconciliation());
        assert_eq!(receipt.line_warnings.len(), 1);
        assert_eq!(gateway.invoice_count().await, 1);
        assert!(cart.with_cart(|c| c.is_empty()));

        // Only the surviving line was persisted
        let lines = OrderLinesGateway::list_by_order(&*gateway, &receipt.order_id)
            .await
            .unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[tokio::test]
    async fn test_explicit_client_selection() {
        let (gateway, store, cart) = setup().await;
        gateway.seed_client(client("c-2")).await;
        fill_cart(&cart);

        let receipt = service(&gateway, &store)
            .checkout(&cart, "", Some("c-2"))
            .await
            .unwrap();
        assert_eq!(receipt.client_id, "c-2");
    }

    #[tokio::test]
    async fn test_notification_mentions_ref_and_total() {
        let (gateway, store, cart) = setup().await;
        fill_cart(&cart);

        let receipt = service(&gateway, &store)
            .checkout(&cart, "10000", None)
            .await
            .unwrap();
        let note = receipt.notification();
        assert!(note.contains(&receipt.order_ref));
        assert!(note.contains("$ 290.000"));
    }
}
