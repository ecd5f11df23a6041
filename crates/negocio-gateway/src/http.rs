//! # HTTP Gateway
//!
//! reqwest-based implementation of the resource traits against the remote
//! backend-as-a-service.
//!
//! ## Request Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     One Call, One Request                               │
//! │                                                                         │
//! │  list()    → GET    {base}/productos                                   │
//! │  get(id)   → GET    {base}/productos/{id}                              │
//! │  create()  → POST   {base}/productos          (JSON body)              │
//! │  update()  → PATCH  {base}/productos/{id}     (sparse JSON body)       │
//! │  delete()  → DELETE {base}/productos/{id}                              │
//! │                                                                         │
//! │  No retries, no backoff: a failed call fails the enclosing user        │
//! │  action, which the operator retries by hand. A 30 s timeout keeps a    │
//! │  dead service from hanging the screen forever.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! 401 responses are mapped to [`GatewayError::Unauthorized`] so screens can
//! show "session expired"; every other non-2xx becomes a
//! [`GatewayError::Status`] carrying the service's own message.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use negocio_core::{Client, Invoice, KardexMovement, Order, OrderLine, Product, User};

use crate::api::{
    AuthGateway, AuthSession, ClientPatch, ClientsGateway, Gateway, InvoicePatch, InvoicesGateway,
    KardexGateway, NewClient, NewInvoice, NewMovement, NewOrder, NewOrderLine, NewProduct,
    NewUser, OrderLinesGateway, OrderPatch, OrdersGateway, ProductPatch, ProductsGateway,
};
use crate::error::{GatewayError, GatewayResult};

/// Default request timeout. Defensive: the original contract specifies no
/// timeout at all, but a hung screen is worse than a failed one.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// HttpGateway
// =============================================================================

/// Gateway implementation over the remote REST-like service.
///
/// ## Usage
/// ```rust,no_run
/// use negocio_gateway::HttpGateway;
/// use negocio_gateway::api::Gateway;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let gateway = HttpGateway::new("https://api.minegocio.co/v1")?;
/// let products = gateway.products().list().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    /// Bearer token from the last successful login, attached to every
    /// request while present.
    token: RwLock<Option<String>>,
}

impl HttpGateway {
    /// Creates a gateway for the given base URL.
    pub fn new(base_url: impl Into<String>) -> GatewayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(HttpGateway {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, self.url(path));
        let token = self.token.read().ok().and_then(|t| t.clone());
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    fn store_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = token;
        }
    }

    /// Turns non-2xx responses into typed errors.
    async fn check(&self, response: reqwest::Response) -> GatewayResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status.as_u16() == 401 {
            warn!("service returned 401, session considered expired");
            return Err(GatewayError::Unauthorized);
        }

        let message = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), %message, "service returned error status");
        Err(GatewayError::status(status.as_u16(), message))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        debug!(%path, "GET");
        let response = self.request(Method::GET, path).send().await?;
        let response = self.check(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        debug!(%path, "POST");
        let response = self.request(Method::POST, path).json(body).send().await?;
        let response = self.check(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        debug!(%path, "PATCH");
        let response = self.request(Method::PATCH, path).json(body).send().await?;
        let response = self.check(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn delete_path(&self, path: &str) -> GatewayResult<()> {
        debug!(%path, "DELETE");
        let response = self.request(Method::DELETE, path).send().await?;
        self.check(response).await?;
        Ok(())
    }
}

/// Rewrites a 404 status into a NotFound carrying the resource context.
fn map_not_found<T>(result: GatewayResult<T>, resource: &str, id: &str) -> GatewayResult<T> {
    match result {
        Err(GatewayError::Status { status: 404, .. }) => {
            Err(GatewayError::not_found(resource, id))
        }
        other => other,
    }
}

// =============================================================================
// Resource Implementations
// =============================================================================

#[async_trait]
impl ClientsGateway for HttpGateway {
    async fn list(&self) -> GatewayResult<Vec<Client>> {
        self.get_json("clientes").await
    }

    async fn get(&self, id: &str) -> GatewayResult<Client> {
        map_not_found(self.get_json(&format!("clientes/{}", id)).await, "Client", id)
    }

    async fn create(&self, fields: NewClient) -> GatewayResult<Client> {
        self.post_json("clientes", &fields).await
    }

    async fn update(&self, id: &str, patch: ClientPatch) -> GatewayResult<Client> {
        map_not_found(
            self.patch_json(&format!("clientes/{}", id), &patch).await,
            "Client",
            id,
        )
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        map_not_found(self.delete_path(&format!("clientes/{}", id)).await, "Client", id)
    }
}

#[async_trait]
impl ProductsGateway for HttpGateway {
    async fn list(&self) -> GatewayResult<Vec<Product>> {
        self.get_json("productos").await
    }

    async fn get(&self, id: &str) -> GatewayResult<Product> {
        map_not_found(self.get_json(&format!("productos/{}", id)).await, "Product", id)
    }

    async fn create(&self, fields: NewProduct) -> GatewayResult<Product> {
        self.post_json("productos", &fields).await
    }

    async fn update(&self, id: &str, patch: ProductPatch) -> GatewayResult<Product> {
        map_not_found(
            self.patch_json(&format!("productos/{}", id), &patch).await,
            "Product",
            id,
        )
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        map_not_found(self.delete_path(&format!("productos/{}", id)).await, "Product", id)
    }
}

#[async_trait]
impl OrdersGateway for HttpGateway {
    async fn list(&self) -> GatewayResult<Vec<Order>> {
        self.get_json("pedidos").await
    }

    async fn get(&self, id: &str) -> GatewayResult<Order> {
        map_not_found(self.get_json(&format!("pedidos/{}", id)).await, "Order", id)
    }

    async fn create(&self, fields: NewOrder) -> GatewayResult<Order> {
        self.post_json("pedidos", &fields).await
    }

    async fn update(&self, id: &str, patch: OrderPatch) -> GatewayResult<Order> {
        map_not_found(
            self.patch_json(&format!("pedidos/{}", id), &patch).await,
            "Order",
            id,
        )
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        map_not_found(self.delete_path(&format!("pedidos/{}", id)).await, "Order", id)
    }
}

#[async_trait]
impl OrderLinesGateway for HttpGateway {
    async fn list(&self) -> GatewayResult<Vec<OrderLine>> {
        self.get_json("detalle_pedidos").await
    }

    async fn list_by_order(&self, order_id: &str) -> GatewayResult<Vec<OrderLine>> {
        self.get_json(&format!("detalle_pedidos?pedido_id={}", order_id))
            .await
    }

    async fn create(&self, fields: NewOrderLine) -> GatewayResult<OrderLine> {
        self.post_json("detalle_pedidos", &fields).await
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        map_not_found(
            self.delete_path(&format!("detalle_pedidos/{}", id)).await,
            "OrderLine",
            id,
        )
    }
}

#[async_trait]
impl InvoicesGateway for HttpGateway {
    async fn list(&self) -> GatewayResult<Vec<Invoice>> {
        self.get_json("facturas").await
    }

    async fn get(&self, id: &str) -> GatewayResult<Invoice> {
        map_not_found(self.get_json(&format!("facturas/{}", id)).await, "Invoice", id)
    }

    async fn create(&self, fields: NewInvoice) -> GatewayResult<Invoice> {
        self.post_json("facturas", &fields).await
    }

    async fn update(&self, id: &str, patch: InvoicePatch) -> GatewayResult<Invoice> {
        map_not_found(
            self.patch_json(&format!("facturas/{}", id), &patch).await,
            "Invoice",
            id,
        )
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        map_not_found(self.delete_path(&format!("facturas/{}", id)).await, "Invoice", id)
    }
}

#[async_trait]
impl KardexGateway for HttpGateway {
    async fn list_movements(&self) -> GatewayResult<Vec<KardexMovement>> {
        self.get_json("kardex").await
    }

    async fn list_movements_by_product(
        &self,
        product_id: &str,
    ) -> GatewayResult<Vec<KardexMovement>> {
        self.get_json(&format!("kardex?producto_id={}", product_id))
            .await
    }

    async fn create_movement(&self, fields: NewMovement) -> GatewayResult<KardexMovement> {
        self.post_json("kardex", &fields).await
    }
}

#[async_trait]
impl AuthGateway for HttpGateway {
    async fn login(&self, identifier: &str, secret: &str) -> GatewayResult<AuthSession> {
        let body = serde_json::json!({
            "identifier": identifier,
            "password": secret,
        });
        let session: AuthSession = self.post_json("auth/login", &body).await?;
        self.store_token(Some(session.token.clone()));
        Ok(session)
    }

    async fn signup(&self, fields: NewUser) -> GatewayResult<User> {
        self.post_json("auth/registro", &fields).await
    }

    async fn logout(&self) -> GatewayResult<()> {
        let result = self
            .post_json::<_, serde_json::Value>("auth/logout", &serde_json::json!({}))
            .await;
        // The local token is dropped even if the remote call failed; a
        // half-logged-out session must not keep authenticating.
        self.store_token(None);
        result.map(|_| ())
    }
}

impl Gateway for HttpGateway {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let gateway = HttpGateway::new("https://api.minegocio.co/v1/").unwrap();
        assert_eq!(
            gateway.url("productos"),
            "https://api.minegocio.co/v1/productos"
        );
    }

    #[test]
    fn test_map_not_found_rewrites_404_only() {
        let err: GatewayResult<()> = Err(GatewayError::status(404, "missing"));
        assert!(matches!(
            map_not_found(err, "Product", "p-1"),
            Err(GatewayError::NotFound { .. })
        ));

        let err: GatewayResult<()> = Err(GatewayError::status(500, "boom"));
        assert!(matches!(
            map_not_found(err, "Product", "p-1"),
            Err(GatewayError::Status { status: 500, .. })
        ));
    }
}
