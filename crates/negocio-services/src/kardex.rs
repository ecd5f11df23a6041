//! # Kardex Engine
//!
//! Maintains the append-only movement history per product and derives the
//! two read views: **existencias** (current stock + valuation) and
//! **movimientos** (the ledger itself).
//!
//! Recording a movement is the ONLY path that mutates product stock: the
//! catalog screen edits names and prices, never stock. Checkout fulfillment
//! also goes through here, recording a `venta` movement per sold line.

use std::sync::Arc;

use tracing::{info, warn};

use negocio_core::kardex::{apply_movement, existencias};
use negocio_core::validation::validate_quantity;
use negocio_core::{
    CoreError, ExistenciasRow, ExistenciasSummary, KardexMovement, MovementType,
};
use negocio_gateway::api::{NewMovement, ProductPatch};
use negocio_gateway::Gateway;

use crate::error::ServiceResult;

// =============================================================================
// Movement Request
// =============================================================================

/// A request to record one stock movement.
#[derive(Debug, Clone)]
pub struct MovementRequest {
    pub product_id: String,
    pub movement_type: MovementType,
    /// Positive quantity; the movement type carries the direction.
    pub quantity: i64,
    pub reference: Option<String>,
    pub notes: Option<String>,
    /// Name of the acting user.
    pub user: String,
}

// =============================================================================
// Kardex Engine
// =============================================================================

/// The inventory ledger engine.
pub struct KardexEngine {
    gateway: Arc<dyn Gateway>,
}

impl KardexEngine {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        KardexEngine { gateway }
    }

    /// Records a movement and applies it to the product's stock.
    ///
    /// ## Sequence
    /// 1. validate quantity (≥ 1) and load the product
    /// 2. compute `stock_after`; an outbound movement that would leave
    ///    negative stock is rejected here, before anything persists
    /// 3. append the movement to the ledger
    /// 4. patch the product's stock to `stock_after`
    ///
    /// Every recorded movement is immediately and permanently applied;
    /// there is no pending state.
    pub async fn record_movement(&self, request: MovementRequest) -> ServiceResult<KardexMovement> {
        validate_quantity(request.quantity).map_err(CoreError::from)?;

        let product = self.gateway.products().get(&request.product_id).await?;

        let stock_after = apply_movement(product.stock, request.movement_type, request.quantity)
            .map_err(|err| match err {
                // The pure arithmetic doesn't know the product's name;
                // fill it in so the rejection reads like the rest of the UI
                CoreError::InsufficientStock {
                    available,
                    requested,
                    ..
                } => CoreError::InsufficientStock {
                    name: product.name.clone(),
                    available,
                    requested,
                },
                other => other,
            })?;

        let movement = self
            .gateway
            .kardex()
            .create_movement(NewMovement {
                product_id: product.id.clone(),
                movement_type: request.movement_type,
                quantity: request.quantity,
                stock_before: product.stock,
                stock_after,
                reference: request.reference,
                notes: request.notes,
                user: request.user,
            })
            .await?;

        // Keep the product in step with the ledger. If this patch fails the
        // movement already exists and stock is stale, so surface the error and
        // the operator re-checks existencias.
        if let Err(err) = self
            .gateway
            .products()
            .update(
                &product.id,
                ProductPatch {
                    stock: Some(stock_after),
                    ..Default::default()
                },
            )
            .await
        {
            warn!(product_id = %product.id, %err,
                "movement recorded but stock patch failed; ledger and catalog diverge");
            return Err(err.into());
        }

        info!(
            product_id = %product.id,
            movement = ?request.movement_type,
            quantity = request.quantity,
            stock_before = product.stock,
            stock_after,
            "kardex movement recorded"
        );

        Ok(movement)
    }

    /// Current stock and valuation per product, plus the aggregate summary.
    pub async fn existencias(&self) -> ServiceResult<(Vec<ExistenciasRow>, ExistenciasSummary)> {
        let products = self.gateway.products().list().await?;
        Ok(existencias(&products))
    }

    /// Movement history.
    ///
    /// For a single product the history is most-recent-first (the screen
    /// shows the latest movement on top); the full ledger across products
    /// is chronological, which is the export order.
    pub async fn movements(
        &self,
        product_id: Option<&str>,
    ) -> ServiceResult<Vec<KardexMovement>> {
        match product_id {
            Some(id) => {
                let mut movements = self.gateway.kardex().list_movements_by_product(id).await?;
                movements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Ok(movements)
            }
            None => {
                let mut movements = self.gateway.kardex().list_movements().await?;
                movements.sort_by(|a, b| a.created_at.cmp(&b.created_at));
                Ok(movements)
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
    use negocio_core::Product;
    use negocio_gateway::api::ProductsGateway;
    use negocio_gateway::MemoryGateway;

    use crate::error::ServiceError;

    fn product(id: &str, price: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Producto {}", id),
            category: "cerámica".to_string(),
            price_pesos: price,
            stock,
            tax_rate_bps: 0,
            image_url: None,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn engine_with(products: Vec<Product>) -> (Arc<MemoryGateway>, KardexEngine) {
        let gateway = Arc::new(MemoryGateway::new());
        for p in products {
            gateway.seed_product(p).await;
        }
        let engine = KardexEngine::new(gateway.clone());
        (gateway, engine)
    }

    fn request(product_id: &str, ty: MovementType, qty: i64) -> MovementRequest {
        MovementRequest {
            product_id: product_id.to_string(),
            movement_type: ty,
            quantity: qty,
            reference: None,
            notes: None,
            user: "ana".to_string(),
        }
    }

    #[tokio::test]
    async fn test_salida_applies_and_updates_product() {
        let (gateway, engine) = engine_with(vec![product("p-1", 10_000, 5)]).await;

        let movement = engine
            .record_movement(request("p-1", MovementType::Salida, 3))
            .await
            .unwrap();

        assert_eq!(movement.stock_before, 5);
        assert_eq!(movement.stock_after, 2);
        assert_eq!(ProductsGateway::get(&*gateway, "p-1").await.unwrap().stock, 2);
    }

    #[tokio::test]
    async fn test_salida_past_zero_rejected_with_message() {
        let (gateway, engine) = engine_with(vec![product("p-1", 10_000, 5)]).await;

        engine
            .record_movement(request("p-1", MovementType::Salida, 3))
            .await
            .unwrap();

        let err = engine
            .record_movement(request("p-1", MovementType::Salida, 5))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Stock insuficiente para Producto p-1: disponibles 2, solicitadas 5"
        );

        // Nothing was appended and stock is unchanged
        assert_eq!(engine.movements(Some("p-1")).await.unwrap().len(), 1);
        assert_eq!(ProductsGateway::get(&*gateway, "p-1").await.unwrap().stock, 2);
    }

    #[tokio::test]
    async fn test_before_after_chain_across_movements() {
        let (_gateway, engine) = engine_with(vec![product("p-1", 10_000, 3)]).await;

        for (ty, qty) in [
            (MovementType::Compra, 10),
            (MovementType::Venta, 4),
            (MovementType::AjusteEntrada, 1),
            (MovementType::Salida, 2),
        ] {
            engine.record_movement(request("p-1", ty, qty)).await.unwrap();
        }

        // Chronological view for the chain check
        let ledger = engine.movements(None).await.unwrap();
        assert_eq!(ledger.len(), 4);
        for pair in ledger.windows(2) {
            assert_eq!(pair[0].stock_after, pair[1].stock_before);
        }

        let signed_sum: i64 = ledger
            .iter()
            .map(|m| m.movement_type.signed_delta(m.quantity))
            .sum();
        assert_eq!(ledger.last().unwrap().stock_after, 3 + signed_sum);
    }

    #[tokio::test]
    async fn test_single_product_view_is_most_recent_first() {
        let (_gateway, engine) = engine_with(vec![product("p-1", 10_000, 10)]).await;

        engine
            .record_movement(request("p-1", MovementType::Salida, 1))
            .await
            .unwrap();
        engine
            .record_movement(request("p-1", MovementType::Salida, 2))
            .await
            .unwrap();

        let history = engine.movements(Some("p-1")).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].stock_after <= history[1].stock_after);
        assert_eq!(history[0].stock_before, history[1].stock_after);
    }

    #[tokio::test]
    async fn test_invalid_quantity_rejected() {
        let (_gateway, engine) = engine_with(vec![product("p-1", 10_000, 5)]).await;

        for qty in [0, -3] {
            let err = engine
                .record_movement(request("p-1", MovementType::Entrada, qty))
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Core(_)));
        }
        assert!(engine.movements(Some("p-1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let (_gateway, engine) = engine_with(vec![]).await;
        let err = engine
            .record_movement(request("ghost", MovementType::Entrada, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Gateway(_)));
    }

    #[tokio::test]
    async fn test_existencias_summary() {
        let (_gateway, engine) =
            engine_with(vec![product("p-1", 50_000, 3), product("p-2", 180_000, 1)]).await;

        let (rows, summary) = engine.existencias().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(summary.total_products, 2);
        assert_eq!(summary.total_units, 4);
        assert_eq!(summary.total_value.pesos(), 330_000);
    }
}
