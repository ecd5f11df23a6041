//! # Kardex Arithmetic
//!
//! Pure stock-movement math for the inventory ledger.
//!
//! ## The Ledger Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Running Balance Per Product                             │
//! │                                                                         │
//! │  stock: 5                                                               │
//! │    │                                                                    │
//! │    ├── venta qty=3 ──────► before=5, after=2                            │
//! │    │                                                                    │
//! │    ├── compra qty=10 ────► before=2, after=12                           │
//! │    │                                                                    │
//! │    └── salida qty=20 ────► REJECTED (would leave -8)                    │
//! │                                                                         │
//! │  after(i) == before(i+1) for every consecutive pair, and the product's  │
//! │  stock always equals the latest `after`. Stock never goes negative:     │
//! │  an outbound movement that would cross zero is rejected, not clamped.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The I/O half (loading the product, appending the movement, writing the
//! new stock) lives in `negocio-services::kardex`. This module only
//! computes.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{MovementType, Product};

// =============================================================================
// Movement Application
// =============================================================================

/// Applies a movement to a stock level and returns the resulting stock.
///
/// ## Rules
/// - `quantity` must be ≥ 1
/// - Inbound types (entrada, compra, ajuste_entrada) add
/// - Outbound types (salida, venta, ajuste_salida) subtract and are
///   rejected if they would leave negative stock
///
/// ## Example
/// ```rust
/// use negocio_core::kardex::apply_movement;
/// use negocio_core::types::MovementType;
///
/// assert_eq!(apply_movement(5, MovementType::Salida, 3).unwrap(), 2);
/// assert!(apply_movement(2, MovementType::Salida, 5).is_err());
/// ```
pub fn apply_movement(
    stock_before: i64,
    movement_type: MovementType,
    quantity: i64,
) -> CoreResult<i64> {
    if quantity < 1 {
        return Err(CoreError::InvalidMovement {
            reason: format!("la cantidad debe ser al menos 1 (recibida {})", quantity),
        });
    }

    let stock_after = stock_before + movement_type.signed_delta(quantity);
    if stock_after < 0 {
        return Err(CoreError::InsufficientStock {
            name: String::new(),
            available: stock_before,
            requested: quantity,
        });
    }

    Ok(stock_after)
}

// =============================================================================
// Existencias (current stock & valuation)
// =============================================================================

/// One row of the existencias view: a product with its valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistenciasRow {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub stock: i64,
    pub unit_price: Money,
    /// stock × unit price.
    pub valuation: Money,
}

/// Aggregate summary over all existencias rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistenciasSummary {
    pub total_products: usize,
    pub total_units: i64,
    pub total_value: Money,
}

/// Builds the existencias snapshot from the current catalog.
pub fn existencias(products: &[Product]) -> (Vec<ExistenciasRow>, ExistenciasSummary) {
    let rows: Vec<ExistenciasRow> = products
        .iter()
        .map(|p| ExistenciasRow {
            product_id: p.id.clone(),
            name: p.name.clone(),
            category: p.category.clone(),
            stock: p.stock,
            unit_price: p.price(),
            valuation: p.price().multiply_quantity(p.stock),
        })
        .collect();

    let summary = ExistenciasSummary {
        total_products: rows.len(),
        total_units: rows.iter().map(|r| r.stock).sum(),
        total_value: rows
            .iter()
            .fold(Money::zero(), |acc, r| acc + r.valuation),
    };

    (rows, summary)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, price: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Producto {}", id),
            category: "tejidos".to_string(),
            price_pesos: price,
            stock,
            tax_rate_bps: 0,
            image_url: None,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_inbound_movements_add() {
        assert_eq!(apply_movement(0, MovementType::Entrada, 5).unwrap(), 5);
        assert_eq!(apply_movement(3, MovementType::Compra, 2).unwrap(), 5);
        assert_eq!(apply_movement(1, MovementType::AjusteEntrada, 1).unwrap(), 2);
    }

    #[test]
    fn test_outbound_movements_subtract() {
        assert_eq!(apply_movement(5, MovementType::Salida, 3).unwrap(), 2);
        assert_eq!(apply_movement(5, MovementType::Venta, 5).unwrap(), 0);
        assert_eq!(apply_movement(5, MovementType::AjusteSalida, 1).unwrap(), 4);
    }

    #[test]
    fn test_outbound_past_zero_rejected() {
        let err = apply_movement(2, MovementType::Salida, 5).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 2, requested: 5, .. }
        ));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert!(apply_movement(5, MovementType::Entrada, 0).is_err());
        assert!(apply_movement(5, MovementType::Entrada, -1).is_err());
    }

    #[test]
    fn test_signed_sum_property() {
        // Final stock equals start plus the signed sum of all quantities
        let moves = [
            (MovementType::Compra, 10),
            (MovementType::Venta, 4),
            (MovementType::AjusteEntrada, 1),
            (MovementType::Salida, 2),
        ];

        let mut stock = 3i64;
        for (ty, qty) in moves {
            stock = apply_movement(stock, ty, qty).unwrap();
        }

        let signed_sum: i64 = moves.iter().map(|(ty, qty)| ty.signed_delta(*qty)).sum();
        assert_eq!(stock, 3 + signed_sum);
        assert_eq!(stock, 8);
    }

    #[test]
    fn test_existencias_valuation() {
        let catalog = vec![product("1", 50_000, 3), product("2", 180_000, 1)];

        let (rows, summary) = existencias(&catalog);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].valuation.pesos(), 150_000);
        assert_eq!(rows[1].valuation.pesos(), 180_000);
        assert_eq!(summary.total_products, 2);
        assert_eq!(summary.total_units, 4);
        assert_eq!(summary.total_value.pesos(), 330_000);
    }

    #[test]
    fn test_existencias_empty_catalog() {
        let (rows, summary) = existencias(&[]);
        assert!(rows.is_empty());
        assert_eq!(summary.total_units, 0);
        assert_eq!(summary.total_value, Money::zero());
    }
}
