//! # Cart
//!
//! The shopping cart and its derived totals.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Operations                                   │
//! │                                                                         │
//! │  Screen Action            Cart Method              State Change         │
//! │  ─────────────            ───────────              ────────────         │
//! │                                                                         │
//! │  Tap product ───────────► add_item() ────────────► items.push(item)     │
//! │                                                    (merges duplicates)  │
//! │  Change quantity ───────► update_quantity() ─────► items[i].qty = n     │
//! │                                                                         │
//! │  Tap remove ────────────► remove_item() ─────────► items.remove(i)      │
//! │                                                                         │
//! │  Checkout success ──────► clear() ───────────────► items.clear()        │
//! │                                                                         │
//! │  Every mutation enforces 1 ≤ quantity ≤ product.stock, so the cart      │
//! │  can never promise units the shelf doesn't have.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Totals, On Purpose
//! Listed prices already include IVA. The charged total is the sum of the
//! tax-inclusive line subtotals plus shipping; the ex-tax subtotal and the
//! IVA amount are derived separately for the invoice. Both views are kept;
//! see [`CartTotals`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Product, TaxRate};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Item
// =============================================================================

/// An item in the shopping cart.
///
/// Holds a frozen snapshot of the product at the moment it was added, so the
/// cart keeps displaying consistent data even if the catalog changes
/// underneath it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Product ID (UUID)
    pub product_id: String,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Tax-inclusive unit price in pesos at time of adding (frozen)
    pub unit_price_pesos: i64,

    /// IVA rate in basis points at time of adding (frozen)
    pub tax_rate_bps: u32,

    /// Quantity in cart
    pub quantity: i64,

    /// When this item was added to cart
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a new cart item from a product and quantity.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_pesos: product.price_pesos,
            tax_rate_bps: product.tax_rate_bps,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_pesos(self.unit_price_pesos)
    }

    /// Returns the frozen tax rate.
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Tax-inclusive line subtotal (unit price × quantity).
    pub fn line_subtotal(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// Ex-tax portion of the line (per-unit split, then × quantity).
    pub fn line_ex_tax(&self) -> Money {
        self.unit_price()
            .tax_exclusive(self.tax_rate())
            .multiply_quantity(self.quantity)
    }

    /// IVA portion of the line (per-unit split, then × quantity).
    pub fn line_tax(&self) -> Money {
        self.unit_price()
            .included_tax(self.tax_rate())
            .multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `product_id` (adding the same product merges
///   quantities)
/// - `1 ≤ quantity ≤ product.stock` at every mutation, not just at checkout
/// - At most [`MAX_CART_ITEMS`] distinct items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    /// Items in the cart
    pub items: Vec<CartItem>,

    /// When the cart was created/last cleared
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a product to the cart or increases quantity if already present.
    ///
    /// The merged quantity is checked against the product's current stock,
    /// so a second add cannot sneak past the ceiling the first add honored.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        check_quantity_bounds(quantity)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let new_qty = item.quantity + quantity;
            check_quantity_bounds(new_qty)?;
            if !product.can_fulfill(new_qty) {
                return Err(CoreError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.stock,
                    requested: new_qty,
                });
            }
            item.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        if !product.can_fulfill(quantity) {
            return Err(CoreError::InsufficientStock {
                name: product.name.clone(),
                available: product.stock,
                requested: quantity,
            });
        }

        self.items.push(CartItem::from_product(product, quantity));
        Ok(())
    }

    /// Sets the quantity of an item already in the cart.
    ///
    /// Quantity 0 removes the item; anything else is re-checked against the
    /// product's current stock.
    pub fn update_quantity(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(&product.id);
        }

        check_quantity_bounds(quantity)?;

        if !product.can_fulfill(quantity) {
            return Err(CoreError::InsufficientStock {
                name: product.name.clone(),
                available: product.stock,
                requested: quantity,
            });
        }

        match self.items.iter_mut().find(|i| i.product_id == product.id) {
            Some(item) => {
                item.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::ItemNotInCart {
                product_id: product.id.clone(),
            }),
        }
    }

    /// Removes an item from the cart by product ID.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == initial_len {
            Err(CoreError::ItemNotInCart {
                product_id: product_id.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    /// Returns the number of distinct items in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn check_quantity_bounds(quantity: i64) -> CoreResult<()> {
    if quantity < 1 {
        return Err(CoreError::Validation(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }));
    }
    if quantity > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

// =============================================================================
// Cart Totals
// =============================================================================

/// All monetary totals derived from a cart plus a shipping amount.
///
/// Pure derivation, no side effects. Note the deliberate asymmetry:
/// `grand_total = lines_subtotal + shipping` (tax-inclusive path), while
/// `subtotal_ex_tax` and `total_tax` are the invoice's ex-tax split. The
/// charged amount follows the inclusive path; both views are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Σ tax-inclusive line subtotals.
    pub lines_subtotal: Money,
    /// Σ ex-tax unit price × quantity.
    pub subtotal_ex_tax: Money,
    /// Σ included IVA × quantity.
    pub total_tax: Money,
    /// Operator-entered shipping amount.
    pub shipping: Money,
    /// lines_subtotal + shipping.
    pub grand_total: Money,
}

impl CartTotals {
    /// Computes all totals for a cart and shipping amount.
    pub fn compute(cart: &Cart, shipping: Money) -> Self {
        let lines_subtotal = cart
            .items
            .iter()
            .fold(Money::zero(), |acc, i| acc + i.line_subtotal());
        let subtotal_ex_tax = cart
            .items
            .iter()
            .fold(Money::zero(), |acc, i| acc + i.line_ex_tax());
        let total_tax = cart
            .items
            .iter()
            .fold(Money::zero(), |acc, i| acc + i.line_tax());

        CartTotals {
            lines_subtotal,
            subtotal_ex_tax,
            total_tax,
            shipping,
            grand_total: lines_subtotal + shipping,
        }
    }
}

/// Parses the operator-entered shipping field.
///
/// The field is free-form text; empty, non-numeric, or negative input all
/// clamp to zero. This never errors.
///
/// ## Example
/// ```rust
/// use negocio_core::cart::parse_shipping;
///
/// assert_eq!(parse_shipping("10000").pesos(), 10_000);
/// assert_eq!(parse_shipping("  10000 ").pesos(), 10_000);
/// assert_eq!(parse_shipping("").pesos(), 0);
/// assert_eq!(parse_shipping("gratis").pesos(), 0);
/// assert_eq!(parse_shipping("-500").pesos(), 0);
/// ```
pub fn parse_shipping(raw: &str) -> Money {
    match raw.trim().parse::<i64>() {
        Ok(pesos) if pesos > 0 => Money::from_pesos(pesos),
        _ => Money::zero(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
