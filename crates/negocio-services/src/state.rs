//! # Cart State
//!
//! The shared handle to the active cart.
//!
//! ## Thread Safety
//! The cart is the only shared mutable value in the whole app. It lives
//! behind `Arc<Mutex<Cart>>`: screens and workflows take the lock for one
//! synchronous read-modify-write and release it, last writer wins. There is
//! exactly one logical writer (the current session), so this is the entire
//! concurrency story.

use std::sync::{Arc, Mutex};

use negocio_core::Cart;
use negocio_session::{SessionResult, SessionStore};

/// Shared cart state.
#[derive(Debug, Clone)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        CartState {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    /// Restores cart state from a crash-recovery snapshot, if one exists.
    pub fn from_snapshot(snapshot: Option<Cart>) -> Self {
        CartState {
            cart: Arc::new(Mutex::new(snapshot.unwrap_or_default())),
        }
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().expect("cart mutex poisoned");
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().expect("cart mutex poisoned");
        f(&mut cart)
    }

    /// Writes the current cart to the store's crash-recovery snapshot.
    ///
    /// Screens call this after every cart mutation, so an interrupted
    /// session can pick up where it left off.
    pub fn persist_snapshot(&self, store: &dyn SessionStore) -> SessionResult<()> {
        self.with_cart(|cart| store.save_cart(cart))
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use negocio_core::Product;
    use negocio_session::{MemorySessionStore, SessionStore};

    fn test_product() -> Product {
        Product {
            id: "p-1".to_string(),
            name: "Hamaca".to_string(),
            category: "tejidos".to_string(),
            price_pesos: 250_000,
            stock: 3,
            tax_rate_bps: 0,
            image_url: None,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_snapshot_round_trip() {
        let store = MemorySessionStore::new();
        let state = CartState::new();

        state
            .with_cart_mut(|c| c.add_item(&test_product(), 2))
            .unwrap();
        state.persist_snapshot(&store).unwrap();

        let restored = CartState::from_snapshot(store.load_cart().unwrap());
        assert_eq!(restored.with_cart(|c| c.total_quantity()), 2);
    }

    #[test]
    fn test_from_empty_snapshot() {
        let state = CartState::from_snapshot(None);
        assert!(state.with_cart(|c| c.is_empty()));
    }
}
