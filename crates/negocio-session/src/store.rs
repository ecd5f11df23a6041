//! # Session Store
//!
//! The `SessionStore` trait and its two implementations.
//!
//! ## Persisted Sections
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Store Layout                               │
//! │                                                                         │
//! │  current_user   Last successfully authenticated user (or none)          │
//! │  cart           Crash-recovery snapshot of the active cart              │
//! │  activity       Most-recent-first log, capped at 100 entries            │
//! │  users          Local user directory (bootstrapped with the             │
//! │                 protected principal admin)                              │
//! │                                                                         │
//! │  Each section round-trips through JSON independently; the JSON store    │
//! │  persists the whole document after every mutation.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Workflows receive the store as an injected `Arc<dyn SessionStore>`; it
//! is never ambient global state, so tests swap in [`MemorySessionStore`].

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use negocio_core::{ActivityLogEntry, Cart, User};

use crate::activity::push_capped;
use crate::error::SessionResult;
use crate::users::{add_user, ensure_admin, patch_user, remove_user, UserPatch};

// =============================================================================
// Trait
// =============================================================================

/// Local persistence for session, cart snapshot, activity log, and the user
/// directory.
pub trait SessionStore: Send + Sync {
    // --- current session -----------------------------------------------------
    fn current_user(&self) -> SessionResult<Option<User>>;
    fn set_current_user(&self, user: &User) -> SessionResult<()>;
    fn clear_current_user(&self) -> SessionResult<()>;

    // --- cart snapshot (crash recovery) --------------------------------------
    fn save_cart(&self, cart: &Cart) -> SessionResult<()>;
    fn load_cart(&self) -> SessionResult<Option<Cart>>;
    fn clear_cart(&self) -> SessionResult<()>;

    // --- activity log --------------------------------------------------------
    fn append_activity(&self, entry: ActivityLogEntry) -> SessionResult<()>;
    /// Most-recent-first.
    fn activity_log(&self) -> SessionResult<Vec<ActivityLogEntry>>;

    // --- user directory ------------------------------------------------------
    fn list_users(&self) -> SessionResult<Vec<User>>;
    fn create_user(&self, user: User) -> SessionResult<User>;
    fn update_user(&self, id: &str, patch: UserPatch) -> SessionResult<User>;
    fn delete_user(&self, id: &str) -> SessionResult<()>;
}

// =============================================================================
// Shared Document
// =============================================================================

/// The whole locally persisted document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionData {
    current_user: Option<User>,
    cart: Option<Cart>,
    activity: Vec<ActivityLogEntry>,
    users: Vec<User>,
}

// =============================================================================
// MemorySessionStore
// =============================================================================

/// In-process store for tests and single-shot tooling.
#[derive(Debug)]
pub struct MemorySessionStore {
    data: Mutex<SessionData>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        let mut data = SessionData::default();
        ensure_admin(&mut data.users);
        MemorySessionStore {
            data: Mutex::new(data),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut SessionData) -> R) -> R {
        let mut data = self.data.lock().expect("session store mutex poisoned");
        f(&mut data)
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemorySessionStore {
    fn current_user(&self) -> SessionResult<Option<User>> {
        Ok(self.with(|d| d.current_user.clone()))
    }

    fn set_current_user(&self, user: &User) -> SessionResult<()> {
        self.with(|d| d.current_user = Some(user.clone()));
        Ok(())
    }

    fn clear_current_user(&self) -> SessionResult<()> {
        self.with(|d| d.current_user = None);
        Ok(())
    }

    fn save_cart(&self, cart: &Cart) -> SessionResult<()> {
        self.with(|d| d.cart = Some(cart.clone()));
        Ok(())
    }

    fn load_cart(&self) -> SessionResult<Option<Cart>> {
        Ok(self.with(|d| d.cart.clone()))
    }

    fn clear_cart(&self) -> SessionResult<()> {
        self.with(|d| d.cart = None);
        Ok(())
    }

    fn append_activity(&self, entry: ActivityLogEntry) -> SessionResult<()> {
        self.with(|d| push_capped(&mut d.activity, entry));
        Ok(())
    }

    fn activity_log(&self) -> SessionResult<Vec<ActivityLogEntry>> {
        Ok(self.with(|d| d.activity.clone()))
    }

    fn list_users(&self) -> SessionResult<Vec<User>> {
        Ok(self.with(|d| d.users.clone()))
    }

    fn create_user(&self, user: User) -> SessionResult<User> {
        self.with(|d| add_user(&mut d.users, user))
    }

    fn update_user(&self, id: &str, patch: UserPatch) -> SessionResult<User> {
        self.with(|d| patch_user(&mut d.users, id, patch))
    }

    fn delete_user(&self, id: &str) -> SessionResult<()> {
        self.with(|d| remove_user(&mut d.users, id))
    }
}

// =============================================================================
// JsonSessionStore
// =============================================================================

/// File-backed store: one JSON document, loaded eagerly on open, rewritten
/// after every mutation via a temp-file rename so a crash mid-write never
/// leaves a torn document behind.
#[derive(Debug)]
pub struct JsonSessionStore {
    path: PathBuf,
    data: Mutex<SessionData>,
}

impl JsonSessionStore {
    /// Opens (or initializes) the store at the given path.
    pub fn open(path: impl Into<PathBuf>) -> SessionResult<Self> {
        let path = path.into();

        let mut data = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            SessionData::default()
        };

        ensure_admin(&mut data.users);

        let store = JsonSessionStore {
            path,
            data: Mutex::new(data),
        };
        store.with(|_| Ok(()))?; // persist the bootstrapped document
        Ok(store)
    }

    fn persist(&self, data: &SessionData) -> SessionResult<()> {
        let raw = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "session store persisted");
        Ok(())
    }

    /// Runs a mutation and persists the document if it succeeded.
    fn with<R>(&self, f: impl FnOnce(&mut SessionData) -> SessionResult<R>) -> SessionResult<R> {
        let mut data = self.data.lock().expect("session store mutex poisoned");
        let result = f(&mut data)?;
        self.persist(&data)?;
        Ok(result)
    }

    /// Runs a read without touching the file.
    fn read<R>(&self, f: impl FnOnce(&SessionData) -> R) -> R {
        let data = self.data.lock().expect("session store mutex poisoned");
        f(&data)
    }
}

impl SessionStore for JsonSessionStore {
    fn current_user(&self) -> SessionResult<Option<User>> {
        Ok(self.read(|d| d.current_user.clone()))
    }

    fn set_current_user(&self, user: &User) -> SessionResult<()> {
        self.with(|d| {
            d.current_user = Some(user.clone());
            Ok(())
        })
    }

    fn clear_current_user(&self) -> SessionResult<()> {
        self.with(|d| {
            d.current_user = None;
            Ok(())
        })
    }

    fn save_cart(&self, cart: &Cart) -> SessionResult<()> {
        self.with(|d| {
            d.cart = Some(cart.clone());
            Ok(())
        })
    }

    fn load_cart(&self) -> SessionResult<Option<Cart>> {
        Ok(self.read(|d| d.cart.clone()))
    }

    fn clear_cart(&self) -> SessionResult<()> {
        self.with(|d| {
            d.cart = None;
            Ok(())
        })
    }

    fn append_activity(&self, entry: ActivityLogEntry) -> SessionResult<()> {
        self.with(|d| {
            push_capped(&mut d.activity, entry);
            Ok(())
        })
    }

    fn activity_log(&self) -> SessionResult<Vec<ActivityLogEntry>> {
        Ok(self.read(|d| d.activity.clone()))
    }

    fn list_users(&self) -> SessionResult<Vec<User>> {
        Ok(self.read(|d| d.users.clone()))
    }

    fn create_user(&self, user: User) -> SessionResult<User> {
        self.with(|d| add_user(&mut d.users, user))
    }

    fn update_user(&self, id: &str, patch: UserPatch) -> SessionResult<User> {
        self.with(|d| patch_user(&mut d.users, id, patch))
    }

    fn delete_user(&self, id: &str) -> SessionResult<()> {
        self.with(|d| remove_user(&mut d.users, id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use negocio_core::{Product, Role, PRINCIPAL_ADMIN_EMAIL};

    use crate::activity::entry_for;
    use negocio_core::ActivityType;

    fn test_user(id: &str) -> User {
        User {
            id: id.to_string(),
            name: "Ana".to_string(),
            username: format!("ana-{}", id),
            email: format!("{}@minegocio.co", id),
            password: "x".to_string(),
            role: Role::Vendedor,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn test_product() -> Product {
        Product {
            id: "p-1".to_string(),
            name: "Mochila Wayuu".to_string(),
            category: "tejidos".to_string(),
            price_pesos: 180_000,
            stock: 5,
            tax_rate_bps: 0,
            image_url: None,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_memory_store_bootstraps_admin() {
        let store = MemorySessionStore::new();
        let users = store.list_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, PRINCIPAL_ADMIN_EMAIL);
    }

    #[test]
    fn test_memory_store_session_round_trip() {
        let store = MemorySessionStore::new();
        assert!(store.current_user().unwrap().is_none());

        let user = test_user("u-1");
        store.set_current_user(&user).unwrap();
        assert_eq!(store.current_user().unwrap().unwrap().id, "u-1");

        store.clear_current_user().unwrap();
        assert!(store.current_user().unwrap().is_none());
    }

    #[test]
    fn test_json_store_round_trips_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        {
            let store = JsonSessionStore::open(&path).unwrap();
            let user = test_user("u-1");
            store.set_current_user(&user).unwrap();

            let mut cart = Cart::new();
            cart.add_item(&test_product(), 2).unwrap();
            store.save_cart(&cart).unwrap();

            store
                .append_activity(entry_for(&user, ActivityType::Login, "login", "inicio"))
                .unwrap();
        }

        // Reopen: everything survives the process boundary
        let store = JsonSessionStore::open(&path).unwrap();
        assert_eq!(store.current_user().unwrap().unwrap().id, "u-1");
        let cart = store.load_cart().unwrap().unwrap();
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(store.activity_log().unwrap().len(), 1);
        // Bootstrap stays idempotent across reopens
        assert_eq!(store.list_users().unwrap().len(), 1);
    }

    #[test]
    fn test_json_store_rejects_admin_mutation_without_persisting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = JsonSessionStore::open(&path).unwrap();
        let admin_id = store.list_users().unwrap()[0].id.clone();

        assert!(store.delete_user(&admin_id).is_err());
        assert!(store
            .update_user(&admin_id, UserPatch { active: Some(false), ..Default::default() })
            .is_err());

        let reopened = JsonSessionStore::open(&path).unwrap();
        let users = reopened.list_users().unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].active);
    }

    #[test]
    fn test_cart_snapshot_clear() {
        let store = MemorySessionStore::new();
        let mut cart = Cart::new();
        cart.add_item(&test_product(), 1).unwrap();

        store.save_cart(&cart).unwrap();
        assert!(store.load_cart().unwrap().is_some());

        store.clear_cart().unwrap();
        assert!(store.load_cart().unwrap().is_none());
    }
}
