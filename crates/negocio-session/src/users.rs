//! # Local User Directory
//!
//! Role gating works against a local user directory that is bootstrapped
//! with one principal admin record. That record is special:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Protected Principal Admin                              │
//! │                                                                         │
//! │  Matched by email == PRINCIPAL_ADMIN_EMAIL. For that identity:          │
//! │                                                                         │
//! │    delete_user()      → SessionError::ProtectedAdmin                    │
//! │    deactivate_user()  → SessionError::ProtectedAdmin                    │
//! │    update_user(any)   → SessionError::ProtectedAdmin                    │
//! │                                                                         │
//! │  The guard runs before any persistence call, so a rejected attempt      │
//! │  leaves no trace in the store.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use negocio_core::{Role, User, PRINCIPAL_ADMIN_EMAIL};

use crate::error::{SessionError, SessionResult};

/// Bootstrap credentials for the principal admin. The password is an opaque
/// local-fallback value; real verification happens against the remote auth
/// service.
const ADMIN_BOOTSTRAP_NAME: &str = "Administrador Principal";
const ADMIN_BOOTSTRAP_USERNAME: &str = "admin";
const ADMIN_BOOTSTRAP_PASSWORD: &str = "admin123";

/// Partial update for a local user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

/// Checks whether a user is the protected principal admin.
#[inline]
pub fn is_principal_admin(user: &User) -> bool {
    user.email == PRINCIPAL_ADMIN_EMAIL
}

/// Inserts the principal admin record if the directory doesn't have one yet.
pub(crate) fn ensure_admin(users: &mut Vec<User>) {
    if users.iter().any(is_principal_admin) {
        return;
    }
    users.push(User {
        id: Uuid::new_v4().to_string(),
        name: ADMIN_BOOTSTRAP_NAME.to_string(),
        username: ADMIN_BOOTSTRAP_USERNAME.to_string(),
        email: PRINCIPAL_ADMIN_EMAIL.to_string(),
        password: ADMIN_BOOTSTRAP_PASSWORD.to_string(),
        role: Role::Admin,
        active: true,
        created_at: Utc::now(),
    });
}

/// Adds a user, rejecting duplicate usernames/emails.
pub(crate) fn add_user(users: &mut Vec<User>, user: User) -> SessionResult<User> {
    if users.iter().any(|u| u.email == user.email) {
        return Err(SessionError::DuplicateUser {
            field: "email".to_string(),
            value: user.email,
        });
    }
    if users.iter().any(|u| u.username == user.username) {
        return Err(SessionError::DuplicateUser {
            field: "username".to_string(),
            value: user.username,
        });
    }
    users.push(user.clone());
    Ok(user)
}

/// Applies a patch to a user, running the protected-admin guard first.
pub(crate) fn patch_user(users: &mut [User], id: &str, patch: UserPatch) -> SessionResult<User> {
    let user = users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or_else(|| SessionError::UserNotFound(id.to_string()))?;

    if is_principal_admin(user) {
        return Err(SessionError::ProtectedAdmin);
    }

    if let Some(name) = patch.name {
        user.name = name;
    }
    if let Some(username) = patch.username {
        user.username = username;
    }
    if let Some(email) = patch.email {
        user.email = email;
    }
    if let Some(password) = patch.password {
        user.password = password;
    }
    if let Some(role) = patch.role {
        user.role = role;
    }
    if let Some(active) = patch.active {
        user.active = active;
    }

    Ok(user.clone())
}

/// Removes a user, running the protected-admin guard first.
pub(crate) fn remove_user(users: &mut Vec<User>, id: &str) -> SessionResult<()> {
    let user = users
        .iter()
        .find(|u| u.id == id)
        .ok_or_else(|| SessionError::UserNotFound(id.to_string()))?;

    if is_principal_admin(user) {
        return Err(SessionError::ProtectedAdmin);
    }

    users.retain(|u| u.id != id);
    Ok(())
}
