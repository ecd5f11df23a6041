//! # Session & Role Gate
//!
//! Login/logout against the auth gateway, the current-user session, and the
//! Admin gate in front of user administration and the activity log.
//!
//! ## Credential Failure Policy
//! A wrong password and an unreachable service produce the SAME user-facing
//! error ("Credenciales inválidas"): the login screen never reveals which
//! failure mode occurred. The full detail goes to the log.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use negocio_core::validation::{validate_email, validate_name};
use negocio_core::{ActivityLogEntry, ActivityType, CoreError, Role, User};
use negocio_gateway::AuthGateway;
use negocio_session::{entry_for, SessionStore, UserPatch};

use crate::error::{ServiceError, ServiceResult};

// =============================================================================
// Payloads
// =============================================================================

/// Fields for creating a user in the local directory.
#[derive(Debug, Clone)]
pub struct NewLocalUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

// =============================================================================
// Auth Service
// =============================================================================

/// Session lifecycle and admin-gated user administration.
pub struct AuthService {
    auth: Arc<dyn AuthGateway>,
    store: Arc<dyn SessionStore>,
}

impl AuthService {
    pub fn new(auth: Arc<dyn AuthGateway>, store: Arc<dyn SessionStore>) -> Self {
        AuthService { auth, store }
    }

    // -------------------------------------------------------------------------
    // Session lifecycle
    // -------------------------------------------------------------------------

    /// Verifies credentials against the auth gateway; on success persists
    /// the session and appends exactly one `login` activity entry.
    pub async fn login(&self, identifier: &str, secret: &str) -> ServiceResult<User> {
        let session = match self.auth.login(identifier, secret).await {
            Ok(session) => session,
            Err(err) => {
                // Wrong password and dead service look identical to the
                // user; the distinction only matters here in the log
                error!(%identifier, %err, "login failed");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        self.store.set_current_user(&session.user)?;
        self.store.append_activity(entry_for(
            &session.user,
            ActivityType::Login,
            "login",
            format!("{} inició sesión", session.user.name),
        ))?;

        info!(user = %session.user.username, "session started");
        Ok(session.user)
    }

    /// Appends a `logout` entry for the outgoing user (if any), tells the
    /// auth gateway, and clears the session.
    pub async fn logout(&self) -> ServiceResult<()> {
        if let Some(user) = self.store.current_user()? {
            self.store.append_activity(entry_for(
                &user,
                ActivityType::Logout,
                "logout",
                format!("{} cerró sesión", user.name),
            ))?;
            info!(user = %user.username, "session ended");
        }

        // Best-effort: the local session clears even if the remote call
        // fails, otherwise a dead service would pin the user logged in
        if let Err(err) = self.auth.logout().await {
            warn!(%err, "remote logout failed, clearing local session anyway");
        }

        self.store.clear_current_user()?;
        Ok(())
    }

    /// The last successfully authenticated user, if any.
    pub fn current_user(&self) -> ServiceResult<Option<User>> {
        Ok(self.store.current_user()?)
    }

    /// Pure role predicate: no current user means no elevated access.
    pub fn is_admin(&self) -> bool {
        matches!(self.store.current_user(), Ok(Some(user)) if user.is_admin())
    }

    fn require_admin(&self) -> ServiceResult<User> {
        match self.store.current_user()? {
            Some(user) if user.is_admin() => Ok(user),
            _ => Err(ServiceError::Forbidden),
        }
    }

    // -------------------------------------------------------------------------
    // Admin-gated screens
    // -------------------------------------------------------------------------

    /// The activity log, most-recent-first. Admin only.
    pub fn activity_log(&self) -> ServiceResult<Vec<ActivityLogEntry>> {
        self.require_admin()?;
        Ok(self.store.activity_log()?)
    }

    /// Lists the local user directory. Admin only.
    pub fn list_users(&self) -> ServiceResult<Vec<User>> {
        self.require_admin()?;
        Ok(self.store.list_users()?)
    }

    /// Creates a user in the local directory. Admin only.
    pub fn create_user(&self, fields: NewLocalUser) -> ServiceResult<User> {
        let admin = self.require_admin()?;
        validate_name(&fields.name).map_err(CoreError::from)?;
        validate_email(&fields.email).map_err(CoreError::from)?;

        let user = self.store.create_user(User {
            id: Uuid::new_v4().to_string(),
            name: fields.name,
            username: fields.username,
            email: fields.email,
            password: fields.password,
            role: fields.role,
            active: true,
            created_at: Utc::now(),
        })?;

        self.store.append_activity(entry_for(
            &admin,
            ActivityType::Create,
            "crear usuario",
            format!("Usuario {} creado", user.username),
        ))?;
        Ok(user)
    }

    /// Updates a user in the local directory. Admin only; the protected
    /// principal admin is rejected by the store before anything persists.
    pub fn update_user(&self, id: &str, patch: UserPatch) -> ServiceResult<User> {
        let admin = self.require_admin()?;
        let user = self.store.update_user(id, patch)?;

        self.store.append_activity(entry_for(
            &admin,
            ActivityType::Update,
            "actualizar usuario",
            format!("Usuario {} actualizado", user.username),
        ))?;
        Ok(user)
    }

    /// Deactivates a user (keeps the record, blocks login). Admin only.
    pub fn deactivate_user(&self, id: &str) -> ServiceResult<User> {
        self.update_user(
            id,
            UserPatch {
                active: Some(false),
                ..Default::default()
            },
        )
    }

    /// Deletes a user from the local directory. Admin only; the protected
    /// principal admin is rejected by the store before anything persists.
    pub fn delete_user(&self, id: &str) -> ServiceResult<()> {
        let admin = self.require_admin()?;
        self.store.delete_user(id)?;

        self.store.append_activity(entry_for(
            &admin,
            ActivityType::Delete,
            "eliminar usuario",
            format!("Usuario {} eliminado", id),
        ))?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
