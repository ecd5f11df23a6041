//! # Activity Log
//!
//! A capped, most-recent-first log of user actions.
//!
//! The log keeps at most [`ACTIVITY_LOG_CAPACITY`] entries: appending the
//! 101st evicts the oldest. Entries are never edited; the only mutations are
//! append and (implicit) eviction.

use chrono::Utc;
use uuid::Uuid;

use negocio_core::{ActivityLogEntry, ActivityType, User, ACTIVITY_LOG_CAPACITY};

/// Appends an entry at the front and evicts past the capacity.
pub(crate) fn push_capped(log: &mut Vec<ActivityLogEntry>, entry: ActivityLogEntry) {
    log.insert(0, entry);
    log.truncate(ACTIVITY_LOG_CAPACITY);
}

/// Builds a log entry for a user action.
pub fn entry_for(
    user: &User,
    entry_type: ActivityType,
    action: impl Into<String>,
    description: impl Into<String>,
) -> ActivityLogEntry {
    ActivityLogEntry {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        user_name: user.name.clone(),
        action: action.into(),
        description: description.into(),
        entry_type,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use negocio_core::Role;

    fn test_user() -> User {
        User {
            id: "u-1".to_string(),
            name: "Ana".to_string(),
            username: "ana".to_string(),
            email: "ana@minegocio.co".to_string(),
            password: "x".to_string(),
            role: Role::Vendedor,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_newest_entry_is_first() {
        let user = test_user();
        let mut log = Vec::new();

        push_capped(&mut log, entry_for(&user, ActivityType::Login, "login", "first"));
        push_capped(&mut log, entry_for(&user, ActivityType::View, "ver kardex", "second"));

        assert_eq!(log.len(), 2);
        assert_eq!(log[0].description, "second");
        assert_eq!(log[1].description, "first");
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let user = test_user();
        let mut log = Vec::new();

        for i in 0..101 {
            push_capped(
                &mut log,
                entry_for(&user, ActivityType::Create, "crear", format!("entry {}", i)),
            );
        }

        assert_eq!(log.len(), ACTIVITY_LOG_CAPACITY);
        // Newest first; "entry 0" (the oldest) has been evicted
        assert_eq!(log[0].description, "entry 100");
        assert_eq!(log.last().unwrap().description, "entry 1");
        assert!(log.iter().all(|e| e.description != "entry 0"));
    }
}
