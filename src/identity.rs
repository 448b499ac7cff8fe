//! The stored identity record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::host::Storage;

/// Well-known storage key for the serialized identity record.
pub const USER_KEY: &str = "user";

/// The identity snapshot an authentication middleware attaches to the
/// navigation context.
///
/// Applications routinely stuff extra fields into the stored record; they
/// survive a round trip through the flattened remainder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reads and parses the identity record under [`USER_KEY`].
///
/// An absent record is "no identity". An unreadable record is also "no
/// identity" — and is removed from storage, so the next navigation does not
/// trip over it again.
pub fn stored_user(storage: &dyn Storage) -> Option<User> {
    let raw = storage.get(USER_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(user) => Some(user),
        Err(err) => {
            warn!(error = %err, "stored identity is unreadable, clearing it");
            storage.remove(USER_KEY);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryStorage;

    #[test]
    fn absent_record_is_no_identity() {
        let storage = MemoryStorage::new();
        assert!(stored_user(&storage).is_none());
    }

    #[test]
    fn unreadable_record_is_cleared() {
        let storage = MemoryStorage::new();
        storage.set(USER_KEY, "{not json");

        assert!(stored_user(&storage).is_none());
        assert!(storage.get(USER_KEY).is_none());
    }

    #[test]
    fn extra_fields_survive() {
        let storage = MemoryStorage::new();
        storage.set(
            USER_KEY,
            r#"{"id":"1","name":"Ana","email":"ana@example.com","roles":["admin"],"theme":"dark"}"#,
        );

        let user = stored_user(&storage).unwrap();
        assert_eq!(user.roles, ["admin"]);
        assert_eq!(user.extra["theme"], "dark");
    }
}
