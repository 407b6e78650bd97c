// Domain model for the records the seeder reads and writes in the backend

pub mod money;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Table keys may be uuids or bigints depending on the schema; both are carried as text
fn deserialize_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("unsupported key: {}", other))),
    }
}

/// Role tag stored in an identity's metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Vendor,
    Rider,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Vendor => "vendor",
            Role::Rider => "rider",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account as the identity directory reports it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    /// Emails are the natural key; the directory stores them lowercased
    pub fn has_email(&self, email: &str) -> bool {
        self.email
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case(email))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityMetadata {
    pub full_name: String,
    pub role: Role,
}

/// Payload for creating a pre-confirmed identity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    pub email_confirm: bool,
    pub user_metadata: IdentityMetadata,
}

/// Row reference returned when querying or inserting a store
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreRef {
    #[serde(deserialize_with = "deserialize_key")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewStore {
    pub owner_id: String,
    pub name: String,
    pub cuisine: String,
    pub delivery_time: String,
    pub is_open: bool,
    pub image: String,
    pub rating: f64,
    pub tag: String,
    pub price_range: String,
}

/// Price is in minor currency units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCatalogItem {
    pub restaurant_id: String,
    pub name: String,
    pub price: i64,
    pub description: String,
    pub image: String,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BalanceRecord {
    #[serde(deserialize_with = "deserialize_key")]
    pub id: String,
    pub balance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let metadata = IdentityMetadata {
            full_name: "Fatima Vendor".to_string(),
            role: Role::Vendor,
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["role"], "vendor");
        assert_eq!(json["full_name"], "Fatima Vendor");
    }

    #[test]
    fn test_identity_email_match_ignores_case() {
        let identity = Identity {
            id: "abc".to_string(),
            email: Some("student@nexgo.test".to_string()),
        };
        assert!(identity.has_email("Student@NexGo.test"));
        assert!(!identity.has_email("vendor@nexgo.test"));
    }

    #[test]
    fn test_identity_without_email_never_matches() {
        let identity: Identity = serde_json::from_str(r#"{"id": "phone-only"}"#).unwrap();
        assert!(!identity.has_email(""));
    }

    #[test]
    fn test_store_key_accepts_number_or_uuid() {
        let numeric: StoreRef = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        let uuid: StoreRef =
            serde_json::from_str(r#"{"id": "7f1c9a52-6a0e-4d8e-9a43-2f1f0b2a9c11"}"#).unwrap();
        assert_eq!(numeric.id, "42");
        assert_eq!(uuid.id, "7f1c9a52-6a0e-4d8e-9a43-2f1f0b2a9c11");
        assert!(serde_json::from_str::<StoreRef>(r#"{"id": null}"#).is_err());
    }

    #[test]
    fn test_balance_accepts_decimal_and_integer() {
        let a: BalanceRecord = serde_json::from_str(r#"{"id": "w1", "balance": 4999}"#).unwrap();
        let b: BalanceRecord = serde_json::from_str(r#"{"id": "w2", "balance": 12.5}"#).unwrap();
        assert_eq!(a.balance, 4999.0);
        assert_eq!(b.balance, 12.5);
    }
}
