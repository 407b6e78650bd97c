// Result entries reported back to the caller of a seeding run

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IdentityStatus {
    #[serde(rename = "already exists")]
    AlreadyExists,
    #[serde(rename = "created")]
    Created,
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityOutcome {
    pub email: String,
    pub status: IdentityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `restaurant` holds the store id, or the literal "error" when no store could be resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreOutcome {
    pub restaurant: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletOutcome {
    pub wallet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeedEntry {
    Identity(IdentityOutcome),
    Store(StoreOutcome),
    Wallet(WalletOutcome),
}

impl SeedEntry {
    pub fn identity_found(email: &str, id: &str) -> Self {
        SeedEntry::Identity(IdentityOutcome {
            email: email.to_string(),
            status: IdentityStatus::AlreadyExists,
            id: Some(id.to_string()),
            error: None,
        })
    }

    pub fn identity_created(email: &str, id: &str) -> Self {
        SeedEntry::Identity(IdentityOutcome {
            email: email.to_string(),
            status: IdentityStatus::Created,
            id: Some(id.to_string()),
            error: None,
        })
    }

    pub fn identity_failed(email: &str, error: String) -> Self {
        SeedEntry::Identity(IdentityOutcome {
            email: email.to_string(),
            status: IdentityStatus::Error,
            id: None,
            error: Some(error),
        })
    }

    pub fn store(id: &str, status: String) -> Self {
        SeedEntry::Store(StoreOutcome {
            restaurant: id.to_string(),
            status: Some(status),
            error: None,
        })
    }

    /// Store exists but its catalog batch was rejected
    pub fn store_without_catalog(id: &str, error: String) -> Self {
        SeedEntry::Store(StoreOutcome {
            restaurant: id.to_string(),
            status: Some("created without menu items".to_string()),
            error: Some(error),
        })
    }

    pub fn store_failed(error: String) -> Self {
        SeedEntry::Store(StoreOutcome {
            restaurant: "error".to_string(),
            status: None,
            error: Some(error),
        })
    }

    pub fn wallet_topped_up(amount: &str) -> Self {
        SeedEntry::Wallet(WalletOutcome {
            wallet: format!("topped up to {}", amount),
            error: None,
        })
    }

    pub fn wallet_failed(error: String) -> Self {
        SeedEntry::Wallet(WalletOutcome {
            wallet: "error".to_string(),
            error: Some(error),
        })
    }
}

/// Ordered outcomes of one run: identities, then store, then wallet
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeedReport {
    pub results: Vec<SeedEntry>,
}

impl SeedReport {
    pub fn push(&mut self, entry: SeedEntry) {
        self.results.push(entry);
    }

    pub fn identity(&self, email: &str) -> Option<&IdentityOutcome> {
        self.identities().find(|o| o.email.eq_ignore_ascii_case(email))
    }

    pub fn identities(&self) -> impl Iterator<Item = &IdentityOutcome> {
        self.results.iter().filter_map(|entry| match entry {
            SeedEntry::Identity(outcome) => Some(outcome),
            _ => None,
        })
    }

    pub fn store(&self) -> Option<&StoreOutcome> {
        self.results.iter().find_map(|entry| match entry {
            SeedEntry::Store(outcome) => Some(outcome),
            _ => None,
        })
    }

    pub fn wallet(&self) -> Option<&WalletOutcome> {
        self.results.iter().find_map(|entry| match entry {
            SeedEntry::Wallet(outcome) => Some(outcome),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_entries_serialize_flat() {
        let found = serde_json::to_value(SeedEntry::identity_found("a@x.test", "id-1")).unwrap();
        assert_eq!(found, json!({"email": "a@x.test", "status": "already exists", "id": "id-1"}));

        let created = serde_json::to_value(SeedEntry::identity_created("a@x.test", "id-2")).unwrap();
        assert_eq!(created, json!({"email": "a@x.test", "status": "created", "id": "id-2"}));

        let failed =
            serde_json::to_value(SeedEntry::identity_failed("a@x.test", "nope".to_string())).unwrap();
        assert_eq!(failed, json!({"email": "a@x.test", "status": "error", "error": "nope"}));
    }

    #[test]
    fn test_store_entries_serialize() {
        let created =
            serde_json::to_value(SeedEntry::store("r1", "created with 5 menu items".to_string()))
                .unwrap();
        assert_eq!(created, json!({"restaurant": "r1", "status": "created with 5 menu items"}));

        let failed = serde_json::to_value(SeedEntry::store_failed("denied".to_string())).unwrap();
        assert_eq!(failed, json!({"restaurant": "error", "error": "denied"}));

        let partial =
            serde_json::to_value(SeedEntry::store_without_catalog("r1", "bad".to_string())).unwrap();
        assert_eq!(
            partial,
            json!({"restaurant": "r1", "status": "created without menu items", "error": "bad"})
        );
    }

    #[test]
    fn test_wallet_entries_serialize() {
        let topped = serde_json::to_value(SeedEntry::wallet_topped_up("₦10,000")).unwrap();
        assert_eq!(topped, json!({"wallet": "topped up to ₦10,000"}));

        let failed = serde_json::to_value(SeedEntry::wallet_failed("timeout".to_string())).unwrap();
        assert_eq!(failed, json!({"wallet": "error", "error": "timeout"}));
    }

    #[test]
    fn test_report_wraps_results() {
        let mut report = SeedReport::default();
        report.push(SeedEntry::identity_created("a@x.test", "id-1"));
        report.push(SeedEntry::store("r1", "already exists".to_string()));

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["results"].as_array().unwrap().len(), 2);
        assert_eq!(report.identity("A@X.test").unwrap().id.as_deref(), Some("id-1"));
        assert_eq!(report.store().unwrap().restaurant, "r1");
        assert!(report.wallet().is_none());
    }
}
