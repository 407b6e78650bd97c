use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::domain::{IdentityMetadata, NewCatalogItem, NewIdentity, NewStore, Role};

const DEFAULT_FIXTURES: &str = include_str!("../../fixtures.yml");

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IdentityFixture {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

impl IdentityFixture {
    pub fn to_new_identity(&self) -> NewIdentity {
        NewIdentity {
            email: self.email.clone(),
            password: self.password.clone(),
            email_confirm: true,
            user_metadata: IdentityMetadata {
                full_name: self.full_name.clone(),
                role: self.role,
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoreFixture {
    pub name: String,
    pub cuisine: String,
    pub delivery_time: String,
    pub is_open: bool,
    pub image: String,
    pub rating: f64,
    pub tag: String,
    pub price_range: String,
}

impl StoreFixture {
    pub fn for_owner(&self, owner_id: &str) -> NewStore {
        NewStore {
            owner_id: owner_id.to_string(),
            name: self.name.clone(),
            cuisine: self.cuisine.clone(),
            delivery_time: self.delivery_time.clone(),
            is_open: self.is_open,
            image: self.image.clone(),
            rating: self.rating,
            tag: self.tag.clone(),
            price_range: self.price_range.clone(),
        }
    }
}

fn default_available() -> bool {
    true
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CatalogFixture {
    pub name: String,
    pub price: i64,
    pub description: String,
    pub image: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

impl CatalogFixture {
    pub fn for_store(&self, store_id: &str) -> NewCatalogItem {
        NewCatalogItem {
            restaurant_id: store_id.to_string(),
            name: self.name.clone(),
            price: self.price,
            description: self.description.clone(),
            image: self.image.clone(),
            available: self.available,
        }
    }
}

/// Balance floor applied to the student account
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WalletFixture {
    /// Top-up only happens when the current balance is strictly below this
    pub trigger_below: i64,
    pub floor: i64,
    #[serde(default)]
    pub currency_symbol: String,
}

/// The full, immutable set of fixture data a seeding run works from
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FixtureSet {
    pub identities: Vec<IdentityFixture>,
    pub store: StoreFixture,
    pub catalog: Vec<CatalogFixture>,
    pub wallet: WalletFixture,
}

impl FixtureSet {
    /// Fixtures bundled into the binary
    pub fn bundled() -> Result<Self> {
        Self::from_yaml(DEFAULT_FIXTURES).context("Bundled fixtures are invalid")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let yml = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read fixtures file {}", path.display()))?;
        Self::from_yaml(&yml).with_context(|| format!("Invalid fixtures file {}", path.display()))
    }

    /// Load from an explicit file, falling back to the bundled set
    pub fn load(maybe_path: Option<&Path>) -> Result<Self> {
        match maybe_path {
            Some(path) => Self::from_path(path),
            None => Self::bundled(),
        }
    }

    pub fn from_yaml(yml: &str) -> Result<Self> {
        let fixtures: FixtureSet = serde_yaml::from_str(yml).context("Invalid yaml fixtures")?;
        fixtures.validate()?;
        Ok(fixtures)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for identity in &self.identities {
            let email = identity.email.trim().to_lowercase();
            if email.is_empty() {
                bail!("Fixture identity '{}' has an empty email", identity.full_name);
            }
            if !seen.insert(email) {
                bail!("Duplicate fixture email: {}", identity.email);
            }
        }

        if self.catalog.is_empty() {
            bail!("Fixture catalog must contain at least one item");
        }

        if self.wallet.floor < self.wallet.trigger_below {
            bail!(
                "Wallet floor {} is below its trigger threshold {}",
                self.wallet.floor,
                self.wallet.trigger_below
            );
        }

        Ok(())
    }

    /// The account whose balance gets topped up
    pub fn student(&self) -> Option<&IdentityFixture> {
        self.identities.iter().find(|i| i.role == Role::Student)
    }
}
