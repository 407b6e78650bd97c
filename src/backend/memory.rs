//! In-process backend with failure injection, for tests and dry runs

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{Backend, BackendError, BackendResult};
use crate::domain::{BalanceRecord, Identity, NewCatalogItem, NewIdentity, NewStore, StoreRef};

/// Backend calls that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListIdentities,
    CreateIdentity,
    FindStore,
    CreateStore,
    CreateCatalogItems,
    FindBalance,
    UpdateBalance,
}

#[derive(Debug, Clone)]
struct StoredStore {
    id: String,
    store: NewStore,
}

#[derive(Debug, Clone)]
struct StoredBalance {
    id: String,
    user_id: String,
    balance: f64,
}

#[derive(Default)]
struct State {
    identities: Vec<Identity>,
    stores: Vec<StoredStore>,
    catalog: Vec<NewCatalogItem>,
    balances: Vec<StoredBalance>,
    failures: HashMap<Operation, String>,
    identity_failures: HashMap<String, String>,
    signup_balance: Option<f64>,
    calls: usize,
}

impl State {
    fn call(&mut self, op: Operation) -> BackendResult<()> {
        self.calls += 1;
        match self.failures.get(&op) {
            Some(message) => Err(BackendError::Api {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give every newly created identity a balance record, like a signup trigger would
    pub fn with_signup_balance(self, balance: f64) -> Self {
        self.state().signup_balance = Some(balance);
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every call of `op` fail with `message`
    pub fn fail(&self, op: Operation, message: &str) {
        self.state().failures.insert(op, message.to_string());
    }

    /// Make creation of one specific identity fail
    pub fn fail_identity(&self, email: &str, message: &str) {
        self.state()
            .identity_failures
            .insert(email.to_lowercase(), message.to_string());
    }

    /// Clear all injected failures
    pub fn heal(&self) {
        let mut state = self.state();
        state.failures.clear();
        state.identity_failures.clear();
    }

    /// Add an identity directly, bypassing call counting; returns its id
    pub fn insert_identity(&self, email: &str) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.state().identities.push(Identity {
            id: id.clone(),
            email: Some(email.to_lowercase()),
        });
        id
    }

    /// Add a store directly; returns its id
    pub fn insert_store(&self, store: NewStore) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.state().stores.push(StoredStore {
            id: id.clone(),
            store,
        });
        id
    }

    /// Create or overwrite the balance record of a user
    pub fn set_balance(&self, user_id: &str, balance: f64) {
        let mut state = self.state();
        if let Some(existing) = state.balances.iter_mut().find(|b| b.user_id == user_id) {
            existing.balance = balance;
            return;
        }
        state.balances.push(StoredBalance {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            balance,
        });
    }

    pub fn identities(&self) -> Vec<Identity> {
        self.state().identities.clone()
    }

    pub fn identity_id(&self, email: &str) -> Option<String> {
        self.state()
            .identities
            .iter()
            .find(|i| i.has_email(email))
            .map(|i| i.id.clone())
    }

    pub fn store_count(&self) -> usize {
        self.state().stores.len()
    }

    pub fn stores_owned_by(&self, owner_id: &str) -> Vec<String> {
        self.state()
            .stores
            .iter()
            .filter(|s| s.store.owner_id == owner_id)
            .map(|s| s.id.clone())
            .collect()
    }

    pub fn store(&self, store_id: &str) -> Option<NewStore> {
        self.state()
            .stores
            .iter()
            .find(|s| s.id == store_id)
            .map(|s| s.store.clone())
    }

    pub fn catalog_items(&self, store_id: &str) -> Vec<NewCatalogItem> {
        self.state()
            .catalog
            .iter()
            .filter(|i| i.restaurant_id == store_id)
            .cloned()
            .collect()
    }

    pub fn catalog_count(&self) -> usize {
        self.state().catalog.len()
    }

    pub fn balance_of(&self, user_id: &str) -> Option<f64> {
        self.state()
            .balances
            .iter()
            .find(|b| b.user_id == user_id)
            .map(|b| b.balance)
    }

    /// Number of backend calls made through the `Backend` trait
    pub fn call_count(&self) -> usize {
        self.state().calls
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn list_identities(&self) -> BackendResult<Vec<Identity>> {
        let mut state = self.state();
        state.call(Operation::ListIdentities)?;
        Ok(state.identities.clone())
    }

    async fn create_identity(&self, identity: &NewIdentity) -> BackendResult<Identity> {
        let mut state = self.state();
        state.call(Operation::CreateIdentity)?;

        let email = identity.email.to_lowercase();
        if let Some(message) = state.identity_failures.get(&email) {
            return Err(BackendError::Api {
                status: 400,
                message: message.clone(),
            });
        }
        if state.identities.iter().any(|i| i.has_email(&email)) {
            return Err(BackendError::Api {
                status: 422,
                message: "A user with this email address has already been registered".to_string(),
            });
        }

        let created = Identity {
            id: uuid::Uuid::new_v4().to_string(),
            email: Some(email),
        };
        state.identities.push(created.clone());

        if let Some(balance) = state.signup_balance {
            state.balances.push(StoredBalance {
                id: uuid::Uuid::new_v4().to_string(),
                user_id: created.id.clone(),
                balance,
            });
        }

        Ok(created)
    }

    async fn find_store_by_owner(&self, owner_id: &str) -> BackendResult<Option<StoreRef>> {
        let mut state = self.state();
        state.call(Operation::FindStore)?;
        Ok(state
            .stores
            .iter()
            .find(|s| s.store.owner_id == owner_id)
            .map(|s| StoreRef { id: s.id.clone() }))
    }

    async fn create_store(&self, store: &NewStore) -> BackendResult<StoreRef> {
        let mut state = self.state();
        state.call(Operation::CreateStore)?;

        let id = uuid::Uuid::new_v4().to_string();
        state.stores.push(StoredStore {
            id: id.clone(),
            store: store.clone(),
        });
        Ok(StoreRef { id })
    }

    async fn create_catalog_items(&self, items: &[NewCatalogItem]) -> BackendResult<()> {
        let mut state = self.state();
        state.call(Operation::CreateCatalogItems)?;

        if let Some(orphan) = items
            .iter()
            .find(|item| !state.stores.iter().any(|s| s.id == item.restaurant_id))
        {
            return Err(BackendError::Api {
                status: 409,
                message: format!("Store {} does not exist", orphan.restaurant_id),
            });
        }

        state.catalog.extend_from_slice(items);
        Ok(())
    }

    async fn find_balance(&self, user_id: &str) -> BackendResult<Option<BalanceRecord>> {
        let mut state = self.state();
        state.call(Operation::FindBalance)?;
        Ok(state
            .balances
            .iter()
            .find(|b| b.user_id == user_id)
            .map(|b| BalanceRecord {
                id: b.id.clone(),
                balance: b.balance,
            }))
    }

    async fn update_balance(&self, balance_id: &str, balance: i64) -> BackendResult<()> {
        let mut state = self.state();
        state.call(Operation::UpdateBalance)?;

        match state.balances.iter_mut().find(|b| b.id == balance_id) {
            Some(record) => {
                record.balance = balance as f64;
                Ok(())
            }
            None => Err(BackendError::Api {
                status: 404,
                message: format!("Balance record {} not found", balance_id),
            }),
        }
    }
}
