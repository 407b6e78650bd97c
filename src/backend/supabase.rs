//! Supabase implementation: GoTrue admin API for identities, PostgREST for tables

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use super::{Backend, BackendError, BackendResult};
use crate::config::Settings;
use crate::domain::{BalanceRecord, Identity, NewCatalogItem, NewIdentity, NewStore, StoreRef};

const USERS_PER_PAGE: usize = 200;
const MAX_USER_PAGES: usize = 500;

const STORES_TABLE: &str = "rest/v1/restaurants";
const CATALOG_TABLE: &str = "rest/v1/menu_items";
const WALLETS_TABLE: &str = "rest/v1/wallets";
const ADMIN_USERS: &str = "auth/v1/admin/users";

#[derive(Deserialize)]
struct UserPage {
    #[serde(default)]
    users: Vec<Identity>,
}

/// Client for a Supabase project, authenticated with the service-role key
#[derive(Debug, Clone)]
pub struct SupabaseBackend {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseBackend {
    pub fn new(settings: &Settings) -> BackendResult<Self> {
        let client = Client::builder().timeout(settings.request_timeout).build()?;

        Ok(Self {
            client,
            base_url: settings.backend_url.as_str().trim_end_matches('/').to_string(),
            service_key: settings.service_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.endpoint(path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Fail on non-2xx, carrying the backend's own error message
    async fn check_status(response: Response) -> BackendResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await?;
        Err(BackendError::Api {
            status: status.as_u16(),
            message: error_message(status.as_u16(), status.canonical_reason(), &body),
        })
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

/// PostgREST equality filter with the value percent-encoded
fn eq_filter(value: &str) -> String {
    format!("eq.{}", urlencoding::encode(value))
}

/// GoTrue reports `msg` or `error_description`, PostgREST reports `message`
fn error_message(status: u16, reason: Option<&str>, body: &str) -> String {
    if let Ok(serde_json::Value::Object(fields)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(serde_json::Value::String(message)) = fields.get(key) {
                if !message.is_empty() {
                    return message.clone();
                }
            }
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    match reason {
        Some(reason) => format!("{} {}", status, reason),
        None => format!("HTTP {}", status),
    }
}

#[async_trait]
impl Backend for SupabaseBackend {
    async fn list_identities(&self) -> BackendResult<Vec<Identity>> {
        let mut identities = Vec::new();

        for page in 1..=MAX_USER_PAGES {
            let path = format!("{}?page={}&per_page={}", ADMIN_USERS, page, USERS_PER_PAGE);
            let response = self.request(Method::GET, &path).send().await?;
            let batch: UserPage = Self::handle_response(response).await?;

            let fetched = batch.users.len();
            identities.extend(batch.users);
            debug!(page, fetched, "Listed identity page");

            if fetched < USERS_PER_PAGE {
                return Ok(identities);
            }
        }

        Err(BackendError::InvalidResponse(format!(
            "Identity directory returned more than {} pages",
            MAX_USER_PAGES
        )))
    }

    async fn create_identity(&self, identity: &NewIdentity) -> BackendResult<Identity> {
        let response = self
            .request(Method::POST, ADMIN_USERS)
            .json(identity)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn find_store_by_owner(&self, owner_id: &str) -> BackendResult<Option<StoreRef>> {
        let path = format!("{}?select=id&owner_id={}&limit=1", STORES_TABLE, eq_filter(owner_id));
        let response = self.request(Method::GET, &path).send().await?;
        let rows: Vec<StoreRef> = Self::handle_response(response).await?;
        Ok(rows.into_iter().next())
    }

    async fn create_store(&self, store: &NewStore) -> BackendResult<StoreRef> {
        let path = format!("{}?select=id", STORES_TABLE);
        let response = self
            .request(Method::POST, &path)
            .header("Prefer", "return=representation")
            .json(store)
            .send()
            .await?;
        let rows: Vec<StoreRef> = Self::handle_response(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::InvalidResponse("Store insert returned no row".to_string()))
    }

    async fn create_catalog_items(&self, items: &[NewCatalogItem]) -> BackendResult<()> {
        let response = self
            .request(Method::POST, CATALOG_TABLE)
            .header("Prefer", "return=minimal")
            .json(items)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn find_balance(&self, user_id: &str) -> BackendResult<Option<BalanceRecord>> {
        let path = format!("{}?select=id,balance&user_id={}", WALLETS_TABLE, eq_filter(user_id));
        let response = self.request(Method::GET, &path).send().await?;
        let mut rows: Vec<BalanceRecord> = Self::handle_response(response).await?;

        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            n => Err(BackendError::InvalidResponse(format!(
                "Expected at most one wallet for user {}, found {}",
                user_id, n
            ))),
        }
    }

    async fn update_balance(&self, balance_id: &str, balance: i64) -> BackendResult<()> {
        let path = format!("{}?id={}", WALLETS_TABLE, eq_filter(balance_id));
        let response = self
            .request(Method::PATCH, &path)
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "balance": balance }))
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
