//! reqwest-backed [`GameApi`] implementation.
//!
//! Every call goes through [`HttpApi::fetch`], which retries transient
//! failures up to three times with a fixed pause. 4xx responses are never
//! retried; the one 4xx the API uses as a data signal (404 when a bulk
//! lookup matches nothing) is absorbed by [`HttpApi::get_bulk`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{GameApi, OrderSide, TransactionScope, MAX_IDS_PER_REQUEST};
use crate::error::{ApiError, Error, Result};
use crate::model::{
    Character, Delivery, InventorySlot, Item, ItemId, ItemStat, ItemStatId, Listings,
    MaterialSlot, PriceSummary, Recipe, RecipeId, Transaction, WalletEntry,
};

/// Official API root.
pub const DEFAULT_API_URL: &str = "https://api.guildwars2.com";

const RETRY_ATTEMPTS: u32 = 3;
const RETRY_PAUSE: Duration = Duration::from_secs(2);

#[derive(Deserialize)]
struct BuildResponse {
    id: u64,
}

/// HTTP client for the game API.
///
/// Unauthenticated endpoints work without a key; account and transaction
/// endpoints return [`ApiError::MissingApiKey`] when none is configured.
pub struct HttpApi {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl HttpApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn bearer(&self, endpoint: &'static str) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ApiError::MissingApiKey { endpoint }.into())
    }

    /// GET `url`, retrying transient failures. Client errors fail fast.
    async fn fetch(&self, url: &str, key: Option<&str>) -> Result<Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let mut request = self.http.get(url);
            if let Some(key) = key {
                request = request.bearer_auth(key);
            }

            let failure = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!(url = %url, status = %status, "GET");
                        return Ok(response);
                    }
                    ApiError::Status {
                        status,
                        url: url.to_owned(),
                    }
                }
                Err(err) => ApiError::Http(err),
            };

            if attempt >= RETRY_ATTEMPTS || failure.is_client_error() {
                return Err(failure.into());
            }
            warn!(
                attempt,
                max_attempts = RETRY_ATTEMPTS,
                error = %failure,
                "request failed, retrying"
            );
            sleep(RETRY_PAUSE).await;
        }
    }

    async fn get_json<T>(&self, path: &str, endpoint: Option<&'static str>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let key = match endpoint {
            Some(endpoint) => Some(self.bearer(endpoint)?),
            None => None,
        };
        let response = self.fetch(&self.url(path), key).await?;
        Ok(response.json::<T>().await.map_err(ApiError::Http)?)
    }

    /// Bulk id lookup. The API answers 404 when *none* of the requested
    /// ids exist; that means "no rows", not an error.
    async fn get_bulk<T>(&self, path: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        match self.get_json(path, None).await {
            Ok(rows) => Ok(rows),
            Err(Error::Api(err)) if err.is_not_found() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }
}

fn ids_query<T: ToString>(ids: &[T]) -> String {
    debug_assert!(ids.len() <= MAX_IDS_PER_REQUEST);
    let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
    ids.join(",")
}

#[async_trait]
impl GameApi for HttpApi {
    async fn build_id(&self) -> Result<u64> {
        let build: BuildResponse = self.get_json("/v2/build", None).await?;
        Ok(build.id)
    }

    async fn item_ids(&self) -> Result<Vec<ItemId>> {
        self.get_json("/v2/items", None).await
    }

    async fn items(&self, ids: &[ItemId]) -> Result<Vec<Item>> {
        self.get_bulk(&format!("/v2/items?ids={}", ids_query(ids)))
            .await
    }

    async fn recipe_ids(&self) -> Result<Vec<RecipeId>> {
        self.get_json("/v2/recipes", None).await
    }

    async fn recipes(&self, ids: &[RecipeId]) -> Result<Vec<Recipe>> {
        self.get_bulk(&format!("/v2/recipes?ids={}", ids_query(ids)))
            .await
    }

    async fn itemstat_ids(&self) -> Result<Vec<ItemStatId>> {
        self.get_json("/v2/itemstats", None).await
    }

    async fn itemstats(&self, ids: &[ItemStatId]) -> Result<Vec<ItemStat>> {
        self.get_bulk(&format!("/v2/itemstats?ids={}", ids_query(ids)))
            .await
    }

    async fn prices(&self, ids: &[ItemId]) -> Result<Vec<PriceSummary>> {
        self.get_bulk(&format!("/v2/commerce/prices?ids={}", ids_query(ids)))
            .await
    }

    async fn listings(&self, ids: &[ItemId]) -> Result<Vec<Listings>> {
        self.get_bulk(&format!("/v2/commerce/listings?ids={}", ids_query(ids)))
            .await
    }

    async fn transactions(
        &self,
        scope: TransactionScope,
        side: OrderSide,
        page: u32,
    ) -> Result<Vec<Transaction>> {
        let path = format!(
            "/v2/commerce/transactions/{scope}/{side}?page={page}&page_size={MAX_IDS_PER_REQUEST}"
        );
        self.get_json(&path, Some("commerce/transactions")).await
    }

    async fn delivery(&self) -> Result<Delivery> {
        self.get_json("/v2/commerce/delivery", Some("commerce/delivery"))
            .await
    }

    async fn bank(&self) -> Result<Vec<Option<InventorySlot>>> {
        self.get_json("/v2/account/bank", Some("account/bank")).await
    }

    async fn materials(&self) -> Result<Vec<MaterialSlot>> {
        self.get_json("/v2/account/materials", Some("account/materials"))
            .await
    }

    async fn wallet(&self) -> Result<Vec<WalletEntry>> {
        self.get_json("/v2/account/wallet", Some("account/wallet"))
            .await
    }

    async fn characters(&self) -> Result<Vec<Character>> {
        self.get_json("/v2/characters?ids=all", Some("characters"))
            .await
    }
}
