//! Typed API client: cache probe, retry loop, cache maintenance.
//!
//! One [`MarketClient`] per session. Every logical request runs the same
//! loop: consult the cache (per [`CacheMode`]), then attempt the network
//! call under the retry policy, suspending on backoff delays, and finally
//! write or invalidate cache entries. Cancellation is cooperative through
//! [`RequestToken`]: a cancelled request fires no pending retry and never
//! writes the cache.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use tickergrid_core::{Exchange, PriceRange, PricePoint, ResourceClass, Sector, Stock, Symbol};

use crate::cache::{CacheConfig, CacheCoordinator, CacheHit, CacheKey, CacheMode};
use crate::error::ApiClientError;
use crate::outcome::RequestOutcome;
use crate::retry::{RequestKind, RetryPolicy};
use crate::token::RequestToken;
use crate::transport::{HttpClient, HttpMethod, HttpRequest, ReqwestHttpClient};

const API_KEY_HEADER: &str = "x-api-key";

/// Mutation payload mirroring the server's wire shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    pub name: String,
    pub exchange_code: String,
    pub sector_id: String,
}

/// Builder for a [`MarketClient`].
#[derive(Default)]
pub struct MarketClientBuilder {
    base_url: String,
    retry: Option<RetryPolicy>,
    cache_config: Option<CacheConfig>,
    http: Option<Arc<dyn HttpClient>>,
    api_key: Option<String>,
}

impl MarketClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = Some(config);
        self
    }

    pub fn with_transport(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn build(self) -> MarketClient {
        MarketClient {
            base_url: self.base_url.trim_end_matches('/').to_owned(),
            retry: self.retry.unwrap_or_default(),
            cache: CacheCoordinator::new(self.cache_config.unwrap_or_default()),
            http: self
                .http
                .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new())),
            api_key: self.api_key,
        }
    }
}

/// Caching, retrying client for the tickergrid API.
#[derive(Clone)]
pub struct MarketClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    cache: CacheCoordinator,
    retry: RetryPolicy,
    api_key: Option<String>,
}

impl MarketClient {
    pub fn builder(base_url: impl Into<String>) -> MarketClientBuilder {
        MarketClientBuilder::new(base_url)
    }

    pub fn cache(&self) -> &CacheCoordinator {
        &self.cache
    }

    // ---- typed surface -------------------------------------------------

    pub async fn get_exchanges(
        &self,
        mode: CacheMode,
        token: &RequestToken,
    ) -> Result<Vec<Exchange>, ApiClientError> {
        let key = CacheKey::class(ResourceClass::Exchange);
        let body = self.fetch_cached("/exchanges", key, mode, token).await?;
        decode(&body)
    }

    pub async fn get_sectors(
        &self,
        mode: CacheMode,
        token: &RequestToken,
    ) -> Result<Vec<Sector>, ApiClientError> {
        let key = CacheKey::class(ResourceClass::Sector);
        let body = self.fetch_cached("/sectors", key, mode, token).await?;
        decode(&body)
    }

    pub async fn get_stock(
        &self,
        symbol: &Symbol,
        mode: CacheMode,
        token: &RequestToken,
    ) -> Result<Stock, ApiClientError> {
        let path = format!("/stocks/{}", symbol.as_str());
        let key = CacheKey::resource(ResourceClass::Stock, symbol.as_str());
        let body = self.fetch_cached(&path, key, mode, token).await?;
        decode(&body)
    }

    pub async fn search_stocks(
        &self,
        query: &str,
        limit: u32,
        mode: CacheMode,
        token: &RequestToken,
    ) -> Result<Vec<Stock>, ApiClientError> {
        let limit = limit.to_string();
        let path = format!(
            "/stocks/search?q={}&limit={}",
            urlencoding::encode(query),
            limit
        );
        let key = CacheKey::class(ResourceClass::Stock)
            .with_query(&[("q", query), ("limit", limit.as_str())]);
        let body = self.fetch_cached(&path, key, mode, token).await?;
        decode(&body)
    }

    pub async fn get_prices(
        &self,
        symbol: &Symbol,
        range: &PriceRange,
        mode: CacheMode,
        token: &RequestToken,
    ) -> Result<Vec<PricePoint>, ApiClientError> {
        let from = range
            .from
            .format(&Rfc3339)
            .map_err(|e| ApiClientError::decode(format!("failed to format range start: {e}")))?;
        let to = range
            .to
            .format(&Rfc3339)
            .map_err(|e| ApiClientError::decode(format!("failed to format range end: {e}")))?;

        let path = format!(
            "/stocks/{}/prices?from={}&to={}",
            symbol.as_str(),
            urlencoding::encode(&from),
            urlencoding::encode(&to)
        );
        let key = CacheKey::resource(ResourceClass::StockPrice, symbol.as_str())
            .with_query(&[("from", from.as_str()), ("to", to.as_str())]);
        let body = self.fetch_cached(&path, key, mode, token).await?;
        decode(&body)
    }

    /// Update a listing. On success the stock's cached entries, the stock
    /// list entries, and the linked price entries are invalidated.
    pub async fn update_stock(
        &self,
        symbol: &Symbol,
        update: &StockUpdate,
        token: &RequestToken,
    ) -> Result<Stock, ApiClientError> {
        self.mutate_stock(HttpMethod::Put, symbol, update, token).await
    }

    /// Create a listing; conflicts surface as `ErrorCategory::Conflict`.
    pub async fn create_stock(
        &self,
        symbol: &Symbol,
        update: &StockUpdate,
        token: &RequestToken,
    ) -> Result<Stock, ApiClientError> {
        self.mutate_stock(HttpMethod::Post, symbol, update, token).await
    }

    // ---- explicit cache control ---------------------------------------

    pub async fn invalidate_resource(&self, class: ResourceClass, id: &str) {
        self.cache.invalidate_resource(class, id).await;
    }

    pub async fn invalidate_resource_class(&self, class: ResourceClass) {
        self.cache.invalidate_class(class).await;
    }

    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all().await;
    }

    // ---- request loop --------------------------------------------------

    async fn mutate_stock(
        &self,
        method: HttpMethod,
        symbol: &Symbol,
        update: &StockUpdate,
        token: &RequestToken,
    ) -> Result<Stock, ApiClientError> {
        let path = format!("/stocks/{}", symbol.as_str());
        let body = serde_json::to_string(update)
            .map_err(|e| ApiClientError::decode(format!("failed to encode payload: {e}")))?;

        let outcome = self
            .request_raw(method, &path, Some(body), RequestKind::Mutation, token)
            .await;
        let body = outcome.into_result()?;

        self.cache
            .invalidate_resource(ResourceClass::Stock, symbol.as_str())
            .await;
        decode(&body)
    }

    async fn fetch_cached(
        &self,
        path: &str,
        key: CacheKey,
        mode: CacheMode,
        token: &RequestToken,
    ) -> Result<String, ApiClientError> {
        if mode == CacheMode::Use {
            match self.cache.get(&key).await {
                Some(CacheHit::Fresh(body)) => return Ok(body),
                Some(CacheHit::Stale(body)) => {
                    // Stale-while-revalidate: serve immediately, refresh in
                    // the background under its own token.
                    self.spawn_revalidation(path.to_owned(), key);
                    return Ok(body);
                }
                None => {}
            }
        }

        let outcome = self
            .request_raw(HttpMethod::Get, path, None, RequestKind::Query, token)
            .await;
        let body = outcome.into_result()?;

        // A fetch that completed after its caller cancelled is discarded
        // outright; the guarded write below would refuse it anyway.
        if token.is_cancelled() {
            return Err(ApiClientError::cancelled());
        }

        if mode != CacheMode::Bypass {
            self.cache.set_guarded(key, body.clone(), token).await;
        }
        Ok(body)
    }

    fn spawn_revalidation(&self, path: String, key: CacheKey) {
        let client = self.clone();
        tokio::spawn(async move {
            let token = RequestToken::new();
            let outcome = client
                .request_raw(HttpMethod::Get, &path, None, RequestKind::Query, &token)
                .await;
            match outcome {
                RequestOutcome::Success(body) => {
                    client.cache.set_guarded(key, body, &token).await;
                }
                RequestOutcome::RetryableFailure { error, .. }
                | RequestOutcome::TerminalFailure(error) => {
                    log::debug!("background revalidation of {path} failed: {error}");
                }
            }
        });
    }

    async fn request_raw(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        kind: RequestKind,
        token: &RequestToken,
    ) -> RequestOutcome<String> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt: u32 = 0;

        loop {
            if token.is_cancelled() {
                return RequestOutcome::TerminalFailure(ApiClientError::cancelled());
            }

            let mut request = HttpRequest::new(method, url.clone());
            if let Some(key) = &self.api_key {
                request = request.with_header(API_KEY_HEADER, key.clone());
            }
            if let Some(body) = &body {
                request = request.with_json_body(body.clone());
            }

            let error = match self.http.execute(request).await {
                Ok(response) if response.is_success() => {
                    return RequestOutcome::Success(response.body);
                }
                Ok(response) => error_from_response(response),
                Err(transport) => ApiClientError::transport(transport.message()),
            };

            if !self.retry.should_retry(&error, kind, attempt) {
                return RequestOutcome::TerminalFailure(error);
            }

            log::warn!("attempt {attempt} for {url} failed ({error}), backing off");
            tokio::time::sleep(self.retry.delay_for(attempt)).await;
            // A cancellation during backoff must suppress the pending retry.
            if token.is_cancelled() {
                return RequestOutcome::TerminalFailure(ApiClientError::cancelled());
            }
            attempt += 1;
        }
    }
}

fn error_from_response(response: crate::transport::HttpResponse) -> ApiClientError {
    match serde_json::from_str(&response.body) {
        Ok(problem) => ApiClientError::from_problem(problem),
        Err(_) => ApiClientError::from_status(
            response.status,
            format!("request failed with status {}", response.status),
        ),
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiClientError> {
    serde_json::from_str(body)
        .map_err(|e| ApiClientError::decode(format!("failed to decode response: {e}")))
}
