//! Stock and price-series handlers.
//!
//! These routes exercise the whole failure pipeline: guard composition for
//! parameter checks, response helpers for expected misses and conflicts,
//! and plain `?` propagation for anything the interceptor should classify.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tickergrid_core::{
    Failure, FieldViolation, PricePoint, PriceRange, ResourceClass, Stock, Symbol,
};

use crate::error::{ApiError, ApiResult, RouteError};
use crate::guards::{first_of, require_date_range, require_in_range, require_string};
use crate::trace::RequestContext;
use crate::AppState;

const API_KEY_HEADER: &str = "x-api-key";
const MAX_SEARCH_LIMIT: i64 = 100;

fn parse_symbol(ctx: &RequestContext, raw: &str) -> Result<Symbol, RouteError> {
    Symbol::parse(raw)
        .map_err(|err| ApiError::invalid_parameter(ctx, "symbol", err.to_string()).into())
}

fn parse_timestamp(
    ctx: &RequestContext,
    name: &str,
    raw: &str,
) -> Result<OffsetDateTime, RouteError> {
    OffsetDateTime::parse(raw, &Rfc3339).map_err(|_| {
        ApiError::invalid_parameter(ctx, name, "expected an RFC 3339 timestamp").into()
    })
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
    limit: Option<i64>,
}

async fn search_stocks(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Stock>>> {
    let limit = query.limit.unwrap_or(25);
    if let Some(violation) = first_of([
        require_string(&ctx, "q", query.q.as_deref()),
        require_in_range(&ctx, "limit", limit, 1, MAX_SEARCH_LIMIT),
    ]) {
        return Err(violation.into());
    }

    let q = query.q.unwrap_or_default();
    let mut stocks = state.store.search_stocks(q.trim()).await?;
    stocks.truncate(limit as usize);
    Ok(Json(stocks))
}

async fn get_stock(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(symbol): Path<String>,
) -> ApiResult<Json<Stock>> {
    let symbol = parse_symbol(&ctx, &symbol)?;

    match state.store.stock(&symbol).await? {
        Some(stock) => Ok(Json(stock)),
        None => {
            Err(ApiError::resource_not_found(&ctx, ResourceClass::Stock, symbol.as_str()).into())
        }
    }
}

#[derive(Debug, Deserialize)]
struct PriceQuery {
    from: Option<String>,
    to: Option<String>,
}

async fn get_prices(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(symbol): Path<String>,
    Query(query): Query<PriceQuery>,
) -> ApiResult<Json<Vec<PricePoint>>> {
    let symbol = parse_symbol(&ctx, &symbol)?;

    if let Some(violation) = first_of([
        require_string(&ctx, "from", query.from.as_deref()),
        require_string(&ctx, "to", query.to.as_deref()),
    ]) {
        return Err(violation.into());
    }

    let from = parse_timestamp(&ctx, "from", query.from.as_deref().unwrap_or_default())?;
    let to = parse_timestamp(&ctx, "to", query.to.as_deref().unwrap_or_default())?;
    if let Some(violation) = require_date_range(&ctx, from, to) {
        return Err(violation.into());
    }
    let range = PriceRange::new(from, to)
        .map_err(|err| ApiError::invalid_parameter(&ctx, "from", err.to_string()))?;

    if state.store.stock(&symbol).await?.is_none() {
        return Err(
            ApiError::resource_not_found(&ctx, ResourceClass::Stock, symbol.as_str()).into(),
        );
    }

    // The series query carries the request time budget; a stalled store
    // surfaces as a Timeout failure, classified to 408 at the boundary.
    let budget = state.config.request_budget;
    let prices = tokio::time::timeout(budget, state.store.prices(&symbol, &range))
        .await
        .map_err(|_| {
            Failure::timeout(format!(
                "price query for '{}' exceeded {}ms budget",
                symbol.as_str(),
                budget.as_millis()
            ))
        })??;

    Ok(Json(prices))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StockPayload {
    name: String,
    exchange_code: String,
    sector_id: String,
}

impl StockPayload {
    fn violations(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        for (field, value) in [
            ("name", &self.name),
            ("exchangeCode", &self.exchange_code),
            ("sectorId", &self.sector_id),
        ] {
            if value.trim().is_empty() {
                if let Ok(violation) = FieldViolation::new(field, "must not be blank") {
                    violations.push(violation);
                }
            }
        }
        violations
    }
}

fn authorize(ctx: &RequestContext, state: &AppState, headers: &HeaderMap) -> Option<ApiError> {
    let expected = state.config.api_key.as_deref()?;

    match headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        None => Some(ApiError::unauthorized(
            ctx,
            "mutating requests require an API key",
        )),
        Some(presented) if presented != expected => Some(ApiError::forbidden(
            ctx,
            "the presented API key is not allowed to modify stocks",
        )),
        Some(_) => None,
    }
}

async fn create_stock(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    headers: HeaderMap,
    Path(symbol): Path<String>,
    Json(payload): Json<StockPayload>,
) -> ApiResult<Json<Stock>> {
    if let Some(denied) = authorize(&ctx, &state, &headers) {
        return Err(denied.into());
    }

    let symbol = parse_symbol(&ctx, &symbol)?;
    let violations = payload.violations();
    if !violations.is_empty() {
        return Err(ApiError::validation(&ctx, violations).into());
    }

    if state.store.stock(&symbol).await?.is_some() {
        return Err(
            ApiError::resource_conflict(&ctx, ResourceClass::Stock, symbol.as_str()).into(),
        );
    }

    let stock = Stock {
        symbol,
        name: payload.name,
        exchange_code: payload.exchange_code,
        sector_id: payload.sector_id,
    };
    let (stored, _) = state.store.upsert_stock(stock).await?;
    Ok(Json(stored))
}

async fn update_stock(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    headers: HeaderMap,
    Path(symbol): Path<String>,
    Json(payload): Json<StockPayload>,
) -> ApiResult<Json<Stock>> {
    if let Some(denied) = authorize(&ctx, &state, &headers) {
        return Err(denied.into());
    }

    let symbol = parse_symbol(&ctx, &symbol)?;
    let violations = payload.violations();
    if !violations.is_empty() {
        return Err(ApiError::validation(&ctx, violations).into());
    }

    let current = match state.store.stock(&symbol).await? {
        Some(stock) => stock,
        None => {
            return Err(
                ApiError::resource_not_found(&ctx, ResourceClass::Stock, symbol.as_str()).into(),
            )
        }
    };

    // A listing stays on its venue; relisting is a separate workflow.
    if current.exchange_code != payload.exchange_code {
        return Err(ApiError::business_rule(
            &ctx,
            format!(
                "stock '{}' cannot move from exchange '{}' to '{}'",
                symbol.as_str(),
                current.exchange_code,
                payload.exchange_code
            ),
        )
        .into());
    }

    let stock = Stock {
        symbol,
        name: payload.name,
        exchange_code: payload.exchange_code,
        sector_id: payload.sector_id,
    };
    let (stored, _) = state.store.upsert_stock(stock).await?;
    Ok(Json(stored))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stocks/search", get(search_stocks))
        .route(
            "/stocks/{symbol}",
            get(get_stock).post(create_stock).put(update_stock),
        )
        .route("/stocks/{symbol}/prices", get(get_prices))
}
