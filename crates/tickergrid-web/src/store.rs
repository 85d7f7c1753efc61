//! Storage collaborator seam.
//!
//! Persistence is external to this tier: handlers consume a [`MarketStore`]
//! that may fail with [`StorageError`], and nothing here assumes a schema.
//! The in-memory implementation backs the binary and the tests.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;

use thiserror::Error;
use tickergrid_core::{Exchange, Failure, PricePoint, PriceRange, Sector, Stock, Symbol};

/// Faults the data-access layer can surface. Lookup misses are `Ok(None)`,
/// not errors; these are infrastructure failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("stored record is corrupted: {0}")]
    Corrupted(String),
}

impl From<StorageError> for Failure {
    fn from(error: StorageError) -> Self {
        Failure::unknown(error.to_string())
    }
}

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Data-access contract consumed by the handlers.
///
/// Implementations must be `Send + Sync`; the router shares one instance
/// across requests.
pub trait MarketStore: Send + Sync {
    fn exchanges(&self) -> StoreFuture<'_, Vec<Exchange>>;

    fn sectors(&self) -> StoreFuture<'_, Vec<Sector>>;

    fn stock<'a>(&'a self, symbol: &'a Symbol) -> StoreFuture<'a, Option<Stock>>;

    fn search_stocks<'a>(&'a self, query: &'a str) -> StoreFuture<'a, Vec<Stock>>;

    fn prices<'a>(
        &'a self,
        symbol: &'a Symbol,
        range: &'a PriceRange,
    ) -> StoreFuture<'a, Vec<PricePoint>>;

    /// Insert or replace a stock. Returns the stored record and whether a
    /// record already existed for the symbol.
    fn upsert_stock(&self, stock: Stock) -> StoreFuture<'_, (Stock, bool)>;
}

#[derive(Debug, Default)]
struct StoreInner {
    exchanges: Vec<Exchange>,
    sectors: Vec<Sector>,
    stocks: BTreeMap<String, Stock>,
    prices: BTreeMap<String, Vec<PricePoint>>,
}

/// In-memory store used by the binary and the test suites.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with a small, deterministic market snapshot.
    pub fn with_sample_data() -> Self {
        use time::macros::datetime;

        let store = Self::new();
        {
            let mut inner = store.inner.write().expect("store lock is not poisoned");
            inner.exchanges = vec![
                Exchange {
                    code: String::from("XNAS"),
                    name: String::from("Nasdaq"),
                    timezone: String::from("America/New_York"),
                },
                Exchange {
                    code: String::from("XNYS"),
                    name: String::from("New York Stock Exchange"),
                    timezone: String::from("America/New_York"),
                },
            ];
            inner.sectors = vec![
                Sector {
                    id: String::from("tech"),
                    name: String::from("Information Technology"),
                },
                Sector {
                    id: String::from("fin"),
                    name: String::from("Financials"),
                },
            ];

            for (symbol, name, exchange, sector) in [
                ("AAPL", "Apple Inc.", "XNAS", "tech"),
                ("MSFT", "Microsoft Corporation", "XNAS", "tech"),
                ("JPM", "JPMorgan Chase & Co.", "XNYS", "fin"),
            ] {
                let symbol = Symbol::parse(symbol).expect("seed symbols are valid");
                inner.stocks.insert(
                    symbol.as_str().to_owned(),
                    Stock {
                        symbol: symbol.clone(),
                        name: String::from(name),
                        exchange_code: String::from(exchange),
                        sector_id: String::from(sector),
                    },
                );
                inner.prices.insert(
                    symbol.as_str().to_owned(),
                    vec![PricePoint {
                        symbol,
                        ts: datetime!(2026-01-02 21:00 UTC),
                        open: 100.0,
                        high: 102.5,
                        low: 99.1,
                        close: 101.8,
                        volume: Some(1_000_000),
                    }],
                );
            }
        }
        store
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoreInner> {
        self.inner.read().expect("store lock is not poisoned")
    }
}

impl MarketStore for InMemoryStore {
    fn exchanges(&self) -> StoreFuture<'_, Vec<Exchange>> {
        Box::pin(async move { Ok(self.read().exchanges.clone()) })
    }

    fn sectors(&self) -> StoreFuture<'_, Vec<Sector>> {
        Box::pin(async move { Ok(self.read().sectors.clone()) })
    }

    fn stock<'a>(&'a self, symbol: &'a Symbol) -> StoreFuture<'a, Option<Stock>> {
        Box::pin(async move { Ok(self.read().stocks.get(symbol.as_str()).cloned()) })
    }

    fn search_stocks<'a>(&'a self, query: &'a str) -> StoreFuture<'a, Vec<Stock>> {
        Box::pin(async move {
            let needle = query.to_ascii_uppercase();
            let inner = self.read();
            Ok(inner
                .stocks
                .values()
                .filter(|stock| {
                    stock.symbol.as_str().contains(&needle)
                        || stock.name.to_ascii_uppercase().contains(&needle)
                })
                .cloned()
                .collect())
        })
    }

    fn prices<'a>(
        &'a self,
        symbol: &'a Symbol,
        range: &'a PriceRange,
    ) -> StoreFuture<'a, Vec<PricePoint>> {
        Box::pin(async move {
            let inner = self.read();
            Ok(inner
                .prices
                .get(symbol.as_str())
                .map(|series| {
                    series
                        .iter()
                        .filter(|point| range.contains(point.ts))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default())
        })
    }

    fn upsert_stock(&self, stock: Stock) -> StoreFuture<'_, (Stock, bool)> {
        Box::pin(async move {
            let mut inner = self.inner.write().expect("store lock is not poisoned");
            let existed = inner
                .stocks
                .insert(stock.symbol.as_str().to_owned(), stock.clone())
                .is_some();
            Ok((stock, existed))
        })
    }
}
