//! Observable catalog state with asynchronous fetch actions.
//!
//! Each store owns one slice of state (items, selection, `loading`,
//! `error`) and is the only writer of it. Actions set `loading`, wait out
//! the configured latency, query the repository and publish the result.
//! Overlapping actions are not serialised: whichever finishes last wins.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::CatalogTables;
use crate::repositories::{
    BrandRepository, CategoryRepository, InMemoryBrandRepository, InMemoryCategoryRepository,
    InMemoryProductRepository, ProductRepository,
};

pub mod brand_store;
pub mod category_store;
pub mod product_store;

pub use brand_store::{BrandState, BrandStore};
pub use category_store::{CategoryState, CategoryStore};
pub use product_store::{ProductState, ProductStore};

const DEFAULT_LIST_LATENCY: Duration = Duration::from_millis(500);
const DEFAULT_DETAIL_LATENCY: Duration = Duration::from_millis(300);

/// Simulated round-trip time applied before every fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLatency {
    /// Applied to list fetches.
    pub list: Duration,
    /// Applied to single-record fetches.
    pub detail: Duration,
}

impl Default for StoreLatency {
    fn default() -> Self {
        Self {
            list: DEFAULT_LIST_LATENCY,
            detail: DEFAULT_DETAIL_LATENCY,
        }
    }
}

impl StoreLatency {
    pub const fn none() -> Self {
        Self {
            list: Duration::ZERO,
            detail: Duration::ZERO,
        }
    }

    pub(crate) async fn list_round_trip(&self) {
        pause(self.list).await;
    }

    pub(crate) async fn detail_round_trip(&self) {
        pause(self.detail).await;
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// The three stores of one browsing session, passed explicitly to whatever
/// needs them.
#[derive(Clone)]
pub struct CatalogSession {
    pub brands: BrandStore,
    pub categories: CategoryStore,
    pub products: ProductStore,
}

impl CatalogSession {
    pub fn new(
        brand_repository: Arc<dyn BrandRepository>,
        category_repository: Arc<dyn CategoryRepository>,
        product_repository: Arc<dyn ProductRepository>,
        latency: StoreLatency,
    ) -> Self {
        Self {
            brands: BrandStore::new(brand_repository.clone(), latency),
            categories: CategoryStore::new(category_repository, latency),
            products: ProductStore::new(product_repository, brand_repository, latency),
        }
    }

    /// Session over the in-memory repositories for `tables`.
    pub fn in_memory(tables: Arc<CatalogTables>, latency: StoreLatency) -> Self {
        Self::new(
            Arc::new(InMemoryBrandRepository::new(tables.clone())),
            Arc::new(InMemoryCategoryRepository::new(tables.clone())),
            Arc::new(InMemoryProductRepository::new(tables)),
            latency,
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn tables() -> Arc<CatalogTables> {
        Arc::new(CatalogTables::embedded().unwrap())
    }

    pub fn session() -> CatalogSession {
        CatalogSession::in_memory(tables(), StoreLatency::none())
    }
}
