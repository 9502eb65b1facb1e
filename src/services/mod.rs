use std::sync::Arc;

use crate::catalog::CatalogTables;
use crate::repositories::{
    BrandRepository, CategoryRepository, InMemoryBrandRepository, InMemoryCategoryRepository,
    InMemoryProductRepository, ProductRepository,
};
use crate::stores::StoreLatency;

// Listings and detail lookups
pub mod catalog;

// Brand → category → product route resolution
pub mod navigation;

// Seed diagnostics and backfill
pub mod integrity;

pub use catalog::CatalogService;
pub use navigation::{CatalogRoute, NavigationService, NavigationView};

/// Service container shared by the HTTP handlers and the CLI.
#[derive(Clone)]
pub struct CatalogServices {
    pub catalog: Arc<CatalogService>,
    pub navigation: Arc<NavigationService>,
}

impl CatalogServices {
    pub fn new(
        brands: Arc<dyn BrandRepository>,
        categories: Arc<dyn CategoryRepository>,
        products: Arc<dyn ProductRepository>,
        latency: StoreLatency,
    ) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(
                brands.clone(),
                categories.clone(),
                products.clone(),
            )),
            navigation: Arc::new(NavigationService::new(brands, categories, products, latency)),
        }
    }

    /// Services backed by the in-memory repositories over `tables`.
    pub fn in_memory(tables: Arc<CatalogTables>, latency: StoreLatency) -> Self {
        Self::new(
            Arc::new(InMemoryBrandRepository::new(tables.clone())),
            Arc::new(InMemoryCategoryRepository::new(tables.clone())),
            Arc::new(InMemoryProductRepository::new(tables)),
            latency,
        )
    }
}
