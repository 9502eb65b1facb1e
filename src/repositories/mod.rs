use std::sync::Arc;

use crate::catalog::CatalogTables;

pub mod brand_repository;
pub mod category_repository;
pub mod product_repository;

pub use brand_repository::{BrandRepository, InMemoryBrandRepository};
pub use category_repository::{CategoryRepository, InMemoryCategoryRepository};
pub use product_repository::{InMemoryProductRepository, ProductRepository};

/// Access to the backing catalog tables shared by the in-memory repositories.
pub trait Repository {
    fn tables(&self) -> &CatalogTables;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    tables: Arc<CatalogTables>,
}

impl BaseRepository {
    pub fn new(tables: Arc<CatalogTables>) -> Self {
        Self { tables }
    }
}

impl Repository for BaseRepository {
    fn tables(&self) -> &CatalogTables {
        &self.tables
    }
}
