use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::CatalogTables;
use crate::errors::ServiceError;
use crate::models::Brand;
use crate::queries::{get_by_id, get_by_slug, search};

use super::{BaseRepository, Repository};

/// Read access to brands. A miss is `Ok(None)`; errors are reserved for a
/// failing backing store.
#[async_trait]
pub trait BrandRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Brand>, ServiceError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Brand>, ServiceError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Brand>, ServiceError>;

    async fn search(&self, query: &str) -> Result<Vec<Brand>, ServiceError>;
}

/// Brand repository over the static catalog tables
#[derive(Debug, Clone)]
pub struct InMemoryBrandRepository {
    base: BaseRepository,
}

impl InMemoryBrandRepository {
    pub fn new(tables: Arc<CatalogTables>) -> Self {
        Self {
            base: BaseRepository::new(tables),
        }
    }
}

#[async_trait]
impl BrandRepository for InMemoryBrandRepository {
    async fn list(&self) -> Result<Vec<Brand>, ServiceError> {
        Ok(self.base.tables().brands.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Brand>, ServiceError> {
        Ok(get_by_id(&self.base.tables().brands, id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Brand>, ServiceError> {
        Ok(get_by_slug(&self.base.tables().brands, slug, None).cloned())
    }

    async fn search(&self, query: &str) -> Result<Vec<Brand>, ServiceError> {
        Ok(search(&self.base.tables().brands, query)
            .into_iter()
            .cloned()
            .collect())
    }
}
