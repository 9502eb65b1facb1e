use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::CatalogTables;
use crate::errors::ServiceError;
use crate::models::Category;
use crate::queries::{categories_for_brand, get_by_id, get_by_slug, search};

use super::{BaseRepository, Repository};

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, ServiceError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Category>, ServiceError>;

    /// Categories owned by `brand_id`, in display order.
    async fn find_by_brand(&self, brand_id: &str) -> Result<Vec<Category>, ServiceError>;

    /// Category slugs are only unique per brand, so the brand is required.
    async fn find_by_slug(
        &self,
        brand_id: &str,
        slug: &str,
    ) -> Result<Option<Category>, ServiceError>;

    async fn search(&self, query: &str) -> Result<Vec<Category>, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct InMemoryCategoryRepository {
    base: BaseRepository,
}

impl InMemoryCategoryRepository {
    pub fn new(tables: Arc<CatalogTables>) -> Self {
        Self {
            base: BaseRepository::new(tables),
        }
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, ServiceError> {
        Ok(self.base.tables().categories.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Category>, ServiceError> {
        Ok(get_by_id(&self.base.tables().categories, id).cloned())
    }

    async fn find_by_brand(&self, brand_id: &str) -> Result<Vec<Category>, ServiceError> {
        Ok(categories_for_brand(&self.base.tables().categories, brand_id))
    }

    async fn find_by_slug(
        &self,
        brand_id: &str,
        slug: &str,
    ) -> Result<Option<Category>, ServiceError> {
        Ok(get_by_slug(&self.base.tables().categories, slug, Some(brand_id)).cloned())
    }

    async fn search(&self, query: &str) -> Result<Vec<Category>, ServiceError> {
        Ok(search(&self.base.tables().categories, query)
            .into_iter()
            .cloned()
            .collect())
    }
}
