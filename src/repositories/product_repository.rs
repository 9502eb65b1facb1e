use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::CatalogTables;
use crate::errors::ServiceError;
use crate::models::Product;
use crate::queries::{
    featured_products, get_by_foreign_key, get_by_id, get_by_slug, latest_products,
    most_enquired_products, products_by_brand_and_category, products_by_category_id, search,
    ForeignKey,
};

use super::{BaseRepository, Repository};

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, ServiceError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, ServiceError>;

    /// Product slugs are expected to be unique; `brand_id` narrows the match
    /// when they are not.
    async fn find_by_slug(
        &self,
        slug: &str,
        brand_id: Option<&str>,
    ) -> Result<Option<Product>, ServiceError>;

    async fn find_by_brand(&self, brand_id: &str) -> Result<Vec<Product>, ServiceError>;

    async fn find_by_category(&self, category_id: &str) -> Result<Vec<Product>, ServiceError>;

    async fn find_by_brand_and_category(
        &self,
        brand_id: &str,
        category_id: &str,
    ) -> Result<Vec<Product>, ServiceError>;

    async fn search(&self, query: &str) -> Result<Vec<Product>, ServiceError>;

    async fn featured(&self) -> Result<Vec<Product>, ServiceError>;

    async fn latest(&self, limit: usize) -> Result<Vec<Product>, ServiceError>;

    async fn most_enquired(&self, limit: usize) -> Result<Vec<Product>, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct InMemoryProductRepository {
    base: BaseRepository,
}

impl InMemoryProductRepository {
    pub fn new(tables: Arc<CatalogTables>) -> Self {
        Self {
            base: BaseRepository::new(tables),
        }
    }

    fn products(&self) -> &[Product] {
        &self.base.tables().products
    }
}

fn owned(products: Vec<&Product>) -> Vec<Product> {
    products.into_iter().cloned().collect()
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.products().to_vec())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, ServiceError> {
        Ok(get_by_id(self.products(), id).cloned())
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        brand_id: Option<&str>,
    ) -> Result<Option<Product>, ServiceError> {
        Ok(get_by_slug(self.products(), slug, brand_id).cloned())
    }

    async fn find_by_brand(&self, brand_id: &str) -> Result<Vec<Product>, ServiceError> {
        Ok(owned(get_by_foreign_key(
            self.products(),
            ForeignKey::BrandId,
            brand_id,
        )))
    }

    async fn find_by_category(&self, category_id: &str) -> Result<Vec<Product>, ServiceError> {
        Ok(owned(products_by_category_id(self.products(), category_id)))
    }

    async fn find_by_brand_and_category(
        &self,
        brand_id: &str,
        category_id: &str,
    ) -> Result<Vec<Product>, ServiceError> {
        Ok(owned(products_by_brand_and_category(
            self.products(),
            brand_id,
            category_id,
        )))
    }

    async fn search(&self, query: &str) -> Result<Vec<Product>, ServiceError> {
        Ok(owned(search(self.products(), query)))
    }

    async fn featured(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(owned(featured_products(self.products())))
    }

    async fn latest(&self, limit: usize) -> Result<Vec<Product>, ServiceError> {
        Ok(latest_products(self.products(), limit))
    }

    async fn most_enquired(&self, limit: usize) -> Result<Vec<Product>, ServiceError> {
        Ok(most_enquired_products(self.products(), limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> InMemoryProductRepository {
        InMemoryProductRepository::new(Arc::new(CatalogTables::embedded().unwrap()))
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn empty_search_returns_everything() {
        let repo = repo();
        let all = repo.list().await.unwrap();
        let found = repo.search("").await.unwrap();
        assert_eq!(found, all);
    }

    #[tokio::test]
    async fn most_enquired_keeps_tie_order() {
        let top = repo().most_enquired(17).await.unwrap();
        let tie: Vec<_> = top
            .iter()
            .filter(|p| p.enquiry_count == 54)
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(tie, ["prod-008", "prod-016"]);
        assert_eq!(top.first().map(|p| p.id.as_str()), Some("prod-006"));
    }

    #[tokio::test]
    async fn latest_is_newest_first() {
        let latest = repo().latest(3).await.unwrap();
        assert_eq!(ids(&latest), ["prod-017", "prod-016", "prod-015"]);
    }

    #[tokio::test]
    async fn brand_and_category_listing() {
        let listed = repo()
            .find_by_brand_and_category("wartsila-16", "wartsila-32")
            .await
            .unwrap();
        assert_eq!(
            ids(&listed),
            ["prod-001", "prod-006", "prod-013", "prod-014", "prod-015"]
        );
    }

    #[tokio::test]
    async fn featured_products_in_table_order() {
        let featured = repo().featured().await.unwrap();
        assert_eq!(
            ids(&featured),
            ["prod-001", "prod-002", "prod-006", "prod-010", "prod-014"]
        );
    }
}
