use std::sync::Arc;

use tracing::{debug, instrument};

use crate::errors::ServiceError;
use crate::models::{
    Brand, BrandOption, BrandSummary, Category, EnrichedProduct, Product, ProductCard,
    ProductFilter,
};
use crate::queries::{apply_filter, brand_summary, enrich, product_card, product_category_labels};
use crate::repositories::{BrandRepository, CategoryRepository, ProductRepository};

/// Read-only catalog listings used by the HTTP API and the CLI.
#[derive(Clone)]
pub struct CatalogService {
    brands: Arc<dyn BrandRepository>,
    categories: Arc<dyn CategoryRepository>,
    products: Arc<dyn ProductRepository>,
}

impl CatalogService {
    pub fn new(
        brands: Arc<dyn BrandRepository>,
        categories: Arc<dyn CategoryRepository>,
        products: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            brands,
            categories,
            products,
        }
    }

    /// All brands with their category counts, in table order
    #[instrument(skip(self))]
    pub async fn list_brands(&self) -> Result<Vec<BrandSummary>, ServiceError> {
        let brands = self.brands.list().await?;
        let categories = self.categories.list().await?;
        Ok(brands
            .iter()
            .map(|brand| brand_summary(brand, &categories))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn brand_options(&self) -> Result<Vec<BrandOption>, ServiceError> {
        let brands = self.brands.list().await?;
        Ok(brands.iter().map(BrandOption::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_brand(&self, slug: &str) -> Result<Brand, ServiceError> {
        self.brands
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Brand '{}' not found", slug)))
    }

    #[instrument(skip(self))]
    pub async fn list_categories(
        &self,
        brand_id: Option<&str>,
    ) -> Result<Vec<Category>, ServiceError> {
        match brand_id {
            Some(brand_id) => self.categories.find_by_brand(brand_id).await,
            None => self.categories.list().await,
        }
    }

    #[instrument(skip(self))]
    pub async fn search_categories(&self, query: &str) -> Result<Vec<Category>, ServiceError> {
        self.categories.search(query).await
    }

    /// Product cards narrowed and ordered by `filter`
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductCard>, ServiceError> {
        let products = self.products.list().await?;
        let filtered = apply_filter(&products, filter);
        debug!(matched = filtered.len(), total = products.len(), "Applied product filter");
        self.cards(&filtered).await
    }

    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<ProductCard>, ServiceError> {
        let products = self.products.search(query).await?;
        self.cards(&products).await
    }

    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Vec<ProductCard>, ServiceError> {
        let products = self.products.featured().await?;
        self.cards(&products).await
    }

    #[instrument(skip(self))]
    pub async fn latest_products(&self, limit: usize) -> Result<Vec<ProductCard>, ServiceError> {
        let products = self.products.latest(limit).await?;
        self.cards(&products).await
    }

    #[instrument(skip(self))]
    pub async fn most_enquired_products(
        &self,
        limit: usize,
    ) -> Result<Vec<ProductCard>, ServiceError> {
        let products = self.products.most_enquired(limit).await?;
        self.cards(&products).await
    }

    /// Distinct legacy category labels across all products
    #[instrument(skip(self))]
    pub async fn category_labels(&self) -> Result<Vec<String>, ServiceError> {
        let products = self.products.list().await?;
        Ok(product_category_labels(&products))
    }

    /// A single product by its (expected unique) slug, joined with its brand
    #[instrument(skip(self))]
    pub async fn get_product(&self, slug: &str) -> Result<EnrichedProduct, ServiceError> {
        let product = self
            .products
            .find_by_slug(slug, None)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product '{}' not found", slug)))?;
        let brands = self.brands.list().await?;
        Ok(enrich(&product, &brands))
    }

    async fn cards(&self, products: &[Product]) -> Result<Vec<ProductCard>, ServiceError> {
        let brands = self.brands.list().await?;
        let categories = self.categories.list().await?;
        Ok(products
            .iter()
            .map(|product| product_card(product, &brands, &categories))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogTables;
    use crate::models::{ProductSort, SortOrder};
    use crate::repositories::{
        InMemoryBrandRepository, InMemoryCategoryRepository, InMemoryProductRepository,
    };

    fn service() -> CatalogService {
        let tables = Arc::new(CatalogTables::embedded().unwrap());
        CatalogService::new(
            Arc::new(InMemoryBrandRepository::new(tables.clone())),
            Arc::new(InMemoryCategoryRepository::new(tables.clone())),
            Arc::new(InMemoryProductRepository::new(tables)),
        )
    }

    fn slugs(cards: &[ProductCard]) -> Vec<&str> {
        cards.iter().map(|c| c.slug.as_str()).collect()
    }

    #[tokio::test]
    async fn brand_summaries_count_categories() {
        let summaries = service().list_brands().await.unwrap();
        let wartsila = summaries
            .iter()
            .find(|s| s.brand.slug == "wartsila")
            .unwrap();
        assert_eq!(wartsila.category_count, 5);
        assert_eq!(wartsila.category_product_count, 45);

        let man = summaries.iter().find(|s| s.brand.slug == "man").unwrap();
        assert_eq!(man.category_count, 0);
    }

    #[tokio::test]
    async fn unknown_product_slug_is_not_found() {
        let err = service().get_product("nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn product_with_dangling_brand_still_resolves() {
        let product = service().get_product("cat-3516c-marine").await.unwrap();
        assert!(product.brand.is_none());
    }

    #[tokio::test]
    async fn filtered_cards_follow_sort() {
        let filter = ProductFilter {
            brand_id: Some("man-7".into()),
            sort_by: Some(ProductSort::Name),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        };
        let cards = service().list_products(&filter).await.unwrap();
        assert_eq!(
            slugs(&cards),
            ["alfa-laval-mapx-309", "bosch-rexroth-a10vso", "man-tcr22-turbocharger"]
        );
        assert!(cards.iter().all(|c| c.brand_slug == "man"));
        // Linked category belongs to a brand id that is not in the table.
        assert!(cards.iter().all(|c| c.category_slug == "l32-40"));
    }

    #[tokio::test]
    async fn labels_are_sorted_and_distinct() {
        let labels = service().category_labels().await.unwrap();
        assert_eq!(labels.first().map(String::as_str), Some("Automation"));
        assert_eq!(labels.len(), 9);
    }
}
