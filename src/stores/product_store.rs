use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::errors::ServiceError;
use crate::models::{EnrichedProduct, Product, ProductFilter};
use crate::queries::{apply_filter, enrich_all};
use crate::repositories::{BrandRepository, ProductRepository};

use super::StoreLatency;

pub const PRODUCT_NOT_FOUND: &str = "Product not found";
const FETCH_PRODUCTS_FAILED: &str = "Failed to fetch products";
const FETCH_LATEST_FAILED: &str = "Failed to fetch latest products";
const FETCH_MOST_ENQUIRED_FAILED: &str = "Failed to fetch most enquired products";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductState {
    pub products: Vec<EnrichedProduct>,
    pub latest_products: Vec<EnrichedProduct>,
    pub most_enquired: Vec<EnrichedProduct>,
    pub selected_product: Option<EnrichedProduct>,
    pub filters: ProductFilter,
    pub loading: bool,
    pub error: Option<String>,
}

/// Which list slot a fetch publishes into.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Products,
    Latest,
    MostEnquired,
}

impl Slot {
    fn failure_message(self) -> &'static str {
        match self {
            Slot::Products => FETCH_PRODUCTS_FAILED,
            Slot::Latest => FETCH_LATEST_FAILED,
            Slot::MostEnquired => FETCH_MOST_ENQUIRED_FAILED,
        }
    }
}

/// Product listings, home-page rails and the product selection. Every
/// published product is joined with its brand.
#[derive(Clone)]
pub struct ProductStore {
    products: Arc<dyn ProductRepository>,
    brands: Arc<dyn BrandRepository>,
    latency: StoreLatency,
    state: Arc<RwLock<ProductState>>,
}

impl ProductStore {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        brands: Arc<dyn BrandRepository>,
        latency: StoreLatency,
    ) -> Self {
        Self {
            products,
            brands,
            latency,
            state: Arc::new(RwLock::new(ProductState::default())),
        }
    }

    pub async fn snapshot(&self) -> ProductState {
        self.state.read().await.clone()
    }

    pub async fn fetch_products(&self) -> Vec<EnrichedProduct> {
        self.begin().await;
        self.latency.list_round_trip().await;
        let result = self.products.list().await;
        self.publish(Slot::Products, result).await
    }

    pub async fn fetch_products_by_brand(&self, brand_id: &str) -> Vec<EnrichedProduct> {
        self.begin().await;
        self.latency.list_round_trip().await;
        let result = self.products.find_by_brand(brand_id).await;
        self.publish(Slot::Products, result).await
    }

    pub async fn fetch_products_by_category(&self, category_id: &str) -> Vec<EnrichedProduct> {
        self.begin().await;
        self.latency.list_round_trip().await;
        let result = self.products.find_by_category(category_id).await;
        self.publish(Slot::Products, result).await
    }

    /// Resolves a product slug within the brand addressed by `brand_slug`
    /// and makes it the selection. On a miss the previous selection is kept.
    pub async fn fetch_product_by_slug(
        &self,
        brand_slug: &str,
        product_slug: &str,
    ) -> Option<EnrichedProduct> {
        self.begin().await;
        self.latency.detail_round_trip().await;

        match self.lookup_in_brand(brand_slug, product_slug).await {
            Ok(Some(product)) => {
                let mut state = self.state.write().await;
                state.selected_product = Some(product.clone());
                state.loading = false;
                Some(product)
            }
            Ok(None) => {
                debug!(brand_slug, product_slug, "Product slug did not resolve");
                self.fail(PRODUCT_NOT_FOUND).await;
                None
            }
            Err(err) => {
                warn!(brand_slug, product_slug, error = %err, "Product fetch failed");
                self.fail(PRODUCT_NOT_FOUND).await;
                None
            }
        }
    }

    pub async fn fetch_latest_products(&self, limit: usize) -> Vec<EnrichedProduct> {
        self.begin().await;
        self.latency.list_round_trip().await;
        let result = self.products.latest(limit).await;
        self.publish(Slot::Latest, result).await
    }

    pub async fn fetch_most_enquired(&self, limit: usize) -> Vec<EnrichedProduct> {
        self.begin().await;
        self.latency.list_round_trip().await;
        let result = self.products.most_enquired(limit).await;
        self.publish(Slot::MostEnquired, result).await
    }

    pub async fn set_selected_product(&self, product: Option<EnrichedProduct>) {
        self.state.write().await.selected_product = product;
    }

    /// Merges the fields set in `filters` into the current filters.
    pub async fn set_filters(&self, filters: ProductFilter) {
        self.state.write().await.filters.merge(filters);
    }

    pub async fn clear_filters(&self) {
        self.state.write().await.filters = ProductFilter::default();
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    /// The loaded product list narrowed and ordered by the current filters.
    pub async fn filtered_products(&self) -> Vec<EnrichedProduct> {
        let state = self.state.read().await;
        apply_filter(&state.products, &state.filters)
    }

    async fn lookup_in_brand(
        &self,
        brand_slug: &str,
        product_slug: &str,
    ) -> Result<Option<EnrichedProduct>, ServiceError> {
        let Some(brand) = self.brands.find_by_slug(brand_slug).await? else {
            return Ok(None);
        };
        let product = self
            .products
            .find_by_slug(product_slug, Some(&brand.id))
            .await?;
        Ok(product.map(|product| EnrichedProduct {
            product,
            brand: Some(brand),
        }))
    }

    async fn enrich(&self, products: Vec<Product>) -> Result<Vec<EnrichedProduct>, ServiceError> {
        let brands = self.brands.list().await?;
        Ok(enrich_all(&products, &brands))
    }

    async fn publish(
        &self,
        slot: Slot,
        result: Result<Vec<Product>, ServiceError>,
    ) -> Vec<EnrichedProduct> {
        let enriched = match result {
            Ok(products) => self.enrich(products).await,
            Err(err) => Err(err),
        };

        match enriched {
            Ok(products) => {
                let mut state = self.state.write().await;
                match slot {
                    Slot::Products => state.products = products.clone(),
                    Slot::Latest => state.latest_products = products.clone(),
                    Slot::MostEnquired => state.most_enquired = products.clone(),
                }
                state.loading = false;
                products
            }
            Err(err) => {
                warn!(?slot, error = %err, "Product list fetch failed");
                self.fail(slot.failure_message()).await;
                Vec::new()
            }
        }
    }

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.loading = true;
        state.error = None;
    }

    async fn fail(&self, message: &str) {
        let mut state = self.state.write().await;
        state.error = Some(message.to_string());
        state.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductSort, SortOrder};
    use crate::repositories::InMemoryBrandRepository;
    use crate::stores::test_support::{session, tables};
    use async_trait::async_trait;

    fn ids(products: &[EnrichedProduct]) -> Vec<&str> {
        products.iter().map(|p| p.product.id.as_str()).collect()
    }

    #[tokio::test]
    async fn published_products_carry_their_brand() {
        let store = session().products;
        let products = store.fetch_products().await;
        assert_eq!(products.len(), 17);

        let furuno = products.iter().find(|p| p.product.id == "prod-014").unwrap();
        assert_eq!(furuno.brand.as_ref().unwrap().slug, "wartsila");

        let orphan = products.iter().find(|p| p.product.id == "prod-003").unwrap();
        assert!(orphan.brand.is_none());
    }

    #[tokio::test]
    async fn product_lookup_is_scoped_to_brand() {
        let store = session().products;
        let found = store
            .fetch_product_by_slug("wartsila", "furuno-far-2228")
            .await
            .unwrap();
        assert_eq!(found.product.id, "prod-014");

        assert!(store
            .fetch_product_by_slug("deutz", "furuno-far-2228")
            .await
            .is_none());
        let state = store.snapshot().await;
        assert_eq!(state.error.as_deref(), Some(PRODUCT_NOT_FOUND));
        assert_eq!(state.selected_product.unwrap().product.id, "prod-014");
    }

    #[tokio::test]
    async fn unknown_brand_slug_is_a_product_miss() {
        let store = session().products;
        assert!(store
            .fetch_product_by_slug("nonexistent-slug", "furuno-far-2228")
            .await
            .is_none());
        assert_eq!(
            store.snapshot().await.error.as_deref(),
            Some(PRODUCT_NOT_FOUND)
        );

        store.clear_error().await;
        store.set_selected_product(None).await;
        let state = store.snapshot().await;
        assert!(state.error.is_none());
        assert!(state.selected_product.is_none());
    }

    #[tokio::test]
    async fn rails_fill_their_own_slots() {
        let store = session().products;
        store.fetch_latest_products(3).await;
        store.fetch_most_enquired(2).await;

        let state = store.snapshot().await;
        assert!(state.products.is_empty());
        assert_eq!(
            ids(&state.latest_products),
            ["prod-017", "prod-016", "prod-015"]
        );
        assert_eq!(ids(&state.most_enquired), ["prod-006", "prod-014"]);
    }

    #[tokio::test]
    async fn filters_merge_and_clear() {
        let store = session().products;
        store.fetch_products_by_brand("wartsila-16").await;

        store
            .set_filters(ProductFilter {
                search: Some("radar".into()),
                ..Default::default()
            })
            .await;
        store
            .set_filters(ProductFilter {
                sort_by: Some(ProductSort::Popularity),
                sort_order: Some(SortOrder::Desc),
                ..Default::default()
            })
            .await;

        let state = store.snapshot().await;
        assert_eq!(state.filters.search.as_deref(), Some("radar"));
        assert_eq!(ids(&store.filtered_products().await), ["prod-014", "prod-015"]);

        store.clear_filters().await;
        assert_eq!(store.filtered_products().await.len(), 5);
    }

    #[tokio::test]
    async fn category_listing_uses_category_id() {
        let store = session().products;
        let products = store.fetch_products_by_category("deutz-parts").await;
        assert_eq!(ids(&products), ["prod-017"]);
        assert!(store.fetch_products_by_category("daihatsu-parts").await.is_empty());
    }

    struct FailingProducts;

    #[async_trait]
    impl ProductRepository for FailingProducts {
        async fn list(&self) -> Result<Vec<Product>, ServiceError> {
            Err(ServiceError::InternalError("backing store offline".into()))
        }
        async fn find_by_id(&self, _id: &str) -> Result<Option<Product>, ServiceError> {
            Ok(None)
        }
        async fn find_by_slug(
            &self,
            _slug: &str,
            _brand_id: Option<&str>,
        ) -> Result<Option<Product>, ServiceError> {
            Ok(None)
        }
        async fn find_by_brand(&self, _brand_id: &str) -> Result<Vec<Product>, ServiceError> {
            self.list().await
        }
        async fn find_by_category(&self, _id: &str) -> Result<Vec<Product>, ServiceError> {
            self.list().await
        }
        async fn find_by_brand_and_category(
            &self,
            _brand_id: &str,
            _category_id: &str,
        ) -> Result<Vec<Product>, ServiceError> {
            self.list().await
        }
        async fn search(&self, _query: &str) -> Result<Vec<Product>, ServiceError> {
            self.list().await
        }
        async fn featured(&self) -> Result<Vec<Product>, ServiceError> {
            self.list().await
        }
        async fn latest(&self, _limit: usize) -> Result<Vec<Product>, ServiceError> {
            self.list().await
        }
        async fn most_enquired(&self, _limit: usize) -> Result<Vec<Product>, ServiceError> {
            self.list().await
        }
    }

    #[tokio::test]
    async fn repository_failure_surfaces_fixed_message() {
        let store = ProductStore::new(
            Arc::new(FailingProducts),
            Arc::new(InMemoryBrandRepository::new(tables())),
            StoreLatency::none(),
        );
        assert!(store.fetch_latest_products(8).await.is_empty());

        let state = store.snapshot().await;
        assert_eq!(state.error.as_deref(), Some(FETCH_LATEST_FAILED));
        assert!(!state.loading);
    }
}
