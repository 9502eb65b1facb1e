use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::models::Brand;
use crate::repositories::BrandRepository;

use super::StoreLatency;

pub const BRAND_NOT_FOUND: &str = "Brand not found";
const FETCH_BRANDS_FAILED: &str = "Failed to fetch brands";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandState {
    pub brands: Vec<Brand>,
    pub selected_brand: Option<Brand>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Brand list and current brand selection.
#[derive(Clone)]
pub struct BrandStore {
    repository: Arc<dyn BrandRepository>,
    latency: StoreLatency,
    state: Arc<RwLock<BrandState>>,
}

impl BrandStore {
    pub fn new(repository: Arc<dyn BrandRepository>, latency: StoreLatency) -> Self {
        Self {
            repository,
            latency,
            state: Arc::new(RwLock::new(BrandState::default())),
        }
    }

    pub async fn snapshot(&self) -> BrandState {
        self.state.read().await.clone()
    }

    pub async fn fetch_brands(&self) -> Vec<Brand> {
        self.begin().await;
        self.latency.list_round_trip().await;

        match self.repository.list().await {
            Ok(brands) => {
                let mut state = self.state.write().await;
                state.brands = brands.clone();
                state.loading = false;
                brands
            }
            Err(err) => {
                warn!(error = %err, "Brand list fetch failed");
                self.fail(FETCH_BRANDS_FAILED).await;
                Vec::new()
            }
        }
    }

    /// Resolves a brand and makes it the selection. On a miss the previous
    /// selection is kept and `error` is set.
    pub async fn fetch_brand_by_slug(&self, slug: &str) -> Option<Brand> {
        self.begin().await;
        self.latency.detail_round_trip().await;

        match self.repository.find_by_slug(slug).await {
            Ok(Some(brand)) => {
                let mut state = self.state.write().await;
                state.selected_brand = Some(brand.clone());
                state.loading = false;
                Some(brand)
            }
            Ok(None) => {
                debug!(slug, "Brand slug did not resolve");
                self.fail(BRAND_NOT_FOUND).await;
                None
            }
            Err(err) => {
                warn!(slug, error = %err, "Brand fetch failed");
                self.fail(BRAND_NOT_FOUND).await;
                None
            }
        }
    }

    pub async fn set_selected_brand(&self, brand: Option<Brand>) {
        self.state.write().await.selected_brand = brand;
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
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
    use crate::repositories::InMemoryBrandRepository;
    use crate::stores::test_support::tables;
    use std::time::Duration;

    fn store(latency: StoreLatency) -> BrandStore {
        BrandStore::new(Arc::new(InMemoryBrandRepository::new(tables())), latency)
    }

    #[tokio::test]
    async fn unknown_slug_sets_error_and_keeps_selection() {
        let store = store(StoreLatency::none());

        assert!(store.fetch_brand_by_slug("nonexistent-slug").await.is_none());
        let state = store.snapshot().await;
        assert_eq!(state.error.as_deref(), Some(BRAND_NOT_FOUND));
        assert!(state.selected_brand.is_none());
        assert!(!state.loading);

        store.fetch_brand_by_slug("deutz").await.unwrap();
        store.fetch_brand_by_slug("nonexistent-slug").await;
        let state = store.snapshot().await;
        assert_eq!(state.error.as_deref(), Some(BRAND_NOT_FOUND));
        assert_eq!(
            state.selected_brand.map(|b| b.id).as_deref(),
            Some("deutz-3")
        );
    }

    #[tokio::test]
    async fn successful_fetch_clears_previous_error() {
        let store = store(StoreLatency::none());
        store.fetch_brand_by_slug("missing").await;
        store.fetch_brand_by_slug("yanmar").await;

        let state = store.snapshot().await;
        assert!(state.error.is_none());
        assert_eq!(state.selected_brand.unwrap().slug, "yanmar");
    }

    #[tokio::test]
    async fn clear_error_and_manual_selection() {
        let store = store(StoreLatency::none());
        store.fetch_brand_by_slug("missing").await;
        store.clear_error().await;
        assert!(store.snapshot().await.error.is_none());

        store.set_selected_brand(None).await;
        assert!(store.snapshot().await.selected_brand.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn loading_is_visible_during_round_trip() {
        let store = store(StoreLatency::default());
        let fetch = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_brands().await }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(store.snapshot().await.loading);

        let brands = fetch.await.unwrap();
        assert_eq!(brands.len(), 10);
        let state = store.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.brands, brands);
    }

    #[tokio::test(start_paused = true)]
    async fn later_resolving_fetch_wins() {
        let slow = StoreLatency {
            list: Duration::ZERO,
            detail: Duration::from_millis(300),
        };
        let store = store(slow);

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_brand_by_slug("wartsila").await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_brand_by_slug("cummins").await }
        });

        first.await.unwrap();
        assert_eq!(
            store.snapshot().await.selected_brand.unwrap().slug,
            "wartsila"
        );
        second.await.unwrap();
        assert_eq!(
            store.snapshot().await.selected_brand.unwrap().slug,
            "cummins"
        );
    }
}
