use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::errors::ServiceError;
use crate::models::Category;
use crate::repositories::CategoryRepository;

use super::StoreLatency;

pub const CATEGORY_NOT_FOUND: &str = "Category not found";
const FETCH_CATEGORIES_FAILED: &str = "Failed to fetch categories";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryState {
    pub categories: Vec<Category>,
    pub selected_category: Option<Category>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct CategoryStore {
    repository: Arc<dyn CategoryRepository>,
    latency: StoreLatency,
    state: Arc<RwLock<CategoryState>>,
}

impl CategoryStore {
    pub fn new(repository: Arc<dyn CategoryRepository>, latency: StoreLatency) -> Self {
        Self {
            repository,
            latency,
            state: Arc::new(RwLock::new(CategoryState::default())),
        }
    }

    pub async fn snapshot(&self) -> CategoryState {
        self.state.read().await.clone()
    }

    pub async fn fetch_categories(&self) -> Vec<Category> {
        self.begin().await;
        self.latency.list_round_trip().await;
        let result = self.repository.list().await;
        self.publish_list(result).await
    }

    /// Loads the brand's categories in display order.
    pub async fn fetch_categories_by_brand(&self, brand_id: &str) -> Vec<Category> {
        self.begin().await;
        self.latency.list_round_trip().await;
        let result = self.repository.find_by_brand(brand_id).await;
        self.publish_list(result).await
    }

    pub async fn fetch_category_by_slug(&self, brand_id: &str, slug: &str) -> Option<Category> {
        self.begin().await;
        self.latency.detail_round_trip().await;

        match self.repository.find_by_slug(brand_id, slug).await {
            Ok(Some(category)) => {
                let mut state = self.state.write().await;
                state.selected_category = Some(category.clone());
                state.loading = false;
                Some(category)
            }
            Ok(None) => {
                debug!(brand_id, slug, "Category slug did not resolve");
                self.fail(CATEGORY_NOT_FOUND).await;
                None
            }
            Err(err) => {
                warn!(brand_id, slug, error = %err, "Category fetch failed");
                self.fail(CATEGORY_NOT_FOUND).await;
                None
            }
        }
    }

    pub async fn set_selected_category(&self, category: Option<Category>) {
        self.state.write().await.selected_category = category;
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    async fn publish_list(&self, result: Result<Vec<Category>, ServiceError>) -> Vec<Category> {
        match result {
            Ok(categories) => {
                let mut state = self.state.write().await;
                state.categories = categories.clone();
                state.loading = false;
                categories
            }
            Err(err) => {
                warn!(error = %err, "Category list fetch failed");
                self.fail(FETCH_CATEGORIES_FAILED).await;
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
