use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::ValidationError(format!("Validation failed: {}", e)))
}

/// Size of a home-page style listing. Clamped by configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ListingQuery {
    /// Number of items to return (default from config, capped at the configured maximum)
    pub limit: Option<usize>,
}

/// Free-text search. An empty query matches everything.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub q: String,
}

impl SearchQuery {
    pub fn trimmed(&self) -> &str {
        self.q.trim()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct CategoryListQuery {
    /// Restrict to one brand's categories, in display order
    pub brand_id: Option<String>,
}
