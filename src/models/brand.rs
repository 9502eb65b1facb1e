use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A manufacturer at the top of the catalog hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: String,
    pub name: String,
    /// Routing key; expected to be unique across brands.
    pub slug: String,
    pub logo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_count: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Select-box option for brand pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BrandOption {
    pub value: String,
    pub label: String,
}

impl From<&Brand> for BrandOption {
    fn from(brand: &Brand) -> Self {
        Self {
            value: brand.id.clone(),
            label: brand.name.clone(),
        }
    }
}

/// A brand with counts derived from its categories.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandSummary {
    #[serde(flatten)]
    pub brand: Brand,
    pub category_count: usize,
    /// Sum of the brand's category product counts.
    pub category_product_count: u32,
}
