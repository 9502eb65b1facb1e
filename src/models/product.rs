use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::Brand;

/// A single `name: value` line of a product's technical data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Specification {
    pub key: String,
    pub value: String,
}

impl Specification {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An inquirable catalog item.
///
/// Older records carry no `category_id` and only the free-text `category`
/// label; newer ones carry both. See [`Product::category_ref`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Should be globally unique; not enforced.
    pub slug: String,
    pub brand_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// Legacy denormalised category name.
    #[serde(default, rename = "category", skip_serializing_if = "Option::is_none")]
    pub category_label: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub description: String,
    #[serde(default, with = "ordered_pairs")]
    #[schema(value_type = Object)]
    pub specifications: Vec<Specification>,
    /// `None` or zero means "price on request".
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub enquiry_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How a product points at its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryRef<'a> {
    /// Foreign key into the category table.
    Id(&'a str),
    /// Free-text label carried by legacy records.
    InlineName(&'a str),
}

impl Product {
    /// Preferred category reference: the id when present, else the inline label.
    pub fn category_ref(&self) -> Option<CategoryRef<'_>> {
        match (&self.category_id, &self.category_label) {
            (Some(id), _) if !id.is_empty() => Some(CategoryRef::Id(id)),
            (_, Some(label)) if !label.is_empty() => Some(CategoryRef::InlineName(label)),
            _ => None,
        }
    }

    pub fn is_price_on_request(&self) -> bool {
        self.price.map_or(true, |price| price.is_zero())
    }

    /// Explicit thumbnail, falling back to the first image.
    pub fn primary_image(&self) -> Option<&str> {
        self.thumbnail
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
    }
}

/// A product joined with its owning brand for display.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedProduct {
    #[serde(flatten)]
    pub product: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<Brand>,
}

impl AsRef<Product> for Product {
    fn as_ref(&self) -> &Product {
        self
    }
}

impl AsRef<Product> for EnrichedProduct {
    fn as_ref(&self) -> &Product {
        &self.product
    }
}

/// Compact projection used by list views.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub brand_name: String,
    pub brand_slug: String,
    pub category_name: String,
    pub category_slug: String,
    pub thumbnail: String,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub enquiry_count: u32,
}

/// Ordering choices offered by product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProductSort {
    Name,
    Date,
    Popularity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Product listing filter; every field is optional and unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    pub brand_id: Option<String>,
    pub category_id: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<ProductSort>,
    pub sort_order: Option<SortOrder>,
}

impl ProductFilter {
    /// Overlays the fields set in `other` onto `self`.
    pub fn merge(&mut self, other: ProductFilter) {
        if other.brand_id.is_some() {
            self.brand_id = other.brand_id;
        }
        if other.category_id.is_some() {
            self.category_id = other.category_id;
        }
        if other.search.is_some() {
            self.search = other.search;
        }
        if other.sort_by.is_some() {
            self.sort_by = other.sort_by;
        }
        if other.sort_order.is_some() {
            self.sort_order = other.sort_order;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ProductFilter::default()
    }
}

/// Specifications are authored as a JSON object; entry order is significant
/// for display, so they are read into a `Vec` rather than a map.
mod ordered_pairs {
    use super::Specification;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(
        pairs: &[Specification],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(pairs.len()))?;
        for pair in pairs {
            map.serialize_entry(&pair.key, &pair.value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Specification>, D::Error> {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = Vec<Specification>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of specification names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    pairs.push(Specification { key, value });
                }
                Ok(pairs)
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}
