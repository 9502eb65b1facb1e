//! Lookup helpers over the flat catalog tables.
//!
//! Every helper is a pure linear scan. A miss is `None` or an empty `Vec`,
//! never an error.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Brand, Category, EnrichedProduct, Product, SortOrder};

/// Foreign-key columns that can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ForeignKey {
    BrandId,
    CategoryId,
}

/// Columns a table can be sorted by. A record without a value for the
/// column sorts before every record that has one in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Slug,
    CreatedAt,
    UpdatedAt,
    EnquiryCount,
    Order,
    ProductCount,
    Price,
}

/// Owned comparison key extracted from a record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Integer(i64),
    Decimal(Decimal),
    Time(DateTime<Utc>),
    Text(String),
}

/// Common shape of the three catalog tables.
pub trait CatalogRecord {
    fn id(&self) -> &str;

    fn slug(&self) -> &str;

    /// Brand that scopes this record's slug.
    fn owner_brand_id(&self) -> Option<&str>;

    fn foreign_key(&self, _key: ForeignKey) -> Option<&str> {
        None
    }

    /// Text fields matched by [`search`].
    fn search_fields(&self) -> Vec<&str>;

    fn sort_key(&self, field: SortField) -> Option<SortKey>;
}

impl CatalogRecord for Brand {
    fn id(&self) -> &str {
        &self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn owner_brand_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }

    fn sort_key(&self, field: SortField) -> Option<SortKey> {
        match field {
            SortField::Name => Some(text_key(&self.name)),
            SortField::Slug => Some(text_key(&self.slug)),
            SortField::CreatedAt => Some(SortKey::Time(self.created_at)),
            SortField::UpdatedAt => Some(SortKey::Time(self.updated_at)),
            SortField::ProductCount => self.product_count.map(|n| SortKey::Integer(n.into())),
            SortField::EnquiryCount | SortField::Order | SortField::Price => None,
        }
    }
}

impl CatalogRecord for Category {
    fn id(&self) -> &str {
        &self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn owner_brand_id(&self) -> Option<&str> {
        Some(&self.brand_id)
    }

    fn foreign_key(&self, key: ForeignKey) -> Option<&str> {
        match key {
            ForeignKey::BrandId => Some(&self.brand_id),
            ForeignKey::CategoryId => None,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }

    fn sort_key(&self, field: SortField) -> Option<SortKey> {
        match field {
            SortField::Name => Some(text_key(&self.name)),
            SortField::Slug => Some(text_key(&self.slug)),
            SortField::CreatedAt => Some(SortKey::Time(self.created_at)),
            SortField::UpdatedAt => Some(SortKey::Time(self.updated_at)),
            SortField::Order => Some(SortKey::Integer(self.order.into())),
            SortField::ProductCount => Some(SortKey::Integer(self.product_count.into())),
            SortField::EnquiryCount | SortField::Price => None,
        }
    }
}

impl CatalogRecord for Product {
    fn id(&self) -> &str {
        &self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn owner_brand_id(&self) -> Option<&str> {
        Some(&self.brand_id)
    }

    fn foreign_key(&self, key: ForeignKey) -> Option<&str> {
        match key {
            ForeignKey::BrandId => Some(&self.brand_id),
            ForeignKey::CategoryId => self.category_id.as_deref(),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.description.as_str()];
        fields.extend(self.category_label.as_deref());
        fields
    }

    fn sort_key(&self, field: SortField) -> Option<SortKey> {
        match field {
            SortField::Name => Some(text_key(&self.name)),
            SortField::Slug => Some(text_key(&self.slug)),
            SortField::CreatedAt => Some(SortKey::Time(self.created_at)),
            SortField::UpdatedAt => Some(SortKey::Time(self.updated_at)),
            SortField::EnquiryCount => Some(SortKey::Integer(self.enquiry_count.into())),
            SortField::Price => self.price.map(SortKey::Decimal),
            SortField::Order | SortField::ProductCount => None,
        }
    }
}

impl CatalogRecord for EnrichedProduct {
    fn id(&self) -> &str {
        self.product.id()
    }

    fn slug(&self) -> &str {
        self.product.slug()
    }

    fn owner_brand_id(&self) -> Option<&str> {
        self.product.owner_brand_id()
    }

    fn foreign_key(&self, key: ForeignKey) -> Option<&str> {
        self.product.foreign_key(key)
    }

    fn search_fields(&self) -> Vec<&str> {
        self.product.search_fields()
    }

    fn sort_key(&self, field: SortField) -> Option<SortKey> {
        self.product.sort_key(field)
    }
}

fn text_key(value: &str) -> SortKey {
    SortKey::Text(value.to_lowercase())
}

/// First record whose id equals `id`.
pub fn get_by_id<'a, T: CatalogRecord>(table: &'a [T], id: &str) -> Option<&'a T> {
    table.iter().find(|record| record.id() == id)
}

/// First record whose slug equals `slug`, optionally restricted to the
/// records owned by `brand_id`. Category slugs are only unique per brand,
/// so category lookups should always pass the brand.
pub fn get_by_slug<'a, T: CatalogRecord>(
    table: &'a [T],
    slug: &str,
    brand_id: Option<&str>,
) -> Option<&'a T> {
    table.iter().find(|record| {
        record.slug() == slug
            && brand_id.map_or(true, |brand_id| record.owner_brand_id() == Some(brand_id))
    })
}

/// Every record whose `key` column equals `value`, in table order.
pub fn get_by_foreign_key<'a, T: CatalogRecord>(
    table: &'a [T],
    key: ForeignKey,
    value: &str,
) -> Vec<&'a T> {
    table
        .iter()
        .filter(|record| record.foreign_key(key) == Some(value))
        .collect()
}

/// Case-insensitive substring match over each record's search fields.
/// The empty query matches every record.
pub fn search<'a, T: CatalogRecord>(table: &'a [T], query: &str) -> Vec<&'a T> {
    let needle = query.to_lowercase();
    table
        .iter()
        .filter(|record| matches_query(*record, &needle))
        .collect()
}

pub(crate) fn matches_query<T: CatalogRecord>(record: &T, lowercase_needle: &str) -> bool {
    lowercase_needle.is_empty()
        || record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(lowercase_needle))
}

/// Sorted copy of `table`. The sort is stable: records with equal keys keep
/// their table order in both directions.
pub fn sort_by_field<T: CatalogRecord + Clone>(
    table: &[T],
    field: SortField,
    direction: SortOrder,
) -> Vec<T> {
    let mut sorted = table.to_vec();
    match direction {
        SortOrder::Asc => sorted.sort_by_cached_key(|record| record.sort_key(field)),
        SortOrder::Desc => sorted.sort_by_cached_key(|record| Reverse(record.sort_key(field))),
    }
    sorted
}

/// Joins `product` with its owning brand. A missing brand leaves `brand`
/// unset.
pub fn enrich(product: &Product, brands: &[Brand]) -> EnrichedProduct {
    EnrichedProduct {
        product: product.clone(),
        brand: get_by_id(brands, &product.brand_id).cloned(),
    }
}

pub fn enrich_all<'a>(
    products: impl IntoIterator<Item = &'a Product>,
    brands: &[Brand],
) -> Vec<EnrichedProduct> {
    products
        .into_iter()
        .map(|product| enrich(product, brands))
        .collect()
}
