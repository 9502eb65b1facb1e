pub mod catalog_queries;
pub mod product_queries;

pub use catalog_queries::{
    enrich, enrich_all, get_by_foreign_key, get_by_id, get_by_slug, search, sort_by_field,
    CatalogRecord, ForeignKey, SortField, SortKey,
};
pub use product_queries::*;
