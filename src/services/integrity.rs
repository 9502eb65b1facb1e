//! Read-only consistency diagnostics over the catalog tables, plus the
//! one-off `categoryId` backfill for legacy products.
//!
//! Nothing here is enforced at load time; the report only describes what a
//! curator should fix.

use std::collections::{BTreeMap, HashMap, HashSet};

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::catalog::CatalogTables;
use crate::models::Product;

/// Default category for products of each brand that predate `categoryId`.
pub static DEFAULT_CATEGORY_BACKFILL: Lazy<HashMap<String, String>> = Lazy::new(|| {
    [
        ("wartsila-16", "wartsila-32"),
        ("cat-1", "caterpillar-3516"),
        ("man-bw-6", "man-l32-40"),
        ("man-7", "man-l32-40"),
        ("yanmar-17", "yanmar-6eal"),
        ("cummins-2", "cummins-kt50"),
        ("rolls-royce-11", "rolls-royce-bergen-b32-40"),
        ("mitsubishi-8", "mitsubishi-parts"),
        ("deutz-3", "deutz-parts"),
        ("daihatsu-14", "daihatsu-parts"),
        ("volvo-15", "wartsila-32"),
        ("sulzer-13", "wartsila-32"),
        ("niigata-9", "wartsila-32"),
    ]
    .into_iter()
    .map(|(brand, category)| (brand.to_string(), category.to_string()))
    .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateKey {
    /// Scoping brand for category slugs; absent for global slugs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<String>,
    pub slug: String,
    /// Ids sharing the key, in table order.
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DanglingReference {
    pub record_id: String,
    pub missing_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub duplicate_brand_slugs: Vec<DuplicateKey>,
    pub duplicate_category_slugs: Vec<DuplicateKey>,
    pub duplicate_product_slugs: Vec<DuplicateKey>,
    pub categories_with_missing_brand: Vec<DanglingReference>,
    pub products_with_missing_brand: Vec<DanglingReference>,
    pub products_with_missing_category: Vec<DanglingReference>,
    /// Products identified only by the free-text category label.
    pub products_without_category_id: Vec<String>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }

    pub fn issue_count(&self) -> usize {
        self.duplicate_brand_slugs.len()
            + self.duplicate_category_slugs.len()
            + self.duplicate_product_slugs.len()
            + self.categories_with_missing_brand.len()
            + self.products_with_missing_brand.len()
            + self.products_with_missing_category.len()
            + self.products_without_category_id.len()
    }
}

/// Groups `(scope, slug, id)` rows and keeps the keys seen more than once.
fn duplicates<'a, I>(rows: I) -> Vec<DuplicateKey>
where
    I: IntoIterator<Item = (Option<&'a str>, &'a str, &'a str)>,
{
    let mut groups: BTreeMap<(Option<&str>, &str), Vec<String>> = BTreeMap::new();
    for (scope, slug, id) in rows {
        groups.entry((scope, slug)).or_default().push(id.to_string());
    }
    groups
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|((scope, slug), ids)| DuplicateKey {
            brand_id: scope.map(str::to_string),
            slug: slug.to_string(),
            ids,
        })
        .collect()
}

#[instrument(skip_all)]
pub fn check_integrity(tables: &CatalogTables) -> IntegrityReport {
    let brand_ids: HashSet<&str> = tables.brands.iter().map(|b| b.id.as_str()).collect();
    let category_ids: HashSet<&str> = tables.categories.iter().map(|c| c.id.as_str()).collect();

    let report = IntegrityReport {
        duplicate_brand_slugs: duplicates(
            tables
                .brands
                .iter()
                .map(|b| (None, b.slug.as_str(), b.id.as_str())),
        ),
        duplicate_category_slugs: duplicates(tables.categories.iter().map(|c| {
            (Some(c.brand_id.as_str()), c.slug.as_str(), c.id.as_str())
        })),
        duplicate_product_slugs: duplicates(
            tables
                .products
                .iter()
                .map(|p| (None, p.slug.as_str(), p.id.as_str())),
        ),
        categories_with_missing_brand: tables
            .categories
            .iter()
            .filter(|c| !brand_ids.contains(c.brand_id.as_str()))
            .map(|c| DanglingReference {
                record_id: c.id.clone(),
                missing_id: c.brand_id.clone(),
            })
            .collect(),
        products_with_missing_brand: tables
            .products
            .iter()
            .filter(|p| !brand_ids.contains(p.brand_id.as_str()))
            .map(|p| DanglingReference {
                record_id: p.id.clone(),
                missing_id: p.brand_id.clone(),
            })
            .collect(),
        products_with_missing_category: tables
            .products
            .iter()
            .filter_map(|p| {
                let category_id = p.category_id.as_deref()?;
                (!category_ids.contains(category_id)).then(|| DanglingReference {
                    record_id: p.id.clone(),
                    missing_id: category_id.to_string(),
                })
            })
            .collect(),
        products_without_category_id: tables
            .products
            .iter()
            .filter(|p| p.category_id.is_none())
            .map(|p| p.id.clone())
            .collect(),
    };

    if report.is_clean() {
        info!("Catalog integrity check found no issues");
    } else {
        warn!(issues = report.issue_count(), "Catalog integrity check found issues");
    }
    report
}

/// Sets `category_id` on every product lacking one whose brand has an entry
/// in `mapping`. Products that already carry an id are left untouched.
/// Returns the ids of the updated products.
pub fn backfill_category_ids(
    products: &mut [Product],
    mapping: &HashMap<String, String>,
) -> Vec<String> {
    let mut updated = Vec::new();
    for product in products.iter_mut().filter(|p| p.category_id.is_none()) {
        if let Some(category_id) = mapping.get(&product.brand_id) {
            product.category_id = Some(category_id.clone());
            updated.push(product.id.clone());
        }
    }
    info!(updated = updated.len(), "Backfilled product category ids");
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::catalog_queries::fixtures::{brand, category, product};

    #[test]
    fn seed_catalog_report() {
        let report = check_integrity(&CatalogTables::embedded().unwrap());

        assert!(report.duplicate_brand_slugs.is_empty());
        assert!(report.duplicate_category_slugs.is_empty());
        assert!(report.duplicate_product_slugs.is_empty());

        let orphan_categories: Vec<_> = report
            .categories_with_missing_brand
            .iter()
            .map(|r| (r.record_id.as_str(), r.missing_id.as_str()))
            .collect();
        assert_eq!(
            orphan_categories,
            [("man-l23-30", "man-11"), ("man-l32-40", "man-11")]
        );

        let orphan_products: Vec<_> = report
            .products_with_missing_brand
            .iter()
            .map(|r| r.record_id.as_str())
            .collect();
        assert_eq!(orphan_products, ["prod-003", "prod-005"]);
        assert!(report.products_with_missing_category.is_empty());
        assert_eq!(report.products_without_category_id, ["prod-016"]);
        assert_eq!(report.issue_count(), 5);
    }

    #[test]
    fn category_slugs_are_duplicates_only_within_a_brand() {
        let tables = CatalogTables::new(
            vec![brand("b1", "one"), brand("b2", "two"), brand("b3", "one")],
            vec![
                category("c1", "engine-parts", "b1", 1),
                category("c2", "engine-parts", "b2", 1),
                category("c3", "engine-parts", "b1", 2),
            ],
            vec![
                product("p1", "pump", "b1", 0),
                product("p2", "pump", "b2", 0),
            ],
        );
        let report = check_integrity(&tables);

        assert_eq!(
            report.duplicate_brand_slugs,
            [DuplicateKey {
                brand_id: None,
                slug: "one".into(),
                ids: vec!["b1".into(), "b3".into()],
            }]
        );
        assert_eq!(report.duplicate_category_slugs.len(), 1);
        assert_eq!(report.duplicate_category_slugs[0].brand_id.as_deref(), Some("b1"));
        assert_eq!(report.duplicate_category_slugs[0].ids, ["c1", "c3"]);
        assert_eq!(report.duplicate_product_slugs[0].ids, ["p1", "p2"]);
    }

    #[test]
    fn unknown_category_id_is_reported() {
        let mut stray = product("p1", "pump", "b1", 0);
        stray.category_id = Some("gone".into());
        let tables = CatalogTables::new(vec![brand("b1", "one")], Vec::new(), vec![stray]);

        let report = check_integrity(&tables);
        assert_eq!(
            report.products_with_missing_category,
            [DanglingReference {
                record_id: "p1".into(),
                missing_id: "gone".into(),
            }]
        );
        assert!(report.products_without_category_id.is_empty());
    }

    #[test]
    fn backfill_fills_only_missing_ids() {
        let mut products = CatalogTables::embedded().unwrap().products;
        let before: Vec<_> = products.iter().map(|p| p.category_id.clone()).collect();

        let updated = backfill_category_ids(&mut products, &DEFAULT_CATEGORY_BACKFILL);

        assert_eq!(updated, ["prod-016"]);
        let pump = products.iter().find(|p| p.id == "prod-016").unwrap();
        assert_eq!(pump.category_id.as_deref(), Some("daihatsu-parts"));
        for (product, previous) in products.iter().zip(before) {
            if product.id != "prod-016" {
                assert_eq!(product.category_id, previous);
            }
        }
    }

    #[test]
    fn backfill_skips_unmapped_brands() {
        let mut products = vec![product("p1", "pump", "unknown-1", 0)];
        assert!(backfill_category_ids(&mut products, &DEFAULT_CATEGORY_BACKFILL).is_empty());
        assert!(products[0].category_id.is_none());
    }
}
