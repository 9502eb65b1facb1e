//! Property-based tests for the catalog lookup helpers.
//!
//! Tables are generated with unique ids and slugs where the catalog expects
//! them, and with deliberately shared category slugs across brands.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rstest::rstest;
use skyline_catalog::models::{Brand, Category, Product, SortOrder};
use skyline_catalog::queries::{
    enrich, get_by_foreign_key, get_by_slug, search, sort_by_field, ForeignKey, SortField,
};

fn brand(id: &str, slug: &str) -> Brand {
    Brand {
        id: id.to_string(),
        name: format!("Brand {slug}"),
        slug: slug.to_string(),
        logo: format!("/images/brands/{slug}.png"),
        description: None,
        website: None,
        product_count: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn category(id: &str, slug: &str, brand_id: &str) -> Category {
    Category {
        id: id.to_string(),
        name: slug.to_uppercase(),
        slug: slug.to_string(),
        brand_id: brand_id.to_string(),
        description: None,
        order: 1,
        product_count: 0,
        thumbnail: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn product(id: &str, slug: &str, brand_id: &str, enquiry_count: u32) -> Product {
    Product {
        id: id.to_string(),
        name: slug.replace('-', " "),
        slug: slug.to_string(),
        brand_id: brand_id.to_string(),
        category_id: None,
        category_label: None,
        images: Vec::new(),
        thumbnail: None,
        description: String::new(),
        specifications: Vec::new(),
        price: None,
        in_stock: true,
        featured: false,
        enquiry_count,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn slug_strategy() -> impl Strategy<Value = String> {
    "[a-z]{2,8}(-[a-z0-9]{1,4})?"
}

/// Brands with distinct slugs; the index keeps ids and slugs unique.
fn brands_strategy() -> impl Strategy<Value = Vec<Brand>> {
    prop::collection::vec(slug_strategy(), 1..12).prop_map(|slugs| {
        slugs
            .into_iter()
            .enumerate()
            .map(|(i, slug)| brand(&format!("brand-{i}"), &format!("{slug}-{i}")))
            .collect()
    })
}

/// Categories spread over `brand_count` brands, drawing slugs from a small
/// pool so the same slug appears under several brands.
fn categories_strategy(brand_count: usize) -> impl Strategy<Value = Vec<Category>> {
    prop::collection::btree_set((0..brand_count, 0usize..4), 1..16).prop_map(|keys| {
        keys.into_iter()
            .enumerate()
            .map(|(i, (brand, slug))| {
                category(
                    &format!("cat-{i}"),
                    &format!("series-{slug}"),
                    &format!("brand-{brand}"),
                )
            })
            .collect()
    })
}

fn products_strategy() -> impl Strategy<Value = Vec<Product>> {
    prop::collection::vec((0usize..6, 0u32..5, slug_strategy()), 0..24).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (brand, enquiries, slug))| {
                product(
                    &format!("prod-{i}"),
                    &format!("{slug}-{i}"),
                    &format!("brand-{brand}"),
                    enquiries,
                )
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn every_brand_is_found_by_its_slug(brands in brands_strategy()) {
        for b in &brands {
            prop_assert_eq!(get_by_slug(&brands, &b.slug, None), Some(b));
        }
    }

    #[test]
    fn category_lookup_is_scoped_to_its_brand(categories in categories_strategy(4)) {
        for c in &categories {
            prop_assert_eq!(get_by_slug(&categories, &c.slug, Some(&c.brand_id)), Some(c));

            for other_brand in (0..4).map(|i| format!("brand-{i}")) {
                if other_brand == c.brand_id {
                    continue;
                }
                if let Some(found) = get_by_slug(&categories, &c.slug, Some(&other_brand)) {
                    prop_assert_eq!(&found.brand_id, &other_brand);
                    prop_assert_ne!(&found.id, &c.id);
                }
            }
        }
    }

    #[test]
    fn enrich_joins_existing_brand_only(products in products_strategy()) {
        // Brands 0..3 exist; products may point at brands 3..6 that do not.
        let brands: Vec<Brand> = (0..3)
            .map(|i| brand(&format!("brand-{i}"), &format!("b{i}")))
            .collect();
        for p in &products {
            let enriched = enrich(p, &brands);
            match brands.iter().find(|b| b.id == p.brand_id) {
                Some(expected) => prop_assert_eq!(enriched.brand.as_ref(), Some(expected)),
                None => prop_assert!(enriched.brand.is_none()),
            }
            prop_assert_eq!(&enriched.product, p);
        }
    }

    #[test]
    fn empty_search_returns_every_product(products in products_strategy()) {
        let found = search(&products, "");
        prop_assert_eq!(found.len(), products.len());
    }

    #[test]
    fn enquiry_sort_is_stable(products in products_strategy(), desc in any::<bool>()) {
        let direction = if desc { SortOrder::Desc } else { SortOrder::Asc };
        let sorted = sort_by_field(&products, SortField::EnquiryCount, direction);
        prop_assert_eq!(sorted.len(), products.len());

        let position = |id: &str| products.iter().position(|p| p.id == id).unwrap();
        for pair in sorted.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if desc {
                prop_assert!(a.enquiry_count >= b.enquiry_count);
            } else {
                prop_assert!(a.enquiry_count <= b.enquiry_count);
            }
            if a.enquiry_count == b.enquiry_count {
                prop_assert!(position(&a.id) < position(&b.id));
            }
        }
    }
}

#[test]
fn equal_enquiry_counts_keep_table_order() {
    let products = vec![
        product("p1", "engine-a", "b1", 10),
        product("p2", "engine-b", "b1", 10),
    ];
    let sorted = sort_by_field(&products, SortField::EnquiryCount, SortOrder::Desc);
    let ids: Vec<_> = sorted.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["p1", "p2"]);
}

#[test]
fn foreign_key_filter_keeps_table_order() {
    let categories = vec![
        category("c1", "kt19", "b1"),
        category("c2", "kt19", "b2"),
        category("c3", "kt38", "b1"),
        category("c4", "kt38", "b2"),
        category("c5", "kt50", "b1"),
    ];
    let ids: Vec<_> = get_by_foreign_key(&categories, ForeignKey::BrandId, "b1")
        .into_iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(ids, ["c1", "c3", "c5"]);
}

#[rstest]
#[case("nonexistent-slug", None)]
#[case("wartsila", Some("wartsila-16"))]
#[case("WARTSILA", None)]
fn brand_slug_lookup_is_exact(#[case] slug: &str, #[case] expected: Option<&str>) {
    let brands = vec![brand("man-7", "man"), brand("wartsila-16", "wartsila")];
    assert_eq!(
        get_by_slug(&brands, slug, None).map(|b| b.id.as_str()),
        expected
    );
}
