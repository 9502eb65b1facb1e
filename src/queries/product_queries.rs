use std::collections::BTreeSet;

use crate::models::{
    Brand, BrandSummary, BrandWithCategories, Category, CategoryRef, Product, ProductCard,
    ProductFilter, ProductSort, SortOrder,
};

use super::catalog_queries::{
    get_by_foreign_key, get_by_id, matches_query, sort_by_field, CatalogRecord, ForeignKey,
    SortField,
};

const UNCATEGORIZED: &str = "Uncategorized";

/// A brand's categories in display order.
pub fn categories_for_brand(categories: &[Category], brand_id: &str) -> Vec<Category> {
    let owned: Vec<Category> = get_by_foreign_key(categories, ForeignKey::BrandId, brand_id)
        .into_iter()
        .cloned()
        .collect();
    sort_by_field(&owned, SortField::Order, SortOrder::Asc)
}

/// Sum of the authored `productCount` of a brand's categories.
pub fn brand_product_count(categories: &[Category], brand_id: &str) -> u32 {
    get_by_foreign_key(categories, ForeignKey::BrandId, brand_id)
        .iter()
        .map(|category| category.product_count)
        .sum()
}

pub fn brand_category_count(categories: &[Category], brand_id: &str) -> usize {
    get_by_foreign_key(categories, ForeignKey::BrandId, brand_id).len()
}

pub fn brand_summary(brand: &Brand, categories: &[Category]) -> BrandSummary {
    BrandSummary {
        brand: brand.clone(),
        category_count: brand_category_count(categories, &brand.id),
        category_product_count: brand_product_count(categories, &brand.id),
    }
}

pub fn brands_with_categories(
    brands: &[Brand],
    categories: &[Category],
) -> Vec<BrandWithCategories> {
    brands
        .iter()
        .map(|brand| BrandWithCategories {
            brand: brand.clone(),
            categories: categories_for_brand(categories, &brand.id),
        })
        .collect()
}

pub fn featured_products(products: &[Product]) -> Vec<&Product> {
    products.iter().filter(|product| product.featured).collect()
}

/// Newest `limit` products by creation time.
pub fn latest_products(products: &[Product], limit: usize) -> Vec<Product> {
    let mut latest = sort_by_field(products, SortField::CreatedAt, SortOrder::Desc);
    latest.truncate(limit);
    latest
}

/// Top `limit` products by enquiry count; ties keep table order.
pub fn most_enquired_products(products: &[Product], limit: usize) -> Vec<Product> {
    let mut popular = sort_by_field(products, SortField::EnquiryCount, SortOrder::Desc);
    popular.truncate(limit);
    popular
}

/// Distinct legacy category labels, sorted.
pub fn product_category_labels(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .filter_map(|product| product.category_label.clone())
        .filter(|label| !label.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn products_by_category_id<'a>(products: &'a [Product], category_id: &str) -> Vec<&'a Product> {
    get_by_foreign_key(products, ForeignKey::CategoryId, category_id)
}

pub fn products_by_brand_and_category<'a>(
    products: &'a [Product],
    brand_id: &str,
    category_id: &str,
) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|product| {
            product.brand_id == brand_id && product.category_id.as_deref() == Some(category_id)
        })
        .collect()
}

/// Category the product links to by id, if that category exists.
pub fn linked_category<'a>(product: &Product, categories: &'a [Category]) -> Option<&'a Category> {
    product
        .category_id
        .as_deref()
        .and_then(|id| get_by_id(categories, id))
}

/// Display name of a product's category.
///
/// The inline label wins when present; otherwise the linked category's name.
/// Empty when neither resolves.
pub fn product_category_name(product: &Product, categories: &[Category]) -> String {
    if let Some(label) = product.category_label.as_deref().filter(|l| !l.is_empty()) {
        return label.to_string();
    }
    match product.category_ref() {
        Some(CategoryRef::Id(id)) => get_by_id(categories, id)
            .map(|category| category.name.clone())
            .unwrap_or_default(),
        Some(CategoryRef::InlineName(name)) => name.to_string(),
        None => String::new(),
    }
}

pub fn product_category_display(product: &Product, categories: &[Category]) -> String {
    let name = product_category_name(product, categories);
    if name.is_empty() {
        UNCATEGORIZED.to_string()
    } else {
        name
    }
}

/// Builds the list-view projection. Unresolved brand or category fields are
/// left empty.
pub fn product_card(product: &Product, brands: &[Brand], categories: &[Category]) -> ProductCard {
    let brand = get_by_id(brands, &product.brand_id);
    let category = linked_category(product, categories);

    ProductCard {
        id: product.id.clone(),
        name: product.name.clone(),
        slug: product.slug.clone(),
        brand_name: brand.map(|b| b.name.clone()).unwrap_or_default(),
        brand_slug: brand.map(|b| b.slug.clone()).unwrap_or_default(),
        category_name: product_category_display(product, categories),
        category_slug: category.map(|c| c.slug.clone()).unwrap_or_default(),
        thumbnail: product.primary_image().unwrap_or_default().to_string(),
        price: product.price.filter(|price| !price.is_zero()),
        enquiry_count: product.enquiry_count,
    }
}

/// Narrows and orders `products` according to `filter`. Without a
/// `sort_by` the table order is kept.
pub fn apply_filter<T>(products: &[T], filter: &ProductFilter) -> Vec<T>
where
    T: CatalogRecord + AsRef<Product> + Clone,
{
    let needle = filter
        .search
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();

    let matching: Vec<T> = products
        .iter()
        .filter(|item| {
            let product: &Product = (*item).as_ref();
            let brand_ok = filter
                .brand_id
                .as_deref()
                .map_or(true, |brand_id| product.brand_id == brand_id);
            let category_ok = filter.category_id.as_deref().map_or(true, |category_id| {
                product.category_id.as_deref() == Some(category_id)
            });
            brand_ok && category_ok && matches_query(*item, &needle)
        })
        .cloned()
        .collect();

    match filter.sort_by {
        Some(sort) => sort_by_field(
            &matching,
            sort_field(sort),
            filter.sort_order.unwrap_or_default(),
        ),
        None => matching,
    }
}

fn sort_field(sort: ProductSort) -> SortField {
    match sort {
        ProductSort::Name => SortField::Name,
        ProductSort::Date => SortField::CreatedAt,
        ProductSort::Popularity => SortField::EnquiryCount,
    }
}

#[cfg(test)]
mod tests {
    use super::super::catalog_queries::fixtures::*;
    use super::*;
    use rust_decimal::Decimal;

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn brand_categories_follow_display_order() {
        let categories = vec![
            category("c32", "32", "w", 4),
            category("c20", "20", "w", 2),
            category("x1", "x1", "other", 1),
            category("c46", "46", "w", 8),
        ];
        let ordered: Vec<_> = categories_for_brand(&categories, "w")
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ordered, ["c20", "c32", "c46"]);
        assert_eq!(brand_category_count(&categories, "w"), 3);
    }

    #[test]
    fn brand_product_count_sums_categories() {
        let mut a = category("a", "a", "w", 1);
        a.product_count = 15;
        let mut b = category("b", "b", "w", 2);
        b.product_count = 12;
        let mut c = category("c", "c", "z", 1);
        c.product_count = 99;
        assert_eq!(brand_product_count(&[a, b, c], "w"), 27);
    }

    #[test]
    fn latest_and_most_enquired_respect_limit() {
        let mut older = product("old", "old", "b", 50);
        older.created_at = at(2);
        let mut newer = product("new", "new", "b", 5);
        newer.created_at = at(9);
        let mut middle = product("mid", "mid", "b", 50);
        middle.created_at = at(5);
        let products = vec![older, newer, middle];

        assert_eq!(names(&latest_products(&products, 2)), ["new", "mid"]);
        assert_eq!(names(&most_enquired_products(&products, 2)), ["old", "mid"]);
        assert_eq!(most_enquired_products(&products, 10).len(), 3);
    }

    #[test]
    fn labels_are_distinct_and_sorted() {
        let mut a = product("a", "a", "b", 0);
        a.category_label = Some("Oil Purifier".into());
        let mut b = product("b", "b", "b", 0);
        b.category_label = Some("Automation".into());
        let mut c = product("c", "c", "b", 0);
        c.category_label = Some("Oil Purifier".into());
        let d = product("d", "d", "b", 0);

        assert_eq!(
            product_category_labels(&[a, b, c, d]),
            ["Automation", "Oil Purifier"]
        );
    }

    #[test]
    fn category_name_prefers_label_then_linked_category() {
        let categories = vec![category("deutz-parts", "engine-parts", "deutz-3", 1)];

        let mut labelled = product("p1", "a", "deutz-3", 0);
        labelled.category_id = Some("deutz-parts".into());
        labelled.category_label = Some("Cylinder Heads".into());
        assert_eq!(product_category_name(&labelled, &categories), "Cylinder Heads");

        labelled.category_label = None;
        assert_eq!(product_category_name(&labelled, &categories), "ENGINE-PARTS");

        let bare = product("p2", "b", "deutz-3", 0);
        assert_eq!(product_category_name(&bare, &categories), "");
        assert_eq!(product_category_display(&bare, &categories), "Uncategorized");

        let mut dangling = product("p3", "c", "deutz-3", 0);
        dangling.category_id = Some("gone".into());
        assert_eq!(product_category_display(&dangling, &categories), "Uncategorized");
    }

    #[test]
    fn card_leaves_unresolved_fields_empty() {
        let brands = vec![brand("w", "wartsila")];
        let categories = vec![category("w32", "32", "w", 1)];

        let mut linked = product("p1", "radar", "w", 7);
        linked.category_id = Some("w32".into());
        linked.images = vec!["/a.jpg".into(), "/b.jpg".into()];
        linked.price = Some(Decimal::ZERO);
        let card = product_card(&linked, &brands, &categories);
        assert_eq!(card.brand_slug, "wartsila");
        assert_eq!(card.category_slug, "32");
        assert_eq!(card.thumbnail, "/a.jpg");
        assert_eq!(card.price, None);

        let orphan = product("p2", "orphan", "cat-1", 0);
        let card = product_card(&orphan, &brands, &categories);
        assert_eq!(card.brand_name, "");
        assert_eq!(card.category_name, "Uncategorized");
        assert_eq!(card.thumbnail, "");
    }

    #[test]
    fn filter_combines_criteria_and_sorts() {
        let mut a = product("a", "zeta-pump", "w", 5);
        a.category_id = Some("c1".into());
        let mut b = product("b", "alpha-pump", "w", 9);
        b.category_id = Some("c1".into());
        let mut c = product("c", "beta-pump", "m", 1);
        c.category_id = Some("c1".into());
        let mut d = product("d", "gamma-valve", "w", 3);
        d.category_id = Some("c2".into());
        let products = vec![a, b, c, d];

        let filter = ProductFilter {
            brand_id: Some("w".into()),
            category_id: Some("c1".into()),
            search: Some("PUMP".into()),
            sort_by: Some(ProductSort::Name),
            sort_order: None,
        };
        assert_eq!(names(&apply_filter(&products, &filter)), ["b", "a"]);

        let popular = ProductFilter {
            sort_by: Some(ProductSort::Popularity),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        };
        assert_eq!(names(&apply_filter(&products, &popular)), ["b", "a", "d", "c"]);

        assert_eq!(
            names(&apply_filter(&products, &ProductFilter::default())),
            ["a", "b", "c", "d"]
        );
    }
}
