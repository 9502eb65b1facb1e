//! Route resolution for the brand → category → product hierarchy.
//!
//! Every resolution starts a fresh [`CatalogSession`] and recomputes the
//! whole chain from the route's slugs; nothing is cached between requests.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use crate::errors::ServiceError;
use crate::models::{
    Brand, BrandSummary, BrandWithCategories, Category, EnrichedProduct, ProductCard,
};
use crate::queries::{
    brand_summary, brands_with_categories, product_card, product_category_display,
};
use crate::repositories::{BrandRepository, CategoryRepository, ProductRepository};
use crate::stores::brand_store::BRAND_NOT_FOUND;
use crate::stores::category_store::CATEGORY_NOT_FOUND;
use crate::stores::product_store::PRODUCT_NOT_FOUND;
use crate::stores::{CatalogSession, StoreLatency};

const RELATED_PRODUCT_LIMIT: usize = 4;

/// Slugs addressed by a `/brands/...` path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogRoute {
    pub brand_slug: Option<String>,
    pub category_slug: Option<String>,
    pub product_slug: Option<String>,
}

impl CatalogRoute {
    pub fn brands() -> Self {
        Self::default()
    }

    pub fn brand(brand_slug: impl Into<String>) -> Self {
        Self {
            brand_slug: Some(brand_slug.into()),
            ..Self::default()
        }
    }

    pub fn category(brand_slug: impl Into<String>, category_slug: impl Into<String>) -> Self {
        Self {
            brand_slug: Some(brand_slug.into()),
            category_slug: Some(category_slug.into()),
            product_slug: None,
        }
    }

    pub fn product(
        brand_slug: impl Into<String>,
        category_slug: impl Into<String>,
        product_slug: impl Into<String>,
    ) -> Self {
        Self {
            brand_slug: Some(brand_slug.into()),
            category_slug: Some(category_slug.into()),
            product_slug: Some(product_slug.into()),
        }
    }

    /// Parses `/brands[/brand[/category[/product]]]`. Returns `None` for
    /// any other path shape.
    pub fn parse(path: &str) -> Option<Self> {
        let mut segments = path.trim_matches('/').split('/').filter(|s| !s.is_empty());
        if segments.next()? != "brands" {
            return None;
        }
        let rest: Vec<&str> = segments.collect();
        match rest.as_slice() {
            [] => Some(Self::brands()),
            [brand] => Some(Self::brand(*brand)),
            [brand, category] => Some(Self::category(*brand, *category)),
            [brand, category, product] => Some(Self::product(*brand, *category, *product)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Breadcrumb {
    pub label: String,
    /// Absent for the current page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl Breadcrumb {
    fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: Some(href.into()),
        }
    }

    fn current(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotFoundKind {
    Brand,
    Category,
    Product,
}

/// Result of resolving a [`CatalogRoute`]. The not-found terminal is a
/// regular view, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum NavigationView {
    #[serde(rename_all = "camelCase")]
    Brands {
        brands: Vec<BrandSummary>,
        breadcrumbs: Vec<Breadcrumb>,
    },
    #[serde(rename_all = "camelCase")]
    Brand {
        brand: BrandSummary,
        categories: Vec<Category>,
        breadcrumbs: Vec<Breadcrumb>,
    },
    #[serde(rename_all = "camelCase")]
    Category {
        brand: Brand,
        category: Category,
        products: Vec<ProductCard>,
        breadcrumbs: Vec<Breadcrumb>,
    },
    #[serde(rename_all = "camelCase")]
    Product {
        brand: Brand,
        category: Category,
        product: EnrichedProduct,
        category_name: String,
        related: Vec<ProductCard>,
        breadcrumbs: Vec<Breadcrumb>,
    },
    #[serde(rename_all = "camelCase")]
    NotFound { kind: NotFoundKind, message: String },
}

impl NavigationView {
    fn not_found(kind: NotFoundKind) -> Self {
        let message = match kind {
            NotFoundKind::Brand => BRAND_NOT_FOUND,
            NotFoundKind::Category => CATEGORY_NOT_FOUND,
            NotFoundKind::Product => PRODUCT_NOT_FOUND,
        };
        NavigationView::NotFound {
            kind,
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, NavigationView::NotFound { .. })
    }

    /// Converts the not-found terminal into [`ServiceError::NotFound`].
    pub fn into_result(self) -> Result<Self, ServiceError> {
        match self {
            NavigationView::NotFound { message, .. } => Err(ServiceError::NotFound(message)),
            view => Ok(view),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuLink {
    pub id: String,
    pub label: String,
    pub href: String,
    pub has_mega_menu: bool,
}

/// Site navigation: the fixed top-level links plus one category tree per
/// brand for the mega menu.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NavigationMenu {
    pub main: Vec<MenuLink>,
    pub brands: Vec<BrandWithCategories>,
}

const MAIN_NAVIGATION: [(&str, &str, &str, bool); 5] = [
    ("nav-home", "Home", "/", false),
    ("nav-spare-parts", "Marine Spare Parts", "/marine-spare-parts", true),
    ("nav-complete-engine", "Complete Engine", "/complete-engine", false),
    ("nav-generators", "Generators", "/generators", false),
    ("nav-turbochargers", "Turbochargers", "/turbochargers", false),
];

pub fn main_navigation() -> Vec<MenuLink> {
    MAIN_NAVIGATION
        .iter()
        .map(|(id, label, href, has_mega_menu)| MenuLink {
            id: (*id).to_string(),
            label: (*label).to_string(),
            href: (*href).to_string(),
            has_mega_menu: *has_mega_menu,
        })
        .collect()
}

#[derive(Clone)]
pub struct NavigationService {
    brands: Arc<dyn BrandRepository>,
    categories: Arc<dyn CategoryRepository>,
    products: Arc<dyn ProductRepository>,
    latency: StoreLatency,
}

impl NavigationService {
    pub fn new(
        brands: Arc<dyn BrandRepository>,
        categories: Arc<dyn CategoryRepository>,
        products: Arc<dyn ProductRepository>,
        latency: StoreLatency,
    ) -> Self {
        Self {
            brands,
            categories,
            products,
            latency,
        }
    }

    fn session(&self) -> CatalogSession {
        CatalogSession::new(
            self.brands.clone(),
            self.categories.clone(),
            self.products.clone(),
            self.latency,
        )
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, route: &CatalogRoute) -> NavigationView {
        let session = self.session();
        let view = match (
            route.brand_slug.as_deref(),
            route.category_slug.as_deref(),
            route.product_slug.as_deref(),
        ) {
            (Some(brand), Some(category), Some(product)) => {
                self.product_view(&session, brand, category, product).await
            }
            (Some(brand), Some(category), None) => {
                self.category_view(&session, brand, category).await
            }
            (Some(brand), None, _) => self.brand_view(&session, brand).await,
            _ => self.brands_view(&session).await,
        };
        if let NavigationView::NotFound { kind, .. } = &view {
            debug!(?kind, "Navigation ended in not-found view");
        }
        view
    }

    #[instrument(skip(self))]
    pub async fn menu(&self) -> Result<NavigationMenu, ServiceError> {
        let session = self.session();
        let (brands, categories) = tokio::join!(
            session.brands.fetch_brands(),
            session.categories.fetch_categories()
        );
        Ok(NavigationMenu {
            main: main_navigation(),
            brands: brands_with_categories(&brands, &categories),
        })
    }

    async fn brands_view(&self, session: &CatalogSession) -> NavigationView {
        let brands = session.brands.fetch_brands().await;
        let categories = session.categories.fetch_categories().await;
        NavigationView::Brands {
            brands: brands
                .iter()
                .map(|brand| brand_summary(brand, &categories))
                .collect(),
            breadcrumbs: vec![Breadcrumb::link("Home", "/"), Breadcrumb::current("Brands")],
        }
    }

    async fn brand_view(&self, session: &CatalogSession, brand_slug: &str) -> NavigationView {
        let Some(brand) = session.brands.fetch_brand_by_slug(brand_slug).await else {
            return NavigationView::not_found(NotFoundKind::Brand);
        };
        let categories = session.categories.fetch_categories_by_brand(&brand.id).await;
        let breadcrumbs = vec![
            Breadcrumb::link("Home", "/"),
            Breadcrumb::link("Brands", "/brands"),
            Breadcrumb::current(brand.name.clone()),
        ];
        NavigationView::Brand {
            brand: brand_summary(&brand, &categories),
            categories,
            breadcrumbs,
        }
    }

    async fn category_view(
        &self,
        session: &CatalogSession,
        brand_slug: &str,
        category_slug: &str,
    ) -> NavigationView {
        let Some(brand) = session.brands.fetch_brand_by_slug(brand_slug).await else {
            return NavigationView::not_found(NotFoundKind::Brand);
        };
        let Some(category) = session
            .categories
            .fetch_category_by_slug(&brand.id, category_slug)
            .await
        else {
            return NavigationView::not_found(NotFoundKind::Category);
        };

        let products = session.products.fetch_products_by_category(&category.id).await;
        let all_categories = session.categories.fetch_categories().await;
        let brands = session.brands.fetch_brands().await;
        let cards = products
            .iter()
            .map(|p| product_card(&p.product, &brands, &all_categories))
            .collect();

        let breadcrumbs = vec![
            Breadcrumb::link("Home", "/"),
            Breadcrumb::link("Brands", "/brands"),
            Breadcrumb::link(brand.name.clone(), format!("/brands/{}", brand.slug)),
            Breadcrumb::current(category.name.clone()),
        ];
        NavigationView::Category {
            brand,
            category,
            products: cards,
            breadcrumbs,
        }
    }

    async fn product_view(
        &self,
        session: &CatalogSession,
        brand_slug: &str,
        category_slug: &str,
        product_slug: &str,
    ) -> NavigationView {
        let Some(brand) = session.brands.fetch_brand_by_slug(brand_slug).await else {
            return NavigationView::not_found(NotFoundKind::Brand);
        };
        let Some(category) = session
            .categories
            .fetch_category_by_slug(&brand.id, category_slug)
            .await
        else {
            return NavigationView::not_found(NotFoundKind::Category);
        };
        let Some(product) = session
            .products
            .fetch_product_by_slug(&brand.slug, product_slug)
            .await
        else {
            return NavigationView::not_found(NotFoundKind::Product);
        };

        let all_categories = session.categories.fetch_categories().await;
        let brands = session.brands.fetch_brands().await;
        let related = session
            .products
            .fetch_products_by_category(&category.id)
            .await
            .iter()
            .filter(|p| p.product.id != product.product.id)
            .take(RELATED_PRODUCT_LIMIT)
            .map(|p| product_card(&p.product, &brands, &all_categories))
            .collect();
        let category_name = product_category_display(&product.product, &all_categories);

        let breadcrumbs = vec![
            Breadcrumb::link("Home", "/"),
            Breadcrumb::link("Brands", "/brands"),
            Breadcrumb::link(brand.name.clone(), format!("/brands/{}", brand.slug)),
            Breadcrumb::link(
                category.name.clone(),
                format!("/brands/{}/{}", brand.slug, category.slug),
            ),
            Breadcrumb::current(product.product.name.clone()),
        ];
        NavigationView::Product {
            brand,
            category,
            product,
            category_name,
            related,
            breadcrumbs,
        }
    }
}
