use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::{
    handlers::common::{validate_input, CategoryListQuery, ListingQuery, SearchQuery},
    models::{BrandOption, BrandSummary, Category, EnrichedProduct, ProductCard, ProductFilter},
    services::{
        integrity::{check_integrity, IntegrityReport},
        navigation::NavigationMenu,
        CatalogRoute, NavigationView,
    },
    ApiResponse, ApiResult, AppState,
};

/// Values offered by the product filter controls.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub brands: Vec<BrandOption>,
    pub category_labels: Vec<String>,
}

/// Brand → category → product browsing routes
pub fn brand_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_brands))
        .route("/:brand_slug", get(get_brand))
        .route("/:brand_slug/:category_slug", get(get_brand_category))
        .route(
            "/:brand_slug/:category_slug/:product_slug",
            get(get_brand_product),
        )
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/latest", get(latest_products))
        .route("/most-enquired", get(most_enquired_products))
        .route("/featured", get(featured_products))
        .route("/labels", get(category_labels))
        .route("/filter-options", get(filter_options))
        .route("/search", get(search_products))
        .route("/:product_slug", get(get_product))
}

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/search", get(search_categories))
}

#[utoipa::path(
    get,
    path = "/api/v1/brands",
    responses(
        (status = 200, description = "Brands with category counts", body = ApiResponse<Vec<BrandSummary>>)
    ),
    tag = "brands"
)]
pub async fn list_brands(State(state): State<AppState>) -> ApiResult<Vec<BrandSummary>> {
    let brands = state.catalog().list_brands().await?;
    Ok(Json(ApiResponse::success(brands)))
}

async fn resolve(state: &AppState, route: CatalogRoute) -> ApiResult<NavigationView> {
    debug!(?route, "Resolving catalog route");
    let view = state.navigation().resolve(&route).await.into_result()?;
    Ok(Json(ApiResponse::success(view)))
}

#[utoipa::path(
    get,
    path = "/api/v1/brands/{brand_slug}",
    params(
        ("brand_slug" = String, Path, description = "Brand slug")
    ),
    responses(
        (status = 200, description = "Brand with its categories", body = ApiResponse<NavigationView>),
        (status = 404, description = "Brand not found", body = crate::errors::ErrorResponse)
    ),
    tag = "brands"
)]
pub async fn get_brand(
    State(state): State<AppState>,
    Path(brand_slug): Path<String>,
) -> ApiResult<NavigationView> {
    resolve(&state, CatalogRoute::brand(brand_slug)).await
}

#[utoipa::path(
    get,
    path = "/api/v1/brands/{brand_slug}/{category_slug}",
    params(
        ("brand_slug" = String, Path, description = "Brand slug"),
        ("category_slug" = String, Path, description = "Category slug, unique within the brand")
    ),
    responses(
        (status = 200, description = "Category with its products", body = ApiResponse<NavigationView>),
        (status = 404, description = "Brand or category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "brands"
)]
pub async fn get_brand_category(
    State(state): State<AppState>,
    Path((brand_slug, category_slug)): Path<(String, String)>,
) -> ApiResult<NavigationView> {
    resolve(&state, CatalogRoute::category(brand_slug, category_slug)).await
}

#[utoipa::path(
    get,
    path = "/api/v1/brands/{brand_slug}/{category_slug}/{product_slug}",
    params(
        ("brand_slug" = String, Path, description = "Brand slug"),
        ("category_slug" = String, Path, description = "Category slug, unique within the brand"),
        ("product_slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Product detail with related products", body = ApiResponse<NavigationView>),
        (status = 404, description = "Brand, category or product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "brands"
)]
pub async fn get_brand_product(
    State(state): State<AppState>,
    Path((brand_slug, category_slug, product_slug)): Path<(String, String, String)>,
) -> ApiResult<NavigationView> {
    resolve(
        &state,
        CatalogRoute::product(brand_slug, category_slug, product_slug),
    )
    .await
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductFilter),
    responses(
        (status = 200, description = "Filtered product cards", body = ApiResponse<Vec<ProductCard>>),
        (status = 400, description = "Invalid filter", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> ApiResult<Vec<ProductCard>> {
    let cards = state.catalog().list_products(&filter).await?;
    Ok(Json(ApiResponse::success(cards)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/latest",
    params(ListingQuery),
    responses(
        (status = 200, description = "Newest products first", body = ApiResponse<Vec<ProductCard>>)
    ),
    tag = "products"
)]
pub async fn latest_products(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> ApiResult<Vec<ProductCard>> {
    let limit = state.config.listing_limit(query.limit);
    let cards = state.catalog().latest_products(limit).await?;
    Ok(Json(ApiResponse::success(cards)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/most-enquired",
    params(ListingQuery),
    responses(
        (status = 200, description = "Products by enquiry count, highest first", body = ApiResponse<Vec<ProductCard>>)
    ),
    tag = "products"
)]
pub async fn most_enquired_products(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> ApiResult<Vec<ProductCard>> {
    let limit = state.config.listing_limit(query.limit);
    let cards = state.catalog().most_enquired_products(limit).await?;
    Ok(Json(ApiResponse::success(cards)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/featured",
    responses(
        (status = 200, description = "Featured products", body = ApiResponse<Vec<ProductCard>>)
    ),
    tag = "products"
)]
pub async fn featured_products(State(state): State<AppState>) -> ApiResult<Vec<ProductCard>> {
    let cards = state.catalog().featured_products().await?;
    Ok(Json(ApiResponse::success(cards)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/labels",
    responses(
        (status = 200, description = "Distinct legacy category labels, sorted", body = ApiResponse<Vec<String>>)
    ),
    tag = "products"
)]
pub async fn category_labels(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let labels = state.catalog().category_labels().await?;
    Ok(Json(ApiResponse::success(labels)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/filter-options",
    responses(
        (status = 200, description = "Brand and label choices for the product filter", body = ApiResponse<FilterOptions>)
    ),
    tag = "products"
)]
pub async fn filter_options(State(state): State<AppState>) -> ApiResult<FilterOptions> {
    let catalog = state.catalog();
    let options = FilterOptions {
        brands: catalog.brand_options().await?,
        category_labels: catalog.category_labels().await?,
    };
    Ok(Json(ApiResponse::success(options)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Products matching name, description or category label", body = ApiResponse<Vec<ProductCard>>),
        (status = 400, description = "Query too long", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<ProductCard>> {
    validate_input(&query)?;
    let cards = state.catalog().search_products(query.trimmed()).await?;
    Ok(Json(ApiResponse::success(cards)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{product_slug}",
    params(
        ("product_slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Product joined with its brand", body = ApiResponse<EnrichedProduct>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_slug): Path<String>,
) -> ApiResult<EnrichedProduct> {
    let product = state.catalog().get_product(&product_slug).await?;
    Ok(Json(ApiResponse::success(product)))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(CategoryListQuery),
    responses(
        (status = 200, description = "Categories, optionally scoped to a brand", body = ApiResponse<Vec<Category>>)
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<CategoryListQuery>,
) -> ApiResult<Vec<Category>> {
    let categories = state
        .catalog()
        .list_categories(query.brand_id.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(categories)))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Categories matching name or description", body = ApiResponse<Vec<Category>>),
        (status = 400, description = "Query too long", body = crate::errors::ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn search_categories(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<Category>> {
    validate_input(&query)?;
    let categories = state.catalog().search_categories(query.trimmed()).await?;
    Ok(Json(ApiResponse::success(categories)))
}

#[utoipa::path(
    get,
    path = "/api/v1/navigation/menu",
    responses(
        (status = 200, description = "Main navigation and per-brand category trees", body = ApiResponse<NavigationMenu>)
    ),
    tag = "navigation"
)]
pub async fn navigation_menu(State(state): State<AppState>) -> ApiResult<NavigationMenu> {
    let menu = state.navigation().menu().await?;
    Ok(Json(ApiResponse::success(menu)))
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/integrity",
    responses(
        (status = 200, description = "Consistency report for the loaded catalog", body = ApiResponse<IntegrityReport>)
    ),
    tag = "catalog"
)]
pub async fn catalog_integrity(State(state): State<AppState>) -> ApiResult<IntegrityReport> {
    Ok(Json(ApiResponse::success(check_integrity(&state.tables))))
}
