use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Skyline Marine Catalog API",
        version = "0.2.1",
        description = r#"
# Skyline Marine Catalog API

Read-only browsing of the marine equipment catalog: brands, their engine
series categories and the spare parts offered under them.

## Hierarchy

Products are addressed as `/brands/{brand}/{category}/{product}`. Category
slugs are only unique within a brand (several brands carry an
`engine-parts` category), so a category is always resolved inside its brand.

## Prices

A missing or zero `price` means "price on request".

## Error Handling

Errors use a consistent body:

```json
{
  "error": "Not Found",
  "message": "Not found: Brand not found",
  "request_id": "6b0f8c1e-...",
  "timestamp": "2025-10-20T10:30:00Z"
}
```
        "#,
        contact(
            name = "Skyline Marine Automation",
            email = "dev@skylinemarine.co"
        ),
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "brands", description = "Brand → category → product browsing"),
        (name = "products", description = "Product listings and search"),
        (name = "categories", description = "Category listings and search"),
        (name = "navigation", description = "Site navigation menu"),
        (name = "catalog", description = "Catalog diagnostics")
    ),
    paths(
        crate::handlers::catalog::list_brands,
        crate::handlers::catalog::get_brand,
        crate::handlers::catalog::get_brand_category,
        crate::handlers::catalog::get_brand_product,

        crate::handlers::catalog::list_products,
        crate::handlers::catalog::latest_products,
        crate::handlers::catalog::most_enquired_products,
        crate::handlers::catalog::featured_products,
        crate::handlers::catalog::category_labels,
        crate::handlers::catalog::filter_options,
        crate::handlers::catalog::search_products,
        crate::handlers::catalog::get_product,

        crate::handlers::catalog::list_categories,
        crate::handlers::catalog::search_categories,

        crate::handlers::catalog::navigation_menu,
        crate::handlers::catalog::catalog_integrity,
    ),
    components(
        schemas(
            crate::ResponseMeta,

            crate::models::Brand,
            crate::models::BrandOption,
            crate::models::BrandSummary,
            crate::models::BrandWithCategories,
            crate::models::Category,
            crate::models::Product,
            crate::models::EnrichedProduct,
            crate::models::ProductCard,
            crate::models::ProductFilter,
            crate::models::ProductSort,
            crate::models::SortOrder,

            crate::services::navigation::NavigationView,
            crate::services::navigation::NotFoundKind,
            crate::services::navigation::Breadcrumb,
            crate::services::navigation::NavigationMenu,
            crate::services::navigation::MenuLink,
            crate::services::integrity::IntegrityReport,
            crate::services::integrity::DuplicateKey,
            crate::services::integrity::DanglingReference,
            crate::handlers::catalog::FilterOptions,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
