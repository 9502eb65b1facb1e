// Catalog hierarchy: Brand -> Category -> Product
pub mod brand;
pub mod category;
pub mod product;

pub use brand::{Brand, BrandOption, BrandSummary};
pub use category::{BrandWithCategories, Category};
pub use product::{
    CategoryRef, EnrichedProduct, Product, ProductCard, ProductFilter, ProductSort, SortOrder,
    Specification,
};
