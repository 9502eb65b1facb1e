//! Static catalog tables and the seed document they are loaded from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::{Brand, Category, Product};

const EMBEDDED_SEED: &str = include_str!("../data/catalog.json");

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("failed to read catalog seed {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog seed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The three flat entity tables. Row order is the authored order and is
/// significant: lookups return the first match and unsorted listings keep it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTables {
    #[serde(default)]
    pub brands: Vec<Brand>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl CatalogTables {
    pub fn new(brands: Vec<Brand>, categories: Vec<Category>, products: Vec<Product>) -> Self {
        Self {
            brands,
            categories,
            products,
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogLoadError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogLoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tables = Self::from_json_str(&raw)?;
        info!(
            path = %path.display(),
            brands = tables.brands.len(),
            categories = tables.categories.len(),
            products = tables.products.len(),
            "Loaded catalog seed"
        );
        Ok(tables)
    }

    /// The seed compiled into the binary.
    pub fn embedded() -> Result<Self, CatalogLoadError> {
        Self::from_json_str(EMBEDDED_SEED)
    }

    /// Loads `path` when given, otherwise the embedded seed.
    pub fn load(path: Option<&str>) -> Result<Self, CatalogLoadError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::embedded(),
        }
    }
}
