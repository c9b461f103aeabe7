//! Read-only catalog store.
//!
//! A [`Catalog`] is built once at startup (either from the built-in dataset or
//! a TOML file) and shared behind an `Arc` for the lifetime of the process.

mod dataset;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::category::{Category, CategoryId};

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₦";

/// Every category gets one row in the interactive category list, which the
/// provider caps at ten rows.
pub const MAX_CATEGORIES: usize = 10;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("catalog must contain at least one category")]
    Empty,
    #[error("catalog has {count} categories; at most {max} are supported")]
    TooManyCategories { count: usize, max: usize },
    #[error("invalid category id `{0}`")]
    InvalidCategoryId(String),
    #[error("duplicate category id `{0}`")]
    DuplicateCategory(String),
    #[error("duplicate product id `{product}` in category `{category}`")]
    DuplicateProduct { category: String, product: String },
    #[error("product `{product}` in category `{category}` is invalid: {reason}")]
    InvalidProduct { category: String, product: String, reason: &'static str },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    currency_symbol: String,
    categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    currency_symbol: Option<String>,
    #[serde(default)]
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new(
        currency_symbol: impl Into<String>,
        categories: Vec<Category>,
    ) -> Result<Self, CatalogError> {
        validate(&categories)?;
        Ok(Self { currency_symbol: currency_symbol.into(), categories })
    }

    /// The catalog shipped with the binary.
    pub fn builtin() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_owned(),
            categories: dataset::categories(),
        }
    }

    /// Loads `path` when given, otherwise falls back to [`Catalog::builtin`].
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        let file = toml::from_str::<CatalogFile>(&raw)
            .map_err(|source| CatalogError::ParseFile { path: path.to_path_buf(), source })?;

        Self::new(
            file.currency_symbol.unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_owned()),
            file.categories,
        )
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn product_count(&self) -> usize {
        self.categories.iter().map(Category::item_count).sum()
    }

    pub fn find(&self, id: &CategoryId) -> Option<&Category> {
        self.find_id(id.as_str())
    }

    pub fn find_id(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id.as_str() == id)
    }

    /// 1-based lookup in stored order.
    pub fn by_position(&self, position: usize) -> Option<&Category> {
        position.checked_sub(1).and_then(|index| self.categories.get(index))
    }

    /// First category (in stored order) whose name or id contains `query`,
    /// ignoring case.
    pub fn search(&self, query: &str) -> Option<&Category> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        self.categories.iter().find(|category| {
            category.name.to_lowercase().contains(&needle)
                || category.id.as_str().to_lowercase().contains(&needle)
        })
    }
}

fn validate(categories: &[Category]) -> Result<(), CatalogError> {
    if categories.is_empty() {
        return Err(CatalogError::Empty);
    }
    if categories.len() > MAX_CATEGORIES {
        return Err(CatalogError::TooManyCategories {
            count: categories.len(),
            max: MAX_CATEGORIES,
        });
    }

    let mut category_ids = HashSet::new();
    for category in categories {
        let id = category.id.as_str();
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(CatalogError::InvalidCategoryId(id.to_owned()));
        }
        if !category_ids.insert(id) {
            return Err(CatalogError::DuplicateCategory(id.to_owned()));
        }

        let mut product_ids = HashSet::new();
        for product in &category.products {
            let invalid = |reason| CatalogError::InvalidProduct {
                category: id.to_owned(),
                product: product.id.0.clone(),
                reason,
            };

            if !product_ids.insert(product.id.0.as_str()) {
                return Err(CatalogError::DuplicateProduct {
                    category: id.to_owned(),
                    product: product.id.0.clone(),
                });
            }
            if product.price == 0 {
                return Err(invalid("price must be positive"));
            }
            if product.colors.is_empty() {
                return Err(invalid("at least one color is required"));
            }
            if product.image_url.trim().is_empty() {
                return Err(invalid("image reference is required"));
            }
        }
    }

    Ok(())
}
