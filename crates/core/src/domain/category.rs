use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

impl CategoryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Category {
    pub fn item_count(&self) -> usize {
        self.products.len()
    }

    /// Image shown on the category promotional card.
    pub fn cover_image(&self) -> Option<&str> {
        self.products.first().map(|product| product.image_url.as_str())
    }
}
