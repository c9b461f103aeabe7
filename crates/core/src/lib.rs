//! Aseobi core: catalog domain, configuration, and the shared error taxonomy.

pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod signature;

pub use catalog::{Catalog, CatalogError};
pub use domain::category::{Category, CategoryId};
pub use domain::product::{Product, ProductId};
pub use errors::{ApplicationError, InterfaceError};
