//! Diorama Catalog - Static id <-> resource lookup tables
//!
//! Catalogs are built once at startup from configuration and are read-only
//! afterwards, so they can be shared freely between the synchronous
//! reconciliation pass and the asynchronous image loader.

mod catalog;
mod file;
mod types;

pub use catalog::{Catalog, CatalogEntry};
pub use file::{CatalogFile, Catalogs};
pub use types::{Material, MaterialCatalog, Prefab, PrefabCatalog};
