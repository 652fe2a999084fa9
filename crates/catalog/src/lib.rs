//! Catalog provider: the read-only product data consumed at session start.
//!
//! The catalog is loaded once from a JSON payload and never changes for the
//! lifetime of the session. The selection engine never sees this crate — it
//! refers to products only by their opaque ids.

pub mod catalog;
pub mod product;

pub use catalog::{Catalog, CatalogError};
pub use product::{IconKey, PackSection, Price, Product};
