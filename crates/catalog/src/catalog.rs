use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use packbuilder_core::{DomainError, DomainResult, ProductId};

use crate::product::{PackSection, Product};

/// Catalog loading/validation failures.
///
/// All of these surface before the session starts; the storefront treats any
/// of them as "no products available" rather than aborting.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate product id: {0}")]
    DuplicateId(ProductId),

    #[error("invalid product record: {0}")]
    Invalid(#[from] DomainError),
}

/// The finite, ordered product sequence supplied once per session.
///
/// Order is the payload order; section grouping is a query, not a storage
/// concern. Lookup by id backs the storefront's per-product controls.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    /// An empty catalog ("no products available").
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from already-parsed records, validating them.
    pub fn from_products(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            validate_record(product)?;
            if index.insert(product.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
        }

        tracing::debug!(products = products.len(), "catalog loaded");
        Ok(Self { products, index })
    }

    /// Parse a catalog payload from raw JSON bytes.
    pub fn from_slice(payload: &[u8]) -> Result<Self, CatalogError> {
        Self::from_products(serde_json::from_slice(payload)?)
    }

    /// Parse a catalog payload from a reader.
    pub fn from_reader(reader: impl Read) -> Result<Self, CatalogError> {
        Self::from_products(serde_json::from_reader(reader)?)
    }

    /// One-shot read of the payload file at session start.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// All products, in payload order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.index.get(id).map(|&position| &self.products[position])
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.index.contains_key(id)
    }

    /// Products belonging to one pack section, in payload order.
    pub fn section(&self, section: PackSection) -> impl Iterator<Item = &Product> {
        self.products
            .iter()
            .filter(move |product| product.section == section)
    }
}

fn validate_record(product: &Product) -> DomainResult<()> {
    if product.id.as_str().trim().is_empty() {
        return Err(DomainError::invalid_id("product id cannot be empty"));
    }
    if product.name.trim().is_empty() {
        return Err(DomainError::validation(format!(
            "product {} has an empty name",
            product.id
        )));
    }
    Ok(())
}
