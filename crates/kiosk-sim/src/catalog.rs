//! # In-Memory Product Catalog
//!
//! Barcode → product lookup, seeded from JSON.
//!
//! ## Seed Format
//! ```json
//! [
//!   { "barcode": "012345", "description": "Cheese sticks", "price": 1520 },
//!   { "barcode": "067890", "description": "Chicken nuggets", "price": 899 }
//! ]
//! ```
//! Prices are in cents.

use kiosk_core::validation::validate_product;
use kiosk_core::{Barcode, CheckoutError, CheckoutResult, PricedProduct, ProductCatalog};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: HashMap<Barcode, PricedProduct>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product, returning the previous entry.
    pub fn insert(&mut self, product: PricedProduct) -> Option<PricedProduct> {
        self.products.insert(product.barcode.clone(), product)
    }

    /// Replaces the whole catalog.
    pub fn populate(&mut self, products: impl IntoIterator<Item = PricedProduct>) {
        self.products.clear();
        for product in products {
            self.insert(product);
        }
    }

    pub fn remove(&mut self, barcode: &Barcode) -> Option<PricedProduct> {
        self.products.remove(barcode)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Builds a catalog from a JSON array of products.
    ///
    /// ## Errors
    /// - `CatalogSeed`: malformed JSON or an unparseable barcode
    /// - `Checkout(InvalidInput)`: a product fails validation (blank
    ///   description, negative price)
    pub fn from_json(json: &str) -> SimResult<Self> {
        let products: Vec<PricedProduct> = serde_json::from_str(json)?;
        for product in &products {
            validate_product(product).map_err(CheckoutError::from)?;
        }

        let mut catalog = Self::new();
        catalog.populate(products);
        info!(products = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }

    /// Reads a JSON seed file.
    pub fn from_json_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SimError::CatalogSeed(e.to_string()))?;
        Self::from_json(&contents)
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn lookup(&self, barcode: &Barcode) -> CheckoutResult<PricedProduct> {
        self.products
            .get(barcode)
            .cloned()
            .ok_or_else(|| CheckoutError::NotFound(format!("product with barcode {}", barcode)))
    }
}
