//! Cache types for catalog responses.

use crate::medusa::types::{Category, Collection, Product, ProductList, Region};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Regions(Vec<Region>),
    Product(Box<Product>),
    Products(ProductList),
    Categories(Vec<Category>),
    Collections(Vec<Collection>),
}
