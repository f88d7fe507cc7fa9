//! Store listing: fetching, local sort and pagination.
//!
//! The backend cannot order by region-calculated price, so the listing
//! fetches every matching product in batches, sorts them here, and slices
//! out one page.

use std::cmp::Ordering;

use petvault_core::SortKey;
use tracing::instrument;

use crate::medusa::{MedusaClient, MedusaError, Product, ProductQuery};

/// Products per listing page.
pub const PAGE_SIZE: usize = 12;

/// Products requested per backend call.
pub const FETCH_LIMIT: u32 = 100;

/// Upper bound on products gathered for one listing.
pub const MAX_LISTED: usize = 1000;

/// One page of a listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number actually served.
    pub page: usize,
    /// Number of pages (at least 1).
    pub total_pages: usize,
    /// Total number of items across pages.
    pub total: usize,
}

impl<T> Page<T> {
    /// Previous page number, if any.
    #[must_use]
    pub const fn prev(&self) -> Option<usize> {
        if self.page > 1 { Some(self.page - 1) } else { None }
    }

    /// Next page number, if any.
    #[must_use]
    pub const fn next(&self) -> Option<usize> {
        if self.page < self.total_pages {
            Some(self.page + 1)
        } else {
            None
        }
    }
}

/// Fetch every product matching `query`, following the backend's `count`
/// across batches of [`FETCH_LIMIT`]. The query's own paging is ignored.
///
/// # Errors
///
/// Returns the first failing batch's error.
#[instrument(skip(client, query))]
pub async fn fetch_all(
    client: &MedusaClient,
    query: ProductQuery,
) -> Result<Vec<Product>, MedusaError> {
    let mut query = ProductQuery {
        limit: FETCH_LIMIT,
        offset: 0,
        ..query
    };
    let mut products = Vec::new();

    loop {
        let batch = client.list_products(&query).await?;
        let received = batch.products.len();
        let total = usize::try_from(batch.count).unwrap_or(usize::MAX);
        products.extend(batch.products);

        if received == 0 || products.len() >= total {
            break;
        }
        if products.len() >= MAX_LISTED {
            tracing::warn!(total, listed = products.len(), "Product listing truncated");
            break;
        }
        query.offset = query
            .offset
            .saturating_add(u32::try_from(received).unwrap_or(FETCH_LIMIT));
    }

    Ok(products)
}

fn compare_price(a: &Product, b: &Product) -> Ordering {
    // Unpriced products sort after priced ones in either direction
    match (a.cheapest_price(), b.cheapest_price()) {
        (Some(a), Some(b)) => a.amount.cmp(&b.amount),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort products in place.
pub fn sort_products(products: &mut [Product], sort: SortKey) {
    match sort {
        SortKey::CreatedAt => {
            products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        SortKey::PriceAsc => products.sort_by(compare_price),
        SortKey::PriceDesc => products.sort_by(|a, b| {
            match (a.cheapest_price().is_some(), b.cheapest_price().is_some()) {
                (true, true) => compare_price(b, a),
                _ => compare_price(a, b),
            }
        }),
    }
}

/// Slice one page out of `items`. Out-of-range pages clamp to the nearest
/// valid page.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: usize) -> Page<T> {
    let total = items.len();
    let total_pages = total.div_ceil(PAGE_SIZE).max(1);
    let page = page.clamp(1, total_pages);

    let items = items
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();

    Page {
        items,
        page,
        total_pages,
        total,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product(handle: &str, price: Option<f64>, created_at: &str) -> Product {
        let variants = price.map_or_else(Vec::new, |amount| {
            vec![json!({
                "id": format!("variant_{handle}"),
                "calculated_price": { "calculated_amount": amount, "currency_code": "usd" }
            })]
        });
        serde_json::from_value(json!({
            "id": format!("prod_{handle}"),
            "handle": handle,
            "title": handle,
            "created_at": created_at,
            "variants": variants
        }))
        .unwrap()
    }

    fn handles(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.handle.as_str()).collect()
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("frost", Some(12.0), "2025-01-03T00:00:00Z"),
            product("mystery", None, "2025-01-04T00:00:00Z"),
            product("shadow", Some(30.0), "2025-01-01T00:00:00Z"),
            product("bat", Some(4.5), "2025-01-02T00:00:00Z"),
        ]
    }

    #[test]
    fn test_sort_price_ascending() {
        let mut products = catalog();
        sort_products(&mut products, SortKey::PriceAsc);
        assert_eq!(handles(&products), ["bat", "frost", "shadow", "mystery"]);
    }

    #[test]
    fn test_sort_price_descending() {
        let mut products = catalog();
        sort_products(&mut products, SortKey::PriceDesc);
        assert_eq!(handles(&products), ["shadow", "frost", "bat", "mystery"]);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut products = catalog();
        sort_products(&mut products, SortKey::CreatedAt);
        assert_eq!(handles(&products), ["mystery", "frost", "bat", "shadow"]);
    }

    #[test]
    fn test_paginate_pages_of_twelve() {
        let items: Vec<u32> = (1..=30).collect();
        let page = paginate(items.clone(), 3);
        assert_eq!(page.items, (25..=30).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.next(), None);
        assert_eq!(page.prev(), Some(2));

        let first = paginate(items, 1);
        assert_eq!(first.items.len(), PAGE_SIZE);
        assert_eq!(first.next(), Some(2));
    }

    #[test]
    fn test_paginate_clamps_out_of_range() {
        let items: Vec<u32> = (1..=5).collect();
        assert_eq!(paginate(items.clone(), 0).page, 1);
        assert_eq!(paginate(items, 9).page, 1);
        assert_eq!(paginate(Vec::<u32>::new(), 2).total_pages, 1);
    }
}
