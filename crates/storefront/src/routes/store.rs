//! Store listing route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use petvault_core::{CategoryId, CollectionId, SortKey};
use serde::Deserialize;
use tracing::instrument;

use super::Shell;
use crate::catalog::{Page, fetch_all, paginate, sort_products};
use crate::error::Result;
use crate::filters;
use crate::medusa::{Category, Collection, Product, ProductQuery};
use crate::middleware::{CspNonce, CurrentRegion, OptionalCustomer};
use crate::state::AppState;

/// Product card display data.
#[derive(Clone, Debug)]
pub struct ProductCardView {
    pub handle: String,
    pub title: String,
    pub thumbnail: String,
    pub price: Option<String>,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            thumbnail: product
                .thumbnail
                .clone()
                .or_else(|| product.images.first().map(|img| img.url.clone()))
                .unwrap_or_default(),
            price: product.cheapest_price().map(|p| p.display()),
        }
    }
}

/// Sort dropdown entry.
#[derive(Clone, Debug)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Category or collection filter tab.
#[derive(Clone, Debug)]
pub struct FilterLink {
    pub name: String,
    pub href: String,
    pub selected: bool,
}

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct StoreQuery {
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub page: Option<usize>,
    pub category: Option<String>,
    pub collection: Option<String>,
}

impl StoreQuery {
    fn sort(&self) -> SortKey {
        SortKey::parse_or_default(self.sort_by.as_deref())
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    fn collection(&self) -> Option<&str> {
        self.collection.as_deref().filter(|c| !c.is_empty())
    }
}

/// Store listing template.
#[derive(Template, WebTemplate)]
#[template(path = "store/index.html")]
pub struct StoreIndexTemplate {
    pub shell: Shell,
    pub products: Page<ProductCardView>,
    pub sort_options: Vec<SortOption>,
    pub categories: Vec<FilterLink>,
    pub collections: Vec<FilterLink>,
    pub category: String,
    pub collection: String,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

/// Link to the listing with the given sort, filters and page.
fn listing_href(
    cc: &str,
    sort: SortKey,
    category: Option<&str>,
    collection: Option<&str>,
    page: Option<usize>,
) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    serializer.append_pair("sortBy", sort.as_str());
    if let Some(category) = category {
        serializer.append_pair("category", category);
    }
    if let Some(collection) = collection {
        serializer.append_pair("collection", collection);
    }
    if let Some(page) = page {
        serializer.append_pair("page", &page.to_string());
    }
    format!("/{cc}/store?{}", serializer.finish())
}

fn sort_options(current: SortKey) -> Vec<SortOption> {
    SortKey::all()
        .into_iter()
        .map(|key| SortOption {
            value: key.as_str(),
            label: key.label(),
            selected: key == current,
        })
        .collect()
}

/// Category tabs, led by "All pets". Switching category keeps the
/// collection filter and resets to page 1.
fn category_links(cc: &str, query: &StoreQuery, categories: &[Category]) -> Vec<FilterLink> {
    let sort = query.sort();
    let all = FilterLink {
        name: "All pets".to_string(),
        href: listing_href(cc, sort, None, query.collection(), None),
        selected: query.category().is_none(),
    };

    std::iter::once(all)
        .chain(categories.iter().map(|c| FilterLink {
            name: c.name.clone(),
            href: listing_href(cc, sort, Some(c.id.as_str()), query.collection(), None),
            selected: query.category() == Some(c.id.as_str()),
        }))
        .collect()
}

/// Collection tabs, led by "All collections". Empty when the backend has
/// no collections.
fn collection_links(cc: &str, query: &StoreQuery, collections: &[Collection]) -> Vec<FilterLink> {
    if collections.is_empty() {
        return Vec::new();
    }

    let sort = query.sort();
    let all = FilterLink {
        name: "All collections".to_string(),
        href: listing_href(cc, sort, query.category(), None, None),
        selected: query.collection().is_none(),
    };

    std::iter::once(all)
        .chain(collections.iter().map(|c| FilterLink {
            name: c.title.clone(),
            href: listing_href(cc, sort, query.category(), Some(c.id.as_str()), None),
            selected: query.collection() == Some(c.id.as_str()),
        }))
        .collect()
}

/// Display the product listing.
#[instrument(skip(state, region, nonce, customer), fields(country = %region.country_code))]
pub async fn index(
    State(state): State<AppState>,
    region: CurrentRegion,
    nonce: CspNonce,
    OptionalCustomer(customer): OptionalCustomer,
    Query(query): Query<StoreQuery>,
) -> Result<StoreIndexTemplate> {
    let sort = query.sort();
    let product_query = ProductQuery {
        region_id: Some(region.region.id.clone()),
        category_id: query.category().map(CategoryId::new),
        collection_id: query.collection().map(CollectionId::new),
        ..ProductQuery::default()
    };

    let mut products = fetch_all(state.medusa(), product_query).await?;
    sort_products(&mut products, sort);
    let cards = products.iter().map(ProductCardView::from).collect();

    // The listing still works without the filter tabs
    let categories = state.medusa().list_categories().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load categories");
        Vec::new()
    });
    let collections = state.medusa().list_collections().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load collections");
        Vec::new()
    });

    let cc = region.country_code.as_str();
    let page = paginate(cards, query.page.unwrap_or(1));
    let href = |n: usize| listing_href(cc, sort, query.category(), query.collection(), Some(n));

    Ok(StoreIndexTemplate {
        shell: Shell::new(&region, nonce, customer.is_some()),
        prev_href: page.prev().map(&href),
        next_href: page.next().map(&href),
        products: page,
        sort_options: sort_options(sort),
        categories: category_links(cc, &query, &categories),
        collections: collection_links(cc, &query, &collections),
        category: query.category().unwrap_or_default().to_string(),
        collection: query.collection().unwrap_or_default().to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_card_falls_back_to_first_image() {
        let product: Product = serde_json::from_value(json!({
            "id": "prod_1",
            "handle": "frost-owl",
            "title": "Frost Owl",
            "images": [{ "url": "https://cdn.petvault.gg/owl.webp" }],
            "variants": [{
                "id": "variant_1",
                "calculated_price": { "calculated_amount": 4.5, "currency_code": "usd" }
            }]
        }))
        .unwrap();

        let card = ProductCardView::from(&product);
        assert_eq!(card.thumbnail, "https://cdn.petvault.gg/owl.webp");
        assert_eq!(card.price.as_deref(), Some("$4.50"));
    }

    #[test]
    fn test_unknown_sort_marks_latest_selected() {
        let query = StoreQuery {
            sort_by: Some("popularity".to_string()),
            ..StoreQuery::default()
        };
        let options = sort_options(query.sort());
        assert!(options[0].selected);
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
    }

    #[test]
    fn test_listing_href_keeps_sort_and_filters() {
        assert_eq!(
            listing_href("us", SortKey::PriceAsc, Some("pcat_dragons"), Some("pcol_winter"), Some(2)),
            "/us/store?sortBy=price_asc&category=pcat_dragons&collection=pcol_winter&page=2"
        );
        assert_eq!(
            listing_href("ca", SortKey::CreatedAt, None, None, Some(1)),
            "/ca/store?sortBy=created_at&page=1"
        );
    }

    #[test]
    fn test_collection_tabs_keep_category() {
        let query = StoreQuery {
            sort_by: Some("price_desc".to_string()),
            category: Some("pcat_dragons".to_string()),
            collection: Some("pcol_winter".to_string()),
            ..StoreQuery::default()
        };
        let collections: Vec<Collection> = serde_json::from_value(json!([
            { "id": "pcol_winter", "title": "Winter Drop" },
            { "id": "pcol_legend", "title": "Legendaries" }
        ]))
        .unwrap();

        let links = collection_links("us", &query, &collections);

        assert_eq!(links.len(), 3);
        assert_eq!(links[0].name, "All collections");
        assert_eq!(links[0].href, "/us/store?sortBy=price_desc&category=pcat_dragons");
        assert!(!links[0].selected);
        assert!(links[1].selected);
        assert_eq!(
            links[2].href,
            "/us/store?sortBy=price_desc&category=pcat_dragons&collection=pcol_legend"
        );
    }

    #[test]
    fn test_no_collection_tabs_without_collections() {
        assert!(collection_links("us", &StoreQuery::default(), &[]).is_empty());
    }

    #[test]
    fn test_category_tabs_lead_with_all() {
        let categories: Vec<Category> =
            serde_json::from_value(json!([{ "id": "pcat_dragons", "name": "Dragons" }])).unwrap();

        let links = category_links("us", &StoreQuery::default(), &categories);

        assert_eq!(links[0].name, "All pets");
        assert!(links[0].selected);
        assert_eq!(links[1].href, "/us/store?sortBy=created_at&category=pcat_dragons");
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let query = StoreQuery {
            category: Some(String::new()),
            collection: Some(String::new()),
            ..StoreQuery::default()
        };
        assert_eq!(query.category(), None);
        assert_eq!(query.collection(), None);
    }
}
