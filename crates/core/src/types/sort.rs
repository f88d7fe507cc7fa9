//! Sort keys for catalog listings.

use serde::{Deserialize, Serialize};

/// How the store listing orders products.
///
/// Appears in URLs as `?sortBy=created_at|price_asc|price_desc`. Anything
/// else falls back to [`SortKey::CreatedAt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Newest first.
    #[default]
    CreatedAt,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
}

impl SortKey {
    /// The query-string spelling of this key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
        }
    }

    /// Human-readable label for the sort dropdown.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreatedAt => "Latest Arrivals",
            Self::PriceAsc => "Price: Low -> High",
            Self::PriceDesc => "Price: High -> Low",
        }
    }

    /// All keys in dropdown order.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::CreatedAt, Self::PriceAsc, Self::PriceDesc]
    }

    /// Parse a query value, falling back to the default for unknown input.
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some("price_asc") => Self::PriceAsc,
            Some("price_desc") => Self::PriceDesc,
            _ => Self::CreatedAt,
        }
    }
}
