//! Catalog logic: variant resolution and the store listing.

pub mod listing;
pub mod variant;

pub use listing::{
    FETCH_LIMIT, MAX_LISTED, PAGE_SIZE, Page, fetch_all, paginate, sort_products,
};
pub use variant::{
    AddButton, OptionSelection, add_button, initial_selection, is_available, matched_variant,
};
