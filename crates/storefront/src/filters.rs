//! Custom Askama template filters.
//!
//! Template structs that use these must have `crate::filters` in scope as
//! `filters`.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Image shown when a product or line item has no usable image.
pub const PLACEHOLDER_IMAGE: &str = "/static/img/placeholder.svg";

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the image URL, or the placeholder when it is blank or not an
/// absolute http(s) URL or site path.
///
/// Usage in templates: `{{ product.thumbnail|image_src }}`
#[askama::filter_fn]
pub fn image_src(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(resolve_image(&value.to_string()))
}

/// Plain-function form of [`image_src`].
#[must_use]
pub fn resolve_image(raw: &str) -> String {
    let raw = raw.trim();
    let usable = raw.starts_with("https://")
        || raw.starts_with("http://")
        || (raw.starts_with('/') && !raw.starts_with("//"));

    if usable {
        raw.to_string()
    } else {
        PLACEHOLDER_IMAGE.to_string()
    }
}
