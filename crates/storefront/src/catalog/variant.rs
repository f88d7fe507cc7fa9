//! Variant resolution for product option pickers.
//!
//! A selection maps option ids to chosen values. It picks a variant only when
//! it equals that variant's complete option map; a partial selection matches
//! nothing.

use std::collections::BTreeMap;

use petvault_core::OptionId;

use crate::medusa::{Product, ProductVariant};

/// Query parameter carrying the selected variant id.
pub const VARIANT_PARAM: &str = "v_id";

/// Prefix of query parameters carrying individual option values.
pub const OPTION_PARAM_PREFIX: &str = "opt_";

/// Chosen value per option.
pub type OptionSelection = BTreeMap<OptionId, String>;

/// A variant's full option map.
#[must_use]
pub fn options_keymap(variant: &ProductVariant) -> OptionSelection {
    variant
        .options
        .iter()
        .filter_map(|opt| Some((opt.option_id.clone()?, opt.value.clone())))
        .collect()
}

/// The variant whose option map equals `selection` exactly.
#[must_use]
pub fn matched_variant<'a>(
    product: &'a Product,
    selection: &OptionSelection,
) -> Option<&'a ProductVariant> {
    if selection.is_empty() {
        return None;
    }
    product
        .variants
        .iter()
        .find(|variant| options_keymap(variant) == *selection)
}

/// Selection to start from when the page loads.
///
/// A `v_id` naming one of the product's variants seeds its options. A
/// product with a single variant is pre-seeded with it.
#[must_use]
pub fn initial_selection(product: &Product, variant_id: Option<&str>) -> OptionSelection {
    if let Some(variant) =
        variant_id.and_then(|id| product.variants.iter().find(|v| v.id.as_str() == id))
    {
        return options_keymap(variant);
    }

    match product.variants.as_slice() {
        [only] => options_keymap(only),
        _ => OptionSelection::new(),
    }
}

/// Apply `opt_<option id>=<value>` query parameters to a selection.
///
/// Parameters naming options the product does not have are ignored.
pub fn apply_option_params<'a, I>(product: &Product, selection: &mut OptionSelection, params: I)
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    for (key, value) in params {
        let Some(option_id) = key.strip_prefix(OPTION_PARAM_PREFIX) else {
            continue;
        };
        if product.options.iter().any(|o| o.id.as_str() == option_id) {
            selection.insert(OptionId::new(option_id), value.clone());
        }
    }
}

/// Query string that selects `value` for `option_id`, keeping the rest of
/// the selection.
#[must_use]
pub fn selection_query(selection: &OptionSelection, option_id: &OptionId, value: &str) -> String {
    let mut next = selection.clone();
    next.insert(option_id.clone(), value.to_string());

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (id, chosen) in &next {
        serializer.append_pair(&format!("{OPTION_PARAM_PREFIX}{id}"), chosen);
    }
    format!("?{}", serializer.finish())
}

/// Whether the variant can be bought now.
///
/// Untracked inventory and backorderable variants are always available;
/// otherwise tracked stock must be positive.
#[must_use]
pub fn is_available(variant: &ProductVariant) -> bool {
    if variant.manage_inventory != Some(true) {
        return true;
    }
    if variant.allow_backorder == Some(true) {
        return true;
    }
    variant.inventory_quantity.is_some_and(|qty| qty > 0)
}

/// State of the add-to-cart button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddButton {
    /// Button text.
    pub label: &'static str,
    /// Whether the button accepts clicks.
    pub enabled: bool,
}

/// Compute the add-to-cart button for the current selection.
///
/// `adding` is true while an add for this cart is still in flight.
#[must_use]
pub fn add_button(product: &Product, matched: Option<&ProductVariant>, adding: bool) -> AddButton {
    let available = matched.is_some_and(is_available);

    let label = match matched {
        None if product.variants.len() > 1 => "Select variant",
        Some(_) if !available => "Out of stock",
        _ => "Add to cart",
    };

    AddButton {
        label,
        enabled: available && !adding,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product() -> Product {
        serde_json::from_value(json!({
            "id": "prod_1",
            "handle": "shadow-dragon",
            "title": "Shadow Dragon",
            "options": [
                { "id": "opt_age", "title": "Age", "values": [{ "value": "Newborn" }, { "value": "Full Grown" }] },
                { "id": "opt_potion", "title": "Potion", "values": [{ "value": "Fly" }, { "value": "Ride" }] }
            ],
            "variants": [
                {
                    "id": "variant_nb_fly",
                    "manage_inventory": true,
                    "allow_backorder": false,
                    "inventory_quantity": 3,
                    "options": [
                        { "option_id": "opt_age", "value": "Newborn" },
                        { "option_id": "opt_potion", "value": "Fly" }
                    ]
                },
                {
                    "id": "variant_fg_ride",
                    "manage_inventory": true,
                    "allow_backorder": false,
                    "inventory_quantity": 0,
                    "options": [
                        { "option_id": "opt_age", "value": "Full Grown" },
                        { "option_id": "opt_potion", "value": "Ride" }
                    ]
                }
            ]
        }))
        .unwrap()
    }

    fn selection(pairs: &[(&str, &str)]) -> OptionSelection {
        pairs
            .iter()
            .map(|(k, v)| (OptionId::new(*k), (*v).to_string()))
            .collect()
    }

    fn variant(value: serde_json::Value) -> ProductVariant {
        let mut base = json!({ "id": "variant_x" });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), value.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn test_exact_selection_matches_one_variant() {
        let product = product();
        let matched = matched_variant(
            &product,
            &selection(&[("opt_age", "Newborn"), ("opt_potion", "Fly")]),
        );
        assert_eq!(matched.unwrap().id.as_str(), "variant_nb_fly");
    }

    #[test]
    fn test_partial_selection_matches_none() {
        let product = product();
        assert!(matched_variant(&product, &selection(&[("opt_age", "Newborn")])).is_none());
    }

    #[test]
    fn test_extra_key_matches_none() {
        let product = product();
        let sel = selection(&[
            ("opt_age", "Newborn"),
            ("opt_potion", "Fly"),
            ("opt_color", "Neon"),
        ]);
        assert!(matched_variant(&product, &sel).is_none());
    }

    #[test]
    fn test_single_variant_is_preseeded() {
        let mut product = product();
        product.variants.truncate(1);
        let sel = initial_selection(&product, None);
        assert_eq!(
            matched_variant(&product, &sel).unwrap().id.as_str(),
            "variant_nb_fly"
        );
    }

    #[test]
    fn test_variant_param_seeds_selection() {
        let product = product();
        let sel = initial_selection(&product, Some("variant_fg_ride"));
        assert_eq!(sel, selection(&[("opt_age", "Full Grown"), ("opt_potion", "Ride")]));

        assert!(initial_selection(&product, Some("variant_unknown")).is_empty());
    }

    #[test]
    fn test_option_params_override_selection() {
        let product = product();
        let mut sel = initial_selection(&product, Some("variant_nb_fly"));
        let params = [
            ("opt_opt_potion".to_string(), "Ride".to_string()),
            ("opt_missing".to_string(), "x".to_string()),
            ("page".to_string(), "2".to_string()),
        ];
        apply_option_params(&product, &mut sel, params.iter().map(|(k, v)| (k, v)));
        assert_eq!(sel, selection(&[("opt_age", "Newborn"), ("opt_potion", "Ride")]));
    }

    #[test]
    fn test_selection_query() {
        let sel = selection(&[("opt_age", "Newborn")]);
        let query = selection_query(&sel, &OptionId::new("opt_potion"), "Fly Ride");
        assert_eq!(query, "?opt_opt_age=Newborn&opt_opt_potion=Fly+Ride");
    }

    #[test]
    fn test_untracked_inventory_is_available() {
        let v = variant(json!({ "manage_inventory": false, "inventory_quantity": 0 }));
        assert!(is_available(&v));
    }

    #[test]
    fn test_backorder_is_available() {
        let v = variant(json!({ "manage_inventory": true, "allow_backorder": true, "inventory_quantity": 0 }));
        assert!(is_available(&v));
    }

    #[test]
    fn test_tracked_stock_availability() {
        let empty = variant(json!({ "manage_inventory": true, "allow_backorder": false, "inventory_quantity": 0 }));
        let one = variant(json!({ "manage_inventory": true, "allow_backorder": false, "inventory_quantity": 1 }));
        let unknown = variant(json!({ "manage_inventory": true, "allow_backorder": false }));
        assert!(!is_available(&empty));
        assert!(is_available(&one));
        assert!(!is_available(&unknown));
    }

    #[test]
    fn test_add_button_states() {
        let product = product();
        let in_stock = product.variants.first();
        let sold_out = product.variants.get(1);

        assert_eq!(
            add_button(&product, None, false),
            AddButton { label: "Select variant", enabled: false }
        );
        assert_eq!(
            add_button(&product, sold_out, false),
            AddButton { label: "Out of stock", enabled: false }
        );
        assert_eq!(
            add_button(&product, in_stock, false),
            AddButton { label: "Add to cart", enabled: true }
        );
        assert_eq!(
            add_button(&product, in_stock, true),
            AddButton { label: "Add to cart", enabled: false }
        );
    }
}
