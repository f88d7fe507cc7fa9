//! Newtype IDs for type-safe entity references.
//!
//! The commerce backend hands out opaque, prefixed string identifiers
//! (`cart_01H...`, `variant_01H...`). Use the `define_id!` macro to create
//! type-safe wrappers that prevent accidentally mixing IDs from different
//! entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use petvault_core::define_id;
/// define_id!(WidgetId);
/// define_id!(GadgetId);
///
/// let widget = WidgetId::new("widget_01");
/// let gadget = GadgetId::new("widget_01");
///
/// // These are different types, so this won't compile:
/// // let _: WidgetId = gadget;
/// assert_eq!(widget.as_str(), gadget.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Commerce backend entity IDs
define_id!(CartId);
define_id!(LineItemId);
define_id!(ProductId);
define_id!(VariantId);
define_id!(OptionId);
define_id!(RegionId);
define_id!(OrderId);
define_id!(CustomerId);
define_id!(ShippingOptionId);
define_id!(PaymentCollectionId);
define_id!(PaymentSessionId);
define_id!(PromotionId);
define_id!(CategoryId);
define_id!(CollectionId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_raw_id() {
        let id = CartId::new("cart_01HZX");
        assert_eq!(id.to_string(), "cart_01HZX");
    }

    #[test]
    fn test_serde_transparent() {
        let id = VariantId::new("variant_123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"variant_123\"");

        let parsed: VariantId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_conversions() {
        let id: LineItemId = "item_1".into();
        let raw: String = id.clone().into();
        assert_eq!(raw, "item_1");
        assert_eq!(id.as_ref(), "item_1");
    }
}
