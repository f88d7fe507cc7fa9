//! Address step for digital delivery.
//!
//! Buyers give their in-game identity instead of a postal address. The
//! backend still requires a shipping address to compute the delivery step,
//! so a placeholder is generated from the identity.

use petvault_core::Email;
use serde::Deserialize;

use crate::medusa::{Address, Cart, Metadata, UpdateCartInput};

/// Metadata key holding the Roblox username.
pub const ROBLOX_USERNAME: &str = "roblox_username";

/// Metadata key holding the Discord username.
pub const DISCORD_USERNAME: &str = "discord_username";

const PLACEHOLDER_LAST_NAME: &str = "Customer";
const PLACEHOLDER_ADDRESS_LINE: &str = "Digital Goods - No Physical Shipping";
const PLACEHOLDER_POSTAL_CODE: &str = "00000";
const PLACEHOLDER_CITY: &str = "Online";

/// Address step form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressForm {
    pub roblox_username: String,
    pub discord_username: String,
    pub email: String,
    pub country_code: String,
    /// Checkbox; absent when unchecked.
    pub same_as_billing: Option<String>,
    #[serde(default)]
    pub billing_first_name: Option<String>,
    #[serde(default)]
    pub billing_last_name: Option<String>,
    #[serde(default)]
    pub billing_address_1: Option<String>,
    #[serde(default)]
    pub billing_city: Option<String>,
    #[serde(default)]
    pub billing_postal_code: Option<String>,
    #[serde(default)]
    pub billing_country_code: Option<String>,
}

/// Values pre-filled into the address form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressDefaults {
    pub roblox_username: String,
    pub discord_username: String,
    pub email: String,
    pub country_code: String,
}

impl AddressDefaults {
    /// Pre-fill from the cart, falling back to the signed-in customer's
    /// email when the cart has none.
    #[must_use]
    pub fn from_cart(cart: &Cart, customer_email: Option<&str>) -> Self {
        Self {
            roblox_username: cart.metadata_str(ROBLOX_USERNAME).unwrap_or_default().to_string(),
            discord_username: cart.metadata_str(DISCORD_USERNAME).unwrap_or_default().to_string(),
            email: cart
                .contact_email()
                .or(customer_email)
                .unwrap_or_default()
                .to_string(),
            country_code: cart
                .shipping_address
                .as_ref()
                .and_then(|a| a.country_code.clone())
                .unwrap_or_default(),
        }
    }
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl AddressForm {
    fn same_as_billing(&self) -> bool {
        self.same_as_billing.is_some()
    }

    /// Validate the submission and build the cart update.
    ///
    /// `allowed_countries` are the region's lowercase ISO codes.
    ///
    /// # Errors
    ///
    /// Returns a message for the first invalid field.
    pub fn to_update(&self, allowed_countries: &[String]) -> Result<UpdateCartInput, String> {
        let roblox = self.roblox_username.trim();
        if roblox.is_empty() {
            return Err("Roblox username is required".to_string());
        }
        let discord = self.discord_username.trim();
        if discord.is_empty() {
            return Err("Discord username is required".to_string());
        }

        let email = Email::parse(&self.email).map_err(|e| format!("Enter a valid email address ({e})"))?;

        let country_code = self.country_code.trim().to_ascii_lowercase();
        if !allowed_countries.iter().any(|c| c.eq_ignore_ascii_case(&country_code)) {
            return Err("Select a country served by this store".to_string());
        }

        let shipping = placeholder_address(roblox, &country_code);
        let billing = if self.same_as_billing() {
            shipping.clone()
        } else {
            self.billing_address()?
        };

        let mut metadata = Metadata::new();
        metadata.insert(ROBLOX_USERNAME.to_string(), roblox.into());
        metadata.insert(DISCORD_USERNAME.to_string(), discord.into());

        Ok(UpdateCartInput {
            email: Some(email.into_inner()),
            shipping_address: Some(shipping),
            billing_address: Some(billing),
            metadata: Some(metadata),
            ..UpdateCartInput::default()
        })
    }

    fn billing_address(&self) -> Result<Address, String> {
        let address = Address {
            first_name: non_blank(self.billing_first_name.as_ref()),
            last_name: non_blank(self.billing_last_name.as_ref()),
            address_1: non_blank(self.billing_address_1.as_ref()),
            city: non_blank(self.billing_city.as_ref()),
            postal_code: non_blank(self.billing_postal_code.as_ref()),
            country_code: non_blank(self.billing_country_code.as_ref())
                .map(|c| c.to_ascii_lowercase()),
            ..Address::default()
        };

        if address.address_1.is_none() || address.country_code.is_none() {
            return Err("Billing address and country are required".to_string());
        }
        Ok(address)
    }
}

/// The shipping address the backend sees for a digital order.
#[must_use]
pub fn placeholder_address(roblox_username: &str, country_code: &str) -> Address {
    let first_name = if roblox_username.trim().is_empty() {
        "Digital"
    } else {
        roblox_username.trim()
    };

    Address {
        first_name: Some(first_name.to_string()),
        last_name: Some(PLACEHOLDER_LAST_NAME.to_string()),
        address_1: Some(PLACEHOLDER_ADDRESS_LINE.to_string()),
        company: Some(String::new()),
        postal_code: Some(PLACEHOLDER_POSTAL_CODE.to_string()),
        city: Some(PLACEHOLDER_CITY.to_string()),
        province: Some(String::new()),
        phone: Some(String::new()),
        country_code: Some(country_code.to_string()),
        ..Address::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::checkout::tests::cart;

    fn form() -> AddressForm {
        AddressForm {
            roblox_username: " builderman ".to_string(),
            discord_username: "builder#0001".to_string(),
            email: "Buyer@Example.COM".to_string(),
            country_code: "US".to_string(),
            same_as_billing: Some("on".to_string()),
            ..AddressForm::default()
        }
    }

    fn countries() -> Vec<String> {
        vec!["us".to_string(), "ca".to_string()]
    }

    #[test]
    fn test_placeholder_uses_roblox_username() {
        let address = placeholder_address("builderman", "us");
        assert_eq!(address.first_name.as_deref(), Some("builderman"));
        assert_eq!(address.last_name.as_deref(), Some("Customer"));
        assert_eq!(
            address.address_1.as_deref(),
            Some("Digital Goods - No Physical Shipping")
        );
        assert_eq!(address.postal_code.as_deref(), Some("00000"));
        assert_eq!(address.city.as_deref(), Some("Online"));
    }

    #[test]
    fn test_placeholder_without_username() {
        let address = placeholder_address("  ", "us");
        assert_eq!(address.first_name.as_deref(), Some("Digital"));
    }

    #[test]
    fn test_update_carries_identity_and_mirrors_billing() {
        let update = form().to_update(&countries()).unwrap();
        assert_eq!(update.email.as_deref(), Some("Buyer@example.com"));
        assert_eq!(update.shipping_address, update.billing_address);
        let metadata = update.metadata.unwrap();
        assert_eq!(metadata.get(ROBLOX_USERNAME), Some(&json!("builderman")));
        assert_eq!(metadata.get(DISCORD_USERNAME), Some(&json!("builder#0001")));
        assert_eq!(
            update.shipping_address.unwrap().country_code.as_deref(),
            Some("us")
        );
    }

    #[test]
    fn test_update_rejects_missing_usernames() {
        let mut form = form();
        form.discord_username = "   ".to_string();
        assert_eq!(
            form.to_update(&countries()).unwrap_err(),
            "Discord username is required"
        );
    }

    #[test]
    fn test_update_rejects_country_outside_region() {
        let mut form = form();
        form.country_code = "de".to_string();
        assert!(form.to_update(&countries()).is_err());
    }

    #[test]
    fn test_separate_billing_address() {
        let mut form = form();
        form.same_as_billing = None;
        assert!(form.to_update(&countries()).is_err());

        form.billing_address_1 = Some("1 Main St".to_string());
        form.billing_country_code = Some("CA".to_string());
        let update = form.to_update(&countries()).unwrap();
        let billing = update.billing_address.unwrap();
        assert_eq!(billing.address_1.as_deref(), Some("1 Main St"));
        assert_eq!(billing.country_code.as_deref(), Some("ca"));
    }

    #[test]
    fn test_defaults_fall_back_to_customer_email() {
        let cart = cart(json!({ "metadata": { "roblox_username": "builderman" } }));
        let defaults = AddressDefaults::from_cart(&cart, Some("member@example.com"));
        assert_eq!(defaults.roblox_username, "builderman");
        assert_eq!(defaults.email, "member@example.com");
        assert!(defaults.discord_username.is_empty());
    }
}
