//! Type-safe price representation using decimal arithmetic.
//!
//! The commerce backend reports amounts in the currency's standard unit
//! (dollars, not cents) alongside a lowercase ISO 4217 code.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code, normalized to lowercase.
    pub currency_code: String,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub fn new(amount: Decimal, currency_code: &str) -> Self {
        Self {
            amount,
            currency_code: currency_code.to_ascii_lowercase(),
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub fn zero(currency_code: &str) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Format for display, e.g. `$19.99`, `€5.00`, `1,200 JPY`.
    ///
    /// Zero-decimal currencies are rendered without a fractional part.
    /// Unknown currencies fall back to the amount followed by the code.
    #[must_use]
    pub fn display(&self) -> String {
        let scale = if is_zero_decimal(&self.currency_code) { 0 } else { 2 };
        let rounded = self
            .amount
            .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = group_thousands(&format!("{:.*}", scale as usize, rounded.abs()));

        match symbol(&self.currency_code) {
            Some(sym) => format!("{sign}{sym}{digits}"),
            None => format!(
                "{sign}{digits} {}",
                self.currency_code.to_ascii_uppercase()
            ),
        }
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

fn symbol(currency_code: &str) -> Option<&'static str> {
    match currency_code {
        "usd" | "cad" | "aud" | "nzd" => Some("$"),
        "eur" => Some("€"),
        "gbp" => Some("£"),
        "brl" => Some("R$"),
        _ => None,
    }
}

fn is_zero_decimal(currency_code: &str) -> bool {
    matches!(currency_code, "jpy" | "krw" | "vnd" | "clp")
}

/// Insert `,` separators into the integer part of a formatted number.
fn group_thousands(formatted: &str) -> String {
    let (int_part, frac_part) = formatted
        .split_once('.')
        .map_or((formatted, None), |(i, f)| (i, Some(f)));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{grouped}.{frac}"),
        None => grouped,
    }
}
