//! # Currency Formatting
//!
//! The display side of money: turns a [`Money`] total into the string the
//! cart screen shows.
//!
//! ```text
//! Money::from_cents(1234567)
//!      │
//!      ▼
//! CurrencyFormat::default().format(..)   (Brazilian real)
//!      │
//!      ▼
//! "R$12.345,67"
//! ```
//!
//! The formatter sits behind the [`FormatCurrency`] trait so an app can plug
//! in a locale-aware implementation without touching the cart store.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Renders a money amount for display.
pub trait FormatCurrency: Send + Sync {
    /// Formats `amount` as a localized currency string.
    fn format(&self, amount: Money) -> String;
}

/// Symbol-and-separators currency formatter.
///
/// ## Example
/// ```rust
/// use marketplace_core::{CurrencyFormat, FormatCurrency, Money};
///
/// let brl = CurrencyFormat::default();
/// assert_eq!(brl.format(Money::from_cents(1250)), "R$12,50");
///
/// let usd = CurrencyFormat::usd();
/// assert_eq!(usd.format(Money::from_cents(123456)), "$1,234.56");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    /// Currency symbol placed before the amount.
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Separator between major and minor units.
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,

    /// Digit-group separator for the major units, if any.
    #[serde(default = "default_thousands_separator")]
    pub thousands_separator: Option<char>,

    /// Put a space between the symbol and the digits.
    #[serde(default)]
    pub symbol_spacing: bool,
}

fn default_symbol() -> String {
    "R$".to_string()
}

fn default_decimal_separator() -> char {
    ','
}

fn default_thousands_separator() -> Option<char> {
    Some('.')
}

impl Default for CurrencyFormat {
    /// Brazilian real, matching the storefront's `R$0,00` empty-cart label.
    fn default() -> Self {
        CurrencyFormat {
            symbol: default_symbol(),
            decimal_separator: default_decimal_separator(),
            thousands_separator: default_thousands_separator(),
            symbol_spacing: false,
        }
    }
}

impl CurrencyFormat {
    /// US dollar formatting (`$1,234.56`).
    pub fn usd() -> Self {
        CurrencyFormat {
            symbol: "$".to_string(),
            decimal_separator: '.',
            thousands_separator: Some(','),
            symbol_spacing: false,
        }
    }

    fn group_digits(&self, major: u64) -> String {
        let digits = major.to_string();
        let Some(separator) = self.thousands_separator else {
            return digits;
        };

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(separator);
            }
            grouped.push(ch);
        }
        grouped
    }
}

impl FormatCurrency for CurrencyFormat {
    fn format(&self, amount: Money) -> String {
        let cents = amount.cents().unsigned_abs();
        let major = self.group_digits(cents / 100);
        let minor = cents % 100;

        format!(
            "{}{}{}{}{}{:02}",
            if amount.is_negative() { "-" } else { "" },
            self.symbol,
            if self.symbol_spacing { " " } else { "" },
            major,
            self.decimal_separator,
            minor
        )
    }
}
