// src/domain/price.rs
use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Listing price. Always finite and non-negative; zero means free.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    pub const FREE: Price = Price(0.0);

    pub fn new(amount: f64) -> Result<Self, DomainError> {
        if !amount.is_finite() {
            return Err(DomainError::Validation(format!(
                "price must be a number, got {amount}"
            )));
        }
        if amount < 0.0 {
            return Err(DomainError::Validation(format!(
                "price must not be negative, got {amount}"
            )));
        }
        // normalises -0.0
        Ok(Self(amount.abs()))
    }

    pub fn amount(&self) -> f64 {
        self.0
    }

    pub fn is_free(&self) -> bool {
        self.0 == 0.0
    }
}

impl TryFrom<f64> for Price {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Price::new(value)
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl FromStr for Price {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount: f64 = s
            .trim()
            .parse()
            .map_err(|_| DomainError::Validation(format!("price must be a number, got '{s}'")))?;
        Price::new(amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Lkr,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Usd => write!(f, "USD"),
            Currency::Lkr => write!(f, "LKR"),
        }
    }
}

impl FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "LKR" => Ok(Currency::Lkr),
            other => Err(DomainError::Validation(format!(
                "unsupported currency '{other}', expected USD or LKR"
            ))),
        }
    }
}

/// Format a price for display.
///
/// Free prices render as `FREE`. USD renders with two decimals (`$4.50`),
/// LKR as a rounded, comma-grouped integer (`LKR 1,000`). Non-zero amounts
/// never round down to a zero label.
pub fn format_price(price: Price, currency: Currency) -> String {
    if price.is_free() {
        return "FREE".to_string();
    }
    match currency {
        Currency::Usd => format!("${:.2}", (price.amount() * 100.0).round().max(1.0) / 100.0),
        Currency::Lkr => format!("LKR {}", group_thousands(price.amount().round().max(1.0))),
    }
}

/// Label for the purchase button: `Buy for $4.50` or `Get for Free`.
pub fn purchase_label(price: Price, currency: Currency) -> String {
    if price.is_free() {
        "Get for Free".to_string()
    } else {
        format!("Buy for {}", format_price(price, currency))
    }
}

fn group_thousands(amount: f64) -> String {
    let digits = format!("{:.0}", amount);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
