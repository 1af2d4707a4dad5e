use core::str::FromStr;

use serde::{Deserialize, Serialize};

use vanstock_core::{DomainError, ValueObject};

/// List price in the smallest currency unit (euro cents).
///
/// Non-negative by construction. Display only; no tax or currency arithmetic.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl ValueObject for Price {}

impl Price {
    pub const ZERO: Price = Price(0);

    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> u64 {
        self.0
    }
}

impl FromStr for Price {
    type Err = DomainError;

    /// Accepts `45`, `45.5`, `45.50` and the German `45,50`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().trim_end_matches('€').trim();
        if raw.is_empty() {
            return Err(DomainError::validation("price is empty"));
        }
        if raw.starts_with('-') {
            return Err(DomainError::validation("price must not be negative"));
        }

        let normalized = raw.replace(',', ".");
        let (whole, fraction) = match normalized.split_once('.') {
            Some((w, f)) => (w, f),
            None => (normalized.as_str(), ""),
        };

        let invalid = || DomainError::validation(format!("invalid price: {s}"));

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let euros: u64 = whole.parse().map_err(|_| invalid())?;
        let cents: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        euros
            .checked_mul(100)
            .and_then(|c| c.checked_add(cents))
            .map(Price)
            .ok_or_else(invalid)
    }
}

impl core::fmt::Display for Price {
    /// German euro notation, e.g. `1.234,50 €`.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let euros = (self.0 / 100).to_string();
        let cents = self.0 % 100;

        let mut grouped = String::with_capacity(euros.len() + euros.len() / 3);
        for (i, ch) in euros.chars().enumerate() {
            if i > 0 && (euros.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "{grouped},{cents:02} €")
    }
}
