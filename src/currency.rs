use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO-like currency code used by a group and its money values.
///
/// A group is mono-currency (default `INR`); the engine models currency
/// explicitly so amounts can be formatted with the group's convention and so
/// the data model stays future-proof.
///
/// ## Minor units
///
/// The engine stores monetary values as an `i64` number of **minor units**
/// (see [`Money`]). `minor_units()` returns how many decimal digits are used
/// when converting between:
/// - major units (human input/output, e.g. `10.50 INR`)
/// - minor units (stored integers, e.g. `1050`)
///
/// [`Money`]: crate::Money
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Inr,
    Eur,
    Usd,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }

    /// Symbol prefixed to formatted amounts.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Inr => "₹",
            Currency::Eur => "€",
            Currency::Usd => "$",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    ///
    /// Example: INR uses 2 fraction digits (paise).
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Inr | Currency::Eur | Currency::Usd => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "INR" => Ok(Currency::Inr),
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            other => Err(EngineError::InvalidAmount(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
