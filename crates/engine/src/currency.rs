use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO-like currency code of a ledger.
///
/// A ledger is mono-currency: the engine never converts between currencies,
/// it only needs to know how many fraction digits amounts are rounded to when
/// they become visible (net debts, report totals).
///
/// ## Minor units
///
/// `minor_units()` returns the number of decimal digits of the smallest
/// unit. Example: EUR has 2 minor units, so `10.505` is shown as `10.51`;
/// JPY has none, so `10.5` is shown as `11`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Gbp,
    Php,
    Jpy,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Php => "PHP",
            Currency::Jpy => "JPY",
        }
    }

    /// Number of fraction digits used when rounding visible amounts.
    #[must_use]
    pub const fn minor_units(self) -> u32 {
        match self {
            Currency::Jpy => 0,
            Currency::Eur | Currency::Usd | Currency::Gbp | Currency::Php => 2,
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
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            "GBP" => Ok(Currency::Gbp),
            "PHP" => Ok(Currency::Php),
            "JPY" => Ok(Currency::Jpy),
            other => Err(EngineError::UnsupportedCurrency(other.to_string())),
        }
    }
}

impl core::str::FromStr for Currency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::try_from(s)
    }
}
