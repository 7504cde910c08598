//! Rounding of monetary amounts.
//!
//! Amounts are carried as [`Decimal`] through the whole computation and are
//! rounded only where they become visible: net debt amounts and report
//! totals. Rounding mid-accumulation would compound error over thousands of
//! expenses, so shares and gross matrix cells are never rounded.
//!
//! # Examples
//!
//! ```rust
//! use engine::{Currency, money};
//! use rust_decimal_macros::dec;
//!
//! assert_eq!(money::round2(dec!(10.005)), dec!(10.01));
//! assert_eq!(money::round_amount(dec!(10.5), Currency::Jpy), dec!(11));
//! assert_eq!(money::round2(dec!(-2.345)), dec!(-2.35));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};

use crate::Currency;

/// Nudge applied in the value's direction before rounding.
///
/// Quotients such as `amount / 3` are not exactly representable, so a sum
/// that should land on a midpoint (e.g. `0.025`) can come out as
/// `0.02499999...`. The nudge puts it back on the midpoint.
pub const ROUNDING_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// Rounds to `scale` fraction digits, half away from zero, after the
/// epsilon nudge. The result always carries exactly `scale` digits so that
/// encoded amounts look uniform (`55.00`, not `55`).
#[must_use]
pub fn round_to_scale(value: Decimal, scale: u32) -> Decimal {
    let nudged = if value.is_sign_negative() {
        value.checked_sub(ROUNDING_EPSILON)
    } else {
        value.checked_add(ROUNDING_EPSILON)
    }
    .unwrap_or(value);
    let mut rounded = nudged.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.rescale(scale);
    rounded
}

/// Rounds to the minor units of `currency`.
#[must_use]
pub fn round_amount(value: Decimal, currency: Currency) -> Decimal {
    round_to_scale(value, currency.minor_units())
}

/// Rounds to two decimal places (cents).
#[must_use]
pub fn round2(value: Decimal) -> Decimal {
    round_to_scale(value, 2)
}

/// Smallest representable unit of `currency` (`0.01` for EUR, `1` for JPY).
#[must_use]
pub fn minor_unit(currency: Currency) -> Decimal {
    Decimal::new(1, currency.minor_units())
}

/// Returns `true` when `a` and `b` differ by at most `tolerance`.
#[must_use]
pub fn within(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    a.checked_sub(b)
        .is_some_and(|difference| difference.abs() <= tolerance)
}

/// Sum of `values`, or `None` when it does not fit in a [`Decimal`].
pub(crate) fn checked_sum<'a>(values: impl IntoIterator<Item = &'a Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(*value))
}
