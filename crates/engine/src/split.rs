//! Split resolution: how much of one expense each member is responsible for.
//!
//! This is the single place split semantics are interpreted. Both the ledger
//! builder and the member statistics go through [`resolve_shares`], so the
//! settlement math and the reports can never disagree.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::{Expense, MemberId, SplitDetails};

/// Owed share per member for a single expense.
pub type Shares = BTreeMap<MemberId, Decimal>;

/// Resolves `expense` into the amount each listed member owes for it.
///
/// - `Equal`: `amount / |members|` each, or nothing when no member is listed.
/// - `Exact`: the allocations as given.
/// - `Percentage`: `allocation / 100 * amount` each.
/// - `Unrecognized`: nothing.
///
/// No rounding is applied and allocations are not checked against the
/// amount; the payer is included like any other member. An expense whose
/// shares do not fit in a [`Decimal`] resolves to nothing.
#[must_use]
pub fn resolve_shares(expense: &Expense) -> Shares {
    checked_shares(expense).unwrap_or_default()
}

/// Like [`resolve_shares`], but `None` when a share overflows.
pub(crate) fn checked_shares(expense: &Expense) -> Option<Shares> {
    let shares = resolve(&expense.split, expense.amount);
    if shares.is_none() {
        tracing::debug!(expense = %expense.id, amount = %expense.amount, "split shares overflow");
    }
    shares
}

fn resolve(split: &SplitDetails, amount: Decimal) -> Option<Shares> {
    match split {
        SplitDetails::Equal { members } => {
            if members.is_empty() {
                return Some(Shares::new());
            }
            let share = amount.checked_div(Decimal::from(members.len()))?;
            Some(members.iter().map(|id| (id.clone(), share)).collect())
        }
        SplitDetails::Exact { allocations } => Some(allocations.clone()),
        SplitDetails::Percentage { allocations } => allocations
            .iter()
            .map(|(id, percent)| {
                let share = amount
                    .checked_mul(*percent)?
                    .checked_div(Decimal::ONE_HUNDRED)?;
                Some((id.clone(), share))
            })
            .collect(),
        SplitDetails::Unrecognized => Some(Shares::new()),
    }
}
