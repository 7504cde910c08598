//! Upstream validation of expense records.
//!
//! The settlement computation accepts anything and degrades malformed
//! records to zero contribution. Callers that create or import expenses
//! should reject bad records before they are stored; these checks are the
//! ones the engine deliberately skips.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::{
    Currency, EngineError, Expense, Member, MemberId, ResultEngine, Snapshot, SplitDetails, money,
};

/// Validates one expense against the member list.
///
/// - the amount must be > 0;
/// - payer and split members must be members;
/// - `Equal` must list at least one member;
/// - `Exact` must sum to the amount and `Percentage` to 100, within one
///   minor unit of `currency`;
/// - the split must be recognized.
pub fn validate_expense(expense: &Expense, members: &[Member], currency: Currency) -> ResultEngine<()> {
    let known: HashSet<&MemberId> = members.iter().map(|m| &m.id).collect();
    validate_against(expense, &known, currency)
}

/// Validates every expense of `snapshot`, stopping at the first failure.
pub fn validate_snapshot(snapshot: &Snapshot, currency: Currency) -> ResultEngine<()> {
    let known: HashSet<&MemberId> = snapshot.members.iter().map(|m| &m.id).collect();
    snapshot
        .expenses
        .iter()
        .try_for_each(|expense| validate_against(expense, &known, currency))
}

/// Collects every failure of `snapshot` instead of stopping at the first.
pub fn snapshot_issues(snapshot: &Snapshot, currency: Currency) -> Vec<(Expense, EngineError)> {
    let known: HashSet<&MemberId> = snapshot.members.iter().map(|m| &m.id).collect();
    snapshot
        .expenses
        .iter()
        .filter_map(|expense| {
            validate_against(expense, &known, currency)
                .err()
                .map(|err| (expense.clone(), err))
        })
        .collect()
}

fn validate_against(
    expense: &Expense,
    known: &HashSet<&MemberId>,
    currency: Currency,
) -> ResultEngine<()> {
    if expense.amount <= Decimal::ZERO {
        return Err(EngineError::InvalidAmount(format!(
            "expense '{}': amount must be > 0",
            expense.id
        )));
    }
    if let Some(payer) = &expense.paid_by
        && !known.contains(payer)
    {
        return Err(EngineError::UnknownMember(payer.to_string()));
    }

    let tolerance = money::minor_unit(currency);
    match &expense.split {
        SplitDetails::Equal { members } => {
            if members.is_empty() {
                return Err(EngineError::MalformedSplit(format!(
                    "expense '{}': equal split without members",
                    expense.id
                )));
            }
            ensure_known(members.iter(), known)?;
        }
        SplitDetails::Exact { allocations } => {
            ensure_known(allocations.keys(), known)?;
            let total = allocation_total(expense, allocations.values())?;
            if !money::within(total, expense.amount, tolerance) {
                return Err(EngineError::MalformedSplit(format!(
                    "expense '{}': exact allocations sum to {total}, expected {}",
                    expense.id, expense.amount
                )));
            }
        }
        SplitDetails::Percentage { allocations } => {
            ensure_known(allocations.keys(), known)?;
            let total = allocation_total(expense, allocations.values())?;
            if !money::within(total, Decimal::ONE_HUNDRED, tolerance) {
                return Err(EngineError::MalformedSplit(format!(
                    "expense '{}': percentages sum to {total}, expected 100",
                    expense.id
                )));
            }
        }
        SplitDetails::Unrecognized => {
            return Err(EngineError::MalformedSplit(format!(
                "expense '{}': unrecognized split",
                expense.id
            )));
        }
    }
    Ok(())
}

fn allocation_total<'a>(
    expense: &Expense,
    values: impl Iterator<Item = &'a Decimal>,
) -> ResultEngine<Decimal> {
    money::checked_sum(values).ok_or_else(|| {
        EngineError::InvalidAmount(format!("expense '{}': allocations overflow", expense.id))
    })
}

fn ensure_known<'a>(
    ids: impl Iterator<Item = &'a MemberId>,
    known: &HashSet<&MemberId>,
) -> ResultEngine<()> {
    for id in ids {
        if !known.contains(id) {
            return Err(EngineError::UnknownMember(id.to_string()));
        }
    }
    Ok(())
}
