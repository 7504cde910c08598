//! Gross debt ledger.
//!
//! [`build_ledger`] folds every expense through the split resolver into two
//! parallel `n x n` matrices indexed by dense member positions:
//!
//! - `gross[borrower][lender]`: total the borrower owes the lender, before
//!   netting against the reverse direction;
//! - `history[borrower][lender]`: the [`TransactionLog`] lines behind it.
//!
//! Anomalous records never abort the fold. They are skipped and counted in
//! [`LedgerDiagnostics`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Expense, ExpenseId, Member, MemberId, SplitDetails, members::MemberIndex, split};

/// One line of a debt's audit trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLog {
    pub expense_id: ExpenseId,
    pub description: String,
    pub date: DateTime<Utc>,
    /// Signed amount: positive for a direct contribution, negative for an
    /// offset.
    pub amount: Decimal,
    /// `true` when the line is a reverse-direction contribution folded into
    /// a net debt.
    pub is_offset: bool,
}

impl TransactionLog {
    /// The same line seen from the opposite direction.
    pub(crate) fn as_offset(&self) -> Self {
        Self {
            amount: -self.amount,
            is_offset: true,
            ..self.clone()
        }
    }
}

/// Counters for the records and references skipped while building a ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDiagnostics {
    /// Expenses without a payer.
    pub unpaid_expenses: usize,
    /// Expenses whose amount is zero or negative.
    pub non_positive_amounts: usize,
    /// Expenses with an unrecognized split.
    pub malformed_splits: usize,
    /// Expenses whose split resolved to no share at all.
    pub empty_splits: usize,
    /// Expenses paid by an id that is not a member.
    pub unknown_payers: usize,
    /// Shares owed by an id that is not a member.
    pub unknown_borrowers: usize,
    /// Member entries ignored because their id was already listed.
    pub duplicate_members: usize,
    /// Expenses whose shares or running totals overflow a [`Decimal`].
    pub overflowed_amounts: usize,
}

impl LedgerDiagnostics {
    /// Member references dropped because the id is not in the member list.
    #[must_use]
    pub fn dropped_references(&self) -> usize {
        self.unknown_payers + self.unknown_borrowers
    }

    /// Expenses that contributed nothing.
    #[must_use]
    pub fn skipped_expenses(&self) -> usize {
        self.unpaid_expenses
            + self.non_positive_amounts
            + self.malformed_splits
            + self.empty_splits
            + self.unknown_payers
            + self.overflowed_amounts
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Pairwise gross debts of one ledger.
#[derive(Clone, Debug)]
pub struct Ledger {
    index: MemberIndex,
    gross: Vec<Decimal>,
    history: Vec<Vec<TransactionLog>>,
    diagnostics: LedgerDiagnostics,
}

impl Ledger {
    fn empty(index: MemberIndex) -> Self {
        let cells = index.len() * index.len();
        let diagnostics = LedgerDiagnostics {
            duplicate_members: index.duplicates(),
            ..LedgerDiagnostics::default()
        };
        Self {
            index,
            gross: vec![Decimal::ZERO; cells],
            history: vec![Vec::new(); cells],
            diagnostics,
        }
    }

    fn cell(&self, borrower: usize, lender: usize) -> usize {
        borrower * self.index.len() + lender
    }

    /// Adds every `(borrower, share)` of one expense owed to `lender`, or
    /// nothing at all if any cell would overflow.
    fn record(&mut self, lender: usize, expense: &Expense, shares: &[(usize, Decimal)]) -> bool {
        let mut totals = Vec::with_capacity(shares.len());
        for &(borrower, share) in shares {
            let cell = self.cell(borrower, lender);
            match self.gross[cell].checked_add(share) {
                Some(total) => totals.push((cell, total)),
                None => return false,
            }
        }

        for ((cell, total), &(_, share)) in totals.into_iter().zip(shares) {
            self.gross[cell] = total;
            self.history[cell].push(TransactionLog {
                expense_id: expense.id.clone(),
                description: expense.description.clone(),
                date: expense.date,
                amount: share,
                is_offset: false,
            });
        }
        true
    }

    /// Number of distinct members.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.index.len()
    }

    /// Member ids in index order.
    pub fn member_ids(&self) -> impl Iterator<Item = &MemberId> {
        (0..self.index.len()).map(|position| self.index.id(position))
    }

    /// Gross amount `borrower` owes `lender`. Zero for unknown ids.
    #[must_use]
    pub fn gross(&self, borrower: &MemberId, lender: &MemberId) -> Decimal {
        match (self.index.position(borrower), self.index.position(lender)) {
            (Some(b), Some(l)) => self.gross[self.cell(b, l)],
            _ => Decimal::ZERO,
        }
    }

    /// Audit lines behind [`Ledger::gross`], in expense order.
    #[must_use]
    pub fn history(&self, borrower: &MemberId, lender: &MemberId) -> &[TransactionLog] {
        match (self.index.position(borrower), self.index.position(lender)) {
            (Some(b), Some(l)) => &self.history[self.cell(b, l)],
            _ => &[],
        }
    }

    #[must_use]
    pub fn diagnostics(&self) -> LedgerDiagnostics {
        self.diagnostics
    }

    pub(crate) fn index(&self) -> &MemberIndex {
        &self.index
    }

    pub(crate) fn gross_at(&self, borrower: usize, lender: usize) -> Decimal {
        self.gross[self.cell(borrower, lender)]
    }

    pub(crate) fn history_at(&self, borrower: usize, lender: usize) -> &[TransactionLog] {
        &self.history[self.cell(borrower, lender)]
    }
}

/// Folds `expenses` into the gross debt and history matrices.
///
/// For each expense with a known payer, every resolved share owed by a known
/// member other than the payer and greater than zero is added to
/// `gross[borrower][payer]` with a matching history line. Everything else is
/// skipped and counted.
pub fn build_ledger(expenses: &[Expense], members: &[Member]) -> Ledger {
    let mut ledger = Ledger::empty(MemberIndex::new(members));

    for expense in expenses {
        if expense.amount <= Decimal::ZERO {
            tracing::debug!(expense = %expense.id, amount = %expense.amount, "skipping non-positive amount");
            ledger.diagnostics.non_positive_amounts += 1;
            continue;
        }
        let Some(payer_id) = expense.paid_by.as_ref() else {
            tracing::debug!(expense = %expense.id, "skipping unpaid expense");
            ledger.diagnostics.unpaid_expenses += 1;
            continue;
        };
        let Some(payer) = ledger.index.position(payer_id) else {
            tracing::debug!(expense = %expense.id, payer = %payer_id, "skipping expense paid by unknown member");
            ledger.diagnostics.unknown_payers += 1;
            continue;
        };
        if matches!(expense.split, SplitDetails::Unrecognized) {
            tracing::debug!(expense = %expense.id, "skipping unrecognized split");
            ledger.diagnostics.malformed_splits += 1;
            continue;
        }

        let Some(shares) = split::checked_shares(expense) else {
            ledger.diagnostics.overflowed_amounts += 1;
            continue;
        };
        if shares.is_empty() {
            tracing::debug!(expense = %expense.id, kind = expense.split.kind(), "skipping empty split");
            ledger.diagnostics.empty_splits += 1;
            continue;
        }

        let mut owed = Vec::with_capacity(shares.len());
        let mut unknown = 0;
        for (borrower_id, share) in &shares {
            if borrower_id == payer_id || *share <= Decimal::ZERO {
                continue;
            }
            match ledger.index.position(borrower_id) {
                Some(borrower) => owed.push((borrower, *share)),
                None => {
                    tracing::debug!(expense = %expense.id, borrower = %borrower_id, "dropping share of unknown member");
                    unknown += 1;
                }
            }
        }

        if !ledger.record(payer, expense, &owed) {
            tracing::debug!(expense = %expense.id, amount = %expense.amount, "skipping expense overflowing the ledger");
            ledger.diagnostics.overflowed_amounts += 1;
            continue;
        }
        ledger.diagnostics.unknown_borrowers += unknown;
    }

    let dropped = ledger.diagnostics.dropped_references();
    if dropped > 0 {
        tracing::warn!(dropped, "member references not in the ledger were dropped");
    }

    ledger
}
