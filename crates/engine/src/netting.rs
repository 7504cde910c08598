//! Bilateral netting of the gross ledger.
//!
//! Each unordered pair of members is collapsed into at most one directional
//! [`Debt`]. Netting is strictly pairwise: debts are never rerouted through a
//! third member, so every history line of a debt comes from an expense shared
//! by exactly those two members.

use std::{cmp::Ordering, collections::HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Currency, Ledger, Member, MemberId, TransactionLog, money};

/// `from` owes `to` the (rounded, positive) `amount`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Decimal,
    /// Direct lines followed by offsets, sorted by date descending.
    pub history: Vec<TransactionLog>,
}

impl Debt {
    /// Canonical key of the unordered pair: the two ids in ascending order.
    pub fn pair_key(&self) -> (&MemberId, &MemberId) {
        if self.from <= self.to {
            (&self.from, &self.to)
        } else {
            (&self.to, &self.from)
        }
    }
}

/// Net position of a member across a list of debts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub member_id: MemberId,
    pub display_name: String,
    /// Owed to the member minus owed by the member.
    pub net: Decimal,
}

/// Nets every unordered pair of the ledger into at most one [`Debt`].
///
/// Amounts are rounded to the minor units of `currency` only here. Pairs
/// whose gross debts cancel out (after rounding) produce nothing. The result
/// is sorted by amount descending, then by pair key, so identical inputs
/// always produce identical output.
pub fn net_all(ledger: &Ledger, currency: Currency) -> Vec<Debt> {
    let count = ledger.member_count();
    let mut debts = Vec::new();

    for a in 0..count {
        for b in (a + 1)..count {
            let a_owes_b = ledger.gross_at(a, b);
            let b_owes_a = ledger.gross_at(b, a);
            let (debtor, creditor, net) = match a_owes_b.cmp(&b_owes_a) {
                Ordering::Greater => (a, b, a_owes_b - b_owes_a),
                Ordering::Less => (b, a, b_owes_a - a_owes_b),
                Ordering::Equal => continue,
            };

            let amount = money::round_amount(net, currency);
            if amount <= Decimal::ZERO {
                continue;
            }

            debts.push(Debt {
                from: ledger.index().id(debtor).clone(),
                to: ledger.index().id(creditor).clone(),
                amount,
                history: merged_history(ledger, debtor, creditor),
            });
        }
    }

    debts.sort_by(|x, y| {
        y.amount
            .cmp(&x.amount)
            .then_with(|| x.pair_key().cmp(&y.pair_key()))
    });

    tracing::debug!(
        members = count,
        debts = debts.len(),
        "netted ledger"
    );

    debts
}

fn merged_history(ledger: &Ledger, debtor: usize, creditor: usize) -> Vec<TransactionLog> {
    let direct = ledger.history_at(debtor, creditor);
    let reverse = ledger.history_at(creditor, debtor);

    let mut history = Vec::with_capacity(direct.len() + reverse.len());
    history.extend(direct.iter().cloned());
    history.extend(reverse.iter().map(TransactionLog::as_offset));
    // Stable: equal dates keep direct lines first, each in expense order.
    history.sort_by(|x, y| y.date.cmp(&x.date));
    history
}

/// Net balance of every member over `debts`, in member order.
///
/// Debts naming ids that are not members are ignored. Balances saturate at
/// the [`Decimal`] bounds instead of overflowing.
pub fn member_balances(members: &[Member], debts: &[Debt]) -> Vec<MemberBalance> {
    let mut balances: Vec<MemberBalance> = Vec::with_capacity(members.len());
    let mut positions: HashMap<&MemberId, usize> = HashMap::with_capacity(members.len());
    for member in members {
        if positions.contains_key(&member.id) {
            continue;
        }
        positions.insert(&member.id, balances.len());
        balances.push(MemberBalance {
            member_id: member.id.clone(),
            display_name: member.display_name.clone(),
            net: Decimal::ZERO,
        });
    }

    for debt in debts {
        if let Some(&creditor) = positions.get(&debt.to) {
            let net = &mut balances[creditor].net;
            *net = net.saturating_add(debt.amount);
        }
        if let Some(&debtor) = positions.get(&debt.from) {
            let net = &mut balances[debtor].net;
            *net = net.saturating_sub(debt.amount);
        }
    }

    balances
}
