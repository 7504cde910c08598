//! Settlement engine for shared-expense ledgers.
//!
//! Given the members and expenses of one ledger, the engine answers "who owes
//! whom" and produces the reporting views:
//!
//! 1. [`resolve_shares`] turns one expense and its [`SplitDetails`] into the
//!    share each member owes;
//! 2. [`build_ledger`] folds all expenses into pairwise gross debts with an
//!    audit trail;
//! 3. [`net_all`] collapses each pair into at most one [`Debt`];
//! 4. the [`analytics`] projections (category totals, daily trend, member
//!    statistics) read the same snapshot independently.
//!
//! Every call is a pure function of its inputs: no I/O, no shared state.
//! [`Engine`] only carries presentation settings and can be shared freely
//! between threads.
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use engine::{Engine, Expense, Member, Snapshot, SplitDetails};
//! use rust_decimal_macros::dec;
//!
//! let members = vec![Member::new("alice", "Alice"), Member::new("bob", "Bob")];
//! let expenses = vec![Expense::new(
//!     "e1",
//!     "Dinner",
//!     dec!(80),
//!     Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap(),
//!     Some("alice".into()),
//!     SplitDetails::equal(["alice", "bob"]),
//! )];
//!
//! let engine = Engine::builder().build().unwrap();
//! let settlement = engine.settle(&Snapshot::new(members, expenses));
//! assert_eq!(settlement.debts[0].from.as_str(), "bob");
//! assert_eq!(settlement.debts[0].amount, dec!(40));
//! ```

use serde::{Deserialize, Serialize};

pub use analytics::{
    Analytics, CategoryTotal, DailyTotal, MemberStat, Period, Summary, UNCATEGORIZED,
    available_years, category_breakdown, daily_trend, member_stats, summary,
};
pub use currency::Currency;
pub use error::EngineError;
pub use expenses::{Expense, ExpenseId, SplitDetails};
pub use ledger::{Ledger, LedgerDiagnostics, TransactionLog, build_ledger};
pub use members::{Member, MemberId};
pub use netting::{Debt, MemberBalance, member_balances, net_all};
pub use snapshot::Snapshot;
pub use split::{Shares, resolve_shares};
pub use validation::{snapshot_issues, validate_expense, validate_snapshot};

pub mod analytics;
mod currency;
mod error;
mod expenses;
mod ledger;
mod members;
pub mod money;
mod netting;
mod snapshot;
mod split;
mod util;
mod validation;

pub type ResultEngine<T> = Result<T, EngineError>;

/// Nets `expenses` between `members` using the default currency.
///
/// Shorthand for [`build_ledger`] followed by [`net_all`].
pub fn settlements(expenses: &[Expense], members: &[Member]) -> Vec<Debt> {
    net_all(&build_ledger(expenses, members), Currency::default())
}

/// Result of settling one snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub debts: Vec<Debt>,
    pub balances: Vec<MemberBalance>,
    pub diagnostics: LedgerDiagnostics,
}

#[derive(Clone, Debug)]
pub struct Engine {
    currency: Currency,
    default_category: String,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    /// Settles `snapshot`: pairwise net debts, per-member balances and the
    /// counters of everything that was skipped.
    pub fn settle(&self, snapshot: &Snapshot) -> Settlement {
        let ledger = build_ledger(&snapshot.expenses, &snapshot.members);
        let debts = net_all(&ledger, self.currency);
        let balances = member_balances(&snapshot.members, &debts);
        let diagnostics = ledger.diagnostics();

        tracing::info!(
            members = ledger.member_count(),
            expenses = snapshot.expenses.len(),
            debts = debts.len(),
            skipped = diagnostics.skipped_expenses(),
            "settled ledger"
        );

        Settlement {
            debts,
            balances,
            diagnostics,
        }
    }

    /// Reporting projections of `snapshot` restricted to `period`.
    pub fn analytics(&self, snapshot: &Snapshot, period: Period) -> ResultEngine<Analytics> {
        analytics::analytics_with(
            &snapshot.expenses,
            &snapshot.members,
            period,
            &self.default_category,
            self.currency,
        )
    }

    /// Rejects the snapshot on the first expense that would be skipped or
    /// misattributed by [`Engine::settle`].
    pub fn validate(&self, snapshot: &Snapshot) -> ResultEngine<()> {
        validate_snapshot(snapshot, self.currency)
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    currency: Currency,
    default_category: Option<String>,
}

impl EngineBuilder {
    /// Currency used to round visible amounts.
    pub fn currency(mut self, currency: Currency) -> EngineBuilder {
        self.currency = currency;
        self
    }

    /// Label for expenses without a category.
    pub fn default_category(mut self, label: &str) -> EngineBuilder {
        self.default_category = Some(label.to_string());
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine> {
        let default_category = match self.default_category {
            None => UNCATEGORIZED.to_string(),
            Some(label) => util::normalize_label(Some(&label)).ok_or_else(|| {
                EngineError::InvalidSetting("default category must not be empty".to_string())
            })?,
        };
        Ok(Engine {
            currency: self.currency,
            default_category,
        })
    }
}
