//! Expense records and their split rules.
//!
//! An [`Expense`] is paid by (at most) one member and divided among members
//! according to its [`SplitDetails`]. Records reach the engine as an
//! immutable snapshot; the engine never mutates them.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MemberId, util};

/// Opaque expense identifier assigned by the storage layer.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(String);

impl ExpenseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExpenseId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Rule assigning portions of an expense amount to members.
///
/// Stored rows carry a `type` discriminant:
///
/// ```json
/// { "type": "equal", "members": ["m1", "m2"] }
/// { "type": "exact", "allocations": { "m1": 12.5, "m2": "7.50" } }
/// { "type": "percentage", "allocations": { "m1": 60, "m2": 40 } }
/// ```
///
/// Any other tag decodes to [`SplitDetails::Unrecognized`], which contributes
/// nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SplitDetails {
    /// Equal division among the listed members.
    Equal {
        #[serde(default)]
        members: BTreeSet<MemberId>,
    },
    /// Explicit per-member amounts.
    Exact {
        #[serde(default)]
        allocations: BTreeMap<MemberId, Decimal>,
    },
    /// Per-member percentage of the expense amount.
    Percentage {
        #[serde(default)]
        allocations: BTreeMap<MemberId, Decimal>,
    },
    #[default]
    #[serde(other)]
    Unrecognized,
}

impl SplitDetails {
    /// Equal split among `members`.
    pub fn equal<I, M>(members: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MemberId>,
    {
        Self::Equal {
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact split with the given per-member amounts.
    pub fn exact<I, M>(allocations: I) -> Self
    where
        I: IntoIterator<Item = (M, Decimal)>,
        M: Into<MemberId>,
    {
        Self::Exact {
            allocations: allocations
                .into_iter()
                .map(|(id, value)| (id.into(), value))
                .collect(),
        }
    }

    /// Percentage split with the given per-member percentages.
    pub fn percentage<I, M>(allocations: I) -> Self
    where
        I: IntoIterator<Item = (M, Decimal)>,
        M: Into<MemberId>,
    {
        Self::Percentage {
            allocations: allocations
                .into_iter()
                .map(|(id, value)| (id.into(), value))
                .collect(),
        }
    }

    /// Tag name as stored.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Equal { .. } => "equal",
            Self::Exact { .. } => "exact",
            Self::Percentage { .. } => "percentage",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// A single logged expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
    #[serde(deserialize_with = "util::deserialize_date")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "paid_by_member_id", alias = "paidByMemberId")]
    pub paid_by: Option<MemberId>,
    #[serde(
        default,
        alias = "split_details",
        deserialize_with = "util::deserialize_split"
    )]
    pub split: SplitDetails,
}

impl Expense {
    pub fn new(
        id: impl Into<ExpenseId>,
        description: impl Into<String>,
        amount: Decimal,
        date: DateTime<Utc>,
        paid_by: Option<MemberId>,
        split: SplitDetails,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            amount,
            date,
            category: None,
            paid_by,
            split,
        }
    }

    /// Sets the category label.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}
