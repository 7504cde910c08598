//! Input snapshot handed over by the storage layer.

use serde::{Deserialize, Serialize};

use crate::{Expense, Member, ResultEngine};

/// Members and expenses of one ledger, already filtered and authorized by
/// the caller. The engine assumes the snapshot is temporally consistent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

impl Snapshot {
    pub fn new(members: Vec<Member>, expenses: Vec<Expense>) -> Self {
        Self { members, expenses }
    }

    /// Decodes a snapshot from JSON.
    pub fn from_json(raw: &str) -> ResultEngine<Self> {
        let snapshot: Snapshot = serde_json::from_str(raw)?;
        tracing::debug!(
            members = snapshot.members.len(),
            expenses = snapshot.expenses.len(),
            "decoded snapshot"
        );
        Ok(snapshot)
    }
}
