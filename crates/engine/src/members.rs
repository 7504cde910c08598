//! Ledger participants and the per-computation member arena.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

/// Opaque member identifier assigned by the storage layer.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MemberId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A participant of a ledger. Identity is the id, the display name is only
/// presentational.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    #[serde(alias = "displayName", default)]
    pub display_name: String,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Dense index assignment for the members of one computation.
///
/// Ids are translated to `0..len()` once at the boundary so the matrices can
/// be flat vectors. The first occurrence of a duplicated id wins.
#[derive(Clone, Debug, Default)]
pub(crate) struct MemberIndex {
    ids: Vec<MemberId>,
    positions: HashMap<MemberId, usize>,
    duplicates: usize,
}

impl MemberIndex {
    pub(crate) fn new(members: &[Member]) -> Self {
        let mut index = Self {
            ids: Vec::with_capacity(members.len()),
            positions: HashMap::with_capacity(members.len()),
            duplicates: 0,
        };
        for member in members {
            if index.positions.contains_key(&member.id) {
                tracing::warn!(member = %member.id, "duplicate member id ignored");
                index.duplicates += 1;
                continue;
            }
            index.positions.insert(member.id.clone(), index.ids.len());
            index.ids.push(member.id.clone());
        }
        index
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    pub(crate) fn position(&self, id: &MemberId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub(crate) fn id(&self, position: usize) -> &MemberId {
        &self.ids[position]
    }

    pub(crate) fn duplicates(&self) -> usize {
        self.duplicates
    }
}
