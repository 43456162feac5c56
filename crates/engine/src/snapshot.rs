use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Signing status of one validator at one point in time.
///
/// `consensus_address` is the identity used for diffing. `operator_address`
/// and `moniker` are display attributes and stay empty when the validator
/// record owning the signing info could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSnapshot {
    pub operator_address: String,
    pub consensus_address: String,
    pub moniker: String,
    pub missed_blocks: i64,
    pub jailed: bool,
    pub tombstoned: bool,
}

/// All monitored validators for one poll, keyed by consensus address.
///
/// Backed by an ordered map so iteration, and therefore report building,
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSet {
    validators: BTreeMap<String, ValidatorSnapshot>,
}

impl SnapshotSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a snapshot, replacing any previous one with the same consensus address.
    pub fn insert(&mut self, snapshot: ValidatorSnapshot) -> Option<ValidatorSnapshot> {
        self.validators
            .insert(snapshot.consensus_address.clone(), snapshot)
    }

    pub fn get(&self, consensus_address: &str) -> Option<&ValidatorSnapshot> {
        self.validators.get(consensus_address)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ValidatorSnapshot)> {
        self.validators.iter()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Keeps only the validators accepted by `predicate`.
    pub fn retain(&mut self, mut predicate: impl FnMut(&ValidatorSnapshot) -> bool) {
        self.validators.retain(|_, snapshot| predicate(snapshot));
    }
}

impl FromIterator<ValidatorSnapshot> for SnapshotSet {
    fn from_iter<I: IntoIterator<Item = ValidatorSnapshot>>(iter: I) -> Self {
        let mut set = Self::new();
        for snapshot in iter {
            set.insert(snapshot);
        }
        set
    }
}

impl IntoIterator for SnapshotSet {
    type Item = ValidatorSnapshot;
    type IntoIter = std::collections::btree_map::IntoValues<String, ValidatorSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.validators.into_values()
    }
}
