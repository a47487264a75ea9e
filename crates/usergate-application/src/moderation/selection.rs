use std::collections::BTreeSet;
use usergate_core::account::AccountId;

/// Ids currently checked in the moderation list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<AccountId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &AccountId) -> bool {
        self.ids.contains(id)
    }

    /// Flips membership of `id`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &AccountId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    /// Replaces the selection with exactly `ids`.
    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a AccountId>) {
        self.ids = ids.into_iter().cloned().collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn remove(&mut self, id: &AccountId) -> bool {
        self.ids.remove(id)
    }

    /// Keeps only ids for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&AccountId) -> bool) {
        self.ids.retain(keep);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccountId> {
        self.ids.iter()
    }
}
