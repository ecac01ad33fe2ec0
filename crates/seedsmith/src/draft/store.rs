use super::{AccountDraft, DraftPatch};
use zeroize::Zeroize as _;

/// Holder of the current draft snapshot.
///
/// Every update replaces the whole record, and the replaced record is wiped.
#[derive(Debug, Default)]
pub struct DraftStore {
    current: AccountDraft,
    revision: u64,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn snapshot(&self) -> &AccountDraft {
        &self.current
    }

    /// Incremented on every published change.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn update_new(&mut self, patch: DraftPatch) {
        let next = self.current.patched(patch);
        self.publish(next);
    }

    pub fn reset(&mut self) {
        self.publish(AccountDraft::default());
    }

    /// Hand the current draft to the caller and start over with an empty one.
    pub fn take(&mut self) -> AccountDraft {
        self.revision = self.revision.saturating_add(1);
        std::mem::take(&mut self.current)
    }

    fn publish(&mut self, next: AccountDraft) {
        let mut old = std::mem::replace(&mut self.current, next);
        old.zeroize();
        self.revision = self.revision.saturating_add(1);
    }
}
