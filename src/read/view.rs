//! read/view — снимок активных транзакций и проверка видимости.

use serde::Serialize;

/// Snapshot of the transactions active when it was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadView {
    pub creator: u64,
    /// Active ids, descending.
    pub trx_ids: Vec<u64>,
    /// Ids at or above this are invisible.
    pub low_limit: u64,
    /// Ids below this are visible.
    pub up_limit: u64,
}

impl ReadView {
    pub fn new(creator: u64, active: &[u64]) -> Self {
        let mut trx_ids = active.to_vec();
        trx_ids.sort_unstable_by(|a, b| b.cmp(a));
        let max = trx_ids.first().copied().unwrap_or(0).max(creator);
        let low_limit = max.saturating_add(1);
        let up_limit = trx_ids.last().copied().unwrap_or(low_limit);
        Self {
            creator,
            trx_ids,
            low_limit,
            up_limit,
        }
    }

    /// Whether changes of `trx_id` are visible in this view.
    pub fn sees(&self, trx_id: u64) -> bool {
        if trx_id == 0 || trx_id == self.creator {
            return true;
        }
        if trx_id < self.up_limit {
            return true;
        }
        if trx_id >= self.low_limit {
            return false;
        }
        // descending order
        self.trx_ids
            .binary_search_by(|id| trx_id.cmp(id))
            .is_err()
    }

    /// Copy for a new creator; the old creator joins the active set.
    pub fn copy_with_creator(&self, creator: u64) -> Self {
        let mut trx_ids = self.trx_ids.clone();
        if self.creator != 0 {
            insert_desc(&mut trx_ids, self.creator);
        }
        let up_limit = trx_ids.last().copied().unwrap_or(self.up_limit);
        Self {
            creator,
            trx_ids,
            low_limit: self.low_limit,
            up_limit,
        }
    }
}

fn insert_desc(ids: &mut Vec<u64>, value: u64) {
    if let Err(pos) = ids.binary_search_by(|id| value.cmp(id)) {
        ids.insert(pos, value);
    }
}
