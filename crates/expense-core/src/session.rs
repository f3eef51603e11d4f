//! Session state: the single, scoped owner of the in-progress line-item
//! list. Concurrent sessions never share state; the pipeline stages only
//! read snapshots and never hold references past their call.

use tracing::debug;
use uuid::Uuid;

use crate::record::ExpenseRecord;
use crate::trip::TripInfo;

/// One user's in-progress expense report. Records live here exclusively
/// until submission; a successful submission clears them, a failed one
/// leaves them untouched so nothing has to be re-entered.
#[derive(Debug, Clone)]
pub struct ExpenseSession {
    id: Uuid,
    pub trip: TripInfo,
    records: Vec<ExpenseRecord>,
}

impl ExpenseSession {
    pub fn new(trip: TripInfo) -> Self {
        let id = Uuid::new_v4();
        debug!(event = "session.created", domain = "expense", session_id = %id);
        ExpenseSession {
            id,
            trip,
            records: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Append a line item. Insertion order is significant: it mirrors the
    /// order receipts are referenced in the bundle.
    pub fn add(&mut self, record: ExpenseRecord) {
        debug!(
            event = "session.record_added",
            domain = "expense",
            session_id = %self.id,
            category = record.category.label(),
            has_receipt = record.has_receipt(),
            count = self.records.len() + 1
        );
        self.records.push(record);
    }

    /// Remove the line item at `index`, keeping the survivors in their
    /// original relative order. Returns `None` for an out-of-range index.
    pub fn remove(&mut self, index: usize) -> Option<ExpenseRecord> {
        if index >= self.records.len() {
            return None;
        }
        let record = self.records.remove(index);
        debug!(
            event = "session.record_removed",
            domain = "expense",
            session_id = %self.id,
            index = index,
            count = self.records.len()
        );
        Some(record)
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Reset after a successful submission.
    pub fn clear(&mut self) {
        debug!(
            event = "session.cleared",
            domain = "expense",
            session_id = %self.id,
            count = self.records.len()
        );
        self.records.clear();
    }
}
