//! Progress record persistence, one record per (learner, lesson).

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::MasteryResult;
use crate::types::ProgressRecord;

pub trait ProgressStore: Send + Sync {
    fn load(&self, learner_id: &str, lesson_id: &str) -> MasteryResult<Option<ProgressRecord>>;

    fn save(&self, learner_id: &str, lesson_id: &str, record: &ProgressRecord) -> MasteryResult<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryProgressStore {
    records: RwLock<HashMap<(String, String), ProgressRecord>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records held for a learner, keyed by lesson id.
    pub fn records_for(&self, learner_id: &str) -> HashMap<String, ProgressRecord> {
        self.records
            .read()
            .iter()
            .filter(|((learner, _), _)| learner == learner_id)
            .map(|((_, lesson), record)| (lesson.clone(), record.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn load(&self, learner_id: &str, lesson_id: &str) -> MasteryResult<Option<ProgressRecord>> {
        let key = (learner_id.to_string(), lesson_id.to_string());
        Ok(self.records.read().get(&key).cloned())
    }

    fn save(&self, learner_id: &str, lesson_id: &str, record: &ProgressRecord) -> MasteryResult<()> {
        let key = (learner_id.to_string(), lesson_id.to_string());
        self.records.write().insert(key, record.clone());
        Ok(())
    }
}
