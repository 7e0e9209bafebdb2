//! Per-turn preference votes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::VoteError;
use crate::strategy::Strategy;

/// Key tying a pending assistant turn to its eventual preference entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseId(Uuid);

impl ResponseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ResponseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResponseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Response id → chosen strategy. Grows by one entry per resolved turn and never shrinks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PreferenceLog {
    entries: BTreeMap<ResponseId, Strategy>,
}

impl PreferenceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a vote. A second vote for the same id is rejected and leaves the log unchanged.
    pub(crate) fn record(&mut self, id: ResponseId, strategy: Strategy) -> Result<(), VoteError> {
        if self.entries.contains_key(&id) {
            return Err(VoteError::AlreadyResolved(id));
        }
        self.entries.insert(id, strategy);
        Ok(())
    }

    pub fn get(&self, id: &ResponseId) -> Option<Strategy> {
        self.entries.get(id).copied()
    }

    pub fn contains(&self, id: &ResponseId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Chosen strategies, one per resolved turn.
    pub fn choices(&self) -> impl Iterator<Item = Strategy> + '_ {
        self.entries.values().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_vote_rejected() {
        let mut log = PreferenceLog::new();
        let id = ResponseId::new();
        log.record(id, Strategy::Conditional).unwrap();
        let err = log.record(id, Strategy::DynamicContext).unwrap_err();
        assert_eq!(err, VoteError::AlreadyResolved(id));
        assert_eq!(log.len(), 1);
        assert_eq!(log.get(&id), Some(Strategy::Conditional));
    }

    #[test]
    fn test_serializes_as_map() {
        let mut log = PreferenceLog::new();
        let id = ResponseId::new();
        log.record(id, Strategy::DynamicContext).unwrap();
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json[id.to_string()], "dynamic_context");
    }
}
