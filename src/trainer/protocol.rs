use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Partition of a submitted protocol selection against the scenario's
/// required set. The three lists are disjoint and sorted, so feedback and
/// reports render reproducibly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolFeedback {
    /// submitted ∩ required
    pub correct: Vec<String>,
    /// submitted − required
    pub incorrect: Vec<String>,
    /// required − submitted
    pub missed: Vec<String>,
}

impl ProtocolFeedback {
    pub fn is_clean(&self) -> bool {
        self.incorrect.is_empty() && self.missed.is_empty()
    }
}

/// Pure set algebra; deterministic for any input order.
pub fn validate(submitted: &BTreeSet<String>, required: &BTreeSet<String>) -> ProtocolFeedback {
    ProtocolFeedback {
        correct: submitted.intersection(required).cloned().collect(),
        incorrect: submitted.difference(required).cloned().collect(),
        missed: required.difference(submitted).cloned().collect(),
    }
}
