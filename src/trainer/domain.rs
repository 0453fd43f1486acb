use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for catalog scenarios.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ScenarioId(pub u32);

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier wrapper for training sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One canonical question/response/emotion triple in a scenario script.
///
/// The question text is the lookup key; matching is exact after trimming and
/// lowercasing. Within one scenario the first entry with a given normalized
/// question wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEntry {
    pub question: String,
    pub response: String,
    #[serde(default)]
    pub emotion: String,
}

/// A traveler or dating profile with its fixed interview script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub id: ScenarioId,
    pub name: String,
    /// Free-form display attributes (nationality, age, occupation, ...).
    #[serde(default)]
    pub profile: BTreeMap<String, String>,
    #[serde(default)]
    pub emotional_state: String,
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub required_protocols: Vec<String>,
    pub script: Vec<ScriptEntry>,
}

impl ScenarioRecord {
    /// The first few script questions, surfaced to renderers as suggested
    /// conversation starters.
    pub fn suggested_openers(&self, limit: usize) -> Vec<&str> {
        self.script
            .iter()
            .take(limit)
            .map(|entry| entry.question.as_str())
            .collect()
    }

    pub fn compatibility(&self) -> CompatibilityBand {
        CompatibilityBand::for_flag_count(self.red_flags.len())
    }
}

/// Display band derived from a scenario's flag count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityBand {
    Low,
    Medium,
    High,
}

impl CompatibilityBand {
    pub fn for_flag_count(count: usize) -> Self {
        match count {
            0 => Self::Low,
            1..=2 => Self::Medium,
            _ => Self::High,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW COMPATIBILITY",
            Self::Medium => "MEDIUM COMPATIBILITY",
            Self::High => "HIGH COMPATIBILITY",
        }
    }
}

/// Who produced a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerRole {
    Trainee,
    Scenario,
}

impl SpeakerRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Trainee => "You",
            Self::Scenario => "Scenario",
        }
    }
}

/// Append-only transcript line owned by a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub at: DateTime<Utc>,
    pub role: SpeakerRole,
    pub content: String,
}

/// The trainee's final call on a scenario, echoed into the debrief report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraineeDecision {
    pub label: String,
    pub rationale: String,
}
