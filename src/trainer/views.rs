use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    CompatibilityBand, ConversationEntry, ScenarioId, ScenarioRecord, SpeakerRole, TraineeDecision,
};
use super::protocol::ProtocolFeedback;
use super::session::TrainingSession;

/// How many transcript lines renderers show; the full log stays in the
/// session for report export.
pub const CONVERSATION_TAIL: usize = 5;

const SUGGESTED_OPENERS: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSummaryView {
    pub id: ScenarioId,
    pub name: String,
    pub emotional_state: String,
    pub compatibility: CompatibilityBand,
    pub compatibility_label: &'static str,
    pub red_flag_count: usize,
    pub protocol_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioDetailView {
    pub id: ScenarioId,
    pub name: String,
    pub profile: BTreeMap<String, String>,
    pub emotional_state: String,
    pub compatibility: CompatibilityBand,
    pub compatibility_label: &'static str,
    pub red_flags: Vec<String>,
    pub required_protocols: Vec<String>,
    pub suggested_openers: Vec<String>,
}

impl ScenarioSummaryView {
    pub fn from_record(record: &ScenarioRecord) -> Self {
        let band = record.compatibility();
        Self {
            id: record.id,
            name: record.name.clone(),
            emotional_state: record.emotional_state.clone(),
            compatibility: band,
            compatibility_label: band.label(),
            red_flag_count: record.red_flags.len(),
            protocol_count: record.required_protocols.len(),
        }
    }
}

impl ScenarioDetailView {
    pub fn from_record(record: &ScenarioRecord) -> Self {
        let band = record.compatibility();
        Self {
            id: record.id,
            name: record.name.clone(),
            profile: record.profile.clone(),
            emotional_state: record.emotional_state.clone(),
            compatibility: band,
            compatibility_label: band.label(),
            red_flags: record.red_flags.clone(),
            required_protocols: record.required_protocols.clone(),
            suggested_openers: record
                .suggested_openers(SUGGESTED_OPENERS)
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationEntryView {
    pub time: String,
    pub role: SpeakerRole,
    pub speaker: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<ScenarioSummaryView>,
    pub score: i32,
    pub started_at: DateTime<Utc>,
    pub conversation: Vec<ConversationEntryView>,
    pub selected_protocols: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_feedback: Option<ProtocolFeedback>,
    pub hints_revealed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<TraineeDecision>,
}

impl SessionView {
    /// Build the renderer-facing view: scenario header, bounded transcript
    /// tail, and the current score/protocol state.
    pub fn from_session(session: &TrainingSession, scenario: Option<&ScenarioRecord>) -> Self {
        let conversation = session
            .conversation_tail(CONVERSATION_TAIL)
            .iter()
            .map(|entry| conversation_entry_view(entry, scenario))
            .collect();

        Self {
            session_id: session.session_id().to_string(),
            scenario: scenario.map(ScenarioSummaryView::from_record),
            score: session.score(),
            started_at: session.started_at(),
            conversation,
            selected_protocols: session.selected_protocols().iter().cloned().collect(),
            protocol_feedback: session.last_feedback().cloned(),
            hints_revealed: session.hints_revealed(),
            decision: session.decision().cloned(),
        }
    }
}

fn conversation_entry_view(
    entry: &ConversationEntry,
    scenario: Option<&ScenarioRecord>,
) -> ConversationEntryView {
    let speaker = match entry.role {
        SpeakerRole::Trainee => SpeakerRole::Trainee.label().to_string(),
        SpeakerRole::Scenario => scenario
            .map(|record| record.name.clone())
            .unwrap_or_else(|| SpeakerRole::Scenario.label().to_string()),
    };

    ConversationEntryView {
        time: entry.at.format("%H:%M:%S").to_string(),
        role: entry.role,
        speaker,
        content: entry.content.clone(),
    }
}
