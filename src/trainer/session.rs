use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ConversationEntry, ScenarioId, ScenarioRecord, SessionId, SpeakerRole, TraineeDecision,
};
use super::hints;
use super::matching;
use super::protocol::{self, ProtocolFeedback};
use super::scoring::ScoringPolicy;

/// Canned reply recorded when no script entry matches the question.
pub const FALLBACK_REPLY: &str = "I'm not sure what you mean.";

/// Result of submitting a question. Unrecognized questions are an expected
/// outcome, not an error; the scoring policy decides the consequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExchangeOutcome {
    Answered {
        reply: String,
        emotion: String,
        red_flag_hit: bool,
        score: i32,
    },
    Unrecognized {
        reply: String,
        score: i32,
    },
}

/// Result of revealing hints. Refusal mutates nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HintOutcome {
    Revealed {
        hints: Vec<String>,
        charged: bool,
        score: i32,
    },
    Refused {
        score: i32,
    },
}

/// Result of a protocol validation pass. `score_delta` is the nominal delta
/// before any floor or ceiling clamping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolReview {
    pub feedback: ProtocolFeedback,
    pub score_delta: i32,
    pub score: i32,
}

/// Mutable per-session state bag, exclusively owned by one active session.
/// All mutation goes through the action methods so that the score and the
/// transcript never disagree about what triggered a change; rendering layers
/// only use the read accessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSession {
    session_id: SessionId,
    active_scenario: Option<ScenarioId>,
    score: i32,
    started_at: DateTime<Utc>,
    conversation: Vec<ConversationEntry>,
    selected_protocols: BTreeSet<String>,
    last_feedback: Option<ProtocolFeedback>,
    hints_revealed: bool,
    decision: Option<TraineeDecision>,
}

impl TrainingSession {
    pub fn new(session_id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            session_id,
            active_scenario: None,
            score: 0,
            started_at: now,
            conversation: Vec::new(),
            selected_protocols: BTreeSet::new(),
            last_feedback: None,
            hints_revealed: false,
            decision: None,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn active_scenario(&self) -> Option<ScenarioId> {
        self.active_scenario
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        now - self.started_at
    }

    pub fn conversation(&self) -> &[ConversationEntry] {
        &self.conversation
    }

    /// The most recent `limit` transcript lines, oldest first.
    pub fn conversation_tail(&self, limit: usize) -> &[ConversationEntry] {
        let start = self.conversation.len().saturating_sub(limit);
        &self.conversation[start..]
    }

    pub fn selected_protocols(&self) -> &BTreeSet<String> {
        &self.selected_protocols
    }

    pub fn last_feedback(&self) -> Option<&ProtocolFeedback> {
        self.last_feedback.as_ref()
    }

    pub fn hints_revealed(&self) -> bool {
        self.hints_revealed
    }

    pub fn decision(&self) -> Option<&TraineeDecision> {
        self.decision.as_ref()
    }

    /// Activate a scenario, resetting the per-scenario state: timer, score,
    /// protocol tracking, hint state, and decision. The conversation log is
    /// cleared only when `reset_conversation` says so; the deployed variants
    /// disagreed, so the choice is configuration. Re-selecting the already
    /// active scenario is a no-op.
    pub fn select_scenario(
        &mut self,
        scenario: &ScenarioRecord,
        now: DateTime<Utc>,
        reset_conversation: bool,
    ) {
        if self.active_scenario == Some(scenario.id) {
            return;
        }

        self.active_scenario = Some(scenario.id);
        self.started_at = now;
        self.score = 0;
        self.selected_protocols.clear();
        self.last_feedback = None;
        self.hints_revealed = false;
        self.decision = None;
        if reset_conversation {
            self.conversation.clear();
        }
    }

    /// Submit a trainee question: resolve it against the scenario script,
    /// record both transcript lines, and apply the scoring policy in one
    /// step.
    pub fn submit_question(
        &mut self,
        scenario: &ScenarioRecord,
        policy: &ScoringPolicy,
        utterance: &str,
        now: DateTime<Utc>,
    ) -> ExchangeOutcome {
        self.push_entry(now, SpeakerRole::Trainee, utterance.trim().to_string());

        match matching::find_response(scenario, utterance) {
            Some(entry) => {
                let red_flag_hit = matching::response_hits_red_flag(scenario, entry);
                self.score = policy.score_after_match(self.score, red_flag_hit);
                self.push_entry(now, SpeakerRole::Scenario, entry.response.clone());
                ExchangeOutcome::Answered {
                    reply: entry.response.clone(),
                    emotion: entry.emotion.clone(),
                    red_flag_hit,
                    score: self.score,
                }
            }
            None => {
                self.score = policy.score_after_unmatched(self.score);
                self.push_entry(now, SpeakerRole::Scenario, FALLBACK_REPLY.to_string());
                ExchangeOutcome::Unrecognized {
                    reply: FALLBACK_REPLY.to_string(),
                    score: self.score,
                }
            }
        }
    }

    /// Add or remove a protocol from the pending selection. No scoring
    /// happens until validation.
    pub fn toggle_protocol(&mut self, protocol: &str, selected: bool) {
        let protocol = protocol.trim();
        if protocol.is_empty() {
            return;
        }
        if selected {
            self.selected_protocols.insert(protocol.to_string());
        } else {
            self.selected_protocols.remove(protocol);
        }
    }

    /// Partition the current selection against the scenario's required
    /// protocols, score the result, and retain the feedback for rendering
    /// and the debrief report.
    pub fn validate_protocols(
        &mut self,
        scenario: &ScenarioRecord,
        policy: &ScoringPolicy,
    ) -> ProtocolReview {
        let required: BTreeSet<String> = scenario.required_protocols.iter().cloned().collect();
        let feedback = protocol::validate(&self.selected_protocols, &required);
        let score_delta = policy.protocol_delta(&feedback);
        self.score = policy.score_after_validation(self.score, &feedback);
        self.last_feedback = Some(feedback.clone());

        ProtocolReview {
            feedback,
            score_delta,
            score: self.score,
        }
    }

    /// Reveal the scenario's protocols in masked form. The cost is charged
    /// once per scenario; a reveal with a non-positive score is refused
    /// without touching any state.
    pub fn reveal_hints(
        &mut self,
        scenario: &ScenarioRecord,
        policy: &ScoringPolicy,
    ) -> HintOutcome {
        let hints: Vec<String> = scenario
            .required_protocols
            .iter()
            .map(|protocol| hints::mask_citation(protocol))
            .collect();

        if self.hints_revealed || hints.is_empty() {
            return HintOutcome::Revealed {
                hints,
                charged: false,
                score: self.score,
            };
        }

        match policy.hint_debit(self.score) {
            Some(next) => {
                self.score = next;
                self.hints_revealed = true;
                HintOutcome::Revealed {
                    hints,
                    charged: true,
                    score: self.score,
                }
            }
            None => HintOutcome::Refused { score: self.score },
        }
    }

    pub fn record_decision(&mut self, decision: TraineeDecision) {
        self.decision = Some(decision);
    }

    fn push_entry(&mut self, at: DateTime<Utc>, role: SpeakerRole, content: String) {
        self.conversation.push(ConversationEntry { at, role, content });
    }
}
