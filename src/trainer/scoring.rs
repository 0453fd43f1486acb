use serde::{Deserialize, Serialize};

use super::protocol::ProtocolFeedback;

/// Scoring dials selected per deployment. The deployed variants never agreed
/// on one rule set, so every divergence is a field here and the presets below
/// reconstruct each observed behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Awarded when a matched response mentions a scenario red flag.
    pub matched_flag_bonus: i32,
    /// Deducted on an unrecognized question. Zero in the lenient variant.
    pub unmatched_penalty: i32,
    /// Awarded per correctly selected protocol on validation.
    pub protocol_hit_bonus: i32,
    /// Deducted per incorrect or missed protocol on validation.
    pub protocol_miss_penalty: i32,
    /// Deducted once when hints are revealed.
    pub hint_cost: i32,
    pub floor: Option<i32>,
    pub ceiling: Option<i32>,
}

impl ScoringPolicy {
    /// Red-flag reward with unbounded score. The no-match penalty differs
    /// between deployments; callers must choose.
    pub fn flag_reward(penalize_unmatched: bool) -> Self {
        Self {
            matched_flag_bonus: 2,
            unmatched_penalty: if penalize_unmatched { 1 } else { 0 },
            protocol_hit_bonus: 2,
            protocol_miss_penalty: 1,
            hint_cost: 1,
            floor: None,
            ceiling: None,
        }
    }

    /// Red-flag reward with the score held inside [0, 10] after every update.
    pub fn clamped_flag_reward() -> Self {
        Self {
            floor: Some(0),
            ceiling: Some(10),
            ..Self::flag_reward(true)
        }
    }

    /// Protocol-validation scoring with a non-negative floor and no ceiling.
    pub fn protocol_set() -> Self {
        Self {
            floor: Some(0),
            ..Self::flag_reward(true)
        }
    }

    fn clamp(&self, score: i32) -> i32 {
        let mut score = score;
        if let Some(ceiling) = self.ceiling {
            score = score.min(ceiling);
        }
        if let Some(floor) = self.floor {
            score = score.max(floor);
        }
        score
    }

    pub fn score_after_match(&self, score: i32, red_flag_hit: bool) -> i32 {
        if red_flag_hit {
            self.clamp(score + self.matched_flag_bonus)
        } else {
            score
        }
    }

    pub fn score_after_unmatched(&self, score: i32) -> i32 {
        self.clamp(score - self.unmatched_penalty)
    }

    /// Nominal validation delta before any clamping:
    /// `hit_bonus * |correct| - miss_penalty * (|incorrect| + |missed|)`.
    pub fn protocol_delta(&self, feedback: &ProtocolFeedback) -> i32 {
        let hits = feedback.correct.len() as i32;
        let misses = (feedback.incorrect.len() + feedback.missed.len()) as i32;
        self.protocol_hit_bonus * hits - self.protocol_miss_penalty * misses
    }

    pub fn score_after_validation(&self, score: i32, feedback: &ProtocolFeedback) -> i32 {
        self.clamp(score + self.protocol_delta(feedback))
    }

    /// Score after paying for a hint reveal, or `None` when the reveal must
    /// be refused because the current score is not positive. A reveal never
    /// drives the score below zero.
    pub fn hint_debit(&self, score: i32) -> Option<i32> {
        if score > 0 {
            Some((score - self.hint_cost).max(0))
        } else {
            None
        }
    }
}

/// Resolve a policy preset by its configuration name.
pub fn preset(name: &str) -> Option<ScoringPolicy> {
    match name.trim().to_ascii_lowercase().as_str() {
        "flag-reward" => Some(ScoringPolicy::flag_reward(true)),
        "flag-reward-lenient" => Some(ScoringPolicy::flag_reward(false)),
        "clamped-flag-reward" => Some(ScoringPolicy::clamped_flag_reward()),
        "protocol-set" => Some(ScoringPolicy::protocol_set()),
        _ => None,
    }
}
