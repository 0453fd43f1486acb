use chrono::{DateTime, Utc};

use super::domain::{ScenarioRecord, SpeakerRole};
use super::session::TrainingSession;

/// Assembles the plain-text debrief handed back to the trainee. Rendering is
/// byte-reproducible from the session and scenario given a fixed clock.
pub struct DebriefReport<'a> {
    scenario: &'a ScenarioRecord,
    session: &'a TrainingSession,
}

impl<'a> DebriefReport<'a> {
    pub fn new(scenario: &'a ScenarioRecord, session: &'a TrainingSession) -> Self {
        Self { scenario, session }
    }

    pub fn render(&self, now: DateTime<Utc>) -> String {
        let decision = match self.session.decision() {
            Some(decision) => format!("{} ({})", decision.label, decision.rationale),
            None => "pending".to_string(),
        };

        let confirmed = self
            .session
            .last_feedback()
            .map(|feedback| feedback.correct.len())
            .unwrap_or(0);
        let required = self.scenario.required_protocols.len();

        let elapsed = self.session.elapsed(now).num_seconds().max(0);

        let mut lines = vec![
            "Training Debrief".to_string(),
            format!("Scenario: {}", self.scenario.name),
            format!("Decision: {decision}"),
            format!("Final score: {}", self.session.score()),
            format!("Protocols confirmed: {confirmed}/{required}"),
            format!("Time elapsed: {}", format_elapsed(elapsed)),
            String::new(),
            "Red flags:".to_string(),
        ];

        if self.scenario.red_flags.is_empty() {
            lines.push("No red flags detected".to_string());
        } else {
            lines.extend(self.scenario.red_flags.iter().cloned());
        }

        lines.push(String::new());
        lines.push("Transcript:".to_string());
        if self.session.conversation().is_empty() {
            lines.push("(no questions asked)".to_string());
        } else {
            for entry in self.session.conversation() {
                let speaker = match entry.role {
                    SpeakerRole::Trainee => SpeakerRole::Trainee.label(),
                    SpeakerRole::Scenario => self.scenario.name.as_str(),
                };
                lines.push(format!(
                    "[{}] {}: {}",
                    entry.at.format("%H:%M:%S"),
                    speaker,
                    entry.content
                ));
            }
        }

        let mut report = lines.join("\n");
        report.push('\n');
        report
    }
}

fn format_elapsed(total_seconds: i64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
