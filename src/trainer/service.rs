use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::catalog::ScenarioCatalog;
use super::domain::{ScenarioId, ScenarioRecord, SessionId, TraineeDecision};
use super::report::DebriefReport;
use super::repository::{SessionRepository, SessionStoreError};
use super::scoring::ScoringPolicy;
use super::session::{ExchangeOutcome, HintOutcome, ProtocolReview, TrainingSession};

/// Behavior dials that differed across the deployed variants. There is no
/// default: a deployment must pick its scoring policy explicitly.
#[derive(Debug, Clone)]
pub struct TrainerOptions {
    pub policy: ScoringPolicy,
    pub reset_conversation_on_switch: bool,
}

impl TrainerOptions {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self {
            policy,
            reset_conversation_on_switch: true,
        }
    }
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("sess-{id:06}"))
}

/// Service composing the read-only catalog, the session store, and the
/// scoring policy. Every action fetches the session, applies the mutation,
/// and writes it back; clock instants always come from the caller so the
/// core stays deterministic.
pub struct TrainerService<R> {
    catalog: Arc<ScenarioCatalog>,
    sessions: Arc<R>,
    options: TrainerOptions,
}

impl<R> TrainerService<R>
where
    R: SessionRepository + 'static,
{
    pub fn new(catalog: Arc<ScenarioCatalog>, sessions: Arc<R>, options: TrainerOptions) -> Self {
        Self {
            catalog,
            sessions,
            options,
        }
    }

    pub fn catalog(&self) -> &ScenarioCatalog {
        &self.catalog
    }

    pub fn options(&self) -> &TrainerOptions {
        &self.options
    }

    /// Open a fresh session, optionally activating a scenario immediately.
    pub fn start_session(
        &self,
        scenario: Option<ScenarioId>,
        now: DateTime<Utc>,
    ) -> Result<TrainingSession, TrainerError> {
        let mut session = TrainingSession::new(next_session_id(), now);

        if let Some(id) = scenario {
            let record = self.scenario(id)?;
            session.select_scenario(record, now, self.options.reset_conversation_on_switch);
        }

        self.sessions.insert(session.clone())?;
        Ok(session)
    }

    pub fn session(&self, id: &SessionId) -> Result<TrainingSession, TrainerError> {
        self.sessions
            .fetch(id)?
            .ok_or_else(|| TrainerError::UnknownSession(id.clone()))
    }

    pub fn select_scenario(
        &self,
        id: &SessionId,
        scenario: ScenarioId,
        now: DateTime<Utc>,
    ) -> Result<TrainingSession, TrainerError> {
        let mut session = self.session(id)?;
        let record = self.scenario(scenario)?;
        session.select_scenario(record, now, self.options.reset_conversation_on_switch);
        self.sessions.update(session.clone())?;
        Ok(session)
    }

    pub fn submit_question(
        &self,
        id: &SessionId,
        utterance: &str,
        now: DateTime<Utc>,
    ) -> Result<(ExchangeOutcome, TrainingSession), TrainerError> {
        let mut session = self.session(id)?;
        let record = self.active_record(&session)?;
        let outcome = session.submit_question(record, &self.options.policy, utterance, now);
        self.sessions.update(session.clone())?;
        Ok((outcome, session))
    }

    pub fn toggle_protocol(
        &self,
        id: &SessionId,
        protocol: &str,
        selected: bool,
    ) -> Result<TrainingSession, TrainerError> {
        let mut session = self.session(id)?;
        self.active_record(&session)?;
        session.toggle_protocol(protocol, selected);
        self.sessions.update(session.clone())?;
        Ok(session)
    }

    pub fn validate_protocols(
        &self,
        id: &SessionId,
    ) -> Result<(ProtocolReview, TrainingSession), TrainerError> {
        let mut session = self.session(id)?;
        let record = self.active_record(&session)?;
        let review = session.validate_protocols(record, &self.options.policy);
        self.sessions.update(session.clone())?;
        Ok((review, session))
    }

    pub fn reveal_hints(
        &self,
        id: &SessionId,
    ) -> Result<(HintOutcome, TrainingSession), TrainerError> {
        let mut session = self.session(id)?;
        let record = self.active_record(&session)?;
        let outcome = session.reveal_hints(record, &self.options.policy);
        self.sessions.update(session.clone())?;
        Ok((outcome, session))
    }

    pub fn record_decision(
        &self,
        id: &SessionId,
        decision: TraineeDecision,
    ) -> Result<TrainingSession, TrainerError> {
        let mut session = self.session(id)?;
        self.active_record(&session)?;
        session.record_decision(decision);
        self.sessions.update(session.clone())?;
        Ok(session)
    }

    /// Render the plain-text debrief for the session's active scenario.
    pub fn debrief(&self, id: &SessionId, now: DateTime<Utc>) -> Result<String, TrainerError> {
        let session = self.session(id)?;
        let record = self.active_record(&session)?;
        Ok(DebriefReport::new(record, &session).render(now))
    }

    pub fn end_session(&self, id: &SessionId) -> Result<(), TrainerError> {
        self.sessions.remove(id)?;
        Ok(())
    }

    fn scenario(&self, id: ScenarioId) -> Result<&ScenarioRecord, TrainerError> {
        self.catalog.get(id).ok_or(TrainerError::UnknownScenario(id))
    }

    fn active_record(&self, session: &TrainingSession) -> Result<&ScenarioRecord, TrainerError> {
        let id = session
            .active_scenario()
            .ok_or(TrainerError::NoActiveScenario)?;
        self.scenario(id)
    }
}

/// Error raised by the trainer service. All variants are recoverable by the
/// caller; nothing here is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum TrainerError {
    #[error("scenario {0} not found")]
    UnknownScenario(ScenarioId),
    #[error("session {0} not found")]
    UnknownSession(SessionId),
    #[error("no scenario selected for this session")]
    NoActiveScenario,
    #[error(transparent)]
    Store(#[from] SessionStoreError),
}
