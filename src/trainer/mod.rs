//! Training-session core: scenario catalog, utterance matching, scoring
//! policies, protocol validation, hint masking, and debrief reports.

pub mod catalog;
pub mod domain;
pub mod hints;
pub mod matching;
pub mod protocol;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;
pub mod views;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogDocument, CatalogError, ScenarioCatalog};
pub use domain::{
    CompatibilityBand, ConversationEntry, ScenarioId, ScenarioRecord, ScriptEntry, SessionId,
    SpeakerRole, TraineeDecision,
};
pub use protocol::ProtocolFeedback;
pub use report::DebriefReport;
pub use repository::{MemorySessionStore, SessionRepository, SessionStoreError};
pub use router::trainer_router;
pub use scoring::ScoringPolicy;
pub use service::{TrainerError, TrainerOptions, TrainerService};
pub use session::{
    ExchangeOutcome, HintOutcome, ProtocolReview, TrainingSession, FALLBACK_REPLY,
};
pub use views::{ScenarioDetailView, ScenarioSummaryView, SessionView};
