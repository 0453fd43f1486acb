use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::trainer::catalog::{CatalogDocument, ScenarioCatalog};
use crate::trainer::domain::{ScenarioId, ScenarioRecord, ScriptEntry, SessionId};
use crate::trainer::repository::{MemorySessionStore, SessionRepository, SessionStoreError};
use crate::trainer::scoring::ScoringPolicy;
use crate::trainer::service::{TrainerOptions, TrainerService};
use crate::trainer::session::TrainingSession;

/// Fixed session clock: a known instant plus an offset in seconds.
pub(super) fn clock(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0)
        .single()
        .expect("valid base instant")
        + Duration::seconds(seconds)
}

pub(super) fn entry(question: &str, response: &str, emotion: &str) -> ScriptEntry {
    ScriptEntry {
        question: question.to_string(),
        response: response.to_string(),
        emotion: emotion.to_string(),
    }
}

pub(super) fn border_scenario() -> ScenarioRecord {
    let mut profile = BTreeMap::new();
    profile.insert("nationality".to_string(), "India".to_string());
    profile.insert("visa_type".to_string(), "Tourist (B-2)".to_string());

    ScenarioRecord {
        id: ScenarioId(1),
        name: "Arjun Mehta".to_string(),
        profile,
        emotional_state: "nervous".to_string(),
        red_flags: vec![
            "business conference".to_string(),
            "return ticket is not booked".to_string(),
        ],
        required_protocols: vec![
            "Verify visa class under INA 214(b)".to_string(),
            "Check entry stamps against I-94 arrival records".to_string(),
            "Escalate to secondary inspection per CBP Directive 3340-030".to_string(),
        ],
        script: vec![
            entry(
                "What is your purpose for visiting?",
                "Tourism, mostly. Well, there is also a business conference I was hoping to attend.",
                "hesitant",
            ),
            entry(
                "How long will you stay?",
                "Two weeks, although my return ticket is not booked yet. I was waiting on prices.",
                "defensive",
            ),
            entry(
                "Where will you be staying?",
                "With my cousin in Queens. I have the address written down somewhere.",
                "calm",
            ),
        ],
    }
}

pub(super) fn dating_scenario() -> ScenarioRecord {
    ScenarioRecord {
        id: ScenarioId(101),
        name: "Maya".to_string(),
        profile: BTreeMap::new(),
        emotional_state: "upbeat".to_string(),
        red_flags: vec!["hiking".to_string(), "graphic novels".to_string()],
        required_protocols: Vec::new(),
        script: vec![
            entry(
                "What do you do for fun?",
                "Mostly hiking on weekends, and I collect graphic novels.",
                "enthusiastic",
            ),
            entry(
                "Do you like to travel?",
                "I do! Last year I walked part of the Camino with my sister.",
                "happy",
            ),
        ],
    }
}

pub(super) fn catalog_document() -> CatalogDocument {
    let mut document = CatalogDocument::new();
    document.insert("border_security".to_string(), vec![border_scenario()]);
    document.insert("dating".to_string(), vec![dating_scenario()]);
    document
}

pub(super) fn catalog() -> ScenarioCatalog {
    ScenarioCatalog::from_document(catalog_document()).expect("catalog builds")
}

pub(super) fn build_service(
    policy: ScoringPolicy,
) -> (TrainerService<MemorySessionStore>, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::default());
    let service = TrainerService::new(
        Arc::new(catalog()),
        store.clone(),
        TrainerOptions::new(policy),
    );
    (service, store)
}

/// Store that fails every operation, for exercising 500 mappings.
pub(super) struct UnavailableStore;

impl SessionRepository for UnavailableStore {
    fn insert(&self, _session: TrainingSession) -> Result<(), SessionStoreError> {
        Err(SessionStoreError::Unavailable("store offline".to_string()))
    }

    fn update(&self, _session: TrainingSession) -> Result<(), SessionStoreError> {
        Err(SessionStoreError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<TrainingSession>, SessionStoreError> {
        Err(SessionStoreError::Unavailable("store offline".to_string()))
    }

    fn remove(&self, _id: &SessionId) -> Result<(), SessionStoreError> {
        Err(SessionStoreError::Unavailable("store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf8 payload")
}
