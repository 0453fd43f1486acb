use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::warn;

use super::domain::{ScenarioId, ScenarioRecord};
use super::matching;

/// Catalog document shape: named collections of scenario records, e.g.
/// `{"border_security": [...], "dating": [...]}`.
pub type CatalogDocument = BTreeMap<String, Vec<ScenarioRecord>>;

/// Errors raised while loading the scenario catalog. Any failure rejects the
/// whole document; a partial catalog is never accepted.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read scenario catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed scenario catalog: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("duplicate scenario id {id} in collection '{collection}'")]
    DuplicateScenario { id: ScenarioId, collection: String },
    #[error("scenario catalog contains no scenarios")]
    Empty,
}

/// Read-only index of the pre-authored scenarios, keyed by id. Safe to share
/// across sessions behind an `Arc` because nothing mutates after load.
#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    scenarios: BTreeMap<ScenarioId, ScenarioRecord>,
}

impl ScenarioCatalog {
    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        let mut scenarios = BTreeMap::new();

        for (collection, records) in document {
            for record in records {
                if scenarios.contains_key(&record.id) {
                    return Err(CatalogError::DuplicateScenario {
                        id: record.id,
                        collection,
                    });
                }
                warn_on_ambiguous_script(&record);
                scenarios.insert(record.id, record);
            }
        }

        if scenarios.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(Self { scenarios })
    }

    pub fn load_from_reader(reader: impl Read) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::load_from_reader(BufReader::new(file))
    }

    pub fn get(&self, id: ScenarioId) -> Option<&ScenarioRecord> {
        self.scenarios.get(&id)
    }

    /// Scenarios in stable id order.
    pub fn scenarios(&self) -> impl Iterator<Item = &ScenarioRecord> {
        self.scenarios.values()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Sorted union of every scenario's required protocols, for variants that
    /// let the trainee pick from the full universe.
    pub fn all_protocols(&self) -> BTreeSet<String> {
        self.scenarios
            .values()
            .flat_map(|scenario| scenario.required_protocols.iter().cloned())
            .collect()
    }
}

/// Ambiguous questions are tolerated at runtime (first match wins) but worth
/// surfacing to catalog authors.
fn warn_on_ambiguous_script(record: &ScenarioRecord) {
    let mut seen = HashSet::new();
    for entry in &record.script {
        let normalized = matching::normalize(&entry.question);
        if !seen.insert(normalized) {
            warn!(
                scenario = %record.id,
                question = %entry.question,
                "scenario script repeats a normalized question; first entry wins"
            );
        }
    }
}
