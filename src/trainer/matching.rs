use super::domain::{ScenarioRecord, ScriptEntry};

/// Canonical form used for script lookups: surrounding whitespace stripped,
/// lowercased. Matching is exact beyond that; the trainer tests whether the
/// operator asks the right canonical question, not approximate intent.
pub fn normalize(utterance: &str) -> String {
    utterance.trim().to_lowercase()
}

/// First script entry whose normalized question equals the normalized
/// utterance, in declared script order. Pure; the caller records the
/// conversation and applies scoring.
pub fn find_response<'a>(
    scenario: &'a ScenarioRecord,
    utterance: &str,
) -> Option<&'a ScriptEntry> {
    let wanted = normalize(utterance);
    scenario
        .script
        .iter()
        .find(|entry| normalize(&entry.question) == wanted)
}

/// Whether a matched response mentions any of the scenario's red flags.
pub fn response_hits_red_flag(scenario: &ScenarioRecord, entry: &ScriptEntry) -> bool {
    scenario
        .red_flags
        .iter()
        .any(|flag| entry.response.contains(flag.as_str()))
}
