use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use super::types::Competition;
use crate::scoring::ScoringConfig;

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Read a JSON or YAML document, chosen by file extension.
fn load_document<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} at {}", what, path.display()))?;

    if is_json(path) {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}: invalid JSON in {}", what, path.display()))
    } else {
        serde_saphyr::from_str(&content)
            .with_context(|| format!("Failed to parse {}: invalid YAML in {}", what, path.display()))
    }
}

pub fn load_competition(path: &Path) -> Result<Competition> {
    let competition: Competition = load_document(path, "competition")?;
    log::debug!(
        "loaded {} events, {} athletes, {} results from {}",
        competition.events.len(),
        competition.athletes.len(),
        competition.results.len(),
        path.display()
    );
    Ok(competition)
}

/// Load a standalone scoring config.
pub fn load_scoring_config(path: &Path) -> Result<ScoringConfig> {
    load_document(path, "scoring config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Algorithm;
    use tempfile::TempDir;

    #[test]
    fn test_load_yaml_and_json() {
        let dir = TempDir::new().unwrap();

        let yaml = dir.path().join("comp.yaml");
        fs::write(&yaml, "events:\n  - id: e1\n    scheme: reps\n").unwrap();
        let comp = load_competition(&yaml).unwrap();
        assert_eq!(comp.events.len(), 1);

        let json = dir.path().join("comp.JSON");
        fs::write(&json, r#"{"events": [{"id": "e1", "scheme": "load"}], "athletes": []}"#).unwrap();
        let comp = load_competition(&json).unwrap();
        assert_eq!(comp.events[0].id, "e1");
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        let err = load_competition(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));

        assert!(load_competition(&dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_load_scoring_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scoring.json");
        fs::write(&path, r#"{"algorithm": "online"}"#).unwrap();
        assert_eq!(load_scoring_config(&path).unwrap().algorithm, Algorithm::Online);

        let path = dir.path().join("scoring.yaml");
        fs::write(&path, "algorithm: p_score\n").unwrap();
        let err = load_scoring_config(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("requires a `pScore` block"));
    }
}
