use super::config::{Algorithm, ScoringConfig, TraditionalConfig};

fn check_traditional(prefix: &str, config: &TraditionalConfig, errors: &mut Vec<String>) {
    if !config.step.is_finite() || config.step < 0.0 {
        errors.push(format!("{}.step: must be non-negative, got {}", prefix, config.step));
    }
    if !config.first_place_points.is_finite() || config.first_place_points <= 0.0 {
        errors.push(format!(
            "{}.firstPlacePoints: must be positive, got {}",
            prefix, config.first_place_points
        ));
    }
}

/// Validate scoring configuration before ranking.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    match &config.algorithm {
        Algorithm::Traditional(traditional) => {
            check_traditional("scoring.traditional", traditional, &mut errors);
        }
        Algorithm::Custom { table, traditional } => {
            check_traditional("scoring.traditional", traditional, &mut errors);
            for (place, points) in &table.overrides {
                if *place == 0 {
                    errors.push("scoring.customTable.overrides: places start at 1".to_string());
                }
                if !points.is_finite() {
                    errors.push(format!(
                        "scoring.customTable.overrides[{}]: invalid points {}",
                        place, points
                    ));
                }
            }
        }
        Algorithm::PScore(_) | Algorithm::WinnerTakesMore | Algorithm::Online => {}
    }

    let tiebreaker = &config.tiebreaker;
    if tiebreaker.uses_head_to_head() {
        match tiebreaker.head_to_head_event_id.as_deref() {
            None => errors.push(
                "scoring.tiebreaker.headToHeadEventId: required for head_to_head tiebreaker".to_string(),
            ),
            Some(id) if id.trim().is_empty() => {
                errors.push("scoring.tiebreaker.headToHeadEventId: must not be empty".to_string())
            }
            Some(_) => {}
        }
    }
    if tiebreaker.secondary.is_some() && tiebreaker.secondary == Some(tiebreaker.primary) {
        errors.push(format!(
            "scoring.tiebreaker.secondary: same as primary ({:?})",
            tiebreaker.primary
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Like [`validate_scoring`], and also checks that a head-to-head event is
/// one of `event_ids`.
pub fn validate_scoring_for_events(config: &ScoringConfig, event_ids: &[&str]) -> Result<(), Vec<String>> {
    let mut errors = validate_scoring(config).err().unwrap_or_default();

    if let Some(id) = config.tiebreaker.head_to_head_event_id.as_deref() {
        if config.tiebreaker.uses_head_to_head() && !id.trim().is_empty() && !event_ids.contains(&id) {
            errors.push(format!("scoring.tiebreaker.headToHeadEventId: unknown event '{}'", id));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
