// src/stopping.rs

use crate::config::AdaptiveConfig;
use crate::models::AssessmentStatus;

/// Termination rule, checked after every answer.
///
/// - below `min_questions`: never stop
/// - at or above `max_questions`: always stop
/// - otherwise: stop once the standard error is at or below the threshold
pub fn should_stop_assessment(
    config: &AdaptiveConfig,
    answered_count: u32,
    standard_error: f64,
) -> bool {
    if answered_count < config.min_questions {
        return false;
    }
    if answered_count >= config.max_questions {
        return true;
    }
    standard_error <= config.stopping_sem_threshold
}

pub fn evaluate(config: &AdaptiveConfig, answered_count: u32, standard_error: f64) -> AssessmentStatus {
    if should_stop_assessment(config, answered_count, standard_error) {
        AssessmentStatus::Complete
    } else {
        AssessmentStatus::InProgress
    }
}
