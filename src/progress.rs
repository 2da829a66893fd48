// src/progress.rs
//
// Progress-bar hint for the UI. Deliberately separate from `stopping`: nothing
// here feeds back into when a session actually ends.

use crate::config::{answers_to_reach, AdaptiveConfig};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionsRemaining {
    pub min: u32,
    pub max: u32,
    pub estimate: u32,
}

pub fn estimate_questions_remaining(
    config: &AdaptiveConfig,
    answered_count: u32,
    standard_error: f64,
) -> QuestionsRemaining {
    let min = config.min_questions.saturating_sub(answered_count);
    let max = config.max_questions.saturating_sub(answered_count);

    let reachable = config.se_floor < config.stopping_sem_threshold;
    let to_converge = if standard_error.is_finite() && reachable {
        answers_to_reach(
            standard_error,
            config.stopping_sem_threshold,
            config.mean_se_decay(),
        )
    } else {
        max
    };

    QuestionsRemaining {
        min,
        max,
        estimate: to_converge.clamp(min, max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_bounds() {
        let config = AdaptiveConfig::default();
        let r = estimate_questions_remaining(&config, 0, 1.5);
        assert_eq!(r.min, 8);
        assert_eq!(r.max, 15);
        assert!(r.estimate >= 8 && r.estimate <= 15);
    }

    #[test]
    fn unreachable_threshold_estimates_the_forced_stop() {
        let config = AdaptiveConfig {
            se_floor: 0.4,
            ..AdaptiveConfig::default()
        };
        let r = estimate_questions_remaining(&config, 7, 0.4);
        assert_eq!(r, QuestionsRemaining { min: 1, max: 8, estimate: 8 });
    }

    #[test]
    fn converged_session_estimates_the_floor() {
        let config = AdaptiveConfig::default();
        let r = estimate_questions_remaining(&config, 5, 0.2);
        assert_eq!(r, QuestionsRemaining { min: 3, max: 10, estimate: 3 });
    }

    #[test]
    fn nothing_left_after_ceiling() {
        let config = AdaptiveConfig::default();
        let r = estimate_questions_remaining(&config, 15, 1.0);
        assert_eq!(r, QuestionsRemaining { min: 0, max: 0, estimate: 0 });
    }

    #[test]
    fn estimate_falls_with_standard_error() {
        let config = AdaptiveConfig::default();
        let mut last = u32::MAX;
        for se in [1.5, 1.2, 0.9, 0.6, 0.45, 0.31, 0.3] {
            let r = estimate_questions_remaining(&config, 8, se);
            assert!(r.estimate <= last, "estimate rose at SE {}", se);
            last = r.estimate;
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn estimate_falls_with_answered_count() {
        let config = AdaptiveConfig::default();
        let mut last = u32::MAX;
        for answered in 0..=15 {
            let r = estimate_questions_remaining(&config, answered, 0.8);
            assert!(r.estimate <= last);
            last = r.estimate;
        }
    }

    #[test]
    fn non_finite_error_assumes_the_ceiling() {
        let config = AdaptiveConfig::default();
        let r = estimate_questions_remaining(&config, 2, f64::NAN);
        assert_eq!(r.estimate, 13);
    }
}
