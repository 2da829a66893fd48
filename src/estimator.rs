// src/estimator.rs

use crate::config::AdaptiveConfig;
use crate::constants::{HEURISTIC_DISTANCE_SLOPE, HEURISTIC_SCALE_MAX, HEURISTIC_SCALE_MIN};
use crate::error::{ensure_finite, Result};
use log::debug;
use serde::{Deserialize, Serialize};

/// Running ability estimate and its standard error.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AbilityEstimate {
    pub theta: f64,
    pub standard_error: f64,
}

pub fn initialize(config: &AdaptiveConfig) -> AbilityEstimate {
    AbilityEstimate {
        theta: config.initial_ability,
        standard_error: config.initial_standard_error,
    }
}

/// 3PL probability of a correct response.
pub fn probability_correct(config: &AdaptiveConfig, theta: f64, difficulty: f64) -> f64 {
    let c = config.irt_params.guessing;
    c + (1.0 - c) * logistic(config.irt_params.discrimination * (theta - difficulty))
}

/// 2PL item information at `theta`, normalized to 1.0 when difficulty == theta.
pub fn relative_information(config: &AdaptiveConfig, theta: f64, difficulty: f64) -> f64 {
    let p = logistic(config.irt_params.discrimination * (theta - difficulty));
    4.0 * p * (1.0 - p)
}

/// Applies one response. Correct answers always raise theta, incorrect ones always lower it.
pub fn update(
    config: &AdaptiveConfig,
    current: AbilityEstimate,
    was_correct: bool,
    item_difficulty: f64,
) -> Result<AbilityEstimate> {
    let theta = ensure_finite("theta", current.theta)?;
    let se = ensure_finite("standard error", current.standard_error)?;
    let difficulty = ensure_finite("item difficulty", item_difficulty)?;

    let scale = step_scale(config, theta, difficulty, was_correct);
    let delta = if was_correct {
        config.difficulty_increment_correct * scale
    } else {
        -config.difficulty_decrement_incorrect * scale
    };
    let new_theta = config.clamp_theta(theta + delta);

    let info = relative_information(config, theta, difficulty);
    let decay = config.se_decay_base - config.se_information_bonus * info;
    let new_se = (se * decay).max(config.se_floor).min(se);

    debug!(
        "[Theta] correct: {}, b: {:.2}, scale: {:.3} | theta {:.3} -> {:.3}, SE {:.3} -> {:.3}",
        was_correct, difficulty, scale, theta, new_theta, se, new_se
    );

    Ok(AbilityEstimate {
        theta: new_theta,
        standard_error: new_se,
    })
}

// Strictly positive multiplier on the configured step size.
fn step_scale(config: &AdaptiveConfig, theta: f64, difficulty: f64, was_correct: bool) -> f64 {
    if config.enable_adaptive_difficulty {
        let p = probability_correct(config, theta, difficulty);
        if was_correct {
            2.0 * (1.0 - p)
        } else {
            2.0 * p
        }
    } else {
        let gap = (difficulty - theta) * HEURISTIC_DISTANCE_SLOPE;
        let raw = if was_correct { 1.0 + gap } else { 1.0 - gap };
        raw.clamp(HEURISTIC_SCALE_MIN, HEURISTIC_SCALE_MAX)
    }
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssessmentError;

    fn at(theta: f64, standard_error: f64) -> AbilityEstimate {
        AbilityEstimate {
            theta,
            standard_error,
        }
    }

    #[test]
    fn initialize_uses_config_start_state() {
        let config = AdaptiveConfig::default();
        assert_eq!(initialize(&config), at(0.0, 1.5));
    }

    #[test]
    fn correct_raises_and_incorrect_lowers_theta() {
        let config = AdaptiveConfig::default();
        let up = update(&config, at(0.0, 1.5), true, 0.2).unwrap();
        let down = update(&config, at(0.0, 1.5), false, 0.2).unwrap();
        assert!(up.theta > 0.0);
        assert!(down.theta < 0.0);
    }

    #[test]
    fn harder_items_reward_more_when_correct() {
        let config = AdaptiveConfig::default();
        let easy = update(&config, at(0.0, 1.5), true, -1.5).unwrap();
        let hard = update(&config, at(0.0, 1.5), true, 1.5).unwrap();
        assert!(hard.theta > easy.theta);
    }

    #[test]
    fn easier_items_cost_more_when_missed() {
        let config = AdaptiveConfig::default();
        let easy = update(&config, at(0.0, 1.5), false, -1.5).unwrap();
        let hard = update(&config, at(0.0, 1.5), false, 1.5).unwrap();
        assert!(easy.theta < hard.theta);
    }

    #[test]
    fn heuristic_mode_keeps_direction() {
        let config = AdaptiveConfig {
            enable_adaptive_difficulty: false,
            ..AdaptiveConfig::default()
        };
        let up = update(&config, at(1.0, 1.0), true, -3.0).unwrap();
        let down = update(&config, at(1.0, 1.0), false, 3.0).unwrap();
        // Scale bottoms out at 0.5 of the configured step.
        assert!((up.theta - 1.25).abs() < 1e-9);
        assert!((down.theta - 0.75).abs() < 1e-9);
    }

    #[test]
    fn theta_is_clamped_to_bounds() {
        let config = AdaptiveConfig::default();
        let top = update(&config, at(2.95, 1.0), true, 3.0).unwrap();
        let bottom = update(&config, at(-2.95, 1.0), false, -3.0).unwrap();
        assert_eq!(top.theta, 3.0);
        assert_eq!(bottom.theta, -3.0);
    }

    #[test]
    fn standard_error_shrinks_more_for_matched_items() {
        let config = AdaptiveConfig::default();
        let matched = update(&config, at(0.0, 1.0), true, 0.0).unwrap();
        let distant = update(&config, at(0.0, 1.0), true, 3.0).unwrap();
        assert!(matched.standard_error < distant.standard_error);
        assert!(distant.standard_error <= 1.0 * config.se_decay_base + 1e-12);
    }

    #[test]
    fn standard_error_never_drops_below_floor() {
        let config = AdaptiveConfig::default();
        let mut estimate = at(0.0, 0.06);
        for _ in 0..10 {
            estimate = update(&config, estimate, true, estimate.theta).unwrap();
        }
        assert_eq!(estimate.standard_error, config.se_floor);
    }

    #[test]
    fn nan_difficulty_fails_fast() {
        let config = AdaptiveConfig::default();
        assert!(matches!(
            update(&config, at(0.0, 1.5), true, f64::NAN),
            Err(AssessmentError::InvalidInput(_))
        ));
    }

    #[test]
    fn probability_respects_guessing_floor() {
        let config = AdaptiveConfig::default();
        let p = probability_correct(&config, -3.0, 3.0);
        assert!(p > config.irt_params.guessing);
        assert!(p < 0.26);
        assert!((relative_information(&config, 0.7, 0.7) - 1.0).abs() < 1e-12);
    }
}
