// src/scoring.rs

use crate::config::{AdaptiveConfig, AugmentationLevel};
use crate::constants::{FAST_ANSWER_FRACTION, MODERATE_ANSWER_FRACTION};
use crate::error::{AssessmentError, Result};
use crate::models::ItemLevel;
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub level: AugmentationLevel,
    pub label: String,
    /// Position of theta on the configured scale, 0 to 100.
    pub percentage: f64,
}

/// Maps a final theta onto the augmentation bands.
///
/// Bands are half-open `[min, max)`; the top band also takes `theta == MAX_THETA`
/// since estimates are clamped onto that bound.
pub fn interpret(config: &AdaptiveConfig, theta: f64) -> Interpretation {
    let bands = &config.augmentation_levels;
    let last = bands.len().saturating_sub(1);
    let matched = bands
        .iter()
        .enumerate()
        .find(|(i, band)| band.contains(theta) || (*i == last && theta == band.max_theta));

    match matched {
        Some((_, band)) => Interpretation {
            level: band.level,
            label: band.label.clone(),
            percentage: scale_percentage(config, theta),
        },
        None => {
            warn!("Theta {} fell outside every augmentation band", theta);
            let (level, label) = bands
                .first()
                .map(|b| (b.level, b.label.clone()))
                .unwrap_or((AugmentationLevel::Beginner, "Beginner".to_string()));
            Interpretation {
                level,
                label,
                percentage: 0.0,
            }
        }
    }
}

fn scale_percentage(config: &AdaptiveConfig, theta: f64) -> f64 {
    let lo = config.irt_params.min_theta;
    let hi = config.irt_params.max_theta;
    (((theta - lo) / (hi - lo)) * 100.0).clamp(0.0, 100.0)
}

/// Points for one answer.
///
/// `partial_credit` is the fraction of the answer that was right (multi-select);
/// it is always range-checked but only applies when partial credit is enabled.
pub fn score_item(
    config: &AdaptiveConfig,
    level: ItemLevel,
    was_correct: bool,
    partial_credit: Option<f64>,
) -> Result<f64> {
    if let Some(fraction) = partial_credit {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(AssessmentError::InvalidInput(format!(
                "partial credit must lie in [0, 1], got {}",
                fraction
            )));
        }
    }

    let points = config.scoring.points_for(level);
    match partial_credit {
        Some(fraction) if config.enable_partial_credit => Ok(points * fraction),
        _ => Ok(if was_correct { points } else { 0.0 }),
    }
}

// --- Answer Bonuses ---

/// Bonus for completing every `streak_bonus_interval`-th consecutive correct answer.
/// `streak_before` is the run of correct answers preceding this one.
pub fn streak_bonus(config: &AdaptiveConfig, streak_before: u32, was_correct: bool) -> f64 {
    let interval = config.scoring.streak_bonus_interval.max(1);
    if was_correct && (streak_before + 1) % interval == 0 {
        config.scoring.streak_bonus_points
    } else {
        0.0
    }
}

/// Speed bonus for correct answers, measured against `time_penalty_threshold`.
pub fn time_bonus(config: &AdaptiveConfig, was_correct: bool, seconds: f64) -> f64 {
    let limit = config.time_penalty_threshold;
    if !was_correct {
        0.0
    } else if seconds < limit * FAST_ANSWER_FRACTION {
        config.scoring.fast_answer_bonus
    } else if seconds < limit * MODERATE_ANSWER_FRACTION {
        config.scoring.moderate_answer_bonus
    } else {
        0.0
    }
}
