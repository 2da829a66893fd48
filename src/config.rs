// src/config.rs
//
// The adaptive policy table. Built once, validated, then shared read-only
// (usually behind an `Arc`) by every session the engine runs.

use crate::constants::*;
use crate::error::{AssessmentError, Result};
use crate::models::ItemLevel;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Human-facing ability tier derived from the final theta.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AugmentationLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl AugmentationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AugmentationLevel::Beginner => "beginner",
            AugmentationLevel::Intermediate => "intermediate",
            AugmentationLevel::Advanced => "advanced",
            AugmentationLevel::Expert => "expert",
        }
    }
}

impl fmt::Display for AugmentationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `[min_theta, max_theta)` band mapped to a level.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AugmentationBand {
    pub level: AugmentationLevel,
    pub label: String,
    pub min_theta: f64,
    pub max_theta: f64,
}

impl AugmentationBand {
    pub fn new(level: AugmentationLevel, label: &str, min_theta: f64, max_theta: f64) -> Self {
        AugmentationBand {
            level,
            label: label.to_string(),
            min_theta,
            max_theta,
        }
    }

    pub fn contains(&self, theta: f64) -> bool {
        self.min_theta <= theta && theta < self.max_theta
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct IrtParams {
    pub discrimination: f64,
    pub guessing: f64,
    pub min_theta: f64,
    pub max_theta: f64,
}

impl Default for IrtParams {
    fn default() -> Self {
        IrtParams {
            discrimination: IRT_DISCRIMINATION,
            guessing: IRT_GUESSING,
            min_theta: MIN_THETA,
            max_theta: MAX_THETA,
        }
    }
}

/// Points per item level.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ScoringConfig {
    pub foundational_points: f64,
    pub applied_points: f64,
    pub advanced_points: f64,
    pub strategic_points: f64,
    pub streak_bonus_points: f64,
    pub streak_bonus_interval: u32,
    pub fast_answer_bonus: f64,
    pub moderate_answer_bonus: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            foundational_points: FOUNDATIONAL_POINTS,
            applied_points: APPLIED_POINTS,
            advanced_points: ADVANCED_POINTS,
            strategic_points: STRATEGIC_POINTS,
            streak_bonus_points: STREAK_BONUS_POINTS,
            streak_bonus_interval: STREAK_BONUS_INTERVAL,
            fast_answer_bonus: FAST_ANSWER_BONUS,
            moderate_answer_bonus: MODERATE_ANSWER_BONUS,
        }
    }
}

impl ScoringConfig {
    pub fn points_for(&self, level: ItemLevel) -> f64 {
        match level {
            ItemLevel::Foundational => self.foundational_points,
            ItemLevel::Applied => self.applied_points,
            ItemLevel::Advanced => self.advanced_points,
            ItemLevel::Strategic => self.strategic_points,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AdaptiveConfig {
    pub initial_ability: f64,
    pub initial_standard_error: f64,
    pub min_questions: u32,
    pub max_questions: u32,
    pub stopping_sem_threshold: f64,
    pub difficulty_increment_correct: f64,
    pub difficulty_decrement_incorrect: f64,
    pub target_difficulty_offset: f64,
    pub difficulty_search_range: f64,
    pub category_balance_weight: f64,
    pub min_questions_per_category: u32,
    pub time_penalty_threshold: f64,
    pub rapid_answer_threshold: f64,
    pub enable_adaptive_difficulty: bool,
    pub enable_category_rotation: bool,
    pub enable_partial_credit: bool,
    pub se_decay_base: f64,
    pub se_information_bonus: f64,
    pub se_floor: f64,
    pub irt_params: IrtParams,
    pub augmentation_levels: Vec<AugmentationBand>,
    pub scoring: ScoringConfig,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        AdaptiveConfig {
            initial_ability: INITIAL_ABILITY,
            initial_standard_error: INITIAL_STANDARD_ERROR,
            min_questions: MIN_QUESTIONS,
            max_questions: MAX_QUESTIONS,
            stopping_sem_threshold: STOPPING_SEM_THRESHOLD,
            difficulty_increment_correct: DIFFICULTY_INCREMENT_CORRECT,
            difficulty_decrement_incorrect: DIFFICULTY_DECREMENT_INCORRECT,
            target_difficulty_offset: TARGET_DIFFICULTY_OFFSET,
            difficulty_search_range: DIFFICULTY_SEARCH_RANGE,
            category_balance_weight: CATEGORY_BALANCE_WEIGHT,
            min_questions_per_category: MIN_QUESTIONS_PER_CATEGORY,
            time_penalty_threshold: TIME_PENALTY_THRESHOLD,
            rapid_answer_threshold: RAPID_ANSWER_THRESHOLD,
            enable_adaptive_difficulty: true,
            enable_category_rotation: true,
            enable_partial_credit: true,
            se_decay_base: SE_DECAY_BASE,
            se_information_bonus: SE_INFORMATION_BONUS,
            se_floor: SE_FLOOR,
            irt_params: IrtParams::default(),
            augmentation_levels: default_bands(),
            scoring: ScoringConfig::default(),
        }
    }
}

fn default_bands() -> Vec<AugmentationBand> {
    vec![
        AugmentationBand::new(
            AugmentationLevel::Beginner,
            "Beginner",
            MIN_THETA,
            BAND_INTERMEDIATE_MIN,
        ),
        AugmentationBand::new(
            AugmentationLevel::Intermediate,
            "Intermediate",
            BAND_INTERMEDIATE_MIN,
            BAND_ADVANCED_MIN,
        ),
        AugmentationBand::new(
            AugmentationLevel::Advanced,
            "Advanced",
            BAND_ADVANCED_MIN,
            BAND_EXPERT_MIN,
        ),
        AugmentationBand::new(
            AugmentationLevel::Expert,
            "Expert",
            BAND_EXPERT_MIN,
            MAX_THETA,
        ),
    ]
}

impl AdaptiveConfig {
    /// Parses a JSON policy table. Missing fields fall back to the defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AdaptiveConfig = serde_json::from_str(json)?;
        config.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading adaptive config from {:?}", path);
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Consumes the config and returns it only if it passes [`validate`](Self::validate).
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let floats = [
            ("INITIAL_ABILITY", self.initial_ability),
            ("INITIAL_STANDARD_ERROR", self.initial_standard_error),
            ("STOPPING_SEM_THRESHOLD", self.stopping_sem_threshold),
            ("DIFFICULTY_INCREMENT_CORRECT", self.difficulty_increment_correct),
            (
                "DIFFICULTY_DECREMENT_INCORRECT",
                self.difficulty_decrement_incorrect,
            ),
            ("TARGET_DIFFICULTY_OFFSET", self.target_difficulty_offset),
            ("DIFFICULTY_SEARCH_RANGE", self.difficulty_search_range),
            ("CATEGORY_BALANCE_WEIGHT", self.category_balance_weight),
            ("TIME_PENALTY_THRESHOLD", self.time_penalty_threshold),
            ("RAPID_ANSWER_THRESHOLD", self.rapid_answer_threshold),
            ("SE_DECAY_BASE", self.se_decay_base),
            ("SE_INFORMATION_BONUS", self.se_information_bonus),
            ("SE_FLOOR", self.se_floor),
            ("IRT_PARAMS.DISCRIMINATION", self.irt_params.discrimination),
            ("IRT_PARAMS.GUESSING", self.irt_params.guessing),
            ("IRT_PARAMS.MIN_THETA", self.irt_params.min_theta),
            ("IRT_PARAMS.MAX_THETA", self.irt_params.max_theta),
            ("SCORING.FOUNDATIONAL_POINTS", self.scoring.foundational_points),
            ("SCORING.APPLIED_POINTS", self.scoring.applied_points),
            ("SCORING.ADVANCED_POINTS", self.scoring.advanced_points),
            ("SCORING.STRATEGIC_POINTS", self.scoring.strategic_points),
            ("SCORING.STREAK_BONUS_POINTS", self.scoring.streak_bonus_points),
            ("SCORING.FAST_ANSWER_BONUS", self.scoring.fast_answer_bonus),
            ("SCORING.MODERATE_ANSWER_BONUS", self.scoring.moderate_answer_bonus),
        ];
        for (name, value) in floats {
            if !value.is_finite() {
                return Err(invalid(format!("{} must be finite, got {}", name, value)));
            }
        }

        if self.min_questions == 0 {
            return Err(invalid("MIN_QUESTIONS must be at least 1".to_string()));
        }
        if self.min_questions > self.max_questions {
            return Err(invalid(format!(
                "MIN_QUESTIONS ({}) exceeds MAX_QUESTIONS ({})",
                self.min_questions, self.max_questions
            )));
        }

        let irt = &self.irt_params;
        if irt.min_theta >= irt.max_theta {
            return Err(invalid(format!(
                "MIN_THETA ({}) must be below MAX_THETA ({})",
                irt.min_theta, irt.max_theta
            )));
        }
        if !(irt.min_theta..=irt.max_theta).contains(&self.initial_ability) {
            return Err(invalid(format!(
                "INITIAL_ABILITY ({}) lies outside [{}, {}]",
                self.initial_ability, irt.min_theta, irt.max_theta
            )));
        }
        if irt.discrimination <= 0.0 {
            return Err(invalid("IRT_PARAMS.DISCRIMINATION must be positive".to_string()));
        }
        if !(0.0..1.0).contains(&irt.guessing) {
            return Err(invalid("IRT_PARAMS.GUESSING must lie in [0, 1)".to_string()));
        }

        let positive = [
            ("INITIAL_STANDARD_ERROR", self.initial_standard_error),
            ("STOPPING_SEM_THRESHOLD", self.stopping_sem_threshold),
            ("DIFFICULTY_INCREMENT_CORRECT", self.difficulty_increment_correct),
            (
                "DIFFICULTY_DECREMENT_INCORRECT",
                self.difficulty_decrement_incorrect,
            ),
            ("DIFFICULTY_SEARCH_RANGE", self.difficulty_search_range),
            ("TIME_PENALTY_THRESHOLD", self.time_penalty_threshold),
            ("RAPID_ANSWER_THRESHOLD", self.rapid_answer_threshold),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(invalid(format!("{} must be positive, got {}", name, value)));
            }
        }
        if self.rapid_answer_threshold >= self.time_penalty_threshold {
            return Err(invalid(
                "RAPID_ANSWER_THRESHOLD must be below TIME_PENALTY_THRESHOLD".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.category_balance_weight) {
            return Err(invalid("CATEGORY_BALANCE_WEIGHT must lie in [0, 1]".to_string()));
        }
        if self.se_information_bonus < 0.0 || self.se_floor < 0.0 {
            return Err(invalid(
                "SE_INFORMATION_BONUS and SE_FLOOR must not be negative".to_string(),
            ));
        }
        if self.se_decay_base >= 1.0 || self.se_decay_base - self.se_information_bonus <= 0.0 {
            return Err(invalid(
                "SE decay factors must lie strictly between 0 and 1".to_string(),
            ));
        }
        if self.se_floor >= self.stopping_sem_threshold {
            return Err(invalid(format!(
                "SE_FLOOR ({}) must be below STOPPING_SEM_THRESHOLD ({})",
                self.se_floor, self.stopping_sem_threshold
            )));
        }
        let points = [
            self.scoring.foundational_points,
            self.scoring.applied_points,
            self.scoring.advanced_points,
            self.scoring.strategic_points,
            self.scoring.streak_bonus_points,
            self.scoring.fast_answer_bonus,
            self.scoring.moderate_answer_bonus,
        ];
        if points.iter().any(|p| *p < 0.0) {
            return Err(invalid("SCORING points must not be negative".to_string()));
        }
        if self.scoring.streak_bonus_interval == 0 {
            return Err(invalid(
                "SCORING.STREAK_BONUS_INTERVAL must be at least 1".to_string(),
            ));
        }

        self.validate_bands()?;

        let worst_case = self.worst_case_questions_to_converge();
        if worst_case > self.max_questions {
            warn!(
                "SE needs up to {} answers to reach {:.2}; MAX_QUESTIONS ({}) will force the stop first",
                worst_case, self.stopping_sem_threshold, self.max_questions
            );
        }
        Ok(())
    }

    fn validate_bands(&self) -> Result<()> {
        let bands = &self.augmentation_levels;
        let (first, last) = match (bands.first(), bands.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Err(invalid("AUGMENTATION_LEVELS must not be empty".to_string())),
        };

        for band in bands {
            if !band.min_theta.is_finite() || !band.max_theta.is_finite() {
                return Err(invalid(format!("band '{}' has a non-finite bound", band.label)));
            }
            if band.min_theta >= band.max_theta {
                return Err(invalid(format!(
                    "band '{}' is empty: [{}, {})",
                    band.label, band.min_theta, band.max_theta
                )));
            }
        }
        for pair in bands.windows(2) {
            if pair[0].max_theta != pair[1].min_theta {
                return Err(invalid(format!(
                    "bands '{}' and '{}' are not contiguous ({} vs {})",
                    pair[0].label, pair[1].label, pair[0].max_theta, pair[1].min_theta
                )));
            }
        }
        if first.min_theta != self.irt_params.min_theta
            || last.max_theta != self.irt_params.max_theta
        {
            return Err(invalid(format!(
                "bands cover [{}, {}] but theta spans [{}, {}]",
                first.min_theta,
                last.max_theta,
                self.irt_params.min_theta,
                self.irt_params.max_theta
            )));
        }
        Ok(())
    }

    pub fn clamp_theta(&self, theta: f64) -> f64 {
        theta.clamp(self.irt_params.min_theta, self.irt_params.max_theta)
    }

    /// Average per-answer SE shrink factor, used for progress estimates.
    pub fn mean_se_decay(&self) -> f64 {
        self.se_decay_base - self.se_information_bonus / 2.0
    }

    /// Answers needed to reach the threshold if no item carried any information.
    /// `u32::MAX` when the floor keeps SE above the threshold forever.
    pub fn worst_case_questions_to_converge(&self) -> u32 {
        if self.se_floor >= self.stopping_sem_threshold
            && self.initial_standard_error > self.stopping_sem_threshold
        {
            return u32::MAX;
        }
        answers_to_reach(
            self.initial_standard_error,
            self.stopping_sem_threshold,
            self.se_decay_base,
        )
    }
}

/// Number of geometric `decay` steps that take `from` down to `target`.
pub(crate) fn answers_to_reach(from: f64, target: f64, decay: f64) -> u32 {
    if from <= target {
        return 0;
    }
    let steps = ((target / from).ln() / decay.ln()).ceil();
    if steps.is_finite() && steps > 0.0 {
        steps as u32
    } else {
        0
    }
}

fn invalid(msg: String) -> AssessmentError {
    AssessmentError::InvalidConfiguration(msg)
}
