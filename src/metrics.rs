// src/metrics.rs
//
// Read-only analytics over a session's response log. Nothing in this module
// influences theta, item choice or termination.

use crate::config::{AdaptiveConfig, AugmentationLevel};
use crate::constants::*;
use crate::models::{AssessmentSession, Category, ResponseTiming};
use crate::scoring;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

impl ResponseTiming {
    pub fn classify(config: &AdaptiveConfig, seconds: f64) -> Self {
        if seconds < config.rapid_answer_threshold {
            ResponseTiming::Rapid
        } else if seconds > config.time_penalty_threshold {
            ResponseTiming::Slow
        } else {
            ResponseTiming::Normal
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DifficultyPoint {
    pub question_number: u32,
    pub difficulty: f64,
    pub was_correct: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AbilityPoint {
    pub question_number: u32,
    pub theta: f64,
    pub standard_error: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CategoryStats {
    pub answered: u32,
    pub correct: u32,
}

impl CategoryStats {
    pub fn accuracy(&self) -> f64 {
        percent(self.correct, self.answered)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PerformanceMetrics {
    /// Percent of answers marked correct.
    pub accuracy: f64,
    pub average_response_time: f64,
    pub rapid_answers: u32,
    pub slow_answers: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub total_points: f64,
    pub max_possible_points: f64,
    /// Advisory totals, kept apart from `total_points`.
    pub streak_bonus_points: f64,
    pub time_bonus_points: f64,
    /// 0.0 at the initial standard error, approaching 1.0 as it shrinks.
    pub confidence: f64,
    pub by_category: BTreeMap<Category, CategoryStats>,
    pub difficulty_progression: Vec<DifficultyPoint>,
    pub ability_trajectory: Vec<AbilityPoint>,
}

impl PerformanceMetrics {
    pub fn from_session(config: &AdaptiveConfig, session: &AssessmentSession) -> Self {
        let log = session.response_log();

        let mut correct = 0u32;
        let mut total_time = 0.0;
        let mut rapid_answers = 0;
        let mut slow_answers = 0;
        let mut current_streak = 0;
        let mut best_streak = 0;
        let mut total_points = 0.0;
        let mut max_possible_points = 0.0;
        let mut streak_bonus_points = 0.0;
        let mut time_bonus_points = 0.0;
        let mut by_category: BTreeMap<Category, CategoryStats> = BTreeMap::new();
        let mut difficulty_progression = Vec::with_capacity(log.len());
        let mut ability_trajectory = Vec::with_capacity(log.len());

        for (i, r) in log.iter().enumerate() {
            let question_number = i as u32 + 1;
            total_time += r.response_time_seconds;
            total_points += r.points;
            streak_bonus_points += r.streak_bonus;
            time_bonus_points += r.time_bonus;
            max_possible_points += config.scoring.points_for(r.level);

            match r.timing {
                ResponseTiming::Rapid => rapid_answers += 1,
                ResponseTiming::Slow => slow_answers += 1,
                ResponseTiming::Normal => {}
            }

            let stats = by_category.entry(r.category).or_default();
            stats.answered += 1;
            if r.correct {
                correct += 1;
                stats.correct += 1;
                current_streak += 1;
                best_streak = best_streak.max(current_streak);
            } else {
                current_streak = 0;
            }

            difficulty_progression.push(DifficultyPoint {
                question_number,
                difficulty: r.difficulty,
                was_correct: r.correct,
            });
            ability_trajectory.push(AbilityPoint {
                question_number,
                theta: r.theta_after,
                standard_error: r.standard_error_after,
            });
        }

        let answered = log.len() as u32;
        let average_response_time = if answered == 0 {
            0.0
        } else {
            total_time / f64::from(answered)
        };

        PerformanceMetrics {
            accuracy: percent(correct, answered),
            average_response_time,
            rapid_answers,
            slow_answers,
            current_streak,
            best_streak,
            total_points,
            max_possible_points,
            streak_bonus_points,
            time_bonus_points,
            confidence: confidence(config, session.standard_error()),
            by_category,
            difficulty_progression,
            ability_trajectory,
        }
    }
}

pub fn confidence(config: &AdaptiveConfig, standard_error: f64) -> f64 {
    (1.0 - standard_error / config.initial_standard_error).clamp(0.0, 1.0)
}

fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(whole) * 100.0
    }
}

// --- Difficulty Recommendation ---

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    IncreaseChallenge,
    GradualIncrease,
    Maintain,
    ReduceToFoundations,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DifficultyRecommendation {
    pub current_level: AugmentationLevel,
    pub adjustment: Adjustment,
    pub reasoning: String,
}

/// Suggests the content level for the learner's next study block.
pub fn recommend_adjustment(
    config: &AdaptiveConfig,
    theta: f64,
    accuracy: f64,
) -> DifficultyRecommendation {
    let current_level = scoring::interpret(config, theta).level;
    let (adjustment, reasoning) = if accuracy >= ACCURACY_HIGH && theta > THETA_STRONG {
        (
            Adjustment::IncreaseChallenge,
            format!(
                "High accuracy ({:.1}%) and a strong ability estimate ({:.2}) indicate readiness for harder material.",
                accuracy, theta
            ),
        )
    } else if accuracy <= ACCURACY_LOW && theta < THETA_WEAK {
        (
            Adjustment::ReduceToFoundations,
            format!(
                "Low accuracy ({:.1}%) and a lower ability estimate ({:.2}) suggest reviewing the basics.",
                accuracy, theta
            ),
        )
    } else if (ACCURACY_GOOD..ACCURACY_HIGH).contains(&accuracy) {
        (
            Adjustment::GradualIncrease,
            format!(
                "Good performance ({:.1}%) suggests readiness for gradual progression.",
                accuracy
            ),
        )
    } else {
        (
            Adjustment::Maintain,
            "Performance is appropriate for the current difficulty level.".to_string(),
        )
    };

    DifficultyRecommendation {
        current_level,
        adjustment,
        reasoning,
    }
}
