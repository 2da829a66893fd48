// src/engine.rs

use crate::bank::ItemBank;
use crate::config::{AdaptiveConfig, AugmentationLevel};
use crate::error::{ensure_finite, AssessmentError, Result};
use crate::estimator;
use crate::metrics::{recommend_adjustment, DifficultyRecommendation, PerformanceMetrics};
use crate::models::{
    AssessmentSession, AssessmentStatus, Item, LearnerResponse, ResponseRecord, ResponseTiming,
};
use crate::progress::{estimate_questions_remaining, QuestionsRemaining};
use crate::scoring;
use crate::selector;
use crate::stopping;
use chrono::Utc;
use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;

/// Result of recording one response.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub correct: bool,
    pub points: f64,
    pub streak_bonus: f64,
    pub time_bonus: f64,
    pub theta: f64,
    pub standard_error: f64,
    pub timing: ResponseTiming,
    pub status: AssessmentStatus,
    pub questions_remaining: QuestionsRemaining,
}

/// What the caller renders after each answer.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StepReport {
    pub next_item: Option<Item>,
    pub theta: f64,
    pub standard_error: f64,
    pub stopped: bool,
    pub points: f64,
    pub streak_bonus: f64,
    pub time_bonus: f64,
    pub questions_remaining: QuestionsRemaining,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AssessmentSummary {
    pub session_id: String,
    pub level: AugmentationLevel,
    pub label: String,
    pub percentage: f64,
    pub total_points: f64,
    pub answered_count: u32,
    pub status: AssessmentStatus,
    pub theta: f64,
    pub standard_error: f64,
    pub metrics: PerformanceMetrics,
    pub recommendation: DifficultyRecommendation,
}

/// Runs adaptive sessions against one immutable policy table.
///
/// Cheap to clone; clones share the same `Arc<AdaptiveConfig>`, so a single
/// engine can serve any number of independent sessions across threads.
#[derive(Debug, Clone)]
pub struct AdaptiveEngine {
    config: Arc<AdaptiveConfig>,
}

impl Default for AdaptiveEngine {
    fn default() -> Self {
        AdaptiveEngine {
            config: Arc::new(AdaptiveConfig::default()),
        }
    }
}

impl AdaptiveEngine {
    pub fn new(config: Arc<AdaptiveConfig>) -> Result<Self> {
        config.validate()?;
        Ok(AdaptiveEngine { config })
    }

    pub fn config(&self) -> &AdaptiveConfig {
        &self.config
    }

    pub fn start_session(&self, session_id: impl Into<String>) -> AssessmentSession {
        let session = AssessmentSession::new(session_id, estimator::initialize(&self.config));
        info!(
            "Starting assessment session {} (theta {:.2}, SE {:.2})",
            session.id(),
            session.theta(),
            session.standard_error()
        );
        session
    }

    pub fn next_item<'a>(&self, session: &AssessmentSession, pool: &'a [Item]) -> Result<&'a Item> {
        if session.is_complete() {
            return Err(AssessmentError::SessionComplete);
        }
        selector::select_next(&self.config, session, pool)
    }

    /// Applies one answer to the session. Validation happens before any mutation,
    /// so a rejected response leaves the session untouched.
    pub fn record_response(
        &self,
        session: &mut AssessmentSession,
        item: &Item,
        response: &LearnerResponse,
    ) -> Result<StepOutcome> {
        if session.is_complete() {
            return Err(AssessmentError::SessionComplete);
        }
        if response.item_id != item.id {
            return Err(AssessmentError::InvalidInput(format!(
                "response is for item {} but item {} was supplied",
                response.item_id, item.id
            )));
        }
        if session.has_answered(&item.id) {
            return Err(AssessmentError::ItemAlreadyAnswered(item.id.clone()));
        }
        let seconds = ensure_finite("response time", response.response_time_seconds)?;
        if seconds < 0.0 {
            return Err(AssessmentError::InvalidInput(format!(
                "response time must not be negative, got {}",
                seconds
            )));
        }

        let points = scoring::score_item(
            &self.config,
            item.level,
            response.correct,
            response.partial_credit,
        )?;
        let estimate =
            estimator::update(&self.config, session.estimate(), response.correct, item.difficulty)?;
        let timing = ResponseTiming::classify(&self.config, seconds);
        let streak_bonus =
            scoring::streak_bonus(&self.config, session.current_streak(), response.correct);
        let time_bonus = scoring::time_bonus(&self.config, response.correct, seconds);

        session.record(ResponseRecord {
            item_id: item.id.clone(),
            correct: response.correct,
            response_time_seconds: seconds,
            difficulty: item.difficulty,
            category: item.category,
            level: item.level,
            points,
            streak_bonus,
            time_bonus,
            theta_after: estimate.theta,
            standard_error_after: estimate.standard_error,
            timing,
            answered_at: Utc::now(),
        });

        let status = stopping::evaluate(
            &self.config,
            session.answered_count(),
            session.standard_error(),
        );
        if status == AssessmentStatus::Complete {
            session.mark_complete();
            info!(
                "Session {} complete after {} items (theta {:.2}, SE {:.3})",
                session.id(),
                session.answered_count(),
                session.theta(),
                session.standard_error()
            );
        } else {
            debug!(
                "Session {}: {} answered, continuing (SE {:.3})",
                session.id(),
                session.answered_count(),
                session.standard_error()
            );
        }

        Ok(StepOutcome {
            correct: response.correct,
            points,
            streak_bonus,
            time_bonus,
            theta: estimate.theta,
            standard_error: estimate.standard_error,
            timing,
            status,
            questions_remaining: self.questions_remaining(session),
        })
    }

    /// Records `response` (its item is looked up in `bank`) and picks the next item.
    ///
    /// If the bank runs dry while the session is still in progress this returns
    /// `NoEligibleItem`; the response has already been recorded at that point.
    pub fn step(
        &self,
        session: &mut AssessmentSession,
        bank: &ItemBank,
        response: &LearnerResponse,
    ) -> Result<StepReport> {
        let item = bank
            .get(&response.item_id)
            .ok_or_else(|| AssessmentError::UnknownItem(response.item_id.clone()))?;

        let outcome = self.record_response(session, item, response)?;
        let stopped = outcome.status == AssessmentStatus::Complete;
        let next_item = if stopped {
            None
        } else {
            Some(selector::select_next(&self.config, session, bank.items())?.clone())
        };

        Ok(StepReport {
            next_item,
            theta: outcome.theta,
            standard_error: outcome.standard_error,
            stopped,
            points: outcome.points,
            streak_bonus: outcome.streak_bonus,
            time_bonus: outcome.time_bonus,
            questions_remaining: outcome.questions_remaining,
        })
    }

    pub fn questions_remaining(&self, session: &AssessmentSession) -> QuestionsRemaining {
        estimate_questions_remaining(
            &self.config,
            session.answered_count(),
            session.standard_error(),
        )
    }

    /// Final (or interim, for abandoned sessions) result for the caller to persist.
    pub fn summarize(&self, session: &AssessmentSession) -> AssessmentSummary {
        let interpretation = scoring::interpret(&self.config, session.theta());
        let metrics = PerformanceMetrics::from_session(&self.config, session);
        let recommendation =
            recommend_adjustment(&self.config, session.theta(), metrics.accuracy);

        AssessmentSummary {
            session_id: session.id().to_string(),
            level: interpretation.level,
            label: interpretation.label,
            percentage: interpretation.percentage,
            total_points: metrics.total_points,
            answered_count: session.answered_count(),
            status: session.status(),
            theta: session.theta(),
            standard_error: session.standard_error(),
            metrics,
            recommendation,
        }
    }
}
