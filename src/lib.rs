// src/lib.rs

//! Computerized adaptive testing core.
//!
//! One [`AdaptiveEngine`] wraps an immutable, validated [`AdaptiveConfig`] and
//! drives any number of independent [`AssessmentSession`]s:
//!
//! 1. [`AdaptiveEngine::next_item`] picks an item near the learner's ability
//! 2. the caller presents it and collects a [`LearnerResponse`]
//! 3. [`AdaptiveEngine::step`] updates theta and SE, checks the stopping rule and
//!    hands back the next item
//! 4. [`AdaptiveEngine::summarize`] turns the final theta into an augmentation level
//!
//! Question storage, response persistence and rendering stay with the caller.

pub mod bank;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod metrics;
pub mod models;
pub mod progress;
pub mod scoring;
pub mod selector;
pub mod stopping;

pub use bank::ItemBank;
pub use config::{AdaptiveConfig, AugmentationBand, AugmentationLevel, IrtParams, ScoringConfig};
pub use engine::{AdaptiveEngine, AssessmentSummary, StepOutcome, StepReport};
pub use error::{AssessmentError, Result};
pub use estimator::AbilityEstimate;
pub use models::{
    AssessmentSession, AssessmentStatus, Category, Item, ItemId, ItemLevel, LearnerResponse,
    ResponseRecord, ResponseTiming,
};
pub use progress::QuestionsRemaining;
pub use scoring::Interpretation;
pub use stopping::should_stop_assessment;
