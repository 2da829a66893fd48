// src/models.rs

use crate::error::AssessmentError;
use crate::estimator::AbilityEstimate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

// --- Identifiers ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId(s)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// --- Item Taxonomy ---

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Fundamentals,
    PromptEngineering,
    DataLiteracy,
    ResponsibleAi,
    WorkflowIntegration,
    Strategy,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Fundamentals,
        Category::PromptEngineering,
        Category::DataLiteracy,
        Category::ResponsibleAi,
        Category::WorkflowIntegration,
        Category::Strategy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fundamentals => "fundamentals",
            Category::PromptEngineering => "prompt_engineering",
            Category::DataLiteracy => "data_literacy",
            Category::ResponsibleAi => "responsible_ai",
            Category::WorkflowIntegration => "workflow_integration",
            Category::Strategy => "strategy",
        }
    }
}

impl FromStr for Category {
    type Err = AssessmentError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AssessmentError::InvalidInput(format!("unknown category '{}'", s)))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cognitive level of an item; drives its point value.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemLevel {
    Foundational = 1,
    Applied = 2,
    Advanced = 3,
    Strategic = 4,
}

impl ItemLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemLevel::Foundational => "foundational",
            ItemLevel::Applied => "applied",
            ItemLevel::Advanced => "advanced",
            ItemLevel::Strategic => "strategic",
        }
    }
}

impl FromStr for ItemLevel {
    type Err = AssessmentError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "foundational" => Ok(ItemLevel::Foundational),
            "applied" => Ok(ItemLevel::Applied),
            "advanced" => Ok(ItemLevel::Advanced),
            "strategic" => Ok(ItemLevel::Strategic),
            _ => Err(AssessmentError::InvalidInput(format!(
                "unknown item level '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for ItemLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Data Models ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub category: Category,
    /// Same scale as theta.
    pub difficulty: f64,
    pub level: ItemLevel,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, category: Category, difficulty: f64, level: ItemLevel) -> Self {
        Item {
            id: id.into(),
            category,
            difficulty,
            level,
        }
    }
}

/// One answer as reported by the caller.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LearnerResponse {
    pub item_id: ItemId,
    pub correct: bool,
    pub response_time_seconds: f64,
    /// Fraction of credit for partially correct answers (e.g. multi-select).
    #[serde(default)]
    pub partial_credit: Option<f64>,
}

impl LearnerResponse {
    pub fn new(item_id: impl Into<ItemId>, correct: bool, response_time_seconds: f64) -> Self {
        LearnerResponse {
            item_id: item_id.into(),
            correct,
            response_time_seconds,
            partial_credit: None,
        }
    }

    pub fn with_partial_credit(mut self, fraction: f64) -> Self {
        self.partial_credit = Some(fraction);
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseTiming {
    Rapid,
    Normal,
    Slow,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ResponseRecord {
    pub item_id: ItemId,
    pub correct: bool,
    pub response_time_seconds: f64,
    pub difficulty: f64,
    pub category: Category,
    pub level: ItemLevel,
    pub points: f64,
    /// Advisory bonuses; not part of `points`.
    #[serde(default)]
    pub streak_bonus: f64,
    #[serde(default)]
    pub time_bonus: f64,
    pub theta_after: f64,
    pub standard_error_after: f64,
    pub timing: ResponseTiming,
    pub answered_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    InProgress,
    Complete,
}

// --- Session State ---

/// Mutable state of one learner's assessment. Mutated only through the engine.
///
/// Serialize-only: the counters, id set and log are kept in step by `record`,
/// so a session is restored by replaying its responses.
#[derive(Serialize, Debug, Clone)]
pub struct AssessmentSession {
    id: String,
    theta: f64,
    standard_error: f64,
    answered_count: u32,
    answered_item_ids: BTreeSet<ItemId>,
    category_counts: BTreeMap<Category, u32>,
    response_log: Vec<ResponseRecord>,
    status: AssessmentStatus,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl AssessmentSession {
    pub(crate) fn new(id: impl Into<String>, initial: AbilityEstimate) -> Self {
        AssessmentSession {
            id: id.into(),
            theta: initial.theta,
            standard_error: initial.standard_error,
            answered_count: 0,
            answered_item_ids: BTreeSet::new(),
            category_counts: BTreeMap::new(),
            response_log: Vec::new(),
            status: AssessmentStatus::InProgress,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn standard_error(&self) -> f64 {
        self.standard_error
    }

    pub fn estimate(&self) -> AbilityEstimate {
        AbilityEstimate {
            theta: self.theta,
            standard_error: self.standard_error,
        }
    }

    pub fn answered_count(&self) -> u32 {
        self.answered_count
    }

    pub fn answered_item_ids(&self) -> &BTreeSet<ItemId> {
        &self.answered_item_ids
    }

    pub fn has_answered(&self, id: &ItemId) -> bool {
        self.answered_item_ids.contains(id)
    }

    pub fn category_counts(&self) -> &BTreeMap<Category, u32> {
        &self.category_counts
    }

    pub fn category_count(&self, category: Category) -> u32 {
        self.category_counts.get(&category).copied().unwrap_or(0)
    }

    pub fn response_log(&self) -> &[ResponseRecord] {
        &self.response_log
    }

    /// Consecutive correct answers at the end of the log.
    pub fn current_streak(&self) -> u32 {
        self.response_log
            .iter()
            .rev()
            .take_while(|r| r.correct)
            .count() as u32
    }

    pub fn status(&self) -> AssessmentStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.status == AssessmentStatus::Complete
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Appends an answered item. The caller has already checked for repeats.
    pub(crate) fn record(&mut self, record: ResponseRecord) {
        self.theta = record.theta_after;
        self.standard_error = record.standard_error_after;
        self.answered_count += 1;
        self.answered_item_ids.insert(record.item_id.clone());
        *self.category_counts.entry(record.category).or_insert(0) += 1;
        self.response_log.push(record);
    }

    pub(crate) fn mark_complete(&mut self) {
        self.status = AssessmentStatus::Complete;
        self.completed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, category: Category, correct: bool) -> ResponseRecord {
        ResponseRecord {
            item_id: ItemId::from(id),
            correct,
            response_time_seconds: 30.0,
            difficulty: 0.0,
            category,
            level: ItemLevel::Applied,
            points: if correct { 15.0 } else { 0.0 },
            streak_bonus: 0.0,
            time_bonus: 0.0,
            theta_after: 0.25,
            standard_error_after: 1.2,
            timing: ResponseTiming::Normal,
            answered_at: Utc::now(),
        }
    }

    #[test]
    fn category_round_trips_through_str() {
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
        }
        assert!("blockchain".parse::<Category>().is_err());
    }

    #[test]
    fn unknown_level_is_rejected_not_defaulted() {
        assert_eq!("strategic".parse::<ItemLevel>().unwrap(), ItemLevel::Strategic);
        assert!(matches!(
            "expert".parse::<ItemLevel>(),
            Err(AssessmentError::InvalidInput(_))
        ));
    }

    #[test]
    fn record_updates_counts_and_estimate() {
        let mut session = AssessmentSession::new(
            "s-1",
            AbilityEstimate {
                theta: 0.0,
                standard_error: 1.5,
            },
        );
        session.record(record("q1", Category::Strategy, true));
        session.record(record("q2", Category::Strategy, false));

        assert_eq!(session.answered_count(), 2);
        assert_eq!(session.category_count(Category::Strategy), 2);
        assert_eq!(session.category_count(Category::DataLiteracy), 0);
        assert!(session.has_answered(&ItemId::from("q2")));
        assert_eq!(session.theta(), 0.25);
        assert_eq!(session.standard_error(), 1.2);
        assert_eq!(session.status(), AssessmentStatus::InProgress);
    }

    #[test]
    fn current_streak_counts_trailing_correct_answers() {
        let mut session = AssessmentSession::new(
            "s-3",
            AbilityEstimate {
                theta: 0.0,
                standard_error: 1.5,
            },
        );
        assert_eq!(session.current_streak(), 0);
        session.record(record("q1", Category::Strategy, true));
        session.record(record("q2", Category::Strategy, false));
        session.record(record("q3", Category::DataLiteracy, true));
        session.record(record("q4", Category::DataLiteracy, true));
        assert_eq!(session.current_streak(), 2);
    }

    #[test]
    fn serialized_session_keeps_counters_in_step() {
        let mut session = AssessmentSession::new(
            "s-4",
            AbilityEstimate {
                theta: 0.0,
                standard_error: 1.5,
            },
        );
        session.record(record("q1", Category::Strategy, true));
        session.record(record("q2", Category::Fundamentals, false));

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["answered_count"], 2);
        assert_eq!(json["answered_item_ids"].as_array().unwrap().len(), 2);
        assert_eq!(json["response_log"].as_array().unwrap().len(), 2);
        assert_eq!(json["status"], "in_progress");
    }

    #[test]
    fn mark_complete_stamps_completion_time() {
        let mut session = AssessmentSession::new(
            "s-2",
            AbilityEstimate {
                theta: 0.0,
                standard_error: 1.5,
            },
        );
        assert!(session.completed_at().is_none());
        session.mark_complete();
        assert!(session.is_complete());
        assert!(session.completed_at().unwrap() >= session.started_at());
    }

    #[test]
    fn learner_response_deserializes_without_partial_credit() {
        let json = r#"{"item_id":"q9","correct":true,"response_time_seconds":12.5}"#;
        let response: LearnerResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.item_id, ItemId::from("q9"));
        assert!(response.partial_credit.is_none());
    }
}
