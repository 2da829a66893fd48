// src/constants.rs

// --- Session Start ---
pub const INITIAL_ABILITY: f64 = 0.0;
pub const INITIAL_STANDARD_ERROR: f64 = 1.5;

// --- Test Length ---
pub const MIN_QUESTIONS: u32 = 8;
pub const MAX_QUESTIONS: u32 = 15;
pub const STOPPING_SEM_THRESHOLD: f64 = 0.3;

// --- Theta Adjustment ---
pub const DIFFICULTY_INCREMENT_CORRECT: f64 = 0.5;
pub const DIFFICULTY_DECREMENT_INCORRECT: f64 = 0.5;

// Used when ENABLE_ADAPTIVE_DIFFICULTY is off: step scale per unit of (difficulty - theta)
pub const HEURISTIC_DISTANCE_SLOPE: f64 = 0.5;
pub const HEURISTIC_SCALE_MIN: f64 = 0.5;
pub const HEURISTIC_SCALE_MAX: f64 = 1.5;

// --- Standard Error Decay ---
// Worst case (no information): 1.5 * 0.88^13 < 0.3, inside MAX_QUESTIONS.
pub const SE_DECAY_BASE: f64 = 0.88;
pub const SE_INFORMATION_BONUS: f64 = 0.06;
pub const SE_FLOOR: f64 = 0.05;

// --- Item Selection ---
pub const TARGET_DIFFICULTY_OFFSET: f64 = 0.2;
pub const DIFFICULTY_SEARCH_RANGE: f64 = 0.5;
pub const CATEGORY_BALANCE_WEIGHT: f64 = 0.3;
pub const MIN_QUESTIONS_PER_CATEGORY: u32 = 2;

// --- Response Time ---
pub const TIME_PENALTY_THRESHOLD: f64 = 120.0; // Seconds
pub const RAPID_ANSWER_THRESHOLD: f64 = 5.0; // Seconds

// --- IRT Defaults ---
pub const IRT_DISCRIMINATION: f64 = 1.0;
pub const IRT_GUESSING: f64 = 0.25; // Four-option multiple choice
pub const MIN_THETA: f64 = -3.0;
pub const MAX_THETA: f64 = 3.0;

// --- Augmentation Bands (theta cut points) ---
pub const BAND_INTERMEDIATE_MIN: f64 = -1.0;
pub const BAND_ADVANCED_MIN: f64 = 0.5;
pub const BAND_EXPERT_MIN: f64 = 1.5;

// --- Scoring ---
pub const FOUNDATIONAL_POINTS: f64 = 10.0;
pub const APPLIED_POINTS: f64 = 15.0;
pub const ADVANCED_POINTS: f64 = 20.0;
pub const STRATEGIC_POINTS: f64 = 25.0;

// --- Answer Bonuses (advisory, reported beside item points) ---
pub const STREAK_BONUS_POINTS: f64 = 5.0;
pub const STREAK_BONUS_INTERVAL: u32 = 3; // Every third consecutive correct answer
pub const FAST_ANSWER_BONUS: f64 = 10.0;
pub const MODERATE_ANSWER_BONUS: f64 = 5.0;
pub const FAST_ANSWER_FRACTION: f64 = 0.5; // Of TIME_PENALTY_THRESHOLD
pub const MODERATE_ANSWER_FRACTION: f64 = 0.75;

// --- Difficulty Recommendation ---
pub const ACCURACY_HIGH: f64 = 85.0; // Percent
pub const ACCURACY_GOOD: f64 = 70.0; // Percent
pub const ACCURACY_LOW: f64 = 50.0; // Percent
pub const THETA_STRONG: f64 = 0.5;
pub const THETA_WEAK: f64 = -0.5;
