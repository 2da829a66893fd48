// src/selector.rs

use crate::config::AdaptiveConfig;
use crate::error::{AssessmentError, Result};
use crate::models::{AssessmentSession, Item};
use log::{debug, warn};
use std::cmp::Ordering;

// --- Public Interface ---

/// Difficulty the next item should sit at: slightly above the current theta.
pub fn target_difficulty(config: &AdaptiveConfig, theta: f64) -> f64 {
    config.clamp_theta(theta + config.target_difficulty_offset)
}

/// Picks the next item to present. Pure: the session is not touched.
pub fn select_next<'a>(
    config: &AdaptiveConfig,
    session: &AssessmentSession,
    pool: &'a [Item],
) -> Result<&'a Item> {
    let target = target_difficulty(config, session.theta());

    let mut unanswered = Vec::with_capacity(pool.len());
    for item in pool {
        if !item.difficulty.is_finite() {
            return Err(AssessmentError::InvalidInput(format!(
                "item {} has non-finite difficulty",
                item.id
            )));
        }
        if !session.has_answered(&item.id) {
            unanswered.push(item);
        }
    }

    if unanswered.is_empty() {
        warn!(
            "Session {}: no unanswered items left ({} in pool)",
            session.id(),
            pool.len()
        );
        return Err(AssessmentError::NoEligibleItem);
    }

    // 1. Find the narrowest window (in steps of the search range) holding a candidate.
    let nearest = unanswered
        .iter()
        .map(|i| (i.difficulty - target).abs())
        .fold(f64::INFINITY, f64::min);
    let step = config.difficulty_search_range;
    let steps = (nearest / step).ceil().max(1.0);
    let window = (steps * step).max(nearest);
    if steps > 1.0 {
        warn!(
            "Session {}: widened difficulty window to ±{:.2} around {:.2}",
            session.id(),
            window,
            target
        );
    }

    let candidates: Vec<&Item> = unanswered
        .into_iter()
        .filter(|i| (i.difficulty - target).abs() <= window)
        .collect();

    // 2. Rank.
    let chosen = if config.enable_category_rotation {
        pick_balanced(config, session, &candidates, target, window)
    } else {
        pick_closest(&candidates, target)
    };

    match chosen {
        Some(item) => {
            debug!(
                "[Select] Session {}: target {:.2} (±{:.2}), {} candidates -> {} ({}, b={:.2})",
                session.id(),
                target,
                window,
                candidates.len(),
                item.id,
                item.category,
                item.difficulty
            );
            Ok(item)
        }
        None => Err(AssessmentError::NoEligibleItem),
    }
}

// --- Internal Ranking Logic ---

fn pick_closest<'a>(candidates: &[&'a Item], target: f64) -> Option<&'a Item> {
    candidates
        .iter()
        .copied()
        .min_by(|a, b| by_closeness_then_id(a, b, target))
}

fn pick_balanced<'a>(
    config: &AdaptiveConfig,
    session: &AssessmentSession,
    candidates: &[&'a Item],
    target: f64,
    window: f64,
) -> Option<&'a Item> {
    let weight = config.category_balance_weight;
    let scored = candidates.iter().copied().map(|item| {
        let closeness = 1.0 - (item.difficulty - target).abs() / window;
        let need = category_need(config, session, item);
        ((1.0 - weight) * closeness + weight * need, item)
    });

    scored
        .max_by(|(sa, a), (sb, b)| {
            sa.total_cmp(sb)
                // equal scores: closer difficulty, then lower id, ranks higher
                .then_with(|| by_closeness_then_id(b, a, target))
        })
        .map(|(_, item)| item)
}

/// 0.0 once the category has its soft quota, rising to 1.0 for an unseen category.
fn category_need(config: &AdaptiveConfig, session: &AssessmentSession, item: &Item) -> f64 {
    let floor = config.min_questions_per_category;
    if floor == 0 {
        return 0.0;
    }
    let seen = session.category_count(item.category);
    if seen >= floor {
        0.0
    } else {
        f64::from(floor - seen) / f64::from(floor)
    }
}

fn by_closeness_then_id(a: &Item, b: &Item, target: f64) -> Ordering {
    let da = (a.difficulty - target).abs();
    let db = (b.difficulty - target).abs();
    da.total_cmp(&db).then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::AbilityEstimate;
    use crate::models::{Category, ItemId, ItemLevel, ResponseRecord, ResponseTiming};
    use chrono::Utc;

    fn item(id: &str, category: Category, difficulty: f64) -> Item {
        Item::new(id, category, difficulty, ItemLevel::Applied)
    }

    fn session_at(theta: f64) -> AssessmentSession {
        AssessmentSession::new(
            "test",
            AbilityEstimate {
                theta,
                standard_error: 1.5,
            },
        )
    }

    fn answer(session: &mut AssessmentSession, item: &Item) {
        let theta = session.theta();
        session.record(ResponseRecord {
            item_id: item.id.clone(),
            correct: true,
            response_time_seconds: 20.0,
            difficulty: item.difficulty,
            category: item.category,
            level: item.level,
            points: 15.0,
            streak_bonus: 0.0,
            time_bonus: 0.0,
            theta_after: theta,
            standard_error_after: 1.0,
            timing: ResponseTiming::Normal,
            answered_at: Utc::now(),
        });
    }

    fn no_rotation() -> AdaptiveConfig {
        AdaptiveConfig {
            enable_category_rotation: false,
            ..AdaptiveConfig::default()
        }
    }

    #[test]
    fn target_is_offset_and_clamped() {
        let config = AdaptiveConfig::default();
        assert!((target_difficulty(&config, 0.0) - 0.2).abs() < 1e-12);
        assert_eq!(target_difficulty(&config, 2.9), 3.0);
    }

    #[test]
    fn picks_closest_difficulty_without_rotation() {
        let config = no_rotation();
        let pool = vec![
            item("a", Category::Fundamentals, -1.0),
            item("b", Category::Fundamentals, 0.3),
            item("c", Category::Fundamentals, 1.0),
        ];
        let chosen = select_next(&config, &session_at(0.0), &pool).unwrap();
        assert_eq!(chosen.id, ItemId::from("b"));
    }

    #[test]
    fn ties_break_on_lowest_id() {
        let config = no_rotation();
        let pool = vec![
            item("z", Category::Fundamentals, 0.0),
            item("m", Category::Fundamentals, 0.4),
        ];
        // Both sit 0.2 away from the 0.2 target.
        let chosen = select_next(&config, &session_at(0.0), &pool).unwrap();
        assert_eq!(chosen.id, ItemId::from("m"));
    }

    #[test]
    fn skips_answered_items() {
        let config = no_rotation();
        let pool = vec![
            item("a", Category::Fundamentals, 0.2),
            item("b", Category::Fundamentals, 0.5),
        ];
        let mut session = session_at(0.0);
        answer(&mut session, &pool[0]);
        let chosen = select_next(&config, &session, &pool).unwrap();
        assert_eq!(chosen.id, ItemId::from("b"));
    }

    #[test]
    fn widens_window_when_nothing_is_near() {
        let config = AdaptiveConfig::default();
        let pool = vec![
            item("far", Category::Strategy, -2.5),
            item("farther", Category::Strategy, 2.95),
        ];
        let chosen = select_next(&config, &session_at(0.0), &pool).unwrap();
        assert_eq!(chosen.id, ItemId::from("far"));
    }

    #[test]
    fn exhausted_pool_is_an_error() {
        let config = AdaptiveConfig::default();
        let pool = vec![item("only", Category::Strategy, 0.0)];
        let mut session = session_at(0.0);
        answer(&mut session, &pool[0]);
        assert!(matches!(
            select_next(&config, &session, &pool),
            Err(AssessmentError::NoEligibleItem)
        ));
        assert!(matches!(
            select_next(&config, &session, &[]),
            Err(AssessmentError::NoEligibleItem)
        ));
    }

    #[test]
    fn rotation_prefers_uncovered_category() {
        let config = AdaptiveConfig::default();
        let covered = item("p1", Category::PromptEngineering, 0.2);
        let pool = vec![
            covered.clone(),
            item("p2", Category::PromptEngineering, 0.2),
            item("d1", Category::DataLiteracy, 0.3),
        ];
        let mut session = session_at(0.0);
        answer(&mut session, &covered);
        answer(&mut session, &item("p0", Category::PromptEngineering, 0.0));

        // p2 is a perfect match but its category already met the quota.
        let chosen = select_next(&config, &session, &pool).unwrap();
        assert_eq!(chosen.id, ItemId::from("d1"));
    }

    #[test]
    fn zero_balance_weight_ignores_category() {
        let config = AdaptiveConfig {
            category_balance_weight: 0.0,
            ..AdaptiveConfig::default()
        };
        let mut session = session_at(0.0);
        answer(&mut session, &item("p0", Category::PromptEngineering, 0.0));
        answer(&mut session, &item("p1", Category::PromptEngineering, 0.0));
        let pool = vec![
            item("p2", Category::PromptEngineering, 0.2),
            item("d1", Category::DataLiteracy, 0.45),
        ];
        let chosen = select_next(&config, &session, &pool).unwrap();
        assert_eq!(chosen.id, ItemId::from("p2"));
    }

    #[test]
    fn non_finite_difficulty_is_rejected() {
        let config = AdaptiveConfig::default();
        let pool = vec![item("bad", Category::Strategy, f64::NAN)];
        assert!(matches!(
            select_next(&config, &session_at(0.0), &pool),
            Err(AssessmentError::InvalidInput(_))
        ));
    }
}
