//! Goal progress calculation
//!
//! Derives how far a goal has come and, when a deadline is set, how much
//! needs to be put aside per day, week and month to reach it in time.

use chrono::{DateTime, TimeZone};

use crate::models::GoalWithTransactions;

/// Suggested contributions to reach a goal by its deadline
#[derive(Debug, Clone, PartialEq)]
pub struct SavingSuggestion {
    pub per_day: f64,
    /// Only when more than two weeks are left
    pub per_week: Option<f64>,
    /// Only when more than sixty days are left
    pub per_month: Option<f64>,
}

/// Computed progress of a goal at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct GoalProgress {
    pub saved: f64,
    /// Still needed, never negative
    pub remaining: f64,
    /// 0 to 100, rounded down
    pub percent: u8,
    pub achieved: bool,
    /// Calendar days from today to the deadline; `None` without a deadline
    pub days_left: Option<i64>,
    pub suggestion: Option<SavingSuggestion>,
}

impl GoalProgress {
    /// Calculate progress as seen at `now` (its zone decides calendar days)
    pub fn calculate<Tz: TimeZone>(aggregate: &GoalWithTransactions, now: &DateTime<Tz>) -> Self {
        let goal = &aggregate.goal;
        let saved = aggregate.saved_amount();
        let remaining = aggregate.remaining_amount();
        let achieved = aggregate.is_achieved();

        let percent = if goal.target_amount > 0.0 {
            (saved / goal.target_amount * 100.0).clamp(0.0, 100.0) as u8
        } else {
            100
        };

        let days_left = goal
            .deadline_in(&now.timezone())
            .map(|deadline| (deadline.date_naive() - now.date_naive()).num_days());

        let suggestion = match days_left {
            Some(days) if !achieved && remaining > 0.0 => suggest(remaining, days),
            _ => None,
        };

        Self {
            saved,
            remaining,
            percent,
            achieved,
            days_left,
            suggestion,
        }
    }

    /// Short encouragement matching the progress band
    pub fn encouragement(&self) -> &'static str {
        match self.percent {
            0..=25 => "Every journey begins with a single step.",
            26..=50 => "Good going, you are getting there.",
            51..=75 => "More than halfway there, keep it up!",
            76..=99 => "Almost there, the finish line is in sight!",
            _ => "Goal reached. Well done!",
        }
    }
}

fn suggest(remaining: f64, days: i64) -> Option<SavingSuggestion> {
    if days <= 2 {
        return None;
    }

    let per_week = (days > 14).then(|| ceil_cents(remaining / (days / 7) as f64));
    let per_month = (days > 60).then(|| ceil_cents(remaining / (days / 30) as f64));

    Some(SavingSuggestion {
        per_day: ceil_cents(remaining / days as f64),
        per_week,
        per_month,
    })
}

/// Round up to two decimals, ignoring binary noise below a billionth
fn ceil_cents(value: f64) -> f64 {
    ((value * 100.0) - 1e-9).ceil() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Goal, GoalId, Transaction, TransactionType};
    use chrono::{Duration, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn goal_due_in(days: i64, target: f64, saved: f64) -> GoalWithTransactions {
        let deadline = if days == 0 {
            0
        } else {
            (now() + Duration::days(days)).timestamp_millis()
        };
        let mut goal = Goal::new("Trip", target, deadline);
        goal.id = GoalId::new(1);
        let txns = if saved > 0.0 {
            vec![Transaction::new(goal.id, TransactionType::Deposit, 0, saved)]
        } else {
            Vec::new()
        };
        GoalWithTransactions::new(goal, txns)
    }

    #[test]
    fn test_percent_is_floored_and_clamped() {
        let p = GoalProgress::calculate(&goal_due_in(10, 300.0, 100.0), &now());
        assert_eq!(p.percent, 33);
        assert_eq!(p.remaining, 200.0);

        let over = GoalProgress::calculate(&goal_due_in(10, 100.0, 150.0), &now());
        assert_eq!(over.percent, 100);
        assert!(over.achieved);
        assert_eq!(over.remaining, 0.0);
        assert!(over.suggestion.is_none());
    }

    #[test]
    fn test_days_left_counts_calendar_days() {
        let p = GoalProgress::calculate(&goal_due_in(10, 100.0, 0.0), &now());
        assert_eq!(p.days_left, Some(10));

        let overdue = GoalProgress::calculate(&goal_due_in(-3, 100.0, 0.0), &now());
        assert_eq!(overdue.days_left, Some(-3));
        assert!(overdue.suggestion.is_none());
    }

    #[test]
    fn test_suggestion_thresholds() {
        let short = GoalProgress::calculate(&goal_due_in(2, 100.0, 0.0), &now());
        assert!(short.suggestion.is_none());

        let days = GoalProgress::calculate(&goal_due_in(3, 100.0, 0.0), &now());
        let s = days.suggestion.unwrap();
        assert_eq!(s.per_day, 33.34);
        assert!(s.per_week.is_none());

        let weeks = GoalProgress::calculate(&goal_due_in(15, 140.0, 0.0), &now());
        let s = weeks.suggestion.unwrap();
        assert_eq!(s.per_week, Some(70.0));
        assert!(s.per_month.is_none());

        let months = GoalProgress::calculate(&goal_due_in(61, 610.0, 0.0), &now());
        let s = months.suggestion.unwrap();
        assert_eq!(s.per_day, 10.0);
        assert_eq!(s.per_month, Some(305.0));
    }

    #[test]
    fn test_no_deadline_means_no_suggestion() {
        let p = GoalProgress::calculate(&goal_due_in(0, 100.0, 10.0), &now());
        assert_eq!(p.days_left, None);
        assert!(p.suggestion.is_none());
        assert_eq!(p.percent, 10);
    }

    #[test]
    fn test_ceil_cents() {
        assert_eq!(ceil_cents(1.1), 1.1);
        assert_eq!(ceil_cents(33.333), 33.34);
        assert_eq!(ceil_cents(5.0), 5.0);
    }

    #[test]
    fn test_encouragement_bands() {
        let mut p = GoalProgress::calculate(&goal_due_in(0, 100.0, 0.0), &now());
        assert!(p.encouragement().contains("single step"));
        p.percent = 100;
        assert!(p.encouragement().contains("Well done"));
    }
}
