//! Goal model
//!
//! A savings goal: a target amount to reach by a deadline, with a priority,
//! optional reminder flag, icon and image.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::GoalId;
use super::image::GoalImage;

/// Priority of a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GoalPriority {
    High,
    #[default]
    Normal,
    Low,
}

impl GoalPriority {
    /// Numeric weight used by the original storage layer
    pub fn value(&self) -> u8 {
        match self {
            Self::High => 3,
            Self::Normal => 2,
            Self::Low => 1,
        }
    }

    /// Variant name as written to backups
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Normal => "Normal",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for GoalPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Self::High),
            "Normal" => Ok(Self::Normal),
            "Low" => Ok(Self::Low),
            other => Err(format!("unknown goal priority '{}'", other)),
        }
    }
}

/// A savings goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// Store-assigned identifier ([`GoalId::UNASSIGNED`] until inserted)
    #[serde(rename = "goalId", default)]
    pub id: GoalId,

    pub title: String,

    /// Amount the user wants to save
    pub target_amount: f64,

    /// Deadline as epoch milliseconds, 0 when no deadline is set
    #[serde(default)]
    pub deadline: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_image: Option<GoalImage>,

    #[serde(default)]
    pub additional_notes: String,

    #[serde(default)]
    pub priority: GoalPriority,

    /// Whether the user asked to be reminded about this goal
    #[serde(default)]
    pub reminder: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_icon_id: Option<String>,

    #[serde(default)]
    pub archived: bool,
}

impl Goal {
    /// Create a new, unassigned goal
    pub fn new(title: impl Into<String>, target_amount: f64, deadline: i64) -> Self {
        Self {
            id: GoalId::UNASSIGNED,
            title: title.into(),
            target_amount,
            deadline,
            goal_image: None,
            additional_notes: String::new(),
            priority: GoalPriority::Normal,
            reminder: false,
            goal_icon_id: None,
            archived: false,
        }
    }

    /// Whether a deadline has been set
    pub fn has_deadline(&self) -> bool {
        self.deadline > 0
    }

    /// The deadline as a point in time in the given zone
    pub fn deadline_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        if !self.has_deadline() {
            return None;
        }
        tz.timestamp_millis_opt(self.deadline).single()
    }

    /// The deadline in the local zone
    pub fn deadline_local(&self) -> Option<DateTime<Local>> {
        self.deadline_in(&Local)
    }

    /// Validate the goal
    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if self.title.trim().is_empty() {
            return Err(GoalValidationError::EmptyTitle);
        }

        if !self.target_amount.is_finite() || self.target_amount <= 0.0 {
            return Err(GoalValidationError::NonPositiveTarget(self.target_amount));
        }

        if self.deadline < 0 {
            return Err(GoalValidationError::NegativeDeadline(self.deadline));
        }

        if let Some(image) = &self.goal_image {
            if !image.is_png() {
                return Err(GoalValidationError::ImageNotPng);
            }
        }

        Ok(())
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Validation errors for goals
#[derive(Debug, Clone, PartialEq)]
pub enum GoalValidationError {
    EmptyTitle,
    NonPositiveTarget(f64),
    NegativeDeadline(i64),
    ImageNotPng,
}

impl fmt::Display for GoalValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Goal title cannot be empty"),
            Self::NonPositiveTarget(amount) => {
                write!(f, "Target amount must be greater than zero (got {})", amount)
            }
            Self::NegativeDeadline(deadline) => write!(f, "Invalid deadline: {}", deadline),
            Self::ImageNotPng => write!(f, "Goal image must be a PNG"),
        }
    }
}

impl std::error::Error for GoalValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_new_goal() {
        let goal = Goal::new("Laptop", 1000.0, 0);
        assert_eq!(goal.title, "Laptop");
        assert!(!goal.id.is_assigned());
        assert_eq!(goal.priority, GoalPriority::Normal);
        assert!(!goal.has_deadline());
    }

    #[test]
    fn test_validation() {
        let mut goal = Goal::new("Laptop", 1000.0, 0);
        assert!(goal.validate().is_ok());

        goal.target_amount = 0.0;
        assert_eq!(
            goal.validate(),
            Err(GoalValidationError::NonPositiveTarget(0.0))
        );

        goal.target_amount = 10.0;
        goal.title = "   ".into();
        assert_eq!(goal.validate(), Err(GoalValidationError::EmptyTitle));
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("High".parse::<GoalPriority>(), Ok(GoalPriority::High));
        assert!("high".parse::<GoalPriority>().is_err());
        assert!("Urgent".parse::<GoalPriority>().is_err());
    }

    #[test]
    fn test_deadline_in_zone() {
        let goal = Goal::new("Trip", 500.0, 1_703_462_400_000);
        let deadline = goal.deadline_in(&Utc).unwrap();
        assert_eq!(deadline.format("%Y-%m-%d").to_string(), "2023-12-25");
    }

    #[test]
    fn test_json_field_names() {
        let mut goal = Goal::new("Laptop", 1000.0, 5);
        goal.id = GoalId::new(4);
        let json = serde_json::to_value(&goal).unwrap();
        assert_eq!(json["goalId"], 4);
        assert_eq!(json["targetAmount"], 1000.0);
        assert_eq!(json["additionalNotes"], "");
        assert_eq!(json["priority"], "Normal");
        assert!(json.get("goalImage").is_none());
        assert!(json.get("goalIconId").is_none());
    }

    #[test]
    fn test_missing_optional_keys_take_defaults() {
        let goal: Goal =
            serde_json::from_str(r#"{"title":"Bike","targetAmount":250.0,"deadline":0,"extra":1}"#)
                .unwrap();
        assert_eq!(goal.priority, GoalPriority::Normal);
        assert!(!goal.reminder);
        assert!(!goal.archived);
        assert_eq!(goal.id, GoalId::UNASSIGNED);
    }
}
