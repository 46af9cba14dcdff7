//! Version-neutral intermediate form of an imported backup
//!
//! Both readers decode into a [`PayloadDraft`] whose goal deadlines are kept
//! raw, so that per-version upgraders can rewrite them before the draft is
//! turned into domain types.

use serde::Deserialize;

use crate::error::{GoalStashError, GoalStashResult};
use crate::models::{
    Goal, GoalId, GoalImage, GoalPriority, GoalWithTransactions, Transaction,
};

use super::BackupPayload;

/// A deadline as found in the source document
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawDeadline {
    Millis(i64),
    Text(String),
}

impl Default for RawDeadline {
    fn default() -> Self {
        Self::Millis(0)
    }
}

/// Goal fields before the deadline has been normalized
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalDraft {
    #[serde(rename = "goalId", default)]
    pub id: GoalId,
    pub title: String,
    pub target_amount: f64,
    #[serde(default)]
    pub deadline: RawDeadline,
    #[serde(default)]
    pub goal_image: Option<GoalImage>,
    #[serde(default)]
    pub additional_notes: String,
    #[serde(default)]
    pub priority: GoalPriority,
    #[serde(default)]
    pub reminder: bool,
    #[serde(default)]
    pub goal_icon_id: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

impl GoalDraft {
    /// Turn the draft into a goal; the deadline must be numeric by now
    fn finish(self) -> GoalStashResult<Goal> {
        let deadline = match self.deadline {
            RawDeadline::Millis(millis) => millis,
            RawDeadline::Text(text) => text.trim().parse::<i64>().map_err(|_| {
                GoalStashError::Parse(format!(
                    "invalid Deadline '{}' for goal '{}'",
                    text, self.title
                ))
            })?,
        };

        Ok(Goal {
            id: self.id,
            title: self.title,
            target_amount: self.target_amount,
            deadline,
            goal_image: self.goal_image,
            additional_notes: self.additional_notes,
            priority: self.priority,
            reminder: self.reminder,
            goal_icon_id: self.goal_icon_id,
            archived: self.archived,
        })
    }
}

/// One goal with its transactions, as read
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AggregateDraft {
    pub goal: GoalDraft,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// A whole backup, as read
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PayloadDraft {
    /// Declared schema version of the source document
    #[serde(default = "oldest_version")]
    pub version: u32,
    pub timestamp: i64,
    pub data: Vec<AggregateDraft>,
}

fn oldest_version() -> u32 {
    super::OLDEST_SCHEMA_VERSION
}

impl PayloadDraft {
    /// Every goal draft, in document order
    pub fn goals_mut(&mut self) -> impl Iterator<Item = &mut GoalDraft> {
        self.data.iter_mut().map(|aggregate| &mut aggregate.goal)
    }

    /// Convert an upgraded draft into the payload handed to callers
    pub fn finish(self) -> GoalStashResult<BackupPayload> {
        let data = self
            .data
            .into_iter()
            .map(|aggregate| {
                let goal = aggregate.goal.finish()?;
                Ok(GoalWithTransactions::new(goal, aggregate.transactions))
            })
            .collect::<GoalStashResult<Vec<_>>>()?;

        Ok(BackupPayload {
            version: self.version,
            timestamp: self.timestamp,
            data,
        })
    }
}
