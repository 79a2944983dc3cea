//! Goal summary and window rollup types.

use jiff::{civil, Timestamp};
use serde::{Deserialize, Serialize};

use super::{Goal, GoalStatus, ItemStatus, MetricStrategy, Occurrence, TimeHorizon};

/// Summary information about a goal with top-level item statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalSummary {
    /// Goal ID
    pub id: u64,
    /// Title of the goal
    pub title: String,
    /// Optional category tag
    pub category: Option<String>,
    /// Goal status
    pub status: GoalStatus,
    /// Priority from 1 (highest) to 5 (lowest)
    pub priority: u8,
    /// Planning horizon
    pub time_horizon: TimeHorizon,
    /// Numeric progress ratio, when a target is set
    pub progress: Option<f64>,
    /// How `current_value` is derived
    pub metric_strategy: MetricStrategy,
    /// Total number of top-level items
    pub total_items: u32,
    /// Number of completed top-level items
    pub done_items: u32,
    /// Number of pending top-level items
    pub todo_items: u32,
    /// Creation timestamp
    pub created_at: Timestamp,
    /// Last update timestamp
    pub updated_at: Timestamp,
}

impl GoalSummary {
    /// Create a summary from a goal and its top-level item counts.
    pub fn from_goal(goal: &Goal, total_items: u32, done_items: u32) -> Self {
        Self {
            id: goal.id,
            title: goal.title.clone(),
            category: goal.category.clone(),
            status: goal.status,
            priority: goal.priority,
            time_horizon: goal.time_horizon,
            progress: goal.progress_ratio(),
            metric_strategy: goal.metric_strategy,
            total_items,
            done_items,
            todo_items: total_items.saturating_sub(done_items),
            created_at: goal.created_at,
            updated_at: goal.updated_at,
        }
    }
}

impl From<&Goal> for GoalSummary {
    fn from(goal: &Goal) -> Self {
        let total = goal.items.len() as u32;
        let done = goal
            .items
            .iter()
            .filter(|item| item.status == ItemStatus::Done)
            .count() as u32;
        Self::from_goal(goal, total, done)
    }
}

/// Aggregate todo/done counts over a date window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowRollup {
    /// First day of the window (inclusive)
    pub start: civil::Date,
    /// Last day of the window (inclusive)
    pub end: civil::Date,
    /// All occurrences due in the window
    pub total: u32,
    /// Completed occurrences
    pub done: u32,
    /// Pending occurrences, virtual ones included
    pub todo: u32,
}

impl WindowRollup {
    /// Tally a window's occurrences into counts.
    pub fn from_occurrences(
        start: civil::Date,
        end: civil::Date,
        occurrences: &[Occurrence],
    ) -> Self {
        let total = occurrences.len() as u32;
        let done = occurrences
            .iter()
            .filter(|o| o.status() == ItemStatus::Done)
            .count() as u32;
        Self {
            start,
            end,
            total,
            done,
            todo: total - done,
        }
    }
}
