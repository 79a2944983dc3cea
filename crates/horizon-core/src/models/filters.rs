//! Filter types for querying goals and plan items.

use jiff::civil;

use super::{GoalStatus, ItemStatus, ScheduleType};

/// Filter options for querying goals.
#[derive(Debug, Clone, Default)]
pub struct GoalFilter {
    /// Filter by goal status
    /// If None, defaults to showing only non-archived goals
    pub status: Option<GoalStatus>,

    /// Filter by category tag (exact match)
    pub category: Option<String>,

    /// Show all goals regardless of status
    pub include_archived: bool,
}

impl From<&crate::params::ListGoals> for GoalFilter {
    fn from(params: &crate::params::ListGoals) -> Self {
        if params.archived {
            Self {
                status: Some(GoalStatus::Archived),
                category: params.category.clone(),
                include_archived: true,
            }
        } else {
            Self {
                status: None,
                category: params.category.clone(),
                include_archived: false,
            }
        }
    }
}

/// Filter options for querying plan items.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    /// Restrict to items of one goal
    pub goal_id: Option<u64>,

    /// Restrict to children of one parent item
    pub parent_id: Option<u64>,

    /// Restrict to top-level items (no parent)
    pub top_level_only: bool,

    /// Filter by item status
    pub status: Option<ItemStatus>,

    /// Filter by schedule type
    pub schedule: Option<ScheduleType>,

    /// Filter by due date range (inclusive bounds)
    pub due_after: Option<civil::Date>,
    pub due_before: Option<civil::Date>,
}
