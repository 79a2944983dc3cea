//! Parameter structures for Horizon operations
//!
//! Shared parameter structures usable across interfaces (CLI, future APIs)
//! without framework-specific derives. Interface layers add their own
//! wrappers (clap derives and the like) and convert into these via `.into()`
//! or accessor methods, keeping the core free of UI dependencies.

use jiff::civil;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, TrackerError},
    models::{ItemKind, ItemStatus, MetricStrategy, RecurrenceRule, TimeHorizon},
};

/// Generic parameters for operations requiring just an ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Id {
    /// The ID of the resource to operate on
    pub id: u64,
}

/// Parameters for creating a new goal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateGoal {
    /// Title of the goal (required, non-empty)
    pub title: String,
    /// Optional detailed description of the goal
    pub description: Option<String>,
    /// Optional category tag
    pub category: Option<String>,
    /// Planning horizon; defaults to a year goal
    #[serde(default)]
    pub time_horizon: TimeHorizon,
    /// Start date; defaults to the creation day
    pub start_date: Option<civil::Date>,
    /// Optional end date
    pub end_date: Option<civil::Date>,
    /// Priority 1-5; defaults to 3
    pub priority: Option<u8>,
    /// Label of the numeric success metric
    pub success_metric: Option<String>,
    /// Target value for the success metric
    pub target_value: Option<f64>,
    /// How `current_value` is derived from item completions
    #[serde(default)]
    pub metric_strategy: MetricStrategy,
}

/// Parameters for listing goals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListGoals {
    /// Whether to show archived goals instead of active ones
    #[serde(default)]
    pub archived: bool,
    /// Restrict to one category tag
    pub category: Option<String>,
}

/// Parameters for permanently deleting a goal and its plan items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteGoal {
    /// The ID of the goal to delete
    pub id: u64,
    /// Explicit confirmation; deletion cascades and cannot be undone
    #[serde(default)]
    pub confirmed: bool,
}

/// Parameters for creating a new plan item.
///
/// The schedule type is derived: an item created with a recurrence rule is a
/// recurring template, one without is one-off. The two can therefore never
/// disagree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateItem {
    /// ID of the goal this item belongs to
    pub goal_id: u64,
    /// Title of the item (required, non-empty)
    pub title: String,
    /// Optional detailed description of the item
    pub description: Option<String>,
    /// Kind of work; defaults to task
    #[serde(default)]
    pub kind: ItemKind,
    /// Due date; recurring templates anchor their expansion here
    pub due_date: Option<civil::Date>,
    /// Estimated effort in minutes (positive)
    pub effort: Option<u32>,
    /// Free-form period label (e.g. "2025-W03")
    pub period: Option<String>,
    /// Optional parent item within the same goal
    pub parent_id: Option<u64>,
    /// Recurrence specification; present makes this a recurring template
    pub recurrence: Option<RecurrenceRule>,
}

/// Parameters for updating a plan item.
///
/// Status and kind arrive as strings from interface layers and are validated
/// into typed values before use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItem {
    /// The ID of the item to update
    pub id: u64,
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New kind (task, milestone or habit)
    pub kind: Option<String>,
    /// New due date
    pub due_date: Option<civil::Date>,
    /// New effort estimate in minutes
    pub effort: Option<u32>,
    /// New period label
    pub period: Option<String>,
    /// New status (todo or done)
    pub status: Option<String>,
}

impl UpdateItem {
    /// Parses and validates the requested status, if any.
    pub fn validated_status(&self) -> Result<Option<ItemStatus>> {
        self.status
            .as_deref()
            .map(|s| {
                s.parse::<ItemStatus>()
                    .map_err(|reason| TrackerError::invalid_input("status", reason))
            })
            .transpose()
    }

    /// Parses and validates the requested kind, if any.
    pub fn validated_kind(&self) -> Result<Option<ItemKind>> {
        self.kind
            .as_deref()
            .map(|s| {
                s.parse::<ItemKind>()
                    .map_err(|reason| TrackerError::invalid_input("kind", reason))
            })
            .transpose()
    }
}

/// Parameters for moving a plan item under a new parent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttachItem {
    /// The item to move
    pub item_id: u64,
    /// The new parent, or `None` to detach to top level
    pub parent_id: Option<u64>,
}

/// Parameters for querying a date window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryWindow {
    /// Restrict to items of one goal
    pub goal_id: Option<u64>,
    /// First day of the window (inclusive)
    pub start: civil::Date,
    /// Last day of the window (inclusive)
    pub end: civil::Date,
}

/// Parameters addressing one occurrence of a recurring template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleOccurrence {
    /// The recurring template
    pub template_id: u64,
    /// The occurrence date to toggle
    pub date: civil::Date,
}
