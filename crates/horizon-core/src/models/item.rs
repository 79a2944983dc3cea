//! Plan item model definition and related functionality.

use std::str::FromStr;

use jiff::{civil, Timestamp};
use serde::{Deserialize, Serialize};

use super::{ItemStatus, RecurrenceRule};

/// What kind of work a plan item represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A concrete unit of work
    #[default]
    Task,

    /// A checkpoint marking meaningful progress
    Milestone,

    /// A repeated practice, usually paired with a recurring schedule
    Habit,
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "task" => Ok(ItemKind::Task),
            "milestone" => Ok(ItemKind::Milestone),
            "habit" => Ok(ItemKind::Habit),
            _ => Err(format!("Invalid item kind: {s}")),
        }
    }
}

impl ItemKind {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Task => "task",
            ItemKind::Milestone => "milestone",
            ItemKind::Habit => "habit",
        }
    }
}

/// Whether an item is scheduled once or repeats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleType {
    /// Scheduled for at most one date
    #[default]
    OneOff,

    /// A template that expands into dated occurrences
    Recurring,
}

impl FromStr for ScheduleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "one-off" | "oneoff" => Ok(ScheduleType::OneOff),
            "recurring" => Ok(ScheduleType::Recurring),
            _ => Err(format!("Invalid schedule type: {s}")),
        }
    }
}

impl ScheduleType {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::OneOff => "one-off",
            ScheduleType::Recurring => "recurring",
        }
    }
}

/// Represents a unit of work belonging to a goal, optionally nested under a
/// parent item within the same goal.
///
/// Invariants maintained by the storage layer:
///
/// - `completion_date` is present if and only if `status` is done.
/// - `parent_id`, when present, references an item of the same goal and the
///   parent chain is acyclic.
/// - `recurrence_rule` is present if and only if `schedule` is recurring.
/// - Materialized occurrences carry `(template_id, occurrence_date)` and at
///   most one stored record exists per pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanItem {
    /// Unique identifier for the item
    pub id: u64,

    /// ID of the owning goal
    pub goal_id: u64,

    /// Optional parent item within the same goal
    pub parent_id: Option<u64>,

    /// Brief title/summary of the item
    pub title: String,

    /// Detailed multi-line description of the item
    pub description: Option<String>,

    /// Kind of work this item represents
    #[serde(default)]
    pub kind: ItemKind,

    /// Date the item is due (calendar-day granularity)
    pub due_date: Option<civil::Date>,

    /// Current status of the item
    #[serde(default)]
    pub status: ItemStatus,

    /// When the item was completed; present iff status is done
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<Timestamp>,

    /// Estimated effort in minutes
    pub effort: Option<u32>,

    /// Free-form period label for grouping (e.g. "2025-W03")
    pub period: Option<String>,

    /// Whether this item is one-off or a recurring template
    #[serde(default)]
    pub schedule: ScheduleType,

    /// Recurrence specification; present iff schedule is recurring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<RecurrenceRule>,

    /// For materialized occurrences: the recurring template this came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<u64>,

    /// For materialized occurrences: the occurrence date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_date: Option<civil::Date>,

    /// Timestamp when the item was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the item was last updated (UTC)
    pub updated_at: Timestamp,
}

impl PlanItem {
    /// The recurrence anchor for a template: its due date.
    ///
    /// Creation normalizes an absent due date into the creation day, so a
    /// stored recurring template always has one.
    pub fn anchor(&self) -> Option<civil::Date> {
        self.due_date
    }
}
