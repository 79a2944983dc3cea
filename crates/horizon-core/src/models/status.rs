//! Status enumerations for goals and plan items, and the item status
//! transition function.

use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Type-safe enumeration of goal statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    /// Goal is being actively pursued
    #[default]
    Active,

    /// Goal has been achieved
    Done,

    /// Goal is archived and hidden from normal views
    Archived,
}

impl FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(GoalStatus::Active),
            "done" => Ok(GoalStatus::Done),
            "archived" => Ok(GoalStatus::Archived),
            _ => Err(format!("Invalid goal status: {s}")),
        }
    }
}

impl GoalStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Done => "done",
            GoalStatus::Archived => "archived",
        }
    }
}

/// Type-safe enumeration of plan item statuses.
///
/// The lifecycle is deliberately small: items are pending or done. Further
/// states (e.g. cancelled) would extend this enum and the transition table
/// below, nothing else.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Item is pending completion
    #[default]
    Todo,

    /// Item has been completed
    Done,
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "todo" => Ok(ItemStatus::Todo),
            "done" => Ok(ItemStatus::Done),
            _ => Err(format!("Invalid item status: {s}")),
        }
    }
}

/// The full next state produced by a status transition.
///
/// Status and completion date always travel together; writers persist both
/// fields as one unit so the pair can never drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextState {
    pub status: ItemStatus,
    pub completion_date: Option<Timestamp>,
}

impl ItemStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Todo => "todo",
            ItemStatus::Done => "done",
        }
    }

    /// Get status with consistent icon formatting for display.
    pub fn with_icon(&self) -> &'static str {
        match self {
            ItemStatus::Done => "✓ Done",
            ItemStatus::Todo => "○ Todo",
        }
    }

    /// The opposite status, used by toggle operations.
    pub fn toggled(self) -> ItemStatus {
        match self {
            ItemStatus::Todo => ItemStatus::Done,
            ItemStatus::Done => ItemStatus::Todo,
        }
    }

    /// Computes the next (status, completion date) pair for a requested
    /// transition.
    ///
    /// Invariant: the completion date is present if and only if the status is
    /// [`ItemStatus::Done`]. Requesting the current status is a no-op with
    /// respect to the timestamp, except that a drifted pair (done without a
    /// completion date, or todo with one) is repaired rather than rejected.
    ///
    /// ```rust
    /// use horizon_core::models::{ItemStatus, NextState};
    /// use jiff::Timestamp;
    ///
    /// let now = Timestamp::UNIX_EPOCH;
    /// let next = ItemStatus::transition(ItemStatus::Todo, None, ItemStatus::Done, now);
    /// assert_eq!(next.status, ItemStatus::Done);
    /// assert_eq!(next.completion_date, Some(now));
    ///
    /// let back = ItemStatus::transition(next.status, next.completion_date, ItemStatus::Todo, now);
    /// assert_eq!(back, NextState { status: ItemStatus::Todo, completion_date: None });
    /// ```
    pub fn transition(
        current: ItemStatus,
        completed_at: Option<Timestamp>,
        target: ItemStatus,
        now: Timestamp,
    ) -> NextState {
        match (current == target, target) {
            (true, ItemStatus::Done) => NextState {
                status: ItemStatus::Done,
                // No timestamp churn on a no-op, but repair a missing date.
                completion_date: completed_at.or(Some(now)),
            },
            (true, ItemStatus::Todo) => NextState {
                status: ItemStatus::Todo,
                completion_date: None,
            },
            (false, ItemStatus::Done) => NextState {
                status: ItemStatus::Done,
                completion_date: Some(now),
            },
            (false, ItemStatus::Todo) => NextState {
                status: ItemStatus::Todo,
                completion_date: None,
            },
        }
    }
}
