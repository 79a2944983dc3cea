//! Goal model definition and related functionality.

use std::str::FromStr;

use jiff::{civil, Timestamp};
use serde::{Deserialize, Serialize};

use super::{GoalStatus, PlanItem};

/// Time horizon a goal is planned against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeHorizon {
    #[default]
    Year,
    Quarter,
    Month,
    Custom,
}

impl FromStr for TimeHorizon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "year" => Ok(TimeHorizon::Year),
            "quarter" => Ok(TimeHorizon::Quarter),
            "month" => Ok(TimeHorizon::Month),
            "custom" => Ok(TimeHorizon::Custom),
            _ => Err(format!("Invalid time horizon: {s}")),
        }
    }
}

impl TimeHorizon {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeHorizon::Year => "year",
            TimeHorizon::Quarter => "quarter",
            TimeHorizon::Month => "month",
            TimeHorizon::Custom => "custom",
        }
    }
}

/// How a goal's `current_value` is derived from its plan items.
///
/// `Manual` leaves the value to direct edits; the other strategies recompute
/// it whenever an item under the goal changes status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MetricStrategy {
    /// Value is only changed by explicit goal edits
    #[default]
    Manual,

    /// Value tracks the number of completed items under the goal
    CompletedCount,

    /// Value tracks the summed effort (minutes) of completed items
    EffortSum,
}

impl FromStr for MetricStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(MetricStrategy::Manual),
            "completed-count" | "count" => Ok(MetricStrategy::CompletedCount),
            "effort-sum" | "effort" => Ok(MetricStrategy::EffortSum),
            _ => Err(format!("Invalid metric strategy: {s}")),
        }
    }
}

impl MetricStrategy {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricStrategy::Manual => "manual",
            MetricStrategy::CompletedCount => "completed-count",
            MetricStrategy::EffortSum => "effort-sum",
        }
    }
}

/// Represents a long-horizon goal with an optional numeric success metric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    /// Unique identifier for the goal
    pub id: u64,

    /// Title of the goal
    pub title: String,

    /// Detailed multi-line description of the goal
    pub description: Option<String>,

    /// Optional category tag (e.g. "health", "career")
    pub category: Option<String>,

    /// Planning horizon for the goal
    #[serde(default)]
    pub time_horizon: TimeHorizon,

    /// Date the goal starts
    pub start_date: civil::Date,

    /// Optional date the goal ends
    pub end_date: Option<civil::Date>,

    /// Status of the goal (active, done or archived)
    #[serde(default)]
    pub status: GoalStatus,

    /// Priority from 1 (highest) to 5 (lowest)
    pub priority: u8,

    /// Label of the numeric success metric (e.g. "pages")
    pub success_metric: Option<String>,

    /// Target value for the success metric
    pub target_value: Option<f64>,

    /// Current value for the success metric, never negative
    pub current_value: f64,

    /// How `current_value` is derived from item completions
    #[serde(default)]
    pub metric_strategy: MetricStrategy,

    /// Timestamp when the goal was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the goal was last modified (UTC)
    pub updated_at: Timestamp,

    /// Top-level plan items (lazy-loaded by default)
    #[serde(default)]
    pub items: Vec<PlanItem>,
}

impl Goal {
    /// Numeric progress toward the success metric as a ratio in `[0, 1]`.
    ///
    /// Returns `None` when no positive target value is set. A current value
    /// beyond the target clamps to 1.
    pub fn progress_ratio(&self) -> Option<f64> {
        match self.target_value {
            Some(target) if target > 0.0 => Some((self.current_value / target).clamp(0.0, 1.0)),
            _ => None,
        }
    }
}
