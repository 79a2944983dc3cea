//! Core library for the Horizon goal tracking application.
//!
//! This crate provides the core business logic for decomposing long-horizon
//! goals into a tree of plan items and tracking daily/weekly execution
//! against them: the goal/item hierarchy, the todo/done state machine with
//! its completion-date coupling, on-demand recurrence expansion, and
//! date-window progress rollups.
//!
//! # Architecture
//!
//! - **Models** ([`models`]): goals, plan items, the recurrence rule value
//!   object, and derived summary types
//! - **Recurrence engine** ([`recurrence`]): pure expansion of rules into
//!   occurrence dates inside a query window
//! - **Storage** ([`db`]): SQLite-backed persistence with transactional
//!   read-modify-write units and cascade deletes
//! - **Tracker** ([`tracker`]): the async facade callers use
//! - **Display** ([`display`]): markdown formatting for terminal rendering
//!
//! Time is always injected: operations that need the current instant or day
//! take `now`/`today` parameters, so tests can supply fixed dates.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use horizon_core::{params::CreateGoal, TrackerBuilder};
//! use jiff::{Timestamp, Zoned};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tracker = TrackerBuilder::new()
//!     .with_database_path(Some("horizon.db"))
//!     .build()
//!     .await?;
//!
//! let now = Timestamp::now();
//! let today = Zoned::now().date();
//!
//! let goal = tracker
//!     .create_goal(
//!         &CreateGoal {
//!             title: "Read 12 books".to_string(),
//!             success_metric: Some("books".to_string()),
//!             target_value: Some(12.0),
//!             ..Default::default()
//!         },
//!         today,
//!         now,
//!     )
//!     .await?;
//! println!("Created goal: {}", goal);
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod display;
pub mod error;
pub mod models;
pub mod params;
pub mod recurrence;
pub mod tracker;

// Re-export commonly used types
pub use db::Database;
pub use display::{GoalSummaries, Items, LocalDateTime, OperationStatus, WindowView};
pub use error::{Result, TrackerError};
pub use models::{
    Frequency, Goal, GoalFilter, GoalStatus, GoalSummary, ItemFilter, ItemKind, ItemStatus,
    MetricStrategy, Occurrence, PlanItem, RecurrenceRule, ScheduleType, TimeHorizon,
    UpdateGoalRequest, UpdateItemRequest, Weekday, WindowRollup,
};
pub use params::{
    AttachItem, CreateGoal, CreateItem, DeleteGoal, Id, ListGoals, QueryWindow, ToggleOccurrence,
    UpdateItem,
};
pub use tracker::{Tracker, TrackerBuilder};
