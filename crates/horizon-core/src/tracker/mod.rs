//! High-level tracker API for managing goals and plan items.
//!
//! This module provides the main [`Tracker`] interface for interacting with
//! the Horizon tracking system. The tracker coordinates between callers and
//! the database, implementing goal, item, tree and window operations on top
//! of the storage layer.
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for creating [`Tracker`] instances with configuration
//! - [`goal_ops`]: Goal operations (create, list, update, archive, progress)
//! - [`item_ops`]: Plan item operations (add, update, toggle, attach, delete)
//! - [`window_ops`]: Date-window queries, rollups and occurrence toggles
//!
//! ## Design notes
//!
//! All operations are async and run their blocking database work on the
//! tokio blocking pool. Anything that needs the current instant or day takes
//! it as an explicit parameter (`now`, `today`); the core never reads the
//! ambient clock, so callers and tests control time.
//!
//! # Usage
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
//! let goal = tracker
//!     .create_goal(
//!         &CreateGoal {
//!             title: "Read more".to_string(),
//!             ..Default::default()
//!         },
//!         today,
//!         now,
//!     )
//!     .await?;
//! println!("Created goal: {}", goal.title);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

// Module declarations
pub mod builder;
pub mod goal_ops;
pub mod item_ops;
pub mod window_ops;


// Re-export the main types
pub use builder::TrackerBuilder;

/// Main tracker interface for managing goals and plan items.
pub struct Tracker {
    pub(crate) db_path: PathBuf,
}

impl Tracker {
    /// Creates a new tracker with the specified database path.
    pub(crate) fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }
}
