//! Command-line argument definitions using clap
//!
//! This module defines the CLI structure with clap's derive API, following
//! the parameter wrapper pattern: each argument struct adds CLI-specific
//! concerns (flags, help text) and converts into the core parameter types
//! via `From`/`into_params`, keeping the core free of clap derives.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use horizon_core::{
    params::{AttachItem, CreateGoal, CreateItem, DeleteGoal, Id, ListGoals, UpdateItem},
    Frequency, ItemKind, MetricStrategy, RecurrenceRule, TimeHorizon, Weekday,
};
use jiff::civil;

/// Main command-line interface for the Horizon goal tracking tool
///
/// Horizon decomposes long-horizon goals into a tree of plan items and
/// tracks daily and weekly execution against them, including recurring
/// items expanded on demand into dated occurrences.
#[derive(Parser)]
#[command(version, about, name = "hz")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/horizon/horizon.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Horizon CLI
///
/// The CLI is organized into four main command categories:
/// - `goal`: Operations for managing goals (create, list, archive, etc.)
/// - `item`: Operations for managing plan items within goals
/// - `today`: The day view with todo/done rollup
/// - `week`: The Monday-started week view
#[derive(Subcommand)]
pub enum Commands {
    /// Manage goals
    #[command(alias = "g")]
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
    /// Manage plan items within goals
    #[command(alias = "i")]
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },
    /// Show everything due today
    Today(TodayArgs),
    /// Show the current week, day by day
    Week(WeekArgs),
}

/// Goal subcommands
#[derive(Subcommand)]
pub enum GoalCommands {
    /// Create a new goal
    Add(AddGoalArgs),
    /// List goals as summaries
    List(ListGoalsArgs),
    /// Show a goal with its top-level plan items
    Show(GoalIdArgs),
    /// Show a goal's numeric progress toward its success metric
    Progress(GoalIdArgs),
    /// Mark a goal as achieved
    Done(GoalIdArgs),
    /// Archive a goal, hiding it from the default list
    Archive(GoalIdArgs),
    /// Restore an archived goal to the active list
    Unarchive(GoalIdArgs),
    /// Permanently delete a goal and every plan item under it
    Delete(DeleteGoalArgs),
}

/// Item subcommands
#[derive(Subcommand)]
pub enum ItemCommands {
    /// Add a plan item to a goal (with --every it becomes recurring)
    Add(AddItemArgs),
    /// List plan items
    List(ListItemsArgs),
    /// Show a single plan item
    Show(ItemIdArgs),
    /// Edit a plan item's fields
    Edit(EditItemArgs),
    /// Toggle an item between todo and done
    Done(DoneArgs),
    /// Move an item under a new parent (omit --parent to detach)
    Attach(AttachArgs),
    /// Show an item's descendant subtree
    Tree(ItemIdArgs),
    /// Delete an item and its whole descendant subtree
    Delete(ItemIdArgs),
}

/// Create a new goal
#[derive(ClapArgs)]
pub struct AddGoalArgs {
    /// Title of the goal
    pub title: String,
    /// Optional description providing more context about the goal
    #[arg(short, long)]
    pub description: Option<String>,
    /// Category tag (e.g. health, career)
    #[arg(short, long)]
    pub category: Option<String>,
    /// Planning horizon: year, quarter, month or custom
    #[arg(long)]
    pub horizon: Option<TimeHorizon>,
    /// Start date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start: Option<civil::Date>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<civil::Date>,
    /// Priority from 1 (highest) to 5
    #[arg(short, long)]
    pub priority: Option<u8>,
    /// Label of the numeric success metric (e.g. pages)
    #[arg(long)]
    pub metric: Option<String>,
    /// Target value for the success metric
    #[arg(long)]
    pub target: Option<f64>,
    /// How progress derives from items: manual, completed-count or effort-sum
    #[arg(long)]
    pub strategy: Option<MetricStrategy>,
}

impl From<AddGoalArgs> for CreateGoal {
    fn from(val: AddGoalArgs) -> Self {
        CreateGoal {
            title: val.title,
            description: val.description,
            category: val.category,
            time_horizon: val.horizon.unwrap_or_default(),
            start_date: val.start,
            end_date: val.end,
            priority: val.priority,
            success_metric: val.metric,
            target_value: val.target,
            metric_strategy: val.strategy.unwrap_or_default(),
        }
    }
}

/// List goals
#[derive(ClapArgs)]
pub struct ListGoalsArgs {
    /// Show archived goals instead of active ones
    #[arg(long)]
    pub archived: bool,
    /// Restrict to one category tag
    #[arg(short, long)]
    pub category: Option<String>,
}

impl From<ListGoalsArgs> for ListGoals {
    fn from(val: ListGoalsArgs) -> Self {
        ListGoals {
            archived: val.archived,
            category: val.category,
        }
    }
}

/// Address a goal by ID
#[derive(ClapArgs)]
pub struct GoalIdArgs {
    /// Unique identifier of the goal
    pub id: u64,
}

impl From<GoalIdArgs> for Id {
    fn from(val: GoalIdArgs) -> Self {
        Id { id: val.id }
    }
}

/// Permanently delete a goal
#[derive(ClapArgs)]
pub struct DeleteGoalArgs {
    /// Unique identifier of the goal to delete
    pub id: u64,
    /// Confirm the cascade delete of the goal and every item under it
    #[arg(long)]
    pub yes: bool,
}

impl From<DeleteGoalArgs> for DeleteGoal {
    fn from(val: DeleteGoalArgs) -> Self {
        DeleteGoal {
            id: val.id,
            confirmed: val.yes,
        }
    }
}

/// Add a plan item
#[derive(ClapArgs)]
pub struct AddItemArgs {
    /// ID of the goal this item belongs to
    pub goal_id: u64,
    /// Title of the item
    pub title: String,
    /// Optional description of the item
    #[arg(short, long)]
    pub description: Option<String>,
    /// Kind of work: task, milestone or habit
    #[arg(short, long)]
    pub kind: Option<ItemKind>,
    /// Due date (YYYY-MM-DD); anchors recurring items
    #[arg(long)]
    pub due: Option<civil::Date>,
    /// Estimated effort in minutes
    #[arg(short, long)]
    pub effort: Option<u32>,
    /// Period label for grouping (e.g. 2025-W03)
    #[arg(long)]
    pub period: Option<String>,
    /// Parent item to nest under (same goal)
    #[arg(long)]
    pub parent: Option<u64>,
    /// Repeat frequency: daily, weekly or monthly
    #[arg(long)]
    pub every: Option<Frequency>,
    /// Repeat every N frequency units
    #[arg(long, default_value_t = 1)]
    pub interval: u32,
    /// Weekdays for weekly rules, comma separated (e.g. mon,wed,fri)
    #[arg(long, value_delimiter = ',')]
    pub weekday: Vec<Weekday>,
    /// Day of month for monthly rules, clamped to shorter months
    #[arg(long)]
    pub day_of_month: Option<u8>,
    /// Last date the recurrence generates (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<civil::Date>,
}

impl AddItemArgs {
    /// Convert CLI arguments into core creation parameters. The recurrence
    /// flags only take effect together with `--every`.
    pub fn into_params(self) -> CreateItem {
        let recurrence = self.every.map(|frequency| RecurrenceRule {
            frequency,
            interval: self.interval,
            by_weekday: (!self.weekday.is_empty()).then_some(self.weekday),
            day_of_month: self.day_of_month,
            until: self.until,
        });

        CreateItem {
            goal_id: self.goal_id,
            title: self.title,
            description: self.description,
            kind: self.kind.unwrap_or_default(),
            due_date: self.due,
            effort: self.effort,
            period: self.period,
            parent_id: self.parent,
            recurrence,
        }
    }
}

/// List plan items
#[derive(ClapArgs)]
pub struct ListItemsArgs {
    /// Restrict to items of one goal
    #[arg(long)]
    pub goal: Option<u64>,
    /// Filter by status: todo or done
    #[arg(long)]
    pub status: Option<String>,
    /// Only top-level items (no parent)
    #[arg(long)]
    pub top_level: bool,
}

/// Address a plan item by ID
#[derive(ClapArgs)]
pub struct ItemIdArgs {
    /// Unique identifier of the plan item
    pub id: u64,
}

impl From<ItemIdArgs> for Id {
    fn from(val: ItemIdArgs) -> Self {
        Id { id: val.id }
    }
}

/// Edit a plan item
#[derive(ClapArgs)]
pub struct EditItemArgs {
    /// Unique identifier of the plan item
    pub id: u64,
    /// New title
    #[arg(short, long)]
    pub title: Option<String>,
    /// New description
    #[arg(short, long)]
    pub description: Option<String>,
    /// New kind: task, milestone or habit
    #[arg(short, long)]
    pub kind: Option<String>,
    /// New due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<civil::Date>,
    /// New effort estimate in minutes
    #[arg(short, long)]
    pub effort: Option<u32>,
    /// New period label
    #[arg(long)]
    pub period: Option<String>,
    /// New status: todo or done
    #[arg(short, long)]
    pub status: Option<String>,
}

impl From<EditItemArgs> for UpdateItem {
    fn from(val: EditItemArgs) -> Self {
        UpdateItem {
            id: val.id,
            title: val.title,
            description: val.description,
            kind: val.kind,
            due_date: val.due,
            effort: val.effort,
            period: val.period,
            status: val.status,
        }
    }
}

/// Toggle an item's status
#[derive(ClapArgs)]
pub struct DoneArgs {
    /// Item ID, or template ID when --on addresses an occurrence
    pub id: u64,
    /// Occurrence date of a recurring template (YYYY-MM-DD); materializes
    /// the occurrence first if it is still virtual
    #[arg(long)]
    pub on: Option<civil::Date>,
}

/// Move an item in the tree
#[derive(ClapArgs)]
pub struct AttachArgs {
    /// Item to move
    pub id: u64,
    /// New parent item; omit to detach to top level
    #[arg(long)]
    pub parent: Option<u64>,
}

impl From<AttachArgs> for AttachItem {
    fn from(val: AttachArgs) -> Self {
        AttachItem {
            item_id: val.id,
            parent_id: val.parent,
        }
    }
}

/// Day view arguments
#[derive(ClapArgs)]
pub struct TodayArgs {
    /// Day to show (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub date: Option<civil::Date>,
}

/// Week view arguments
#[derive(ClapArgs)]
pub struct WeekArgs {
    /// Any day of the week to show (YYYY-MM-DD); defaults to this week
    #[arg(long)]
    pub date: Option<civil::Date>,
    /// Restrict to items of one goal
    #[arg(long)]
    pub goal: Option<u64>,
}
