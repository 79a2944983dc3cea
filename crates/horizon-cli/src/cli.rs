//! Command handlers bridging parsed arguments to tracker operations.
//!
//! The handlers read the ambient clock exactly once per command and pass the
//! instant and day into the core, which never touches the clock itself.

use anyhow::{Context, Result};
use horizon_core::{
    params::{Id, ListGoals, QueryWindow, ToggleOccurrence},
    GoalStatus, ItemFilter, OperationStatus, Tracker, UpdateGoalRequest, UpdateItemRequest,
    Weekday,
};
use jiff::{civil, tz::TimeZone, Timestamp, ToSpan};

use crate::args::{
    DoneArgs, GoalCommands, ItemCommands, ListItemsArgs, TodayArgs, WeekArgs,
};
use crate::renderer::TerminalRenderer;

/// CLI command dispatcher holding the tracker and renderer.
pub struct Cli {
    tracker: Tracker,
    renderer: TerminalRenderer,
}

/// The wall clock, read once at the command boundary.
fn clock() -> (Timestamp, civil::Date) {
    let now = Timestamp::now();
    let today = now.to_zoned(TimeZone::system()).date();
    (now, today)
}

/// The Monday of the week containing `date`.
fn week_monday(date: civil::Date) -> civil::Date {
    let offset = i64::from(Weekday::from(date.weekday()).monday_offset());
    date.checked_add((-offset).days()).unwrap_or(date)
}

impl Cli {
    pub fn new(tracker: Tracker, renderer: TerminalRenderer) -> Self {
        Self { tracker, renderer }
    }

    pub async fn handle_goal_command(&self, command: GoalCommands) -> Result<()> {
        let (now, today) = clock();
        match command {
            GoalCommands::Add(args) => {
                let goal = self
                    .tracker
                    .create_goal(&args.into(), today, now)
                    .await
                    .context("Failed to create goal")?;
                self.renderer.render(&format!("{goal}"))
            }
            GoalCommands::List(args) => self.list_goals(&args.into()).await,
            GoalCommands::Show(args) => {
                let id: Id = args.into();
                match self.tracker.get_goal(&id).await? {
                    Some(goal) => self.renderer.render(&format!("{goal}")),
                    None => self.renderer.render(&format!(
                        "{}",
                        OperationStatus::failure(format!("Goal {} not found", id.id))
                    )),
                }
            }
            GoalCommands::Progress(args) => {
                let id: Id = args.into();
                let message = match self.tracker.progress_ratio(&id).await? {
                    Some(ratio) => format!("Goal {} progress: {:.0}%", id.id, ratio * 100.0),
                    None => format!("Goal {} has no numeric target", id.id),
                };
                self.renderer.render(&message)
            }
            GoalCommands::Done(args) => {
                let id: Id = args.into();
                let goal = self
                    .tracker
                    .update_goal(
                        id.id,
                        UpdateGoalRequest {
                            status: Some(GoalStatus::Done),
                            ..Default::default()
                        },
                        now,
                    )
                    .await
                    .context("Failed to update goal")?;
                let status =
                    OperationStatus::success(format!("Goal achieved: {}", goal.title));
                self.renderer.render(&format!("{status}"))
            }
            GoalCommands::Archive(args) => {
                let id: Id = args.into();
                let status = match self.tracker.archive_goal(&id, now).await? {
                    Some(goal) => {
                        OperationStatus::success(format!("Archived goal: {}", goal.title))
                    }
                    None => OperationStatus::failure(format!("Goal {} not found", id.id)),
                };
                self.renderer.render(&format!("{status}"))
            }
            GoalCommands::Unarchive(args) => {
                let id: Id = args.into();
                let status = match self.tracker.unarchive_goal(&id, now).await? {
                    Some(goal) => {
                        OperationStatus::success(format!("Restored goal: {}", goal.title))
                    }
                    None => OperationStatus::failure(format!("Goal {} not found", id.id)),
                };
                self.renderer.render(&format!("{status}"))
            }
            GoalCommands::Delete(args) => {
                let status = match self.tracker.delete_goal(&args.into()).await? {
                    Some(goal) => OperationStatus::success(format!(
                        "Deleted goal '{}' and all its plan items",
                        goal.title
                    )),
                    None => OperationStatus::failure("Goal not found".to_string()),
                };
                self.renderer.render(&format!("{status}"))
            }
        }
    }

    pub async fn handle_item_command(&self, command: ItemCommands) -> Result<()> {
        let (now, today) = clock();
        match command {
            ItemCommands::Add(args) => {
                let item = self
                    .tracker
                    .add_item(&args.into_params(), today, now)
                    .await
                    .context("Failed to add plan item")?;
                self.renderer.render(&format!("{item}"))
            }
            ItemCommands::List(args) => self.list_items(args).await,
            ItemCommands::Show(args) => {
                let id: Id = args.into();
                match self.tracker.get_item(&id).await? {
                    Some(item) => self.renderer.render(&format!("{item}")),
                    None => self.renderer.render(&format!(
                        "{}",
                        OperationStatus::failure(format!("Plan item {} not found", id.id))
                    )),
                }
            }
            ItemCommands::Edit(args) => {
                let params: horizon_core::params::UpdateItem = args.into();
                let request = UpdateItemRequest::try_from(params.clone())?;
                let item = self
                    .tracker
                    .update_item(params.id, request, now)
                    .await
                    .context("Failed to update plan item")?;
                self.renderer.render(&format!("{item}"))
            }
            ItemCommands::Done(args) => self.toggle(args, now).await,
            ItemCommands::Attach(args) => {
                let item = self
                    .tracker
                    .attach_item(&args.into(), now)
                    .await
                    .context("Failed to move plan item")?;
                self.renderer.render(&format!("{item}"))
            }
            ItemCommands::Tree(args) => {
                let items = self.tracker.descendants(&args.into()).await?;
                self.renderer.render(&format!("{items}"))
            }
            ItemCommands::Delete(args) => {
                let deleted = self
                    .tracker
                    .delete_subtree(&args.into(), now)
                    .await
                    .context("Failed to delete subtree")?;
                let status = OperationStatus::success(format!(
                    "Deleted {deleted} plan item{}",
                    if deleted == 1 { "" } else { "s" }
                ));
                self.renderer.render(&format!("{status}"))
            }
        }
    }

    pub async fn list_goals(&self, params: &ListGoals) -> Result<()> {
        let summaries = self.tracker.list_goals_summary(params).await?;
        self.renderer.render(&format!("{summaries}"))
    }

    async fn list_items(&self, args: ListItemsArgs) -> Result<()> {
        let status = args
            .status
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|reason: String| anyhow::anyhow!(reason))?;
        let items = self
            .tracker
            .list_items(ItemFilter {
                goal_id: args.goal,
                status,
                top_level_only: args.top_level,
                ..Default::default()
            })
            .await?;
        self.renderer.render(&format!("{items}"))
    }

    /// Toggles a stored item by ID, or one occurrence of a recurring
    /// template when `--on` gives the occurrence date.
    async fn toggle(&self, args: DoneArgs, now: Timestamp) -> Result<()> {
        let item = match args.on {
            Some(date) => {
                self.tracker
                    .toggle_occurrence(
                        &ToggleOccurrence {
                            template_id: args.id,
                            date,
                        },
                        now,
                    )
                    .await?
            }
            None => self.tracker.toggle_item(&Id { id: args.id }, now).await?,
        };
        let status = OperationStatus::success(format!(
            "{} is now {}",
            item.title,
            item.status.as_str()
        ));
        self.renderer.render(&format!("{status}"))
    }

    pub async fn today(&self, args: TodayArgs) -> Result<()> {
        let (_, today) = clock();
        let day = args.date.unwrap_or(today);
        let view = self
            .tracker
            .window_view(&QueryWindow {
                goal_id: None,
                start: day,
                end: day,
            })
            .await?;
        self.renderer.render(&format!("{view}"))
    }

    pub async fn week(&self, args: WeekArgs) -> Result<()> {
        let (_, today) = clock();
        let start = week_monday(args.date.unwrap_or(today));
        let end = start.checked_add(6.days()).unwrap_or(start);
        let view = self
            .tracker
            .window_view(&QueryWindow {
                goal_id: args.goal,
                start,
                end,
            })
            .await?;
        self.renderer.render(&format!("{view}"))
    }
}
