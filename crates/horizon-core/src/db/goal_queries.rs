//! Goal CRUD operations and queries.

use jiff::{civil, Timestamp};
use rusqlite::{params, OptionalExtension, Transaction};

use crate::{
    error::{DatabaseResultExt, Result, TrackerError},
    models::{Goal, GoalFilter, GoalStatus, GoalSummary, ItemFilter, MetricStrategy},
    params::CreateGoal,
};

// SQL queries as const strings
const INSERT_GOAL_SQL: &str = "INSERT INTO goals (title, description, category, time_horizon, start_date, end_date, status, priority, success_metric, target_value, current_value, metric_strategy, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)";
const GOAL_COLUMNS: &str = "id, title, description, category, time_horizon, start_date, end_date, status, priority, success_metric, target_value, current_value, metric_strategy, created_at, updated_at";
const CHECK_GOAL_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM goals WHERE id = ?1)";
const UPDATE_GOAL_SQL: &str = "UPDATE goals SET title = ?1, description = ?2, category = ?3, time_horizon = ?4, end_date = ?5, status = ?6, priority = ?7, success_metric = ?8, target_value = ?9, current_value = ?10, metric_strategy = ?11, updated_at = ?12 WHERE id = ?13";
const UPDATE_GOAL_STATUS_SQL: &str =
    "UPDATE goals SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4";
const DELETE_GOAL_ITEMS_SQL: &str = "DELETE FROM plan_items WHERE goal_id = ?1";
const DELETE_GOAL_SQL: &str = "DELETE FROM goals WHERE id = ?1";
const SELECT_GOAL_STRATEGY_SQL: &str = "SELECT metric_strategy FROM goals WHERE id = ?1";
const UPDATE_GOAL_PROGRESS_SQL: &str =
    "UPDATE goals SET current_value = ?1, updated_at = ?2 WHERE id = ?3";
const COUNT_DONE_ITEMS_SQL: &str =
    "SELECT COUNT(*) FROM plan_items WHERE goal_id = ?1 AND status = 'done'";
const SUM_DONE_EFFORT_SQL: &str =
    "SELECT COALESCE(SUM(effort), 0) FROM plan_items WHERE goal_id = ?1 AND status = 'done'";

// Base queries for goal listing
const GOAL_SUMMARY_COLUMNS: &str = "id, title, description, category, time_horizon, start_date, end_date, status, priority, success_metric, target_value, current_value, metric_strategy, created_at, updated_at, total_items, done_items, todo_items";
const GOAL_SUMMARIES_VIEW: &str = "goal_summaries";
const ALL_GOAL_SUMMARIES_VIEW: &str = "all_goal_summaries";

/// Constructs a Goal from a database row following `GOAL_COLUMNS` order.
/// Items are not loaded here.
pub(super) fn build_goal_from_row(row: &rusqlite::Row) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: row.get::<_, i64>(0)? as u64,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        time_horizon: super::parsed_col(row, 4)?,
        start_date: super::date_col(row, 5)?,
        end_date: super::opt_date_col(row, 6)?,
        status: super::parsed_col(row, 7)?,
        priority: row.get::<_, i64>(8)? as u8,
        success_metric: row.get(9)?,
        target_value: row.get(10)?,
        current_value: row.get(11)?,
        metric_strategy: super::parsed_col(row, 12)?,
        created_at: super::timestamp_col(row, 13)?,
        updated_at: super::timestamp_col(row, 14)?,
        items: Vec::new(),
    })
}

/// Validates the metric fields of a goal as one unit.
fn validate_metric(
    success_metric: Option<&str>,
    target_value: Option<f64>,
    current_value: f64,
) -> Result<()> {
    if success_metric.is_some() {
        match target_value {
            Some(target) if target >= 0.0 => {}
            Some(target) => {
                return Err(TrackerError::invalid_input(
                    "target_value",
                    format!("Target value {target} must be non-negative"),
                ));
            }
            None => {
                return Err(TrackerError::invalid_input(
                    "target_value",
                    "A target value is required when a success metric is set",
                ));
            }
        }
    }
    if current_value < 0.0 {
        return Err(TrackerError::invalid_input(
            "current_value",
            "Current value must never be negative",
        ));
    }
    Ok(())
}

fn validate_priority(priority: u8) -> Result<()> {
    if !(1..=5).contains(&priority) {
        return Err(TrackerError::invalid_input(
            "priority",
            format!("Priority {priority} is out of range 1-5"),
        ));
    }
    Ok(())
}

/// Recomputes a goal's `current_value` inside an open transaction according
/// to its metric strategy. Runs as part of every item status transition.
pub(super) fn recompute_progress_tx(tx: &Transaction, goal_id: i64, now_str: &str) -> Result<()> {
    let strategy_str: String = tx
        .query_row(SELECT_GOAL_STRATEGY_SQL, params![goal_id], |row| row.get(0))
        .db_context("Failed to read goal metric strategy")?;
    let strategy = strategy_str
        .parse::<MetricStrategy>()
        .map_err(|reason| TrackerError::invalid_input("metric_strategy", reason))?;

    let value = match strategy {
        MetricStrategy::Manual => return Ok(()),
        MetricStrategy::CompletedCount => {
            let count: i64 = tx
                .query_row(COUNT_DONE_ITEMS_SQL, params![goal_id], |row| row.get(0))
                .db_context("Failed to count completed items")?;
            count as f64
        }
        MetricStrategy::EffortSum => tx
            .query_row(SUM_DONE_EFFORT_SQL, params![goal_id], |row| row.get(0))
            .db_context("Failed to sum completed effort")?,
    };

    tx.execute(UPDATE_GOAL_PROGRESS_SQL, params![value, now_str, goal_id])
        .db_context("Failed to update goal progress")?;
    Ok(())
}

impl super::Database {
    /// Creates a new goal. The start date defaults to the supplied creation
    /// day when not given.
    pub fn create_goal(
        &mut self,
        goal: &CreateGoal,
        today: civil::Date,
        now: Timestamp,
    ) -> Result<Goal> {
        let title = goal.title.trim();
        if title.is_empty() {
            return Err(TrackerError::invalid_input(
                "title",
                "Title must not be empty",
            ));
        }

        let priority = goal.priority.unwrap_or(3);
        validate_priority(priority)?;
        validate_metric(goal.success_metric.as_deref(), goal.target_value, 0.0)?;

        let start_date = goal.start_date.unwrap_or(today);
        if let Some(end) = goal.end_date {
            if end < start_date {
                return Err(TrackerError::invalid_input(
                    "end_date",
                    format!("End date {end} is before the start date {start_date}"),
                ));
            }
        }

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now_str = now.to_string();
        tx.execute(
            INSERT_GOAL_SQL,
            params![
                title,
                goal.description,
                goal.category,
                goal.time_horizon.as_str(),
                start_date.to_string(),
                goal.end_date.map(|d| d.to_string()),
                GoalStatus::Active.as_str(),
                priority as i64,
                goal.success_metric,
                goal.target_value,
                0.0,
                goal.metric_strategy.as_str(),
                &now_str,
                &now_str
            ],
        )
        .map_err(|e| TrackerError::database_error("Failed to insert goal", e))?;

        let id = tx.last_insert_rowid() as u64;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Goal {
            id,
            title: title.into(),
            description: goal.description.clone(),
            category: goal.category.clone(),
            time_horizon: goal.time_horizon,
            start_date,
            end_date: goal.end_date,
            status: GoalStatus::Active,
            priority,
            success_metric: goal.success_metric.clone(),
            target_value: goal.target_value,
            current_value: 0.0,
            metric_strategy: goal.metric_strategy,
            created_at: now,
            updated_at: now,
            items: Vec::new(),
        })
    }

    /// Retrieves a goal by its ID with top-level items eagerly loaded.
    pub fn get_goal(&self, id: u64) -> Result<Option<Goal>> {
        let query = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1");
        let mut stmt = self
            .connection
            .prepare(&query)
            .map_err(|e| TrackerError::database_error("Failed to prepare query", e))?;

        let mut goal = stmt
            .query_row(params![id as i64], build_goal_from_row)
            .optional()
            .map_err(|e| TrackerError::database_error("Failed to query goal", e))?;

        if let Some(ref mut goal) = goal {
            goal.items = self.list_items(&ItemFilter {
                goal_id: Some(goal.id),
                top_level_only: true,
                ..Default::default()
            })?;
        }

        Ok(goal)
    }

    /// Lists goals with optional filtering, top-level items eagerly loaded.
    pub fn list_goals(&self, filter: Option<&GoalFilter>) -> Result<Vec<Goal>> {
        let mut goals = self.query_goal_rows(filter, GOAL_COLUMNS, build_goal_from_row)?;

        for goal in &mut goals {
            goal.items = self.list_items(&ItemFilter {
                goal_id: Some(goal.id),
                top_level_only: true,
                ..Default::default()
            })?;
        }

        Ok(goals)
    }

    /// Lists goal summaries with top-level item counts from the summary view.
    pub fn list_goal_summaries(&self, filter: Option<&GoalFilter>) -> Result<Vec<GoalSummary>> {
        let rows = self.query_goal_rows(filter, GOAL_SUMMARY_COLUMNS, |row| {
            let goal = build_goal_from_row(row)?;
            let total: i64 = row.get(15)?;
            let done: i64 = row.get(16)?;
            Ok((goal, total, done))
        })?;

        Ok(rows
            .into_iter()
            .map(|(goal, total, done)| GoalSummary::from_goal(&goal, total as u32, done as u32))
            .collect())
    }

    /// Shared listing query against the summary views, ordered by priority
    /// (1 first) then creation time.
    fn query_goal_rows<T>(
        &self,
        filter: Option<&GoalFilter>,
        columns: &str,
        map_row: impl Fn(&rusqlite::Row) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let view = if filter.is_some_and(|f| f.include_archived) {
            ALL_GOAL_SUMMARIES_VIEW
        } else {
            GOAL_SUMMARIES_VIEW
        };

        let mut query = format!("SELECT {columns} FROM {view}");

        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(f) = filter {
            if let Some(ref status) = f.status {
                conditions.push("status = ?");
                params_vec.push(Box::new(status.as_str().to_string()));
            }
            if let Some(ref category) = f.category {
                conditions.push("category = ?");
                params_vec.push(Box::new(category.clone()));
            }
        }

        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        query.push_str(" ORDER BY priority ASC, created_at ASC");

        let mut stmt = self
            .connection
            .prepare(&query)
            .map_err(|e| TrackerError::database_error("Failed to prepare query", e))?;

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|b| &**b).collect();

        let result = stmt
            .query_map(&params_refs[..], map_row)
            .map_err(|e| TrackerError::database_error("Failed to query goals", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| TrackerError::database_error("Failed to fetch goals", e));
        result
    }

    /// Updates goal details, preserving unchanged fields. Metric fields are
    /// re-validated against the merged state before any write.
    pub fn update_goal(
        &mut self,
        id: u64,
        request: crate::models::UpdateGoalRequest,
        now: Timestamp,
    ) -> Result<Goal> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let query = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1");
        let current = tx
            .query_row(&query, params![id as i64], build_goal_from_row)
            .optional()
            .map_err(|e| TrackerError::database_error("Failed to query goal", e))?
            .ok_or(TrackerError::GoalNotFound { id })?;

        let title = match request.title {
            Some(t) => {
                let t = t.trim().to_string();
                if t.is_empty() {
                    return Err(TrackerError::invalid_input(
                        "title",
                        "Title must not be empty",
                    ));
                }
                t
            }
            None => current.title,
        };

        let merged = Goal {
            id: current.id,
            title,
            description: request.description.or(current.description),
            category: request.category.or(current.category),
            time_horizon: request.time_horizon.unwrap_or(current.time_horizon),
            start_date: current.start_date,
            end_date: request.end_date.or(current.end_date),
            status: request.status.unwrap_or(current.status),
            priority: request.priority.unwrap_or(current.priority),
            success_metric: request.success_metric.or(current.success_metric),
            target_value: request.target_value.or(current.target_value),
            current_value: request.current_value.unwrap_or(current.current_value),
            metric_strategy: request.metric_strategy.unwrap_or(current.metric_strategy),
            created_at: current.created_at,
            updated_at: now,
            items: Vec::new(),
        };

        validate_priority(merged.priority)?;
        validate_metric(
            merged.success_metric.as_deref(),
            merged.target_value,
            merged.current_value,
        )?;

        tx.execute(
            UPDATE_GOAL_SQL,
            params![
                merged.title,
                merged.description,
                merged.category,
                merged.time_horizon.as_str(),
                merged.end_date.map(|d| d.to_string()),
                merged.status.as_str(),
                merged.priority as i64,
                merged.success_metric,
                merged.target_value,
                merged.current_value,
                merged.metric_strategy.as_str(),
                now.to_string(),
                id as i64
            ],
        )
        .map_err(|e| TrackerError::database_error("Failed to update goal", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(merged)
    }

    /// Archives a goal (soft delete). Returns the goal details if it exists,
    /// even when it was already archived.
    pub fn archive_goal(&mut self, id: u64, now: Timestamp) -> Result<Option<Goal>> {
        self.set_goal_status(id, GoalStatus::Active, GoalStatus::Archived, now)
    }

    /// Unarchives a goal (restores from archive).
    pub fn unarchive_goal(&mut self, id: u64, now: Timestamp) -> Result<Option<Goal>> {
        self.set_goal_status(id, GoalStatus::Archived, GoalStatus::Active, now)
    }

    fn set_goal_status(
        &mut self,
        id: u64,
        from: GoalStatus,
        to: GoalStatus,
        now: Timestamp,
    ) -> Result<Option<Goal>> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let rows_affected = tx
            .execute(
                UPDATE_GOAL_STATUS_SQL,
                params![to.as_str(), now.to_string(), id as i64, from.as_str()],
            )
            .map_err(|e| TrackerError::database_error("Failed to update goal status", e))?;

        if rows_affected == 0 {
            let exists: bool = tx
                .query_row(CHECK_GOAL_EXISTS_SQL, params![id as i64], |row| row.get(0))
                .map_err(|e| TrackerError::database_error("Failed to check goal existence", e))?;

            if !exists {
                return Ok(None);
            }
            // Goal exists but was already in the target state; fall through
            // and return its details.
        }

        tx.commit().db_context("Failed to commit transaction")?;

        self.get_goal(id)
    }

    /// Permanently deletes a goal and all its plan items in one transaction.
    /// This operation cannot be undone.
    pub fn delete_goal(&mut self, id: u64) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let exists: bool = tx
            .query_row(CHECK_GOAL_EXISTS_SQL, params![id as i64], |row| row.get(0))
            .map_err(|e| TrackerError::database_error("Failed to check goal existence", e))?;

        if !exists {
            return Err(TrackerError::GoalNotFound { id });
        }

        // Delete all items owned by this goal first
        // (Foreign key constraints should handle this automatically, but we'll
        // be explicit)
        tx.execute(DELETE_GOAL_ITEMS_SQL, params![id as i64])
            .map_err(|e| TrackerError::database_error("Failed to delete goal items", e))?;

        tx.execute(DELETE_GOAL_SQL, params![id as i64])
            .map_err(|e| TrackerError::database_error("Failed to delete goal", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(())
    }
}
