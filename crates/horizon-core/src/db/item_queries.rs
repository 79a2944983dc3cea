//! Plan item CRUD operations and status transitions.

use jiff::{civil, Timestamp};
use rusqlite::{params, types::Type, OptionalExtension, Transaction};

use crate::{
    error::{DatabaseResultExt, Result, TrackerError},
    models::{ItemFilter, ItemStatus, PlanItem, ScheduleType, UpdateItemRequest},
    params::CreateItem,
};

// SQL queries as const strings
pub(super) const ITEM_COLUMNS: &str = "id, goal_id, parent_id, title, description, kind, due_date, status, completion_date, effort, period, schedule, recurrence_rule, template_id, occurrence_date, created_at, updated_at";
const INSERT_ITEM_SQL: &str = "INSERT INTO plan_items (goal_id, parent_id, title, description, kind, due_date, status, completion_date, effort, period, schedule, recurrence_rule, template_id, occurrence_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)";
const CHECK_GOAL_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM goals WHERE id = ?1)";
const SELECT_ITEM_GOAL_SQL: &str = "SELECT goal_id FROM plan_items WHERE id = ?1";
const UPDATE_ITEM_SQL: &str = "UPDATE plan_items SET title = ?1, description = ?2, kind = ?3, due_date = ?4, status = ?5, completion_date = ?6, effort = ?7, period = ?8, updated_at = ?9 WHERE id = ?10";
const UPDATE_ITEM_STATUS_SQL: &str =
    "UPDATE plan_items SET status = ?1, completion_date = ?2, updated_at = ?3 WHERE id = ?4";
pub(super) const UPDATE_GOAL_TIMESTAMP_SQL: &str =
    "UPDATE goals SET updated_at = ?1 WHERE id = ?2";

/// Constructs a PlanItem from a database row following `ITEM_COLUMNS` order.
pub(super) fn build_item_from_row(row: &rusqlite::Row) -> rusqlite::Result<PlanItem> {
    let rule_json: Option<String> = row.get(12)?;
    let recurrence_rule = rule_json
        .map(|json| {
            serde_json::from_str(&json).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(12, Type::Text, Box::new(e))
            })
        })
        .transpose()?;

    Ok(PlanItem {
        id: row.get::<_, i64>(0)? as u64,
        goal_id: row.get::<_, i64>(1)? as u64,
        parent_id: row.get::<_, Option<i64>>(2)?.map(|v| v as u64),
        title: row.get(3)?,
        description: row.get(4)?,
        kind: super::parsed_col(row, 5)?,
        due_date: super::opt_date_col(row, 6)?,
        status: super::parsed_col(row, 7)?,
        completion_date: super::opt_timestamp_col(row, 8)?,
        effort: row.get::<_, Option<i64>>(9)?.map(|v| v as u32),
        period: row.get(10)?,
        schedule: super::parsed_col(row, 11)?,
        recurrence_rule,
        template_id: row.get::<_, Option<i64>>(13)?.map(|v| v as u64),
        occurrence_date: super::opt_date_col(row, 14)?,
        created_at: super::timestamp_col(row, 15)?,
        updated_at: super::timestamp_col(row, 16)?,
    })
}

/// Fetches a plan item inside an open transaction.
pub(super) fn get_item_tx(tx: &Transaction, id: u64) -> Result<Option<PlanItem>> {
    let query = format!("SELECT {ITEM_COLUMNS} FROM plan_items WHERE id = ?1");
    tx.query_row(&query, params![id as i64], build_item_from_row)
        .optional()
        .map_err(|e| TrackerError::database_error("Failed to query plan item", e))
}

fn validate_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TrackerError::invalid_input(
            "title",
            "Title must not be empty",
        ));
    }
    Ok(title)
}

fn validate_effort(effort: Option<u32>) -> Result<()> {
    if effort == Some(0) {
        return Err(TrackerError::invalid_input(
            "effort",
            "Effort must be a positive number of minutes",
        ));
    }
    Ok(())
}

impl super::Database {
    /// Creates a new plan item under a goal.
    ///
    /// An item created with a recurrence rule becomes a recurring template;
    /// its anchor is the due date, which defaults to the creation day. The
    /// rule is validated against that anchor before anything is written.
    pub fn create_item(
        &mut self,
        item: &CreateItem,
        today: civil::Date,
        now: Timestamp,
    ) -> Result<PlanItem> {
        let title = validate_title(&item.title)?;
        validate_effort(item.effort)?;

        let (schedule, due_date) = match &item.recurrence {
            Some(rule) => {
                let anchor = item.due_date.unwrap_or(today);
                rule.validate(anchor)?;
                (ScheduleType::Recurring, Some(anchor))
            }
            None => (ScheduleType::OneOff, item.due_date),
        };

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let goal_exists: bool = tx
            .query_row(CHECK_GOAL_EXISTS_SQL, params![item.goal_id as i64], |row| {
                row.get(0)
            })
            .map_err(|e| TrackerError::database_error("Failed to check goal existence", e))?;

        if !goal_exists {
            return Err(TrackerError::GoalNotFound { id: item.goal_id });
        }

        // A parent must exist and belong to the same goal.
        if let Some(parent_id) = item.parent_id {
            let parent_goal: Option<i64> = tx
                .query_row(SELECT_ITEM_GOAL_SQL, params![parent_id as i64], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(|e| TrackerError::database_error("Failed to query parent item", e))?;

            match parent_goal {
                None => return Err(TrackerError::ItemNotFound { id: parent_id }),
                Some(goal_id) if goal_id as u64 != item.goal_id => {
                    return Err(TrackerError::invalid_input(
                        "parent_id",
                        "Parent item belongs to a different goal",
                    ));
                }
                Some(_) => {}
            }
        }

        let rule_json = item
            .recurrence
            .as_ref()
            .map(|rule| rule.to_json())
            .transpose()?;

        let now_str = now.to_string();
        tx.execute(
            INSERT_ITEM_SQL,
            params![
                item.goal_id as i64,
                item.parent_id.map(|v| v as i64),
                title,
                item.description,
                item.kind.as_str(),
                due_date.map(|d| d.to_string()),
                ItemStatus::Todo.as_str(),
                None::<String>,
                item.effort.map(i64::from),
                item.period,
                schedule.as_str(),
                rule_json,
                None::<i64>,
                None::<String>,
                &now_str,
                &now_str
            ],
        )
        .map_err(|e| TrackerError::database_error("Failed to insert plan item", e))?;

        let id = tx.last_insert_rowid() as u64;

        tx.execute(
            UPDATE_GOAL_TIMESTAMP_SQL,
            params![&now_str, item.goal_id as i64],
        )
        .map_err(|e| TrackerError::database_error("Failed to update goal timestamp", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(PlanItem {
            id,
            goal_id: item.goal_id,
            parent_id: item.parent_id,
            title: title.into(),
            description: item.description.clone(),
            kind: item.kind,
            due_date,
            status: ItemStatus::Todo,
            completion_date: None,
            effort: item.effort,
            period: item.period.clone(),
            schedule,
            recurrence_rule: item.recurrence.clone(),
            template_id: None,
            occurrence_date: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Retrieves a single plan item by its ID.
    pub fn get_item(&self, id: u64) -> Result<Option<PlanItem>> {
        let query = format!("SELECT {ITEM_COLUMNS} FROM plan_items WHERE id = ?1");
        let mut stmt = self
            .connection
            .prepare(&query)
            .map_err(|e| TrackerError::database_error("Failed to prepare query", e))?;

        stmt.query_row(params![id as i64], build_item_from_row)
            .optional()
            .map_err(|e| TrackerError::database_error("Failed to get plan item", e))
    }

    /// Lists plan items with filtering, ordered by due date then ID. Items
    /// without a due date sort last.
    pub fn list_items(&self, filter: &ItemFilter) -> Result<Vec<PlanItem>> {
        let mut query = format!("SELECT {ITEM_COLUMNS} FROM plan_items");

        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(goal_id) = filter.goal_id {
            conditions.push("goal_id = ?");
            params_vec.push(Box::new(goal_id as i64));
        }
        if let Some(parent_id) = filter.parent_id {
            conditions.push("parent_id = ?");
            params_vec.push(Box::new(parent_id as i64));
        } else if filter.top_level_only {
            conditions.push("parent_id IS NULL");
        }
        if let Some(ref status) = filter.status {
            conditions.push("status = ?");
            params_vec.push(Box::new(status.as_str().to_string()));
        }
        if let Some(ref schedule) = filter.schedule {
            conditions.push("schedule = ?");
            params_vec.push(Box::new(schedule.as_str().to_string()));
        }
        if let Some(ref after) = filter.due_after {
            conditions.push("due_date >= ?");
            params_vec.push(Box::new(after.to_string()));
        }
        if let Some(ref before) = filter.due_before {
            conditions.push("due_date <= ?");
            params_vec.push(Box::new(before.to_string()));
        }

        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        query.push_str(" ORDER BY due_date IS NULL, due_date ASC, id ASC");

        let mut stmt = self
            .connection
            .prepare(&query)
            .map_err(|e| TrackerError::database_error("Failed to prepare query", e))?;

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|b| &**b).collect();

        let result = stmt
            .query_map(&params_refs[..], build_item_from_row)
            .map_err(|e| TrackerError::database_error("Failed to query plan items", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| TrackerError::database_error("Failed to fetch plan items", e));
        result
    }

    /// Updates item details, preserving unchanged fields.
    ///
    /// A requested status goes through the transition function, which yields
    /// the full `(status, completion_date)` pair; the pair is persisted in
    /// the same statement so the two can never drift apart. Any status
    /// request also recomputes the owning goal's progress.
    pub fn update_item(
        &mut self,
        id: u64,
        request: UpdateItemRequest,
        now: Timestamp,
    ) -> Result<PlanItem> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let current = get_item_tx(&tx, id)?.ok_or(TrackerError::ItemNotFound { id })?;

        let title = match request.title {
            Some(t) => validate_title(&t)?.to_string(),
            None => current.title.clone(),
        };
        if request.effort.is_some() {
            validate_effort(request.effort)?;
        }

        let due_date = request.due_date.or(current.due_date);
        // A recurring template's anchor moves with its due date; the rule
        // must still hold against the new anchor.
        if request.due_date.is_some() && current.schedule == ScheduleType::Recurring {
            let anchor = due_date.ok_or_else(|| {
                TrackerError::invalid_input("due_date", "Recurring templates require an anchor")
            })?;
            if let Some(rule) = &current.recurrence_rule {
                rule.validate(anchor)?;
            }
        }

        let next = match request.status {
            Some(target) => {
                ItemStatus::transition(current.status, current.completion_date, target, now)
            }
            None => crate::models::NextState {
                status: current.status,
                completion_date: current.completion_date,
            },
        };

        let now_str = now.to_string();
        tx.execute(
            UPDATE_ITEM_SQL,
            params![
                title,
                request.description.as_ref().or(current.description.as_ref()),
                request.kind.unwrap_or(current.kind).as_str(),
                due_date.map(|d| d.to_string()),
                next.status.as_str(),
                next.completion_date.map(|t| t.to_string()),
                request.effort.or(current.effort).map(i64::from),
                request.period.as_ref().or(current.period.as_ref()),
                &now_str,
                id as i64
            ],
        )
        .map_err(|e| TrackerError::database_error("Failed to update plan item", e))?;

        if request.status.is_some() {
            super::goal_queries::recompute_progress_tx(&tx, current.goal_id as i64, &now_str)?;
        }

        tx.execute(
            UPDATE_GOAL_TIMESTAMP_SQL,
            params![&now_str, current.goal_id as i64],
        )
        .map_err(|e| TrackerError::database_error("Failed to update goal timestamp", e))?;

        let updated = get_item_tx(&tx, id)?.ok_or(TrackerError::ItemNotFound { id })?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(updated)
    }

    /// Flips an item between todo and done as one atomic unit.
    ///
    /// The next `(status, completion_date)` pair comes from the transition
    /// function and is written in a single statement, and the owning goal's
    /// progress is recomputed in the same transaction.
    pub fn toggle_item(&mut self, id: u64, now: Timestamp) -> Result<PlanItem> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let current = get_item_tx(&tx, id)?.ok_or(TrackerError::ItemNotFound { id })?;

        let target = current.status.toggled();
        let next = ItemStatus::transition(current.status, current.completion_date, target, now);

        let now_str = now.to_string();
        tx.execute(
            UPDATE_ITEM_STATUS_SQL,
            params![
                next.status.as_str(),
                next.completion_date.map(|t| t.to_string()),
                &now_str,
                id as i64
            ],
        )
        .map_err(|e| TrackerError::database_error("Failed to toggle plan item", e))?;

        super::goal_queries::recompute_progress_tx(&tx, current.goal_id as i64, &now_str)?;

        tx.execute(
            UPDATE_GOAL_TIMESTAMP_SQL,
            params![&now_str, current.goal_id as i64],
        )
        .map_err(|e| TrackerError::database_error("Failed to update goal timestamp", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(PlanItem {
            status: next.status,
            completion_date: next.completion_date,
            updated_at: now,
            ..current
        })
    }
}
