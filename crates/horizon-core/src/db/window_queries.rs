//! Date-window queries: merging stored items with recurrence expansion, and
//! materializing virtual occurrences.

use std::collections::HashSet;

use jiff::{civil, Timestamp};
use rusqlite::{params, OptionalExtension};

use crate::{
    error::{DatabaseResultExt, Result, TrackerError},
    models::{ItemStatus, Occurrence, PlanItem, ScheduleType},
    recurrence,
};

use super::item_queries::{build_item_from_row, get_item_tx, ITEM_COLUMNS};

// INSERT OR IGNORE backs the first-writer-wins guarantee on the unique
// (template_id, occurrence_date) index.
const INSERT_OCCURRENCE_SQL: &str = "INSERT OR IGNORE INTO plan_items (goal_id, parent_id, title, description, kind, due_date, status, completion_date, effort, period, schedule, recurrence_rule, template_id, occurrence_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)";

impl super::Database {
    /// The merged view of a date window: stored items due inside it plus
    /// virtual occurrences expanded from recurring templates, with pairs
    /// that were already materialized suppressed.
    ///
    /// Ordering: todo entries first, sorted by due date then goal priority
    /// (1 first); done entries after, sorted the same way.
    pub fn query_window(
        &self,
        goal_id: Option<u64>,
        start: civil::Date,
        end: civil::Date,
    ) -> Result<Vec<Occurrence>> {
        if start > end {
            return Err(TrackerError::invalid_input(
                "window",
                format!("Window start {start} is after its end {end}"),
            ));
        }

        let stored = self.stored_in_window(goal_id, start, end)?;

        // Any (template, date) pair that already has a stored record must
        // not also appear as a virtual occurrence. The pairs are queried by
        // occurrence date, so an occurrence whose due date was later edited
        // out of the window still suppresses its virtual twin.
        let materialized = self.materialized_pairs(goal_id, start, end)?;

        let mut entries: Vec<(Occurrence, u8)> = stored
            .into_iter()
            .map(|(item, priority)| (Occurrence::Stored(item), priority))
            .collect();

        for (template, priority) in self.recurring_templates(goal_id)? {
            let Some(rule) = template.recurrence_rule.clone() else {
                continue;
            };
            let Some(anchor) = template.anchor() else {
                continue;
            };
            for date in recurrence::occurrences_in_range(&rule, anchor, start, end) {
                if materialized.contains(&(template.id, date)) {
                    continue;
                }
                entries.push((
                    Occurrence::Virtual {
                        template_id: template.id,
                        date,
                        snapshot: occurrence_snapshot(&template, date),
                    },
                    priority,
                ));
            }
        }

        entries.sort_by(|(a, pa), (b, pb)| {
            let key = |o: &Occurrence, p: u8| {
                (
                    o.status() == ItemStatus::Done,
                    o.due_date(),
                    p,
                    o.item().template_id.unwrap_or(o.item().id),
                )
            };
            key(a, *pa).cmp(&key(b, *pb))
        });

        Ok(entries.into_iter().map(|(occurrence, _)| occurrence).collect())
    }

    /// The (template, occurrence date) pairs already materialized inside the
    /// window.
    fn materialized_pairs(
        &self,
        goal_id: Option<u64>,
        start: civil::Date,
        end: civil::Date,
    ) -> Result<HashSet<(u64, civil::Date)>> {
        let mut query = "SELECT template_id, occurrence_date FROM plan_items \
             WHERE template_id IS NOT NULL AND occurrence_date >= ?1 AND occurrence_date <= ?2"
            .to_string();
        if goal_id.is_some() {
            query.push_str(" AND goal_id = ?3");
        }

        let mut stmt = self
            .connection
            .prepare(&query)
            .map_err(|e| TrackerError::database_error("Failed to prepare query", e))?;

        let map_row = |row: &rusqlite::Row| {
            let template_id = row.get::<_, i64>(0)? as u64;
            let date = super::date_col(row, 1)?;
            Ok((template_id, date))
        };

        let pairs = match goal_id {
            Some(goal_id) => stmt
                .query_map(
                    params![start.to_string(), end.to_string(), goal_id as i64],
                    map_row,
                )
                .map_err(|e| TrackerError::database_error("Failed to query occurrences", e))?
                .collect::<std::result::Result<HashSet<_>, _>>(),
            None => stmt
                .query_map(params![start.to_string(), end.to_string()], map_row)
                .map_err(|e| TrackerError::database_error("Failed to query occurrences", e))?
                .collect::<std::result::Result<HashSet<_>, _>>(),
        };

        pairs.map_err(|e| TrackerError::database_error("Failed to fetch occurrences", e))
    }

    /// Stored (non-template) items due in the window, with goal priority.
    fn stored_in_window(
        &self,
        goal_id: Option<u64>,
        start: civil::Date,
        end: civil::Date,
    ) -> Result<Vec<(PlanItem, u8)>> {
        let columns = item_columns_prefixed();
        let mut query = format!(
            "SELECT {columns}, g.priority FROM plan_items i JOIN goals g ON g.id = i.goal_id \
             WHERE i.due_date >= ?1 AND i.due_date <= ?2 AND i.schedule != 'recurring'"
        );
        if goal_id.is_some() {
            query.push_str(" AND i.goal_id = ?3");
        }

        self.query_items_with_priority(&query, start, end, goal_id)
    }

    /// Recurring templates, with goal priority, optionally scoped to a goal.
    fn recurring_templates(&self, goal_id: Option<u64>) -> Result<Vec<(PlanItem, u8)>> {
        let columns = item_columns_prefixed();
        let mut query = format!(
            "SELECT {columns}, g.priority FROM plan_items i JOIN goals g ON g.id = i.goal_id \
             WHERE i.schedule = 'recurring'"
        );
        if goal_id.is_some() {
            query.push_str(" AND i.goal_id = ?1");
        }

        let mut stmt = self
            .connection
            .prepare(&query)
            .map_err(|e| TrackerError::database_error("Failed to prepare query", e))?;

        let map_row = |row: &rusqlite::Row| {
            let item = build_item_from_row(row)?;
            let priority: i64 = row.get(17)?;
            Ok((item, priority as u8))
        };

        let rows = match goal_id {
            Some(goal_id) => stmt
                .query_map(params![goal_id as i64], map_row)
                .map_err(|e| TrackerError::database_error("Failed to query templates", e))?
                .collect::<std::result::Result<Vec<_>, _>>(),
            None => stmt
                .query_map([], map_row)
                .map_err(|e| TrackerError::database_error("Failed to query templates", e))?
                .collect::<std::result::Result<Vec<_>, _>>(),
        };

        rows.map_err(|e| TrackerError::database_error("Failed to fetch templates", e))
    }

    fn query_items_with_priority(
        &self,
        query: &str,
        start: civil::Date,
        end: civil::Date,
        goal_id: Option<u64>,
    ) -> Result<Vec<(PlanItem, u8)>> {
        let mut stmt = self
            .connection
            .prepare(query)
            .map_err(|e| TrackerError::database_error("Failed to prepare query", e))?;

        let map_row = |row: &rusqlite::Row| {
            let item = build_item_from_row(row)?;
            let priority: i64 = row.get(17)?;
            Ok((item, priority as u8))
        };

        let rows = match goal_id {
            Some(goal_id) => stmt
                .query_map(
                    params![start.to_string(), end.to_string(), goal_id as i64],
                    map_row,
                )
                .map_err(|e| TrackerError::database_error("Failed to query window", e))?
                .collect::<std::result::Result<Vec<_>, _>>(),
            None => stmt
                .query_map(params![start.to_string(), end.to_string()], map_row)
                .map_err(|e| TrackerError::database_error("Failed to query window", e))?
                .collect::<std::result::Result<Vec<_>, _>>(),
        };

        rows.map_err(|e| TrackerError::database_error("Failed to fetch window items", e))
    }

    /// Converts a virtual occurrence into a stored plan item.
    ///
    /// At most one record ever exists per `(template, date)` pair: the
    /// insert is a no-op on conflict and the surviving row is read back, so
    /// a racing second writer reuses the first writer's record, including
    /// any status it has since picked up.
    pub fn materialize_occurrence(
        &mut self,
        template_id: u64,
        date: civil::Date,
        now: Timestamp,
    ) -> Result<PlanItem> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let template =
            get_item_tx(&tx, template_id)?.ok_or(TrackerError::ItemNotFound { id: template_id })?;

        if template.schedule != ScheduleType::Recurring {
            return Err(TrackerError::invalid_input(
                "template_id",
                format!("Plan item {template_id} is not a recurring template"),
            ));
        }
        let rule = template.recurrence_rule.clone().ok_or_else(|| {
            TrackerError::invalid_input(
                "template_id",
                format!("Recurring template {template_id} has no recurrence rule"),
            )
        })?;
        let anchor = template.anchor().ok_or_else(|| {
            TrackerError::invalid_input(
                "template_id",
                format!("Recurring template {template_id} has no anchor date"),
            )
        })?;

        // The date must actually be generated by the rule.
        if recurrence::occurrences_in_range(&rule, anchor, date, date).is_empty() {
            return Err(TrackerError::invalid_input(
                "date",
                format!("{date} is not an occurrence of template {template_id}"),
            ));
        }

        let snapshot = occurrence_snapshot(&template, date);
        let now_str = now.to_string();
        tx.execute(
            INSERT_OCCURRENCE_SQL,
            params![
                snapshot.goal_id as i64,
                snapshot.parent_id.map(|v| v as i64),
                snapshot.title,
                snapshot.description,
                snapshot.kind.as_str(),
                date.to_string(),
                ItemStatus::Todo.as_str(),
                None::<String>,
                snapshot.effort.map(i64::from),
                snapshot.period,
                ScheduleType::OneOff.as_str(),
                None::<String>,
                template_id as i64,
                date.to_string(),
                &now_str,
                &now_str
            ],
        )
        .map_err(|e| TrackerError::database_error("Failed to materialize occurrence", e))?;

        // First writer wins; read back whichever record survived.
        let query =
            format!("SELECT {ITEM_COLUMNS} FROM plan_items WHERE template_id = ?1 AND occurrence_date = ?2");
        let stored = tx
            .query_row(
                &query,
                params![template_id as i64, date.to_string()],
                build_item_from_row,
            )
            .optional()
            .map_err(|e| TrackerError::database_error("Failed to read occurrence", e))?
            .ok_or_else(|| TrackerError::Conflict {
                message: format!(
                    "Occurrence ({template_id}, {date}) vanished during materialization"
                ),
            })?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(stored)
    }
}

/// The item column list prefixed for joined queries.
fn item_columns_prefixed() -> String {
    ITEM_COLUMNS
        .split(", ")
        .map(|col| format!("i.{col}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A transient plan item mirroring a template for one occurrence date.
///
/// The snapshot keeps the template's descriptive fields but owns its status:
/// it starts untouched (todo, no completion date) and becomes one-off when
/// stored, since the occurrence itself does not recur.
fn occurrence_snapshot(template: &PlanItem, date: civil::Date) -> PlanItem {
    PlanItem {
        id: 0,
        goal_id: template.goal_id,
        parent_id: template.parent_id,
        title: template.title.clone(),
        description: template.description.clone(),
        kind: template.kind,
        due_date: Some(date),
        status: ItemStatus::Todo,
        completion_date: None,
        effort: template.effort,
        period: template.period.clone(),
        schedule: ScheduleType::OneOff,
        recurrence_rule: None,
        template_id: Some(template.id),
        occurrence_date: Some(date),
        created_at: template.created_at,
        updated_at: template.updated_at,
    }
}
