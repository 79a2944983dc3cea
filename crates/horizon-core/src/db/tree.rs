//! Plan item tree operations: attaching, traversal and subtree deletion.
//!
//! The parent/child relation is kept as flat rows with `parent_id` foreign
//! keys. Traversal loads the owning goal's `(id, parent_id)` pairs into an
//! id-indexed map and walks by lookup, which keeps cycle checks and cascade
//! deletes easy to reason about independent of SQL.

use std::collections::HashMap;

use jiff::Timestamp;
use rusqlite::{params, params_from_iter, Transaction};

use crate::{
    error::{DatabaseResultExt, Result, TrackerError},
    models::PlanItem,
};

use super::item_queries::{build_item_from_row, get_item_tx, ITEM_COLUMNS, UPDATE_GOAL_TIMESTAMP_SQL};

const SELECT_GOAL_EDGES_SQL: &str = "SELECT id, parent_id FROM plan_items WHERE goal_id = ?1";
const UPDATE_ITEM_PARENT_SQL: &str =
    "UPDATE plan_items SET parent_id = ?1, updated_at = ?2 WHERE id = ?3";

/// The `(id, parent_id)` edges of one goal's item forest.
type Edges = HashMap<u64, Option<u64>>;

fn load_edges_tx(tx: &Transaction, goal_id: u64) -> Result<Edges> {
    let mut stmt = tx
        .prepare(SELECT_GOAL_EDGES_SQL)
        .db_context("Failed to prepare edge query")?;
    let edges = stmt
        .query_map(params![goal_id as i64], |row| {
            Ok((
                row.get::<_, i64>(0)? as u64,
                row.get::<_, Option<i64>>(1)?.map(|v| v as u64),
            ))
        })
        .db_context("Failed to query item edges")?
        .collect::<std::result::Result<HashMap<_, _>, _>>()
        .db_context("Failed to fetch item edges")?;
    Ok(edges)
}

/// Walks up the parent chain from `start`. Returns true if `needle` is an
/// ancestor of (or equal to) `start`.
fn chain_contains(edges: &Edges, start: u64, needle: u64) -> bool {
    let mut cursor = Some(start);
    // The chain is finite in a consistent tree; bound the walk anyway so a
    // corrupted parent loop cannot hang us.
    for _ in 0..=edges.len() {
        match cursor {
            Some(id) if id == needle => return true,
            Some(id) => cursor = edges.get(&id).copied().flatten(),
            None => return false,
        }
    }
    false
}

/// Collects `root` and all its transitive children, depth-first with parents
/// before children. Children visit in ascending ID order.
fn subtree_ids(edges: &Edges, root: u64) -> Vec<u64> {
    let mut children: HashMap<u64, Vec<u64>> = HashMap::new();
    for (&id, &parent) in edges {
        if let Some(parent) = parent {
            children.entry(parent).or_default().push(id);
        }
    }
    for ids in children.values_mut() {
        ids.sort_unstable();
    }

    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        out.push(id);
        if let Some(kids) = children.get(&id) {
            // Reverse push so the smallest ID pops first.
            for &kid in kids.iter().rev() {
                stack.push(kid);
            }
        }
    }
    out
}

impl super::Database {
    /// Moves an item under a new parent, or to top level with `None`.
    ///
    /// Fails without writing if the parent does not exist, belongs to a
    /// different goal, or is the item itself or one of its descendants
    /// (which would create a cycle).
    pub fn attach_item(
        &mut self,
        item_id: u64,
        parent_id: Option<u64>,
        now: Timestamp,
    ) -> Result<PlanItem> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let item = get_item_tx(&tx, item_id)?.ok_or(TrackerError::ItemNotFound { id: item_id })?;

        if let Some(parent_id) = parent_id {
            let parent =
                get_item_tx(&tx, parent_id)?.ok_or(TrackerError::ItemNotFound { id: parent_id })?;

            if parent.goal_id != item.goal_id {
                return Err(TrackerError::invalid_input(
                    "parent_id",
                    "Parent item belongs to a different goal",
                ));
            }

            let edges = load_edges_tx(&tx, item.goal_id)?;
            if chain_contains(&edges, parent_id, item_id) {
                return Err(TrackerError::invalid_input(
                    "parent_id",
                    "Attaching here would create a cycle in the item tree",
                ));
            }
        }

        let now_str = now.to_string();
        tx.execute(
            UPDATE_ITEM_PARENT_SQL,
            params![parent_id.map(|v| v as i64), &now_str, item_id as i64],
        )
        .map_err(|e| TrackerError::database_error("Failed to move plan item", e))?;

        tx.execute(
            UPDATE_GOAL_TIMESTAMP_SQL,
            params![&now_str, item.goal_id as i64],
        )
        .map_err(|e| TrackerError::database_error("Failed to update goal timestamp", e))?;

        let updated =
            get_item_tx(&tx, item_id)?.ok_or(TrackerError::ItemNotFound { id: item_id })?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(updated)
    }

    /// Returns all transitive children of an item, depth-first with parents
    /// before children. Each call runs a fresh traversal.
    pub fn descendants(&self, item_id: u64) -> Result<Vec<PlanItem>> {
        let item = self
            .get_item(item_id)?
            .ok_or(TrackerError::ItemNotFound { id: item_id })?;

        // Arena pattern: load the goal's whole forest once, then walk by
        // index lookup.
        let query = format!("SELECT {ITEM_COLUMNS} FROM plan_items WHERE goal_id = ?1");
        let mut stmt = self
            .connection
            .prepare(&query)
            .map_err(|e| TrackerError::database_error("Failed to prepare query", e))?;
        let mut arena: HashMap<u64, PlanItem> = stmt
            .query_map(params![item.goal_id as i64], |row| {
                build_item_from_row(row).map(|item| (item.id, item))
            })
            .map_err(|e| TrackerError::database_error("Failed to query goal items", e))?
            .collect::<std::result::Result<HashMap<_, _>, _>>()
            .map_err(|e| TrackerError::database_error("Failed to fetch goal items", e))?;

        let edges: Edges = arena
            .values()
            .map(|item| (item.id, item.parent_id))
            .collect();

        Ok(subtree_ids(&edges, item_id)
            .into_iter()
            .filter(|&id| id != item_id)
            .filter_map(|id| arena.remove(&id))
            .collect())
    }

    /// Deletes an item and its whole descendant subtree in one transaction.
    /// Returns the number of deleted items. Siblings and ancestors are
    /// untouched; a failure rolls the whole delete back.
    pub fn delete_subtree(&mut self, item_id: u64, now: Timestamp) -> Result<u32> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let item = get_item_tx(&tx, item_id)?.ok_or(TrackerError::ItemNotFound { id: item_id })?;
        let edges = load_edges_tx(&tx, item.goal_id)?;
        let ids = subtree_ids(&edges, item_id);

        let placeholders = vec!["?"; ids.len()].join(", ");
        let query = format!("DELETE FROM plan_items WHERE id IN ({placeholders})");
        tx.execute(&query, params_from_iter(ids.iter().map(|&id| id as i64)))
            .map_err(|e| TrackerError::database_error("Failed to delete subtree", e))?;

        tx.execute(
            UPDATE_GOAL_TIMESTAMP_SQL,
            params![now.to_string(), item.goal_id as i64],
        )
        .map_err(|e| TrackerError::database_error("Failed to update goal timestamp", e))?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(ids.len() as u32)
    }
}
