//! Plan item operations for the Tracker.

use jiff::{civil, Timestamp};
use tokio::task;

use super::Tracker;
use crate::{
    db::Database,
    display::Items,
    error::{Result, TrackerError},
    models::{ItemFilter, PlanItem, UpdateItemRequest},
    params::{AttachItem, CreateItem, Id},
};

impl Tracker {
    /// Adds a new plan item to a goal. Items created with a recurrence rule
    /// become recurring templates anchored on their due date (defaulting to
    /// `today`).
    pub async fn add_item(
        &self,
        params: &CreateItem,
        today: civil::Date,
        now: Timestamp,
    ) -> Result<PlanItem> {
        let db_path = self.db_path.clone();
        let params = params.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.create_item(&params, today, now)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Retrieves a single plan item by its ID.
    pub async fn get_item(&self, params: &Id) -> Result<Option<PlanItem>> {
        let db_path = self.db_path.clone();
        let item_id = params.id;

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_item(item_id)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists plan items with filtering.
    pub async fn list_items(&self, filter: ItemFilter) -> Result<Items> {
        let db_path = self.db_path.clone();

        let items = task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.list_items(&filter)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        Ok(Items(items))
    }

    /// Updates item details (title, description, due date, status and the
    /// like). Status changes keep the completion date coupled.
    pub async fn update_item(
        &self,
        item_id: u64,
        request: UpdateItemRequest,
        now: Timestamp,
    ) -> Result<PlanItem> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.update_item(item_id, request, now)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Flips an item between todo and done, stamping or clearing its
    /// completion date and recomputing the owning goal's progress.
    pub async fn toggle_item(&self, params: &Id, now: Timestamp) -> Result<PlanItem> {
        let db_path = self.db_path.clone();
        let item_id = params.id;

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.toggle_item(item_id, now)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Moves an item under a new parent within the same goal, or to top
    /// level. Cycles and cross-goal parents are rejected before any write.
    pub async fn attach_item(&self, params: &AttachItem, now: Timestamp) -> Result<PlanItem> {
        let db_path = self.db_path.clone();
        let item_id = params.item_id;
        let parent_id = params.parent_id;

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.attach_item(item_id, parent_id, now)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Returns all transitive children of an item, depth-first with parents
    /// before children.
    pub async fn descendants(&self, params: &Id) -> Result<Items> {
        let db_path = self.db_path.clone();
        let item_id = params.id;

        let items = task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.descendants(item_id)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        Ok(Items(items))
    }

    /// Deletes an item and its whole descendant subtree. Returns the number
    /// of deleted items.
    pub async fn delete_subtree(&self, params: &Id, now: Timestamp) -> Result<u32> {
        let db_path = self.db_path.clone();
        let item_id = params.id;

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.delete_subtree(item_id, now)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
