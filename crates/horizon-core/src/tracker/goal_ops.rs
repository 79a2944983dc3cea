//! Goal operations for the Tracker.

use jiff::{civil, Timestamp};
use tokio::task;

use super::Tracker;
use crate::{
    db::Database,
    display::GoalSummaries,
    error::{Result, TrackerError},
    models::{Goal, GoalFilter, GoalSummary, UpdateGoalRequest},
    params::{CreateGoal, DeleteGoal, Id, ListGoals},
};

impl Tracker {
    /// Creates a new goal. `today` supplies the default start date and `now`
    /// the creation timestamp.
    pub async fn create_goal(
        &self,
        params: &CreateGoal,
        today: civil::Date,
        now: Timestamp,
    ) -> Result<Goal> {
        let db_path = self.db_path.clone();
        let params = params.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.create_goal(&params, today, now)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Retrieves a goal by its ID with top-level items loaded.
    pub async fn get_goal(&self, params: &Id) -> Result<Option<Goal>> {
        let db_path = self.db_path.clone();
        let goal_id = params.id;

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_goal(goal_id)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Lists all goals with optional filtering.
    pub async fn list_goals(&self, filter: Option<GoalFilter>) -> Result<Vec<Goal>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.list_goals(filter.as_ref())
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Handle listing goals as summaries with top-level item counts, for
    /// consistent list display across interfaces.
    pub async fn list_goals_summary(&self, params: &ListGoals) -> Result<GoalSummaries> {
        let db_path = self.db_path.clone();
        let filter = GoalFilter::from(params);

        let summaries: Vec<GoalSummary> = task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.list_goal_summaries(Some(&filter))
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        Ok(GoalSummaries(summaries))
    }

    /// Updates goal details (title, metric fields, priority and the like).
    pub async fn update_goal(
        &self,
        goal_id: u64,
        request: UpdateGoalRequest,
        now: Timestamp,
    ) -> Result<Goal> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.update_goal(goal_id, request, now)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Archives a goal (soft delete). Returns the goal details if it exists.
    pub async fn archive_goal(&self, params: &Id, now: Timestamp) -> Result<Option<Goal>> {
        let db_path = self.db_path.clone();
        let goal_id = params.id;

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.archive_goal(goal_id, now)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Unarchives a goal (restores from archive).
    pub async fn unarchive_goal(&self, params: &Id, now: Timestamp) -> Result<Option<Goal>> {
        let db_path = self.db_path.clone();
        let goal_id = params.id;

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.unarchive_goal(goal_id, now)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// Handle permanently deleting a goal and its whole item forest.
    ///
    /// Requires explicit confirmation via the `confirmed` field to prevent
    /// accidental deletion. Uses get-before-delete to return the deleted
    /// goal's details, or `None` if it did not exist.
    pub async fn delete_goal(&self, params: &DeleteGoal) -> Result<Option<Goal>> {
        if !params.confirmed {
            return Err(TrackerError::invalid_input(
                "confirmed",
                "Goal deletion cascades to every plan item and cannot be undone. \
                 Set 'confirmed' to true to proceed.",
            ));
        }

        let goal = self.get_goal(&Id { id: params.id }).await?;
        if goal.is_none() {
            return Ok(None);
        }

        let db_path = self.db_path.clone();
        let goal_id = params.id;

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.delete_goal(goal_id)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        Ok(goal)
    }

    /// Numeric progress toward a goal's success metric, when one is set.
    pub async fn progress_ratio(&self, params: &Id) -> Result<Option<f64>> {
        let goal = self
            .get_goal(params)
            .await?
            .ok_or(TrackerError::GoalNotFound { id: params.id })?;
        Ok(goal.progress_ratio())
    }
}
