//! Date-window operations for the Tracker.

use jiff::Timestamp;
use tokio::task;

use super::Tracker;
use crate::{
    db::Database,
    display::WindowView,
    error::{Result, TrackerError},
    models::{Occurrence, PlanItem, WindowRollup},
    params::{QueryWindow, ToggleOccurrence},
};

impl Tracker {
    /// The merged materialized + recurrence-expanded view of a date window,
    /// todo entries first.
    pub async fn query_window(&self, params: &QueryWindow) -> Result<Vec<Occurrence>> {
        let db_path = self.db_path.clone();
        let goal_id = params.goal_id;
        let (start, end) = (params.start, params.end);

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.query_window(goal_id, start, end)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// A window view bundling the ordered occurrences with their rollup
    /// counts, ready for display.
    pub async fn window_view(&self, params: &QueryWindow) -> Result<WindowView> {
        let entries = self.query_window(params).await?;
        Ok(WindowView::new(params.start, params.end, entries))
    }

    /// Aggregate todo/done counts over a date window.
    pub async fn rollup(&self, params: &QueryWindow) -> Result<WindowRollup> {
        let entries = self.query_window(params).await?;
        Ok(WindowRollup::from_occurrences(
            params.start,
            params.end,
            &entries,
        ))
    }

    /// Toggles one occurrence of a recurring template, materializing it
    /// first if it is still virtual.
    ///
    /// The materialize step is first-writer-wins on the `(template, date)`
    /// pair, so concurrent toggles converge on a single stored record.
    pub async fn toggle_occurrence(
        &self,
        params: &ToggleOccurrence,
        now: Timestamp,
    ) -> Result<PlanItem> {
        let db_path = self.db_path.clone();
        let template_id = params.template_id;
        let date = params.date;

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            let stored = db.materialize_occurrence(template_id, date, now)?;
            db.toggle_item(stored.id, now)
        })
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
