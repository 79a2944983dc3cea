//! Request types for updating models.

use jiff::civil;

use super::{GoalStatus, ItemKind, ItemStatus, MetricStrategy, TimeHorizon};

/// Parameters for updating a plan item to reduce function argument count.
///
/// A `Some` field is applied; `None` keeps the current value. Status changes
/// go through the transition function, so the completion date is derived, not
/// supplied.
#[derive(Debug, Default)]
pub struct UpdateItemRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<ItemKind>,
    pub due_date: Option<civil::Date>,
    pub effort: Option<u32>,
    pub period: Option<String>,
    pub status: Option<ItemStatus>,
}

impl TryFrom<crate::params::UpdateItem> for UpdateItemRequest {
    type Error = crate::TrackerError;

    fn try_from(params: crate::params::UpdateItem) -> Result<Self, Self::Error> {
        let status = params.validated_status()?;
        let kind = params.validated_kind()?;

        Ok(Self {
            title: params.title,
            description: params.description,
            kind,
            due_date: params.due_date,
            effort: params.effort,
            period: params.period,
            status,
        })
    }
}

/// Parameters for updating a goal.
///
/// A `Some` field is applied; `None` keeps the current value.
#[derive(Debug, Default)]
pub struct UpdateGoalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub time_horizon: Option<TimeHorizon>,
    pub end_date: Option<civil::Date>,
    pub status: Option<GoalStatus>,
    pub priority: Option<u8>,
    pub success_metric: Option<String>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub metric_strategy: Option<MetricStrategy>,
}
