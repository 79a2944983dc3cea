//! Collection wrapper types for displaying groups of domain objects.
//!
//! This module provides wrapper types that format collections of domain
//! objects with consistent structure and empty collection handling.

use std::fmt;

use jiff::civil;

use crate::models::{GoalSummary, ItemStatus, Occurrence, PlanItem, WindowRollup};

/// Newtype wrapper for displaying collections of goal summaries.
///
/// Handles empty collections gracefully and formats each summary using its
/// Display implementation.
pub struct GoalSummaries(pub Vec<GoalSummary>);

impl GoalSummaries {
    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of goal summaries in the collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get an iterator over the goal summaries.
    pub fn iter(&self) -> std::slice::Iter<'_, GoalSummary> {
        self.0.iter()
    }
}

impl fmt::Display for GoalSummaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            writeln!(f, "No goals found.")
        } else {
            for goal in &self.0 {
                write!(f, "{goal}")?;
            }
            Ok(())
        }
    }
}

/// Newtype wrapper for displaying collections of plan items.
pub struct Items(pub Vec<PlanItem>);

impl Items {
    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of items in the collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get an iterator over the items.
    pub fn iter(&self) -> std::slice::Iter<'_, PlanItem> {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Items {
    type Output = PlanItem;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl fmt::Display for Items {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            writeln!(f, "No plan items found.")
        } else {
            for item in &self.0 {
                write!(f, "{item}")?;
            }
            Ok(())
        }
    }
}

/// A date window's merged occurrence view with its rollup counts.
///
/// Todo entries print before done entries, matching the order the query
/// layer returns.
pub struct WindowView {
    pub start: civil::Date,
    pub end: civil::Date,
    pub entries: Vec<Occurrence>,
    pub rollup: WindowRollup,
}

impl WindowView {
    /// Builds a view from an ordered occurrence list.
    pub fn new(start: civil::Date, end: civil::Date, entries: Vec<Occurrence>) -> Self {
        let rollup = WindowRollup::from_occurrences(start, end, &entries);
        Self {
            start,
            end,
            entries,
            rollup,
        }
    }
}

impl fmt::Display for WindowView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            writeln!(f, "# {}", self.start)?;
        } else {
            writeln!(f, "# {} → {}", self.start, self.end)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{} total, {} done, {} todo",
            self.rollup.total, self.rollup.done, self.rollup.todo
        )?;
        writeln!(f)?;

        if self.entries.is_empty() {
            writeln!(f, "Nothing due in this window.")?;
            return Ok(());
        }

        let todo: Vec<&Occurrence> = self
            .entries
            .iter()
            .filter(|o| o.status() == ItemStatus::Todo)
            .collect();
        let done: Vec<&Occurrence> = self
            .entries
            .iter()
            .filter(|o| o.status() == ItemStatus::Done)
            .collect();

        if !todo.is_empty() {
            writeln!(f, "## Todo")?;
            writeln!(f)?;
            for occurrence in todo {
                write!(f, "{occurrence}")?;
            }
            writeln!(f)?;
        }

        if !done.is_empty() {
            writeln!(f, "## Done")?;
            writeln!(f)?;
            for occurrence in done {
                write!(f, "{occurrence}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
