//! Display implementations for domain models.
//!
//! All Display trait implementations for the core domain models, separated
//! from the model definitions to maintain clean separation of concerns. The
//! implementations produce markdown for rich terminal display.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{
    Frequency, Goal, GoalStatus, GoalSummary, ItemStatus, Occurrence, PlanItem, RecurrenceRule,
};

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.frequency, self.interval) {
            (Frequency::Daily, 1) => write!(f, "every day")?,
            (Frequency::Daily, n) => write!(f, "every {n} days")?,
            (Frequency::Weekly, 1) => write!(f, "every week")?,
            (Frequency::Weekly, n) => write!(f, "every {n} weeks")?,
            (Frequency::Monthly, 1) => write!(f, "every month")?,
            (Frequency::Monthly, n) => write!(f, "every {n} months")?,
        }
        if let Some(days) = &self.by_weekday {
            let names: Vec<String> = days.iter().map(|d| format!("{d:?}")).collect();
            write!(f, " on {}", names.join("/"))?;
        }
        if let Some(dom) = self.day_of_month {
            write!(f, " on day {dom}")?;
        }
        if let Some(until) = self.until {
            write!(f, " until {until}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.title)?;
        writeln!(f)?;

        // Metadata section
        writeln!(f, "- Status: {}", self.status.as_str())?;
        writeln!(f, "- Priority: {}", self.priority)?;
        writeln!(f, "- Horizon: {}", self.time_horizon.as_str())?;
        if let Some(category) = &self.category {
            writeln!(f, "- Category: {category}")?;
        }
        write!(f, "- Dates: {}", self.start_date)?;
        if let Some(end) = self.end_date {
            write!(f, " → {end}")?;
        }
        writeln!(f)?;
        if let Some(metric) = &self.success_metric {
            let target = self
                .target_value
                .map_or_else(|| "?".to_string(), |t| t.to_string());
            writeln!(f, "- Metric: {} / {} {}", self.current_value, target, metric)?;
        }
        if let Some(ratio) = self.progress_ratio() {
            writeln!(f, "- Progress: {:.0}%", ratio * 100.0)?;
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        // Description as a paragraph
        if let Some(desc) = &self.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }

        if !self.items.is_empty() {
            writeln!(f, "\n## Plan items")?;
            writeln!(f)?;
            for item in &self.items {
                write!(f, "{item}")?;
            }
        } else {
            writeln!(f, "\nNo plan items in this goal.")?;
        }

        Ok(())
    }
}

impl fmt::Display for PlanItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {}. {} ({})",
            self.id,
            self.title,
            self.status.with_icon()
        )?;
        writeln!(f)?;

        if let Some(desc) = &self.description {
            writeln!(f, "{desc}")?;
            writeln!(f)?;
        }

        writeln!(f, "- Kind: {}", self.kind.as_str())?;
        if let Some(due) = self.due_date {
            writeln!(f, "- Due: {due}")?;
        }
        if let Some(effort) = self.effort {
            writeln!(f, "- Effort: {effort} min")?;
        }
        if let Some(period) = &self.period {
            writeln!(f, "- Period: {period}")?;
        }
        if let Some(rule) = &self.recurrence_rule {
            writeln!(f, "- Repeats: {rule}")?;
        }
        if let Some(completed) = &self.completion_date {
            writeln!(f, "- Completed: {}", LocalDateTime(completed))?;
        }
        writeln!(f)?;

        Ok(())
    }
}

impl fmt::Display for GoalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = if self.total_items > 0 {
            format!(" ({}/{})", self.done_items, self.total_items)
        } else {
            String::new()
        };

        writeln!(f, "## {} (ID: {}){counts}", self.title, self.id)?;
        writeln!(f)?;

        writeln!(f, "- **Priority**: {}", self.priority)?;
        if let Some(category) = &self.category {
            writeln!(f, "- **Category**: {category}")?;
        }
        if let Some(progress) = self.progress {
            writeln!(f, "- **Progress**: {:.0}%", progress * 100.0)?;
        }
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)?;

        Ok(())
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let item = self.item();
        let due = item
            .due_date
            .map_or_else(|| "unscheduled".to_string(), |d| d.to_string());
        let marker = if self.is_virtual() { " (recurring)" } else { "" };
        writeln!(
            f,
            "- {} {}: {due}{marker}",
            item.status.with_icon(),
            item.title
        )
    }
}
