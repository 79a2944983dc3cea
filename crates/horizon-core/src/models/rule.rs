//! Recurrence rule value object and its validation.

use std::str::FromStr;

use jiff::civil;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

/// How often a recurring plan item repeats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(format!("Invalid frequency: {s}")),
        }
    }
}

impl Frequency {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

/// Day of week for weekly recurrence constraints. Weeks start on Monday.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mon" | "monday" => Ok(Weekday::Mon),
            "tue" | "tuesday" => Ok(Weekday::Tue),
            "wed" | "wednesday" => Ok(Weekday::Wed),
            "thu" | "thursday" => Ok(Weekday::Thu),
            "fri" | "friday" => Ok(Weekday::Fri),
            "sat" | "saturday" => Ok(Weekday::Sat),
            "sun" | "sunday" => Ok(Weekday::Sun),
            _ => Err(format!("Invalid weekday: {s}")),
        }
    }
}

impl Weekday {
    /// Days since Monday, in 0..=6.
    pub fn monday_offset(self) -> u8 {
        match self {
            Weekday::Mon => 0,
            Weekday::Tue => 1,
            Weekday::Wed => 2,
            Weekday::Thu => 3,
            Weekday::Fri => 4,
            Weekday::Sat => 5,
            Weekday::Sun => 6,
        }
    }
}

impl From<civil::Weekday> for Weekday {
    fn from(w: civil::Weekday) -> Self {
        match w {
            civil::Weekday::Monday => Weekday::Mon,
            civil::Weekday::Tuesday => Weekday::Tue,
            civil::Weekday::Wednesday => Weekday::Wed,
            civil::Weekday::Thursday => Weekday::Thu,
            civil::Weekday::Friday => Weekday::Fri,
            civil::Weekday::Saturday => Weekday::Sat,
            civil::Weekday::Sunday => Weekday::Sun,
        }
    }
}

/// Recurrence specification for a recurring plan item template.
///
/// Pure data with no identity of its own; it belongs to exactly one template
/// and is persisted as a JSON column alongside it. Rules are validated when
/// the template is created or edited, so the expansion engine only ever sees
/// well-formed rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurrenceRule {
    /// Base repetition frequency
    pub frequency: Frequency,

    /// Repeat every N frequency units (e.g. every 2 weeks)
    pub interval: u32,

    /// For weekly rules: the weekdays to emit within each active week
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_weekday: Option<Vec<Weekday>>,

    /// For monthly rules: the day of month, clamped to shorter months
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u8>,

    /// Last date (inclusive) the rule generates; open-ended if absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<civil::Date>,
}

impl RecurrenceRule {
    /// Validates the rule against its anchor date.
    ///
    /// Malformed rules are rejected here, before any write, and must never
    /// reach occurrence expansion.
    pub fn validate(&self, anchor: civil::Date) -> Result<()> {
        if self.interval == 0 {
            return Err(TrackerError::invalid_input(
                "recurrence_rule.interval",
                "Interval must be a positive integer",
            ));
        }

        if let Some(until) = self.until {
            if until < anchor {
                return Err(TrackerError::invalid_input(
                    "recurrence_rule.until",
                    format!("End date {until} is before the anchor date {anchor}"),
                ));
            }
        }

        match self.frequency {
            Frequency::Weekly => {
                if let Some(days) = &self.by_weekday {
                    if days.is_empty() {
                        return Err(TrackerError::invalid_input(
                            "recurrence_rule.by_weekday",
                            "Weekday set must not be empty",
                        ));
                    }
                }
                if self.day_of_month.is_some() {
                    return Err(TrackerError::invalid_input(
                        "recurrence_rule.day_of_month",
                        "Day of month only applies to monthly rules",
                    ));
                }
            }
            Frequency::Monthly => {
                if let Some(dom) = self.day_of_month {
                    if !(1..=31).contains(&dom) {
                        return Err(TrackerError::invalid_input(
                            "recurrence_rule.day_of_month",
                            format!("Day of month {dom} is out of range 1-31"),
                        ));
                    }
                }
                if self.by_weekday.is_some() {
                    return Err(TrackerError::invalid_input(
                        "recurrence_rule.by_weekday",
                        "Weekday sets only apply to weekly rules",
                    ));
                }
            }
            Frequency::Daily => {
                if self.by_weekday.is_some() || self.day_of_month.is_some() {
                    return Err(TrackerError::invalid_input(
                        "recurrence_rule",
                        "Daily rules take no weekday or day-of-month constraints",
                    ));
                }
            }
        }

        Ok(())
    }

    /// Serializes the rule to its JSON column representation.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a rule from its JSON column representation.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
