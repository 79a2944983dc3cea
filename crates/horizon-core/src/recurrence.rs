//! On-demand expansion of recurrence rules into concrete occurrence dates.
//!
//! The engine is pure calendar arithmetic: given a validated rule, the
//! template's anchor date and a query window, it produces the ordered set of
//! occurrence dates inside the window. Nothing here ticks or schedules;
//! occurrences are computed when a window is asked for.
//!
//! Stepping always starts from the anchor, not the window start, so interval
//! phase is preserved: "every 3rd day starting Jan 1" stays locked to that
//! phase regardless of the queried window.

use jiff::{civil, ToSpan};

use crate::models::{Frequency, RecurrenceRule, Weekday};

/// Expands a recurrence rule into the occurrence dates that fall inside
/// `[range_start, range_end]`, both bounds inclusive.
///
/// The result is ascending, free of duplicates, and deterministic for the
/// same inputs. Dates before the anchor or after the rule's `until` bound
/// are never emitted. The rule must have passed
/// [`RecurrenceRule::validate`]; expansion itself performs no validation.
///
/// ```rust
/// use horizon_core::models::{Frequency, RecurrenceRule};
/// use horizon_core::recurrence::occurrences_in_range;
/// use jiff::civil::date;
///
/// let rule = RecurrenceRule {
///     frequency: Frequency::Daily,
///     interval: 3,
///     by_weekday: None,
///     day_of_month: None,
///     until: None,
/// };
/// let dates = occurrences_in_range(&rule, date(2025, 1, 1), date(2025, 1, 5), date(2025, 1, 11));
/// assert_eq!(dates, vec![date(2025, 1, 7), date(2025, 1, 10)]);
/// ```
pub fn occurrences_in_range(
    rule: &RecurrenceRule,
    anchor: civil::Date,
    range_start: civil::Date,
    range_end: civil::Date,
) -> Vec<civil::Date> {
    let end = match rule.until {
        Some(until) if until < range_end => until,
        _ => range_end,
    };

    if anchor > end || range_start > range_end {
        return Vec::new();
    }

    match rule.frequency {
        Frequency::Daily => expand_by_days(i64::from(rule.interval), anchor, range_start, end),
        Frequency::Weekly => match &rule.by_weekday {
            Some(days) => expand_weekly_set(rule.interval, days, anchor, range_start, end),
            // No weekday set: the anchor's weekday repeats every N weeks.
            None => expand_by_days(7 * i64::from(rule.interval), anchor, range_start, end),
        },
        Frequency::Monthly => expand_monthly(rule, anchor, range_start, end),
    }
}

/// Walks forward from the anchor in fixed day steps.
fn expand_by_days(
    step_days: i64,
    anchor: civil::Date,
    range_start: civil::Date,
    end: civil::Date,
) -> Vec<civil::Date> {
    let mut out = Vec::new();
    let mut cursor = anchor;
    while cursor <= end {
        if cursor >= range_start {
            out.push(cursor);
        }
        match cursor.checked_add(step_days.days()) {
            Ok(next) => cursor = next,
            Err(_) => break,
        }
    }
    out
}

/// Emits every matching weekday inside each active week. Weeks start on
/// Monday and the week cycle advances in `interval`-week steps from the
/// anchor's week.
fn expand_weekly_set(
    interval: u32,
    days: &[Weekday],
    anchor: civil::Date,
    range_start: civil::Date,
    end: civil::Date,
) -> Vec<civil::Date> {
    let mut offsets: Vec<i64> = days.iter().map(|d| i64::from(d.monday_offset())).collect();
    offsets.sort_unstable();
    offsets.dedup();

    let mut out = Vec::new();
    let mut week = week_start(anchor);
    while week <= end {
        for &offset in &offsets {
            let Ok(day) = week.checked_add(offset.days()) else {
                continue;
            };
            // The anchor's own week may start before the anchor.
            if day < anchor || day > end {
                continue;
            }
            if day >= range_start {
                out.push(day);
            }
        }
        match week.checked_add((7 * i64::from(interval)).days()) {
            Ok(next) => week = next,
            Err(_) => break,
        }
    }
    out
}

/// Steps month by month from the anchor's month, clamping the target day of
/// month to the length of each month (never rolling into the next month).
fn expand_monthly(
    rule: &RecurrenceRule,
    anchor: civil::Date,
    range_start: civil::Date,
    end: civil::Date,
) -> Vec<civil::Date> {
    let day_of_month = rule.day_of_month.map_or(anchor.day(), |dom| dom as i8);

    let mut out = Vec::new();
    let mut k: i64 = 0;
    loop {
        let months = k * i64::from(rule.interval);
        let Ok(month_cursor) = anchor.first_of_month().checked_add(months.months()) else {
            break;
        };
        if month_cursor > end {
            break;
        }
        let clamped = day_of_month.min(month_cursor.days_in_month());
        let Ok(date) = civil::Date::new(month_cursor.year(), month_cursor.month(), clamped) else {
            break;
        };
        if date >= anchor && date >= range_start && date <= end {
            out.push(date);
        }
        k += 1;
    }
    out
}

/// The Monday of the week containing `date`.
fn week_start(date: civil::Date) -> civil::Date {
    let offset = i64::from(Weekday::from(date.weekday()).monday_offset());
    date.checked_add((-offset).days()).unwrap_or(date)
}
