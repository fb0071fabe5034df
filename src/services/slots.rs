use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::models::availability::{AvailabilityWindow, TimeSlot};

/// Default appointment length in minutes.
pub const DEFAULT_SLOT_MINUTES: u32 = 60;

/// Monday-origin day-of-week index for a date (0 = Monday .. 6 = Sunday).
///
/// This is the single remapping used by both the existence check and the
/// slot generator, so the two can never disagree about which windows a
/// date matches.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

// Parse "HH:MM" into a minute-of-day value in [0, 1440).
pub fn parse_minutes(time: &str) -> Option<u32> {
    let (hours, minutes) = time.split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

// Format a minute-of-day value back into "HH:MM".
pub fn format_minutes(minute_of_day: u32) -> String {
    format!("{:02}:{:02}", minute_of_day / 60, minute_of_day % 60)
}

/// True if at least one open window exists for the date's day-of-week.
///
/// Used to enable/disable date-picker entries; cheaper than deriving the
/// full slot list and guaranteed consistent with `derive_slots` because
/// both go through `weekday_index`.
pub fn has_availability(windows: &[AvailabilityWindow], date: NaiveDate) -> bool {
    let day = weekday_index(date);
    windows
        .iter()
        .any(|window| window.is_available && window.day_of_week == day)
}

/// Derive the ordered bookable slots for a date from the weekly windows.
///
/// For each open window matching the date's day-of-week, walks forward
/// from the start time in `slot_minutes` increments, emitting one
/// available slot per step for as long as a full increment still fits
/// before the end time. Slots are ascending
/// within a window and windows are processed in input order; overlapping
/// same-day windows can therefore produce duplicate or out-of-order slots
/// across windows. That matches the availability data contract, which
/// assumes non-overlapping windows without enforcing it.
///
/// Windows with unparseable times, or with `end <= start` (which would
/// cross midnight), yield no slots. A `slot_minutes` of 0 yields no
/// slots at all, since the walk could never advance.
pub fn derive_slots(
    windows: &[AvailabilityWindow],
    date: NaiveDate,
    slot_minutes: u32,
) -> Vec<TimeSlot> {
    if slot_minutes == 0 {
        warn!("Slot duration of 0 minutes yields no slots");
        return Vec::new();
    }

    let day = weekday_index(date);
    let mut slots = Vec::new();

    for window in windows {
        if !window.is_available || window.day_of_week != day {
            continue;
        }

        let (start, end) = match (
            parse_minutes(&window.start_time),
            parse_minutes(&window.end_time),
        ) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                warn!(
                    "Skipping window {} with unparseable times {}-{}",
                    window.id, window.start_time, window.end_time
                );
                continue;
            }
        };

        if end <= start {
            warn!(
                "Skipping window {} with end {} not after start {} (midnight-crossing windows are not supported)",
                window.id, window.end_time, window.start_time
            );
            continue;
        }

        let mut current = start;
        while current + slot_minutes <= end {
            slots.push(TimeSlot {
                time: format_minutes(current),
                available: true,
            });
            current += slot_minutes;
        }
    }

    debug!(
        "Derived {} slots for {} from {} windows",
        slots.len(),
        date,
        windows.len()
    );

    slots
}
