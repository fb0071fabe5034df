use serde::{Deserialize, Serialize};

/// A provider's recurring weekly availability window as returned by
/// `GET /api/booking/availability`. Day-of-week uses a Monday-origin
/// index (0 = Monday .. 6 = Sunday); times are same-day wall-clock "HH:MM".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWindow {
    pub id: i64,
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    pub is_available: bool,
}

// One bookable time-of-day instance derived from a window. Ephemeral:
// recomputed whenever the selected date or the window set changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub time: String,
    pub available: bool,
}
