use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::availability::{AvailabilityWindow, TimeSlot};
use crate::models::booking::BookingSelection;
use crate::services::clock::Clock;
use crate::services::slots::{derive_slots, has_availability};

/// The four stages of the booking flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStep {
    Date,
    Time,
    Details,
    Success,
}

/// State machine driving one widget instance through
/// date -> time -> details -> success.
///
/// Every transition validates its precondition and is a no-op when it
/// fails: the UI must never advance past a step whose input is invalid.
/// The controller is the only owner of the selection; nothing else
/// mutates it.
pub struct BookingFlowController {
    step: BookingStep,
    selection: BookingSelection,
    windows: Vec<AvailabilityWindow>,
    slot_minutes: u32,
    error: Option<String>,
    submitting: bool,
    clock: Arc<dyn Clock>,
}

impl BookingFlowController {
    pub fn new(windows: Vec<AvailabilityWindow>, slot_minutes: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            step: BookingStep::Date,
            selection: BookingSelection::default(),
            windows,
            slot_minutes,
            error: None,
            submitting: false,
            clock,
        }
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn selection(&self) -> &BookingSelection {
        &self.selection
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// True if the date has at least one open window.
    pub fn has_availability(&self, date: NaiveDate) -> bool {
        has_availability(&self.windows, date)
    }

    /// Slots for the currently selected date; empty while no date is picked.
    pub fn available_slots(&self) -> Vec<TimeSlot> {
        match self.selection.date {
            Some(date) => derive_slots(&self.windows, date, self.slot_minutes),
            None => Vec::new(),
        }
    }

    /// `Date -> Time`. Requires an upcoming date with availability;
    /// anything else leaves the machine where it is.
    pub fn select_date(&mut self, date: NaiveDate) -> bool {
        if self.step != BookingStep::Date {
            debug!("Ignoring select_date at step {:?}", self.step);
            return false;
        }
        if date < self.clock.today() {
            debug!("Ignoring select_date for past date {}", date);
            return false;
        }
        if !has_availability(&self.windows, date) {
            debug!("Ignoring select_date for {} with no availability", date);
            return false;
        }

        info!("Date selected: {}", date);
        self.selection.date = Some(date);
        self.selection.time = None;
        self.step = BookingStep::Time;
        true
    }

    /// `Time -> Details`. The time must be one of the slots derived for
    /// the selected date.
    pub fn select_time(&mut self, time: &str) -> bool {
        if self.step != BookingStep::Time {
            debug!("Ignoring select_time at step {:?}", self.step);
            return false;
        }
        let valid = self
            .available_slots()
            .iter()
            .any(|slot| slot.available && slot.time == time);
        if !valid {
            debug!("Ignoring select_time for {} not in the derived slots", time);
            return false;
        }

        info!("Time selected: {}", time);
        self.selection.time = Some(time.to_string());
        self.step = BookingStep::Details;
        true
    }

    /// `Time -> Date` (clears the date) or `Details -> Time` (clears the
    /// time only, the date is retained). No-op elsewhere.
    pub fn back(&mut self) -> bool {
        match self.step {
            BookingStep::Time => {
                self.selection.date = None;
                self.step = BookingStep::Date;
                true
            }
            BookingStep::Details => {
                self.selection.time = None;
                self.step = BookingStep::Time;
                true
            }
            _ => {
                debug!("Ignoring back at step {:?}", self.step);
                false
            }
        }
    }

    /// Claim the single submission allowed in flight for this widget.
    /// Returns false from any step other than `Details` or while a
    /// submission is already pending; further submit actions stay
    /// disabled until `resolve_submit` runs.
    pub fn begin_submit(&mut self) -> bool {
        if self.step != BookingStep::Details || self.submitting {
            debug!(
                "Ignoring begin_submit at step {:?} (submitting: {})",
                self.step, self.submitting
            );
            return false;
        }
        self.submitting = true;
        self.error = None;
        true
    }

    /// `Details -> Success` on a successful outcome; on failure the
    /// machine stays in `Details` with the banner message set and the
    /// selection retained so the visitor can retry without re-picking.
    pub fn resolve_submit(&mut self, result: Result<(), String>) {
        if !self.submitting {
            warn!("resolve_submit called with no submission in flight");
            return;
        }
        self.submitting = false;
        match result {
            Ok(()) => {
                info!("Booking submission succeeded");
                self.error = None;
                self.step = BookingStep::Success;
            }
            Err(message) => {
                warn!("Booking submission failed: {}", message);
                self.error = Some(message);
            }
        }
    }

    /// Release the in-flight flag without an outcome, for a submission
    /// that was claimed but never actually started.
    pub fn abort_submit(&mut self) {
        self.submitting = false;
    }

    /// `Success -> Date`: clears the selection and error state for a
    /// fresh booking cycle. No other step may reset.
    pub fn reset(&mut self) -> bool {
        if self.step != BookingStep::Success {
            debug!("Ignoring reset at step {:?}", self.step);
            return false;
        }
        info!("Widget reset for a new booking cycle");
        self.selection = BookingSelection::default();
        self.error = None;
        self.submitting = false;
        self.step = BookingStep::Date;
        true
    }

    /// Replace the window set with a freshly fetched one. A previously
    /// selected time that no longer appears in the derived slots is
    /// cleared, and the machine regresses from `Details` to `Time` so
    /// the selection invariant (time only while date) keeps holding.
    pub fn set_availability(&mut self, windows: Vec<AvailabilityWindow>) {
        self.windows = windows;

        let stale = match (&self.selection.date, &self.selection.time) {
            (Some(_), Some(time)) => !self
                .available_slots()
                .iter()
                .any(|slot| slot.available && slot.time == *time),
            _ => false,
        };

        if stale {
            warn!(
                "Selected time {:?} is no longer available after refresh; clearing it",
                self.selection.time
            );
            self.selection.time = None;
            if self.step == BookingStep::Details {
                self.step = BookingStep::Time;
            }
        }
    }
}
