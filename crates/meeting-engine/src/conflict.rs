//! Detect existing events that overlap a candidate meeting window.
//!
//! Every attendee calendar is scanned for events overlapping the candidate.
//! Adjacent events (where one ends exactly when the candidate starts, or vice
//! versa) are NOT conflicts. Events marked free never conflict.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::interval::{AttendeeCalendar, CalendarEvent, TimeInterval};
use crate::priority::{EventPriorityClassifier, PriorityTier};

/// An existing event that overlaps the candidate window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub event: CalendarEvent,
    pub tier: PriorityTier,
    pub overlap_minutes: i64,
}

/// Finds and classifies overlaps between a candidate and attendee calendars.
#[derive(Debug, Clone, Default)]
pub struct ConflictDetector {
    classifier: EventPriorityClassifier,
}

impl ConflictDetector {
    pub fn new(classifier: EventPriorityClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &EventPriorityClassifier {
        &self.classifier
    }

    /// Find every event overlapping `candidate`.
    ///
    /// An event overlaps when `event.start < candidate.end && event.end > candidate.start`.
    ///
    /// Output order is attendee order as given, then chronological by event start
    /// within an attendee (ties broken by end). Input calendars are not modified.
    pub fn detect(&self, candidate: &TimeInterval, calendars: &[AttendeeCalendar]) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        for calendar in calendars {
            let mut overlapping: Vec<&CalendarEvent> = calendar
                .events
                .iter()
                .filter(|e| e.is_busy() && e.interval.overlaps(candidate))
                .collect();
            overlapping.sort_by_key(|e| (e.interval.start, e.interval.end));

            for event in overlapping {
                let tier = self.classifier.classify(event);
                let overlap_minutes = candidate.overlap_minutes(&event.interval);
                debug!(
                    attendee = %calendar.attendee_id,
                    title = %event.title,
                    tier = tier.as_str(),
                    overlap_minutes,
                    "conflict detected"
                );
                conflicts.push(Conflict {
                    event: event.clone(),
                    tier,
                    overlap_minutes,
                });
            }
        }

        conflicts
    }

    /// True when no attendee has busy time overlapping `candidate`.
    pub fn is_free(&self, candidate: &TimeInterval, calendars: &[AttendeeCalendar]) -> bool {
        calendars
            .iter()
            .flat_map(|c| c.busy_intervals())
            .all(|busy| !busy.overlaps(candidate))
    }
}
