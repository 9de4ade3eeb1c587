//! Per-attendee schedules after a scheduling decision.
//!
//! Applies a [`SchedulingResult`] to the calendars it was computed from:
//! relocated events take their new interval, exact duplicates collapse to one
//! entry, and the new meeting is added for every attendee.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::interval::{AttendeeCalendar, TimeInterval};
use crate::orchestrator::SchedulingResult;

/// One entry in an attendee's resulting schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub title: String,
    pub interval: TimeInterval,
    pub is_all_day: bool,
    /// Moved by this decision; `original` holds the interval it had before.
    pub original: Option<TimeInterval>,
    /// The meeting that was just scheduled.
    pub is_new_meeting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeSchedule {
    pub attendee_id: String,
    /// Sorted by start.
    pub events: Vec<ScheduledEvent>,
}

/// Build every attendee's schedule with `result` applied.
///
/// `title` names the new meeting in the output.
pub fn apply_result(
    result: &SchedulingResult,
    calendars: &[AttendeeCalendar],
    title: &str,
) -> Vec<AttendeeSchedule> {
    calendars
        .iter()
        .map(|calendar| {
            let mut seen = HashSet::new();
            let mut events: Vec<ScheduledEvent> = calendar
                .events
                .iter()
                .filter(|event| seen.insert(event.key()))
                .map(|event| {
                    let relocation = result.relocations.iter().find(|r| {
                        r.event.attendee_id == calendar.attendee_id && r.event.key() == event.key()
                    });
                    match relocation {
                        Some(r) => ScheduledEvent {
                            title: event.title.clone(),
                            interval: r.new_interval,
                            is_all_day: event.is_all_day,
                            original: Some(event.interval),
                            is_new_meeting: false,
                        },
                        None => ScheduledEvent {
                            title: event.title.clone(),
                            interval: event.interval,
                            is_all_day: event.is_all_day,
                            original: None,
                            is_new_meeting: false,
                        },
                    }
                })
                .collect();

            events.push(ScheduledEvent {
                title: title.to_string(),
                interval: result.final_interval,
                is_all_day: false,
                original: None,
                is_new_meeting: true,
            });
            events.sort_by_key(|e| (e.interval.start, e.interval.end));

            AttendeeSchedule {
                attendee_id: calendar.attendee_id.clone(),
                events,
            }
        })
        .collect()
}
