//! Time intervals and the calendar events the engine consumes.
//!
//! Intervals are half-open `[start, end)`: two intervals that merely touch
//! (one ends exactly when the other starts) do not overlap.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// An absolute time range. Invariant: `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    /// Build an interval, rejecting `start >= end`.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidInterval` for empty or inverted ranges.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        let interval = Self { start, end };
        interval.validate()?;
        Ok(interval)
    }

    /// Build an interval from a start and a length.
    pub fn starting_at(start: DateTime<Utc>, duration: Duration) -> Result<Self> {
        Self::new(start, start + duration)
    }

    /// Build an interval from an end and a length.
    pub fn ending_at(end: DateTime<Utc>, duration: Duration) -> Result<Self> {
        Self::new(end - duration, end)
    }

    /// Check the `start < end` invariant. Fields are public (and deserializable),
    /// so inputs crossing the engine boundary are re-checked here.
    pub fn validate(&self) -> Result<()> {
        if self.start >= self.end {
            return Err(EngineError::InvalidInterval {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Half-open overlap: `self.start < other.end && other.start < self.end`.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Minutes shared by both intervals, 0 when they do not overlap.
    pub fn overlap_minutes(&self, other: &TimeInterval) -> i64 {
        if !self.overlaps(other) {
            return 0;
        }
        let overlap_start = self.start.max(other.start);
        let overlap_end = self.end.min(other.end);
        (overlap_end - overlap_start).num_minutes()
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// An existing event on one attendee's calendar.
///
/// Owned by the calendar provider; the engine never mutates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub attendee_id: String,
    pub interval: TimeInterval,
    pub title: String,
    #[serde(default)]
    pub is_all_day: bool,
    /// Marked "free" (transparent) by the provider. Free events never block time.
    #[serde(default)]
    pub is_free: bool,
}

impl CalendarEvent {
    pub fn new(attendee_id: impl Into<String>, title: impl Into<String>, interval: TimeInterval) -> Self {
        Self {
            attendee_id: attendee_id.into(),
            interval,
            title: title.into(),
            is_all_day: false,
            is_free: false,
        }
    }

    pub fn all_day(mut self) -> Self {
        self.is_all_day = true;
        self
    }

    pub fn free(mut self) -> Self {
        self.is_free = true;
        self
    }

    /// Whether this event occupies time for conflict and slot purposes.
    pub fn is_busy(&self) -> bool {
        !self.is_free
    }

    /// Identity of the underlying meeting, shared by every attendee who holds it.
    pub fn key(&self) -> EventKey {
        EventKey {
            title: self.title.clone(),
            interval: self.interval,
        }
    }
}

/// Identifies one meeting across attendee calendars: same title, same interval.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    pub title: String,
    pub interval: TimeInterval,
}

/// One attendee's events for the date range under consideration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeCalendar {
    /// Opaque attendee identifier (usually an email address).
    pub attendee_id: String,
    /// Events in any order; the engine sorts internally.
    pub events: Vec<CalendarEvent>,
}

impl AttendeeCalendar {
    pub fn new(attendee_id: impl Into<String>, events: Vec<CalendarEvent>) -> Self {
        Self {
            attendee_id: attendee_id.into(),
            events,
        }
    }

    /// Busy intervals of this calendar, in input order.
    pub fn busy_intervals(&self) -> impl Iterator<Item = TimeInterval> + '_ {
        self.events.iter().filter(|e| e.is_busy()).map(|e| e.interval)
    }

    pub fn holds(&self, key: &EventKey) -> bool {
        self.events
            .iter()
            .any(|e| e.interval == key.interval && e.title == key.title)
    }
}
