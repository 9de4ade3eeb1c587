//! Free/busy computation and slot search.
//!
//! Busy intervals are sorted by start, overlapping or adjacent periods are
//! merged, and the gaps between merged periods inside a window are the free
//! slots. [`SlotFinder`] walks those gaps forward or backward to place a
//! meeting of a given length inside a category's business-hours window.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::TimeInterval;
use crate::policy::{BusinessHoursPolicy, MeetingCategory};

/// A free time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl FreeSlot {
    fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            duration_minutes: (end - start).num_minutes(),
        }
    }

    fn length(&self) -> Duration {
        self.end - self.start
    }
}

/// Merge overlapping or adjacent busy periods, clipped to the window.
///
/// Returns a sorted, non-overlapping list of intervals.
pub fn merge_busy_periods(busy: &[TimeInterval], window: &TimeInterval) -> Vec<TimeInterval> {
    // Clip to the window, discarding periods entirely outside.
    let mut intervals: Vec<TimeInterval> = busy
        .iter()
        .filter(|b| b.overlaps(window))
        .map(|b| TimeInterval {
            start: b.start.max(window.start),
            end: b.end.min(window.end),
        })
        .collect();

    if intervals.is_empty() {
        return Vec::new();
    }

    intervals.sort_by_key(|b| (b.start, b.end));

    let mut merged: Vec<TimeInterval> = Vec::new();
    for interval in intervals {
        if let Some(last) = merged.last_mut() {
            if interval.start <= last.end {
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }

    merged
}

/// Free slots within `window`, sorted by start.
///
/// Busy periods may overlap; they are merged before gaps are computed.
pub fn find_free_slots(busy: &[TimeInterval], window: &TimeInterval) -> Vec<FreeSlot> {
    let merged = merge_busy_periods(busy, window);

    let mut free_slots = Vec::new();
    let mut cursor = window.start;

    for period in &merged {
        if cursor < period.start {
            free_slots.push(FreeSlot::new(cursor, period.start));
        }
        cursor = cursor.max(period.end);
    }

    // Trailing free slot after the last busy period.
    if cursor < window.end {
        free_slots.push(FreeSlot::new(cursor, window.end));
    }

    free_slots
}

/// Scan direction for [`SlotFinder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchDirection {
    /// Earliest fitting slot, starting from the window start.
    ForwardFromBusinessStart,
    /// Latest fitting slot, ending as close to the window end as possible.
    BackwardFromBusinessEnd,
}

/// Places a meeting of a given length in the gaps of a busy list.
///
/// Deterministic: identical inputs always give the identical slot. The finder
/// never widens its own window; callers decide whether to try another date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotFinder {
    policy: BusinessHoursPolicy,
}

impl SlotFinder {
    pub fn new(policy: BusinessHoursPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BusinessHoursPolicy {
        &self.policy
    }

    /// Find a slot of exactly `duration` on `date` within the `category` window.
    ///
    /// Returns `None` when the day has no window for the category (weekends for
    /// regular and workshop) or no gap is long enough.
    pub fn find_slot(
        &self,
        busy: &[TimeInterval],
        duration: Duration,
        date: NaiveDate,
        category: MeetingCategory,
        direction: SearchDirection,
    ) -> Option<TimeInterval> {
        let window = self.policy.window(date, category)?;
        Self::find_slot_within(busy, duration, &window, direction)
    }

    /// Find a slot of exactly `duration` inside an explicit window.
    pub fn find_slot_within(
        busy: &[TimeInterval],
        duration: Duration,
        window: &TimeInterval,
        direction: SearchDirection,
    ) -> Option<TimeInterval> {
        if duration <= Duration::zero() || window.start >= window.end {
            return None;
        }

        let free = find_free_slots(busy, window);
        match direction {
            SearchDirection::ForwardFromBusinessStart => free
                .iter()
                .find(|slot| slot.length() >= duration)
                .map(|slot| TimeInterval {
                    start: slot.start,
                    end: slot.start + duration,
                }),
            SearchDirection::BackwardFromBusinessEnd => free
                .iter()
                .rev()
                .find(|slot| slot.length() >= duration)
                .map(|slot| TimeInterval {
                    start: slot.end - duration,
                    end: slot.end,
                }),
        }
    }
}
