//! Business-hours policy: which time ranges a meeting category may occupy.
//!
//! The policy is a pure leaf. It knows nothing about meeting context; callers
//! derive a [`MeetingCategory`] first and ask about that.
//!
//! Calendar days and wall-clock hours are evaluated at the policy's fixed
//! reference offset, while intervals stay absolute UTC instants.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::interval::TimeInterval;

/// What kind of window a meeting may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingCategory {
    /// Weekday business hours (09:00-18:00 by default).
    #[default]
    Regular,
    /// Extended weekday hours (09:00-20:00 by default).
    Workshop,
    /// Any time, any day. Reserved for critical-urgency meetings.
    Emergency,
}

/// A daily wall-clock range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl BusinessHours {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn regular() -> Self {
        Self::new(at_hour(9), at_hour(18))
    }

    pub fn workshop() -> Self {
        Self::new(at_hour(9), at_hour(20))
    }
}

fn at_hour(hour: i64) -> NaiveTime {
    NaiveTime::MIN + Duration::hours(hour)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHoursPolicy {
    regular: BusinessHours,
    workshop: BusinessHours,
    offset: FixedOffset,
}

impl Default for BusinessHoursPolicy {
    fn default() -> Self {
        Self::new(BusinessHours::regular(), BusinessHours::workshop(), None)
    }
}

impl BusinessHoursPolicy {
    /// Build a policy. A missing offset means UTC.
    pub fn new(regular: BusinessHours, workshop: BusinessHours, offset: Option<FixedOffset>) -> Self {
        Self {
            regular,
            workshop,
            offset: offset.unwrap_or_else(|| Utc.fix()),
        }
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Wall-clock hours for a category; `None` for emergency (unbounded).
    pub fn hours(&self, category: MeetingCategory) -> Option<BusinessHours> {
        match category {
            MeetingCategory::Regular => Some(self.regular),
            MeetingCategory::Workshop => Some(self.workshop),
            MeetingCategory::Emergency => None,
        }
    }

    /// The calendar day of `instant` at the reference offset.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// The UTC instant of a wall-clock time on a local date.
    pub fn instant(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let local = date.and_time(time);
        (local - Duration::seconds(i64::from(self.offset.local_minus_utc()))).and_utc()
    }

    pub fn is_business_day(date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// The first business day strictly after `date`.
    pub fn next_business_day(date: NaiveDate) -> NaiveDate {
        let mut day = date + Duration::days(1);
        while !Self::is_business_day(day) {
            day += Duration::days(1);
        }
        day
    }

    /// The last business day strictly before `date`.
    pub fn previous_business_day(date: NaiveDate) -> NaiveDate {
        let mut day = date - Duration::days(1);
        while !Self::is_business_day(day) {
            day -= Duration::days(1);
        }
        day
    }

    /// The allowed window for `category` on `date`.
    ///
    /// Regular and workshop windows exist on weekdays only. The emergency window
    /// is the whole local day.
    pub fn window(&self, date: NaiveDate, category: MeetingCategory) -> Option<TimeInterval> {
        match self.hours(category) {
            None => TimeInterval::new(
                self.instant(date, NaiveTime::MIN),
                self.instant(date + Duration::days(1), NaiveTime::MIN),
            )
            .ok(),
            Some(hours) => {
                if !Self::is_business_day(date) {
                    return None;
                }
                TimeInterval::new(self.instant(date, hours.start), self.instant(date, hours.end)).ok()
            }
        }
    }

    /// Whether `interval` may be used by a meeting of `category`.
    ///
    /// Regular and workshop intervals must fit entirely inside the window of the
    /// day they start on. Emergency is always allowed.
    pub fn is_allowed(&self, interval: &TimeInterval, category: MeetingCategory) -> bool {
        if category == MeetingCategory::Emergency {
            return true;
        }
        self.window(self.local_date(interval.start), category)
            .is_some_and(|window| window.contains(interval))
    }
}
