//! Conflict resolution: decide what happens to one conflicting event.
//!
//! | Tier     | Action                                                          |
//! |----------|-----------------------------------------------------------------|
//! | CRITICAL | reject the new meeting; the event is never touched              |
//! | HIGH     | relocate the event if the new meeting is critical, else reject  |
//! | MEDIUM   | relocate the event; reject if no slot within the retry days     |
//! | LOW      | accept; the event is ignored                                    |
//!
//! Context overrides (prep, workshop, emergency) are applied by the
//! orchestrator before this table runs.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conflict::Conflict;
use crate::context::{DayConstraint, MeetingContext, Urgency};
use crate::freebusy::{SearchDirection, SlotFinder};
use crate::interval::{CalendarEvent, TimeInterval};
use crate::policy::MeetingCategory;
use crate::priority::PriorityTier;

/// Why the new meeting cannot keep its candidate window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    /// The conflicting event is CRITICAL (or all-day) and cannot move.
    CriticalEvent,
    /// The conflicting event outranks the new meeting's urgency.
    Outranked { tier: PriorityTier },
    /// No free slot was found on any searched date.
    NoSlotAvailable { from: NaiveDate, days: u32 },
}

/// The outcome for one conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ResolutionAction {
    /// The new meeting keeps its window; the event is left alone.
    Accept,
    /// No automatic action; the new meeting must find another window.
    RejectNewMeeting { reason: RejectReason },
    /// The new meeting moves to `new_interval`.
    RelocateNewMeeting { new_interval: TimeInterval },
    /// The existing event moves to `new_interval`.
    RelocateExistingEvent {
        original: CalendarEvent,
        new_interval: TimeInterval,
    },
}

impl ResolutionAction {
    pub fn is_rejection(&self) -> bool {
        matches!(self, ResolutionAction::RejectNewMeeting { .. })
    }
}

/// Applies the tier decision table and finds new placements.
#[derive(Debug, Clone, Copy)]
pub struct ReschedulingEngine {
    finder: SlotFinder,
    retry_days: u32,
}

impl Default for ReschedulingEngine {
    fn default() -> Self {
        Self::new(SlotFinder::default(), 1)
    }
}

impl ReschedulingEngine {
    /// `retry_days` is how many following calendar days a relocated event may
    /// move to when its own day is full.
    pub fn new(finder: SlotFinder, retry_days: u32) -> Self {
        Self { finder, retry_days }
    }

    pub fn finder(&self) -> &SlotFinder {
        &self.finder
    }

    /// Decide the action for one conflict.
    ///
    /// `attendee_calendar` holds the events of every attendee holding the
    /// conflicting event, so a relocation is free for all of them.
    /// `reserved` is time already claimed in this pass: the new meeting's
    /// candidate window and earlier relocations.
    pub fn resolve(
        &self,
        conflict: &Conflict,
        context: &MeetingContext,
        attendee_calendar: &[CalendarEvent],
        candidate_date: NaiveDate,
        reserved: &[TimeInterval],
    ) -> ResolutionAction {
        let action = match conflict.tier {
            PriorityTier::Critical => ResolutionAction::RejectNewMeeting {
                reason: RejectReason::CriticalEvent,
            },
            PriorityTier::High if context.urgency == Urgency::Critical => {
                self.relocate_existing(conflict, attendee_calendar, candidate_date, reserved)
            }
            PriorityTier::High => ResolutionAction::RejectNewMeeting {
                reason: RejectReason::Outranked {
                    tier: PriorityTier::High,
                },
            },
            PriorityTier::Medium => {
                self.relocate_existing(conflict, attendee_calendar, candidate_date, reserved)
            }
            PriorityTier::Low => ResolutionAction::Accept,
        };
        debug!(
            title = %conflict.event.title,
            tier = conflict.tier.as_str(),
            ?action,
            "conflict resolved"
        );
        action
    }

    fn relocate_existing(
        &self,
        conflict: &Conflict,
        attendee_calendar: &[CalendarEvent],
        candidate_date: NaiveDate,
        reserved: &[TimeInterval],
    ) -> ResolutionAction {
        let original = &conflict.event;
        if original.is_all_day {
            return ResolutionAction::RejectNewMeeting {
                reason: RejectReason::CriticalEvent,
            };
        }

        // Every copy of the conflicting event is about to move, so none of them
        // counts as busy.
        let busy: Vec<TimeInterval> = attendee_calendar
            .iter()
            .filter(|e| e.is_busy())
            .filter(|e| !(e.interval == original.interval && e.title == original.title))
            .map(|e| e.interval)
            .chain(reserved.iter().copied())
            .collect();
        let duration = original.interval.duration();

        for offset in 0..=self.retry_days {
            let date = candidate_date + Duration::days(i64::from(offset));
            if let Some(new_interval) = self.finder.find_slot(
                &busy,
                duration,
                date,
                MeetingCategory::Regular,
                SearchDirection::ForwardFromBusinessStart,
            ) {
                return ResolutionAction::RelocateExistingEvent {
                    original: original.clone(),
                    new_interval,
                };
            }
        }

        ResolutionAction::RejectNewMeeting {
            reason: RejectReason::NoSlotAvailable {
                from: candidate_date,
                days: self.retry_days + 1,
            },
        }
    }

    /// Find a new window for the new meeting itself.
    ///
    /// Searches forward from `not_before`, one local day at a time, for
    /// `horizon_days` days, inside the `category` window of each day. With
    /// `DayConstraint::On`, only dates on that weekday are searched.
    pub fn relocate_new_meeting(
        &self,
        busy: &[TimeInterval],
        duration: Duration,
        not_before: DateTime<Utc>,
        category: MeetingCategory,
        day: DayConstraint,
        horizon_days: u32,
    ) -> ResolutionAction {
        let policy = self.finder.policy();
        let first_date = policy.local_date(not_before);

        for offset in 0..horizon_days {
            let date = first_date + Duration::days(i64::from(offset));
            if let DayConstraint::On(weekday) = day {
                if date.weekday() != weekday {
                    continue;
                }
            }
            let Some(window) = policy.window(date, category) else {
                continue;
            };
            let window = TimeInterval {
                start: window.start.max(not_before),
                end: window.end,
            };
            if let Some(new_interval) = SlotFinder::find_slot_within(
                busy,
                duration,
                &window,
                SearchDirection::ForwardFromBusinessStart,
            ) {
                return ResolutionAction::RelocateNewMeeting { new_interval };
            }
        }

        ResolutionAction::RejectNewMeeting {
            reason: RejectReason::NoSlotAvailable {
                from: first_date,
                days: horizon_days,
            },
        }
    }

    /// Find the latest window for a prep meeting ending at or before `not_after`.
    ///
    /// Searches backward from the local day of `not_after`, one day at a time,
    /// for `horizon_days` days.
    pub fn relocate_prep_meeting(
        &self,
        busy: &[TimeInterval],
        duration: Duration,
        not_after: DateTime<Utc>,
        category: MeetingCategory,
        horizon_days: u32,
    ) -> ResolutionAction {
        let policy = self.finder.policy();
        let last_date = policy.local_date(not_after);

        for offset in 0..horizon_days {
            let date = last_date - Duration::days(i64::from(offset));
            let Some(window) = policy.window(date, category) else {
                continue;
            };
            let window = TimeInterval {
                start: window.start,
                end: window.end.min(not_after),
            };
            if let Some(new_interval) = SlotFinder::find_slot_within(
                busy,
                duration,
                &window,
                SearchDirection::BackwardFromBusinessEnd,
            ) {
                return ResolutionAction::RelocateNewMeeting { new_interval };
            }
        }

        ResolutionAction::RejectNewMeeting {
            reason: RejectReason::NoSlotAvailable {
                from: last_date,
                days: horizon_days,
            },
        }
    }
}
