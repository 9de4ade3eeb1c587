//! Tests for the per-conflict resolution table and new-meeting relocation.

use chrono::{Duration, NaiveDate, TimeZone, Utc, Weekday};
use meeting_engine::conflict::Conflict;
use meeting_engine::context::{DayConstraint, MeetingContext, Urgency};
use meeting_engine::interval::{CalendarEvent, TimeInterval};
use meeting_engine::policy::MeetingCategory;
use meeting_engine::priority::PriorityTier;
use meeting_engine::reschedule::{RejectReason, ReschedulingEngine, ResolutionAction};

fn interval(day: u32, start_hour: u32, start_min: u32, end_hour: u32, end_min: u32) -> TimeInterval {
    TimeInterval::new(
        Utc.with_ymd_and_hms(2026, 3, day, start_hour, start_min, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 3, day, end_hour, end_min, 0).unwrap(),
    )
    .unwrap()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

fn conflict(title: &str, at: TimeInterval, tier: PriorityTier) -> Conflict {
    Conflict {
        event: CalendarEvent::new("alice", title, at),
        tier,
        overlap_minutes: 60,
    }
}

fn context(urgency: Urgency) -> MeetingContext {
    MeetingContext {
        urgency,
        ..MeetingContext::default()
    }
}

#[test]
fn critical_event_rejects_new_meeting() {
    let engine = ReschedulingEngine::default();
    let c = conflict("Board meeting", interval(16, 10, 0, 11, 0), PriorityTier::Critical);

    let action = engine.resolve(&c, &context(Urgency::Critical), &[c.event.clone()], date(16), &[]);

    assert_eq!(
        action,
        ResolutionAction::RejectNewMeeting {
            reason: RejectReason::CriticalEvent
        }
    );
    assert!(action.is_rejection());
}

#[test]
fn high_event_outranks_non_critical_request() {
    let engine = ReschedulingEngine::default();
    let c = conflict("Client call", interval(16, 10, 0, 11, 0), PriorityTier::High);

    for urgency in [Urgency::Low, Urgency::Medium, Urgency::High] {
        let action = engine.resolve(&c, &context(urgency), &[c.event.clone()], date(16), &[]);
        assert_eq!(
            action,
            ResolutionAction::RejectNewMeeting {
                reason: RejectReason::Outranked {
                    tier: PriorityTier::High
                }
            },
            "urgency {:?}",
            urgency
        );
    }
}

#[test]
fn high_event_relocated_for_critical_request() {
    let engine = ReschedulingEngine::default();
    let candidate = interval(16, 10, 0, 11, 0);
    let c = conflict("Client call", candidate, PriorityTier::High);

    let action = engine.resolve(&c, &context(Urgency::Critical), &[c.event.clone()], date(16), &[candidate]);

    assert_eq!(
        action,
        ResolutionAction::RelocateExistingEvent {
            original: c.event.clone(),
            new_interval: interval(16, 9, 0, 10, 0),
        }
    );
}

#[test]
fn medium_event_moves_to_first_free_slot_avoiding_reserved_time() {
    let engine = ReschedulingEngine::default();
    let candidate = interval(16, 9, 0, 11, 0);
    let standup = conflict("Team standup", interval(16, 10, 0, 11, 0), PriorityTier::Medium);
    let calendar = vec![
        standup.event.clone(),
        CalendarEvent::new("alice", "Focus", interval(16, 11, 0, 12, 0)),
    ];

    let action = engine.resolve(&standup, &context(Urgency::Medium), &calendar, date(16), &[candidate]);

    match action {
        ResolutionAction::RelocateExistingEvent { new_interval, .. } => {
            assert_eq!(new_interval, interval(16, 12, 0, 13, 0));
        }
        other => panic!("expected relocation, got {:?}", other),
    }
}

#[test]
fn medium_event_retries_following_day() {
    let engine = ReschedulingEngine::default();
    let candidate = interval(16, 10, 0, 11, 0);
    let standup = conflict("Team standup", candidate, PriorityTier::Medium);
    let calendar = vec![
        standup.event.clone(),
        CalendarEvent::new("alice", "Lunch", interval(16, 9, 0, 10, 0)),
        CalendarEvent::new("alice", "Focus", interval(16, 11, 0, 18, 0)),
    ];

    let action = engine.resolve(&standup, &context(Urgency::Medium), &calendar, date(16), &[candidate]);

    match action {
        ResolutionAction::RelocateExistingEvent { new_interval, .. } => {
            assert_eq!(new_interval, interval(17, 9, 0, 10, 0));
        }
        other => panic!("expected relocation to the next day, got {:?}", other),
    }
}

#[test]
fn medium_event_without_slot_rejects_with_reason() {
    let engine = ReschedulingEngine::default();
    let candidate = interval(16, 10, 0, 11, 0);
    let standup = conflict("Team standup", candidate, PriorityTier::Medium);
    let calendar = vec![
        standup.event.clone(),
        CalendarEvent::new("alice", "Focus", interval(16, 9, 0, 10, 0)),
        CalendarEvent::new("alice", "Focus", interval(16, 11, 0, 18, 0)),
        CalendarEvent::new("alice", "Focus", interval(17, 9, 0, 18, 0)),
    ];

    let action = engine.resolve(&standup, &context(Urgency::Medium), &calendar, date(16), &[candidate]);

    assert_eq!(
        action,
        ResolutionAction::RejectNewMeeting {
            reason: RejectReason::NoSlotAvailable {
                from: date(16),
                days: 2
            }
        }
    );
}

#[test]
fn free_events_do_not_block_relocation() {
    let engine = ReschedulingEngine::default();
    let candidate = interval(16, 10, 0, 11, 0);
    let standup = conflict("Team standup", candidate, PriorityTier::Medium);
    let calendar = vec![
        standup.event.clone(),
        CalendarEvent::new("alice", "Hold", interval(16, 9, 0, 10, 0)).free(),
    ];

    let action = engine.resolve(&standup, &context(Urgency::Medium), &calendar, date(16), &[candidate]);

    match action {
        ResolutionAction::RelocateExistingEvent { new_interval, .. } => {
            assert_eq!(new_interval, interval(16, 9, 0, 10, 0));
        }
        other => panic!("expected relocation, got {:?}", other),
    }
}

#[test]
fn low_event_is_accepted() {
    let engine = ReschedulingEngine::default();
    let c = conflict("Lunch", interval(16, 10, 0, 11, 0), PriorityTier::Low);

    let action = engine.resolve(&c, &context(Urgency::Low), &[c.event.clone()], date(16), &[]);

    assert_eq!(action, ResolutionAction::Accept);
    assert!(!action.is_rejection());
}

#[test]
fn all_day_event_is_never_relocated() {
    let engine = ReschedulingEngine::default();
    let offsite = TimeInterval::new(
        Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 3, 17, 0, 0, 0).unwrap(),
    )
    .unwrap();
    let c = Conflict {
        event: CalendarEvent::new("alice", "Offsite", offsite).all_day(),
        tier: PriorityTier::Medium,
        overlap_minutes: 60,
    };

    let action = engine.resolve(&c, &context(Urgency::Critical), &[c.event.clone()], date(16), &[]);

    assert_eq!(
        action,
        ResolutionAction::RejectNewMeeting {
            reason: RejectReason::CriticalEvent
        }
    );
}

#[test]
fn relocate_new_meeting_respects_not_before() {
    let engine = ReschedulingEngine::default();
    let busy = vec![interval(16, 9, 0, 12, 0)];
    let not_before = Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap();

    let action = engine.relocate_new_meeting(&busy, Duration::hours(1), not_before, MeetingCategory::Regular, DayConstraint::Flexible, 14);

    assert_eq!(
        action,
        ResolutionAction::RelocateNewMeeting {
            new_interval: interval(16, 12, 0, 13, 0)
        }
    );
}

#[test]
fn relocate_new_meeting_skips_weekend() {
    let engine = ReschedulingEngine::default();
    // Friday 17:30: only 30 minutes remain, Saturday and Sunday have no window.
    let not_before = Utc.with_ymd_and_hms(2026, 3, 13, 17, 30, 0).unwrap();

    let action = engine.relocate_new_meeting(&[], Duration::hours(1), not_before, MeetingCategory::Regular, DayConstraint::Flexible, 14);

    assert_eq!(
        action,
        ResolutionAction::RelocateNewMeeting {
            new_interval: interval(16, 9, 0, 10, 0)
        }
    );
}

#[test]
fn relocate_new_meeting_gives_up_at_horizon() {
    let engine = ReschedulingEngine::default();
    let busy = vec![interval(16, 9, 0, 18, 0)];
    let not_before = Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap();

    let action = engine.relocate_new_meeting(&busy, Duration::hours(1), not_before, MeetingCategory::Regular, DayConstraint::Flexible, 1);

    assert_eq!(
        action,
        ResolutionAction::RejectNewMeeting {
            reason: RejectReason::NoSlotAvailable {
                from: date(16),
                days: 1
            }
        }
    );
}

#[test]
fn relocate_new_meeting_keeps_constrained_weekday() {
    let engine = ReschedulingEngine::default();
    let not_before = Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap();

    let action = engine.relocate_new_meeting(
        &[],
        Duration::hours(1),
        not_before,
        MeetingCategory::Regular,
        DayConstraint::On(Weekday::Thu),
        14,
    );

    assert_eq!(
        action,
        ResolutionAction::RelocateNewMeeting {
            new_interval: interval(19, 9, 0, 10, 0)
        }
    );
}

#[test]
fn relocate_new_meeting_constrained_day_outside_horizon() {
    let engine = ReschedulingEngine::default();
    let not_before = Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap();

    // Monday through Wednesday only; Thursday is out of reach.
    let action = engine.relocate_new_meeting(
        &[],
        Duration::hours(1),
        not_before,
        MeetingCategory::Regular,
        DayConstraint::On(Weekday::Thu),
        3,
    );

    assert!(action.is_rejection());
}

#[test]
fn relocate_prep_meeting_ends_before_main() {
    let engine = ReschedulingEngine::default();
    let main_start = Utc.with_ymd_and_hms(2026, 3, 16, 14, 0, 0).unwrap();
    let busy = vec![interval(16, 12, 0, 14, 0)];

    let action = engine.relocate_prep_meeting(&busy, Duration::hours(1), main_start, MeetingCategory::Regular, 14);

    assert_eq!(
        action,
        ResolutionAction::RelocateNewMeeting {
            new_interval: interval(16, 11, 0, 12, 0)
        }
    );
}

#[test]
fn relocate_prep_meeting_walks_back_over_weekend() {
    let engine = ReschedulingEngine::default();
    let main_start = Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap();
    let busy = vec![interval(13, 9, 0, 18, 0)];

    let action = engine.relocate_prep_meeting(&busy, Duration::hours(1), main_start, MeetingCategory::Regular, 14);

    assert_eq!(
        action,
        ResolutionAction::RelocateNewMeeting {
            new_interval: interval(12, 17, 0, 18, 0)
        }
    );
}

#[test]
fn relocate_prep_meeting_gives_up_at_horizon() {
    let engine = ReschedulingEngine::default();
    let main_start = Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap();

    let action = engine.relocate_prep_meeting(&[], Duration::hours(1), main_start, MeetingCategory::Regular, 3);

    assert_eq!(
        action,
        ResolutionAction::RejectNewMeeting {
            reason: RejectReason::NoSlotAvailable {
                from: date(16),
                days: 3
            }
        }
    );
}

#[test]
fn actions_serialize_with_tags() {
    let action = ResolutionAction::RejectNewMeeting {
        reason: RejectReason::CriticalEvent,
    };

    let value = serde_json::to_value(&action).unwrap();

    assert_eq!(value["action"], "reject_new_meeting");
    assert_eq!(value["reason"]["kind"], "critical_event");
}
