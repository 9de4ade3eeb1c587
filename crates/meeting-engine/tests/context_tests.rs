//! Tests for the meeting context descriptor: defaults, lenient parsing,
//! category derivation and the keyword fallback.

use chrono::Weekday;
use meeting_engine::context::{DayConstraint, MeetingContext, Urgency};
use meeting_engine::policy::MeetingCategory;

#[test]
fn default_context_is_medium_generic() {
    let context = MeetingContext::default();

    assert_eq!(context.urgency, Urgency::Medium);
    assert_eq!(context.meeting_type(), "generic");
    assert_eq!(context.day_constraint, DayConstraint::Flexible);
    assert_eq!(context.category(), MeetingCategory::Regular);
    assert!(!context.is_prep());
    assert!(!context.is_workshop());
}

#[test]
fn empty_object_deserializes_to_defaults() {
    let context: MeetingContext = serde_json::from_str("{}").unwrap();
    assert_eq!(context, MeetingContext::default());
}

#[test]
fn nulls_and_unknown_values_fall_back() {
    let json = r#"{
        "urgency": "whenever",
        "meeting_type": null,
        "relationship": null,
        "day_constraint": "someday",
        "justification": null
    }"#;

    let context: MeetingContext = serde_json::from_str(json).unwrap();

    assert_eq!(context.urgency, Urgency::Medium);
    assert_eq!(context.meeting_type(), "generic");
    assert_eq!(context.relationship, "");
    assert_eq!(context.day_constraint, DayConstraint::Flexible);
}

#[test]
fn full_descriptor_deserializes() {
    let json = r#"{
        "urgency": "Critical",
        "meeting_type": "Workshop",
        "relationship": "workshop",
        "day_constraint": "thursday",
        "justification": "quarterly training"
    }"#;

    let context: MeetingContext = serde_json::from_str(json).unwrap();

    assert_eq!(context.urgency, Urgency::Critical);
    assert_eq!(context.meeting_type(), "workshop");
    assert_eq!(context.day_constraint, DayConstraint::On(Weekday::Thu));
    assert!(context.is_workshop());
}

#[test]
fn context_serializes_with_lowercase_tags() {
    let context = MeetingContext {
        urgency: Urgency::High,
        day_constraint: DayConstraint::On(Weekday::Mon),
        ..MeetingContext::default()
    };

    let value = serde_json::to_value(&context).unwrap();

    assert_eq!(value["urgency"], "high");
    assert_eq!(value["day_constraint"], "monday");
}

#[test]
fn category_derivation() {
    let critical = MeetingContext {
        urgency: Urgency::Critical,
        meeting_type: "workshop".to_string(),
        ..MeetingContext::default()
    };
    assert_eq!(critical.category(), MeetingCategory::Emergency);

    let workshop_by_type = MeetingContext {
        meeting_type: "workshop".to_string(),
        ..MeetingContext::default()
    };
    assert_eq!(workshop_by_type.category(), MeetingCategory::Workshop);

    let workshop_by_relationship = MeetingContext {
        relationship: "workshop".to_string(),
        ..MeetingContext::default()
    };
    assert_eq!(workshop_by_relationship.category(), MeetingCategory::Workshop);

    let high = MeetingContext {
        urgency: Urgency::High,
        ..MeetingContext::default()
    };
    assert_eq!(high.category(), MeetingCategory::Regular);
}

#[test]
fn prep_detected_by_type_or_relationship() {
    let by_type = MeetingContext {
        meeting_type: "prep".to_string(),
        ..MeetingContext::default()
    };
    let by_relationship = MeetingContext {
        relationship: "prep_meeting".to_string(),
        ..MeetingContext::default()
    };

    assert!(by_type.is_prep());
    assert!(by_relationship.is_prep());
}

#[test]
fn keyword_fallback_prep_request() {
    let context = MeetingContext::from_keywords(
        "Pre-Client Meeting Prep",
        "Need 1 hour prep before the important client meeting on Wednesday.",
    );

    assert_eq!(context.meeting_type(), "prep");
    assert_eq!(context.relationship, "prep_meeting");
    assert_eq!(context.day_constraint, DayConstraint::On(Weekday::Wed));
    assert_eq!(context.urgency, Urgency::Medium);
    assert!(context.justification.contains("prep"));
}

#[test]
fn keyword_fallback_urgency_levels() {
    assert_eq!(
        MeetingContext::from_keywords("Emergency sync", "").urgency,
        Urgency::Critical
    );
    assert_eq!(
        MeetingContext::from_keywords("", "Please meet ASAP").urgency,
        Urgency::High
    );
    assert_eq!(
        MeetingContext::from_keywords("Catch up", "no rush, whenever").urgency,
        Urgency::Low
    );
}

#[test]
fn keyword_fallback_workshop_and_default() {
    let workshop = MeetingContext::from_keywords("Team training", "Three hour session on Tuesday");
    assert!(workshop.is_workshop());
    assert_eq!(workshop.day_constraint, DayConstraint::On(Weekday::Tue));

    let plain = MeetingContext::from_keywords("Catch up", "Let's talk");
    assert_eq!(plain.meeting_type(), "generic");
    assert_eq!(plain.relationship, "internal");
    assert_eq!(plain.day_constraint, DayConstraint::Flexible);
    assert!(plain.justification.is_empty());
}
