//! Tests for keyword-table priority classification.

use chrono::{TimeZone, Utc};
use meeting_engine::interval::{CalendarEvent, TimeInterval};
use meeting_engine::priority::{EventPriorityClassifier, KeywordRule, KeywordTable, PriorityTier};

fn event(title: &str) -> CalendarEvent {
    let interval = TimeInterval::new(
        Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 3, 16, 11, 0, 0).unwrap(),
    )
    .unwrap();
    CalendarEvent::new("alice", title, interval)
}

#[test]
fn default_table_follows_documented_tiers() {
    let classifier = EventPriorityClassifier::default();

    let cases = [
        ("Rust Workshop", PriorityTier::Critical),
        ("Security training", PriorityTier::Critical),
        ("CEO review", PriorityTier::Critical),
        ("Executive offsite planning", PriorityTier::Critical),
        ("Client kickoff", PriorityTier::High),
        ("Product demo", PriorityTier::High),
        ("Quarterly presentation", PriorityTier::High),
        ("1:1 Alice / Bob", PriorityTier::Medium),
        ("1-on-1", PriorityTier::Medium),
        ("Daily Standup", PriorityTier::Medium),
        ("Team Meet", PriorityTier::Medium),
        ("Team meeting", PriorityTier::Medium),
        ("Lunch", PriorityTier::Low),
        ("", PriorityTier::Low),
    ];

    for (title, expected) in cases {
        assert_eq!(classifier.classify(&event(title)), expected, "title: {:?}", title);
    }
}

#[test]
fn matching_is_case_insensitive() {
    let classifier = EventPriorityClassifier::default();

    assert_eq!(classifier.classify(&event("CLIENT SYNC")), PriorityTier::High);
    assert_eq!(classifier.classify(&event("team STANDUP")), PriorityTier::Medium);
}

#[test]
fn all_day_is_critical_regardless_of_title() {
    let classifier = EventPriorityClassifier::default();

    assert_eq!(classifier.classify(&event("Lunch").all_day()), PriorityTier::Critical);
    assert_eq!(classifier.classify(&event("Team standup").all_day()), PriorityTier::Critical);
}

#[test]
fn precedence_first_rule_wins() {
    // Matches both the workshop set (CRITICAL) and the client set (HIGH).
    let classifier = EventPriorityClassifier::default();

    assert_eq!(
        classifier.classify(&event("Client onboarding workshop")),
        PriorityTier::Critical
    );
    // Matches both client (HIGH) and standup (MEDIUM).
    assert_eq!(classifier.classify(&event("Client standup")), PriorityTier::High);
}

#[test]
fn custom_table_replaces_defaults() {
    let table = KeywordTable {
        rules: vec![
            KeywordRule::new(PriorityTier::High, &["Investor"]),
            KeywordRule::new(PriorityTier::Medium, &["sync"]),
        ],
        default_tier: PriorityTier::Medium,
    };
    let classifier = EventPriorityClassifier::new(table);

    assert_eq!(classifier.classify(&event("investor update")), PriorityTier::High);
    assert_eq!(classifier.classify(&event("Weekly sync")), PriorityTier::Medium);
    // "client" is not in this table, so the table's default applies.
    assert_eq!(classifier.classify(&event("Client call")), PriorityTier::Medium);
}

#[test]
fn blank_keywords_are_ignored() {
    let table = KeywordTable {
        rules: vec![KeywordRule::new(PriorityTier::Critical, &["", "  "])],
        default_tier: PriorityTier::Low,
    };
    let classifier = EventPriorityClassifier::new(table);

    assert_eq!(classifier.classify(&event("Anything")), PriorityTier::Low);
}

#[test]
fn tiers_are_ordered() {
    assert!(PriorityTier::Critical > PriorityTier::High);
    assert!(PriorityTier::High > PriorityTier::Medium);
    assert!(PriorityTier::Medium > PriorityTier::Low);
}

#[test]
fn tier_serializes_in_upper_case() {
    let json = serde_json::to_string(&PriorityTier::Critical).unwrap();
    assert_eq!(json, "\"CRITICAL\"");
}
