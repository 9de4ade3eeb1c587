//! The structured context descriptor of a meeting request.
//!
//! Produced by an external extractor from the request email. Every field is
//! optional on the wire: missing, null or unrecognized values fall back to
//! defaults (urgency `medium`, meeting type `generic`) instead of failing.

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize};

use crate::interval::TimeInterval;
use crate::policy::MeetingCategory;

/// Urgency of the new meeting. Ordered `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Urgency {
    /// Lenient parse; anything unrecognized is `Medium`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "critical" => Urgency::Critical,
            "high" => Urgency::High,
            "low" => Urgency::Low,
            _ => Urgency::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        }
    }
}

impl From<String> for Urgency {
    fn from(s: String) -> Self {
        Urgency::parse(&s)
    }
}

impl From<Urgency> for String {
    fn from(u: Urgency) -> Self {
        u.as_str().to_string()
    }
}

/// A day-of-week constraint, or `flexible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DayConstraint {
    #[default]
    Flexible,
    On(Weekday),
}

impl From<String> for DayConstraint {
    fn from(s: String) -> Self {
        s.trim()
            .parse::<Weekday>()
            .map(DayConstraint::On)
            .unwrap_or(DayConstraint::Flexible)
    }
}

impl From<DayConstraint> for String {
    fn from(d: DayConstraint) -> Self {
        d.to_string()
    }
}

impl fmt::Display for DayConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DayConstraint::Flexible => "flexible",
            DayConstraint::On(Weekday::Mon) => "monday",
            DayConstraint::On(Weekday::Tue) => "tuesday",
            DayConstraint::On(Weekday::Wed) => "wednesday",
            DayConstraint::On(Weekday::Thu) => "thursday",
            DayConstraint::On(Weekday::Fri) => "friday",
            DayConstraint::On(Weekday::Sat) => "saturday",
            DayConstraint::On(Weekday::Sun) => "sunday",
        };
        f.write_str(name)
    }
}

pub const GENERIC_MEETING_TYPE: &str = "generic";

/// Context descriptor for the new meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingContext {
    #[serde(deserialize_with = "null_as_default")]
    pub urgency: Urgency,
    /// Free-form tag, e.g. "prep", "workshop", "client", "planning".
    #[serde(deserialize_with = "null_as_default")]
    pub meeting_type: String,
    /// Free-form linkage tag, e.g. "prep_meeting", "workshop", "client_facing".
    #[serde(deserialize_with = "null_as_default")]
    pub relationship: String,
    #[serde(deserialize_with = "null_as_default")]
    pub day_constraint: DayConstraint,
    #[serde(deserialize_with = "null_as_default")]
    pub justification: String,
    /// The main meeting a prep meeting prepares for.
    pub related_meeting: Option<TimeInterval>,
}

impl Default for MeetingContext {
    fn default() -> Self {
        Self {
            urgency: Urgency::Medium,
            meeting_type: GENERIC_MEETING_TYPE.to_string(),
            relationship: String::new(),
            day_constraint: DayConstraint::Flexible,
            justification: String::new(),
            related_meeting: None,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn has_tag(value: &str, tag: &str) -> bool {
    value.trim().eq_ignore_ascii_case(tag)
}

impl MeetingContext {
    /// Normalized meeting type; blank means `generic`.
    pub fn meeting_type(&self) -> String {
        let normalized = self.meeting_type.trim().to_lowercase();
        if normalized.is_empty() {
            GENERIC_MEETING_TYPE.to_string()
        } else {
            normalized
        }
    }

    pub fn is_prep(&self) -> bool {
        has_tag(&self.meeting_type, "prep") || has_tag(&self.relationship, "prep_meeting")
    }

    /// Workshops (by type or by relationship) may use extended hours.
    pub fn is_workshop(&self) -> bool {
        has_tag(&self.meeting_type, "workshop") || has_tag(&self.relationship, "workshop")
    }

    /// The business-hours category for the new meeting's own placement.
    ///
    /// Critical urgency wins over workshop; everything else is regular.
    pub fn category(&self) -> MeetingCategory {
        if self.urgency == Urgency::Critical {
            MeetingCategory::Emergency
        } else if self.is_workshop() {
            MeetingCategory::Workshop
        } else {
            MeetingCategory::Regular
        }
    }

    /// Best-effort context from the request text, for when no extractor output
    /// is available. Pure keyword matching over subject and body.
    pub fn from_keywords(subject: &str, body: &str) -> Self {
        let text = format!("{} {}", subject, body).to_lowercase();
        let mut matched: Vec<&str> = Vec::new();

        let urgency = match URGENCY_KEYWORDS
            .iter()
            .find_map(|(words, urgency)| first_match(&text, words).map(|w| (w, *urgency)))
        {
            Some((word, urgency)) => {
                matched.push(word);
                urgency
            }
            None => Urgency::Medium,
        };

        let (meeting_type, relationship) = match TYPE_KEYWORDS.iter().find_map(|(words, kind, rel)| {
            first_match(&text, words).map(|w| (w, *kind, *rel))
        }) {
            Some((word, kind, rel)) => {
                matched.push(word);
                (kind, rel)
            }
            None => (GENERIC_MEETING_TYPE, "internal"),
        };

        let day_constraint = WEEKDAY_NAMES
            .iter()
            .find(|(name, _)| text.contains(*name))
            .map(|(_, day)| DayConstraint::On(*day))
            .unwrap_or_default();

        let justification = if matched.is_empty() {
            String::new()
        } else {
            format!("keywords: {}", matched.join(", "))
        };

        Self {
            urgency,
            meeting_type: meeting_type.to_string(),
            relationship: relationship.to_string(),
            day_constraint,
            justification,
            related_meeting: None,
        }
    }
}

const URGENCY_KEYWORDS: &[(&[&str], Urgency)] = &[
    (&["emergency", "critical"], Urgency::Critical),
    (&["urgent", "asap", "immediately"], Urgency::High),
    (&["when possible", "no rush", "flexible"], Urgency::Low),
];

/// (keywords, meeting type, relationship), first match wins.
const TYPE_KEYWORDS: &[(&[&str], &str, &str)] = &[
    (&["prep", "prior to"], "prep", "prep_meeting"),
    (&["workshop", "training"], "workshop", "workshop"),
    (&["client", "customer"], "client", "client_facing"),
    (&["status", "update", "standup"], "status", "internal"),
    (&["review", "feedback"], "review", "internal"),
];

const WEEKDAY_NAMES: &[(&str, Weekday)] = &[
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

fn first_match(text: &str, words: &[&'static str]) -> Option<&'static str> {
    words.iter().copied().find(|w| text.contains(*w))
}
