//! Priority classification of existing calendar events.
//!
//! Classification is table driven: a [`KeywordTable`] lists keyword sets in
//! precedence order, each mapped to a [`PriorityTier`]. The first rule whose
//! keyword appears (case-insensitively) in the event title wins. All-day events
//! are CRITICAL regardless of the table.

use serde::{Deserialize, Serialize};

use crate::interval::CalendarEvent;

/// Priority of an existing event. Ordered `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityTier {
    Low,
    Medium,
    High,
    /// Never reassigned a new time by the engine.
    Critical,
}

impl PriorityTier {
    pub fn as_str(self) -> &'static str {
        match self {
            PriorityTier::Low => "LOW",
            PriorityTier::Medium => "MEDIUM",
            PriorityTier::High => "HIGH",
            PriorityTier::Critical => "CRITICAL",
        }
    }
}

/// One row of the keyword table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub tier: PriorityTier,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(tier: PriorityTier, keywords: &[&str]) -> Self {
        Self {
            tier,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Keyword sets evaluated in order, plus the tier used when nothing matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordTable {
    pub rules: Vec<KeywordRule>,
    pub default_tier: PriorityTier,
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self {
            rules: vec![
                KeywordRule::new(PriorityTier::Critical, &["workshop", "training", "all-day"]),
                KeywordRule::new(PriorityTier::Critical, &["ceo", "executive", "board meeting"]),
                KeywordRule::new(
                    PriorityTier::High,
                    &["client", "customer", "demo", "presentation"],
                ),
                KeywordRule::new(
                    PriorityTier::Medium,
                    &["1:1", "1-on-1", "one-on-one", "standup", "stand-up", "team meet"],
                ),
            ],
            default_tier: PriorityTier::Low,
        }
    }
}

/// Maps events to priority tiers using a [`KeywordTable`].
#[derive(Debug, Clone)]
pub struct EventPriorityClassifier {
    table: KeywordTable,
}

impl Default for EventPriorityClassifier {
    fn default() -> Self {
        Self::new(KeywordTable::default())
    }
}

impl EventPriorityClassifier {
    /// Build a classifier. Keywords are lowercased once here; blank keywords are
    /// dropped since they would match every title.
    pub fn new(table: KeywordTable) -> Self {
        let rules = table
            .rules
            .into_iter()
            .map(|rule| KeywordRule {
                tier: rule.tier,
                keywords: rule
                    .keywords
                    .into_iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect();
        Self {
            table: KeywordTable {
                rules,
                default_tier: table.default_tier,
            },
        }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    /// Classify an event. Total and side-effect free.
    pub fn classify(&self, event: &CalendarEvent) -> PriorityTier {
        if event.is_all_day {
            return PriorityTier::Critical;
        }
        self.classify_title(&event.title)
    }

    /// Classify by title alone, ignoring the all-day rule.
    pub fn classify_title(&self, title: &str) -> PriorityTier {
        let title = title.to_lowercase();
        self.table
            .rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| title.contains(k.as_str())))
            .map(|rule| rule.tier)
            .unwrap_or(self.table.default_tier)
    }
}
