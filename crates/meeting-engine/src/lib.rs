//! # meeting-engine
//!
//! Deterministic conflict resolution and slot allocation for meeting requests.
//!
//! Given a requested window, a context descriptor for the new meeting and each
//! attendee's existing events, the engine decides where the meeting goes,
//! which existing events move and where they move to. It is computation-only:
//! calendars arrive as immutable snapshots and nothing is written back.
//!
//! ## Modules
//!
//! - [`interval`] — Time intervals, calendar events, attendee calendars
//! - [`priority`] — Keyword-table classification of events into priority tiers
//! - [`policy`] — Business-hours windows per meeting category
//! - [`conflict`] — Detect events overlapping a candidate window
//! - [`freebusy`] — Merge busy time, compute free slots, find a slot
//! - [`context`] — The meeting context descriptor and its defaults
//! - [`reschedule`] — Per-conflict resolution table
//! - [`orchestrator`] — The scheduling entry point
//! - [`schedule`] — Per-attendee schedules with a result applied
//! - [`config`] — TOML configuration
//! - [`error`] — Error types

pub mod config;
pub mod conflict;
pub mod context;
pub mod error;
pub mod freebusy;
pub mod interval;
pub mod orchestrator;
pub mod policy;
pub mod priority;
pub mod reschedule;
pub mod schedule;

pub use config::EngineConfig;
pub use conflict::{Conflict, ConflictDetector};
pub use context::{DayConstraint, MeetingContext, Urgency};
pub use error::EngineError;
pub use freebusy::{find_free_slots, SearchDirection, SlotFinder};
pub use interval::{AttendeeCalendar, CalendarEvent, TimeInterval};
pub use orchestrator::{Relocation, SchedulingMetadata, SchedulingOrchestrator, SchedulingResult};
pub use policy::{BusinessHoursPolicy, MeetingCategory};
pub use priority::{EventPriorityClassifier, KeywordTable, PriorityTier};
pub use reschedule::{RejectReason, ReschedulingEngine, ResolutionAction};
pub use schedule::{apply_result, AttendeeSchedule};
