//! The scheduling entry point.
//!
//! [`SchedulingOrchestrator::schedule`] turns a requested window, an optional
//! context descriptor and the attendees' calendars into a [`SchedulingResult`]:
//!
//! 1. derive the effective candidate (prep placement, business-hours shift);
//! 2. detect conflicts against every attendee calendar;
//! 3. resolve each conflict in detection order;
//! 4. if any resolution rejects the candidate, search a new window for the new
//!    meeting and start over, at most `max_restarts` times;
//! 5. on convergence, report the candidate and the accepted relocations.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::conflict::{Conflict, ConflictDetector};
use crate::context::{DayConstraint, MeetingContext, Urgency};
use crate::error::{EngineError, Result};
use crate::freebusy::{SearchDirection, SlotFinder};
use crate::interval::{AttendeeCalendar, CalendarEvent, EventKey, TimeInterval};
use crate::policy::{BusinessHoursPolicy, MeetingCategory};
use crate::priority::EventPriorityClassifier;
use crate::reschedule::{RejectReason, ReschedulingEngine, ResolutionAction};

/// An existing event and the interval it moves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    pub event: CalendarEvent,
    pub new_interval: TimeInterval,
}

/// A slot search that came up empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotShortfall {
    /// Title of the displaced event, or `None` for the new meeting itself.
    pub event_title: Option<String>,
    pub attendee_ids: Vec<String>,
    pub from: NaiveDate,
    pub days: u32,
}

/// How a prep meeting was placed relative to its main meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepPlacement {
    /// Directly before the main meeting.
    BeforeMainMeeting,
    /// Earlier on the main meeting's day.
    EarlierSameDay,
    /// Latest slot on the previous business day.
    PreviousBusinessDay,
    /// Latest slot on an earlier business day within the search horizon.
    EarlierBusinessDay,
}

/// Rationale recorded alongside a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingMetadata {
    pub urgency: Urgency,
    pub meeting_type: String,
    pub relationship: String,
    pub day_constraint: DayConstraint,
    pub justification: String,
    /// No context was supplied; defaults were used.
    pub context_defaulted: bool,
    pub category: MeetingCategory,
    pub can_use_off_hours: bool,
    pub requested: TimeInterval,
    /// The requested window was outside business hours and was moved.
    pub moved_into_business_hours: bool,
    pub prep_placement: Option<PrepPlacement>,
    pub restarts: usize,
    /// Every candidate evaluated, in order; the last one is the final interval.
    pub candidate_history: Vec<TimeInterval>,
    pub shortfalls: Vec<SlotShortfall>,
}

impl SchedulingMetadata {
    fn new(
        context: &MeetingContext,
        context_defaulted: bool,
        category: MeetingCategory,
        requested: TimeInterval,
    ) -> Self {
        Self {
            urgency: context.urgency,
            meeting_type: context.meeting_type(),
            relationship: context.relationship.clone(),
            day_constraint: context.day_constraint,
            justification: context.justification.clone(),
            context_defaulted,
            category,
            can_use_off_hours: context.is_workshop(),
            requested,
            moved_into_business_hours: false,
            prep_placement: None,
            restarts: 0,
            candidate_history: Vec::new(),
            shortfalls: Vec::new(),
        }
    }
}

/// The engine's output for one request. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingResult {
    pub final_interval: TimeInterval,
    /// Conflicts of every evaluated candidate, in evaluation order.
    pub conflicts: Vec<Conflict>,
    /// Relocations accepted for the final interval, in detection order.
    pub relocations: Vec<Relocation>,
    pub metadata: SchedulingMetadata,
}

#[derive(Debug, Default)]
struct PassOutcome {
    conflicts: Vec<Conflict>,
    relocations: Vec<Relocation>,
    /// Conflicts whose resolution rejected the candidate.
    blocking: Vec<Conflict>,
    shortfalls: Vec<SlotShortfall>,
}

/// Combines detection, resolution and slot search into a scheduling decision.
///
/// Holds no per-request state; one orchestrator may serve concurrent requests.
#[derive(Debug, Clone)]
pub struct SchedulingOrchestrator {
    detector: ConflictDetector,
    engine: ReschedulingEngine,
    max_restarts: usize,
    horizon_days: u32,
}

impl Default for SchedulingOrchestrator {
    fn default() -> Self {
        let defaults = crate::config::ResolutionConfig::default();
        Self::new(
            ConflictDetector::default(),
            ReschedulingEngine::new(SlotFinder::default(), defaults.relocation_retry_days),
            defaults.max_restarts,
            defaults.search_horizon_days,
        )
    }
}

impl SchedulingOrchestrator {
    pub fn new(
        detector: ConflictDetector,
        engine: ReschedulingEngine,
        max_restarts: usize,
        horizon_days: u32,
    ) -> Self {
        Self {
            detector,
            engine,
            max_restarts,
            horizon_days,
        }
    }

    /// Build an orchestrator from a validated configuration.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let classifier = EventPriorityClassifier::new(config.classifier.clone());
        let finder = SlotFinder::new(config.policy()?);
        Ok(Self::new(
            ConflictDetector::new(classifier),
            ReschedulingEngine::new(finder, config.resolution.relocation_retry_days),
            config.resolution.max_restarts,
            config.resolution.search_horizon_days,
        ))
    }

    pub fn detector(&self) -> &ConflictDetector {
        &self.detector
    }

    pub fn policy(&self) -> &BusinessHoursPolicy {
        self.engine.finder().policy()
    }

    /// Schedule the new meeting.
    ///
    /// # Errors
    /// - `EngineError::InvalidInterval` if the requested window, the related
    ///   meeting or any calendar event has `start >= end`.
    /// - `EngineError::UnresolvableConflict` if the candidate is still rejected
    ///   after `max_restarts` moves, or no window exists within the horizon.
    pub fn schedule(
        &self,
        requested: TimeInterval,
        context: Option<&MeetingContext>,
        calendars: &[AttendeeCalendar],
    ) -> Result<SchedulingResult> {
        requested.validate()?;
        if let Some(main) = context.and_then(|c| c.related_meeting.as_ref()) {
            main.validate()?;
        }
        for event in calendars.iter().flat_map(|c| c.events.iter()) {
            event.interval.validate()?;
        }

        let context_defaulted = context.is_none();
        let context = context.cloned().unwrap_or_default();
        let category = context.category();
        let duration = requested.duration();
        let all_busy: Vec<TimeInterval> = calendars.iter().flat_map(|c| c.busy_intervals()).collect();

        let mut metadata = SchedulingMetadata::new(&context, context_defaulted, category, requested);
        let mut candidate = self.effective_candidate(requested, &context, category, &all_busy, &mut metadata)?;

        let mut conflicts = Vec::new();
        let mut rejected: Vec<TimeInterval> = Vec::new();
        let mut restarts = 0;

        loop {
            metadata.candidate_history.push(candidate);
            let pass = self.resolve_pass(&candidate, &context, calendars);
            conflicts.extend(pass.conflicts);
            metadata.shortfalls.extend(pass.shortfalls);

            if pass.blocking.is_empty() {
                info!(
                    candidate = %candidate,
                    restarts,
                    relocations = pass.relocations.len(),
                    "meeting scheduled"
                );
                metadata.restarts = restarts;
                return Ok(SchedulingResult {
                    final_interval: candidate,
                    conflicts,
                    relocations: pass.relocations,
                    metadata,
                });
            }

            if restarts >= self.max_restarts {
                warn!(candidate = %candidate, restarts, "restart bound exceeded");
                return Err(EngineError::UnresolvableConflict {
                    last_candidate: candidate,
                    unresolved: pass.blocking,
                    restarts,
                });
            }

            restarts += 1;
            rejected.push(candidate);
            let busy: Vec<TimeInterval> = all_busy.iter().chain(rejected.iter()).copied().collect();
            match self.relocate_candidate(&busy, duration, requested, &context, category) {
                ResolutionAction::RelocateNewMeeting { new_interval } => {
                    info!(from = %candidate, to = %new_interval, restarts, "new meeting relocated");
                    candidate = new_interval;
                }
                _ => {
                    warn!(candidate = %candidate, "no window for the new meeting within the horizon");
                    return Err(EngineError::UnresolvableConflict {
                        last_candidate: candidate,
                        unresolved: pass.blocking,
                        restarts,
                    });
                }
            }
        }
    }

    /// Search a new window for the new meeting.
    ///
    /// A prep meeting searches backward and never ends after its main meeting
    /// starts. Any other meeting searches forward from the requested start,
    /// on the constrained weekday if one is set.
    fn relocate_candidate(
        &self,
        busy: &[TimeInterval],
        duration: Duration,
        requested: TimeInterval,
        context: &MeetingContext,
        category: MeetingCategory,
    ) -> ResolutionAction {
        match prep_target(context) {
            Some(main) => {
                self.engine
                    .relocate_prep_meeting(busy, duration, main.start, category, self.horizon_days)
            }
            None => self.engine.relocate_new_meeting(
                busy,
                duration,
                requested.start,
                category,
                context.day_constraint,
                self.horizon_days,
            ),
        }
    }

    /// Apply context overrides to the requested window.
    fn effective_candidate(
        &self,
        requested: TimeInterval,
        context: &MeetingContext,
        category: MeetingCategory,
        all_busy: &[TimeInterval],
        metadata: &mut SchedulingMetadata,
    ) -> Result<TimeInterval> {
        if let Some(main) = prep_target(context) {
            let duration = requested.duration();
            return match self.place_prep(&main, duration, category, all_busy) {
                Some((slot, placement)) => {
                    info!(slot = %slot, ?placement, "prep meeting placed");
                    metadata.prep_placement = Some(placement);
                    Ok(slot)
                }
                None => {
                    warn!(main = %main, "no window for the prep meeting within the horizon");
                    Err(EngineError::UnresolvableConflict {
                        last_candidate: TimeInterval {
                            start: main.start - duration,
                            end: main.start,
                        },
                        unresolved: Vec::new(),
                        restarts: 0,
                    })
                }
            };
        }

        if self.policy().is_allowed(&requested, category) {
            return Ok(requested);
        }

        match self.relocate_candidate(all_busy, requested.duration(), requested, context, category) {
            ResolutionAction::RelocateNewMeeting { new_interval } => {
                info!(from = %requested, to = %new_interval, "moved into business hours");
                metadata.moved_into_business_hours = true;
                Ok(new_interval)
            }
            _ => {
                warn!(requested = %requested, "no business-hours window within the horizon");
                Err(EngineError::UnresolvableConflict {
                    last_candidate: requested,
                    unresolved: Vec::new(),
                    restarts: 0,
                })
            }
        }
    }

    /// Place a prep meeting of `duration` before `main`.
    ///
    /// Every placement ends at or before `main.start` and is allowed for
    /// `category`; `None` when the horizon holds no such slot.
    fn place_prep(
        &self,
        main: &TimeInterval,
        duration: Duration,
        category: MeetingCategory,
        all_busy: &[TimeInterval],
    ) -> Option<(TimeInterval, PrepPlacement)> {
        let policy = self.policy();
        let main_date = policy.local_date(main.start);
        let before_main = TimeInterval {
            start: main.start - duration,
            end: main.start,
        };

        if policy.is_allowed(&before_main, category) && all_busy.iter().all(|b| !b.overlaps(&before_main)) {
            return Some((before_main, PrepPlacement::BeforeMainMeeting));
        }

        if let Some(window) = policy.window(main_date, category) {
            let capped = TimeInterval {
                start: window.start,
                end: window.end.min(main.start),
            };
            if let Some(slot) =
                SlotFinder::find_slot_within(all_busy, duration, &capped, SearchDirection::BackwardFromBusinessEnd)
            {
                return Some((slot, PrepPlacement::EarlierSameDay));
            }
        }

        let previous = BusinessHoursPolicy::previous_business_day(main_date);
        if let Some(slot) = self.engine.finder().find_slot(
            all_busy,
            duration,
            previous,
            category,
            SearchDirection::BackwardFromBusinessEnd,
        ) {
            return Some((slot, PrepPlacement::PreviousBusinessDay));
        }

        match self
            .engine
            .relocate_prep_meeting(all_busy, duration, main.start, category, self.horizon_days)
        {
            ResolutionAction::RelocateNewMeeting { new_interval } => {
                Some((new_interval, PrepPlacement::EarlierBusinessDay))
            }
            _ => None,
        }
    }

    /// Detect and resolve conflicts for one candidate.
    fn resolve_pass(
        &self,
        candidate: &TimeInterval,
        context: &MeetingContext,
        calendars: &[AttendeeCalendar],
    ) -> PassOutcome {
        let conflicts = self.detector.detect(candidate, calendars);
        let candidate_date = self.policy().local_date(candidate.start);
        let mut reserved = vec![*candidate];
        let mut decided: HashMap<EventKey, ResolutionAction> = HashMap::new();
        let mut outcome = PassOutcome::default();

        for conflict in &conflicts {
            let key = conflict.event.key();
            let action = match decided.get(&key) {
                Some(action) => action.clone(),
                None => {
                    let holders: Vec<&AttendeeCalendar> = calendars.iter().filter(|c| c.holds(&key)).collect();
                    let shared: Vec<CalendarEvent> =
                        holders.iter().flat_map(|c| c.events.iter().cloned()).collect();
                    let action = self.engine.resolve(conflict, context, &shared, candidate_date, &reserved);
                    match &action {
                        ResolutionAction::RelocateExistingEvent { new_interval, .. } => {
                            reserved.push(*new_interval);
                        }
                        ResolutionAction::RejectNewMeeting {
                            reason: RejectReason::NoSlotAvailable { from, days },
                        } => {
                            warn!(title = %key.title, "no slot to relocate event");
                            outcome.shortfalls.push(SlotShortfall {
                                event_title: Some(key.title.clone()),
                                attendee_ids: holders.iter().map(|c| c.attendee_id.clone()).collect(),
                                from: *from,
                                days: *days,
                            });
                        }
                        _ => {}
                    }
                    decided.insert(key, action.clone());
                    action
                }
            };

            match action {
                ResolutionAction::Accept => {}
                ResolutionAction::RelocateExistingEvent { new_interval, .. } => {
                    outcome.relocations.push(Relocation {
                        event: conflict.event.clone(),
                        new_interval,
                    });
                }
                ResolutionAction::RejectNewMeeting { .. } | ResolutionAction::RelocateNewMeeting { .. } => {
                    outcome.blocking.push(conflict.clone());
                }
            }
        }

        outcome.conflicts = conflicts;
        outcome
    }
}

/// The main meeting of a prep request, if it names one.
fn prep_target(context: &MeetingContext) -> Option<TimeInterval> {
    if context.is_prep() {
        context.related_meeting
    } else {
        None
    }
}
