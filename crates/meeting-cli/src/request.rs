//! JSON request parsing for the `meeting` CLI.
//!
//! Datetimes are RFC 3339, or naive `YYYY-MM-DDTHH:MM:SS` / `YYYY-MM-DD`
//! interpreted in the request's IANA timezone (or the configured reference
//! offset when the request names none).

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use meeting_engine::{AttendeeCalendar, CalendarEvent, EngineConfig, MeetingContext, TimeInterval};

#[derive(Debug, Deserialize)]
pub struct RawInterval {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct RawEvent {
    pub title: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub free: bool,
}

#[derive(Debug, Deserialize)]
pub struct RawCalendar {
    pub attendee_id: String,
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

/// Context as sent on the wire; the related meeting uses request datetimes.
#[derive(Debug, Deserialize)]
pub struct RawContext {
    #[serde(default)]
    pub related_meeting: Option<RawInterval>,
    #[serde(flatten)]
    pub descriptor: MeetingContext,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub requested: RawInterval,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub context: Option<RawContext>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub calendars: Vec<RawCalendar>,
}

/// A request with every datetime resolved to UTC.
#[derive(Debug)]
pub struct ParsedRequest {
    pub requested: TimeInterval,
    pub context: Option<MeetingContext>,
    pub calendars: Vec<AttendeeCalendar>,
    /// Title for the new meeting in per-attendee schedules.
    pub title: String,
    /// Reference offset implied by the request timezone, in minutes east of UTC.
    pub utc_offset_minutes: Option<i32>,
}

/// Either an IANA zone named by the request or the configured fixed offset.
enum Zone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl Zone {
    fn resolve(&self, naive: NaiveDateTime, raw: &str) -> Result<DateTime<Utc>> {
        let resolved = match self {
            Zone::Named(tz) => tz.from_local_datetime(&naive).earliest().map(|dt| dt.with_timezone(&Utc)),
            Zone::Fixed(offset) => offset.from_local_datetime(&naive).single().map(|dt| dt.with_timezone(&Utc)),
        };
        resolved.ok_or_else(|| anyhow!("local time {} does not exist in the request timezone", raw))
    }
}

fn parse_instant(raw: &str, zone: &Zone) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return zone.resolve(naive, raw);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return zone.resolve(date.and_time(NaiveTime::MIN), raw);
    }
    bail!("invalid datetime '{}': expected RFC 3339 or YYYY-MM-DDTHH:MM:SS", raw)
}

fn parse_interval(raw: &RawInterval, zone: &Zone) -> Result<TimeInterval> {
    let start = parse_instant(&raw.start, zone)?;
    let end = parse_instant(&raw.end, zone)?;
    TimeInterval::new(start, end).map_err(anyhow::Error::from)
}

fn parse_event(attendee_id: &str, raw: &RawEvent, zone: &Zone) -> Result<CalendarEvent> {
    let interval = parse_interval(
        &RawInterval {
            start: raw.start.clone(),
            end: raw.end.clone(),
        },
        zone,
    )
    .with_context(|| format!("event '{}' of {}", raw.title, attendee_id))?;
    let mut event = CalendarEvent::new(attendee_id, raw.title.clone(), interval);
    event.is_all_day = raw.all_day;
    event.is_free = raw.free;
    Ok(event)
}

fn zone_for(timezone: Option<&str>, config: &EngineConfig) -> Result<Zone> {
    match timezone {
        Some(name) => name
            .parse::<Tz>()
            .map(Zone::Named)
            .map_err(|e| anyhow!("unknown timezone '{}': {}", name, e)),
        None => Ok(Zone::Fixed(config.utc_offset()?)),
    }
}

impl ScheduleRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse scheduling request")
    }

    /// Resolve datetimes and fall back to keyword context when none was sent.
    pub fn parse(self, config: &EngineConfig) -> Result<ParsedRequest> {
        let zone = zone_for(self.timezone.as_deref(), config)?;
        let requested = parse_interval(&self.requested, &zone).context("requested window")?;

        let context = match self.context {
            Some(raw) => {
                let mut context = raw.descriptor;
                context.related_meeting = raw
                    .related_meeting
                    .as_ref()
                    .map(|m| parse_interval(m, &zone))
                    .transpose()
                    .context("related meeting")?;
                Some(context)
            }
            None if self.subject.is_some() || self.body.is_some() => Some(MeetingContext::from_keywords(
                self.subject.as_deref().unwrap_or_default(),
                self.body.as_deref().unwrap_or_default(),
            )),
            None => None,
        };

        let calendars = parse_calendars(&self.calendars, &zone)?;

        let utc_offset_minutes = match zone {
            Zone::Named(tz) => {
                let offset = tz.offset_from_utc_datetime(&requested.start.naive_utc()).fix();
                Some(offset.local_minus_utc() / 60)
            }
            Zone::Fixed(_) => None,
        };

        let title = self
            .subject
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "New meeting".to_string());

        Ok(ParsedRequest {
            requested,
            context,
            calendars,
            title,
            utc_offset_minutes,
        })
    }
}

fn parse_calendars(raw: &[RawCalendar], zone: &Zone) -> Result<Vec<AttendeeCalendar>> {
    raw.iter()
        .map(|calendar| {
            let events = calendar
                .events
                .iter()
                .map(|e| parse_event(&calendar.attendee_id, e, zone))
                .collect::<Result<Vec<_>>>()?;
            Ok(AttendeeCalendar::new(calendar.attendee_id.clone(), events))
        })
        .collect()
}

/// Events for the `classify` subcommand, all attributed to one pseudo attendee.
pub fn parse_event_list(json: &str, timezone: Option<&str>, config: &EngineConfig) -> Result<Vec<CalendarEvent>> {
    let raw: Vec<RawEvent> = serde_json::from_str(json).context("Failed to parse event list")?;
    let zone = zone_for(timezone, config)?;
    raw.iter().map(|e| parse_event("", e, &zone)).collect()
}
