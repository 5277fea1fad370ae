//! Sleep session grouping.
//!
//! Partitions a flat event list into sessions, one per `sleep` or `nap`
//! event, plus a bucket of events that belong to no session. Secondary events
//! found strictly inside a session window are attached to it:
//! - **Night wakings** are tracked separately
//! - **Overlay events** (feedings, medication, activities) ride on top
//! - **Wake events** are consumed; the first one after an open root closes it

mod grouper;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::events::{Event, EventType};

pub use grouper::group_events;

/// Whether a session is the main night sleep or a daytime nap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    NightSleep,
    Nap,
}

/// One continuous sleep or nap period rooted at a single event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepSession {
    /// The sleep/nap event anchoring this session
    pub original_event: Event,
    /// Night wakings strictly inside the window, chronological
    pub night_wakings: Vec<Event>,
    /// Feedings, medication and activities strictly inside the window, chronological
    pub overlay_events: Vec<Event>,
    /// Wake events consumed by this session
    pub wake_events: Vec<Event>,
    /// Window start (the root's start time)
    pub start: DateTime<FixedOffset>,
    /// Window end; `None` while the session is in progress
    pub end: Option<DateTime<FixedOffset>>,
}

impl SleepSession {
    pub fn kind(&self) -> SessionKind {
        match self.original_event.event_type {
            EventType::Nap => SessionKind::Nap,
            _ => SessionKind::NightSleep,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.end.is_none()
    }

    /// Elapsed minutes of the window, `None` while in progress.
    pub fn duration_minutes(&self) -> Option<i64> {
        self.end.map(|end| (end - self.start).num_minutes())
    }

    /// Strict open-interval membership test for the session window.
    pub fn contains(&self, instant: DateTime<FixedOffset>) -> bool {
        self.start < instant && self.end.map_or(true, |end| instant < end)
    }

    /// Every event owned by this session, root first.
    pub fn members(&self) -> impl Iterator<Item = &Event> {
        std::iter::once(&self.original_event)
            .chain(self.night_wakings.iter())
            .chain(self.overlay_events.iter())
            .chain(self.wake_events.iter())
    }
}

/// Output of [`group_events`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrouping {
    /// Sessions ordered by start time
    pub sessions: Vec<SleepSession>,
    /// Events not owned by any session, chronological
    pub other_events: Vec<Event>,
}

impl SessionGrouping {
    pub fn sessions_of_kind(&self, kind: SessionKind) -> impl Iterator<Item = &SleepSession> {
        self.sessions.iter().filter(move |s| s.kind() == kind)
    }

    pub fn night_sessions(&self) -> impl Iterator<Item = &SleepSession> {
        self.sessions_of_kind(SessionKind::NightSleep)
    }

    pub fn nap_sessions(&self) -> impl Iterator<Item = &SleepSession> {
        self.sessions_of_kind(SessionKind::Nap)
    }

    /// Number of input events accounted for across all buckets.
    pub fn total_events(&self) -> usize {
        self.sessions.iter().map(|s| s.members().count()).sum::<usize>() + self.other_events.len()
    }
}
