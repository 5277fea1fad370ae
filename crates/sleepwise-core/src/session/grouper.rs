use chrono::{DateTime, FixedOffset};
use tracing::{debug, trace};

use super::{SessionGrouping, SleepSession};
use crate::error::ValidationError;
use crate::events::{validate_events, Event, EventType};

/// Resolved window of one root event, indexed into the sorted event list.
#[derive(Debug, Clone, Copy)]
struct Window {
    root: usize,
    start: DateTime<FixedOffset>,
    end: Option<DateTime<FixedOffset>>,
    /// Wake event that closed an open root
    closing_wake: Option<usize>,
}

impl Window {
    fn admits(&self, pos: usize, event: &Event) -> bool {
        if self.closing_wake == Some(pos) {
            return true;
        }
        self.start < event.start_time && self.end.map_or(true, |end| event.start_time < end)
    }
}

/// Where a secondary event lands inside its owning session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    NightWaking,
    Overlay,
    Wake,
}

impl Slot {
    fn for_type(event_type: EventType) -> Option<Self> {
        match event_type {
            EventType::NightWaking => Some(Slot::NightWaking),
            EventType::Wake => Some(Slot::Wake),
            t if t.is_overlay() => Some(Slot::Overlay),
            _ => None,
        }
    }
}

/// Accumulator threaded through the fold by value.
#[derive(Default)]
struct Buffers {
    sessions: Vec<SleepSession>,
    other_events: Vec<Event>,
}

/// Partition `events` into sleep/nap sessions and unrelated events.
///
/// Every `sleep` or `nap` event roots its own session, even when windows
/// overlap. A root without `end_time` is closed by the first `wake` event
/// strictly after it, or stays open with no upper bound. Secondary events
/// strictly inside a window are attached to the eligible session with the
/// latest start; boundary-equal events fall through to `other_events`.
///
/// # Errors
///
/// Returns a [`ValidationError`] if any event breaks the input contract.
pub fn group_events(events: &[Event]) -> Result<SessionGrouping, ValidationError> {
    validate_events(events)?;

    let mut ordered: Vec<&Event> = events.iter().collect();
    ordered.sort_by_key(|e| e.start_time);

    let windows = resolve_windows(&ordered);

    let seed = Buffers {
        sessions: windows
            .iter()
            .map(|w| SleepSession {
                original_event: ordered[w.root].clone(),
                night_wakings: Vec::new(),
                overlay_events: Vec::new(),
                wake_events: Vec::new(),
                start: w.start,
                end: w.end,
            })
            .collect(),
        other_events: Vec::new(),
    };

    let buffers = ordered
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.event_type.is_session_root())
        .fold(seed, |mut acc, (pos, event)| {
            let owner = Slot::for_type(event.event_type)
                .and_then(|slot| owning_window(&windows, pos, event).map(|w| (w, slot)));

            match owner {
                Some((idx, slot)) => {
                    trace!(event_id = %event.id, session = idx, ?slot, "attached to session");
                    let session = &mut acc.sessions[idx];
                    let bucket = match slot {
                        Slot::NightWaking => &mut session.night_wakings,
                        Slot::Overlay => &mut session.overlay_events,
                        Slot::Wake => &mut session.wake_events,
                    };
                    bucket.push((*event).clone());
                }
                None => {
                    trace!(event_id = %event.id, "no owning session");
                    acc.other_events.push((*event).clone());
                }
            }
            acc
        });

    debug!(
        events = events.len(),
        sessions = buffers.sessions.len(),
        other = buffers.other_events.len(),
        "grouped events into sessions"
    );

    Ok(SessionGrouping {
        sessions: buffers.sessions,
        other_events: buffers.other_events,
    })
}

/// One window per root, in sorted order.
fn resolve_windows(ordered: &[&Event]) -> Vec<Window> {
    ordered
        .iter()
        .enumerate()
        .filter(|(_, e)| e.event_type.is_session_root())
        .map(|(root, e)| match e.end_time {
            Some(end) => Window {
                root,
                start: e.start_time,
                end: Some(end),
                closing_wake: None,
            },
            None => {
                let closing_wake = ordered
                    .iter()
                    .enumerate()
                    .skip(root + 1)
                    .find(|(_, w)| w.event_type == EventType::Wake && w.start_time > e.start_time)
                    .map(|(pos, _)| pos);
                Window {
                    root,
                    start: e.start_time,
                    end: closing_wake.map(|pos| ordered[pos].start_time),
                    closing_wake,
                }
            }
        })
        .collect()
}

/// Index of the single session that owns `event`, if any.
///
/// A wake that closed an open root belongs to that root first. Otherwise the
/// eligible window with the latest start wins; ties keep the earlier root.
fn owning_window(windows: &[Window], pos: usize, event: &Event) -> Option<usize> {
    let closed_by_this: Vec<usize> = windows
        .iter()
        .enumerate()
        .filter(|(_, w)| w.closing_wake == Some(pos))
        .map(|(idx, _)| idx)
        .collect();

    let candidates: Vec<usize> = if closed_by_this.is_empty() {
        windows
            .iter()
            .enumerate()
            .filter(|(_, w)| w.admits(pos, event))
            .map(|(idx, _)| idx)
            .collect()
    } else {
        closed_by_this
    };

    candidates.into_iter().fold(None, |best: Option<usize>, idx| match best {
        Some(b) if windows[idx].start <= windows[b].start => Some(b),
        _ => Some(idx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionKind;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, day, hour, min, 0)
            .unwrap()
    }

    fn event(id: &str, event_type: EventType, start: DateTime<FixedOffset>) -> Event {
        Event::new(id, "child-1", event_type, start)
    }

    fn ids(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        let grouping = group_events(&[]).unwrap();
        assert!(grouping.sessions.is_empty());
        assert!(grouping.other_events.is_empty());
    }

    #[test]
    fn test_night_session_collects_wakings_and_overlays() {
        let events = vec![
            event("sleep", EventType::Sleep, at(1, 20, 0)).with_end(at(2, 7, 0)),
            event("wk1", EventType::NightWaking, at(2, 1, 0)),
            event("feed", EventType::NightFeeding, at(2, 3, 0)),
            event("med", EventType::Medication, at(2, 4, 0)),
            event("wk2", EventType::NightWaking, at(1, 23, 0)),
            event("breakfast", EventType::Feeding, at(2, 8, 0)),
        ];
        let grouping = group_events(&events).unwrap();

        assert_eq!(grouping.sessions.len(), 1);
        let session = &grouping.sessions[0];
        assert_eq!(session.kind(), SessionKind::NightSleep);
        assert_eq!(ids(&session.night_wakings), vec!["wk2", "wk1"]);
        assert_eq!(ids(&session.overlay_events), vec!["feed", "med"]);
        assert_eq!(ids(&grouping.other_events), vec!["breakfast"]);
        assert_eq!(session.duration_minutes(), Some(660));
    }

    #[test]
    fn test_boundary_events_fall_through() {
        let events = vec![
            event("nap", EventType::Nap, at(3, 13, 0)).with_end(at(3, 14, 30)),
            event("at-start", EventType::Feeding, at(3, 13, 0)),
            event("at-end", EventType::Feeding, at(3, 14, 30)),
            event("inside", EventType::Feeding, at(3, 13, 45)),
        ];
        let grouping = group_events(&events).unwrap();

        assert_eq!(ids(&grouping.sessions[0].overlay_events), vec!["inside"]);
        assert_eq!(ids(&grouping.other_events), vec!["at-start", "at-end"]);
    }

    #[test]
    fn test_open_session_captures_feeding_until_wake() {
        let events = vec![
            event("sleep", EventType::Sleep, at(4, 20, 0)),
            event("feed", EventType::NightFeeding, at(4, 23, 30)),
            event("wake", EventType::Wake, at(5, 6, 45)),
            event("later", EventType::Feeding, at(5, 9, 0)),
        ];
        let grouping = group_events(&events).unwrap();

        let session = &grouping.sessions[0];
        assert!(!session.is_in_progress());
        assert_eq!(session.end, Some(at(5, 6, 45)));
        assert_eq!(ids(&session.overlay_events), vec!["feed"]);
        assert_eq!(ids(&session.wake_events), vec!["wake"]);
        assert_eq!(ids(&grouping.other_events), vec!["later"]);
    }

    #[test]
    fn test_open_session_without_wake_has_no_upper_bound() {
        let events = vec![
            event("sleep", EventType::Sleep, at(6, 21, 0)),
            event("feed", EventType::NightFeeding, at(7, 2, 0)),
            event("feed2", EventType::Feeding, at(7, 10, 0)),
        ];
        let grouping = group_events(&events).unwrap();

        let session = &grouping.sessions[0];
        assert!(session.is_in_progress());
        assert_eq!(session.duration_minutes(), None);
        assert_eq!(ids(&session.overlay_events), vec!["feed", "feed2"]);
        assert!(grouping.other_events.is_empty());
    }

    #[test]
    fn test_overlapping_roots_never_merge() {
        let events = vec![
            event("sleep-a", EventType::Sleep, at(8, 20, 0)).with_end(at(9, 6, 0)),
            event("sleep-b", EventType::Sleep, at(8, 22, 0)).with_end(at(9, 7, 0)),
            event("wk", EventType::NightWaking, at(9, 2, 0)),
            event("early", EventType::NightWaking, at(8, 21, 0)),
        ];
        let grouping = group_events(&events).unwrap();

        assert_eq!(grouping.sessions.len(), 2);
        assert_eq!(ids(&grouping.sessions[0].night_wakings), vec!["early"]);
        assert_eq!(ids(&grouping.sessions[1].night_wakings), vec!["wk"]);
        assert_eq!(grouping.total_events(), events.len());
    }

    #[test]
    fn test_roots_are_never_overlays() {
        let events = vec![
            event("sleep", EventType::Sleep, at(10, 20, 0)).with_end(at(11, 7, 0)),
            event("nap", EventType::Nap, at(10, 22, 0)).with_end(at(10, 23, 0)),
        ];
        let grouping = group_events(&events).unwrap();

        assert_eq!(grouping.sessions.len(), 2);
        assert!(grouping.sessions.iter().all(|s| s.overlay_events.is_empty()));
        assert!(grouping.other_events.is_empty());
    }

    #[test]
    fn test_notes_and_stray_wakes_go_to_other_events() {
        let events = vec![
            event("nap", EventType::Nap, at(12, 13, 0)).with_end(at(12, 14, 0)),
            event("note", EventType::Note, at(12, 13, 30)),
            event("wake-in", EventType::Wake, at(12, 13, 50)),
            event("wake-out", EventType::Wake, at(12, 16, 0)),
        ];
        let grouping = group_events(&events).unwrap();

        assert_eq!(ids(&grouping.sessions[0].wake_events), vec!["wake-in"]);
        assert!(grouping.sessions[0].night_wakings.is_empty());
        assert_eq!(ids(&grouping.other_events), vec!["note", "wake-out"]);
    }

    #[test]
    fn test_later_root_owns_its_own_events() {
        let events = vec![
            event("nap", EventType::Nap, at(13, 13, 0)),
            event("sleep", EventType::Sleep, at(13, 20, 0)).with_end(at(14, 6, 0)),
            event("wk", EventType::NightWaking, at(14, 1, 0)),
        ];
        let grouping = group_events(&events).unwrap();

        let nap = &grouping.sessions[0];
        let sleep = &grouping.sessions[1];
        assert_eq!(nap.kind(), SessionKind::Nap);
        assert!(nap.night_wakings.is_empty());
        assert_eq!(ids(&sleep.night_wakings), vec!["wk"]);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let forward = vec![
            event("sleep", EventType::Sleep, at(15, 20, 0)).with_end(at(16, 6, 30)),
            event("wk", EventType::NightWaking, at(16, 2, 0)),
            event("note", EventType::Note, at(16, 9, 0)),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        assert_eq!(group_events(&forward).unwrap(), group_events(&reversed).unwrap());
    }

    #[test]
    fn test_invalid_event_rejects_call() {
        let events = vec![event("bad", EventType::Nap, at(17, 14, 0)).with_end(at(17, 13, 0))];
        assert!(group_events(&events).is_err());
    }
}
