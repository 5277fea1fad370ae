use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Upper bound for a logged sleep delay (time to fall asleep), in minutes.
pub const MAX_SLEEP_DELAY_MIN: i64 = 180;

/// Kind of activity a caregiver logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Sleep,
    Nap,
    Wake,
    NightWaking,
    Feeding,
    NightFeeding,
    Medication,
    ExtraActivities,
    Note,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Sleep => "sleep",
            EventType::Nap => "nap",
            EventType::Wake => "wake",
            EventType::NightWaking => "night_waking",
            EventType::Feeding => "feeding",
            EventType::NightFeeding => "night_feeding",
            EventType::Medication => "medication",
            EventType::ExtraActivities => "extra_activities",
            EventType::Note => "note",
        }
    }

    /// Sleep and nap events each anchor their own session.
    pub fn is_session_root(&self) -> bool {
        matches!(self, EventType::Sleep | EventType::Nap)
    }

    /// Events that ride on top of a session without interrupting it.
    pub fn is_overlay(&self) -> bool {
        matches!(
            self,
            EventType::Feeding
                | EventType::NightFeeding
                | EventType::Medication
                | EventType::ExtraActivities
        )
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded activity instance.
///
/// Events are handed to the pipeline already fetched for one child and are
/// never mutated by it. Instants keep their UTC offset so that clock-of-day
/// arithmetic happens in the family's local time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub child_id: String,
    pub event_type: EventType,
    pub start_time: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<FixedOffset>>,
    /// Minutes between being put down and falling asleep (sleep events only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_delay: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feeding_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feeding_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Event {
    pub fn new(
        id: impl Into<String>,
        child_id: impl Into<String>,
        event_type: EventType,
        start_time: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: id.into(),
            child_id: child_id.into(),
            event_type,
            start_time,
            end_time: None,
            sleep_delay: None,
            feeding_amount: None,
            feeding_duration: None,
            activity_duration: None,
            medication_name: None,
            emotional_state: None,
            notes: None,
        }
    }

    pub fn with_end(mut self, end_time: DateTime<FixedOffset>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn with_sleep_delay(mut self, minutes: i64) -> Self {
        self.sleep_delay = Some(minutes);
        self
    }

    pub fn with_emotional_state(mut self, state: impl Into<String>) -> Self {
        self.emotional_state = Some(state.into());
        self
    }

    /// Sleep delay clamped into the accepted range; 0 when absent.
    pub fn effective_sleep_delay(&self) -> i64 {
        self.sleep_delay
            .unwrap_or(0)
            .clamp(0, MAX_SLEEP_DELAY_MIN)
    }

    /// Elapsed minutes between start and end, if the event is closed.
    pub fn duration_minutes(&self) -> Option<i64> {
        self.end_time
            .map(|end| (end - self.start_time).num_minutes())
    }

    /// Check the invariants every event must satisfy before entering the
    /// pipeline.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when `end_time <= start_time`, when the
    /// sleep delay lies outside `0..=180`, or when a sleep delay is set on a
    /// non-sleep event.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(end) = self.end_time {
            if end <= self.start_time {
                return Err(ValidationError::InvalidTimeRange {
                    event_id: self.id.clone(),
                    start: self.start_time,
                    end,
                });
            }
        }

        if let Some(delay) = self.sleep_delay {
            if self.event_type != EventType::Sleep {
                return Err(ValidationError::SleepDelayOnNonSleep {
                    event_id: self.id.clone(),
                    event_type: self.event_type,
                });
            }
            if !(0..=MAX_SLEEP_DELAY_MIN).contains(&delay) {
                return Err(ValidationError::SleepDelayOutOfRange {
                    event_id: self.id.clone(),
                    value: delay,
                });
            }
        }

        Ok(())
    }
}

/// Validate a whole event list, failing on the first violation.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found, in input order.
pub fn validate_events(events: &[Event]) -> Result<(), ValidationError> {
    events.iter().try_for_each(Event::validate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(day: u32, hour: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(-5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, day, hour, min, 0)
            .unwrap()
    }

    #[test]
    fn test_deserialize_camel_case_payload() {
        let json = r#"{
            "id": "ev-1",
            "childId": "kid-1",
            "eventType": "night_waking",
            "startTime": "2024-03-10T02:15:00-05:00",
            "endTime": "2024-03-10T02:40:00-05:00",
            "emotionalState": "inquieto"
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, EventType::NightWaking);
        assert_eq!(event.duration_minutes(), Some(25));
        assert_eq!(event.emotional_state.as_deref(), Some("inquieto"));
        assert!(event.sleep_delay.is_none());
    }

    #[test]
    fn test_missing_event_type_is_rejected_at_boundary() {
        let json = r#"{"id": "ev-1", "childId": "kid-1", "startTime": "2024-03-10T02:15:00-05:00"}"#;
        assert!(serde_json::from_str::<Event>(json).is_err());
    }

    #[test]
    fn test_validate_rejects_end_before_start() {
        let event = Event::new("e", "c", EventType::Nap, local(10, 13, 0)).with_end(local(10, 12, 0));
        assert!(matches!(
            event.validate(),
            Err(ValidationError::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_length_event() {
        let event = Event::new("e", "c", EventType::Nap, local(10, 13, 0)).with_end(local(10, 13, 0));
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_validate_sleep_delay_bounds() {
        let ok = Event::new("e", "c", EventType::Sleep, local(10, 20, 0)).with_sleep_delay(180);
        assert!(ok.validate().is_ok());

        let too_long = Event::new("e", "c", EventType::Sleep, local(10, 20, 0)).with_sleep_delay(181);
        assert_eq!(
            too_long.validate(),
            Err(ValidationError::SleepDelayOutOfRange {
                event_id: "e".into(),
                value: 181
            })
        );

        let negative = Event::new("e", "c", EventType::Sleep, local(10, 20, 0)).with_sleep_delay(-1);
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_validate_sleep_delay_only_on_sleep() {
        let nap = Event::new("e", "c", EventType::Nap, local(10, 13, 0)).with_sleep_delay(10);
        assert!(matches!(
            nap.validate(),
            Err(ValidationError::SleepDelayOnNonSleep { event_type: EventType::Nap, .. })
        ));
    }

    #[test]
    fn test_validate_events_reports_first_violation() {
        let events = vec![
            Event::new("good", "c", EventType::Feeding, local(10, 9, 0)),
            Event::new("bad", "c", EventType::Wake, local(10, 7, 0)).with_sleep_delay(5),
        ];
        match validate_events(&events) {
            Err(ValidationError::SleepDelayOnNonSleep { event_id, .. }) => assert_eq!(event_id, "bad"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_effective_sleep_delay_defaults_to_zero() {
        let event = Event::new("e", "c", EventType::Sleep, local(10, 20, 0));
        assert_eq!(event.effective_sleep_delay(), 0);
    }

    #[test]
    fn test_event_type_classification() {
        assert!(EventType::Sleep.is_session_root());
        assert!(EventType::Nap.is_session_root());
        assert!(!EventType::Wake.is_session_root());
        assert!(EventType::NightFeeding.is_overlay());
        assert!(!EventType::NightWaking.is_overlay());
        assert!(!EventType::Note.is_overlay());
        assert_eq!(EventType::ExtraActivities.to_string(), "extra_activities");
    }
}
