//! End-to-end scenarios through the public API.

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use sleepwise_core::validation::{CriterionId, CriterionStatus, MissingReason, SourceType};
use sleepwise_core::{
    compute_stats, group_events, validate_schedule, CriterionValue, DataAvailability, Event,
    EventType, SurveyData,
};

fn at(day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 9, day, hour, minute, 0)
        .unwrap()
}

fn survey(json: &str) -> SurveyData {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_boundary_events_fall_through() {
    let nap = Event::new("nap", "c", EventType::Nap, at(2, 13, 0)).with_end(at(2, 14, 0));
    let at_start = Event::new("feed-start", "c", EventType::Feeding, at(2, 13, 0));
    let at_end = Event::new("waking-end", "c", EventType::NightWaking, at(2, 14, 0));
    let inside = Event::new("meds", "c", EventType::Medication, at(2, 13, 30));

    let grouping = group_events(&[at_end, inside, nap, at_start]).unwrap();
    let session = &grouping.sessions[0];
    assert_eq!(session.overlay_events.len(), 1);
    assert_eq!(session.overlay_events[0].id, "meds");
    assert!(session.night_wakings.is_empty());

    let others: Vec<&str> = grouping.other_events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(others, vec!["feed-start", "waking-end"]);
}

#[test]
fn test_open_night_captures_late_feeding() {
    let sleep = Event::new("sleep", "c", EventType::Sleep, at(2, 20, 0));
    let feed = Event::new("bottle", "c", EventType::NightFeeding, at(3, 1, 30));

    let grouping = group_events(&[sleep, feed]).unwrap();
    assert!(grouping.sessions[0].is_in_progress());
    assert_eq!(grouping.sessions[0].overlay_events[0].id, "bottle");
    assert!(grouping.other_events.is_empty());
}

#[test]
fn test_overlapping_roots_stay_separate() {
    let a = Event::new("a", "c", EventType::Sleep, at(2, 20, 0)).with_end(at(3, 6, 0));
    let b = Event::new("b", "c", EventType::Sleep, at(2, 20, 0)).with_end(at(3, 6, 0));

    let grouping = group_events(&[a, b]).unwrap();
    assert_eq!(grouping.sessions.len(), 2);
    assert!(grouping.other_events.is_empty());
}

#[test]
fn test_night_crossing_arithmetic() {
    let bed = at(2, 21, 0);
    let plain = Event::new("s", "c", EventType::Sleep, bed).with_end(bed + Duration::hours(10));
    let stats = compute_stats(&[plain.clone()], at(1, 0, 0)).unwrap();
    assert_eq!(stats.avg_sleep_duration, 600.0);

    let delayed = plain.with_sleep_delay(30);
    let stats = compute_stats(&[delayed], at(1, 0, 0)).unwrap();
    assert_eq!(stats.avg_sleep_duration, 570.0);
}

#[test]
fn test_bedtimes_around_midnight_average_near_midnight() {
    let events = vec![
        Event::new("s1", "c", EventType::Sleep, at(2, 23, 30)).with_end(at(3, 8, 0)),
        Event::new("s2", "c", EventType::Sleep, at(4, 0, 30)).with_end(at(4, 9, 0)),
    ];
    let stats = compute_stats(&events, at(1, 0, 0)).unwrap();
    assert_eq!(stats.avg_bedtime, "00:00");
}

#[test]
fn test_empty_events_no_survey() {
    let result = validate_schedule(&[], None, 12, None).unwrap();
    let night = result.criterion(CriterionId::NightDuration).unwrap();
    assert_eq!(night.status, CriterionStatus::Warning);
    assert!(!night.data_available);
    assert!(night.message.contains("insufficient data"));
    assert_eq!(
        night.availability,
        DataAvailability::Missing {
            reason: MissingReason::NoSamples
        }
    );
    assert_eq!(result.data_completeness.available, 0);
}

#[test]
fn test_survey_night_duration() {
    let survey = survey(r#"{"horaDormir": "21:00", "horaDespertar": "07:00"}"#);
    let result = validate_schedule(&[], None, 12, Some(&survey)).unwrap();
    let night = result.criterion(CriterionId::NightDuration).unwrap();
    assert!(night.data_available);
    assert_eq!(night.source_type, SourceType::Survey);
    assert_eq!(night.value, Some(CriterionValue::Text("10.0 hrs".into())));
}

#[test]
fn test_survey_says_no_naps() {
    let survey = survey(r#"{"tomaSiestas": "no"}"#);
    let result = validate_schedule(&[], None, 12, Some(&survey)).unwrap();
    let naps = result.criterion(CriterionId::NapCount).unwrap();
    assert_eq!(naps.value, Some(CriterionValue::Number(0.0)));
    assert_eq!(naps.source_type, SourceType::Survey);
    assert_eq!(naps.status, CriterionStatus::Warning);
    assert!(naps.message.contains("0 naps"));
}

#[test]
fn test_zero_nap_duration_is_absent() {
    let survey = survey(r#"{"duracionTotalSiestas": "0"}"#);
    let result = validate_schedule(&[], None, 12, Some(&survey)).unwrap();
    let nap_length = result.criterion(CriterionId::NapDuration).unwrap();
    assert!(!nap_length.data_available);
}

#[test]
fn test_young_infant_nap_rules_are_variable() {
    let survey = survey(r#"{"tomaSiestas": "no", "duracionTotalSiestas": "500"}"#);
    let result = validate_schedule(&[], None, 2, Some(&survey)).unwrap();
    for id in [CriterionId::NapCount, CriterionId::NapDuration] {
        let c = result.criterion(id).unwrap();
        assert_eq!(c.value, Some(CriterionValue::Text("Variable".into())));
        assert_eq!(c.status, CriterionStatus::Ok);
        assert!(c.data_available);
    }
}

#[test]
fn test_calculated_beats_survey() {
    let events = vec![Event::new("s", "c", EventType::Sleep, at(2, 19, 0)).with_end(at(3, 6, 0))];
    let survey = survey(r#"{"horaDormir": "23:00", "horaDespertar": "10:00"}"#);
    let result = validate_schedule(&events, None, 12, Some(&survey)).unwrap();

    let bedtime = result.criterion(CriterionId::Bedtime).unwrap();
    assert_eq!(bedtime.source_type, SourceType::Calculated);
    assert_eq!(bedtime.value, Some(CriterionValue::Text("19:00".into())));

    let night = result.criterion(CriterionId::NightDuration).unwrap();
    assert_eq!(night.value, Some(CriterionValue::Text("11.0 hrs".into())));
}
