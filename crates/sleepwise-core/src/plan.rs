//! Active sleep plan supplied by the caller.

use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;

/// Target schedule of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSchedule {
    pub bedtime: ClockTime,
    pub wake_time: ClockTime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nap_times: Vec<String>,
}

/// A plan the family is currently following. Only the schedule matters here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub schedule: PlanSchedule,
}

impl Plan {
    pub fn new(bedtime: ClockTime, wake_time: ClockTime) -> Self {
        Self {
            schedule: PlanSchedule {
                bedtime,
                wake_time,
                nap_times: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_plan() {
        let plan: Plan =
            serde_json::from_str(r#"{"schedule": {"bedtime": "19:45", "wakeTime": "06:45"}}"#)
                .unwrap();
        assert_eq!(plan.schedule.bedtime.to_string(), "19:45");
        assert_eq!(plan.schedule.wake_time.to_string(), "06:45");
        assert!(plan.schedule.nap_times.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_malformed_clock() {
        let result = serde_json::from_str::<Plan>(
            r#"{"schedule": {"bedtime": "late", "wakeTime": "06:45"}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let plan: Plan = serde_json::from_str(
            r#"{"id": "p1", "schedule": {"bedtime": "20:00", "wakeTime": "07:00", "napTimes": ["09:30", "13:30"], "meals": []}}"#,
        )
        .unwrap();
        assert_eq!(plan.schedule.nap_times, vec!["09:30", "13:30"]);
    }
}
