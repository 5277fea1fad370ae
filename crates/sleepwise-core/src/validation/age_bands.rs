//! Age-conditional sleep norms.
//!
//! The table is plain data: it ships with defaults but can be replaced from
//! configuration (localization, clinical overrides, tests). Construction
//! checks that the bands tile the age axis from 0 months with no gaps.

use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;
use crate::error::ConfigError;

/// Expected sleep for children within `[min_months, max_months)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeBand {
    pub min_months: u32,
    /// Exclusive upper bound; `None` for the last, open-ended band
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_months: Option<u32>,
    pub night_hours_min: f64,
    pub night_hours_max: f64,
    pub naps_min: u32,
    pub naps_max: u32,
    pub max_nap_minutes: u32,
    pub bedtime: ClockTime,
    pub wake_time: ClockTime,
    pub max_night_wakings: u32,
}

impl AgeBand {
    pub fn contains(&self, age_months: u32) -> bool {
        age_months >= self.min_months && self.max_months.map_or(true, |max| age_months < max)
    }

    /// "1-2" style range, or a single number when both ends agree.
    pub fn expected_naps(&self) -> String {
        if self.naps_min == self.naps_max {
            self.naps_min.to_string()
        } else {
            format!("{}-{}", self.naps_min, self.naps_max)
        }
    }

    pub fn expected_night_hours(&self) -> String {
        format!("{}-{} hrs", self.night_hours_min, self.night_hours_max)
    }
}

#[allow(clippy::too_many_arguments)]
fn band(
    min_months: u32,
    max_months: Option<u32>,
    night_hours: (f64, f64),
    naps: (u32, u32),
    max_nap_minutes: u32,
    bedtime: (u32, u32),
    wake_time: (u32, u32),
    max_night_wakings: u32,
) -> AgeBand {
    AgeBand {
        min_months,
        max_months,
        night_hours_min: night_hours.0,
        night_hours_max: night_hours.1,
        naps_min: naps.0,
        naps_max: naps.1,
        max_nap_minutes,
        bedtime: ClockTime::from_minutes(i64::from(bedtime.0 * 60 + bedtime.1)),
        wake_time: ClockTime::from_minutes(i64::from(wake_time.0 * 60 + wake_time.1)),
        max_night_wakings,
    }
}

/// Ordered, gap-free set of age bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AgeBand>", into = "Vec<AgeBand>")]
pub struct AgeBandTable {
    bands: Vec<AgeBand>,
}

impl AgeBandTable {
    /// Build a table, checking that the bands tile `[0, ∞)`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the table is empty, does not
    /// start at 0 months, has gaps or overlaps, or contains an inverted range.
    pub fn new(bands: Vec<AgeBand>) -> Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: "age_bands".into(),
            message,
        };

        let first = bands
            .first()
            .ok_or_else(|| invalid("at least one age band is required".into()))?;
        if first.min_months != 0 {
            return Err(invalid(format!(
                "first band must start at 0 months, starts at {}",
                first.min_months
            )));
        }

        for (idx, b) in bands.iter().enumerate() {
            let is_last = idx + 1 == bands.len();
            match (b.max_months, is_last) {
                (Some(max), _) if max <= b.min_months => {
                    return Err(invalid(format!(
                        "band starting at {} months ends at {max}",
                        b.min_months
                    )));
                }
                (None, false) => {
                    return Err(invalid(format!(
                        "only the last band may be open-ended (band starting at {} months)",
                        b.min_months
                    )));
                }
                _ => {}
            }
            if b.night_hours_min > b.night_hours_max {
                return Err(invalid(format!(
                    "night hours inverted in band starting at {} months",
                    b.min_months
                )));
            }
            if b.naps_min > b.naps_max {
                return Err(invalid(format!(
                    "nap count inverted in band starting at {} months",
                    b.min_months
                )));
            }
            if let Some(next) = bands.get(idx + 1) {
                if b.max_months != Some(next.min_months) {
                    return Err(invalid(format!(
                        "bands must be contiguous: band starting at {} months is followed by one starting at {}",
                        b.min_months, next.min_months
                    )));
                }
            }
        }

        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[AgeBand] {
        &self.bands
    }

    /// Band covering `age_months`. Ages past a closed last band use it.
    pub fn band_for(&self, age_months: u32) -> &AgeBand {
        self.bands
            .iter()
            .find(|b| b.contains(age_months))
            .unwrap_or_else(|| &self.bands[self.bands.len() - 1])
    }
}

impl Default for AgeBandTable {
    fn default() -> Self {
        Self {
            bands: vec![
                band(0, Some(4), (8.0, 10.0), (3, 5), 180, (21, 0), (7, 0), 3),
                band(4, Some(6), (10.0, 12.0), (3, 4), 120, (20, 0), (7, 0), 2),
                band(6, Some(9), (10.0, 12.0), (2, 3), 120, (19, 30), (7, 0), 2),
                band(9, Some(12), (10.0, 12.0), (2, 2), 120, (19, 30), (7, 0), 1),
                band(12, Some(18), (10.0, 12.0), (1, 2), 150, (19, 30), (7, 0), 1),
                band(18, Some(36), (10.0, 12.0), (1, 1), 150, (20, 0), (7, 0), 1),
                band(36, Some(60), (10.0, 12.0), (0, 1), 90, (20, 0), (7, 0), 1),
                band(60, None, (9.0, 11.0), (0, 0), 60, (20, 30), (7, 0), 1),
            ],
        }
    }
}

impl TryFrom<Vec<AgeBand>> for AgeBandTable {
    type Error = ConfigError;

    fn try_from(bands: Vec<AgeBand>) -> Result<Self, Self::Error> {
        Self::new(bands)
    }
}

impl From<AgeBandTable> for Vec<AgeBand> {
    fn from(table: AgeBandTable) -> Self {
        table.bands
    }
}
