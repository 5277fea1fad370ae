//! Daily sleep distribution: night vs nap minutes per calendar day, averaged
//! over a period with a selectable denominator.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Night and nap minutes logged on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotal {
    pub date: NaiveDate,
    /// Night sleep attributed to the onset date
    pub night_minutes: i64,
    pub nap_minutes: i64,
    pub total_minutes: i64,
    pub naps: u32,
    pub night_wakings: u32,
}

impl DailyTotal {
    pub(crate) fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            night_minutes: 0,
            nap_minutes: 0,
            total_minutes: 0,
            naps: 0,
            night_wakings: 0,
        }
    }

    /// Whether the day contributes to a "days with data" denominator.
    pub fn has_sleep(&self) -> bool {
        self.night_minutes > 0 || self.nap_minutes > 0
    }
}

/// Nominal period a distribution is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodLabel {
    Week,
    Month,
    Quarter,
    Custom(u32),
}

impl PeriodLabel {
    pub fn days(&self) -> u32 {
        match self {
            PeriodLabel::Week => 7,
            PeriodLabel::Month => 30,
            PeriodLabel::Quarter => 90,
            PeriodLabel::Custom(days) => *days,
        }
    }
}

impl fmt::Display for PeriodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodLabel::Week => f.write_str("week"),
            PeriodLabel::Month => f.write_str("month"),
            PeriodLabel::Quarter => f.write_str("quarter"),
            PeriodLabel::Custom(days) => write!(f, "{days}d"),
        }
    }
}

impl FromStr for PeriodLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" | "7d" => Ok(PeriodLabel::Week),
            "month" | "30d" => Ok(PeriodLabel::Month),
            "quarter" | "90d" => Ok(PeriodLabel::Quarter),
            other => {
                let digits = other.strip_suffix('d').unwrap_or(other);
                match digits.parse::<u32>() {
                    Ok(0) | Err(_) => Err(format!(
                        "invalid period '{s}', expected week, month, quarter or a day count"
                    )),
                    Ok(days) => Ok(PeriodLabel::Custom(days)),
                }
            }
        }
    }
}

/// What averages are divided by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Denominator {
    /// Nominal period length; sparse logging shows as a low average
    DaysInPeriod,
    /// Only days with logged sleep
    DataDays,
}

impl FromStr for Denominator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "period" | "daysInPeriod" | "days_in_period" => Ok(Denominator::DaysInPeriod),
            "data" | "dataDays" | "data_days" => Ok(Denominator::DataDays),
            other => Err(format!(
                "invalid denominator '{other}', expected 'period' or 'data'"
            )),
        }
    }
}

/// Average daily night/nap split over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAggregate {
    pub period: PeriodLabel,
    pub denominator: Denominator,
    pub period_days: u32,
    pub data_days: u32,
    /// The value both averages were divided by
    pub divisor: u32,
    pub avg_night_minutes: f64,
    pub avg_nap_minutes: f64,
    pub avg_total_minutes: f64,
    pub night_percentage: f64,
    pub nap_percentage: f64,
    pub days: Vec<DailyTotal>,
}

impl DailyAggregate {
    /// Average over the trailing `period.days()` calendar days ending at the
    /// latest logged day. Older days are dropped.
    pub(crate) fn from_days(
        days: Vec<DailyTotal>,
        period: PeriodLabel,
        denominator: Denominator,
    ) -> Self {
        let days = trailing_window(days, period);
        let data_days = days.iter().filter(|d| d.has_sleep()).count() as u32;
        let divisor = match denominator {
            Denominator::DaysInPeriod => period.days(),
            Denominator::DataDays => data_days,
        };

        let night_total: i64 = days.iter().map(|d| d.night_minutes).sum();
        let nap_total: i64 = days.iter().map(|d| d.nap_minutes).sum();

        let (avg_night, avg_nap) = if divisor > 0 && data_days > 0 {
            (
                night_total as f64 / f64::from(divisor),
                nap_total as f64 / f64::from(divisor),
            )
        } else {
            (0.0, 0.0)
        };
        let avg_total = avg_night + avg_nap;

        // Both shares come from the same averages, so they sum to ~100.
        let (night_pct, nap_pct) = if avg_total > 0.0 {
            (avg_night / avg_total * 100.0, avg_nap / avg_total * 100.0)
        } else {
            (0.0, 0.0)
        };

        Self {
            period,
            denominator,
            period_days: period.days(),
            data_days,
            divisor,
            avg_night_minutes: super::round1(avg_night),
            avg_nap_minutes: super::round1(avg_nap),
            avg_total_minutes: super::round1(avg_total),
            night_percentage: super::round1(night_pct),
            nap_percentage: super::round1(nap_pct),
            days,
        }
    }
}

/// Days within `period` of the latest day in `days`.
fn trailing_window(days: Vec<DailyTotal>, period: PeriodLabel) -> Vec<DailyTotal> {
    let Some(last) = days.iter().map(|d| d.date).max() else {
        return days;
    };
    let first = last - Duration::days(i64::from(period.days()) - 1);
    days.into_iter().filter(|d| d.date >= first).collect()
}
