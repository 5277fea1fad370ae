//! Parent-filled intake questionnaire.
//!
//! Survey answers arrive as loosely typed JSON: numbers and booleans may be
//! encoded as strings and "no" means false. Every field is parsed once at
//! this boundary into a [`SurveyField`], so the validation engine never
//! inspects raw strings.

use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;

/// Raw survey answer as it appears in the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SurveyValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Outcome of parsing one survey answer.
#[derive(Debug, Clone, PartialEq)]
pub enum SurveyField<T> {
    /// Not answered, or answered with an empty value
    Absent,
    /// Answered, but not in a usable form
    Invalid(String),
    Valid(T),
}

impl<T> SurveyField<T> {
    pub fn valid(self) -> Option<T> {
        match self {
            SurveyField::Valid(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, SurveyField::Valid(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SurveyField<U> {
        match self {
            SurveyField::Absent => SurveyField::Absent,
            SurveyField::Invalid(raw) => SurveyField::Invalid(raw),
            SurveyField::Valid(v) => SurveyField::Valid(f(v)),
        }
    }
}

/// Parent-reported baseline. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyData {
    /// Usual bedtime, "HH:MM"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hora_dormir: Option<SurveyValue>,
    /// Usual wake time, "HH:MM"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hora_despertar: Option<SurveyValue>,
    /// Whether the child naps; `"no"` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toma_siestas: Option<SurveyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero_siestas: Option<SurveyValue>,
    /// Total daily nap minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duracion_total_siestas: Option<SurveyValue>,
}

impl SurveyData {
    pub fn bedtime(&self) -> SurveyField<ClockTime> {
        parse_clock(self.hora_dormir.as_ref())
    }

    pub fn wake_time(&self) -> SurveyField<ClockTime> {
        parse_clock(self.hora_despertar.as_ref())
    }

    /// Night sleep implied by the bedtime and wake answers, in minutes.
    pub fn night_duration_minutes(&self) -> SurveyField<i64> {
        match (self.bedtime(), self.wake_time()) {
            (SurveyField::Valid(bed), SurveyField::Valid(wake)) => {
                SurveyField::Valid(bed.minutes_until(wake))
            }
            (SurveyField::Invalid(raw), _) | (_, SurveyField::Invalid(raw)) => {
                SurveyField::Invalid(raw)
            }
            _ => SurveyField::Absent,
        }
    }

    pub fn takes_naps(&self) -> SurveyField<bool> {
        match self.toma_siestas.as_ref() {
            None => SurveyField::Absent,
            Some(SurveyValue::Bool(b)) => SurveyField::Valid(*b),
            Some(SurveyValue::Number(n)) => SurveyField::Valid(*n != 0.0),
            Some(SurveyValue::Text(s)) => {
                let s = s.trim();
                if s.is_empty() {
                    SurveyField::Absent
                } else {
                    SurveyField::Valid(!s.eq_ignore_ascii_case("no"))
                }
            }
        }
    }

    /// Raw `numeroSiestas` answer as a finite, non-negative number.
    pub fn nap_count(&self) -> SurveyField<f64> {
        match parse_number(self.numero_siestas.as_ref()) {
            SurveyField::Valid(n) if n < 0.0 => SurveyField::Invalid(n.to_string()),
            other => other,
        }
    }

    /// Naps per day implied by the survey.
    ///
    /// An explicit "does not nap" is a real zero. A child who naps needs a
    /// strictly positive count; anything else leaves the answer unusable.
    pub fn naps_per_day(&self) -> SurveyField<f64> {
        match self.takes_naps() {
            SurveyField::Valid(false) => SurveyField::Valid(0.0),
            SurveyField::Valid(true) => match self.nap_count() {
                SurveyField::Valid(n) if n == 0.0 => SurveyField::Invalid(n.to_string()),
                other => other,
            },
            SurveyField::Absent => SurveyField::Absent,
            SurveyField::Invalid(raw) => SurveyField::Invalid(raw),
        }
    }

    /// Total nap minutes; zero is treated as not answered.
    pub fn nap_duration_minutes(&self) -> SurveyField<f64> {
        match parse_number(self.duracion_total_siestas.as_ref()) {
            SurveyField::Valid(n) if n == 0.0 => SurveyField::Absent,
            SurveyField::Valid(n) if n < 0.0 => SurveyField::Invalid(n.to_string()),
            other => other,
        }
    }
}

fn parse_clock(value: Option<&SurveyValue>) -> SurveyField<ClockTime> {
    match value {
        None => SurveyField::Absent,
        Some(SurveyValue::Text(s)) if s.trim().is_empty() => SurveyField::Absent,
        Some(SurveyValue::Text(s)) => match s.parse::<ClockTime>() {
            Ok(clock) => SurveyField::Valid(clock),
            Err(_) => SurveyField::Invalid(s.clone()),
        },
        Some(other) => SurveyField::Invalid(raw_text(other)),
    }
}

fn parse_number(value: Option<&SurveyValue>) -> SurveyField<f64> {
    match value {
        None => SurveyField::Absent,
        Some(SurveyValue::Number(n)) if n.is_finite() => SurveyField::Valid(*n),
        Some(SurveyValue::Text(s)) if s.trim().is_empty() => SurveyField::Absent,
        Some(SurveyValue::Text(s)) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => SurveyField::Valid(n),
            _ => SurveyField::Invalid(s.clone()),
        },
        Some(other) => SurveyField::Invalid(raw_text(other)),
    }
}

fn raw_text(value: &SurveyValue) -> String {
    match value {
        SurveyValue::Bool(b) => b.to_string(),
        SurveyValue::Number(n) => n.to_string(),
        SurveyValue::Text(s) => s.clone(),
    }
}
