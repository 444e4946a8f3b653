//! Weekly pickup schedule (jours et horaires de ramassage)

use crate::error::{AppError, AppResult, ErrorCode};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

const TIME_FORMAT: &str = "%H:%M";

/// Pickup time slot, serialized as `["HH:MM", "HH:MM"]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot(pub String, pub String);

impl TimeSlot {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self(start.into(), end.into())
    }

    pub fn start(&self) -> &str {
        &self.0
    }

    pub fn end(&self) -> &str {
        &self.1
    }

    /// Parse the slot end time (the latest pickup moment)
    pub fn end_time(&self) -> AppResult<NaiveTime> {
        parse_time(&self.1)
    }

    pub fn validate(&self) -> AppResult<()> {
        let start = parse_time(&self.0)?;
        let end = parse_time(&self.1)?;
        if start >= end {
            return Err(AppError::with_message(
                ErrorCode::InvalidPickupRule,
                format!("Pickup slot start {} must be before end {}", self.0, self.1),
            ));
        }
        Ok(())
    }
}

fn parse_time(value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| {
        AppError::with_message(
            ErrorCode::InvalidPickupRule,
            format!("Invalid pickup time '{}', expected HH:MM", value),
        )
        .with_detail("value", value)
    })
}

/// One recurring pickup: ISO weekday (1 = Monday .. 7 = Sunday) and its slot
///
/// Serialized as `[weekday, ["HH:MM", "HH:MM"]]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u8, TimeSlot)", into = "(u8, TimeSlot)")]
pub struct PickupRule {
    pub weekday: u8,
    pub hours: TimeSlot,
}

impl PickupRule {
    pub fn new(weekday: u8, start: &str, end: &str) -> Self {
        Self {
            weekday,
            hours: TimeSlot::new(start, end),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if !(1..=7).contains(&self.weekday) {
            return Err(AppError::with_message(
                ErrorCode::InvalidPickupRule,
                format!("Pickup weekday must be between 1 and 7, got {}", self.weekday),
            ));
        }
        self.hours.validate()
    }
}

impl From<(u8, TimeSlot)> for PickupRule {
    fn from((weekday, hours): (u8, TimeSlot)) -> Self {
        Self { weekday, hours }
    }
}

impl From<PickupRule> for (u8, TimeSlot) {
    fn from(rule: PickupRule) -> Self {
        (rule.weekday, rule.hours)
    }
}

/// Validate a whole schedule; an empty schedule is invalid
pub fn validate_pickup_rules(rules: &[PickupRule]) -> AppResult<()> {
    if rules.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::InvalidPickupRule,
            "Pickup schedule is empty",
        ));
    }
    rules.iter().try_for_each(PickupRule::validate)
}
