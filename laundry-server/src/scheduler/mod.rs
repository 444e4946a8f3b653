//! Pickup Scheduler
//!
//! Pure date arithmetic over a weekly pickup schedule. Weekdays follow the
//! `1 = Monday .. 7 = Sunday` convention of stored rules; arithmetic runs
//! on a Sunday-start week where 7 aliases 0.

use chrono::{Datelike, Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use shared::error::AppResult;
use shared::models::{PickupRule, TimeSlot, validate_pickup_rules};

/// Length of a subscription before the delivery buffer
pub const SUBSCRIPTION_WEEKS: i64 = 4;

/// One concrete pickup derived from a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pickup {
    /// Pickup day at midnight
    pub date: NaiveDateTime,
    /// Weekday as written in the rule (1..=7)
    pub weekday: u8,
    pub hours: TimeSlot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Next occurrence of each rule's weekday on or after `reference`
///
/// When a rule falls on the reference weekday and `include_reference_day`
/// is false, that rule rolls forward a full week. Output keeps rule order.
pub fn compute_pickups(
    reference: NaiveDateTime,
    rules: &[PickupRule],
    include_reference_day: bool,
) -> Vec<Pickup> {
    let today = reference.weekday().num_days_from_sunday() as i64;
    let midnight = reference.date().and_time(chrono::NaiveTime::MIN);

    rules
        .iter()
        .map(|rule| {
            let day = (rule.weekday % 7) as i64;
            let mut days_to_add = day - today;
            if days_to_add < 0 {
                days_to_add += 7;
            } else if days_to_add == 0 && !include_reference_day {
                days_to_add = 7;
            }
            Pickup {
                date: midnight + Duration::days(days_to_add),
                weekday: rule.weekday,
                hours: rule.hours.clone(),
            }
        })
        .collect()
}

/// Subscription validity: from the first pickup after payment, four weeks
/// plus the delivery buffer
pub fn compute_subscription_window(
    payment_date: NaiveDateTime,
    rules: &[PickupRule],
    delivery_delay_hours: i64,
) -> AppResult<SubscriptionWindow> {
    validate_pickup_rules(rules)?;

    let pickups = compute_pickups(payment_date, rules, true);
    // validated non-empty above
    let start = pickups
        .iter()
        .map(|p| p.date)
        .min()
        .unwrap_or(payment_date);
    let end = start + Duration::weeks(SUBSCRIPTION_WEEKS) + Duration::hours(delivery_delay_hours);

    Ok(SubscriptionWindow { start, end })
}
