//! Cron evaluation for [`Recurrence`].

use chrono::{DateTime, Utc};
use cron::Schedule;
use keymagic_core::{Error, Recurrence, Result};
use std::str::FromStr;

/// Parse the cron expression behind a recurrence.
pub fn parse_recurrence(recurrence: &Recurrence) -> Result<Schedule> {
    let expr = recurrence.cron_expression();
    Schedule::from_str(expr)
        .map_err(|e| Error::Schedule(format!("Invalid cron expression {:?}: {}", expr, e)))
}

/// First fire time strictly after `after`.
pub fn next_fire(schedule: &Schedule, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule.after(&after).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_daily_fires_at_midnight() {
        let schedule = parse_recurrence(&Recurrence::Daily).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap();

        let next = next_fire(&schedule, now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_hourly() {
        let schedule = parse_recurrence(&Recurrence::Hourly).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap();

        let next = next_fire(&schedule, now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 10, 16, 0, 0).unwrap());
    }

    #[test]
    fn test_invalid_expression() {
        let err = parse_recurrence(&Recurrence::Cron("every day".to_string())).unwrap_err();
        assert!(matches!(err, Error::Schedule(_)));
    }
}
