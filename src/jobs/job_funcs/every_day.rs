use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration, Timelike, Utc};

/// Midnight UTC of the day `now` falls on.
pub(super) fn start_of_day(now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    now.with_hour(0)
        .and_then(|dt| dt.with_minute(0))
        .and_then(|dt| dt.with_second(0))
        .and_then(|dt| dt.with_nanosecond(0))
        .ok_or_else(|| anyhow!("Could not truncate {now} to start-of-day."))
}

pub(super) fn check_time_of_day(hour: u32, minute: u32, second: u32) -> Result<Duration> {
    if hour > 23 || minute > 59 || second > 59 {
        return Err(anyhow!(
            "Invalid time of day for schedule: hour={hour}, minute={minute}, second={second}"
        ));
    }
    Ok(Duration::hours(hour as i64)
        + Duration::minutes(minute as i64)
        + Duration::seconds(second as i64))
}

/// Next `hour:minute:second` UTC strictly after `now`, today or tomorrow.
pub fn next_day_mark(
    now: DateTime<Utc>,
    hour_offset: u32,
    minute_offset: u32,
    second_offset: u32,
) -> Result<DateTime<Utc>> {
    let offset = check_time_of_day(hour_offset, minute_offset, second_offset)?;
    let target_time = start_of_day(now)? + offset;

    if target_time <= now {
        return Ok(target_time + Duration::days(1));
    }

    Ok(target_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_midnight_is_tomorrow() {
        let now = Utc.with_ymd_and_hms(2024, 2, 28, 0, 0, 1).unwrap();
        assert_eq!(
            next_day_mark(now, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_later_today() {
        let now = Utc.with_ymd_and_hms(2024, 2, 28, 5, 0, 0).unwrap();
        assert_eq!(
            next_day_mark(now, 6, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 28, 6, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_rejects_bad_offset() {
        assert!(next_day_mark(Utc::now(), 24, 0, 0).is_err());
        assert!(next_day_mark(Utc::now(), 0, 0, 60).is_err());
    }
}
