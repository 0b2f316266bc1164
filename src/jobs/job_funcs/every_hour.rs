use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration, Timelike, Utc};

/// Next `XX:minute_offset:second_offset` strictly after `now`.
pub fn next_hour_mark(
    now: DateTime<Utc>,
    minute_offset: u32,
    second_offset: u32,
) -> Result<DateTime<Utc>> {
    if minute_offset > 59 || second_offset > 59 {
        return Err(anyhow!(
            "Invalid offset for hourly schedule: minute_offset={minute_offset}, second_offset={second_offset}"
        ));
    }

    let truncated_to_hour = now
        .with_minute(0)
        .and_then(|dt| dt.with_second(0))
        .and_then(|dt| dt.with_nanosecond(0))
        .ok_or_else(|| anyhow!("Could not truncate {now} to the hour."))?;

    let target_time = truncated_to_hour
        + Duration::minutes(minute_offset as i64)
        + Duration::seconds(second_offset as i64);

    if target_time <= now {
        return Ok(target_time + Duration::hours(1));
    }

    Ok(target_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_half_past() {
        let before = Utc.with_ymd_and_hms(2024, 5, 1, 10, 5, 0).unwrap();
        assert_eq!(
            next_hour_mark(before, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap()
        );

        let on_the_mark = Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap();
        assert_eq!(
            next_hour_mark(on_the_mark, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 1, 11, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_rejects_bad_offset() {
        assert!(next_hour_mark(Utc::now(), 60, 0).is_err());
    }
}
