use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, Utc, Weekday};

use super::every_day::{check_time_of_day, start_of_day};

/// Next `weekday hour:minute:second` UTC strictly after `now`.
pub fn next_week_mark(
    now: DateTime<Utc>,
    weekday: Weekday,
    hour_offset: u32,
    minute_offset: u32,
    second_offset: u32,
) -> Result<DateTime<Utc>> {
    let offset = check_time_of_day(hour_offset, minute_offset, second_offset)?;

    let days_ahead = (weekday.num_days_from_monday() as i64
        - now.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);

    let target_time = start_of_day(now)? + Duration::days(days_ahead) + offset;
    if target_time <= now {
        return Ok(target_time + Duration::weeks(1));
    }

    Ok(target_time)
}
