use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration, Timelike, Utc};

/// Next `XX:YY:second_offset` strictly after `now`.
pub fn next_minute_mark(now: DateTime<Utc>, second_offset: u32) -> Result<DateTime<Utc>> {
    if second_offset > 59 {
        return Err(anyhow!(
            "Invalid offset for per-minute schedule: second_offset={second_offset}"
        ));
    }

    let truncated_to_minute = now
        .with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .ok_or_else(|| anyhow!("Could not truncate {now} to the minute."))?;

    let target_time = truncated_to_minute + Duration::seconds(second_offset as i64);
    if target_time <= now {
        return Ok(target_time + Duration::minutes(1));
    }

    Ok(target_time)
}
