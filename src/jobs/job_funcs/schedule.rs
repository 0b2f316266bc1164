use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc, Weekday};
use tracing::{error, info};

use crate::{init::state::ServerState, util::time::duration_formatter::format_duration};

use super::{
    every_day::next_day_mark, every_hour::next_hour_mark, every_minute::next_minute_mark,
    every_week::next_week_mark,
};

/// A wall-clock cadence in UTC.
#[derive(Debug, Clone, Copy)]
pub enum Schedule {
    EveryMinute {
        second: u32,
    },
    Hourly {
        minute: u32,
        second: u32,
    },
    Daily {
        hour: u32,
        minute: u32,
        second: u32,
    },
    Weekly {
        weekday: Weekday,
        hour: u32,
        minute: u32,
        second: u32,
    },
}

impl Schedule {
    pub fn next_after(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        match *self {
            Schedule::EveryMinute { second } => next_minute_mark(now, second),
            Schedule::Hourly { minute, second } => next_hour_mark(now, minute, second),
            Schedule::Daily {
                hour,
                minute,
                second,
            } => next_day_mark(now, hour, minute, second),
            Schedule::Weekly {
                weekday,
                hour,
                minute,
                second,
            } => next_week_mark(now, weekday, hour, minute, second),
        }
    }
}

/// Runs `task` forever at each mark of `schedule`. Returns only if the schedule itself
/// is malformed.
pub async fn schedule_task<F, Fut>(
    state: Arc<ServerState>,
    task: F,
    task_descriptor: &'static str,
    schedule: Schedule,
) -> Result<()>
where
    F: Fn(Arc<ServerState>) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let first_run = schedule.next_after(Utc::now())?;
    info!(
        task_name = %task_descriptor,
        ?schedule,
        initial_run_time = %first_run.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        "Scheduled task initialized."
    );

    loop {
        let now = Utc::now();
        let next_mark = match schedule.next_after(now) {
            Ok(mark) => mark,
            Err(e) => {
                error!(task_name = %task_descriptor, error = ?e, "Could not calculate next scheduled time");
                tokio::time::sleep(std::time::Duration::from_secs(10)).await;
                continue;
            }
        };

        // next_after is strictly in the future, so this only fails on clock skew
        let delay = (next_mark - now).to_std().unwrap_or_default();
        tokio::time::sleep(delay).await;

        let start = tokio::time::Instant::now();
        task(Arc::clone(&state)).await;
        let elapsed = start.elapsed();

        info!(
            task_name = %task_descriptor,
            duration = %format_duration(elapsed),
            "Scheduled task ran!"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_schedule_dispatch() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 20).unwrap();

        let minute = Schedule::EveryMinute { second: 0 }.next_after(now).unwrap();
        assert_eq!(minute, Utc.with_ymd_and_hms(2024, 5, 1, 10, 16, 0).unwrap());

        let hourly = Schedule::Hourly {
            minute: 30,
            second: 0,
        }
        .next_after(now)
        .unwrap();
        assert_eq!(hourly, Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap());

        let daily = Schedule::Daily {
            hour: 0,
            minute: 0,
            second: 0,
        }
        .next_after(now)
        .unwrap();
        assert_eq!(daily, Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_malformed_schedule_errors() {
        let bad = Schedule::Daily {
            hour: 25,
            minute: 0,
            second: 0,
        };
        assert!(bad.next_after(Utc::now()).is_err());
    }
}
