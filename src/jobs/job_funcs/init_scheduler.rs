use std::sync::Arc;

use chrono::Weekday;
use tracing::{error, info};

use crate::{
    init::state::ServerState,
    jobs::{
        auth::invalidate_sessions::invalidate_sessions,
        blog::{empty_trash::empty_trash, publish_scheduled_posts::publish_scheduled_posts},
        job_funcs::schedule::{Schedule, schedule_task},
        maintenance::clear_logs::clear_old_logs,
    },
};

pub const PUBLISH_SCHEDULED_POSTS: &str = "PUBLISH_SCHEDULED_POSTS";
pub const EMPTY_TRASH: &str = "EMPTY_TRASH";
pub const INVALIDATE_EXPIRED_SESSIONS: &str = "INVALIDATE_EXPIRED_SESSIONS";
pub const CLEAR_OLD_LOGS: &str = "CLEAR_OLD_LOGS";

fn spawn_scheduled<F, Fut>(
    state: &Arc<ServerState>,
    task: F,
    task_descriptor: &'static str,
    schedule: Schedule,
) where
    F: Fn(Arc<ServerState>) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let coroutine_state = Arc::clone(state);
    tokio::spawn(async move {
        if let Err(e) = schedule_task(coroutine_state, task, task_descriptor, schedule).await {
            error!(task_name = %task_descriptor, error = ?e, "Scheduled task stopped");
        }
    });
}

pub async fn task_init(state: Arc<ServerState>) -> anyhow::Result<()> {
    info!("Task scheduler running...");

    spawn_scheduled(
        &state,
        publish_scheduled_posts,
        PUBLISH_SCHEDULED_POSTS,
        Schedule::EveryMinute { second: 0 },
    );

    spawn_scheduled(
        &state,
        empty_trash,
        EMPTY_TRASH,
        Schedule::Daily {
            hour: 0,
            minute: 0,
            second: 0,
        },
    );

    spawn_scheduled(
        &state,
        invalidate_sessions,
        INVALIDATE_EXPIRED_SESSIONS,
        Schedule::Hourly {
            minute: 30,
            second: 0,
        },
    );

    spawn_scheduled(
        &state,
        clear_old_logs,
        CLEAR_OLD_LOGS,
        Schedule::Weekly {
            weekday: Weekday::Sun,
            hour: 0,
            minute: 0,
            second: 0,
        },
    );

    Ok(())
}
