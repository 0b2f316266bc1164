use std::net::SocketAddr;
use std::sync::Arc;

use diesel::QueryableByName;
use diesel_async::pooled_connection::bb8::Pool;
use diesel_async::{AsyncPgConnection, RunQueryDsl, pooled_connection::AsyncDieselConnectionManager};
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, Tokio1Executor};
use tracing::info;

use crate::{
    jobs::job_funcs::init_scheduler::task_init, routers::main_router::build_router,
    util::time::duration_formatter::format_duration,
};

use super::{
    config::{DbConfig, EmailConfig, ServerConfig},
    state::ServerState,
};

#[derive(QueryableByName)]
struct PgVersion {
    #[diesel(sql_type = diesel::sql_types::Text)]
    version: String,
}

pub async fn server_init_proc(start: tokio::time::Instant) -> anyhow::Result<()> {
    let num_cores: u32 = num_cpus::get_physical() as u32;

    let server_config = ServerConfig::from_env()?;
    let db_url = DbConfig::from_env()?.to_url()?;
    let email_config = EmailConfig::from_env()?;

    let pool_config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(db_url);
    let pool = Pool::builder()
        .min_idle(Some(num_cores))
        .max_size(num_cores * 10u32)
        .build(pool_config)
        .await?;
    info!(min_idle = num_cores, max_size = num_cores * 10, "Database pool ready");

    let email_client = AsyncSmtpTransport::<Tokio1Executor>::relay(email_config.get_url())?
        .credentials(email_config.to_creds())
        .build();
    let mail_from: Mailbox = email_config.get_mail_from().parse()?;

    let bind_addr = server_config.bind_addr.clone();
    let state = Arc::new(
        ServerState::builder()
            .pool(pool)
            .server_start_time(start)
            .email_client(email_client)
            .mail_from(mail_from)
            .config(server_config)
            .build()?,
    );

    let mut conn = state.get_conn().await?;
    let pg_version: PgVersion = diesel::sql_query("SELECT version()")
        .get_result(&mut conn)
        .await?;
    drop(conn);
    info!("PostgreSQL version: {}", pg_version.version);

    task_init(Arc::clone(&state)).await?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(
        %bind_addr,
        startup_time = %format_duration(start.elapsed()),
        "Backend server starting..."
    );

    axum::serve(
        listener,
        build_router(state)?.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
