use std::sync::atomic::AtomicU64;

use anyhow::anyhow;
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::bb8::Pool;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, Tokio1Executor};

use crate::init::config::ServerConfig;

use super::server_state::ServerState;

#[derive(Default)]
pub struct ServerStateBuilder {
    server_start_time: Option<tokio::time::Instant>,
    pool: Option<Pool<AsyncPgConnection>>,
    email_client: Option<AsyncSmtpTransport<Tokio1Executor>>,
    mail_from: Option<Mailbox>,
    config: Option<ServerConfig>,
}

impl ServerStateBuilder {
    pub fn server_start_time(mut self, server_start_time: tokio::time::Instant) -> Self {
        self.server_start_time = Some(server_start_time);
        self
    }

    pub fn pool(mut self, pool: Pool<AsyncPgConnection>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn email_client(mut self, email_client: AsyncSmtpTransport<Tokio1Executor>) -> Self {
        self.email_client = Some(email_client);
        self
    }

    pub fn mail_from(mut self, mail_from: Mailbox) -> Self {
        self.mail_from = Some(mail_from);
        self
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> anyhow::Result<ServerState> {
        Ok(ServerState {
            server_start_time: self
                .server_start_time
                .ok_or_else(|| anyhow!("server_start_time is required"))?,
            pool: self.pool.ok_or_else(|| anyhow!("pool is required"))?,
            responses_handled: AtomicU64::new(0u64),
            email_client: self
                .email_client
                .ok_or_else(|| anyhow!("email_client is required"))?,
            mail_from: self.mail_from.ok_or_else(|| anyhow!("mail_from is required"))?,
            session_map: scc::HashMap::new(),
            config: self.config.ok_or_else(|| anyhow!("config is required"))?,
        })
    }
}
