use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::anyhow;
use chrono::Utc;
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, Tokio1Executor};
use uuid::Uuid;

use crate::init::config::ServerConfig;

use super::builder::ServerStateBuilder;
use super::session::Session;

pub struct ServerState {
    pub(crate) server_start_time: tokio::time::Instant,
    pub(crate) pool: Pool<AsyncPgConnection>,
    pub(crate) responses_handled: AtomicU64,
    pub(crate) email_client: AsyncSmtpTransport<Tokio1Executor>,
    pub(crate) mail_from: Mailbox,
    pub(crate) session_map: scc::HashMap<Uuid, Session>, // token -> session
    pub(crate) config: ServerConfig,
}

impl ServerState {
    pub fn builder() -> ServerStateBuilder {
        ServerStateBuilder::default()
    }

    pub async fn new_session(&self, user_id: i64) -> anyhow::Result<Uuid> {
        let token = Uuid::new_v4();
        let session = Session::new(token, user_id, Utc::now(), self.config.token_valid_for);

        self.session_map
            .insert_async(token, session)
            .await
            .map_err(|_| anyhow!("Failed to insert session into scc::HashMap; key already exists!"))?;

        Ok(token)
    }

    pub async fn get_session(&self, token: &Uuid) -> anyhow::Result<Session> {
        self.session_map
            .read_async(token, |_, v| v.clone())
            .await
            .ok_or_else(|| anyhow!("Session not found"))
    }

    pub async fn remove_session(&self, token: Uuid) -> anyhow::Result<(Uuid, usize)> {
        match self.session_map.remove_async(&token).await {
            Some((token, _)) => Ok((token, self.session_map.len())),
            None => Err(anyhow!("Session map out of sync!")),
        }
    }

    pub async fn purge_expired_sessions(&self) -> (usize, usize) {
        let now = Utc::now();
        let (mut pruned, mut remaining): (usize, usize) = (0, 0);

        self.session_map
            .iter_mut_async(|entry| {
                if entry.is_unexpired_at(now) {
                    remaining += 1;
                } else {
                    pruned += 1;
                    let _ = entry.consume();
                }
                true
            })
            .await;

        (pruned, remaining)
    }

    /// Drops every token issued to `user_id`; returns how many were removed.
    pub async fn revoke_user_sessions(&self, user_id: i64) -> usize {
        let mut revoked: usize = 0;

        self.session_map
            .iter_mut_async(|entry| {
                if entry.user_id == user_id {
                    revoked += 1;
                    let _ = entry.consume();
                }
                true
            })
            .await;

        revoked
    }

    pub fn get_uptime(&self) -> tokio::time::Duration {
        self.server_start_time.elapsed()
    }

    pub async fn get_conn(&self) -> anyhow::Result<PooledConnection<'_, AsyncPgConnection>> {
        Ok(self.pool.get().await?)
    }

    pub fn get_email_client(&self) -> &AsyncSmtpTransport<Tokio1Executor> {
        &self.email_client
    }

    pub fn get_mail_from(&self) -> &Mailbox {
        &self.mail_from
    }

    pub fn get_pagination_number(&self) -> i64 {
        self.config.pagination_number
    }

    pub fn get_throttle_per_minute(&self) -> u32 {
        self.config.throttle_per_minute
    }

    pub fn get_logs_dir(&self) -> &str {
        &self.config.logs_dir
    }

    pub fn get_responses_handled(&self) -> u64 {
        self.responses_handled.load(Ordering::SeqCst)
    }

    pub fn add_responses_handled(&self) {
        self.responses_handled.fetch_add(1, Ordering::SeqCst);
    }
}
