use std::sync::Arc;

use tracing::info;

use crate::init::state::ServerState;

pub async fn invalidate_sessions(state: Arc<ServerState>) {
    let (pruned, remaining) = state.purge_expired_sessions().await;
    info!(pruned, remaining, "Expired sessions invalidated");
}
