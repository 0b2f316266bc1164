use std::sync::Arc;

use chrono::{DateTime, Utc};
use diesel::{dsl::Eq, pg::Pg, prelude::*, sql_types::Bool};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::{error, info};

use crate::{domain::blog::post::PostStatus, init::state::ServerState, schema::blog_posts};

type PostPredicate = Box<dyn BoxableExpression<blog_posts::table, Pg, SqlType = Bool>>;

/// Scheduled, not trashed, and its stored publish time has arrived.
pub fn due_for_publishing(now: DateTime<Utc>) -> PostPredicate {
    Box::new(
        blog_posts::status
            .eq(PostStatus::Scheduled.as_i16())
            .and(blog_posts::created_at.le(now))
            .and(blog_posts::deleted_at.is_null()),
    )
}

fn published_at(
    now: DateTime<Utc>,
) -> (
    Eq<blog_posts::status, i16>,
    Eq<blog_posts::created_at, DateTime<Utc>>,
    Eq<blog_posts::updated_at, DateTime<Utc>>,
) {
    (
        blog_posts::status.eq(PostStatus::Published.as_i16()),
        blog_posts::created_at.eq(now),
        blog_posts::updated_at.eq(now),
    )
}

/// One bulk update; returns how many posts went live.
pub async fn publish_due_posts(
    conn: &mut AsyncPgConnection,
    now: DateTime<Utc>,
) -> QueryResult<usize> {
    diesel::update(blog_posts::table.filter(due_for_publishing(now)))
        .set(published_at(now))
        .execute(conn)
        .await
}

pub async fn publish_scheduled_posts(state: Arc<ServerState>) {
    let mut conn = match state.get_conn().await {
        Ok(conn) => conn,
        Err(e) => {
            error!(error = ?e, "Could not get a connection to publish scheduled posts");
            return;
        }
    };

    match publish_due_posts(&mut conn, Utc::now()).await {
        Ok(0) => info!("No scheduled posts are due"),
        Ok(published) => info!(published, "Scheduled posts published"),
        Err(e) => error!(error = %e, "Failed to publish scheduled posts"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_posts_predicate() {
        let now = Utc::now();
        let query = blog_posts::table.filter(due_for_publishing(now)).select(blog_posts::id);
        let sql = diesel::debug_query::<Pg, _>(&query).to_string();

        assert!(sql.contains(r#""blog_posts"."status" = $1"#), "{sql}");
        assert!(sql.contains(r#""blog_posts"."created_at" <= $2"#), "{sql}");
        assert!(sql.contains(r#""blog_posts"."deleted_at" IS NULL"#), "{sql}");
        assert!(sql.contains("binds: [3,"), "{sql}");
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_due_post_goes_live() {
        use chrono::{Duration, SubsecRound};

        use crate::{
            domain::blog::post::Post,
            util::test_support::{TestDb, insert_post},
        };

        let db = TestDb::start().await;
        let mut conn = db.conn().await;
        let now = Utc::now();
        let due = insert_post(&mut conn, "due", PostStatus::Scheduled.as_i16(), now - Duration::minutes(5)).await;
        let later = insert_post(&mut conn, "later", PostStatus::Scheduled.as_i16(), now + Duration::hours(1)).await;

        assert_eq!(publish_due_posts(&mut conn, now).await.unwrap(), 1);

        let due: Post = blog_posts::table.find(due.id).select(Post::as_select()).first(&mut conn).await.unwrap();
        assert_eq!(due.status, PostStatus::Published.as_i16());
        assert_eq!(due.created_at, now.trunc_subsecs(6));
        assert_eq!(due.updated_at, now.trunc_subsecs(6));

        let later: Post = blog_posts::table.find(later.id).select(Post::as_select()).first(&mut conn).await.unwrap();
        assert_eq!(later.status, PostStatus::Scheduled.as_i16());
    }

    #[test]
    fn test_publish_refreshes_both_timestamps() {
        let now = Utc::now();
        let statement = diesel::update(blog_posts::table.filter(due_for_publishing(now)))
            .set(published_at(now));
        let sql = diesel::debug_query::<Pg, _>(&statement).to_string();

        assert!(sql.starts_with(r#"UPDATE "blog_posts" SET"#), "{sql}");
        assert!(sql.contains(r#""created_at" = $2"#), "{sql}");
        assert!(sql.contains(r#""updated_at" = $3"#), "{sql}");
        assert!(sql.contains("binds: [1,"), "{sql}");
    }
}
