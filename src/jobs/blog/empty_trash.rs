use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use diesel::{
    pg::Pg,
    prelude::*,
    sql_types::{Bool, Nullable},
};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::{error, info};

use crate::{
    init::state::ServerState,
    schema::{blog_categories, blog_post_categories, blog_posts},
};

/// How long a soft-deleted row stays restorable.
pub const TRASH_RETENTION: Duration = Duration::days(30);

pub fn purge_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - TRASH_RETENTION
}

type TrashPredicate<T> = Box<dyn BoxableExpression<T, Pg, SqlType = Nullable<Bool>>>;

pub fn purgeable_posts(cutoff: DateTime<Utc>) -> TrashPredicate<blog_posts::table> {
    Box::new(blog_posts::deleted_at.le(cutoff))
}

pub fn purgeable_categories(cutoff: DateTime<Utc>) -> TrashPredicate<blog_categories::table> {
    Box::new(blog_categories::deleted_at.le(cutoff))
}

pub async fn purge_posts(conn: &mut AsyncPgConnection, cutoff: DateTime<Utc>) -> QueryResult<usize> {
    let ids: Vec<i64> = blog_posts::table
        .filter(purgeable_posts(cutoff))
        .select(blog_posts::id)
        .load(conn)
        .await?;
    if ids.is_empty() {
        return Ok(0);
    }

    diesel::delete(blog_post_categories::table.filter(blog_post_categories::post_id.eq_any(ids.clone())))
        .execute(conn)
        .await?;
    diesel::delete(blog_posts::table.filter(blog_posts::id.eq_any(ids)))
        .execute(conn)
        .await
}

/// Children of a purged category go with it through the `parent_id` cascade.
pub async fn purge_categories(
    conn: &mut AsyncPgConnection,
    cutoff: DateTime<Utc>,
) -> QueryResult<usize> {
    let ids: Vec<i64> = blog_categories::table
        .filter(purgeable_categories(cutoff))
        .select(blog_categories::id)
        .load(conn)
        .await?;
    if ids.is_empty() {
        return Ok(0);
    }

    diesel::delete(
        blog_post_categories::table.filter(blog_post_categories::category_id.eq_any(ids.clone())),
    )
    .execute(conn)
    .await?;
    diesel::delete(blog_categories::table.filter(blog_categories::id.eq_any(ids)))
        .execute(conn)
        .await
}

fn report(kind: &'static str, outcome: QueryResult<usize>) {
    match outcome {
        Ok(0) => info!(kind, "No trashed rows old enough to purge"),
        Ok(purged) => info!(kind, purged, "Trashed rows permanently deleted"),
        Err(e) => error!(kind, error = %e, "Failed to empty trash"),
    }
}

/// Posts and categories are purged independently; one failing does not stop the other.
pub async fn empty_trash(state: Arc<ServerState>) {
    let mut conn = match state.get_conn().await {
        Ok(conn) => conn,
        Err(e) => {
            error!(error = ?e, "Could not get a connection to empty trash");
            return;
        }
    };

    let cutoff = purge_cutoff(Utc::now());
    report("posts", purge_posts(&mut conn, cutoff).await);
    report("categories", purge_categories(&mut conn, cutoff).await);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_purgeable(deleted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        deleted_at <= purge_cutoff(now)
    }

    #[test]
    fn test_retention_boundary() {
        let now = Utc::now();
        assert!(!is_purgeable(now - Duration::days(29), now));
        assert!(is_purgeable(now - Duration::days(30), now));
        assert!(is_purgeable(now - Duration::days(30) - Duration::seconds(1), now));
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_purge_keeps_recent_trash() {
        use crate::util::test_support::{TestDb, insert_category, insert_post};

        let db = TestDb::start().await;
        let mut conn = db.conn().await;
        let now = Utc::now();
        let expired = now - TRASH_RETENTION - Duration::seconds(1);
        let recent = now - Duration::days(29);

        let old_post = insert_post(&mut conn, "old", 1, now).await;
        let new_post = insert_post(&mut conn, "new", 1, now).await;
        let old_category = insert_category(&mut conn, "Old", None).await;
        let new_category = insert_category(&mut conn, "New", None).await;

        for (id, deleted_at) in [(old_post.id, expired), (new_post.id, recent)] {
            diesel::update(blog_posts::table.find(id))
                .set(blog_posts::deleted_at.eq(Some(deleted_at)))
                .execute(&mut conn)
                .await
                .unwrap();
        }
        for (id, deleted_at) in [(old_category.id, expired), (new_category.id, recent)] {
            diesel::update(blog_categories::table.find(id))
                .set(blog_categories::deleted_at.eq(Some(deleted_at)))
                .execute(&mut conn)
                .await
                .unwrap();
        }

        let cutoff = purge_cutoff(now);
        assert_eq!(purge_posts(&mut conn, cutoff).await.unwrap(), 1);
        assert_eq!(purge_categories(&mut conn, cutoff).await.unwrap(), 1);

        let posts: Vec<i64> = blog_posts::table.select(blog_posts::id).load(&mut conn).await.unwrap();
        assert_eq!(posts, vec![new_post.id]);
        let categories: Vec<i64> = blog_categories::table
            .select(blog_categories::id)
            .load(&mut conn)
            .await
            .unwrap();
        assert_eq!(categories, vec![new_category.id]);
    }

    #[test]
    fn test_purge_only_targets_old_trash() {
        let cutoff = purge_cutoff(Utc::now());
        let query = blog_posts::table
            .filter(purgeable_posts(cutoff))
            .select(blog_posts::id);
        let sql = diesel::debug_query::<Pg, _>(&query).to_string();
        assert!(sql.contains(r#""blog_posts"."deleted_at" <= $1"#), "{sql}");

        let query = blog_categories::table
            .filter(purgeable_categories(cutoff))
            .select(blog_categories::id);
        let sql = diesel::debug_query::<Pg, _>(&query).to_string();
        assert!(sql.contains(r#""blog_categories"."deleted_at" <= $1"#), "{sql}");
    }
}
