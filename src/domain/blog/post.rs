use std::collections::HashMap;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::{
    domain::{
        blog::category::{CATEGORY_ACTIVE, CategoryBrief},
        search_filter::{
            FilterRegistry, Searchable,
            filters::{POST_FILTERS, PostQuery},
        },
        user::Author,
    },
    schema::{blog_categories, blog_post_categories, blog_posts, users},
};

pub const NO_IMAGE: &str = "No Image";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum PostStatus {
    Draft = 0,
    Published = 1,
    Archived = 2,
    Scheduled = 3,
}

impl PostStatus {
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(PostStatus::Draft),
            1 => Some(PostStatus::Published),
            2 => Some(PostStatus::Archived),
            3 => Some(PostStatus::Scheduled),
            _ => None,
        }
    }
}

/// Lower-cased form persisted in `blog_posts.title`.
pub fn store_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// First character upper-cased, rest as stored.
pub fn display_title(stored: &str) -> String {
    let mut chars = stored.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn display_thumb(thumb: Option<&str>) -> String {
    thumb.unwrap_or(NO_IMAGE).to_owned()
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = blog_posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: i64,
    pub author_id: Option<i64>,
    pub title: String,
    pub short: String,
    pub content: String,
    pub thumb: Option<String>,
    pub status: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Insertable)]
#[diesel(table_name = blog_posts)]
pub struct PostInsertable {
    pub author_id: Option<i64>,
    pub title: String,
    pub short: String,
    pub content: String,
    pub thumb: Option<String>,
    pub status: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(AsChangeset)]
#[diesel(table_name = blog_posts)]
pub struct PostChangeset {
    pub title: String,
    pub short: String,
    pub content: String,
    pub thumb: Option<String>,
    pub status: Option<i16>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Status 3 takes both timestamps from `scheduled_at` (default now); anything
/// else is stamped now. Returns `(status, created_at, updated_at)`.
pub fn resolve_timestamps(
    status: Option<PostStatus>,
    scheduled_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (PostStatus, DateTime<Utc>, DateTime<Utc>) {
    match status {
        Some(PostStatus::Scheduled) => {
            let at = scheduled_at.unwrap_or(now);
            (PostStatus::Scheduled, at, at)
        }
        Some(other) => (other, now, now),
        None => (PostStatus::Published, now, now),
    }
}

/// Edits keep the stored status and `created_at` unless a status is sent; status 3
/// moves both timestamps to `scheduled_at` (default now).
/// Returns `(status, created_at, updated_at)` for the changeset.
pub fn resolve_update_timestamps(
    status: Option<PostStatus>,
    scheduled_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (Option<i16>, Option<DateTime<Utc>>, DateTime<Utc>) {
    match status {
        Some(PostStatus::Scheduled) => {
            let at = scheduled_at.unwrap_or(now);
            (Some(PostStatus::Scheduled.as_i16()), Some(at), at)
        }
        Some(other) => (Some(other.as_i16()), None, now),
        None => (None, None, now),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostRelation {
    Categories,
    Author,
}

pub const ALL_POST_RELATIONS: [PostRelation; 2] = [PostRelation::Categories, PostRelation::Author];

#[derive(Debug, Clone)]
pub struct LoadedPost {
    pub post: Post,
    pub categories: Option<Vec<CategoryBrief>>,
    pub author: Option<Author>,
}

impl Post {
    pub fn published_base() -> PostQuery {
        blog_posts::table
            .filter(blog_posts::status.eq(PostStatus::Published.as_i16()))
            .filter(blog_posts::deleted_at.is_null())
            .into_boxed()
    }

    pub fn listing_base() -> PostQuery {
        blog_posts::table
            .filter(blog_posts::deleted_at.is_null())
            .into_boxed()
    }

    pub fn trash_base() -> PostQuery {
        blog_posts::table
            .filter(blog_posts::deleted_at.is_not_null())
            .into_boxed()
    }

    pub async fn find_published(conn: &mut AsyncPgConnection, id: i64) -> QueryResult<Option<Post>> {
        Post::published_base()
            .filter(blog_posts::id.eq(id))
            .first::<Post>(conn)
            .await
            .optional()
    }

    pub async fn insert_one(conn: &mut AsyncPgConnection, new_post: PostInsertable) -> QueryResult<Post> {
        diesel::insert_into(blog_posts::table)
            .values(new_post)
            .returning(Post::as_returning())
            .get_result(conn)
            .await
    }

    /// Trashed posts are not editable.
    pub async fn update_one(
        conn: &mut AsyncPgConnection,
        id: i64,
        changes: PostChangeset,
    ) -> QueryResult<Option<Post>> {
        diesel::update(
            blog_posts::table
                .find(id)
                .filter(blog_posts::deleted_at.is_null()),
        )
        .set(changes)
        .returning(Post::as_returning())
        .get_result(conn)
        .await
        .optional()
    }

    /// Replaces the post's category set. Unknown category ids are dropped.
    pub async fn sync_categories(
        conn: &mut AsyncPgConnection,
        post_id: i64,
        category_ids: &[i64],
    ) -> QueryResult<Vec<i64>> {
        diesel::delete(blog_post_categories::table.filter(blog_post_categories::post_id.eq(post_id)))
            .execute(conn)
            .await?;

        if category_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut existing: Vec<i64> = blog_categories::table
            .filter(blog_categories::id.eq_any(category_ids.to_vec()))
            .select(blog_categories::id)
            .load(conn)
            .await?;
        existing.sort_unstable();
        existing.dedup();

        let rows: Vec<_> = existing
            .iter()
            .map(|category_id| {
                (
                    blog_post_categories::post_id.eq(post_id),
                    blog_post_categories::category_id.eq(*category_id),
                )
            })
            .collect();

        if !rows.is_empty() {
            diesel::insert_into(blog_post_categories::table)
                .values(rows)
                .execute(conn)
                .await?;
        }

        Ok(existing)
    }

    pub async fn soft_delete(conn: &mut AsyncPgConnection, id: i64) -> QueryResult<bool> {
        diesel::update(
            blog_posts::table
                .find(id)
                .filter(blog_posts::deleted_at.is_null()),
        )
        .set(blog_posts::deleted_at.eq(Some(Utc::now())))
        .execute(conn)
        .await
        .map(|affected| affected > 0)
    }

    /// Removes the post and its category links.
    pub async fn force_delete(conn: &mut AsyncPgConnection, id: i64) -> QueryResult<bool> {
        diesel::delete(blog_post_categories::table.filter(blog_post_categories::post_id.eq(id)))
            .execute(conn)
            .await?;
        diesel::delete(blog_posts::table.find(id))
            .execute(conn)
            .await
            .map(|affected| affected > 0)
    }

    pub async fn restore(conn: &mut AsyncPgConnection, id: i64) -> QueryResult<Option<Post>> {
        diesel::update(blog_posts::table.find(id))
            .set(blog_posts::deleted_at.eq(None::<DateTime<Utc>>))
            .returning(Post::as_returning())
            .get_result(conn)
            .await
            .optional()
    }
}

impl Searchable for Post {
    type Query = PostQuery;
    type Row = Post;
    type Relation = PostRelation;
    type Loaded = LoadedPost;

    fn registry() -> &'static FilterRegistry<PostQuery> {
        &POST_FILTERS
    }

    async fn count(query: PostQuery, conn: &mut AsyncPgConnection) -> QueryResult<i64> {
        query.count().get_result(conn).await
    }

    async fn load(
        query: PostQuery,
        window: Option<(i64, i64)>,
        conn: &mut AsyncPgConnection,
    ) -> QueryResult<Vec<Post>> {
        let query = query.then_order_by(blog_posts::id.asc());
        match window {
            Some((limit, offset)) => query.limit(limit).offset(offset).load(conn).await,
            None => query.load(conn).await,
        }
    }

    async fn attach(
        rows: Vec<Post>,
        with: &[PostRelation],
        conn: &mut AsyncPgConnection,
    ) -> QueryResult<Vec<LoadedPost>> {
        let with_categories = with.contains(&PostRelation::Categories);
        let with_author = with.contains(&PostRelation::Author);

        let mut categories_by_post: HashMap<i64, Vec<CategoryBrief>> = HashMap::new();
        if with_categories && !rows.is_empty() {
            let post_ids: Vec<i64> = rows.iter().map(|p| p.id).collect();
            let pairs: Vec<(i64, CategoryBrief)> = blog_post_categories::table
                .inner_join(blog_categories::table)
                .filter(blog_post_categories::post_id.eq_any(post_ids))
                .filter(blog_categories::status.eq(CATEGORY_ACTIVE))
                .filter(blog_categories::deleted_at.is_null())
                .order(blog_categories::id.asc())
                .select((blog_post_categories::post_id, CategoryBrief::as_select()))
                .load(conn)
                .await?;

            for (post_id, category) in pairs {
                categories_by_post.entry(post_id).or_default().push(category);
            }
        }

        let mut authors: HashMap<i64, Author> = HashMap::new();
        if with_author {
            let mut author_ids: Vec<i64> = rows.iter().filter_map(|p| p.author_id).collect();
            author_ids.sort_unstable();
            author_ids.dedup();

            if !author_ids.is_empty() {
                let found: Vec<Author> = users::table
                    .filter(users::id.eq_any(author_ids))
                    .select(Author::as_select())
                    .load(conn)
                    .await?;
                authors.extend(found.into_iter().map(|a| (a.id, a)));
            }
        }

        Ok(rows
            .into_iter()
            .map(|post| LoadedPost {
                categories: with_categories
                    .then(|| categories_by_post.remove(&post.id).unwrap_or_default()),
                author: post.author_id.and_then(|id| authors.get(&id).cloned()),
                post,
            })
            .collect())
    }
}

impl LoadedPost {
    /// A freshly written post; relations are filled in by the caller if needed.
    pub fn bare(post: Post) -> Self {
        LoadedPost {
            post,
            categories: None,
            author: None,
        }
    }
}
