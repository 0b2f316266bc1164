use std::convert::Infallible;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde_derive::Serialize;

use crate::{
    domain::search_filter::{
        FilterRegistry, Searchable,
        filters::{CATEGORY_FILTERS, CategoryQuery},
    },
    schema::{blog_categories, blog_post_categories},
};

pub const CATEGORY_ACTIVE: i16 = 1;
pub const CATEGORY_INACTIVE: i16 = 0;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = blog_categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Category {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub content: Option<String>,
    pub status: i16,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// How a category is embedded in a post.
#[derive(Debug, Clone, Serialize, Queryable, Selectable)]
#[diesel(table_name = blog_categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryBrief {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Queryable, Selectable)]
#[diesel(table_name = blog_categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryChild {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = blog_categories)]
#[diesel(treat_none_as_null = true)]
pub struct CategoryForm {
    pub parent_id: Option<i64>,
    pub name: String,
    pub content: Option<String>,
    pub status: i16,
}

impl Category {
    /// Active, top-level, not trashed.
    pub fn public_base() -> CategoryQuery {
        blog_categories::table
            .filter(blog_categories::status.eq(CATEGORY_ACTIVE))
            .filter(blog_categories::parent_id.is_null())
            .filter(blog_categories::deleted_at.is_null())
            .into_boxed()
    }

    /// Top-level, any status, not trashed.
    pub fn listing_base() -> CategoryQuery {
        blog_categories::table
            .filter(blog_categories::parent_id.is_null())
            .filter(blog_categories::deleted_at.is_null())
            .into_boxed()
    }

    /// Trashed categories under `parent_id`, or top-level ones when `None`.
    pub fn trash_base(parent_id: Option<i64>) -> CategoryQuery {
        let query = blog_categories::table
            .filter(blog_categories::deleted_at.is_not_null())
            .into_boxed();
        match parent_id {
            Some(parent_id) => query.filter(blog_categories::parent_id.eq(parent_id)),
            None => query.filter(blog_categories::parent_id.is_null()),
        }
    }

    pub fn children_base(parent_id: i64) -> CategoryQuery {
        blog_categories::table
            .filter(blog_categories::parent_id.eq(parent_id))
            .filter(blog_categories::status.eq(CATEGORY_ACTIVE))
            .filter(blog_categories::deleted_at.is_null())
            .into_boxed()
    }

    /// Any status, trashed or not.
    pub async fn find(conn: &mut AsyncPgConnection, id: i64) -> QueryResult<Option<Category>> {
        blog_categories::table
            .find(id)
            .select(Category::as_select())
            .first(conn)
            .await
            .optional()
    }

    pub async fn find_active(
        conn: &mut AsyncPgConnection,
        id: i64,
    ) -> QueryResult<Option<Category>> {
        blog_categories::table
            .find(id)
            .filter(blog_categories::status.eq(CATEGORY_ACTIVE))
            .filter(blog_categories::deleted_at.is_null())
            .select(Category::as_select())
            .first(conn)
            .await
            .optional()
    }

    pub async fn find_parent(
        conn: &mut AsyncPgConnection,
        parent_id: Option<i64>,
    ) -> QueryResult<Option<CategoryBrief>> {
        let Some(parent_id) = parent_id else {
            return Ok(None);
        };
        blog_categories::table
            .find(parent_id)
            .filter(blog_categories::status.eq(CATEGORY_ACTIVE))
            .filter(blog_categories::deleted_at.is_null())
            .select(CategoryBrief::as_select())
            .first(conn)
            .await
            .optional()
    }

    /// Any row with that id counts, trashed or not.
    pub async fn exists(conn: &mut AsyncPgConnection, id: i64) -> QueryResult<bool> {
        diesel::select(diesel::dsl::exists(blog_categories::table.find(id)))
            .get_result(conn)
            .await
    }

    pub async fn insert_one(conn: &mut AsyncPgConnection, form: CategoryForm) -> QueryResult<Category> {
        diesel::insert_into(blog_categories::table)
            .values(form)
            .returning(Category::as_returning())
            .get_result(conn)
            .await
    }

    pub async fn update_one(
        conn: &mut AsyncPgConnection,
        id: i64,
        form: CategoryForm,
    ) -> QueryResult<Option<Category>> {
        diesel::update(
            blog_categories::table
                .find(id)
                .filter(blog_categories::deleted_at.is_null()),
        )
        .set(form)
        .returning(Category::as_returning())
        .get_result(conn)
        .await
        .optional()
    }

    /// `false` when there is no live row to trash.
    pub async fn soft_delete(conn: &mut AsyncPgConnection, id: i64) -> QueryResult<bool> {
        diesel::update(
            blog_categories::table
                .find(id)
                .filter(blog_categories::deleted_at.is_null()),
        )
        .set(blog_categories::deleted_at.eq(Some(Utc::now())))
        .execute(conn)
        .await
        .map(|affected| affected > 0)
    }

    /// Removes the category and its post links. Child categories follow through the
    /// `parent_id` ON DELETE CASCADE.
    pub async fn force_delete(conn: &mut AsyncPgConnection, id: i64) -> QueryResult<bool> {
        diesel::delete(
            blog_post_categories::table.filter(blog_post_categories::category_id.eq(id)),
        )
        .execute(conn)
        .await?;
        diesel::delete(blog_categories::table.find(id))
            .execute(conn)
            .await
            .map(|affected| affected > 0)
    }

    pub async fn restore(conn: &mut AsyncPgConnection, id: i64) -> QueryResult<Option<Category>> {
        diesel::update(blog_categories::table.find(id))
            .set(blog_categories::deleted_at.eq(None::<DateTime<Utc>>))
            .returning(Category::as_returning())
            .get_result(conn)
            .await
            .optional()
    }
}

impl Searchable for Category {
    type Query = CategoryQuery;
    type Row = Category;
    type Relation = Infallible;
    type Loaded = Category;

    fn registry() -> &'static FilterRegistry<CategoryQuery> {
        &CATEGORY_FILTERS
    }

    async fn count(query: CategoryQuery, conn: &mut AsyncPgConnection) -> QueryResult<i64> {
        query.count().get_result(conn).await
    }

    async fn load(
        query: CategoryQuery,
        window: Option<(i64, i64)>,
        conn: &mut AsyncPgConnection,
    ) -> QueryResult<Vec<Category>> {
        let query = query.then_order_by(blog_categories::id.asc());
        match window {
            Some((limit, offset)) => query.limit(limit).offset(offset).load(conn).await,
            None => query.load(conn).await,
        }
    }

    async fn attach(
        rows: Vec<Category>,
        _with: &[Infallible],
        _conn: &mut AsyncPgConnection,
    ) -> QueryResult<Vec<Category>> {
        Ok(rows)
    }
}
