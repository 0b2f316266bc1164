use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;

use crate::schema::{blog_categories, blog_post_categories, blog_posts, users};

use super::{FilterRegistry, FilterValue};

pub type PostQuery = blog_posts::BoxedQuery<'static, Pg>;
pub type CategoryQuery = blog_categories::BoxedQuery<'static, Pg>;
pub type UserQuery = users::BoxedQuery<'static, Pg>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or a bare date (UTC midnight).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_ids(value: &FilterValue) -> Vec<i64> {
    value
        .values()
        .into_iter()
        .filter_map(|v| v.trim().parse::<i64>().ok())
        .collect()
}

fn like_pattern(value: &FilterValue) -> String {
    format!("%{}%", value.first().unwrap_or_default())
}

macro_rules! order_by_column {
    ($query:ident, $value:expr, $dir:expr, $table:ident, [$($col:ident),+ $(,)?]) => {
        match ($value.first().map(str::trim), $dir) {
            $(
                (Some(stringify!($col)), SortDirection::Asc) => $query.then_order_by($table::$col.asc()),
                (Some(stringify!($col)), SortDirection::Desc) => $query.then_order_by($table::$col.desc()),
            )+
            _ => $query,
        }
    };
}

// posts

fn post_match_nothing(query: PostQuery) -> PostQuery {
    query.filter(blog_posts::id.eq_any(Vec::<i64>::new()))
}

fn post_category_id(query: PostQuery, value: &FilterValue) -> PostQuery {
    let ids = parse_ids(value);
    if ids.is_empty() {
        return post_match_nothing(query);
    }

    query.filter(
        blog_posts::id.eq_any(
            blog_post_categories::table
                .filter(blog_post_categories::category_id.eq_any(ids))
                .select(blog_post_categories::post_id),
        ),
    )
}

/// Titles are stored lower-cased.
fn post_title(query: PostQuery, value: &FilterValue) -> PostQuery {
    match value {
        FilterValue::One(title) => query.filter(blog_posts::title.eq(title.to_lowercase())),
        FilterValue::Many(titles) => query.filter(
            blog_posts::title.eq_any(titles.iter().map(|t| t.to_lowercase()).collect::<Vec<_>>()),
        ),
    }
}

fn post_end(query: PostQuery, value: &FilterValue) -> PostQuery {
    match value.first().and_then(parse_timestamp) {
        Some(end) => query.filter(blog_posts::created_at.ge(end)),
        None => post_match_nothing(query),
    }
}

fn post_order(query: PostQuery, value: &FilterValue, dir: SortDirection) -> PostQuery {
    order_by_column!(query, value, dir, blog_posts, [id, title, status, created_at, updated_at])
}

fn post_order_by(query: PostQuery, value: &FilterValue) -> PostQuery {
    post_order(query, value, SortDirection::Asc)
}

fn post_order_by_asc(query: PostQuery, value: &FilterValue) -> PostQuery {
    post_order(query, value, SortDirection::Asc)
}

fn post_order_by_desc(query: PostQuery, value: &FilterValue) -> PostQuery {
    post_order(query, value, SortDirection::Desc)
}

pub static POST_FILTERS: LazyLock<FilterRegistry<PostQuery>> = LazyLock::new(|| {
    FilterRegistry::new()
        .predicate("CategoryId", post_category_id)
        .predicate("Title", post_title)
        .predicate("End", post_end)
        .ordering("OrderBy", post_order_by)
        .ordering("OrderByAsc", post_order_by_asc)
        .ordering("OrderByDesc", post_order_by_desc)
});

// categories

fn category_name(query: CategoryQuery, value: &FilterValue) -> CategoryQuery {
    query.filter(blog_categories::name.ilike(like_pattern(value)))
}

fn category_parent_id(query: CategoryQuery, value: &FilterValue) -> CategoryQuery {
    query.filter(blog_categories::parent_id.eq_any(parse_ids(value)))
}

fn category_order(query: CategoryQuery, value: &FilterValue, dir: SortDirection) -> CategoryQuery {
    order_by_column!(query, value, dir, blog_categories, [id, name, status])
}

fn category_order_by(query: CategoryQuery, value: &FilterValue) -> CategoryQuery {
    category_order(query, value, SortDirection::Asc)
}

fn category_order_by_asc(query: CategoryQuery, value: &FilterValue) -> CategoryQuery {
    category_order(query, value, SortDirection::Asc)
}

fn category_order_by_desc(query: CategoryQuery, value: &FilterValue) -> CategoryQuery {
    category_order(query, value, SortDirection::Desc)
}

pub static CATEGORY_FILTERS: LazyLock<FilterRegistry<CategoryQuery>> = LazyLock::new(|| {
    FilterRegistry::new()
        .predicate("Name", category_name)
        .predicate("ParentId", category_parent_id)
        .ordering("OrderBy", category_order_by)
        .ordering("OrderByAsc", category_order_by_asc)
        .ordering("OrderByDesc", category_order_by_desc)
});

// users

fn user_nickname(query: UserQuery, value: &FilterValue) -> UserQuery {
    let pattern = like_pattern(value);
    query.filter(
        users::first_name
            .ilike(pattern.clone())
            .or(users::last_name.ilike(pattern)),
    )
}

fn user_end(query: UserQuery, value: &FilterValue) -> UserQuery {
    match value.first().and_then(parse_timestamp) {
        Some(end) => query.filter(users::created_at.ge(end)),
        None => query.filter(users::id.eq_any(Vec::<i64>::new())),
    }
}

fn user_order(query: UserQuery, value: &FilterValue, dir: SortDirection) -> UserQuery {
    order_by_column!(query, value, dir, users, [id, nickname, first_name, last_name, email, created_at])
}

fn user_order_by(query: UserQuery, value: &FilterValue) -> UserQuery {
    user_order(query, value, SortDirection::Asc)
}

fn user_order_by_asc(query: UserQuery, value: &FilterValue) -> UserQuery {
    user_order(query, value, SortDirection::Asc)
}

fn user_order_by_desc(query: UserQuery, value: &FilterValue) -> UserQuery {
    user_order(query, value, SortDirection::Desc)
}

pub static USER_FILTERS: LazyLock<FilterRegistry<UserQuery>> = LazyLock::new(|| {
    FilterRegistry::new()
        .predicate("Nickname", user_nickname)
        .predicate("End", user_end)
        .ordering("OrderBy", user_order_by)
        .ordering("OrderByAsc", user_order_by_asc)
        .ordering("OrderByDesc", user_order_by_desc)
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search_filter::{FilterParams, FilterPass, apply_filters};

    fn params(pairs: &[(&str, &str)]) -> FilterParams {
        FilterParams::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn post_sql(pairs: &[(&str, &str)]) -> String {
        let query = apply_filters(
            blog_posts::table.into_boxed(),
            &params(pairs),
            &POST_FILTERS,
            FilterPass::Full,
        );
        diesel::debug_query::<Pg, _>(&query).to_string()
    }

    fn user_sql(pairs: &[(&str, &str)]) -> String {
        let query = apply_filters(
            users::table.into_boxed(),
            &params(pairs),
            &USER_FILTERS,
            FilterPass::Full,
        );
        diesel::debug_query::<Pg, _>(&query).to_string()
    }

    #[test]
    fn test_unknown_filter_leaves_query_untouched() {
        assert_eq!(post_sql(&[("foo", "bar")]), post_sql(&[]));
        assert!(!post_sql(&[("foo", "bar")]).contains("WHERE"));
    }

    #[test]
    fn test_title_filter_matches_stored_lowercase() {
        let sql = post_sql(&[("title", "Hello World")]);
        assert!(sql.contains(r#""blog_posts"."title" = $1"#), "{sql}");
        assert!(sql.contains(r#""hello world""#), "{sql}");
    }

    #[test]
    fn test_category_filter_goes_through_join_table() {
        let sql = post_sql(&[("category_id", "4")]);
        assert!(sql.contains(r#""blog_post_categories"."category_id""#), "{sql}");
        assert!(sql.contains(r#""blog_post_categories"."post_id""#), "{sql}");
    }

    #[test]
    fn test_unparsable_category_matches_nothing() {
        let sql = post_sql(&[("category_id", "four")]);
        assert!(!sql.contains("blog_post_categories"), "{sql}");
        assert!(sql.contains("WHERE"), "{sql}");
    }

    #[test]
    fn test_end_filter() {
        let sql = post_sql(&[("end", "2025-06-01")]);
        assert!(sql.contains(r#""blog_posts"."created_at" >= $1"#), "{sql}");

        let sql = post_sql(&[("end", "someday")]);
        assert!(!sql.contains("created_at\" >="), "{sql}");
        assert!(sql.contains("WHERE"), "{sql}");
    }

    #[test]
    fn test_order_direction_from_parameter_values() {
        let sql = post_sql(&[("order_by", "title"), ("dir", "desc")]);
        assert!(sql.contains(r#"ORDER BY "blog_posts"."title" DESC"#), "{sql}");

        let sql = post_sql(&[("order_by", "title"), ("dir", "asc")]);
        assert!(sql.contains(r#"ORDER BY "blog_posts"."title" ASC"#), "{sql}");

        let sql = post_sql(&[("order_by", "created_at")]);
        assert!(sql.contains(r#"ORDER BY "blog_posts"."created_at" ASC"#), "{sql}");
    }

    #[test]
    fn test_order_by_unknown_column_is_ignored() {
        let sql = post_sql(&[("order_by", "password"), ("dir", "desc")]);
        assert!(!sql.contains("ORDER BY"), "{sql}");
    }

    #[test]
    fn test_nickname_searches_both_name_columns() {
        let sql = user_sql(&[("nickname", "ali")]);
        assert!(sql.contains(r#""users"."first_name" ILIKE $1"#), "{sql}");
        assert!(sql.contains(r#""users"."last_name" ILIKE $2"#), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
        assert!(sql.contains(r#""%ali%""#), "{sql}");
    }

    #[test]
    fn test_category_name_filter() {
        let query = apply_filters(
            blog_categories::table.into_boxed(),
            &params(&[("name", "Sample")]),
            &CATEGORY_FILTERS,
            FilterPass::Full,
        );
        let sql = diesel::debug_query::<Pg, _>(&query).to_string();
        assert!(sql.contains(r#""blog_categories"."name" ILIKE $1"#), "{sql}");
        assert!(sql.contains(r#""%Sample%""#), "{sql}");
    }

    #[test]
    fn test_count_pass_skips_ordering() {
        let query = apply_filters(
            blog_posts::table.into_boxed(),
            &params(&[("title", "a"), ("order_by", "id")]),
            &POST_FILTERS,
            FilterPass::PredicatesOnly,
        );
        let sql = diesel::debug_query::<Pg, _>(&query).to_string();
        assert!(sql.contains(r#""blog_posts"."title" = $1"#), "{sql}");
        assert!(!sql.contains("ORDER BY"), "{sql}");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2025-06-01T10:00:00+02:00").is_some());
        assert!(parse_timestamp("2025-06-01 10:00:00").is_some());
        assert_eq!(
            parse_timestamp("2025-06-01").map(|d| d.to_rfc3339()),
            Some("2025-06-01T00:00:00+00:00".to_owned())
        );
        assert!(parse_timestamp("06/01/2025").is_none());
    }
}
