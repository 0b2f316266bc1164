//! Request-parameter driven query building.
//!
//! Every query-string key is studly-cased (`category_id` -> `CategoryId`) and looked
//! up in a per-entity [`FilterRegistry`]. A hit replaces the query with the handler's
//! result; a miss is a no-op. `order_by` is special: if any scalar parameter value is
//! literally `asc` the `OrderByAsc` handler is used instead, and if any is `desc` the
//! `OrderByDesc` handler wins over both.

pub mod filters;
pub mod paginate;

use std::collections::HashMap;
use std::future::Future;

use diesel::QueryResult;
use diesel_async::AsyncPgConnection;
use tracing::trace;

pub use paginate::Page;

pub const ORDER_BY_KEY: &str = "order_by";
pub const PAGE_KEY: &str = "page";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    One(String),
    Many(Vec<String>),
}

impl FilterValue {
    pub fn first(&self) -> Option<&str> {
        match self {
            FilterValue::One(v) => Some(v.as_str()),
            FilterValue::Many(vs) => vs.first().map(String::as_str),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            FilterValue::One(v) => vec![v.as_str()],
            FilterValue::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

/// Query-string parameters in first-seen order. `key[]=a&key[]=b` collapses into one
/// `Many`; a repeated plain key keeps its last value.
#[derive(Debug, Clone, Default)]
pub struct FilterParams {
    entries: Vec<(String, FilterValue)>,
}

impl FilterParams {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut entries: Vec<(String, FilterValue)> = Vec::with_capacity(pairs.len());

        for (raw_key, value) in pairs {
            let (key, is_list) = match raw_key.strip_suffix("[]") {
                Some(stripped) => (stripped.to_owned(), true),
                None => (raw_key, false),
            };

            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some((_, existing)) => match (existing, is_list) {
                    (FilterValue::Many(vs), true) => vs.push(value),
                    (slot, _) => {
                        *slot = if is_list {
                            FilterValue::Many(vec![value])
                        } else {
                            FilterValue::One(value)
                        }
                    }
                },
                None => {
                    let value = if is_list {
                        FilterValue::Many(vec![value])
                    } else {
                        FilterValue::One(value)
                    };
                    entries.push((key, value));
                }
            }
        }

        FilterParams { entries }
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Scans scalar values only; list parameters never match.
    pub fn contains_value(&self, needle: &str) -> bool {
        self.entries
            .iter()
            .any(|(_, v)| matches!(v, FilterValue::One(s) if s == needle))
    }

    /// 1-based page number from `?page=`, falling back to 1.
    pub fn page(&self) -> i64 {
        self.get(PAGE_KEY)
            .and_then(FilterValue::first)
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }
}

/// `category_id` -> `CategoryId`, `order-by asc` -> `OrderByAsc`.
pub fn studly_case(key: &str) -> String {
    key.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

pub fn handler_name(key: &str, params: &FilterParams) -> String {
    if key != ORDER_BY_KEY {
        return studly_case(key);
    }

    let mut name = ORDER_BY_KEY;
    if params.contains_value("asc") {
        name = "order_by_asc";
    }
    if params.contains_value("desc") {
        name = "order_by_desc";
    }
    studly_case(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Predicate,
    Order,
}

pub type FilterFn<Q> = fn(Q, &FilterValue) -> Q;

pub struct FilterEntry<Q> {
    pub kind: FilterKind,
    pub apply: FilterFn<Q>,
}

pub struct FilterRegistry<Q> {
    handlers: HashMap<&'static str, FilterEntry<Q>>,
}

impl<Q> Default for FilterRegistry<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q> FilterRegistry<Q> {
    pub fn new() -> Self {
        FilterRegistry {
            handlers: HashMap::new(),
        }
    }

    pub fn predicate(mut self, name: &'static str, apply: FilterFn<Q>) -> Self {
        self.handlers.insert(
            name,
            FilterEntry {
                kind: FilterKind::Predicate,
                apply,
            },
        );
        self
    }

    pub fn ordering(mut self, name: &'static str, apply: FilterFn<Q>) -> Self {
        self.handlers.insert(
            name,
            FilterEntry {
                kind: FilterKind::Order,
                apply,
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&FilterEntry<Q>> {
        self.handlers.get(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPass {
    /// Predicates and ordering.
    Full,
    /// Predicates only; used for the row count.
    PredicatesOnly,
}

pub fn apply_filters<Q>(
    mut query: Q,
    params: &FilterParams,
    registry: &FilterRegistry<Q>,
    pass: FilterPass,
) -> Q {
    for (key, value) in params.iter() {
        let name = handler_name(key, params);
        match registry.get(&name) {
            Some(entry) => {
                if pass == FilterPass::PredicatesOnly && entry.kind == FilterKind::Order {
                    continue;
                }
                query = (entry.apply)(query, value);
            }
            None => trace!(key, handler = %name, "No filter registered; ignoring."),
        }
    }
    query
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    All,
    /// Executes exactly like `All`.
    Get,
    /// Hands back the filtered, unexecuted query; relations are not attached.
    Custom,
    #[default]
    Pagination,
}

/// How [`search`] executes a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    Flat,
    Paged,
    Deferred,
}

impl FetchMode {
    pub fn plan(self) -> FetchPlan {
        match self {
            FetchMode::All | FetchMode::Get => FetchPlan::Flat,
            FetchMode::Custom => FetchPlan::Deferred,
            FetchMode::Pagination => FetchPlan::Paged,
        }
    }
}

pub enum Fetched<S: Searchable> {
    Rows(Vec<S::Loaded>),
    Page(Page<S::Loaded>),
    Query(S::Query),
}

impl<S: Searchable> Fetched<S> {
    /// Executed results; `None` for a deferred query.
    pub fn into_rows(self) -> Option<Vec<S::Loaded>> {
        match self {
            Fetched::Rows(rows) => Some(rows),
            Fetched::Page(page) => Some(page.data),
            Fetched::Query(_) => None,
        }
    }

    pub fn into_query(self) -> Option<S::Query> {
        match self {
            Fetched::Query(query) => Some(query),
            _ => None,
        }
    }
}

/// An entity collection the translator can filter, count, load and decorate.
pub trait Searchable: Sized {
    type Query: Send + 'static;
    type Row: Send;
    type Relation: Copy + Send + Sync;
    type Loaded: Send;

    fn registry() -> &'static FilterRegistry<Self::Query>;

    fn count(
        query: Self::Query,
        conn: &mut AsyncPgConnection,
    ) -> impl Future<Output = QueryResult<i64>> + Send;

    /// `window` is `(limit, offset)`.
    fn load(
        query: Self::Query,
        window: Option<(i64, i64)>,
        conn: &mut AsyncPgConnection,
    ) -> impl Future<Output = QueryResult<Vec<Self::Row>>> + Send;

    fn attach(
        rows: Vec<Self::Row>,
        with: &[Self::Relation],
        conn: &mut AsyncPgConnection,
    ) -> impl Future<Output = QueryResult<Vec<Self::Loaded>>> + Send;
}

pub fn build_query<S: Searchable>(base: S::Query, params: &FilterParams) -> S::Query {
    apply_filters(base, params, S::registry(), FilterPass::Full)
}

pub async fn search<S, B>(
    conn: &mut AsyncPgConnection,
    base: B,
    params: &FilterParams,
    mode: FetchMode,
    with: &[S::Relation],
    per_page: i64,
) -> QueryResult<Fetched<S>>
where
    S: Searchable,
    B: Fn() -> S::Query + Send + Sync,
{
    match mode.plan() {
        FetchPlan::Deferred => Ok(Fetched::Query(build_query::<S>(base(), params))),
        FetchPlan::Flat => Ok(Fetched::Rows(fetch_all::<S>(conn, base(), params, with).await?)),
        FetchPlan::Paged => Ok(Fetched::Page(
            paginate::<S, B>(conn, base, params, with, per_page).await?,
        )),
    }
}

pub async fn fetch_all<S: Searchable>(
    conn: &mut AsyncPgConnection,
    base: S::Query,
    params: &FilterParams,
    with: &[S::Relation],
) -> QueryResult<Vec<S::Loaded>> {
    let rows = S::load(build_query::<S>(base, params), None, conn).await?;
    S::attach(rows, with, conn).await
}

/// `base` is called twice: once for the count, once for the page itself.
pub async fn paginate<S, B>(
    conn: &mut AsyncPgConnection,
    base: B,
    params: &FilterParams,
    with: &[S::Relation],
    per_page: i64,
) -> QueryResult<Page<S::Loaded>>
where
    S: Searchable,
    B: Fn() -> S::Query + Send + Sync,
{
    let current_page = params.page();
    let (limit, offset) = Page::<S::Loaded>::window(current_page, per_page);

    let counted = apply_filters(base(), params, S::registry(), FilterPass::PredicatesOnly);
    let total = S::count(counted, conn).await?;

    let rows = S::load(build_query::<S>(base(), params), Some((limit, offset)), conn).await?;
    let data = S::attach(rows, with, conn).await?;

    Ok(Page::new(data, current_page, per_page, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> FilterParams {
        FilterParams::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_studly_case() {
        assert_eq!(studly_case("category_id"), "CategoryId");
        assert_eq!(studly_case("title"), "Title");
        assert_eq!(studly_case("order_by_desc"), "OrderByDesc");
        assert_eq!(studly_case("first-name"), "FirstName");
        assert_eq!(studly_case("__end__"), "End");
        assert_eq!(studly_case(""), "");
    }

    #[test]
    fn test_order_handler_selection() {
        let p = params(&[("order_by", "title")]);
        assert_eq!(handler_name("order_by", &p), "OrderBy");

        let p = params(&[("order_by", "title"), ("dir", "asc")]);
        assert_eq!(handler_name("order_by", &p), "OrderByAsc");

        // desc wins regardless of which key carries it
        let p = params(&[("sort", "desc"), ("order_by", "title"), ("dir", "asc")]);
        assert_eq!(handler_name("order_by", &p), "OrderByDesc");

        // only order_by is special-cased
        assert_eq!(handler_name("dir", &p), "Dir");
    }

    #[test]
    fn test_list_values_do_not_pick_direction() {
        let p = FilterParams::from_pairs(vec![
            ("order_by".into(), "id".into()),
            ("dir[]".into(), "desc".into()),
        ]);
        assert_eq!(handler_name("order_by", &p), "OrderBy");
    }

    #[test]
    fn test_params_grouping() {
        let p = FilterParams::from_pairs(vec![
            ("category_id[]".into(), "1".into()),
            ("title".into(), "a".into()),
            ("category_id[]".into(), "2".into()),
            ("title".into(), "b".into()),
        ]);

        assert_eq!(
            p.get("category_id"),
            Some(&FilterValue::Many(vec!["1".into(), "2".into()]))
        );
        assert_eq!(p.get("title"), Some(&FilterValue::One("b".into())));

        let keys: Vec<&str> = p.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["category_id", "title"]);
    }

    #[test]
    fn test_page_parameter() {
        assert_eq!(params(&[]).page(), 1);
        assert_eq!(params(&[("page", "3")]).page(), 3);
        assert_eq!(params(&[("page", "0")]).page(), 1);
        assert_eq!(params(&[("page", "abc")]).page(), 1);
    }

    #[test]
    fn test_get_runs_like_all() {
        assert_eq!(FetchMode::Get.plan(), FetchMode::All.plan());
        assert_eq!(FetchMode::All.plan(), FetchPlan::Flat);
        assert_eq!(FetchMode::Custom.plan(), FetchPlan::Deferred);
        assert_eq!(FetchMode::default().plan(), FetchPlan::Paged);
    }

    #[tokio::test]
    async fn test_built_query_can_move_to_a_task() {
        use diesel::pg::Pg;

        use crate::domain::blog::category::Category;

        let query = build_query::<Category>(Category::listing_base(), &params(&[("name", "rust")]));
        let sql = tokio::spawn(async move { diesel::debug_query::<Pg, _>(&query).to_string() })
            .await
            .unwrap();
        assert!(sql.contains("ILIKE"), "{sql}");
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_fetch_modes_against_postgres() {
        use diesel::pg::Pg;

        use crate::domain::blog::category::Category;
        use crate::util::test_support::{TestDb, insert_category};

        let db = TestDb::start().await;
        let mut conn = db.conn().await;
        insert_category(&mut conn, "Sample", None).await;
        insert_category(&mut conn, "Other", None).await;

        async fn run(
            conn: &mut AsyncPgConnection,
            p: &FilterParams,
            mode: FetchMode,
        ) -> Fetched<Category> {
            search::<Category, _>(conn, Category::listing_base, p, mode, &[], 20)
                .await
                .unwrap()
        }
        let names = |fetched: Fetched<Category>| {
            fetched
                .into_rows()
                .unwrap()
                .into_iter()
                .map(|c| c.name)
                .collect::<Vec<_>>()
        };

        let all = names(run(&mut conn, &params(&[]), FetchMode::All).await);
        let get = names(run(&mut conn, &params(&[]), FetchMode::Get).await);
        assert_eq!(all, vec!["Sample", "Other"]);
        assert_eq!(get, all);

        let narrowed = params(&[("name", "Sample"), ("foo", "bar")]);
        assert_eq!(names(run(&mut conn, &narrowed, FetchMode::Get).await), vec!["Sample"]);

        let p = params(&[("name", "Sample")]);
        let deferred = run(&mut conn, &p, FetchMode::Custom).await.into_query().unwrap();
        let expected = build_query::<Category>(Category::listing_base(), &p);
        assert_eq!(
            diesel::debug_query::<Pg, _>(&deferred).to_string(),
            diesel::debug_query::<Pg, _>(&expected).to_string()
        );
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        fn push_title(mut q: Vec<String>, v: &FilterValue) -> Vec<String> {
            q.push(format!("title={}", v.first().unwrap_or_default()));
            q
        }
        fn push_order(mut q: Vec<String>, v: &FilterValue) -> Vec<String> {
            q.push(format!("order={}", v.first().unwrap_or_default()));
            q
        }

        let registry = FilterRegistry::<Vec<String>>::new()
            .predicate("Title", push_title)
            .ordering("OrderBy", push_order);

        let p = params(&[("foo", "bar"), ("title", "x"), ("order_by", "id")]);

        let full = apply_filters(Vec::new(), &p, &registry, FilterPass::Full);
        assert_eq!(full, vec!["title=x", "order=id"]);

        let counted = apply_filters(Vec::new(), &p, &registry, FilterPass::PredicatesOnly);
        assert_eq!(counted, vec!["title=x"]);
    }
}
