use std::convert::Infallible;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use rand::Rng;
use serde_derive::Serialize;

use crate::{
    domain::search_filter::{
        FilterRegistry, Searchable,
        filters::{USER_FILTERS, UserQuery},
    },
    errors::code_error::{CodeError, CodeErrorResp, code_err},
    schema::{email_verifications, users},
};

pub const DEFAULT_USER_TYPE: &str = "user";
/// Width of `users.type`.
pub const USER_TYPE_MAX_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i64,
    pub nickname: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(rename = "type")]
    pub user_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The subset exposed when a user is embedded as a post's author.
#[derive(Debug, Clone, Serialize, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Author {
    pub id: i64,
    pub nickname: String,
    pub first_name: String,
    pub last_name: String,
}

pub fn default_nickname(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}")
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct UserInsertable<'nu> {
    nickname: &'nu str,
    first_name: &'nu str,
    last_name: &'nu str,
    email: &'nu str,
    password: &'nu str,
    user_type: &'nu str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'nu> UserInsertable<'nu> {
    pub fn new(
        nickname: &'nu str,
        first_name: &'nu str,
        last_name: &'nu str,
        email: &'nu str,
        password_hash: &'nu str,
        user_type: &'nu str,
    ) -> Self {
        let now = Utc::now();
        UserInsertable {
            nickname,
            first_name,
            last_name,
            email,
            password: password_hash,
            user_type,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = users)]
pub struct UserChangeset {
    pub nickname: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn map_unique_violation(e: diesel::result::Error, otherwise: CodeError) -> CodeErrorResp {
    match e {
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        ) => code_err(CodeError::EMAIL_MUST_BE_UNIQUE, e),
        _ => code_err(otherwise, e),
    }
}

impl User {
    pub async fn insert_one(
        conn: &mut AsyncPgConnection,
        new_user: UserInsertable<'_>,
    ) -> Result<User, CodeErrorResp> {
        diesel::insert_into(users::table)
            .values(new_user)
            .returning(User::as_returning())
            .get_result::<User>(conn)
            .await
            .map_err(|e| map_unique_violation(e, CodeError::DB_INSERTION_ERROR))
    }

    pub async fn find(conn: &mut AsyncPgConnection, id: i64) -> Result<Option<User>, CodeErrorResp> {
        users::table
            .find(id)
            .select(User::as_select())
            .first::<User>(conn)
            .await
            .optional()
            .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))
    }

    pub async fn find_by_email(
        conn: &mut AsyncPgConnection,
        email: &str,
    ) -> Result<Option<User>, CodeErrorResp> {
        users::table
            .filter(users::email.eq(email))
            .select(User::as_select())
            .first::<User>(conn)
            .await
            .optional()
            .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))
    }

    pub async fn email_exists(
        conn: &mut AsyncPgConnection,
        email: &str,
    ) -> Result<bool, CodeErrorResp> {
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::email.eq(email)),
        ))
        .get_result(conn)
        .await
        .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))
    }

    /// Returns `None` when no row has that id.
    pub async fn update_one(
        conn: &mut AsyncPgConnection,
        id: i64,
        mut changes: UserChangeset,
    ) -> Result<Option<User>, CodeErrorResp> {
        changes.updated_at = Some(Utc::now());
        diesel::update(users::table.find(id))
            .set(changes)
            .returning(User::as_returning())
            .get_result::<User>(conn)
            .await
            .optional()
            .map_err(|e| map_unique_violation(e, CodeError::DB_UPDATE_ERROR))
    }

    pub async fn delete_one(conn: &mut AsyncPgConnection, id: i64) -> Result<bool, CodeErrorResp> {
        diesel::delete(users::table.find(id))
            .execute(conn)
            .await
            .map(|affected| affected > 0)
            .map_err(|e| code_err(CodeError::DB_DELETION_ERROR, e))
    }
}

impl Searchable for User {
    type Query = UserQuery;
    type Row = User;
    type Relation = Infallible;
    type Loaded = User;

    fn registry() -> &'static FilterRegistry<UserQuery> {
        &USER_FILTERS
    }

    async fn count(query: UserQuery, conn: &mut AsyncPgConnection) -> QueryResult<i64> {
        query.count().get_result(conn).await
    }

    async fn load(
        query: UserQuery,
        window: Option<(i64, i64)>,
        conn: &mut AsyncPgConnection,
    ) -> QueryResult<Vec<User>> {
        let query = query.then_order_by(users::id.asc());
        match window {
            Some((limit, offset)) => query.limit(limit).offset(offset).load(conn).await,
            None => query.load(conn).await,
        }
    }

    async fn attach(
        rows: Vec<User>,
        _with: &[Infallible],
        _conn: &mut AsyncPgConnection,
    ) -> QueryResult<Vec<User>> {
        Ok(rows)
    }
}

/// Lifetime of an emailed code, measured from issuance.
pub const CODE_TTL: chrono::Duration = chrono::Duration::minutes(5);
pub const CODE_MIN: i32 = 100_000;
pub const CODE_MAX: i32 = 999_999;

pub const STATUS_UNCONFIRMED: i16 = 0;
pub const STATUS_CONFIRMED: i16 = 1;

pub fn generate_code() -> i32 {
    rand::thread_rng().gen_range(CODE_MIN..=CODE_MAX)
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = email_verifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EmailVerification {
    pub email: String,
    pub code: i32,
    pub status: i16,
    pub created_at: DateTime<Utc>,
}

impl EmailVerification {
    /// Exactly `CODE_TTL` old is still accepted.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > CODE_TTL
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == STATUS_CONFIRMED
    }

    /// One row per email: a resend replaces code, status and issue time.
    pub async fn upsert(
        conn: &mut AsyncPgConnection,
        email: &str,
        code: i32,
        now: DateTime<Utc>,
    ) -> Result<(), CodeErrorResp> {
        diesel::insert_into(email_verifications::table)
            .values((
                email_verifications::email.eq(email),
                email_verifications::code.eq(code),
                email_verifications::status.eq(STATUS_UNCONFIRMED),
                email_verifications::created_at.eq(now),
            ))
            .on_conflict(email_verifications::email)
            .do_update()
            .set((
                email_verifications::code.eq(excluded(email_verifications::code)),
                email_verifications::status.eq(excluded(email_verifications::status)),
                email_verifications::created_at.eq(excluded(email_verifications::created_at)),
            ))
            .execute(conn)
            .await
            .map(|_| ())
            .map_err(|e| code_err(CodeError::DB_INSERTION_ERROR, e))
    }

    pub async fn find_by_code(
        conn: &mut AsyncPgConnection,
        email: &str,
        code: i32,
    ) -> Result<Option<EmailVerification>, CodeErrorResp> {
        email_verifications::table
            .filter(email_verifications::email.eq(email))
            .filter(email_verifications::code.eq(code))
            .select(EmailVerification::as_select())
            .first::<EmailVerification>(conn)
            .await
            .optional()
            .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))
    }

    pub async fn find_confirmed(
        conn: &mut AsyncPgConnection,
        email: &str,
    ) -> Result<Option<EmailVerification>, CodeErrorResp> {
        email_verifications::table
            .filter(email_verifications::email.eq(email))
            .filter(email_verifications::status.eq(STATUS_CONFIRMED))
            .select(EmailVerification::as_select())
            .first::<EmailVerification>(conn)
            .await
            .optional()
            .map_err(|e| code_err(CodeError::DB_QUERY_ERROR, e))
    }

    pub async fn confirm(conn: &mut AsyncPgConnection, email: &str) -> Result<(), CodeErrorResp> {
        diesel::update(email_verifications::table.filter(email_verifications::email.eq(email)))
            .set(email_verifications::status.eq(STATUS_CONFIRMED))
            .execute(conn)
            .await
            .map(|_| ())
            .map_err(|e| code_err(CodeError::DB_UPDATE_ERROR, e))
    }

    pub async fn delete_for(conn: &mut AsyncPgConnection, email: &str) -> Result<(), CodeErrorResp> {
        diesel::delete(email_verifications::table.filter(email_verifications::email.eq(email)))
            .execute(conn)
            .await
            .map(|_| ())
            .map_err(|e| code_err(CodeError::DB_DELETION_ERROR, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issued_at(created_at: DateTime<Utc>) -> EmailVerification {
        EmailVerification {
            email: "a@b.com".into(),
            code: 123456,
            status: STATUS_UNCONFIRMED,
            created_at,
        }
    }

    #[test]
    fn test_code_valid_at_exactly_five_minutes() {
        let now = Utc::now();
        let record = issued_at(now - chrono::Duration::minutes(5));
        assert!(!record.is_expired_at(now));
    }

    #[test]
    fn test_code_expired_just_after_five_minutes() {
        let now = Utc::now();
        let record = issued_at(now - chrono::Duration::minutes(5) - chrono::Duration::milliseconds(1));
        assert!(record.is_expired_at(now));
    }

    #[test]
    fn test_fresh_code_is_not_expired() {
        let now = Utc::now();
        assert!(!issued_at(now).is_expired_at(now));
        assert!(!issued_at(now - chrono::Duration::minutes(4)).is_expired_at(now));
    }

    #[test]
    fn test_generated_codes_are_six_digits() {
        for _ in 0..1_000 {
            let code = generate_code();
            assert!((CODE_MIN..=CODE_MAX).contains(&code));
            assert_eq!(code.to_string().len(), 6);
        }
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_resend_replaces_the_code() {
        use crate::util::test_support::TestDb;

        let db = TestDb::start().await;
        let mut conn = db.conn().await;
        let email = "ada@example.com";

        EmailVerification::upsert(&mut conn, email, 111_111, Utc::now()).await.unwrap();
        EmailVerification::confirm(&mut conn, email).await.unwrap();
        EmailVerification::upsert(&mut conn, email, 222_222, Utc::now()).await.unwrap();

        let rows: Vec<EmailVerification> = email_verifications::table
            .filter(email_verifications::email.eq(email))
            .select(EmailVerification::as_select())
            .load(&mut conn)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].code, 222_222);
        assert!(!rows[0].is_confirmed());
        assert!(EmailVerification::find_by_code(&mut conn, email, 111_111).await.unwrap().is_none());
    }

    #[test]
    fn test_password_never_serialized() {
        let now = Utc::now();
        let user = User {
            id: 1,
            nickname: "Ada L".into(),
            first_name: "Ada".into(),
            last_name: "L".into(),
            email: "ada@example.com".into(),
            password: "$argon2id$...".into(),
            user_type: DEFAULT_USER_TYPE.into(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["type"], "user");
        assert_eq!(default_nickname("Ada", "L"), "Ada L");
    }
}
