use std::sync::Arc;

use anyhow::anyhow;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{compression::CompressionLayer, cors::CorsLayer};

use crate::{
    handlers::{
        auth::{
            change_password::change_password, login::login, logout::logout,
            register::register, reset_password::reset_password, send_code::send_code,
            verify_code::verify_code, verify_reset_code::verify_reset_code,
        },
        blog::{
            delete_post::delete_post, force_delete_post::force_delete_post, get_posts::get_posts,
            list_posts::list_posts, read_post::read_post, restore_post::restore_post,
            submit_post::submit_post, trashed_posts::trashed_posts, update_post::update_post,
        },
        category::{
            delete_category::delete_category, force_delete_category::force_delete_category,
            get_categories::get_categories, list_categories::list_categories,
            read_category::read_category, restore_category::restore_category,
            submit_category::submit_category,
            trashed_categories::{trashed_categories, trashed_child_categories},
            update_category::update_category,
        },
        server::{fallback::fallback_handler, healthcheck::healthcheck, root::root_handler},
        user::{
            create_user::create_user, delete_user::delete_user, get_user::get_user,
            list_users::list_users, me::me, update_me::update_me, update_user::update_user,
        },
    },
    init::state::ServerState,
};

use super::middleware::{auth::auth_middleware, logging::log_middleware};

pub const API_PREFIX: &str = "/api/v1";
const MAX_REQUEST_SIZE: usize = 1024 * 1024 * 2; // 2MB of JSON is plenty

pub fn build_router(state: Arc<ServerState>) -> anyhow::Result<axum::Router> {
    let auth_middleware = from_fn_with_state(state.clone(), auth_middleware);
    let log_middleware = from_fn_with_state(state.clone(), log_middleware);
    let compression_middleware = CompressionLayer::new().gzip(true);
    let cors_layer = CorsLayer::very_permissive();

    // per client IP: a burst of `per_minute`, refilled evenly over the minute
    let per_minute = state.get_throttle_per_minute().max(1);
    let governor_config = GovernorConfigBuilder::default()
        .per_millisecond(60_000 / u64::from(per_minute))
        .burst_size(per_minute)
        .finish()
        .ok_or_else(|| anyhow!("Invalid throttle configuration: {per_minute} per minute"))?;
    let throttle_layer = GovernorLayer::new(governor_config);

    let auth_router = Router::new()
        .route("/auth/send-code", post(send_code))
        .route("/auth/verify-code", post(verify_code))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/password/reset", post(reset_password))
        .route("/auth/password/reset/verify", post(verify_reset_code))
        .route("/auth/password/reset/change", post(change_password))
        .merge(
            Router::new()
                .route("/auth/logout", post(logout))
                .layer(auth_middleware.clone()),
        )
        .layer(throttle_layer.clone());

    let public_router = Router::new()
        .route("/", get(root_handler))
        .route("/healthcheck", get(healthcheck))
        .route("/posts", get(get_posts))
        .route("/posts/{post_id}", get(read_post))
        .route("/categories", get(get_categories))
        .route("/categories/{category_id}", get(read_category));

    let profile_router = Router::new()
        .route("/user", get(me).put(update_me))
        .layer(auth_middleware.clone());

    let management_router = Router::new()
        .route("/posts/list", get(list_posts))
        .route("/posts/trash", get(trashed_posts))
        .route("/posts/new", post(submit_post))
        .route("/posts/{post_id}", put(update_post).delete(delete_post))
        .route("/posts/{post_id}/force", delete(force_delete_post))
        .route("/posts/{post_id}/restore", put(restore_post))
        .route("/categories/list", get(list_categories))
        .route("/categories/trash", get(trashed_categories))
        .route("/categories/trash/{category_id}", get(trashed_child_categories))
        .route("/categories/new", post(submit_category))
        .route(
            "/categories/{category_id}",
            put(update_category).delete(delete_category),
        )
        .route("/categories/{category_id}/force", delete(force_delete_category))
        .route("/categories/{category_id}/restore", put(restore_category))
        .route("/users", get(list_users))
        .route("/users/new", post(create_user))
        .route(
            "/users/{user_id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .layer(auth_middleware)
        .layer(throttle_layer);

    let api_router = auth_router
        .merge(public_router)
        .merge(profile_router)
        .merge(management_router);

    Ok(Router::new()
        .nest(API_PREFIX, api_router)
        .fallback(fallback_handler)
        .layer(compression_middleware)
        .layer(log_middleware)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_SIZE))
        .layer(cors_layer)
        .with_state(state))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Utc;
    use serde_json::json;

    use crate::{
        domain::{blog::post::PostStatus, user::EmailVerification},
        util::test_support::{
            TestDb, empty_request, insert_post, insert_user, json_request, offline_state, send,
            test_app,
        },
    };

    #[tokio::test]
    async fn test_management_routes_need_a_token() {
        let app = test_app(offline_state(3));
        let (status, body) = send(&app, empty_request("GET", "/api/v1/posts/list", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "message": "Unauthenticated." }));
    }

    #[tokio::test]
    async fn test_unknown_path_falls_back() {
        let app = test_app(offline_state(3));
        let (status, body) = send(&app, empty_request("GET", "/api/v1/nope", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Invalid path!" }));

        let (status, body) = send(&app, empty_request("GET", "/api/v1/posts/abc", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Invalid path!" }));
    }

    #[tokio::test]
    async fn test_auth_routes_are_throttled_per_ip() {
        let app = test_app(offline_state(3));
        for _ in 0..3 {
            let request = json_request("POST", "/api/v1/auth/send-code", None, json!({}));
            let (status, _) = send(&app, request).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        }

        let request = json_request("POST", "/api/v1/auth/send-code", None, json!({}));
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        // public reads sit outside the throttled groups
        let (status, _) = send(&app, empty_request("GET", "/api/v1/nope", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_register_consumes_the_verification() {
        let db = TestDb::start().await;
        let app = test_app(db.state(1_000));
        let email = "grace@example.com";
        {
            let mut conn = db.conn().await;
            EmailVerification::upsert(&mut conn, email, 123_456, Utc::now()).await.unwrap();
            EmailVerification::confirm(&mut conn, email).await.unwrap();
        }

        let body = json!({
            "email": email,
            "first_name": "Grace",
            "last_name": "Hopper",
            "password": "cobol-1959",
            "password_confirmation": "cobol-1959",
        });
        let (status, resp) = send(&app, json_request("POST", "/api/v1/auth/register", None, body.clone())).await;
        assert_eq!(status, StatusCode::CREATED, "{resp}");
        assert_eq!(resp["user"]["nickname"], "Grace Hopper");

        let mut conn = db.conn().await;
        assert!(EmailVerification::find_confirmed(&mut conn, email).await.unwrap().is_none());
        drop(conn);

        let (status, _) = send(&app, json_request("POST", "/api/v1/auth/register", None, body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_delete_trashes_then_purges() {
        let db = TestDb::start().await;
        let state = db.state(1_000);
        let app = test_app(state.clone());

        let (user, post) = {
            let mut conn = db.conn().await;
            let user = insert_user(&mut conn, "admin@example.com").await;
            let post = insert_post(&mut conn, "rust", PostStatus::Published.as_i16(), Utc::now()).await;
            (user, post)
        };
        let token = state.new_session(user.id).await.unwrap();
        let uri = format!("/api/v1/posts/{}", post.id);

        let (status, body) = send(&app, empty_request("DELETE", &uri, Some(token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Post deleted successfully" }));

        let (status, body) = send(&app, empty_request("DELETE", &uri, Some(token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Post permanently deleted successfully" }));

        let (status, body) = send(&app, empty_request("DELETE", &uri, Some(token))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Post not found" }));
    }
}
