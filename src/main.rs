use init::{config::logs_dir, server_init::server_init_proc};
use mimalloc::MiMalloc;
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

// modules tree
pub mod schema;
pub mod domain {
    pub mod blog {
        pub mod category;
        pub mod post;
    }
    pub mod search_filter;
    pub mod user;
}
pub mod dto {
    pub mod requests {
        pub mod auth {
            pub mod change_password_request;
            pub mod email_request;
            pub mod login_request;
            pub mod register_request;
            pub mod verify_code_request;
        }
        pub mod blog {
            pub mod category_request;
            pub mod post_request;
        }
        pub mod user {
            pub mod user_form_request;
        }
    }
    pub mod responses {
        pub mod auth {
            pub mod token_response;
        }
        pub mod blog {
            pub mod category_views;
            pub mod post_views;
        }
        pub mod user {
            pub mod user_update_response;
        }
        pub mod response_data;
    }
}
pub mod errors {
    pub mod code_error;
}
pub mod handlers {
    pub mod auth {
        pub mod change_password;
        pub mod login;
        pub mod logout;
        pub mod register;
        pub mod reset_password;
        pub mod send_code;
        pub mod verify_code;
        pub mod verify_reset_code;
    }
    pub mod blog {
        pub mod delete_post;
        pub mod force_delete_post;
        pub mod get_posts;
        pub mod list_posts;
        pub mod read_post;
        pub mod restore_post;
        pub mod submit_post;
        pub mod trashed_posts;
        pub mod update_post;
    }
    pub mod category {
        pub mod delete_category;
        pub mod force_delete_category;
        pub mod get_categories;
        pub mod list_categories;
        pub mod read_category;
        pub mod restore_category;
        pub mod submit_category;
        pub mod trashed_categories;
        pub mod update_category;
    }
    pub mod server {
        pub mod fallback;
        pub mod healthcheck;
        pub mod root;
    }
    pub mod user {
        pub mod create_user;
        pub mod delete_user;
        pub mod get_user;
        pub mod list_users;
        pub mod me;
        pub mod update_me;
        pub mod update_user;
    }
}
pub mod init {
    pub mod config;
    pub mod server_init;
    pub mod state;
}
pub mod jobs {
    pub mod auth {
        pub mod invalidate_sessions;
    }
    pub mod blog {
        pub mod empty_trash;
        pub mod publish_scheduled_posts;
    }
    pub mod job_funcs {
        pub mod every_day;
        pub mod every_hour;
        pub mod every_minute;
        pub mod every_week;
        pub mod init_scheduler;
        pub mod schedule;
    }
    pub mod maintenance {
        pub mod clear_logs;
    }
}
pub mod routers {
    pub mod main_router;
    pub mod middleware {
        pub mod auth;
        pub mod logging;
    }
}
pub mod util {
    pub mod crypto {
        pub mod hash_pw;
        pub mod verify_pw;
    }
    pub mod email {
        pub mod emails;
    }
    pub mod extract {
        pub mod json;
        pub mod path;
    }
    pub mod string {
        pub mod validations;
    }
    pub mod time {
        pub mod duration_formatter;
        pub mod now;
    }
    #[cfg(test)]
    pub mod test_support;
}

// main function
#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let start = tokio::time::Instant::now();

    if std::env::var("IS_AWS").is_err() {
        dotenvy::dotenv()?;
    }

    let logs_dir = logs_dir();
    std::fs::create_dir_all(&logs_dir)?;
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "blog-rest-api.log");
    let (file_writer, _file_guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_filter(env_filter()))
        .with(
            fmt::layer()
                .json()
                .with_writer(file_writer)
                .with_file(true)
                .with_line_number(true)
                .with_filter(env_filter()),
        )
        .init();

    info!("Initializing server...");
    server_init_proc(start).await?;

    Ok(())
}
