use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, Request, Response},
    middleware::Next,
};
use tokio::time::Instant;
use tracing::{Level, error};

use crate::{init::state::ServerState, util::time::duration_formatter::format_duration};

pub const SERVER_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const ERROR_HEADERS: [&str; 5] = [
    "x-error-log-level",
    "x-error-status-code",
    "x-error-code",
    "x-error-message",
    "x-error-detail",
];

// debug and below are filtered out by default
macro_rules! log_codeerror {
    ($level:expr, method = $method:expr, path = $path:expr, client_ip = $client_ip:expr, status_code = $status_code:expr, duration = $duration:expr, error_code = $error_code:expr, message = $message:expr, detail = $detail:expr) => {
        match $level {
            Level::ERROR => tracing::error!(kind = %"ERSP", method = %$method, path = %$path, client_ip = ?$client_ip, status_code = %$status_code, duration = %$duration, error_code = %$error_code, message = %$message, detail = %$detail),
            Level::WARN => tracing::warn!(kind = %"ERSP", method = %$method, path = %$path, client_ip = ?$client_ip, status_code = %$status_code, duration = %$duration, error_code = %$error_code, message = %$message, detail = %$detail),
            Level::INFO => tracing::info!(kind = %"ERSP", method = %$method, path = %$path, client_ip = ?$client_ip, status_code = %$status_code, duration = %$duration, error_code = %$error_code, message = %$message, detail = %$detail),
            Level::DEBUG => tracing::debug!(kind = %"ERSP", method = %$method, path = %$path, client_ip = ?$client_ip, status_code = %$status_code, duration = %$duration, error_code = %$error_code, message = %$message, detail = %$detail),
            Level::TRACE => tracing::trace!(kind = %"ERSP", method = %$method, path = %$path, client_ip = ?$client_ip, status_code = %$status_code, duration = %$duration, error_code = %$error_code, message = %$message, detail = %$detail),
        }
    };
}

/// First hop of `x-forwarded-for`, else the peer address.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> Option<IpAddr> {
    match headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
    {
        Some(forwarded) => match forwarded.trim().parse::<IpAddr>() {
            Ok(ip) => Some(ip),
            Err(e) => {
                error!(error = ?e, forwarded, "Could not parse x-forwarded-for into IpAddr");
                None
            }
        },
        None => Some(peer.ip()),
    }
}

pub async fn log_middleware(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(info): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let start = Instant::now();

    state.add_responses_handled();

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let client_ip = client_ip(request.headers(), info);

    tracing::info!(kind = %"RECV", method = %method, path = %path, client_ip = ?client_ip);

    let mut response = next.run(request).await;
    let duration = format_duration(start.elapsed());
    let status = response.status();
    let headers = response.headers_mut();

    if headers.contains_key("x-error-status-code") {
        let log_level = header_value_to_str(headers.get("x-error-log-level")).unwrap_or("ERROR");
        let status_code = header_value_to_str(headers.get("x-error-status-code")).unwrap_or("");
        let error_code = header_value_to_str(headers.get("x-error-code")).unwrap_or("");
        let message = header_value_to_str(headers.get("x-error-message")).unwrap_or("");
        let detail = header_value_to_str(headers.get("x-error-detail")).unwrap_or("");

        log_codeerror!(
            log_level.parse::<Level>().unwrap_or(Level::ERROR),
            method = method,
            path = path,
            client_ip = client_ip,
            status_code = status_code,
            duration = duration,
            error_code = error_code,
            message = message,
            detail = detail
        );

        for name in ERROR_HEADERS {
            headers.remove(name);
        }
    } else {
        tracing::info!(kind = %"RESP", method = %method, path = %path, client_ip = ?client_ip, status_code = %status.as_u16(), duration = %duration);
    }

    headers.insert("x-server-name", HeaderValue::from_static(SERVER_NAME));

    response
}

fn header_value_to_str(value: Option<&HeaderValue>) -> Option<&str> {
    value.and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let peer: SocketAddr = "10.0.0.1:5555".parse().unwrap();

        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, peer), Some("10.0.0.1".parse().unwrap()));

        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.2"));
        assert_eq!(client_ip(&headers, peer), Some("203.0.113.7".parse().unwrap()));

        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        assert_eq!(client_ip(&headers, peer), None);
    }
}
