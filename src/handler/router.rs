//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method
//! validation, route matching, and dispatching.

use crate::config::AppState;
use crate::handler::cafe;
use crate::http;
use crate::logger;
use crate::logger::AccessLogEntry;
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::{HeaderMap, Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling.
///
/// Generic over the body type: the service never reads request bodies, which
/// also lets tests drive it with plain `Request<()>` values.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let version = format!("{:?}", req.version());
    let path = req.uri().path().to_string();
    let raw_query = req.uri().query().map(ToString::to_string);
    let is_head = method == Method::HEAD;

    // 1. Check HTTP method
    let response = if let Some(resp) = check_http_method(&method, state.config.http.enable_cors) {
        resp
    // 2. Check declared body size
    } else if let Some(resp) = check_body_size(req.headers(), state.config.http.max_body_size) {
        resp
    // 3. Dispatch by path
    } else {
        route_request(&path, raw_query.as_deref(), is_head, &state)
    };

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(remote_addr.to_string(), method.to_string(), path);
        entry.query = raw_query;
        entry.http_version = version;
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us =
            u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Route request based on path
fn route_request(
    path: &str,
    raw_query: Option<&str>,
    is_head: bool,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    match path {
        // Health check endpoints (always fast)
        "/healthz" | "/readyz" => http::build_health_response("ok"),
        "/cafe" => cafe::respond(&state.dataset, raw_query, is_head),
        _ => http::build_404_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        Config, DatasetConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
    };
    use crate::dataset::Dataset;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn test_state() -> Arc<AppState> {
        test_state_with_cors(false)
    }

    fn test_state_with_cors(enable_cors: bool) -> Arc<AppState> {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                workers: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: false,
                access_log_format: "common".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
                max_connections: None,
                backlog: 128,
            },
            http: HttpConfig {
                enable_cors,
                max_body_size: 10_485_760,
            },
            dataset: DatasetConfig::default(),
        };
        Arc::new(AppState::new(&config, Dataset::builtin()))
    }

    fn peer() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 40000))
    }

    async fn get(target: &str) -> (StatusCode, String) {
        let req = Request::builder()
            .method(Method::GET)
            .uri(target)
            .body(())
            .unwrap();
        let resp = handle_request(req, test_state(), peer()).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        (status, body.trim().to_string())
    }

    /// Build a /cafe target with percent-encoded parameters
    fn cafe_target(pairs: &[(&str, &str)]) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in pairs {
            serializer.append_pair(key, value);
        }
        format!("/cafe?{}", serializer.finish())
    }

    #[tokio::test]
    async fn test_cafe_negative() {
        let requests = [
            ("/cafe", StatusCode::BAD_REQUEST, "unknown city"),
            ("/cafe?city=omsk", StatusCode::BAD_REQUEST, "unknown city"),
            (
                "/cafe?city=tula&count=na",
                StatusCode::BAD_REQUEST,
                "incorrect count",
            ),
        ];
        for (target, status, message) in requests {
            let (got_status, got_body) = get(target).await;
            assert_eq!(got_status, status, "target: {target}");
            assert_eq!(got_body, message, "target: {target}");
        }
    }

    #[tokio::test]
    async fn test_cafe_when_ok() {
        let targets = [
            "/cafe?count=2&city=moscow".to_string(),
            "/cafe?city=tula".to_string(),
            cafe_target(&[("city", "moscow"), ("search", "ложка")]),
        ];
        for target in &targets {
            let (status, _) = get(target).await;
            assert_eq!(status, StatusCode::OK, "target: {target}");
        }
    }

    #[tokio::test]
    async fn test_cafe_count() {
        let total = Dataset::builtin().cafes("moscow").unwrap().len();
        let requests = [(0, 0), (1, 1), (2, 2), (100, total.min(100))];

        for (count, want) in requests {
            let (status, body) = get(&format!("/cafe?city=moscow&count={count}")).await;
            assert_eq!(status, StatusCode::OK);

            let got = if body.is_empty() {
                0
            } else {
                body.split(',').count()
            };
            assert_eq!(got, want, "count: {count}");
        }
    }

    #[tokio::test]
    async fn test_cafe_count_zero_is_empty_ok() {
        let (status, body) = get("/cafe?city=moscow&count=0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "");
    }

    #[tokio::test]
    async fn test_cafe_search() {
        let requests = [("фасоль", 0), ("кофе", 2), ("вилка", 1)];

        for (search, want) in requests {
            let target = cafe_target(&[("city", "moscow"), ("search", search)]);
            let (status, body) = get(&target).await;
            assert_eq!(status, StatusCode::OK);

            let needle = search.to_uppercase();
            let got = body
                .split(',')
                .filter(|name| name.to_uppercase().contains(&needle))
                .count();
            assert_eq!(got, want, "search: {search}");
        }
    }

    #[tokio::test]
    async fn test_cafe_idempotent() {
        let target = cafe_target(&[("city", "moscow"), ("search", "кофе"), ("count", "2")]);
        let first = get(&target).await;
        let second = get(&target).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let (status, _) = get("/coffee").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        for target in ["/healthz", "/readyz"] {
            let (status, body) = get(target).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.contains("ok"));
        }
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/cafe?city=moscow")
            .body(())
            .unwrap();
        let resp = handle_request(req, test_state(), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_options_preflight() {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/cafe")
            .body(())
            .unwrap();
        let resp = handle_request(req, test_state(), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers().get("Allow").unwrap(), "GET, HEAD, OPTIONS");
        // CORS disabled: no CORS headers on the preflight
        assert!(resp.headers().get("Access-Control-Allow-Origin").is_none());
    }

    #[tokio::test]
    async fn test_options_preflight_with_cors() {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/cafe")
            .body(())
            .unwrap();
        let resp = handle_request(req, test_state_with_cors(true), peer())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Methods").unwrap(),
            "GET, HEAD, OPTIONS"
        );
    }

    #[tokio::test]
    async fn test_body_too_large() {
        let req = Request::builder()
            .method(Method::GET)
            .uri("/cafe?city=moscow")
            .header("content-length", "999999999999")
            .body(())
            .unwrap();
        let resp = handle_request(req, test_state(), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_head_has_empty_body() {
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/cafe?city=moscow")
            .body(())
            .unwrap();
        let resp = handle_request(req, test_state(), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }
}
