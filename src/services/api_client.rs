//! HTTP client for the congress API.
//!
//! Mutating calls carry the anti-forgery token the API issues through a
//! cookie (or through the body of `GET /api/csrf/`), and are retried exactly
//! once when the API rejects a stale token. Everything else, network
//! failures included, propagates to the caller untouched.

use std::sync::Arc;
use std::time::Duration;

use cookie::Cookie;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::CONTENT_TYPE;
use reqwest::{multipart, Client, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use tracing::warn;

use crate::config::AppConfig;
use crate::error::ClientError;

/// Header the API checks on every state-changing request.
const CSRF_HEADER: &str = "X-CSRFToken";

/// How long to give a `Set-Cookie` from the token endpoint to land in the
/// jar before re-reading it. Cooperative wait, not a blocking sleep.
const TOKEN_COOKIE_DELAY: Duration = Duration::from_millis(150);

pub struct ApiClient {
    http: Client,
    jar: Arc<Jar>,
    base: Url,
    base_str: String,
    token_cookie: String,
}

/// Body of a mutating call. Multipart parts are kept as owned data so a
/// retry can rebuild the request, file bytes included.
pub enum PostBody {
    Json(Value),
    Multipart(Vec<FormField>),
}

pub enum FormField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

/// A fully materialized upstream response. Reading the body eagerly lets the
/// CSRF check and the JSON parse both look at it without fighting over a
/// consumed stream.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub body: String,
}

impl ApiResponse {
    async fn read(resp: reqwest::Response) -> Result<Self, ClientError> {
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = resp.text().await?;
        Ok(Self {
            status,
            content_type,
            body,
        })
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// A 403 whose body names the anti-forgery mechanism. Any other 403 is not
/// ours to recover from.
pub fn is_csrf_rejection(resp: &ApiResponse) -> bool {
    resp.status == StatusCode::FORBIDDEN && resp.body.to_lowercase().contains("csrf")
}

pub fn parse_json_response(resp: &ApiResponse) -> Result<Value, ClientError> {
    if !resp.content_type.to_ascii_lowercase().contains("json") {
        return Err(ClientError::NonJsonResponse {
            content_type: resp.content_type.clone(),
            preview: preview(&resp.body),
        });
    }
    serde_json::from_str(&resp.body).map_err(ClientError::MalformedJson)
}

fn preview(body: &str) -> String {
    const LIMIT: usize = 200;
    if body.len() <= LIMIT {
        return body.to_string();
    }
    let mut end = LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        let base = Url::parse(&config.api_base).map_err(|e| {
            ClientError::Api(format!(
                "invalid API base URL `{}`: {}",
                config.api_base, e
            ))
        })?;
        let jar = Arc::new(Jar::default());
        let http = Client::builder().cookie_provider(jar.clone()).build()?;
        Ok(Self {
            http,
            jar,
            base,
            base_str: config.api_base.trim_end_matches('/').to_string(),
            token_cookie: config.token_cookie.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_str, path)
    }

    fn cookie_value(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.base)?;
        let header = header.to_str().ok()?.to_string();
        Cookie::split_parse(header)
            .filter_map(|c| c.ok())
            .find(|c| c.name() == name)
            .map(|c| c.value().to_string())
    }

    /// The API session cookies are overwritten with expired entries; the jar
    /// drops them on insert.
    fn clear_session_cookies(&self) {
        for name in [self.token_cookie.as_str(), "sessionid"] {
            let mut expired = Cookie::new(name.to_string(), "");
            expired.set_path("/");
            expired.set_max_age(cookie::time::Duration::ZERO);
            self.jar.add_cookie_str(&expired.to_string(), &self.base);
        }
    }

    /// Current anti-forgery token. Reads the cookie first; otherwise asks the
    /// token endpoint, preferring a token carried in its JSON body over
    /// waiting for the cookie to land. Returns an empty string when nothing
    /// can be obtained; callers send anyway and let the API reject.
    pub async fn ensure_token(&self) -> String {
        if let Some(token) = self.cookie_value(&self.token_cookie) {
            if !token.is_empty() {
                return token;
            }
        }

        let resp = match self.http.get(self.endpoint("/api/csrf/")).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("token endpoint unreachable: {}", e);
                return String::new();
            }
        };

        if let Ok(body) = resp.json::<Value>().await {
            if let Some(token) = body.get("csrfToken").and_then(|v| v.as_str()) {
                if !token.is_empty() {
                    return token.to_string();
                }
            }
        }

        tokio::time::sleep(TOKEN_COOKIE_DELAY).await;
        self.cookie_value(&self.token_cookie).unwrap_or_default()
    }

    /// Read-only JSON call, cookies included.
    pub async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        let resp = self.http.get(self.endpoint(path)).send().await?;
        let resp = ApiResponse::read(resp).await?;
        if !resp.is_success() {
            return Err(ClientError::Api(format!(
                "GET {} respondió {}",
                path, resp.status
            )));
        }
        parse_json_response(&resp)
    }

    /// State-changing call with the anti-forgery token attached. One retry
    /// on a token rejection; the second response is returned to the caller
    /// unmodified whatever its status.
    pub async fn post_with_token(
        &self,
        path: &str,
        body: &PostBody,
    ) -> Result<ApiResponse, ClientError> {
        let token = self.ensure_token().await;
        let first = self.send_post(path, body, &token).await?;
        if !is_csrf_rejection(&first) {
            return Ok(first);
        }

        warn!("anti-forgery token rejected by {}, retrying once", path);
        self.clear_session_cookies();
        let token = self.ensure_token().await;
        self.send_post(path, body, &token).await
    }

    async fn send_post(
        &self,
        path: &str,
        body: &PostBody,
        token: &str,
    ) -> Result<ApiResponse, ClientError> {
        let req = self
            .http
            .post(self.endpoint(path))
            .header(CSRF_HEADER, token);
        let resp = apply_body(req, body).send().await?;
        ApiResponse::read(resp).await
    }
}

fn apply_body(req: RequestBuilder, body: &PostBody) -> RequestBuilder {
    match body {
        PostBody::Json(value) => req.json(value),
        PostBody::Multipart(fields) => {
            let mut form = multipart::Form::new();
            for field in fields {
                form = match field {
                    FormField::Text { name, value } => form.text(name.clone(), value.clone()),
                    FormField::File {
                        name,
                        file_name,
                        content_type,
                        bytes,
                    } => form.part(name.clone(), file_part(file_name, content_type, bytes)),
                };
            }
            req.multipart(form)
        }
    }
}

fn file_part(file_name: &str, content_type: &str, bytes: &[u8]) -> multipart::Part {
    let part = multipart::Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
    // Browsers occasionally report junk content types; fall back to the
    // untyped part rather than failing the upload.
    match part.mime_str(content_type) {
        Ok(typed) => typed,
        Err(_) => multipart::Part::bytes(bytes.to_vec()).file_name(file_name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use axum::http::{header, HeaderMap};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client_for(base: &str) -> ApiClient {
        let config = AppConfig {
            api_base: base.to_string(),
            token_cookie: "csrftoken".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        ApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn token_from_body_wins_without_a_cookie() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new().route(
            "/api/csrf/",
            get({
                let hits = hits.clone();
                move || {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        Json(json!({ "csrfToken": "abc" }))
                    }
                }
            }),
        );
        let base = spawn(app).await;
        let client = client_for(&base);

        assert_eq!(client.ensure_token().await, "abc");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        // The token is not cached: the cookie was never set.
        assert_eq!(client.ensure_token().await, "abc");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn token_falls_back_to_the_cookie() {
        let app = Router::new().route(
            "/api/csrf/",
            get(|| async {
                (
                    [(header::SET_COOKIE, "csrftoken=cookie-tok; Path=/")],
                    Json(json!({})),
                )
            }),
        );
        let base = spawn(app).await;
        let client = client_for(&base);

        assert_eq!(client.ensure_token().await, "cookie-tok");
        // From now on the cookie is read directly, no second round trip.
        assert_eq!(client.ensure_token().await, "cookie-tok");
    }

    #[tokio::test]
    async fn token_is_empty_when_nothing_is_issued() {
        let app = Router::new().route("/api/csrf/", get(|| async { Json(json!({})) }));
        let base = spawn(app).await;
        let client = client_for(&base);

        assert_eq!(client.ensure_token().await, "");
    }

    #[tokio::test]
    async fn csrf_rejection_is_retried_exactly_once_with_a_fresh_token() {
        let token_hits = Arc::new(AtomicUsize::new(0));
        let seen_tokens = Arc::new(Mutex::new(Vec::<String>::new()));
        let post_hits = Arc::new(AtomicUsize::new(0));

        let app = Router::new()
            .route(
                "/api/csrf/",
                get({
                    let token_hits = token_hits.clone();
                    move || {
                        let token_hits = token_hits.clone();
                        async move {
                            let n = token_hits.fetch_add(1, Ordering::SeqCst) + 1;
                            Json(json!({ "csrfToken": format!("tok-{n}") }))
                        }
                    }
                }),
            )
            .route(
                "/api/inscripcion/",
                post({
                    let seen_tokens = seen_tokens.clone();
                    let post_hits = post_hits.clone();
                    move |headers: HeaderMap| {
                        let seen_tokens = seen_tokens.clone();
                        let post_hits = post_hits.clone();
                        async move {
                            let token = headers
                                .get("X-CSRFToken")
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or_default()
                                .to_string();
                            seen_tokens.lock().unwrap().push(token);
                            if post_hits.fetch_add(1, Ordering::SeqCst) == 0 {
                                (
                                    StatusCode::FORBIDDEN,
                                    "CSRF Failed: CSRF token missing or incorrect.",
                                )
                                    .into_response()
                            } else {
                                Json(json!({ "message": "ok" })).into_response()
                            }
                        }
                    }
                }),
            );
        let base = spawn(app).await;
        let client = client_for(&base);

        let body = PostBody::Json(json!({ "nombre": "Ana" }));
        let resp = client.post_with_token("/api/inscripcion/", &body).await.unwrap();

        assert_eq!(resp.status, StatusCode::OK);
        // One token per attempt, refreshed in between.
        assert_eq!(token_hits.load(Ordering::SeqCst), 2);
        assert_eq!(post_hits.load(Ordering::SeqCst), 2);
        assert_eq!(
            *seen_tokens.lock().unwrap(),
            vec!["tok-1".to_string(), "tok-2".to_string()]
        );
    }

    #[tokio::test]
    async fn second_rejection_is_returned_unmodified() {
        let post_hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/api/csrf/", get(|| async { Json(json!({ "csrfToken": "t" })) }))
            .route(
                "/api/inscripcion/",
                post({
                    let post_hits = post_hits.clone();
                    move || {
                        let post_hits = post_hits.clone();
                        async move {
                            post_hits.fetch_add(1, Ordering::SeqCst);
                            (StatusCode::FORBIDDEN, "CSRF Failed: still no").into_response()
                        }
                    }
                }),
            );
        let base = spawn(app).await;
        let client = client_for(&base);

        let body = PostBody::Json(json!({}));
        let resp = client.post_with_token("/api/inscripcion/", &body).await.unwrap();

        assert_eq!(resp.status, StatusCode::FORBIDDEN);
        assert!(is_csrf_rejection(&resp));
        // No third attempt.
        assert_eq!(post_hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_csrf_403_is_not_retried() {
        let post_hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/api/csrf/", get(|| async { Json(json!({ "csrfToken": "t" })) }))
            .route(
                "/api/inscripcion/",
                post({
                    let post_hits = post_hits.clone();
                    move || {
                        let post_hits = post_hits.clone();
                        async move {
                            post_hits.fetch_add(1, Ordering::SeqCst);
                            (StatusCode::FORBIDDEN, "cupo agotado").into_response()
                        }
                    }
                }),
            );
        let base = spawn(app).await;
        let client = client_for(&base);

        let resp = client
            .post_with_token("/api/inscripcion/", &PostBody::Json(json!({})))
            .await
            .unwrap();
        assert_eq!(resp.status, StatusCode::FORBIDDEN);
        assert_eq!(post_hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn html_response_is_a_typed_error_never_a_value() {
        let resp = ApiResponse {
            status: StatusCode::OK,
            content_type: "text/html; charset=utf-8".to_string(),
            body: "<!doctype html><title>mantenimiento</title>".to_string(),
        };
        match parse_json_response(&resp) {
            Err(ClientError::NonJsonResponse { preview, .. }) => {
                assert!(preview.contains("mantenimiento"));
            }
            other => panic!("expected NonJsonResponse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_typed_error() {
        let resp = ApiResponse {
            status: StatusCode::OK,
            content_type: "application/json".to_string(),
            body: "{ nope".to_string(),
        };
        assert!(matches!(
            parse_json_response(&resp),
            Err(ClientError::MalformedJson(_))
        ));
    }

    #[test]
    fn preview_is_truncated_on_a_char_boundary() {
        let body = "ñ".repeat(300);
        let p = preview(&body);
        assert!(p.len() < body.len());
        assert!(p.ends_with('…'));
    }

    #[tokio::test]
    async fn get_json_parses_list_endpoints() {
        let app = Router::new().route(
            "/api/programa/",
            get(|| async { Json(json!([{ "titulo": "Apertura" }])) }),
        );
        let base = spawn(app).await;
        let client = client_for(&base);

        let value = client.get_json("/api/programa/").await.unwrap();
        assert_eq!(value[0]["titulo"], "Apertura");
    }
}
