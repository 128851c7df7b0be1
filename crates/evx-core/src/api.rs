//! HTTP client for the monitoring service's JSON API.
//!
//! Every endpoint lives under `{base_url}/api/0`. List endpoints paginate
//! with cursors advertised in the `Link` response header.

use std::fmt;
use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use evx_types::{Event, Release, Repository};
use regex::Regex;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK, USER_AGENT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::ApiSettings;

pub const DEFAULT_BASE_URL: &str = "https://sentry.io";
pub const BASE_URL_ENV_VAR: &str = "EVX_BASE_URL";
pub const AUTH_TOKEN_ENV_VAR: &str = "EVX_AUTH_TOKEN";

const API_PREFIX: &str = "/api/0";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound for `fetch_all_pages`, in case a server keeps advertising
/// more results.
const MAX_PAGES: usize = 100;

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([^>]*)>;\s*rel="([^"]+)";\s*results="(true|false)";\s*cursor="([^"]*)""#)
        .expect("link header regex is a valid pattern")
});

/// Categories of API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Non-2xx response
    HttpStatus,
    Timeout,
    /// Connection failures and other transport errors
    Network,
    /// Response body didn't match the expected shape
    Parse,
    /// A list kept advertising pages past the client's limit
    Pagination,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::Timeout => write!(f, "timeout"),
            ApiErrorKind::Network => write!(f, "network"),
            ApiErrorKind::Parse => write!(f, "parse"),
            ApiErrorKind::Pagination => write!(f, "pagination"),
        }
    }
}

/// Structured API error with kind and details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Raw response body or underlying error, when available
    pub details: Option<String>,
    /// HTTP status for `HttpStatus` errors
    pub status: Option<u16>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            status: None,
        }
    }

    /// Creates an HTTP status error, lifting the API's `detail` field into
    /// the message when the body is JSON.
    pub fn http_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| json.get("detail")?.as_str().map(str::to_string));

        let message = match detail {
            Some(detail) => format!("HTTP {status}: {detail}"),
            None => format!("HTTP {status}"),
        };
        Self {
            kind: ApiErrorKind::HttpStatus,
            message,
            details: (!body.is_empty()).then(|| body.to_string()),
            status: Some(status),
        }
    }

    pub fn parse(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::new(ApiErrorKind::Parse, message)
        }
    }

    fn from_reqwest(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ApiErrorKind::Timeout
        } else {
            ApiErrorKind::Network
        };
        Self {
            details: Some(err.to_string()),
            ..Self::new(kind, "Request to the API failed")
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// API connection configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Creates a config from the `[api]` settings and the environment.
    ///
    /// Base URL resolution: `EVX_BASE_URL` > config > default.
    /// Token resolution: config > `EVX_AUTH_TOKEN`.
    pub fn from_settings(settings: &ApiSettings) -> Result<Self> {
        let env_url = std::env::var(BASE_URL_ENV_VAR).ok();
        let env_token = std::env::var(AUTH_TOKEN_ENV_VAR).ok();

        Ok(Self {
            base_url: resolve_base_url(env_url.as_deref(), settings.effective_base_url())?,
            auth_token: resolve_auth_token(settings.auth_token.as_deref(), env_token.as_deref()),
            timeout: DEFAULT_TIMEOUT,
        })
    }
}

fn resolve_base_url(env_url: Option<&str>, config_url: Option<&str>) -> Result<String> {
    let chosen = [env_url, config_url]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty());

    match chosen {
        Some(url) => {
            Url::parse(url).with_context(|| format!("Invalid API base URL: {url}"))?;
            Ok(url.trim_end_matches('/').to_string())
        }
        None => Ok(DEFAULT_BASE_URL.to_string()),
    }
}

fn resolve_auth_token(config_token: Option<&str>, env_token: Option<&str>) -> Option<String> {
    [config_token, env_token]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|token| !token.is_empty())
        .map(str::to_string)
}

fn bearer_header(token: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}")).context(
        "Invalid auth token: it contains characters that can't be sent in an HTTP header",
    )?;
    value.set_sensitive(true);
    Ok(value)
}

/// One pagination link from the `Link` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub url: String,
    /// Whether the linked page has any results.
    pub results: bool,
    pub cursor: String,
}

/// Pagination links of a list response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub previous: Option<PageLink>,
    pub next: Option<PageLink>,
}

impl PageLinks {
    /// Parses a header such as
    /// `<url>; rel="next"; results="true"; cursor="0:100:0"`.
    /// Unrecognized entries are ignored.
    pub fn parse(header: &str) -> Self {
        let mut links = PageLinks::default();
        for caps in LINK_RE.captures_iter(header) {
            let link = PageLink {
                url: caps[1].to_string(),
                results: &caps[3] == "true",
                cursor: caps[4].to_string(),
            };
            match &caps[2] {
                "previous" => links.previous = Some(link),
                "next" => links.next = Some(link),
                _ => {}
            }
        }
        links
    }

    /// Cursor of the next page, only when that page has results.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next
            .as_ref()
            .filter(|link| link.results)
            .map(|link| link.cursor.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            query: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    #[must_use]
    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Decoded JSON body (`Null` for empty bodies)
    pub body: Value,
    pub links: PageLinks,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub links: PageLinks,
}

/// Monitoring API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
    /// Pre-validated `Authorization` header.
    authorization: Option<HeaderValue>,
    http: reqwest::Client,
}

impl ApiClient {
    /// Fails when the auth token can't be sent as an HTTP header value.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let authorization = config
            .auth_token
            .as_deref()
            .map(bearer_header)
            .transpose()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            config,
            authorization,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("evx/", env!("CARGO_PKG_VERSION"))),
        );
        if let Some(value) = &self.authorization {
            headers.insert(AUTHORIZATION, value.clone());
        }
        headers
    }

    fn url(&self, path: &str, query: &[(String, String)]) -> ApiResult<Url> {
        let mut url = Url::parse(&self.config.base_url).map_err(|e| {
            ApiError::parse(
                format!("Invalid API base URL: {}", self.config.base_url),
                e.to_string(),
            )
        })?;
        let full_path = format!(
            "{}{API_PREFIX}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&full_path);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Sends a request to `{base_url}/api/0{path}` and decodes the JSON body.
    pub async fn request(&self, path: &str, options: RequestOptions) -> ApiResult<ApiResponse> {
        let url = self.url(path, &options.query)?;
        tracing::debug!(method = %options.method, %url, "api request");

        let mut builder = self
            .http
            .request(options.method, url)
            .headers(self.headers());
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        let status = response.status();
        let links = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .map(PageLinks::parse)
            .unwrap_or_default();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), path, "api request failed");
            return Err(ApiError::http_status(status.as_u16(), &text));
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)
                .map_err(|e| ApiError::parse("Response is not valid JSON", e.to_string()))?
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
            links,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<(T, PageLinks)> {
        let response = self.request(path, options).await?;
        let value = serde_json::from_value(response.body).map_err(|e| {
            ApiError::parse(
                format!("Unexpected response shape from {path}"),
                e.to_string(),
            )
        })?;
        Ok((value, response.links))
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        cursor: Option<&str>,
    ) -> ApiResult<Page<T>> {
        let mut options = RequestOptions::default();
        if let Some(cursor) = cursor {
            options = options.with_query("cursor", cursor);
        }
        let (items, links) = self.get_json(path, options).await?;
        Ok(Page { items, links })
    }

    /// Fetches an event body exactly as the API returned it.
    pub async fn fetch_event_json(
        &self,
        org: &str,
        project: &str,
        event_id: &str,
    ) -> ApiResult<Value> {
        let path = format!("/projects/{org}/{project}/events/{event_id}/");
        let response = self.request(&path, RequestOptions::default()).await?;
        Ok(response.body)
    }

    pub async fn fetch_event(&self, org: &str, project: &str, event_id: &str) -> ApiResult<Event> {
        let body = self.fetch_event_json(org, project, event_id).await?;
        serde_json::from_value(body)
            .map_err(|e| ApiError::parse("Unexpected event shape", e.to_string()))
    }

    pub async fn list_repositories(
        &self,
        org: &str,
        cursor: Option<&str>,
    ) -> ApiResult<Page<Repository>> {
        self.get_page(&format!("/organizations/{org}/repos/"), cursor)
            .await
    }

    /// Lists releases of an organization, or of one project when given.
    pub async fn list_releases(
        &self,
        org: &str,
        project: Option<&str>,
        cursor: Option<&str>,
    ) -> ApiResult<Page<Release>> {
        let path = match project {
            Some(project) => format!("/projects/{org}/{project}/releases/"),
            None => format!("/organizations/{org}/releases/"),
        };
        self.get_page(&path, cursor).await
    }
}

/// Collects every page of a list endpoint, following `next` cursors while
/// the server reports more results.
pub async fn fetch_all_pages<T, F, Fut>(mut fetch_page: F) -> ApiResult<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = ApiResult<Page<T>>>,
{
    let mut items = Vec::new();
    let mut cursor = None;

    for _ in 0..MAX_PAGES {
        let page = fetch_page(cursor.take()).await?;
        items.extend(page.items);
        match page.links.next_cursor() {
            Some(next) => cursor = Some(next.to_string()),
            None => return Ok(items),
        }
    }

    tracing::warn!(pages = MAX_PAGES, "stopped following pagination links");
    Err(ApiError {
        details: Some(format!("collected {} item(s) before stopping", items.len())),
        ..ApiError::new(
            ApiErrorKind::Pagination,
            format!("The API advertised more than {MAX_PAGES} pages of results"),
        )
    })
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn can_bind_localhost() -> bool {
        std::net::TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(ApiConfig::new(server.uri()).with_auth_token("secret")).unwrap()
    }

    const LINK_HEADER: &str = concat!(
        r#"<https://sentry.io/api/0/organizations/acme/repos/?&cursor=0:0:1>; rel="previous"; results="false"; cursor="0:0:1", "#,
        r#"<https://sentry.io/api/0/organizations/acme/repos/?&cursor=0:100:0>; rel="next"; results="true"; cursor="0:100:0""#
    );

    #[test]
    fn test_page_links_parse() {
        let links = PageLinks::parse(LINK_HEADER);
        let previous = links.previous.as_ref().unwrap();
        assert!(!previous.results);
        assert_eq!(previous.cursor, "0:0:1");
        assert_eq!(links.next_cursor(), Some("0:100:0"));
        assert!(links.next.unwrap().url.ends_with("cursor=0:100:0"));
    }

    #[test]
    fn test_page_links_without_more_results() {
        let links = PageLinks::parse(
            r#"<https://x/?cursor=1:0:0>; rel="next"; results="false"; cursor="1:0:0""#,
        );
        assert!(links.next.is_some());
        assert_eq!(links.next_cursor(), None);
        assert_eq!(PageLinks::parse("garbage"), PageLinks::default());
    }

    #[test]
    fn test_http_status_extracts_detail() {
        let err = ApiError::http_status(403, r#"{"detail": "You do not have permission"}"#);
        assert_eq!(err.kind, ApiErrorKind::HttpStatus);
        assert_eq!(err.message, "HTTP 403: You do not have permission");
        assert!(err.details.is_some());

        let err = ApiError::http_status(502, "");
        assert_eq!(err.to_string(), "HTTP 502");
        assert_eq!(err.details, None);
    }

    #[test]
    fn test_resolve_base_url_precedence() {
        assert_eq!(
            resolve_base_url(Some("http://env.test/"), Some("http://config.test")).unwrap(),
            "http://env.test"
        );
        assert_eq!(
            resolve_base_url(Some("  "), Some("http://config.test")).unwrap(),
            "http://config.test"
        );
        assert_eq!(resolve_base_url(None, None).unwrap(), DEFAULT_BASE_URL);
        assert!(resolve_base_url(None, Some("not a url")).is_err());
    }

    #[test]
    fn test_resolve_auth_token_prefers_config() {
        assert_eq!(
            resolve_auth_token(Some("cfg"), Some("env")).as_deref(),
            Some("cfg")
        );
        assert_eq!(resolve_auth_token(Some(""), Some("env")).as_deref(), Some("env"));
        assert_eq!(resolve_auth_token(None, None), None);
    }

    #[tokio::test]
    async fn test_request_sends_auth_and_reads_links() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/0/organizations/acme/repos/"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("link", LINK_HEADER)
                    .set_body_json(serde_json::json!([{"id": "1", "name": "acme/web"}])),
            )
            .mount(&server)
            .await;

        let page = client(&server).list_repositories("acme", None).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "acme/web");
        assert_eq!(page.links.next_cursor(), Some("0:100:0"));
    }

    #[tokio::test]
    async fn test_fetch_event_not_found() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/0/projects/acme/web/events/abc/"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"detail": "Event not found"})),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_event("acme", "web", "abc")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message, "HTTP 404: Event not found");
    }

    #[tokio::test]
    async fn test_fetch_event_decodes_entries() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/0/projects/acme/web/events/abc/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "abc",
                "platform": "python",
                "entries": [{"type": "threads", "data": {"values": [{"id": 1, "crashed": true}]}}]
            })))
            .mount(&server)
            .await;

        let event = client(&server)
            .fetch_event("acme", "web", "abc")
            .await
            .unwrap();
        assert_eq!(event.platform(), "python");
        assert_eq!(event.threads().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_event_json_keeps_unmodeled_fields() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let body = serde_json::json!({
            "id": "abc",
            "platform": "python",
            "dateCreated": "2026-03-14T09:26:53Z",
            "tags": [{"key": "level", "value": "error"}],
            "entries": []
        });
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/0/projects/acme/web/events/abc/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;

        let fetched = client(&server)
            .fetch_event_json("acme", "web", "abc")
            .await
            .unwrap();
        assert_eq!(fetched, body);
    }

    #[tokio::test]
    async fn test_fetch_all_pages_follows_cursors() {
        if !can_bind_localhost() {
            eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
            return;
        }
        let server = MockServer::start().await;
        let next = format!(
            r#"<{}/api/0/organizations/acme/releases/?cursor=0:1:0>; rel="next"; results="true"; cursor="0:1:0""#,
            server.uri()
        );
        let last = r#"<x>; rel="next"; results="false"; cursor="0:2:0""#;

        Mock::given(method("GET"))
            .and(path("/api/0/organizations/acme/releases/"))
            .and(query_param("cursor", "0:1:0"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("link", last)
                    .set_body_json(serde_json::json!([{"version": "2.0.0"}])),
            )
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/0/organizations/acme/releases/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("link", next.as_str())
                    .set_body_json(serde_json::json!([{"version": "1.0.0"}])),
            )
            .with_priority(2)
            .mount(&server)
            .await;

        let client = client(&server);
        let releases = fetch_all_pages(|cursor| {
            let client = client.clone();
            async move { client.list_releases("acme", None, cursor.as_deref()).await }
        })
        .await
        .unwrap();

        let versions: Vec<_> = releases.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, ["1.0.0", "2.0.0"]);
    }

    #[test]
    fn test_client_rejects_token_unfit_for_header() {
        let config = ApiConfig::new("http://localhost");

        let err = ApiClient::new(config.clone().with_auth_token("abc\ndef")).unwrap_err();
        assert!(err.to_string().starts_with("Invalid auth token"));
        assert!(!err.to_string().contains("abc"));
        assert!(ApiClient::new(config.with_auth_token("abc")).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_all_pages_fails_past_page_limit() {
        let mut calls = 0;
        let result: ApiResult<Vec<u32>> = fetch_all_pages(|_| {
            calls += 1;
            async {
                Ok(Page {
                    items: vec![1],
                    links: PageLinks::parse(r#"<x>; rel="next"; results="true"; cursor="c""#),
                })
            }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Pagination);
        assert_eq!(calls, MAX_PAGES);
        assert_eq!(
            err.details.as_deref(),
            Some("collected 100 item(s) before stopping")
        );
    }

    #[tokio::test]
    async fn test_fetch_all_pages_propagates_errors() {
        let result: ApiResult<Vec<u32>> = fetch_all_pages(|_| async {
            Err::<Page<u32>, _>(ApiError::new(ApiErrorKind::Network, "offline"))
        })
        .await;
        assert_eq!(result.unwrap_err().kind, ApiErrorKind::Network);
    }
}
