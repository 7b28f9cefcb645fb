//! The request dispatcher: exactly one network call per invocation.

use std::{sync::Arc, time::Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use url::Url;

use super::{
    errors::{ApiError, ApiResult},
    request::PendingRequest,
};
use crate::store::CredentialStore;

/// Requests slower than this are logged at `warn`.
const SLOW_REQUEST_MS: u64 = 1000;

/// Performs one HTTP call against the backend.
///
/// Attaches `Content-Type: application/json` and, for authorized requests,
/// `Authorization: Bearer <token>` read from the store at send time.
/// Non-success responses become a typed [`ApiError`] carrying the status and
/// the parsed body (`{}` when the body is not JSON). No retries and no token
/// handling happen here.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    http: reqwest::Client,
    base_url: String,
    store: Arc<CredentialStore>,
}

impl Dispatcher {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, store: Arc<CredentialStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            store,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Resolve a request path against the base URL.
    pub fn url_for(&self, path: &str) -> ApiResult<Url> {
        let url = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        Ok(Url::parse(&url)?)
    }

    /// Send `request` and return its parsed JSON body.
    ///
    /// An empty success body is returned as `Value::Null`.
    ///
    /// # Errors
    ///
    /// * `Transport` - the backend could not be reached
    /// * `Authorization` / `Validation` / `Server` - non-success status
    /// * `Decode` - a success body that is not JSON
    pub async fn dispatch(&self, request: &PendingRequest) -> ApiResult<Value> {
        let url = self.url_for(&request.path)?;
        let headers = self.headers_for(request)?;

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let start = Instant::now();
        let response = builder.send().await.inspect_err(|e| {
            tracing::debug!(
                http_method = %request.method,
                http_path = %request.path,
                error = %e,
                "API request failed to send"
            );
        })?;
        let status = response.status();

        if !status.is_success() {
            // The status alone decides the error; an unreadable body is `{}`.
            let bytes = response.bytes().await.unwrap_or_default();
            log_api_request(request, status.as_u16(), start.elapsed().as_millis() as u64);
            let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::Object(Default::default()));
            return Err(ApiError::from_status(status.as_u16(), body));
        }

        let bytes = response.bytes().await?;
        log_api_request(request, status.as_u16(), start.elapsed().as_millis() as u64);

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn headers_for(&self, request: &PendingRequest) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if request.authorize
            && let Some(token) = self.store.access_token()
        {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        // Caller-supplied headers win over the defaults.
        headers.extend(request.headers.clone());
        Ok(headers)
    }
}

/// Log a completed API call with structured fields.
fn log_api_request(request: &PendingRequest, status: u16, duration_ms: u64) {
    if duration_ms > SLOW_REQUEST_MS {
        tracing::warn!(
            http_method = %request.method,
            http_path = %request.path,
            http_status = status,
            duration_ms = duration_ms,
            retry = request.is_retry(),
            "Slow API request"
        );
    } else {
        tracing::debug!(
            http_method = %request.method,
            http_path = %request.path,
            http_status = status,
            duration_ms = duration_ms,
            retry = request.is_retry(),
            "API request completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{ACCEPT, HeaderName};

    fn dispatcher(base_url: &str) -> Dispatcher {
        Dispatcher::new(
            reqwest::Client::new(),
            base_url,
            Arc::new(CredentialStore::in_memory()),
        )
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let dispatcher = dispatcher("http://localhost:8000/");
        assert_eq!(dispatcher.base_url(), "http://localhost:8000");
        assert_eq!(
            dispatcher.url_for("/api/v1/projects").unwrap().as_str(),
            "http://localhost:8000/api/v1/projects"
        );
    }

    #[test]
    fn test_url_for_relative_path() {
        let dispatcher = dispatcher("http://localhost:8000");
        assert_eq!(
            dispatcher.url_for("api/v1/tasks").unwrap().as_str(),
            "http://localhost:8000/api/v1/tasks"
        );
    }

    #[test]
    fn test_url_for_malformed_base() {
        let dispatcher = dispatcher("not-a-valid-url");
        assert!(matches!(
            dispatcher.url_for("/api/v1/projects"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_headers_without_token() {
        let dispatcher = dispatcher("http://localhost:8000");
        let headers = dispatcher
            .headers_for(&PendingRequest::get("/api/v1/projects"))
            .unwrap();

        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_headers_attach_current_token() {
        let dispatcher = dispatcher("http://localhost:8000");
        dispatcher.store().set_tokens("A1", "R1").unwrap();

        let headers = dispatcher
            .headers_for(&PendingRequest::get("/api/v1/projects"))
            .unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer A1");

        dispatcher.store().set_tokens("A2", "R1").unwrap();
        let headers = dispatcher
            .headers_for(&PendingRequest::get("/api/v1/projects"))
            .unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer A2");
    }

    #[test]
    fn test_anonymous_request_has_no_bearer() {
        let dispatcher = dispatcher("http://localhost:8000");
        dispatcher.store().set_tokens("A1", "R1").unwrap();

        let headers = dispatcher
            .headers_for(&PendingRequest::post("/api/v1/auth/login").anonymous())
            .unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_caller_headers_override_defaults() {
        let dispatcher = dispatcher("http://localhost:8000");
        let request = PendingRequest::post("/upload")
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_static("abc"),
            );

        let headers = dispatcher.headers_for(&request).unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(headers.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(headers.get("x-request-id").unwrap(), "abc");
    }

    #[test]
    fn test_token_with_invalid_characters() {
        let dispatcher = dispatcher("http://localhost:8000");
        dispatcher.store().set_tokens("bad\ntoken", "R1").unwrap();

        let result = dispatcher.headers_for(&PendingRequest::get("/api/v1/projects"));
        assert!(matches!(result, Err(ApiError::InvalidHeader(_))));
    }

    /// Serve one canned raw HTTP response, then drop the connection.
    async fn serve_raw_once(response: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_truncated_401_body_is_still_authorization_failure() {
        let url = serve_raw_once(
            "HTTP/1.1 401 Unauthorized\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"de",
        )
        .await;
        let dispatcher = dispatcher(&url);

        let err = dispatcher
            .dispatch(&PendingRequest::get("/api/v1/projects"))
            .await
            .unwrap_err();

        assert!(err.is_authorization_failure());
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.body(), Some(&serde_json::json!({})));
    }

    #[tokio::test]
    async fn test_truncated_success_body_is_transport_failure() {
        let url = serve_raw_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n[1,",
        )
        .await;
        let dispatcher = dispatcher(&url);

        let err = dispatcher
            .dispatch(&PendingRequest::get("/api/v1/projects"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), crate::net::ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        let dispatcher = dispatcher("http://127.0.0.1:1");
        let err = dispatcher
            .dispatch(&PendingRequest::get("/api/v1/projects"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Transport(_)));
        assert!(err.is_transient());
    }
}
