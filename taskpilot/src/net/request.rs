//! The request intent passed between coordinator and dispatcher.

use reqwest::{
    Method,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use serde::Serialize;
use serde_json::Value;

use super::errors::ApiResult;

/// Whether a request has already been replayed after a token refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Attempt {
    #[default]
    Fresh,
    RetriedOnce,
}

/// One HTTP call, kept only long enough to replay it once.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub method: Method,
    /// Path relative to the base URL, starting with `/`
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Extra headers, applied over the defaults
    pub headers: HeaderMap,
    pub body: Option<Value>,
    /// Attach the current access token as a bearer header
    pub authorize: bool,
    pub attempt: Attempt,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            authorize: true,
            attempt: Attempt::Fresh,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` if `body` cannot be represented as JSON.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Send without a bearer token. A 401 on such a request is a plain
    /// failure, never a reason to refresh.
    pub fn anonymous(mut self) -> Self {
        self.authorize = false;
        self
    }

    /// Mark as the single replay after a refresh.
    pub fn retried(mut self) -> Self {
        self.attempt = Attempt::RetriedOnce;
        self
    }

    pub fn is_retry(&self) -> bool {
        self.attempt == Attempt::RetriedOnce
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_request_defaults() {
        let request = PendingRequest::get("/api/v1/projects");
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/api/v1/projects");
        assert!(request.authorize);
        assert_eq!(request.attempt, Attempt::Fresh);
        assert!(request.body.is_none());
        assert!(request.query.is_empty());
    }

    #[test]
    fn test_json_body() {
        let request = PendingRequest::post("/api/v1/projects")
            .json(&json!({ "name": "Apollo" }))
            .unwrap();
        assert_eq!(request.body, Some(json!({ "name": "Apollo" })));
    }

    #[test]
    fn test_retried_marks_attempt() {
        let request = PendingRequest::get("/x");
        assert!(!request.is_retry());
        let request = request.retried();
        assert!(request.is_retry());
        assert_eq!(request.attempt, Attempt::RetriedOnce);
    }

    #[test]
    fn test_query_builder() {
        let request = PendingRequest::get("/api/v1/notifications")
            .query("unread_only", true)
            .query_pairs(vec![("limit".to_string(), "20".to_string())]);
        assert_eq!(
            request.query,
            vec![
                ("unread_only".to_string(), "true".to_string()),
                ("limit".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_anonymous_disables_bearer() {
        assert!(!PendingRequest::post("/api/v1/auth/login").anonymous().authorize);
    }
}
