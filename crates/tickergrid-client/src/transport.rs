//! HTTP transport abstraction.
//!
//! The client core is transport-agnostic: production traffic goes through
//! [`ReqwestHttpClient`], tests script exact response sequences with
//! [`ScriptedHttpClient`].

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// HTTP method set the API surface needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub const fn is_mutation(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

/// Outgoing request envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            timeout_ms: 10_000,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_json_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.headers
            .insert(String::from("content-type"), String::from("application/json"));
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Response envelope: status plus raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level fault: no HTTP status was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Transport contract.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Production transport over reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent("tickergrid-client/0.1.0")
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(&request.url),
                HttpMethod::Post => self.client.post(&request.url),
                HttpMethod::Put => self.client.put(&request.url),
            };

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            builder = builder.timeout(std::time::Duration::from_millis(request.timeout_ms));
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::new(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    HttpError::new(format!("connection failed: {e}"))
                } else {
                    HttpError::new(format!("request failed: {e}"))
                }
            })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| HttpError::new(format!("failed to read response body: {e}")))?;

            Ok(HttpResponse { status, body })
        })
    }
}

/// Deterministic transport for tests: pops one scripted step per call and
/// records every request it saw.
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
    steps: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new(steps: impl IntoIterator<Item = Result<HttpResponse, HttpError>>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Requests executed so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().expect("script lock is not poisoned").clone()
    }

    pub fn remaining(&self) -> usize {
        self.steps.lock().expect("script lock is not poisoned").len()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            self.seen
                .lock()
                .expect("script lock is not poisoned")
                .push(request);
            self.steps
                .lock()
                .expect("script lock is not poisoned")
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::new("script exhausted")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_client_replays_steps_in_order() {
        let client = ScriptedHttpClient::new([
            Err(HttpError::new("connection reset")),
            Ok(HttpResponse::ok_json("{}")),
        ]);

        let first = client.execute(HttpRequest::get("http://t/one")).await;
        assert!(first.is_err());

        let second = client.execute(HttpRequest::get("http://t/two")).await;
        assert_eq!(second.expect("scripted ok").status, 200);

        let seen = client.requests();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].url, "http://t/one");
        assert_eq!(client.remaining(), 0);
    }

    #[test]
    fn json_body_sets_content_type() {
        let request = HttpRequest::new(HttpMethod::Put, "http://t/stocks/AAPL")
            .with_json_body("{\"name\":\"Apple\"}");
        assert_eq!(
            request.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn mutation_methods_are_flagged() {
        assert!(!HttpMethod::Get.is_mutation());
        assert!(HttpMethod::Post.is_mutation());
        assert!(HttpMethod::Put.is_mutation());
    }
}
