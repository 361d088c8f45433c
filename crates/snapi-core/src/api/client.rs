use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Method, StatusCode};
use serde_json::{json, Value};

use crate::{config::Config, errors::Error, Result};

use super::{ApiError, NormalizedResult, Operation, SnapiApi};

/// Total time budget of a single request, body included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `reqwest` implementation of [`SnapiApi`].
///
/// One attempt per call; callers re-invoke to retry.
#[derive(Clone, Debug)]
pub struct SnapiClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl SnapiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, api_key, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("snapi-bot/0.1")
            .build()
            .map_err(|e| Error::External(format!("http client build failed: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.snapi_url.clone(), cfg.snapi_api_key.clone())
    }

    fn url(&self, op: Operation) -> String {
        format!("{}/{}", self.base_url, op.path())
    }

    async fn request(&self, op: Operation) -> std::result::Result<Value, ApiError> {
        let method = match op {
            Operation::CheckDialog(_) => Method::POST,
            Operation::ApiInfo | Operation::UsageStats => Method::GET,
        };

        let mut req = self
            .http
            .request(method, self.url(op))
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json");
        if let Operation::CheckDialog(user_id) = op {
            req = req.json(&json!({ "user_id": user_id.0 }));
        }

        let resp = req.send().await.map_err(classify)?;
        let status = resp.status();
        tracing::debug!(operation = op.path(), status = status.as_u16(), "SNAPI response");

        match status {
            StatusCode::OK => resp.json::<Value>().await.map_err(classify),
            StatusCode::UNAUTHORIZED => Err(ApiError::Auth),
            StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimit),
            other => {
                let body = resp.text().await.map_err(classify)?;
                Err(ApiError::Protocol {
                    status: other.as_u16(),
                    body,
                })
            }
        }
    }
}

fn classify(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Transport(e.to_string())
    }
}

#[async_trait]
impl SnapiApi for SnapiClient {
    async fn call(&self, op: Operation) -> NormalizedResult {
        match self.request(op).await {
            Ok(body) => NormalizedResult::from_body(body),
            Err(err) => {
                if let ApiError::Transport(details) = &err {
                    tracing::error!(operation = op.path(), error = %details, "SNAPI request failed");
                }
                NormalizedResult::from(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use mockito::Matcher;
    use tokio::{io::AsyncWriteExt, net::TcpListener};

    use super::*;
    use crate::{api::Status, domain::UserId};

    const KEY: &str = "test-key";

    /// Log sink for asserting on what the client reports.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    /// Serves a 503 whose body is shorter than its content-length, then
    /// either holds the socket open or closes it.
    async fn truncated_error_server(hold: bool) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((mut socket, _)) = listener.accept().await {
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 100\r\n\r\npartial",
                    )
                    .await;
                let _ = socket.flush().await;
                if hold {
                    held.push(socket);
                }
            }
        });
        addr
    }

    fn all_ops() -> [(Operation, &'static str); 3] {
        [
            (Operation::CheckDialog(UserId(42)), "POST"),
            (Operation::ApiInfo, "GET"),
            (Operation::UsageStats, "GET"),
        ]
    }

    #[tokio::test]
    async fn check_dialog_posts_user_id_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/check-dialog")
            .match_header("authorization", "Bearer test-key")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"user_id": 42})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"found","user_id":42}"#)
            .create_async()
            .await;

        let client = SnapiClient::new(server.url(), KEY).unwrap();
        let res = client.call(Operation::CheckDialog(UserId(42))).await;

        mock.assert_async().await;
        assert_eq!(res.status, Status::Found);
        assert_eq!(res.raw, json!({"status": "found", "user_id": 42}));
    }

    #[tokio::test]
    async fn get_endpoints_pass_body_through() {
        let mut server = mockito::Server::new_async().await;
        let info = server
            .mock("GET", "/api-info")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(r#"{"name":"SNAPI","version":"1.2"}"#)
            .create_async()
            .await;
        let stats = server
            .mock("GET", "/usage-stats")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(r#"{"status":"ok","requests_today":17}"#)
            .create_async()
            .await;

        let client = SnapiClient::new(format!("{}/", server.url()), KEY).unwrap();

        let res = client.call(Operation::ApiInfo).await;
        assert_eq!(res.status, Status::Other(None));
        assert_eq!(res.raw, json!({"name": "SNAPI", "version": "1.2"}));

        let res = client.call(Operation::UsageStats).await;
        assert_eq!(res.status, Status::Other(Some("ok".to_string())));
        assert_eq!(res.raw["requests_today"], json!(17));

        info.assert_async().await;
        stats.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_is_invalid_key_for_every_operation() {
        let mut server = mockito::Server::new_async().await;
        let client = SnapiClient::new(server.url(), KEY).unwrap();

        for (op, method) in all_ops() {
            let _m = server
                .mock(method, format!("/{}", op.path()).as_str())
                .with_status(401)
                .with_body(r#"{"status":"found","detail":"ignored"}"#)
                .create_async()
                .await;

            let res = client.call(op).await;
            assert_eq!(res.status, Status::Error);
            assert_eq!(res.message.as_deref(), Some("invalid API key"));
            assert_eq!(res.raw, json!({}));
        }
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limit_for_every_operation() {
        let mut server = mockito::Server::new_async().await;
        let client = SnapiClient::new(server.url(), KEY).unwrap();

        for (op, method) in all_ops() {
            let _m = server
                .mock(method, format!("/{}", op.path()).as_str())
                .with_status(429)
                .create_async()
                .await;

            let res = client.call(op).await;
            assert_eq!(res.status, Status::Error);
            assert_eq!(res.message.as_deref(), Some("API rate limit exceeded"));
        }
    }

    #[tokio::test]
    async fn other_status_reports_code_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/usage-stats")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let client = SnapiClient::new(server.url(), KEY).unwrap();
        let res = client.call(Operation::UsageStats).await;
        assert_eq!(res.status, Status::Error);
        assert_eq!(res.message.as_deref(), Some("HTTP 503: maintenance"));
    }

    #[tokio::test]
    async fn malformed_success_body_is_connection_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api-info")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = SnapiClient::new(server.url(), KEY).unwrap();
        let res = client.call(Operation::ApiInfo).await;
        assert_eq!(res.status, Status::Error);
        assert!(res
            .message
            .as_deref()
            .unwrap_or_default()
            .starts_with("connection error: "));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client =
            SnapiClient::with_timeout(format!("http://{addr}"), KEY, Duration::from_millis(200))
                .unwrap();
        let res = client.call(Operation::CheckDialog(UserId(1))).await;
        assert_eq!(res.status, Status::Error);
        assert_eq!(res.message.as_deref(), Some("request timed out"));
    }

    #[tokio::test]
    async fn refused_connection_is_connection_error() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let client = SnapiClient::new(format!("http://{addr}"), KEY).unwrap();
        let res = client.call(Operation::UsageStats).await;
        assert_eq!(res.status, Status::Error);
        assert!(res
            .message
            .as_deref()
            .unwrap_or_default()
            .starts_with("connection error: "));
    }

    #[tokio::test]
    async fn stalled_error_body_times_out() {
        let addr = truncated_error_server(true).await;

        let client =
            SnapiClient::with_timeout(format!("http://{addr}"), KEY, Duration::from_millis(300))
                .unwrap();
        let res = client.call(Operation::UsageStats).await;
        assert_eq!(res.status, Status::Error);
        assert_eq!(res.message.as_deref(), Some("request timed out"));
    }

    #[tokio::test]
    async fn cut_off_error_body_is_connection_error_and_logged() {
        let addr = truncated_error_server(false).await;
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer({
                let logs = logs.clone();
                move || logs.clone()
            })
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let client = SnapiClient::new(format!("http://{addr}"), KEY).unwrap();
        let res = client.call(Operation::UsageStats).await;
        assert_eq!(res.status, Status::Error);
        assert!(res
            .message
            .as_deref()
            .unwrap_or_default()
            .starts_with("connection error: "));

        let out = logs.contents();
        assert!(out.contains("ERROR"), "{out}");
        assert!(out.contains("SNAPI request failed"), "{out}");
        assert!(out.contains("operation=\"usage-stats\""), "{out}");
    }

    #[tokio::test]
    async fn timeouts_are_not_logged_as_errors() {
        let addr = truncated_error_server(true).await;
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer({
                let logs = logs.clone();
                move || logs.clone()
            })
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let client =
            SnapiClient::with_timeout(format!("http://{addr}"), KEY, Duration::from_millis(200))
                .unwrap();
        let res = client.call(Operation::ApiInfo).await;
        assert_eq!(res.message.as_deref(), Some("request timed out"));
        assert!(!logs.contents().contains("ERROR"));
    }
}
