use crate::error::{AnnouncerError, Result};
use crate::router_api::models::request::system_status_request::SystemStatusRequest;
use crate::router_api::models::response::system_status_response::SystemStatusResponse;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, REFERER};
use reqwest::{Method, Request};
use std::time::Duration;
use tracing::{debug, trace, warn};

pub const VERIFICATION_KEY_HEADER: &str = "_TclRequestVerificationKey";
pub const DEFAULT_ROUTER_ADDRESS: &str = "192.168.1.1";

#[derive(Clone)]
pub struct RouterClient {
    client: reqwest::Client,
    url: String,
    headers: HeaderMap,
    request: SystemStatusRequest,
}

impl RouterClient {
    pub fn new(
        request_key: &str,
        router_address: &str,
        jrd_id: i64,
        request_timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(VERIFICATION_KEY_HEADER.as_bytes())?,
            HeaderValue::from_str(request_key)?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(&format!("http://{}/index.html", router_address))?,
        );

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: format!("http://{}/jrd/webapi", router_address),
            headers,
            request: SystemStatusRequest::new(jrd_id),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The POST sent on every poll; identical each time it is built.
    pub fn build_request(&self) -> Result<Request> {
        Ok(self
            .client
            .request(Method::POST, &self.url)
            .headers(self.headers.clone())
            .json(&self.request)
            .build()?)
    }
}

impl RouterApiTrait for RouterClient {
    async fn get_system_status(&self) -> Result<SystemStatusResponse> {
        let request = self.build_request()?;
        let response = self.client.execute(request).await?;

        // Routers answer verification failures with a JSON-RPC error and a 200,
        // so the status line carries little; only note it.
        let status = response.status();
        if !status.is_success() {
            warn!("Router answered {} for {}", status, &self.url);
        }

        let contents = response.text().await?;
        trace!("Router response body: {}", &contents);
        let decoded: SystemStatusResponse =
            serde_json::from_str(&contents).map_err(|source| AnnouncerError::Decode {
                body: contents.clone(),
                source,
            })?;

        if let Some(error) = &decoded.error {
            warn!(
                "Router returned JSON-RPC error {:?}: {}",
                error.code,
                error.message.as_deref().unwrap_or("<no message>")
            );
        }
        if decoded.reading().is_absent() {
            debug!("Reply carried no SignalStrength");
        }
        if let Some(status) = &decoded.result {
            debug!(
                network = ?status.network_name,
                network_type = ?status.network_type,
                connection_status = ?status.connection_status,
                "System status received"
            );
        }
        Ok(decoded)
    }
}

pub trait RouterApiTrait {
    fn get_system_status(
        &self,
    ) -> impl std::future::Future<Output = Result<SystemStatusResponse>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router_api::models::signal_strength::{SignalReading, SignalStrength};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves one HTTP exchange with a canned reply and hands back the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
                if request_complete(&received) {
                    break;
                }
            }
            let reply = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&received).to_string()
        });
        (address, handle)
    }

    /// Accepts one connection and never answers it.
    async fn accept_and_stall() -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let handle = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });
        (address, handle)
    }

    fn request_complete(received: &[u8]) -> bool {
        let text = String::from_utf8_lossy(received);
        let Some(head_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..head_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        received.len() >= head_end + 4 + content_length
    }

    #[test]
    fn builds_the_documented_request() {
        let client = RouterClient::new("ABC123", "10.0.0.1", 7, None).unwrap();
        let request = client.build_request().unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().as_str(), "http://10.0.0.1/jrd/webapi");
        assert_eq!(
            request.headers().get(VERIFICATION_KEY_HEADER).unwrap(),
            "ABC123"
        );
        assert!(
            request
                .headers()
                .keys()
                .any(|name| name.as_str().eq_ignore_ascii_case(VERIFICATION_KEY_HEADER))
        );
        assert_eq!(
            request.headers().get(REFERER).unwrap(),
            "http://10.0.0.1/index.html"
        );
        assert_eq!(
            request.body().and_then(|b| b.as_bytes()).unwrap(),
            br#"{"id":"7","jsonrpc":"2.0","method":"GetSystemStatus","params":{}}"#
        );
    }

    #[test]
    fn requests_are_identical_across_polls() {
        let client = RouterClient::new("ABC123", DEFAULT_ROUTER_ADDRESS, 1, None).unwrap();
        let first = client.build_request().unwrap();
        let second = client.build_request().unwrap();

        assert_eq!(first.url(), second.url());
        assert_eq!(first.headers(), second.headers());
        assert_eq!(
            first.body().and_then(|b| b.as_bytes()),
            second.body().and_then(|b| b.as_bytes())
        );
    }

    #[test]
    fn rejects_keys_that_cannot_be_header_values() {
        let result = RouterClient::new("bad\nkey", DEFAULT_ROUTER_ADDRESS, 1, None);
        assert!(matches!(result, Err(AnnouncerError::InvalidHeader(_))));
    }

    #[tokio::test]
    async fn posts_and_decodes_signal_strength() {
        let (address, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"jsonrpc":"2.0","id":"1","result":{"SignalStrength":-70}}"#,
        )
        .await;
        let client = RouterClient::new("ABC123", &address, 1, Some(Duration::from_secs(5))).unwrap();

        let response = client.get_system_status().await.unwrap();
        assert_eq!(response.reading(), SignalReading::from(SignalStrength::Level(-70)));

        let raw = server.await.unwrap().to_ascii_lowercase();
        assert!(raw.starts_with("post /jrd/webapi http/1.1"));
        assert!(raw.contains("_tclrequestverificationkey: abc123"));
        assert!(raw.contains(&format!("referer: http://{}/index.html", address)));
        assert!(raw.contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn ignores_http_status() {
        let (address, _server) = serve_once(
            "HTTP/1.1 500 Internal Server Error",
            r#"{"result":{"SignalStrength":2}}"#,
        )
        .await;
        let client = RouterClient::new("ABC123", &address, 1, None).unwrap();

        let response = client.get_system_status().await.unwrap();
        assert_eq!(response.reading(), SignalReading::from(SignalStrength::Level(2)));
    }

    #[tokio::test]
    async fn invalid_json_is_a_decode_error() {
        let (address, _server) = serve_once("HTTP/1.1 200 OK", "<html>login</html>").await;
        let client = RouterClient::new("ABC123", &address, 1, None).unwrap();

        match client.get_system_status().await {
            Err(AnnouncerError::Decode { body, .. }) => assert_eq!(body, "<html>login</html>"),
            other => panic!("expected decode error, got {:?}", other.map(|r| r.reading())),
        }
    }

    #[tokio::test]
    async fn array_body_is_a_decode_error() {
        let (address, _server) =
            serve_once("HTTP/1.1 200 OK", r#"[{"SignalStrength":3}]"#).await;
        let client = RouterClient::new("ABC123", &address, 1, None).unwrap();

        assert!(matches!(
            client.get_system_status().await,
            Err(AnnouncerError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn silent_router_times_out_as_network_error() {
        let (address, server) = accept_and_stall().await;
        let client =
            RouterClient::new("ABC123", &address, 1, Some(Duration::from_millis(100))).unwrap();

        let started = std::time::Instant::now();
        match client.get_system_status().await {
            Err(AnnouncerError::Network(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {:?}", other.map(|r| r.reading())),
        }
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }

    #[tokio::test]
    async fn unreachable_router_is_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);
        let client = RouterClient::new("ABC123", &address, 1, Some(Duration::from_secs(2))).unwrap();

        assert!(matches!(
            client.get_system_status().await,
            Err(AnnouncerError::Network(_))
        ));
    }
}
