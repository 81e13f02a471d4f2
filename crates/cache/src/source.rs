//! Fetch collaborator: where the raw trending page comes from.

use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

pub const DEFAULT_URL: &str = "https://github.com/explore";
pub const DEFAULT_USER_AGENT: &str = concat!("trendinghubs/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Produces the raw markup of the trending page.
#[async_trait]
pub trait Source: Send + Sync {
    /// Where the markup comes from, used for logging only.
    fn location(&self) -> &str;

    /// Fetch the whole document. Any failure is a [`ErrorKind::Transport`].
    async fn fetch(&self) -> Result<Vec<u8>>;
}

pub type SourceHandle = Arc<dyn Source + Send + Sync>;

/// Fetches the page over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .or_raise(|| ErrorKind::Transport(format!("could not build HTTP client for {url}")))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl Source for HttpSource {
    fn location(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .or_raise(|| ErrorKind::Transport(self.url.clone()))?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Transport(format!("{} responded with {status}", self.url)));
        }
        let body = response.bytes().await.or_raise(|| ErrorKind::Transport(self.url.clone()))?;
        tracing::debug!(%status, size = body.len(), "Fetched source document");
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one canned HTTP response on a random local port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            _ = socket.read(&mut request).await.unwrap();
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{address}/explore")
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let url = serve_once("200 OK", "<ol class=\"ranked-repositories\"></ol>").await;
        let source = HttpSource::new(url, DEFAULT_USER_AGENT, DEFAULT_TIMEOUT).unwrap();
        let body = source.fetch().await.unwrap();
        assert_eq!(body, b"<ol class=\"ranked-repositories\"></ol>");
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_transport_error() {
        let url = serve_once("503 Service Unavailable", "busy").await;
        let source = HttpSource::new(url, DEFAULT_USER_AGENT, DEFAULT_TIMEOUT).unwrap();
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Transport(message) if message.contains("503")));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_is_transport_error() {
        let source = HttpSource::new("not a url", DEFAULT_USER_AGENT, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(source.location(), "not a url");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Transport(_)));
    }
}
