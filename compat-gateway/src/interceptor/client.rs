use reqwest::{Client, Method, Request, RequestBuilder, Response};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::UrlRewriter;

pub type SocketStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// HTTP and socket client whose three entry points (`fetch`/`execute`,
/// `open`, `connect_socket`) pass every target through the rewriter.
#[derive(Clone)]
pub struct InterceptingClient {
    inner: Client,
    rewriter: Arc<UrlRewriter>,
}

impl InterceptingClient {
    pub fn new(rewriter: UrlRewriter) -> Self {
        Self::with_client(Client::new(), rewriter)
    }

    pub fn with_client(inner: Client, rewriter: UrlRewriter) -> Self {
        log::info!(
            "[interceptor] initialized, legacy hosts routed to {}",
            rewriter.base()
        );
        Self {
            inner,
            rewriter: Arc::new(rewriter),
        }
    }

    pub fn rewriter(&self) -> &UrlRewriter {
        &self.rewriter
    }

    /// Fetch-style call on a plain URL
    pub async fn fetch(&self, url: &str) -> reqwest::Result<Response> {
        self.inner.get(self.rewriter.rewrite(url)).send().await
    }

    /// Fetch-style call on a prepared request. The request is only touched
    /// when its URL actually changes.
    pub async fn execute(&self, mut request: Request) -> reqwest::Result<Response> {
        if let Some(url) = self.rewriter.rewrite_url(request.url()) {
            *request.url_mut() = url;
        }
        self.inner.execute(request).await
    }

    /// XHR-style `open(method, url)`
    pub fn open(&self, method: Method, url: &str) -> RequestBuilder {
        self.inner.request(method, self.rewriter.rewrite(url))
    }

    /// Streaming-socket connect. An `http(s)` target produced by the rewrite
    /// is dialed as `ws(s)`.
    pub async fn connect_socket(&self, url: &str, protocols: &[&str]) -> Result<SocketStream, WsError> {
        let target = socket_scheme(&self.rewriter.rewrite(url));
        let mut request = target.as_str().into_client_request()?;

        if !protocols.is_empty() {
            let value = HeaderValue::from_str(&protocols.join(", "))
                .map_err(|e| WsError::HttpFormat(e.into()))?;
            request.headers_mut().insert("Sec-WebSocket-Protocol", value);
        }

        let (stream, _response) = connect_async(request).await?;
        Ok(stream)
    }
}

fn socket_scheme(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        url.to_string()
    }
}
