use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, CONTENT_TYPE};

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// HTTP access used by the transcript pipeline.
///
/// Implementations must keep cookies set by one call and send them on later
/// calls: the player API checks the session opened by the watch page.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and return the body of a 2xx response.
    async fn get_text(&self, url: &str) -> Result<String>;

    /// POST a JSON `body` to `url` and return the raw body of a 2xx response.
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>>;
}

/// [`Transport`] over `reqwest` with one cookie jar per instance.
///
/// Clones share the client and the jar. The jar locks internally, so clones
/// may be used from concurrent tasks.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    jar: Arc<Jar>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let jar = Arc::new(Jar::default());

        let accept_language = config.accept_language();
        let accept_language = HeaderValue::from_str(&accept_language).map_err(|_| {
            Error::InvalidConfig(format!(
                "hl/gl do not form a valid Accept-Language header: {:?}",
                accept_language
            ))
        })?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT_LANGUAGE, accept_language);

        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(default_headers)
            .cookie_provider(Arc::clone(&jar));

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            jar,
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!(url = %response.url(), status = status.as_u16(), "request failed");
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        tracing::debug!(
            url = %response.url(),
            status = status.as_u16(),
            session = self.jar.cookies(response.url()).is_some(),
            "response received"
        );
        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &str) -> Result<String> {
        tracing::debug!(%url, "GET");
        let response = self.send(self.client.get(url)).await?;
        let body = response.text().await?;
        tracing::debug!(bytes = body.len(), "body read");
        Ok(body)
    }

    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        tracing::debug!(%url, bytes = body.len(), "POST");
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let response = self.send(request).await?;
        let body = response.bytes().await?;
        tracing::debug!(bytes = body.len(), "body read");
        Ok(body.to_vec())
    }
}
