use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";
pub const DEFAULT_CLIENT_NAME: &str = "WEB";
pub const DEFAULT_CLIENT_VERSION: &str = "2.20210721.00.00";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Client identity and locale sent to the platform, plus transport knobs.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host of the watch page and player API, without trailing slash.
    pub base_url: String,
    pub client_name: String,
    pub client_version: String,
    /// Interface language.
    pub hl: String,
    /// Content region.
    pub gl: String,
    pub user_agent: String,
    /// Per-request deadline. `None` waits as long as the server does.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
            hl: "en".to_string(),
            gl: "US".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Value for the `Accept-Language` header, e.g. `en-US`.
    pub fn accept_language(&self) -> String {
        format!("{}-{}", self.hl, self.gl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.client_name, "WEB");
        assert_eq!(config.client_version, "2.20210721.00.00");
        assert_eq!(config.accept_language(), "en-US");
        assert!(config.timeout.is_none());
    }
}
