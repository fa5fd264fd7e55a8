use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::credential::Credential;
use crate::error::{Error, Result};

static VIDEO_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9A-Za-z_-]{11}$").unwrap());

/// Body of the `youtubei/v1/player` call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRequest<'a> {
    pub context: RequestContext<'a>,
    pub video_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RequestContext<'a> {
    pub client: ClientContext<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContext<'a> {
    pub client_name: &'a str,
    pub client_version: &'a str,
    pub hl: &'a str,
    pub gl: &'a str,
}

impl<'a> PlayerRequest<'a> {
    pub fn new(config: &'a ClientConfig, video_id: &'a str) -> Self {
        Self {
            context: RequestContext {
                client: ClientContext {
                    client_name: &config.client_name,
                    client_version: &config.client_version,
                    hl: &config.hl,
                    gl: &config.gl,
                },
            },
            video_id,
        }
    }
}

pub fn watch_url(config: &ClientConfig, video_id: &str) -> Result<String> {
    endpoint(config, "/watch", "v", video_id)
}

pub fn player_url(config: &ClientConfig, key: &Credential) -> Result<String> {
    endpoint(config, "/youtubei/v1/player", "key", key.as_str())
}

/// `{base_url}{path}?{name}={value}` with the value percent-encoded.
fn endpoint(config: &ClientConfig, path: &str, name: &str, value: &str) -> Result<String> {
    let base = config.base_url.trim_end_matches('/');
    let url = url::Url::parse_with_params(&format!("{}{}", base, path), &[(name, value)])?;
    Ok(url.into())
}

/// Parse video ID from various YouTube URL formats or raw ID
pub fn parse_video_id(input: &str) -> Result<String> {
    let input = input.trim();

    if VIDEO_ID_RE.is_match(input) {
        return Ok(input.to_string());
    }

    let with_scheme = if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    let url = url::Url::parse(&with_scheme).map_err(|_| Error::InvalidVideoId(input.to_string()))?;
    let host = url.host_str().unwrap_or("");

    let candidate = if host == "youtu.be" {
        url.path_segments().and_then(|mut s| s.next()).map(str::to_string)
    } else if host == "youtube.com" || host.ends_with(".youtube.com") {
        url.query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned())
            .or_else(|| {
                // /embed/ID, /shorts/ID, /live/ID, /v/ID
                let segments: Vec<&str> = url.path_segments()?.collect();
                match segments.as_slice() {
                    ["embed" | "shorts" | "live" | "v", id, ..] => Some(id.to_string()),
                    _ => None,
                }
            })
    } else {
        None
    };

    candidate
        .filter(|id| VIDEO_ID_RE.is_match(id))
        .ok_or_else(|| Error::InvalidVideoId(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_id() {
        // Raw ID
        assert_eq!(parse_video_id("dQw4w9WgXcQ").unwrap(), "dQw4w9WgXcQ");

        // Standard watch URL
        assert_eq!(
            parse_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );

        // Short URL with tracking query
        assert_eq!(
            parse_video_id("https://youtu.be/_NuH3D4SN-c?si=VSFea_rMwtaiR8Q7").unwrap(),
            "_NuH3D4SN-c"
        );

        // No scheme, shorts path
        assert_eq!(
            parse_video_id("youtube.com/shorts/dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );

        // Invalid
        assert!(parse_video_id("invalid").is_err());
        assert!(parse_video_id("https://example.com/watch?v=dQw4w9WgXcQ").is_err());
    }

    #[test]
    fn test_player_request_shape() {
        let config = ClientConfig::default();
        let body = serde_json::to_value(PlayerRequest::new(&config, "abc")).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "context": {
                    "client": {
                        "clientName": "WEB",
                        "clientVersion": "2.20210721.00.00",
                        "hl": "en",
                        "gl": "US"
                    }
                },
                "videoId": "abc"
            })
        );
    }

    #[test]
    fn test_endpoint_urls() {
        let config = ClientConfig {
            base_url: "http://mock".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(watch_url(&config, "abc").unwrap(), "http://mock/watch?v=abc");
        assert_eq!(
            player_url(&config, &Credential::new("K1")).unwrap(),
            "http://mock/youtubei/v1/player?key=K1"
        );
    }

    #[test]
    fn test_endpoint_values_are_encoded() {
        let config = ClientConfig {
            base_url: "http://mock/".to_string(),
            ..ClientConfig::default()
        };

        let url = watch_url(&config, "abc&x=1").unwrap();
        assert_eq!(url, "http://mock/watch?v=abc%26x%3D1");
        let parsed = url::Url::parse(&url).unwrap();
        assert_eq!(parsed.query_pairs().count(), 1);

        assert_eq!(
            player_url(&config, &Credential::new("a b#c")).unwrap(),
            "http://mock/youtubei/v1/player?key=a+b%23c"
        );
    }

    #[test]
    fn test_bad_base_url() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(watch_url(&config, "abc"), Err(Error::InvalidUrl(_))));
    }
}
