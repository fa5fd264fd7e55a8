use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

static API_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#).unwrap());

/// API key scraped from a watch page. Valid for one pipeline run only.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep keys out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({} chars)", self.0.len())
    }
}

/// Find the `INNERTUBE_API_KEY` value embedded in the page's config script.
pub fn extract_credential(html: &str) -> Result<Credential> {
    API_KEY_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|key| Credential::new(key.as_str()))
        .ok_or(Error::CredentialNotFound)
}
