use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("Could not find INNERTUBE_API_KEY in video page")]
    CredentialNotFound,

    #[error("Failed to decode player response: {0}")]
    CatalogDecode(#[from] serde_json::Error),

    #[error("Video not playable: {reason}")]
    VideoNotPlayable { reason: String },

    #[error("No transcripts available for this video")]
    NoTracksAvailable,

    #[error("Transcript for language '{0}' not found")]
    LanguageNotFound(String),

    #[error("Failed to parse caption payload: {0}")]
    PayloadParse(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid YouTube URL or video ID: {0}")]
    InvalidVideoId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Step of the transcript pipeline that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchPage,
    ExtractCredential,
    FetchCatalog,
    DecodeCatalog,
    SelectTrack,
    FetchPayload,
    ParsePayload,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            Stage::FetchPage => "fetching video page",
            Stage::ExtractCredential => "extracting API key",
            Stage::FetchCatalog => "calling player API",
            Stage::DecodeCatalog => "decoding caption tracks",
            Stage::SelectTrack => "selecting caption track",
            Stage::FetchPayload => "fetching caption payload",
            Stage::ParsePayload => "parsing caption payload",
        };
        f.write_str(step)
    }
}

/// An [`Error`] tagged with the pipeline stage it came from.
#[derive(Error, Debug)]
#[error("{stage} failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

impl StageError {
    pub fn kind(&self) -> &Error {
        &self.source
    }

    pub fn into_inner(self) -> Error {
        self.source
    }
}

/// Attach a [`Stage`] to the error side of a core result.
pub(crate) trait StageExt<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, StageError>;
}

impl<T> StageExt<T> for Result<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, StageError> {
        self.map_err(|source| {
            tracing::debug!(%stage, error = %source, "pipeline stage failed");
            StageError { stage, source }
        })
    }
}
