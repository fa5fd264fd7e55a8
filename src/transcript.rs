use serde::Serialize;

use crate::catalog::{decode_catalog, select_track, CaptionTrack, TrackCatalog};
use crate::config::ClientConfig;
use crate::credential::extract_credential;
use crate::error::{Error, Result, Stage, StageError, StageExt};
use crate::innertube::{player_url, watch_url, PlayerRequest};
use crate::normalize::normalize;
use crate::payload::{parse_payload, CaptionSegment};
use crate::transport::{HttpTransport, Transport};

/// Caption text of one track, in payload order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    pub video_id: String,
    pub track: CaptionTrack,
    pub segments: Vec<CaptionSegment>,
}

impl Transcript {
    /// Clean every segment's text in place.
    pub fn normalize(&mut self) {
        for segment in &mut self.segments {
            segment.text = normalize(&segment.text);
        }
    }

    /// All segment texts, one per line.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Runs the watch page → API key → player API → caption payload pipeline.
///
/// Every call scrapes a fresh API key. Calls share the transport, and with it
/// the cookie session.
pub struct TranscriptClient<T = HttpTransport> {
    transport: T,
    config: ClientConfig,
}

impl TranscriptClient<HttpTransport> {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self { transport, config })
    }
}

impl<T: Transport> TranscriptClient<T> {
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch the caption catalog for a video. Playability is reported, not enforced.
    pub async fn fetch_catalog(&self, video_id: &str) -> std::result::Result<TrackCatalog, StageError> {
        tracing::info!(video_id, "fetching video page");
        let page_url = watch_url(&self.config, video_id).at(Stage::FetchPage)?;
        let html = self.transport.get_text(&page_url).await.at(Stage::FetchPage)?;

        let key = extract_credential(&html).at(Stage::ExtractCredential)?;
        tracing::debug!(video_id, ?key, "extracted API key");

        let body = serde_json::to_vec(&PlayerRequest::new(&self.config, video_id))
            .map_err(Error::from)
            .at(Stage::FetchCatalog)?;
        let api_url = player_url(&self.config, &key).at(Stage::FetchCatalog)?;
        let json = self
            .transport
            .post_json(&api_url, body)
            .await
            .at(Stage::FetchCatalog)?;

        let catalog = decode_catalog(&json).at(Stage::DecodeCatalog)?;
        tracing::info!(video_id, tracks = catalog.tracks.len(), "caption catalog fetched");
        Ok(catalog)
    }

    /// List every caption track of a video, whether or not it is playable.
    pub async fn list_transcripts(&self, video_id: &str) -> std::result::Result<Vec<CaptionTrack>, StageError> {
        Ok(self.fetch_catalog(video_id).await?.tracks)
    }

    /// Fetch and clean the transcript in `language`, or the first track when
    /// no language (or an empty one) is given.
    pub async fn get_transcript(
        &self,
        video_id: &str,
        language: Option<&str>,
    ) -> std::result::Result<Transcript, StageError> {
        let catalog = self.fetch_catalog(video_id).await?;

        let track = select_track(&catalog, language)
            .at(Stage::SelectTrack)?
            .clone();
        tracing::info!(
            video_id,
            language = %track.language_code,
            kind = track.kind.as_str(),
            "caption track selected"
        );

        let xml = self
            .transport
            .get_text(&track.base_url)
            .await
            .at(Stage::FetchPayload)?;

        let segments = parse_payload(&xml).at(Stage::ParsePayload)?;

        let mut transcript = Transcript {
            video_id: video_id.to_string(),
            track,
            segments,
        };
        transcript.normalize();

        tracing::info!(video_id, segments = transcript.segments.len(), "transcript ready");
        Ok(transcript)
    }
}
