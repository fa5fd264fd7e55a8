use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Manual,
    /// Automatic speech recognition (`kind: "asr"`).
    Automatic,
}

impl TrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Manual => "manual",
            TrackKind::Automatic => "automatic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionTrack {
    /// Platform-issued, time-limited payload URL.
    pub base_url: String,
    pub name: String,
    pub language_code: String,
    pub kind: TrackKind,
    pub is_translatable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playability {
    Ok,
    Unplayable {
        status: String,
        reason: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackCatalog {
    pub tracks: Vec<CaptionTrack>,
    pub playability: Playability,
}

// Wire shape of the player response. Everything is optional: the caption
// section is absent for videos without captions.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    #[serde(default)]
    playability_status: Option<RawPlayability>,
    #[serde(default)]
    captions: Option<RawCaptions>,
}

#[derive(Debug, Deserialize)]
struct RawPlayability {
    #[serde(default)]
    status: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCaptions {
    #[serde(default)]
    player_captions_tracklist_renderer: Option<RawTracklist>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTracklist {
    #[serde(default)]
    caption_tracks: Vec<RawTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrack {
    base_url: String,
    #[serde(default)]
    name: Option<RawName>,
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    is_translatable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawName {
    #[serde(default)]
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<RawRun>,
}

#[derive(Debug, Deserialize)]
struct RawRun {
    #[serde(default)]
    text: String,
}

impl From<RawTrack> for CaptionTrack {
    fn from(raw: RawTrack) -> Self {
        let name = raw
            .name
            .and_then(|n| {
                n.simple_text.or_else(|| {
                    let joined: String = n.runs.into_iter().map(|r| r.text).collect();
                    (!joined.is_empty()).then_some(joined)
                })
            })
            .unwrap_or_else(|| raw.language_code.clone());

        let kind = match raw.kind.as_deref() {
            Some("asr") => TrackKind::Automatic,
            _ => TrackKind::Manual,
        };

        CaptionTrack {
            base_url: raw.base_url,
            name,
            language_code: raw.language_code,
            kind,
            is_translatable: raw.is_translatable,
        }
    }
}

/// Decode a player API response into its caption tracks and playability.
pub fn decode_catalog(json: &[u8]) -> Result<TrackCatalog> {
    let response: PlayerResponse = serde_json::from_slice(json)?;

    // An absent status block counts the same as an empty status: not OK.
    let playability = match response.playability_status {
        Some(ps) if ps.status == "OK" => Playability::Ok,
        Some(ps) => Playability::Unplayable {
            status: ps.status,
            reason: ps.reason.filter(|r| !r.is_empty()),
        },
        None => Playability::Unplayable {
            status: String::new(),
            reason: None,
        },
    };

    let tracks: Vec<CaptionTrack> = response
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .map(|r| r.caption_tracks)
        .unwrap_or_default()
        .into_iter()
        .map(CaptionTrack::from)
        .collect();

    tracing::debug!(tracks = tracks.len(), ?playability, "decoded caption catalog");

    Ok(TrackCatalog { tracks, playability })
}

/// Pick the track to fetch.
///
/// An empty or absent language code takes the first track in platform order.
/// Otherwise the first track whose code matches exactly is returned.
pub fn select_track<'a>(catalog: &'a TrackCatalog, language: Option<&str>) -> Result<&'a CaptionTrack> {
    if let Playability::Unplayable { status, reason } = &catalog.playability {
        let reason = match (reason, status.as_str()) {
            (Some(reason), _) => reason.clone(),
            (None, "") => "no playability status in player response".to_string(),
            (None, status) => status.to_string(),
        };
        return Err(Error::VideoNotPlayable { reason });
    }

    let first = catalog.tracks.first().ok_or(Error::NoTracksAvailable)?;

    match language {
        None | Some("") => Ok(first),
        Some(code) => catalog
            .tracks
            .iter()
            .find(|t| t.language_code == code)
            .ok_or_else(|| Error::LanguageNotFound(code.to_string())),
    }
}
