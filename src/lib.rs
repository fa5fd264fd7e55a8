//! Fetch caption tracks for a YouTube video and turn them into clean transcripts.
//!
//! The pipeline loads the watch page, scrapes the InnerTube API key from it,
//! asks the player API for the caption catalog, then downloads and cleans the
//! timed-text payload of the chosen track. [`TranscriptClient`] drives it.

pub mod catalog;
pub mod config;
pub mod credential;
pub mod error;
pub mod innertube;
pub mod normalize;
pub mod output;
pub mod payload;
pub mod transcript;
pub mod transport;

pub use catalog::{CaptionTrack, Playability, TrackCatalog, TrackKind};
pub use config::ClientConfig;
pub use error::{Error, Result, Stage, StageError};
pub use payload::CaptionSegment;
pub use transcript::{Transcript, TranscriptClient};
pub use transport::{HttpTransport, Transport};
