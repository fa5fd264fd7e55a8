use std::fmt::Write as _;

use clap::ValueEnum;
use console::style;

use crate::catalog::{CaptionTrack, TrackKind};
use crate::transcript::Transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One caption line per row
    Text,
    /// Lines prefixed with [MM:SS]
    Timestamped,
    /// SubRip subtitles
    Srt,
    /// Transcript and track metadata as JSON
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text | OutputFormat::Timestamped => "txt",
            OutputFormat::Srt => "srt",
            OutputFormat::Json => "json",
        }
    }
}

/// Render a transcript. Segments with no text are skipped except in JSON.
pub fn render(transcript: &Transcript, format: OutputFormat) -> serde_json::Result<String> {
    let lines = transcript.segments.iter().filter(|s| !s.text.is_empty());
    let mut out = String::new();

    match format {
        OutputFormat::Text => {
            for seg in lines {
                let _ = writeln!(out, "{}", seg.text);
            }
        }
        OutputFormat::Timestamped => {
            for seg in lines {
                let _ = writeln!(out, "[{}] {}", clock(seg.start), seg.text);
            }
        }
        OutputFormat::Srt => {
            for (i, seg) in lines.enumerate() {
                let _ = writeln!(
                    out,
                    "{}\n{} --> {}\n{}\n",
                    i + 1,
                    srt_time(seg.start),
                    srt_time(seg.end()),
                    seg.text
                );
            }
        }
        OutputFormat::Json => {
            out = serde_json::to_string_pretty(transcript)?;
            out.push('\n');
        }
    }

    Ok(out)
}

/// `MM:SS`, or `H:MM:SS` past the first hour.
fn clock(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

fn srt_time(seconds: f64) -> String {
    let ms = (seconds.max(0.0) * 1000.0).round() as u64;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        ms / 3_600_000,
        (ms % 3_600_000) / 60_000,
        (ms % 60_000) / 1000,
        ms % 1000
    )
}

/// Print available caption tracks in a table
pub fn print_tracks(tracks: &[CaptionTrack]) {
    if tracks.is_empty() {
        println!("{}", style("No transcripts found for this video.").yellow());
        return;
    }

    println!();
    println!(
        "{:<8}  {:<10}  {}",
        style("LANG").bold().underlined(),
        style("KIND").bold().underlined(),
        style("NAME").bold().underlined(),
    );

    for track in tracks {
        let lang = match track.kind {
            TrackKind::Manual => style(&track.language_code).green(),
            TrackKind::Automatic => style(&track.language_code).blue(),
        };
        let name = if track.is_translatable {
            format!("{} {}", track.name, style("(translatable)").dim())
        } else {
            track.name.clone()
        };

        println!("{:<8}  {:<10}  {}", lang, track.kind.as_str(), name);
    }

    println!();
    println!(
        "{} = uploaded captions  {} = auto-generated",
        style("green").green(),
        style("blue").blue(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::CaptionSegment;

    fn transcript() -> Transcript {
        Transcript {
            video_id: "vid".to_string(),
            track: CaptionTrack {
                base_url: "U".to_string(),
                name: "English".to_string(),
                language_code: "en".to_string(),
                kind: TrackKind::Automatic,
                is_translatable: false,
            },
            segments: vec![
                CaptionSegment { start: 0.0, duration: 2.5, text: "Hello".to_string() },
                CaptionSegment { start: 2.5, duration: 0.0, text: String::new() },
                CaptionSegment { start: 3661.2, duration: 1.25, text: "Later".to_string() },
            ],
        }
    }

    #[test]
    fn test_render_text() {
        let out = render(&transcript(), OutputFormat::Text).unwrap();
        assert_eq!(out, "Hello\nLater\n");
    }

    #[test]
    fn test_render_timestamped() {
        let out = render(&transcript(), OutputFormat::Timestamped).unwrap();
        assert_eq!(out, "[00:00] Hello\n[1:01:01] Later\n");
    }

    #[test]
    fn test_render_srt() {
        let out = render(&transcript(), OutputFormat::Srt).unwrap();
        assert_eq!(
            out,
            "1\n00:00:00,000 --> 00:00:02,500\nHello\n\n2\n01:01:01,200 --> 01:01:02,450\nLater\n\n"
        );
    }

    #[test]
    fn test_render_json() {
        let out = render(&transcript(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["video_id"], "vid");
        assert_eq!(value["track"]["kind"], "automatic");
        assert_eq!(value["segments"].as_array().unwrap().len(), 3);
        assert_eq!(value["segments"][0]["duration"], 2.5);
    }

    #[test]
    fn test_extension() {
        assert_eq!(OutputFormat::Srt.extension(), "srt");
        assert_eq!(OutputFormat::Timestamped.extension(), "txt");
    }
}
