use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::Serialize;

use crate::error::{Error, Result};

const ROOT: &[u8] = b"transcript";
const SEGMENT: &[u8] = b"text";

/// One timed line of a caption payload. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionSegment {
    pub start: f64,
    pub duration: f64,
    pub text: String,
}

impl CaptionSegment {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Parse a timed-text document (`<transcript><text start=".." dur="..">..</text>...</transcript>`).
///
/// Segment text is returned as found: entity escapes are left in place and
/// inline elements are written back out as tags, so that
/// [`normalize`](crate::normalize::normalize) sees exactly what the platform sent.
pub fn parse_payload(body: &str) -> Result<Vec<CaptionSegment>> {
    let mut reader = Reader::from_str(body);

    let mut segments = Vec::new();
    let mut current: Option<CaptionSegment> = None;
    let mut depth = 0usize;
    let mut root_seen = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::PayloadParse(format!("{} at byte {}", e, reader.buffer_position()))
        })?;

        match event {
            Event::Start(e) => {
                if depth == 0 {
                    open_root(&e, &mut root_seen)?;
                } else if depth == 1 && e.name().as_ref() == SEGMENT {
                    current = Some(open_segment(&e)?);
                } else if let Some(seg) = current.as_mut() {
                    seg.text.push('<');
                    seg.text.push_str(&utf8(&e)?);
                    seg.text.push('>');
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if depth == 0 {
                    open_root(&e, &mut root_seen)?;
                } else if depth == 1 && e.name().as_ref() == SEGMENT {
                    segments.push(open_segment(&e)?);
                } else if let Some(seg) = current.as_mut() {
                    seg.text.push('<');
                    seg.text.push_str(&utf8(&e)?);
                    seg.text.push_str("/>");
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if depth == 1 {
                    if let Some(seg) = current.take() {
                        segments.push(seg);
                    }
                } else if let Some(seg) = current.as_mut() {
                    seg.text.push_str("</");
                    seg.text.push_str(&utf8(e.name().as_ref())?);
                    seg.text.push('>');
                }
            }
            Event::Text(t) => {
                let text = utf8(&t)?;
                if depth == 0 {
                    if !text.trim().is_empty() {
                        return Err(Error::PayloadParse(
                            "text outside of <transcript> root".to_string(),
                        ));
                    }
                } else if let Some(seg) = current.as_mut() {
                    seg.text.push_str(&text);
                }
            }
            Event::CData(t) => {
                if let Some(seg) = current.as_mut() {
                    seg.text.push_str(&utf8(&t)?);
                }
            }
            Event::Eof => break,
            // declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    if depth != 0 {
        return Err(Error::PayloadParse("unexpected end of document".to_string()));
    }
    if !root_seen {
        return Err(Error::PayloadParse("missing <transcript> root".to_string()));
    }

    tracing::debug!(segments = segments.len(), "parsed caption payload");
    Ok(segments)
}

fn open_root(element: &BytesStart, root_seen: &mut bool) -> Result<()> {
    if *root_seen {
        return Err(Error::PayloadParse("multiple root elements".to_string()));
    }
    if element.name().as_ref() != ROOT {
        return Err(Error::PayloadParse(format!(
            "unexpected root element <{}>",
            String::from_utf8_lossy(element.name().as_ref())
        )));
    }
    *root_seen = true;
    Ok(())
}

fn open_segment(element: &BytesStart) -> Result<CaptionSegment> {
    Ok(CaptionSegment {
        start: seconds_attr(element, "start")?,
        duration: seconds_attr(element, "dur")?,
        text: String::new(),
    })
}

/// Missing or empty attributes read as zero. Any other value must be a float.
fn seconds_attr(element: &BytesStart, name: &str) -> Result<f64> {
    let attr = element
        .try_get_attribute(name)
        .map_err(|e| Error::PayloadParse(e.to_string()))?;

    let Some(attr) = attr else {
        return Ok(0.0);
    };

    let value = attr
        .unescape_value()
        .map_err(|e| Error::PayloadParse(e.to_string()))?;
    let value = value.trim();
    if value.is_empty() {
        return Ok(0.0);
    }

    value
        .parse::<f64>()
        .map_err(|_| Error::PayloadParse(format!("invalid {} value '{}'", name, value)))
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| Error::PayloadParse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments_in_order() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.0" dur="2.5">&lt;i&gt;Hello&lt;/i&gt;</text><text start="2.5" dur="3.0">World &amp;amp; friends</text></transcript>"#;
        let segments = parse_payload(xml).unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[0].duration, 2.5);
        assert_eq!(segments[0].text, "&lt;i&gt;Hello&lt;/i&gt;");
        assert_eq!(segments[1].start, 2.5);
        assert_eq!(segments[1].duration, 3.0);
        assert_eq!(segments[1].end(), 5.5);
        assert_eq!(segments[1].text, "World &amp;amp; friends");
    }

    #[test]
    fn test_inline_markup_is_kept() {
        let xml = r#"<transcript><text start="1" dur="1"><i>Hello</i><br/>there</text></transcript>"#;
        let segments = parse_payload(xml).unwrap();
        assert_eq!(segments[0].text, "<i>Hello</i><br/>there");
    }

    #[test]
    fn test_parse_then_normalize() {
        use crate::normalize::normalize;

        let xml = r#"<transcript><text start="0.0" dur="2.5"><i>Hello</i></text><text start="2.5" dur="3.0">World &amp; friends</text></transcript>"#;
        let segments = parse_payload(xml).unwrap();

        let timing: Vec<(f64, f64)> = segments.iter().map(|s| (s.start, s.duration)).collect();
        let text: Vec<String> = segments.iter().map(|s| normalize(&s.text)).collect();
        assert_eq!(timing, vec![(0.0, 2.5), (2.5, 3.0)]);
        assert_eq!(text, vec!["Hello", "World & friends"]);
    }

    #[test]
    fn test_missing_duration_defaults_to_zero() {
        let xml = "<transcript>\n  <text start=\"4.2\">a</text>\n  <text start=\"5\" dur=\"\">b</text>\n  <text start=\"6\" dur=\"0\"/>\n</transcript>";
        let segments = parse_payload(xml).unwrap();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].start, 4.2);
        assert_eq!(segments[0].duration, 0.0);
        assert_eq!(segments[1].duration, 0.0);
        assert_eq!(segments[2].start, 6.0);
        assert_eq!(segments[2].text, "");
    }

    #[test]
    fn test_unusual_timings_are_kept() {
        let xml = r#"<transcript><text start="-0.5" dur="1">a</text><text start="1" dur="inf">b</text><text start="1e1" dur="NaN">c</text></transcript>"#;
        let segments = parse_payload(xml).unwrap();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].start, -0.5);
        assert!(segments[1].duration.is_infinite());
        assert_eq!(segments[2].start, 10.0);
        assert!(segments[2].duration.is_nan());
    }

    #[test]
    fn test_empty_transcript() {
        assert!(parse_payload("<transcript></transcript>").unwrap().is_empty());
        assert!(parse_payload("<transcript/>").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_payloads() {
        let bad = [
            "",
            "not xml at all",
            "<html><body>Error 404</body></html>",
            "<transcript><text start=\"1\">unclosed",
            "<transcript><text start=\"1\">x</b></transcript>",
            "<transcript><text start=\"soon\">x</text></transcript>",
            "<transcript></transcript><transcript></transcript>",
        ];
        for body in bad {
            assert!(
                matches!(parse_payload(body), Err(Error::PayloadParse(_))),
                "expected parse error for {:?}",
                body
            );
        }
    }
}
