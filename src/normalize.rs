use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Turn raw caption text into plain text.
///
/// Entities are decoded and `<...>` spans dropped, repeatedly, until neither
/// changes the text any more; the result is then trimmed. Payloads that are
/// escaped twice (`&amp;lt;b&amp;gt;`) therefore come out clean, and
/// `normalize(normalize(x)) == normalize(x)` holds for every input.
pub fn normalize(raw: &str) -> String {
    let mut text = raw.to_string();
    loop {
        let next = {
            let decoded = html_escape::decode_html_entities(&text);
            TAG_RE.replace_all(&decoded, "").into_owned()
        };
        if next == text {
            break;
        }
        text = next;
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_and_entities() {
        assert_eq!(normalize("<b>Hi &amp; bye</b>  "), "Hi & bye");
        assert_eq!(normalize("&lt;i&gt;Hello&lt;/i&gt;"), "Hello");
        assert_eq!(normalize("it&#39;s &quot;fine&quot;"), "it's \"fine\"");
        assert_eq!(normalize("line one<br/>line two"), "line oneline two");
        assert_eq!(normalize("\n  [Music]\t"), "[Music]");
    }

    #[test]
    fn test_double_escaped() {
        assert_eq!(normalize("&amp;lt;b&amp;gt;bold&amp;lt;/b&amp;gt;"), "bold");
        assert_eq!(normalize("Tom &amp;amp; Jerry"), "Tom & Jerry");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(normalize("just words"), "just words");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("2 > 1"), "2 > 1");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "<b>Hi &amp; bye</b>  ",
            "&amp;lt;i&amp;gt;x&amp;lt;/i&amp;gt;",
            "a &lt; b &gt; c",
            "  &nbsp;padded&nbsp; ",
            "&amp;#60;tag&amp;#62;",
            "<unterminated",
            "&",
            "",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", input);
        }
    }
}
