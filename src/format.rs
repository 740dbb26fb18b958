//! Text formats and output encoding

use serde::Deserialize;

/// How a string is inserted into markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextFormat {
    /// Plain text, markup characters are escaped
    Plain,
    /// Markup, validated by the caller and inserted as-is
    #[default]
    Xhtml,
    /// Markup inserted without any validation
    UnsafeXhtml,
}

/// Append `s` to `out` according to `format`
pub fn write_formatted(out: &mut String, s: &str, format: TextFormat) {
    match format {
        TextFormat::Plain => escape_into(out, s),
        TextFormat::Xhtml | TextFormat::UnsafeXhtml => out.push_str(s),
    }
}

/// Escape special XML characters
pub fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}

/// Rewrites anchors that point to internal paths (`href="#/..."`)
pub trait PathEncoder {
    fn encode(&self, text: &str) -> String;
}

/// Default encoder: `href="#/path"` becomes `href="?_=/path"`
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryPathEncoder;

impl PathEncoder for QueryPathEncoder {
    fn encode(&self, text: &str) -> String {
        const NEEDLE: &str = "href=\"#/";
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(pos) = rest.find(NEEDLE) {
            out.push_str(&rest[..pos]);
            out.push_str("href=\"?_=/");
            rest = &rest[pos + NEEDLE.len()..];
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_is_escaped() {
        let mut out = String::new();
        write_formatted(&mut out, r#"<b>"Tom" & 'Jerry'</b>"#, TextFormat::Plain);
        assert_eq!(out, "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
    }

    #[test]
    fn test_markup_passes_through() {
        let mut out = String::new();
        write_formatted(&mut out, "<b>x</b>", TextFormat::Xhtml);
        write_formatted(&mut out, "<i>y</i>", TextFormat::UnsafeXhtml);
        assert_eq!(out, "<b>x</b><i>y</i>");
    }

    #[test]
    fn test_query_path_encoder() {
        let encoded = QueryPathEncoder.encode(r##"<a href="#/docs">d</a> <a href="#top">t</a>"##);
        assert_eq!(encoded, r##"<a href="?_=/docs">d</a> <a href="#top">t</a>"##);
    }
}
