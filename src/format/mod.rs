//! Turns raw reply text into renderable lines of text and hyperlink segments.

use once_cell::sync::Lazy;
use regex::Regex;

// Markdown form first so `[label](https://...)` is consumed whole instead of
// being split into a bare URL.
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)|https?://\S+").unwrap());

/// Anchor attributes: open in a new browsing context without handing the
/// opened page referrer or opener access.
pub const LINK_TARGET: &str = "_blank";
pub const LINK_REL: &str = "noopener noreferrer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Link { label: String, href: String },
}

pub type Line = Vec<Segment>;

/// Splits `raw` on newlines and scans each line left to right for bare URLs
/// and markdown links. Pure and stateless: equal input, equal output.
pub fn format_message(raw: &str) -> Vec<Line> {
    raw.split('\n').map(format_line).collect()
}

fn format_line(line: &str) -> Line {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in LINK_RE.captures_iter(line) {
        let matched = caps.get(0).expect("whole-match group always present");
        if matched.start() > cursor {
            segments.push(Segment::Text(line[cursor..matched.start()].to_string()));
        }
        segments.push(match (caps.get(1), caps.get(2)) {
            (Some(label), Some(href)) => Segment::Link {
                label: label.as_str().to_string(),
                href: href.as_str().to_string(),
            },
            // Bare URL: the URL is its own label.
            _ => Segment::Link {
                label: matched.as_str().to_string(),
                href: matched.as_str().to_string(),
            },
        });
        cursor = matched.end();
    }

    if cursor < line.len() {
        segments.push(Segment::Text(line[cursor..].to_string()));
    }
    segments
}

/// Renders formatted lines as an HTML fragment, `<br>` between lines and
/// anchors carrying [`LINK_TARGET`]/[`LINK_REL`]. All text is escaped.
pub fn render_html(lines: &[Line]) -> String {
    let mut html = String::new();
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            html.push_str("<br>");
        }
        for segment in line {
            match segment {
                Segment::Text(text) => html.push_str(&escape(text)),
                Segment::Link { label, href } => {
                    html.push_str(&format!(
                        r#"<a href="{}" target="{}" rel="{}">{}</a>"#,
                        escape(href),
                        LINK_TARGET,
                        LINK_REL,
                        escape(label)
                    ));
                }
            }
        }
    }
    html
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
