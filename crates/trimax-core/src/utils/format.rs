use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Excerpt length shown on post cards
pub const EXCERPT_MAX_CHARS: usize = 150;

/// Reading speed used for reading time estimates
const WORDS_PER_MINUTE: usize = 200;

/// Remove HTML tags and entities from rendered content.
/// Entities become a space, matching how cards display excerpts.
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut chars = html.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '<' => {
                // Unterminated tags are kept as text
                let rest: String = chars.clone().collect();
                match rest.find('>') {
                    Some(end) => {
                        for _ in 0..=rest[..end].chars().count() {
                            chars.next();
                        }
                    }
                    None => out.push(c),
                }
            }
            '&' => {
                let rest: String = chars.clone().take(32).collect();
                match rest.find(';') {
                    Some(end) if end > 0 => {
                        for _ in 0..=rest[..end].chars().count() {
                            chars.next();
                        }
                        out.push(' ');
                    }
                    _ => out.push(c),
                }
            }
            _ => out.push(c),
        }
    }

    out.trim().to_string()
}

/// Truncate to `max_chars` characters, appending "..." when cut.
pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

/// Rough reading time for HTML content, e.g. "3 min read".
pub fn reading_time(content_html: &str) -> String {
    let words = strip_html(content_html).split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{} min read", minutes)
}

/// Format a backend date as "March 5, 2025".
///
/// Accepts RFC 3339, the zone-less `YYYY-MM-DDTHH:MM:SS` the GraphQL API
/// returns, or a bare date. Anything else is returned unchanged.
pub fn format_date(date: &str) -> String {
    const DISPLAY: &str = "%B %-d, %Y";

    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        dt.format(DISPLAY).to_string()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S") {
        dt.format(DISPLAY).to_string()
    } else if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        d.format(DISPLAY).to_string()
    } else {
        date.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello <strong>world</strong></p>\n"), "Hello world");
        assert_eq!(strip_html("Fast&nbsp;builds&hellip;"), "Fast builds");
        assert_eq!(strip_html("a < b"), "a < b");
        assert_eq!(strip_html("R&D"), "R&D");
        assert_eq!(strip_html(""), "");
    }

    #[test]
    fn test_truncate_excerpt() {
        assert_eq!(truncate_excerpt("Hello", 10), "Hello");
        assert_eq!(truncate_excerpt("Hello World", 5), "Hello...");
        assert_eq!(truncate_excerpt("héllo", 2), "hé...");
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time(""), "1 min read");
        assert_eq!(reading_time(&"word ".repeat(200)), "1 min read");
        assert_eq!(reading_time(&format!("<p>{}</p>", "word ".repeat(201))), "2 min read");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-03-05T09:30:00"), "March 5, 2025");
        assert_eq!(format_date("2025-03-05T09:30:00+00:00"), "March 5, 2025");
        assert_eq!(format_date("2025-12-25"), "December 25, 2025");
        assert_eq!(format_date("soon"), "soon");
    }
}
