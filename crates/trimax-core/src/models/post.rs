use serde::{Deserialize, Serialize};

use super::connection::{unwrap_node, unwrap_nodes};
use super::{display_title, Author, MediaItem, Term};
use crate::utils::format::EXCERPT_MAX_CHARS;
use crate::utils::{format_date, reading_time, strip_html, truncate_excerpt};

/// A blog post. Fields the current query did not select are `None`/empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: Option<String>,
    pub slug: String,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub date: Option<String>,
    pub modified: Option<String>,
    #[serde(default, deserialize_with = "unwrap_node")]
    pub featured_image: Option<MediaItem>,
    #[serde(default, deserialize_with = "unwrap_node")]
    pub author: Option<Author>,
    #[serde(default, deserialize_with = "unwrap_nodes")]
    pub categories: Vec<Term>,
    #[serde(default, deserialize_with = "unwrap_nodes")]
    pub tags: Vec<Term>,
}

impl Post {
    /// Drafts can come back without a title.
    pub fn display_title(&self) -> &str {
        display_title(self.title.as_deref())
    }

    /// Plain-text excerpt trimmed for cards.
    pub fn excerpt_text(&self) -> String {
        let text = strip_html(self.excerpt.as_deref().unwrap_or_default());
        truncate_excerpt(&text, EXCERPT_MAX_CHARS)
    }

    pub fn date_display(&self) -> Option<String> {
        self.date.as_deref().map(format_date)
    }

    /// "Updated" date, only when it differs from the publish date.
    pub fn modified_display(&self) -> Option<String> {
        match (self.date.as_deref(), self.modified.as_deref()) {
            (Some(date), Some(modified)) if date != modified => Some(format_date(modified)),
            _ => None,
        }
    }

    pub fn reading_time(&self) -> Option<String> {
        self.content.as_deref().map(reading_time)
    }

    pub fn primary_category(&self) -> Option<&Term> {
        self.categories.first()
    }

    pub fn author_name(&self) -> &str {
        self.author.as_ref().map(|a| a.name.as_str()).unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSlug {
    pub slug: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST_JSON: &str = r#"{
        "id": "cG9zdDoxMjM=",
        "title": "Shipping faster with ISR",
        "content": "<p>Static pages, rebuilt on demand.</p>",
        "excerpt": "<p>Static pages, rebuilt&nbsp;on demand.</p>\n",
        "slug": "shipping-faster-with-isr",
        "date": "2025-03-05T09:30:00",
        "modified": "2025-03-07T11:00:00",
        "featuredImage": {
            "node": {
                "sourceUrl": "http://localhost:10010/wp-content/uploads/isr.png",
                "altText": "",
                "mediaDetails": {"width": 1200, "height": 630}
            }
        },
        "author": {"node": {"name": "Dana", "slug": "dana", "avatar": {"url": "https://secure.gravatar.com/avatar/x"}}},
        "categories": {"nodes": [{"name": "Engineering", "slug": "engineering"}]},
        "tags": {"nodes": []}
    }"#;

    #[test]
    fn test_parse_post_unwraps_nodes() {
        let post: Post = serde_json::from_str(POST_JSON).expect("Failed to parse post test JSON");

        let image = post.featured_image.as_ref().expect("featured image");
        assert_eq!(image.media_details.map(|d| d.width), Some(Some(1200)));
        assert_eq!(image.alt_or(post.display_title()), "Shipping faster with ISR");

        let author = post.author.as_ref().expect("author");
        assert_eq!(author.avatar_url(), Some("https://secure.gravatar.com/avatar/x"));
        assert_eq!(post.author_name(), "Dana");
        assert_eq!(post.primary_category().map(|c| c.slug.as_str()), Some("engineering"));
        assert!(post.tags.is_empty());
    }

    #[test]
    fn test_display_helpers() {
        let post: Post = serde_json::from_str(POST_JSON).expect("Failed to parse post test JSON");
        assert_eq!(post.excerpt_text(), "Static pages, rebuilt on demand.");
        assert_eq!(post.date_display().as_deref(), Some("March 5, 2025"));
        assert_eq!(post.modified_display().as_deref(), Some("March 7, 2025"));
        assert_eq!(post.reading_time().as_deref(), Some("1 min read"));
    }

    #[test]
    fn test_missing_and_null_relations() {
        let json = r#"{"id":"1","title":"Bare","slug":"bare","featuredImage":null,"author":{"node":null}}"#;
        let post: Post = serde_json::from_str(json).expect("parse bare post");
        assert!(post.featured_image.is_none());
        assert!(post.author.is_none());
        assert_eq!(post.author_name(), "Unknown");
        assert!(post.categories.is_empty());
        assert_eq!(post.excerpt_text(), "");
        assert_eq!(post.modified_display(), None);
    }

    #[test]
    fn test_untitled_post_without_image_url_still_parses() {
        let json = r#"{
            "id": "cG9zdDo5",
            "title": null,
            "slug": "draft-9",
            "featuredImage": {"node": {"sourceUrl": null, "altText": null}}
        }"#;
        let post: Post = serde_json::from_str(json).expect("parse untitled post");
        assert_eq!(post.title, None);
        assert_eq!(post.display_title(), "(untitled)");

        let image = post.featured_image.as_ref().expect("featured image");
        assert_eq!(image.source_url, None);
        assert_eq!(image.alt_or(post.display_title()), "(untitled)");
    }
}
