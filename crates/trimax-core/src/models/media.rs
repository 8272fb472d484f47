use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDetails {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub source_url: Option<String>,
    pub alt_text: Option<String>,
    pub media_details: Option<MediaDetails>,
}

impl MediaItem {
    /// Alt text, falling back to `fallback` (usually the post title) when blank.
    pub fn alt_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.alt_text.as_deref() {
            Some(alt) if !alt.trim().is_empty() => alt,
            _ => fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avatar {
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<Avatar>,
}

impl Author {
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar.as_ref().and_then(|a| a.url.as_deref())
    }
}
