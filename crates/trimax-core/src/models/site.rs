use serde::{Deserialize, Serialize};

use super::connection::unwrap_nodes;
use super::Post;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralSettings {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

/// Result of the site info query used to check connectivity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub general_settings: Option<GeneralSettings>,
    #[serde(default, deserialize_with = "unwrap_nodes")]
    pub posts: Vec<Post>,
}

impl SiteInfo {
    pub fn title(&self) -> &str {
        self.general_settings
            .as_ref()
            .and_then(|s| s.title.as_deref())
            .unwrap_or("N/A")
    }

    pub fn latest_post(&self) -> Option<&Post> {
        self.posts.first()
    }
}
