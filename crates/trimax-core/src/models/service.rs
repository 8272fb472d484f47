use serde::{Deserialize, Serialize};

use super::connection::{unwrap_node, unwrap_nodes};
use super::{display_title, MediaItem, Term};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFeature {
    pub feature_name: String,
    pub feature_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFields {
    pub service_description: Option<String>,
    pub service_price: Option<String>,
    pub service_duration: Option<String>,
    pub service_icon: Option<MediaItem>,
    #[serde(default)]
    pub service_features: Vec<ServiceFeature>,
}

/// Custom post type behind the services page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub title: Option<String>,
    pub slug: String,
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "unwrap_node")]
    pub featured_image: Option<MediaItem>,
    pub service_fields: Option<ServiceFields>,
    #[serde(default, deserialize_with = "unwrap_nodes")]
    pub service_categories: Vec<Term>,
}

impl Service {
    pub fn display_title(&self) -> &str {
        display_title(self.title.as_deref())
    }

    pub fn price_display(&self) -> String {
        self.service_fields
            .as_ref()
            .and_then(|f| f.service_price.as_deref())
            .filter(|p| !p.trim().is_empty())
            .unwrap_or("Contact us")
            .to_string()
    }

    pub fn features(&self) -> &[ServiceFeature] {
        self.service_fields
            .as_ref()
            .map(|f| f.service_features.as_slice())
            .unwrap_or_default()
    }
}
