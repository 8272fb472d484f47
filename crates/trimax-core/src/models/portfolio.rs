use serde::{Deserialize, Serialize};

use super::connection::{unwrap_node, unwrap_nodes};
use super::{display_title, MediaItem, Term};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioChallenge {
    pub challenge: String,
    pub solution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioFields {
    pub portfolio_client: Option<String>,
    pub portfolio_url: Option<String>,
    pub portfolio_category: Option<String>,
    pub portfolio_completion_date: Option<String>,
    #[serde(default)]
    pub portfolio_technologies: Vec<String>,
    #[serde(default)]
    pub portfolio_gallery: Vec<MediaItem>,
    #[serde(default)]
    pub portfolio_challenges: Vec<PortfolioChallenge>,
}

/// Custom post type behind the portfolio grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub title: Option<String>,
    pub slug: String,
    pub excerpt: Option<String>,
    pub date: Option<String>,
    #[serde(default, deserialize_with = "unwrap_node")]
    pub featured_image: Option<MediaItem>,
    pub portfolio_fields: Option<PortfolioFields>,
    #[serde(default, deserialize_with = "unwrap_nodes")]
    pub portfolio_categories: Vec<Term>,
}

impl Portfolio {
    pub fn display_title(&self) -> &str {
        display_title(self.title.as_deref())
    }

    pub fn technologies_display(&self) -> String {
        self.portfolio_fields
            .as_ref()
            .map(|f| f.portfolio_technologies.join(", "))
            .unwrap_or_default()
    }

    /// Category slugs for grid filtering; the custom field wins when set.
    pub fn filter_slugs(&self) -> Vec<&str> {
        let from_field = self
            .portfolio_fields
            .as_ref()
            .and_then(|f| f.portfolio_category.as_deref())
            .filter(|c| !c.is_empty());
        match from_field {
            Some(category) => vec![category],
            None => self.portfolio_categories.iter().map(|t| t.slug.as_str()).collect(),
        }
    }
}
