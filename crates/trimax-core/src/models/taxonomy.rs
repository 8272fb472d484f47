use serde::{Deserialize, Serialize};

/// A category or tag attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

/// A category as listed by the categories query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    #[serde(default)]
    pub count: Option<u32>,
}

impl Category {
    pub fn display_count(&self) -> String {
        match self.count {
            Some(1) => "1 post".to_string(),
            Some(count) => format!("{} posts", count),
            None => "No posts".to_string(),
        }
    }
}
