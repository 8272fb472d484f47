//! Cursor pagination and the `node`/`nodes` wrappers GraphQL puts around
//! related objects.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// A list of nodes with optional pagination info.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
    pub page_info: Option<PageInfo>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            page_info: None,
        }
    }
}

impl<T> Connection<T> {
    pub fn has_next_page(&self) -> bool {
        self.page_info.as_ref().is_some_and(|p| p.has_next_page)
    }

    /// Cursor to pass as `after` for the next page, if there is one.
    pub fn next_cursor(&self) -> Option<&str> {
        self.page_info
            .as_ref()
            .filter(|p| p.has_next_page)
            .and_then(|p| p.end_cursor.as_deref())
    }
}

#[derive(Deserialize)]
struct NodeWrapper<T> {
    node: Option<T>,
}

#[derive(Deserialize)]
struct NodesWrapper<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<T>,
}

/// Unwrap `{ "node": T }`, treating null at either level as absent.
pub(crate) fn unwrap_node<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let wrapper: Option<NodeWrapper<T>> = Option::deserialize(deserializer)?;
    Ok(wrapper.and_then(|w| w.node))
}

/// Unwrap `{ "nodes": [T] }`, treating null as empty.
pub(crate) fn unwrap_nodes<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let wrapper: Option<NodesWrapper<T>> = Option::deserialize(deserializer)?;
    Ok(wrapper.map(|w| w.nodes).unwrap_or_default())
}
