//! Query documents used by the site, with request builders and the
//! response shapes they decode into.

use serde::Deserialize;

use crate::api::QueryRequest;
use crate::models::{Category, Connection, Portfolio, Post, PostSlug, Service};

/// Posts per page on the blog index
pub const DEFAULT_POSTS_PER_PAGE: u32 = 10;

/// Posts shown in "recent posts" sidebars
pub const DEFAULT_RECENT_POSTS: u32 = 5;

/// Upper bound on slugs fetched for static generation
pub const MAX_POST_SLUGS: u32 = 1000;

/// Services and portfolio items fetched per listing
pub const DEFAULT_LISTING_SIZE: u32 = 20;

pub const GET_ALL_POSTS: &str = r#"
  query GetAllPosts($first: Int = 10, $after: String) {
    posts(first: $first, after: $after, where: { status: PUBLISH }) {
      pageInfo {
        hasNextPage
        hasPreviousPage
        startCursor
        endCursor
      }
      nodes {
        id
        title
        slug
        excerpt
        date
        modified
        featuredImage {
          node {
            sourceUrl
            altText
            mediaDetails {
              width
              height
            }
          }
        }
        author {
          node {
            name
            slug
            avatar {
              url
            }
          }
        }
        categories {
          nodes {
            name
            slug
          }
        }
        tags {
          nodes {
            name
            slug
          }
        }
      }
    }
  }
"#;

pub const GET_POST_BY_SLUG: &str = r#"
  query GetPostBySlug($slug: ID!) {
    post(id: $slug, idType: SLUG) {
      id
      title
      content
      excerpt
      slug
      date
      modified
      featuredImage {
        node {
          sourceUrl
          altText
          mediaDetails {
            width
            height
          }
        }
      }
      author {
        node {
          name
          slug
          description
          avatar {
            url
          }
        }
      }
      categories {
        nodes {
          name
          slug
          description
        }
      }
      tags {
        nodes {
          name
          slug
          description
        }
      }
    }
  }
"#;

pub const GET_RECENT_POSTS: &str = r#"
  query GetRecentPosts($first: Int = 5) {
    posts(first: $first, where: { status: PUBLISH }) {
      nodes {
        id
        title
        slug
        date
        featuredImage {
          node {
            sourceUrl
            altText
          }
        }
      }
    }
  }
"#;

pub const GET_POSTS_BY_CATEGORY: &str = r#"
  query GetPostsByCategory($categorySlug: String!, $first: Int = 10, $after: String) {
    posts(
      first: $first
      after: $after
      where: {
        status: PUBLISH
        categoryName: $categorySlug
      }
    ) {
      pageInfo {
        hasNextPage
        hasPreviousPage
        startCursor
        endCursor
      }
      nodes {
        id
        title
        slug
        excerpt
        date
        featuredImage {
          node {
            sourceUrl
            altText
            mediaDetails {
              width
              height
            }
          }
        }
        author {
          node {
            name
            slug
          }
        }
        categories {
          nodes {
            name
            slug
          }
        }
      }
    }
  }
"#;

pub const GET_CATEGORIES: &str = r#"
  query GetCategories {
    categories(where: { hideEmpty: true }) {
      nodes {
        id
        name
        slug
        description
        count
      }
    }
  }
"#;

pub const GET_ALL_POST_SLUGS: &str = r#"
  query GetAllPostSlugs($first: Int = 1000) {
    posts(first: $first, where: { status: PUBLISH }) {
      nodes {
        slug
      }
    }
  }
"#;

pub const GET_SERVICES: &str = r#"
  query GetServices($first: Int = 20) {
    services(first: $first) {
      nodes {
        id
        title
        slug
        excerpt
        featuredImage {
          node {
            sourceUrl
            altText
          }
        }
        serviceFields {
          serviceDescription
          servicePrice
          serviceDuration
          serviceIcon {
            sourceUrl
            altText
          }
          serviceFeatures {
            featureName
            featureDescription
          }
        }
        serviceCategories {
          nodes {
            name
            slug
          }
        }
      }
    }
  }
"#;

pub const GET_PORTFOLIO_ITEMS: &str = r#"
  query GetPortfolioItems($first: Int = 20) {
    portfolios(first: $first) {
      nodes {
        id
        title
        slug
        excerpt
        date
        featuredImage {
          node {
            sourceUrl
            altText
          }
        }
        portfolioFields {
          portfolioClient
          portfolioUrl
          portfolioCategory
          portfolioCompletionDate
          portfolioTechnologies
          portfolioGallery {
            sourceUrl
            altText
            mediaDetails {
              width
              height
            }
          }
          portfolioChallenges {
            challenge
            solution
          }
        }
        portfolioCategories {
          nodes {
            name
            slug
          }
        }
      }
    }
  }
"#;

pub const GET_SITE_INFO: &str = r#"
  query GetSiteInfo {
    generalSettings {
      title
      description
      url
    }
    posts(first: 1) {
      nodes {
        id
        title
        slug
        excerpt
        date
      }
    }
  }
"#;

// ===== Request builders =====

pub fn all_posts(first: u32, after: Option<&str>) -> QueryRequest {
    QueryRequest::new(GET_ALL_POSTS)
        .variable("first", first)
        .variable("after", after)
}

pub fn post_by_slug(slug: &str) -> QueryRequest {
    QueryRequest::new(GET_POST_BY_SLUG).variable("slug", slug)
}

pub fn recent_posts(first: u32) -> QueryRequest {
    QueryRequest::new(GET_RECENT_POSTS).variable("first", first)
}

pub fn posts_by_category(category_slug: &str, first: u32, after: Option<&str>) -> QueryRequest {
    QueryRequest::new(GET_POSTS_BY_CATEGORY)
        .variable("categorySlug", category_slug)
        .variable("first", first)
        .variable("after", after)
}

pub fn categories() -> QueryRequest {
    QueryRequest::new(GET_CATEGORIES)
}

pub fn all_post_slugs() -> QueryRequest {
    QueryRequest::new(GET_ALL_POST_SLUGS).variable("first", MAX_POST_SLUGS)
}

pub fn services(first: u32) -> QueryRequest {
    QueryRequest::new(GET_SERVICES).variable("first", first)
}

pub fn portfolio_items(first: u32) -> QueryRequest {
    QueryRequest::new(GET_PORTFOLIO_ITEMS).variable("first", first)
}

pub fn site_info() -> QueryRequest {
    QueryRequest::new(GET_SITE_INFO)
}

// ===== Response shapes =====

#[derive(Debug, Deserialize)]
pub struct PostsData {
    #[serde(default)]
    pub posts: Option<Connection<Post>>,
}

#[derive(Debug, Deserialize)]
pub struct PostData {
    pub post: Option<Post>,
}

#[derive(Debug, Deserialize)]
pub struct CategoriesData {
    #[serde(default)]
    pub categories: Option<Connection<Category>>,
}

#[derive(Debug, Deserialize)]
pub struct PostSlugsData {
    #[serde(default)]
    pub posts: Option<Connection<PostSlug>>,
}

#[derive(Debug, Deserialize)]
pub struct ServicesData {
    #[serde(default)]
    pub services: Option<Connection<Service>>,
}

#[derive(Debug, Deserialize)]
pub struct PortfolioData {
    #[serde(default)]
    pub portfolios: Option<Connection<Portfolio>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_operation_names() {
        let cases = [
            (all_posts(10, None), "GetAllPosts"),
            (post_by_slug("x"), "GetPostBySlug"),
            (recent_posts(5), "GetRecentPosts"),
            (posts_by_category("news", 10, None), "GetPostsByCategory"),
            (categories(), "GetCategories"),
            (all_post_slugs(), "GetAllPostSlugs"),
            (services(20), "GetServices"),
            (portfolio_items(20), "GetPortfolioItems"),
            (site_info(), "GetSiteInfo"),
        ];
        for (request, name) in cases {
            assert_eq!(request.operation_name(), Some(name));
        }
    }

    #[test]
    fn test_variables() {
        let request = posts_by_category("news", 12, Some("YXJyYXk6MTA="));
        assert_eq!(request.variables()["categorySlug"], json!("news"));
        assert_eq!(request.variables()["first"], json!(12));
        assert_eq!(request.variables()["after"], json!("YXJyYXk6MTA="));

        // First page sends an explicit null cursor
        assert_eq!(all_posts(10, None).variables()["after"], Value::Null);
        assert_eq!(all_post_slugs().variables()["first"], json!(1000));
        assert!(categories().variables().is_empty());
    }

    #[test]
    fn test_parse_posts_data() {
        let json = r#"{"posts":{"pageInfo":{"hasNextPage":true,"hasPreviousPage":false,"startCursor":"a","endCursor":"b"},"nodes":[{"id":"1","title":"Hello","slug":"hello","excerpt":"<p>Hi</p>","date":"2025-01-02T03:04:05"}]}}"#;
        let data: PostsData = serde_json::from_str(json).expect("Failed to parse posts test JSON");
        let posts = data.posts.expect("posts connection");
        assert_eq!(posts.nodes[0].slug, "hello");
        assert_eq!(posts.next_cursor(), Some("b"));
    }

    #[test]
    fn test_parse_missing_post() {
        let data: PostData = serde_json::from_str(r#"{"post":null}"#).expect("parse null post");
        assert!(data.post.is_none());
    }
}
