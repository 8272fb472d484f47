//! Data models for content served by the backend.
//!
//! This module contains the structures the site's queries decode into:
//!
//! - `Post`, `PostSlug`: blog posts and their slugs
//! - `Term`, `Category`: taxonomy terms
//! - `MediaItem`, `Author`: shared nested objects
//! - `Service`, `Portfolio`: custom post types behind the services and portfolio pages
//! - `SiteInfo`: general settings used by connection checks
//! - `Connection`, `PageInfo`: cursor pagination wrappers

pub mod connection;
pub mod media;
pub mod portfolio;
pub mod post;
pub mod service;
pub mod site;
pub mod taxonomy;

pub use connection::{Connection, PageInfo};
pub use media::{Author, Avatar, MediaDetails, MediaItem};
pub use portfolio::{Portfolio, PortfolioChallenge, PortfolioFields};
pub use post::{Post, PostSlug};
pub use service::{Service, ServiceFeature, ServiceFields};
pub use site::{GeneralSettings, SiteInfo};
pub use taxonomy::{Category, Term};

/// Title shown for content the backend returned without one.
const UNTITLED: &str = "(untitled)";

pub(crate) fn display_title(title: Option<&str>) -> &str {
    title.filter(|t| !t.trim().is_empty()).unwrap_or(UNTITLED)
}
