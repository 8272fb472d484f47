//! Utility functions for turning backend content into display text.

pub mod format;

pub use format::{format_date, reading_time, strip_html, truncate_excerpt};
