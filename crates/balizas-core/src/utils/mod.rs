//! Utility functions for display formatting and lenient parsing.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_region_name, parse_feed_timestamp};
