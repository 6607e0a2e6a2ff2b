//! State module for tracking crawl progress
//!
//! Every page moves through a fixed pipeline of states during one crawl pass.
//!
//! # Components
//!
//! - `PageState`: The state of an individual page (scheduled, fetched, ..., persisted)

mod page_state;

// Re-export main types
pub use page_state::PageState;
