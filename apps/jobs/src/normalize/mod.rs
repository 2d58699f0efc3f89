//! Shared normalization rules every provider maps through.
//!
//! Providers own their field tables; everything here is upstream-agnostic.

pub mod apply_url;
pub mod department;
pub mod listing;
pub mod slug;
pub mod text;
pub mod timestamp;

pub use apply_url::{application_url, is_email};
pub use department::guess_department;
pub use listing::{finalize_listing, rank_featured_first, ListingRules};
pub use slug::slugify;
pub use text::{first_or_empty, mentions_remote, non_empty_or, unescape_html};
pub use timestamp::parse_timestamp_ms;
