// Job Listing Model: normalization of backend postings, match-score buckets,
// and the listing/search passthrough.

pub mod catalog;
pub mod handlers;
pub mod listing;

pub use listing::{JobListing, JobView};
