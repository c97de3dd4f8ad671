//! Coupang review API: HTTP client, envelope decoding and page fetching.

pub mod client;
pub mod models;
pub mod pages;
pub mod parser;

pub use client::{CoupangClient, ReviewSource};
pub use models::{ProductReviewSet, Review};
pub use pages::{EmptyReason, PageFetcher, PageOutcome, ProbedPage};
