//! coupang-reviews - Collects Coupang product reviews into an Excel workbook
//!
//! Paginates the review listing API for each configured product with
//! throttling and retries, normalizes every review into a flat row and writes
//! one combined sheet plus one sheet per product.

pub mod collector;
pub mod commands;
pub mod config;
pub mod coupang;
pub mod dates;
pub mod error;
pub mod export;
pub mod pacing;

pub use collector::{CollectionSummary, ReviewCollector, StopPolicy};
pub use config::{Config, ProxyConfig};
pub use coupang::{ProductReviewSet, Review};
pub use error::FetchError;
