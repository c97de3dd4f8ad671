//! Fetching and normalizing single pages of the review listing.

use crate::config::Config;
use crate::coupang::client::ReviewSource;
use crate::coupang::models::Review;
use crate::coupang::parser::{parse_listing, parse_total_page, Listing};
use crate::error::PageError;
use crate::pacing::delay;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Why a page produced no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The response had no `rData.paging.contents`
    MissingContents,
    /// The listing was present but its records could not be mapped
    Malformed,
    /// Every attempt failed at the transport or status level
    Failed,
}

/// Result of fetching one page. Failures are folded into [`PageOutcome::Empty`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Reviews(Vec<Review>),
    Empty(EmptyReason),
}

impl PageOutcome {
    /// Number of rows on the page.
    pub fn len(&self) -> usize {
        match self {
            PageOutcome::Reviews(reviews) => reviews.len(),
            PageOutcome::Empty(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_reviews(self) -> Vec<Review> {
        match self {
            PageOutcome::Reviews(reviews) => reviews,
            PageOutcome::Empty(_) => Vec::new(),
        }
    }
}

/// Runs `operation`, retrying up to `max_retries` times on error.
///
/// Attempt `n` (1-based) is preceded by a sleep of `base_delay * n`.
pub(crate) async fn retry_with_linear_backoff<T, E, F, Fut>(
    max_retries: u32,
    base_delay: Duration,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_retries => return Err(err),
            Err(err) => {
                attempt += 1;
                let wait = base_delay.saturating_mul(attempt);
                warn!(attempt, max_retries, wait_ms = wait.as_millis() as u64, error = %err, "retrying after backoff");
                delay(wait).await;
            }
        }
    }
}

/// Page 1 as returned by the page-count probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbedPage {
    /// `rData.paging.totalPage`, when present and valid
    pub total_pages: Option<u32>,
    pub first_page: PageOutcome,
}

/// Fetches pages of one product's review listing.
pub struct PageFetcher<'a, S: ?Sized> {
    source: &'a S,
    config: &'a Config,
}

impl<'a, S: ReviewSource + ?Sized> PageFetcher<'a, S> {
    pub fn new(source: &'a S, config: &'a Config) -> Self {
        Self { source, config }
    }

    /// Builds the listing URL for a product page.
    pub fn page_url(&self, product_id: &str, page: u32) -> String {
        format!(
            "{}/next-api/review?productId={}&page={}&size={}&sortBy={}&ratingSummary=true&ratings=&market=",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(product_id),
            page,
            self.config.page_size,
            urlencoding::encode(&self.config.sort_by)
        )
    }

    fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.config.retry_base_delay_ms)
    }

    async fn attempt(&self, product_id: &str, url: &str) -> Result<Listing, PageError> {
        let body = self.source.get_json(url, product_id).await?;
        parse_listing(body).map_err(PageError::Malformed)
    }

    /// Fetches one page and normalizes its reviews.
    ///
    /// Never fails: transport errors and unexpected shapes are retried, logged
    /// and then reported as [`PageOutcome::Empty`].
    pub async fn fetch_page(&self, product_id: &str, page: u32) -> PageOutcome {
        let url = self.page_url(product_id, page);

        let result = retry_with_linear_backoff(self.config.max_retries, self.retry_base_delay(), || {
            self.attempt(product_id, &url)
        })
        .await;

        match result {
            Ok(Listing::Present(reviews)) => {
                info!("Fetched {} reviews from page {} of product {}", reviews.len(), page, product_id);
                PageOutcome::Reviews(reviews)
            }
            Ok(Listing::Absent) => {
                warn!("No reviews found on page {} of product {}", page, product_id);
                PageOutcome::Empty(EmptyReason::MissingContents)
            }
            Err(PageError::Malformed(e)) => {
                warn!("Malformed reviews on page {} of product {}: {}", page, product_id, e);
                PageOutcome::Empty(EmptyReason::Malformed)
            }
            Err(PageError::Fetch(e)) => {
                warn!("Failed to fetch page {} of product {}: {}", page, product_id, e);
                PageOutcome::Empty(EmptyReason::Failed)
            }
        }
    }

    /// Fetches page 1 once and reads both the total page count and its listing.
    ///
    /// Transport failures are retried; `None` means every attempt failed. The
    /// listing is decoded without retries, so a malformed page 1 comes back as
    /// [`EmptyReason::Malformed`] for the caller to fetch again.
    pub async fn probe_first_page(&self, product_id: &str) -> Option<ProbedPage> {
        let url = self.page_url(product_id, 1);

        let body = retry_with_linear_backoff(self.config.max_retries, self.retry_base_delay(), || {
            self.source.get_json(&url, product_id)
        })
        .await;

        let body = match body {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to probe page count for product {}: {}", product_id, e);
                return None;
            }
        };

        let total_pages = parse_total_page(&body);
        debug!("Product {} reports total pages: {:?}", product_id, total_pages);

        let first_page = match parse_listing(body) {
            Ok(Listing::Present(reviews)) => PageOutcome::Reviews(reviews),
            Ok(Listing::Absent) => PageOutcome::Empty(EmptyReason::MissingContents),
            Err(e) => {
                debug!("Probed page 1 of product {} is malformed: {}", product_id, e);
                PageOutcome::Empty(EmptyReason::Malformed)
            }
        };

        Some(ProbedPage { total_pages, first_page })
    }

    /// Reads the total page count from page 1. `None` when unknown.
    pub async fn fetch_max_page(&self, product_id: &str) -> Option<u32> {
        self.probe_first_page(product_id).await.and_then(|probe| probe.total_pages)
    }
}
