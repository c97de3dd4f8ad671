//! Pagination across a product's review listing and collection across products.

use crate::config::Config;
use crate::coupang::{
    EmptyReason, PageFetcher, PageOutcome, ProbedPage, ProductReviewSet, Review, ReviewSource,
};
use crate::pacing::{delay, jittered};
use futures::stream::{self, StreamExt};
use std::fmt;
use tracing::{debug, info, warn};

/// When pagination stops before the page bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopPolicy {
    /// Stop at the first page with fewer rows than the page size.
    ShortPage,
    /// Fetch every page up to the bound; used when the bound comes from the API.
    FullRange,
}

/// Drives page fetches for one or more products.
pub struct ReviewCollector<'a, S: ?Sized> {
    fetcher: PageFetcher<'a, S>,
    config: &'a Config,
}

impl<'a, S: ReviewSource + ?Sized> ReviewCollector<'a, S> {
    pub fn new(source: &'a S, config: &'a Config) -> Self {
        Self { fetcher: PageFetcher::new(source, config), config }
    }

    async fn pause(&self) {
        delay(jittered(self.config.delay_ms, self.config.delay_jitter_ms)).await;
    }

    /// Fetches pages `1..=max_pages` in order and concatenates their rows.
    ///
    /// A delay separates consecutive pages; none follows the last one.
    pub async fn fetch_all_reviews(
        &self,
        product_id: &str,
        max_pages: u32,
        policy: StopPolicy,
    ) -> Vec<Review> {
        self.paginate(product_id, max_pages, policy, None).await
    }

    // `first_page`, when given, stands in for the request for page 1.
    async fn paginate(
        &self,
        product_id: &str,
        max_pages: u32,
        policy: StopPolicy,
        mut first_page: Option<PageOutcome>,
    ) -> Vec<Review> {
        let mut all_reviews = Vec::new();
        let page_size = self.config.page_size as usize;

        info!("Starting to collect reviews for product {} (pages 1-{})", product_id, max_pages);

        for page in 1..=max_pages {
            let seeded = if page == 1 { first_page.take() } else { None };

            let outcome = match seeded {
                Some(outcome) => {
                    debug!("Reusing probed page 1 of product {}", product_id);
                    outcome
                }
                None => {
                    if page > 1 {
                        self.pause().await;
                    }
                    info!("Fetching page {}/{} for product {}", page, max_pages, product_id);
                    self.fetcher.fetch_page(product_id, page).await
                }
            };

            let count = outcome.len();
            all_reviews.extend(outcome.into_reviews());

            if policy == StopPolicy::ShortPage && count < page_size {
                debug!(
                    "Page {} of product {} returned {} of {} reviews, stopping",
                    page, product_id, count, page_size
                );
                break;
            }
        }

        info!("Collected {} reviews for product {}", all_reviews.len(), product_id);
        all_reviews
    }

    /// Collects one product: optional page-count probe, then pagination.
    ///
    /// The probe's page 1 is reused. Page 1 is fetched again, with retries,
    /// when the probe failed or its listing was malformed.
    pub async fn collect_product(&self, product_id: &str) -> ProductReviewSet {
        let cap = self.config.max_pages();

        let (max_pages, policy, first_page) = if self.config.probe_max_page {
            let (max_pages, policy, first_page) = match self.fetcher.probe_first_page(product_id).await {
                Some(ProbedPage { total_pages: Some(total), first_page }) => {
                    (total.min(cap), StopPolicy::FullRange, reusable(first_page))
                }
                Some(ProbedPage { total_pages: None, first_page }) => {
                    warn!("Page count unknown for product {}, paginating up to {} pages", product_id, cap);
                    (cap, StopPolicy::ShortPage, reusable(first_page))
                }
                None => {
                    warn!("Page count unknown for product {}, paginating up to {} pages", product_id, cap);
                    (cap, StopPolicy::ShortPage, None)
                }
            };

            // Page 1 will be requested again
            if first_page.is_none() && max_pages > 0 {
                self.pause().await;
            }
            (max_pages, policy, first_page)
        } else {
            (cap, StopPolicy::ShortPage, None)
        };

        let reviews = self.paginate(product_id, max_pages, policy, first_page).await;
        ProductReviewSet::new(product_id, reviews)
    }

    /// Collects every product, `concurrency` at a time.
    ///
    /// Output order follows `product_ids` regardless of completion order. A
    /// product whose pages all fail contributes an empty set.
    pub async fn collect_all(&self, product_ids: &[String]) -> Vec<ProductReviewSet> {
        stream::iter(product_ids)
            .map(|product_id| self.collect_product(product_id))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }
}

fn reusable(first_page: PageOutcome) -> Option<PageOutcome> {
    match first_page {
        PageOutcome::Empty(EmptyReason::Malformed) => None,
        outcome => Some(outcome),
    }
}

/// Review counts after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSummary {
    pub per_product: Vec<(String, usize)>,
    pub total: usize,
}

impl CollectionSummary {
    pub fn from_sets(sets: &[ProductReviewSet]) -> Self {
        let per_product: Vec<_> = sets.iter().map(|s| (s.product_id.clone(), s.len())).collect();
        let total = per_product.iter().map(|(_, n)| n).sum();
        Self { per_product, total }
    }

    pub fn products_attempted(&self) -> usize {
        self.per_product.len()
    }
}

impl fmt::Display for CollectionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Products collected: {}", self.products_attempted())?;
        for (product_id, count) in &self.per_product {
            writeln!(f, "Product {}: {} reviews", product_id, count)?;
        }
        write!(f, "Total reviews: {}", self.total)
    }
}
