//! Collect command: gather reviews for every configured product and export them.

use crate::collector::{CollectionSummary, ReviewCollector};
use crate::config::Config;
use crate::coupang::{CoupangClient, ReviewSource};
use crate::export::WorkbookExporter;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

/// Outcome of a completed run.
#[derive(Debug)]
pub struct CollectReport {
    pub summary: CollectionSummary,
    pub workbook: PathBuf,
}

/// Executes a full collection run.
pub struct CollectCommand {
    config: Config,
}

impl CollectCommand {
    /// Creates a new collect command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Collects reviews over HTTP and writes the workbook.
    pub async fn execute(&self) -> Result<CollectReport> {
        let client = CoupangClient::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_client(&client).await
    }

    /// Collects reviews with a provided client (for testing).
    pub async fn execute_with_client(&self, client: &impl ReviewSource) -> Result<CollectReport> {
        let products = &self.config.products;
        if products.is_empty() {
            anyhow::bail!("No product IDs to collect. Pass them as arguments or set `products` in the config file.");
        }

        info!("Products to collect: {}", products.len());
        info!("Maximum reviews per product: {}", self.config.max_reviews_per_product);
        info!("Delay between requests: {}ms", self.config.delay_ms);

        let collector = ReviewCollector::new(client, &self.config);
        let sets = collector.collect_all(products).await;

        let summary = CollectionSummary::from_sets(&sets);
        for line in summary.to_string().lines() {
            info!("{}", line);
        }

        // The only failure that ends a run
        let workbook = WorkbookExporter::new(&self.config.output_dir).export(&sets)?;

        Ok(CollectReport { summary, workbook })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    /// Returns one review for product "1" and fails for everything else.
    struct MockSource;

    #[async_trait]
    impl ReviewSource for MockSource {
        async fn get_json(&self, url: &str, product_id: &str) -> Result<Value, FetchError> {
            if product_id != "1" {
                return Err(FetchError::Status { status: 500, url: url.to_string() });
            }
            Ok(json!({
                "rData": {
                    "paging": {
                        "totalPage": 1,
                        "contents": [{
                            "productId": "1",
                            "itemName": "Kettle, White",
                            "reviewId": "r1",
                            "member": { "name": "lee" },
                            "rating": 4,
                            "reviewAt": 1709208000000i64,
                            "title": "Good",
                            "content": "Boils fast"
                        }]
                    }
                }
            }))
        }
    }

    fn make_test_config(output_dir: PathBuf, products: &[&str]) -> Config {
        Config {
            products: products.iter().map(|p| p.to_string()).collect(),
            delay_ms: 0,
            retry_base_delay_ms: 0,
            max_retries: 0,
            proxy_enabled: false,
            output_dir,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_collect_command_writes_workbook() {
        let dir = TempDir::new().unwrap();
        let config = make_test_config(dir.path().to_path_buf(), &["1", "2"]);
        let cmd = CollectCommand::new(config);

        let report = cmd.execute_with_client(&MockSource).await.unwrap();

        assert_eq!(report.summary.per_product, vec![("1".to_string(), 1), ("2".to_string(), 0)]);
        assert_eq!(report.summary.total, 1);
        assert!(report.workbook.starts_with(dir.path()));
        assert!(report.workbook.exists());
    }

    #[tokio::test]
    async fn test_collect_command_requires_products() {
        let dir = TempDir::new().unwrap();
        let config = make_test_config(dir.path().to_path_buf(), &[]);
        let cmd = CollectCommand::new(config);

        let err = cmd.execute_with_client(&MockSource).await.unwrap_err();
        assert!(err.to_string().contains("No product IDs"));
    }

    #[tokio::test]
    async fn test_collect_command_export_failure_propagates() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let config = make_test_config(blocker, &["1"]);
        let cmd = CollectCommand::new(config);

        assert!(cmd.execute_with_client(&MockSource).await.is_err());
    }
}
