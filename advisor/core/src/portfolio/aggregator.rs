//! Portfolio Aggregator
//!
//! Fans out one request per [`TransferCategory`], joins all three, and reduces
//! each category to at most `name_cap` unique token names in first-seen order.
//!
//! The join is all-or-nothing: if any category fails the whole aggregation
//! fails and no partial summary is produced. Nothing is cached between calls.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::provider::{SortOrder, TransferCategory, TransferProvider, TransferQuery, TransferRecord};
use crate::error::FlowError;

/// Aggregation parameters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Records requested per category
    pub page_size: u32,
    /// Names kept per category
    pub name_cap: usize,
    /// First block (inclusive)
    pub start_block: u64,
    /// Last block (inclusive)
    pub end_block: u64,
    /// Sort order
    pub sort: SortOrder,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            name_cap: 3,
            start_block: 0,
            end_block: 99_999_999,
            sort: SortOrder::Asc,
        }
    }
}

/// Token names per category for one address
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Fungible token names
    pub erc20: Vec<String>,
    /// Non-fungible collection names
    pub erc721: Vec<String>,
    /// Multi-token collection names
    pub erc1155: Vec<String>,
}

impl PortfolioSummary {
    /// Names for one category
    #[must_use]
    pub fn names(&self, category: TransferCategory) -> &[String] {
        match category {
            TransferCategory::Erc20 => &self.erc20,
            TransferCategory::Erc721 => &self.erc721,
            TransferCategory::Erc1155 => &self.erc1155,
        }
    }

    /// All names in category order (A, then B, then C)
    ///
    /// Names are not deduplicated across categories.
    #[must_use]
    pub fn all_tokens(&self) -> Vec<String> {
        TransferCategory::ALL
            .iter()
            .flat_map(|c| self.names(*c).iter().cloned())
            .collect()
    }

    /// Whether every category is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        TransferCategory::ALL.iter().all(|c| self.names(*c).is_empty())
    }

    /// One chat line per non-empty category, in category order
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        TransferCategory::ALL
            .iter()
            .filter(|c| !self.names(**c).is_empty())
            .map(|c| format!("{}: {}", c.summary_label(), self.names(*c).join(", ")))
            .collect()
    }
}

/// Deduplicate display names, keeping first-seen order, stopping at `cap`
///
/// Records without a usable name are skipped.
#[must_use]
pub fn unique_names(records: &[TransferRecord], cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for name in records.iter().filter_map(TransferRecord::display_name) {
        if names.len() >= cap {
            break;
        }
        if seen.insert(name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Concurrent three-category aggregator
#[derive(Clone)]
pub struct PortfolioAggregator {
    provider: Arc<dyn TransferProvider>,
    config: AggregatorConfig,
}

impl PortfolioAggregator {
    /// Create an aggregator over `provider`
    pub fn new(provider: Arc<dyn TransferProvider>, config: AggregatorConfig) -> Self {
        Self { provider, config }
    }

    /// Aggregation parameters
    #[must_use]
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Fetch all three categories for `address` and summarise them
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::PortfolioFetchFailed`] if any category fetch fails.
    pub async fn aggregate(&self, address: &str) -> Result<PortfolioSummary, FlowError> {
        tracing::info!(
            address = %address,
            provider = self.provider.name(),
            "Aggregating portfolio"
        );

        let (erc20, erc721, erc1155) = futures::try_join!(
            self.category_names(address, TransferCategory::Erc20),
            self.category_names(address, TransferCategory::Erc721),
            self.category_names(address, TransferCategory::Erc1155),
        )?;

        let summary = PortfolioSummary {
            erc20,
            erc721,
            erc1155,
        };
        tracing::info!(
            address = %address,
            erc20 = ?summary.erc20,
            erc721 = ?summary.erc721,
            erc1155 = ?summary.erc1155,
            "Portfolio aggregated"
        );
        Ok(summary)
    }

    async fn category_names(
        &self,
        address: &str,
        category: TransferCategory,
    ) -> Result<Vec<String>, FlowError> {
        let query = TransferQuery {
            category,
            address: address.to_string(),
            page: 1,
            page_size: self.config.page_size,
            start_block: self.config.start_block,
            end_block: self.config.end_block,
            sort: self.config.sort,
        };

        let records = self
            .provider
            .fetch_transfers(&query)
            .await
            .map_err(|source| {
                tracing::warn!(
                    address = %address,
                    category = %category,
                    error = %source,
                    "Transfer fetch failed"
                );
                FlowError::PortfolioFetchFailed {
                    address: address.to_string(),
                    category,
                    source,
                }
            })?;

        Ok(unique_names(&records, self.config.name_cap))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::TransferError;

    /// Scripted provider: per-category names or HTTP status, optional delay
    #[derive(Default)]
    struct ScriptedProvider {
        names: HashMap<TransferCategory, Vec<&'static str>>,
        failures: HashMap<TransferCategory, u16>,
        delays: HashMap<TransferCategory, Duration>,
        queries: Mutex<Vec<TransferQuery>>,
    }

    #[async_trait]
    impl TransferProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "Scripted"
        }

        async fn fetch_transfers(
            &self,
            query: &TransferQuery,
        ) -> Result<Vec<TransferRecord>, TransferError> {
            self.queries.lock().push(query.clone());
            if let Some(delay) = self.delays.get(&query.category) {
                tokio::time::sleep(*delay).await;
            }
            if let Some(status) = self.failures.get(&query.category) {
                return Err(TransferError::Status {
                    status: *status,
                    body: "error".to_string(),
                });
            }
            Ok(self
                .names
                .get(&query.category)
                .map(|names| names.iter().map(|n| TransferRecord::named(*n)).collect())
                .unwrap_or_default())
        }
    }

    fn aggregator(provider: ScriptedProvider) -> (PortfolioAggregator, Arc<ScriptedProvider>) {
        let provider = Arc::new(provider);
        (
            PortfolioAggregator::new(provider.clone(), AggregatorConfig::default()),
            provider,
        )
    }

    #[test]
    fn test_unique_names_dedup_and_cap() {
        let records: Vec<_> = ["A", "A", "B", "C", "B", "D"]
            .iter()
            .map(|n| TransferRecord::named(*n))
            .collect();
        assert_eq!(unique_names(&records, 3), vec!["A", "B", "C"]);
        assert_eq!(unique_names(&records, 10), vec!["A", "B", "C", "D"]);
        assert!(unique_names(&records, 0).is_empty());
    }

    #[test]
    fn test_unique_names_skips_unnamed() {
        let records = vec![
            TransferRecord::default(),
            TransferRecord::named("A"),
            TransferRecord::named(""),
            TransferRecord::named("A"),
        ];
        assert_eq!(unique_names(&records, 3), vec!["A"]);
    }

    #[tokio::test]
    async fn test_aggregate_dedups_each_category() {
        let (agg, provider) = aggregator(ScriptedProvider {
            names: HashMap::from([
                (TransferCategory::Erc20, vec!["A", "A", "B"]),
                (TransferCategory::Erc1155, vec!["C"]),
            ]),
            ..Default::default()
        });

        let summary = agg.aggregate("0xabc").await.unwrap();
        assert_eq!(summary.erc20, vec!["A", "B"]);
        assert!(summary.erc721.is_empty());
        assert_eq!(summary.erc1155, vec!["C"]);
        assert_eq!(summary.all_tokens(), vec!["A", "B", "C"]);

        let queries = provider.queries.lock();
        assert_eq!(queries.len(), 3);
        for q in queries.iter() {
            assert_eq!(q.address, "0xabc");
            assert_eq!(q.page, 1);
            assert_eq!(q.page_size, 10);
            assert_eq!(q.sort, SortOrder::Asc);
        }
    }

    #[tokio::test]
    async fn test_aggregate_fails_whole_on_any_category_error() {
        let (agg, _) = aggregator(ScriptedProvider {
            names: HashMap::from([
                (TransferCategory::Erc20, vec!["A"]),
                (TransferCategory::Erc1155, vec!["C"]),
            ]),
            failures: HashMap::from([(TransferCategory::Erc721, 500)]),
            ..Default::default()
        });

        let err = agg.aggregate("0xabc").await.unwrap_err();
        match err {
            FlowError::PortfolioFetchFailed {
                address,
                category,
                source: TransferError::Status { status, .. },
            } => {
                assert_eq!(address, "0xabc");
                assert_eq!(category, TransferCategory::Erc721);
                assert_eq!(status, 500);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_order_independent_of_completion_order() {
        // ERC-20 finishes last, ERC-1155 first
        let (agg, _) = aggregator(ScriptedProvider {
            names: HashMap::from([
                (TransferCategory::Erc20, vec!["A"]),
                (TransferCategory::Erc721, vec!["B"]),
                (TransferCategory::Erc1155, vec!["C"]),
            ]),
            delays: HashMap::from([
                (TransferCategory::Erc20, Duration::from_millis(300)),
                (TransferCategory::Erc721, Duration::from_millis(200)),
                (TransferCategory::Erc1155, Duration::from_millis(100)),
            ]),
            ..Default::default()
        });

        let summary = agg.aggregate("0xabc").await.unwrap();
        assert_eq!(
            summary.summary_lines(),
            vec![
                "ERC-20 Tokens: A".to_string(),
                "ERC-721 NFTs: B".to_string(),
                "ERC-1155 Tokens: C".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_categories_fetched_concurrently() {
        let (agg, _) = aggregator(ScriptedProvider {
            delays: HashMap::from([
                (TransferCategory::Erc20, Duration::from_secs(1)),
                (TransferCategory::Erc721, Duration::from_secs(1)),
                (TransferCategory::Erc1155, Duration::from_secs(1)),
            ]),
            ..Default::default()
        });

        let start = tokio::time::Instant::now();
        let summary = agg.aggregate("0xabc").await.unwrap();
        assert!(summary.is_empty());
        // Sequential fetches would take three seconds
        assert!(start.elapsed() < Duration::from_millis(1500));
    }

    #[test]
    fn test_summary_lines_skip_empty_categories() {
        let summary = PortfolioSummary {
            erc20: vec!["A".into(), "B".into()],
            erc721: vec![],
            erc1155: vec!["C".into()],
        };
        assert_eq!(
            summary.summary_lines(),
            vec!["ERC-20 Tokens: A, B".to_string(), "ERC-1155 Tokens: C".to_string()]
        );
        assert!(PortfolioSummary::default().summary_lines().is_empty());
    }
}
