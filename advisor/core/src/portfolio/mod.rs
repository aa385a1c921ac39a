//! Portfolio Aggregation
//!
//! Reduces an address's recent token-transfer history to a short list of token
//! names per token standard.
//!
//! # Layout
//!
//! - [`provider`]: the [`TransferProvider`] seam and its query/record types
//! - [`explorer`]: Etherscan-compatible explorer client (sonicscan by default)
//! - [`aggregator`]: three-way concurrent fetch, dedup and cap
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use advisor_core::portfolio::{ExplorerClient, PortfolioAggregator, AggregatorConfig};
//!
//! let provider = ExplorerClient::new("https://api.sonicscan.org/api", Some(key), timeout)?;
//! let aggregator = PortfolioAggregator::new(Arc::new(provider), AggregatorConfig::default());
//! let summary = aggregator.aggregate("0x5aAe...").await?;
//! ```

mod aggregator;
mod explorer;
mod provider;

pub use aggregator::{unique_names, AggregatorConfig, PortfolioAggregator, PortfolioSummary};
pub use explorer::{parse_explorer_body, ExplorerClient};
pub use provider::{SortOrder, TransferCategory, TransferProvider, TransferQuery, TransferRecord};
