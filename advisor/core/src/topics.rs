//! Prediction Topic Catalog
//!
//! Static list of prediction-market topics the agent endpoint can infer on.
//! Only topics below a cutoff id are offered; later ids belong to markets the
//! agent does not serve.

use serde::{Deserialize, Serialize};

/// Default id cutoff (exclusive)
pub const DEFAULT_TOPIC_CUTOFF: u32 = 30;

/// Every known topic as `(id, name)`, in display order
pub const TOPIC_TABLE: &[(u32, &str)] = &[
    (22, "Virtual 5min Price Prediction"),
    (27, "Sekoia 5min Price Prediction"),
    (26, "G.A.M.E 5min Price Prediction"),
    (25, "VaderAI 5min Price Prediction"),
    (24, "Luna 5min Price Prediction"),
    (23, "Aixbt 5min Price Prediction"),
    (38, "SOL/USD - 8h Price Prediction"),
    (28, "ETH/USD - 12h Volatility Prediction"),
    (29, "Arbitrum ETH/USDC Uniswap Pool - 12h Volume Prediction"),
    (30, "ETH/USD - 5min Price Prediction"),
    (31, "Virtual/USDT - 8h Price Prediction"),
    (32, "Aixbt/USDT - 8h Price Prediction"),
    (33, "Luna/USDT - 8h Price Prediction"),
    (34, "VaderAI/USDT - 8h Price Prediction"),
    (35, "Game/USDT - 8h Price Prediction"),
    (36, "Sekoia/USDT - 8h Price Prediction"),
    (37, "SOL/USD - 5min Price Prediction"),
    (39, "SOL/USD - 5min Volatility Prediction"),
    (40, "SOL/USD - 8h Volatility Prediction"),
    (41, "ETH/USD - 8h Price Prediction"),
    (42, "BTC/USD - 8h Price Prediction"),
    (43, "ETH/USD - 8h Volatility Prediction"),
    (44, "BTC/USD - 8h Volatility Prediction"),
    (46, "ETH/USDC - 6h Price Prediction"),
    (47, "5 min BTC Price Prediction"),
    (49, "6h BTC Volatility Prediction"),
    (50, "6h BTC Volatility Prediction"),
    (14, "BTC 5min Prediction"),
    (13, "ETH 5min Prediction"),
    (16, "BTC 5min Volatility Prediction"),
    (15, "ETH 5min Volatility Prediction"),
    (3, "BTC 10min Prediction"),
    (1, "ETH 10min Prediction"),
    (5, "SOL 10min Prediction"),
    (45, "SUI/USDT - 30min Spot Return Prediction"),
    (48, "SUI/USDT - 30min Price Prediction"),
    (9, "ARB 20min Prediction"),
    (7, "ETH 20min Prediction"),
    (8, "BNB 20min Prediction"),
    (10, "Memecoin 1h Prediction"),
    (19, "ETH 8h Volatility Prediction"),
    (17, "ETH 8h Prediction"),
    (18, "BTC 8h Prediction"),
    (20, "BTC 8h Volatility Prediction"),
    (21, "ETH 8h Prediction"),
    (11, "US Presidential Election 2024 - Winning Party"),
    (6, "SOL 24h Prediction"),
    (2, "ETH 24h Prediction"),
    (4, "BTC 24h Prediction"),
    (12, "ETH prediction in 24h"),
];

/// A prediction-market topic
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionTopic {
    /// Topic id sent to the agent
    pub id: u32,
    /// Display name
    pub name: String,
}

impl std::fmt::Display for PredictionTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.id, self.name)
    }
}

/// Topics offered to the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicCatalog {
    topics: Vec<PredictionTopic>,
}

impl TopicCatalog {
    /// Load the static table, keeping ids below `cutoff`
    #[must_use]
    pub fn load(cutoff: u32) -> Self {
        Self::from_table(TOPIC_TABLE, cutoff)
    }

    /// Build from an arbitrary table, keeping ids below `cutoff`
    #[must_use]
    pub fn from_table(table: &[(u32, &str)], cutoff: u32) -> Self {
        let topics = table
            .iter()
            .filter(|(id, _)| *id < cutoff)
            .map(|(id, name)| PredictionTopic {
                id: *id,
                name: (*name).to_string(),
            })
            .collect();
        Self { topics }
    }

    /// Topics in display order
    #[must_use]
    pub fn topics(&self) -> &[PredictionTopic] {
        &self.topics
    }

    /// Look up a topic by id
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&PredictionTopic> {
        self.topics.iter().find(|t| t.id == id)
    }

    /// Number of topics offered
    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Whether no topic passed the filter
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

impl Default for TopicCatalog {
    fn default() -> Self {
        Self::load(DEFAULT_TOPIC_CUTOFF)
    }
}
