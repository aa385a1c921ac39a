//! Transfer History Provider Trait
//!
//! Abstraction over whatever service returns token-transfer history for an
//! address. The aggregator only needs a display name per record; richer fields
//! are kept so surfaces or future rules can use them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransferError;

/// Token standard a transfer belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferCategory {
    /// Fungible tokens
    Erc20,
    /// Unique non-fungible tokens
    Erc721,
    /// Semi-fungible multi-tokens
    Erc1155,
}

impl TransferCategory {
    /// All categories, in display order
    pub const ALL: [Self; 3] = [Self::Erc20, Self::Erc721, Self::Erc1155];

    /// Explorer `action` parameter for this category
    #[must_use]
    pub fn explorer_action(&self) -> &'static str {
        match self {
            Self::Erc20 => "tokentx",
            Self::Erc721 => "tokennfttx",
            Self::Erc1155 => "token1155tx",
        }
    }

    /// Heading used when summarising this category in chat
    #[must_use]
    pub fn summary_label(&self) -> &'static str {
        match self {
            Self::Erc20 => "ERC-20 Tokens",
            Self::Erc721 => "ERC-721 NFTs",
            Self::Erc1155 => "ERC-1155 Tokens",
        }
    }
}

impl std::fmt::Display for TransferCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Erc20 => write!(f, "ERC-20"),
            Self::Erc721 => write!(f, "ERC-721"),
            Self::Erc1155 => write!(f, "ERC-1155"),
        }
    }
}

/// Result ordering requested from the provider
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first
    #[default]
    Asc,
    /// Newest first
    Desc,
}

impl SortOrder {
    /// Query-string value
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One page request against the provider
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferQuery {
    /// Category to query
    pub category: TransferCategory,
    /// Address whose transfers are wanted
    pub address: String,
    /// 1-based page number
    pub page: u32,
    /// Records per page
    pub page_size: u32,
    /// First block (inclusive)
    pub start_block: u64,
    /// Last block (inclusive)
    pub end_block: u64,
    /// Sort order
    pub sort: SortOrder,
}

/// A transfer record as returned by the provider
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    /// Token display name
    #[serde(default)]
    pub token_name: Option<String>,
    /// Token ticker
    #[serde(default)]
    pub token_symbol: Option<String>,
    /// Token contract
    #[serde(default)]
    pub contract_address: Option<String>,
    /// Transaction hash
    #[serde(default)]
    pub hash: Option<String>,
}

impl TransferRecord {
    /// Record with only a display name (handy for providers and tests)
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            token_name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Display name, if present and non-blank
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.token_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Transfer history provider
///
/// Implement this to source transfers from a different explorer or indexer.
#[async_trait]
pub trait TransferProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Fetch one page of transfers
    async fn fetch_transfers(
        &self,
        query: &TransferQuery,
    ) -> Result<Vec<TransferRecord>, TransferError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_actions() {
        assert_eq!(TransferCategory::Erc20.explorer_action(), "tokentx");
        assert_eq!(TransferCategory::Erc721.explorer_action(), "tokennfttx");
        assert_eq!(TransferCategory::Erc1155.explorer_action(), "token1155tx");
    }

    #[test]
    fn test_record_deserializes_explorer_fields() {
        let record: TransferRecord = serde_json::from_value(serde_json::json!({
            "tokenName": "Wrapped Sonic",
            "tokenSymbol": "wS",
            "contractAddress": "0x039e",
            "hash": "0xfeed",
            "value": "1000"
        }))
        .unwrap();
        assert_eq!(record.display_name(), Some("Wrapped Sonic"));
        assert_eq!(record.token_symbol.as_deref(), Some("wS"));
    }

    #[test]
    fn test_blank_name_has_no_display_name() {
        let record = TransferRecord::named("   ");
        assert_eq!(record.display_name(), None);
        assert_eq!(TransferRecord::default().display_name(), None);
    }
}
