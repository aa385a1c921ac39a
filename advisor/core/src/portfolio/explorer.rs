//! Explorer Transfer Provider
//!
//! Etherscan-compatible block explorer client (sonicscan by default).
//!
//! # Explorer API
//!
//! One `GET` per category against the explorer base URL:
//!
//! ```text
//! ?module=account&action=tokentx&address=0x..&page=1&offset=10
//!  &startblock=0&endblock=99999999&sort=asc&apikey=..
//! ```
//!
//! The body is `{"status": "1"|"0", "message": "...", "result": [...] | "..."}`.
//! An empty history comes back as status `"0"` with "No transactions found".

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::provider::{TransferProvider, TransferQuery, TransferRecord};
use crate::backend::build_http_client;
use crate::error::TransferError;

/// Longest response body kept in a `TransferError::Status`
const MAX_ERROR_BODY: usize = 512;

/// Block explorer client
#[derive(Clone)]
pub struct ExplorerClient {
    /// Explorer API base URL
    base_url: String,
    /// API key (sent as `apikey`)
    api_key: Option<String>,
    /// HTTP client
    http_client: reqwest::Client,
}

impl std::fmt::Debug for ExplorerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .finish_non_exhaustive()
    }
}

impl ExplorerClient {
    /// Create a new explorer client
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            api_key,
            http_client: build_http_client(timeout)?,
        })
    }

    /// Explorer base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query-string pairs for a page request
    fn query_params(&self, query: &TransferQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("module", "account".to_string()),
            ("action", query.category.explorer_action().to_string()),
            ("address", query.address.clone()),
            ("page", query.page.to_string()),
            ("offset", query.page_size.to_string()),
            ("startblock", query.start_block.to_string()),
            ("endblock", query.end_block.to_string()),
            ("sort", query.sort.as_str().to_string()),
        ];
        if let Some(ref key) = self.api_key {
            params.push(("apikey", key.clone()));
        }
        params
    }
}

#[async_trait]
impl TransferProvider for ExplorerClient {
    fn name(&self) -> &str {
        "Explorer"
    }

    async fn fetch_transfers(
        &self,
        query: &TransferQuery,
    ) -> Result<Vec<TransferRecord>, TransferError> {
        tracing::debug!(
            category = %query.category,
            address = %query.address,
            page_size = query.page_size,
            api_key_set = self.api_key.is_some(),
            "Requesting transfer history"
        );

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&self.query_params(query))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(floor_char_boundary(&body, MAX_ERROR_BODY));
            return Err(TransferError::Status { status, body });
        }

        let body = response.text().await?;
        let records = parse_explorer_body(&body)?;

        tracing::debug!(
            category = %query.category,
            records = records.len(),
            "Transfer history received"
        );
        Ok(records)
    }
}

/// Raw explorer envelope
#[derive(Debug, Deserialize)]
struct ExplorerEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: serde_json::Value,
}

/// Decode an explorer response body into transfer records
///
/// # Errors
///
/// Returns [`TransferError::Malformed`] when the body is not JSON, when
/// `result` is an error string, or when records do not decode.
pub fn parse_explorer_body(body: &str) -> Result<Vec<TransferRecord>, TransferError> {
    let envelope: ExplorerEnvelope = serde_json::from_str(body)
        .map_err(|e| TransferError::Malformed(format!("invalid JSON: {e}")))?;

    match envelope.result {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| {
                serde_json::from_value::<TransferRecord>(item)
                    .map_err(|e| TransferError::Malformed(format!("bad transfer record: {e}")))
            })
            .collect(),
        serde_json::Value::Null => Ok(Vec::new()),
        other => {
            let message = envelope.message.unwrap_or_default();
            if envelope.status.as_deref() == Some("0")
                && message.to_lowercase().contains("no transactions found")
            {
                return Ok(Vec::new());
            }
            let detail = match other {
                serde_json::Value::String(s) => s,
                v => v.to_string(),
            };
            Err(TransferError::Malformed(format!("{message}: {detail}")))
        }
    }
}

/// Largest index <= `max` that lies on a char boundary
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    (0..=max).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::{SortOrder, TransferCategory};

    fn query(category: TransferCategory) -> TransferQuery {
        TransferQuery {
            category,
            address: "0xabc".to_string(),
            page: 1,
            page_size: 10,
            start_block: 0,
            end_block: 99_999_999,
            sort: SortOrder::Asc,
        }
    }

    #[test]
    fn test_query_params() {
        let client = ExplorerClient::new("http://localhost/api", Some("KEY".into()), None).unwrap();
        let params = client.query_params(&query(TransferCategory::Erc1155));
        let get = |k: &str| {
            params
                .iter()
                .find(|(name, _)| *name == k)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("module"), Some("account"));
        assert_eq!(get("action"), Some("token1155tx"));
        assert_eq!(get("address"), Some("0xabc"));
        assert_eq!(get("page"), Some("1"));
        assert_eq!(get("offset"), Some("10"));
        assert_eq!(get("startblock"), Some("0"));
        assert_eq!(get("endblock"), Some("99999999"));
        assert_eq!(get("sort"), Some("asc"));
        assert_eq!(get("apikey"), Some("KEY"));
    }

    #[test]
    fn test_query_params_without_key() {
        let client = ExplorerClient::new("http://localhost/api", None, None).unwrap();
        let params = client.query_params(&query(TransferCategory::Erc20));
        assert!(params.iter().all(|(k, _)| *k != "apikey"));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = ExplorerClient::new("http://localhost/api", Some("SECRET".into()), None).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("SECRET"));
        assert!(debug.contains("<set>"));
    }

    #[test]
    fn test_parse_records() {
        let body = r#"{"status":"1","message":"OK","result":[
            {"tokenName":"Wrapped Sonic","tokenSymbol":"wS"},
            {"tokenName":"USDC.e","tokenSymbol":"USDC.e"}
        ]}"#;
        let records = parse_explorer_body(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].display_name(), Some("USDC.e"));
    }

    #[test]
    fn test_parse_no_transactions() {
        let body = r#"{"status":"0","message":"No transactions found","result":[]}"#;
        assert!(parse_explorer_body(body).unwrap().is_empty());

        let body = r#"{"status":"0","message":"No transactions found","result":"none"}"#;
        assert!(parse_explorer_body(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_missing_result_is_empty() {
        assert!(parse_explorer_body(r#"{"status":"1"}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_error_string_is_malformed() {
        let body = r#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#;
        let err = parse_explorer_body(body).unwrap_err();
        match err {
            TransferError::Malformed(detail) => assert!(detail.contains("Invalid API Key")),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_not_json_is_malformed() {
        assert!(matches!(
            parse_explorer_body("<html>"),
            Err(TransferError::Malformed(_))
        ));
    }

    #[test]
    fn test_floor_char_boundary() {
        assert_eq!(floor_char_boundary("abc", 10), 3);
        assert_eq!(floor_char_boundary("héllo", 2), 1);
    }
}
