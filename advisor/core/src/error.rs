//! Error Types
//!
//! Failures a conversation flow can run into. None of them end the session:
//! each is turned into at most one chat message (or a placeholder text) and the
//! orchestrator is ready for the next turn.

use thiserror::Error;

use crate::portfolio::TransferCategory;

/// Failures while fetching transfer history for one category
#[derive(Debug, Error)]
pub enum TransferError {
    /// Request never produced a response (connect, timeout, body read)
    #[error("transfer request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success HTTP status
    #[error("provider returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (possibly truncated)
        body: String,
    },

    /// Response body did not have the expected shape
    #[error("malformed provider payload: {0}")]
    Malformed(String),
}

/// Failures surfaced by conversation flows
#[derive(Debug, Error)]
pub enum FlowError {
    /// Text looked like an address but is not one
    #[error("invalid wallet address: {0}")]
    InvalidInput(String),

    /// One of the three category fetches failed; no partial summary exists
    #[error("portfolio fetch failed for {address} ({category}): {source}")]
    PortfolioFetchFailed {
        /// Address being aggregated
        address: String,
        /// Category whose fetch failed first
        category: TransferCategory,
        /// Underlying cause
        #[source]
        source: TransferError,
    },

    /// Advice endpoint failed; callers see a placeholder instead
    #[error("advice fetch failed: {0}")]
    AdviceFetchFailed(String),

    /// Inference endpoint failed; callers see a placeholder instead
    #[error("inference fetch failed: {0}")]
    InferenceFetchFailed(String),
}

impl FlowError {
    /// Address carried by a portfolio failure
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        match self {
            Self::PortfolioFetchFailed { address, .. } => Some(address),
            Self::InvalidInput(text) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portfolio_error_display_and_source() {
        let err = FlowError::PortfolioFetchFailed {
            address: "0xabc".to_string(),
            category: TransferCategory::Erc721,
            source: TransferError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            },
        };
        let text = err.to_string();
        assert!(text.contains("0xabc"));
        assert!(text.contains("ERC-721"));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.address(), Some("0xabc"));
    }

    #[test]
    fn test_downgraded_errors_have_no_address() {
        assert_eq!(FlowError::AdviceFetchFailed("x".into()).address(), None);
        assert_eq!(FlowError::InferenceFetchFailed("x".into()).address(), None);
    }
}
