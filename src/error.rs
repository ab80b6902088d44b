// =============================================================================
// Engine Error Kinds
// =============================================================================

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Precondition violation at the engine boundary (non-finite prices,
    /// non-increasing timestamps, unknown market/interval strings).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An upstream market-data provider could not supply candles.
    #[error("market data unavailable from {provider}: {reason}")]
    DataUnavailable { provider: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    pub fn data_unavailable(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable kind, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::DataUnavailable { .. } => "data_unavailable",
            Self::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_provider() {
        let err = EngineError::data_unavailable("binance", "HTTP 503");
        assert_eq!(err.to_string(), "market data unavailable from binance: HTTP 503");
        assert_eq!(err.kind(), "data_unavailable");
    }
}
