use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticker symbol identifying a tradable security at a data provider.
///
/// Symbols are plain strings such as "AAPL" or "RELIANCE.NS" (exchange
/// suffixes are part of the symbol). Validation rejects empty symbols and
/// characters no provider accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    /// Creates a new ticker from a symbol string.
    ///
    /// # Arguments
    /// * `symbol` - The ticker symbol (e.g., "AAPL", "500325.BO")
    ///
    /// # Errors
    /// Returns an error if the symbol is empty or contains invalid characters.
    pub fn new(symbol: impl Into<String>) -> Result<Self, TickerError> {
        let symbol = symbol.into();
        if symbol.is_empty() {
            return Err(TickerError::EmptySymbol);
        }

        // Allow alphanumeric plus the separators providers actually use
        // (dots for exchange suffixes, hyphens and share classes, '=' and '^'
        // for Yahoo futures/index symbols).
        if !symbol
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == '_' || c == '=' || c == '^')
        {
            return Err(TickerError::InvalidCharacters);
        }

        Ok(Ticker(symbol))
    }

    /// Returns the symbol as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur when creating a ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerError {
    /// The symbol is empty
    EmptySymbol,
    /// The symbol contains invalid characters
    InvalidCharacters,
}

impl fmt::Display for TickerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickerError::EmptySymbol => write!(f, "Ticker symbol cannot be empty"),
            TickerError::InvalidCharacters => {
                write!(f, "Ticker symbol contains invalid characters")
            }
        }
    }
}

impl std::error::Error for TickerError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_creation_valid() {
        let ticker = Ticker::new("AAPL").unwrap();
        assert_eq!(ticker.as_str(), "AAPL");
    }

    #[test]
    fn test_ticker_creation_with_exchange_suffix() {
        assert!(Ticker::new("RELIANCE.NS").is_ok());
        assert!(Ticker::new("500325.BO").is_ok());
        assert!(Ticker::new("BRK-B").is_ok());
    }

    #[test]
    fn test_ticker_creation_empty_string() {
        let result = Ticker::new("");
        assert_eq!(result.unwrap_err(), TickerError::EmptySymbol);
    }

    #[test]
    fn test_ticker_creation_invalid_characters() {
        let result = Ticker::new("AAPL @");
        assert_eq!(result.unwrap_err(), TickerError::InvalidCharacters);
    }

    #[test]
    fn test_ticker_display() {
        let ticker = Ticker::new("INFY.NS").unwrap();
        assert_eq!(format!("{}", ticker), "INFY.NS");
    }

    #[test]
    fn test_ticker_hashable() {
        use std::collections::HashMap;

        let key1 = Ticker::new("AAPL").unwrap();
        let key2 = Ticker::new("AAPL").unwrap();
        let key3 = Ticker::new("MSFT").unwrap();

        let mut map = HashMap::new();
        map.insert(key1, "Apple Inc.");
        assert_eq!(map.get(&key2), Some(&"Apple Inc."));
        assert_eq!(map.get(&key3), None);
    }
}
