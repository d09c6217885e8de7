//! Preloaded market listings.
//!
//! Mirrors the curated stock lists the comparison dashboards ship with: a
//! fixed set of large-cap names per exchange, each mapped to its provider
//! symbol. Callers that accept free-form symbols can bypass this module
//! entirely.

use crate::ticker::{Ticker, TickerError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stock exchange whose listings are preloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    /// National Stock Exchange of India (Yahoo suffix ".NS")
    Nse,
    /// Bombay Stock Exchange (Yahoo suffix ".BO")
    Bse,
}

impl Market {
    /// Yahoo Finance symbol suffix for this exchange.
    pub fn symbol_suffix(&self) -> &'static str {
        match self {
            Market::Nse => ".NS",
            Market::Bse => ".BO",
        }
    }

    /// Preloaded listings for this exchange.
    pub fn listings(&self) -> &'static [Listing] {
        match self {
            Market::Nse => NSE_LISTINGS,
            Market::Bse => BSE_LISTINGS,
        }
    }

    /// Looks up the provider symbol for a company name on this exchange.
    pub fn symbol_for(&self, company: &str) -> Option<&'static str> {
        self.listings()
            .iter()
            .find(|listing| listing.company == company)
            .map(|listing| listing.symbol)
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Market::Nse => write!(f, "NSE"),
            Market::Bse => write!(f, "BSE"),
        }
    }
}

/// A preloaded listing: company name and provider symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub company: &'static str,
    pub symbol: &'static str,
}

impl Listing {
    /// Returns the listing's symbol as a validated [`Ticker`].
    pub fn ticker(&self) -> Result<Ticker, TickerError> {
        Ticker::new(self.symbol)
    }
}

const NSE_LISTINGS: &[Listing] = &[
    Listing { company: "Reliance Industries", symbol: "RELIANCE.NS" },
    Listing { company: "Tata Consultancy Services", symbol: "TCS.NS" },
    Listing { company: "Infosys", symbol: "INFY.NS" },
    Listing { company: "HDFC Bank", symbol: "HDFCBANK.NS" },
    Listing { company: "ICICI Bank", symbol: "ICICIBANK.NS" },
    Listing { company: "State Bank of India", symbol: "SBIN.NS" },
    Listing { company: "Bharti Airtel", symbol: "BHARTIARTL.NS" },
    Listing { company: "Adani Enterprises", symbol: "ADANIENT.NS" },
];

const BSE_LISTINGS: &[Listing] = &[
    Listing { company: "Reliance Industries", symbol: "500325.BO" },
    Listing { company: "Tata Consultancy Services", symbol: "532540.BO" },
    Listing { company: "Infosys", symbol: "500209.BO" },
    Listing { company: "HDFC Bank", symbol: "500180.BO" },
    Listing { company: "ICICI Bank", symbol: "532174.BO" },
    Listing { company: "State Bank of India", symbol: "500112.BO" },
    Listing { company: "Bharti Airtel", symbol: "532454.BO" },
    Listing { company: "Adani Enterprises", symbol: "512599.BO" },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_listed_symbols_are_valid_tickers() {
        for market in [Market::Nse, Market::Bse] {
            for listing in market.listings() {
                assert!(
                    listing.ticker().is_ok(),
                    "invalid symbol in {} listings: {}",
                    market,
                    listing.symbol
                );
            }
        }
    }

    #[test]
    fn test_listed_symbols_carry_market_suffix() {
        for market in [Market::Nse, Market::Bse] {
            for listing in market.listings() {
                assert!(listing.symbol.ends_with(market.symbol_suffix()));
            }
        }
    }

    #[test]
    fn test_symbol_lookup_by_company() {
        assert_eq!(Market::Nse.symbol_for("Infosys"), Some("INFY.NS"));
        assert_eq!(Market::Bse.symbol_for("Infosys"), Some("500209.BO"));
        assert_eq!(Market::Nse.symbol_for("Unknown Corp"), None);
    }

    #[test]
    fn test_both_markets_cover_same_companies() {
        let nse: Vec<&str> = Market::Nse.listings().iter().map(|l| l.company).collect();
        let bse: Vec<&str> = Market::Bse.listings().iter().map(|l| l.company).collect();
        assert_eq!(nse, bse);
    }
}
