//! Instrument universe: the catalog of underlyings and option-chain generation.
//!
//! [`InstrumentUniverse`] is the seam callers depend on. [`StaticUniverse`] serves a fixed
//! catalog and rate injected through configuration; a market-data backed implementation
//! can replace it without touching callers.

use crate::config::{ChainConfig, EngineConfig, MarketConfig};
use crate::error::{ensure_positive, PricingError, Result};
use crate::models::utils::linspace;
use crate::pricer::OptionType;
use serde::{Deserialize, Serialize};

/// A listed underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Underlying {
    /// Unique within a catalog
    pub symbol: String,
    #[serde(rename(serialize = "name"), alias = "name")]
    pub display_name: String,
    pub spot: f64,
    pub currency: String,
}

impl Underlying {
    pub fn new(
        symbol: impl Into<String>,
        display_name: impl Into<String>,
        spot: f64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: display_name.into(),
            spot,
            currency: currency.into(),
        }
    }
}

/// A chain maturity in years together with its display tenor ("3M", "1Y", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaturityBucket {
    pub years: f64,
    pub label: String,
}

impl MaturityBucket {
    pub fn new(years: f64, label: impl Into<String>) -> Self {
        Self {
            years,
            label: label.into(),
        }
    }
}

/// A generated European option contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// `{symbol}-{rounded strike}-{maturity label}`
    pub id: String,
    #[serde(rename = "underlying")]
    pub underlying_symbol: String,
    pub strike: f64,
    pub maturity: f64,
    pub maturity_label: String,
    /// strike / spot
    pub moneyness: f64,
    #[serde(rename = "type")]
    pub option_type: OptionType,
}

/// Deterministic contract id.
pub fn contract_id(symbol: &str, strike: f64, maturity_label: &str) -> String {
    format!("{}-{}-{}", symbol, strike.round() as i64, maturity_label)
}

/// Source of underlyings, the risk-free rate and option chains.
pub trait InstrumentUniverse: Send + Sync {
    /// Catalog in a stable order.
    fn list_underlyings(&self) -> Vec<Underlying>;

    /// Annualised, continuously compounded risk-free rate.
    fn risk_free_rate(&self) -> f64;

    /// Call contracts on a strike × maturity grid around `spot`.
    fn generate_chain(&self, underlying_symbol: &str, spot: f64) -> Result<Vec<OptionContract>>;

    fn find_underlying(&self, symbol: &str) -> Result<Underlying> {
        self.list_underlyings()
            .into_iter()
            .find(|u| u.symbol == symbol)
            .ok_or_else(|| PricingError::UnknownUnderlying(symbol.to_string()))
    }
}

/// Catalog and rate fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticUniverse {
    market: MarketConfig,
    chain: ChainConfig,
}

impl Default for StaticUniverse {
    fn default() -> Self {
        Self::new(MarketConfig::default(), ChainConfig::default())
    }
}

impl StaticUniverse {
    pub fn new(market: MarketConfig, chain: ChainConfig) -> Self {
        Self { market, chain }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.market.clone(), config.chain.clone())
    }

    pub fn chain_config(&self) -> &ChainConfig {
        &self.chain
    }

    /// Strikes of the chain grid for `spot`, ascending.
    pub fn chain_strikes(&self, spot: f64) -> Vec<f64> {
        linspace(
            spot * self.chain.lower_moneyness,
            spot * self.chain.upper_moneyness,
            self.chain.strike_count,
        )
    }
}

impl InstrumentUniverse for StaticUniverse {
    fn list_underlyings(&self) -> Vec<Underlying> {
        self.market.underlyings.clone()
    }

    fn risk_free_rate(&self) -> f64 {
        self.market.risk_free_rate
    }

    fn generate_chain(&self, underlying_symbol: &str, spot: f64) -> Result<Vec<OptionContract>> {
        ensure_positive("spot", spot)?;
        let strikes = self.chain_strikes(spot);

        let mut contracts = Vec::with_capacity(strikes.len() * self.chain.maturities.len());
        for bucket in &self.chain.maturities {
            for &strike in &strikes {
                contracts.push(OptionContract {
                    id: contract_id(underlying_symbol, strike, &bucket.label),
                    underlying_symbol: underlying_symbol.to_string(),
                    strike,
                    maturity: bucket.years,
                    maturity_label: bucket.label.clone(),
                    moneyness: strike / spot,
                    option_type: OptionType::Call,
                });
            }
        }
        Ok(contracts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_catalog_order() {
        let universe = StaticUniverse::default();
        let symbols: Vec<String> = universe
            .list_underlyings()
            .into_iter()
            .map(|u| u.symbol)
            .collect();
        assert_eq!(symbols, vec!["DAX", "AAPL", "TSLA"]);
        assert_eq!(universe.risk_free_rate(), 0.045);
    }

    #[test]
    fn test_find_underlying() {
        let universe = StaticUniverse::default();
        assert_eq!(universe.find_underlying("AAPL").unwrap().spot, 175.0);
        assert_eq!(
            universe.find_underlying("MSFT"),
            Err(PricingError::UnknownUnderlying("MSFT".to_string()))
        );
    }

    #[test]
    fn test_contract_id_rounds_strike() {
        assert_eq!(contract_id("DAX", 13174.999999999998, "6M"), "DAX-13175-6M");
        assert_eq!(contract_id("AAPL", 140.0, "3M"), "AAPL-140-3M");
    }

    #[test]
    fn test_chain_rejects_non_positive_spot() {
        let universe = StaticUniverse::default();
        assert!(universe.generate_chain("DAX", 0.0).is_err());
    }
}
