//! Engine configuration: surface parameters, the instrument catalog, chain layout and
//! the default surface grid.
//!
//! Built once at start-up (from TOML or [`EngineConfig::default`]) and handed to the
//! components by value or reference. Every field has a default, so a TOML file only
//! needs the sections it overrides:
//!
//! ```toml
//! [surface]
//! a = 0.04
//! b = 0.4
//! rho = -0.4
//! m = 0.0
//! sigma = 0.2
//!
//! [market]
//! risk_free_rate = 0.045
//!
//! [[market.underlyings]]
//! symbol = "DAX"
//! display_name = "DAX Index"
//! spot = 15500.0
//! currency = "EUR"
//! ```

use crate::models::svi::{SVIParams, DEFAULT_SURFACE_MATURITIES};
use crate::universe::{MaturityBucket, Underlying};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Catalog of underlyings and the flat risk-free rate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,

    #[serde(default = "default_underlyings")]
    pub underlyings: Vec<Underlying>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            underlyings: default_underlyings(),
        }
    }
}

/// Strike × maturity layout of generated option chains.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_chain_strike_count")]
    pub strike_count: usize,

    /// Lowest strike as a fraction of spot
    #[serde(default = "default_chain_lower")]
    pub lower_moneyness: f64,

    /// Highest strike as a fraction of spot
    #[serde(default = "default_chain_upper")]
    pub upper_moneyness: f64,

    #[serde(default = "default_chain_maturities")]
    pub maturities: Vec<MaturityBucket>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            strike_count: default_chain_strike_count(),
            lower_moneyness: default_chain_lower(),
            upper_moneyness: default_chain_upper(),
            maturities: default_chain_maturities(),
        }
    }
}

/// Grid used for volatility surface snapshots.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_grid_strike_count")]
    pub strike_count: usize,

    #[serde(default = "default_grid_lower")]
    pub lower_moneyness: f64,

    #[serde(default = "default_grid_upper")]
    pub upper_moneyness: f64,

    #[serde(default = "default_grid_maturities")]
    pub maturities: Vec<f64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            strike_count: default_grid_strike_count(),
            lower_moneyness: default_grid_lower(),
            upper_moneyness: default_grid_upper(),
            maturities: default_grid_maturities(),
        }
    }
}

/// Main configuration struct
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub surface: SVIParams,

    #[serde(default)]
    pub market: MarketConfig,

    #[serde(default)]
    pub chain: ChainConfig,

    #[serde(default)]
    pub grid: GridConfig,
}

impl EngineConfig {
    /// The reference set-up: default SVI smile, DAX/AAPL/TSLA at 4.5%.
    pub fn reference() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(s).context("invalid engine configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&raw)
            .with_context(|| format!("failed to load config file {}", path.display()))?;
        info!(
            path = %path.display(),
            underlyings = config.market.underlyings.len(),
            "loaded engine configuration"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.surface
            .validate()
            .map_err(|e| anyhow!("surface: {}", e))?;

        if !self.market.risk_free_rate.is_finite() {
            return Err(anyhow!(
                "market: risk_free_rate must be finite, got {}",
                self.market.risk_free_rate
            ));
        }
        let mut seen = HashSet::new();
        for u in &self.market.underlyings {
            if u.symbol.is_empty() {
                return Err(anyhow!("market: underlying symbol must not be empty"));
            }
            if !seen.insert(u.symbol.as_str()) {
                return Err(anyhow!("market: duplicate underlying symbol {}", u.symbol));
            }
            if !u.spot.is_finite() || u.spot <= 0.0 {
                return Err(anyhow!(
                    "market: spot of {} must be > 0, got {}",
                    u.symbol,
                    u.spot
                ));
            }
        }

        validate_range(
            "chain",
            self.chain.strike_count,
            self.chain.lower_moneyness,
            self.chain.upper_moneyness,
        )?;
        if self.chain.maturities.is_empty() {
            return Err(anyhow!("chain: at least one maturity is required"));
        }
        for bucket in &self.chain.maturities {
            validate_maturity("chain", bucket.years)?;
        }

        validate_range(
            "grid",
            self.grid.strike_count,
            self.grid.lower_moneyness,
            self.grid.upper_moneyness,
        )?;
        if self.grid.maturities.is_empty() {
            return Err(anyhow!("grid: at least one maturity is required"));
        }
        for &t in &self.grid.maturities {
            validate_maturity("grid", t)?;
        }
        Ok(())
    }
}

fn validate_range(section: &str, count: usize, lower: f64, upper: f64) -> Result<()> {
    if count == 0 {
        return Err(anyhow!("{}: strike_count must be >= 1", section));
    }
    if !(lower > 0.0 && lower <= upper && upper.is_finite()) {
        return Err(anyhow!(
            "{}: moneyness range [{}, {}] must be positive and ordered",
            section,
            lower,
            upper
        ));
    }
    Ok(())
}

fn validate_maturity(section: &str, years: f64) -> Result<()> {
    if !years.is_finite() || years < 0.0 {
        return Err(anyhow!(
            "{}: maturity must be >= 0, got {}",
            section,
            years
        ));
    }
    Ok(())
}

fn default_risk_free_rate() -> f64 {
    0.045
}

fn default_underlyings() -> Vec<Underlying> {
    vec![
        Underlying::new("DAX", "DAX Index", 15500.0, "EUR"),
        Underlying::new("AAPL", "Apple Inc.", 175.0, "USD"),
        Underlying::new("TSLA", "Tesla Inc.", 250.0, "USD"),
    ]
}

fn default_chain_strike_count() -> usize {
    9
}

fn default_chain_lower() -> f64 {
    0.8
}

fn default_chain_upper() -> f64 {
    1.2
}

fn default_chain_maturities() -> Vec<MaturityBucket> {
    vec![
        MaturityBucket::new(0.25, "3M"),
        MaturityBucket::new(0.5, "6M"),
        MaturityBucket::new(1.0, "1Y"),
    ]
}

fn default_grid_strike_count() -> usize {
    20
}

fn default_grid_lower() -> f64 {
    0.7
}

fn default_grid_upper() -> f64 {
    1.3
}

fn default_grid_maturities() -> Vec<f64> {
    DEFAULT_SURFACE_MATURITIES.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_reference() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::reference());
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_toml_str(
            r#"
            [surface]
            a = 0.02
            b = 0.3
            rho = -0.2
            m = 0.05
            sigma = 0.15

            [market]
            risk_free_rate = 0.03

            [[market.underlyings]]
            symbol = "SPX"
            display_name = "S&P 500"
            spot = 5000.0
            currency = "USD"

            [chain]
            strike_count = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.surface.rho, -0.2);
        assert_eq!(config.market.risk_free_rate, 0.03);
        assert_eq!(config.market.underlyings.len(), 1);
        assert_eq!(config.chain.strike_count, 5);
        assert_eq!(config.chain.maturities.len(), 3);
        assert_eq!(config.grid, GridConfig::default());
    }

    #[test]
    fn test_partial_surface_section() {
        let config = EngineConfig::from_toml_str("[surface]\nrho = -0.2\n").unwrap();
        let expected = SVIParams {
            rho: -0.2,
            ..SVIParams::default()
        };
        assert_eq!(config.surface, expected);
    }

    #[test]
    fn test_rejects_invalid_documents() {
        // rho outside [-1, 1]
        assert!(EngineConfig::from_toml_str(
            "[surface]\na = 0.04\nb = 0.4\nrho = -1.5\nm = 0.0\nsigma = 0.2\n"
        )
        .is_err());

        // duplicate symbols
        let dup = r#"
            [[market.underlyings]]
            symbol = "X"
            display_name = "X"
            spot = 1.0
            currency = "USD"

            [[market.underlyings]]
            symbol = "X"
            display_name = "X again"
            spot = 2.0
            currency = "USD"
        "#;
        assert!(EngineConfig::from_toml_str(dup).is_err());

        assert!(EngineConfig::from_toml_str("[chain]\nstrike_count = 0\n").is_err());
        assert!(EngineConfig::from_toml_str("[grid]\nlower_moneyness = 1.5\n").is_err());
        assert!(EngineConfig::from_toml_str("[grid]\nmaturities = [-1.0]\n").is_err());
    }
}
