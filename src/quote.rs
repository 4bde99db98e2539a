//! Quote engine: wires the instrument universe, the volatility surface and the pricer
//! together for the read paths a quoting front end needs.
//!
//! Every method resolves the underlying through the universe (reporting
//! [`PricingError::UnknownUnderlying`](crate::error::PricingError::UnknownUnderlying) for unlisted symbols), takes the universe's rate
//! and returns plain serializable records. Nothing is cached between calls.

use crate::config::{EngineConfig, GridConfig};
use crate::error::Result;
use crate::models::svi::SVISurface;
use crate::models::traits::VolatilitySource;
use crate::models::utils::{linspace, surface_grid, SurfacePoint};
use crate::pricer::{Greeks, OptionPricer, OptionType};
use crate::universe::{InstrumentUniverse, OptionContract, StaticUniverse, Underlying};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Volatility grid for one underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    pub symbol: String,
    pub spot: f64,
    pub surface: Vec<SurfacePoint>,
}

/// A chain contract with its model valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotedOption {
    #[serde(flatten)]
    pub contract: OptionContract,
    pub price: f64,
    pub implied_vol: f64,
    pub greeks: Greeks,
}

/// Fully priced option chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainQuote {
    pub symbol: String,
    pub spot: f64,
    pub rate: f64,
    pub options: Vec<QuotedOption>,
}

/// Single-option pricing request. Missing fields default to a DAX call without dividends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRequest {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    pub strike: f64,
    pub maturity: f64,
    #[serde(default = "default_option_type")]
    pub option_type: OptionType,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
}

impl PriceRequest {
    pub fn new(symbol: impl Into<String>, strike: f64, maturity: f64, option_type: OptionType) -> Self {
        Self {
            symbol: symbol.into(),
            strike,
            maturity,
            option_type,
            dividend_yield: None,
        }
    }

    pub fn with_dividend_yield(mut self, dividend_yield: f64) -> Self {
        self.dividend_yield = Some(dividend_yield);
        self
    }
}

fn default_symbol() -> String {
    "DAX".to_string()
}

fn default_option_type() -> OptionType {
    OptionType::Call
}

/// Valuation of a single requested option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleQuote {
    pub symbol: String,
    pub spot: f64,
    pub strike: f64,
    pub maturity: f64,
    pub option_type: OptionType,
    pub price: f64,
    pub implied_vol: f64,
    pub greeks: Greeks,
    pub rate: f64,
}

#[derive(Debug, Clone)]
pub struct QuoteEngine<U, V> {
    universe: U,
    surface: V,
    grid: GridConfig,
}

impl QuoteEngine<StaticUniverse, SVISurface> {
    /// Engine over the configured catalog and SVI surface.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let surface = SVISurface::new(config.surface)?;
        Ok(Self::new(
            StaticUniverse::from_config(config),
            surface,
            config.grid.clone(),
        ))
    }
}

impl<U: InstrumentUniverse, V: VolatilitySource> QuoteEngine<U, V> {
    pub fn new(universe: U, surface: V, grid: GridConfig) -> Self {
        Self {
            universe,
            surface,
            grid,
        }
    }

    pub fn universe(&self) -> &U {
        &self.universe
    }

    pub fn surface(&self) -> &V {
        &self.surface
    }

    pub fn pricer(&self) -> OptionPricer<&V> {
        OptionPricer::new(&self.surface)
    }

    pub fn underlyings(&self) -> Vec<Underlying> {
        self.universe.list_underlyings()
    }

    /// Implied volatility grid around the underlying's spot, maturity-major.
    pub fn volatility_surface(&self, symbol: &str) -> Result<SurfaceSnapshot> {
        let underlying = self.universe.find_underlying(symbol)?;
        let rate = self.universe.risk_free_rate();
        let strikes = linspace(
            underlying.spot * self.grid.lower_moneyness,
            underlying.spot * self.grid.upper_moneyness,
            self.grid.strike_count,
        );

        let surface = surface_grid(
            &self.surface,
            underlying.spot,
            &strikes,
            &self.grid.maturities,
            rate,
        )?;
        debug!(symbol, points = surface.len(), "generated volatility surface");

        Ok(SurfaceSnapshot {
            symbol: underlying.symbol,
            spot: underlying.spot,
            surface,
        })
    }

    /// Generated chain for `symbol`, every contract priced off the surface.
    pub fn option_chain(&self, symbol: &str) -> Result<ChainQuote> {
        let underlying = self.universe.find_underlying(symbol)?;
        let spot = underlying.spot;
        let rate = self.universe.risk_free_rate();
        let pricer = self.pricer();

        let options = self
            .universe
            .generate_chain(&underlying.symbol, spot)?
            .into_iter()
            .map(|contract| {
                let result = pricer.quote_contract(&contract, spot, rate, 0.0)?;
                Ok(QuotedOption {
                    contract,
                    price: result.price,
                    implied_vol: result.implied_vol,
                    greeks: result.greeks,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(symbol, contracts = options.len(), "priced option chain");

        Ok(ChainQuote {
            symbol: underlying.symbol,
            spot,
            rate,
            options,
        })
    }

    /// Price and Greeks for one option on a listed underlying.
    pub fn price_option(&self, request: &PriceRequest) -> Result<SingleQuote> {
        let underlying = self.universe.find_underlying(&request.symbol)?;
        let rate = self.universe.risk_free_rate();
        let dividend_yield = request.dividend_yield.unwrap_or(0.0);

        let result = self
            .pricer()
            .quote(
                underlying.spot,
                request.strike,
                request.maturity,
                rate,
                request.option_type,
                dividend_yield,
            )?;
        debug!(
            symbol = %request.symbol,
            strike = request.strike,
            maturity = request.maturity,
            price = result.price,
            "priced single option"
        );

        Ok(SingleQuote {
            symbol: underlying.symbol,
            spot: underlying.spot,
            strike: request.strike,
            maturity: request.maturity,
            option_type: request.option_type,
            price: result.price,
            implied_vol: result.implied_vol,
            greeks: result.greeks,
            rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;

    fn engine() -> QuoteEngine<StaticUniverse, SVISurface> {
        QuoteEngine::from_config(&EngineConfig::reference()).unwrap()
    }

    #[test]
    fn test_unknown_symbol_is_reported() {
        let engine = engine();
        assert_eq!(
            engine.option_chain("NOPE").unwrap_err(),
            PricingError::UnknownUnderlying("NOPE".to_string())
        );
        assert!(engine.volatility_surface("NOPE").is_err());
        let request = PriceRequest::new("NOPE", 100.0, 0.5, OptionType::Call);
        assert!(engine.price_option(&request).is_err());
    }

    #[test]
    fn test_surface_snapshot_uses_grid() {
        let snapshot = engine().volatility_surface("AAPL").unwrap();
        assert_eq!(snapshot.spot, 175.0);
        assert_eq!(snapshot.surface.len(), 20 * 4);
        assert_eq!(snapshot.surface[0].maturity, 0.25);
        assert_eq!(snapshot.surface[79].maturity, 2.0);
    }

    #[test]
    fn test_price_request_defaults() {
        let request: PriceRequest =
            serde_json::from_str(r#"{"strike": 15500, "maturity": 0.5}"#).unwrap();
        assert_eq!(request.symbol, "DAX");
        assert_eq!(request.option_type, OptionType::Call);
        assert_eq!(request.dividend_yield, None);
    }
}
