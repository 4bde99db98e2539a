//! # Surface-Pricer: Volatility-Surface Driven Option Pricing and Greeks
//!
//! `surface-pricer` prices vanilla European equity and index options with Black-Scholes,
//! taking the volatility for every (strike, maturity) pair from a parametric SVI implied
//! volatility surface instead of a single flat number.
//!
//! ## Core Features
//!
//! - **SVI Surface**: five-parameter total-variance smile, evaluated per strike/maturity
//!   or as a full grid
//! - **Closed-form Pricing**: Black-Scholes premium plus delta, gamma, vega, theta, rho
//! - **Instrument Universe**: configurable catalog of underlyings and option-chain generator
//! - **Quote Engine**: priced chains, surface snapshots and single-option quotes as
//!   serializable records
//!
//! ## Quick Start
//!
//! ```rust
//! use surface_pricer::{OptionPricer, OptionType, SVISurface};
//!
//! let surface = SVISurface::default();
//! let pricer = OptionPricer::new(&surface);
//!
//! let result = pricer.quote(15500.0, 16000.0, 0.5, 0.045, OptionType::Call, 0.0)?;
//! println!("price {:.2}, vol {:.4}, delta {:.4}", result.price, result.implied_vol, result.greeks.delta);
//! # Ok::<(), surface_pricer::PricingError>(())
//! ```
//!
//! Every computation is a pure function of its arguments and of parameters fixed at
//! construction, so surfaces, pricers and engines can be shared between threads once built.
//!
//! ## Errors
//!
//! All numeric operations return [`PricingError`]:
//! - `InputDomain` for non-positive spot/strike, negative maturity or an unknown option type
//! - `ParameterConsistency` when the surface parameters produce negative total variance
//! - `UnknownUnderlying` for symbols missing from the universe
//!
//! An expired option (`maturity == 0`) is not an error: it prices at intrinsic value.

// ================================================================================================
// MODULES
// ================================================================================================

pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod pricer;
pub mod quote;
pub mod universe;

// ================================================================================================
// PUBLIC RE-EXPORTS
// ================================================================================================

pub use config::{ChainConfig, EngineConfig, GridConfig, MarketConfig};
pub use error::{PricingError, Result};

// Surface models
pub use models::bs::implied_vol_from_price;
pub use models::flat::FlatVolatility;
pub use models::svi::{SVIParams, SVISurface, DEFAULT_SURFACE_MATURITIES};
pub use models::traits::VolatilitySource;
pub use models::utils::SurfacePoint;

pub use pricer::{Greeks, OptionPricer, OptionType, PricingResult};
pub use quote::{ChainQuote, PriceRequest, QuoteEngine, QuotedOption, SingleQuote, SurfaceSnapshot};
pub use universe::{InstrumentUniverse, MaturityBucket, OptionContract, StaticUniverse, Underlying};

/// Price a batch of contracts against one spot and rate.
///
/// Results keep the order of `contracts`. The first failing contract aborts the batch;
/// no contract is silently given a default price.
///
/// # Example
///
/// ```rust
/// use surface_pricer::{price_contracts, InstrumentUniverse, SVISurface, StaticUniverse};
///
/// let universe = StaticUniverse::default();
/// let dax = universe.find_underlying("DAX")?;
/// let chain = universe.generate_chain(&dax.symbol, dax.spot)?;
///
/// let results = price_contracts(&SVISurface::default(), &chain, dax.spot, universe.risk_free_rate())?;
/// assert_eq!(results.len(), 27);
/// # Ok::<(), surface_pricer::PricingError>(())
/// ```
pub fn price_contracts<V: VolatilitySource>(
    surface: V,
    contracts: &[OptionContract],
    spot: f64,
    rate: f64,
) -> Result<Vec<PricingResult>> {
    let pricer = OptionPricer::new(surface);
    contracts
        .iter()
        .map(|contract| pricer.quote_contract(contract, spot, rate, 0.0))
        .collect()
}
