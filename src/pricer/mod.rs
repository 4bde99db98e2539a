//! Black-Scholes valuation with volatilities sourced from an injected surface
//!
//! [`OptionPricer`] owns exactly one [`VolatilitySource`] for its lifetime and queries it
//! for every (strike, maturity) it prices. The pricer keeps no other state, so it can be
//! shared freely between threads once constructed.
//!
//! Expired options (`maturity == 0`) are a defined case rather than an error: the price
//! is the intrinsic value and the Greeks are the terminal ones (delta = ±1, everything
//! else zero). The surface is not consulted for them.

pub mod types;

use crate::error::{ensure_finite, ensure_maturity, ensure_positive, PricingError, Result};
use crate::models::bs::{bs_greeks, bs_price};
use crate::models::traits::VolatilitySource;
use crate::models::utils::{forward_price, log_moneyness};
use crate::universe::OptionContract;
use tracing::debug;

pub use types::{Greeks, OptionType, PricingResult};

/// Closed-form option pricer parameterised by its volatility model.
///
/// `V` can be an owned surface, a reference (`&SVISurface`), an `Arc` or a boxed trait
/// object; all of them implement [`VolatilitySource`].
#[derive(Debug, Clone)]
pub struct OptionPricer<V> {
    surface: V,
}

impl<V: VolatilitySource> OptionPricer<V> {
    pub fn new(surface: V) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &V {
        &self.surface
    }

    /// Option premium. Pass `dividend_yield = 0.0` for non-dividend underlyings.
    pub fn price(
        &self,
        spot: f64,
        strike: f64,
        maturity: f64,
        rate: f64,
        option_type: OptionType,
        dividend_yield: f64,
    ) -> Result<f64> {
        validate_inputs(spot, strike, maturity, rate, dividend_yield)?;
        if maturity <= 0.0 {
            return Ok(option_type.intrinsic(spot, strike));
        }
        let sigma = self.model_volatility(spot, strike, maturity, rate)?;
        Ok(bs_price(option_type, spot, strike, rate, dividend_yield, maturity, sigma))
    }

    /// Delta, gamma, vega (per vol point), theta (per day) and rho (per 1%).
    pub fn greeks(
        &self,
        spot: f64,
        strike: f64,
        maturity: f64,
        rate: f64,
        option_type: OptionType,
        dividend_yield: f64,
    ) -> Result<Greeks> {
        validate_inputs(spot, strike, maturity, rate, dividend_yield)?;
        if maturity <= 0.0 {
            return Ok(Greeks::terminal(option_type));
        }
        let sigma = self.model_volatility(spot, strike, maturity, rate)?;
        Ok(bs_greeks(option_type, spot, strike, rate, dividend_yield, maturity, sigma))
    }

    /// Price, Greeks and the surface volatility in one pass.
    ///
    /// For an expired option the reported volatility is still the surface value at
    /// zero maturity, while price and Greeks take the terminal branch.
    pub fn quote(
        &self,
        spot: f64,
        strike: f64,
        maturity: f64,
        rate: f64,
        option_type: OptionType,
        dividend_yield: f64,
    ) -> Result<PricingResult> {
        validate_inputs(spot, strike, maturity, rate, dividend_yield)?;
        if maturity <= 0.0 {
            let implied_vol = self
                .surface
                .implied_volatility(strike, spot, maturity, rate)?;
            return Ok(PricingResult {
                price: option_type.intrinsic(spot, strike),
                implied_vol,
                greeks: Greeks::terminal(option_type),
            });
        }

        let sigma = self.model_volatility(spot, strike, maturity, rate)?;
        Ok(PricingResult {
            price: bs_price(option_type, spot, strike, rate, dividend_yield, maturity, sigma),
            implied_vol: sigma,
            greeks: bs_greeks(option_type, spot, strike, rate, dividend_yield, maturity, sigma),
        })
    }

    /// Quote a generated contract against the given spot and rate.
    pub fn quote_contract(
        &self,
        contract: &OptionContract,
        spot: f64,
        rate: f64,
        dividend_yield: f64,
    ) -> Result<PricingResult> {
        self.quote(
            spot,
            contract.strike,
            contract.maturity,
            rate,
            contract.option_type,
            dividend_yield,
        )
    }

    fn model_volatility(&self, spot: f64, strike: f64, maturity: f64, rate: f64) -> Result<f64> {
        let sigma = self
            .surface
            .implied_volatility(strike, spot, maturity, rate)?;
        if !sigma.is_finite() || sigma <= 0.0 {
            let k = log_moneyness(strike, forward_price(spot, rate, maturity));
            debug!(strike, maturity, sigma, "surface returned a non-positive volatility");
            return Err(PricingError::ParameterConsistency {
                log_moneyness: k,
                total_variance: sigma * sigma * maturity,
            });
        }
        Ok(sigma)
    }
}

fn validate_inputs(
    spot: f64,
    strike: f64,
    maturity: f64,
    rate: f64,
    dividend_yield: f64,
) -> Result<()> {
    ensure_positive("spot", spot)?;
    ensure_positive("strike", strike)?;
    ensure_maturity(maturity)?;
    ensure_finite("rate", rate)?;
    ensure_finite("dividend yield", dividend_yield)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::flat::FlatVolatility;
    use crate::models::svi::SVISurface;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_expired_option_prices_at_intrinsic() {
        let pricer = OptionPricer::new(SVISurface::default());
        let call_itm = pricer.price(100.0, 90.0, 0.0, 0.05, OptionType::Call, 0.0);
        let call_otm = pricer.price(100.0, 110.0, 0.0, 0.05, OptionType::Call, 0.0);
        assert_eq!(call_itm.unwrap(), 10.0);
        assert_eq!(call_otm.unwrap(), 0.0);
        assert_eq!(
            pricer.price(100.0, 110.0, 0.0, 0.05, OptionType::Put, 0.0).unwrap(),
            10.0
        );
    }

    #[test]
    fn test_expired_option_greeks_are_terminal() {
        let pricer = OptionPricer::new(SVISurface::default());
        let g = pricer
            .greeks(100.0, 120.0, 0.0, 0.05, OptionType::Call, 0.0)
            .unwrap();
        assert_eq!(g, Greeks::terminal(OptionType::Call));
        assert_eq!(g.delta, 1.0);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let pricer = OptionPricer::new(FlatVolatility::new(0.2).unwrap());
        let call = OptionType::Call;
        assert!(matches!(
            pricer.price(0.0, 100.0, 1.0, 0.0, call, 0.0),
            Err(PricingError::InputDomain(_))
        ));
        assert!(matches!(
            pricer.price(100.0, -5.0, 1.0, 0.0, call, 0.0),
            Err(PricingError::InputDomain(_))
        ));
        assert!(matches!(
            pricer.greeks(100.0, 100.0, -0.1, 0.0, call, 0.0),
            Err(PricingError::InputDomain(_))
        ));
        // Expired options are still validated
        assert!(pricer.price(-1.0, 100.0, 0.0, 0.0, call, 0.0).is_err());
    }

    #[test]
    fn test_flat_surface_reproduces_plain_black_scholes() {
        let pricer = OptionPricer::new(FlatVolatility::new(0.2).unwrap());
        let result = pricer
            .quote(42.0, 40.0, 0.5, 0.1, OptionType::Call, 0.0)
            .unwrap();
        assert_abs_diff_eq!(result.price, 4.759, epsilon = 1e-3);
        assert_eq!(result.implied_vol, 0.2);
    }

    #[test]
    fn test_quote_matches_separate_calls() {
        let pricer = OptionPricer::new(SVISurface::default());
        let (s, k, t, r) = (15500.0, 16275.0, 0.5, 0.045);
        let q = pricer.quote(s, k, t, r, OptionType::Put, 0.01).unwrap();
        assert_eq!(q.price, pricer.price(s, k, t, r, OptionType::Put, 0.01).unwrap());
        assert_eq!(q.greeks, pricer.greeks(s, k, t, r, OptionType::Put, 0.01).unwrap());
        assert_eq!(
            q.implied_vol,
            pricer.surface().implied_volatility(k, s, t, r).unwrap()
        );
    }
}
