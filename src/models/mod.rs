pub mod bs;
pub mod flat;
pub mod svi;

/// Common traits used by all surface models
pub mod traits {
    use crate::error::Result;
    use std::sync::Arc;

    /// Capability consumed by the pricer: a volatility for any (strike, maturity) point.
    ///
    /// Implementations must be pure functions of their (immutable) parameters so that a
    /// single instance can be shared across threads without synchronisation.
    pub trait VolatilitySource: Send + Sync + std::fmt::Debug {
        /// Implied volatility for `strike` given the current `spot`, time to maturity in
        /// years and the continuously compounded risk-free `rate`.
        fn implied_volatility(&self, strike: f64, spot: f64, maturity: f64, rate: f64)
            -> Result<f64>;
    }

    impl<T: VolatilitySource + ?Sized> VolatilitySource for &T {
        fn implied_volatility(
            &self,
            strike: f64,
            spot: f64,
            maturity: f64,
            rate: f64,
        ) -> Result<f64> {
            (**self).implied_volatility(strike, spot, maturity, rate)
        }
    }

    impl<T: VolatilitySource + ?Sized> VolatilitySource for Box<T> {
        fn implied_volatility(
            &self,
            strike: f64,
            spot: f64,
            maturity: f64,
            rate: f64,
        ) -> Result<f64> {
            (**self).implied_volatility(strike, spot, maturity, rate)
        }
    }

    impl<T: VolatilitySource + ?Sized> VolatilitySource for Arc<T> {
        fn implied_volatility(
            &self,
            strike: f64,
            spot: f64,
            maturity: f64,
            rate: f64,
        ) -> Result<f64> {
            (**self).implied_volatility(strike, spot, maturity, rate)
        }
    }
}

/// Utility functions shared by the surface models and the pricer
pub mod utils {
    use crate::error::Result;
    use crate::models::traits::VolatilitySource;
    use serde::{Deserialize, Serialize};

    /// Forward price F = S * exp(r * T)
    pub fn forward_price(spot: f64, rate: f64, maturity: f64) -> f64 {
        spot * (rate * maturity).exp()
    }

    /// Calculate log-moneyness: ln(K/F)
    pub fn log_moneyness(strike: f64, forward: f64) -> f64 {
        (strike / forward).ln()
    }

    /// `n` evenly spaced values over the closed interval `[start, stop]`.
    ///
    /// The last value is pinned to `stop` so that grid edges are exact.
    pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (stop - start) / (n - 1) as f64;
                let mut values: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
                values[n - 1] = stop;
                values
            }
        }
    }

    /// One row of a generated volatility grid.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct SurfacePoint {
        pub strike: f64,
        pub maturity: f64,
        /// strike / spot
        pub moneyness: f64,
        pub implied_vol: f64,
    }

    /// Evaluate `source` on every (maturity, strike) pair.
    ///
    /// Output is maturity-major: all strikes of the first maturity, then the next one.
    pub fn surface_grid<V: VolatilitySource + ?Sized>(
        source: &V,
        spot: f64,
        strikes: &[f64],
        maturities: &[f64],
        rate: f64,
    ) -> Result<Vec<SurfacePoint>> {
        let mut points = Vec::with_capacity(strikes.len() * maturities.len());
        for &maturity in maturities {
            for &strike in strikes {
                let implied_vol = source.implied_volatility(strike, spot, maturity, rate)?;
                points.push(SurfacePoint {
                    strike,
                    maturity,
                    moneyness: strike / spot,
                    implied_vol,
                });
            }
        }
        Ok(points)
    }

}
