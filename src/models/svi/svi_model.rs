// src/models/svi/svi_model.rs

//! Stochastic Volatility Inspired (SVI) volatility surface
//!
//! The total implied variance w(k) = σ_imp² · T is parameterised in log-moneyness
//! k = ln(K/F) as
//!
//! w(k) = a + b * (ρ(k-m) + sqrt((k-m)² + σ²))
//!
//! where the parameters are:
//! - a: variance level (vertical shift)
//! - b: slope of the wings (b >= 0)
//! - ρ: skew, rotates the smile (-1 <= ρ <= 1)
//! - m: horizontal shift (ATM location in log-moneyness)
//! - σ: curvature around the minimum (σ > 0)
//!
//! One parameter set is shared by every maturity: the implied volatility at maturity T is
//! `sqrt(w(k) / T)`. Parameters are fixed at construction and never recalibrated.
//!
//! Structural validation happens in [`SVISurface::new`]. Whether total variance stays
//! non-negative is only checked when a point is queried, which then fails with
//! [`PricingError::ParameterConsistency`]. [`SVISurface::new_strict`] rejects such
//! parameter sets up front instead.

use crate::error::{ensure_finite, ensure_maturity, ensure_positive, PricingError, Result};
use crate::models::traits::VolatilitySource;
use crate::models::utils::{forward_price, linspace, log_moneyness, surface_grid, SurfacePoint};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Maturities (years) of the default surface grid: 3M, 6M, 1Y, 2Y.
pub const DEFAULT_SURFACE_MATURITIES: [f64; 4] = [0.25, 0.5, 1.0, 2.0];
const DEFAULT_STRIKE_COUNT: usize = 20;
const DEFAULT_LOWER_MONEYNESS: f64 = 0.7;
const DEFAULT_UPPER_MONEYNESS: f64 = 1.3;

/// Raw SVI parameters. Fields missing on deserialization take the default smile's value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SVIParams {
    /// Variance level
    pub a: f64,
    /// Wing slope, must be >= 0
    pub b: f64,
    /// Skew, must be in [-1, 1]
    pub rho: f64,
    /// ATM shift in log-moneyness
    pub m: f64,
    /// Curvature, must be > 0
    pub sigma: f64,
}

impl Default for SVIParams {
    /// Equity-style smile with a negative skew.
    fn default() -> Self {
        Self {
            a: 0.04,
            b: 0.4,
            rho: -0.4,
            m: 0.0,
            sigma: 0.2,
        }
    }
}

impl SVIParams {
    /// Creates new SVI parameters with structural validation.
    pub fn new(a: f64, b: f64, rho: f64, m: f64, sigma: f64) -> Result<Self> {
        let params = Self {
            a,
            b,
            rho,
            m,
            sigma,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks `b >= 0`, `sigma > 0`, `|rho| <= 1` and finiteness of every parameter.
    pub fn validate(&self) -> Result<()> {
        if !self.a.is_finite() {
            return Err(PricingError::invalid_parameters(format!(
                "parameter a (a={}) must be finite",
                self.a
            )));
        }
        if self.b < 0.0 || !self.b.is_finite() {
            return Err(PricingError::invalid_parameters(format!(
                "parameter b (b={}) must be >= 0 and finite",
                self.b
            )));
        }
        if !(-1.0..=1.0).contains(&self.rho) {
            return Err(PricingError::invalid_parameters(format!(
                "parameter rho (rho={}) must be in [-1, 1]",
                self.rho
            )));
        }
        if !self.m.is_finite() {
            return Err(PricingError::invalid_parameters(format!(
                "parameter m (m={}) must be finite",
                self.m
            )));
        }
        if self.sigma <= 0.0 || !self.sigma.is_finite() {
            return Err(PricingError::invalid_parameters(format!(
                "parameter sigma (sigma={}) must be > 0 and finite",
                self.sigma
            )));
        }
        Ok(())
    }

    /// Global minimum of w(k) over all k: a + b*sigma*sqrt(1-rho^2)
    pub fn min_total_variance(&self) -> f64 {
        self.a + self.b * self.sigma * (1.0 - self.rho * self.rho).sqrt()
    }

    /// Structural validation plus non-negative total variance at every k.
    pub fn validate_strict(&self) -> Result<()> {
        self.validate()?;
        let min_variance = self.min_total_variance();
        if min_variance < 0.0 {
            return Err(PricingError::invalid_parameters(format!(
                "a + b*sigma*sqrt(1-rho^2) = {} < 0, total variance turns negative",
                min_variance
            )));
        }
        Ok(())
    }
}

/// SVI surface over strike and maturity.
#[derive(Debug, Clone, PartialEq)]
pub struct SVISurface {
    params: SVIParams,
}

impl Default for SVISurface {
    fn default() -> Self {
        Self {
            params: SVIParams::default(),
        }
    }
}

impl SVISurface {
    /// Surface with structurally valid parameters. Negative variance is reported lazily.
    pub fn new(params: SVIParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Surface whose total variance is guaranteed non-negative everywhere.
    pub fn new_strict(params: SVIParams) -> Result<Self> {
        if let Err(e) = params.validate_strict() {
            warn!(?params, "rejecting SVI parameters: {}", e);
            return Err(e);
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &SVIParams {
        &self.params
    }

    /// w(k) = a + b * (ρ(k-m) + sqrt((k-m)² + σ²))
    pub fn total_variance(&self, k: f64) -> f64 {
        let p = &self.params;
        let k_minus_m = k - p.m;
        let sqrt_term = (k_minus_m * k_minus_m + p.sigma * p.sigma).sqrt();

        p.a + p.b * (p.rho * k_minus_m + sqrt_term)
    }

    /// Implied volatility at `strike` for an underlying at `spot`.
    ///
    /// Log-moneyness is taken against the forward `spot * exp(rate * maturity)`. At zero
    /// maturity the result is `sqrt(w(k))` without time scaling; the pricer never asks
    /// for that point since expired options are valued at intrinsic.
    pub fn implied_volatility(
        &self,
        strike: f64,
        spot: f64,
        maturity: f64,
        rate: f64,
    ) -> Result<f64> {
        ensure_positive("strike", strike)?;
        ensure_positive("spot", spot)?;
        ensure_maturity(maturity)?;
        ensure_finite("rate", rate)?;

        let forward = forward_price(spot, rate, maturity);
        if !forward.is_finite() || forward <= 0.0 {
            return Err(PricingError::input_domain(format!(
                "forward price {} out of range for rate={} maturity={}",
                forward, rate, maturity
            )));
        }
        let k = log_moneyness(strike, forward);
        let w = self.total_variance(k);

        if !w.is_finite() || w < 0.0 {
            debug!(k, w, "negative SVI total variance");
            return Err(PricingError::ParameterConsistency {
                log_moneyness: k,
                total_variance: w,
            });
        }

        if maturity > 0.0 {
            Ok((w / maturity).sqrt())
        } else {
            Ok(w.sqrt())
        }
    }

    /// Implied volatility grid, maturities outer and strikes inner.
    ///
    /// Without explicit strikes, 20 strikes spaced evenly over [0.7, 1.3] × spot are used;
    /// without explicit maturities, [`DEFAULT_SURFACE_MATURITIES`].
    pub fn generate_surface(
        &self,
        spot: f64,
        strikes: Option<&[f64]>,
        maturities: Option<&[f64]>,
        rate: f64,
    ) -> Result<Vec<SurfacePoint>> {
        ensure_positive("spot", spot)?;
        let default_strikes;
        let strikes = match strikes {
            Some(strikes) => strikes,
            None => {
                default_strikes = linspace(
                    spot * DEFAULT_LOWER_MONEYNESS,
                    spot * DEFAULT_UPPER_MONEYNESS,
                    DEFAULT_STRIKE_COUNT,
                );
                &default_strikes
            }
        };
        let maturities = maturities.unwrap_or(&DEFAULT_SURFACE_MATURITIES);

        surface_grid(self, spot, strikes, maturities, rate)
    }

    /// Gatheral's butterfly density
    /// g(k) = (1 - k*w'/(2*w))² - (w')²/4 * (1/w + 1/4) + w''/2
    ///
    /// Negative values mean the implied risk-neutral density is negative at k.
    pub fn butterfly_density(&self, k: f64) -> f64 {
        let p = &self.params;
        let k_minus_m = k - p.m;
        let radius = (k_minus_m * k_minus_m + p.sigma * p.sigma).sqrt();

        let w = self.total_variance(k);
        let w_k = p.b * (p.rho + k_minus_m / radius);
        let w_kk = p.b * p.sigma * p.sigma / (radius * radius * radius);

        let term1 = 1.0 - k * w_k / (2.0 * w);
        term1 * term1 - (w_k * w_k / 4.0) * (1.0 / w + 0.25) + w_kk / 2.0
    }

    /// Scans `samples` evenly spaced points of [k_min, k_max] for butterfly arbitrage.
    ///
    /// Diagnostic only: the parameters are left untouched and the first violation is
    /// returned as an error. A sample with negative total variance fails with
    /// [`PricingError::ParameterConsistency`].
    pub fn check_butterfly_arbitrage(&self, k_min: f64, k_max: f64, samples: usize) -> Result<()> {
        const TOLERANCE: f64 = 1e-9;

        for k in linspace(k_min, k_max, samples) {
            let w = self.total_variance(k);
            if !w.is_finite() || w < 0.0 {
                warn!(k, w, "negative SVI total variance in butterfly check");
                return Err(PricingError::ParameterConsistency {
                    log_moneyness: k,
                    total_variance: w,
                });
            }
            if w <= TOLERANCE {
                // g(k) is undefined at zero variance
                continue;
            }
            let g_k = self.butterfly_density(k);
            if g_k < -TOLERANCE {
                warn!(k, g_k, "butterfly arbitrage in SVI slice");
                return Err(PricingError::invalid_parameters(format!(
                    "butterfly arbitrage detected at k={:.6}: g(k) = {:.6e} < 0",
                    k, g_k
                )));
            }
        }
        Ok(())
    }
}

impl VolatilitySource for SVISurface {
    fn implied_volatility(&self, strike: f64, spot: f64, maturity: f64, rate: f64) -> Result<f64> {
        SVISurface::implied_volatility(self, strike, spot, maturity, rate)
    }
}
