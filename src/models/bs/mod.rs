// Closed-form Black-Scholes kernel with an explicit volatility input.  The
// surface lookup and input validation live in the pricer; everything here
// assumes T > 0 and sigma > 0.

use crate::error::{PricingError, Result};
use crate::pricer::types::{Greeks, OptionType};
use roots::{find_root_brent, SimpleConvergency};
use std::f64::consts::{PI, SQRT_2};

/// Calendar days used to express theta as a per-day decay.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Standard normal cumulative distribution function, 0.5 * [1 + erf(x / sqrt(2))]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x / SQRT_2))
}

/// Standard normal probability density function
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// The (d1, d2) pair of the Black-Scholes formula.
#[allow(non_snake_case)]
pub fn d1_d2(S: f64, K: f64, r: f64, q: f64, T: f64, sigma: f64) -> (f64, f64) {
    let vol_sqrt_t = sigma * T.sqrt();
    let d1 = ((S / K).ln() + (r - q + 0.5 * sigma * sigma) * T) / vol_sqrt_t;
    (d1, d1 - vol_sqrt_t)
}

/// Price of a European option under Black-Scholes assumptions.
#[allow(non_snake_case)]
pub fn bs_price(option_type: OptionType, S: f64, K: f64, r: f64, q: f64, T: f64, sigma: f64) -> f64 {
    let (d1, d2) = d1_d2(S, K, r, q, T, sigma);
    let spot_df = (-q * T).exp();
    let strike_df = (-r * T).exp();
    match option_type {
        OptionType::Call => S * spot_df * norm_cdf(d1) - K * strike_df * norm_cdf(d2),
        OptionType::Put => K * strike_df * norm_cdf(-d2) - S * spot_df * norm_cdf(-d1),
    }
}

/// Analytic Greeks. Vega and rho are per 1 point (1%) move, theta is per calendar day.
#[allow(non_snake_case)]
pub fn bs_greeks(
    option_type: OptionType,
    S: f64,
    K: f64,
    r: f64,
    q: f64,
    T: f64,
    sigma: f64,
) -> Greeks {
    let (d1, d2) = d1_d2(S, K, r, q, T, sigma);
    let sqrt_t = T.sqrt();
    let spot_df = (-q * T).exp();
    let strike_df = (-r * T).exp();
    let pdf_d1 = norm_pdf(d1);

    // Shared by both sides of the theta formula
    let decay = -S * pdf_d1 * sigma * spot_df / (2.0 * sqrt_t);

    let (delta, theta, rho) = match option_type {
        OptionType::Call => (
            spot_df * norm_cdf(d1),
            decay - r * K * strike_df * norm_cdf(d2) + q * S * spot_df * norm_cdf(d1),
            K * T * strike_df * norm_cdf(d2) / 100.0,
        ),
        OptionType::Put => (
            -spot_df * norm_cdf(-d1),
            decay + r * K * strike_df * norm_cdf(-d2) - q * S * spot_df * norm_cdf(-d1),
            -K * T * strike_df * norm_cdf(-d2) / 100.0,
        ),
    };

    Greeks {
        delta,
        gamma: pdf_d1 * spot_df / (S * sigma * sqrt_t),
        vega: S * pdf_d1 * sqrt_t * spot_df / 100.0,
        theta: theta / DAYS_PER_YEAR,
        rho,
    }
}

/// No-arbitrage (lower, upper) price bounds for a European option.
#[allow(non_snake_case)]
pub fn price_bounds(option_type: OptionType, S: f64, K: f64, r: f64, q: f64, T: f64) -> (f64, f64) {
    let fwd_spot = S * (-q * T).exp();
    let pv_strike = K * (-r * T).exp();
    match option_type {
        OptionType::Call => ((fwd_spot - pv_strike).max(0.0), fwd_spot),
        OptionType::Put => ((pv_strike - fwd_spot).max(0.0), pv_strike),
    }
}

const MIN_VOL: f64 = 1e-6;
const MAX_VOL: f64 = 5.0;
const MAX_ITERATIONS: usize = 100;

/// Volatility that reproduces `target_price`, solved with Brent's method on [1e-6, 5].
#[allow(non_snake_case)]
pub fn implied_vol_from_price(
    option_type: OptionType,
    target_price: f64,
    S: f64,
    K: f64,
    r: f64,
    q: f64,
    T: f64,
    tol: f64,
) -> Result<f64> {
    if T <= 0.0 {
        return Err(PricingError::input_domain(format!(
            "implied volatility requires maturity > 0, got {}",
            T
        )));
    }
    let (lower, upper) = price_bounds(option_type, S, K, r, q, T);
    if !target_price.is_finite() || target_price <= lower || target_price >= upper {
        return Err(PricingError::input_domain(format!(
            "target price {} outside no-arbitrage bounds ({}, {})",
            target_price, lower, upper
        )));
    }

    let objective = |sigma: f64| bs_price(option_type, S, K, r, q, T, sigma) - target_price;

    let mut convergency = SimpleConvergency {
        eps: tol,
        max_iter: MAX_ITERATIONS,
    };
    find_root_brent(MIN_VOL, MAX_VOL, &objective, &mut convergency).map_err(|e| {
        PricingError::NoConvergence(format!(
            "{} price {} (K={}, T={}): {:?}",
            option_type, target_price, K, T, e
        ))
    })
}
