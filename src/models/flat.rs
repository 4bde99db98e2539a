//! Constant volatility across strikes and maturities.

use crate::error::{ensure_maturity, ensure_positive, PricingError, Result};
use crate::models::traits::VolatilitySource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlatVolatility {
    vol: f64,
}

impl FlatVolatility {
    pub fn new(vol: f64) -> Result<Self> {
        if !vol.is_finite() || vol <= 0.0 {
            return Err(PricingError::invalid_parameters(format!(
                "flat volatility must be > 0 and finite, got {}",
                vol
            )));
        }
        Ok(Self { vol })
    }

    pub fn vol(&self) -> f64 {
        self.vol
    }
}

impl VolatilitySource for FlatVolatility {
    fn implied_volatility(&self, strike: f64, spot: f64, maturity: f64, _rate: f64) -> Result<f64> {
        ensure_positive("strike", strike)?;
        ensure_positive("spot", spot)?;
        ensure_maturity(maturity)?;
        Ok(self.vol)
    }
}
