//! Error types for surface construction, volatility queries and pricing.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Caller supplied an input outside the model's domain (non-positive spot or
    /// strike, negative maturity, unknown option type, non-finite numbers).
    #[error("Input domain error: {0}")]
    InputDomain(String),

    /// The surface parameters produce a negative total variance at the queried point.
    #[error(
        "Parameter consistency error: total variance {total_variance} at log-moneyness {log_moneyness}"
    )]
    ParameterConsistency {
        log_moneyness: f64,
        total_variance: f64,
    },

    /// Surface parameters rejected at construction.
    #[error("Invalid surface parameters: {0}")]
    InvalidParameters(String),

    #[error("Unknown underlying: {0}")]
    UnknownUnderlying(String),

    #[error("Root finding did not converge: {0}")]
    NoConvergence(String),
}

pub type Result<T> = std::result::Result<T, PricingError>;

impl PricingError {
    pub fn input_domain(msg: impl Into<String>) -> Self {
        Self::InputDomain(msg.into())
    }

    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    /// True for errors caused by the caller's arguments rather than the model.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InputDomain(_) | Self::UnknownUnderlying(_))
    }
}

/// Rejects non-positive or non-finite prices.
pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PricingError::input_domain(format!(
            "{} must be > 0 and finite, got {}",
            name, value
        )));
    }
    Ok(())
}

pub(crate) fn ensure_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(PricingError::input_domain(format!(
            "{} must be finite, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Maturity may be zero (terminal case) but never negative.
pub(crate) fn ensure_maturity(maturity: f64) -> Result<()> {
    if !maturity.is_finite() || maturity < 0.0 {
        return Err(PricingError::input_domain(format!(
            "maturity must be >= 0 and finite, got {}",
            maturity
        )));
    }
    Ok(())
}
