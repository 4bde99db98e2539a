use crate::error::PricingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Option exercise right. European exercise only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Payoff at expiry: max(0, S - K) for a call, max(0, K - S) for a put.
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }

    /// Delta reported once the option has expired.
    pub fn terminal_delta(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionType {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            other => Err(PricingError::input_domain(format!(
                "unsupported option type: {:?}",
                other
            ))),
        }
    }
}

/// First and second order sensitivities of an option price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// dV/dS
    pub delta: f64,
    /// d²V/dS²
    pub gamma: f64,
    /// Price change per 1 vol point
    pub vega: f64,
    /// Price change per calendar day
    pub theta: f64,
    /// Price change per 1% move in the rate
    pub rho: f64,
}

impl Greeks {
    /// Greeks of an option at (or past) expiry.
    pub fn terminal(option_type: OptionType) -> Self {
        Self {
            delta: option_type.terminal_delta(),
            ..Self::default()
        }
    }
}

/// Price, volatility and Greeks from a single pricing call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub price: f64,
    pub implied_vol: f64,
    pub greeks: Greeks,
}
