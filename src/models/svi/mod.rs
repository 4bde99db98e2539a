//! SVI volatility surface

pub mod svi_model;

pub use svi_model::{SVIParams, SVISurface, DEFAULT_SURFACE_MATURITIES};
