//! Flat CSV output for priced chains and surface grids.

use crate::models::utils::SurfacePoint;
use crate::quote::ChainQuote;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

/// One CSV row per chain contract; greeks are spread into their own columns.
#[derive(Debug, Serialize)]
struct ChainRow<'a> {
    id: &'a str,
    underlying: &'a str,
    strike: f64,
    maturity: f64,
    maturity_label: &'a str,
    moneyness: f64,
    #[serde(rename = "type")]
    option_type: &'static str,
    price: f64,
    implied_vol: f64,
    delta: f64,
    gamma: f64,
    vega: f64,
    theta: f64,
    rho: f64,
}

/// Write a priced chain with a header row.
pub fn write_chain_csv<W: Write>(chain: &ChainQuote, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for quoted in &chain.options {
        let c = &quoted.contract;
        wtr.serialize(ChainRow {
            id: &c.id,
            underlying: &c.underlying_symbol,
            strike: c.strike,
            maturity: c.maturity,
            maturity_label: &c.maturity_label,
            moneyness: c.moneyness,
            option_type: c.option_type.as_str(),
            price: quoted.price,
            implied_vol: quoted.implied_vol,
            delta: quoted.greeks.delta,
            gamma: quoted.greeks.gamma,
            vega: quoted.greeks.vega,
            theta: quoted.greeks.theta,
            rho: quoted.greeks.rho,
        })
        .with_context(|| format!("failed to write chain row {}", c.id))?;
    }
    wtr.flush().context("failed to flush chain csv")?;
    Ok(())
}

/// Write surface points (strike, maturity, moneyness, implied_vol) with a header row.
pub fn write_surface_csv<W: Write>(points: &[SurfacePoint], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for point in points {
        wtr.serialize(point)
            .context("failed to write surface point")?;
    }
    wtr.flush().context("failed to flush surface csv")?;
    Ok(())
}
