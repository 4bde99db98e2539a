// Example: plot_smile.rs
// Draws the SVI implied volatility smile of one underlying, one line per grid maturity,
// and reports any butterfly-arbitrage violation of the configured parameters.
//
// Usage:
//     cargo run --example plot_smile -- [SYMBOL] [config.toml]
//
// The chart is written to iv_smile.svg in the working directory.

use std::collections::BTreeMap;
use std::env;

use anyhow::{bail, Result};
use plotters::prelude::*;
use surface_pricer::{EngineConfig, QuoteEngine};

const COLORS: [RGBColor; 6] = [RED, BLUE, GREEN, MAGENTA, CYAN, BLACK];

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let symbol = args.get(1).map(String::as_str).unwrap_or("DAX");
    let mut config = match args.get(2) {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::reference(),
    };
    // Denser strike grid for a smooth curve
    config.grid.strike_count = 121;

    let engine = QuoteEngine::from_config(&config)?;
    let snapshot = engine.volatility_surface(symbol)?;
    if snapshot.surface.is_empty() {
        bail!("empty volatility surface for {}", symbol);
    }

    match engine.surface().check_butterfly_arbitrage(-1.5, 1.5, 301) {
        Ok(()) => println!("No butterfly arbitrage on k in [-1.5, 1.5]"),
        Err(e) => println!("Warning: {}", e),
    }

    // maturity (as bits, ordered) -> smile points in percent
    let mut smiles: BTreeMap<u64, Vec<(f64, f64)>> = BTreeMap::new();
    for p in &snapshot.surface {
        smiles
            .entry(p.maturity.to_bits())
            .or_default()
            .push((p.strike, p.implied_vol * 100.0));
    }

    let min_strike = snapshot
        .surface
        .iter()
        .map(|p| p.strike)
        .fold(f64::INFINITY, f64::min);
    let max_strike = snapshot
        .surface
        .iter()
        .map(|p| p.strike)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_iv = snapshot
        .surface
        .iter()
        .map(|p| p.implied_vol * 100.0)
        .fold(f64::INFINITY, f64::min);
    let max_iv = snapshot
        .surface
        .iter()
        .map(|p| p.implied_vol * 100.0)
        .fold(f64::NEG_INFINITY, f64::max);

    // 5% padding, never below 0%
    let padding = (max_iv - min_iv) * 0.05;
    let y_min = (min_iv - padding).max(0.0);
    let y_max = max_iv + padding;

    let root = SVGBackend::new("iv_smile.svg", (1280, 768)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(
            format!("SVI implied volatility | {} spot {:.2}", snapshot.symbol, snapshot.spot),
            ("sans-serif", 30),
        )
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(min_strike..max_strike, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Strike")
        .y_desc("Implied Vol (%)")
        .draw()?;

    for (i, (maturity_bits, points)) in smiles.into_iter().enumerate() {
        let color = COLORS[i % COLORS.len()];
        let maturity = f64::from_bits(maturity_bits);
        chart
            .draw_series(std::iter::once(PathElement::new(points, color)))?
            .label(format!("T = {:.2}y", maturity))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    println!("Chart saved to iv_smile.svg");
    Ok(())
}
