// Example: chain_demo.rs
// Prices the generated option chain of one underlying off the SVI surface and prints
// price, implied vol and Greeks per contract.
//
// Usage:
//     cargo run --example chain_demo -- [SYMBOL] [config.toml] [chain.csv]
//
// Without a config file the reference setup is used (DAX/AAPL/TSLA, 4.5% rate).
// RUST_LOG=debug shows the engine's tracing output.

use std::env;
use std::fs::File;

use anyhow::{Context, Result};
use surface_pricer::export::write_chain_csv;
use surface_pricer::{EngineConfig, OptionType, PriceRequest, QuoteEngine};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let symbol = args.get(1).map(String::as_str).unwrap_or("DAX");
    let config = match args.get(2) {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::reference(),
    };
    let engine = QuoteEngine::from_config(&config)?;

    println!("Underlyings:");
    for u in engine.underlyings() {
        println!("  {:<6} {:<14} {:>10.2} {}", u.symbol, u.display_name, u.spot, u.currency);
    }

    let chain = engine
        .option_chain(symbol)
        .with_context(|| format!("failed to price chain for {}", symbol))?;
    println!(
        "\n{} chain | spot {:.2} | rate {:.2}%",
        chain.symbol,
        chain.spot,
        chain.rate * 100.0
    );
    println!(
        "{:<18} {:>10} {:>10} {:>8} {:>8} {:>10} {:>9} {:>9} {:>9}",
        "id", "strike", "price", "iv%", "delta", "gamma", "vega", "theta", "rho"
    );
    for q in &chain.options {
        println!(
            "{:<18} {:>10.2} {:>10.4} {:>8.2} {:>8.4} {:>10.6} {:>9.4} {:>9.4} {:>9.4}",
            q.contract.id,
            q.contract.strike,
            q.price,
            q.implied_vol * 100.0,
            q.greeks.delta,
            q.greeks.gamma,
            q.greeks.vega,
            q.greeks.theta,
            q.greeks.rho
        );
    }

    // ATM put for comparison
    let request = PriceRequest::new(chain.symbol.clone(), chain.spot, 0.5, OptionType::Put);
    let put = engine.price_option(&request)?;
    println!(
        "\n6M ATM put: price {:.4}, iv {:.2}%, delta {:.4}",
        put.price,
        put.implied_vol * 100.0,
        put.greeks.delta
    );

    if let Some(path) = args.get(3) {
        let file = File::create(path).with_context(|| format!("failed to create {}", path))?;
        write_chain_csv(&chain, file)?;
        println!("Chain written to {}", path);
    }

    Ok(())
}
