// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use fluxion_dataset::{AppConfig, DEFAULT_CONFIG_PATH, RunOptions, preflight, run};
use fluxion_dataset_sources::XlsxWorkbooks;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "fluxion-dataset")]
#[command(
    about = "Merge inverter, weather-station and archive measurements onto one 5-minute timeline",
    long_about = None
)]
struct Cli {
    /// Path to the TOML run configuration
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Check the configuration and the input files, then exit
    #[arg(long)]
    validate_only: bool,

    /// Do not render the completeness figure
    #[arg(long)]
    skip_report: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respects RUST_LOG
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = AppConfig::load(&cli.config)?;
    let workbooks = XlsxWorkbooks;

    if cli.validate_only {
        let manifest = preflight(&config, &workbooks)?;
        info!(
            "Configuration valid, {} input files present",
            manifest.len()
        );
        return Ok(());
    }

    run(
        &config,
        &workbooks,
        RunOptions {
            skip_report: cli.skip_report,
        },
    )?;
    Ok(())
}
