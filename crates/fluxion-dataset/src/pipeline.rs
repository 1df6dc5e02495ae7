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

//! Sequential run: each stage takes the table by value and hands back the
//! extended table, with a checkpoint written after every source.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fluxion_dataset_core::storage::{write_rollup, write_table};
use fluxion_dataset_core::{MeasurementTable, MonthlyRollup};
use fluxion_dataset_report::{CompletenessMatrix, check_drawable, render_image};
use fluxion_dataset_sources::{
    Manifest, SourceKind, SourceReport, WorkbookSource, merge_archive, merge_inverter,
    merge_weather_station,
};
use tracing::{info, warn};

use crate::config::AppConfig;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Do not render the completeness figure
    pub skip_report: bool,
}

/// Outcome of a full run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub sources: Vec<SourceReport>,
    pub rows: usize,
    pub columns: usize,
    pub rollup_rows: usize,
    pub clean_data: PathBuf,
    pub monthly: PathBuf,
    pub figure: Option<PathBuf>,
}

impl RunSummary {
    pub fn log(&self) {
        info!("Run summary:");
        for report in &self.sources {
            report.log_summary();
        }
        info!(
            "   Table: {} rows x {} columns -> {}",
            self.rows,
            self.columns,
            self.clean_data.display()
        );
        info!(
            "   Monthly rollup: {} rows -> {}",
            self.rollup_rows,
            self.monthly.display()
        );
        if let Some(figure) = &self.figure {
            info!("   Completeness figure -> {}", figure.display());
        }
    }
}

/// Enumerate every file the configured sources will read
pub fn build_manifest(config: &AppConfig) -> Result<Manifest> {
    let mut manifest = Manifest::new();

    if let Some(inverters) = &config.inverters {
        let (start, end) = inverters.bounds(&config.timeline)?;
        for &id in &inverters.ids {
            manifest.add_range(SourceKind::Inverter(id), &inverters.data_dir, start, end)?;
        }
    }
    if let Some(weather) = &config.weather_station {
        let (start, end) = weather.bounds(&config.timeline)?;
        manifest.add_range(SourceKind::WeatherStation, &weather.data_dir, start, end)?;
    }
    if let Some(archive) = &config.archive {
        let (start, end) = archive.bounds(&config.timeline)?;
        manifest.add_range(SourceKind::Archive, &archive.data_dir, start, end)?;
    }

    Ok(manifest)
}

/// Validate the configuration and check that every input file is present
pub fn preflight(config: &AppConfig, workbooks: &dyn WorkbookSource) -> Result<Manifest> {
    config.validate().ensure_valid()?;
    let manifest = build_manifest(config)?;
    manifest
        .validate(workbooks)
        .context("Input files missing, nothing was read")?;
    info!("Manifest: {} files available", manifest.len());
    Ok(manifest)
}

fn checkpoint(table: &MeasurementTable, path: &Path, stage: &str) -> Result<()> {
    write_table(table, path)
        .with_context(|| format!("Failed to write checkpoint after {stage}"))?;
    info!("Checkpoint after {} written to {}", stage, path.display());
    Ok(())
}

/// Run every enabled source, then write the rollup and the figure
pub fn run(
    config: &AppConfig,
    workbooks: &dyn WorkbookSource,
    options: RunOptions,
) -> Result<RunSummary> {
    let manifest = preflight(config, workbooks)?;
    let output = &config.output;

    let mut table = MeasurementTable::new(config.timeline.build()?);
    let mut sources = Vec::new();

    if let Some(inverters) = &config.inverters {
        for &id in &inverters.ids {
            let kind = SourceKind::Inverter(id);
            let (merged, report) = merge_inverter(
                table,
                &inverters.source(id)?,
                &manifest.files(kind),
                workbooks,
            )
            .with_context(|| format!("Failed to merge {kind}"))?;
            table = merged;
            checkpoint(&table, &output.clean_data, &report.source)?;
            sources.push(report);
        }
    }

    if let Some(weather) = &config.weather_station {
        let (merged, report) = merge_weather_station(
            table,
            &weather.source()?,
            &manifest.files(SourceKind::WeatherStation),
            workbooks,
        )
        .context("Failed to merge weather station")?;
        table = merged;
        checkpoint(&table, &output.clean_data, &report.source)?;
        sources.push(report);
    }

    if let Some(archive) = &config.archive {
        let (merged, report) = merge_archive(
            table,
            &archive.source()?,
            &manifest.files(SourceKind::Archive),
        )
        .context("Failed to merge archive")?;
        table = merged;
        checkpoint(&table, &output.clean_data, &report.source)?;
        sources.push(report);
    }

    if sources.is_empty() {
        checkpoint(&table, &output.clean_data, "empty run")?;
    }

    let rollup = MonthlyRollup::from_table(&table, &config.rollup.columns)
        .context("Failed to compute monthly rollup")?;
    write_rollup(&rollup, &output.monthly).context("Failed to write monthly rollup")?;
    info!(
        "Monthly rollup ({} months) written to {}",
        rollup.rows().len(),
        output.monthly.display()
    );

    let figure = if options.skip_report {
        None
    } else {
        let matrix = CompletenessMatrix::hourly(&table);
        if let Err(reason) = check_drawable(&matrix) {
            warn!("Completeness figure skipped: {reason}");
            None
        } else {
            render_image(
                &matrix,
                &output.summary_figure,
                config.report.width,
                config.report.height,
            )
            .context("Failed to render completeness figure")?;
            Some(output.summary_figure.clone())
        }
    };

    let summary = RunSummary {
        sources,
        rows: table.row_count(),
        columns: table.columns().len(),
        rollup_rows: rollup.rows().len(),
        clean_data: output.clean_data.clone(),
        monthly: output.monthly.clone(),
        figure,
    };
    summary.log();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxion_dataset_sources::MemoryWorkbooks;
    use std::fmt::Write as _;
    use std::fs;
    use tempfile::TempDir;

    fn config(dir: &Path, body: &str) -> AppConfig {
        let out = dir.display();
        let text = format!(
            r#"
[timeline]
start = "2025-09-01 00:00:00"
end = "2025-09-01 23:55:00"

[output]
clean_data = "{out}/resources/clean_data.csv"
monthly = "{out}/resources/clean_data_monthly.csv"
summary_figure = "{out}/Figures/summary_clean_data.jpg"

[rollup]
columns = ["GHI (W/m2)"]

{body}
"#
        );
        toml::from_str(&text).unwrap()
    }

    #[test]
    fn test_manifest_from_config() {
        let dir = TempDir::new().unwrap();
        let config = config(
            dir.path(),
            r#"
[inverters]
data_dir = "inv"
ids = [1, 2]

[archive]
data_dir = "dmi"
start = "2025-08-31 12:00"
"#,
        );
        let manifest = build_manifest(&config).unwrap();
        assert_eq!(manifest.files(SourceKind::Inverter(1)), vec![PathBuf::from("inv/Inverter_1_2025_09.xlsx")]);
        assert_eq!(manifest.files(SourceKind::Inverter(2)).len(), 1);
        assert_eq!(
            manifest.files(SourceKind::Archive),
            vec![
                PathBuf::from("dmi/2025/2025-08-31.txt"),
                PathBuf::from("dmi/2025/2025-09-01.txt"),
            ]
        );
    }

    #[test]
    fn test_missing_files_fail_before_any_write() {
        let dir = TempDir::new().unwrap();
        let config = config(
            dir.path(),
            &format!("[archive]\ndata_dir = \"{}/dmi\"\n", dir.path().display()),
        );

        let err = run(&config, &MemoryWorkbooks::new(), RunOptions::default()).unwrap_err();
        assert!(format!("{err:#}").contains("file unavailable for period 2025-09-01"));
        assert!(!dir.path().join("resources/clean_data.csv").exists());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path(), "");
        let err = run(&config, &MemoryWorkbooks::new(), RunOptions::default()).unwrap_err();
        assert!(err.to_string().contains("rollup.columns"));
    }

    fn write_archive_day(dir: &Path) {
        let day = dir.join("dmi/2025");
        fs::create_dir_all(&day).unwrap();
        let mut lines = String::new();
        for h in 0..24 {
            for m in (0..60).step_by(10) {
                writeln!(
                    lines,
                    "{{\"properties\":{{\"stationId\":\"06072\",\"parameterId\":\"radia_glob\",\"observed\":\"2025-09-01T{h:02}:{m:02}:00Z\",\"value\":120.0}}}}"
                )
                .unwrap();
            }
        }
        fs::write(day.join("2025-09-01.txt"), lines).unwrap();
    }

    #[test]
    fn test_archive_only_run() {
        let dir = TempDir::new().unwrap();
        write_archive_day(dir.path());

        let config = config(
            dir.path(),
            &format!("[archive]\ndata_dir = \"{}/dmi\"\n", dir.path().display()),
        );
        let summary = run(&config, &MemoryWorkbooks::new(), RunOptions { skip_report: true }).unwrap();

        assert_eq!(summary.rows, 288);
        assert_eq!(summary.columns, 1);
        assert_eq!(summary.rollup_rows, 1);
        assert_eq!(summary.figure, None);
        assert_eq!(summary.sources[0].merge.written, 144);
        assert_eq!(summary.sources[0].merge.interpolated, 143);

        let monthly = fs::read_to_string(dir.path().join("resources/clean_data_monthly.csv")).unwrap();
        assert!(monthly.starts_with("year,month,GHI (W/m2)"));
        assert!(dir.path().join("resources/clean_data.csv").exists());
        assert!(!dir.path().join("Figures/summary_clean_data.jpg").exists());
    }

    #[test]
    fn test_figure_skipped_without_full_hour() {
        let dir = TempDir::new().unwrap();
        write_archive_day(dir.path());

        let mut config = config(
            dir.path(),
            &format!("[archive]\ndata_dir = \"{}/dmi\"\n", dir.path().display()),
        );
        config.timeline.start = "2025-09-01 00:05:00".to_owned();
        config.timeline.end = "2025-09-01 00:55:00".to_owned();

        let summary = run(&config, &MemoryWorkbooks::new(), RunOptions::default()).unwrap();

        assert_eq!(summary.rows, 11);
        assert_eq!(summary.figure, None);
        assert!(dir.path().join("resources/clean_data.csv").exists());
        assert!(dir.path().join("resources/clean_data_monthly.csv").exists());
        assert!(!dir.path().join("Figures/summary_clean_data.jpg").exists());
    }
}
