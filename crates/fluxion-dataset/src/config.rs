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

mod validation;

pub use validation::{ValidationIssue, ValidationResult};

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use chrono_tz::Tz;
use fluxion_dataset_core::{AmbiguityPolicy, ConflictPolicy, MergePolicy, OutOfRangePolicy, Timeline};
use fluxion_dataset_sources::{
    ArchiveSource, GHI_COLUMN, InverterSource, SheetLayout, WeatherStationSource,
    AMBIENT_TEMPERATURE_COLUMN, inverter_columns, irradiance_column,
};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "fluxion-dataset.toml";

/// Run configuration for the dataset merger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Canonical timeline every source is projected onto
    pub timeline: TimelineConfig,

    #[serde(default)]
    pub output: OutputConfig,

    /// Inverter exports; omitted section disables the source
    #[serde(default)]
    pub inverters: Option<InverterConfig>,

    /// On-site weather station exports
    #[serde(default)]
    pub weather_station: Option<WeatherStationConfig>,

    /// National weather archive dumps
    #[serde(default)]
    pub archive: Option<ArchiveConfig>,

    #[serde(default)]
    pub rollup: RollupConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// First slot, wall-clock time in `timezone`
    pub start: String,
    /// Last slot (inclusive)
    pub end: String,
    #[serde(default = "default_utc")]
    pub timezone: String,
    #[serde(default = "default_step_minutes")]
    pub step_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_clean_data")]
    pub clean_data: PathBuf,
    #[serde(default = "default_monthly")]
    pub monthly: PathBuf,
    #[serde(default = "default_summary_figure")]
    pub summary_figure: PathBuf,
}

/// Spreadsheet layout and merge settings shared by the logger exports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InverterConfig {
    pub data_dir: PathBuf,
    #[serde(default = "default_inverter_ids")]
    pub ids: Vec<u32>,
    #[serde(default = "default_cet")]
    pub timezone: String,
    /// Defaults to the timeline start
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default = "default_sheet")]
    pub sheet: String,
    #[serde(default = "default_header_row")]
    pub header_row: u32,
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: u32,
    #[serde(default = "default_strings")]
    pub strings: u32,
    #[serde(default)]
    pub ambiguous: AmbiguityPolicy,
    #[serde(default)]
    pub conflict: ConflictPolicy,
    #[serde(default)]
    pub out_of_range: OutOfRangePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherStationConfig {
    pub data_dir: PathBuf,
    #[serde(default = "default_cet")]
    pub timezone: String,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default = "default_sheet")]
    pub sheet: String,
    #[serde(default = "default_header_row")]
    pub header_row: u32,
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: u32,
    #[serde(default = "default_object_column")]
    pub object_column: String,
    #[serde(default = "default_logger")]
    pub logger: String,
    #[serde(default = "default_irradiance_sensors")]
    pub irradiance_sensors: Vec<u32>,
    #[serde(default = "default_weather_ambiguity")]
    pub ambiguous: AmbiguityPolicy,
    #[serde(default)]
    pub conflict: ConflictPolicy,
    #[serde(default)]
    pub out_of_range: OutOfRangePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    pub data_dir: PathBuf,
    /// Zone for `observed` values without an offset
    #[serde(default = "default_utc")]
    pub timezone: String,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default = "default_station_id")]
    pub station_id: String,
    #[serde(default = "default_parameter_id")]
    pub parameter_id: String,
    #[serde(default = "default_native_step_minutes")]
    pub native_step_minutes: u32,
    /// Longest run of missing timeline slots interpolation may bridge
    #[serde(default)]
    pub max_gap_steps: Option<usize>,
    #[serde(default)]
    pub conflict: ConflictPolicy,
    #[serde(default)]
    pub out_of_range: OutOfRangePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollupConfig {
    /// Columns summed into monthly energy totals
    #[serde(default = "default_rollup_columns")]
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_width")]
    pub width: u32,
    #[serde(default = "default_report_height")]
    pub height: u32,
}

fn default_utc() -> String {
    "UTC".to_owned()
}

fn default_cet() -> String {
    "CET".to_owned()
}

fn default_step_minutes() -> u32 {
    5
}

fn default_clean_data() -> PathBuf {
    PathBuf::from("resources/clean_data.csv")
}

fn default_monthly() -> PathBuf {
    PathBuf::from("resources/clean_data_monthly.csv")
}

fn default_summary_figure() -> PathBuf {
    PathBuf::from("Figures/summary_clean_data.jpg")
}

fn default_inverter_ids() -> Vec<u32> {
    vec![1, 2]
}

fn default_sheet() -> String {
    "5 minutes".to_owned()
}

fn default_header_row() -> u32 {
    3
}

fn default_timestamp_column() -> u32 {
    3
}

fn default_strings() -> u32 {
    8
}

fn default_object_column() -> String {
    "ManageObject".to_owned()
}

fn default_logger() -> String {
    "Logger-HV24C0309673".to_owned()
}

fn default_irradiance_sensors() -> Vec<u32> {
    vec![1, 2, 3, 4]
}

fn default_weather_ambiguity() -> AmbiguityPolicy {
    AmbiguityPolicy::Infer
}

fn default_station_id() -> String {
    "06072".to_owned()
}

fn default_parameter_id() -> String {
    "radia_glob".to_owned()
}

fn default_native_step_minutes() -> u32 {
    10
}

fn default_rollup_columns() -> Vec<String> {
    let mut columns = vec![
        "Inverter 1 Total output power (kW)".to_owned(),
        "Inverter 2 Total output power (kW)".to_owned(),
        GHI_COLUMN.to_owned(),
    ];
    columns.extend((1..=4).map(irradiance_column));
    columns
}

fn default_report_width() -> u32 {
    2000
}

fn default_report_height() -> u32 {
    1500
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            clean_data: default_clean_data(),
            monthly: default_monthly(),
            summary_figure: default_summary_figure(),
        }
    }
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            columns: default_rollup_columns(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            width: default_report_width(),
            height: default_report_height(),
        }
    }
}

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parse a wall-clock bound; a bare date means midnight
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn datetime(field: &str, value: &str) -> Result<NaiveDateTime> {
    parse_datetime(value).ok_or_else(|| anyhow!("{field}: cannot parse '{value}' as a date/time"))
}

fn timezone(field: &str, value: &str) -> Result<Tz> {
    value
        .parse::<Tz>()
        .map_err(|_| anyhow!("{field}: unknown timezone '{value}'"))
}

fn minutes(value: u32) -> TimeDelta {
    TimeDelta::minutes(i64::from(value))
}

impl TimelineConfig {
    pub fn bounds(&self) -> Result<(NaiveDateTime, NaiveDateTime)> {
        Ok((
            datetime("timeline.start", &self.start)?,
            datetime("timeline.end", &self.end)?,
        ))
    }

    pub fn tz(&self) -> Result<Tz> {
        timezone("timeline.timezone", &self.timezone)
    }

    pub fn step(&self) -> TimeDelta {
        minutes(self.step_minutes)
    }

    /// Build the canonical timeline
    pub fn build(&self) -> Result<Timeline> {
        let (start, end) = self.bounds()?;
        let timeline = Timeline::from_local(start, end, self.step(), self.tz()?)?;
        info!(
            "Timeline {} .. {} every {} min ({} slots, {})",
            timeline.start(),
            timeline.end(),
            self.step_minutes,
            timeline.len(),
            timeline.timezone()
        );
        Ok(timeline)
    }
}

/// Source range, falling back to the timeline bounds
fn source_bounds(
    section: &str,
    start: Option<&str>,
    end: Option<&str>,
    timeline: &TimelineConfig,
) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let (default_start, default_end) = timeline.bounds()?;
    let start = match start {
        Some(s) => datetime(&format!("{section}.start"), s)?,
        None => default_start,
    };
    let end = match end {
        Some(e) => datetime(&format!("{section}.end"), e)?,
        None => default_end,
    };
    Ok((start, end))
}

impl InverterConfig {
    pub fn bounds(&self, timeline: &TimelineConfig) -> Result<(NaiveDateTime, NaiveDateTime)> {
        source_bounds("inverters", self.start.as_deref(), self.end.as_deref(), timeline)
    }

    pub fn source(&self, id: u32) -> Result<InverterSource> {
        Ok(InverterSource {
            id,
            timezone: timezone("inverters.timezone", &self.timezone)?,
            layout: SheetLayout {
                sheet: self.sheet.clone(),
                header_row: self.header_row,
                timestamp_column: self.timestamp_column,
            },
            strings: self.strings,
            ambiguity: self.ambiguous,
            policy: MergePolicy {
                conflict: self.conflict,
                out_of_range: self.out_of_range,
            },
        })
    }
}

impl WeatherStationConfig {
    pub fn bounds(&self, timeline: &TimelineConfig) -> Result<(NaiveDateTime, NaiveDateTime)> {
        source_bounds("weather_station", self.start.as_deref(), self.end.as_deref(), timeline)
    }

    pub fn source(&self) -> Result<WeatherStationSource> {
        Ok(WeatherStationSource {
            timezone: timezone("weather_station.timezone", &self.timezone)?,
            layout: SheetLayout {
                sheet: self.sheet.clone(),
                header_row: self.header_row,
                timestamp_column: self.timestamp_column,
            },
            object_column: self.object_column.clone(),
            logger: self.logger.clone(),
            irradiance_sensors: self.irradiance_sensors.clone(),
            ambiguity: self.ambiguous,
            policy: MergePolicy {
                conflict: self.conflict,
                out_of_range: self.out_of_range,
            },
        })
    }
}

impl ArchiveConfig {
    pub fn bounds(&self, timeline: &TimelineConfig) -> Result<(NaiveDateTime, NaiveDateTime)> {
        source_bounds("archive", self.start.as_deref(), self.end.as_deref(), timeline)
    }

    pub fn source(&self) -> Result<ArchiveSource> {
        Ok(ArchiveSource {
            station_id: self.station_id.clone(),
            parameter_id: self.parameter_id.clone(),
            timezone: timezone("archive.timezone", &self.timezone)?,
            native_step: minutes(self.native_step_minutes),
            max_gap: self.max_gap_steps,
            policy: MergePolicy {
                conflict: self.conflict,
                out_of_range: self.out_of_range,
            },
        })
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Columns the enabled sources will declare in the table
    pub fn producible_columns(&self) -> HashSet<String> {
        let mut columns = HashSet::new();
        if let Some(inverters) = &self.inverters {
            for &id in &inverters.ids {
                columns.extend(
                    inverter_columns(id, inverters.strings)
                        .into_iter()
                        .map(|(_, column)| column),
                );
            }
        }
        if let Some(weather) = &self.weather_station {
            columns.extend(weather.irradiance_sensors.iter().map(|&n| irradiance_column(n)));
            columns.insert(AMBIENT_TEMPERATURE_COLUMN.to_owned());
        }
        if self.archive.is_some() {
            columns.insert(GHI_COLUMN.to_owned());
        }
        columns
    }

    /// Check every section, collecting all problems
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::success();

        check_timezone(&mut result, "timeline.timezone", &self.timeline.timezone);
        check_range(
            &mut result,
            "timeline",
            Some(self.timeline.start.as_str()),
            Some(self.timeline.end.as_str()),
        );
        let step = self.timeline.step_minutes;
        if step == 0 || 60 % step != 0 {
            result.add_error(
                "timeline.step_minutes",
                format!("Must divide one hour evenly, got {step}"),
            );
        }

        if let Some(inverters) = &self.inverters {
            result.merge(validate_inverters(inverters));
        }
        if let Some(weather) = &self.weather_station {
            result.merge(validate_weather_station(weather));
        }
        if let Some(archive) = &self.archive {
            result.merge(validate_archive(archive, step));
        }

        if self.inverters.is_none() && self.weather_station.is_none() && self.archive.is_none() {
            result.add_warning("sources", "No source is enabled; the table will be empty");
        }

        let producible = self.producible_columns();
        for column in &self.rollup.columns {
            if !producible.contains(column) {
                result.add_error(
                    "rollup.columns",
                    format!("'{column}' is not produced by any enabled source"),
                );
            }
        }

        if self.report.width == 0 || self.report.height == 0 {
            result.add_error("report", "Figure width and height must be positive");
        }
        let extension = self
            .output
            .summary_figure
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        if !matches!(extension.as_deref(), Some("jpg" | "jpeg" | "png" | "bmp")) {
            result.add_error(
                "output.summary_figure",
                "Figure must be a .jpg, .jpeg, .png or .bmp file",
            );
        }

        result
    }
}

fn check_timezone(result: &mut ValidationResult, field: &str, value: &str) {
    if value.parse::<Tz>().is_err() {
        result.add_error(field, format!("Unknown IANA timezone '{value}'"));
    }
}

fn check_range(
    result: &mut ValidationResult,
    section: &str,
    start: Option<&str>,
    end: Option<&str>,
) {
    let start = start.map(|s| (s, parse_datetime(s)));
    let end = end.map(|e| (e, parse_datetime(e)));

    if let Some((raw, None)) = start {
        result.add_error(format!("{section}.start"), format!("Cannot parse '{raw}'"));
    }
    if let Some((raw, None)) = end {
        result.add_error(format!("{section}.end"), format!("Cannot parse '{raw}'"));
    }
    if let (Some((_, Some(s))), Some((_, Some(e)))) = (start, end)
        && e < s
    {
        result.add_error(format!("{section}.end"), "Must not be before start");
    }
}

fn validate_inverters(config: &InverterConfig) -> ValidationResult {
    let mut result = ValidationResult::success();
    check_timezone(&mut result, "inverters.timezone", &config.timezone);
    check_range(&mut result, "inverters", config.start.as_deref(), config.end.as_deref());
    if config.ids.is_empty() {
        result.add_warning("inverters.ids", "No inverter listed");
    }
    let unique: HashSet<u32> = config.ids.iter().copied().collect();
    if unique.len() != config.ids.len() {
        result.add_error("inverters.ids", "Inverter ids must be unique");
    }
    if config.strings == 0 {
        result.add_warning("inverters.strings", "No PV string channels will be read");
    }
    if config.header_row >= 1_048_576 {
        result.add_error("inverters.header_row", "Beyond the last spreadsheet row");
    }
    result
}

fn validate_weather_station(config: &WeatherStationConfig) -> ValidationResult {
    let mut result = ValidationResult::success();
    check_timezone(&mut result, "weather_station.timezone", &config.timezone);
    check_range(
        &mut result,
        "weather_station",
        config.start.as_deref(),
        config.end.as_deref(),
    );
    if config.logger.is_empty() {
        result.add_error("weather_station.logger", "Logger name cannot be empty");
    }
    if config.ambiguous == AmbiguityPolicy::Strict {
        result.add_warning(
            "weather_station.ambiguous",
            "Readings in the repeated autumn hour will be dropped",
        );
    }
    result
}

fn validate_archive(config: &ArchiveConfig, canonical_step: u32) -> ValidationResult {
    let mut result = ValidationResult::success();
    check_timezone(&mut result, "archive.timezone", &config.timezone);
    check_range(&mut result, "archive", config.start.as_deref(), config.end.as_deref());
    if config.station_id.is_empty() {
        result.add_error("archive.station_id", "Station id cannot be empty");
    }
    let native = config.native_step_minutes;
    if native == 0 || canonical_step == 0 || native % canonical_step != 0 {
        result.add_error(
            "archive.native_step_minutes",
            format!("Must be a positive multiple of the timeline step ({canonical_step} min), got {native}"),
        );
    }
    if config.max_gap_steps == Some(0) {
        result.add_warning("archive.max_gap_steps", "Interpolation is disabled");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[timeline]
start = "2025-09-01 00:00:00"
end = "2025-09-30 23:55:00"

[inverters]
data_dir = "data/inverter_monthly_datafiles"

[weather_station]
data_dir = "data/weather_monthly_datafiles"
start = "2025-08-12"

[archive]
data_dir = "data/dmi"
end = "2025-09-15 00:00:00"
"#;

    #[test]
    fn test_defaults() {
        let config: AppConfig = toml::from_str(MINIMAL).unwrap();

        assert_eq!(config.timeline.timezone, "UTC");
        assert_eq!(config.timeline.step_minutes, 5);
        assert_eq!(config.output.clean_data, PathBuf::from("resources/clean_data.csv"));
        assert_eq!(
            config.output.summary_figure,
            PathBuf::from("Figures/summary_clean_data.jpg")
        );

        let inverters = config.inverters.as_ref().unwrap();
        assert_eq!(inverters.ids, vec![1, 2]);
        assert_eq!(inverters.timezone, "CET");
        assert_eq!(inverters.sheet, "5 minutes");
        assert_eq!(inverters.header_row, 3);
        assert_eq!(inverters.strings, 8);
        assert_eq!(inverters.ambiguous, AmbiguityPolicy::Strict);
        assert_eq!(inverters.conflict, ConflictPolicy::Overwrite);
        assert_eq!(inverters.out_of_range, OutOfRangePolicy::Skip);

        let weather = config.weather_station.as_ref().unwrap();
        assert_eq!(weather.ambiguous, AmbiguityPolicy::Infer);
        assert_eq!(weather.irradiance_sensors, vec![1, 2, 3, 4]);
        assert_eq!(weather.logger, "Logger-HV24C0309673");

        let archive = config.archive.as_ref().unwrap();
        assert_eq!(archive.station_id, "06072");
        assert_eq!(archive.parameter_id, "radia_glob");
        assert_eq!(archive.native_step_minutes, 10);
        assert_eq!(archive.max_gap_steps, None);

        assert_eq!(config.rollup.columns.len(), 7);
        assert_eq!(config.report.width, 2000);
        assert_eq!(config.report.height, 1500);
    }

    #[test]
    fn test_minimal_config_is_valid() {
        let config: AppConfig = toml::from_str(MINIMAL).unwrap();
        let result = config.validate();
        assert!(!result.has_errors(), "{:?}", result.errors);
    }

    #[test]
    fn test_source_bounds_fall_back_to_timeline() {
        let config: AppConfig = toml::from_str(MINIMAL).unwrap();
        let weather = config.weather_station.as_ref().unwrap();
        let (start, end) = weather.bounds(&config.timeline).unwrap();
        assert_eq!(start, parse_datetime("2025-08-12 00:00").unwrap());
        assert_eq!(end, parse_datetime("2025-09-30 23:55").unwrap());
    }

    #[test]
    fn test_policies_parse() {
        let text = MINIMAL.replace(
            "data_dir = \"data/dmi\"",
            "data_dir = \"data/dmi\"\nconflict = \"reject\"\nout_of_range = \"reject\"\nmax_gap_steps = 6",
        );
        let config: AppConfig = toml::from_str(&text).unwrap();
        let source = config.archive.as_ref().unwrap().source().unwrap();
        assert_eq!(source.policy.conflict, ConflictPolicy::Reject);
        assert_eq!(source.policy.out_of_range, OutOfRangePolicy::Reject);
        assert_eq!(source.max_gap, Some(6));
        assert_eq!(source.native_step, TimeDelta::minutes(10));
    }

    #[test]
    fn test_validation_collects_errors() {
        let text = r#"
[timeline]
start = "2025-09-30"
end = "2025-09-01"
timezone = "Mars/Olympus"
step_minutes = 7

[archive]
data_dir = "data/dmi"
native_step_minutes = 15
"#;
        let config: AppConfig = toml::from_str(text).unwrap();
        let result = config.validate();
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();

        assert!(fields.contains(&"timeline.timezone"));
        assert!(fields.contains(&"timeline.end"));
        assert!(fields.contains(&"timeline.step_minutes"));
        assert!(fields.contains(&"archive.native_step_minutes"));
        // default rollup asks for inverter and sensor columns nobody produces
        assert!(fields.contains(&"rollup.columns"));
        assert!(config.validate().ensure_valid().is_err());
    }

    #[test]
    fn test_figure_must_be_bitmap() {
        let mut config: AppConfig = toml::from_str(MINIMAL).unwrap();
        config.output.summary_figure = PathBuf::from("Figures/summary_clean_data.svg");
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "output.summary_figure"));

        config.output.summary_figure = PathBuf::from("Figures/summary_clean_data.JPG");
        let result = config.validate();
        assert!(result.errors.iter().all(|e| e.field != "output.summary_figure"));
    }

    #[test]
    fn test_producible_columns() {
        let config: AppConfig = toml::from_str(MINIMAL).unwrap();
        let columns = config.producible_columns();
        assert!(columns.contains("Inverter 2 PV8 input voltage(V)"));
        assert!(columns.contains(AMBIENT_TEMPERATURE_COLUMN));
        assert!(columns.contains(GHI_COLUMN));
        assert_eq!(columns.len(), 2 * 18 + 5 + 1);
    }

    #[test]
    fn test_build_timeline() {
        let config: AppConfig = toml::from_str(MINIMAL).unwrap();
        let timeline = config.timeline.build().unwrap();
        assert_eq!(timeline.len(), 30 * 288);
    }

    #[test]
    fn test_parse_datetime_forms() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_datetime("2025-01-01"), Some(expected));
        assert_eq!(parse_datetime("2025-01-01 00:00"), Some(expected));
        assert_eq!(parse_datetime(" 2025-01-01 00:00:00 "), Some(expected));
        assert_eq!(parse_datetime("01/01/2025"), None);
    }
}
