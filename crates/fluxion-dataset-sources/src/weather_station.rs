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

use chrono_tz::Tz;
use fluxion_dataset_core::{
    AmbiguityPolicy, LocalizationAudit, MeasurementTable, MergePolicy, Provenance, SourceSeries,
    merge_series,
};
use tracing::{debug, info};

use crate::errors::SourceResult;
use crate::report::SourceReport;
use crate::sheet::{CellNumber, SheetLayout, SheetTable, localize_rows};
use crate::workbook::WorkbookSource;

pub const AMBIENT_TEMPERATURE_COLUMN: &str = "Ambient temperature (C)";

const IRRADIANCE_HEADER: &str = "Irradiance(W/㎡)";
const TEMPERATURE_HEADER: &str = "Ambient temperature(℃)";

/// Table column for one irradiance sensor
#[must_use]
pub fn irradiance_column(sensor: u32) -> String {
    format!("irradiance sensor{sensor} (W/m2)")
}

/// Monthly exports of the on-site weather station.
/// Every sensor of the station shares one sheet; rows are told apart by the object column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherStationSource {
    pub timezone: Tz,
    pub layout: SheetLayout,
    pub object_column: String,
    /// Logger prefix of the object identifiers
    pub logger: String,
    pub irradiance_sensors: Vec<u32>,
    pub ambiguity: AmbiguityPolicy,
    pub policy: MergePolicy,
}

#[derive(Debug)]
struct Channel {
    object: String,
    header: &'static str,
    column: String,
}

impl WeatherStationSource {
    fn channels(&self) -> Vec<Channel> {
        let mut channels: Vec<Channel> = self
            .irradiance_sensors
            .iter()
            .map(|&n| Channel {
                object: format!("{}/irradiance {n}", self.logger),
                header: IRRADIANCE_HEADER,
                column: irradiance_column(n),
            })
            .collect();
        channels.push(Channel {
            object: format!("{}/ambient air temp", self.logger),
            header: TEMPERATURE_HEADER,
            column: AMBIENT_TEMPERATURE_COLUMN.to_owned(),
        });
        channels
    }
}

/// Merge every monthly weather-station export into the table.
///
/// Each channel is localized on its own so a repeated autumn hour shows up
/// exactly twice per channel, which is what inference needs.
pub fn merge_weather_station(
    mut table: MeasurementTable,
    source: &WeatherStationSource,
    files: &[PathBuf],
    workbooks: &dyn WorkbookSource,
) -> SourceResult<(MeasurementTable, SourceReport)> {
    let mut report = SourceReport::new("Weather station");
    let channels = source.channels();

    for path in files {
        info!("Retrieving {}", path.display());
        let range = workbooks.sheet(path, &source.layout.sheet)?;
        let sheet = SheetTable::new(path, &range, &source.layout)?;
        let object_col = sheet.column(&source.object_column)?;

        let mut series = Vec::with_capacity(channels.len());
        for channel in &channels {
            let value_col = sheet.column(channel.header)?;

            let mut rows = Vec::new();
            for row in sheet.data_rows() {
                if sheet.text(row, object_col).as_deref() != Some(channel.object.as_str()) {
                    continue;
                }
                match sheet.timestamp(row)? {
                    Some(local) => rows.push((row, local)),
                    None => report.skipped_rows += 1,
                }
            }
            debug!("{}: {} rows for {}", path.display(), rows.len(), channel.object);

            let mut audit = LocalizationAudit::default();
            let resolved =
                localize_rows(path, &rows, source.timezone, source.ambiguity, &mut audit);
            report.localization.absorb(audit);

            let mut s = SourceSeries::new(
                channel.column.clone(),
                Provenance::WeatherSensor {
                    object: channel.object.clone(),
                    metric: channel.header.to_owned(),
                },
            );
            for (row, timestamp) in resolved {
                let value = sheet.number(row, value_col);
                if value == CellNumber::Invalid {
                    report.invalid_values += 1;
                }
                s.push(timestamp, value.value());
            }
            series.push(s);
        }

        let (merged, merge) = merge_series(table, &series, source.policy)?;
        table = merged;
        report.merge.absorb(&merge);
        report.files += 1;
    }

    Ok((table, report))
}
