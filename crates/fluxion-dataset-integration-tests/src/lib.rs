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


//! Fixture builders for the end-to-end scenarios: logger sheets held in
//! memory and archive day files as text.

use calamine::Data;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use fluxion_dataset_sources::inverter_columns;

fn text(value: &str) -> Data {
    Data::String(value.to_owned())
}

/// Wall-clock times from `start` to `end` inclusive
pub fn local_range(start: NaiveDateTime, end: NaiveDateTime, step: TimeDelta) -> Vec<NaiveDateTime> {
    let mut times = Vec::new();
    let mut t = start;
    while t <= end {
        times.push(t);
        t += step;
    }
    times
}

/// First and last 5-minute slot of a calendar month, wall clock
pub fn month_bounds(year: i32, month: u32) -> (NaiveDateTime, NaiveDateTime) {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default();
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .unwrap_or_default();
    (
        first.and_time(chrono::NaiveTime::MIN),
        next.and_time(chrono::NaiveTime::MIN) - TimeDelta::minutes(5),
    )
}

/// Days since 1899-12-30, the spreadsheet date epoch
pub fn excel_serial(t: NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or_default()
        .and_time(chrono::NaiveTime::MIN);
    #[expect(
        clippy::cast_precision_loss,
        reason = "second counts of realistic dates fit in 52 bits"
    )]
    let seconds = (t - epoch).num_seconds() as f64;
    seconds / 86_400.0
}

/// Monthly inverter export with every channel populated.
/// `value` gives the active power for a local time; the other channels derive from it.
pub fn inverter_sheet(
    id: u32,
    strings: u32,
    times: &[NaiveDateTime],
    value: impl Fn(NaiveDateTime) -> f64,
) -> Vec<Vec<Data>> {
    let columns = inverter_columns(id, strings);
    let mut header = vec![text("Site Name"), text("Device Name"), text("SN"), text("Start Time")];
    header.extend(columns.iter().map(|(h, _)| text(h)));

    let mut rows = vec![
        vec![text(&format!("Inverter {id} 5-minute report"))],
        vec![],
        vec![],
        header,
    ];
    for &t in times {
        let power = value(t);
        let mut row = vec![
            text("Plant"),
            text(&format!("Inverter {id}")),
            text(&format!("SN-{id}")),
            text(&t.format("%Y-%m-%d %H:%M:%S").to_string()),
            Data::Float(power * 1.02),
            Data::Float(power),
        ];
        for _ in 0..strings {
            row.push(Data::Float(power / 6.0));
            row.push(Data::Float(620.0));
        }
        rows.push(row);
    }
    rows
}

/// Monthly weather-station export: one row per channel and time, serial timestamps
pub fn weather_sheet(logger: &str, sensors: &[u32], times: &[NaiveDateTime]) -> Vec<Vec<Data>> {
    let mut rows = vec![
        vec![text("EMI 5-minute report")],
        vec![],
        vec![],
        vec![
            text("Site Name"),
            text("ManageObject"),
            text("Device Name"),
            text("Start Time"),
            text("Irradiance(W/㎡)"),
            text("Ambient temperature(℃)"),
        ],
    ];
    for &t in times {
        let serial = Data::Float(excel_serial(t));
        for &sensor in sensors {
            rows.push(vec![
                text("Plant"),
                text(&format!("{logger}/irradiance {sensor}")),
                text("EMI"),
                serial.clone(),
                Data::Float(100.0 * f64::from(sensor)),
                Data::Empty,
            ]);
        }
        rows.push(vec![
            text("Plant"),
            text(&format!("{logger}/ambient air temp")),
            text("EMI"),
            serial.clone(),
            Data::Empty,
            Data::Float(14.5),
        ]);
    }
    rows
}

/// One archive day file: NDJSON observations for `parameter` every `step`
pub fn archive_day(
    date: NaiveDate,
    station: &str,
    parameter: &str,
    step: TimeDelta,
    value: impl Fn(NaiveDateTime) -> f64,
) -> String {
    let start = date.and_time(chrono::NaiveTime::MIN);
    let end = start + TimeDelta::days(1) - TimeDelta::seconds(1);
    local_range(start, end, step)
        .into_iter()
        .map(|t| {
            format!(
                "{{\"type\":\"Feature\",\"properties\":{{\"stationId\":\"{station}\",\"parameterId\":\"{parameter}\",\"observed\":\"{}Z\",\"value\":{}}}}}\n",
                t.format("%Y-%m-%dT%H:%M:%S"),
                value(t)
            )
        })
        .collect()
}
