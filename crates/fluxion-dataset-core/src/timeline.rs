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

//! Canonical timeline: a gap-free, strictly increasing, fixed-step index.

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::errors::{DatasetError, DatasetResult};

/// Where a timestamp falls relative to the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Exactly on the grid, at this row index
    At(usize),
    /// Inside `[start, end]` but between two grid points
    OffGrid,
    /// Before `start` or after `end`
    OutOfRange,
}

/// Master time index shared by every source.
///
/// Instants are stored in UTC; `timezone` is the reference zone used for
/// display and for calendar grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    start: DateTime<Utc>,
    step: TimeDelta,
    len: usize,
    timezone: Tz,
}

impl Timeline {
    /// Build a timeline covering `[start, end]` inclusive.
    ///
    /// `end` does not need to sit on the grid; the last slot is the last
    /// grid point not after `end`.
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: TimeDelta,
        timezone: Tz,
    ) -> DatasetResult<Self> {
        let invalid = |reason: &str| DatasetError::InvalidTimeline {
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
            reason: reason.to_owned(),
        };

        let step_ms = step.num_milliseconds();
        if step_ms <= 0 {
            return Err(invalid("step must be positive"));
        }
        if end < start {
            return Err(invalid("end is before start"));
        }

        let span_ms = (end - start).num_milliseconds();
        let len = usize::try_from(span_ms.div_euclid(step_ms) + 1)
            .map_err(|_| invalid("timeline is too long"))?;

        Ok(Self {
            start,
            step,
            len,
            timezone,
        })
    }

    /// Build a timeline from wall-clock bounds expressed in `timezone`.
    pub fn from_local(
        start: NaiveDateTime,
        end: NaiveDateTime,
        step: TimeDelta,
        timezone: Tz,
    ) -> DatasetResult<Self> {
        let resolve = |naive: NaiveDateTime| {
            timezone
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| DatasetError::InvalidTimeline {
                    start: start.to_string(),
                    end: end.to_string(),
                    reason: format!("{naive} does not map to a single instant in {timezone}"),
                })
        };
        Self::new(resolve(start)?, resolve(end)?, step, timezone)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Last slot of the timeline
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.start + self.step * self.last_index()
    }

    #[must_use]
    pub fn step(&self) -> TimeDelta {
        self.step
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Sampling interval in hours (1/12 for 5-minute data)
    #[expect(
        clippy::cast_precision_loss,
        reason = "step in milliseconds stays far below 2^52"
    )]
    #[must_use]
    pub fn step_hours(&self) -> f64 {
        self.step.num_milliseconds() as f64 / 3_600_000.0
    }

    #[must_use]
    pub fn timestamp(&self, index: usize) -> Option<DateTime<Utc>> {
        if index >= self.len {
            return None;
        }
        let index = i32::try_from(index).ok()?;
        Some(self.start + self.step * index)
    }

    /// Timestamp of a slot in the reference timezone
    #[must_use]
    pub fn local(&self, index: usize) -> Option<DateTime<Tz>> {
        self.timestamp(index)
            .map(|t| t.with_timezone(&self.timezone))
    }

    pub fn iter(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        (0..self.len).filter_map(|i| self.timestamp(i))
    }

    #[must_use]
    pub fn locate(&self, timestamp: DateTime<Utc>) -> Slot {
        if timestamp < self.start || timestamp > self.end() {
            return Slot::OutOfRange;
        }

        let offset_ms = (timestamp - self.start).num_milliseconds();
        let step_ms = self.step.num_milliseconds();
        if offset_ms.rem_euclid(step_ms) != 0 {
            return Slot::OffGrid;
        }
        usize::try_from(offset_ms.div_euclid(step_ms)).map_or(Slot::OutOfRange, Slot::At)
    }

    fn last_index(&self) -> i32 {
        i32::try_from(self.len.saturating_sub(1)).unwrap_or(i32::MAX)
    }
}
