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

use fluxion_dataset_core::{LocalizationAudit, MergeReport};
use tracing::{info, warn};

/// What one source contributed to a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    pub source: String,
    pub files: usize,
    pub merge: MergeReport,
    pub localization: LocalizationAudit,
    /// Cells holding something other than a number
    pub invalid_values: usize,
    /// Rows without a timestamp
    pub skipped_rows: usize,
    /// Archive lines that failed to parse
    pub malformed_lines: usize,
    /// Archive records for other stations or parameters
    pub unmatched_lines: usize,
    /// Records between the source's own sampling instants
    pub off_native_grid: usize,
}

impl SourceReport {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn log_summary(&self) {
        info!(
            "{}: {} files, {} cells written, {} unchanged, {} overwritten, {} kept, {} interpolated",
            self.source,
            self.files,
            self.merge.written,
            self.merge.unchanged,
            self.merge.overwritten,
            self.merge.kept_existing,
            self.merge.interpolated
        );
        info!(
            "{}: {} empty values, {} rows outside the timeline, {} rows without timestamp, {} inferred local times",
            self.source,
            self.merge.missing_values,
            self.merge.out_of_range,
            self.skipped_rows,
            self.localization.inferred.len()
        );
        if !self.localization.unresolvable.is_empty() {
            warn!(
                "{}: {} unresolvable local times skipped",
                self.source,
                self.localization.unresolvable.len()
            );
        }
        if self.invalid_values > 0 {
            warn!("{}: {} non-numeric cells ignored", self.source, self.invalid_values);
        }
        if self.malformed_lines > 0 {
            warn!("{}: {} malformed lines skipped", self.source, self.malformed_lines);
        }
        if self.off_native_grid > 0 {
            warn!(
                "{}: {} records off the native sampling grid, check the configured step",
                self.source, self.off_native_grid
            );
        }
    }
}
