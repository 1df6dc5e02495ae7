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

//! Local logger time to UTC.
//!
//! Loggers on site write wall-clock time, so the autumn daylight-saving fold
//! repeats an hour and the spring jump skips one. Every conversion result
//! says which of the three cases it came from so transition rows can be
//! audited downstream.

use std::collections::HashMap;

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// How to treat local times that map to two instants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Every ambiguous local time is unresolvable
    #[default]
    Strict,
    /// Resolve a repeated pair by order of appearance: first is summer time, second is standard time
    Infer,
}

/// Reason a local time could not be mapped to an instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolvable {
    /// Falls into the spring-forward gap
    Nonexistent,
    /// Inside the autumn fold with nothing to tell the two instants apart
    Ambiguous,
    /// Inside the autumn fold but present more than twice
    Repeated(usize),
}

/// Outcome of localizing one wall-clock timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Localized {
    Unambiguous(DateTime<Utc>),
    Inferred(DateTime<Utc>),
    Unresolvable(Unresolvable),
}

impl Localized {
    /// Resolved instant, if any
    #[must_use]
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Unambiguous(t) | Self::Inferred(t) => Some(*t),
            Self::Unresolvable(_) => None,
        }
    }
}

/// Tally of localization outcomes for one source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizationAudit {
    pub unambiguous: usize,
    pub inferred: Vec<NaiveDateTime>,
    pub unresolvable: Vec<(NaiveDateTime, Unresolvable)>,
}

impl LocalizationAudit {
    pub fn record(&mut self, local: NaiveDateTime, outcome: Localized) {
        match outcome {
            Localized::Unambiguous(_) => self.unambiguous += 1,
            Localized::Inferred(_) => self.inferred.push(local),
            Localized::Unresolvable(reason) => self.unresolvable.push((local, reason)),
        }
    }

    pub fn absorb(&mut self, other: Self) {
        self.unambiguous += other.unambiguous;
        self.inferred.extend(other.inferred);
        self.unresolvable.extend(other.unresolvable);
    }
}

/// Localize a series of wall-clock timestamps given in file order.
///
/// Ordering matters for [`AmbiguityPolicy::Infer`]: the same folded local
/// time seen twice resolves to the earlier instant first and the later one second.
#[must_use]
pub fn localize_series(times: &[NaiveDateTime], tz: Tz, policy: AmbiguityPolicy) -> Vec<Localized> {
    let mapped: Vec<LocalResult<DateTime<Tz>>> =
        times.iter().map(|t| tz.from_local_datetime(t)).collect();

    let mut occurrences: HashMap<NaiveDateTime, usize> = HashMap::new();
    for (local, result) in times.iter().zip(&mapped) {
        if matches!(result, LocalResult::Ambiguous(..)) {
            *occurrences.entry(*local).or_default() += 1;
        }
    }

    let mut seen: HashMap<NaiveDateTime, usize> = HashMap::new();
    times
        .iter()
        .zip(mapped)
        .map(|(local, result)| match result {
            LocalResult::Single(dt) => Localized::Unambiguous(dt.with_timezone(&Utc)),
            LocalResult::None => Localized::Unresolvable(Unresolvable::Nonexistent),
            LocalResult::Ambiguous(earliest, latest) => match policy {
                AmbiguityPolicy::Strict => Localized::Unresolvable(Unresolvable::Ambiguous),
                AmbiguityPolicy::Infer => {
                    let total = occurrences.get(local).copied().unwrap_or_default();
                    let nth = seen.entry(*local).or_default();
                    *nth += 1;
                    match (total, *nth) {
                        (2, 1) => Localized::Inferred(earliest.with_timezone(&Utc)),
                        (2, 2) => Localized::Inferred(latest.with_timezone(&Utc)),
                        (1, _) => Localized::Unresolvable(Unresolvable::Ambiguous),
                        (n, _) => Localized::Unresolvable(Unresolvable::Repeated(n)),
                    }
                }
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn utc(s: &str) -> DateTime<Utc> {
        naive(s).and_utc()
    }

    #[test]
    fn test_summer_and_winter_offsets() {
        let result = localize_series(
            &[naive("2025-07-01 12:00"), naive("2025-01-15 12:00")],
            chrono_tz::CET,
            AmbiguityPolicy::Strict,
        );
        assert_eq!(result[0], Localized::Unambiguous(utc("2025-07-01 10:00")));
        assert_eq!(result[1], Localized::Unambiguous(utc("2025-01-15 11:00")));
    }

    #[test]
    fn test_infer_resolves_repeated_fold() {
        // 2025-10-26: clocks go from 03:00 CEST back to 02:00 CET
        let times = [
            naive("2025-10-26 01:55"),
            naive("2025-10-26 02:00"),
            naive("2025-10-26 02:55"),
            naive("2025-10-26 02:00"),
            naive("2025-10-26 02:55"),
            naive("2025-10-26 03:00"),
        ];
        let result = localize_series(&times, chrono_tz::CET, AmbiguityPolicy::Infer);

        assert_eq!(result[0], Localized::Unambiguous(utc("2025-10-25 23:55")));
        assert_eq!(result[1], Localized::Inferred(utc("2025-10-26 00:00")));
        assert_eq!(result[2], Localized::Inferred(utc("2025-10-26 00:55")));
        assert_eq!(result[3], Localized::Inferred(utc("2025-10-26 01:00")));
        assert_eq!(result[4], Localized::Inferred(utc("2025-10-26 01:55")));
        assert_eq!(result[5], Localized::Unambiguous(utc("2025-10-26 02:00")));

        let instants: Vec<_> = result.iter().filter_map(Localized::instant).collect();
        assert!(instants.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_single_folded_time_is_unresolvable() {
        let result = localize_series(
            &[naive("2025-10-26 02:30")],
            chrono_tz::CET,
            AmbiguityPolicy::Infer,
        );
        assert_eq!(result[0], Localized::Unresolvable(Unresolvable::Ambiguous));
    }

    #[test]
    fn test_strict_rejects_fold() {
        let times = [naive("2025-10-26 02:30"), naive("2025-10-26 02:30")];
        let result = localize_series(&times, chrono_tz::CET, AmbiguityPolicy::Strict);
        assert!(
            result
                .iter()
                .all(|r| *r == Localized::Unresolvable(Unresolvable::Ambiguous))
        );
    }

    #[test]
    fn test_triple_occurrence_is_unresolvable() {
        let times = [naive("2025-10-26 02:30"); 3];
        let result = localize_series(&times, chrono_tz::CET, AmbiguityPolicy::Infer);
        assert!(
            result
                .iter()
                .all(|r| *r == Localized::Unresolvable(Unresolvable::Repeated(3)))
        );
    }

    #[test]
    fn test_spring_gap_is_nonexistent() {
        let result = localize_series(
            &[naive("2025-03-30 02:30")],
            chrono_tz::CET,
            AmbiguityPolicy::Infer,
        );
        assert_eq!(result[0], Localized::Unresolvable(Unresolvable::Nonexistent));
    }

    #[test]
    fn test_audit_counts() {
        let times = [
            naive("2025-10-26 01:00"),
            naive("2025-10-26 02:00"),
            naive("2025-10-26 02:00"),
            naive("2025-03-30 02:30"),
        ];
        let result = localize_series(&times, chrono_tz::CET, AmbiguityPolicy::Infer);

        let mut audit = LocalizationAudit::default();
        for (local, outcome) in times.iter().zip(result) {
            audit.record(*local, outcome);
        }
        assert_eq!(audit.unambiguous, 1);
        assert_eq!(audit.inferred.len(), 2);
        assert_eq!(
            audit.unresolvable,
            vec![(naive("2025-03-30 02:30"), Unresolvable::Nonexistent)]
        );
    }
}
