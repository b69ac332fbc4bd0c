//! Height info derived from a raw sample string
//!
//! A [`HeightInfo`] bundles a grid with its stats and its relative grid. A
//! [`DeterminedHeightInfo`] pairs the probed info with an optional padded one
//! covering the machine limits. Both are recomputed from the raw string on
//! every call and never patched in place.

use crate::extrapolate::{extrapolate, Extension};
use crate::grid::HeightGrid;
use crate::limits::MachineLimits;
use crate::sample::parse_samples;
use crate::stats::HeightStats;
use levelkit_core::HeightMapError;
use serde::{Deserialize, Serialize};

/// A grid together with its stats and Z-relative copy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeightInfo {
    pub coordinates: HeightGrid,
    #[serde(flatten)]
    pub stats: HeightStats,
    /// Every Z offset by `-reference_z`
    pub relative_coordinates: HeightGrid,
}

impl HeightInfo {
    /// Stats with the reference at [0][0]
    pub fn from_grid(grid: HeightGrid) -> Self {
        let stats = HeightStats::compute(&grid);
        Self::with_stats(grid, stats)
    }

    pub fn with_stats(grid: HeightGrid, stats: HeightStats) -> Self {
        let relative_coordinates = grid.relative_to(stats.reference_z());
        Self {
            coordinates: grid,
            stats,
            relative_coordinates,
        }
    }

    /// Parse a raw sample string and build its grid
    pub fn parse(samples_json: &str) -> Result<Self, HeightMapError> {
        let samples = parse_samples(samples_json)?;
        let grid = HeightGrid::build(&samples)?;
        Ok(Self::from_grid(grid))
    }
}

/// Probed height info plus the extrapolated version when limits require one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeterminedHeightInfo {
    pub height_info: HeightInfo,
    pub calculated_height_info: Option<HeightInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<Extension>,
}

impl DeterminedHeightInfo {
    /// Derive both infos from a raw sample string
    ///
    /// Without `limits` the calculated info stays `None`.
    pub fn determine(
        samples_json: &str,
        limits: Option<&MachineLimits>,
    ) -> Result<Self, HeightMapError> {
        let height_info = HeightInfo::parse(samples_json)?;

        let padded = match limits {
            Some(limits) => extrapolate(&height_info.coordinates, &height_info.stats, limits)?,
            None => None,
        };

        let (calculated_height_info, extension) = match padded {
            Some(padded) => (
                Some(HeightInfo::with_stats(padded.grid, padded.stats)),
                Some(padded.extension),
            ),
            None => (None, None),
        };

        Ok(Self {
            height_info,
            calculated_height_info,
            extension,
        })
    }

    /// The grid compensation should run against: the padded one when present
    pub fn effective(&self) -> &HeightInfo {
        self.calculated_height_info
            .as_ref()
            .unwrap_or(&self.height_info)
    }
}
