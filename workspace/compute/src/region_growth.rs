//! Per-region growth for one target year and its join with map boundaries.

use std::collections::BTreeMap;

use common::{BoundaryJoinReport, CellStatus, MapCellDto};
use model::entities::boundary::BoundaryCollection;
use tracing::{debug, warn};

use crate::predictor::ResolvedTarget;
use crate::projection::Projection;

/// Outcome for one region.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionGrowth {
    Predicted {
        growth_percent: f64,
        last_price: Option<f64>,
        projection: Projection,
    },
    NoData {
        reason: String,
    },
}

impl RegionGrowth {
    pub fn growth_percent(&self) -> Option<f64> {
        match self {
            RegionGrowth::Predicted { growth_percent, .. } => Some(*growth_percent),
            RegionGrowth::NoData { .. } => None,
        }
    }

    pub fn projected_price(&self) -> Option<f64> {
        match self {
            RegionGrowth::Predicted { projection, .. } => projection.price(),
            RegionGrowth::NoData { .. } => None,
        }
    }

    pub fn last_price(&self) -> Option<f64> {
        match self {
            RegionGrowth::Predicted { last_price, .. } => *last_price,
            RegionGrowth::NoData { .. } => None,
        }
    }
}

/// Growth of every known region at one target, keyed by region name.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionGrowthTable {
    target: ResolvedTarget,
    entries: BTreeMap<String, RegionGrowth>,
}

impl RegionGrowthTable {
    pub fn new(target: ResolvedTarget, entries: BTreeMap<String, RegionGrowth>) -> Self {
        Self { target, entries }
    }

    pub fn target(&self) -> ResolvedTarget {
        self.target
    }

    pub fn entries(&self) -> &BTreeMap<String, RegionGrowth> {
        &self.entries
    }

    pub fn get(&self, region: &str) -> Option<&RegionGrowth> {
        self.entries.get(region)
    }

    pub fn growth(&self, region: &str) -> Option<f64> {
        self.get(region).and_then(RegionGrowth::growth_percent)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One map cell per boundary region, by exact name, then one
    /// `NotOnMap` cell per table region that has no boundary.
    ///
    /// Boundary regions absent from the table, or present without a value,
    /// are `NoData` cells. Values are never attached to a boundary of a
    /// different name.
    pub fn join_with_boundaries(&self, boundaries: &BoundaryCollection) -> Vec<MapCellDto> {
        let mut cells: Vec<MapCellDto> = boundaries
            .region_names()
            .map(|name| match self.entries.get(name) {
                Some(RegionGrowth::Predicted {
                    growth_percent,
                    projection,
                    ..
                }) => MapCellDto {
                    region: name.to_string(),
                    status: CellStatus::Predicted,
                    growth_percent: Some(*growth_percent),
                    projected_price: projection.price(),
                    reason: None,
                },
                Some(RegionGrowth::NoData { reason }) => MapCellDto {
                    region: name.to_string(),
                    status: CellStatus::NoData,
                    growth_percent: None,
                    projected_price: None,
                    reason: Some(reason.clone()),
                },
                None => MapCellDto {
                    region: name.to_string(),
                    status: CellStatus::NoData,
                    growth_percent: None,
                    projected_price: None,
                    reason: Some("region not in the data".to_string()),
                },
            })
            .collect();

        for (region, entry) in &self.entries {
            if boundaries.contains(region) {
                continue;
            }
            warn!("Region '{}' has no boundary and is left off the map", region);
            cells.push(MapCellDto {
                region: region.clone(),
                status: CellStatus::NotOnMap,
                growth_percent: entry.growth_percent(),
                projected_price: entry.projected_price(),
                reason: Some("no boundary with this name".to_string()),
            });
        }

        debug!("Joined {} map cells for year {}", cells.len(), self.target.year);
        cells
    }
}

/// Compares region names of the data with the boundary names.
pub fn join_report<'a>(
    regions: impl IntoIterator<Item = &'a str>,
    boundaries: &BoundaryCollection,
) -> BoundaryJoinReport {
    let mut report = BoundaryJoinReport::default();
    let mut seen = std::collections::BTreeSet::new();
    for region in regions {
        if !seen.insert(region) {
            continue;
        }
        if boundaries.contains(region) {
            report.matched.push(region.to_string());
        } else {
            report.dataset_only.push(region.to_string());
        }
    }
    report.boundary_only = boundaries
        .region_names()
        .filter(|name| !seen.contains(name))
        .map(str::to_string)
        .collect();
    report.matched.sort();
    report.dataset_only.sort();
    report
}
