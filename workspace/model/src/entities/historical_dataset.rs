use std::collections::BTreeMap;
use std::path::Path;

use polars::prelude::*;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::historical_record::HistoricalRecord;
use crate::error::{ModelError, Result};

/// Normalized column holding the region name.
pub const REGION: &str = "region";
/// Normalized column holding the observation year.
pub const YEAR: &str = "year";
/// Normalized column holding the average €/m² price.
pub const PRICE: &str = "price_per_area";

/// Names of the source CSV columns, mapped onto the normalized ones.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub region: String,
    pub year: String,
    pub price: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            region: "comunidad".to_string(),
            year: "year".to_string(),
            price: "precio".to_string(),
        }
    }
}

/// The historical price series, normalized and sorted by (region, year).
///
/// Rows with a missing or unparseable region, year or price are dropped at
/// load time. Duplicate (region, year) observations are averaged, so every
/// region has at most one price per year.
#[derive(Debug, Clone)]
pub struct HistoricalDataset {
    records: Vec<HistoricalRecord>,
    latest: BTreeMap<String, HistoricalRecord>,
}

impl HistoricalDataset {
    /// Reads the dataset from a CSV file with a header row.
    #[instrument(skip(columns), fields(path = %path.display()))]
    pub fn load_csv(path: &Path, columns: &ColumnMapping) -> Result<Self> {
        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }

        let raw = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;
        debug!("Read {} raw rows from {}", raw.height(), path.display());

        let dataset = Self::from_frame(raw, columns)?;
        info!(
            "Loaded {} historical records for {} regions",
            dataset.len(),
            dataset.latest.len()
        );
        Ok(dataset)
    }

    /// Normalizes an already loaded frame using the given column mapping.
    pub fn from_frame(raw: DataFrame, columns: &ColumnMapping) -> Result<Self> {
        for name in [&columns.region, &columns.year, &columns.price] {
            if raw.get_column_index(name).is_none() {
                return Err(ModelError::Dataset(format!(
                    "missing column '{}' (available: {:?})",
                    name,
                    raw.get_column_names()
                )));
            }
        }

        let raw_rows = raw.height();
        let frame = raw
            .lazy()
            .select([
                col(columns.region.as_str()).cast(DataType::String).alias(REGION),
                col(columns.year.as_str()).cast(DataType::Int32).alias(YEAR),
                col(columns.price.as_str()).cast(DataType::Float64).alias(PRICE),
            ])
            .drop_nulls(None)
            .group_by([col(REGION), col(YEAR)])
            .agg([col(PRICE).mean().alias(PRICE)])
            .sort([REGION, YEAR], SortMultipleOptions::default())
            .collect()?;

        if frame.height() < raw_rows {
            warn!(
                "Dropped or merged {} of {} historical rows (nulls or duplicate region/year)",
                raw_rows - frame.height(),
                raw_rows
            );
        }

        Self::from_normalized(frame)
    }

    /// Builds a dataset from in-memory records.
    pub fn from_records(records: Vec<HistoricalRecord>) -> Result<Self> {
        let regions: Vec<&str> = records.iter().map(|r| r.region.as_str()).collect();
        let years: Vec<i32> = records.iter().map(|r| r.year).collect();
        let prices: Vec<f64> = records.iter().map(|r| r.price_per_area).collect();

        let raw = DataFrame::new(vec![
            Series::new(REGION.into(), regions).into(),
            Series::new(YEAR.into(), years).into(),
            Series::new(PRICE.into(), prices).into(),
        ])?;

        let mapping = ColumnMapping {
            region: REGION.to_string(),
            year: YEAR.to_string(),
            price: PRICE.to_string(),
        };
        Self::from_frame(raw, &mapping)
    }

    fn from_normalized(frame: DataFrame) -> Result<Self> {
        let records = frame_to_records(&frame)?;

        let latest_frame = frame
            .clone()
            .lazy()
            .group_by([col(REGION)])
            .agg([
                col(YEAR).max().alias(YEAR),
                col(PRICE)
                    .sort_by([col(YEAR)], SortMultipleOptions::default())
                    .last()
                    .alias(PRICE),
            ])
            .sort([REGION], SortMultipleOptions::default())
            .collect()?;

        let latest = frame_to_records(&latest_frame)?
            .into_iter()
            .map(|record| (record.region.clone(), record))
            .collect();

        Ok(Self {
            records,
            latest,
        })
    }

    /// All records, sorted by region then year.
    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted, de-duplicated region names.
    pub fn regions(&self) -> Vec<String> {
        self.latest.keys().cloned().collect()
    }

    pub fn contains_region(&self, region: &str) -> bool {
        self.latest.contains_key(region)
    }

    /// Records of one region in ascending year order.
    pub fn records_for(&self, region: &str) -> Vec<&HistoricalRecord> {
        self.records.iter().filter(|r| r.region == region).collect()
    }

    /// The most recent observation of a region.
    pub fn latest(&self, region: &str) -> Option<&HistoricalRecord> {
        self.latest.get(region)
    }

    /// Price of the most recent observation of a region.
    pub fn last_price(&self, region: &str) -> Option<f64> {
        self.latest(region).map(|r| r.price_per_area)
    }

    /// Last observed year across the whole dataset.
    pub fn last_year(&self) -> Option<i32> {
        self.latest.values().map(|r| r.year).max()
    }

    /// First observed year across the whole dataset.
    pub fn first_year(&self) -> Option<i32> {
        self.records.iter().map(|r| r.year).min()
    }
}

fn frame_to_records(frame: &DataFrame) -> Result<Vec<HistoricalRecord>> {
    let regions = frame.column(REGION)?.as_materialized_series().str()?;
    let years = frame.column(YEAR)?.as_materialized_series().i32()?;
    let prices = frame.column(PRICE)?.as_materialized_series().f64()?;

    let records = regions
        .into_iter()
        .zip(years.into_iter())
        .zip(prices.into_iter())
        .filter_map(|((region, year), price)| match (region, year, price) {
            (Some(region), Some(year), Some(price)) => {
                Some(HistoricalRecord::new(region, year, price))
            }
            _ => None,
        })
        .collect();

    Ok(records)
}
