//! Building estimator input that matches the training-time feature schema.
//!
//! Inputs are encoded the way the training data was: the time column as a
//! number and the region as one-hot columns named `<region_feature>_<region>`,
//! one per region present in the input. The encoded frame is then reconciled
//! with the trained column list by [`reconcile`].

use std::collections::HashSet;

use polars::prelude::*;
use tracing::{debug, trace};

use crate::error::{ComputeError, Result};

/// Aligns `input` with the trained column list.
///
/// Union then reindex: every trained column missing from `input` is added
/// filled with zeros, columns the estimator was not fitted on are dropped,
/// and the result has exactly `schema`'s columns in `schema`'s order, all as
/// Float64.
pub fn reconcile(input: &DataFrame, schema: &[String]) -> Result<DataFrame> {
    let height = input.height();
    let trained: HashSet<&str> = schema.iter().map(String::as_str).collect();

    let dropped: Vec<&str> = input
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .filter(|name| !trained.contains(name))
        .collect();
    if !dropped.is_empty() {
        debug!("Dropping columns unknown to the estimator: {:?}", dropped);
    }

    let mut columns: Vec<Column> = Vec::with_capacity(schema.len());
    for name in schema {
        let column = match input.get_column_index(name) {
            Some(index) => input.get_columns()[index].cast(&DataType::Float64)?,
            None => {
                trace!("Zero-filling trained column '{}'", name);
                Series::new(name.as_str().into(), vec![0.0f64; height]).into()
            }
        };
        columns.push(column);
    }

    Ok(DataFrame::new(columns)?)
}

/// Encodes (region, time value) rows for one estimator.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    time_feature: String,
    region_prefix: String,
    schema: Vec<String>,
}

impl FeatureEncoder {
    /// Fails when the trained schema has no column for the time feature,
    /// since the estimator would then silently ignore the requested year.
    pub fn new(region_feature: &str, time_feature: &str, schema: &[String]) -> Result<Self> {
        if !schema.iter().any(|name| name == time_feature) {
            return Err(ComputeError::Schema(format!(
                "time feature '{}' is not among the trained columns {:?}",
                time_feature, schema
            )));
        }
        Ok(Self {
            time_feature: time_feature.to_string(),
            region_prefix: format!("{}_", region_feature),
            schema: schema.to_vec(),
        })
    }

    pub fn dummy_column(&self, region: &str) -> String {
        format!("{}{}", self.region_prefix, region)
    }

    /// Regions the estimator was fitted with, taken from its dummy columns.
    pub fn trained_regions(&self) -> Vec<String> {
        self.schema
            .iter()
            .filter_map(|name| name.strip_prefix(&self.region_prefix))
            .map(str::to_string)
            .collect()
    }

    /// True when the estimator can tell this region apart. An estimator with
    /// no region columns at all treats every region alike.
    pub fn knows_region(&self, region: &str) -> bool {
        let dummy = self.dummy_column(region);
        self.schema.iter().any(|name| *name == dummy)
            || !self
                .schema
                .iter()
                .any(|name| name.starts_with(&self.region_prefix))
    }

    /// One-hot encodes the rows: the time column first, then one 0/1 column
    /// per distinct region in order of first appearance.
    pub fn encode(&self, rows: &[(&str, f64)]) -> Result<DataFrame> {
        let mut regions: Vec<&str> = Vec::new();
        for (region, _) in rows {
            if !regions.contains(region) {
                regions.push(*region);
            }
        }

        let mut columns: Vec<Column> = Vec::with_capacity(regions.len() + 1);
        let times: Vec<f64> = rows.iter().map(|(_, t)| *t).collect();
        columns.push(Series::new(self.time_feature.as_str().into(), times).into());
        for region in regions {
            let flags: Vec<f64> = rows
                .iter()
                .map(|(r, _)| if *r == region { 1.0 } else { 0.0 })
                .collect();
            columns.push(Series::new(self.dummy_column(region).as_str().into(), flags).into());
        }

        Ok(DataFrame::new(columns)?)
    }

    /// Encodes then reconciles the rows with the trained schema.
    pub fn build_input(&self, rows: &[(&str, f64)]) -> Result<DataFrame> {
        let encoded = self.encode(rows)?;
        reconcile(&encoded, &self.schema)
    }
}
