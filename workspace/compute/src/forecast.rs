//! Forecast table for all regions and its spreadsheet exports.

use common::{ForecastRowDto, NO_DATA_LABEL};
use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook};
use tracing::{debug, instrument};

use crate::error::{ComputeError, Result};
use crate::predictor::{GrowthPredictor, PredictionTarget, PredictorSettings};
use crate::region_growth::RegionGrowthTable;

/// Advice shown next to each predicted growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Buy,
    Sell,
}

impl Recommendation {
    /// Falling prices are a buying opportunity.
    pub fn for_growth(growth_percent: f64) -> Self {
        if growth_percent < 0.0 {
            Recommendation::Buy
        } else {
            Recommendation::Sell
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Buy => "Compra",
            Recommendation::Sell => "Venta",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub region: String,
    pub year: i32,
    pub growth_percent: Option<f64>,
    pub last_price: Option<f64>,
    pub projected_price: Option<f64>,
    pub confidence: Option<f64>,
    pub recommendation: Option<Recommendation>,
}

impl From<&ForecastRow> for ForecastRowDto {
    fn from(row: &ForecastRow) -> Self {
        ForecastRowDto {
            region: row.region.clone(),
            year: row.year,
            growth_percent: row.growth_percent,
            last_price: row.last_price,
            projected_price: row.projected_price,
            confidence: row.confidence,
            recommendation: row.recommendation.map(|r| r.label().to_string()),
        }
    }
}

/// Rows of a region growth table, in region order, optionally limited to one region.
pub fn forecast_rows(
    table: &RegionGrowthTable,
    confidence: Option<f64>,
    region: Option<&str>,
) -> Result<Vec<ForecastRow>> {
    if let Some(region) = region {
        if table.get(region).is_none() {
            return Err(ComputeError::UnknownRegion(region.to_string()));
        }
    }

    let year = table.target().year;
    let rows = table
        .entries()
        .iter()
        .filter(|(name, _)| region.is_none_or(|r| r == name.as_str()))
        .map(|(name, entry)| {
            let growth = entry.growth_percent();
            ForecastRow {
                region: name.clone(),
                year,
                growth_percent: growth,
                last_price: entry.last_price(),
                projected_price: entry.projected_price(),
                confidence: growth.and(confidence),
                recommendation: growth.map(Recommendation::for_growth),
            }
        })
        .collect();
    Ok(rows)
}

/// Predicts the table and turns it into forecast rows.
#[instrument(skip(predictor, settings))]
pub fn build_forecast(
    predictor: &dyn GrowthPredictor,
    settings: &PredictorSettings,
    target: PredictionTarget,
    region: Option<&str>,
) -> Result<Vec<ForecastRow>> {
    let table = predictor.predict_region_growth_table(target)?;
    let confidence = settings.confidence(table.target().horizon);
    let rows = forecast_rows(&table, confidence, region)?;
    debug!("Forecast has {} rows", rows.len());
    Ok(rows)
}

/// The forecast as a DataFrame with the column headers of the download.
pub fn forecast_frame(rows: &[ForecastRow]) -> Result<DataFrame> {
    let region: Vec<&str> = rows.iter().map(|r| r.region.as_str()).collect();
    let year: Vec<i32> = rows.iter().map(|r| r.year).collect();
    let growth: Vec<Option<f64>> = rows.iter().map(|r| r.growth_percent).collect();
    let last: Vec<Option<f64>> = rows.iter().map(|r| r.last_price).collect();
    let projected: Vec<Option<f64>> = rows.iter().map(|r| r.projected_price).collect();
    let confidence: Vec<Option<f64>> = rows.iter().map(|r| r.confidence).collect();
    let recommendation: Vec<Option<&str>> = rows
        .iter()
        .map(|r| r.recommendation.map(|rec| rec.label()))
        .collect();

    let frame = DataFrame::new(vec![
        Series::new("Comunidad".into(), region).into(),
        Series::new("Año".into(), year).into(),
        Series::new("Crecimiento previsto (%)".into(), growth).into(),
        Series::new("Último precio (€/m²)".into(), last).into(),
        Series::new("Precio proyectado (€/m²)".into(), projected).into(),
        Series::new("Confianza".into(), confidence).into(),
        Series::new("Recomendación".into(), recommendation).into(),
    ])?;
    Ok(frame)
}

/// Comma separated export of the forecast, header included.
pub fn forecast_csv(rows: &[ForecastRow]) -> Result<Vec<u8>> {
    let mut frame = forecast_frame(rows)?;
    let mut buffer: Vec<u8> = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_float_precision(Some(2))
        .finish(&mut frame)?;
    Ok(buffer)
}

/// Sheet holding the forecast in the Excel download.
pub const FORECAST_SHEET: &str = "Predicciones";

/// Excel workbook with the forecast on a single sheet. Missing values are
/// written as [`NO_DATA_LABEL`].
pub fn forecast_xlsx(rows: &[ForecastRow]) -> Result<Vec<u8>> {
    let frame = forecast_frame(rows)?;
    let header = Format::new().set_bold();
    let number = Format::new().set_num_format("0.00");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(FORECAST_SHEET)?;

    for (index, column) in frame.get_columns().iter().enumerate() {
        let col = index as u16;
        sheet.write_string_with_format(0, col, column.name().as_str(), &header)?;
        sheet.set_column_width(col, 24)?;

        let series = column.as_materialized_series();
        if series.dtype() == &DataType::String {
            for (row, value) in series.str()?.into_iter().enumerate() {
                sheet.write_string(row as u32 + 1, col, value.unwrap_or(NO_DATA_LABEL))?;
            }
        } else {
            let is_year = series.dtype().is_integer();
            let values = series.cast(&DataType::Float64)?;
            for (row, value) in values.f64()?.into_iter().enumerate() {
                let row = row as u32 + 1;
                match value {
                    Some(value) if is_year => sheet.write_number(row, col, value)?,
                    Some(value) => sheet.write_number_with_format(row, col, value, &number)?,
                    None => sheet.write_string(row, col, NO_DATA_LABEL)?,
                };
            }
        }
    }

    debug!("Forecast workbook has {} rows", frame.height());
    Ok(workbook.save_to_buffer()?)
}
