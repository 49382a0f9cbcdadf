use anyhow::{anyhow, Result};
use common::{format_percent, format_price_eur};
use compute::predictor::{PredictionRequest, PredictionTarget};
use std::path::Path;
use tracing::instrument;

use crate::cli::PredictArgs;
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::helpers::converters::prediction_to_dto;

#[instrument]
pub fn predict(config_path: Option<&Path>, args: &PredictArgs) -> Result<()> {
    let target = match (args.year, args.horizon) {
        (Some(year), _) => PredictionTarget::Year(year),
        (None, Some(horizon)) => PredictionTarget::Horizon(horizon),
        (None, None) => return Err(anyhow!("either --year or --horizon is required")),
    };

    let config = AppConfig::load(config_path)?;
    let context = AppContext::load(config)?;
    let result = context
        .predictor
        .predict_growth(&PredictionRequest::new(args.region.as_str(), target))?;

    if args.json {
        let dto = prediction_to_dto(&result, &context);
        println!("{}", serde_json::to_string_pretty(&dto)?);
        return Ok(());
    }

    println!("Region:            {}", result.region);
    println!("Year:              {} (horizon {})", result.target.year, result.target.horizon);
    println!("Predicted growth:  {}", format_percent(Some(result.predicted_growth_percent)));
    if let Some(range) = result.growth_range {
        println!(
            "Range:             {} to {}",
            format_percent(Some(range.lower)),
            format_percent(Some(range.upper))
        );
    }
    if let Some(confidence) = result.confidence {
        println!("Confidence:        {:.1}% (illustrative)", confidence * 100.0);
    }
    println!("Last price:        {}", format_price_eur(result.last_price));
    println!("Projected price:   {}", format_price_eur(result.projection.price()));
    Ok(())
}
