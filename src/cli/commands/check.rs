use anyhow::Result;
use std::path::Path;
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::context::AppContext;

/// Loads every artifact and prints a summary. Fails when the model or the
/// dataset cannot be used; a missing map is only reported.
#[instrument]
pub fn check(config_path: Option<&Path>) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let context = AppContext::load(config)?;
    info!("All artifacts loaded");

    println!(
        "Model:        {} ({} features)",
        context.artifact.estimator_name(),
        context.artifact.feature_names.len()
    );
    if let Some(description) = &context.artifact.description {
        println!("              {}", description);
    }
    println!(
        "Data:         {} rows, {} regions, {}-{}",
        context.dataset.len(),
        context.dataset.regions().len(),
        context.first_year,
        context.last_year
    );
    println!("Targets:      {}-{}", context.min_target_year(), context.max_target_year());
    match context.fit_score {
        Some(score) => println!("Fit (R²):     {:.4}", score),
        None => println!("Fit (R²):     not available for this model"),
    }

    match (&context.join_report, &context.map_message) {
        (Some(report), _) => {
            println!("Map regions:  {} matched", report.matched.len());
            if !report.dataset_only.is_empty() {
                println!("  without boundary: {}", report.dataset_only.join(", "));
            }
            if !report.boundary_only.is_empty() {
                println!("  boundary without data: {}", report.boundary_only.join(", "));
            }
        }
        (None, message) => {
            println!("Map:          {}", message.as_deref().unwrap_or("unavailable"));
        }
    }
    Ok(())
}
