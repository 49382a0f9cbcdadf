use axum::extract::{Query, State};
use common::{
    format_percent, format_price_eur, ForecastRowDto, PredictionDto, RegionGrowthDto,
    NO_DATA_LABEL,
};
use compute::predictor::{PredictionTarget, ResolvedTarget};
use maud::{html, Markup};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::error::ApiError;
use crate::handlers::forecast::cached_forecast;
use crate::handlers::predictions::cached_prediction;
use crate::handlers::region_growth::cached_region_growth;
use crate::helpers::charts::{choropleth_figure, history_figure, projection_figure};
use crate::helpers::converters::history_series;
use crate::helpers::html::{alert, download_link, figure_div, page, DownloadQuery};
use crate::schemas::{AppState, TargetQuery};

/// Selector value standing for every region.
pub const ALL_REGIONS: &str = "Todas";

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub region: Option<String>,
    pub year: Option<i32>,
    pub horizon: Option<u32>,
}

fn render_form(state: &AppState, chosen: Option<&str>, year: i32) -> Markup {
    let context = &state.context;
    let options = std::iter::once(ALL_REGIONS).chain(context.regions.iter().map(String::as_str));
    html! {
        form method="get" action="/" {
            label {
                "Comunidad autónoma"
                select name="region" {
                    @for region in options {
                        option value=(region) selected[chosen.map_or(region == ALL_REGIONS, |c| c == region)] { (region) }
                    }
                }
            }
            label {
                "Año"
                input type="number" name="year" value=(year) min=(context.min_target_year()) max=(context.max_target_year());
            }
            button type="submit" { "Predecir" }
        }
    }
}

fn render_prediction(prediction: &PredictionDto) -> Markup {
    let download = DownloadQuery {
        region: Some(prediction.region.as_str()),
        year: prediction.target_year,
    };
    let figure = projection_figure(&prediction.region, &prediction.series);
    html! {
        h2 { "Predicción para " (prediction.region) " en " (prediction.target_year) }
        p { "Crecimiento previsto" }
        p class="metric" { (format_percent(Some(prediction.predicted_growth_percent))) }
        @if let Some(range) = &prediction.growth_range {
            p {
                "El aumento podría variar entre " (format_percent(Some(range.lower)))
                " y " (format_percent(Some(range.upper))) "."
            }
        }
        @if let Some(confidence) = prediction.confidence {
            p { "Nivel de confianza: " (format!("{:.1}%", confidence * 100.0)) }
        }
        @if let Some(note) = &prediction.confidence_note {
            p class="note" { (note) }
        }
        p {
            @if let (Some(year), Some(price)) = (prediction.projection.last_year, prediction.projection.last_price) {
                "Último precio conocido (" (year) "): " (format_price_eur(Some(price))) ". "
            }
            "Precio proyectado en " (prediction.target_year) ": "
            strong { (prediction.projection.display) }
        }
        @match figure {
            Ok(figure) => { (figure_div("proyeccion", &figure)) }
            Err(e) => { (alert(&format!("No se pudo generar el gráfico: {}", e))) }
        }
        @if !prediction.series.is_empty() {
            (download_link("/api/v1/exports/projection.png", &download, "Descargar gráfico (PNG)"))
        }
    }
}

fn render_forecast(rows: &[ForecastRowDto], year: i32) -> Markup {
    let download = DownloadQuery { region: None, year };
    html! {
        h2 { "Previsión para todas las comunidades en " (year) }
        table {
            tr {
                th { "Comunidad" }
                th { "Año" }
                th { "Crecimiento previsto" }
                th { "Último precio" }
                th { "Precio proyectado" }
                th { "Confianza" }
                th { "Recomendación" }
            }
            @for row in rows {
                tr {
                    td { (row.region) }
                    td { (row.year) }
                    td { (format_percent(row.growth_percent)) }
                    td { (format_price_eur(row.last_price)) }
                    td { (format_price_eur(row.projected_price)) }
                    td {
                        @match row.confidence {
                            Some(c) => { (format!("{:.1}%", c * 100.0)) }
                            None => { "-" }
                        }
                    }
                    td { (row.recommendation.as_deref().unwrap_or(NO_DATA_LABEL)) }
                }
            }
        }
        (download_link("/api/v1/exports/forecast.xlsx", &download, "Descargar tabla (Excel)"))
        (download_link("/api/v1/exports/forecast.csv", &download, "Descargar tabla (CSV)"))
    }
}

fn render_map(state: &AppState, growth: &RegionGrowthDto) -> Markup {
    html! {
        h2 { "Mapa de crecimiento previsto" }
        @match &state.context.boundaries {
            Some(boundaries) => { (figure_div("mapa", &choropleth_figure(&growth.cells, boundaries, growth.target_year))) }
            None => { (alert(growth.map_message.as_deref().unwrap_or("Mapa no disponible"))) }
        }
    }
}

/// Dashboard page: selectors, prediction, charts, map and forecast table
#[instrument(skip(state))]
pub async fn dashboard(
    Query(query): Query<DashboardQuery>,
    State(state): State<AppState>,
) -> Markup {
    let context = &state.context;
    let selected = query
        .region
        .as_deref()
        .filter(|r| !r.is_empty() && *r != ALL_REGIONS);

    let target_query = TargetQuery {
        year: query.year,
        horizon: query.horizon,
    };
    let target = target_query
        .target_or_next()
        .and_then(|target| context.resolve_target(target).map_err(ApiError::from));
    let (target, target_error) = match target {
        Ok(resolved) => (resolved, None),
        Err(e) => {
            warn!("Invalid dashboard target: {}", e);
            let fallback = context
                .resolve_target(PredictionTarget::Horizon(1))
                .unwrap_or(ResolvedTarget {
                    year: context.min_target_year(),
                    horizon: 1,
                });
            (fallback, Some(e.to_string()))
        }
    };
    let year_target = PredictionTarget::Year(target.year);

    let main_section = match selected {
        Some(region) => cached_prediction(&state, region, year_target)
            .await
            .map(|prediction| render_prediction(&prediction)),
        None => cached_forecast(&state, year_target, None)
            .await
            .map(|rows| render_forecast(&rows, target.year)),
    };

    let series = history_series(
        context,
        selected.filter(|r| context.dataset.contains_region(r)),
    );
    let history = history_figure(&series);
    let growth = cached_region_growth(&state, year_target).await;

    let body = html! {
        h1 { "Predicción del precio de la vivienda en España" }
        @if let Some(description) = &context.artifact.description {
            p class="note" { "Modelo: " (description) }
        }
        @if let Some(score) = context.fit_score {
            p class="note" { "Ajuste del modelo sobre los datos históricos (R²): " (format!("{:.3}", score)) }
        }
        @if let Some(message) = &target_error {
            (alert(message))
        }
        (render_form(&state, selected, target.year))
        @match &main_section {
            Ok(section) => { (section) }
            Err(e) => { (alert(&e.to_string())) }
        }
        h2 { "Evolución histórica" }
        @match &history {
            Ok(figure) => { (figure_div("historico", figure)) }
            Err(e) => { (alert(&format!("No se pudo generar el gráfico: {}", e))) }
        }
        @match &growth {
            Ok(growth) => { (render_map(&state, growth)) }
            Err(e) => { (alert(&e.to_string())) }
        }
    };

    page("Predicción de la vivienda", body)
}
