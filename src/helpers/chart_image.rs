use common::{ChartPoint, SeriesKind};
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use std::sync::OnceLock;
use thiserror::Error;

const WIDTH: u32 = 900;
const HEIGHT: u32 = 500;
const FONT: &str = "sans-serif";
const FONT_BYTES: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/fonts/DejaVuSans.ttf"
));

const HISTORY_COLOR: RGBColor = RGBColor(59, 130, 246);
const PREDICTION_COLOR: RGBColor = RGBColor(234, 88, 12);

static FONT_REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();

#[derive(Error, Debug)]
pub enum ChartImageError {
    #[error("no points to draw")]
    Empty,

    #[error("cannot load chart font: {0}")]
    Font(String),

    #[error("cannot draw chart: {0}")]
    Drawing(String),

    #[error("cannot encode PNG: {0}")]
    Encoding(#[from] png::EncodingError),
}

fn drawing<E: std::fmt::Display>(err: E) -> ChartImageError {
    ChartImageError::Drawing(err.to_string())
}

fn ensure_font() -> Result<(), ChartImageError> {
    FONT_REGISTERED
        .get_or_init(|| {
            register_font(FONT, FontStyle::Normal, FONT_BYTES).map_err(|_| "invalid font data".to_string())
        })
        .clone()
        .map_err(ChartImageError::Font)
}

/// Axis bounds with some headroom, never empty.
fn bounds(points: &[ChartPoint]) -> (std::ops::Range<i32>, std::ops::Range<f64>) {
    let first = points.iter().map(|p| p.year).min().unwrap_or_default();
    let last = points.iter().map(|p| p.year).max().unwrap_or_default();
    let low = points.iter().map(|p| p.price_per_area).fold(f64::INFINITY, f64::min);
    let high = points.iter().map(|p| p.price_per_area).fold(f64::NEG_INFINITY, f64::max);
    let pad = ((high - low) * 0.1).max(high.abs() * 0.02).max(1.0);
    (first..last.max(first + 1), (low - pad)..(high + pad))
}

/// Renders the projection chart (history plus the predicted segment) as a
/// PNG image.
pub fn projection_png(region: &str, points: &[ChartPoint]) -> Result<Vec<u8>, ChartImageError> {
    if points.is_empty() {
        return Err(ChartImageError::Empty);
    }
    ensure_font()?;

    let historical: Vec<(i32, f64)> = points
        .iter()
        .filter(|p| p.kind == SeriesKind::Historical)
        .map(|p| (p.year, p.price_per_area))
        .collect();
    let predicted: Vec<(i32, f64)> = historical
        .last()
        .copied()
        .into_iter()
        .chain(
            points
                .iter()
                .filter(|p| p.kind == SeriesKind::Prediction)
                .map(|p| (p.year, p.price_per_area)),
        )
        .collect();
    let (years, prices) = bounds(points);

    let mut pixels = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Proyección del precio en {}", region), (FONT, 22))
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(years, prices)
            .map_err(drawing)?;

        chart
            .configure_mesh()
            .x_desc("Año")
            .y_desc("Precio (€/m²)")
            .x_label_formatter(&|year| year.to_string())
            .y_label_formatter(&|price| format!("{:.0}", price))
            .label_style((FONT, 14))
            .draw()
            .map_err(drawing)?;

        chart
            .draw_series(LineSeries::new(historical.clone(), HISTORY_COLOR.stroke_width(2)))
            .map_err(drawing)?
            .label(SeriesKind::Historical.label())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], HISTORY_COLOR.stroke_width(2)));
        chart
            .draw_series(
                historical
                    .iter()
                    .map(|&point| Circle::new(point, 3, HISTORY_COLOR.filled())),
            )
            .map_err(drawing)?;

        if predicted.len() > 1 {
            chart
                .draw_series(LineSeries::new(predicted.clone(), PREDICTION_COLOR.stroke_width(2)))
                .map_err(drawing)?
                .label(SeriesKind::Prediction.label())
                .legend(|(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], PREDICTION_COLOR.stroke_width(2))
                });
            chart
                .draw_series(
                    predicted
                        .iter()
                        .skip(1)
                        .map(|&point| Circle::new(point, 4, PREDICTION_COLOR.filled())),
                )
                .map_err(drawing)?;
        }

        chart
            .configure_series_labels()
            .label_font((FONT, 14))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(drawing)?;
        root.present().map_err(drawing)?;
    }

    let mut image = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut image, WIDTH, HEIGHT);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&pixels)?;
        writer.finish()?;
    }
    Ok(image)
}
