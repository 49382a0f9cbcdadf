use common::{CellStatus, ChartPoint, ChartSeries, MapCellDto, SeriesKind};
use model::entities::boundary::BoundaryCollection;
use plotly::common::{DashType, Line, Mode, Title};
use plotly::layout::Axis;
use plotly::{Layout, Scatter};
use serde_json::{json, Value};

/// Plotly figure (`data` + `layout`) ready to be passed to `Plotly.newPlot`.
#[derive(Debug, Clone)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
}

fn price_layout(title: &str) -> Layout {
    Layout::new()
        .title(Title::with_text(title))
        .x_axis(Axis::new().title(Title::with_text("Año")).dtick(1.0))
        .y_axis(Axis::new().title(Title::with_text("Precio (€/m²)")))
        .height(400)
}

/// Historical line plus a dashed segment from the last observation to the
/// predicted point.
pub fn projection_figure(region: &str, points: &[ChartPoint]) -> serde_json::Result<Figure> {
    let historical: Vec<&ChartPoint> = points
        .iter()
        .filter(|p| p.kind == SeriesKind::Historical)
        .collect();
    let predicted: Vec<&ChartPoint> = points
        .iter()
        .filter(|p| p.kind == SeriesKind::Prediction)
        .collect();

    let history_trace = Scatter::new(
        historical.iter().map(|p| p.year).collect(),
        historical.iter().map(|p| p.price_per_area).collect(),
    )
    .mode(Mode::LinesMarkers)
    .name(SeriesKind::Historical.label())
    .line(Line::new().color("rgb(59, 130, 246)").width(2.0));
    let mut data = vec![serde_json::to_value(&history_trace)?];

    if !predicted.is_empty() {
        let joined: Vec<&ChartPoint> = historical
            .last()
            .copied()
            .into_iter()
            .chain(predicted)
            .collect();
        let prediction_trace = Scatter::new(
            joined.iter().map(|p| p.year).collect(),
            joined.iter().map(|p| p.price_per_area).collect(),
        )
        .mode(Mode::LinesMarkers)
        .name(SeriesKind::Prediction.label())
        .line(Line::new().color("rgb(234, 88, 12)").width(2.0).dash(DashType::Dash));
        data.push(serde_json::to_value(&prediction_trace)?);
    }

    let layout = price_layout(&format!("Proyección del precio en {}", region));
    Ok(Figure {
        data,
        layout: serde_json::to_value(&layout)?,
    })
}

/// One line per region.
pub fn history_figure(series: &[ChartSeries]) -> serde_json::Result<Figure> {
    let data = series
        .iter()
        .map(|s| {
            let trace = Scatter::new(
                s.points.iter().map(|p| p.year).collect(),
                s.points.iter().map(|p| p.price_per_area).collect(),
            )
            .mode(Mode::LinesMarkers)
            .name(s.name.as_str());
            serde_json::to_value(&trace)
        })
        .collect::<serde_json::Result<Vec<Value>>>()?;

    let layout = price_layout("Evolución histórica del precio por comunidad");
    Ok(Figure {
        data,
        layout: serde_json::to_value(&layout)?,
    })
}

/// Choropleth of the predicted growth. Regions without a value are drawn in
/// grey by a second trace so they stay visible as "no data".
pub fn choropleth_figure(cells: &[MapCellDto], boundaries: &BoundaryCollection, year: i32) -> Figure {
    let (with_value, without_value): (Vec<&MapCellDto>, Vec<&MapCellDto>) = cells
        .iter()
        .filter(|c| c.status != CellStatus::NotOnMap)
        .partition(|c| c.growth_percent.is_some());

    let mut data = vec![json!({
        "type": "choropleth",
        "geojson": boundaries.raw(),
        "featureidkey": boundaries.feature_id_key(),
        "locations": with_value.iter().map(|c| c.region.as_str()).collect::<Vec<_>>(),
        "z": with_value.iter().map(|c| c.growth_percent).collect::<Vec<_>>(),
        "colorscale": "RdYlGn",
        "colorbar": {"title": {"text": "Crecimiento (%)"}},
        "hovertemplate": "%{location}: %{z:.2f}%<extra></extra>",
        "name": "Predicción",
    })];
    if !without_value.is_empty() {
        data.push(json!({
            "type": "choropleth",
            "geojson": boundaries.raw(),
            "featureidkey": boundaries.feature_id_key(),
            "locations": without_value.iter().map(|c| c.region.as_str()).collect::<Vec<_>>(),
            "z": vec![0; without_value.len()],
            "colorscale": [[0, "lightgrey"], [1, "lightgrey"]],
            "showscale": false,
            "hovertemplate": "%{location}: Sin datos<extra></extra>",
            "name": "Sin datos",
        }));
    }

    Figure {
        data,
        layout: json!({
            "title": {"text": format!("Crecimiento previsto por comunidad en {}", year)},
            "geo": {"fitbounds": "locations", "visible": false},
            "height": 500,
            "margin": {"l": 0, "r": 0, "t": 40, "b": 0},
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<ChartPoint> {
        vec![
            ChartPoint::new(2022, 2900.0, SeriesKind::Historical),
            ChartPoint::new(2023, 3000.0, SeriesKind::Historical),
            ChartPoint::new(2025, 3135.0, SeriesKind::Prediction),
        ]
    }

    #[test]
    fn test_projection_figure_joins_last_observation() {
        let figure = projection_figure("Madrid", &points()).unwrap();

        assert_eq!(figure.data.len(), 2);
        assert_eq!(figure.data[1]["name"], "Predicción");
        assert_eq!(figure.data[1]["x"], json!([2023, 2025]));
        assert_eq!(figure.data[1]["y"], json!([3000.0, 3135.0]));
    }

    #[test]
    fn test_projection_figure_without_prediction() {
        let figure = projection_figure("Madrid", &points()[..2]).unwrap();
        assert_eq!(figure.data.len(), 1);
        assert_eq!(figure.data[0]["name"], "Histórico");
    }

    #[test]
    fn test_choropleth_greys_out_missing_values() {
        let boundaries = BoundaryCollection::from_value(
            json!({"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"name": "A"}, "geometry": null},
                {"type": "Feature", "properties": {"name": "C"}, "geometry": null}
            ]}),
            "name",
        )
        .unwrap();
        let cells = vec![
            MapCellDto {
                region: "A".into(),
                status: CellStatus::Predicted,
                growth_percent: Some(2.0),
                projected_price: None,
                reason: None,
            },
            MapCellDto {
                region: "C".into(),
                status: CellStatus::NoData,
                growth_percent: None,
                projected_price: None,
                reason: None,
            },
        ];

        let figure = choropleth_figure(&cells, &boundaries, 2025);
        assert_eq!(figure.data.len(), 2);
        assert_eq!(figure.data[0]["locations"], json!(["A"]));
        assert_eq!(figure.data[1]["locations"], json!(["C"]));
        assert_eq!(figure.data[0]["featureidkey"], "properties.name");
    }
}
