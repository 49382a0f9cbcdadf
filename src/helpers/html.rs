use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use super::charts::Figure;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const STYLE: &str = "
body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 1100px; padding: 1rem; color: #1f2937; }
form { display: flex; gap: 1rem; align-items: end; flex-wrap: wrap; margin-bottom: 1.5rem; }
label { display: flex; flex-direction: column; font-size: 0.9rem; }
.metric { font-size: 2rem; font-weight: 600; }
.note { color: #6b7280; font-size: 0.85rem; }
.alert { background: #fef2f2; border: 1px solid #fecaca; padding: 0.75rem; border-radius: 0.5rem; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #e5e7eb; padding: 0.4rem; text-align: left; }
";

/// Query string of a download link.
#[derive(Debug, Serialize)]
pub struct DownloadQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<&'a str>,
    pub year: i32,
}

/// JSON for embedding inside a `<script>` element.
fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

pub fn alert(message: &str) -> Markup {
    html! { p class="alert" { (message) } }
}

/// A `<div>` plus the script drawing `figure` into it.
pub fn figure_div(div_id: &str, figure: &Figure) -> Markup {
    let options = json!({
        "responsive": true,
        "toImageButtonOptions": {"format": "png", "filename": div_id},
    });
    let call = format!(
        "Plotly.newPlot({}, {}, {}, {});",
        script_json(&Value::from(div_id)),
        script_json(&Value::Array(figure.data.clone())),
        script_json(&figure.layout),
        script_json(&options),
    );
    html! {
        div id=(div_id) class="chart" {}
        script { (PreEscaped(call)) }
    }
}

/// `path?query`, or `None` when the query cannot be encoded.
pub fn download_href(path: &str, query: &DownloadQuery) -> Option<String> {
    match serde_urlencoded::to_string(query) {
        Ok(encoded) => Some(format!("{}?{}", path, encoded)),
        Err(e) => {
            warn!("Cannot encode download link for {}: {}", path, e);
            None
        }
    }
}

pub fn download_link(path: &str, query: &DownloadQuery, text: &str) -> Markup {
    html! {
        @if let Some(href) = download_href(path, query) {
            p { a href=(href) { (text) } }
        }
    }
}

/// Full HTML document.
pub fn page(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="es" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(PLOTLY_CDN) charset="utf-8" {}
                style { (PreEscaped(STYLE)) }
            }
            body { (body) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_escapes_its_message() {
        let html = alert("<b>2031</b> & más").into_string();
        assert_eq!(html, "<p class=\"alert\">&lt;b&gt;2031&lt;/b&gt; &amp; más</p>");
    }

    #[test]
    fn test_download_href_encodes_the_region() {
        let href = download_href(
            "/api/v1/exports/projection.png",
            &DownloadQuery {
                region: Some("País Vasco"),
                year: 2025,
            },
        );
        assert_eq!(
            href.as_deref(),
            Some("/api/v1/exports/projection.png?region=Pa%C3%ADs+Vasco&year=2025")
        );

        let href = download_href(
            "/api/v1/exports/forecast.xlsx",
            &DownloadQuery {
                region: None,
                year: 2024,
            },
        );
        assert_eq!(href.as_deref(), Some("/api/v1/exports/forecast.xlsx?year=2024"));
    }

    #[test]
    fn test_download_link_escapes_the_ampersand() {
        let html = download_link(
            "/api/v1/exports/projection.png",
            &DownloadQuery {
                region: Some("Madrid"),
                year: 2025,
            },
            "Descargar gráfico (PNG)",
        )
        .into_string();
        assert!(html.contains("href=\"/api/v1/exports/projection.png?region=Madrid&amp;year=2025\""));
    }

    #[test]
    fn test_figure_div_cannot_close_the_script() {
        let figure = Figure {
            data: vec![json!({"name": "</script><b>"})],
            layout: json!({}),
        };
        let html = figure_div("map", &figure).into_string();
        assert!(!html.contains("</script><b>"));
        assert!(html.contains("<div id=\"map\" class=\"chart\"></div>"));
        assert!(html.contains("Plotly.newPlot(\"map\""));
    }

    #[test]
    fn test_page_title_is_escaped() {
        let html = page("A & B", html! { p { "cuerpo" } }).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("<p>cuerpo</p>"));
    }
}
