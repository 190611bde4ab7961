use serde_json::{Value, json};
use tera::{Context, Tera};
use tracing::debug;

use folio_core::models::report::ReportData;
use folio_core::models::template::ReportTemplate;

use crate::charts;
use crate::error::ExportError;

const REPORT: &str = "report.html";

/// A finished report document plus the images it references.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub html: String,
    /// Every image source in the document, in first-appearance order.
    pub image_sources: Vec<String>,
}

fn templates() -> Result<Tera, ExportError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("macros.html", include_str!("../templates/macros.html")),
        ("report.css", include_str!("../templates/report.css")),
        (REPORT, include_str!("../templates/report.html")),
    ])
    .map_err(|e| ExportError::TemplateParse(e.to_string()))?;
    Ok(tera)
}

/// Render the six report pages for `data` in the given layout.
pub fn render_report(
    data: &ReportData,
    template: ReportTemplate,
) -> Result<RenderedReport, ExportError> {
    let tera = templates()?;

    let mut data_value = serde_json::to_value(data)?;
    // Templates test `data.logoImage`, which must exist even when unset.
    if let Value::Object(map) = &mut data_value {
        map.entry("logoImage").or_insert(Value::Null);
    }

    let mut context = Context::new();
    context.insert("data", &data_value);
    context.insert("template", template.as_str());
    context.insert(
        "charts",
        &json!({
            "price": charts::price_bar_chart(&data.prices_data, &data.logo_color),
            "demand": charts::demand_ring_chart(&data.demand_data),
            "legend": charts::legend(&data.demand_data),
        }),
    );

    let html = tera.render(REPORT, &context)?;
    let image_sources = image_sources(data);
    debug!(
        template = template.as_str(),
        bytes = html.len(),
        images = image_sources.len(),
        "report rendered"
    );

    Ok(RenderedReport {
        html,
        image_sources,
    })
}

/// Image sources the rendered document will load, deduplicated.
pub fn image_sources(data: &ReportData) -> Vec<String> {
    let candidates = std::iter::once(data.hero_image.as_str())
        .chain(data.logo_image.as_deref())
        .chain(data.secondary_logos.iter().map(String::as_str))
        .chain(data.properties.iter().map(|p| p.image.as_str()));

    let mut out: Vec<String> = Vec::new();
    for src in candidates {
        let src = src.trim();
        if !src.is_empty() && !out.iter().any(|s| s == src) {
            out.push(src.to_string());
        }
    }
    out
}
