//! Weather lookups for a point and for GeoJSON regions.

use anyhow::{anyhow, Context};
use geowx_data::{classify, resolve};
use geowx_meteo::client::{ClientConfig, OpenMeteoClient};
use geowx_meteo::{TimeRange, WeatherFetcher};
use geowx_state::dashboard::evaluate;
use geowx_state::geometry::parse_polygons;
use geowx_state::{Condition, Dashboard, DataSourceRegistry, InMemoryMap, Message, PolygonId};
use geowx_utils::format::format_value;
use log::{info, warn};
use std::io::Write;

/// Resolve the window, fetch the series at one point, reduce and classify.
pub async fn run_query(
    config: &ClientConfig,
    registry: &DataSourceRegistry,
    latitude: f64,
    longitude: f64,
    range: &TimeRange,
) -> anyhow::Result<()> {
    let source = registry
        .active()
        .ok_or_else(|| anyhow!("No active data source selected."))?;
    let client = OpenMeteoClient::new(config.clone())?;
    let window = resolve(range);
    let query = window.query(latitude, longitude, &source.field);

    info!(
        "Querying {} at ({}, {}) from {} to {}",
        source.field, latitude, longitude, window.start_date, window.end_date
    );

    let evaluation = evaluate(&client, &query, window.extraction).await;
    let color = classify(evaluation.value, &source.thresholds);
    println!(
        "{} {} {}",
        source.name,
        format_value(evaluation.value, &source.unit),
        color
    );
    if let Some(condition) = evaluation.condition {
        eprintln!("{}", condition);
    }
    Ok(())
}

/// Classify every polygon of a GeoJSON file and write a CSV summary to
/// stdout.
pub async fn run_regions(
    config: &ClientConfig,
    registry: DataSourceRegistry,
    geojson_path: &str,
    range: TimeRange,
) -> anyhow::Result<()> {
    let geojson = std::fs::read_to_string(geojson_path)
        .with_context(|| format!("Failed to read {}", geojson_path))?;
    let client = OpenMeteoClient::new(config.clone())?;
    let regions = classify_regions(registry, &geojson, range, &client).await?;
    regions.write_csv(std::io::stdout())
}

/// A dashboard populated from GeoJSON, plus the conditions met while
/// drawing it.
pub struct Regions {
    pub dashboard: Dashboard<InMemoryMap>,
    pub conditions: Vec<(PolygonId, Condition)>,
}

/// Draw each polygon onto an in-memory layer and run the dashboard draw
/// flow for it. Polygons carrying a `name` property are renamed after it.
pub async fn classify_regions<F: WeatherFetcher>(
    registry: DataSourceRegistry,
    geojson: &str,
    range: TimeRange,
    fetcher: &F,
) -> anyhow::Result<Regions> {
    let shapes = parse_polygons(geojson)?;
    info!("Classifying {} polygons", shapes.len());

    let mut dashboard = Dashboard::new(registry, InMemoryMap::new(), range);
    let mut conditions = Vec::new();
    for shape in shapes {
        let geometry = dashboard.map_mut().draw(shape.geometry);
        match dashboard.draw(geometry, fetcher).await {
            Ok(created) => {
                if let Some(name) = shape.name {
                    dashboard.dispatch(Message::RenamePolygon {
                        id: created.id.clone(),
                        name,
                    });
                }
                if let Some(condition) = created.condition {
                    conditions.push((created.id, condition));
                }
            }
            Err(condition) => warn!("Skipped polygon: {}", condition),
        }
    }
    Ok(Regions {
        dashboard,
        conditions,
    })
}

impl Regions {
    pub fn write_csv<W: Write>(&self, writer: W) -> anyhow::Result<()> {
        let source = self
            .dashboard
            .sources()
            .active()
            .ok_or_else(|| anyhow!("No active data source selected."))?;
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["id", "name", "value", "color", "condition"])?;
        for polygon in self.dashboard.polygons().iter() {
            let condition = self
                .conditions
                .iter()
                .find(|(id, _)| id == &polygon.id)
                .map(|(_, c)| c.message())
                .unwrap_or("");
            let value = format_value(polygon.value(&source.field), &source.unit);
            wtr.write_record([
                polygon.id.0.as_str(),
                polygon.name.as_str(),
                value.as_str(),
                polygon.color.as_str(),
                condition,
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}
