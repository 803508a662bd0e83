//! Data source catalogue loading and the `sources`/`classify` commands.

use anyhow::{anyhow, Context};
use geowx_data::{classify, evaluation_order, matching_rule};
use geowx_meteo::{DataSource, Threshold};
use geowx_state::DataSourceRegistry;
use log::info;
use std::collections::BTreeMap;

/// The embedded catalogue, with the rules of any source named in
/// `rules_path` replaced by the rows of that file.
pub fn load(rules_path: Option<&str>) -> anyhow::Result<DataSourceRegistry> {
    let mut registry = DataSourceRegistry::from_catalogue()?;
    if let Some(path) = rules_path {
        let csv = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file {}", path))?;
        apply_rules(&mut registry, &csv).with_context(|| format!("Invalid rules file {}", path))?;
    }
    Ok(registry)
}

/// Replace the rules of every source named in a rules CSV, keeping the
/// file's row order per source.
pub fn apply_rules(registry: &mut DataSourceRegistry, csv: &str) -> anyhow::Result<()> {
    let sources: Vec<DataSource> = registry.iter().cloned().collect();
    let mut grouped: BTreeMap<String, Vec<Threshold>> = BTreeMap::new();
    for (source_id, threshold) in DataSource::parse_rules(csv, &sources)? {
        grouped.entry(source_id).or_default().push(threshold);
    }
    for (source_id, thresholds) in grouped {
        info!("Using {} custom rules for {}", thresholds.len(), source_id);
        registry.replace_thresholds(&source_id, thresholds);
    }
    Ok(())
}

/// Activate `source` if given; the registry must end with an active source.
pub fn with_active(
    mut registry: DataSourceRegistry,
    source: Option<&str>,
) -> anyhow::Result<DataSourceRegistry> {
    if let Some(id) = source {
        if !registry.set_active(id) {
            let known: Vec<&str> = registry.iter().map(|s| s.id.as_str()).collect();
            return Err(anyhow!(
                "Unknown data source {:?} (expected one of {})",
                id,
                known.join(", ")
            ));
        }
    }
    if registry.active().is_none() {
        return Err(anyhow!("No active data source selected."));
    }
    Ok(registry)
}

pub fn run_sources(registry: &DataSourceRegistry) -> anyhow::Result<()> {
    for source in registry.iter() {
        let marker = if source.is_active { "*" } else { " " };
        println!(
            "{} {:<14} {:<20} {:<22} {}",
            marker, source.id, source.name, source.field, source.unit
        );
        for rule in evaluation_order(&source.thresholds) {
            println!("      {}", rule);
        }
    }
    Ok(())
}

pub fn run_classify(registry: &DataSourceRegistry, value: f64) -> anyhow::Result<()> {
    let source = registry
        .active()
        .ok_or_else(|| anyhow!("No active data source selected."))?;
    match matching_rule(Some(value), &source.thresholds) {
        Some(rule) => println!("{}{} matches {}", value, source.unit, rule),
        None => println!(
            "{}{} matches no rule -> {}",
            value,
            source.unit,
            classify(Some(value), &source.thresholds)
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geowx_meteo::{Color, Operator};

    #[test]
    fn test_apply_rules_replaces_named_sources() {
        let mut registry = DataSourceRegistry::from_catalogue().unwrap();
        let wind_before = registry.get("wind").unwrap().thresholds.clone();
        let csv = "source_id,operator,value,color\n\
                   temperature,>,30,#7F1D1D\n\
                   temperature,<=,30,#1E40AF\n";
        apply_rules(&mut registry, csv).unwrap();
        assert_eq!(
            registry.get("temperature").unwrap().thresholds,
            vec![
                Threshold::new(Operator::Gt, 30.0, "#7F1D1D"),
                Threshold::new(Operator::Le, 30.0, "#1E40AF"),
            ]
        );
        assert_eq!(registry.get("wind").unwrap().thresholds, wind_before);
    }

    #[test]
    fn test_apply_rules_rejects_unknown_source() {
        let mut registry = DataSourceRegistry::from_catalogue().unwrap();
        let csv = "source_id,operator,value,color\nsnow,>,0,#FFFFFF\n";
        assert!(apply_rules(&mut registry, csv).is_err());
    }

    #[test]
    fn test_with_active() {
        let registry = DataSourceRegistry::from_catalogue().unwrap();
        let registry = with_active(registry, Some("humidity")).unwrap();
        assert_eq!(registry.active().unwrap().id, "humidity");
        let source = registry.active().unwrap();
        assert_eq!(classify(Some(85.0), &source.thresholds), Color::from("#1D4ED8"));
        assert!(with_active(registry, Some("snow")).is_err());
    }
}
