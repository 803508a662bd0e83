use crate::threshold::{Color, Operator, Threshold, UnknownOperator};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Embedded catalogue of selectable weather fields.
pub static DATA_SOURCES_CSV: &str = include_str!("../../fixtures/data_sources.csv");

/// Embedded default color rules, keyed by data source id.
pub static THRESHOLDS_CSV: &str = include_str!("../../fixtures/thresholds.csv");

/// Errors raised while reading a data source catalogue or a rules file.
#[derive(Error, Debug)]
pub enum CatalogueError {
    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("Rule {line}: {source}")]
    Operator {
        line: usize,
        #[source]
        source: UnknownOperator,
    },

    #[error("Rule {line} refers to unknown data source {source_id:?}")]
    UnknownSource { line: usize, source_id: String },

    #[error("Data source {0:?} is listed more than once")]
    DuplicateSource(String),
}

/// A selectable weather field and the rules used to color it.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DataSource {
    pub id: String,
    pub name: String,
    /// Key of the hourly variable in the weather API
    pub field: String,
    pub unit: String,
    pub is_active: bool,
    pub thresholds: Vec<Threshold>,
}

#[derive(Debug, Deserialize)]
struct SourceRecord {
    id: String,
    name: String,
    field: String,
    unit: String,
}

#[derive(Debug, Deserialize)]
struct RuleRecord {
    source_id: String,
    operator: String,
    value: f64,
    color: String,
}

impl DataSource {
    pub fn new(id: &str, name: &str, field: &str, unit: &str, thresholds: Vec<Threshold>) -> Self {
        DataSource {
            id: id.to_string(),
            name: name.to_string(),
            field: field.to_string(),
            unit: unit.to_string(),
            is_active: false,
            thresholds,
        }
    }

    /// The embedded default catalogue. The first source starts active.
    pub fn default_catalogue() -> Result<Vec<DataSource>, CatalogueError> {
        DataSource::parse_catalogue(DATA_SOURCES_CSV, THRESHOLDS_CSV)
    }

    /// Build data sources from a `id,name,field,unit` CSV and a
    /// `source_id,operator,value,color` rules CSV.
    pub fn parse_catalogue(
        sources_csv: &str,
        thresholds_csv: &str,
    ) -> Result<Vec<DataSource>, CatalogueError> {
        let mut sources: Vec<DataSource> = Vec::new();
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(sources_csv.as_bytes());
        for row in rdr.deserialize() {
            let record: SourceRecord = row?;
            if sources.iter().any(|s| s.id == record.id) {
                return Err(CatalogueError::DuplicateSource(record.id));
            }
            sources.push(DataSource::new(
                &record.id,
                &record.name,
                &record.field,
                &record.unit,
                Vec::new(),
            ));
        }
        for (source_id, threshold) in DataSource::parse_rules(thresholds_csv, &sources)? {
            if let Some(source) = sources.iter_mut().find(|s| s.id == source_id) {
                source.thresholds.push(threshold);
            }
        }
        if let Some(first) = sources.first_mut() {
            first.is_active = true;
        }
        Ok(sources)
    }

    /// Parse a rules CSV against a known set of sources, preserving row order.
    pub fn parse_rules(
        thresholds_csv: &str,
        sources: &[DataSource],
    ) -> Result<Vec<(String, Threshold)>, CatalogueError> {
        let mut rules = Vec::new();
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(thresholds_csv.as_bytes());
        for (index, row) in rdr.deserialize().enumerate() {
            let record: RuleRecord = row?;
            let line = index + 2;
            if !sources.iter().any(|s| s.id == record.source_id) {
                return Err(CatalogueError::UnknownSource {
                    line,
                    source_id: record.source_id,
                });
            }
            let operator: Operator = record
                .operator
                .parse()
                .map_err(|source| CatalogueError::Operator { line, source })?;
            rules.push((
                record.source_id,
                Threshold::new(operator, record.value, Color(record.color)),
            ));
        }
        Ok(rules)
    }
}
