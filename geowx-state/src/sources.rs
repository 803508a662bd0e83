use geowx_meteo::{CatalogueError, Color, DataSource, Operator, Threshold};
use log::debug;
use thiserror::Error;

/// Every data source keeps at least one rule.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Cannot remove the last color rule of a data source")]
pub struct LastRuleError;

/// A change to one attribute of one rule.
#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdEdit {
    Operator(Operator),
    Value(f64),
    Color(Color),
}

/// The selectable weather fields. At most one source is active at a time.
///
/// All mutators take `&mut self` and finish before returning, so no reader
/// can observe a half-applied activation swap. Edits aimed at an unknown
/// source or rule index are silently ignored and report `false`.
#[derive(Debug, Clone, Default)]
pub struct DataSourceRegistry {
    sources: Vec<DataSource>,
}

impl DataSourceRegistry {
    /// Build a registry, keeping only the first source flagged active.
    pub fn new(mut sources: Vec<DataSource>) -> Self {
        let mut seen_active = false;
        for source in sources.iter_mut() {
            if source.is_active && seen_active {
                source.is_active = false;
            }
            seen_active |= source.is_active;
        }
        Self { sources }
    }

    /// The embedded default catalogue.
    pub fn from_catalogue() -> Result<Self, CatalogueError> {
        Ok(Self::new(DataSource::default_catalogue()?))
    }

    pub fn active(&self) -> Option<&DataSource> {
        self.sources.iter().find(|s| s.is_active)
    }

    pub fn get(&self, id: &str) -> Option<&DataSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataSource> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Make `id` the only active source. Unknown ids leave the current
    /// activation untouched.
    pub fn set_active(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            debug!("Ignoring activation of unknown data source {:?}", id);
            return false;
        }
        for source in self.sources.iter_mut() {
            source.is_active = source.id == id;
        }
        true
    }

    fn rule_mut(&mut self, source_id: &str, index: usize) -> Option<&mut Threshold> {
        self.source_mut(source_id)?.thresholds.get_mut(index)
    }

    fn source_mut(&mut self, source_id: &str) -> Option<&mut DataSource> {
        self.sources.iter_mut().find(|s| s.id == source_id)
    }

    pub fn update_threshold(&mut self, source_id: &str, index: usize, edit: ThresholdEdit) -> bool {
        let Some(rule) = self.rule_mut(source_id, index) else {
            debug!("Ignoring edit of rule {} on {:?}", index, source_id);
            return false;
        };
        match edit {
            ThresholdEdit::Operator(operator) => rule.operator = operator,
            ThresholdEdit::Value(value) => rule.value = value,
            ThresholdEdit::Color(color) => rule.color = color,
        }
        true
    }

    /// Append the default `>= 0` rule.
    pub fn add_threshold(&mut self, source_id: &str) -> bool {
        match self.source_mut(source_id) {
            Some(source) => {
                source.thresholds.push(Threshold::default_rule());
                true
            }
            None => false,
        }
    }

    /// Remove one rule. Unknown sources and indices are a no-op
    /// (`Ok(None)`); removing the only remaining rule is refused.
    pub fn remove_threshold(
        &mut self,
        source_id: &str,
        index: usize,
    ) -> Result<Option<Threshold>, LastRuleError> {
        let Some(source) = self.source_mut(source_id) else {
            return Ok(None);
        };
        if index >= source.thresholds.len() {
            return Ok(None);
        }
        if source.thresholds.len() == 1 {
            debug!("Refusing to remove the last rule of {:?}", source_id);
            return Err(LastRuleError);
        }
        Ok(Some(source.thresholds.remove(index)))
    }

    /// Replace a source's rules wholesale. An empty list is ignored.
    pub fn replace_thresholds(&mut self, source_id: &str, thresholds: Vec<Threshold>) -> bool {
        if thresholds.is_empty() {
            return false;
        }
        match self.source_mut(source_id) {
            Some(source) => {
                source.thresholds = thresholds;
                true
            }
            None => false,
        }
    }
}
