//! The dashboard store.
//!
//! `Dashboard` owns both registries, the current time selection and the
//! map layer. Every mutation goes through `&mut self` on one logical thread;
//! only fetches are awaited. Work that fetches is split into a `begin_*`
//! step that snapshots what to ask for, a `run` step that only needs the
//! fetcher, and a `finish_*`/`commit_*` step that applies the results.
//! Recolor batches carry the generation they were started in and are
//! discarded on commit if a newer batch has begun since.

use crate::condition::Condition;
use crate::map::{GeometryRef, MapLayer};
use crate::polygons::{PolygonData, PolygonId, PolygonRegistry};
use crate::sources::{DataSourceRegistry, LastRuleError, ThresholdEdit};
use crate::sync::{diff, Reconciliation};
use futures::future::join_all;
use geowx_data::{reduce, resolve, Extraction};
use geowx_meteo::{SeriesQuery, TimeRange, WeatherFetcher};
use log::{debug, info, warn};
use std::collections::BTreeSet;

/// One fetched and reduced reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub value: Option<f64>,
    pub condition: Option<Condition>,
}

impl Evaluation {
    fn missing(condition: Condition) -> Self {
        Evaluation {
            value: None,
            condition: Some(condition),
        }
    }
}

/// Fetch one series and reduce it. Failures become a missing value paired
/// with the condition to report.
pub async fn evaluate<F: WeatherFetcher>(
    fetcher: &F,
    query: &SeriesQuery,
    extraction: Extraction,
) -> Evaluation {
    match fetcher.fetch_hourly(query).await {
        Ok(series) => {
            let reduction = reduce(&series, extraction);
            Evaluation {
                value: reduction.value,
                condition: reduction.condition.and_then(Condition::from_series),
            }
        }
        Err(e) => {
            warn!(
                "Fetching {} at ({}, {}) failed: {}",
                query.field, query.latitude, query.longitude, e
            );
            Evaluation::missing(Condition::from(&e))
        }
    }
}

/// A drawn feature waiting on its first reading.
#[derive(Debug, Clone)]
pub struct DrawRequest {
    geometry: GeometryRef,
    source_id: String,
    time_range: TimeRange,
    query: SeriesQuery,
    extraction: Extraction,
}

impl DrawRequest {
    pub fn geometry(&self) -> &GeometryRef {
        &self.geometry
    }

    pub async fn run<F: WeatherFetcher>(self, fetcher: &F) -> DrawResult {
        let evaluation = evaluate(fetcher, &self.query, self.extraction).await;
        DrawResult {
            request: self,
            evaluation,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DrawResult {
    request: DrawRequest,
    evaluation: Evaluation,
}

/// A polygon registered by the draw flow.
#[derive(Debug, Clone, PartialEq)]
pub struct Created {
    pub id: PolygonId,
    pub condition: Option<Condition>,
    /// The active source or time range changed while the reading was in
    /// flight; the caller should start a recolor.
    pub needs_recolor: bool,
}

#[derive(Debug, Clone)]
struct RecolorTask {
    id: PolygonId,
    /// `None` when the polygon's feature has no centroid any more
    query: Option<SeriesQuery>,
}

/// Fan-out of one recolor pass.
#[derive(Debug, Clone)]
pub struct RecolorBatch {
    generation: u64,
    source_id: String,
    extraction: Extraction,
    tasks: Vec<RecolorTask>,
}

impl RecolorBatch {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Issue every fetch concurrently and wait for all of them.
    pub async fn run<F: WeatherFetcher>(self, fetcher: &F) -> RecolorResults {
        let extraction = self.extraction;
        let evaluations = join_all(self.tasks.iter().map(|task| async move {
            match &task.query {
                Some(query) => evaluate(fetcher, query, extraction).await,
                None => Evaluation::missing(Condition::InvalidSelection),
            }
        }))
        .await;
        RecolorResults {
            generation: self.generation,
            source_id: self.source_id,
            evaluations: self
                .tasks
                .into_iter()
                .map(|task| task.id)
                .zip(evaluations)
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecolorResults {
    generation: u64,
    source_id: String,
    evaluations: Vec<(PolygonId, Evaluation)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    Committed {
        updated: usize,
        conditions: Vec<(PolygonId, Condition)>,
    },
    /// A newer batch was started after this one
    Discarded,
    NoActiveSource,
}

/// UI events routed into the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    SetActiveSource(String),
    SetTimeRange(TimeRange),
    UpdateThreshold {
        source_id: String,
        index: usize,
        edit: ThresholdEdit,
    },
    AddThreshold {
        source_id: String,
    },
    RemoveThreshold {
        source_id: String,
        index: usize,
    },
    RenamePolygon {
        id: PolygonId,
        name: String,
    },
    DeletePolygon(PolygonId),
    SelectPolygon(Option<PolygonId>),
    /// The layer's own delete gesture removed this feature
    LayerDeleted(GeometryRef),
}

/// What the caller must do after a dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effect {
    pub recolor: bool,
    pub rejected: Option<LastRuleError>,
}

impl Effect {
    fn recolor_if(recolor: bool) -> Self {
        Effect {
            recolor,
            rejected: None,
        }
    }
}

pub struct Dashboard<M: MapLayer> {
    sources: DataSourceRegistry,
    polygons: PolygonRegistry,
    time_range: TimeRange,
    map: M,
    generation: u64,
    pending: BTreeSet<GeometryRef>,
}

impl<M: MapLayer> Dashboard<M> {
    pub fn new(sources: DataSourceRegistry, map: M, time_range: TimeRange) -> Self {
        Dashboard {
            sources,
            polygons: PolygonRegistry::new(),
            time_range,
            map,
            generation: 0,
            pending: BTreeSet::new(),
        }
    }

    pub fn sources(&self) -> &DataSourceRegistry {
        &self.sources
    }

    pub fn polygons(&self) -> &PolygonRegistry {
        &self.polygons
    }

    pub fn time_range(&self) -> &TimeRange {
        &self.time_range
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    /// Generation of the most recently started recolor batch.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self, geometry: &GeometryRef) -> bool {
        self.pending.contains(geometry)
    }

    /// Start registering a feature the user just drew. Without an active
    /// source, or if the feature has no centroid, the feature is removed
    /// from the layer and `InvalidSelection` is returned.
    pub fn begin_draw(&mut self, geometry: GeometryRef) -> Result<DrawRequest, Condition> {
        let Some(source) = self.sources.active() else {
            info!("No active data source; discarding {}", geometry);
            self.map.remove_geometry(&geometry);
            return Err(Condition::InvalidSelection);
        };
        let Some(centroid) = self.map.centroid(&geometry) else {
            warn!("{} has no centroid; discarding it", geometry);
            self.map.remove_geometry(&geometry);
            return Err(Condition::InvalidSelection);
        };
        let window = resolve(&self.time_range);
        let request = DrawRequest {
            geometry: geometry.clone(),
            source_id: source.id.clone(),
            time_range: self.time_range,
            query: window.query(centroid.latitude, centroid.longitude, &source.field),
            extraction: window.extraction,
        };
        self.pending.insert(geometry);
        Ok(request)
    }

    /// Register the polygon, paint it and select it. A failed fetch still
    /// creates the polygon with no reading and the fallback color.
    pub fn finish_draw(&mut self, result: DrawResult) -> Result<Created, Condition> {
        let DrawResult {
            request,
            evaluation,
        } = result;
        self.pending.remove(&request.geometry);
        if self.map.centroid(&request.geometry).is_none() {
            debug!("{} vanished while its reading was in flight", request.geometry);
            return Err(Condition::InvalidSelection);
        }
        let Some(source) = self.sources.get(&request.source_id) else {
            self.map.remove_geometry(&request.geometry);
            return Err(Condition::InvalidSelection);
        };
        let needs_recolor = !source.is_active || request.time_range != self.time_range;
        let polygon = self
            .polygons
            .create(request.geometry, source, evaluation.value);
        self.map.repaint(&polygon.geometry, &polygon.color);
        let id = polygon.id.clone();
        self.polygons.select(&id);
        Ok(Created {
            id,
            condition: evaluation.condition,
            needs_recolor,
        })
    }

    pub async fn draw<F: WeatherFetcher>(
        &mut self,
        geometry: GeometryRef,
        fetcher: &F,
    ) -> Result<Created, Condition> {
        let request = self.begin_draw(geometry)?;
        let result = request.run(fetcher).await;
        self.finish_draw(result)
    }

    /// Snapshot every polygon's query for the current source and time
    /// range. Always advances the generation, which invalidates any batch
    /// still in flight.
    pub fn begin_recolor(&mut self) -> Option<RecolorBatch> {
        self.generation += 1;
        let source = self.sources.active()?;
        let window = resolve(&self.time_range);
        let tasks = self
            .polygons
            .iter()
            .map(|polygon| RecolorTask {
                id: polygon.id.clone(),
                query: self
                    .map
                    .centroid(&polygon.geometry)
                    .map(|c| window.query(c.latitude, c.longitude, &source.field)),
            })
            .collect();
        debug!(
            "Starting recolor generation {} for {}",
            self.generation, source.id
        );
        Some(RecolorBatch {
            generation: self.generation,
            source_id: source.id.clone(),
            extraction: window.extraction,
            tasks,
        })
    }

    /// Apply a finished batch in one step, unless it has been superseded.
    /// Polygons deleted while the batch ran are skipped.
    pub fn commit_recolor(&mut self, results: RecolorResults) -> CommitOutcome {
        if results.generation != self.generation {
            debug!(
                "Discarding recolor generation {} (current {})",
                results.generation, self.generation
            );
            return CommitOutcome::Discarded;
        }
        let Some(source) = self.sources.get(&results.source_id) else {
            return CommitOutcome::NoActiveSource;
        };
        let mut updated = 0;
        let mut conditions = Vec::new();
        for (id, evaluation) in results.evaluations {
            let Some(color) = self.polygons.update(&id, source, evaluation.value) else {
                continue;
            };
            if let Some(polygon) = self.polygons.get(&id) {
                self.map.repaint(&polygon.geometry, &color);
            }
            updated += 1;
            if let Some(condition) = evaluation.condition {
                conditions.push((id, condition));
            }
        }
        info!(
            "Recolor generation {} updated {} polygons ({} conditions)",
            results.generation,
            updated,
            conditions.len()
        );
        CommitOutcome::Committed {
            updated,
            conditions,
        }
    }

    pub async fn recolor_all<F: WeatherFetcher>(&mut self, fetcher: &F) -> CommitOutcome {
        let Some(batch) = self.begin_recolor() else {
            return CommitOutcome::NoActiveSource;
        };
        let results = batch.run(fetcher).await;
        self.commit_recolor(results)
    }

    /// Registry-driven delete; the backing feature is removed too.
    pub fn delete_polygon(&mut self, id: &PolygonId) -> Option<PolygonData> {
        let polygon = self.polygons.remove(id)?;
        self.map.remove_geometry(&polygon.geometry);
        Some(polygon)
    }

    /// Layer-driven delete. The selection is cleared whichever polygon went.
    pub fn on_layer_deleted(&mut self, geometry: &GeometryRef) -> Option<PolygonData> {
        self.polygons.clear_selection();
        self.polygons.remove_by_geometry(geometry)
    }

    /// Bring the registry and the layer back into agreement. Features
    /// still waiting on their first reading are left alone.
    pub fn reconcile(&mut self) -> Reconciliation {
        let mut reconciliation = diff(&self.polygons.geometries(), &self.map.live_geometries());
        reconciliation
            .remove_from_layer
            .retain(|g| !self.pending.contains(g));
        for geometry in &reconciliation.remove_from_registry {
            self.polygons.remove_by_geometry(geometry);
        }
        for geometry in &reconciliation.remove_from_layer {
            self.map.remove_geometry(geometry);
        }
        if !reconciliation.is_empty() {
            info!(
                "Reconciled: {} dropped from registry, {} from layer",
                reconciliation.remove_from_registry.len(),
                reconciliation.remove_from_layer.len()
            );
        }
        reconciliation
    }

    fn is_active(&self, source_id: &str) -> bool {
        self.sources.active().is_some_and(|s| s.id == source_id)
    }

    pub fn dispatch(&mut self, message: Message) -> Effect {
        match message {
            Message::SetActiveSource(id) => {
                let changed = !self.is_active(&id);
                Effect::recolor_if(self.sources.set_active(&id) && changed)
            }
            Message::SetTimeRange(range) => {
                if !range.is_well_formed() {
                    debug!("Ignoring malformed time range {:?}", range);
                    return Effect::default();
                }
                let changed = range != self.time_range;
                self.time_range = range;
                Effect::recolor_if(changed)
            }
            Message::UpdateThreshold {
                source_id,
                index,
                edit,
            } => {
                let applied = self.sources.update_threshold(&source_id, index, edit);
                Effect::recolor_if(applied && self.is_active(&source_id))
            }
            Message::AddThreshold { source_id } => {
                let applied = self.sources.add_threshold(&source_id);
                Effect::recolor_if(applied && self.is_active(&source_id))
            }
            Message::RemoveThreshold { source_id, index } => {
                match self.sources.remove_threshold(&source_id, index) {
                    Ok(removed) => {
                        Effect::recolor_if(removed.is_some() && self.is_active(&source_id))
                    }
                    Err(e) => Effect {
                        recolor: false,
                        rejected: Some(e),
                    },
                }
            }
            Message::RenamePolygon { id, name } => {
                self.polygons.rename(&id, &name);
                Effect::default()
            }
            Message::DeletePolygon(id) => {
                self.delete_polygon(&id);
                Effect::default()
            }
            Message::SelectPolygon(Some(id)) => {
                self.polygons.select(&id);
                Effect::default()
            }
            Message::SelectPolygon(None) => {
                self.polygons.clear_selection();
                Effect::default()
            }
            Message::LayerDeleted(geometry) => {
                self.on_layer_deleted(&geometry);
                Effect::default()
            }
        }
    }
}
