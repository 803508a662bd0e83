//! Command implementations for the geowx CLI.
//!
//! Provides subcommands for inspecting the data source catalogue,
//! classifying single readings, and fetching and classifying historical
//! weather for points and GeoJSON regions.

use anyhow::bail;
use clap::{Args, Subcommand};
use geowx_data::{Timeline, TimelineConfig};
use geowx_meteo::client::{ClientConfig, ARCHIVE_URL};
use geowx_meteo::{TimeMode, TimeRange};
use geowx_utils::dates::parse_instant;
use std::time::Duration;

pub mod catalogue;
pub mod query;

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Weather archive endpoint
    #[arg(long, global = true, default_value = ARCHIVE_URL)]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Attempts per request, including the first
    #[arg(long, global = true, default_value_t = 3)]
    pub max_tries: u32,

    /// CSV (`source_id,operator,value,color`) replacing the rules of the
    /// sources it names
    #[arg(long, global = true)]
    pub rules: Option<String>,
}

impl GlobalOptions {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_tries: self.max_tries.max(1),
            ..ClientConfig::default()
        }
    }
}

/// Time selection: a single instant, a range, or the current hour.
#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Single instant, e.g. 2025-08-04T07:00Z or 2025-08-04
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub at: Option<String>,

    /// Range start
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// Range end
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}

impl WindowArgs {
    /// The selection as the timeline slider would hold it.
    pub fn time_range(&self, timeline: &Timeline) -> anyhow::Result<TimeRange> {
        match (&self.at, &self.from, &self.to) {
            (Some(at), _, _) => {
                let instant = parse_instant(at)?;
                Ok(TimeRange::single(instant, timeline.instant_to_position(&instant)))
            }
            (None, Some(from), Some(to)) => {
                let start = parse_instant(from)?;
                let end = parse_instant(to)?;
                if start >= end {
                    bail!("--from ({}) must be before --to ({})", start, end);
                }
                Ok(TimeRange::range(start, end, timeline.instant_to_position(&start)))
            }
            (None, None, None) => Ok(timeline.initial_range(TimeMode::Single)),
            _ => bail!("--from and --to must be given together"),
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List the data sources and their color rules
    Sources,

    /// Classify a single reading against a source's rules
    Classify {
        /// The reading to classify
        #[arg(long, allow_hyphen_values = true)]
        value: f64,

        /// Data source id (defaults to the active source)
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Fetch, reduce and classify the weather at one point
    Query {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Data source id (defaults to the active source)
        #[arg(short, long)]
        source: Option<String>,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Classify every polygon in a GeoJSON file
    Regions {
        /// Path to a GeoJSON FeatureCollection, Feature or Polygon
        #[arg(short, long)]
        geojson: String,

        /// Data source id (defaults to the active source)
        #[arg(short, long)]
        source: Option<String>,

        #[command(flatten)]
        window: WindowArgs,
    },
}

pub async fn run(options: GlobalOptions, command: Command) -> anyhow::Result<()> {
    let registry = catalogue::load(options.rules.as_deref())?;
    let timeline = Timeline::new(TimelineConfig::default());
    match command {
        Command::Sources => catalogue::run_sources(&registry),
        Command::Classify { value, source } => {
            let registry = catalogue::with_active(registry, source.as_deref())?;
            catalogue::run_classify(&registry, value)
        }
        Command::Query {
            lat,
            lon,
            source,
            window,
        } => {
            let registry = catalogue::with_active(registry, source.as_deref())?;
            let range = window.time_range(&timeline)?;
            query::run_query(&options.client_config(), &registry, lat, lon, &range).await
        }
        Command::Regions {
            geojson,
            source,
            window,
        } => {
            let registry = catalogue::with_active(registry, source.as_deref())?;
            let range = window.time_range(&timeline)?;
            query::run_regions(&options.client_config(), registry, &geojson, range).await
        }
    }
}
