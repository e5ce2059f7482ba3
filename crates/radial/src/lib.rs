//! Radial precipitation chart engine.
//!
//! Parses monthly precipitation CSVs, projects each year onto a twelve-spoke
//! polar frame and tracks the playback and entrance timelines of every chart
//! instance. Rendering surfaces (terminal canvas, browser SVG) live in the
//! host applications.

pub mod axes;
pub mod chart;
pub mod config;
pub mod domain;
pub mod entrance;
pub mod error;
pub mod ingest;
pub mod playback;
pub mod projection;
pub mod svg;
pub mod tooltip;

pub use chart::{ChartFrame, RadialChart, SeriesShape};
pub use config::{ChartConfig, PageConfig};
pub use domain::{Month, Series, SeriesDataset, YearRecord};
pub use error::{ConfigError, IngestError, SetupOutcome, SkipReason};
pub use ingest::{parse_csv, read_csv, read_csv_file, ChartData, ParseReport};
pub use playback::{PlaybackState, Timeline, TimerCommand, PLAYBACK_INTERVAL};
