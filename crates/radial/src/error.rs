use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("CSV header has {found} column(s); year, month and pr are required")]
    MissingColumns { found: usize },

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid chart configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("chart `{svg_id}` has no series")]
    NoSeries { svg_id: String },

    #[error("duplicate chart id `{0}`")]
    DuplicateChart(String),
}

/// Why a chart host declined to mount a chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingElement(String),
    NoData,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingElement(id) => write!(f, "element #{id} not found"),
            Self::NoData => write!(f, "no valid rows in any series"),
        }
    }
}

/// Result of binding a chart to its host surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupOutcome {
    Mounted,
    Skipped(SkipReason),
}

impl SetupOutcome {
    pub const fn is_mounted(&self) -> bool {
        matches!(self, Self::Mounted)
    }
}
