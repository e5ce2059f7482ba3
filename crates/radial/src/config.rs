use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::Series;
use crate::error::ConfigError;

/// Element bindings and data sources of one chart instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    pub svg_id: String,
    pub slider_id: String,
    pub label_id: String,
    pub play_id: String,
    pub title: Option<String>,
    pub series: Vec<Series>,
}

impl ChartConfig {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.svg_id)
    }

    /// Ids of every element the chart binds to, in binding order.
    pub fn element_ids(&self) -> [&str; 4] {
        [&self.svg_id, &self.slider_id, &self.label_id, &self.play_id]
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChartConfig {
    svg_id: String,
    slider_id: String,
    label_id: String,
    play_id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    series: Vec<Series>,
    /// Single-series shorthand kept for older page scripts.
    #[serde(default)]
    csv_file: Option<String>,
}

impl TryFrom<RawChartConfig> for ChartConfig {
    type Error = ConfigError;

    fn try_from(raw: RawChartConfig) -> Result<Self, Self::Error> {
        let mut series = raw.series;
        if let Some(csv_file) = raw.csv_file {
            series.insert(0, Series::new(csv_file));
        }
        if series.is_empty() {
            return Err(ConfigError::NoSeries { svg_id: raw.svg_id });
        }

        Ok(Self {
            svg_id: raw.svg_id,
            slider_id: raw.slider_id,
            label_id: raw.label_id,
            play_id: raw.play_id,
            title: raw.title,
            series,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPageConfig {
    Charts(Vec<RawChartConfig>),
    Page { charts: Vec<RawChartConfig> },
}

/// Every chart mounted on one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageConfig {
    pub charts: Vec<ChartConfig>,
}

impl PageConfig {
    /// Accepts either `{"charts": [...]}` or a bare array of charts.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let raw = match serde_json::from_str::<RawPageConfig>(text)? {
            RawPageConfig::Charts(charts) | RawPageConfig::Page { charts } => charts,
        };

        let mut seen = HashSet::new();
        let charts = raw
            .into_iter()
            .map(ChartConfig::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        for chart in &charts {
            if !seen.insert(chart.svg_id.clone()) {
                return Err(ConfigError::DuplicateChart(chart.svg_id.clone()));
            }
        }

        Ok(Self { charts })
    }

    /// Indian Summer Monsoon charts, historic and projected.
    pub fn monsoon_default() -> Self {
        Self {
            charts: vec![
                ChartConfig {
                    svg_id: "ism-radial-svg".to_string(),
                    slider_id: "ism-year-slider".to_string(),
                    label_id: "ism-year-label".to_string(),
                    play_id: "ism-play".to_string(),
                    title: Some("ISM historic".to_string()),
                    series: vec![Series::new("ISM_historic.csv")],
                },
                ChartConfig {
                    svg_id: "ism-future-radial-svg".to_string(),
                    slider_id: "ism-future-year-slider".to_string(),
                    label_id: "ism-future-year-label".to_string(),
                    play_id: "ism-future-play".to_string(),
                    title: Some("ISM future".to_string()),
                    series: vec![Series::new("ISM_future.csv")
                        .with_classes("radial-path radial-path--future", "radial-dot radial-dot--future")],
                },
            ],
        }
    }
}
