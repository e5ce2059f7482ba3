//! Asynchronous CSV loading, one task per chart.

use std::path::PathBuf;

use monsoon_radial::{parse_csv, ChartConfig, IngestError, ParseReport, SeriesDataset};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::config::{resolve_data_path, AppConfig};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: IngestError,
    },
}

/// Parsed series of one chart, in configuration order.
#[derive(Debug, Clone)]
pub struct LoadedChart {
    pub datasets: Vec<SeriesDataset>,
    pub reports: Vec<ParseReport>,
}

#[derive(Debug)]
pub struct LoadEvent {
    pub chart: usize,
    pub result: Result<LoadedChart, LoadError>,
}

/// Reads and parses every series of a chart. Any failing series fails the
/// whole chart; other charts are unaffected.
pub async fn load_chart(data_dir: PathBuf, chart: ChartConfig) -> Result<LoadedChart, LoadError> {
    let mut datasets = Vec::with_capacity(chart.series.len());
    let mut reports = Vec::with_capacity(chart.series.len());

    for series in &chart.series {
        let path = resolve_data_path(&data_dir, &series.csv_file);
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| LoadError::Read {
                path: path.clone(),
                source,
            })?;

        let (dataset, report) =
            parse_csv(&text).map_err(|source| LoadError::Parse { path: path.clone(), source })?;

        debug!(
            path = %path.display(),
            accepted = report.accepted,
            discarded = report.discarded,
            "series parsed"
        );
        datasets.push(dataset);
        reports.push(report);
    }

    Ok(LoadedChart { datasets, reports })
}

/// Starts one loader task per configured chart. Results arrive in completion
/// order, tagged with the chart index.
pub fn spawn_loaders(config: &AppConfig) -> mpsc::UnboundedReceiver<LoadEvent> {
    let (sender, receiver) = mpsc::unbounded_channel();

    for (index, chart) in config.page.charts.iter().cloned().enumerate() {
        let sender = sender.clone();
        let data_dir = config.data_dir.clone();
        tokio::spawn(async move {
            let svg_id = chart.svg_id.clone();
            let result = load_chart(data_dir, chart).await;
            if let Err(e) = &result {
                error!(chart = %svg_id, "CSV failed: {e}");
            }
            // The receiver is gone only when the app is shutting down.
            let _ = sender.send(LoadEvent {
                chart: index,
                result,
            });
        });
    }

    receiver
}

#[cfg(test)]
mod tests {
    use super::{load_chart, LoadError};
    use monsoon_radial::{ChartConfig, Series};
    use std::io::Write;

    fn chart(files: &[&str]) -> ChartConfig {
        ChartConfig {
            svg_id: "svg".to_string(),
            slider_id: "slider".to_string(),
            label_id: "label".to_string(),
            play_id: "play".to_string(),
            title: None,
            series: files.iter().map(|file| Series::new(*file)).collect(),
        }
    }

    #[tokio::test]
    async fn loads_series_in_configuration_order() {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in [("b.csv", "year,month,pr\n2001,1,2\n"), ("a.csv", "year,month,pr\n2000,1,1\n")] {
            let mut file = std::fs::File::create(dir.path().join(name)).unwrap();
            file.write_all(body.as_bytes()).unwrap();
        }

        let loaded = load_chart(dir.path().to_path_buf(), chart(&["b.csv", "a.csv"]))
            .await
            .unwrap();

        assert_eq!(loaded.datasets.len(), 2);
        assert_eq!(loaded.datasets[0].years().collect::<Vec<_>>(), vec![2001]);
        assert_eq!(loaded.datasets[1].years().collect::<Vec<_>>(), vec![2000]);
        assert_eq!(loaded.reports[0].accepted, 1);
    }

    #[tokio::test]
    async fn missing_file_fails_the_chart() {
        let dir = tempfile::tempdir().unwrap();
        let error = load_chart(dir.path().to_path_buf(), chart(&["missing.csv"]))
            .await
            .unwrap_err();

        assert!(matches!(error, LoadError::Read { ref path, .. } if path.ends_with("missing.csv")));
    }

    #[tokio::test]
    async fn headerless_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.csv"), "year\n2000\n").unwrap();

        let error = load_chart(dir.path().to_path_buf(), chart(&["bad.csv"]))
            .await
            .unwrap_err();
        assert!(matches!(error, LoadError::Parse { .. }));
    }
}
