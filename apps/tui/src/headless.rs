//! Non-interactive mode: dataset statistics and SVG export.

use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use monsoon_radial::svg::render_document;
use monsoon_radial::tooltip::DISPLAY_SCALE;
use monsoon_radial::{ParseReport, RadialChart, SeriesDataset, SetupOutcome};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::loader::load_chart;

#[derive(Debug, Clone, Default)]
pub struct HeadlessOptions {
    pub json: bool,
    pub export_dir: Option<PathBuf>,
    pub year: Option<i32>,
}

/// One configured chart after its load attempt.
#[derive(Debug)]
pub struct PageEntry {
    pub chart: RadialChart,
    pub reports: Vec<ParseReport>,
    pub error: Option<String>,
    pub outcome: Option<SetupOutcome>,
}

/// Run the application in headless mode (no UI)
pub async fn run_headless(config: &AppConfig, options: &HeadlessOptions) -> Result<()> {
    let entries = load_page(config).await;
    let stats = build_headless_stats(&entries);

    if options.json {
        render_headless_json(&stats)?;
    } else {
        render_headless_stats(&stats);
    }

    if let Some(dir) = &options.export_dir {
        let written = export_svgs(dir, &entries, options.year).await?;
        if !options.json {
            println!("\nWrote {written} SVG file(s) to {}", dir.display());
        }
    }

    Ok(())
}

pub async fn load_page(config: &AppConfig) -> Vec<PageEntry> {
    let mut entries = Vec::with_capacity(config.page.charts.len());

    for chart_config in &config.page.charts {
        let mut chart = RadialChart::new(chart_config.clone());
        let entry = match load_chart(config.data_dir.clone(), chart_config.clone()).await {
            Ok(loaded) => {
                let outcome = chart.load(loaded.datasets);
                PageEntry {
                    chart,
                    reports: loaded.reports,
                    error: None,
                    outcome: Some(outcome),
                }
            }
            Err(e) => {
                warn!(chart = %chart_config.svg_id, "CSV failed: {e}");
                PageEntry {
                    chart,
                    reports: Vec::new(),
                    error: Some(e.to_string()),
                    outcome: None,
                }
            }
        };
        entries.push(entry);
    }

    entries
}

fn render_headless_stats(stats: &HeadlessStats) {
    println!("\nMonsoon Radial Stats");
    println!("====================");

    for chart in &stats.charts {
        println!("\n{} ({})", chart.title, chart.id);
        println!("Status: {}", chart.status);

        if let Some(error) = &chart.error {
            println!("Error: {error}");
            continue;
        }

        if let (Some(first), Some(last)) = (chart.first_year, chart.last_year) {
            println!("Years: {first}-{last} ({} indexed)", chart.years);
        }
        println!("Global max: {:.2} mm/day", chart.global_max_mm);

        println!("Series:");
        for series in &chart.series {
            let layout = if series.positional { "positional" } else { "named" };
            println!(
                "- {} | {} rows | {} discarded | {layout} columns",
                series.file, series.accepted, series.discarded
            );
            if let Some(peak) = &series.wettest {
                println!(
                    "  wettest: {} {} at {:.2} mm/day",
                    peak.month, peak.year, peak.value_mm
                );
            }
        }
    }
}

fn render_headless_json(stats: &HeadlessStats) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)?;
    println!("{json}");
    Ok(())
}

pub fn build_headless_stats(entries: &[PageEntry]) -> HeadlessStats {
    let charts = entries
        .iter()
        .map(|entry| {
            let config = entry.chart.config();
            let data = entry.chart.data();
            let status = match (&entry.error, &entry.outcome) {
                (Some(_), _) => "failed",
                (None, Some(SetupOutcome::Mounted)) => "ok",
                (None, _) => "empty",
            };

            let series = config
                .series
                .iter()
                .zip(&entry.reports)
                .zip(data.datasets())
                .map(|((series, report), dataset)| HeadlessSeries {
                    file: series.csv_file.clone(),
                    accepted: report.accepted,
                    discarded: report.discarded,
                    positional: report.layout.positional,
                    wettest: wettest_month(dataset),
                })
                .collect();

            HeadlessChart {
                id: config.svg_id.clone(),
                title: config.title().to_string(),
                status: status.to_string(),
                error: entry.error.clone(),
                first_year: data.first_year(),
                last_year: data.last_year(),
                years: data.years().len(),
                global_max_mm: data.global_max() * DISPLAY_SCALE,
                series,
            }
        })
        .collect();

    HeadlessStats { charts }
}

fn wettest_month(dataset: &SeriesDataset) -> Option<HeadlessPeak> {
    dataset
        .records()
        .filter_map(|(year, record)| record.wettest().map(|(month, value)| (year, month, value)))
        .fold(None, |best: Option<(i32, monsoon_radial::Month, f64)>, candidate| match best {
            Some(best) if best.2 >= candidate.2 => Some(best),
            _ => Some(candidate),
        })
        .map(|(year, month, value)| HeadlessPeak {
            year,
            month: month.label().to_string(),
            value_mm: value * DISPLAY_SCALE,
        })
}

/// Writes `<svgId>-<year>.svg` for every indexed year, or only `year`.
pub async fn export_svgs(dir: &Path, entries: &[PageEntry], year: Option<i32>) -> Result<usize> {
    tokio::fs::create_dir_all(dir)
        .await
        .wrap_err_with(|| format!("Failed to create {}", dir.display()))?;

    let mut written = 0;
    for entry in entries {
        let chart = &entry.chart;
        let Some(axes) = chart.axes() else {
            continue;
        };

        let years: Vec<i32> = match year {
            Some(year) if chart.data().years().contains(&year) => vec![year],
            Some(year) => {
                warn!(chart = %chart.config().svg_id, year, "year not in chart data, skipping export");
                Vec::new()
            }
            None => chart.data().years().to_vec(),
        };

        for year in years {
            let Some(frame) = chart.draw_year(year) else {
                continue;
            };
            let path = dir.join(format!("{}-{year}.svg", chart.config().svg_id));
            let document = render_document(chart.geometry(), axes, &frame);
            tokio::fs::write(&path, document)
                .await
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            written += 1;
        }
    }

    info!(written, dir = %dir.display(), "SVG export finished");
    Ok(written)
}

#[derive(Debug, serde::Serialize)]
pub struct HeadlessStats {
    pub charts: Vec<HeadlessChart>,
}

#[derive(Debug, serde::Serialize)]
pub struct HeadlessChart {
    pub id: String,
    pub title: String,
    pub status: String,
    pub error: Option<String>,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub years: usize,
    pub global_max_mm: f64,
    pub series: Vec<HeadlessSeries>,
}

#[derive(Debug, serde::Serialize)]
pub struct HeadlessSeries {
    pub file: String,
    pub accepted: usize,
    pub discarded: usize,
    pub positional: bool,
    pub wettest: Option<HeadlessPeak>,
}

#[derive(Debug, serde::Serialize)]
pub struct HeadlessPeak {
    pub year: i32,
    pub month: String,
    pub value_mm: f64,
}

#[cfg(test)]
mod tests {
    use super::{build_headless_stats, export_svgs, load_page};
    use crate::config::AppConfig;
    use monsoon_radial::{ChartConfig, PageConfig, Series};

    fn config(dir: &std::path::Path) -> AppConfig {
        let chart = |id: &str, file: &str| ChartConfig {
            svg_id: id.to_string(),
            slider_id: format!("{id}-slider"),
            label_id: format!("{id}-label"),
            play_id: format!("{id}-play"),
            title: None,
            series: vec![Series::new(file)],
        };

        AppConfig {
            page: PageConfig {
                charts: vec![chart("historic", "historic.csv"), chart("missing", "missing.csv")],
            },
            data_dir: dir.to_path_buf(),
            log_file: dir.join("test.log"),
        }
    }

    fn write_fixture(dir: &std::path::Path) {
        std::fs::write(
            dir.join("historic.csv"),
            "year,month,pr\n2000,7,0.012\n2000,8,0.010\n2001,7,0.009\n2001,x,1\n",
        )
        .unwrap();
    }

    #[tokio::test]
    async fn stats_cover_loaded_and_failed_charts() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());

        let entries = load_page(&config(dir.path())).await;
        let stats = build_headless_stats(&entries);

        let historic = &stats.charts[0];
        assert_eq!(historic.status, "ok");
        assert_eq!(historic.years, 2);
        assert!((historic.global_max_mm - 12.0).abs() < 1e-9);
        assert_eq!(historic.series[0].discarded, 1);
        let peak = historic.series[0].wettest.as_ref().unwrap();
        assert_eq!((peak.year, peak.month.as_str()), (2000, "Jul"));

        let missing = &stats.charts[1];
        assert_eq!(missing.status, "failed");
        assert!(missing.error.as_deref().unwrap().contains("missing.csv"));
        assert!(missing.series.is_empty());
    }

    #[tokio::test]
    async fn export_writes_one_file_per_year() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        let entries = load_page(&config(dir.path())).await;

        let out = dir.path().join("svg");
        assert_eq!(export_svgs(&out, &entries, None).await.unwrap(), 2);
        assert!(out.join("historic-2000.svg").exists());
        assert!(out.join("historic-2001.svg").exists());

        let only = dir.path().join("only");
        assert_eq!(export_svgs(&only, &entries, Some(2001)).await.unwrap(), 1);
        assert_eq!(export_svgs(&only, &entries, Some(1800)).await.unwrap(), 0);
    }
}
