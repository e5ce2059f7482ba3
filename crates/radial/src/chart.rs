//! Per-instance chart state.
//!
//! A [`RadialChart`] is created for each configured chart and owns its data,
//! timeline and entrance state. Hosts feed it platform events and draw the
//! [`ChartFrame`]s it returns; nothing is shared between instances.

use serde::Serialize;
use tracing::debug;

use crate::axes::AxisScaffold;
use crate::config::ChartConfig;
use crate::domain::{Month, SeriesDataset};
use crate::entrance::{Baseline, Entrance};
use crate::error::{SetupOutcome, SkipReason};
use crate::ingest::ChartData;
use crate::playback::{Timeline, TimerCommand};
use crate::projection::{project_year, ChartGeometry, Polygon, Vertex};
use crate::tooltip::Tooltip;

/// One series drawn for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesShape {
    pub path_class: String,
    pub dot_class: String,
    pub polygon: Polygon,
}

/// Everything a host needs to redraw the chart for a year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    pub year: i32,
    pub shapes: Vec<SeriesShape>,
}

impl ChartFrame {
    pub fn label(&self) -> String {
        self.year.to_string()
    }

    /// Summed outline length of every series.
    pub fn outline_length(&self) -> f64 {
        self.shapes.iter().map(|shape| shape.polygon.perimeter()).sum()
    }

    pub fn tooltip(&self, series: usize, month: Month) -> Option<String> {
        let vertex = self.vertex(series, month)?;
        Some(Tooltip::text(month, self.year, vertex.value))
    }

    pub fn vertex(&self, series: usize, month: Month) -> Option<&Vertex> {
        self.shapes
            .get(series)
            .map(|shape| shape.polygon.vertex(month))
    }
}

#[derive(Debug, Clone)]
pub struct RadialChart {
    config: ChartConfig,
    geometry: ChartGeometry,
    data: ChartData,
    axes: Option<AxisScaffold>,
    timeline: Timeline,
    entrance: Entrance,
}

impl RadialChart {
    pub fn new(config: ChartConfig) -> Self {
        Self::with_geometry(config, ChartGeometry::default())
    }

    pub fn with_geometry(config: ChartConfig, geometry: ChartGeometry) -> Self {
        Self {
            config,
            geometry,
            data: ChartData::default(),
            axes: None,
            timeline: Timeline::new(Vec::new()),
            entrance: Entrance::new(),
        }
    }

    pub const fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub const fn geometry(&self) -> &ChartGeometry {
        &self.geometry
    }

    pub const fn data(&self) -> &ChartData {
        &self.data
    }

    pub const fn axes(&self) -> Option<&AxisScaffold> {
        self.axes.as_ref()
    }

    pub const fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub const fn entrance(&self) -> &Entrance {
        &self.entrance
    }

    pub fn entrance_mut(&mut self) -> &mut Entrance {
        &mut self.entrance
    }

    pub const fn is_loaded(&self) -> bool {
        self.axes.is_some()
    }

    /// Installs the parsed series, in configuration order. The axis scaffold
    /// is built on the first load that yields at least one year.
    pub fn load(&mut self, datasets: Vec<SeriesDataset>) -> SetupOutcome {
        self.data = ChartData::from_datasets(datasets);
        self.timeline = Timeline::new(self.data.years().to_vec());

        if self.data.is_empty() {
            debug!(chart = %self.config.svg_id, "no valid rows, chart left unrendered");
            return SetupOutcome::Skipped(SkipReason::NoData);
        }

        if self.axes.is_none() {
            self.axes = Some(AxisScaffold::build(&self.geometry));
        }

        debug!(
            chart = %self.config.svg_id,
            years = self.data.years().len(),
            global_max = self.data.global_max(),
            "chart loaded"
        );
        SetupOutcome::Mounted
    }

    /// Projects every series for `year`. Years outside the index yield
    /// nothing, matching a draw call that leaves the chart untouched.
    pub fn draw_year(&self, year: i32) -> Option<ChartFrame> {
        self.data.years().binary_search(&year).ok()?;

        let shapes = self
            .config
            .series
            .iter()
            .zip(self.data.datasets())
            .map(|(series, dataset)| SeriesShape {
                path_class: series.path_class.clone(),
                dot_class: series.dot_class.clone(),
                polygon: project_year(dataset, year, self.data.global_max(), &self.geometry),
            })
            .collect();

        Some(ChartFrame { year, shapes })
    }

    pub fn current_frame(&self) -> Option<ChartFrame> {
        self.draw_year(self.timeline.current_year()?)
    }

    pub fn toggle_play(&mut self) -> TimerCommand {
        self.timeline.toggle()
    }

    pub fn tick(&mut self) -> Option<ChartFrame> {
        let year = self.timeline.tick()?;
        self.draw_year(year)
    }

    pub fn scrub(&mut self, year: i32) -> (TimerCommand, Option<ChartFrame>) {
        let (command, year) = self.timeline.scrub(year);
        (command, year.and_then(|year| self.draw_year(year)))
    }

    pub fn step_back(&mut self) -> (TimerCommand, Option<ChartFrame>) {
        let (command, year) = self.timeline.previous();
        (command, year.and_then(|year| self.draw_year(year)))
    }

    pub fn step_forward(&mut self) -> (TimerCommand, Option<ChartFrame>) {
        let (command, year) = self.timeline.forward();
        (command, year.and_then(|year| self.draw_year(year)))
    }

    /// Arms the entrance from the current frame's outline length.
    pub fn arm_entrance(&mut self, measured_length: Option<f64>) -> Baseline {
        self.entrance.arm(measured_length)
    }

    pub fn teardown(&mut self) -> TimerCommand {
        self.timeline.teardown()
    }
}

#[cfg(test)]
mod tests {
    use super::RadialChart;
    use crate::config::ChartConfig;
    use crate::domain::{Month, Series};
    use crate::error::{SetupOutcome, SkipReason};
    use crate::ingest::parse_csv;
    use crate::playback::TimerCommand;

    fn config(series: usize) -> ChartConfig {
        ChartConfig {
            svg_id: "svg".to_string(),
            slider_id: "slider".to_string(),
            label_id: "label".to_string(),
            play_id: "play".to_string(),
            title: None,
            series: (0..series)
                .map(|index| Series::new(format!("series-{index}.csv")))
                .collect(),
        }
    }

    fn loaded() -> RadialChart {
        let (a, _) = parse_csv("year,month,pr\n2000,1,5\n2000,2,10\n2001,1,2\n").unwrap();
        let (b, _) = parse_csv("year,month,pr\n2002,7,4\n").unwrap();
        let mut chart = RadialChart::new(config(2));
        assert_eq!(chart.load(vec![a, b]), SetupOutcome::Mounted);
        chart
    }

    #[test]
    fn axes_exist_only_after_a_successful_load() {
        let mut chart = RadialChart::new(config(1));
        assert!(chart.axes().is_none());

        let (empty, _) = parse_csv("year,month,pr\n").unwrap();
        assert_eq!(
            chart.load(vec![empty]),
            SetupOutcome::Skipped(SkipReason::NoData)
        );
        assert!(!chart.is_loaded());
        assert!(chart.current_frame().is_none());
    }

    #[test]
    fn frame_draws_series_in_configuration_order() {
        let chart = loaded();
        let frame = chart.current_frame().unwrap();

        assert_eq!(frame.year, 2000);
        assert_eq!(frame.shapes.len(), 2);
        assert_eq!(frame.shapes[0].path_class, "radial-path");
        assert!((frame.shapes[0].polygon.vertex(Month::February).radius - 140.0).abs() < 1e-9);
        assert!(frame.shapes[1]
            .polygon
            .vertices()
            .iter()
            .all(|vertex| vertex.radius == 0.0));
    }

    #[test]
    fn unknown_year_does_not_draw() {
        assert!(loaded().draw_year(1999).is_none());
    }

    #[test]
    fn scrub_while_playing_stops_then_redraws() {
        let mut chart = loaded();
        assert!(matches!(chart.toggle_play(), TimerCommand::Start(_)));

        let (command, frame) = chart.scrub(2002);
        assert_eq!(command, TimerCommand::Stop);
        assert_eq!(frame.unwrap().year, 2002);
        assert!(!chart.timeline().is_playing());
    }

    #[test]
    fn ticks_cycle_through_the_union_of_years() {
        let mut chart = loaded();
        let years: Vec<i32> = (0..4).filter_map(|_| chart.tick()).map(|frame| frame.year).collect();
        assert_eq!(years, vec![2001, 2002, 2000, 2001]);
    }

    #[test]
    fn tooltip_reads_the_vertex_value() {
        let frame = loaded().current_frame().unwrap();
        assert_eq!(
            frame.tooltip(0, Month::January).as_deref(),
            Some("Jan 2000: 5000.00 mm/day")
        );
        assert!(frame.tooltip(5, Month::January).is_none());
    }
}
