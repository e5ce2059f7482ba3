use std::sync::Mutex;
use std::time::{Duration, Instant};

use monsoon_radial::entrance::{advance_clock, ClockMode, EntranceCommand, FILL_DURATION};
use monsoon_radial::{
    ChartConfig, ChartFrame, Month, ParseReport, RadialChart, SetupOutcome, TimerCommand,
};
use ratatui::style::Color;
use tachyonfx::{fx, Effect, Interpolation};
use throbber_widgets_tui::ThrobberState;
use tracing::{debug, info};

use crate::app::input::helpers::{wrap_decrement, wrap_increment};
use monsoon_radial_tui::config::AppConfig;
use monsoon_radial_tui::loader::LoadEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelStatus {
    Loading,
    Ready,
    Empty,
    Failed(String),
}

/// Live playback interval, tracked on the app clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTimer {
    pub next: Duration,
    pub interval: Duration,
}

pub struct ChartPanel {
    pub chart: RadialChart,
    pub status: PanelStatus,
    pub reports: Vec<ParseReport>,
    pub timer: Option<PlaybackTimer>,
    pub month_cursor: Month,
    pub fill_fx: Mutex<Option<Effect>>,
    fade_pending: bool,
}

impl ChartPanel {
    pub fn new(config: ChartConfig) -> Self {
        Self {
            chart: RadialChart::new(config),
            status: PanelStatus::Loading,
            reports: Vec::new(),
            timer: None,
            month_cursor: Month::January,
            fill_fx: Mutex::new(None),
            fade_pending: false,
        }
    }

    pub fn title(&self) -> &str {
        self.chart.config().title()
    }

    pub fn frame(&self) -> Option<ChartFrame> {
        self.chart.current_frame()
    }

    /// Tooltip lines for the month under the cursor, one per series.
    pub fn tooltips(&self) -> Vec<String> {
        let Some(frame) = self.frame() else {
            return Vec::new();
        };
        (0..frame.shapes.len())
            .filter_map(|series| frame.tooltip(series, self.month_cursor))
            .collect()
    }

    pub fn apply_timer(&mut self, command: TimerCommand, now: Duration) {
        match command {
            TimerCommand::Start(interval) => {
                self.timer = Some(PlaybackTimer {
                    next: now + interval,
                    interval,
                });
            }
            TimerCommand::Stop => self.timer = None,
            TimerCommand::None => {}
        }
    }

    fn apply_entrance(&mut self, command: EntranceCommand) {
        match command {
            EntranceCommand::Start(_) => self.fade_pending = true,
            EntranceCommand::Reset => {
                self.fade_pending = false;
                if let Ok(effect) = self.fill_fx.get_mut() {
                    *effect = None;
                }
            }
            EntranceCommand::None => {}
        }
    }

    /// Visible tab: the whole canvas is on screen.
    pub fn show(&mut self, now: Duration) {
        let command = self.chart.entrance_mut().on_visibility(1.0, true, now);
        self.apply_entrance(command);
    }

    pub fn hide(&mut self, now: Duration) {
        let command = self.chart.entrance_mut().on_visibility(0.0, false, now);
        self.apply_entrance(command);
    }

    pub fn update(&mut self, now: Duration) {
        let command = self.chart.entrance_mut().resume(now);
        self.apply_entrance(command);

        if let Some(timer) = self.timer {
            if now >= timer.next {
                self.chart.tick();
                self.timer = Some(PlaybackTimer {
                    next: now + timer.interval,
                    ..timer
                });
            }
        }

        if self.fade_pending && self.chart.entrance().is_filling(now) {
            self.fade_pending = false;
            if let Ok(effect) = self.fill_fx.get_mut() {
                *effect = Some(fill_fade());
            }
        }

        if let Ok(effect) = self.fill_fx.get_mut() {
            if effect.as_ref().is_some_and(Effect::done) {
                *effect = None;
            }
        }
    }

    pub fn teardown(&mut self, now: Duration) {
        let command = self.chart.teardown();
        self.apply_timer(command, now);
    }
}

fn fill_fade() -> Effect {
    let millis = u32::try_from(FILL_DURATION.as_millis()).unwrap_or(u32::MAX);
    fx::fade_from_fg(Color::Black, (millis, Interpolation::QuadOut))
}

pub struct App {
    pub running: bool,
    pub panels: Vec<ChartPanel>,
    pub selected: usize,
    pub show_help: bool,
    pub status_message: String,
    pub started: Instant,
    pub clock: Duration,
    pub last_wall: Option<Duration>,
    pub last_tick: Duration,
    pub clock_mode: ClockMode,
    pub throbber: ThrobberState,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            running: true,
            panels: config
                .page
                .charts
                .iter()
                .cloned()
                .map(ChartPanel::new)
                .collect(),
            selected: 0,
            show_help: false,
            status_message: String::new(),
            started: Instant::now(),
            clock: Duration::ZERO,
            last_wall: None,
            last_tick: Duration::ZERO,
            clock_mode: ClockMode::Running,
            throbber: ThrobberState::default(),
        }
    }

    pub const fn now(&self) -> Duration {
        self.clock
    }

    pub fn selected_panel(&self) -> Option<&ChartPanel> {
        self.panels.get(self.selected)
    }

    fn selected_panel_mut(&mut self) -> Option<&mut ChartPanel> {
        self.panels.get_mut(self.selected)
    }

    pub fn update(&mut self) {
        self.advance_to(self.started.elapsed());
    }

    /// Moves the app clock to `wall` and runs every panel's timers.
    pub fn advance_to(&mut self, wall: Duration) {
        let previous = self.clock;
        let (clock, last_wall) = advance_clock(self.clock, self.last_wall, wall, self.clock_mode);
        self.clock = clock;
        self.last_wall = last_wall;
        self.last_tick = clock.saturating_sub(previous);

        if self.clock_mode == ClockMode::Running {
            self.throbber.calc_next();
        }

        for panel in &mut self.panels {
            panel.update(clock);
        }
    }

    pub fn on_loaded(&mut self, event: LoadEvent) {
        let now = self.clock;
        let selected = event.chart == self.selected;
        let Some(panel) = self.panels.get_mut(event.chart) else {
            return;
        };

        match event.result {
            Ok(loaded) => {
                panel.reports = loaded.reports;
                match panel.chart.load(loaded.datasets) {
                    SetupOutcome::Mounted => {
                        panel.status = PanelStatus::Ready;
                        let length = panel.frame().map(|frame| frame.outline_length());
                        panel.chart.arm_entrance(length);
                        if selected {
                            panel.show(now);
                        }
                    }
                    SetupOutcome::Skipped(reason) => {
                        info!(chart = %panel.chart.config().svg_id, "chart skipped: {reason}");
                        panel.status = PanelStatus::Empty;
                    }
                }
            }
            Err(e) => {
                self.status_message = format!("Error: {e}");
                panel.status = PanelStatus::Failed(e.to_string());
            }
        }
    }

    pub fn select_tab(&mut self, index: usize) {
        if index >= self.panels.len() || index == self.selected {
            return;
        }
        let now = self.clock;
        if let Some(panel) = self.panels.get_mut(self.selected) {
            panel.hide(now);
        }
        self.selected = index;
        if let Some(panel) = self.panels.get_mut(index) {
            panel.show(now);
        }
        debug!(tab = index, "tab selected");
    }

    pub fn next_tab(&mut self) {
        self.select_tab(wrap_increment(self.selected, self.panels.len()));
    }

    pub fn previous_tab(&mut self) {
        self.select_tab(wrap_decrement(self.selected, self.panels.len()));
    }

    pub fn toggle_play(&mut self) {
        let now = self.clock;
        if let Some(panel) = self.selected_panel_mut() {
            if panel.chart.timeline().years().is_empty() {
                return;
            }
            let command = panel.chart.toggle_play();
            panel.apply_timer(command, now);
        }
    }

    pub fn step_back(&mut self) {
        let now = self.clock;
        if let Some(panel) = self.selected_panel_mut() {
            let (command, _) = panel.chart.step_back();
            panel.apply_timer(command, now);
        }
    }

    pub fn step_forward(&mut self) {
        let now = self.clock;
        if let Some(panel) = self.selected_panel_mut() {
            let (command, _) = panel.chart.step_forward();
            panel.apply_timer(command, now);
        }
    }

    pub fn jump_first(&mut self) {
        let now = self.clock;
        if let Some(panel) = self.selected_panel_mut() {
            if let Some(year) = panel.chart.timeline().first_year() {
                let (command, _) = panel.chart.scrub(year);
                panel.apply_timer(command, now);
            }
        }
    }

    pub fn jump_last(&mut self) {
        let now = self.clock;
        if let Some(panel) = self.selected_panel_mut() {
            if let Some(year) = panel.chart.timeline().last_year() {
                let (command, _) = panel.chart.scrub(year);
                panel.apply_timer(command, now);
            }
        }
    }

    pub fn next_month(&mut self) {
        if let Some(panel) = self.selected_panel_mut() {
            let index = wrap_increment(panel.month_cursor.index(), Month::ALL.len());
            panel.month_cursor = Month::ALL[index];
        }
    }

    pub fn previous_month(&mut self) {
        if let Some(panel) = self.selected_panel_mut() {
            let index = wrap_decrement(panel.month_cursor.index(), Month::ALL.len());
            panel.month_cursor = Month::ALL[index];
        }
    }

    /// Leave and re-enter the viewport; a reveal still running is not cut.
    pub fn replay_entrance(&mut self) {
        let now = self.clock;
        if let Some(panel) = self.selected_panel_mut() {
            if panel.chart.entrance().is_animating(now) {
                return;
            }
            panel.hide(now);
            panel.show(now);
        }
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.clock_mode = if focused {
            ClockMode::Running
        } else {
            ClockMode::Paused
        };
    }

    pub fn teardown(&mut self) {
        let now = self.clock;
        for panel in &mut self.panels {
            panel.teardown(now);
        }
    }
}
