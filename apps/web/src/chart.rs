//! One chart instance bound to its page elements.
//!
//! The host owns every browser resource of its chart: the playback interval,
//! the reveal timeouts, the intersection observer and the event listeners.
//! Callbacks hold a weak handle, so dropping the host releases all of them.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use monsoon_radial::entrance::{Baseline, EntranceCommand, EntranceFrame, EntranceSchedule};
use monsoon_radial::{
    parse_csv, ChartConfig, ChartFrame, RadialChart, SeriesDataset, SetupOutcome, SkipReason,
    TimerCommand,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{console, Document, Element, Event, EventTarget, MouseEvent};

use crate::animation::{self, EntranceTimers, VisibilityWatch};
use crate::dom::{self, ChartElements};
use crate::fetch::fetch_text;
use crate::playback::PlaybackTimer;
use crate::render::{append_axes, SvgLayers, TOOLTIP_ATTR};
use crate::tooltip::SharedTooltip;

pub type SharedHost = Rc<RefCell<ChartHost>>;

pub enum MountError {
    Skipped(SkipReason),
    Js(JsValue),
}

impl From<JsValue> for MountError {
    fn from(value: JsValue) -> Self {
        Self::Js(value)
    }
}

type Listener = Closure<dyn FnMut(Event)>;

/// Timeouts are rounded down to whole milliseconds.
const RELEASE_MARGIN: Duration = Duration::from_millis(1);

pub struct ChartHost {
    this: Weak<RefCell<ChartHost>>,
    document: Document,
    chart: RadialChart,
    elements: ChartElements,
    tooltip: SharedTooltip,
    layers: Option<SvgLayers>,
    lengths: Option<Vec<f64>>,
    timer: PlaybackTimer,
    entrance_timers: EntranceTimers,
    release_timer: EntranceTimers,
    visibility: Option<VisibilityWatch>,
    listeners: Vec<Listener>,
}

/// Time since page load, from the high-resolution page clock.
fn now() -> Duration {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| Duration::from_secs_f64(performance.now().max(0.0) / 1000.0))
        .unwrap_or_default()
}

/// Runs `f` on a live, unborrowed host and reports its error to the console.
fn with_host(this: &Weak<RefCell<ChartHost>>, f: impl FnOnce(&mut ChartHost) -> Result<(), JsValue>) {
    let Some(host) = this.upgrade() else {
        return;
    };
    let Ok(mut host) = host.try_borrow_mut() else {
        return;
    };
    if let Err(e) = f(&mut host) {
        console::error_1(&e);
    }
}

/// Binds a chart to its elements, wires its controls and starts loading its
/// series in the background.
pub fn mount(
    document: &Document,
    config: ChartConfig,
    tooltip: SharedTooltip,
) -> Result<SharedHost, MountError> {
    let elements = dom::bind(document, &config).map_err(MountError::Skipped)?;
    let chart = RadialChart::new(config.clone());
    elements
        .svg
        .set_attribute("viewBox", &chart.geometry().view_box())?;

    let host = Rc::new_cyclic(|this| {
        RefCell::new(ChartHost {
            this: this.clone(),
            document: document.clone(),
            chart,
            elements,
            tooltip,
            layers: None,
            lengths: None,
            timer: PlaybackTimer::default(),
            entrance_timers: EntranceTimers::default(),
            release_timer: EntranceTimers::default(),
            visibility: None,
            listeners: Vec::new(),
        })
    });

    host.borrow_mut().wire_controls()?;
    spawn_local(load(Rc::downgrade(&host), config));
    Ok(host)
}

/// Fetches every series in configuration order. A failing series leaves the
/// chart unrendered.
async fn load(host: Weak<RefCell<ChartHost>>, config: ChartConfig) {
    let mut datasets = Vec::with_capacity(config.series.len());
    for series in &config.series {
        let parsed = match fetch_text(&series.csv_file).await {
            Ok(text) => parse_csv(&text).map_err(|e| JsValue::from_str(&e.to_string())),
            Err(e) => Err(e),
        };
        match parsed {
            Ok((dataset, report)) => {
                console::debug_1(&JsValue::from_str(&format!(
                    "{}: {} rows accepted, {} discarded",
                    series.csv_file, report.accepted, report.discarded
                )));
                datasets.push(dataset);
            }
            Err(e) => {
                console::error_2(&JsValue::from_str("CSV failed"), &e);
                return;
            }
        }
    }

    with_host(&host, |host| host.install(datasets));
}

impl ChartHost {
    pub fn svg_id(&self) -> &str {
        &self.chart.config().svg_id
    }

    fn listen(
        &mut self,
        target: &EventTarget,
        kind: &str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        let listener: Listener = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(kind, listener.as_ref().unchecked_ref())?;
        self.listeners.push(listener);
        Ok(())
    }

    fn wire_controls(&mut self) -> Result<(), JsValue> {
        let slider: EventTarget = self.elements.slider.clone().into();
        let this = self.this.clone();
        self.listen(&slider, "input", move |_| {
            with_host(&this, ChartHost::on_slider_input);
        })?;

        let play: EventTarget = self.elements.play.clone().into();
        let this = self.this.clone();
        self.listen(&play, "click", move |_| {
            with_host(&this, ChartHost::on_play_click);
        })?;

        // Dots are rebuilt on every redraw, so tooltips are delegated to the svg.
        let svg: EventTarget = self.elements.svg.clone().into();
        for kind in ["mouseover", "mousemove"] {
            let tooltip = self.tooltip.clone();
            self.listen(&svg, kind, move |event| show_tooltip(&tooltip, &event))?;
        }
        let tooltip = self.tooltip.clone();
        self.listen(&svg, "mouseleave", move |_| {
            if let Err(e) = tooltip.hide() {
                console::error_1(&e);
            }
        })?;
        Ok(())
    }

    fn install(&mut self, datasets: Vec<SeriesDataset>) -> Result<(), JsValue> {
        if let SetupOutcome::Skipped(reason) = self.chart.load(datasets) {
            console::debug_1(&JsValue::from_str(&format!("{}: {reason}", self.svg_id())));
            return Ok(());
        }
        let Some(axes) = self.chart.axes() else {
            return Ok(());
        };

        append_axes(&self.document, &self.elements.svg, axes)?;
        self.layers = Some(SvgLayers::create(
            &self.document,
            &self.elements.svg,
            &self.chart.config().series,
        )?);

        let timeline = self.chart.timeline();
        if let (Some(first), Some(last)) = (timeline.first_year(), timeline.last_year()) {
            self.elements.slider.set_min(&first.to_string());
            self.elements.slider.set_max(&last.to_string());
            self.elements.slider.set_step("1");
        }
        self.update_play_label();

        if let Some(frame) = self.chart.current_frame() {
            self.redraw(&frame)?;
        }

        let this = self.this.clone();
        self.visibility = Some(VisibilityWatch::observe(
            &self.elements.svg,
            move |ratio, intersecting| {
                with_host(&this, |host| host.on_visibility(ratio, intersecting));
            },
        )?);
        Ok(())
    }

    fn redraw(&mut self, frame: &ChartFrame) -> Result<(), JsValue> {
        let label = frame.label();
        self.elements.label.set_text_content(Some(&label));
        self.elements.slider.set_value(&label);

        let Some(layers) = &self.layers else {
            return Ok(());
        };
        layers.draw(&self.document, frame, self.chart.geometry().dot_radius)?;
        self.sync_entrance()
    }

    /// Brings freshly drawn nodes in line with the reveal.
    fn sync_entrance(&mut self) -> Result<(), JsValue> {
        let now = now();
        self.chart.entrance_mut().poll(now);
        let Some(layers) = &self.layers else {
            return Ok(());
        };

        let entrance = self.chart.entrance();
        let frame = entrance.frame_at(now);
        if entrance.is_static() || frame == EntranceFrame::SHOWN {
            animation::settle(layers)
        } else if entrance.is_animating(now) {
            animation::sync_dots(layers, &frame)
        } else {
            self.arm()
        }
    }

    /// Measures the outlines and applies the baseline they call for.
    fn arm(&mut self) -> Result<(), JsValue> {
        self.lengths = self.layers.as_ref().and_then(SvgLayers::outline_lengths);
        let measured = self.lengths.as_ref().map(|lengths| lengths.iter().sum());
        let baseline = self.chart.arm_entrance(measured);

        let Some(layers) = &self.layers else {
            return Ok(());
        };
        match (baseline, &self.lengths) {
            (Baseline::Hidden { .. }, Some(lengths)) => animation::hide(layers, lengths),
            _ => animation::settle(layers),
        }
    }

    fn on_visibility(&mut self, ratio: f64, intersecting: bool) -> Result<(), JsValue> {
        let now = now();
        let command = self
            .chart
            .entrance_mut()
            .on_visibility(ratio, intersecting, now);
        self.apply_entrance(command)?;

        // An enter skipped while the guard is held starts once it releases.
        if let Some(until) = self.chart.entrance().pending_release(now) {
            self.release_timer.clear();
            let this = self.this.clone();
            self.release_timer
                .schedule(until.saturating_sub(now) + RELEASE_MARGIN, move || {
                    with_host(&this, ChartHost::resume_entrance);
                })?;
        }
        Ok(())
    }

    fn resume_entrance(&mut self) -> Result<(), JsValue> {
        let command = self.chart.entrance_mut().resume(now());
        self.apply_entrance(command)
    }

    fn apply_entrance(&mut self, command: EntranceCommand) -> Result<(), JsValue> {
        match command {
            EntranceCommand::Start(schedule) => self.start_entrance(schedule),
            EntranceCommand::Reset => {
                self.entrance_timers.clear();
                self.arm()
            }
            EntranceCommand::None => Ok(()),
        }
    }

    fn start_entrance(&mut self, schedule: EntranceSchedule) -> Result<(), JsValue> {
        self.entrance_timers.clear();
        let Some(layers) = &self.layers else {
            return Ok(());
        };
        animation::start_outline(layers, &schedule)?;

        for (index, delay) in (0_u32..).zip(schedule.dot_delays) {
            let this = self.this.clone();
            self.entrance_timers.schedule(delay, move || {
                with_host(&this, |host| match &host.layers {
                    Some(layers) => animation::reveal_dot(layers, index, &schedule),
                    None => Ok(()),
                });
            })?;
        }

        let this = self.this.clone();
        self.entrance_timers.schedule(schedule.total(), move || {
            with_host(&this, ChartHost::sync_entrance);
        })
    }

    fn on_slider_input(&mut self) -> Result<(), JsValue> {
        let Ok(year) = self.elements.slider.value().parse::<i32>() else {
            return Ok(());
        };
        let (command, frame) = self.chart.scrub(year);
        self.apply_timer(command)?;
        if let Some(frame) = frame {
            self.redraw(&frame)?;
        }
        Ok(())
    }

    fn on_play_click(&mut self) -> Result<(), JsValue> {
        let command = self.chart.toggle_play();
        self.apply_timer(command)
    }

    fn on_tick(&mut self) -> Result<(), JsValue> {
        match self.chart.tick() {
            Some(frame) => self.redraw(&frame),
            None => Ok(()),
        }
    }

    fn apply_timer(&mut self, command: TimerCommand) -> Result<(), JsValue> {
        let this = self.this.clone();
        self.timer.apply(command, move || {
            with_host(&this, ChartHost::on_tick);
        })?;
        self.update_play_label();
        Ok(())
    }

    fn update_play_label(&self) {
        let label = self.chart.timeline().state().button_label();
        self.elements.play.set_text_content(Some(label));
    }

    /// Stops playback and cancels every pending reveal step.
    pub fn teardown(&mut self) -> Result<(), JsValue> {
        let command = self.chart.teardown();
        self.apply_timer(command)?;
        self.entrance_timers.clear();
        self.release_timer.clear();
        self.visibility = None;
        Ok(())
    }
}

fn show_tooltip(tooltip: &SharedTooltip, event: &Event) {
    let text = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .and_then(|element| element.get_attribute(TOOLTIP_ATTR));
    let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
        return;
    };

    let shown = match text {
        Some(text) => tooltip.show(
            &text,
            f64::from(mouse.client_x()),
            f64::from(mouse.client_y()),
        ),
        None => tooltip.hide(),
    };
    if let Err(e) = shown {
        console::error_1(&e);
    }
}
