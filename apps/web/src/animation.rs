//! DOM side of the entrance reveal: inline styles, CSS transitions and the
//! timers and observer that drive them.

use std::time::Duration;

use js_sys::Array;
use monsoon_radial::entrance::{EntranceFrame, EntranceSchedule, FILL_OPACITY, VISIBILITY_THRESHOLD};
use monsoon_radial::projection::format_coord;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, SvgElement,
};

use crate::render::SvgLayers;

const DOT_HIDDEN_SCALE: f64 = 0.3;

pub fn millis(duration: Duration) -> i32 {
    i32::try_from(duration.as_millis()).unwrap_or(i32::MAX)
}

fn set_style(element: &Element, property: &str, value: &str) -> Result<(), JsValue> {
    if let Some(svg) = element.dyn_ref::<SvgElement>() {
        svg.style().set_property(property, value)?;
    }
    Ok(())
}

fn hide_dot(dot: &Element) -> Result<(), JsValue> {
    set_style(dot, "transition", "none")?;
    set_style(dot, "transform-box", "fill-box")?;
    set_style(dot, "transform-origin", "center")?;
    set_style(dot, "opacity", "0")?;
    set_style(dot, "transform", &format!("scale({DOT_HIDDEN_SCALE})"))
}

fn rest_dot(dot: &Element) -> Result<(), JsValue> {
    set_style(dot, "transition", "none")?;
    set_style(dot, "opacity", "1")?;
    set_style(dot, "transform", "none")
}

/// Suppressed baseline: outlines dashed by their own length, no fill, no dots.
pub fn hide(layers: &SvgLayers, lengths: &[f64]) -> Result<(), JsValue> {
    for (layer, length) in layers.series.iter().zip(lengths) {
        let length = format_coord(*length);
        set_style(&layer.path, "transition", "none")?;
        set_style(&layer.path, "stroke-dasharray", &length)?;
        set_style(&layer.path, "stroke-dashoffset", &length)?;
        set_style(&layer.path, "fill-opacity", "0")?;
    }
    for dot in layers.all_dots() {
        hide_dot(&dot)?;
    }
    Ok(())
}

/// Everything drawn at rest, without dashes.
pub fn settle(layers: &SvgLayers) -> Result<(), JsValue> {
    for layer in &layers.series {
        set_style(&layer.path, "transition", "none")?;
        set_style(&layer.path, "stroke-dasharray", "none")?;
        set_style(&layer.path, "stroke-dashoffset", "0")?;
        set_style(&layer.path, "fill-opacity", &format_coord(FILL_OPACITY))?;
    }
    for dot in layers.all_dots() {
        rest_dot(&dot)?;
    }
    Ok(())
}

/// Outline draw and the delayed fill; dots are revealed by their own timers.
pub fn start_outline(layers: &SvgLayers, schedule: &EntranceSchedule) -> Result<(), JsValue> {
    let transition = format!(
        "stroke-dashoffset {}ms ease-in-out, fill-opacity {}ms ease-out {}ms",
        millis(schedule.outline),
        millis(schedule.fill),
        millis(schedule.fill_delay)
    );
    for layer in &layers.series {
        set_style(&layer.path, "transition", &transition)?;
        set_style(&layer.path, "stroke-dashoffset", "0")?;
        set_style(&layer.path, "fill-opacity", &format_coord(FILL_OPACITY))?;
    }
    Ok(())
}

pub fn reveal_dot(layers: &SvgLayers, index: u32, schedule: &EntranceSchedule) -> Result<(), JsValue> {
    let fade = millis(schedule.dot_fade);
    for dot in layers.dots_at(index) {
        set_style(
            &dot,
            "transition",
            &format!("opacity {fade}ms ease-out, transform {fade}ms ease-out"),
        )?;
        set_style(&dot, "opacity", "1")?;
        set_style(&dot, "transform", "scale(1)")?;
    }
    Ok(())
}

/// Freshly drawn dots take the state of the reveal: shown once their timer
/// has fired, hidden before.
pub fn sync_dots(layers: &SvgLayers, frame: &EntranceFrame) -> Result<(), JsValue> {
    for layer in &layers.series {
        let children = layer.dots.children();
        for (index, opacity) in (0..children.length()).zip(frame.dot_opacity) {
            let Some(dot) = children.item(index) else {
                continue;
            };
            if opacity > 0.0 {
                rest_dot(&dot)?;
            } else {
                hide_dot(&dot)?;
            }
        }
    }
    Ok(())
}

/// Pending reveal timeouts of one chart; cleared on reset, pagehide and drop.
#[derive(Default)]
pub struct EntranceTimers {
    handles: Vec<i32>,
}

impl EntranceTimers {
    pub fn schedule(&mut self, delay: Duration, callback: impl FnOnce() + 'static) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let callback = Closure::once_into_js(callback);
        let handle = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            millis(delay),
        )?;
        self.handles.push(handle);
        Ok(())
    }

    pub fn clear(&mut self) {
        let window = web_sys::window();
        for handle in self.handles.drain(..) {
            if let Some(window) = &window {
                window.clear_timeout_with_handle(handle);
            }
        }
    }
}

impl Drop for EntranceTimers {
    fn drop(&mut self) {
        self.clear();
    }
}

type VisibilityCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// Intersection observer reporting the visible share of one element.
pub struct VisibilityWatch {
    observer: IntersectionObserver,
    _callback: VisibilityCallback,
}

impl VisibilityWatch {
    pub fn observe(
        target: &Element,
        mut on_change: impl FnMut(f64, bool) + 'static,
    ) -> Result<Self, JsValue> {
        let callback: VisibilityCallback = Closure::wrap(Box::new(
            move |entries: Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    if let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() {
                        on_change(entry.intersection_ratio(), entry.is_intersecting());
                    }
                }
            },
        ) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let thresholds = Array::of2(&JsValue::from_f64(0.0), &JsValue::from_f64(VISIBILITY_THRESHOLD));
        let init = IntersectionObserverInit::new();
        init.set_threshold(&thresholds);

        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        observer.observe(target);

        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for VisibilityWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
