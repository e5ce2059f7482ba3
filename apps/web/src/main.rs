mod animation;
mod chart;
mod dom;
mod fetch;
mod playback;
mod render;
mod tooltip;

use chart::{MountError, SharedHost};
use monsoon_radial::PageConfig;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{console, Document, Event, PageTransitionEvent};

use crate::tooltip::SharedTooltip;

/// Element whose text holds the page's chart configuration as JSON.
const CONFIG_SCRIPT_ID: &str = "radial-config";

fn main() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if document.ready_state() == "complete" {
        return start(&document);
    }

    let on_load = Closure::once_into_js(move || {
        if let Err(e) = start(&document) {
            console::error_1(&e);
        }
    });
    window.add_event_listener_with_callback("load", on_load.unchecked_ref())?;
    Ok(())
}

fn page_config(document: &Document) -> PageConfig {
    let Some(text) = document
        .get_element_by_id(CONFIG_SCRIPT_ID)
        .and_then(|script| script.text_content())
    else {
        return PageConfig::monsoon_default();
    };

    PageConfig::from_json(&text).unwrap_or_else(|e| {
        console::error_1(&JsValue::from_str(&format!("{CONFIG_SCRIPT_ID}: {e}")));
        PageConfig::monsoon_default()
    })
}

/// Mounts every configured chart independently; one chart's missing
/// elements never affect another.
fn start(document: &Document) -> Result<(), JsValue> {
    let tooltip = SharedTooltip::create(document)?;

    let mut hosts = Vec::new();
    for config in page_config(document).charts {
        let svg_id = config.svg_id.clone();
        match chart::mount(document, config, tooltip.clone()) {
            Ok(host) => hosts.push(host),
            Err(MountError::Skipped(reason)) => {
                console::debug_1(&JsValue::from_str(&format!("{svg_id} skipped: {reason}")));
            }
            Err(MountError::Js(e)) => console::error_2(&JsValue::from_str(&svg_id), &e),
        }
    }

    teardown_on_pagehide(hosts)
}

/// Keeps the hosts alive for the page's lifetime and releases their timers
/// when the page is unloaded. A page kept in the back/forward cache keeps
/// its timers and observers so it resumes on restore.
fn teardown_on_pagehide(hosts: Vec<SharedHost>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let on_pagehide = Closure::wrap(Box::new(move |event: Event| {
        let persisted = event
            .dyn_ref::<PageTransitionEvent>()
            .map(PageTransitionEvent::persisted);
        if !page_discarded(persisted) {
            return;
        }
        for host in &hosts {
            let Ok(mut host) = host.try_borrow_mut() else {
                continue;
            };
            if let Err(e) = host.teardown() {
                console::error_2(&JsValue::from_str(host.svg_id()), &e);
            }
        }
    }) as Box<dyn FnMut(Event)>);

    window.add_event_listener_with_callback("pagehide", on_pagehide.as_ref().unchecked_ref())?;
    on_pagehide.forget();
    Ok(())
}

/// `pagehide` without a persisted flag is treated as a final unload.
fn page_discarded(persisted: Option<bool>) -> bool {
    persisted != Some(true)
}

#[cfg(test)]
mod tests {
    use super::page_discarded;

    #[test]
    fn cached_page_keeps_its_charts() {
        assert!(!page_discarded(Some(true)));
        assert!(page_discarded(Some(false)));
        assert!(page_discarded(None));
    }
}
