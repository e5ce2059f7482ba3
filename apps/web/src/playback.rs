use monsoon_radial::TimerCommand;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use crate::animation::millis;

/// Interval owned by one chart. At most one runs at a time.
#[derive(Default)]
pub struct PlaybackTimer {
    handle: Option<i32>,
    _callback: Option<Closure<dyn FnMut()>>,
}

impl PlaybackTimer {
    pub fn apply(
        &mut self,
        command: TimerCommand,
        on_tick: impl FnMut() + 'static,
    ) -> Result<(), JsValue> {
        match command {
            TimerCommand::Start(interval) => {
                self.clear();
                let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
                let callback = Closure::wrap(Box::new(on_tick) as Box<dyn FnMut()>);
                let handle = window.set_interval_with_callback_and_timeout_and_arguments_0(
                    callback.as_ref().unchecked_ref(),
                    millis(interval),
                )?;
                self.handle = Some(handle);
                self._callback = Some(callback);
            }
            TimerCommand::Stop => self.clear(),
            TimerCommand::None => {}
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(handle);
            }
        }
        self._callback = None;
    }
}

impl Drop for PlaybackTimer {
    fn drop(&mut self) {
        self.clear();
    }
}
