#![forbid(unsafe_code)]

//! [`Scheduler`] over the browser's `setInterval`/`setTimeout`.
//!
//! One callback closure lives as long as the scheduler. Every browser timer
//! calls it with the [`TimerId`] as its extra argument, so cancelling a timer
//! never frees a closure that might be running. Dropping the scheduler
//! clears every timer it still owns before the closure goes away.

use core::time::Duration;

use pagefx_core::{Scheduler, TimerHandle, TimerId};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use crate::timer_table::{TimerKind, TimerTable, delay_ms};

pub(crate) struct WebScheduler {
    window: Window,
    table: TimerTable<i32>,
    on_fire: Closure<dyn FnMut(JsValue)>,
}

impl WebScheduler {
    /// `sink` receives the id of every timer that fires.
    pub(crate) fn new(window: Window, mut sink: impl FnMut(TimerId) + 'static) -> Self {
        let on_fire = Closure::<dyn FnMut(JsValue)>::new(move |raw: JsValue| {
            if let Some(raw) = raw.as_f64() {
                sink(TimerId::new(raw as u64));
            }
        });
        Self {
            window,
            table: TimerTable::new(),
            on_fire,
        }
    }

    fn arm(&mut self, delay: Duration, kind: TimerKind) -> TimerHandle {
        let id = self.table.allocate();
        let callback: &js_sys::Function = self.on_fire.as_ref().unchecked_ref();
        let arg = JsValue::from_f64(id.get() as f64);
        let armed = match kind {
            TimerKind::Repeating => self
                .window
                .set_interval_with_callback_and_timeout_and_arguments_1(
                    callback,
                    delay_ms(delay),
                    &arg,
                ),
            TimerKind::Once => self.window.set_timeout_with_callback_and_timeout_and_arguments_1(
                callback,
                delay_ms(delay),
                &arg,
            ),
        };
        match armed {
            Ok(handle) => self.table.insert(id, handle, kind),
            Err(error) => {
                tracing::warn!(timer = id.get(), ?error, "browser refused to arm timer");
            }
        }
        TimerHandle::new(id)
    }

    fn clear(&self, handle: i32, kind: TimerKind) {
        match kind {
            TimerKind::Repeating => self.window.clear_interval_with_handle(handle),
            TimerKind::Once => self.window.clear_timeout_with_handle(handle),
        }
    }
}

impl Scheduler for WebScheduler {
    fn schedule_repeating(&mut self, interval: Duration) -> TimerHandle {
        self.arm(interval, TimerKind::Repeating)
    }

    fn schedule_once(&mut self, delay: Duration) -> TimerHandle {
        self.arm(delay, TimerKind::Once)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(live) = self.table.remove(handle.id()) {
            self.clear(live.handle, live.kind);
        }
    }

    /// Ids whose `setInterval`/`setTimeout` call threw never enter the table.
    fn is_armed(&self, id: TimerId) -> bool {
        self.table.contains(id)
    }
}

impl Drop for WebScheduler {
    fn drop(&mut self) {
        for live in self.table.drain() {
            self.clear(live.handle, live.kind);
        }
    }
}
