#![forbid(unsafe_code)]

//! `wasm-bindgen` entry points.
//!
//! The page loader calls [`start`] once after instantiating the module. It
//! waits for `DOMContentLoaded` when the document is still loading, attaches
//! the critical behaviors, then defers the rest to an idle callback.

use std::cell::RefCell;

use js_sys::{Function, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

use crate::host_config::{PAGE_CONFIG_ATTRIBUTE, page_config_from_attribute};
use crate::page::Page;

thread_local! {
    static PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
}

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn browser() -> Result<(Window, Document), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    Ok((window, document))
}

/// Run `task` when the browser is idle, or on the next macrotask where
/// `requestIdleCallback` is unavailable.
fn defer(window: &Window, task: impl FnOnce() + 'static) {
    let callback = Closure::once_into_js(task);
    let idle = Reflect::get(window, &JsValue::from_str("requestIdleCallback"))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok());
    if let Some(idle) = idle {
        if idle.call1(window, &callback).is_ok() {
            return;
        }
    }
    if let Err(error) =
        window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 1)
    {
        tracing::warn!(?error, "could not defer non-critical behaviors");
    }
}

/// Install the panic hook and initialize the page once the DOM is ready.
#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    install_panic_hook();
    let (_, document) = browser()?;
    if document.ready_state() != "loading" {
        return init_page();
    }
    let on_ready = Closure::once_into_js(|| {
        if let Err(error) = init_page() {
            console_error(&format!("pagefx init failed: {error:?}"));
        }
    });
    document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
}

/// Attach every page behavior. Calling it again is a no-op.
#[wasm_bindgen(js_name = initPage)]
pub fn init_page() -> Result<(), JsValue> {
    let (window, document) = browser()?;
    let already = PAGE.with(|slot| slot.borrow().is_some());
    if already {
        return Ok(());
    }
    let raw = document
        .document_element()
        .and_then(|el| el.get_attribute(PAGE_CONFIG_ATTRIBUTE));
    let config = page_config_from_attribute(raw.as_deref());
    let page = Page::critical(window.clone(), document, config);
    PAGE.with(|slot| *slot.borrow_mut() = Some(page));

    defer(&window, || {
        PAGE.with(|slot| {
            if let Ok(mut slot) = slot.try_borrow_mut() {
                if let Some(page) = slot.as_mut() {
                    page.deferred();
                }
            }
        });
    });
    Ok(())
}
