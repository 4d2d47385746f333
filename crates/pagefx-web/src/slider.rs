#![forbid(unsafe_code)]

//! `wasm-bindgen` host for the phone-slider carousel.
//!
//! [`PhoneSlider`] owns the listeners, the visibility observer and the
//! carousel. The carousel sits in a shared cell because listener callbacks
//! and timer ticks all reach it; the scheduler's tick sink only holds a weak
//! reference so the carousel never keeps itself alive.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Array;
use pagefx_core::input::parse_encoded_input_with_threshold;
use pagefx_core::{Carousel, SliderConfig, SliderInput, SliderKey, Visibility};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, TouchEvent,
};

use crate::dom::{DomMarker, Listener, query_all, query_all_in};
use crate::host_config::{SLIDER_CONFIG_ATTRIBUTE, slider_config_from_attribute};
use crate::scheduler::WebScheduler;

type WebCarousel = Carousel<DomMarker, DomMarker, WebScheduler>;
type SharedCarousel = Rc<RefCell<Option<WebCarousel>>>;

/// Run `f` on the carousel unless it is gone or already borrowed.
fn with_carousel<R>(cell: &SharedCarousel, f: impl FnOnce(&mut WebCarousel) -> R) -> Option<R> {
    let mut slot = cell.try_borrow_mut().ok()?;
    slot.as_mut().map(f)
}

fn dispatch(cell: &SharedCarousel, input: SliderInput) {
    with_carousel(cell, |carousel| {
        carousel.dispatch(input);
    });
}

/// Horizontal screen coordinate of the first changed touch.
fn touch_x(event: &Event) -> Option<f64> {
    let touch = event.dyn_ref::<TouchEvent>()?.changed_touches().get(0)?;
    Some(f64::from(touch.screen_x()))
}

struct VisibilityObserver {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl VisibilityObserver {
    fn observe(root: &Element, cell: &SharedCarousel, threshold: f64) -> Result<Self, JsValue> {
        let cell = cell.clone();
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    let visibility = Visibility::from_ratio(entry.intersection_ratio(), threshold);
                    dispatch(&cell, SliderInput::Visibility(visibility));
                }
            },
        );
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        observer.observe(root);
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for VisibilityObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// One mounted phone-slider carousel.
#[wasm_bindgen]
pub struct PhoneSlider {
    carousel: SharedCarousel,
    listeners: Vec<Listener>,
    observer: Option<VisibilityObserver>,
}

impl PhoneSlider {
    /// Mount on `root`. A root without slides yields an inert slider that
    /// attaches nothing.
    pub(crate) fn mount(root: &Element, config: SliderConfig) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let markup = config.markup.clone();
        let slides = query_all_in(root, &markup.slide_selector)
            .into_iter()
            .map(|el| DomMarker::slide(el, &markup.slide_active_class))
            .collect();
        let dot_elements = query_all_in(root, &markup.dot_selector);
        let dots = dot_elements
            .iter()
            .map(|el| DomMarker::dot(el.clone(), &markup.dot_active_class, &markup.selected_attribute))
            .collect();

        let cell: SharedCarousel = Rc::new(RefCell::new(None));
        let weak = Rc::downgrade(&cell);
        let scheduler = WebScheduler::new(window, move |id| {
            if let Some(cell) = weak.upgrade() {
                with_carousel(&cell, |carousel| carousel.tick(id));
            }
        });

        let threshold = config.visibility_threshold;
        let Some(carousel) = Carousel::discover(slides, dots, config, scheduler) else {
            return Ok(Self {
                carousel: cell,
                listeners: Vec::new(),
                observer: None,
            });
        };
        *cell.borrow_mut() = Some(carousel);

        let mut listeners = Vec::with_capacity(dot_elements.len() + 4);
        for (index, dot) in dot_elements.iter().enumerate() {
            let cell = cell.clone();
            listeners.push(Listener::attach(dot, "click", move |_| {
                dispatch(&cell, SliderInput::DotClicked { index });
            })?);
        }

        let keys = cell.clone();
        listeners.push(Listener::attach(root, "keydown", move |event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                let key = SliderKey::from_dom_key(&event.key());
                dispatch(&keys, SliderInput::Key(key));
            }
        })?);

        let touches = cell.clone();
        listeners.push(Listener::attach_passive(root, "touchstart", move |event| {
            if let Some(x) = touch_x(&event) {
                dispatch(&touches, SliderInput::TouchStart { x });
            }
        })?);

        let touches = cell.clone();
        listeners.push(Listener::attach_passive(root, "touchend", move |event| {
            // A touchend without coordinates still has to resume autoplay.
            let input = touch_x(&event).map_or(SliderInput::TouchCancel, |x| {
                SliderInput::TouchEnd { x }
            });
            dispatch(&touches, input);
        })?);

        let touches = cell.clone();
        listeners.push(Listener::attach_passive(root, "touchcancel", move |_| {
            dispatch(&touches, SliderInput::TouchCancel);
        })?);

        let observer = VisibilityObserver::observe(root, &cell, threshold)?;

        Ok(Self {
            carousel: cell,
            listeners,
            observer: Some(observer),
        })
    }

    /// Mount every root matching `root_selector`.
    pub(crate) fn mount_all(document: &Document, root_selector: &str) -> Vec<Self> {
        let roots = query_all(document, root_selector);
        if roots.is_empty() {
            tracing::debug!(root_selector, "no slider roots found; carousel stays inert");
            return Vec::new();
        }
        roots
            .iter()
            .filter_map(|root| {
                let raw = root.get_attribute(SLIDER_CONFIG_ATTRIBUTE);
                let config = slider_config_from_attribute(raw.as_deref());
                match Self::mount(root, config) {
                    Ok(slider) => Some(slider),
                    Err(error) => {
                        tracing::warn!(?error, "phone slider failed to mount");
                        None
                    }
                }
            })
            .filter(PhoneSlider::is_active)
            .collect()
    }
}

#[wasm_bindgen]
impl PhoneSlider {
    /// Mount on `root`. `config_json` takes precedence over the root's
    /// `data-slider-config` attribute.
    #[wasm_bindgen(constructor)]
    pub fn new(root: Element, config_json: Option<String>) -> Result<PhoneSlider, JsValue> {
        let raw = config_json.or_else(|| root.get_attribute(SLIDER_CONFIG_ATTRIBUTE));
        let config = slider_config_from_attribute(raw.as_deref());
        Self::mount(&root, config)
    }

    /// Whether the root had slides and the carousel is attached.
    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.carousel.borrow().is_some()
    }

    #[wasm_bindgen(js_name = currentIndex)]
    pub fn current_index(&self) -> Option<u32> {
        let slot = self.carousel.borrow();
        slot.as_ref()
            .map(|c| u32::try_from(c.current_index()).unwrap_or(u32::MAX))
    }

    #[wasm_bindgen(js_name = slideCount)]
    pub fn slide_count(&self) -> u32 {
        let slot = self.carousel.borrow();
        slot.as_ref()
            .map_or(0, |c| u32::try_from(c.len()).unwrap_or(u32::MAX))
    }

    #[wasm_bindgen(js_name = isAutoplaying)]
    pub fn is_autoplaying(&self) -> bool {
        self.carousel
            .borrow()
            .as_ref()
            .is_some_and(|c| c.is_autoplaying())
    }

    /// Dispatch one JSON-encoded input (`{"kind":"dot","index":2}`, ...).
    ///
    /// Returns `false` when the input is malformed or the slider is inert.
    #[wasm_bindgen(js_name = pushEncodedInput)]
    pub fn push_encoded_input(&self, json: &str) -> bool {
        with_carousel(&self.carousel, |carousel| {
            let threshold = carousel.config().visibility_threshold;
            match parse_encoded_input_with_threshold(json, threshold) {
                Ok(input) => {
                    carousel.dispatch(input);
                    true
                }
                Err(error) => {
                    tracing::debug!(%error, "encoded input rejected");
                    false
                }
            }
        })
        .unwrap_or(false)
    }

    /// Detach listeners, disconnect the observer and stop autoplay.
    pub fn destroy(&mut self) {
        self.listeners.clear();
        self.observer = None;
        if let Ok(mut slot) = self.carousel.try_borrow_mut() {
            if let Some(carousel) = slot.as_mut() {
                carousel.shutdown();
            }
            *slot = None;
        }
    }
}
