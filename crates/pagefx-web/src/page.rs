#![forbid(unsafe_code)]

//! DOM wiring for the one-shot page behaviors.
//!
//! Decisions come from `pagefx_core::page`; this module finds the markup,
//! attaches listeners and applies the resulting effects. Missing markup
//! silently skips the behavior.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Function, Promise, Reflect};
use pagefx_core::page::{
    CopyFeedback, CopyView, EXTERNAL_REL, EXTERNAL_TARGET, HeaderScroll, NavEffect, NavOverlay,
    anchor_scroll_top, anchor_target, is_disclosure_toggle_key, is_external,
};
use pagefx_core::{PageConfig, TimerId};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, Event, FocusOptions, HtmlDetailsElement, HtmlElement, HtmlImageElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent,
    MediaQueryListEvent, ScrollBehavior, ScrollToOptions, Window,
};

use crate::dom::{Listener, query_all, query_all_in, toggle_class};
use crate::scheduler::WebScheduler;
use crate::slider::PhoneSlider;

const NAV_TOGGLE: &str = ".nav-toggle";
const NAV: &str = ".nav";
const NAV_OVERLAY: &str = ".nav-overlay";
const NAV_LINK: &str = ".nav__link";
const HEADER: &str = ".header";
const ANCHOR_LINKS: &str = r##"a[href^="#"]"##;
const FAQ_ITEM: &str = ".faq__item";
const FAQ_QUESTION: &str = ".faq__question";
const LAZY_IMAGES: &str = r#"img[loading="lazy"]"#;
const LAZY_ROOT_MARGIN: &str = "50px 0px";
const LAZY_THRESHOLD: f64 = 0.01;
const COPY_BUTTONS: &str = "[data-copy]";
const YEAR: &str = "[data-year]";
const HTTP_LINKS: &str = r#"a[href^="http"]"#;

fn scroll_y(window: &Window) -> f64 {
    window.scroll_y().unwrap_or(0.0)
}

fn query(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

/// Every behavior attached to the page. Dropping it detaches everything.
pub(crate) struct Page {
    window: Window,
    document: Document,
    config: PageConfig,
    listeners: Vec<Listener>,
    sliders: Vec<PhoneSlider>,
    _lazy_images: Option<LazyImages>,
    _copy_buttons: Option<Rc<RefCell<CopyButtons>>>,
    deferred_done: bool,
}

impl Page {
    /// Attach the behaviors needed at page-ready: navigation, anchors,
    /// header, accordion and carousels.
    pub(crate) fn critical(window: Window, document: Document, config: PageConfig) -> Self {
        let mut page = Self {
            window,
            document,
            config,
            listeners: Vec::new(),
            sliders: Vec::new(),
            _lazy_images: None,
            _copy_buttons: None,
            deferred_done: false,
        };
        for (name, result) in [
            ("nav", page.init_nav()),
            ("anchors", page.init_anchors()),
            ("header", page.init_header()),
            ("accordion", page.init_accordion()),
        ] {
            if let Err(error) = result {
                tracing::warn!(behavior = name, ?error, "page behavior failed to attach");
            }
        }
        page.sliders = PhoneSlider::mount_all(&page.document, &page.config.slider_root_selector);
        tracing::debug!(
            listeners = page.listeners.len(),
            sliders = page.sliders.len(),
            "critical page behaviors attached"
        );
        page
    }

    /// Attach the behaviors that can wait for an idle moment: lazy images,
    /// copy buttons, the year stamp and external-link hardening.
    pub(crate) fn deferred(&mut self) {
        if self.deferred_done {
            return;
        }
        self.deferred_done = true;
        self.init_lazy_images();
        if let Err(error) = self.init_copy_buttons() {
            tracing::warn!(behavior = "copy", ?error, "page behavior failed to attach");
        }
        self.stamp_year();
        self.harden_external_links();
    }

    fn init_nav(&mut self) -> Result<(), JsValue> {
        let Some(toggle) = query(&self.document, NAV_TOGGLE)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return Ok(());
        };
        let Some(nav) = query(&self.document, NAV) else {
            return Ok(());
        };
        let Some(body) = self.document.body() else {
            return Ok(());
        };
        let overlay = query(&self.document, NAV_OVERLAY);
        let shared = Rc::new(NavController {
            state: RefCell::new(NavOverlay::new()),
            window: self.window.clone(),
            toggle: toggle.clone(),
            nav: nav.clone(),
            overlay: overlay.clone(),
            body,
        });

        let ctl = shared.clone();
        self.listeners.push(Listener::attach(&toggle, "click", move |_| {
            let y = scroll_y(&ctl.window);
            ctl.run(|nav| nav.toggle(y));
        })?);

        if let Some(overlay) = &overlay {
            let ctl = shared.clone();
            self.listeners.push(Listener::attach(overlay, "click", move |_| {
                ctl.run(NavOverlay::dismiss);
            })?);
        }

        for link in query_all_in(&nav, NAV_LINK) {
            let ctl = shared.clone();
            self.listeners.push(Listener::attach(&link, "click", move |_| {
                ctl.run(NavOverlay::dismiss);
            })?);
        }

        let ctl = shared.clone();
        self.listeners.push(Listener::attach(&self.document, "keydown", move |event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                let key = event.key();
                ctl.run(|nav| nav.key(&key));
            }
        })?);

        if let Some(media) = self.window.match_media(&self.config.desktop_media_query)? {
            let ctl = shared;
            self.listeners.push(Listener::attach(&media, "change", move |event| {
                if let Some(event) = event.dyn_ref::<MediaQueryListEvent>() {
                    let matches = event.matches();
                    ctl.run(|nav| nav.viewport_changed(matches));
                }
            })?);
        }
        Ok(())
    }

    fn init_anchors(&mut self) -> Result<(), JsValue> {
        let gap = self.config.anchor_gap_px;
        for anchor in query_all(&self.document, ANCHOR_LINKS) {
            let link = anchor.clone();
            let window = self.window.clone();
            let document = self.document.clone();
            self.listeners.push(Listener::attach(&anchor, "click", move |event| {
                scroll_to_anchor(&window, &document, &link, &event, gap);
            })?);
        }
        Ok(())
    }

    fn init_header(&mut self) -> Result<(), JsValue> {
        let Some(header) = query(&self.document, HEADER) else {
            return Ok(());
        };
        let state = Rc::new(RefCell::new(HeaderScroll::new(
            self.config.header_scroll_threshold_px,
        )));
        apply_header_frame(&state, &header, scroll_y(&self.window));

        let window = self.window.clone();
        self.listeners.push(Listener::attach_passive(&self.window, "scroll", move |_| {
            if !state.borrow_mut().on_scroll() {
                return;
            }
            let frame_state = state.clone();
            let frame_header = header.clone();
            let frame_window = window.clone();
            let frame = Closure::once_into_js(move || {
                apply_header_frame(&frame_state, &frame_header, scroll_y(&frame_window));
            });
            if window.request_animation_frame(frame.unchecked_ref()).is_err() {
                apply_header_frame(&state, &header, scroll_y(&window));
            }
        })?);
        Ok(())
    }

    fn init_accordion(&mut self) -> Result<(), JsValue> {
        for item in query_all(&self.document, FAQ_ITEM) {
            let Ok(Some(question)) = item.query_selector(FAQ_QUESTION) else {
                continue;
            };
            self.listeners.push(Listener::attach(&question, "keydown", move |event| {
                let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                    return;
                };
                if !is_disclosure_toggle_key(&key) {
                    return;
                }
                event.prevent_default();
                if let Some(details) = item.dyn_ref::<HtmlDetailsElement>() {
                    details.set_open(!details.open());
                }
            })?);
        }
        Ok(())
    }

    fn init_lazy_images(&mut self) {
        let images = query_all(&self.document, LAZY_IMAGES);
        if images.is_empty() {
            return;
        }
        if has_native_lazy_loading(&self.window) {
            for img in &images {
                promote_lazy_source(img);
            }
            return;
        }
        if !Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
        {
            return;
        }
        match LazyImages::observe(&images) {
            Ok(lazy) => self._lazy_images = Some(lazy),
            Err(error) => tracing::warn!(?error, "lazy image observer failed"),
        }
    }

    fn init_copy_buttons(&mut self) -> Result<(), JsValue> {
        let elements: Vec<HtmlElement> = query_all(&self.document, COPY_BUTTONS)
            .into_iter()
            .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
            .collect();
        if elements.is_empty() {
            return Ok(());
        }
        let shared = CopyButtons::new(self.window.clone(), &elements, &self.config);
        for (index, element) in elements.into_iter().enumerate() {
            let shared = shared.clone();
            let window = self.window.clone();
            let button = element.clone();
            self.listeners.push(Listener::attach(&element, "click", move |_| {
                let Some(text) = button.get_attribute("data-copy") else {
                    return;
                };
                let shared = shared.clone();
                let window = window.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    match write_clipboard(&window, &text).await {
                        Ok(()) => {
                            if let Ok(mut buttons) = shared.try_borrow_mut() {
                                buttons.copied(index);
                            }
                        }
                        Err(error) => tracing::warn!(?error, "failed to copy"),
                    }
                });
            })?);
        }
        self._copy_buttons = Some(shared);
        Ok(())
    }

    fn stamp_year(&self) {
        let year = js_sys::Date::new_0().get_full_year().to_string();
        for el in query_all(&self.document, YEAR) {
            el.set_text_content(Some(&year));
        }
    }

    fn harden_external_links(&self) {
        let hostname = self.window.location().hostname().unwrap_or_default();
        for link in query_all(&self.document, HTTP_LINKS) {
            let Some(href) = link.get_attribute("href") else {
                continue;
            };
            if is_external(&href, &hostname) {
                let _ = link.set_attribute("rel", EXTERNAL_REL);
                let _ = link.set_attribute("target", EXTERNAL_TARGET);
            }
        }
    }
}

// ── Navigation ───────────────────────────────────────────────────────────

struct NavController {
    state: RefCell<NavOverlay>,
    window: Window,
    toggle: HtmlElement,
    nav: Element,
    overlay: Option<Element>,
    body: HtmlElement,
}

impl NavController {
    fn run(&self, step: impl FnOnce(&mut NavOverlay) -> Option<NavEffect>) {
        let effect = {
            let Ok(mut state) = self.state.try_borrow_mut() else {
                return;
            };
            step(&mut state)
        };
        if let Some(effect) = effect {
            self.apply(effect);
        }
    }

    fn apply(&self, effect: NavEffect) {
        let open = matches!(effect, NavEffect::Opened { .. });
        let _ = self
            .toggle
            .set_attribute("aria-expanded", if open { "true" } else { "false" });
        toggle_class(&self.nav, "is-open", open);
        if let Some(overlay) = &self.overlay {
            toggle_class(overlay, "is-visible", open);
        }
        toggle_class(&self.body, "nav-open", open);

        match effect {
            NavEffect::Opened { scroll_y } => {
                let _ = self
                    .body
                    .style()
                    .set_property("top", &format!("-{scroll_y}px"));
            }
            NavEffect::Closed {
                restore_scroll_y,
                refocus_toggle,
            } => {
                let _ = self.body.style().remove_property("top");
                self.window.scroll_to_with_x_and_y(0.0, restore_scroll_y);
                if refocus_toggle {
                    let _ = self.toggle.focus();
                }
            }
        }
    }
}

// ── Anchors and header ───────────────────────────────────────────────────

fn scroll_to_anchor(window: &Window, document: &Document, link: &Element, event: &Event, gap: f64) {
    let Some(href) = link.get_attribute("href") else {
        return;
    };
    let Some(selector) = anchor_target(&href) else {
        return;
    };
    let Some(target) = query(document, selector) else {
        return;
    };
    event.prevent_default();

    let header_height = query(document, HEADER)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .map_or(0.0, |el| f64::from(el.offset_height()));
    let top = anchor_scroll_top(
        target.get_bounding_client_rect().top(),
        scroll_y(window),
        header_height,
        gap,
    );
    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);

    if let Ok(history) = window.history() {
        let _ = history.push_state_with_url(&JsValue::NULL, "", Some(selector));
    }
    let _ = target.set_attribute("tabindex", "-1");
    if let Some(target) = target.dyn_ref::<HtmlElement>() {
        let focus = FocusOptions::new();
        focus.set_prevent_scroll(true);
        let _ = target.focus_with_options(&focus);
    }
}

fn apply_header_frame(state: &RefCell<HeaderScroll>, header: &Element, y: f64) {
    let changed = state.borrow_mut().on_frame(y);
    if let Some(scrolled) = changed {
        toggle_class(header, "is-scrolled", scrolled);
    }
}

// ── Lazy images ──────────────────────────────────────────────────────────

fn has_native_lazy_loading(window: &Window) -> bool {
    Reflect::get(window, &JsValue::from_str("HTMLImageElement"))
        .and_then(|ctor| Reflect::get(&ctor, &JsValue::from_str("prototype")))
        .and_then(|proto| Reflect::has(&proto, &JsValue::from_str("loading")))
        .unwrap_or(false)
}

fn promote_lazy_source(img: &Element) {
    let Some(src) = img.get_attribute("data-src") else {
        return;
    };
    if let Some(img) = img.dyn_ref::<HtmlImageElement>() {
        img.set_src(&src);
    }
}

struct LazyImages {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl LazyImages {
    fn observe(images: &[Element]) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            |entries: Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    if !entry.is_intersecting() {
                        continue;
                    }
                    let img = entry.target();
                    promote_lazy_source(&img);
                    let _ = img.remove_attribute("loading");
                    observer.unobserve(&img);
                }
            },
        );
        let init = IntersectionObserverInit::new();
        init.set_root_margin(LAZY_ROOT_MARGIN);
        init.set_threshold(&JsValue::from_f64(LAZY_THRESHOLD));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        for img in images {
            observer.observe(img);
        }
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for LazyImages {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

// ── Copy buttons ─────────────────────────────────────────────────────────

struct CopyButton {
    element: HtmlElement,
    feedback: CopyFeedback,
}

struct CopyButtons {
    buttons: Vec<CopyButton>,
    scheduler: WebScheduler,
}

impl CopyButtons {
    fn new(window: Window, elements: &[HtmlElement], config: &PageConfig) -> Rc<RefCell<Self>> {
        Rc::new_cyclic(|weak| {
            let weak: std::rc::Weak<RefCell<Self>> = weak.clone();
            let scheduler = WebScheduler::new(window, move |id| {
                if let Some(shared) = weak.upgrade() {
                    if let Ok(mut buttons) = shared.try_borrow_mut() {
                        buttons.tick(id);
                    }
                }
            });
            let buttons = elements
                .iter()
                .map(|element| CopyButton {
                    element: element.clone(),
                    feedback: CopyFeedback::new(
                        config.copy_feedback_label.clone(),
                        config.copy_feedback(),
                    ),
                })
                .collect();
            RefCell::new(Self { buttons, scheduler })
        })
    }

    fn copied(&mut self, index: usize) {
        let Self { buttons, scheduler } = self;
        let Some(button) = buttons.get_mut(index) else {
            return;
        };
        let current = button.element.text_content().unwrap_or_default();
        let view = button.feedback.copied(&current, scheduler);
        show_copy_view(&button.element, &view);
    }

    fn tick(&mut self, id: TimerId) {
        let Self { buttons, scheduler } = self;
        for button in buttons.iter_mut() {
            if let Some(view) = button.feedback.tick(id, scheduler) {
                show_copy_view(&button.element, &view);
                return;
            }
        }
    }
}

fn show_copy_view(element: &HtmlElement, view: &CopyView) {
    element.set_text_content(Some(&view.label));
    toggle_class(element, "is-copied", view.copied);
}

async fn write_clipboard(window: &Window, text: &str) -> Result<(), JsValue> {
    let navigator = Reflect::get(window, &JsValue::from_str("navigator"))?;
    let clipboard = Reflect::get(&navigator, &JsValue::from_str("clipboard"))?;
    let write_text = Reflect::get(&clipboard, &JsValue::from_str("writeText"))?
        .dyn_into::<Function>()?;
    let promise = write_text
        .call1(&clipboard, &JsValue::from_str(text))?
        .dyn_into::<Promise>()?;
    JsFuture::from(promise).await?;
    Ok(())
}
