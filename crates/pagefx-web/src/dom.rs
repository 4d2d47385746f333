#![forbid(unsafe_code)]

//! DOM plumbing shared by the carousel host and the page behaviors.

use pagefx_core::{Marker, MarkerSink};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Element, Event, EventTarget, NodeList};

/// A slide or dot element that shows markers as a class and, for dots, an
/// ARIA attribute.
pub(crate) struct DomMarker {
    element: Element,
    active_class: String,
    selected_attribute: Option<String>,
}

impl DomMarker {
    pub(crate) fn slide(element: Element, active_class: &str) -> Self {
        Self {
            element,
            active_class: active_class.to_owned(),
            selected_attribute: None,
        }
    }

    pub(crate) fn dot(element: Element, active_class: &str, selected_attribute: &str) -> Self {
        Self {
            element,
            active_class: active_class.to_owned(),
            selected_attribute: Some(selected_attribute.to_owned()),
        }
    }
}

impl MarkerSink for DomMarker {
    fn set_marker(&mut self, marker: Marker, on: bool) {
        match marker {
            Marker::Active => toggle_class(&self.element, &self.active_class, on),
            Marker::Selected => {
                if let Some(attribute) = &self.selected_attribute {
                    let value = if on { "true" } else { "false" };
                    let _ = self.element.set_attribute(attribute, value);
                }
            }
        }
    }
}

pub(crate) fn toggle_class(element: &Element, class: &str, on: bool) {
    let list = element.class_list();
    let _ = if on {
        list.add_1(class)
    } else {
        list.remove_1(class)
    };
}

/// Collect the elements of a `NodeList`, skipping non-element nodes.
pub(crate) fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// `querySelectorAll` on the document; an invalid selector yields nothing.
pub(crate) fn query_all(document: &web_sys::Document, selector: &str) -> Vec<Element> {
    document
        .query_selector_all(selector)
        .map(|list| elements(&list))
        .unwrap_or_default()
}

/// `querySelectorAll` scoped to `root`; an invalid selector yields nothing.
pub(crate) fn query_all_in(root: &Element, selector: &str) -> Vec<Element> {
    root.query_selector_all(selector)
        .map(|list| elements(&list))
        .unwrap_or_default()
}

/// An attached event listener. Dropping it detaches the callback.
pub(crate) struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub(crate) fn attach(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        Self::attach_with(target, kind, false, handler)
    }

    /// Attach a listener that promises never to call `preventDefault`.
    pub(crate) fn attach_passive(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        Self::attach_with(target, kind, true, handler)
    }

    fn attach_with(
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}
