#![cfg(target_arch = "wasm32")]
#![forbid(unsafe_code)]

use pagefx_web::PhoneSlider;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{Document, Element};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window()
        .and_then(|w| w.document())
        .expect("browser document")
}

fn build_slider(slides: usize, dots: usize) -> Element {
    let doc = document();
    let root = doc.create_element("div").expect("root");
    root.set_class_name("phone-slider");
    for _ in 0..slides {
        let slide = doc.create_element("div").expect("slide");
        slide.set_class_name("phone-slider__slide");
        root.append_child(&slide).expect("append slide");
    }
    for _ in 0..dots {
        let dot = doc.create_element("button").expect("dot");
        dot.set_class_name("phone-slider__dot");
        root.append_child(&dot).expect("append dot");
    }
    doc.body()
        .expect("body")
        .append_child(&root)
        .expect("append root");
    root
}

fn nth(root: &Element, selector: &str, n: u32) -> Element {
    root.query_selector_all(selector)
        .expect("valid selector")
        .item(n)
        .expect("element exists")
        .dyn_into::<Element>()
        .expect("element node")
}

#[wasm_bindgen_test]
fn mount_normalizes_markers() {
    let root = build_slider(3, 3);
    let slider = PhoneSlider::new(root.clone(), None).expect("mount");
    assert!(slider.is_active());
    assert_eq!(slider.slide_count(), 3);
    assert_eq!(slider.current_index(), Some(0));

    let first = nth(&root, ".phone-slider__slide", 0);
    assert!(first.class_list().contains("phone-slider__slide--active"));
    let dot = nth(&root, ".phone-slider__dot", 1);
    assert_eq!(dot.get_attribute("aria-selected").as_deref(), Some("false"));
}

#[wasm_bindgen_test]
fn encoded_dot_input_moves_markers() {
    let root = build_slider(3, 3);
    let slider = PhoneSlider::new(root.clone(), None).expect("mount");
    assert!(slider.push_encoded_input(r#"{"kind":"dot","index":2}"#));
    assert_eq!(slider.current_index(), Some(2));
    assert!(slider.is_autoplaying());

    let dot = nth(&root, ".phone-slider__dot", 2);
    assert!(dot.class_list().contains("phone-slider__dot--active"));
    assert_eq!(dot.get_attribute("aria-selected").as_deref(), Some("true"));
    let old = nth(&root, ".phone-slider__slide", 0);
    assert!(!old.class_list().contains("phone-slider__slide--active"));

    assert!(!slider.push_encoded_input("not json"));
}

#[wasm_bindgen_test]
fn dot_click_navigates() {
    let root = build_slider(4, 4);
    let slider = PhoneSlider::new(root.clone(), None).expect("mount");
    let dot = nth(&root, ".phone-slider__dot", 3)
        .dyn_into::<web_sys::HtmlElement>()
        .expect("html element");
    dot.click();
    assert_eq!(slider.current_index(), Some(3));
}

#[wasm_bindgen_test]
fn root_without_slides_is_inert() {
    let root = build_slider(0, 2);
    let slider = PhoneSlider::new(root, None).expect("mount");
    assert!(!slider.is_active());
    assert_eq!(slider.current_index(), None);
    assert!(!slider.push_encoded_input(r#"{"kind":"dot","index":0}"#));
}

#[wasm_bindgen_test]
fn config_attribute_and_destroy() {
    let root = build_slider(2, 2);
    root.set_attribute("data-slider-config", r#"{"autoplay_interval_ms":50}"#)
        .expect("set attribute");
    let mut slider = PhoneSlider::new(root, None).expect("mount");
    assert!(slider.push_encoded_input(r#"{"kind":"visibility","visible":true}"#));
    assert!(slider.is_autoplaying());
    slider.destroy();
    assert!(!slider.is_active());
    assert!(!slider.is_autoplaying());
}

#[wasm_bindgen_test]
fn touchend_without_coordinates_resumes_autoplay() {
    let root = build_slider(3, 3);
    let slider = PhoneSlider::new(root.clone(), None).expect("mount");
    assert!(slider.push_encoded_input(r#"{"kind":"visibility","visible":true}"#));
    assert!(slider.push_encoded_input(r#"{"kind":"touch","phase":"start","x":300}"#));
    assert!(!slider.is_autoplaying());

    let bare = web_sys::Event::new("touchend").expect("event");
    root.dispatch_event(&bare).expect("dispatch");
    assert!(slider.is_autoplaying());
    assert_eq!(slider.current_index(), Some(0));
}
