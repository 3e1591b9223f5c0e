//! Page-level decorations: scroll-triggered fade-ins, the parallax accent
//! box, hover lift on gallery tiles, smooth in-page scrolling, and the
//! social button click log.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition,
};

use crate::dom;

/// Accent box vertical displacement for a given scroll offset.
pub fn parallax_offset(scroll_y: f64) -> f64 {
    scroll_y * 0.3
}

fn each_element(doc: &Document, selector: &str, mut f: impl FnMut(Element) -> Result<(), JsValue>) -> Result<(), JsValue> {
    let list = doc.query_selector_all(selector)?;
    for i in 0..list.length() {
        if let Some(node) = list.item(i) {
            if let Ok(el) = node.dyn_into::<Element>() {
                f(el)?;
            }
        }
    }
    Ok(())
}

fn init_fade_ins(doc: &Document) -> Result<(), JsValue> {
    let callback = Closure::wrap(Box::new(
        move |entries: js_sys::Array, _observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if !entry.is_intersecting() {
                    continue;
                }
                if let Ok(el) = entry.target().dyn_into::<HtmlElement>() {
                    el.style().set_property("opacity", "1").ok();
                    el.style().set_property("transform", "translateY(0)").ok();
                }
            }
        },
    )
        as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(0.1));
    options.set_root_margin("0px 0px -100px 0px");
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
    callback.forget();

    each_element(doc, ".fade-in-up", |el| {
        observer.observe(&el);
        Ok(())
    })
}

fn init_hover_lift(doc: &Document) -> Result<(), JsValue> {
    each_element(doc, ".gallery-item, .gallery-main", |el| {
        let item: HtmlElement = el.dyn_into()?;

        let enter_item = item.clone();
        let enter = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            enter_item
                .style()
                .set_property("transform", "translateY(-5px)")
                .ok();
        }) as Box<dyn FnMut(_)>);
        item.add_event_listener_with_callback("mouseenter", enter.as_ref().unchecked_ref())?;
        enter.forget();

        let leave_item = item.clone();
        let leave = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            leave_item
                .style()
                .set_property("transform", "translateY(0)")
                .ok();
        }) as Box<dyn FnMut(_)>);
        item.add_event_listener_with_callback("mouseleave", leave.as_ref().unchecked_ref())?;
        leave.forget();
        Ok(())
    })
}

fn init_smooth_scroll(doc: &Document) -> Result<(), JsValue> {
    each_element(doc, "a[href^=\"#\"]", |anchor| {
        let anchor_for_click = anchor.clone();
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            evt.prevent_default();
            let Some(href) = anchor_for_click.get_attribute("href") else {
                return;
            };
            let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Ok(Some(target)) = doc.query_selector(&href) {
                let options = ScrollIntoViewOptions::new();
                options.set_behavior(ScrollBehavior::Smooth);
                options.set_block(ScrollLogicalPosition::Start);
                target.scroll_into_view_with_scroll_into_view_options(&options);
            }
        }) as Box<dyn FnMut(_)>);
        anchor.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    })
}

/// Parallax repositioning is coalesced to one style write per animation
/// frame: the scroll listener only requests a frame when none is in
/// flight.
fn init_parallax(doc: &Document) -> Result<(), JsValue> {
    let ticking = Rc::new(Cell::new(false));
    let frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));

    {
        let ticking = ticking.clone();
        let doc = doc.clone();
        *frame.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
            if let Ok(Some(el)) = doc.query_selector(".accent-box") {
                if let Ok(el) = el.dyn_into::<HtmlElement>() {
                    let scrolled = web_sys::window()
                        .and_then(|w| w.scroll_y().ok())
                        .unwrap_or(0.0);
                    el.style()
                        .set_property(
                            "transform",
                            &format!("translateY({}px)", parallax_offset(scrolled)),
                        )
                        .ok();
                }
            }
            ticking.set(false);
        }) as Box<dyn FnMut(f64)>));
    }

    let win = dom::window()?;
    let scroll = {
        let ticking = ticking.clone();
        let frame = frame.clone();
        Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            if ticking.get() {
                return;
            }
            ticking.set(true);
            if let Some(w) = web_sys::window() {
                if let Some(cb) = frame.borrow().as_ref() {
                    let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
                }
            }
        }) as Box<dyn FnMut(_)>)
    };
    win.add_event_listener_with_callback("scroll", scroll.as_ref().unchecked_ref())?;
    scroll.forget();
    Ok(())
}

fn init_social_buttons(doc: &Document) -> Result<(), JsValue> {
    each_element(doc, ".social-btn", |btn| {
        let btn_for_click = btn.clone();
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            evt.prevent_default();
            let label = btn_for_click
                .get_attribute("aria-label")
                .unwrap_or_default();
            web_sys::console::log_2(
                &JsValue::from_str("Social link clicked:"),
                &JsValue::from_str(&label),
            );
        }) as Box<dyn FnMut(_)>);
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    })
}

pub(crate) fn init(doc: &Document) -> Result<(), JsValue> {
    init_fade_ins(doc)?;
    init_hover_lift(doc)?;
    init_smooth_scroll(doc)?;
    init_parallax(doc)?;
    init_social_buttons(doc)?;
    Ok(())
}
