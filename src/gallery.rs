//! Gallery lightbox: an ordered image set with a clamped cursor, shown in
//! the `#galleryModal` overlay with prev/next navigation.
//!
//! The state machine is pure and renders through the [`GalleryView`]
//! capability so navigation logic runs under native `cargo test`; the DOM
//! binding at the bottom of this module is only exercised in the browser.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlImageElement};

use crate::dom;

/// Presentation surface the lightbox renders into.
pub trait GalleryView {
    fn show_image(&mut self, src: &str);
    /// 1-based position plus total count.
    fn set_counter(&mut self, position: usize, total: usize);
    fn set_prev_enabled(&mut self, enabled: bool);
    fn set_next_enabled(&mut self, enabled: bool);
    /// Modal visibility; also locks/unlocks background scrolling.
    fn set_visible(&mut self, visible: bool);
}

/// Lightbox state machine. `images`/`index` are rebuilt on every open and
/// only meaningful while `open` is true.
#[derive(Debug, Default)]
pub struct Gallery {
    images: Vec<String>,
    index: usize,
    open: bool,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Open on `clicked` within its group. `images` replaces any previous
    /// group wholesale; the index falls back to 0 if the clicked ref is
    /// somehow absent so the `index < len` invariant holds regardless.
    pub fn open(&mut self, clicked: &str, images: Vec<String>, view: &mut impl GalleryView) {
        self.index = images.iter().position(|src| src == clicked).unwrap_or(0);
        self.images = images;
        self.open = true;
        self.render(view);
        view.set_visible(true);
    }

    pub fn navigate_previous(&mut self, view: &mut impl GalleryView) {
        if self.open && self.index > 0 {
            self.index -= 1;
            self.render(view);
        }
    }

    pub fn navigate_next(&mut self, view: &mut impl GalleryView) {
        if self.open && self.index + 1 < self.images.len() {
            self.index += 1;
            self.render(view);
        }
    }

    pub fn close(&mut self, view: &mut impl GalleryView) {
        if !self.open {
            return;
        }
        self.open = false;
        view.set_visible(false);
    }

    /// Keyboard contract, active only while open. Returns whether the key
    /// was consumed.
    pub fn handle_key(&mut self, key: &str, view: &mut impl GalleryView) -> bool {
        if !self.open {
            return false;
        }
        match key {
            "Escape" => {
                self.close(view);
                true
            }
            "ArrowLeft" => {
                self.navigate_previous(view);
                true
            }
            "ArrowRight" => {
                self.navigate_next(view);
                true
            }
            _ => false,
        }
    }

    fn render(&self, view: &mut impl GalleryView) {
        if let Some(src) = self.images.get(self.index) {
            view.show_image(src);
        }
        view.set_counter(self.index + 1, self.images.len());
        view.set_prev_enabled(self.index > 0);
        view.set_next_enabled(self.index + 1 < self.images.len());
    }
}

// --- DOM binding --------------------------------------------------------------

struct DomGalleryView {
    modal: Element,
    image: HtmlImageElement,
    current: Element,
    total: Element,
    prev: HtmlButtonElement,
    next: HtmlButtonElement,
    body: HtmlElement,
}

impl GalleryView for DomGalleryView {
    fn show_image(&mut self, src: &str) {
        self.image.set_src(src);
    }

    fn set_counter(&mut self, position: usize, total: usize) {
        self.current.set_text_content(Some(&position.to_string()));
        self.total.set_text_content(Some(&total.to_string()));
    }

    fn set_prev_enabled(&mut self, enabled: bool) {
        self.prev.set_disabled(!enabled);
    }

    fn set_next_enabled(&mut self, enabled: bool) {
        self.next.set_disabled(!enabled);
    }

    fn set_visible(&mut self, visible: bool) {
        if visible {
            self.modal.class_list().add_1("active").ok();
            self.body.style().set_property("overflow", "hidden").ok();
        } else {
            self.modal.class_list().remove_1("active").ok();
            self.body.style().set_property("overflow", "auto").ok();
        }
    }
}

struct GalleryRuntime {
    state: Gallery,
    view: DomGalleryView,
}

thread_local! {
    static GALLERY: RefCell<Option<GalleryRuntime>> = const { RefCell::new(None) };
}

fn with_gallery(f: impl FnOnce(&mut Gallery, &mut DomGalleryView)) {
    GALLERY.with(|cell| {
        if let Some(rt) = cell.borrow_mut().as_mut() {
            let GalleryRuntime { state, view } = rt;
            f(state, view);
        }
    });
}

pub(crate) fn init(doc: &Document) -> Result<(), JsValue> {
    let modal = dom::by_id(doc, "galleryModal")?;
    let image: HtmlImageElement = dom::by_id(doc, "galleryModalImage")?.dyn_into()?;
    let current = dom::by_id(doc, "galleryCurrentImage")?;
    let total = dom::by_id(doc, "galleryTotalImages")?;
    let prev: HtmlButtonElement = dom::by_id(doc, "galleryNavPrev")?.dyn_into()?;
    let next: HtmlButtonElement = dom::by_id(doc, "galleryNavNext")?.dyn_into()?;
    let close_btn = dom::by_id(doc, "galleryModalClose")?;
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;

    GALLERY.with(|cell| {
        cell.replace(Some(GalleryRuntime {
            state: Gallery::new(),
            view: DomGalleryView {
                modal: modal.clone(),
                image,
                current,
                total,
                prev: prev.clone(),
                next: next.clone(),
                body,
            },
        }))
    });

    // Any image inside a project gallery opens the lightbox on its group.
    let thumbs = doc.query_selector_all(".gallery-item img, .gallery-main img")?;
    for i in 0..thumbs.length() {
        let Some(node) = thumbs.item(i) else { continue };
        let img: HtmlImageElement = node.dyn_into()?;
        let clicked_img = img.clone();
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            evt.stop_propagation();
            let Ok(Some(group)) = clicked_img.closest(".project-gallery") else {
                return;
            };
            let mut images = Vec::new();
            if let Ok(list) = group.query_selector_all("img") {
                for j in 0..list.length() {
                    if let Some(n) = list.item(j) {
                        if let Ok(im) = n.dyn_into::<HtmlImageElement>() {
                            images.push(im.src());
                        }
                    }
                }
            }
            let clicked = clicked_img.src();
            with_gallery(|state, view| state.open(&clicked, images, view));
        }) as Box<dyn FnMut(_)>);
        img.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_gallery(|state, view| state.navigate_previous(view));
        }) as Box<dyn FnMut(_)>);
        prev.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_gallery(|state, view| state.navigate_next(view));
        }) as Box<dyn FnMut(_)>);
        next.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_gallery(|state, view| state.close(view));
        }) as Box<dyn FnMut(_)>);
        close_btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Backdrop click: only when the modal surface itself is the target,
    // not its content.
    {
        let backdrop = modal.clone();
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            let Some(target) = evt.target() else { return };
            let target: &JsValue = target.as_ref();
            if target == AsRef::<JsValue>::as_ref(&backdrop) {
                with_gallery(|state, view| state.close(view));
            }
        }) as Box<dyn FnMut(_)>);
        modal.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            with_gallery(|state, view| {
                state.handle_key(&evt.key(), view);
            });
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}
