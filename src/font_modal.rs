//! Font preview modal: clicking a `.font-item` applies its typeface to the
//! preview surfaces and opens `#fontModal`; the input and slider keep the
//! preview text and size live.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

use crate::dom;

/// Preview body text with the placeholder fallback for empty input.
pub fn preview_text(input: &str) -> &str {
    if input.is_empty() {
        "Type something..."
    } else {
        input
    }
}

/// Label shown next to the size slider, e.g. "24px".
pub fn font_size_label(px: &str) -> String {
    format!("{px}px")
}

fn open(modal: &Element, body: &HtmlElement) {
    modal.class_list().add_1("active").ok();
    body.style().set_property("overflow", "hidden").ok();
}

fn close(modal: &Element, body: &HtmlElement) {
    modal.class_list().remove_1("active").ok();
    body.style().set_property("overflow", "auto").ok();
}

pub(crate) fn init(doc: &Document) -> Result<(), JsValue> {
    let modal = dom::by_id(doc, "fontModal")?;
    let modal_close = dom::by_id(doc, "modalClose")?;
    let preview_input: HtmlInputElement = dom::by_id(doc, "previewInput")?.dyn_into()?;
    let preview_output: HtmlElement = dom::by_id(doc, "previewOutput")?.dyn_into()?;
    let size_slider: HtmlInputElement = dom::by_id(doc, "fontSizeSlider")?.dyn_into()?;
    let size_value = dom::by_id(doc, "fontSizeValue")?;
    let modal_font_name = dom::by_id(doc, "modalFontName")?;
    let character_set: HtmlElement = dom::by_id(doc, "characterSet")?.dyn_into()?;
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;

    let items = doc.query_selector_all(".font-item")?;
    for i in 0..items.length() {
        let Some(node) = items.item(i) else { continue };
        let item: HtmlElement = node.dyn_into()?;
        let item_for_click = item.clone();
        let modal = modal.clone();
        let body = body.clone();
        let modal_font_name = modal_font_name.clone();
        let preview_output = preview_output.clone();
        let character_set = character_set.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            let data = item_for_click.dataset();
            let font_name = data.get("font").unwrap_or_default();
            let family = data.get("family").unwrap_or_default();

            modal_font_name.set_text_content(Some(&font_name));
            preview_output
                .style()
                .set_property("font-family", &family)
                .ok();
            character_set
                .style()
                .set_property("font-family", &family)
                .ok();

            open(&modal, &body);
        }) as Box<dyn FnMut(_)>);
        item.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let modal = modal.clone();
        let body = body.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            close(&modal, &body);
        }) as Box<dyn FnMut(_)>);
        modal_close.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Backdrop click closes only when the modal surface itself is hit.
    {
        let backdrop = modal.clone();
        let body = body.clone();
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            let Some(target) = evt.target() else { return };
            let target: &JsValue = target.as_ref();
            if target == AsRef::<JsValue>::as_ref(&backdrop) {
                close(&backdrop, &body);
            }
        }) as Box<dyn FnMut(_)>);
        modal.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Escape closes the modal while it is active.
    {
        let modal = modal.clone();
        let body = body.clone();
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            if evt.key() == "Escape" && modal.class_list().contains("active") {
                close(&modal, &body);
            }
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let input = preview_input.clone();
        let output = preview_output.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            let value = input.value();
            output.set_text_content(Some(preview_text(&value)));
        }) as Box<dyn FnMut(_)>);
        preview_input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let slider = size_slider.clone();
        let output = preview_output.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            let size = slider.value();
            let label = font_size_label(&size);
            size_value.set_text_content(Some(&label));
            output.style().set_property("font-size", &label).ok();
        }) as Box<dyn FnMut(_)>);
        size_slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_falls_back_to_placeholder() {
        assert_eq!(preview_text(""), "Type something...");
    }

    #[test]
    fn non_empty_input_passes_through() {
        assert_eq!(preview_text("Dragas"), "Dragas");
    }

    #[test]
    fn size_label_appends_px() {
        assert_eq!(font_size_label("24"), "24px");
    }
}
