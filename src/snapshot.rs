//! Snapshot export: rasterize the page header through the host-provided
//! `html2canvas` routine, composite the top slice of the drawing canvas
//! over it, and hand the result to the browser as a PNG download.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlAnchorElement, HtmlButtonElement, HtmlCanvasElement,
    HtmlElement,
};

use crate::dom;

/// Glyph revert delay after a successful or failed export.
pub const GLYPH_REVERT_MS: i32 = 1500;

const GLYPH_READY: &str = "\u{1f4be}"; // floppy disk
const GLYPH_BUSY: &str = "\u{23f3}"; // hourglass
const GLYPH_DONE: &str = "\u{2713}";
const GLYPH_FAILED: &str = "\u{2717}";

#[wasm_bindgen]
extern "C" {
    /// External DOM rasterizer loaded by the host page.
    #[wasm_bindgen(catch, js_name = html2canvas)]
    fn html2canvas(target: &web_sys::Element, options: &JsValue) -> Result<js_sys::Promise, JsValue>;
}

/// Download name for a capture taken at the given ISO-8601 instant:
/// seconds precision, colons replaced so the name is filesystem-safe.
pub fn snapshot_filename(iso_timestamp: &str) -> String {
    let stamp: String = iso_timestamp
        .chars()
        .take(19)
        .map(|c| if c == ':' { '-' } else { c })
        .collect();
    format!("dragas-sketch-{stamp}.png")
}

/// Source rectangle of the drawing canvas that gets composited over the
/// capture: full canvas width by the header's on-screen height.
pub fn overlay_source_rect(canvas_width: u32, header_height: i32) -> (f64, f64, f64, f64) {
    (
        0.0,
        0.0,
        f64::from(canvas_width),
        f64::from(header_height.max(0)),
    )
}

async fn capture_and_download(
    btn: &HtmlButtonElement,
    canvas: &HtmlCanvasElement,
    header: &HtmlElement,
    doc: &Document,
) -> Result<(), JsValue> {
    let header_height = header.offset_height();

    // The export must not contain the export button or the live trail;
    // hide both for the duration of the capture.
    let btn_display = btn.style().get_property_value("display").unwrap_or_default();
    let canvas_display = canvas
        .style()
        .get_property_value("display")
        .unwrap_or_default();
    btn.style().set_property("display", "none")?;
    canvas.style().set_property("display", "none")?;

    let options = js_sys::Object::new();
    js_sys::Reflect::set(&options, &"useCORS".into(), &true.into())?;
    js_sys::Reflect::set(&options, &"allowTaint".into(), &true.into())?;
    js_sys::Reflect::set(&options, &"scale".into(), &2.into())?;
    js_sys::Reflect::set(&options, &"logging".into(), &false.into())?;

    let captured = JsFuture::from(html2canvas(header, &options.into())?).await;

    // Restore visibility before inspecting the result so a failed capture
    // still leaves the page intact.
    btn.style().set_property("display", &btn_display)?;
    canvas.style().set_property("display", &canvas_display)?;
    let capture: HtmlCanvasElement = captured?.dyn_into()?;

    let composite: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
    composite.set_width(capture.width());
    composite.set_height(capture.height());
    let ctx: CanvasRenderingContext2d = composite
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    ctx.draw_image_with_html_canvas_element(&capture, 0.0, 0.0)?;
    let (sx, sy, sw, sh) = overlay_source_rect(canvas.width(), header_height);
    ctx.draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
        canvas,
        sx,
        sy,
        sw,
        sh,
        0.0,
        0.0,
        f64::from(composite.width()),
        f64::from(composite.height()),
    )?;

    let link: HtmlAnchorElement = doc.create_element("a")?.dyn_into()?;
    let iso = String::from(js_sys::Date::new_0().to_iso_string());
    link.set_href(&composite.to_data_url_with_type("image/png")?);
    link.set_download(&snapshot_filename(&iso));
    link.click();
    Ok(())
}

pub(crate) fn init(doc: &Document) -> Result<(), JsValue> {
    let btn: HtmlButtonElement = dom::by_id(doc, "snapshotBtn")?.dyn_into()?;
    let canvas: HtmlCanvasElement = dom::by_id(doc, "drawingCanvas")?.dyn_into()?;
    let header: HtmlElement = doc
        .query_selector("header")?
        .ok_or_else(|| JsValue::from_str("missing header"))?
        .dyn_into()?;

    let listener_btn = btn.clone();
    let doc = doc.clone();
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
        let btn = btn.clone();
        let canvas = canvas.clone();
        let header = header.clone();
        let doc = doc.clone();
        spawn_local(async move {
            btn.set_text_content(Some(GLYPH_BUSY));
            btn.set_disabled(true);
            match capture_and_download(&btn, &canvas, &header, &doc).await {
                Ok(()) => {
                    btn.set_text_content(Some(GLYPH_DONE));
                    let btn = btn.clone();
                    dom::set_timeout(GLYPH_REVERT_MS, move || {
                        btn.set_text_content(Some(GLYPH_READY));
                        btn.set_disabled(false);
                    })
                    .ok();
                }
                Err(err) => {
                    web_sys::console::error_2(&JsValue::from_str("Snapshot failed:"), &err);
                    btn.set_text_content(Some(GLYPH_FAILED));
                    btn.set_disabled(false);
                    let btn = btn.clone();
                    dom::set_timeout(GLYPH_REVERT_MS, move || {
                        btn.set_text_content(Some(GLYPH_READY));
                    })
                    .ok();
                }
            }
        });
    }) as Box<dyn FnMut(_)>);
    listener_btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_replaces_colons_and_truncates_to_seconds() {
        assert_eq!(
            snapshot_filename("2026-08-25T14:03:59.123Z"),
            "dragas-sketch-2026-08-25T14-03-59.png"
        );
    }

    #[test]
    fn filename_handles_short_input() {
        assert_eq!(snapshot_filename("2026-08-25"), "dragas-sketch-2026-08-25.png");
    }

    #[test]
    fn overlay_rect_spans_canvas_width_by_header_height() {
        assert_eq!(overlay_source_rect(1920, 400), (0.0, 0.0, 1920.0, 400.0));
    }

    #[test]
    fn overlay_rect_clamps_negative_header_height() {
        assert_eq!(overlay_source_rect(800, -10), (0.0, 0.0, 800.0, 0.0));
    }
}
