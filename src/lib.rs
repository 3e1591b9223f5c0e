//! Dragas site interaction layer.
//!
//! Client-side behavior for the single-page portfolio, compiled to wasm
//! and driven entirely by browser events: scroll-triggered fade-ins and
//! parallax, the font preview modal, the gallery lightbox, the pointer
//! drawing trail, and the header snapshot export. `start_site()` wires
//! every component to the host document; the state machines behind the
//! lightbox and the trail are pure Rust and tested natively.

use wasm_bindgen::prelude::*;

pub mod dom;
pub mod font_modal;
pub mod gallery;
pub mod page;
pub mod snapshot;
pub mod trail;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Wire every interaction component to the host document. Required
/// elements (modal containers, the drawing canvas, the snapshot button)
/// must exist; decorative hooks tolerate missing targets.
#[wasm_bindgen]
pub fn start_site() -> Result<(), JsValue> {
    let doc = dom::document()?;
    page::init(&doc)?;
    font_modal::init(&doc)?;
    gallery::init(&doc)?;
    trail::init(&doc)?;
    snapshot::init(&doc)?;
    Ok(())
}
