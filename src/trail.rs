//! Pointer drawing trail: distressed marks accumulate on `#drawingCanvas`
//! while the page is near the top, with a rotating custom cursor
//! (`#customCursor`) following the pointer. Scrolling past the threshold
//! suppresses drawing and fades the surface out; clicks schedule a delayed
//! wipe. All of it is decorative, so clears are allowed to be lossy.
//!
//! The state machine and the segment subdivision are pure and run under
//! native `cargo test` through the [`TrailView`] capability; the DOM
//! binding below drives the real canvas.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement};

use crate::dom;

/// Scroll offset (px) past which drawing is suppressed.
pub const SUPPRESS_THRESHOLD: f64 = 50.0;
/// Surface wipe delay after the fade-out kicks in.
pub const FADE_CLEAR_DELAY_MS: i32 = 300;
/// Surface wipe delay after a click while not suppressed.
pub const CLICK_CLEAR_DELAY_MS: i32 = 3000;

/// Deferred surface wipes. Timers are fire-and-forget and never
/// cancelled; overlapping wipes are idempotent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelayedAction {
    ClearAfterFade,
    ClearAfterClick,
}

/// Presentation surface the trail renders into.
pub trait TrailView {
    fn resize_surface(&mut self, width: f64, height: f64);
    fn clear_surface(&mut self);
    fn paint_mark(&mut self, x: f64, y: f64, radius: f64);
    fn set_indicator_visible(&mut self, visible: bool);
    fn move_indicator(&mut self, x: f64, y: f64, heading: f64);
    /// true restores the system cursor, false hides it in favor of the
    /// custom indicator.
    fn set_system_cursor(&mut self, system: bool);
    fn begin_fade(&mut self);
    fn end_fade(&mut self);
    fn schedule(&mut self, action: DelayedAction, delay_ms: i32);
}

/// Jitter source for the distressed stroke. Plain linear congruential
/// step; not crypto secure, but deterministic under a fixed seed which is
/// what the tests need.
#[derive(Debug)]
pub struct Jitter {
    state: u64,
}

impl Jitter {
    pub fn seeded(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Uniform-ish sample in [0, 1).
    pub fn next_unit(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        ((self.state >> 16) & 0xffff_ffff) as f64 / 4_294_967_296.0
    }

    /// Per-axis offset in [-0.75, +0.75].
    fn offset(&mut self) -> f64 {
        (self.next_unit() - 0.5) * 1.5
    }

    /// Mark radius in [1.0, 2.5).
    fn radius(&mut self) -> f64 {
        self.next_unit() * 1.5 + 1.0
    }
}

/// Paint a visually continuous run of jittered dots between two points,
/// roughly one sample per 2px of travel. Zero-length input paints nothing.
pub fn draw_segment(
    from_x: f64,
    from_y: f64,
    to_x: f64,
    to_y: f64,
    jitter: &mut Jitter,
    view: &mut impl TrailView,
) {
    let distance = (to_x - from_x).hypot(to_y - from_y);
    let segments = (distance / 2.0).ceil() as u32;
    for i in 0..segments {
        let t = f64::from(i) / f64::from(segments);
        let x = from_x + (to_x - from_x) * t;
        let y = from_y + (to_y - from_y) * t;
        let (ox, oy) = (jitter.offset(), jitter.offset());
        let r = jitter.radius();
        view.paint_mark(x + ox, y + oy, r);
    }
}

/// Trail state machine. `last` is only meaningful while `drawing` holds;
/// `suppressed` transitions are edge-triggered on the scroll path.
#[derive(Debug)]
pub struct Trail {
    last_x: f64,
    last_y: f64,
    heading: f64,
    drawing: bool,
    suppressed: bool,
}

impl Default for Trail {
    fn default() -> Self {
        Self::new()
    }
}

impl Trail {
    pub fn new() -> Self {
        Self {
            last_x: 0.0,
            last_y: 0.0,
            heading: 0.0,
            drawing: false,
            suppressed: false,
        }
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Viewport resize discards prior surface content.
    pub fn on_resize(&self, width: f64, height: f64, view: &mut impl TrailView) {
        view.resize_surface(width, height);
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64, jitter: &mut Jitter, view: &mut impl TrailView) {
        if self.suppressed {
            view.set_indicator_visible(false);
            return;
        }
        view.set_indicator_visible(true);

        if !self.drawing {
            // First move after (re)activation: record only, so we never
            // paint a spurious stroke from a stale point.
            self.drawing = true;
            self.last_x = x;
            self.last_y = y;
        } else {
            let (from_x, from_y) = (self.last_x, self.last_y);
            draw_segment(from_x, from_y, x, y, jitter, view);
            // Heading comes from the pre-update delta; an unmoved pointer
            // keeps the previous heading.
            if from_x != x || from_y != y {
                self.heading = (y - from_y).atan2(x - from_x);
            }
            self.last_x = x;
            self.last_y = y;
        }

        view.move_indicator(x, y, self.heading);
    }

    pub fn on_pointer_leave(&mut self, view: &mut impl TrailView) {
        self.drawing = false;
        view.set_indicator_visible(false);
    }

    /// Edge-triggered suppression: entering the suppressed state fades the
    /// surface and schedules exactly one wipe; staying suppressed does
    /// nothing more.
    pub fn on_scroll(&mut self, offset: f64, view: &mut impl TrailView) {
        if offset > SUPPRESS_THRESHOLD {
            if !self.suppressed {
                self.suppressed = true;
                view.begin_fade();
                view.set_indicator_visible(false);
                view.set_system_cursor(true);
                view.schedule(DelayedAction::ClearAfterFade, FADE_CLEAR_DELAY_MS);
            }
        } else {
            self.suppressed = false;
            view.end_fade();
            view.set_system_cursor(false);
        }
    }

    pub fn on_click(&mut self, view: &mut impl TrailView) {
        if !self.suppressed {
            view.schedule(DelayedAction::ClearAfterClick, CLICK_CLEAR_DELAY_MS);
        }
    }

    pub fn on_delayed(&mut self, action: DelayedAction, view: &mut impl TrailView) {
        match action {
            DelayedAction::ClearAfterFade => {
                view.clear_surface();
                view.end_fade();
            }
            DelayedAction::ClearAfterClick => {
                view.clear_surface();
                self.drawing = false;
                view.set_indicator_visible(false);
            }
        }
    }

    pub fn on_load(&mut self, view: &mut impl TrailView) {
        view.clear_surface();
        self.suppressed = false;
        view.set_indicator_visible(false);
    }
}

// --- DOM binding --------------------------------------------------------------

struct DomTrailView {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    cursor: HtmlElement,
    body: HtmlElement,
}

impl TrailView for DomTrailView {
    fn resize_surface(&mut self, width: f64, height: f64) {
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
    }

    fn clear_surface(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn paint_mark(&mut self, x: f64, y: f64, radius: f64) {
        self.ctx.set_fill_style_str("rgba(26, 26, 26, 0.6)");
        self.ctx.begin_path();
        self.ctx.arc(x, y, radius, 0.0, std::f64::consts::TAU).ok();
        self.ctx.fill();
    }

    fn set_indicator_visible(&mut self, visible: bool) {
        self.cursor
            .style()
            .set_property("opacity", if visible { "1" } else { "0" })
            .ok();
    }

    fn move_indicator(&mut self, x: f64, y: f64, heading: f64) {
        let style = self.cursor.style();
        style.set_property("left", &format!("{x}px")).ok();
        style.set_property("top", &format!("{y}px")).ok();
        style
            .set_property("transform", &format!("rotate({heading}rad)"))
            .ok();
    }

    fn set_system_cursor(&mut self, system: bool) {
        self.body
            .style()
            .set_property("cursor", if system { "auto" } else { "none" })
            .ok();
    }

    fn begin_fade(&mut self) {
        self.canvas.class_list().add_1("fade-out").ok();
    }

    fn end_fade(&mut self) {
        self.canvas.class_list().remove_1("fade-out").ok();
    }

    fn schedule(&mut self, action: DelayedAction, delay_ms: i32) {
        dom::set_timeout(delay_ms, move || {
            with_trail(|state, view, _| state.on_delayed(action, view));
        })
        .ok();
    }
}

struct TrailRuntime {
    state: Trail,
    view: DomTrailView,
    jitter: Jitter,
}

thread_local! {
    static TRAIL: RefCell<Option<TrailRuntime>> = const { RefCell::new(None) };
}

fn with_trail(f: impl FnOnce(&mut Trail, &mut DomTrailView, &mut Jitter)) {
    TRAIL.with(|cell| {
        if let Some(rt) = cell.borrow_mut().as_mut() {
            let TrailRuntime {
                state,
                view,
                jitter,
            } = rt;
            f(state, view, jitter);
        }
    });
}

fn viewport_size(win: &web_sys::Window) -> (f64, f64) {
    let w = win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (w, h)
}

pub(crate) fn init(doc: &Document) -> Result<(), JsValue> {
    let canvas: HtmlCanvasElement = dom::by_id(doc, "drawingCanvas")?.dyn_into()?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;
    let cursor: HtmlElement = dom::by_id(doc, "customCursor")?.dyn_into()?;
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;

    TRAIL.with(|cell| {
        cell.replace(Some(TrailRuntime {
            state: Trail::new(),
            view: DomTrailView {
                canvas,
                ctx,
                cursor,
                body,
            },
            jitter: Jitter::seeded(dom::performance_now().to_bits() | 1),
        }))
    });

    let win = dom::window()?;
    let (w, h) = viewport_size(&win);
    with_trail(|state, view, _| state.on_resize(w, h, view));

    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            if let Some(win) = web_sys::window() {
                let (w, h) = viewport_size(&win);
                with_trail(|state, view, _| state.on_resize(w, h, view));
            }
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            let (x, y) = (f64::from(evt.client_x()), f64::from(evt.client_y()));
            with_trail(|state, view, jitter| state.on_pointer_move(x, y, jitter, view));
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_trail(|state, view, _| state.on_pointer_leave(view));
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            let offset = web_sys::window()
                .and_then(|w| w.scroll_y().ok())
                .unwrap_or(0.0);
            with_trail(|state, view, _| state.on_scroll(offset, view));
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_trail(|state, view, _| state.on_click(view));
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            with_trail(|state, view, _| state.on_load(view));
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("load", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct StubView {
        marks: Vec<(f64, f64, f64)>,
        clears: usize,
        indicator_visible: Option<bool>,
        indicator: Option<(f64, f64, f64)>,
        system_cursor: Option<bool>,
        fades: usize,
        fade_ends: usize,
        scheduled: Vec<(DelayedAction, i32)>,
        resized: Option<(f64, f64)>,
    }

    impl TrailView for StubView {
        fn resize_surface(&mut self, width: f64, height: f64) {
            self.resized = Some((width, height));
        }
        fn clear_surface(&mut self) {
            self.clears += 1;
        }
        fn paint_mark(&mut self, x: f64, y: f64, radius: f64) {
            self.marks.push((x, y, radius));
        }
        fn set_indicator_visible(&mut self, visible: bool) {
            self.indicator_visible = Some(visible);
        }
        fn move_indicator(&mut self, x: f64, y: f64, heading: f64) {
            self.indicator = Some((x, y, heading));
        }
        fn set_system_cursor(&mut self, system: bool) {
            self.system_cursor = Some(system);
        }
        fn begin_fade(&mut self) {
            self.fades += 1;
        }
        fn end_fade(&mut self) {
            self.fade_ends += 1;
        }
        fn schedule(&mut self, action: DelayedAction, delay_ms: i32) {
            self.scheduled.push((action, delay_ms));
        }
    }

    #[test]
    fn first_move_records_without_painting() {
        let mut trail = Trail::new();
        let mut view = StubView::default();
        let mut jitter = Jitter::seeded(7);
        trail.on_pointer_move(10.0, 10.0, &mut jitter, &mut view);
        assert!(trail.is_drawing());
        assert!(view.marks.is_empty());
        assert_eq!(view.indicator_visible, Some(true));
    }

    #[test]
    fn subsequent_moves_paint_one_segment_each() {
        let mut trail = Trail::new();
        let mut view = StubView::default();
        let mut jitter = Jitter::seeded(7);
        trail.on_pointer_move(0.0, 0.0, &mut jitter, &mut view);
        trail.on_pointer_move(10.0, 0.0, &mut jitter, &mut view);
        // 10px of travel at one sample per 2px.
        assert_eq!(view.marks.len(), 5);
        trail.on_pointer_move(10.0, 6.0, &mut jitter, &mut view);
        assert_eq!(view.marks.len(), 8);
    }

    #[test]
    fn unmoved_pointer_keeps_heading_and_paints_nothing() {
        let mut trail = Trail::new();
        let mut view = StubView::default();
        let mut jitter = Jitter::seeded(1);
        trail.on_pointer_move(0.0, 0.0, &mut jitter, &mut view);
        trail.on_pointer_move(10.0, 10.0, &mut jitter, &mut view);
        let heading = trail.heading();
        assert!((heading - std::f64::consts::FRAC_PI_4).abs() < 1e-12);

        let marks_before = view.marks.len();
        trail.on_pointer_move(10.0, 10.0, &mut jitter, &mut view);
        assert_eq!(view.marks.len(), marks_before);
        assert_eq!(trail.heading(), heading);
    }

    #[test]
    fn heading_tracks_movement_direction() {
        let mut trail = Trail::new();
        let mut view = StubView::default();
        let mut jitter = Jitter::seeded(1);
        trail.on_pointer_move(0.0, 0.0, &mut jitter, &mut view);
        trail.on_pointer_move(0.0, 5.0, &mut jitter, &mut view);
        assert!((trail.heading() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        let (_, _, indicator_heading) = view.indicator.unwrap();
        assert_eq!(indicator_heading, trail.heading());
    }

    #[test]
    fn suppressed_moves_only_hide_the_indicator() {
        let mut trail = Trail::new();
        let mut view = StubView::default();
        let mut jitter = Jitter::seeded(3);
        trail.on_scroll(120.0, &mut view);
        trail.on_pointer_move(5.0, 5.0, &mut jitter, &mut view);
        trail.on_pointer_move(50.0, 50.0, &mut jitter, &mut view);
        assert!(view.marks.is_empty());
        assert_eq!(view.indicator_visible, Some(false));
        assert!(!trail.is_drawing());
    }

    #[test]
    fn scroll_suppression_is_edge_triggered() {
        let mut trail = Trail::new();
        let mut view = StubView::default();
        trail.on_scroll(60.0, &mut view);
        assert!(trail.is_suppressed());
        assert_eq!(view.scheduled, vec![(DelayedAction::ClearAfterFade, FADE_CLEAR_DELAY_MS)]);
        assert_eq!(view.system_cursor, Some(true));
        assert_eq!(view.fades, 1);

        // Staying past the threshold schedules nothing further.
        trail.on_scroll(80.0, &mut view);
        trail.on_scroll(400.0, &mut view);
        assert_eq!(view.scheduled.len(), 1);

        // Returning to the top restores the custom cursor.
        trail.on_scroll(10.0, &mut view);
        assert!(!trail.is_suppressed());
        assert_eq!(view.system_cursor, Some(false));

        // And the next deep scroll triggers a fresh wipe.
        trail.on_scroll(60.0, &mut view);
        assert_eq!(view.scheduled.len(), 2);
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut trail = Trail::new();
        let mut view = StubView::default();
        trail.on_scroll(50.0, &mut view);
        assert!(!trail.is_suppressed());
        trail.on_scroll(50.1, &mut view);
        assert!(trail.is_suppressed());
    }

    #[test]
    fn click_schedules_wipe_only_while_not_suppressed() {
        let mut trail = Trail::new();
        let mut view = StubView::default();
        trail.on_click(&mut view);
        assert_eq!(view.scheduled, vec![(DelayedAction::ClearAfterClick, CLICK_CLEAR_DELAY_MS)]);
        trail.on_scroll(100.0, &mut view);
        view.scheduled.clear();
        trail.on_click(&mut view);
        assert!(view.scheduled.is_empty());
    }

    #[test]
    fn click_wipe_resets_drawing_so_next_move_does_not_paint() {
        let mut trail = Trail::new();
        let mut view = StubView::default();
        let mut jitter = Jitter::seeded(9);
        trail.on_pointer_move(0.0, 0.0, &mut jitter, &mut view);
        trail.on_pointer_move(20.0, 0.0, &mut jitter, &mut view);
        assert!(!view.marks.is_empty());

        trail.on_delayed(DelayedAction::ClearAfterClick, &mut view);
        assert_eq!(view.clears, 1);
        assert!(!trail.is_drawing());

        let marks_before = view.marks.len();
        trail.on_pointer_move(100.0, 100.0, &mut jitter, &mut view);
        assert_eq!(view.marks.len(), marks_before);
    }

    #[test]
    fn fade_wipe_clears_and_ends_fade() {
        let mut trail = Trail::new();
        let mut view = StubView::default();
        trail.on_scroll(60.0, &mut view);
        trail.on_delayed(DelayedAction::ClearAfterFade, &mut view);
        assert_eq!(view.clears, 1);
        assert_eq!(view.fade_ends, 1);
        // Suppression itself persists until the scroll offset drops back.
        assert!(trail.is_suppressed());
    }

    #[test]
    fn load_resets_suppression_and_clears() {
        let mut trail = Trail::new();
        let mut view = StubView::default();
        trail.on_scroll(70.0, &mut view);
        trail.on_load(&mut view);
        assert!(!trail.is_suppressed());
        assert_eq!(view.clears, 1);
        assert_eq!(view.indicator_visible, Some(false));
    }

    #[test]
    fn segment_subdivision_matches_distance() {
        let mut view = StubView::default();
        let mut jitter = Jitter::seeded(42);
        draw_segment(0.0, 0.0, 7.0, 0.0, &mut jitter, &mut view);
        assert_eq!(view.marks.len(), 4); // ceil(7 / 2)

        view.marks.clear();
        draw_segment(3.0, 3.0, 3.0, 3.0, &mut jitter, &mut view);
        assert!(view.marks.is_empty()); // ceil(0 / 2) = 0
    }

    #[test]
    fn marks_stay_within_jitter_and_radius_bounds() {
        let mut view = StubView::default();
        let mut jitter = Jitter::seeded(1234);
        draw_segment(0.0, 0.0, 200.0, 0.0, &mut jitter, &mut view);
        assert_eq!(view.marks.len(), 100);
        for (i, &(x, y, r)) in view.marks.iter().enumerate() {
            let t = i as f64 / 100.0;
            let base_x = 200.0 * t;
            assert!((x - base_x).abs() <= 0.75, "x jitter out of range at {i}");
            assert!(y.abs() <= 0.75, "y jitter out of range at {i}");
            assert!((1.0..2.5).contains(&r), "radius {r} out of range at {i}");
        }
    }

    #[test]
    fn jitter_is_deterministic_per_seed() {
        let mut a = Jitter::seeded(5);
        let mut b = Jitter::seeded(5);
        for _ in 0..32 {
            assert_eq!(a.next_unit().to_bits(), b.next_unit().to_bits());
        }
    }
}
