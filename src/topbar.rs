//! Browser rendering of the navigation progress bar.
//!
//! A fixed `<canvas>` across the top of the viewport, painted from
//! [`BarAnimation`] frames on a ~60 fps timer. Timers are async tasks keyed by
//! ticket/generation numbers rather than stored handles, so a cancelled reveal
//! or a superseded animation loop simply finds itself stale and exits.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::config::IndicatorConfig;
use crate::consts::{EVENT_PAGE_LOADING_START, EVENT_PAGE_LOADING_STOP, INDICATOR_FRAME_MS};
use crate::error::BootError;
use crate::indicator::{BarAnimation, BarFrame, Debounce, IndicatorCommand};

const CANVAS_STYLE: &str =
    "position:fixed;top:0;left:0;right:0;margin:0;padding:0;z-index:100001;display:none;pointer-events:none";

fn now_ms() -> f64 {
    js_sys::Date::now()
}

fn js_err(context: &str, e: &wasm_bindgen::JsValue) -> BootError {
    BootError::Dom(format!("{context}: {e:?}"))
}

struct TopbarInner {
    config: IndicatorConfig,
    debounce: Debounce,
    animation: BarAnimation,
    canvas: Option<HtmlCanvasElement>,
    generation: u64,
}

impl TopbarInner {
    fn ensure_canvas(&mut self) -> Result<HtmlCanvasElement, BootError> {
        if let Some(canvas) = &self.canvas {
            return Ok(canvas.clone());
        }
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(BootError::NoWindow)?;
        let canvas = document
            .create_element("canvas")
            .map_err(|e| js_err("create canvas", &e))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| BootError::MissingElement("canvas".to_owned()))?;
        canvas
            .set_attribute("style", CANVAS_STYLE)
            .map_err(|e| js_err("canvas style", &e))?;
        let body = document.body().ok_or_else(|| BootError::MissingElement("body".to_owned()))?;
        body.append_child(&canvas).map_err(|e| js_err("append canvas", &e))?;
        self.canvas = Some(canvas.clone());
        Ok(canvas)
    }

    fn paint(&mut self, frame: BarFrame) -> Result<(), BootError> {
        let canvas = self.ensure_canvas()?;
        let width = web_sys::window()
            .ok_or(BootError::NoWindow)?
            .inner_width()
            .map_err(|e| js_err("innerWidth", &e))?
            .as_f64()
            .unwrap_or(0.0);
        let thickness = self.config.bar_thickness;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (pixel_width, pixel_height) = (width.max(0.0) as u32, (thickness * 5.0).max(1.0) as u32);
        canvas.set_width(pixel_width);
        canvas.set_height(pixel_height);

        let ctx = canvas
            .get_context("2d")
            .map_err(|e| js_err("2d context", &e))?
            .ok_or_else(|| BootError::MissingElement("2d context".to_owned()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| BootError::MissingElement("2d context".to_owned()))?;

        ctx.clear_rect(0.0, 0.0, width, thickness * 5.0);
        ctx.set_shadow_blur(self.config.shadow_blur);
        if let Some(color) = &self.config.shadow_color {
            ctx.set_shadow_color(color);
        }
        let gradient = ctx.create_linear_gradient(0.0, 0.0, width, 0.0);
        for stop in &self.config.bar_colors {
            #[allow(clippy::cast_possible_truncation)]
            let offset = stop.offset as f32;
            gradient
                .add_color_stop(offset, &stop.color)
                .map_err(|e| js_err("color stop", &e))?;
        }
        ctx.set_line_width(thickness);
        ctx.begin_path();
        ctx.move_to(0.0, thickness / 2.0);
        ctx.line_to((frame.progress * width).ceil(), thickness / 2.0);
        ctx.set_stroke_style_canvas_gradient(&gradient);
        ctx.stroke();

        let style = canvas.style();
        style
            .set_property("opacity", &frame.opacity.to_string())
            .map_err(|e| js_err("opacity", &e))?;
        style
            .set_property("display", "block")
            .map_err(|e| js_err("display", &e))?;
        Ok(())
    }

    fn conceal_canvas(&self) {
        if let Some(canvas) = &self.canvas {
            if let Err(e) = canvas.style().set_property("display", "none") {
                log::debug!("hiding progress bar failed: {e:?}");
            }
        }
    }
}

/// Debounced progress bar shown during page-loading cycles.
#[derive(Clone)]
pub struct Topbar {
    inner: Rc<RefCell<TopbarInner>>,
}

impl Topbar {
    #[must_use]
    pub fn new(config: IndicatorConfig) -> Self {
        let debounce = Debounce::new(config.delay_ms);
        Self {
            inner: Rc::new(RefCell::new(TopbarInner {
                config,
                debounce,
                animation: BarAnimation::default(),
                canvas: None,
                generation: 0,
            })),
        }
    }

    /// Loading started: reveal after the configured delay unless hidden first.
    pub fn show(&self) {
        let command = self.inner.borrow_mut().debounce.start(now_ms());
        self.apply(command);
    }

    /// Loading stopped: cancel a pending reveal or finish and fade the bar.
    pub fn hide(&self) {
        let command = self.inner.borrow_mut().debounce.stop();
        self.apply(command);
    }

    fn apply(&self, command: IndicatorCommand) {
        match command {
            IndicatorCommand::Nothing => {}
            IndicatorCommand::Schedule { ticket, after_ms } => {
                let weak = Rc::downgrade(&self.inner);
                wasm_bindgen_futures::spawn_local(async move {
                    TimeoutFuture::new(after_ms).await;
                    let Some(inner) = weak.upgrade() else {
                        return;
                    };
                    let topbar = Topbar { inner };
                    let command = topbar.inner.borrow_mut().debounce.elapse(ticket, now_ms());
                    topbar.apply(command);
                });
            }
            IndicatorCommand::Reveal => self.reveal(),
            IndicatorCommand::Conceal => self.inner.borrow_mut().animation.finish(),
        }
    }

    fn reveal(&self) {
        let generation = {
            let mut inner = self.inner.borrow_mut();
            inner.animation.begin();
            inner.generation += 1;
            inner.generation
        };
        wasm_bindgen_futures::spawn_local(run_frames(Rc::downgrade(&self.inner), generation));
    }
}

/// Show the bar on `phx:page-loading-start` and hide it on
/// `phx:page-loading-stop`, for the rest of the page.
///
/// # Errors
///
/// Returns [`BootError::NoWindow`] outside a browser.
pub fn install_loading_hooks(topbar: &Topbar) -> Result<(), BootError> {
    let window = web_sys::window().ok_or(BootError::NoWindow)?;

    let on_start = topbar.clone();
    let start = Closure::<dyn FnMut(_)>::new(move |_: web_sys::Event| on_start.show());
    window
        .add_event_listener_with_callback(EVENT_PAGE_LOADING_START, start.as_ref().unchecked_ref())
        .map_err(|e| js_err("loading start listener", &e))?;
    start.forget();

    let on_stop = topbar.clone();
    let stop = Closure::<dyn FnMut(_)>::new(move |_: web_sys::Event| on_stop.hide());
    window
        .add_event_listener_with_callback(EVENT_PAGE_LOADING_STOP, stop.as_ref().unchecked_ref())
        .map_err(|e| js_err("loading stop listener", &e))?;
    stop.forget();
    Ok(())
}

async fn run_frames(weak: Weak<RefCell<TopbarInner>>, generation: u64) {
    loop {
        TimeoutFuture::new(INDICATOR_FRAME_MS).await;
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let mut inner = shared.borrow_mut();
        if inner.generation != generation {
            return;
        }
        match inner.animation.tick() {
            Some(frame) => {
                if let Err(e) = inner.paint(frame) {
                    log::warn!("progress bar disabled: {e}");
                    return;
                }
            }
            None => {
                inner.conceal_canvas();
                return;
            }
        }
    }
}
