use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, Performance, WebGl2RenderingContext, WebGlRenderingContext, Window,
};

use tracing::Level;

use shimmer_core::EngineError;
use shimmer_runtime_glow::{
    CancelToken, CanvasRenderer, Clock, DrawSurface, GlowApi, LoopControl, Notifier, RenderLoop,
    ShaderSource,
};

use crate::console::{self, ConsoleLevel};

/// Element id the page must give its canvas.
pub const CANVAS_ID: &str = "glCanvas";

struct CanvasSurface {
    canvas: HtmlCanvasElement,
}

impl DrawSurface for CanvasSurface {
    fn pixel_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }
}

/// `performance.now()`; `Instant` is unavailable on wasm32-unknown-unknown.
struct PerformanceClock {
    performance: Performance,
}

impl Clock for PerformanceClock {
    fn now(&self) -> Duration {
        Duration::from_secs_f64(self.performance.now().max(0.0) / 1000.0)
    }
}

struct AlertNotifier {
    window: Window,
}

impl Notifier for AlertNotifier {
    fn notify(&self, message: &str) {
        tracing::error!("{message}");
        if self.window.alert_with_message(message).is_err() {
            tracing::warn!("window.alert unavailable; diagnostic logged only");
        }
    }
}

fn acquire_context(canvas: &HtmlCanvasElement) -> Result<glow::Context, EngineError> {
    if let Some(ctx) = canvas.get_context("webgl2").ok().flatten() {
        if let Ok(gl2) = ctx.dyn_into::<WebGl2RenderingContext>() {
            return Ok(glow::Context::from_webgl2_context(gl2));
        }
    }

    web_sys::console::log_1(&"Fell back to webgl1.".into());
    let ctx = canvas
        .get_context("webgl")
        .ok()
        .flatten()
        .ok_or_else(|| EngineError::NoContext("neither webgl2 nor webgl is available".into()))?;
    let gl1 = ctx
        .dyn_into::<WebGlRenderingContext>()
        .map_err(|_| EngineError::NoContext("webgl context has an unexpected type".into()))?;
    Ok(glow::Context::from_webgl1_context(gl1))
}

/// Returned to JS from `start()`; `stop()` ends the loop before its next frame.
#[wasm_bindgen]
pub struct WebHandle {
    token: CancelToken,
}

#[wasm_bindgen]
impl WebHandle {
    pub fn stop(&self) {
        self.token.cancel();
    }

    #[wasm_bindgen(getter)]
    pub fn stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

fn write_console(level: ConsoleLevel, line: &str) {
    let line = JsValue::from_str(line);
    match level {
        ConsoleLevel::Error => web_sys::console::error_1(&line),
        ConsoleLevel::Warn => web_sys::console::warn_1(&line),
        ConsoleLevel::Info => web_sys::console::info_1(&line),
        ConsoleLevel::Log => web_sys::console::log_1(&line),
    }
}

/// Panics and `tracing` events go to the browser console. Safe to call more than once.
fn install_console_logging() {
    console_error_panic_hook::set_once();
    if tracing::subscriber::set_global_default(console::subscriber(write_console, Level::INFO))
        .is_err()
    {
        tracing::debug!("console subscriber already installed");
    }
}

/// Page entry point; call once the document has loaded.
#[wasm_bindgen]
pub fn start() -> Result<WebHandle, JsValue> {
    install_console_logging();
    start_on(CANVAS_ID).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn start_on(canvas_id: &str) -> Result<WebHandle, EngineError> {
    let window = web_sys::window().ok_or_else(|| EngineError::Host("no global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| EngineError::Host("window has no document".into()))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| EngineError::Host(format!("no element with id '{canvas_id}'")))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| EngineError::Host(format!("element '{canvas_id}' is not a canvas")))?;
    let performance = window
        .performance()
        .ok_or_else(|| EngineError::Host("performance timer unavailable".into()))?;

    let gl = acquire_context(&canvas)?;
    // SAFETY: WebGL calls always target their own context; there is no "current" to lose.
    let api = unsafe { GlowApi::new(gl) };

    let renderer = CanvasRenderer::new(
        api,
        CanvasSurface { canvas },
        PerformanceClock { performance },
        Box::new(AlertNotifier {
            window: window.clone(),
        }),
        &ShaderSource::default(),
    )?;

    let token = CancelToken::new();
    schedule(window, RenderLoop::new(renderer, token.clone()))?;
    Ok(WebHandle { token })
}

type WebLoop = RenderLoop<GlowApi, CanvasSurface, PerformanceClock>;

fn request_animation_frame(window: &Window, f: &Closure<dyn FnMut()>) -> Result<i32, EngineError> {
    window
        .request_animation_frame(f.as_ref().unchecked_ref())
        .map_err(|e| EngineError::Host(format!("requestAnimationFrame: {e:?}")))
}

fn schedule(window: Window, mut render_loop: WebLoop) -> Result<(), EngineError> {
    let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let rearm = Rc::clone(&callback);
    let frame_window = window.clone();

    *callback.borrow_mut() = Some(Closure::new(move || {
        if render_loop.tick() == LoopControl::Stop {
            // The closure cannot drop itself mid-call; it simply stops re-arming.
            tracing::info!(frames = render_loop.renderer().frames(), "render loop stopped");
            return;
        }
        if let Some(cb) = rearm.borrow().as_ref() {
            if let Err(e) = request_animation_frame(&frame_window, cb) {
                tracing::error!("{e}");
                render_loop.token().cancel();
            }
        }
    }));

    let armed = match callback.borrow().as_ref() {
        Some(cb) => request_animation_frame(&window, cb).map(|_| ()),
        None => Err(EngineError::Host("frame callback missing".into())),
    };
    armed
}
