use std::time::Instant;

use glutin::prelude::*;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};

use shimmer_core::{read_shader_source, EngineError, ShimmerConfig};
use shimmer_runtime_glow::{
    CancelToken, CanvasRenderer, GlowApi, LogNotifier, LoopControl, RenderLoop, ShaderSource,
    SystemClock, DEFAULT_FRAG, DEFAULT_VERT,
};

use crate::context::{create_gl_window, resize_surface, GlWindow, WinitSurface};
use crate::watch::ShaderWatcher;

/// Reads the configured shader files, falling back to the embedded pair per stage.
pub fn load_sources(cfg: &ShimmerConfig) -> Result<ShaderSource, EngineError> {
    let vert = match &cfg.vertex_shader {
        Some(p) => read_shader_source(p)?,
        None => DEFAULT_VERT.to_string(),
    };
    let frag = match &cfg.fragment_shader {
        Some(p) => read_shader_source(p)?,
        None => DEFAULT_FRAG.to_string(),
    };

    let origin = match (&cfg.vertex_shader, &cfg.fragment_shader) {
        (None, None) => None,
        (v, f) => Some(format!(
            "{} + {}",
            v.as_ref().map_or("<embedded>".into(), |p| p.display().to_string()),
            f.as_ref().map_or("<embedded>".into(), |p| p.display().to_string()),
        )),
    };

    Ok(ShaderSource { vert, frag, origin })
}

/// Opens the window and renders until it is closed or `token` is cancelled.
///
/// Never returns on success: the winit event loop exits the process when it finishes.
pub fn run(cfg: ShimmerConfig, token: CancelToken) -> Result<(), EngineError> {
    let source = load_sources(&cfg)?;

    let event_loop = EventLoop::new();
    let GlWindow {
        window,
        surface: gl_surface,
        context: gl_context,
        gl,
        candidate,
    } = create_gl_window(&event_loop, &cfg)?;

    // SAFETY: the context was made current on this thread by `create_gl_window` and stays
    // current for the lifetime of the event loop, which owns both.
    let api = unsafe { GlowApi::new(gl) };
    tracing::info!(%candidate, version = %api.version_string(), "renderer starting");

    let renderer = CanvasRenderer::new(
        api,
        WinitSurface::new(window),
        SystemClock::new(),
        Box::new(LogNotifier),
        &source,
    )?;
    let mut render_loop = RenderLoop::new(renderer, token.clone());

    let mut watcher = cfg.watch.then(|| ShaderWatcher::from_config(&cfg));

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => token.cancel(),

            Event::WindowEvent {
                event: WindowEvent::Resized(size),
                ..
            } => resize_surface(&gl_surface, &gl_context, size.width, size.height),

            Event::MainEventsCleared => render_loop.renderer().surface().window().request_redraw(),

            Event::RedrawRequested(_) => {
                if let Some(w) = watcher.as_mut() {
                    for (stage, src) in w.poll(Instant::now()) {
                        render_loop.renderer_mut().reload_stage(stage, &src);
                    }
                }

                if render_loop.tick() == LoopControl::Continue {
                    if let Err(e) = gl_surface.swap_buffers(&gl_context) {
                        tracing::error!("swap_buffers failed: {e}");
                        token.cancel();
                    }
                }
            }
            _ => {}
        }

        if token.is_cancelled() {
            tracing::info!(frames = render_loop.renderer().frames(), "render loop stopped");
            *control_flow = ControlFlow::Exit;
        }
    })
}
