use std::ffi::CString;
use std::fmt;
use std::num::NonZeroU32;

use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext, Version};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use raw_window_handle::HasRawWindowHandle;
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

use shimmer_core::{EngineError, ShimmerConfig};
use shimmer_runtime_glow::DrawSurface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiKind {
    OpenGl,
    Gles,
}

/// One context flavour to try. Earlier entries in `CONTEXT_CANDIDATES` are preferred.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextCandidate {
    pub api: ApiKind,
    pub major: u8,
    pub minor: u8,
}

impl ContextCandidate {
    pub const fn new(api: ApiKind, major: u8, minor: u8) -> Self {
        Self { api, major, minor }
    }

    fn context_api(self) -> ContextApi {
        let version = Some(Version::new(self.major, self.minor));
        match self.api {
            ApiKind::OpenGl => ContextApi::OpenGl(version),
            ApiKind::Gles => ContextApi::Gles(version),
        }
    }
}

impl fmt::Display for ContextCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.api {
            ApiKind::OpenGl => "OpenGL",
            ApiKind::Gles => "OpenGL ES",
        };
        write!(f, "{name} {}.{}", self.major, self.minor)
    }
}

/// Newest first. The shaders carry no `#version`, so compatibility-style desktop contexts and
/// ES 2.0 both accept them.
pub const CONTEXT_CANDIDATES: [ContextCandidate; 3] = [
    ContextCandidate::new(ApiKind::OpenGl, 3, 0),
    ContextCandidate::new(ApiKind::OpenGl, 2, 1),
    ContextCandidate::new(ApiKind::Gles, 2, 0),
];

/// Returns the first candidate `create` accepts. Falling past the first candidate is logged;
/// exhausting the list is `EngineError::NoContext`.
pub fn first_available<T, E: fmt::Display>(
    candidates: &[ContextCandidate],
    mut create: impl FnMut(ContextCandidate) -> Result<T, E>,
) -> Result<(ContextCandidate, T), EngineError> {
    let mut failures = Vec::new();
    for (i, &candidate) in candidates.iter().enumerate() {
        match create(candidate) {
            Ok(value) => {
                if i > 0 {
                    tracing::info!(%candidate, "fell back to an older context");
                }
                return Ok((candidate, value));
            }
            Err(e) => {
                tracing::debug!(%candidate, error = %e, "context candidate rejected");
                failures.push(format!("{candidate}: {e}"));
            }
        }
    }
    if failures.is_empty() {
        failures.push("no candidates".to_string());
    }
    Err(EngineError::NoContext(failures.join("; ")))
}

/// Window wrapper that reports its inner size to the renderer.
#[derive(Debug)]
pub struct WinitSurface {
    window: Window,
}

impl WinitSurface {
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl DrawSurface for WinitSurface {
    fn pixel_size(&self) -> (u32, u32) {
        let s = self.window.inner_size();
        (s.width, s.height)
    }
}

/// A window with a current GL context and a loaded `glow` function table.
pub struct GlWindow {
    pub window: Window,
    pub surface: Surface<WindowSurface>,
    pub context: PossiblyCurrentContext,
    pub gl: glow::Context,
    pub candidate: ContextCandidate,
}

impl fmt::Debug for GlWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlWindow")
            .field("window", &self.window.id())
            .field("candidate", &self.candidate)
            .finish_non_exhaustive()
    }
}

fn non_zero(v: u32) -> NonZeroU32 {
    NonZeroU32::new(v).unwrap_or(NonZeroU32::MIN)
}

/// Opens the window and makes the best available context current on this thread.
pub fn create_gl_window(
    event_loop: &EventLoop<()>,
    cfg: &ShimmerConfig,
) -> Result<GlWindow, EngineError> {
    let window_builder = WindowBuilder::new()
        .with_title(cfg.title.as_str())
        .with_inner_size(winit::dpi::LogicalSize::new(
            f64::from(cfg.width),
            f64::from(cfg.height),
        ));

    let template = ConfigTemplateBuilder::new()
        .with_alpha_size(8)
        .with_depth_size(0)
        .with_stencil_size(0)
        .with_transparency(false);

    let display_builder =
        glutin_winit::DisplayBuilder::new().with_window_builder(Some(window_builder));

    let (window, gl_config) = display_builder
        .build(event_loop, template, |configs| {
            // find_configs fails before the picker sees an empty set.
            configs
                .reduce(|accum, config| {
                    if config.num_samples() > accum.num_samples() {
                        config
                    } else {
                        accum
                    }
                })
                .expect("glutin reported no matching GL configs")
        })
        .map_err(|e| EngineError::GlCreate(format!("DisplayBuilder.build: {e}")))?;

    let window = window
        .ok_or_else(|| EngineError::GlCreate("DisplayBuilder did not create a window".into()))?;
    let gl_display = gl_config.display();
    let raw_window_handle = window.raw_window_handle();

    let (candidate, not_current_gl_context) = first_available(&CONTEXT_CANDIDATES, |c| {
        let attrs = ContextAttributesBuilder::new()
            .with_context_api(c.context_api())
            .build(Some(raw_window_handle));
        unsafe { gl_display.create_context(&gl_config, &attrs) }
    })?;

    let size = window.inner_size();
    let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        raw_window_handle,
        non_zero(size.width),
        non_zero(size.height),
    );

    let gl_surface = unsafe {
        gl_display
            .create_window_surface(&gl_config, &attrs)
            .map_err(|e| EngineError::GlCreate(format!("create_window_surface: {e}")))?
    };

    let gl_context = not_current_gl_context
        .make_current(&gl_surface)
        .map_err(|e| EngineError::GlCreate(format!("make_current: {e}")))?;

    // Pace frames to the display refresh; not every platform honours this.
    if let Err(e) = gl_surface.set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::MIN))
    {
        tracing::warn!("vsync unavailable: {e}");
    }

    let gl = unsafe {
        glow::Context::from_loader_function(|s| match CString::new(s) {
            Ok(name) => gl_display.get_proc_address(name.as_c_str()) as *const _,
            Err(_) => std::ptr::null(),
        })
    };

    tracing::info!(%candidate, "GL context current");

    Ok(GlWindow {
        window,
        surface: gl_surface,
        context: gl_context,
        gl,
        candidate,
    })
}

/// Resizes the GL surface to match the window; zero sizes (minimised) are ignored.
pub fn resize_surface(
    surface: &Surface<WindowSurface>,
    context: &PossiblyCurrentContext,
    width: u32,
    height: u32,
) {
    if width > 0 && height > 0 {
        surface.resize(context, non_zero(width), non_zero(height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_candidate_wins_when_available() {
        let (c, v) = first_available(&CONTEXT_CANDIDATES, |c| Ok::<_, String>(c.major))
            .expect("should pick first");
        assert_eq!(c, CONTEXT_CANDIDATES[0]);
        assert_eq!(v, 3);
    }

    #[test]
    fn falls_back_to_gles_when_desktop_fails() {
        let mut tried = Vec::new();
        let (c, _) = first_available(&CONTEXT_CANDIDATES, |c| {
            tried.push(c);
            if c.api == ApiKind::Gles {
                Ok(())
            } else {
                Err("unsupported")
            }
        })
        .expect("gles should be accepted");
        assert_eq!(c.api, ApiKind::Gles);
        assert_eq!(tried, CONTEXT_CANDIDATES.to_vec());
    }

    #[test]
    fn exhausting_candidates_is_no_context() {
        let err = first_available(&CONTEXT_CANDIDATES, |_| Err::<(), _>("nope"))
            .expect_err("must fail");
        match err {
            EngineError::NoContext(msg) => {
                assert!(msg.contains("OpenGL 3.0: nope"), "got: {msg}");
                assert!(msg.contains("OpenGL ES 2.0: nope"), "got: {msg}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
