//! shimmer runtime (glow/OpenGL backend)
//
// This crate intentionally contains **only** the shader machine:
// - compile/link the gradient program (and relink a single stage)
// - upload the fullscreen quad
// - render one frame per call (host provides the surface, the clock and scheduling)
//
// It does NOT contain windowing, file IO, hot-reload policy or context creation.

pub mod api;
pub mod notify;
pub mod program;
pub mod quad;
pub mod renderer;
pub mod run_loop;
pub mod shaders;
pub mod timing;
pub mod uniforms;

pub use shimmer_core::EngineError;

pub use api::{GlApi, GlowApi, ShaderStage};
pub use notify::{LogNotifier, Notifier};
pub use program::{compile_shader, ShaderProgram};
pub use quad::{AttribLocations, FullscreenQuad, QUAD_POSITIONS, QUAD_TEXCOORDS, QUAD_VERTEX_COUNT};
pub use renderer::{CanvasRenderer, DrawSurface};
pub use run_loop::{CancelToken, LoopControl, RenderLoop};
pub use shaders::{ShaderSource, DEFAULT_FRAG, DEFAULT_VERT};
pub use timing::{Clock, FrameClock, FrameTiming, SystemClock};
pub use uniforms::UniformBindings;
