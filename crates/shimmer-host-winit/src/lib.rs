//! Host glue (policy layer).
//!
//! winit + glutin context creation, the native frame driver and shader hot reload. Kept
//! separate so the runtime stays embed-friendly.

pub mod context;
pub mod run;
pub mod watch;

pub use context::{
    create_gl_window, first_available, ApiKind, ContextCandidate, GlWindow, WinitSurface,
    CONTEXT_CANDIDATES,
};
pub use run::{load_sources, run};
pub use watch::ShaderWatcher;
