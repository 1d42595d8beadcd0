use std::fmt;

use crate::api::{GlApi, ShaderStage};
use crate::notify::Notifier;
use crate::program::ShaderProgram;
use crate::quad::{AttribLocations, FullscreenQuad};
use crate::shaders::ShaderSource;
use crate::timing::{Clock, FrameClock, FrameTiming};
use crate::uniforms::UniformBindings;
use crate::EngineError;

/// Anything with a drawable pixel size (window, canvas).
pub trait DrawSurface {
    /// Current drawing-buffer size in physical pixels.
    fn pixel_size(&self) -> (u32, u32);
}

/// Draws the fullscreen gradient into a surface, one frame per `render()`.
///
/// Owns the context, program, quad buffers, resolved locations and timing state. Built once by
/// the host; never recreated.
pub struct CanvasRenderer<G: GlApi, S: DrawSurface, C: Clock> {
    gl: G,
    surface: S,
    clock: C,
    notifier: Box<dyn Notifier>,
    program: ShaderProgram<G>,
    attribs: AttribLocations,
    quad: FullscreenQuad<G>,
    uniforms: UniformBindings<G>,
    timing: FrameClock,
    frames: u64,
}

impl<G: GlApi, S: DrawSurface, C: Clock> fmt::Debug for CanvasRenderer<G, S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasRenderer")
            .field("program", &self.program.program())
            .field("linked", &self.program.is_linked())
            .field("attribs", &self.attribs)
            .field("timing", &self.timing)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl<G: GlApi, S: DrawSurface, C: Clock> CanvasRenderer<G, S, C> {
    /// Builds program, geometry and uniform bindings, then starts the clock.
    ///
    /// Shader diagnostics go to `notifier` and do not fail construction; only GL object
    /// creation failures do.
    pub fn new(
        gl: G,
        surface: S,
        clock: C,
        notifier: Box<dyn Notifier>,
        source: &ShaderSource,
    ) -> Result<Self, EngineError> {
        let program = ShaderProgram::new(&gl, &source.vert, &source.frag, notifier.as_ref())?;
        if !program.is_linked() {
            tracing::warn!(
                origin = source.origin.as_deref().unwrap_or("<embedded>"),
                "continuing with an unlinked program"
            );
        }

        let attribs = AttribLocations::resolve(&gl, program.program());
        let quad = FullscreenQuad::new(&gl, attribs)?;
        let uniforms = UniformBindings::resolve(&gl, program.program());

        let timing = FrameClock::start(clock.now());
        tracing::debug!(?attribs, "renderer initialised");

        Ok(Self {
            gl,
            surface,
            clock,
            notifier,
            program,
            attribs,
            quad,
            uniforms,
            timing,
            frames: 0,
        })
    }

    /// Renders one frame: viewport to the surface size, bind, time uniforms, one draw.
    pub fn render(&mut self) -> FrameTiming {
        let timing = self.timing.tick(self.clock.now());

        let (w, h) = self.surface.pixel_size();
        self.gl.viewport(0, 0, w as i32, h as i32);

        self.program.bind(&self.gl);
        self.uniforms.upload(&self.gl, timing.elapsed, timing.delta);
        self.quad.draw(&self.gl);

        if self.frames == 0 {
            if let Some(code) = self.gl.check_error() {
                tracing::warn!("GL error after first frame: 0x{code:x}");
            }
        }
        self.frames += 1;
        timing
    }

    /// Swaps in a new source for one stage and relinks.
    ///
    /// After a successful relink the attribute and uniform locations are resolved again and
    /// the quad buffers re-described, since linking may move them.
    pub fn reload_stage(&mut self, stage: ShaderStage, source: &str) -> bool {
        let linked = self
            .program
            .load_new(&self.gl, stage, source, self.notifier.as_ref());
        if linked {
            self.attribs = AttribLocations::resolve(&self.gl, self.program.program());
            self.quad.rebind(&self.gl, self.attribs);
            self.uniforms = UniformBindings::resolve(&self.gl, self.program.program());
            tracing::info!(%stage, "shader stage reloaded");
        }
        linked
    }

    pub fn gl(&self) -> &G {
        &self.gl
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn program(&self) -> &ShaderProgram<G> {
        &self.program
    }

    pub fn attribs(&self) -> AttribLocations {
        self.attribs
    }

    pub fn uniforms(&self) -> &UniformBindings<G> {
        &self.uniforms
    }

    /// Number of frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
