use crate::api::GlApi;
use crate::shaders::{UNIFORM_DELTA_TIME, UNIFORM_TIME};

/// Resolved locations for the per-frame time uniforms.
///
/// Locations belong to one link of one program; resolve again after every relink.
#[derive(Debug)]
pub struct UniformBindings<G: GlApi> {
    pub time: Option<G::UniformLocation>,
    pub delta_time: Option<G::UniformLocation>,
}

impl<G: GlApi> UniformBindings<G> {
    pub fn resolve(gl: &G, program: G::Program) -> Self {
        let time = gl.uniform_location(program, UNIFORM_TIME);
        let delta_time = gl.uniform_location(program, UNIFORM_DELTA_TIME);
        if time.is_none() {
            tracing::debug!(uniform = UNIFORM_TIME, "uniform not active in program");
        }
        if delta_time.is_none() {
            tracing::debug!(uniform = UNIFORM_DELTA_TIME, "uniform not active in program");
        }
        Self { time, delta_time }
    }

    /// Uploads both values. Missing locations are passed through as `None`, which GL ignores.
    pub fn upload(&self, gl: &G, elapsed: f32, delta: f32) {
        gl.uniform_1_f32(self.time.as_ref(), elapsed);
        gl.uniform_1_f32(self.delta_time.as_ref(), delta);
    }
}
