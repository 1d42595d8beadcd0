use crate::api::GlApi;
use crate::shaders::{ATTR_POSITION, ATTR_TEXCOORD};
use crate::EngineError;

pub const QUAD_VERTEX_COUNT: i32 = 6;
pub const QUAD_COMPONENTS: i32 = 2;

/// Texture coordinates over [0,1]^2, two triangles.
pub const QUAD_TEXCOORDS: [f32; 12] = [
    0.0, 0.0, 1.0, 0.0, 0.0, 1.0, //
    0.0, 1.0, 1.0, 0.0, 1.0, 1.0,
];

/// Clip-space positions over [-1,1]^2, same triangle split as `QUAD_TEXCOORDS`.
pub const QUAD_POSITIONS: [f32; 12] = [
    -1.0, -1.0, 1.0, -1.0, -1.0, 1.0, //
    -1.0, 1.0, 1.0, -1.0, 1.0, 1.0,
];

/// Attribute locations resolved from the linked program. `None` means the program does not
/// expose the attribute (inactive, or the program failed to link).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttribLocations {
    pub position: Option<u32>,
    pub texcoord: Option<u32>,
}

impl AttribLocations {
    pub fn resolve<G: GlApi>(gl: &G, program: G::Program) -> Self {
        Self {
            position: gl.attrib_location(program, ATTR_POSITION),
            texcoord: gl.attrib_location(program, ATTR_TEXCOORD),
        }
    }
}

// --- Fullscreen quad: static position + texcoord buffers ---
#[derive(Debug)]
pub struct FullscreenQuad<G: GlApi> {
    texcoords: G::Buffer,
    positions: G::Buffer,
}

impl<G: GlApi> FullscreenQuad<G> {
    /// Uploads both buffers (texcoords first) and wires them to `attribs`.
    pub fn new(gl: &G, attribs: AttribLocations) -> Result<Self, EngineError> {
        let texcoords = gl
            .create_buffer()
            .map_err(|e| EngineError::GlCreate(format!("create_buffer(texcoords): {e}")))?;
        gl.bind_array_buffer(Some(texcoords));
        gl.upload_static_f32(&QUAD_TEXCOORDS);
        describe(gl, attribs.texcoord, ATTR_TEXCOORD);

        let positions = gl
            .create_buffer()
            .map_err(|e| EngineError::GlCreate(format!("create_buffer(positions): {e}")))?;
        gl.bind_array_buffer(Some(positions));
        gl.upload_static_f32(&QUAD_POSITIONS);
        describe(gl, attribs.position, ATTR_POSITION);

        Ok(Self {
            texcoords,
            positions,
        })
    }

    /// Points `attribs` at the existing buffers again; used after a relink moved locations.
    pub fn rebind(&self, gl: &G, attribs: AttribLocations) {
        gl.bind_array_buffer(Some(self.texcoords));
        describe(gl, attribs.texcoord, ATTR_TEXCOORD);
        gl.bind_array_buffer(Some(self.positions));
        describe(gl, attribs.position, ATTR_POSITION);
    }

    pub fn draw(&self, gl: &G) {
        gl.draw_triangles(0, QUAD_VERTEX_COUNT);
    }
}

fn describe<G: GlApi>(gl: &G, location: Option<u32>, name: &str) {
    match location {
        Some(index) => {
            gl.enable_vertex_attrib(index);
            gl.vertex_attrib_f32(index, QUAD_COMPONENTS);
        }
        None => tracing::warn!(attribute = name, "attribute not active in program; skipped"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(data: &[f32]) -> Vec<(f32, f32)> {
        data.chunks_exact(2).map(|c| (c[0], c[1])).collect()
    }

    #[test]
    fn quad_has_six_two_component_vertices() {
        assert_eq!(
            QUAD_POSITIONS.len(),
            (QUAD_VERTEX_COUNT * QUAD_COMPONENTS) as usize
        );
        assert_eq!(
            QUAD_TEXCOORDS.len(),
            (QUAD_VERTEX_COUNT * QUAD_COMPONENTS) as usize
        );
    }

    #[test]
    fn positions_span_clip_space_and_texcoords_span_unit_square() {
        for (x, y) in pairs(&QUAD_POSITIONS) {
            assert!(x.abs() == 1.0 && y.abs() == 1.0);
        }
        for (u, v) in pairs(&QUAD_TEXCOORDS) {
            assert!((u == 0.0 || u == 1.0) && (v == 0.0 || v == 1.0));
        }
        let corners = [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)];
        let pos = pairs(&QUAD_POSITIONS);
        assert!(corners.iter().all(|c| pos.contains(c)));
    }

    #[test]
    fn texcoords_follow_positions_vertex_for_vertex() {
        for ((x, y), (u, v)) in pairs(&QUAD_POSITIONS)
            .into_iter()
            .zip(pairs(&QUAD_TEXCOORDS))
        {
            assert_eq!((x + 1.0) * 0.5, u);
            assert_eq!((y + 1.0) * 0.5, v);
        }
    }
}
