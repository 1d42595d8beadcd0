//! Embedded default shader pair.
//!
//! Both sources omit `#version` so they compile as desktop GLSL 1.10 and as GLSL ES 1.00; the
//! `GL_ES` guard supplies the precision qualifier ES requires.

pub const ATTR_POSITION: &str = "a_position";
pub const ATTR_TEXCOORD: &str = "a_texcoord";
pub const UNIFORM_TIME: &str = "u_time";
pub const UNIFORM_DELTA_TIME: &str = "u_deltaTime";

pub const DEFAULT_VERT: &str = r#"
#ifdef GL_ES
precision mediump float;
#endif
attribute vec2 a_position;
attribute vec2 a_texcoord;
varying vec2 v_texcoord;
void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
    v_texcoord = a_texcoord;
}
"#;

// The abs() inside each sin() is intentional: it mirrors the waveform around t = 0.
pub const DEFAULT_FRAG: &str = r#"
#ifdef GL_ES
precision mediump float;
#endif
uniform float u_time;
uniform float u_deltaTime;
varying vec2 v_texcoord;
void main(){
    gl_FragColor = vec4(sin(abs(u_time)), sin(abs(u_time+1.0471)), sin(abs(u_time+2.0943)), 1.0);
}
"#;

/// Vertex + fragment source pair handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub vert: String,
    pub frag: String,
    /// Optional human-friendly origin (path/label) for logs.
    pub origin: Option<String>,
}

impl Default for ShaderSource {
    fn default() -> Self {
        Self {
            vert: DEFAULT_VERT.to_string(),
            frag: DEFAULT_FRAG.to_string(),
            origin: None,
        }
    }
}
