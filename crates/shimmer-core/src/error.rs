use std::path::PathBuf;

/// Engine-level errors shared by the shimmer crates.
///
/// Contract rule: this type lives in `shimmer-core` and is re-exported by the runtime.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    // ---- Config (SDK-level) ----
    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("json parse error at {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid config at {}: {msg}", .path.display())]
    InvalidConfig { path: PathBuf, msg: String },

    // ---- Runtime-facing (backend) ----
    #[error("vertex shader compile error: {0}")]
    VertexCompile(String),

    #[error("fragment shader compile error: {0}")]
    FragmentCompile(String),

    #[error("program link error: {0}")]
    Link(String),

    #[error("backend object creation failed: {0}")]
    GlCreate(String),

    #[error("no usable graphics context ({0})")]
    NoContext(String),

    // ---- Host glue ----
    #[error("host error: {0}")]
    Host(String),
}
