//! JSON configuration for shimmer hosts.
//!
//! Every key is optional; a missing file is not an error at this layer (hosts decide whether
//! to load one at all).

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::EngineError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShimmerConfig {
    /// Window title (native host only).
    pub title: String,

    /// Initial window size in logical pixels.
    pub width: u32,
    pub height: u32,

    /// Optional vertex shader source file. The embedded default is used when absent.
    pub vertex_shader: Option<PathBuf>,

    /// Optional fragment shader source file. The embedded default is used when absent.
    pub fragment_shader: Option<PathBuf>,

    /// Reload a shader stage when its source file changes.
    pub watch: bool,

    /// How often the watcher checks file modification times.
    pub watch_interval_ms: u64,
}

impl Default for ShimmerConfig {
    fn default() -> Self {
        Self {
            title: "shimmer".to_string(),
            width: 960,
            height: 540,
            vertex_shader: None,
            fragment_shader: None,
            watch: false,
            watch_interval_ms: 500,
        }
    }
}

impl ShimmerConfig {
    /// Checks value ranges. `origin` is only used to label the error.
    pub fn validate(&self, origin: &Path) -> Result<(), EngineError> {
        let invalid = |msg: &str| EngineError::InvalidConfig {
            path: origin.to_path_buf(),
            msg: msg.to_string(),
        };

        if self.width == 0 || self.height == 0 {
            return Err(invalid("width/height must be > 0"));
        }
        if self.watch_interval_ms == 0 {
            return Err(invalid("watch_interval_ms must be > 0"));
        }
        if self.watch && self.vertex_shader.is_none() && self.fragment_shader.is_none() {
            return Err(invalid(
                "watch requires vertex_shader or fragment_shader to be set",
            ));
        }
        Ok(())
    }

    /// Relative shader paths are resolved against `base` (usually the config file's directory).
    pub fn resolve_paths(&mut self, base: &Path) {
        for slot in [&mut self.vertex_shader, &mut self.fragment_shader] {
            if let Some(p) = slot.as_mut() {
                if p.is_relative() {
                    *p = base.join(&*p);
                }
            }
        }
    }
}

/// Loads, path-resolves and validates a config file.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<ShimmerConfig, EngineError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg: ShimmerConfig =
        serde_json::from_slice(&bytes).map_err(|source| EngineError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    if let Some(dir) = path.parent() {
        cfg.resolve_paths(dir);
    }
    cfg.validate(path)?;
    Ok(cfg)
}

/// Reads one shader source file, mapping failures onto `EngineError::Io`.
pub fn read_shader_source(path: &Path) -> Result<String, EngineError> {
    fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })
}
