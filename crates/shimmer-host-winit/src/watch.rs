//! Modification-time polling for live shader reload.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use shimmer_core::{read_shader_source, ShimmerConfig};
use shimmer_runtime_glow::ShaderStage;

/// Modification time plus length. Filesystems with one-second mtime resolution can keep the
/// same time across quick successive saves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Fingerprint {
    modified: SystemTime,
    len: u64,
}

#[derive(Debug)]
struct WatchedStage {
    stage: ShaderStage,
    path: PathBuf,
    seen: Option<Fingerprint>,
}

/// Polls shader files from the frame loop and yields new sources for stages whose file changed.
#[derive(Debug)]
pub struct ShaderWatcher {
    entries: Vec<WatchedStage>,
    interval: Duration,
    next_poll: Option<Instant>,
}

impl ShaderWatcher {
    pub fn new(interval: Duration) -> Self {
        Self {
            entries: Vec::new(),
            interval,
            next_poll: None,
        }
    }

    /// Watches every shader path set in `cfg`.
    pub fn from_config(cfg: &ShimmerConfig) -> Self {
        let mut w = Self::new(Duration::from_millis(cfg.watch_interval_ms));
        if let Some(p) = &cfg.vertex_shader {
            w.watch(ShaderStage::Vertex, p);
        }
        if let Some(p) = &cfg.fragment_shader {
            w.watch(ShaderStage::Fragment, p);
        }
        w
    }

    /// Starts watching `path` for `stage`. The file's current state is the baseline, so an
    /// unchanged file is never reported.
    pub fn watch(&mut self, stage: ShaderStage, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let seen = fingerprint(&path);
        tracing::info!(%stage, path = %path.display(), "watching shader source");
        self.entries.push(WatchedStage { stage, path, seen });
    }

    /// Checks the files if the interval has passed. Unreadable files are logged and retried on a
    /// later poll.
    pub fn poll(&mut self, now: Instant) -> Vec<(ShaderStage, String)> {
        if matches!(self.next_poll, Some(next) if now < next) {
            return Vec::new();
        }
        self.next_poll = Some(now + self.interval);

        let mut changed = Vec::new();
        for entry in &mut self.entries {
            let current = fingerprint(&entry.path);
            if current.is_none() || current == entry.seen {
                continue;
            }
            match read_shader_source(&entry.path) {
                Ok(src) => {
                    entry.seen = current;
                    changed.push((entry.stage, src));
                }
                Err(e) => tracing::warn!(stage = %entry.stage, "shader reload skipped: {e}"),
            }
        }
        changed
    }
}

fn fingerprint(path: &Path) -> Option<Fingerprint> {
    let meta = fs::metadata(path).ok()?;
    Some(Fingerprint {
        modified: meta.modified().ok()?,
        len: meta.len(),
    })
}
