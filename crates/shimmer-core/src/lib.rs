#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]

pub mod config;
pub mod error;

pub use config::{load_config_from, read_shader_source, ShimmerConfig};
pub use error::EngineError;
