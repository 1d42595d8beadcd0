//! Browser host.
//!
//! Locates the `glCanvas` element, prefers WebGL2 and falls back to WebGL1, then drives the
//! render loop from `requestAnimationFrame`. Shader diagnostics surface as `window.alert`;
//! `tracing` output and panics go to the browser console.
//!
//! Everything but the console routing is wasm32 only.

pub mod console;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{start, WebHandle, CANVAS_ID};
