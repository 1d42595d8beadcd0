use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::GlApi;
use crate::renderer::{CanvasRenderer, DrawSurface};
use crate::timing::Clock;

/// Shared stop flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What the host should do after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
    /// Schedule another frame.
    Continue,
    /// Do not re-arm; the loop is finished.
    Stop,
}

/// Host-driven render loop.
///
/// The host owns scheduling (a window event loop, `requestAnimationFrame`) and calls `tick()`
/// once per display frame. The token is checked before rendering and again before the host
/// re-arms, so a cancel from inside the frame still stops the loop.
#[derive(Debug)]
pub struct RenderLoop<G: GlApi, S: DrawSurface, C: Clock> {
    renderer: CanvasRenderer<G, S, C>,
    token: CancelToken,
}

impl<G: GlApi, S: DrawSurface, C: Clock> RenderLoop<G, S, C> {
    pub fn new(renderer: CanvasRenderer<G, S, C>, token: CancelToken) -> Self {
        Self { renderer, token }
    }

    pub fn tick(&mut self) -> LoopControl {
        if self.token.is_cancelled() {
            return LoopControl::Stop;
        }
        self.renderer.render();
        if self.token.is_cancelled() {
            LoopControl::Stop
        } else {
            LoopControl::Continue
        }
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    pub fn renderer(&self) -> &CanvasRenderer<G, S, C> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut CanvasRenderer<G, S, C> {
        &mut self.renderer
    }
}
