//! Frame-scheduling seam
//!
//! Decouples the game loop from the host's animation-frame API while
//! enforcing the one-outstanding-callback rule: restarting the loop must
//! never leave two callback chains alive.

/// Opaque handle for a scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(pub i32);

/// Host-provided scheduling primitive. The wasm host backs this with
/// `requestAnimationFrame`/`cancelAnimationFrame`.
pub trait FrameScheduler {
    /// Schedule one callback for the next animation frame
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Tracks the single outstanding frame callback
#[derive(Debug, Default)]
pub struct LoopDriver {
    scheduled: Option<FrameHandle>,
}

impl LoopDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.scheduled.is_some()
    }

    /// Start (or restart) the loop. Any outstanding callback is cancelled
    /// first so two chains can never coexist.
    pub fn start<S: FrameScheduler>(&mut self, scheduler: &mut S) {
        self.stop(scheduler);
        self.scheduled = Some(scheduler.request_frame());
    }

    /// Called from inside a fired callback to keep the chain going.
    /// A loop stopped mid-frame stays stopped.
    pub fn on_frame_fired<S: FrameScheduler>(&mut self, scheduler: &mut S) {
        if self.scheduled.is_some() {
            self.scheduled = Some(scheduler.request_frame());
        }
    }

    pub fn stop<S: FrameScheduler>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.scheduled.take() {
            scheduler.cancel_frame(handle);
        }
    }
}
