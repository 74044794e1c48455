//! Engine context and presentation sink.
//!
//! The engine context owns the window, the GPU surface, a texture the size of
//! the logical game surface and the CPU pixel buffer scripts draw into. Each
//! frame the whole buffer is uploaded and stretched over the output surface.

mod blit;
mod context;
mod pixels;

pub use context::EngineContext;
pub use pixels::{PixelBuffer, Rgba, BYTES_PER_PIXEL};

use crate::config::PresentFailurePolicy;
use crate::device::SurfaceErrorAction;
use crate::error::PresentError;

/// Owner of the frame buffer and the sink it is presented through.
pub trait Display {
    /// The logical frame buffer, lent to the draw call.
    fn pixels_mut(&mut self) -> &mut PixelBuffer;

    /// Shows the current buffer. `Err` only when the failure policy says the
    /// run must stop.
    fn present(&mut self) -> Result<(), PresentError>;
}

/// Whether a surface failure ends the run under `policy`.
pub(crate) fn should_escalate(action: SurfaceErrorAction, policy: PresentFailurePolicy) -> bool {
    match (action, policy) {
        (SurfaceErrorAction::Fatal, _) => true,
        (SurfaceErrorAction::Reconfigured, _) => false,
        (SurfaceErrorAction::SkipFrame, PresentFailurePolicy::Fatal) => true,
        (SurfaceErrorAction::SkipFrame, PresentFailurePolicy::LogAndContinue) => false,
    }
}
