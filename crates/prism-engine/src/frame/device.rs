use crate::readback::Staging;
use crate::target::AcquireError;

/// The one render pass recorded per frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PassDesc {
    /// Clear color applied on load; the result is stored on end.
    pub clear: wgpu::Color,

    /// Non-indexed vertex count of the single draw.
    pub vertex_count: u32,
}

impl PassDesc {
    pub const TRIANGLE_VERTICES: u32 = 3;

    pub fn triangle(clear: wgpu::Color) -> Self {
        Self { clear, vertex_count: Self::TRIANGLE_VERTICES }
    }
}

/// Device-side operations the frame loop drives.
///
/// Implemented by [`crate::session::Session`] over wgpu, and by recording
/// doubles in tests.
pub trait FrameDevice {
    /// Per-frame render view; only valid until `present` or drop.
    type View;

    fn acquire_view(&mut self) -> Result<Self::View, AcquireError>;

    /// Records one render pass against `view` and submits it. Does not wait.
    fn submit_pass(&mut self, view: &Self::View, pass: &PassDesc);

    fn present(&mut self, view: Self::View);

    /// Ticks the event pump once without blocking, delivering any pending
    /// callbacks (uncaptured errors, map completions, work-done).
    fn poll(&mut self);

    /// Blocks until submitted work is complete and its callbacks have run.
    fn wait(&mut self);

    /// Staging access; `None` for presentable targets.
    fn staging(&mut self) -> Option<&mut dyn Staging>;
}
