//! Recording doubles for the frame loop and readback.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::readback::{EncodeError, ImageEncoder, MapCallback, MapError, Staging};
use crate::target::{AcquireError, ReadbackLayout};

use super::{FrameDevice, PassDesc};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Call {
    Acquire,
    RenderPass,
    Present,
    SubmitCopy,
    MapRequest,
    MapComplete,
    Read,
    Unmap,
    Poll,
    Wait,
}

type CallLog = Rc<RefCell<Vec<Call>>>;

struct PendingMap {
    callback: MapCallback,
    pumps_left: u32,
}

/// Staging double. Map completions are only delivered by `pump`/`complete`.
pub(crate) struct FakeStaging {
    layout: ReadbackLayout,
    log: CallLog,
    pending: Option<PendingMap>,
    mapped: bool,
    map_delay: u32,
    next_failure: Option<String>,
}

impl FakeStaging {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self::with_log(width, height, CallLog::default())
    }

    fn with_log(width: u32, height: u32, log: CallLog) -> Self {
        Self {
            layout: ReadbackLayout::with_bytes_per_pixel(width, height, 4).unwrap(),
            log,
            pending: None,
            mapped: false,
            map_delay: 0,
            next_failure: None,
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    pub(crate) fn count(&self, call: Call) -> usize {
        self.log.borrow().iter().filter(|c| **c == call).count()
    }

    /// Holds each map completion back for `pumps` extra pumps.
    pub(crate) fn delay_maps(&mut self, pumps: u32) {
        self.map_delay = pumps;
    }

    pub(crate) fn fail_next_map(&mut self, reason: &str) {
        self.next_failure = Some(reason.to_owned());
    }

    /// Drops the pending callback without invoking it.
    pub(crate) fn drop_pending_map(&mut self) {
        self.pending = None;
    }

    /// One non-blocking event pump.
    pub(crate) fn pump(&mut self) {
        match &mut self.pending {
            Some(p) if p.pumps_left > 0 => p.pumps_left -= 1,
            Some(_) => self.complete(),
            None => {}
        }
    }

    /// Delivers the pending completion regardless of delay.
    pub(crate) fn complete(&mut self) {
        let Some(pending) = self.pending.take() else { return };
        self.log.borrow_mut().push(Call::MapComplete);

        match self.next_failure.take() {
            Some(reason) => (pending.callback)(Err(MapError::Failed(reason))),
            None => {
                self.mapped = true;
                (pending.callback)(Ok(()));
            }
        }
    }
}

impl Staging for FakeStaging {
    fn layout(&self) -> ReadbackLayout {
        self.layout
    }

    fn submit_copy(&mut self) {
        self.log.borrow_mut().push(Call::SubmitCopy);
    }

    fn map_staging(&mut self, on_mapped: MapCallback) {
        assert!(self.pending.is_none(), "map requested while another is pending");
        assert!(!self.mapped, "map requested while the buffer is still mapped");

        self.log.borrow_mut().push(Call::MapRequest);
        self.pending = Some(PendingMap {
            callback: on_mapped,
            pumps_left: self.map_delay,
        });
    }

    fn read_staging(&self, visit: &mut dyn FnMut(&[u8])) {
        assert!(self.mapped, "read outside of a mapped window");

        self.log.borrow_mut().push(Call::Read);
        let bytes = vec![0u8; self.layout.buffer_size() as usize];
        visit(&bytes);
    }

    fn unmap_staging(&mut self) {
        assert!(self.mapped, "unmap without a mapped buffer");

        self.mapped = false;
        self.log.borrow_mut().push(Call::Unmap);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EncodedFrame {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub row_stride: u32,
    pub len: usize,
}

/// Encoder double that records what it was given.
#[derive(Debug, Default)]
pub(crate) struct RecordingEncoder {
    pub frames: Vec<EncodedFrame>,
    pub fail: bool,
}

impl ImageEncoder for RecordingEncoder {
    fn encode(
        &mut self,
        path: &Path,
        width: u32,
        height: u32,
        channels: u32,
        bytes: &[u8],
        row_stride: u32,
    ) -> Result<(), EncodeError> {
        if self.fail {
            return Err(EncodeError::Io(std::io::Error::other("disk full")));
        }
        self.frames.push(EncodedFrame {
            path: path.to_owned(),
            width,
            height,
            channels,
            row_stride,
            len: bytes.len(),
        });
        Ok(())
    }
}

/// Device double sharing one call log with its staging buffer.
pub(crate) struct FakeDevice {
    log: CallLog,
    staging: Option<FakeStaging>,
    acquired: u64,
    fail_acquire_at: Option<u64>,
    pub passes: Vec<PassDesc>,
}

impl FakeDevice {
    pub(crate) fn presentable() -> Self {
        Self {
            log: CallLog::default(),
            staging: None,
            acquired: 0,
            fail_acquire_at: None,
            passes: Vec::new(),
        }
    }

    pub(crate) fn offscreen(width: u32, height: u32) -> Self {
        let mut device = Self::presentable();
        device.staging = Some(FakeStaging::with_log(width, height, device.log.clone()));
        device
    }

    pub(crate) fn delay_maps(mut self, pumps: u32) -> Self {
        if let Some(staging) = &mut self.staging {
            staging.delay_maps(pumps);
        }
        self
    }

    pub(crate) fn fail_acquire_at(mut self, frame: u64) -> Self {
        self.fail_acquire_at = Some(frame);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    pub(crate) fn count(&self, call: Call) -> usize {
        self.log.borrow().iter().filter(|c| **c == call).count()
    }
}

impl FrameDevice for FakeDevice {
    type View = u64;

    fn acquire_view(&mut self) -> Result<u64, AcquireError> {
        self.log.borrow_mut().push(Call::Acquire);
        let frame = self.acquired;
        self.acquired += 1;

        if self.fail_acquire_at == Some(frame) {
            return Err(AcquireError::Unavailable("surface lost".into()));
        }
        Ok(frame)
    }

    fn submit_pass(&mut self, _view: &u64, pass: &PassDesc) {
        self.log.borrow_mut().push(Call::RenderPass);
        self.passes.push(*pass);
    }

    fn present(&mut self, _view: u64) {
        self.log.borrow_mut().push(Call::Present);
    }

    fn poll(&mut self) {
        self.log.borrow_mut().push(Call::Poll);
        if let Some(staging) = &mut self.staging {
            staging.pump();
        }
    }

    fn wait(&mut self) {
        self.log.borrow_mut().push(Call::Wait);
        if let Some(staging) = &mut self.staging {
            staging.complete();
        }
    }

    fn staging(&mut self) -> Option<&mut dyn Staging> {
        self.staging.as_mut().map(|s| s as &mut dyn Staging)
    }
}
