//! Offscreen frame capture.
//!
//! Copies the render target into the staging buffer, maps it asynchronously and
//! hands the bytes to an [`ImageEncoder`]. At most one map is outstanding: a
//! frame that finishes while the previous map is still pending is not captured.

mod png;
mod staging;

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};

pub use png::{EncodeError, ImageEncoder, PngEncoder};
pub use staging::{MapCallback, MapError, Staging};

/// Channel count handed to the encoder (RGBA8).
pub const CHANNELS: u32 = 4;

/// Where captured frames are written.
///
/// A `{frame}` placeholder in the template is replaced by the zero-padded frame
/// index; without it every capture overwrites the same file.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOutput {
    template: PathBuf,
}

impl CaptureOutput {
    pub fn new(template: impl Into<PathBuf>) -> Self {
        Self { template: template.into() }
    }

    pub fn path_for(&self, frame: u64) -> PathBuf {
        let raw = self.template.to_string_lossy();
        if raw.contains("{frame}") {
            PathBuf::from(raw.replace("{frame}", &format!("{frame:05}")))
        } else {
            self.template.clone()
        }
    }
}

enum MapState {
    Idle,
    Pending {
        frame: u64,
        completion: Receiver<Result<(), MapError>>,
    },
}

/// Result of asking the readback to capture a frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrainStatus {
    /// Copy submitted and map requested.
    Requested,
    /// A previous map is still outstanding; this frame is not captured.
    Busy,
}

/// Copy → map → encode → unmap state machine.
pub struct Readback<E> {
    encoder: E,
    output: CaptureOutput,
    state: MapState,
    captured: u64,
}

impl<E: ImageEncoder> Readback<E> {
    pub fn new(encoder: E, output: CaptureOutput) -> Self {
        Self {
            encoder,
            output,
            state: MapState::Idle,
            captured: 0,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, MapState::Pending { .. })
    }

    /// Frames successfully handed to the encoder.
    pub fn captured(&self) -> u64 {
        self.captured
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Submits the copy for `frame`, then requests the map.
    ///
    /// Must be called after the frame's render submission.
    pub fn drain(&mut self, staging: &mut dyn Staging, frame: u64) -> DrainStatus {
        if let MapState::Pending { frame: pending, .. } = &self.state {
            log::debug!("frame {frame}: map for frame {pending} still pending, not captured");
            return DrainStatus::Busy;
        }

        staging.submit_copy();

        let (tx, rx) = mpsc::channel();
        staging.map_staging(Box::new(move |result| {
            // The receiver only disappears if the readback itself was dropped.
            let _ = tx.send(result);
        }));

        self.state = MapState::Pending { frame, completion: rx };
        DrainStatus::Requested
    }

    /// Consumes a delivered map completion, if any.
    ///
    /// Call after the device's event pump. Returns `true` while the map is
    /// still outstanding.
    pub fn service(&mut self, staging: &mut dyn Staging) -> bool {
        let MapState::Pending { frame, completion } = &self.state else {
            return false;
        };

        let result = match completion.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Disconnected) => Err(MapError::Dropped),
        };
        let frame = *frame;

        match result {
            Ok(()) => {
                self.write(staging, frame);
                staging.unmap_staging();
            }
            Err(e) => log::warn!("frame {frame}: {e}; capture skipped"),
        }

        self.state = MapState::Idle;
        false
    }

    fn write(&mut self, staging: &dyn Staging, frame: u64) {
        let layout = staging.layout();
        debug_assert_eq!(layout.bytes_per_pixel, CHANNELS);

        let path = self.output.path_for(frame);
        let encoder = &mut self.encoder;
        let mut result = Ok(());

        staging.read_staging(&mut |bytes| {
            log::trace!("frame {frame}: {} mapped bytes", bytes.len());
            result = encoder.encode(
                &path,
                layout.width,
                layout.height,
                CHANNELS,
                bytes,
                layout.row_stride,
            );
        });

        match result {
            Ok(()) => {
                self.captured += 1;
                log::info!("frame {frame} captured to {}", path.display());
            }
            Err(e) => log::warn!("frame {frame}: failed to write {}: {e}", path.display()),
        }
    }
}
