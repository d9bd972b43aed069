use std::time::{Duration, Instant};

use crate::readback::{DrainStatus, ImageEncoder, Readback};
use crate::target::AcquireError;

use super::{FrameDevice, PassDesc};

/// External condition that keeps the loop running.
pub trait RunCondition {
    /// Processes pending platform events.
    fn poll_events(&mut self);

    fn should_close(&self) -> bool;
}

/// Run condition for headless runs: closes after a fixed number of frames.
#[derive(Debug, Copy, Clone)]
pub struct FrameBudget {
    frames: u64,
    polls: u64,
}

impl FrameBudget {
    pub fn new(frames: u64) -> Self {
        Self { frames, polls: 0 }
    }
}

impl RunCondition for FrameBudget {
    // One poll per loop iteration, so the poll count is the index of the
    // frame about to start plus one.
    fn poll_events(&mut self) {
        self.polls = self.polls.saturating_add(1);
    }

    fn should_close(&self) -> bool {
        self.polls > self.frames
    }
}

/// Fatal frame-loop failure.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame {frame}: {source}")]
    Acquire {
        frame: u64,
        #[source]
        source: AcquireError,
    },

    #[error("capture requested but the target has no staging buffer")]
    NoStaging,
}

/// Totals reported when the loop ends.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LoopOutcome {
    /// Frames rendered and submitted.
    pub frames: u64,
    /// Frames written by the encoder.
    pub captures: u64,
    /// Frames not captured because a previous map was still pending.
    pub skipped_captures: u64,
}

/// Drives `acquire → record → submit → present/drain → pump` until the run
/// condition closes.
pub struct FrameLoop<E> {
    pass: PassDesc,
    readback: Option<Readback<E>>,
    /// Start and frame count of the current fps window.
    rate_window: (Instant, u32),
}

impl<E: ImageEncoder> FrameLoop<E> {
    /// Loop for presentable targets.
    pub fn presenting(pass: PassDesc) -> Self {
        Self::new(pass, None)
    }

    /// Loop for offscreen targets; every frame is offered to `readback`.
    pub fn capturing(pass: PassDesc, readback: Readback<E>) -> Self {
        Self::new(pass, Some(readback))
    }

    fn new(pass: PassDesc, readback: Option<Readback<E>>) -> Self {
        Self {
            pass,
            readback,
            rate_window: (Instant::now(), 0),
        }
    }

    pub fn readback(&self) -> Option<&Readback<E>> {
        self.readback.as_ref()
    }

    /// Renders until `condition` closes. Frames are numbered from zero in
    /// submission order.
    pub fn run<D, C>(
        &mut self,
        device: &mut D,
        condition: &mut C,
    ) -> Result<LoopOutcome, FrameError>
    where
        D: FrameDevice,
        C: RunCondition,
    {
        if self.readback.is_some() && device.staging().is_none() {
            return Err(FrameError::NoStaging);
        }

        let mut outcome = LoopOutcome::default();
        self.rate_window = (Instant::now(), 0);
        loop {
            condition.poll_events();
            if condition.should_close() {
                break;
            }

            let frame = outcome.frames;
            self.frame(device, frame, &mut outcome)?;
            self.track_rate();
        }

        self.flush(device, &mut outcome);
        log::info!(
            "frame loop finished: {} frame(s), {} capture(s)",
            outcome.frames,
            outcome.captures
        );
        Ok(outcome)
    }

    fn frame<D: FrameDevice>(
        &mut self,
        device: &mut D,
        frame: u64,
        outcome: &mut LoopOutcome,
    ) -> Result<(), FrameError> {
        let view = device
            .acquire_view()
            .map_err(|source| FrameError::Acquire { frame, source })?;

        device.submit_pass(&view, &self.pass);

        match &mut self.readback {
            None => device.present(view),
            Some(readback) => {
                drop(view);
                let staging = device.staging().ok_or(FrameError::NoStaging)?;
                if readback.drain(staging, frame) == DrainStatus::Busy {
                    outcome.skipped_captures += 1;
                }
            }
        }

        device.poll();

        if let Some(readback) = &mut self.readback {
            if let Some(staging) = device.staging() {
                readback.service(staging);
            }
            outcome.captures = readback.captured();
        }

        outcome.frames += 1;
        Ok(())
    }

    /// Waits for an outstanding map so the last captured frame is not lost.
    fn flush<D: FrameDevice>(&mut self, device: &mut D, outcome: &mut LoopOutcome) {
        let Some(readback) = &mut self.readback else { return };

        while readback.is_pending() {
            device.wait();
            let Some(staging) = device.staging() else { break };
            readback.service(staging);
        }
        outcome.captures = readback.captured();
    }

    fn track_rate(&mut self) {
        let (start, frames) = &mut self.rate_window;
        *frames += 1;
        let elapsed = start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            log::debug!("{:.1} fps", f64::from(*frames) / elapsed.as_secs_f64());
            self.rate_window = (Instant::now(), 0);
        }
    }
}
