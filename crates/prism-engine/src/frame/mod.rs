//! Per-frame driver.
//!
//! One iteration acquires a view, records and submits a single render pass,
//! then either presents or drains into the readback, and finally pumps device
//! events. Nothing here blocks except the final flush.

mod device;
mod run;

#[cfg(test)]
pub(crate) mod testing;

pub use device::{FrameDevice, PassDesc};
pub use run::{FrameBudget, FrameError, FrameLoop, LoopOutcome, RunCondition};
