//! Windowing collaborator.
//!
//! Owns the `winit` event loop and the single window. Events are pumped from
//! the frame loop instead of handing control to winit.

mod host;

pub use host::{WindowError, WindowHost};
