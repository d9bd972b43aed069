//! Prism engine crate.
//!
//! GPU device negotiation, a single fixed render pipeline, and a frame loop
//! that either presents to a window or captures frames into host memory.

pub mod config;
pub mod device;
pub mod frame;
pub mod logging;
pub mod readback;
pub mod render;
pub mod session;
pub mod target;
pub mod window;

pub use config::PrismConfig;
pub use session::{ExitStatus, Session, StartupError};
