//! Adapter discovery + device negotiation.
//!
//! This module is responsible for:
//! - enumerating adapters and filtering them by backend / device class
//! - chaining the adapter and device requests
//! - installing the uncaptured-error sink on the new device

mod adapter;
mod error;
mod gpu;
mod init;
mod negotiate;
pub(crate) mod surface;

pub use adapter::{
    matches, select_adapter, AdapterHandle, AdapterProfile, BackendKind, BackendPreference,
    DeviceClass,
};
pub use error::NegotiationError;
pub use gpu::{Gpu, WgpuBackend};
pub use init::{apply_toggles, AdapterSelection, DeviceRequest, Toggles};
pub use negotiate::{
    negotiate, negotiate_blocking, negotiate_then, ErrorSink, GpuBackend, Negotiated,
};
pub use surface::PresentMode;
