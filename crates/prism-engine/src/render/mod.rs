//! Render pipeline construction.
//!
//! The engine draws one fixed triangle. Its pipeline is built once per run from
//! WGSL and reused unchanged for every frame.

mod pipeline;

pub use pipeline::{
    build_pipeline, PipelineError, FRAGMENT_ENTRY, TRIANGLE_WGSL, VERTEX_ENTRY,
};
