/// Failure while creating a frame target.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("target extent must be non-zero, got {width}x{height}")]
    ZeroExtent { width: u32, height: u32 },

    #[error("target extent {width}x{height} overflows the staging layout")]
    TooLarge { width: u32, height: u32 },

    #[error("texture format {0:?} cannot be read back")]
    UnsupportedFormat(wgpu::TextureFormat),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("presentable target requires a window")]
    MissingWindow,
}

/// A frame view could not be acquired. Always ends the frame loop.
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("surface texture unavailable: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("frame target unavailable: {0}")]
    Unavailable(String),
}
