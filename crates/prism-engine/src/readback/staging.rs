use crate::target::ReadbackLayout;

/// The staging buffer could not be mapped for reading.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("buffer map failed: {0}")]
    Failed(String),

    /// The backend dropped the callback without ever calling it.
    #[error("buffer map callback was dropped")]
    Dropped,
}

/// One-shot completion for a map request. Runs during the device's event pump.
pub type MapCallback = Box<dyn FnOnce(Result<(), MapError>) + Send + 'static>;

/// Host-visible copy of the offscreen render target.
///
/// Call order per captured frame is fixed:
/// `submit_copy` → `map_staging` → (pump) → `read_staging` → `unmap_staging`.
/// `read_staging` is only valid between a successful map completion and
/// `unmap_staging`.
pub trait Staging {
    fn layout(&self) -> ReadbackLayout;

    /// Records and submits the texture → staging buffer copy.
    fn submit_copy(&mut self);

    /// Requests read access to the whole staging buffer.
    fn map_staging(&mut self, on_mapped: MapCallback);

    /// Exposes the mapped bytes (`row_stride * height` long) to `visit`.
    fn read_staging(&self, visit: &mut dyn FnMut(&[u8]));

    fn unmap_staging(&mut self);
}
