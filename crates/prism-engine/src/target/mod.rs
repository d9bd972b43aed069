//! Frame targets.
//!
//! A run renders either to a window surface (presentable) or to a fixed texture
//! that is copied into host memory (offscreen). The variant is chosen once at
//! startup and never switched.

mod error;
mod layout;
mod offscreen;
mod surface;

use serde::Deserialize;

pub use error::{AcquireError, TargetError};
pub use layout::ReadbackLayout;
pub use offscreen::OffscreenTarget;
pub use surface::SurfaceTarget;

/// Which target variant a run uses.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMode {
    #[default]
    Presentable,
    Offscreen,
}

/// Color format used by offscreen captures (RGBA8, straight alpha).
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// View acquired for one frame.
pub enum FrameView {
    Surface {
        texture: wgpu::SurfaceTexture,
        view: wgpu::TextureView,
    },
    Offscreen(wgpu::TextureView),
}

impl FrameView {
    pub fn view(&self) -> &wgpu::TextureView {
        match self {
            FrameView::Surface { view, .. } => view,
            FrameView::Offscreen(view) => view,
        }
    }
}

/// Presentable or offscreen target behind one `acquire_view` / `present` contract.
pub enum TargetManager {
    Presentable(SurfaceTarget),
    Offscreen(OffscreenTarget),
}

impl TargetManager {
    pub fn mode(&self) -> TargetMode {
        match self {
            TargetManager::Presentable(_) => TargetMode::Presentable,
            TargetManager::Offscreen(_) => TargetMode::Offscreen,
        }
    }

    /// Output color format the pipeline must declare.
    pub fn format(&self) -> wgpu::TextureFormat {
        match self {
            TargetManager::Presentable(t) => t.format(),
            TargetManager::Offscreen(t) => t.format(),
        }
    }

    pub fn acquire_view(&mut self) -> Result<FrameView, AcquireError> {
        match self {
            TargetManager::Presentable(t) => t.acquire_view(),
            TargetManager::Offscreen(t) => Ok(t.acquire_view()),
        }
    }

    /// Presents a surface frame. Offscreen views are simply released.
    pub fn present(&mut self, frame: FrameView) {
        match frame {
            FrameView::Surface { texture, view } => {
                drop(view);
                texture.present();
            }
            FrameView::Offscreen(_) => {}
        }
    }

    /// Staging access, only available in offscreen mode.
    pub fn staging(&mut self) -> Option<&mut OffscreenTarget> {
        match self {
            TargetManager::Presentable(_) => None,
            TargetManager::Offscreen(t) => Some(t),
        }
    }
}
