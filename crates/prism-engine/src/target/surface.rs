use crate::device::surface::{choose_alpha_mode, choose_present_mode, choose_surface_format};
use crate::device::PresentMode;

use super::{AcquireError, FrameView, TargetError};

/// Window surface and its swap configuration.
///
/// The surface is configured once; there is no resize or recreate path, so a
/// lost or outdated surface ends the run.
pub struct SurfaceTarget {
    /// Surface bound to the window.
    surface: wgpu::Surface<'static>,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,
}

impl SurfaceTarget {
    pub fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        (width, height): (u32, u32),
        present_mode: PresentMode,
    ) -> Result<Self, TargetError> {
        if width == 0 || height == 0 {
            return Err(TargetError::ZeroExtent { width, height });
        }

        let caps = surface.get_capabilities(adapter);
        let format =
            choose_surface_format(&caps.formats, true).ok_or(TargetError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: choose_present_mode(&caps.present_modes, present_mode),
            alpha_mode: choose_alpha_mode(&caps.alpha_modes),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(device, &config);
        log::info!(
            "surface configured {}x{} {:?} {:?}",
            width,
            height,
            config.format,
            config.present_mode
        );

        Ok(Self { surface, config })
    }

    /// Returns the active surface format.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Acquires the next surface texture.
    ///
    /// The view is only valid for this frame's commands and its `present`.
    pub fn acquire_view(&self) -> Result<FrameView, AcquireError> {
        let texture = self.surface.get_current_texture()?;
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok(FrameView::Surface { texture, view })
    }
}
