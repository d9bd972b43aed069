use crate::device::Gpu;
use crate::readback::{MapCallback, MapError, Staging};

use super::{FrameView, ReadbackLayout, TargetError};

/// Render texture plus the host-visible buffer it is copied into.
///
/// The view never rotates: every frame renders into the same texture. The
/// staging buffer is tightly packed; widths whose rows miss the copy alignment
/// go through `padded` and are compacted row by row on the GPU.
pub struct OffscreenTarget {
    device: wgpu::Device,
    queue: wgpu::Queue,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    padded: Option<wgpu::Buffer>,
    staging: wgpu::Buffer,
    layout: ReadbackLayout,
}

impl OffscreenTarget {
    pub fn new(
        gpu: &Gpu,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Result<Self, TargetError> {
        if !matches!(
            format,
            wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb
        ) {
            return Err(TargetError::UnsupportedFormat(format));
        }
        let layout = ReadbackLayout::new(width, height, format)?;

        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("prism offscreen target"),
            size: layout.extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let padded = (!layout.is_copy_aligned()).then(|| {
            gpu.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("prism readback rows"),
                size: layout.copy_buffer_size(),
                usage: wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        let staging = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism readback staging"),
            size: layout.buffer_size(),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::info!(
            "offscreen target {}x{} {:?}, staging {} bytes, stride {}{}",
            width,
            height,
            format,
            layout.buffer_size(),
            layout.row_stride,
            if padded.is_some() { " (compacted from padded rows)" } else { "" }
        );

        Ok(Self {
            device: gpu.device.clone(),
            queue: gpu.queue.clone(),
            texture,
            view,
            padded,
            staging,
            layout,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.texture.format()
    }

    /// Returns the one fixed view.
    pub fn acquire_view(&self) -> FrameView {
        FrameView::Offscreen(self.view.clone())
    }
}

impl Staging for OffscreenTarget {
    fn layout(&self) -> ReadbackLayout {
        self.layout
    }

    fn submit_copy(&mut self) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("prism readback encoder"),
            });

        let layout = self.layout;
        let target = self.padded.as_ref().unwrap_or(&self.staging);

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: target,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(layout.copy_stride()),
                    rows_per_image: Some(layout.height),
                },
            },
            layout.extent(),
        );

        if let Some(padded) = &self.padded {
            let (src, dst) = (layout.copy_stride() as u64, layout.row_stride as u64);
            for row in 0..layout.height as u64 {
                encoder.copy_buffer_to_buffer(padded, row * src, &self.staging, row * dst, dst);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn map_staging(&mut self, on_mapped: MapCallback) {
        self.staging
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                on_mapped(result.map_err(|e| MapError::Failed(e.to_string())));
            });
    }

    fn read_staging(&self, visit: &mut dyn FnMut(&[u8])) {
        let mapped = self.staging.slice(..).get_mapped_range();
        visit(&mapped);
    }

    fn unmap_staging(&mut self) {
        self.staging.unmap();
    }
}
