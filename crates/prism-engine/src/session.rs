//! Startup wiring and the wgpu-backed frame device.
//!
//! `Session::start` runs negotiation, then builds the target and the pipeline
//! inside the negotiation continuation, so nothing device-bound exists unless
//! the device request succeeded.

use std::sync::Arc;

use winit::window::Window;

use crate::config::PrismConfig;
use crate::device::{negotiate_then, Gpu, Negotiated, NegotiationError, WgpuBackend};
use crate::frame::{FrameDevice, FrameError, PassDesc};
use crate::readback::Staging;
use crate::render::{build_pipeline, PipelineError};
use crate::target::{
    AcquireError, FrameView, OffscreenTarget, SurfaceTarget, TargetError, TargetManager,
    TargetMode, OFFSCREEN_FORMAT,
};

/// Process exit status for each failure class.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExitStatus {
    Graceful,
    Config,
    NoAdapter,
    Negotiation,
    Pipeline,
    Target,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Graceful => 0,
            ExitStatus::Config => 1,
            ExitStatus::NoAdapter => 2,
            ExitStatus::Negotiation => 3,
            ExitStatus::Pipeline => 4,
            ExitStatus::Target => 5,
        }
    }
}

/// Fatal failure before the first frame.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("no adapter matches {0}")]
    NoAdapter(String),

    #[error("device negotiation failed: {0}")]
    Negotiation(NegotiationError),

    #[error("pipeline creation failed: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("target creation failed: {0}")]
    Target(#[from] TargetError),
}

impl From<NegotiationError> for StartupError {
    fn from(e: NegotiationError) -> Self {
        match e {
            NegotiationError::NoAdapter(wanted) => StartupError::NoAdapter(wanted),
            other => StartupError::Negotiation(other),
        }
    }
}

impl StartupError {
    pub fn status(&self) -> ExitStatus {
        match self {
            StartupError::NoAdapter(_) => ExitStatus::NoAdapter,
            StartupError::Negotiation(_) => ExitStatus::Negotiation,
            StartupError::Pipeline(_) => ExitStatus::Pipeline,
            StartupError::Target(_) => ExitStatus::Target,
        }
    }
}

impl FrameError {
    pub fn status(&self) -> ExitStatus {
        ExitStatus::Target
    }
}

/// Device, pipeline and target of one run.
pub struct Session {
    gpu: Gpu,
    adapter: wgpu::Adapter,
    pipeline: wgpu::RenderPipeline,
    target: TargetManager,
}

impl Session {
    /// Negotiates a device and builds the target and pipeline on it.
    ///
    /// `window` is required in presentable mode and ignored offscreen.
    pub fn start(
        config: &PrismConfig,
        shader: &str,
        window: Option<Arc<Window>>,
    ) -> Result<Self, StartupError> {
        let request = config.device_request();
        let backend = WgpuBackend::new(&request);

        if config.target.mode == TargetMode::Presentable {
            let window = window.ok_or(TargetError::MissingWindow)?;
            let surface = backend
                .instance()
                .create_surface(window)
                .map_err(TargetError::from)?;
            backend.set_compatible_surface(surface);
        }

        negotiate_then(&backend, &request, |negotiated| {
            Self::build(config, shader, &backend, negotiated)
        })
    }

    /// Negotiation continuation: only reached with a live device.
    fn build(
        config: &PrismConfig,
        shader: &str,
        backend: &WgpuBackend,
        Negotiated { adapter, device: gpu }: Negotiated<WgpuBackend>,
    ) -> Result<Self, StartupError> {
        let mode = config.target.mode;
        let (width, height) = (config.target.width, config.target.height);

        let target = match mode {
            TargetMode::Presentable => {
                let surface = backend.take_surface().ok_or(TargetError::MissingWindow)?;
                TargetManager::Presentable(SurfaceTarget::new(
                    surface,
                    &adapter,
                    &gpu.device,
                    (width, height),
                    config.target.present_mode,
                )?)
            }
            TargetMode::Offscreen => TargetManager::Offscreen(OffscreenTarget::new(
                &gpu,
                width,
                height,
                OFFSCREEN_FORMAT,
            )?),
        };

        let pipeline = build_pipeline(&gpu.device, shader, target.format())?;
        log::info!("session ready: {:?} target, {:?}", mode, target.format());

        Ok(Session { gpu, adapter, pipeline, target })
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub fn target_mode(&self) -> TargetMode {
        self.target.mode()
    }
}

impl FrameDevice for Session {
    type View = FrameView;

    fn acquire_view(&mut self) -> Result<FrameView, AcquireError> {
        self.target.acquire_view()
    }

    fn submit_pass(&mut self, view: &FrameView, pass: &PassDesc) {
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("prism frame encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("prism frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: view.view(),
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(pass.clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&self.pipeline);
            rpass.draw(0..pass.vertex_count, 0..1);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        self.gpu
            .queue
            .on_submitted_work_done(|| log::trace!("frame work done"));
    }

    fn present(&mut self, view: FrameView) {
        self.target.present(view);
    }

    fn poll(&mut self) {
        if let Err(e) = self.gpu.device.poll(wgpu::PollType::Poll) {
            log::warn!("device poll failed: {e}");
        }
    }

    fn wait(&mut self) {
        let wait = wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        };
        if let Err(e) = self.gpu.device.poll(wait) {
            log::warn!("device wait failed: {e}");
        }
    }

    fn staging(&mut self) -> Option<&mut dyn Staging> {
        self.target.staging().map(|t| t as &mut dyn Staging)
    }
}
