use std::cell::RefCell;
use std::sync::Arc;

use super::{
    apply_toggles, BackendKind, DeviceRequest, ErrorSink, GpuBackend, NegotiationError,
};

/// Negotiated logical device and its queue.
///
/// Owns (transitively) every GPU resource created after negotiation. wgpu handles
/// are reference counted, so targets keep their own clones of `device`/`queue`.
pub struct Gpu {
    /// Logical device.
    pub device: wgpu::Device,

    /// Command queue.
    pub queue: wgpu::Queue,
}

/// wgpu-backed negotiator backend.
///
/// Owns the instance and, in presentable mode, the surface the adapter must be
/// able to present to.
pub struct WgpuBackend {
    /// wgpu instance used to enumerate adapters and create the surface.
    instance: wgpu::Instance,

    /// Surface the selected adapter must support. Handed back to the target
    /// builder from inside the negotiation continuation.
    surface: RefCell<Option<wgpu::Surface<'static>>>,
}

impl WgpuBackend {
    /// Creates the instance, restricted to the preferred backend when one is set.
    pub fn new(request: &DeviceRequest) -> Self {
        let backends = request
            .preference
            .backend
            .map_or_else(wgpu::Backends::all, BackendKind::to_backends);
        let flags = apply_toggles(
            wgpu::InstanceFlags::from_build_config().with_env(),
            &request.toggles,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            flags,
            ..Default::default()
        });

        Self { instance, surface: RefCell::new(None) }
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    /// Records the surface the adapter has to be compatible with.
    pub fn set_compatible_surface(&self, surface: wgpu::Surface<'static>) {
        self.surface.replace(Some(surface));
    }

    /// Hands the surface back once negotiation is over.
    pub fn take_surface(&self) -> Option<wgpu::Surface<'static>> {
        self.surface.take()
    }
}

impl GpuBackend for WgpuBackend {
    type Adapter = wgpu::Adapter;
    type Device = Gpu;

    async fn enumerate_adapters(&self, backend: Option<BackendKind>) -> Vec<wgpu::Adapter> {
        let backends = backend.map_or_else(wgpu::Backends::all, BackendKind::to_backends);
        let adapters = self.instance.enumerate_adapters(backends).await;

        let surface = self.surface.borrow();
        match surface.as_ref() {
            None => adapters,
            Some(surface) => adapters
                .into_iter()
                .filter(|adapter| {
                    let ok = adapter.is_surface_supported(surface);
                    if !ok {
                        log::debug!(
                            "skipping adapter '{}': cannot present to surface",
                            adapter.get_info().name
                        );
                    }
                    ok
                })
                .collect(),
        }
    }

    async fn request_adapter(
        &self,
        request: &DeviceRequest,
    ) -> Result<wgpu::Adapter, NegotiationError> {
        let surface = self.surface.borrow();
        self.instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: request.power_preference(),
                compatible_surface: surface.as_ref(),
                force_fallback_adapter: request.force_fallback(),
            })
            .await
            .map_err(|e| NegotiationError::Adapter(e.to_string()))
    }

    async fn request_device(
        &self,
        adapter: &wgpu::Adapter,
        request: &DeviceRequest,
    ) -> Result<Gpu, NegotiationError> {
        let info = adapter.get_info();
        log::info!(
            "requesting device on '{}' ({:?}, {:?}, driver '{}')",
            info.name,
            info.backend,
            info.device_type,
            info.driver
        );

        let (device, queue) = adapter
            .request_device(&request.descriptor())
            .await
            .map_err(|e| NegotiationError::Device(e.to_string()))?;

        Ok(Gpu { device, queue })
    }

    fn install_error_sink(&self, device: &Gpu, sink: ErrorSink) {
        device
            .device
            .on_uncaptured_error(Arc::new(move |error: wgpu::Error| sink(&error.to_string())));
    }
}
