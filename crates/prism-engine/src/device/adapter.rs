use serde::Deserialize;

/// Execution backend kinds an adapter can be exposed through.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Vulkan,
    Metal,
    Dx12,
    Gl,
    #[serde(rename = "webgpu")]
    BrowserWebGpu,
}

impl BackendKind {
    /// Backend bitset used to restrict instance enumeration.
    pub fn to_backends(self) -> wgpu::Backends {
        match self {
            BackendKind::Vulkan => wgpu::Backends::VULKAN,
            BackendKind::Metal => wgpu::Backends::METAL,
            BackendKind::Dx12 => wgpu::Backends::DX12,
            BackendKind::Gl => wgpu::Backends::GL,
            BackendKind::BrowserWebGpu => wgpu::Backends::BROWSER_WEBGPU,
        }
    }

    /// Returns `None` for backends outside the closed set (e.g. wgpu's no-op backend).
    pub fn from_wgpu(backend: wgpu::Backend) -> Option<Self> {
        match backend {
            wgpu::Backend::Vulkan => Some(BackendKind::Vulkan),
            wgpu::Backend::Metal => Some(BackendKind::Metal),
            wgpu::Backend::Dx12 => Some(BackendKind::Dx12),
            wgpu::Backend::Gl => Some(BackendKind::Gl),
            wgpu::Backend::BrowserWebGpu => Some(BackendKind::BrowserWebGpu),
            _ => None,
        }
    }
}

/// Physical class of the device behind an adapter.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Discrete,
    Integrated,
    Virtual,
    Software,
    Other,
}

impl DeviceClass {
    pub fn from_wgpu(device_type: wgpu::DeviceType) -> Self {
        match device_type {
            wgpu::DeviceType::DiscreteGpu => DeviceClass::Discrete,
            wgpu::DeviceType::IntegratedGpu => DeviceClass::Integrated,
            wgpu::DeviceType::VirtualGpu => DeviceClass::Virtual,
            wgpu::DeviceType::Cpu => DeviceClass::Software,
            wgpu::DeviceType::Other => DeviceClass::Other,
        }
    }
}

/// Backend descriptor: what the caller would like to run on.
///
/// `None` in either field means "unspecified" and accepts anything.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct BackendPreference {
    pub backend: Option<BackendKind>,
    pub device_class: Option<DeviceClass>,
}

/// Read-only adapter properties used for filtering.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: Option<BackendKind>,
    pub device_class: DeviceClass,
}

/// Opaque enumerable adapter.
///
/// `profile` must be free of side effects; the enumerator calls it while filtering.
pub trait AdapterHandle {
    fn profile(&self) -> AdapterProfile;
}

impl AdapterHandle for wgpu::Adapter {
    fn profile(&self) -> AdapterProfile {
        let info = self.get_info();
        AdapterProfile {
            name: info.name,
            backend: BackendKind::from_wgpu(info.backend),
            device_class: DeviceClass::from_wgpu(info.device_type),
        }
    }
}

/// Device-class predicate. An unspecified class accepts every handle.
pub fn matches<A: AdapterHandle + ?Sized>(handle: &A, class: Option<DeviceClass>) -> bool {
    match class {
        None => true,
        Some(class) => handle.profile().device_class == class,
    }
}

/// Picks the first adapter, in enumeration order, matching `preference`.
///
/// The backend filter is re-checked here even though enumeration is already
/// restricted, so a backend that ignores the restriction cannot slip through.
pub fn select_adapter<A: AdapterHandle>(
    adapters: Vec<A>,
    preference: &BackendPreference,
) -> Option<A> {
    adapters.into_iter().find(|adapter| {
        let backend_ok = match preference.backend {
            None => true,
            Some(kind) => adapter.profile().backend == Some(kind),
        };
        backend_ok && matches(adapter, preference.device_class)
    })
}
