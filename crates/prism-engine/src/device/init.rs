use serde::Deserialize;

use super::BackendPreference;

/// How the negotiator obtains its adapter.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterSelection {
    /// Enumerate every adapter and take the first one matching the preference.
    #[default]
    Enumerate,
    /// Ask the instance for a single best match.
    Request,
}

/// Backend-specific switches, passed through by name without validation.
#[derive(Debug, Clone, Default, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct Toggles {
    pub enable: Vec<String>,
    pub disable: Vec<String>,
}

/// Parameters for adapter and device negotiation.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct DeviceRequest {
    /// Backend kind and device class the adapter must match.
    pub preference: BackendPreference,

    /// Enumerate-and-filter or single request.
    pub selection: AdapterSelection,

    /// Instance-level toggles.
    pub toggles: Toggles,

    /// Debug label attached to the device.
    pub label: String,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for DeviceRequest {
    fn default() -> Self {
        Self {
            preference: BackendPreference::default(),
            selection: AdapterSelection::Enumerate,
            toggles: Toggles::default(),
            label: "prism device".to_string(),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}

impl DeviceRequest {
    /// Builds the wgpu device descriptor.
    ///
    /// Only called once an adapter has been selected.
    pub fn descriptor(&self) -> wgpu::DeviceDescriptor<'_> {
        wgpu::DeviceDescriptor {
            label: Some(&self.label),
            required_features: self.required_features,
            required_limits: self.required_limits.clone(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }
    }

    /// Adapter request options for the single-request strategy.
    pub fn power_preference(&self) -> wgpu::PowerPreference {
        use super::DeviceClass;

        match self.preference.device_class {
            Some(DeviceClass::Discrete) => wgpu::PowerPreference::HighPerformance,
            Some(DeviceClass::Integrated) => wgpu::PowerPreference::LowPower,
            _ => wgpu::PowerPreference::None,
        }
    }

    pub fn force_fallback(&self) -> bool {
        self.preference.device_class == Some(super::DeviceClass::Software)
    }
}

/// Applies toggles to the instance flags.
///
/// Names are matched case-insensitively against `wgpu::InstanceFlags`; anything
/// else is ignored.
pub fn apply_toggles(mut flags: wgpu::InstanceFlags, toggles: &Toggles) -> wgpu::InstanceFlags {
    for name in &toggles.enable {
        match flag_by_name(name) {
            Some(flag) => flags.insert(flag),
            None => log::debug!("ignoring unknown toggle '{name}'"),
        }
    }
    for name in &toggles.disable {
        match flag_by_name(name) {
            Some(flag) => flags.remove(flag),
            None => log::debug!("ignoring unknown toggle '{name}'"),
        }
    }
    flags
}

fn flag_by_name(name: &str) -> Option<wgpu::InstanceFlags> {
    wgpu::InstanceFlags::from_name(&name.trim().to_ascii_uppercase())
}
