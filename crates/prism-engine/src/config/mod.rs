//! Run configuration loaded from `prism.toml`.
//!
//! Every section is optional; missing keys take the defaults below.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::device::{
    AdapterSelection, BackendKind, BackendPreference, DeviceClass, DeviceRequest, PresentMode,
    Toggles,
};
use crate::logging::LoggingConfig;
use crate::readback::CaptureOutput;
use crate::render::TRIANGLE_WGSL;
use crate::target::TargetMode;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PrismConfig {
    pub device: DeviceConfig,
    pub target: TargetConfig,
    pub render: RenderConfig,
    pub capture: CaptureConfig,
    pub logging: LogConfig,
}

/// Adapter preference and instance toggles.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub backend: Option<BackendKind>,
    pub device_class: Option<DeviceClass>,
    pub selection: AdapterSelection,
    pub enable_toggles: Vec<String>,
    pub disable_toggles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub mode: TargetMode,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub present_mode: PresentMode,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            mode: TargetMode::Presentable,
            width: 512,
            height: 512,
            title: "prism".to_string(),
            present_mode: PresentMode::Fifo,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// RGBA, linear, 0..=1.
    pub clear_color: [f64; 4],

    /// WGSL file replacing the built-in triangle shader.
    pub shader: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            shader: None,
        }
    }
}

impl RenderConfig {
    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color { r, g, b, a }
    }

    /// Shader text: the configured file, or the built-in triangle.
    pub fn shader_source(&self) -> Result<Cow<'static, str>> {
        match &self.shader {
            None => Ok(Cow::Borrowed(TRIANGLE_WGSL)),
            Some(path) => std::fs::read_to_string(path)
                .map(Cow::Owned)
                .with_context(|| format!("failed to read shader {:?}", path)),
        }
    }
}

/// Offscreen capture settings. Ignored in presentable mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Output path; `{frame}` is replaced by the frame index.
    pub path: PathBuf,

    /// Frames rendered before an offscreen run ends.
    pub frames: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("capture.png"),
            frames: 1,
        }
    }
}

impl CaptureConfig {
    pub fn output(&self) -> CaptureOutput {
        CaptureOutput::new(&self.path)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `env_logger` filter; `RUST_LOG` applies when unset.
    pub filter: Option<String>,
}

impl LogConfig {
    pub fn to_logging(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.filter.clone(),
            ..LoggingConfig::default()
        }
    }
}

impl PrismConfig {
    /// Loads configuration from `path`, falling back to defaults if the file
    /// does not exist.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("failed to parse config file {:?}", path))?;

        log::info!("loaded configuration from {:?}", path);
        log::debug!("config: {:?}", config);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let TargetConfig { width, height, .. } = self.target;
        if width == 0 || height == 0 {
            bail!("target size must be non-zero, got {width}x{height}");
        }
        if self.target.mode == TargetMode::Offscreen && self.capture.frames == 0 {
            bail!("offscreen runs need at least one capture frame");
        }
        Ok(())
    }

    /// Negotiation parameters derived from `[device]`.
    pub fn device_request(&self) -> DeviceRequest {
        DeviceRequest {
            preference: BackendPreference {
                backend: self.device.backend,
                device_class: self.device.device_class,
            },
            selection: self.device.selection,
            toggles: Toggles {
                enable: self.device.enable_toggles.clone(),
                disable: self.device.disable_toggles.clone(),
            },
            ..DeviceRequest::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = PrismConfig::from_toml("").unwrap();
        assert_eq!(config.target.mode, TargetMode::Presentable);
        assert_eq!((config.target.width, config.target.height), (512, 512));
        assert_eq!(config.target.present_mode, PresentMode::Fifo);
        assert_eq!(config.capture.frames, 1);
        assert_eq!(config.device.selection, AdapterSelection::Enumerate);
        assert!(config.device.backend.is_none());
    }

    #[test]
    fn full_file_parses() {
        let config = PrismConfig::from_toml(
            r#"
            [device]
            backend = "vulkan"
            device_class = "discrete"
            selection = "request"
            enable_toggles = ["VALIDATION"]

            [target]
            mode = "offscreen"
            width = 800
            height = 600
            present_mode = "mailbox"

            [render]
            clear_color = [0.1, 0.2, 0.3, 1.0]

            [capture]
            path = "caps/frame-{frame}.png"
            frames = 4

            [logging]
            filter = "prism_engine=debug"
            "#,
        )
        .unwrap();

        let request = config.device_request();
        assert_eq!(request.preference.backend, Some(BackendKind::Vulkan));
        assert_eq!(request.preference.device_class, Some(DeviceClass::Discrete));
        assert_eq!(request.selection, AdapterSelection::Request);
        assert_eq!(request.toggles.enable, ["VALIDATION"]);

        assert_eq!(config.target.mode, TargetMode::Offscreen);
        assert_eq!(config.target.present_mode, PresentMode::Mailbox);
        assert_eq!(config.render.clear_color().g, 0.2);
        assert_eq!(
            config.capture.output().path_for(2),
            PathBuf::from("caps/frame-00002.png")
        );
        assert_eq!(
            config.logging.to_logging().env_filter.as_deref(),
            Some("prism_engine=debug")
        );
    }

    #[test]
    fn webgpu_backend_name() {
        let config = PrismConfig::from_toml("[device]\nbackend = \"webgpu\"").unwrap();
        assert_eq!(config.device.backend, Some(BackendKind::BrowserWebGpu));
    }

    #[test]
    fn zero_extent_is_rejected() {
        assert!(PrismConfig::from_toml("[target]\nwidth = 0").is_err());
    }

    #[test]
    fn offscreen_needs_frames() {
        let err = PrismConfig::from_toml("[target]\nmode = \"offscreen\"\n[capture]\nframes = 0");
        assert!(err.is_err());
    }

    #[test]
    fn unknown_backend_is_a_parse_error() {
        assert!(PrismConfig::from_toml("[device]\nbackend = \"glide\"").is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = PrismConfig::load_from_path("/nonexistent/prism.toml").unwrap();
        assert_eq!(config.target.title, "prism");
    }

    #[test]
    fn builtin_shader_by_default() {
        let source = RenderConfig::default().shader_source().unwrap();
        assert!(source.contains("vs_main"));
    }
}
