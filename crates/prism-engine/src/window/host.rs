use std::sync::Arc;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::frame::RunCondition;

/// Pumps spent waiting for the platform to hand out the first window.
const STARTUP_PUMPS: u32 = 100;
const STARTUP_PUMP_TIMEOUT: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] EventLoopError),

    #[error("failed to create window: {0}")]
    Create(#[from] OsError),

    #[error("platform never resumed the application")]
    NotResumed,
}

/// Event-loop state driven by `pump_app_events`.
struct HostState {
    pending: Option<WindowAttributes>,
    window: Option<Arc<Window>>,
    error: Option<OsError>,
    close_requested: bool,
}

impl ApplicationHandler for HostState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(attrs) = self.pending.take() else { return };

        match event_loop.create_window(attrs) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => {
                self.error = Some(e);
                self.close_requested = true;
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                log::info!("window close requested");
                self.close_requested = true;
            }
            _ => {}
        }
    }
}

/// One fixed-size window whose events are pumped once per frame.
///
/// The frame loop owns the pacing; the host never blocks waiting for events.
pub struct WindowHost {
    event_loop: EventLoop<()>,
    state: HostState,
}

impl WindowHost {
    /// Opens a non-resizable window of `width`x`height` physical pixels.
    pub fn create(width: u32, height: u32, title: &str) -> Result<Self, WindowError> {
        let event_loop = EventLoop::new()?;
        let attrs = Window::default_attributes()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(false);

        let mut host = Self {
            event_loop,
            state: HostState {
                pending: Some(attrs),
                window: None,
                error: None,
                close_requested: false,
            },
        };

        for _ in 0..STARTUP_PUMPS {
            host.pump(Some(STARTUP_PUMP_TIMEOUT));
            if let Some(e) = host.state.error.take() {
                return Err(WindowError::Create(e));
            }
            if host.state.window.is_some() {
                log::info!("window '{title}' opened at {width}x{height}");
                return Ok(host);
            }
        }

        Err(WindowError::NotResumed)
    }

    /// Window handle the surface is derived from.
    pub fn window(&self) -> Option<Arc<Window>> {
        self.state.window.clone()
    }

    fn pump(&mut self, timeout: Option<Duration>) {
        if let PumpStatus::Exit(code) = self.event_loop.pump_app_events(timeout, &mut self.state) {
            log::debug!("event loop exited with {code}");
            self.state.close_requested = true;
        }
    }
}

impl RunCondition for WindowHost {
    fn poll_events(&mut self) {
        self.pump(Some(Duration::ZERO));
    }

    fn should_close(&self) -> bool {
        self.state.close_requested
    }
}
