//! Prism viewer: renders the triangle to a window, or to PNG files when the
//! target mode is `offscreen`.
//!
//! Usage: `prism-viewer [config.toml]` (defaults to `prism.toml`).

use std::borrow::Cow;
use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;

use prism_engine::frame::{FrameBudget, FrameError, FrameLoop, LoopOutcome, PassDesc};
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::readback::{PngEncoder, Readback};
use prism_engine::target::TargetMode;
use prism_engine::window::WindowHost;
use prism_engine::{ExitStatus, PrismConfig, Session};

const DEFAULT_CONFIG: &str = "prism.toml";

fn main() -> ExitCode {
    let status = match load() {
        Ok((config, shader)) => run(&config, &shader),
        Err(e) => {
            init_logging(LoggingConfig::default());
            fail(ExitStatus::Config, format_args!("{e:#}"))
        }
    };
    ExitCode::from(status.code())
}

fn load() -> Result<(PrismConfig, Cow<'static, str>)> {
    let path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);

    let config = PrismConfig::load_from_path(&path)?;
    init_logging(config.logging.to_logging());

    let shader = config.render.shader_source()?;
    Ok((config, shader))
}

fn run(config: &PrismConfig, shader: &str) -> ExitStatus {
    let pass = PassDesc::triangle(config.render.clear_color());
    let target = &config.target;

    let result = match target.mode {
        TargetMode::Presentable => {
            let mut host = match WindowHost::create(target.width, target.height, &target.title) {
                Ok(host) => host,
                Err(e) => return fail(ExitStatus::Target, e),
            };
            let mut session = match Session::start(config, shader, host.window()) {
                Ok(session) => session,
                Err(e) => return fail(e.status(), e),
            };
            FrameLoop::<PngEncoder>::presenting(pass).run(&mut session, &mut host)
        }
        TargetMode::Offscreen => {
            let mut session = match Session::start(config, shader, None) {
                Ok(session) => session,
                Err(e) => return fail(e.status(), e),
            };
            let readback = Readback::new(PngEncoder, config.capture.output());
            let mut budget = FrameBudget::new(config.capture.frames);
            FrameLoop::capturing(pass, readback).run(&mut session, &mut budget)
        }
    };

    finish(result)
}

fn finish(result: Result<LoopOutcome, FrameError>) -> ExitStatus {
    match result {
        Ok(outcome) => {
            log::info!(
                "done: {} frame(s), {} captured, {} skipped",
                outcome.frames,
                outcome.captures,
                outcome.skipped_captures
            );
            ExitStatus::Graceful
        }
        Err(e) => fail(e.status(), e),
    }
}

fn fail(status: ExitStatus, error: impl Display) -> ExitStatus {
    log::error!("{error}");
    status
}
