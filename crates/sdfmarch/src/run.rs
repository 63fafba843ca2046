use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use directories_next::ProjectDirs;
use marchconfig::Settings;
use renderer::{RenderRuntime, Renderer, RendererConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::{parse_surface_size, RunArgs};

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(args: RunArgs) -> Result<()> {
    let settings = load_settings(&args)?;
    let exit_after = args.exit_after.or(settings.render.exit_after);
    let config = build_renderer_config(&args, &settings)?;

    tracing::info!(
        width = config.surface_size.0,
        height = config.surface_size.1,
        fps = ?config.target_fps,
        vsync = config.vsync,
        shader = ?config.fragment_shader,
        "starting sdfmarch"
    );

    match exit_after {
        Some(limit) => run_bounded(config, limit),
        None => Renderer::new(config).run(),
    }
}

/// Renders for `limit`, then delivers the stop signal and waits for the loop
/// thread to wind down.
fn run_bounded(config: RendererConfig, limit: Duration) -> Result<()> {
    let runtime = RenderRuntime::spawn(config)?;
    thread::sleep(limit);
    tracing::info!(?limit, "exit-after limit reached; stopping render loop");
    if let Err(err) = runtime.stop() {
        // The loop may already be gone if the window was closed by hand.
        tracing::debug!(%err, "render loop already shut down");
    }
    runtime.join()
}

fn load_settings(args: &RunArgs) -> Result<Settings> {
    match settings_path(args) {
        Some(path) => Settings::load(&path)
            .with_context(|| format!("failed to load settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}

/// An explicit `--config` must exist; the platform default is optional.
fn settings_path(args: &RunArgs) -> Option<PathBuf> {
    if let Some(path) = &args.config {
        return Some(path.clone());
    }
    ProjectDirs::from("", "", "sdfmarch")
        .map(|dirs| dirs.config_dir().join("sdfmarch.toml"))
        .filter(|path| path.exists())
}

/// CLI flags win over the settings file; the settings file wins over built-in
/// defaults.
fn build_renderer_config(args: &RunArgs, settings: &Settings) -> Result<RendererConfig> {
    let surface_size = match &args.size {
        Some(spec) => parse_surface_size(spec).map_err(|err| anyhow::anyhow!(err))?,
        None => (settings.window.width, settings.window.height),
    };

    let target_fps = match args.fps {
        Some(fps) if fps > 0.0 => Some(fps),
        // An explicit 0 asks for uncapped rendering even if the file caps it.
        Some(_) => None,
        None => settings.fps_cap(),
    };

    let fragment_shader = args
        .shader
        .clone()
        .or_else(|| settings.shader.fragment.clone());

    Ok(RendererConfig {
        surface_size,
        title: args
            .title
            .clone()
            .unwrap_or_else(|| settings.window.title.clone()),
        target_fps,
        vsync: !args.no_vsync && settings.render.vsync,
        fragment_shader,
    })
}
