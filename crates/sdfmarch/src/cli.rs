use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "sdfmarch",
    author,
    version,
    about = "Real-time raymarched SDF viewer",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Override the render resolution (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// Optional FPS cap (0 = uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Disable vsync and present frames as fast as the surface allows.
    #[arg(long)]
    pub no_vsync: bool,

    /// Path to an alternative raymarch fragment shader.
    #[arg(long, value_name = "PATH")]
    pub shader: Option<PathBuf>,

    /// Window title override.
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Settings file; defaults to `sdfmarch.toml` in the platform config dir.
    #[arg(long, value_name = "FILE", env = "SDFMARCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Stop rendering and exit after the given duration (e.g. `30s`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration_arg)]
    pub exit_after: Option<Duration>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

fn parse_duration_arg(value: &str) -> Result<Duration, String> {
    humantime::parse_duration(value.trim()).map_err(|err| err.to_string())
}

/// Parses a `WIDTHxHEIGHT` size specification.
pub fn parse_surface_size(spec: &str) -> Result<(u32, u32), String> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WxH format, e.g. 1280x720".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| "invalid width in size specification".to_string())?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| "invalid height in size specification".to_string())?;

    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".to_string());
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_size() {
        assert_eq!(parse_surface_size("1280x720"), Ok((1280, 720)));
        assert_eq!(parse_surface_size(" 800 X 600 "), Ok((800, 600)));
    }

    #[test]
    fn rejects_malformed_size() {
        assert!(parse_surface_size("1280").is_err());
        assert!(parse_surface_size("widexhigh").is_err());
        assert!(parse_surface_size("0x600").is_err());
    }

    #[test]
    fn parses_exit_after_durations() {
        assert_eq!(parse_duration_arg("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration_arg(" 2m "), Ok(Duration::from_secs(120)));
        assert!(parse_duration_arg("soon").is_err());
    }
}
