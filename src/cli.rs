//! Command-line interface

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gaze_aoi_config::{AppConfig, Settings};

#[derive(Parser, Debug)]
#[command(
    name = "gaze-aoi",
    version,
    about = "Resolve eye-tracker gaze to scene objects and log attention"
)]
pub struct Cli {
    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Receive gaze packets and run the pipeline until Ctrl-C
    Run(RunArgs),

    /// Summarize a recorded session
    Summary(SummaryArgs),

    /// Validate a configuration file and print the effective settings
    CheckConfig {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// TOML scene of boxes to resolve gaze against
    #[arg(short, long)]
    pub scene: Option<PathBuf>,

    /// UDP port, overrides `network.port`
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Session root, overrides `recording.root`
    #[arg(long)]
    pub record_dir: Option<PathBuf>,

    /// Do not write a session log
    #[arg(long)]
    pub no_record: bool,

    /// Pipeline ticks per second
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub tick_hz: u32,
}

impl RunArgs {
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.network.port = port;
        }
        if let Some(dir) = &self.record_dir {
            config.recording.root = Some(dir.clone());
        }
        if self.no_record {
            config.recording.enabled = false;
        }
    }

    pub fn settings(&self) -> Result<Settings> {
        let mut config = read_config(self.config.as_deref())?;
        self.apply_overrides(&mut config);
        config.validate().context("Invalid configuration")
    }
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Session directory or `aoi_labels.csv`; latest session of today when omitted
    pub session: Option<PathBuf>,

    /// Session root to search, overrides `recording.root`
    #[arg(long)]
    pub root: Option<PathBuf>,

    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl SummaryArgs {
    pub fn recordings_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        let settings = read_config(self.config.as_deref())?
            .validate()
            .context("Invalid configuration")?;
        Ok(settings.recording.root)
    }
}

pub fn read_config(path: Option<&Path>) -> Result<AppConfig> {
    AppConfig::load(path).with_context(|| match path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load default configuration".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_overrides() {
        let cli = Cli::try_parse_from([
            "gaze-aoi",
            "run",
            "--port",
            "4242",
            "--record-dir",
            "/tmp/sessions",
            "--no-record",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.tick_hz, 60);

        let mut config = AppConfig::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.network.port, 4242);
        assert_eq!(config.recording.root, Some(PathBuf::from("/tmp/sessions")));
        assert!(!config.recording.enabled);
    }

    #[test]
    fn test_zero_tick_rate_is_rejected() {
        assert!(Cli::try_parse_from(["gaze-aoi", "run", "--tick-hz", "0"]).is_err());
    }

    #[test]
    fn test_global_verbose_flag() {
        let cli = Cli::try_parse_from(["gaze-aoi", "summary", "-v", "/tmp/s/000"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Summary(SummaryArgs { session: Some(_), .. })));
    }

    #[test]
    fn test_port_override_is_validated() {
        let cli = Cli::try_parse_from(["gaze-aoi", "run", "--port", "0"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(args.settings().is_err());
    }
}
