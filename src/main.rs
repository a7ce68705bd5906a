use anyhow::{Context, Result};
use clap::Parser;
use gaze_aoi::cli::{read_config, Cli, Commands};
use gaze_aoi::{runner, summary};
use gaze_aoi_core::BoxScene;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run(args) => {
            let settings = args.settings()?;
            let scene = match &args.scene {
                Some(path) => BoxScene::load(path)
                    .with_context(|| format!("Failed to load scene {}", path.display()))?,
                None => {
                    info!("No scene given, every gaze resolves to nothing");
                    BoxScene::default()
                }
            };
            runner::run(settings, scene, args.tick_hz).await?;
        }
        Commands::Summary(args) => {
            let root = args.recordings_root()?;
            let today = chrono::Local::now().date_naive();
            let path = summary::session_log_path(args.session.as_deref(), &root, today)?;
            println!("{}", path.display());
            print!("{}", summary::render(&summary::summarize_file(&path)?));
        }
        Commands::CheckConfig { config } => {
            let settings = read_config(config.as_deref())?
                .validate()
                .context("Invalid configuration")?;
            println!("{:#?}", settings);
        }
    }
    Ok(())
}
