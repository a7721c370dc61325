use anyhow::Result;
use clap::Parser;
use cli::Cli;
use verdant_common::observability::init_logging;
use verdant_config::{VerdantConfig, VerdantConfigLoader, default_config_path};
mod cli;

fn load_config(explicit: Option<&std::path::Path>) -> Result<VerdantConfig> {
    let mut loader = VerdantConfigLoader::new();
    match explicit {
        Some(path) => loader = loader.with_file(path),
        None => {
            if let Some(user) = default_config_path() {
                loader = loader.with_optional_file(user);
            }
            loader = loader.with_optional_file("verdant.yaml");
        }
    }
    Ok(loader.load()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // 1) Load config (env wins)
    let cfg = load_config(args.config.as_deref())?;

    // 2) Logging from the `logging` section; stdout stays clean for JSON output
    let mut log_config = cfg.logging.to_log_config("verdant");
    if let Some(filter) = &args.log_filter {
        log_config.default_filter = filter.clone();
    }
    let log_path = init_logging(log_config)?;
    tracing::debug!(log_path = %log_path.display(), "verdant.start");

    cli::run(args.command, &cfg).await
}
