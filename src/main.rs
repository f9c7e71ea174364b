use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;

use onchain_activity::{
    activity::ActivityPipeline,
    api::{self, AppState},
    cli::{Cli, Commands},
    config::Config,
    models::is_valid_address,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;
    let pipeline =
        ActivityPipeline::from_config(&config).context("failed to build activity pipeline")?;

    match cli.command {
        Commands::Serve { addr } => {
            let bind = addr.unwrap_or_else(|| config.http_bind_addr.clone());
            let state = AppState {
                pipeline: Arc::new(pipeline),
            };
            api::run_http_server(&bind, state).await?;
        }
        Commands::Activity { address, pretty } => {
            if !is_valid_address(&address) {
                bail!("invalid address format: {}", address);
            }
            let result = pipeline
                .get_activity_summary(&address)
                .await
                .with_context(|| format!("failed to load activity for {}", address))?;
            let json = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{}", json);
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
