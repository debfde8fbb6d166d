use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use promptcanvas::config::Config;
use promptcanvas::server::{init_tracing, PreviewServer};

#[derive(Debug, Parser)]
#[command(
    name = "promptcanvas",
    about = "Prompt-to-UI generation server with a sandboxed live preview",
    version
)]
struct Cli {
    /// Path to the configuration file (defaults to the user config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind address overriding the configured one (host:port).
    #[arg(long)]
    bind: Option<String>,

    /// Model identifier overriding the configured one.
    #[arg(long)]
    model: Option<String>,

    /// Log level used when RUST_LOG is unset (error|warn|info|debug|trace).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::load().context("Failed to load configuration")?,
    };
    if let Some(bind) = cli.bind {
        config.server.bind_addr = bind;
    }
    if let Some(model) = cli.model {
        config.provider.model = model;
    }

    init_tracing(cli.log_level.as_deref(), config.server.log_ansi);

    let server = PreviewServer::new(config).context("Failed to start the preview server")?;
    let handle = server.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.signal();
        }
    });

    server.run().await.context("Server terminated with an error")?;
    Ok(())
}
