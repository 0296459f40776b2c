use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use studio::catalog::{Catalog, StaticCatalog};
use studio::metrics::StdRandom;
use studio::remote::{RemoteServer, run_session};
use studio::surface::{LogSurface, RecentSurface};
use studio::{RuntimeConfig, RuntimeSession};

#[derive(Debug, Parser)]
#[command(name = "studio")]
#[command(about = "Headless game runtime session with a local control API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the runtime control API on localhost until ctrl-c.
    Serve {
        #[arg(long, default_value_t = 4750)]
        port: u16,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Play the first catalog game, run a build, and print one snapshot per second.
    Demo {
        #[arg(long, default_value_t = 5)]
        seconds: u64,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the game catalog as JSON.
    Catalog,
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = RuntimeConfig::from_env();

    match cli.command {
        Commands::Serve { port, seed } => cmd_serve(config, port, seed),
        Commands::Demo { seconds, seed } => cmd_demo(config, seconds, seed),
        Commands::Catalog => cmd_catalog(),
    }
}

fn random_source(seed: Option<u64>) -> StdRandom {
    seed.map_or_else(StdRandom::from_os, StdRandom::seeded)
}

fn cmd_serve(config: RuntimeConfig, port: u16, seed: Option<u64>) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    rt.block_on(async move {
        let catalog: Arc<dyn Catalog + Send + Sync> = Arc::new(StaticCatalog::sample());
        let (server, rx) = RemoteServer::start(port, catalog)
            .await
            .with_context(|| format!("failed to bind runtime api on port {port}"))?;
        log::info!("runtime api listening on http://{}", server.info.addr);

        let frame_step = config.frame_step;
        let session = RuntimeSession::new(config, RecentSurface::default(), random_source(seed));
        let session = run_session(session, rx, frame_step, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                log::error!("failed to listen for ctrl-c: {err}");
            }
        })
        .await;

        server.shutdown().await;
        log::info!("session stopped after {}", session.elapsed_label());
        Ok(())
    })
}

fn cmd_demo(config: RuntimeConfig, seconds: u64, seed: Option<u64>) -> Result<()> {
    let catalog = StaticCatalog::sample();
    let mut session = RuntimeSession::new(config, LogSurface, random_source(seed));

    if let Some(game) = catalog.list_games().into_iter().next() {
        session.select_game(game);
    }
    session.play();
    session.generate();

    for _ in 0..seconds {
        session.advance(Duration::from_secs(1));
        let line = serde_json::to_string(&session.snapshot()).context("failed to encode snapshot")?;
        println!("{line}");
    }

    session.shutdown();
    Ok(())
}

fn cmd_catalog() -> Result<()> {
    let games = StaticCatalog::sample().list_games();
    let json = serde_json::to_string_pretty(&games).context("failed to encode catalog")?;
    println!("{json}");
    Ok(())
}
