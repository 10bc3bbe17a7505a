//! Tutorly CLI and REST API entry point.
//!
//! Binary name: `tutorly`
//!
//! Parses CLI arguments, initializes tracing, database and services, then
//! dispatches to a one-shot command or starts the REST API server.

mod cli;
mod http;
mod scheduler;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use scheduler::SeedingScheduler;
use state::AppState;
use tutorly_infra::filesystem::resolve_data_dir;
use tutorly_observe::tracing_setup::{init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need tracing or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "tutorly", &mut std::io::stdout());
        return Ok(());
    }

    init_tracing(cli.log_filter(), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let data_dir = cli.data_dir.clone().unwrap_or_else(resolve_data_dir);
    let state = AppState::init(data_dir).await?;
    tracing::debug!(data_dir = %state.data_dir.display(), "Application state initialized");

    match cli.command {
        Commands::Serve {
            port,
            host,
            no_seeding,
        } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            let seeding = &state.config.seeding;
            let scheduler = if seeding.enabled && !no_seeding {
                Some(SeedingScheduler::start(state.seeder.clone(), seeding.interval_minutes).await?)
            } else {
                tracing::info!("Periodic seeding disabled");
                None
            };

            if !cli.quiet {
                println!(
                    "  {} Tutorly API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if let Some(scheduler) = scheduler {
                scheduler.stop().await;
            }
            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Seed => {
            cli::taxonomy::seed(&state, cli.json).await?;
        }

        Commands::Subjects => {
            cli::taxonomy::list_subjects(&state, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled in main"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
