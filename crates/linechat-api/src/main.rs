//! linechat entry point.
//!
//! Binary name: `linechat`
//!
//! Parses CLI arguments, initializes tracing and configuration, then runs
//! the webhook server or a one-shot command.

mod cli;
mod config;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use secrecy::SecretString;

use linechat_core::channel::BoxReplyChannel;
use linechat_infra::line::{LineMessagingClient, REPLY_TIMEOUT};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need tracing or configuration
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "linechat", &mut std::io::stdout());
        return Ok(());
    }

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,linechat=debug",
        _ => "trace",
    };
    linechat_observe::init_tracing(cli.otel, filter)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    linechat_observe::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        config: config_path,
        quiet,
        upstream,
        command,
        ..
    } = cli;

    let config = config::resolve(config_path.as_deref(), &upstream)?;
    let api_key = upstream.require_api_key()?;

    match command {
        Commands::Serve {
            port,
            host,
            channel_secret,
            channel_access_token,
            admin_token,
        } => {
            let dispatcher = state::build_dispatcher(&config, api_key);
            let replies = BoxReplyChannel::new(LineMessagingClient::new(SecretString::from(
                channel_access_token,
            )));
            let admin_token = admin_token
                .filter(|t| !t.trim().is_empty())
                .map(SecretString::from);
            let admin_enabled = admin_token.is_some();

            let state = AppState::new(
                dispatcher,
                replies,
                SecretString::from(channel_secret),
                admin_token,
            );

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            tracing::info!(
                %addr,
                model = %config.completion.model,
                history_capacity = config.memory.capacity.get(),
                admin_enabled,
                "Webhook server listening"
            );
            if !quiet {
                println!(
                    "  {} linechat listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}/callback")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state.clone());

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            // Webhook deliveries already acknowledged still get their reply.
            let in_flight = state.tasks.len();
            if in_flight > 0 {
                tracing::info!(in_flight, "Waiting for in-flight messages");
            }
            let limit = state.dispatcher.upstream_timeout() + REPLY_TIMEOUT;
            if !state.drain(limit).await {
                tracing::warn!(
                    remaining = state.tasks.len(),
                    ?limit,
                    "Gave up waiting for in-flight messages"
                );
            }

            tracing::info!("Server stopped");
        }

        Commands::Check => {
            cli::check::check(&config, api_key).await?;
        }

        Commands::Ask { user, text } => {
            let dispatcher = state::build_dispatcher(&config, api_key);
            cli::ask::ask(&dispatcher, &user, &text.join(" ")).await?;
        }

        Commands::Completions { .. } => unreachable!("handled in main"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
