use std::net::SocketAddr;

use args::Args;
use clap::Parser;
use config::Config;
use server::ServeConfig;
use tokio_util::sync::CancellationToken;

mod args;

const DEFAULT_LISTEN_ADDRESS: SocketAddr = SocketAddr::V4(std::net::SocketAddrV4::new(
    std::net::Ipv4Addr::LOCALHOST,
    8000,
));

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Both aws-lc-rs and ring may be linked in; pick one before any TLS use.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let args = Args::parse();

    server::logger::init(&args.log);

    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            Config::load(path)?
        }
        None => {
            log::info!("No configuration file given, using the built-in providers");
            Config::default()
        }
    };

    let listen_address = args
        .listen_address
        .or(config.server.listen_address)
        .unwrap_or(DEFAULT_LISTEN_ADDRESS);

    let shutdown_signal = CancellationToken::new();

    tokio::spawn({
        let shutdown_signal = shutdown_signal.clone();

        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    log::info!("Received Ctrl-C");
                    shutdown_signal.cancel();
                }
                Err(e) => log::error!("Failed to listen for Ctrl-C: {e}"),
            }
        }
    });

    server::serve(ServeConfig {
        listen_address,
        config,
        shutdown_signal,
        log_filter: args.log,
    })
    .await?;

    Ok(())
}
