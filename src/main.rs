mod config;

use api::{Api, Gemini};
use core::{convert::Infallible, time::Duration};
use hyper::{server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};
use tokio::{net::TcpListener, runtime::Runtime, task::JoinSet};

/// How long in-flight connections may run after a shutdown signal.
const GRACE_PERIOD: Duration = Duration::from_secs(10);

async fn serve(config: config::Config) -> anyhow::Result<()> {
    let addr: SocketAddr = (Ipv4Addr::UNSPECIFIED, config.port).into();
    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening on {addr}.");

    let api = Arc::new(Api::new(Gemini::new(config.gemini), config.timeout));
    let mut stop = core::pin::pin!(tokio::signal::ctrl_c());
    let mut connections = JoinSet::new();

    loop {
        let (stream, peer) = tokio::select! {
            biased;
            signal = &mut stop => {
                signal?;
                break;
            }
            conn = listener.accept() => match conn {
                Ok(pair) => pair,
                Err(err) => {
                    log::error!("Failed to accept a connection: {err}");
                    continue;
                }
            },
        };

        let api = Arc::clone(&api);
        connections.spawn(async move {
            let service = service_fn(move |req| {
                let api = Arc::clone(&api);
                async move { Ok::<_, Infallible>(api.respond(req).await) }
            });
            if let Err(err) = http1::Builder::new().serve_connection(TokioIo::new(stream), service).await {
                log::error!("Connection with {peer} failed: {err}");
            }
        });
    }

    log::info!("Shutting down with {} open connections.", connections.len());
    let drain = async { while connections.join_next().await.is_some() {} };
    if tokio::time::timeout(GRACE_PERIOD, drain).await.is_err() {
        log::warn!("Dropping connections still open after {GRACE_PERIOD:?}.");
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse environment variables
    let config = config::Config::from_env()?;

    // Run the server
    let runtime = Runtime::new()?;
    runtime.block_on(serve(config))
}
