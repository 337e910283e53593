// SPDX-License-Identifier: MIT

//! `teeagentd`: boots a `Computation` from a manifest file, wires the
//! intake/delivery service, and serves it over a local Unix socket.
//!
//! Not the production gRPC transport described by the spec — that is
//! named by contract only (SPEC_FULL.md §1). This binary is a runnable
//! harness for local exercising and the integration tests.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

mod config;
mod event_publisher;
mod manifest;
mod server;

use std::sync::Arc;

use event_publisher::TracingEventPublisher;
use teeagent_service::{AgentService, StubQuoteProvider};
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        error!(%e, "teeagentd exiting on fatal error");
        std::process::exit(1);
    }
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Manifest(#[from] manifest::ManifestError),

    #[error("failed to bind socket {path}: {source}")]
    Bind {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Agent(#[from] teeagent_core::AgentError),
}

async fn run() -> Result<(), RunError> {
    let config = config::Config::load()?;
    let computation = manifest::load(&config.manifest_path)?;

    info!(
        algorithm_kind = %computation.algorithm.kind,
        dataset_count = computation.dataset_count(),
        consumer_count = computation.consumer_count(),
        "loaded computation manifest"
    );

    let cancel = CancellationToken::new();
    let service = Arc::new(AgentService::new_with_staging_root(
        computation,
        Arc::new(TracingEventPublisher),
        Arc::new(StubQuoteProvider),
        cancel.clone(),
        config.staging_root.as_deref(),
    )?);

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path).map_err(|source| RunError::Bind {
            path: config.socket_path.display().to_string(),
            source,
        })?;
    }
    let listener = UnixListener::bind(&config.socket_path).map_err(|source| RunError::Bind {
        path: config.socket_path.display().to_string(),
        source,
    })?;
    info!(socket = %config.socket_path.display(), "listening");

    let serve_cancel = cancel.clone();
    let server = tokio::spawn(server::serve(listener, Arc::clone(&service), serve_cancel));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal");
        }
        result = server => {
            if let Err(e) = result {
                error!(%e, "server task panicked");
            }
        }
    }

    cancel.cancel();
    let _ = std::fs::remove_file(&config.socket_path);
    Ok(())
}
