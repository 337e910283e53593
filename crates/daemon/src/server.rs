// SPDX-License-Identifier: MIT

//! The local Unix-socket transport: a minimal stand-in for the gRPC-style
//! transport named by contract in the spec. Decodes framed requests,
//! dispatches them to the `AgentService`, and encodes framed responses.
//! Not a hardened network-facing server — see SPEC_FULL.md §4.6.

use std::sync::Arc;

use teeagent_service::AgentService;
use teeagent_wire::{read_request, write_response, CallContext, ProtocolError, Request, Response};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Accepts connections on `listener` until `cancel` fires, spawning one
/// task per connection so a slow or stuck client never blocks others.
pub async fn serve(listener: UnixListener, service: Arc<AgentService>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("shutdown requested, no longer accepting connections");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let service = Arc::clone(&service);
                        tokio::spawn(async move {
                            let (reader, writer) = stream.into_split();
                            if let Err(e) = handle_connection(reader, writer, &service).await {
                                log_connection_error(e);
                            }
                        });
                    }
                    Err(e) => error!(%e, "accept error"),
                }
            }
        }
    }
}

fn log_connection_error(e: ProtocolError) {
    match e {
        ProtocolError::Io(ref io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
            debug!("client disconnected");
        }
        other => warn!(%other, "connection error"),
    }
}

async fn handle_connection<R, W>(
    mut reader: R,
    mut writer: W,
    service: &AgentService,
) -> Result<(), ProtocolError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let request = read_request(&mut reader).await?;
    info!(?request, "received request");

    let response = dispatch(service, request).await;
    write_response(&mut writer, &response).await
}

async fn dispatch(service: &AgentService, request: Request) -> Response {
    match request {
        Request::SubmitAlgorithm { bytes, .. } => match service.submit_algorithm(bytes).await {
            Ok(()) => Response::Ok,
            Err(e) => Response::from_agent_error(&e),
        },
        Request::SubmitDataset { context, bytes } => {
            match service.submit_dataset(context, bytes).await {
                Ok(()) => Response::Ok,
                Err(e) => Response::from_agent_error(&e),
            }
        }
        Request::FetchResult { context } => match service.fetch_result(context) {
            Ok((bytes, error)) => Response::FetchResult {
                bytes,
                error: error.map(|e| e.to_string()),
            },
            Err(e) => Response::from_agent_error(&e),
        },
        Request::Attest { report_data, .. } => dispatch_attest(service, report_data).await,
    }
}

async fn dispatch_attest(service: &AgentService, report_data: Vec<u8>) -> Response {
    let report_data: [u8; 64] = match report_data.try_into() {
        Ok(bytes) => bytes,
        Err(bytes) => {
            return Response::InvalidArgument {
                message: format!("report_data must be exactly 64 bytes, got {}", bytes.len()),
            }
        }
    };

    match service.attest(report_data).await {
        Ok(quote) => Response::Attest { quote },
        Err(e) => Response::from_agent_error(&e),
    }
}
