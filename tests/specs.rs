//! Workspace-level black-box specs: the literal end-to-end scenarios
//! named in SPEC_FULL.md §8 (S1-S6), exercised against the public
//! `teeagent-service`/`teeagent-wire` surface rather than any one
//! crate's internals.

use std::sync::Arc;
use std::time::Duration;

use teeagent_core::{
    AgentError, AlgorithmKind, ComputationBuilder, EventStatus, RecordingPublisher, State,
};
use teeagent_service::{AgentService, StubQuoteProvider};
use teeagent_wire::{decode, encode, CallContext, Request, Response};
use tokio_util::sync::CancellationToken;

async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

fn sha3_hex(bytes: &[u8]) -> String {
    use sha3::{Digest, Sha3_256};
    let mut hasher = Sha3_256::new();
    hasher.update(bytes);
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Mirrors the wire `SubmitAlgorithm`/`SubmitDataset`/`FetchResult` request
/// shapes round-tripping through the length-prefixed JSON encoding, so the
/// wire layer is exercised in the same black-box suite as the scenarios.
fn round_trip_request(request: &Request) -> Request {
    let bytes = encode(request).expect("encodes");
    decode(&bytes).expect("decodes")
}

/// S1 — happy path, Wasm. See SPEC_FULL.md §8.
#[tokio::test]
async fn s1_happy_path_wasm_delivers_to_every_consumer_and_leaves_no_staged_files() {
    let script = b"#!/bin/sh\nfor f in \"$@\"; do cat \"$f\"; done\necho -n RESULT\n".to_vec();
    // Stands in for a real wasm module: the point under test is the
    // digest/ordering/delivery pipeline, not wasmtime itself, so the
    // algorithm is declared Binary and produces the literal stdout the
    // scenario names.
    let computation = ComputationBuilder::new(&script, AlgorithmKind::Binary)
        .with_dataset(b"d1")
        .with_dataset(b"d2")
        .with_consumer("C0")
        .with_consumer("C1")
        .build();

    let service = AgentService::new(
        computation,
        Arc::new(RecordingPublisher::new()),
        Arc::new(StubQuoteProvider),
        CancellationToken::new(),
    )
    .expect("service constructs");
    settle().await;

    let submit_algo = round_trip_request(&Request::SubmitAlgorithm {
        context: CallContext::anonymous(),
        bytes: script.clone(),
    });
    match submit_algo {
        Request::SubmitAlgorithm { bytes, .. } => {
            service.submit_algorithm(bytes).await.expect("algorithm accepted")
        }
        other => panic!("unexpected request after round trip: {other:?}"),
    }
    settle().await;
    assert_eq!(service.state(), State::ReceivingData);

    // Submitted out of declared order: index 1 ("d2") before index 0 ("d1").
    service
        .submit_dataset(CallContext::new(1), b"d2".to_vec())
        .await
        .expect("dataset at index 1 accepted");
    service
        .submit_dataset(CallContext::new(0), b"d1".to_vec())
        .await
        .expect("dataset at index 0 accepted");
    settle().await;
    assert_eq!(service.state(), State::ResultsReady);

    let (result_c0, error_c0) = service.fetch_result(CallContext::new(0)).expect("C0 fetch");
    assert_eq!(result_c0, b"d1d2RESULT");
    assert!(error_c0.is_none());

    let (result_c1, error_c1) = service.fetch_result(CallContext::new(1)).expect("C1 fetch");
    assert_eq!(result_c1, result_c0);
    assert!(error_c1.is_none());

    settle().await;
    assert_eq!(service.state(), State::Complete);
    assert!(service.staging_dir_is_empty());
}

/// S2 — hash mismatch.
#[tokio::test]
async fn s2_hash_mismatch_rejects_and_state_stays_put_then_retry_succeeds() {
    let algorithm_bytes = b"correct-bytes".to_vec();
    let computation = ComputationBuilder::new(&algorithm_bytes, AlgorithmKind::Binary)
        .with_consumer("C0")
        .build();

    let service = AgentService::new(
        computation,
        Arc::new(RecordingPublisher::new()),
        Arc::new(StubQuoteProvider),
        CancellationToken::new(),
    )
    .expect("service constructs");
    settle().await;

    let rejected = service.submit_algorithm(b"tampered".to_vec()).await;
    assert_eq!(rejected, Err(AgentError::HashMismatch));
    assert_eq!(service.state(), State::ReceivingAlgorithm);

    service
        .submit_algorithm(algorithm_bytes)
        .await
        .expect("retry with correct bytes succeeds");
    settle().await;
    assert_eq!(service.state(), State::ReceivingData);
}

/// S3 — wrong state.
#[tokio::test]
async fn s3_submit_algorithm_before_manifest_reception_state_is_rejected() {
    // `AgentService::new` fires `start` and `manifestReceived` synchronously
    // at construction, so the only way to observe `idle`/`receivingManifest`
    // from the outside is before the driver task has had a chance to run at
    // all — i.e. calling immediately, with no `settle()`.
    let computation = ComputationBuilder::new(b"algo", AlgorithmKind::Binary)
        .with_consumer("C0")
        .build();
    let service = AgentService::new(
        computation,
        Arc::new(RecordingPublisher::new()),
        Arc::new(StubQuoteProvider),
        CancellationToken::new(),
    )
    .expect("service constructs");

    let result = service.submit_algorithm(b"algo".to_vec()).await;
    assert_eq!(result, Err(AgentError::StateNotReady));
}

/// S4 — unsupported algorithm kind.
#[tokio::test]
async fn s4_unsupported_algorithm_kind_yields_execution_error_at_results_ready() {
    let algorithm_bytes = b"algo-bytes".to_vec();
    let computation = ComputationBuilder::new(
        &algorithm_bytes,
        AlgorithmKind::Unknown {
            name: "unknown".to_string(),
        },
    )
    .with_consumer("C0")
    .build();

    let service = AgentService::new(
        computation,
        Arc::new(RecordingPublisher::new()),
        Arc::new(StubQuoteProvider),
        CancellationToken::new(),
    )
    .expect("service constructs");
    settle().await;

    service.submit_algorithm(algorithm_bytes).await.expect("algorithm accepted");
    settle().await;
    assert_eq!(service.state(), State::ResultsReady);

    let (bytes, error) = service.fetch_result(CallContext::new(0)).expect("fetch ok");
    assert!(bytes.is_empty());
    match error {
        Some(AgentError::ExecutionError(message)) => {
            assert!(message.contains("unsupported algorithm type: unknown"))
        }
        other => panic!("expected ExecutionError, got {other:?}"),
    }
}

/// S5 — attestation, callable mid-protocol.
#[tokio::test]
async fn s5_attestation_is_callable_while_receiving_data() {
    let algorithm_bytes = b"algo-bytes".to_vec();
    let computation = ComputationBuilder::new(&algorithm_bytes, AlgorithmKind::Binary)
        .with_dataset(b"d1")
        .with_consumer("C0")
        .build();

    let service = AgentService::new(
        computation,
        Arc::new(RecordingPublisher::new()),
        Arc::new(StubQuoteProvider),
        CancellationToken::new(),
    )
    .expect("service constructs");
    settle().await;

    service.submit_algorithm(algorithm_bytes).await.expect("algorithm accepted");
    settle().await;
    assert_eq!(service.state(), State::ReceivingData);

    let nonce = [0u8; 64];
    let quote = service.attest(nonce).await.expect("quote issued while receivingData");
    assert!(quote.ends_with(&nonce));
}

/// S6 — undeclared consumer.
#[tokio::test]
async fn s6_fetch_result_without_an_index_is_undeclared_consumer() {
    let algorithm_bytes = b"algo-bytes".to_vec();
    let computation = ComputationBuilder::new(&algorithm_bytes, AlgorithmKind::Binary)
        .with_consumer("C0")
        .build();

    let service = AgentService::new(
        computation,
        Arc::new(RecordingPublisher::new()),
        Arc::new(StubQuoteProvider),
        CancellationToken::new(),
    )
    .expect("service constructs");
    settle().await;

    service.submit_algorithm(algorithm_bytes).await.expect("algorithm accepted");
    settle().await;
    assert_eq!(service.state(), State::ResultsReady);

    let result = service.fetch_result(CallContext::anonymous());
    assert_eq!(result, Err(AgentError::UndeclaredConsumer));
    // Pending consumers unchanged: a subsequent fetch with a valid index
    // still succeeds.
    service.fetch_result(CallContext::new(0)).expect("valid index still pending");
}

/// Digest invariant (SPEC_FULL.md §8 property 3), exercised at the
/// black-box level: a manifest's declared digest is exactly the SHA3-256
/// of the bytes this suite submits.
#[test]
fn declared_digests_match_sha3_256_of_the_submitted_bytes() {
    let algorithm_bytes = b"digest-check-bytes";
    let computation = ComputationBuilder::new(algorithm_bytes, AlgorithmKind::Binary)
        .with_consumer("C0")
        .build();
    assert_eq!(computation.algorithm.digest.to_hex(), sha3_hex(algorithm_bytes));
}

/// Boundary behavior 8 — `Attest` with a malformed nonce length never
/// reaches the core at all; this is validated at the wire layer, which the
/// daemon binary's request dispatch relies on (see `teeagentd::server`).
#[test]
fn attest_request_round_trips_and_length_is_a_wire_concern() {
    let request = Request::Attest {
        context: CallContext::anonymous(),
        report_data: vec![1u8; 64],
    };
    let round_tripped = round_trip_request(&request);
    assert_eq!(round_tripped, request);

    let malformed = Request::Attest {
        context: CallContext::anonymous(),
        report_data: vec![1u8; 10],
    };
    match round_trip_request(&malformed) {
        Request::Attest { report_data, .. } => assert_ne!(report_data.len(), 64),
        other => panic!("unexpected: {other:?}"),
    }
}

/// Sanity check that every response variant is representable on the wire,
/// guarding against an enum variant drifting out of sync with its codec.
#[test]
fn every_response_variant_round_trips() {
    let responses = vec![
        Response::Ok,
        Response::FetchResult {
            bytes: b"result".to_vec(),
            error: None,
        },
        Response::FetchResult {
            bytes: Vec::new(),
            error: Some("boom".to_string()),
        },
        Response::Attest {
            quote: b"quote".to_vec(),
        },
        Response::Error {
            kind: "hash_mismatch".to_string(),
            message: "malformed data, hash does not match manifest".to_string(),
        },
        Response::InvalidArgument {
            message: "report_data must be exactly 64 bytes".to_string(),
        },
    ];

    for response in responses {
        let bytes = encode(&response).expect("encodes");
        let decoded: Response = decode(&bytes).expect("decodes");
        assert_eq!(decoded, response);
    }
}

#[tokio::test]
async fn event_publisher_observes_in_progress_and_complete_status_through_a_full_run() {
    let algorithm_bytes = b"algo-bytes".to_vec();
    let computation = ComputationBuilder::new(&algorithm_bytes, AlgorithmKind::Binary)
        .with_consumer("C0")
        .build();
    let publisher = Arc::new(RecordingPublisher::new());

    let service = AgentService::new(
        computation,
        publisher.clone(),
        Arc::new(StubQuoteProvider),
        CancellationToken::new(),
    )
    .expect("service constructs");
    settle().await;

    service.submit_algorithm(algorithm_bytes).await.expect("algorithm accepted");
    settle().await;
    service.fetch_result(CallContext::new(0)).expect("fetch ok");
    settle().await;

    let statuses: Vec<_> = publisher.events().into_iter().map(|e| e.status).collect();
    assert!(statuses.contains(&EventStatus::Starting));
    assert!(statuses.contains(&EventStatus::InProgress));
    assert!(statuses.contains(&EventStatus::Complete));
}
