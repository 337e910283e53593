// SPDX-License-Identifier: MIT

//! The sandboxed algorithm runner.
//!
//! Launches the staged algorithm artifact as a subprocess according to
//! its declared [`AlgorithmKind`], captures stdout in full as the
//! computation result while also forwarding it line-by-line to the
//! progress logger at debug level, forwards stderr line-by-line as
//! diagnostic events, and guarantees every staged file is deleted on
//! every exit path.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use teeagent_core::{AgentError, AgentEvent, AlgorithmKind, EventPublisher, EventStatus};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const WASM_HOST_BINARY: &str = "wasmtime";

/// Outcome of one runner invocation: the captured stdout, and an error
/// if the subprocess failed to start, exited non-zero, or the kind was
/// unsupported.
pub type RunOutcome = (Vec<u8>, Option<AgentError>);

/// Executes `path` (staged according to `kind`) against `datasets`,
/// streaming progress through `publisher`, and deletes every staged
/// file before returning regardless of outcome.
pub async fn run(
    path: &Path,
    kind: &AlgorithmKind,
    datasets: &[PathBuf],
    publisher: &(dyn EventPublisher),
    cancel: &CancellationToken,
) -> RunOutcome {
    let outcome = execute(path, kind, datasets, publisher, cancel).await;
    cleanup(path, datasets).await;
    outcome
}

async fn execute(
    path: &Path,
    kind: &AlgorithmKind,
    datasets: &[PathBuf],
    publisher: &(dyn EventPublisher),
    cancel: &CancellationToken,
) -> RunOutcome {
    let (program, args) = match kind {
        AlgorithmKind::Binary => (path.to_path_buf(), datasets.to_vec()),
        AlgorithmKind::Wasm => {
            let mut args = vec![path.to_path_buf()];
            args.extend(datasets.iter().cloned());
            (PathBuf::from(WASM_HOST_BINARY), args)
        }
        AlgorithmKind::Unknown { name } => {
            return (
                Vec::new(),
                Some(AgentError::ExecutionError(format!(
                    "unsupported algorithm type: {name}"
                ))),
            );
        }
    };

    let mut command = Command::new(&program);
    command.args(&args);
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(source) => {
            return (
                Vec::new(),
                Some(AgentError::ExecutionError(format!(
                    "error starting algorithm: {source}"
                ))),
            );
        }
    };

    // Watches for cancellation on a task that owns only the child's pid and
    // a clone of the token, so it needs no lifetime tied to this call's
    // stack frame. Aborted once the run is over either way.
    let pid = child.id();
    let cancel_watch = cancel.clone();
    let watcher = tokio::spawn(async move {
        cancel_watch.cancelled().await;
        if let Some(pid) = pid {
            let pid = nix::unistd::Pid::from_raw(pid as i32);
            if let Err(source) = nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGTERM) {
                warn!(%source, "failed to signal cancelled algorithm subprocess");
            }
        }
    });

    let stdout = child.stdout.take().expect("stdout piped at spawn");
    let stderr = child.stderr.take().expect("stderr piped at spawn");

    let stdout_fut = capture_stdout(stdout);
    let stderr_fut = forward_stderr(stderr, publisher);

    let (stdout_result, ()) = tokio::join!(stdout_fut, stderr_fut);
    watcher.abort();

    let status = match child.wait().await {
        Ok(status) => status,
        Err(source) => {
            return (
                Vec::new(),
                Some(AgentError::ExecutionError(format!(
                    "algorithm execution error: {source}"
                ))),
            );
        }
    };

    let stdout_bytes = match stdout_result {
        Ok(bytes) => bytes,
        Err(source) => {
            return (
                Vec::new(),
                Some(AgentError::ExecutionError(format!(
                    "algorithm execution error: {source}"
                ))),
            );
        }
    };

    if status.success() {
        (stdout_bytes, None)
    } else {
        let detail = status
            .code()
            .map(|code| format!("algorithm execution error: exit code {code}"))
            .unwrap_or_else(|| "algorithm execution error: terminated by signal".to_string());
        debug!(stdout_len = stdout_bytes.len(), "algorithm exited non-zero");
        (Vec::new(), Some(AgentError::ExecutionError(detail)))
    }
}

/// Reads the child's stdout to completion, returning the full captured
/// bytes (the eventual computation result) while also logging each
/// complete line at debug level as it arrives, mirroring the teacher's
/// `io.MultiWriter(&outBuf, b.stdout)` dual-sink shape.
async fn capture_stdout(mut stdout: tokio::process::ChildStdout) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut pending_line = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        let n = stdout.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        pending_line.extend_from_slice(&chunk[..n]);

        while let Some(newline_at) = pending_line.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = pending_line.drain(..=newline_at).collect();
            debug!(line = %String::from_utf8_lossy(&line[..line.len() - 1]), "algorithm stdout");
        }
    }

    if !pending_line.is_empty() {
        debug!(line = %String::from_utf8_lossy(&pending_line), "algorithm stdout");
    }

    Ok(buf)
}

async fn forward_stderr(stderr: tokio::process::ChildStderr, publisher: &(dyn EventPublisher)) {
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                publisher
                    .publish(
                        AgentEvent::new("running", EventStatus::InProgress).with_details(line),
                    )
                    .await;
            }
            Ok(None) => break,
            Err(source) => {
                warn!(%source, "error reading algorithm stderr");
                break;
            }
        }
    }
}

/// Deletes every staged file, algorithm and datasets, regardless of
/// whether the run succeeded. Logged, not propagated: a cleanup failure
/// must never mask the actual run outcome.
async fn cleanup(path: &Path, datasets: &[PathBuf]) {
    if let Err(source) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), %source, "failed to remove staged algorithm file");
    }
    for dataset in datasets {
        if let Err(source) = tokio::fs::remove_file(dataset).await {
            warn!(path = %dataset.display(), %source, "failed to remove staged dataset file");
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
