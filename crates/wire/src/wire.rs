// SPDX-License-Identifier: MIT

//! Length-prefixed JSON framing: a 4-byte big-endian length prefix followed
//! by the JSON payload. Used for the local Unix-socket stand-in transport;
//! any real transport adapter is free to use its own framing and only
//! needs [`encode`]/[`decode`] for the payload itself.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest single message this framing accepts, guarding against a
/// corrupt or hostile length prefix driving an unbounded allocation.
const MAX_MESSAGE_LEN: usize = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message length {len} exceeds maximum of {MAX_MESSAGE_LEN}")]
    MessageTooLarge { len: usize },
}

/// Serialize a value to its JSON payload, without any length prefix.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(value)?)
}

/// Deserialize a value from a raw JSON payload, without any length prefix.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write `payload` prefixed with its 4-byte big-endian length.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> Result<(), ProtocolError> {
    if payload.len() > MAX_MESSAGE_LEN {
        return Err(ProtocolError::MessageTooLarge { len: payload.len() });
    }
    let len = payload.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed payload, returning its raw bytes.
pub async fn read_message<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<Vec<u8>, ProtocolError> {
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes).await?;
    let len = u32::from_be_bytes(len_bytes) as usize;
    if len > MAX_MESSAGE_LEN {
        return Err(ProtocolError::MessageTooLarge { len });
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Read and decode one framed [`crate::Request`].
pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<crate::Request, ProtocolError> {
    let bytes = read_message(reader).await?;
    decode(&bytes)
}

/// Encode and write one framed [`crate::Response`].
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &crate::Response,
) -> Result<(), ProtocolError> {
    let payload = encode(response)?;
    write_message(writer, &payload).await
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
