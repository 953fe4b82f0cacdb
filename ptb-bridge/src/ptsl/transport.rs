//! Transport channel to the remote workstation
//!
//! Wire contract: one request, one correlated response. Frames are a
//! 4-byte big-endian length followed by a JSON document. The request
//! carries the command id and a JSON-encoded parameter body; the response
//! carries a status header plus optional body and error documents.

use crate::error::BridgeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

/// Protocol version triple sent with every request (year, month, revision)
pub const PROTOCOL_VERSION: (u32, u32, u32) = (2025, 10, 0);

/// Upper bound on a single frame; anything larger is a protocol violation
const MAX_FRAME_LEN: u32 = 64 * 1024 * 1024;

/// Request header fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestHeader {
    /// Numeric command id (the field is `command`, not `command_id`)
    pub command: u32,
    pub version: u32,
    pub version_minor: u32,
    pub version_revision: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// One request on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRequest {
    pub header: RequestHeader,
    pub request_body_json: String,
}

impl WireRequest {
    pub fn new(command: u32, session_id: Option<String>, body_json: String) -> Self {
        let (version, version_minor, version_revision) = PROTOCOL_VERSION;
        Self {
            header: RequestHeader {
                command,
                version,
                version_minor,
                version_revision,
                session_id,
            },
            request_body_json: body_json,
        }
    }
}

/// Response header; any status other than "Failed" counts as success
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseHeader {
    pub status: String,
}

/// One response on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireResponse {
    pub header: ResponseHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_error_json: Option<String>,
}

/// A connected channel carrying request/response exchanges.
///
/// Exchanges are strictly serialized; the design assumes no interleaving of
/// in-flight commands on one channel.
#[async_trait]
pub trait Transport: Send + std::fmt::Debug {
    async fn exchange(&mut self, request: &WireRequest) -> Result<WireResponse, BridgeError>;
}

/// Opens transport channels to a `host:port` address
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn dial(&self, address: &str) -> Result<Box<dyn Transport>, BridgeError>;
}

/// TCP dialer (the production binding)
#[derive(Debug, Default)]
pub struct TcpDialer;

#[async_trait]
impl Dialer for TcpDialer {
    async fn dial(&self, address: &str) -> Result<Box<dyn Transport>, BridgeError> {
        let stream = TcpStream::connect(address).await.map_err(|e| {
            BridgeError::Connection(format!("Cannot reach workstation at {}: {}", address, e))
        })?;
        debug!(address, "Transport channel established");
        Ok(Box::new(TcpTransport { stream }))
    }
}

/// Length-prefixed JSON frames over a TCP stream
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
}

#[async_trait]
impl Transport for TcpTransport {
    async fn exchange(&mut self, request: &WireRequest) -> Result<WireResponse, BridgeError> {
        let payload = serde_json::to_vec(request)
            .map_err(|e| BridgeError::Transport(format!("Request encode failed: {}", e)))?;

        trace!(
            command = request.header.command,
            len = payload.len(),
            "Sending request frame"
        );

        self.stream
            .write_u32(payload.len() as u32)
            .await
            .map_err(|e| BridgeError::Transport(format!("Channel write failed: {}", e)))?;
        self.stream
            .write_all(&payload)
            .await
            .map_err(|e| BridgeError::Transport(format!("Channel write failed: {}", e)))?;
        self.stream
            .flush()
            .await
            .map_err(|e| BridgeError::Transport(format!("Channel write failed: {}", e)))?;

        let len = self
            .stream
            .read_u32()
            .await
            .map_err(|e| BridgeError::Transport(format!("Channel read failed: {}", e)))?;
        if len > MAX_FRAME_LEN {
            return Err(BridgeError::Transport(format!(
                "Response frame too large: {} bytes",
                len
            )));
        }

        let mut buf = vec![0u8; len as usize];
        self.stream
            .read_exact(&mut buf)
            .await
            .map_err(|e| BridgeError::Transport(format!("Channel read failed: {}", e)))?;

        serde_json::from_slice(&buf)
            .map_err(|e| BridgeError::Transport(format!("Response decode failed: {}", e)))
    }
}
