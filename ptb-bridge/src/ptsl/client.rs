//! Protocol client for the remote workstation
//!
//! Owns one logical connection: schema load + channel dial (`connect`),
//! identity announcement (`register_connection`), and serialized typed
//! request dispatch (`send_request`). The client is an explicit object with
//! an owned lifetime — construct it and pass it down; nothing here is a
//! process-wide global, so tests and concurrent sessions stay isolated.
//!
//! State machine: `Disconnected → Connecting → Connected → Ready`. Only
//! `Ready` accepts `send_request`. Any transport error collapses the state
//! back to `Disconnected`; reconnection is always explicit.

use crate::error::BridgeError;
use crate::ptsl::commands::CommandId;
use crate::ptsl::schema::{ProtocolSchema, SchemaSource};
use crate::ptsl::transport::{Dialer, Transport, WireRequest, WireResponse};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Connection lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    /// Channel open, identity not yet announced
    Connected,
    /// Registered; accepts `send_request`
    Ready,
}

/// Application-level outcome of one command exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failed,
}

/// Error document shape carried by failed responses
#[derive(Debug, Deserialize)]
struct ErrorDocument {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    command_error_message: String,
}

/// One correlated response from the workstation
#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub status: CommandStatus,
    /// Command-specific structured payload; never fabricated on failure
    pub body: Option<Value>,
    /// Raw JSON error document, present only on failure
    pub error_json: Option<String>,
}

impl CommandResponse {
    fn from_wire(wire: WireResponse) -> Self {
        let status = if wire.header.status == "Failed" {
            CommandStatus::Failed
        } else {
            CommandStatus::Success
        };
        // Best-effort body parse; an unparseable body is treated as absent
        let body = wire
            .response_body_json
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok());
        Self {
            status,
            body,
            error_json: wire.response_error_json,
        }
    }

    /// Every `command_error_message` from the error document.
    ///
    /// Missing or malformed documents degrade to a single "Unknown error"
    /// entry rather than propagating a parse failure — a failed response is
    /// always surfaced with a non-empty error list.
    pub fn error_messages(&self) -> Vec<String> {
        let parsed = self
            .error_json
            .as_deref()
            .and_then(|raw| serde_json::from_str::<ErrorDocument>(raw).ok());

        let messages: Vec<String> = parsed
            .map(|doc| {
                doc.errors
                    .into_iter()
                    .map(|e| e.command_error_message)
                    .filter(|m| !m.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if messages.is_empty() {
            vec!["Unknown error".to_string()]
        } else {
            messages
        }
    }

    /// Convert a failed status into a typed error for callers that treat
    /// failure as exceptional.
    pub fn require_success(self, command: CommandId) -> Result<CommandResponse, BridgeError> {
        match self.status {
            CommandStatus::Success => Ok(self),
            CommandStatus::Failed => Err(BridgeError::CommandFailed {
                command: command.name().to_string(),
                messages: self.error_messages(),
            }),
        }
    }
}

/// One logical session against the remote workstation
pub struct PtslClient {
    schema_source: Box<dyn SchemaSource>,
    dialer: Box<dyn Dialer>,
    address: String,
    state: SessionState,
    transport: Option<Box<dyn Transport>>,
    schema: Option<ProtocolSchema>,
    session_id: Option<String>,
}

impl PtslClient {
    pub fn new(
        schema_source: Box<dyn SchemaSource>,
        dialer: Box<dyn Dialer>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            schema_source,
            dialer,
            address: address.into(),
            state: SessionState::Disconnected,
            transport: None,
            schema: None,
            session_id: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Session id assigned by the workstation at registration
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// True once the register handshake has completed
    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Load the protocol schema and open the channel.
    ///
    /// Fails with `Connection` if the schema cannot be loaded or the channel
    /// cannot be established. Never retried internally — the caller decides.
    pub async fn connect(&mut self) -> Result<(), BridgeError> {
        if self.state != SessionState::Disconnected {
            return Err(BridgeError::NotReady(
                "Already connected; disconnect before reconnecting".to_string(),
            ));
        }

        self.state = SessionState::Connecting;

        let schema = match self.schema_source.load().await {
            Ok(schema) => schema,
            Err(e) => {
                self.reset();
                return Err(e);
            }
        };

        let transport = match self.dialer.dial(&self.address).await {
            Ok(transport) => transport,
            Err(e) => {
                self.reset();
                return Err(e);
            }
        };

        info!(
            service = %schema.service,
            address = %self.address,
            "Connected to workstation command service"
        );
        self.schema = Some(schema);
        self.transport = Some(transport);
        self.state = SessionState::Connected;
        Ok(())
    }

    /// Announce the caller identity to the workstation.
    ///
    /// Must succeed before any other command; failure invalidates the
    /// session. Returns the assigned session id.
    pub async fn register_connection(
        &mut self,
        application_name: &str,
        company_name: &str,
    ) -> Result<String, BridgeError> {
        if self.state != SessionState::Connected {
            return Err(BridgeError::NotReady(
                "register_connection requires a freshly connected session".to_string(),
            ));
        }

        let params = json!({
            "company_name": company_name,
            "application_name": application_name,
        });

        // RegisterConnection is sent without a session id
        let response = self.dispatch(CommandId::RegisterConnection, &params, false).await?;
        let response = match response.require_success(CommandId::RegisterConnection) {
            Ok(response) => response,
            Err(e) => {
                self.reset();
                return Err(e);
            }
        };

        let session_id = response
            .body
            .as_ref()
            .and_then(|b| b.get("session_id"))
            .and_then(|s| s.as_str())
            .map(str::to_string);

        let Some(session_id) = session_id else {
            self.reset();
            return Err(BridgeError::Connection(
                "Failed to register connection - no session ID returned".to_string(),
            ));
        };

        info!(session_id = %session_id, "Registered connection");
        self.session_id = Some(session_id.clone());
        self.state = SessionState::Ready;
        Ok(session_id)
    }

    /// Send one typed command and await its correlated response.
    ///
    /// No implicit retry. A transport-level failure is surfaced as
    /// `Transport` (and tears the session down); an application-level failed
    /// status comes back inside the `CommandResponse`.
    pub async fn send_request(
        &mut self,
        command: CommandId,
        params: Value,
    ) -> Result<CommandResponse, BridgeError> {
        if self.state != SessionState::Ready {
            return Err(BridgeError::NotReady(format!(
                "Cannot send {}: session is {:?}; connect() and register_connection() first",
                command.name(),
                self.state
            )));
        }
        self.dispatch(command, &params, true).await
    }

    /// Tear the session down explicitly.
    pub fn disconnect(&mut self) {
        if self.state != SessionState::Disconnected {
            debug!("Disconnecting workstation session");
        }
        self.reset();
    }

    async fn dispatch(
        &mut self,
        command: CommandId,
        params: &Value,
        include_session: bool,
    ) -> Result<CommandResponse, BridgeError> {
        let session_id = if include_session {
            self.session_id.clone()
        } else {
            None
        };

        let request = WireRequest::new(command.id(), session_id, params.to_string());

        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| BridgeError::NotReady("No open channel".to_string()))?;

        match transport.exchange(&request).await {
            Ok(wire) => {
                let response = CommandResponse::from_wire(wire);
                if response.status == CommandStatus::Failed {
                    debug!(command = command.name(), "Workstation returned failed status");
                }
                Ok(response)
            }
            Err(e) => {
                warn!(command = command.name(), error = %e, "Transport error; session reset");
                self.reset();
                Err(e)
            }
        }
    }

    fn reset(&mut self) {
        self.transport = None;
        self.schema = None;
        self.session_id = None;
        self.state = SessionState::Disconnected;
    }
}
