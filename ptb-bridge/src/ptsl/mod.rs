//! Protocol client stack: command registry, schema loading, wire transport,
//! session state machine, and the raw command gateway.

pub mod client;
pub mod commands;
pub mod gateway;
pub mod schema;
pub mod transport;

pub use client::{CommandResponse, CommandStatus, PtslClient, SessionState};
pub use commands::{CommandId, PermissionGroup};
pub use gateway::{run_raw_command, RawOutcome};
pub use schema::{FileSchemaSource, ProtocolSchema, SchemaSource, StaticSchemaSource};
pub use transport::{Dialer, TcpDialer, Transport, WireRequest, WireResponse};
