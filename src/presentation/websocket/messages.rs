//! WebSocket Message Types
//!
//! Opcode envelope shared by every gateway frame.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserRole;

/// Gateway opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// Named relay event
    Dispatch = 0,
    /// Client heartbeat
    Heartbeat = 1,
    /// Client handshake with credentials
    Identify = 2,
    /// Session rejected, the client must reconnect and identify again
    InvalidSession = 9,
    /// First frame after connect
    Hello = 10,
    /// Heartbeat ACK
    HeartbeatAck = 11,
}

/// Incoming gateway message
#[derive(Debug, Deserialize)]
pub struct GatewayReceive {
    pub op: u8,
    pub d: Option<serde_json::Value>,
    pub t: Option<String>,
}

/// Outgoing gateway message
#[derive(Debug, Clone, Serialize)]
pub struct GatewaySend {
    pub op: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

/// Hello payload (op 10)
#[derive(Debug, Serialize)]
pub struct HelloPayload {
    pub heartbeat_interval: u64,
}

/// Identify payload (op 2)
#[derive(Debug, Deserialize)]
pub struct IdentifyPayload {
    pub token: String,
}

/// Ready payload (dispatch `ready`)
#[derive(Debug, Serialize)]
pub struct ReadyPayload {
    pub user: ReadyUser,
    pub session_id: String,
}

/// Identity echoed back to the client once identified
#[derive(Debug, Serialize)]
pub struct ReadyUser {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
}
