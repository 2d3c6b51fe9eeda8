//! Realtime Relay
//!
//! WebSocket gateway fanning room events out to connected clients.

pub mod gateway;
pub mod handler;
pub mod messages;
pub mod session;

pub use gateway::{Gateway, RelayEvent};
pub use handler::ws_handler;
pub use messages::{GatewayReceive, GatewaySend, OpCode};
pub use session::SessionState;
