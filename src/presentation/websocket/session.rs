//! WebSocket Session State

use std::time::Instant;

/// Per-connection state tracked by the socket task
#[derive(Debug)]
pub struct SessionState {
    pub session_id: String,
    pub last_heartbeat: Instant,
    pub identified: bool,
}

impl SessionState {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            last_heartbeat: Instant::now(),
            identified: false,
        }
    }

    pub fn heartbeat(&mut self) {
        self.last_heartbeat = Instant::now();
    }

    pub fn is_alive(&self, timeout_ms: u64) -> bool {
        self.last_heartbeat.elapsed().as_millis() < timeout_ms as u128
    }
}
