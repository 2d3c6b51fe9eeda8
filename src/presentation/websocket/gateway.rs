//! WebSocket Gateway
//!
//! Tracks live sessions and the in-memory room roster used to fan relay
//! events out to everyone joined to the same room. The roster carries
//! presence counts only; the membership table stays authoritative.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::{GatewaySend, OpCode};
use crate::infrastructure::metrics;

/// Relay events fanned out to connected clients
#[derive(Debug, Clone)]
pub enum RelayEvent {
    // Room presence events
    RoomJoined(RoomJoinedEvent),
    MemberJoined(MemberJoinedEvent),
    MemberLeft(MemberLeftEvent),

    // Relayed payloads
    ChatMessage(ChatMessageEvent),
    GameAction(GameActionEvent),

    // Voice signaling events
    VoiceUserJoined(VoiceUserJoinedEvent),
    VoiceUserLeft(VoiceUserLeftEvent),
    VoiceActiveUsers(VoiceActiveUsersEvent),
    VoiceSignal(VoiceSignalEvent),
    VoiceIceCandidate(VoiceIceCandidateEvent),
    VoiceError(VoiceErrorEvent),

    // Per-session error report
    Error(ErrorEvent),
}

impl RelayEvent {
    /// Get the event name for dispatch
    pub fn event_name(&self) -> &'static str {
        match self {
            RelayEvent::RoomJoined(_) => "roomJoined",
            RelayEvent::MemberJoined(_) => "memberJoined",
            RelayEvent::MemberLeft(_) => "memberLeft",
            RelayEvent::ChatMessage(_) => "chatMessage",
            RelayEvent::GameAction(_) => "gameAction",
            RelayEvent::VoiceUserJoined(_) => "voiceUserJoined",
            RelayEvent::VoiceUserLeft(_) => "voiceUserLeft",
            RelayEvent::VoiceActiveUsers(_) => "voiceActiveUsers",
            RelayEvent::VoiceSignal(_) => "voiceSignal",
            RelayEvent::VoiceIceCandidate(_) => "voiceIceCandidate",
            RelayEvent::VoiceError(_) => "voiceError",
            RelayEvent::Error(_) => "error",
        }
    }

    /// Convert the payload to a JSON value for sending
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            RelayEvent::RoomJoined(e) => serde_json::to_value(e).unwrap_or_default(),
            RelayEvent::MemberJoined(e) => serde_json::to_value(e).unwrap_or_default(),
            RelayEvent::MemberLeft(e) => serde_json::to_value(e).unwrap_or_default(),
            RelayEvent::ChatMessage(e) => serde_json::to_value(e).unwrap_or_default(),
            RelayEvent::GameAction(e) => serde_json::to_value(e).unwrap_or_default(),
            RelayEvent::VoiceUserJoined(e) => serde_json::to_value(e).unwrap_or_default(),
            RelayEvent::VoiceUserLeft(e) => serde_json::to_value(e).unwrap_or_default(),
            RelayEvent::VoiceActiveUsers(e) => serde_json::to_value(e).unwrap_or_default(),
            RelayEvent::VoiceSignal(e) => serde_json::to_value(e).unwrap_or_default(),
            RelayEvent::VoiceIceCandidate(e) => serde_json::to_value(e).unwrap_or_default(),
            RelayEvent::VoiceError(e) => serde_json::to_value(e).unwrap_or_default(),
            RelayEvent::Error(e) => serde_json::to_value(e).unwrap_or_default(),
        }
    }

    /// Wrap the event in a dispatch frame
    pub fn to_frame(&self) -> GatewaySend {
        GatewaySend {
            op: OpCode::Dispatch as u8,
            d: Some(self.to_json()),
            t: Some(self.event_name().to_string()),
        }
    }
}

// Event payload structs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomJoinedEvent {
    pub room_id: i64,
    pub online_count: usize,
    pub member_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberJoinedEvent {
    pub room_id: i64,
    pub user_id: Uuid,
    pub username: String,
    pub online_count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberLeftEvent {
    pub room_id: i64,
    pub user_id: Uuid,
    pub username: String,
    pub online_count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageEvent {
    pub room_id: i64,
    pub user_id: Uuid,
    pub username: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameActionEvent {
    pub room_id: i64,
    pub user_id: Uuid,
    pub username: String,
    pub action: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceUserJoinedEvent {
    pub room_id: i64,
    pub session_id: String,
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceUserLeftEvent {
    pub room_id: i64,
    pub session_id: String,
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceActiveUsersEvent {
    pub room_id: i64,
    pub sessions: Vec<VoiceSession>,
}

/// One participant in a room's voice channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSession {
    pub session_id: String,
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSignalEvent {
    pub from_session_id: String,
    pub signal_type: String,
    pub sdp: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceIceCandidateEvent {
    pub from_session_id: String,
    pub candidate: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceErrorEvent {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub message: String,
}

/// Connected session with message sender
pub struct ConnectedSession {
    pub user_id: Uuid,
    pub username: String,
    pub session_id: String,
    pub sender: mpsc::UnboundedSender<GatewaySend>,
}

/// Presence roster for one room
#[derive(Debug, Default)]
pub struct RoomRoster {
    /// Users with at least one live session in the room
    pub members: HashSet<Uuid>,
    /// Live session ids joined to the room
    pub sessions: HashSet<String>,
    /// Session ids currently in the room's voice channel
    pub voice_sessions: HashSet<String>,
}

/// WebSocket gateway managing all connections
pub struct Gateway {
    /// Active sessions by session_id
    sessions: DashMap<String, Arc<ConnectedSession>>,
    /// Room rosters by room id, rebuilt as clients reconnect
    rooms: DashMap<i64, RoomRoster>,
    /// Heartbeat interval in milliseconds
    heartbeat_interval_ms: u64,
}

impl Gateway {
    pub fn new(heartbeat_interval_ms: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            rooms: DashMap::new(),
            heartbeat_interval_ms,
        }
    }

    /// Get the heartbeat interval
    pub fn heartbeat_interval(&self) -> u64 {
        self.heartbeat_interval_ms
    }

    /// Register a new connected session
    pub fn register_session(
        &self,
        session_id: String,
        user_id: Uuid,
        username: String,
        sender: mpsc::UnboundedSender<GatewaySend>,
    ) -> Arc<ConnectedSession> {
        let session = Arc::new(ConnectedSession {
            user_id,
            username,
            session_id: session_id.clone(),
            sender,
        });

        self.sessions.insert(session_id.clone(), session.clone());
        metrics::inc_websocket_connections("identified");

        tracing::info!(
            user_id = %user_id,
            session_id = %session_id,
            "Session registered"
        );

        session
    }

    /// Unregister a session, clean every roster entry it holds and notify
    /// the rooms it was joined to.
    pub fn disconnect_session(&self, session_id: &str) {
        let Some((_, session)) = self.sessions.remove(session_id) else {
            return;
        };
        metrics::dec_websocket_connections("identified");

        let mut empty_rooms = Vec::new();
        for mut entry in self.rooms.iter_mut() {
            let room_id = *entry.key();
            let roster = entry.value_mut();
            if !roster.sessions.remove(session_id) {
                continue;
            }
            let was_in_voice = roster.voice_sessions.remove(session_id);
            roster.members.remove(&session.user_id);

            if roster.sessions.is_empty() {
                empty_rooms.push(room_id);
                continue;
            }

            if was_in_voice {
                let event = RelayEvent::VoiceUserLeft(VoiceUserLeftEvent {
                    room_id,
                    session_id: session_id.to_string(),
                    user_id: session.user_id,
                    username: session.username.clone(),
                });
                self.fan_out(roster, &event);
            }

            let event = RelayEvent::MemberLeft(MemberLeftEvent {
                room_id,
                user_id: session.user_id,
                username: session.username.clone(),
                online_count: roster.members.len(),
                timestamp: Utc::now(),
            });
            self.fan_out(roster, &event);
        }

        for room_id in empty_rooms {
            self.rooms.remove_if(&room_id, |_, roster| roster.sessions.is_empty());
        }
        metrics::set_active_relay_rooms(self.rooms.len() as i64);

        tracing::info!(
            user_id = %session.user_id,
            session_id = %session_id,
            "Session unregistered"
        );
    }

    /// Add a session to a room roster and announce it to the room.
    /// Returns the presence count and member ids after the join.
    pub fn join_room(&self, room_id: i64, session: &ConnectedSession) -> (usize, Vec<Uuid>) {
        let mut roster = self.rooms.entry(room_id).or_default();
        roster.sessions.insert(session.session_id.clone());
        roster.members.insert(session.user_id);

        let online_count = roster.members.len();
        let member_ids: Vec<Uuid> = roster.members.iter().copied().collect();

        let event = RelayEvent::MemberJoined(MemberJoinedEvent {
            room_id,
            user_id: session.user_id,
            username: session.username.clone(),
            online_count,
            timestamp: Utc::now(),
        });
        self.fan_out(&roster, &event);
        drop(roster);
        metrics::set_active_relay_rooms(self.rooms.len() as i64);

        (online_count, member_ids)
    }

    /// Remove a session from a room roster and announce it to whoever is
    /// still there. Empty rosters are dropped.
    pub fn leave_room(&self, room_id: i64, session: &ConnectedSession) {
        {
            let Some(mut roster) = self.rooms.get_mut(&room_id) else {
                return;
            };
            if !roster.sessions.remove(&session.session_id) {
                return;
            }
            let was_in_voice = roster.voice_sessions.remove(&session.session_id);
            roster.members.remove(&session.user_id);

            if !roster.sessions.is_empty() {
                if was_in_voice {
                    let event = RelayEvent::VoiceUserLeft(VoiceUserLeftEvent {
                        room_id,
                        session_id: session.session_id.clone(),
                        user_id: session.user_id,
                        username: session.username.clone(),
                    });
                    self.fan_out(&roster, &event);
                }
                let event = RelayEvent::MemberLeft(MemberLeftEvent {
                    room_id,
                    user_id: session.user_id,
                    username: session.username.clone(),
                    online_count: roster.members.len(),
                    timestamp: Utc::now(),
                });
                self.fan_out(&roster, &event);
            }
        }

        self.rooms.remove_if(&room_id, |_, roster| roster.sessions.is_empty());
        metrics::set_active_relay_rooms(self.rooms.len() as i64);
    }

    /// Check whether a session is currently joined to a room
    pub fn is_in_room(&self, room_id: i64, session_id: &str) -> bool {
        self.rooms
            .get(&room_id)
            .map(|roster| roster.sessions.contains(session_id))
            .unwrap_or(false)
    }

    /// Add a session to a room's voice channel. Returns the active voice
    /// participants after the join, or `None` when the session has not
    /// joined the room.
    pub fn join_voice(&self, room_id: i64, session: &ConnectedSession) -> Option<Vec<VoiceSession>> {
        let voice_ids = {
            let mut roster = self.rooms.get_mut(&room_id)?;
            if !roster.sessions.contains(&session.session_id) {
                return None;
            }
            roster.voice_sessions.insert(session.session_id.clone());

            let event = RelayEvent::VoiceUserJoined(VoiceUserJoinedEvent {
                room_id,
                session_id: session.session_id.clone(),
                user_id: session.user_id,
                username: session.username.clone(),
            });
            self.fan_out(&roster, &event);

            roster
                .voice_sessions
                .iter()
                .cloned()
                .collect::<Vec<String>>()
        };

        let sessions = voice_ids
            .into_iter()
            .filter_map(|sid| {
                self.sessions.get(&sid).map(|s| VoiceSession {
                    session_id: s.session_id.clone(),
                    user_id: s.user_id,
                    username: s.username.clone(),
                })
            })
            .collect();
        Some(sessions)
    }

    /// Remove a session from a room's voice channel and announce it
    pub fn leave_voice(&self, room_id: i64, session: &ConnectedSession) {
        let Some(mut roster) = self.rooms.get_mut(&room_id) else {
            return;
        };
        if !roster.voice_sessions.remove(&session.session_id) {
            return;
        }
        let event = RelayEvent::VoiceUserLeft(VoiceUserLeftEvent {
            room_id,
            session_id: session.session_id.clone(),
            user_id: session.user_id,
            username: session.username.clone(),
        });
        self.fan_out(&roster, &event);
    }

    /// Broadcast a relay event to every session joined to a room
    pub fn broadcast_to_room(&self, room_id: i64, event: &RelayEvent) {
        if let Some(roster) = self.rooms.get(&room_id) {
            self.fan_out(&roster, event);
        }
    }

    /// Send a relay event to one session. Returns false when the session
    /// is not connected.
    pub fn send_event_to_session(&self, session_id: &str, event: &RelayEvent) -> bool {
        if let Some(session) = self.sessions.get(session_id) {
            metrics::record_relay_event(event.event_name());
            session.sender.send(event.to_frame()).is_ok()
        } else {
            false
        }
    }

    /// Get session count
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Get the number of rooms with at least one connected member
    pub fn active_room_count(&self) -> usize {
        self.rooms.len()
    }

    fn fan_out(&self, roster: &RoomRoster, event: &RelayEvent) {
        metrics::record_relay_event(event.event_name());
        let frame = event.to_frame();
        for session_id in &roster.sessions {
            if let Some(session) = self.sessions.get(session_id) {
                let _ = session.sender.send(frame.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn connect(
        gateway: &Gateway,
        username: &str,
    ) -> (Arc<ConnectedSession>, UnboundedReceiver<GatewaySend>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = gateway.register_session(
            Uuid::new_v4().to_string(),
            Uuid::now_v7(),
            username.to_string(),
            tx,
        );
        (session, rx)
    }

    fn drain_events(rx: &mut UnboundedReceiver<GatewaySend>) -> Vec<GatewaySend> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_join_room_tracks_presence() {
        let gateway = Gateway::new(25000);
        let (alice, _alice_rx) = connect(&gateway, "alice");
        let (bob, _bob_rx) = connect(&gateway, "bob");

        let (count, members) = gateway.join_room(7, &alice);
        assert_eq!(count, 1);
        assert_eq!(members, vec![alice.user_id]);

        let (count, members) = gateway.join_room(7, &bob);
        assert_eq!(count, 2);
        assert_eq!(members.len(), 2);
        assert!(members.contains(&bob.user_id));

        assert!(gateway.is_in_room(7, &alice.session_id));
        assert!(gateway.is_in_room(7, &bob.session_id));
        assert_eq!(gateway.active_room_count(), 1);
    }

    #[test]
    fn test_join_room_broadcasts_member_joined() {
        let gateway = Gateway::new(25000);
        let (alice, mut alice_rx) = connect(&gateway, "alice");
        let (bob, _bob_rx) = connect(&gateway, "bob");

        gateway.join_room(7, &alice);
        drain_events(&mut alice_rx);

        gateway.join_room(7, &bob);
        let frames = drain_events(&mut alice_rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].op, OpCode::Dispatch as u8);
        assert_eq!(frames[0].t.as_deref(), Some("memberJoined"));

        let d = frames[0].d.as_ref().unwrap();
        assert_eq!(d["username"], "bob");
        assert_eq!(d["online_count"], 2);
    }

    #[test]
    fn test_leave_room_announces_and_drops_empty_roster() {
        let gateway = Gateway::new(25000);
        let (alice, mut alice_rx) = connect(&gateway, "alice");
        let (bob, _bob_rx) = connect(&gateway, "bob");

        gateway.join_room(7, &alice);
        gateway.join_room(7, &bob);
        drain_events(&mut alice_rx);

        gateway.leave_room(7, &bob);
        let frames = drain_events(&mut alice_rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].t.as_deref(), Some("memberLeft"));
        assert_eq!(frames[0].d.as_ref().unwrap()["online_count"], 1);

        gateway.leave_room(7, &alice);
        assert_eq!(gateway.active_room_count(), 0);
        assert!(!gateway.is_in_room(7, &alice.session_id));
    }

    #[test]
    fn test_leave_room_when_not_joined_is_a_noop() {
        let gateway = Gateway::new(25000);
        let (alice, _alice_rx) = connect(&gateway, "alice");
        let (bob, mut bob_rx) = connect(&gateway, "bob");

        gateway.join_room(7, &bob);
        drain_events(&mut bob_rx);

        gateway.leave_room(7, &alice);
        assert!(drain_events(&mut bob_rx).is_empty());
        assert!(gateway.is_in_room(7, &bob.session_id));
    }

    #[test]
    fn test_disconnect_cleans_rosters_and_announces() {
        let gateway = Gateway::new(25000);
        let (alice, mut alice_rx) = connect(&gateway, "alice");
        let (bob, _bob_rx) = connect(&gateway, "bob");

        gateway.join_room(7, &alice);
        gateway.join_room(7, &bob);
        gateway.join_room(9, &bob);
        gateway.join_voice(7, &bob);
        drain_events(&mut alice_rx);

        gateway.disconnect_session(&bob.session_id);

        let frames = drain_events(&mut alice_rx);
        let names: Vec<&str> = frames.iter().filter_map(|f| f.t.as_deref()).collect();
        assert_eq!(names, vec!["voiceUserLeft", "memberLeft"]);

        assert_eq!(gateway.session_count(), 1);
        // Room 9 had only bob, so its roster is gone
        assert_eq!(gateway.active_room_count(), 1);
        assert!(!gateway.is_in_room(7, &bob.session_id));
    }

    #[test]
    fn test_join_voice_requires_room_membership() {
        let gateway = Gateway::new(25000);
        let (alice, _alice_rx) = connect(&gateway, "alice");

        assert!(gateway.join_voice(7, &alice).is_none());

        gateway.join_room(7, &alice);
        let sessions = gateway.join_voice(7, &alice).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].session_id, alice.session_id);
        assert_eq!(sessions[0].username, "alice");
    }

    #[test]
    fn test_join_voice_lists_all_participants() {
        let gateway = Gateway::new(25000);
        let (alice, _alice_rx) = connect(&gateway, "alice");
        let (bob, mut bob_rx) = connect(&gateway, "bob");

        gateway.join_room(7, &alice);
        gateway.join_room(7, &bob);
        gateway.join_voice(7, &bob);
        drain_events(&mut bob_rx);

        let sessions = gateway.join_voice(7, &alice).unwrap();
        assert_eq!(sessions.len(), 2);

        // Bob hears alice joining voice
        let frames = drain_events(&mut bob_rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].t.as_deref(), Some("voiceUserJoined"));
        assert_eq!(frames[0].d.as_ref().unwrap()["username"], "alice");
    }

    #[test]
    fn test_leave_voice_announces_to_room() {
        let gateway = Gateway::new(25000);
        let (alice, _alice_rx) = connect(&gateway, "alice");
        let (bob, mut bob_rx) = connect(&gateway, "bob");

        gateway.join_room(7, &alice);
        gateway.join_room(7, &bob);
        gateway.join_voice(7, &alice);
        drain_events(&mut bob_rx);

        gateway.leave_voice(7, &alice);
        let frames = drain_events(&mut bob_rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].t.as_deref(), Some("voiceUserLeft"));

        // Leaving voice twice announces nothing
        gateway.leave_voice(7, &alice);
        assert!(drain_events(&mut bob_rx).is_empty());
    }

    #[test]
    fn test_send_event_to_session() {
        let gateway = Gateway::new(25000);
        let (alice, mut alice_rx) = connect(&gateway, "alice");

        let event = RelayEvent::VoiceIceCandidate(VoiceIceCandidateEvent {
            from_session_id: "peer".to_string(),
            candidate: serde_json::json!({"candidate": "host 127.0.0.1"}),
        });

        assert!(gateway.send_event_to_session(&alice.session_id, &event));
        let frames = drain_events(&mut alice_rx);
        assert_eq!(frames[0].t.as_deref(), Some("voiceIceCandidate"));

        assert!(!gateway.send_event_to_session("missing-session", &event));
    }

    #[test]
    fn test_broadcast_reaches_every_room_session() {
        let gateway = Gateway::new(25000);
        let (alice, mut alice_rx) = connect(&gateway, "alice");
        let (bob, mut bob_rx) = connect(&gateway, "bob");
        let (carol, mut carol_rx) = connect(&gateway, "carol");

        gateway.join_room(7, &alice);
        gateway.join_room(7, &bob);
        gateway.join_room(9, &carol);
        drain_events(&mut alice_rx);
        drain_events(&mut bob_rx);
        drain_events(&mut carol_rx);

        let event = RelayEvent::ChatMessage(ChatMessageEvent {
            room_id: 7,
            user_id: alice.user_id,
            username: alice.username.clone(),
            message: "hello".to_string(),
            timestamp: Utc::now(),
        });
        gateway.broadcast_to_room(7, &event);

        assert_eq!(drain_events(&mut alice_rx).len(), 1);
        let bob_frames = drain_events(&mut bob_rx);
        assert_eq!(bob_frames.len(), 1);
        assert_eq!(bob_frames[0].d.as_ref().unwrap()["message"], "hello");
        assert!(drain_events(&mut carol_rx).is_empty());
    }

    #[test]
    fn test_heartbeat_interval_passthrough() {
        let gateway = Gateway::new(41250);
        assert_eq!(gateway.heartbeat_interval(), 41250);
    }
}
