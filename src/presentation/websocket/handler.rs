//! WebSocket Connection Handler
//!
//! Upgrades connections, runs the identify handshake, then relays room
//! events until the client disconnects or stops heartbeating.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout};
use uuid::Uuid;

use super::gateway::{
    ChatMessageEvent, ConnectedSession, ErrorEvent, GameActionEvent, RelayEvent, RoomJoinedEvent,
    VoiceActiveUsersEvent, VoiceErrorEvent, VoiceIceCandidateEvent, VoiceSignalEvent,
};
use super::messages::{
    GatewayReceive, GatewaySend, HelloPayload, IdentifyPayload, OpCode, ReadyPayload, ReadyUser,
};
use super::session::SessionState;
use crate::application::services::Claims;
use crate::domain::{RoomMemberRepository, RoomRepository, User, UserRepository, UserStatus};
use crate::infrastructure::metrics;
use crate::infrastructure::repositories::{
    PgRoomMemberRepository, PgRoomRepository, PgUserRepository,
};
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
struct JoinRoomPayload {
    room_id: i64,
}

#[derive(Debug, Deserialize)]
struct LeaveRoomPayload {
    room_id: i64,
}

#[derive(Debug, Deserialize)]
struct ChatMessagePayload {
    room_id: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct GameActionPayload {
    room_id: i64,
    action: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct VoiceJoinPayload {
    room_id: i64,
}

#[derive(Debug, Deserialize)]
struct VoiceLeavePayload {
    room_id: i64,
}

#[derive(Debug, Deserialize)]
struct VoiceSignalPayload {
    target_session_id: String,
    signal_type: String,
    sdp: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct VoiceIceCandidatePayload {
    target_session_id: String,
    candidate: serde_json::Value,
}

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.max_message_size(state.settings.websocket.max_message_size)
        .max_frame_size(state.settings.websocket.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let session_id = Uuid::new_v4().to_string();
    let mut session_state = SessionState::new(session_id.clone());

    tracing::debug!(session_id = %session_id, "New WebSocket connection");
    metrics::inc_websocket_connections("connected");

    // Split socket for concurrent read/write
    let (mut sender, mut receiver) = socket.split();

    // Create channel for outgoing frames
    let (tx, mut rx) = mpsc::unbounded_channel::<GatewaySend>();

    // Send Hello immediately
    let hello = GatewaySend {
        op: OpCode::Hello as u8,
        d: Some(
            serde_json::to_value(HelloPayload {
                heartbeat_interval: state.gateway.heartbeat_interval(),
            })
            .unwrap(),
        ),
        t: None,
    };

    if let Err(e) = sender
        .send(Message::Text(serde_json::to_string(&hello).unwrap().into()))
        .await
    {
        tracing::error!("Failed to send Hello: {}", e);
        metrics::dec_websocket_connections("connected");
        return;
    }

    // Spawn task to forward frames from the channel to the socket
    let sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!("Failed to serialize frame: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Wait for Identify (with timeout)
    let identify_timeout = Duration::from_secs(state.settings.websocket.identify_timeout_secs);
    let identify_result = timeout(identify_timeout, async {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Ok(frame) = serde_json::from_str::<GatewayReceive>(&text) {
                        if frame.op == OpCode::Identify as u8 {
                            if let Some(d) = frame.d {
                                if let Ok(identify) = serde_json::from_value::<IdentifyPayload>(d)
                                {
                                    return Some(identify);
                                }
                            }
                        }
                    }
                }
                Ok(Message::Close(_)) => return None,
                Err(_) => return None,
                _ => continue,
            }
        }
        None
    })
    .await;

    let identify = match identify_result {
        Ok(Some(identify)) => identify,
        Ok(None) => {
            tracing::debug!(session_id = %session_id, "Connection closed before Identify");
            metrics::dec_websocket_connections("connected");
            sender_task.abort();
            return;
        }
        Err(_) => {
            tracing::debug!(session_id = %session_id, "Identify timeout");
            let _ = tx.send(GatewaySend {
                op: OpCode::InvalidSession as u8,
                d: Some(json!(false)),
                t: None,
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
            metrics::dec_websocket_connections("connected");
            sender_task.abort();
            return;
        }
    };

    // Validate the token and load the account behind it
    let user = match authenticate(&identify.token, &state).await {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!(session_id = %session_id, error = %e, "Identify rejected");
            let _ = tx.send(GatewaySend {
                op: OpCode::InvalidSession as u8,
                d: Some(json!(false)),
                t: None,
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
            metrics::dec_websocket_connections("connected");
            sender_task.abort();
            return;
        }
    };

    session_state.identified = true;

    // Register session with the gateway
    let session = state.gateway.register_session(
        session_id.clone(),
        user.id,
        user.username.clone(),
        tx.clone(),
    );

    // Send ready event
    let ready = GatewaySend {
        op: OpCode::Dispatch as u8,
        d: Some(
            serde_json::to_value(ReadyPayload {
                user: ReadyUser {
                    id: user.id,
                    username: user.username.clone(),
                    role: user.role,
                },
                session_id: session_id.clone(),
            })
            .unwrap(),
        ),
        t: Some("ready".to_string()),
    };

    if tx.send(ready).is_err() {
        state.gateway.disconnect_session(&session_id);
        metrics::dec_websocket_connections("connected");
        sender_task.abort();
        return;
    }

    tracing::info!(
        user_id = %user.id,
        session_id = %session_id,
        "User connected and identified"
    );

    // Heartbeat watchdog: the client gets two intervals before the
    // connection is considered dead
    let heartbeat_interval_ms = state.gateway.heartbeat_interval();
    let mut heartbeat_check = interval(Duration::from_millis(heartbeat_interval_ms));
    heartbeat_check.tick().await; // Skip first immediate tick

    // Main message loop
    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = handle_message(
                            &text,
                            &mut session_state,
                            &tx,
                            &session,
                            &state,
                        ).await {
                            send_event(&tx, &RelayEvent::Error(ErrorEvent { message: e.clone() }));
                            tracing::debug!(
                                session_id = %session_id,
                                error = %e,
                                "Error handling message"
                            );
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(session_id = %session_id, "Connection closed");
                        break;
                    }
                    Some(Ok(Message::Ping(_))) => {
                        // Pong is handled automatically by axum
                    }
                    Some(Err(e)) => {
                        tracing::debug!(session_id = %session_id, error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }

            _ = heartbeat_check.tick() => {
                if !session_state.is_alive(heartbeat_interval_ms * 2) {
                    tracing::info!(
                        session_id = %session_id,
                        "Heartbeat timeout, closing connection"
                    );
                    break;
                }
            }
        }
    }

    // Cleanup: every roster entry goes, and the rooms hear about it
    state.gateway.disconnect_session(&session_id);
    metrics::dec_websocket_connections("connected");
    sender_task.abort();

    tracing::info!(
        user_id = %user.id,
        session_id = %session_id,
        "User disconnected"
    );
}

/// Handle one incoming frame
async fn handle_message(
    text: &str,
    session_state: &mut SessionState,
    tx: &mpsc::UnboundedSender<GatewaySend>,
    session: &Arc<ConnectedSession>,
    state: &AppState,
) -> Result<(), String> {
    let frame: GatewayReceive =
        serde_json::from_str(text).map_err(|e| format!("Invalid JSON: {}", e))?;

    match frame.op {
        op if op == OpCode::Heartbeat as u8 => {
            session_state.heartbeat();
            let _ = tx.send(GatewaySend {
                op: OpCode::HeartbeatAck as u8,
                d: None,
                t: None,
            });
            tracing::trace!(
                session_id = %session_state.session_id,
                "Heartbeat received"
            );
        }

        op if op == OpCode::Dispatch as u8 => {
            let event = frame.t.ok_or("Missing event name")?;
            let d = frame.d.unwrap_or(serde_json::Value::Null);
            handle_dispatch(&event, d, tx, session, state).await?;
        }

        op => {
            tracing::debug!(
                session_id = %session_state.session_id,
                op = op,
                "Unknown opcode"
            );
        }
    }

    Ok(())
}

/// Route a named dispatch event
async fn handle_dispatch(
    event: &str,
    d: serde_json::Value,
    tx: &mpsc::UnboundedSender<GatewaySend>,
    session: &Arc<ConnectedSession>,
    state: &AppState,
) -> Result<(), String> {
    match event {
        "joinRoom" => {
            let payload: JoinRoomPayload = parse_payload(event, d)?;
            handle_join_room(payload.room_id, tx, session, state).await
        }

        "leaveRoom" => {
            let payload: LeaveRoomPayload = parse_payload(event, d)?;
            state.gateway.leave_room(payload.room_id, session);
            Ok(())
        }

        "chatMessage" => {
            let payload: ChatMessagePayload = parse_payload(event, d)?;
            if !state.gateway.is_in_room(payload.room_id, &session.session_id) {
                return Err("You are not in this room".to_string());
            }
            let relay = RelayEvent::ChatMessage(ChatMessageEvent {
                room_id: payload.room_id,
                user_id: session.user_id,
                username: session.username.clone(),
                message: payload.message,
                timestamp: Utc::now(),
            });
            state.gateway.broadcast_to_room(payload.room_id, &relay);
            Ok(())
        }

        "gameAction" => {
            let payload: GameActionPayload = parse_payload(event, d)?;
            if !state.gateway.is_in_room(payload.room_id, &session.session_id) {
                return Err("You are not in this room".to_string());
            }
            let relay = RelayEvent::GameAction(GameActionEvent {
                room_id: payload.room_id,
                user_id: session.user_id,
                username: session.username.clone(),
                action: payload.action,
                timestamp: Utc::now(),
            });
            state.gateway.broadcast_to_room(payload.room_id, &relay);
            Ok(())
        }

        "voiceJoin" => {
            let payload: VoiceJoinPayload = parse_payload(event, d)?;
            match state.gateway.join_voice(payload.room_id, session) {
                Some(sessions) => {
                    send_event(
                        tx,
                        &RelayEvent::VoiceActiveUsers(VoiceActiveUsersEvent {
                            room_id: payload.room_id,
                            sessions,
                        }),
                    );
                    Ok(())
                }
                None => Err("You are not in this room".to_string()),
            }
        }

        "voiceLeave" => {
            let payload: VoiceLeavePayload = parse_payload(event, d)?;
            state.gateway.leave_voice(payload.room_id, session);
            Ok(())
        }

        "voiceSignal" => {
            let payload: VoiceSignalPayload = parse_payload(event, d)?;
            if payload.signal_type != "offer" && payload.signal_type != "answer" {
                send_event(
                    tx,
                    &RelayEvent::VoiceError(VoiceErrorEvent {
                        message: format!("Unsupported signal type: {}", payload.signal_type),
                    }),
                );
                return Ok(());
            }
            let forwarded = RelayEvent::VoiceSignal(VoiceSignalEvent {
                from_session_id: session.session_id.clone(),
                signal_type: payload.signal_type,
                sdp: payload.sdp,
            });
            if !state
                .gateway
                .send_event_to_session(&payload.target_session_id, &forwarded)
            {
                send_event(
                    tx,
                    &RelayEvent::VoiceError(VoiceErrorEvent {
                        message: "Target session is not connected".to_string(),
                    }),
                );
            }
            Ok(())
        }

        "voiceIceCandidate" => {
            let payload: VoiceIceCandidatePayload = parse_payload(event, d)?;
            let forwarded = RelayEvent::VoiceIceCandidate(VoiceIceCandidateEvent {
                from_session_id: session.session_id.clone(),
                candidate: payload.candidate,
            });
            if !state
                .gateway
                .send_event_to_session(&payload.target_session_id, &forwarded)
            {
                send_event(
                    tx,
                    &RelayEvent::VoiceError(VoiceErrorEvent {
                        message: "Target session is not connected".to_string(),
                    }),
                );
            }
            Ok(())
        }

        _ => {
            tracing::debug!(event = event, "Unknown dispatch event");
            Ok(())
        }
    }
}

/// Gate a roster join on persisted membership (or the room being public),
/// then add the session and confirm to the caller.
async fn handle_join_room(
    room_id: i64,
    tx: &mpsc::UnboundedSender<GatewaySend>,
    session: &Arc<ConnectedSession>,
    state: &AppState,
) -> Result<(), String> {
    let member_repo = PgRoomMemberRepository::new(state.db.clone());
    let is_member = member_repo
        .is_member(room_id, session.user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, room_id = room_id, "Membership lookup failed");
            "Failed to join room".to_string()
        })?;

    if !is_member {
        let room_repo = PgRoomRepository::new(state.db.clone());
        let room = room_repo
            .find_by_id(room_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, room_id = room_id, "Room lookup failed");
                "Failed to join room".to_string()
            })?
            .ok_or("Room not found")?;
        if !room.is_public() {
            return Err("You are not a member of this room".to_string());
        }
    }

    let (online_count, member_ids) = state.gateway.join_room(room_id, session);
    send_event(
        tx,
        &RelayEvent::RoomJoined(RoomJoinedEvent {
            room_id,
            online_count,
            member_ids,
        }),
    );
    Ok(())
}

/// Validate a bearer token the same way the HTTP middleware does: decode
/// the JWT, reload the account, and reject anything that is not active.
async fn authenticate(token: &str, state: &AppState) -> Result<User, String> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.settings.jwt.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| format!("Invalid token: {}", e))?;

    let user_id: Uuid = token_data
        .claims
        .sub
        .parse()
        .map_err(|_| "Invalid token claims".to_string())?;

    let user_repo = PgUserRepository::new(state.db.clone());
    let user = user_repo
        .find_by_id(user_id)
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or("User not found")?;

    match user.status {
        UserStatus::Active => Ok(user),
        UserStatus::Pending => Err("Account is awaiting review".to_string()),
        UserStatus::Suspended => Err("Account is suspended".to_string()),
        UserStatus::Banned => Err("Account is banned".to_string()),
    }
}

fn send_event(tx: &mpsc::UnboundedSender<GatewaySend>, event: &RelayEvent) {
    metrics::record_relay_event(event.event_name());
    let _ = tx.send(event.to_frame());
}

fn parse_payload<T: serde::de::DeserializeOwned>(
    event: &str,
    d: serde_json::Value,
) -> Result<T, String> {
    serde_json::from_value(d).map_err(|_| format!("Invalid {} payload", event))
}
