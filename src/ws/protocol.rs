//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};

use crate::game::PlayerId;

/// Latest control state declared by a client.
///
/// This is a snapshot, not an event queue: each inbound input message
/// replaces the previous one wholesale, and the tick loop reads whatever
/// was last written. Missing fields default to false; unknown fields are
/// ignored rather than treated as an open map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIntent {
    #[serde(default)]
    pub thrust: bool,
    #[serde(default)]
    pub rotate_left: bool,
    #[serde(default)]
    pub rotate_right: bool,
    #[serde(default)]
    pub shoot: bool,
    #[serde(default)]
    pub respawn: bool,
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Latest input flags for this player
    Input { inputs: PlayerIntent },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Identity assigned at admission, sent once to the new connection
    PlayerId { player_id: PlayerId },

    /// Admission rejected or other per-connection failure
    Error { message: String },

    /// Full authoritative world state, broadcast every tick
    GameState {
        time: f64,
        ships: Vec<ShipSnapshot>,
        bullets: Vec<BulletSnapshot>,
        sun: SunSnapshot,
    },
}

/// Ship state in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipSnapshot {
    pub player_id: PlayerId,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Heading in radians, unbounded
    pub angle: f64,
    pub alive: bool,
    pub score: u32,
}

/// Bullet state in a snapshot. Clients render purely from position;
/// bullets carry no velocity on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletSnapshot {
    pub owner_id: PlayerId,
    pub x: f64,
    pub y: f64,
}

/// Sun state in a snapshot (fixed for the session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SunSnapshot {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}
