//! Authoritative world model and session registry
//!
//! All mutation of ships, bullets and intents funnels through `World`
//! methods; the tick loop owns the only instance, so collection scans
//! never race with registration changes.

use std::collections::BTreeMap;

use crate::config::sim::{
    MAX_PLAYERS, SPAWN_MARGIN, SUN_RADIUS, WORLD_HEIGHT, WORLD_WIDTH,
};
use crate::ws::protocol::PlayerIntent;

use super::vec2::Vec2;

/// Stable player identity, assigned at admission and never reused
pub type PlayerId = u32;

/// A player's ship (authoritative)
#[derive(Debug, Clone)]
pub struct Ship {
    pub player_id: PlayerId,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Heading in radians, unbounded (wraps implicitly through trig use)
    pub angle: f64,
    pub alive: bool,
    pub score: u32,
}

/// A bullet in flight. The owner may have died or disconnected; such
/// orphan bullets keep simulating but can no longer score.
#[derive(Debug, Clone)]
pub struct Bullet {
    pub owner_id: PlayerId,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Simulation time of creation
    pub birth_time: f64,
}

/// The central gravity source and lethal obstacle
#[derive(Debug, Clone)]
pub struct Sun {
    pub position: Vec2,
    pub radius: f64,
}

/// Admission failures reported to the connecting client
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("Game full")]
    Full,
}

/// Authoritative game world
pub struct World {
    /// Ships keyed by player id. BTreeMap keeps registry iteration in
    /// admission order (ids are monotonic), which collision resolution
    /// and determinism rely on.
    pub ships: BTreeMap<PlayerId, Ship>,
    pub bullets: Vec<Bullet>,
    pub intents: BTreeMap<PlayerId, PlayerIntent>,
    pub sun: Sun,
    /// Simulation time, advanced by exactly dt each tick
    pub game_time: f64,
    next_player_id: PlayerId,
}

impl World {
    pub fn new() -> Self {
        Self {
            ships: BTreeMap::new(),
            bullets: Vec::new(),
            intents: BTreeMap::new(),
            sun: Sun {
                position: Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0),
                radius: SUN_RADIUS,
            },
            game_time: 0.0,
            next_player_id: 0,
        }
    }

    /// Deterministic corner spawn slot for a player
    pub fn spawn_position(player_id: PlayerId) -> Vec2 {
        let slots = [
            Vec2::new(SPAWN_MARGIN, SPAWN_MARGIN),
            Vec2::new(WORLD_WIDTH - SPAWN_MARGIN, SPAWN_MARGIN),
            Vec2::new(SPAWN_MARGIN, WORLD_HEIGHT - SPAWN_MARGIN),
            Vec2::new(WORLD_WIDTH - SPAWN_MARGIN, WORLD_HEIGHT - SPAWN_MARGIN),
        ];
        slots[player_id as usize % slots.len()]
    }

    /// Admit a new player. Rejects without mutating state once the
    /// session is at capacity; otherwise allocates the next identity and
    /// registers a ship at its corner spawn with a zeroed intent.
    pub fn admit(&mut self) -> Result<PlayerId, AdmissionError> {
        if self.ships.len() >= MAX_PLAYERS {
            return Err(AdmissionError::Full);
        }

        let player_id = self.next_player_id;
        self.next_player_id += 1;

        self.ships.insert(
            player_id,
            Ship {
                player_id,
                position: Self::spawn_position(player_id),
                velocity: Vec2::ZERO,
                angle: 0.0,
                alive: true,
                score: 0,
            },
        );
        self.intents.insert(player_id, PlayerIntent::default());

        Ok(player_id)
    }

    /// Remove a player's ship and intent record. Idempotent; bullets the
    /// player fired stay in the world.
    pub fn remove(&mut self, player_id: PlayerId) {
        self.ships.remove(&player_id);
        self.intents.remove(&player_id);
    }

    /// Replace a player's stored intent wholesale. A no-op for unknown
    /// ids: an input racing a disconnect is expected traffic.
    pub fn set_intent(&mut self, player_id: PlayerId, intent: PlayerIntent) {
        if let Some(slot) = self.intents.get_mut(&player_id) {
            *slot = intent;
        }
    }

    pub fn player_count(&self) -> usize {
        self.ships.len()
    }

    /// Advance the simulation by one fixed time step: gravity, intent
    /// application, integration, collision resolution, then the clock.
    pub fn step(&mut self, dt: f64) {
        self.apply_gravity(dt);
        self.apply_intents(dt);
        self.integrate(dt);
        self.resolve_collisions();
        self.game_time += dt;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
