//! Snapshot building for network transmission

use crate::ws::protocol::{BulletSnapshot, ServerMsg, ShipSnapshot, SunSnapshot};

use super::world::World;

/// Serialize the full authoritative world state for broadcast. The
/// payload is exhaustive: clients render purely from it.
pub fn world_snapshot(world: &World) -> ServerMsg {
    let ships = world
        .ships
        .values()
        .map(|ship| ShipSnapshot {
            player_id: ship.player_id,
            x: ship.position.x,
            y: ship.position.y,
            vx: ship.velocity.x,
            vy: ship.velocity.y,
            angle: ship.angle,
            alive: ship.alive,
            score: ship.score,
        })
        .collect();

    let bullets = world
        .bullets
        .iter()
        .map(|bullet| BulletSnapshot {
            owner_id: bullet.owner_id,
            x: bullet.position.x,
            y: bullet.position.y,
        })
        .collect();

    ServerMsg::GameState {
        time: world.game_time,
        ships,
        bullets,
        sun: SunSnapshot {
            x: world.sun.position.x,
            y: world.sun.position.y,
            radius: world.sun.radius,
        },
    }
}
