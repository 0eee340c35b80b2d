//! Physics stepper: gravity, intent application, position integration
//!
//! Order within a tick matters and is fixed: gravity first, then
//! input-driven thrust/rotation/shooting, then integration. Collision
//! resolution runs afterwards (see `collision`).

use crate::config::sim::{
    BULLET_SPEED, GRAVITY_CONSTANT, SHIP_MASS, SHIP_ROTATION_SPEED, SHIP_THRUST, SHOOT_COOLDOWN,
    SUN_MASS,
};

use super::vec2::Vec2;
use super::world::{Bullet, World};

impl World {
    /// Apply the sun's inverse-square pull to every live ship and every
    /// bullet. Objects at or inside the sun's radius are skipped; they
    /// are eliminated by collision handling, and the guard also covers
    /// the zero-distance degeneracy.
    pub fn apply_gravity(&mut self, dt: f64) {
        let sun_position = self.sun.position;
        let sun_radius = self.sun.radius;

        for ship in self.ships.values_mut() {
            if !ship.alive {
                continue;
            }
            let delta = sun_position - ship.position;
            let distance = delta.length();
            if distance > sun_radius {
                // Ship mass cancels in a = F/m
                let force = GRAVITY_CONSTANT * SUN_MASS * SHIP_MASS / (distance * distance);
                let acceleration = delta.normalized() * (force / SHIP_MASS);
                ship.velocity += acceleration * dt;
            }
        }

        for bullet in &mut self.bullets {
            let delta = sun_position - bullet.position;
            let distance = delta.length();
            if distance > sun_radius {
                let acceleration =
                    delta.normalized() * (GRAVITY_CONSTANT * SUN_MASS / (distance * distance));
                bullet.velocity += acceleration * dt;
            }
        }
    }

    /// Apply each player's latest intent, in registry order.
    ///
    /// Respawn is honored only for dead ships and consumes the tick.
    /// Dead ships are otherwise inert but keep their identity and intent
    /// slot so a later respawn can reactivate them. Rotation flags are
    /// additive: holding both nets zero.
    pub fn apply_intents(&mut self, dt: f64) {
        let ids: Vec<_> = self.ships.keys().copied().collect();
        for id in ids {
            let intent = match self.intents.get(&id) {
                Some(intent) => *intent,
                None => continue,
            };
            let ship = match self.ships.get_mut(&id) {
                Some(ship) => ship,
                None => continue,
            };

            if intent.respawn && !ship.alive {
                ship.position = Self::spawn_position(id);
                ship.velocity = Vec2::ZERO;
                ship.angle = 0.0;
                ship.alive = true;
                continue;
            }

            if !ship.alive {
                continue;
            }

            if intent.rotate_left {
                ship.angle += SHIP_ROTATION_SPEED * dt;
            }
            if intent.rotate_right {
                ship.angle -= SHIP_ROTATION_SPEED * dt;
            }

            if intent.thrust {
                ship.velocity += Vec2::from_angle(ship.angle) * (SHIP_THRUST * dt);
            }

            if intent.shoot {
                let position = ship.position;
                let velocity = ship.velocity;
                let angle = ship.angle;

                // Per-owner cooldown: any bullet of ours younger than the
                // cooldown blocks a new shot, no matter how many bullets
                // other players have in flight.
                let on_cooldown = self.bullets.iter().any(|bullet| {
                    bullet.owner_id == id
                        && self.game_time - bullet.birth_time < SHOOT_COOLDOWN
                });

                if !on_cooldown {
                    self.bullets.push(Bullet {
                        owner_id: id,
                        position,
                        // Muzzle velocity inherits the ship's momentum
                        velocity: Vec2::from_angle(angle) * BULLET_SPEED + velocity,
                        birth_time: self.game_time,
                    });
                }
            }
        }
    }

    /// Advance positions: live ships and all bullets. Dead ships stay
    /// frozen where they died.
    pub fn integrate(&mut self, dt: f64) {
        for ship in self.ships.values_mut() {
            if ship.alive {
                ship.position += ship.velocity * dt;
            }
        }
        for bullet in &mut self.bullets {
            bullet.position += bullet.velocity * dt;
        }
    }
}
