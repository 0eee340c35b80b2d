//! Fixed simulation parameters
//!
//! These are process-wide constants with no runtime mutation path. The
//! physics is tuned against the world scale below; changing one value
//! usually means re-tuning its neighbors.

/// World width in world units
pub const WORLD_WIDTH: f64 = 800.0;
/// World height in world units
pub const WORLD_HEIGHT: f64 = 600.0;

/// Simulation ticks per second
pub const TICK_RATE: u32 = 30;

/// Fixed time step for one tick (seconds)
pub fn tick_delta() -> f64 {
    1.0 / TICK_RATE as f64
}

/// Gravitational constant (tuned for the world scale, not SI)
pub const GRAVITY_CONSTANT: f64 = 5000.0;
/// Mass of the central sun
pub const SUN_MASS: f64 = 1000.0;
/// Radius of the central sun
pub const SUN_RADIUS: f64 = 30.0;

/// Ship mass (cancels out in a = F/m but kept for the force law)
pub const SHIP_MASS: f64 = 1.0;
/// Ship hitbox radius
pub const SHIP_RADIUS: f64 = 10.0;
/// Ship turn rate in radians per second
pub const SHIP_ROTATION_SPEED: f64 = 4.0;
/// Thrust acceleration in units per second squared
pub const SHIP_THRUST: f64 = 120.0;

/// Bullet muzzle speed, added on top of the ship's velocity
pub const BULLET_SPEED: f64 = 250.0;
/// Bullet hitbox radius
pub const BULLET_RADIUS: f64 = 2.0;
/// Bullet lifetime in seconds
pub const BULLET_LIFETIME: f64 = 3.0;
/// Minimum simulated time between shots from one player (seconds)
pub const SHOOT_COOLDOWN: f64 = 0.3;

/// Distance of the corner spawn slots from the world edges
pub const SPAWN_MARGIN: f64 = 100.0;
/// Maximum concurrent players in the session
pub const MAX_PLAYERS: usize = 4;
