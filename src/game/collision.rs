//! Collision resolution and stale-object pruning
//!
//! The resolution order is observable through scores and kill timing and
//! must stay fixed: expire old bullets, ship-sun, bullet-ship, then the
//! boundary pass.

use crate::config::sim::{
    BULLET_LIFETIME, BULLET_RADIUS, SHIP_RADIUS, WORLD_HEIGHT, WORLD_WIDTH,
};

use super::world::{PlayerId, World};

impl World {
    /// Resolve all collisions for the current tick.
    pub fn resolve_collisions(&mut self) {
        self.expire_bullets();
        self.crash_ships_into_sun();
        self.resolve_bullet_hits();
        self.apply_boundaries();
    }

    /// Drop bullets whose age exceeds the lifetime threshold.
    fn expire_bullets(&mut self) {
        let now = self.game_time;
        self.bullets
            .retain(|bullet| now - bullet.birth_time < BULLET_LIFETIME);
    }

    /// Live ships inside the sun's kill radius die. No score changes.
    fn crash_ships_into_sun(&mut self) {
        let sun_position = self.sun.position;
        let kill_radius = self.sun.radius + SHIP_RADIUS;
        for ship in self.ships.values_mut() {
            if ship.alive && ship.position.distance(sun_position) < kill_radius {
                ship.alive = false;
            }
        }
    }

    /// Each bullet tests live ships in registry order, skipping its
    /// owner, and hits at most one. Kills apply immediately, so a ship
    /// downed by an earlier bullet this tick cannot be hit again. The
    /// owner's score only moves while the owner is still registered;
    /// orphan bullets kill without scoring.
    fn resolve_bullet_hits(&mut self) {
        let mut spent: Vec<usize> = Vec::new();

        for (index, bullet) in self.bullets.iter().enumerate() {
            let mut hit: Option<PlayerId> = None;
            for ship in self.ships.values() {
                if !ship.alive || ship.player_id == bullet.owner_id {
                    continue;
                }
                if bullet.position.distance(ship.position) < SHIP_RADIUS + BULLET_RADIUS {
                    hit = Some(ship.player_id);
                    break;
                }
            }

            if let Some(victim_id) = hit {
                if let Some(victim) = self.ships.get_mut(&victim_id) {
                    victim.alive = false;
                }
                if let Some(owner) = self.ships.get_mut(&bullet.owner_id) {
                    owner.score += 1;
                }
                spent.push(index);
            }
        }

        // Delete after the scan to keep indices stable
        for index in spent.into_iter().rev() {
            self.bullets.remove(index);
        }
    }

    /// Live ships wrap modulo the world dimensions per axis; bullets
    /// strictly outside the world are removed instead.
    fn apply_boundaries(&mut self) {
        for ship in self.ships.values_mut() {
            if !ship.alive {
                continue;
            }
            ship.position.x = ship.position.x.rem_euclid(WORLD_WIDTH);
            ship.position.y = ship.position.y.rem_euclid(WORLD_HEIGHT);
        }

        self.bullets.retain(|bullet| {
            (0.0..=WORLD_WIDTH).contains(&bullet.position.x)
                && (0.0..=WORLD_HEIGHT).contains(&bullet.position.y)
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::config::sim::{BULLET_LIFETIME, SHIP_RADIUS, WORLD_HEIGHT, WORLD_WIDTH};
    use crate::game::vec2::Vec2;
    use crate::game::world::{Bullet, World};

    fn bullet(owner_id: u32, position: Vec2, birth_time: f64) -> Bullet {
        Bullet {
            owner_id,
            position,
            velocity: Vec2::ZERO,
            birth_time,
        }
    }

    #[test]
    fn old_bullets_are_pruned() {
        let mut world = World::new();
        world.game_time = 10.0;
        world
            .bullets
            .push(bullet(0, Vec2::new(50.0, 50.0), 10.0 - BULLET_LIFETIME - 0.01));
        world
            .bullets
            .push(bullet(0, Vec2::new(50.0, 50.0), 9.9));

        world.resolve_collisions();
        assert_eq!(world.bullets.len(), 1);
        assert_eq!(world.bullets[0].birth_time, 9.9);
    }

    #[test]
    fn ship_touching_the_sun_dies_without_score_change() {
        let mut world = World::new();
        let id = world.admit().unwrap();
        {
            let ship = world.ships.get_mut(&id).unwrap();
            ship.position = world.sun.position + Vec2::new(world.sun.radius + SHIP_RADIUS - 1.0, 0.0);
            ship.score = 2;
        }

        world.resolve_collisions();
        let ship = &world.ships[&id];
        assert!(!ship.alive);
        assert_eq!(ship.score, 2);
    }

    #[test]
    fn bullet_kills_ship_and_scores_for_its_owner() {
        let mut world = World::new();
        let shooter = world.admit().unwrap();
        let target = world.admit().unwrap();
        let target_position = world.ships[&target].position;
        world.bullets.push(bullet(shooter, target_position, 0.0));

        world.resolve_collisions();

        assert!(!world.ships[&target].alive);
        assert_eq!(world.ships[&shooter].score, 1);
        assert!(world.bullets.is_empty(), "hit bullets are consumed");
    }

    #[test]
    fn bullet_never_hits_its_own_ship() {
        let mut world = World::new();
        let shooter = world.admit().unwrap();
        let position = world.ships[&shooter].position;
        world.bullets.push(bullet(shooter, position, 0.0));

        world.resolve_collisions();

        assert!(world.ships[&shooter].alive);
        assert_eq!(world.bullets.len(), 1);
    }

    #[test]
    fn bullet_hits_only_the_first_ship_in_registry_order() {
        let mut world = World::new();
        let shooter = world.admit().unwrap();
        let first = world.admit().unwrap();
        let second = world.admit().unwrap();

        // Stack both victims on the same spot away from the sun
        let spot = Vec2::new(50.0, 50.0);
        world.ships.get_mut(&first).unwrap().position = spot;
        world.ships.get_mut(&second).unwrap().position = spot;
        world.bullets.push(bullet(shooter, spot, 0.0));

        world.resolve_collisions();

        assert!(!world.ships[&first].alive);
        assert!(world.ships[&second].alive, "one hit per bullet");
        assert_eq!(world.ships[&shooter].score, 1);
    }

    #[test]
    fn two_bullets_on_one_ship_score_a_single_kill() {
        let mut world = World::new();
        let shooter = world.admit().unwrap();
        let target = world.admit().unwrap();
        let spot = world.ships[&target].position;
        world.bullets.push(bullet(shooter, spot, 0.0));
        world.bullets.push(bullet(shooter, spot, 0.0));

        world.resolve_collisions();

        assert!(!world.ships[&target].alive);
        // The second bullet sees a dead ship and flies on
        assert_eq!(world.ships[&shooter].score, 1);
        assert_eq!(world.bullets.len(), 1);
    }

    #[test]
    fn orphan_bullet_kills_but_cannot_score() {
        let mut world = World::new();
        let shooter = world.admit().unwrap();
        let target = world.admit().unwrap();
        let spot = world.ships[&target].position;
        world.bullets.push(bullet(shooter, spot, 0.0));
        world.remove(shooter);

        world.resolve_collisions();

        assert!(!world.ships[&target].alive);
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn dead_owner_still_scores_while_registered() {
        // Registry presence, not aliveness, gates the score increment.
        let mut world = World::new();
        let shooter = world.admit().unwrap();
        let target = world.admit().unwrap();
        let spot = world.ships[&target].position;
        world.ships.get_mut(&shooter).unwrap().alive = false;
        world.bullets.push(bullet(shooter, spot, 0.0));

        world.resolve_collisions();

        assert!(!world.ships[&target].alive);
        assert_eq!(world.ships[&shooter].score, 1);
    }

    #[test]
    fn ships_wrap_at_the_world_edges() {
        let mut world = World::new();
        let id = world.admit().unwrap();
        world.ships.get_mut(&id).unwrap().position = Vec2::new(WORLD_WIDTH + 5.0, -5.0);

        world.resolve_collisions();

        let position = world.ships[&id].position;
        assert_eq!(position, Vec2::new(5.0, WORLD_HEIGHT - 5.0));
        assert!(position.x >= 0.0 && position.y >= 0.0);
    }

    #[test]
    fn out_of_bounds_bullets_are_removed_not_wrapped() {
        let mut world = World::new();
        world.bullets.push(bullet(0, Vec2::new(WORLD_WIDTH + 0.1, 10.0), 0.0));
        world.bullets.push(bullet(0, Vec2::new(10.0, -0.1), 0.0));
        world.bullets.push(bullet(0, Vec2::new(10.0, 10.0), 0.0));

        world.resolve_collisions();

        assert_eq!(world.bullets.len(), 1);
        assert_eq!(world.bullets[0].position, Vec2::new(10.0, 10.0));
    }
}
