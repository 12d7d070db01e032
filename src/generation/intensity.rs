//! # Intensity
//!
//! Rooms get more intense the deeper they lie within their key level. Each
//! level starts from an eased-off version of the previous level's peak.

use super::lock_and_key::{Attempt, StepResult};
use crate::constraints::DungeonConstraints;
use crate::dungeon::RoomId;
use rand::Rng;

/// Share of the normalized range given to ordinary rooms; the boss alone sits at 1.0.
const NORMALIZED_CEILING: f64 = 0.99;

impl<'a, C: DungeonConstraints> Attempt<'a, C> {
    /// Computes the intensity of every room, rescales them into
    /// `[0, 0.99]` and pins the boss to 1.0 and the goal to 0.0.
    pub(crate) fn compute_intensity(&mut self) -> StepResult<()> {
        let ease_off = self.config.intensity_ease_off;
        let mut next_level_base = 0.0_f64;

        for level in 0..self.levels.key_count() {
            let intensity = next_level_base * (1.0 - ease_off);

            for id in self.levels.rooms(level).to_vec() {
                let Some(room) = self.dungeon.room(id) else {
                    continue;
                };
                let parent = room.parent().and_then(|parent| self.dungeon.room(parent));
                let starts_level = match parent {
                    Some(parent) => !parent.precond.implies(&room.precond),
                    None => true,
                };
                if starts_level {
                    next_level_base = next_level_base.max(self.apply_intensity(id, intensity)?);
                }
            }
        }

        self.normalize_intensity();

        if let Some(boss) = self.dungeon.find_boss().map(|room| room.id) {
            self.room_mut(boss)?.intensity = 1.0;
        }
        if let Some(goal) = self.dungeon.find_goal().map(|room| room.id) {
            self.room_mut(goal)?.intensity = 0.0;
        }
        Ok(())
    }

    /// Sets a jittered `intensity` on `id` and higher intensities on each
    /// descendant within the same key level. Returns the highest intensity
    /// set.
    ///
    /// Values may exceed 1.0 until [`Self::normalize_intensity`] runs.
    fn apply_intensity(&mut self, id: RoomId, intensity: f64) -> StepResult<f64> {
        let jitter = self.config.intensity_growth_jitter;
        let intensity = intensity * (1.0 - jitter / 2.0 + jitter * self.rng.gen::<f64>());

        let room = self.room_mut(id)?;
        room.intensity = intensity;
        let precond = room.precond;
        let children = room.children().to_vec();

        let mut max_intensity = intensity;
        for child in children {
            let same_level = self
                .dungeon
                .room(child)
                .is_some_and(|child| precond.implies(&child.precond));
            if same_level {
                max_intensity = max_intensity.max(self.apply_intensity(child, intensity + 1.0)?);
            }
        }

        Ok(max_intensity)
    }

    /// Scales intensities down so they all fit within `[0, 0.99]`.
    fn normalize_intensity(&mut self) {
        let max_intensity = self
            .dungeon
            .rooms()
            .map(|room| room.intensity)
            .fold(0.0_f64, f64::max);
        if max_intensity <= 0.0 {
            return;
        }

        for id in self.dungeon.room_ids() {
            if let Some(room) = self.dungeon.room_mut(id) {
                room.intensity = room.intensity / max_intensity * NORMALIZED_CEILING;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::constraints::CountConstraints;
    use crate::dungeon::{Coord, Room, RoomId};
    use crate::generation::lock_and_key::Attempt;
    use crate::generation::{create_rng, GenerationConfig};
    use crate::puzzle::{Condition, Symbol};
    use rand::rngs::StdRng;

    /// A chain 0 - 1 - 2 at level 0 followed by 3 - 4 behind key 0.
    fn chain_attempt<'a>(
        constraints: &'a CountConstraints,
        config: &'a GenerationConfig,
        rng: &'a mut StdRng,
    ) -> Attempt<'a, CountConstraints> {
        let mut attempt = Attempt::new(constraints, config, rng);
        let locked = Condition::from_symbol(Symbol::key(0));
        let layout: [(RoomId, Option<RoomId>, usize); 5] =
            [(0, None, 0), (1, Some(0), 0), (2, Some(1), 0), (3, Some(2), 1), (4, Some(3), 1)];
        for (id, parent, level) in layout {
            let precond = if level == 0 { Condition::empty() } else { locked };
            let room = Room::new(id, vec![Coord::new(id as i32, 0)], parent, None, precond).unwrap();
            attempt.dungeon.add(room).unwrap();
            if let Some(parent) = parent {
                attempt.dungeon.room_mut(parent).unwrap().add_child(id);
            }
            attempt.levels.add_room(level, id);
        }
        attempt
    }

    fn intensity(attempt: &Attempt<'_, CountConstraints>, id: RoomId) -> f64 {
        attempt.dungeon.room(id).unwrap().intensity
    }

    #[test]
    fn test_intensity_grows_with_depth() {
        let constraints = CountConstraints::new(5, 1, 0);
        let config = GenerationConfig {
            intensity_growth_jitter: 0.0,
            ..GenerationConfig::new(3)
        };
        let mut rng = create_rng(&config);
        let mut attempt = chain_attempt(&constraints, &config, &mut rng);
        attempt.compute_intensity().unwrap();

        // Level 0: 0, 1, 2. Level 1 starts at 2 * 0.8 = 1.6, then 2.6
        let expected = [0.0, 1.0, 2.0, 1.6, 2.6];
        for (id, raw) in expected.iter().enumerate() {
            let normalized = raw / 2.6 * 0.99;
            assert!((intensity(&attempt, id) - normalized).abs() < 1e-9, "room {}", id);
        }
    }

    #[test]
    fn test_boss_and_goal_pinned() {
        let constraints = CountConstraints::new(5, 1, 0);
        let config = GenerationConfig::new(4);
        let mut rng = create_rng(&config);
        let mut attempt = chain_attempt(&constraints, &config, &mut rng);
        attempt.dungeon.room_mut(3).unwrap().item = Some(Symbol::boss());
        attempt.dungeon.room_mut(4).unwrap().item = Some(Symbol::goal());
        attempt.compute_intensity().unwrap();

        assert_eq!(intensity(&attempt, 3), 1.0);
        assert_eq!(intensity(&attempt, 4), 0.0);
        for id in 0..3 {
            assert!((0.0..=0.99).contains(&intensity(&attempt, id)));
        }
    }

    #[test]
    fn test_single_room_stays_zero() {
        let constraints = CountConstraints::new(1, 0, 0);
        let config = GenerationConfig::new(5);
        let mut rng = create_rng(&config);
        let mut attempt = Attempt::new(&constraints, &config, &mut rng);
        let room = Room::new(0, vec![Coord::new(0, 0)], None, None, Condition::empty()).unwrap();
        attempt.dungeon.add(room).unwrap();
        attempt.levels.add_room(0, 0);

        attempt.compute_intensity().unwrap();
        assert_eq!(intensity(&attempt, 0), 0.0);
    }
}
