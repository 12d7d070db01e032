//! # Switch Placement
//!
//! Places the dungeon's single switch and locks some doors below a room on
//! the solution path behind switch states, so reaching the goal means
//! flipping the switch at least once.

use super::lock_and_key::{Attempt, StepFailure, StepResult};
use crate::constraints::DungeonConstraints;
use crate::dungeon::{Edge, RoomId};
use crate::puzzle::{Condition, SwitchState, Symbol};
use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

impl<'a, C: DungeonConstraints> Attempt<'a, C> {
    /// Picks a base room on the solution path, switch-locks some of its
    /// descendants and puts the switch somewhere outside the base room's
    /// subtree that needs no more than the base room does.
    ///
    /// Does nothing when the constraints allow no switches.
    pub(crate) fn place_switches(&mut self) -> StepResult<()> {
        if self.constraints.max_switches() == 0 {
            return Ok(());
        }

        let mut solution = self.dungeon.solution_path();
        let switch = Symbol::switch();

        for attempt in 0..self.config.switch_attempts {
            let mut rooms = self.dungeon.room_ids();
            rooms.shuffle(self.rng);
            solution.shuffle(self.rng);

            // The base room is on the solution path so the player has to get
            // past a switch lock to finish
            let base = solution.iter().copied().find(|&id| {
                self.dungeon
                    .room(id)
                    .is_some_and(|room| room.children().len() > 1 && room.parent().is_some())
            });
            let Some(base) = base else {
                return Err(StepFailure::Retry("no branching room on the solution path"));
            };
            let base_precond = self
                .dungeon
                .room(base)
                .map(|room| room.precond)
                .ok_or(StepFailure::Retry("base room vanished"))?;

            let below_base = self.dungeon.subtree(base);
            rooms.retain(|id| !below_base.contains(id));

            let switch_room = rooms.into_iter().find(|&id| {
                self.dungeon.room(id).is_some_and(|room| {
                    room.item.is_none() && base_precond.implies(&room.precond)
                }) && self.constraints.room_can_fit_item(id, switch)
            });
            let Some(switch_room) = switch_room else {
                trace!("Switch attempt {} found no room for the switch", attempt);
                continue;
            };

            if self.switch_lock_child_rooms(base, SwitchState::Either)? {
                self.room_mut(switch_room)?.item = Some(switch);
                trace!("Placed switch in room {} for base room {}", switch_room, base);
                return Ok(());
            }
        }

        Err(StepFailure::Retry("could not place the switch"))
    }

    /// Randomly locks child edges of `id` (or, failing that, edges further
    /// down) with switch-state symbols.
    ///
    /// With [`SwitchState::Either`] the first child gets a random state and
    /// each following child the opposite of the previous one. Returns whether
    /// any edge was locked.
    pub(crate) fn switch_lock_child_rooms(
        &mut self,
        id: RoomId,
        given_state: SwitchState,
    ) -> StepResult<bool> {
        let mut state = match given_state {
            SwitchState::Either => {
                if self.rng.gen_bool(0.5) {
                    SwitchState::On
                } else {
                    SwitchState::Off
                }
            }
            state => state,
        };

        let child_edges: Vec<Edge> = match self.dungeon.room(id) {
            Some(room) => room
                .edges()
                .iter()
                .filter(|edge| room.children().contains(&edge.target))
                .copied()
                .collect(),
            None => return Ok(false),
        };

        let mut any_locks = false;
        for edge in child_edges {
            if edge.symbol.is_none() && self.rng.gen_bool(self.config.switch_lock_chance) {
                self.dungeon.link(id, edge.target, state.to_symbol())?;
                self.add_precond(edge.target, Condition::with_switch(state))?;
                any_locks = true;
            } else {
                any_locks |= self.switch_lock_child_rooms(edge.target, state)?;
            }

            if given_state == SwitchState::Either {
                state = state.invert();
            }
        }

        Ok(any_locks)
    }

    /// Adds `cond` to the precondition of `id` and every room below it.
    fn add_precond(&mut self, id: RoomId, cond: Condition) -> StepResult<()> {
        for room_id in self.dungeon.subtree(id) {
            let room = self.room_mut(room_id)?;
            room.precond = room.precond.and_condition(&cond);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::constraints::CountConstraints;
    use crate::dungeon::{Coord, Room, RoomId};
    use crate::generation::lock_and_key::{Attempt, StepFailure};
    use crate::generation::{create_rng, GenerationConfig};
    use crate::puzzle::{Condition, SwitchState, Symbol};
    use rand::rngs::StdRng;

    /// Start room 0 with a branching room 1 below it, which has children 2
    /// and 3; room 3 has child 4.
    fn branching_attempt<'a>(
        constraints: &'a CountConstraints,
        config: &'a GenerationConfig,
        rng: &'a mut StdRng,
    ) -> Attempt<'a, CountConstraints> {
        let mut attempt = Attempt::new(constraints, config, rng);
        let layout: [(RoomId, Option<RoomId>); 5] =
            [(0, None), (1, Some(0)), (2, Some(1)), (3, Some(1)), (4, Some(3))];
        for (id, parent) in layout {
            let item = if id == 0 { Some(Symbol::start()) } else { None };
            let room = Room::new(id, vec![Coord::new(id as i32, 0)], parent, item, Condition::empty()).unwrap();
            attempt.dungeon.add(room).unwrap();
            if let Some(parent) = parent {
                attempt.dungeon.room_mut(parent).unwrap().add_child(id);
                attempt.dungeon.link(parent, id, None).unwrap();
            }
        }
        attempt
    }

    #[test]
    fn test_switch_lock_alternates_states() {
        let constraints = CountConstraints::new(5, 0, 1);
        let config = GenerationConfig {
            switch_lock_chance: 1.0,
            ..GenerationConfig::new(5)
        };
        let mut rng = create_rng(&config);
        let mut attempt = branching_attempt(&constraints, &config, &mut rng);

        assert!(attempt.switch_lock_child_rooms(1, SwitchState::Either).unwrap());

        let base = attempt.dungeon.room(1).unwrap();
        let first = base.edge(2).unwrap().symbol.unwrap();
        let second = base.edge(3).unwrap().symbol.unwrap();
        assert!(first.is_switch_state() && second.is_switch_state());
        assert_ne!(first, second);

        // The lock on 3 carries over to its subtree
        let state = attempt.dungeon.room(3).unwrap().precond.switch_state();
        assert_eq!(attempt.dungeon.room(4).unwrap().precond.switch_state(), state);
        assert_eq!(state.to_symbol(), Some(second));
        // Edge back from the child carries the same symbol
        assert_eq!(attempt.dungeon.room(3).unwrap().edge(1).unwrap().symbol, Some(second));
    }

    #[test]
    fn test_switch_lock_recurses_past_locked_edges() {
        let constraints = CountConstraints::new(5, 0, 1);
        let config = GenerationConfig {
            switch_lock_chance: 1.0,
            ..GenerationConfig::new(6)
        };
        let mut rng = create_rng(&config);
        let mut attempt = branching_attempt(&constraints, &config, &mut rng);
        attempt.dungeon.link(1, 3, Some(Symbol::key(0))).unwrap();

        assert!(attempt.switch_lock_child_rooms(1, SwitchState::On).unwrap());
        assert_eq!(attempt.dungeon.room(1).unwrap().edge(2).unwrap().symbol, Some(Symbol::switch_on()));
        assert_eq!(attempt.dungeon.room(1).unwrap().edge(3).unwrap().symbol, Some(Symbol::key(0)));
        assert_eq!(attempt.dungeon.room(3).unwrap().edge(4).unwrap().symbol, Some(Symbol::switch_on()));
        assert_eq!(attempt.dungeon.room(4).unwrap().precond.switch_state(), SwitchState::On);
    }

    #[test]
    fn test_zero_lock_chance_locks_nothing() {
        let constraints = CountConstraints::new(5, 0, 1);
        let config = GenerationConfig {
            switch_lock_chance: 0.0,
            ..GenerationConfig::new(7)
        };
        let mut rng = create_rng(&config);
        let mut attempt = branching_attempt(&constraints, &config, &mut rng);

        assert!(!attempt.switch_lock_child_rooms(1, SwitchState::Either).unwrap());
        assert!(attempt.dungeon.rooms().all(|room| room.edges().iter().all(|e| e.symbol.is_none())));
    }

    #[test]
    fn test_place_switches_skipped_without_switches() {
        let constraints = CountConstraints::new(5, 0, 0);
        let config = GenerationConfig::new(8);
        let mut rng = create_rng(&config);
        let mut attempt = branching_attempt(&constraints, &config, &mut rng);

        assert!(attempt.place_switches().is_ok());
        assert!(attempt.dungeon.find_switch().is_none());
    }

    #[test]
    fn test_place_switches_outside_base_subtree() {
        let constraints = CountConstraints::new(6, 0, 1);
        let config = GenerationConfig {
            switch_lock_chance: 1.0,
            ..GenerationConfig::new(9)
        };
        let mut rng = create_rng(&config);
        let mut attempt = branching_attempt(&constraints, &config, &mut rng);
        attempt.dungeon.room_mut(4).unwrap().item = Some(Symbol::boss());
        let side = Room::new(5, vec![Coord::new(0, -1)], Some(0), None, Condition::empty()).unwrap();
        attempt.dungeon.add(side).unwrap();
        attempt.dungeon.room_mut(0).unwrap().add_child(5);
        attempt.dungeon.link(0, 5, None).unwrap();

        assert!(attempt.place_switches().is_ok());
        // Room 1 is the only branching room with a parent on the path, so
        // the switch must go to the side room
        assert_eq!(attempt.dungeon.find_switch().map(|room| room.id), Some(5));
        assert!(attempt.dungeon.room(4).unwrap().precond.switch_state() != SwitchState::Either);
    }

    #[test]
    fn test_place_switches_retries_without_free_room() {
        let constraints = CountConstraints::new(5, 0, 1);
        let config = GenerationConfig::new(10);
        let mut rng = create_rng(&config);
        let mut attempt = branching_attempt(&constraints, &config, &mut rng);
        attempt.dungeon.room_mut(4).unwrap().item = Some(Symbol::boss());

        // Only the start room lies outside the base room's subtree
        assert!(matches!(attempt.place_switches(), Err(StepFailure::Retry(_))));
        assert!(attempt.dungeon.find_switch().is_none());
    }
}
