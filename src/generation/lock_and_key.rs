//! # Lock-and-Key Generation
//!
//! Builds a dungeon as a tree of rooms partitioned into key levels, then
//! places the boss and goal, an optional switch, intensities and keys, and
//! finally adds extra edges to make the graph less linear.
//!
//! Every step may fail locally. A failed step aborts the whole attempt, which
//! is discarded and started again with the same random number generator, up
//! to the configured retry budget. Running out of free rooms while placing
//! rooms only restarts room placement, with fewer rooms per lock.

use super::{create_rng, GenerationConfig, Generator, KeyLevelRoomMapping};
use crate::config::MAX_KEYS;
use crate::constraints::DungeonConstraints;
use crate::dungeon::{Dungeon, Room, RoomId};
use crate::puzzle::{Condition, Symbol};
use crate::utils::{all_rooms_reachable, weighted_choice};
use crate::{LockworkError, LockworkResult};
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

/// Why a generation step could not be completed.
#[derive(Debug)]
pub(crate) enum StepFailure {
    /// Abandon the attempt and start a new one
    Retry(&'static str),
    /// No room with a free adjacent slot is left; restart room placement
    OutOfRooms,
    /// Unrecoverable; surfaced to the caller as-is
    Fatal(LockworkError),
}

impl From<LockworkError> for StepFailure {
    fn from(error: LockworkError) -> Self {
        StepFailure::Fatal(error)
    }
}

pub(crate) type StepResult<T> = Result<T, StepFailure>;

/// The default lock-and-key dungeon generator.
///
/// # Examples
///
/// ```
/// use lockwork::{CountConstraints, GenerationConfig, LockAndKeyGenerator, Generator};
///
/// let generator = LockAndKeyGenerator::new(CountConstraints::new(30, 3, 0));
/// let config = GenerationConfig::new(2024);
/// let dungeon = generator.generate_seeded(&config)?;
///
/// generator.validate(&dungeon, &config)?;
/// assert_eq!(dungeon.rooms().filter(|room| room.item.is_some_and(|i| i.is_key())).count(), 3);
/// # Ok::<(), lockwork::LockworkError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LockAndKeyGenerator<C> {
    constraints: C,
}

impl<C: DungeonConstraints> LockAndKeyGenerator<C> {
    pub fn new(constraints: C) -> Self {
        Self { constraints }
    }

    pub fn constraints(&self) -> &C {
        &self.constraints
    }

    /// Generates a dungeon using a random number generator seeded from the config.
    pub fn generate_seeded(&self, config: &GenerationConfig) -> LockworkResult<Dungeon> {
        let mut rng = create_rng(config);
        self.generate(config, &mut rng)
    }

    fn check_limits(&self) -> LockworkResult<()> {
        if self.constraints.max_keys() > MAX_KEYS {
            return Err(LockworkError::InvalidConfig(format!(
                "At most {} keys are supported, constraints ask for {}",
                MAX_KEYS,
                self.constraints.max_keys()
            )));
        }
        if self.constraints.initial_rooms().is_empty() {
            return Err(LockworkError::InvalidConfig(
                "Constraints offer no initial rooms".to_string(),
            ));
        }
        Ok(())
    }
}

impl<C: DungeonConstraints> Generator<Dungeon> for LockAndKeyGenerator<C> {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> LockworkResult<Dungeon> {
        config.validate()?;
        self.check_limits()?;
        info!("Generating dungeon with seed: {}", config.seed);

        let mut attempt = 0;
        loop {
            let result = Attempt::new(&self.constraints, config, rng).run();
            match result {
                Ok(dungeon) => {
                    info!(
                        "Generated {} rooms after {} retries",
                        dungeon.room_count(),
                        attempt
                    );
                    return Ok(dungeon);
                }
                Err(StepFailure::Fatal(error)) => return Err(error),
                Err(StepFailure::Retry(reason)) => {
                    attempt += 1;
                    if attempt > config.max_retries {
                        return Err(LockworkError::GenerationFailed(format!(
                            "Gave up after {} retries, last failure: {}",
                            config.max_retries, reason
                        )));
                    }
                    debug!("Retrying dungeon generation: {}", reason);
                }
                Err(StepFailure::OutOfRooms) => {
                    return Err(LockworkError::GenerationFailed(
                        "Ran out of rooms outside room placement".to_string(),
                    ));
                }
            }
        }
    }

    fn validate(&self, dungeon: &Dungeon, _config: &GenerationConfig) -> LockworkResult<()> {
        let count =
            |predicate: fn(&Room) -> bool| dungeon.rooms().filter(|r| predicate(r)).count();
        let failed = |message: String| Err(LockworkError::GenerationFailed(message));

        if count(Room::is_start) != 1 {
            return failed("Dungeon must have exactly one start room".to_string());
        }
        if count(Room::is_boss) != 1 {
            return failed("Dungeon must have exactly one boss room".to_string());
        }
        if count(Room::is_goal) > 1 || count(Room::is_switch) > 1 {
            return failed("Dungeon has more than one goal or switch room".to_string());
        }

        let keys: BTreeSet<u32> = dungeon
            .rooms()
            .filter_map(|room| room.item.and_then(Symbol::key_index))
            .collect();
        if keys.len() != self.constraints.max_keys() {
            return failed(format!(
                "Dungeon has {} keys, expected {}",
                keys.len(),
                self.constraints.max_keys()
            ));
        }

        if let Some(room) = dungeon
            .rooms()
            .find(|room| !(0.0..=1.0).contains(&room.intensity))
        {
            return failed(format!(
                "Room {} has intensity {} outside [0, 1]",
                room.id, room.intensity
            ));
        }

        if !all_rooms_reachable(dungeon) {
            return failed("Some rooms cannot be reached from the entrance".to_string());
        }

        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "LockAndKeyGenerator"
    }
}

/// State of a single generation attempt.
///
/// Owns the partial dungeon, which is only handed out once every step has
/// succeeded.
pub(crate) struct Attempt<'a, C> {
    pub(crate) constraints: &'a C,
    pub(crate) config: &'a GenerationConfig,
    pub(crate) rng: &'a mut StdRng,
    pub(crate) dungeon: Dungeon,
    pub(crate) levels: KeyLevelRoomMapping,
}

impl<'a, C: DungeonConstraints> Attempt<'a, C> {
    pub(crate) fn new(
        constraints: &'a C,
        config: &'a GenerationConfig,
        rng: &'a mut StdRng,
    ) -> Self {
        Self {
            constraints,
            config,
            rng,
            dungeon: Dungeon::new(),
            levels: KeyLevelRoomMapping::new(),
        }
    }

    /// Runs every step in order and returns the finished dungeon.
    pub(crate) fn run(mut self) -> StepResult<Dungeon> {
        self.build_tree()?;
        self.place_boss_goal_rooms()?;
        self.place_switches()?;
        self.compute_intensity()?;
        self.place_keys()?;

        if self.levels.key_count().saturating_sub(1) != self.constraints.max_keys() {
            return Err(StepFailure::Fatal(LockworkError::GenerationFailed(format!(
                "Placed {} key levels but constraints require {} keys",
                self.levels.key_count().saturating_sub(1),
                self.constraints.max_keys()
            ))));
        }

        self.graphify()?;

        if !self.constraints.is_acceptable(&self.dungeon) {
            return Err(StepFailure::Retry("constraints rejected the dungeon"));
        }

        Ok(self.dungeon)
    }

    /// Places the entrance and the rest of the room tree, shrinking the
    /// number of rooms per lock each time placement runs out of rooms.
    fn build_tree(&mut self) -> StepResult<()> {
        let max_keys = self.constraints.max_keys();
        let mut rooms_per_lock = if max_keys > 0 {
            self.constraints.max_rooms() / max_keys
        } else {
            self.constraints.max_rooms()
        };

        let entrance = self.choose_entrance()?;
        loop {
            self.dungeon = Dungeon::new();
            self.levels = KeyLevelRoomMapping::new();
            self.init_entrance_room(entrance)?;

            match self.place_rooms(rooms_per_lock) {
                Ok(()) => return Ok(()),
                Err(StepFailure::OutOfRooms) => {
                    // Happens when constraints force locks early, leaving too
                    // few rooms to build up to them
                    debug!("Ran out of rooms. rooms_per_lock was {}", rooms_per_lock);
                    rooms_per_lock = rooms_per_lock * max_keys / (max_keys + 1);
                    debug!("rooms_per_lock is now {}", rooms_per_lock);

                    if rooms_per_lock == 0 {
                        return Err(StepFailure::Fatal(LockworkError::GenerationFailed(
                            "Failed to place rooms. Is the boss room locked with too few rooms or keys?"
                                .to_string(),
                        )));
                    }
                }
                Err(other) => return Err(other),
            }
        }
    }

    fn choose_entrance(&mut self) -> StepResult<RoomId> {
        let candidates = self.constraints.initial_rooms();
        candidates.choose(self.rng).copied().ok_or_else(|| {
            StepFailure::Fatal(LockworkError::InvalidConfig(
                "Constraints offer no initial rooms".to_string(),
            ))
        })
    }

    fn init_entrance_room(&mut self, id: RoomId) -> StepResult<()> {
        let entrance = Room::new(
            id,
            self.constraints.coords(id),
            None,
            Some(Symbol::start()),
            Condition::empty(),
        )?;
        self.dungeon.add(entrance)?;
        self.levels.add_room(0, id);
        Ok(())
    }

    /// Whether to introduce a new lock (and key level) now.
    ///
    /// The last key is held back for the boss room when it is locked.
    fn should_add_new_lock(
        &self,
        key_level: usize,
        num_rooms: usize,
        rooms_per_lock: usize,
    ) -> bool {
        let mut usable_keys = self.constraints.max_keys();
        if self.config.boss_room_locked {
            usable_keys = usable_keys.saturating_sub(1);
        }
        num_rooms >= rooms_per_lock && key_level < usable_keys
    }

    /// Picks a random room among `candidates` that has at least one free
    /// adjacent slot.
    fn choose_room_with_free_edge(
        &mut self,
        mut candidates: Vec<RoomId>,
        key_level: usize,
    ) -> Option<RoomId> {
        candidates.shuffle(self.rng);
        candidates.into_iter().find(|&id| {
            self.constraints
                .adjacent_rooms(id, key_level)
                .iter()
                .any(|&(_, next)| !self.dungeon.contains(next))
        })
    }

    /// Picks a free slot adjacent to `room`, weighted by the constraints.
    fn choose_free_edge(&mut self, room: RoomId, key_level: usize) -> StepResult<RoomId> {
        let free: Vec<(f64, RoomId)> = self
            .constraints
            .adjacent_rooms(room, key_level)
            .into_iter()
            .filter(|&(_, next)| !self.dungeon.contains(next))
            .collect();
        weighted_choice(self.rng, &free).ok_or(StepFailure::Retry("room has no free edge"))
    }

    /// Fills the dungeon with rooms and doors, some of them locked. Keys are
    /// placed later.
    fn place_rooms(&mut self, rooms_per_lock: usize) -> StepResult<()> {
        let max_rooms = self.constraints.max_rooms();
        // Number of keys needed to reach the next room
        let mut key_level = 0;
        let mut latest_key: Option<Symbol> = None;
        // What the player must hold to reach the next room
        let mut cond = Condition::empty();

        while self.dungeon.room_count() < max_rooms {
            let mut do_lock = false;

            let level_rooms = self.levels.rooms(key_level).len();
            if self.should_add_new_lock(key_level, level_rooms, rooms_per_lock) {
                let key = Symbol::key(key_level as u32);
                key_level += 1;
                latest_key = Some(key);
                cond = cond.and(key);
                do_lock = true;
                trace!("Introduced lock {} at key level {}", key, key_level);
            }

            let mut parent = None;
            if !do_lock && self.rng.gen_bool(self.config.same_level_parent_chance) {
                let candidates = self.levels.rooms(key_level).to_vec();
                parent = self.choose_room_with_free_edge(candidates, key_level);
            }
            if parent.is_none() {
                let candidates = self.dungeon.room_ids();
                parent = self.choose_room_with_free_edge(candidates, key_level);
                do_lock = true;
            }
            let parent = parent.ok_or(StepFailure::OutOfRooms)?;

            let next_id = self.choose_free_edge(parent, key_level)?;
            let coords = self.constraints.coords(next_id);
            let room = Room::new(next_id, coords, Some(parent), None, cond)?;

            let parent_precond = self
                .dungeon
                .room(parent)
                .map(|room| room.precond)
                .ok_or(StepFailure::Retry("parent room vanished"))?;
            // A lock the parent already satisfies would gate nothing
            let symbol = latest_key.filter(|&key| do_lock && !parent_precond.contains(key));

            self.dungeon.add(room)?;
            self.room_mut(parent)?.add_child(next_id);
            self.dungeon.link(parent, next_id, symbol)?;
            self.levels.add_room(key_level, next_id);
        }

        Ok(())
    }

    /// Places the boss and goal rooms on a dead end and moves them into the
    /// final key level.
    fn place_boss_goal_rooms(&mut self) -> StepResult<()> {
        let generate_goal = self.config.generate_goal;
        let goal = Symbol::goal();
        let boss = Symbol::boss();

        let mut possible_goal_rooms = Vec::new();
        for room in self.dungeon.rooms() {
            if !room.children().is_empty() || room.item.is_some() {
                continue;
            }
            let Some(parent) = room.parent().and_then(|id| self.dungeon.room(id)) else {
                continue;
            };
            // The boss takes over the parent, which must not be the entrance
            if generate_goal
                && (parent.children().len() != 1
                    || parent.item.is_some()
                    || !parent.precond.implies(&room.precond))
            {
                continue;
            }
            let fits = if generate_goal {
                self.constraints.room_can_fit_item(room.id, goal)
                    && self.constraints.room_can_fit_item(parent.id, boss)
            } else {
                self.constraints.room_can_fit_item(room.id, boss)
            };
            if fits {
                possible_goal_rooms.push(room.id);
            }
        }

        let leaf = *possible_goal_rooms
            .choose(self.rng)
            .ok_or(StepFailure::Retry("no dead end for the boss room"))?;

        let (boss_id, goal_id) = if generate_goal {
            let parent = self
                .dungeon
                .room(leaf)
                .and_then(Room::parent)
                .ok_or(StepFailure::Retry("goal room has no parent"))?;
            (parent, Some(leaf))
        } else {
            (leaf, None)
        };

        if let Some(goal_id) = goal_id {
            self.set_item(goal_id, goal)?;
        }
        self.set_item(boss_id, boss)?;
        trace!("Placed boss in room {} and goal in {:?}", boss_id, goal_id);

        let boss_room = self
            .dungeon
            .room(boss_id)
            .ok_or(StepFailure::Retry("boss room vanished"))?;
        let boss_parent = boss_room.parent().ok_or(StepFailure::Retry("boss room has no parent"))?;
        let old_key_level = boss_room.precond.key_level();
        let new_key_level = self.levels.key_count().min(self.constraints.max_keys());

        if old_key_level != new_key_level {
            if let Some(goal_id) = goal_id {
                self.levels.remove_room(old_key_level, goal_id);
            }
            self.levels.remove_room(old_key_level, boss_id);
            if let Some(goal_id) = goal_id {
                self.levels.add_room(new_key_level, goal_id);
            }
            self.levels.add_room(new_key_level, boss_id);

            let boss_key = match new_key_level {
                0 => None,
                level => Some(Symbol::key(level as u32 - 1)),
            };
            let precond = match boss_key {
                Some(key) => boss_room.precond.and(key),
                None => boss_room.precond,
            };

            self.room_mut(boss_id)?.precond = precond;
            if let Some(goal_id) = goal_id {
                self.room_mut(goal_id)?.precond = precond;
            }

            self.dungeon.link(boss_parent, boss_id, boss_key)?;
            if let Some(goal_id) = goal_id {
                self.dungeon.link(boss_id, goal_id, None)?;
            }
        }

        Ok(())
    }

    /// Places each level's key in that level's most intense free room.
    fn place_keys(&mut self) -> StepResult<()> {
        for key in 0..self.levels.key_count().saturating_sub(1) {
            let mut rooms = self.levels.rooms(key).to_vec();
            rooms.shuffle(self.rng);
            // Stable sort keeps the shuffled order among equal intensities
            rooms.sort_by(|a, b| {
                let intensity =
                    |id: &RoomId| self.dungeon.room(*id).map_or(0.0, |room| room.intensity);
                intensity(b).total_cmp(&intensity(a))
            });
            *self.levels.rooms_mut(key) = rooms.clone();

            let key_symbol = Symbol::key(key as u32);
            let target = rooms.into_iter().find(|&id| {
                self.dungeon.room(id).is_some_and(|room| room.item.is_none())
                    && self.constraints.room_can_fit_item(id, key_symbol)
            });

            match target {
                Some(id) => self.set_item(id, key_symbol)?,
                None => return Err(StepFailure::Retry("no room can hold a key")),
            }
        }
        Ok(())
    }

    /// Randomly links adjacent rooms to make the dungeon less tree-like,
    /// without letting a new edge skip a lock.
    fn graphify(&mut self) -> StepResult<()> {
        for id in self.dungeon.room_ids() {
            let Some(room) = self.dungeon.room(id) else {
                continue;
            };
            if room.is_goal() || room.is_boss() {
                continue;
            }

            // Key level does not matter here; the precondition checks below
            // keep new edges from trivializing the puzzle
            for (_, next_id) in self.constraints.adjacent_rooms(id, usize::MAX) {
                let Some(room) = self.dungeon.room(id) else {
                    break;
                };
                if room.edge(next_id).is_some() {
                    continue;
                }
                let Some(next_room) = self.dungeon.room(next_id) else {
                    continue;
                };
                if next_room.is_goal() || next_room.is_boss() {
                    continue;
                }

                let forward_implies = room.precond.implies(&next_room.precond);
                let backward_implies = next_room.precond.implies(&room.precond);
                let probability = self.constraints.edge_graphify_probability(id, next_id);

                if forward_implies && backward_implies {
                    // Both rooms are at the same key level
                    if self.rng.gen::<f64>() >= probability {
                        continue;
                    }
                    self.dungeon.link(id, next_id, None)?;
                } else {
                    let Some(difference) = room.precond.single_symbol_difference(&next_room.precond)
                    else {
                        continue;
                    };
                    if !difference.is_switch_state() && self.rng.gen::<f64>() >= probability {
                        continue;
                    }
                    self.dungeon.link(id, next_id, Some(difference))?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn room_mut(&mut self, id: RoomId) -> StepResult<&mut Room> {
        self.dungeon
            .room_mut(id)
            .ok_or(StepFailure::Retry("room missing from dungeon"))
    }

    fn set_item(&mut self, id: RoomId, item: Symbol) -> StepResult<()> {
        self.room_mut(id)?.item = Some(item);
        Ok(())
    }
}
