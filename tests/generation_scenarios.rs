//! End-to-end generation scenarios across the bundled constraint providers.

use lockwork::{
    is_completable, reachable_rooms, ColorMap, Coord, CountConstraints, Dungeon,
    DungeonConstraints, FreeformConstraints, GenerationConfig, Generator, LockAndKeyGenerator,
    LockworkError, LockworkResult, Room, RoomId, SpaceConstraints, SpaceMap, Symbol,
};
use std::collections::BTreeSet;

fn generate(rooms: usize, keys: usize, switches: usize, seed: u64) -> LockworkResult<Dungeon> {
    let generator = LockAndKeyGenerator::new(CountConstraints::new(rooms, keys, switches));
    let config = GenerationConfig::new(seed);
    let dungeon = generator.generate_seeded(&config)?;
    generator.validate(&dungeon, &config)?;
    Ok(dungeon)
}

/// Checks the structural guarantees every finished dungeon must hold.
fn assert_well_formed(dungeon: &Dungeon, max_keys: usize) {
    let count = |predicate: fn(&Room) -> bool| dungeon.rooms().filter(|r| predicate(r)).count();
    assert_eq!(count(Room::is_start), 1);
    assert_eq!(count(Room::is_boss), 1);
    assert!(count(Room::is_goal) <= 1);
    assert!(count(Room::is_switch) <= 1);

    let keys: Vec<u32> = dungeon
        .rooms()
        .filter_map(|room| room.item.and_then(Symbol::key_index))
        .collect();
    let distinct: BTreeSet<u32> = keys.iter().copied().collect();
    assert_eq!(keys.len(), max_keys, "each key is placed once");
    assert_eq!(distinct, (0..max_keys as u32).collect());

    for room in dungeon.rooms() {
        if room.is_boss() {
            assert_eq!(room.intensity, 1.0);
        } else if room.is_goal() {
            assert_eq!(room.intensity, 0.0);
        } else {
            assert!((0.0..=0.99).contains(&room.intensity), "room {}", room.id);
        }

        for edge in room.edges() {
            let other = dungeon.room(edge.target).expect("edge target exists");
            // Doors are symmetric
            assert_eq!(other.edge(room.id).map(|e| e.symbol), Some(edge.symbol));

            match edge.symbol {
                // A lock separates a room that needs its symbol from one that does not
                Some(symbol) => {
                    assert!(room.precond.contains(symbol) != other.precond.contains(symbol));
                }
                None => {
                    assert!(room.precond.implies(&other.precond));
                    assert!(other.precond.implies(&room.precond));
                }
            }
        }
    }

    assert!(is_completable(dungeon));
    assert_eq!(reachable_rooms(dungeon).len(), dungeon.room_count());
}

#[test]
fn test_grid_dungeon_with_keys() -> LockworkResult<()> {
    for seed in [1, 2, 3, 42, 1000] {
        let dungeon = generate(40, 3, 0, seed)?;
        assert_eq!(dungeon.room_count(), 40);
        assert!(dungeon.find_switch().is_none());
        assert_well_formed(&dungeon, 3);
    }
    Ok(())
}

#[test]
fn test_boss_guards_goal() -> LockworkResult<()> {
    let dungeon = generate(30, 2, 0, 77)?;
    let boss = dungeon.find_boss().expect("boss room");
    let goal = dungeon.find_goal().expect("goal room");

    assert_eq!(goal.parent(), Some(boss.id));
    assert_eq!(boss.children(), &[goal.id]);
    assert!(boss.precond.contains(Symbol::key(1)));
    assert_eq!(goal.precond, boss.precond);

    let path = dungeon.solution_path();
    assert_eq!(path.first(), Some(&goal.id));
    assert_eq!(path.get(1), Some(&boss.id));
    assert_eq!(dungeon.room(*path.last().unwrap()).map(|r| r.is_start()), Some(true));
    Ok(())
}

#[test]
fn test_grid_dungeon_with_switch() -> LockworkResult<()> {
    for seed in [5, 6, 7] {
        let generator = LockAndKeyGenerator::new(CountConstraints::new(40, 2, 1));
        let config = GenerationConfig {
            max_retries: 100,
            ..GenerationConfig::new(seed)
        };
        let dungeon = generator.generate_seeded(&config)?;
        generator.validate(&dungeon, &config)?;

        assert!(dungeon.find_switch().is_some());
        let switch_locks = dungeon
            .rooms()
            .flat_map(|room| room.edges())
            .filter(|edge| edge.symbol.is_some_and(Symbol::is_switch_state))
            .count();
        assert!(switch_locks > 0);
        assert_well_formed(&dungeon, 2);
    }
    Ok(())
}

#[test]
fn test_without_goal_or_boss_lock() -> LockworkResult<()> {
    let generator = LockAndKeyGenerator::new(CountConstraints::new(30, 2, 0));
    let config = GenerationConfig {
        generate_goal: false,
        boss_room_locked: false,
        ..GenerationConfig::new(11)
    };
    let dungeon = generator.generate_seeded(&config)?;
    generator.validate(&dungeon, &config)?;

    assert!(dungeon.find_goal().is_none());
    let boss = dungeon.find_boss().expect("boss room");
    assert!(boss.children().is_empty());
    assert_eq!(dungeon.solution_path().first(), Some(&boss.id));
    assert_well_formed(&dungeon, 2);
    Ok(())
}

#[test]
fn test_no_keys() -> LockworkResult<()> {
    let dungeon = generate(15, 0, 0, 4)?;
    assert!(dungeon
        .rooms()
        .flat_map(|room| room.edges())
        .all(|edge| edge.symbol.is_none()));
    assert_well_formed(&dungeon, 0);
    Ok(())
}

#[test]
fn test_same_seed_same_dungeon() -> LockworkResult<()> {
    let first = generate(35, 3, 1, 2024);
    let second = generate(35, 3, 1, 2024);
    match (first, second) {
        (Ok(a), Ok(b)) => assert_eq!(a.to_json_pretty()?, b.to_json_pretty()?),
        (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
        _ => panic!("same seed produced different outcomes"),
    }
    Ok(())
}

#[test]
fn test_different_seeds_differ() -> LockworkResult<()> {
    let a = generate(40, 3, 0, 1)?;
    let b = generate(40, 3, 0, 2)?;
    assert_ne!(a.to_json_pretty()?, b.to_json_pretty()?);
    Ok(())
}

/// Offers rooms but never lets any of them neighbour another.
struct IsolatedRooms;

impl DungeonConstraints for IsolatedRooms {
    fn max_rooms(&self) -> usize {
        10
    }
    fn max_keys(&self) -> usize {
        2
    }
    fn max_switches(&self) -> usize {
        0
    }
    fn initial_rooms(&self) -> Vec<RoomId> {
        vec![0]
    }
    fn adjacent_rooms(&self, _id: RoomId, _key_level: usize) -> Vec<(f64, RoomId)> {
        Vec::new()
    }
    fn edge_graphify_probability(&self, _id: RoomId, _next_id: RoomId) -> f64 {
        0.2
    }
    fn coords(&self, id: RoomId) -> Vec<Coord> {
        vec![Coord::new(id as i32, 0)]
    }
    fn is_acceptable(&self, _dungeon: &Dungeon) -> bool {
        true
    }
    fn room_can_fit_item(&self, _id: RoomId, _item: Symbol) -> bool {
        true
    }
}

#[test]
fn test_no_adjacency_fails_fatally() {
    let generator = LockAndKeyGenerator::new(IsolatedRooms);
    let result = generator.generate_seeded(&GenerationConfig::new(1));
    assert!(matches!(result, Err(LockworkError::GenerationFailed(_))));
}

/// Accepts nothing, so every attempt is retried.
struct NeverAcceptable(CountConstraints);

impl DungeonConstraints for NeverAcceptable {
    fn max_rooms(&self) -> usize {
        self.0.max_rooms()
    }
    fn max_keys(&self) -> usize {
        self.0.max_keys()
    }
    fn max_switches(&self) -> usize {
        self.0.max_switches()
    }
    fn initial_rooms(&self) -> Vec<RoomId> {
        self.0.initial_rooms()
    }
    fn adjacent_rooms(&self, id: RoomId, key_level: usize) -> Vec<(f64, RoomId)> {
        self.0.adjacent_rooms(id, key_level)
    }
    fn edge_graphify_probability(&self, id: RoomId, next_id: RoomId) -> f64 {
        self.0.edge_graphify_probability(id, next_id)
    }
    fn coords(&self, id: RoomId) -> Vec<Coord> {
        self.0.coords(id)
    }
    fn is_acceptable(&self, _dungeon: &Dungeon) -> bool {
        false
    }
    fn room_can_fit_item(&self, id: RoomId, item: Symbol) -> bool {
        self.0.room_can_fit_item(id, item)
    }
}

#[test]
fn test_retries_are_bounded() {
    let generator = LockAndKeyGenerator::new(NeverAcceptable(CountConstraints::new(20, 2, 0)));
    let config = GenerationConfig::for_testing(3);
    let result = generator.generate_seeded(&config);
    assert!(matches!(result, Err(LockworkError::GenerationFailed(_))));
}

#[test]
fn test_no_initial_rooms_is_invalid_config() {
    let map = SpaceMap::new();
    assert!(matches!(SpaceConstraints::new(map), Err(LockworkError::InvalidConfig(_))));
}

#[test]
fn test_space_map_dungeon() -> LockworkResult<()> {
    let rows = [
        "########",
        "########",
        "###..###",
        "###..###",
        "########",
        "########",
    ];
    let mut constraints = SpaceConstraints::new(SpaceMap::from_rows(&rows))?;
    constraints.set_max_rooms(30);
    constraints.set_max_keys(2);
    constraints.set_max_switches(0);

    let generator = LockAndKeyGenerator::new(constraints);
    let config = GenerationConfig::new(99);
    let dungeon = generator.generate_seeded(&config)?;
    generator.validate(&dungeon, &config)?;

    assert_eq!(dungeon.room_count(), 30);
    for room in dungeon.rooms() {
        for &coord in room.coords() {
            assert!(generator.constraints().space_map().get(coord));
        }
    }
    // The entrance sits on the bottom row
    let start = dungeon.find_start().expect("start room");
    assert_eq!(start.center().y, 5);
    assert_well_formed(&dungeon, 2);
    Ok(())
}

#[test]
fn test_freeform_dungeon() -> LockworkResult<()> {
    let rows = [
        "00112233", "00112233", "44556677", "44556677", "8899aabb", "8899aabb", "ccddeeff",
        "ccddeeff",
    ];
    let mut constraints = FreeformConstraints::new(&ColorMap::from_rows(&rows))?;
    constraints.set_max_keys(2);

    let generator = LockAndKeyGenerator::new(constraints);
    let config = GenerationConfig {
        max_retries: 50,
        ..GenerationConfig::new(8)
    };
    let dungeon = generator.generate_seeded(&config)?;
    generator.validate(&dungeon, &config)?;

    assert_eq!(dungeon.room_count(), 16);
    assert!(dungeon.rooms().all(|room| room.coords().len() == 4));
    assert_eq!(dungeon.bounds().map(|b| (b.width(), b.height())), Some((8, 8)));
    assert_well_formed(&dungeon, 2);
    Ok(())
}

#[test]
fn test_json_export_to_file() -> LockworkResult<()> {
    let dungeon = generate(20, 2, 0, 31)?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("dungeon.json");

    std::fs::write(&path, dungeon.to_json_pretty()?)?;
    let loaded = Dungeon::from_json(&std::fs::read_to_string(&path)?)?;

    assert_eq!(loaded.room_ids(), dungeon.room_ids());
    for room in dungeon.rooms() {
        let copy = loaded.room(room.id).expect("room survives the round trip");
        assert_eq!(copy.item, room.item);
        assert_eq!(copy.precond, room.precond);
        assert_eq!(copy.edges(), room.edges());
        assert_eq!(copy.parent(), room.parent());
        assert_eq!(copy.coords(), room.coords());
        assert!((copy.intensity - room.intensity).abs() < 1e-12);
    }
    assert_eq!(loaded.bounds(), dungeon.bounds());
    assert_eq!(loaded.solution_path(), dungeon.solution_path());
    Ok(())
}

/// A corridor of rooms split by a river after room 3. The crossing only
/// opens once the player holds a key, so the first key level has four rooms
/// no matter how many were planned for it.
struct RiverCorridor;

impl RiverCorridor {
    const LENGTH: usize = 20;
    const RIVER: RoomId = 3;
}

impl DungeonConstraints for RiverCorridor {
    fn max_rooms(&self) -> usize {
        Self::LENGTH
    }
    fn max_keys(&self) -> usize {
        2
    }
    fn max_switches(&self) -> usize {
        0
    }
    fn initial_rooms(&self) -> Vec<RoomId> {
        vec![0]
    }
    fn adjacent_rooms(&self, id: RoomId, key_level: usize) -> Vec<(f64, RoomId)> {
        let mut neighbours = Vec::new();
        if id > 0 && (id != Self::RIVER + 1 || key_level >= 1) {
            neighbours.push((1.0, id - 1));
        }
        if id + 1 < Self::LENGTH && (id != Self::RIVER || key_level >= 1) {
            neighbours.push((1.0, id + 1));
        }
        neighbours
    }
    fn edge_graphify_probability(&self, _id: RoomId, _next_id: RoomId) -> f64 {
        0.2
    }
    fn coords(&self, id: RoomId) -> Vec<Coord> {
        vec![Coord::new(id as i32, 0)]
    }
    fn is_acceptable(&self, _dungeon: &Dungeon) -> bool {
        true
    }
    fn room_can_fit_item(&self, _id: RoomId, _item: Symbol) -> bool {
        true
    }
}

#[test]
fn test_recovers_when_first_key_level_runs_out_of_rooms() -> LockworkResult<()> {
    let generator = LockAndKeyGenerator::new(RiverCorridor);
    for seed in 0..10 {
        let config = GenerationConfig::for_testing(seed);
        let dungeon = generator.generate_seeded(&config)?;
        generator.validate(&dungeon, &config)?;

        assert_eq!(dungeon.room_count(), RiverCorridor::LENGTH);
        assert_eq!(dungeon.find_start().map(|room| room.id), Some(0));
        // Ten rooms were planned before the first lock; only four fit
        let before_river = dungeon.room(RiverCorridor::RIVER).expect("room before river");
        assert_eq!(
            before_river.edge(RiverCorridor::RIVER + 1).and_then(|edge| edge.symbol),
            Some(Symbol::key(0))
        );
        assert!((0..=RiverCorridor::RIVER)
            .filter_map(|id| dungeon.room(id))
            .all(|room| room.precond.key_level() == 0));
        assert_well_formed(&dungeon, 2);
    }
    Ok(())
}
