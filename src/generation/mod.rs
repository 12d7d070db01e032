//! # Generation Module
//!
//! Procedural construction of lock-and-key dungeons.
//!
//! The [`LockAndKeyGenerator`] asks a [`DungeonConstraints`](crate::DungeonConstraints)
//! provider for structure and geometry, builds a room graph step by step, and
//! restarts the whole attempt whenever a step cannot be completed. The
//! tuning knobs of that process live in [`GenerationConfig`].

pub mod intensity;
pub mod levels;
pub mod lock_and_key;
pub mod switches;

pub use levels::*;
pub use lock_and_key::*;

use crate::config::DEFAULT_MAX_RETRIES;
use crate::{LockworkError, LockworkResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for dungeon generation.
///
/// Controls the seed, the retry budget, the boss/goal layout and the
/// probabilities used while placing rooms, switch locks and intensities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Whole-attempt retries allowed before generation fails
    pub max_retries: u32,
    /// Whether the boss room is locked behind the last key
    pub boss_room_locked: bool,
    /// Whether a goal room is placed behind the boss room
    pub generate_goal: bool,
    /// Chance of growing from a room at the current key level rather than
    /// from anywhere in the dungeon (0.0 to 1.0)
    pub same_level_parent_chance: f64,
    /// Chance of switch-locking an unlocked child edge (0.0 to 1.0)
    pub switch_lock_chance: f64,
    /// Attempts at choosing a switch room before the whole attempt is retried
    pub switch_attempts: u32,
    /// Width of the multiplicative jitter applied to each room's intensity
    pub intensity_growth_jitter: f64,
    /// Fraction by which a key level's base intensity eases off the previous
    /// level's peak
    pub intensity_ease_off: f64,
}

impl GenerationConfig {
    /// Creates the default generation configuration with the given seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockwork::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(1234);
    /// assert_eq!(config.seed, 1234);
    /// assert!(config.boss_room_locked);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_retries: DEFAULT_MAX_RETRIES,
            boss_room_locked: true,
            generate_goal: true,
            same_level_parent_chance: 0.9,
            switch_lock_chance: 0.75,
            switch_attempts: 10,
            intensity_growth_jitter: 0.1,
            intensity_ease_off: 0.2,
        }
    }

    /// Creates a configuration for tests, which gives up sooner.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            max_retries: 5,
            ..Self::new(seed)
        }
    }

    /// Checks that every probability lies in [0, 1] and that switch
    /// placement gets at least one attempt.
    pub fn validate(&self) -> LockworkResult<()> {
        let probabilities = [
            ("same_level_parent_chance", self.same_level_parent_chance),
            ("switch_lock_chance", self.switch_lock_chance),
            ("intensity_growth_jitter", self.intensity_growth_jitter),
            ("intensity_ease_off", self.intensity_ease_off),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(LockworkError::InvalidConfig(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }

        if self.switch_attempts == 0 {
            return Err(LockworkError::InvalidConfig(
                "switch_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> LockworkResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> LockworkResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Creates a seeded random number generator from the config.
pub fn create_rng(config: &GenerationConfig) -> StdRng {
    StdRng::seed_from_u64(config.seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new(12345);
        assert_eq!(config.seed, 12345);
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert!(config.generate_goal);
        assert_eq!(config.switch_attempts, 10);
    }

    #[test]
    fn test_testing_config() {
        let config = GenerationConfig::for_testing(9);
        assert_eq!(config.seed, 9);
        assert!(config.max_retries < DEFAULT_MAX_RETRIES);
        assert_eq!(config.switch_lock_chance, GenerationConfig::new(9).switch_lock_chance);
    }

    #[test]
    fn test_config_validation() {
        let mut config = GenerationConfig::default();
        assert!(config.validate().is_ok());

        config.switch_lock_chance = 1.5;
        assert!(matches!(config.validate(), Err(LockworkError::InvalidConfig(_))));

        let mut config = GenerationConfig::default();
        config.switch_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::default();
        config.intensity_ease_off = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serde() {
        let config = GenerationConfig::new(77);
        let json = serde_json::to_string(&config).unwrap();
        let back: GenerationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_rng_is_reproducible() {
        let config = GenerationConfig::new(12345);
        let mut a = create_rng(&config);
        let mut b = create_rng(&config);
        let first: Vec<u32> = (0..8).map(|_| a.gen()).collect();
        let second: Vec<u32> = (0..8).map(|_| b.gen()).collect();
        assert_eq!(first, second);
    }
}
