//! # Random Choice
//!
//! Weighted selection over constraint-supplied candidates.

use rand::seq::SliceRandom;
use rand::Rng;

/// Picks one value from `(weight, value)` pairs with probability
/// proportional to its weight.
///
/// Non-finite and negative weights count as zero. If no candidate has a
/// positive weight the choice is uniform. Returns `None` only when `options`
/// is empty.
///
/// # Examples
///
/// ```
/// use lockwork::weighted_choice;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(1);
/// assert_eq!(weighted_choice(&mut rng, &[(0.0, 'a'), (1.0, 'b')]), Some('b'));
/// assert_eq!(weighted_choice::<_, char>(&mut rng, &[]), None);
/// ```
pub fn weighted_choice<R, T>(rng: &mut R, options: &[(f64, T)]) -> Option<T>
where
    R: Rng + ?Sized,
    T: Copy,
{
    let weight = |&(w, _): &(f64, T)| if w.is_finite() && w > 0.0 { w } else { 0.0 };

    match options.choose_weighted(rng, weight) {
        Ok(&(_, value)) => Some(value),
        Err(_) => options.choose(rng).map(|&(_, value)| value),
    }
}
