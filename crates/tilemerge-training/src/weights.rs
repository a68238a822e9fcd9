//! Weight vector operations for the evolutionary optimizer.
//!
//! - **Initialization**: [`random`] draws every weight uniformly from `[-h, h)`
//! - **Crossover**: [`uniform_crossover`] takes each weight from one of two parents
//! - **Mutation**: [`mutate`] shifts a weight by a uniform amount in `[-m, m]`
//!   with a fixed per-weight probability
//!
//! Weights are signed: features such as the distance of the largest tile from
//! the corner are expected to end up with negative weights.

use rand::Rng;
use rand_distr::Uniform;
use tilemerge_evaluator::grid_feature::FeatureWeights;

/// Creates a weight vector by applying a function to each feature index.
///
/// # Examples
///
/// ```
/// use tilemerge_training::weights;
///
/// let weights = weights::from_fn(|i| if i == 2 { 1.0 } else { 0.0 });
/// assert_eq!(weights, [0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
/// ```
pub fn from_fn<F>(f: F) -> FeatureWeights
where
    F: FnMut(usize) -> f32,
{
    std::array::from_fn(f)
}

/// Draws each weight independently and uniformly from `[-half_width, half_width)`.
///
/// # Panics
///
/// Panics if `half_width` is not a positive finite number.
pub fn random<R>(rng: &mut R, half_width: f32) -> FeatureWeights
where
    R: Rng + ?Sized,
{
    let uniform = Uniform::new(-half_width, half_width)
        .expect("half width must be positive and finite");
    from_fn(|_| rng.sample(uniform))
}

/// Builds a child whose every weight is copied from `p1` or `p2` with equal probability.
pub fn uniform_crossover<R>(p1: &FeatureWeights, p2: &FeatureWeights, rng: &mut R) -> FeatureWeights
where
    R: Rng + ?Sized,
{
    from_fn(|i| if rng.random_bool(0.5) { p1[i] } else { p2[i] })
}

/// With probability `rate`, adds a uniform offset in `[-magnitude, magnitude]` to each weight.
///
/// # Panics
///
/// Panics if `rate` is outside `[0, 1]` or `magnitude` is negative or not finite.
pub fn mutate<R>(weights: &mut FeatureWeights, magnitude: f32, rate: f64, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let offset = Uniform::new_inclusive(-magnitude, magnitude)
        .expect("mutation magnitude must be non-negative and finite");
    for w in weights {
        if rng.random_bool(rate) {
            *w += rng.sample(offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use tilemerge_evaluator::grid_feature::FEATURE_COUNT;

    use super::*;

    #[test]
    fn test_random_stays_in_range() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..100 {
            for w in random(&mut rng, 0.5) {
                assert!((-0.5..0.5).contains(&w), "{w} out of range");
            }
        }
    }

    #[test]
    fn test_uniform_crossover_copies_parent_values() {
        let mut rng = Pcg32::seed_from_u64(2);
        let p1 = [1.0; FEATURE_COUNT];
        let p2 = [-1.0; FEATURE_COUNT];
        let mut seen_both = false;
        for _ in 0..20 {
            let child = uniform_crossover(&p1, &p2, &mut rng);
            assert!(child.iter().all(|&w| w == 1.0 || w == -1.0));
            seen_both |= child.contains(&1.0) && child.contains(&-1.0);
        }
        assert!(seen_both);
    }

    #[test]
    fn test_mutate_is_bounded() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..100 {
            let mut weights = [0.25; FEATURE_COUNT];
            mutate(&mut weights, 0.2, 1.0, &mut rng);
            for w in weights {
                assert!((w - 0.25).abs() <= 0.2 + f32::EPSILON, "{w} moved too far");
            }
        }
    }

    #[test]
    fn test_mutate_with_zero_rate_keeps_weights() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut weights = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        mutate(&mut weights, 0.2, 0.0, &mut rng);
        assert_eq!(weights, [0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
    }
}
