//! Weight vector operations for neuro-evolution.
//!
//! - **Initialization**: [`random`] draws weights uniformly from `[-1, 1]`
//! - **Mutation**: [`mutate`] adds a [`pseudo_normal`] perturbation to every weight
//!
//! The perturbation is not a Gaussian sample. It is a closed-form transform of a
//! uniform draw `x` in `[-1, 1]`:
//!
//! ```text
//! p = 1 / (sigma * sqrt(2 * pi))
//! perturbation = (p - p * exp(-x^2 / (2 * sigma))) * sign(x)
//! ```
//!
//! which keeps every step small (below `p`) and symmetric around zero.

use std::f32::consts::PI;

use rand::Rng;

/// Spread of the mutation perturbation.
pub const MUTATION_SIGMA: f32 = 2.0;

/// Creates a weight vector by applying a function to each index.
///
/// # Examples
///
/// ```
/// use floodit_ai::nn::weights;
///
/// let weights = weights::from_fn(|i| i as f32 / 2.0, 3);
/// assert_eq!(weights, vec![0.0, 0.5, 1.0]);
/// ```
pub fn from_fn<F>(mut f: F, len: usize) -> Vec<f32>
where
    F: FnMut(usize) -> f32,
{
    let mut values = Vec::with_capacity(len);
    for i in 0..len {
        values.push(f(i));
    }
    values
}

/// Generates `len` weights drawn uniformly from `[-1, 1]`.
pub fn random<R>(rng: &mut R, len: usize) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    from_fn(|_| rng.random_range(-1.0..=1.0), len)
}

/// Draws one mutation step.
///
/// The result is bounded by `1 / (sigma * sqrt(2 * pi))` in absolute value.
pub fn pseudo_normal<R>(rng: &mut R, sigma: f32) -> f32
where
    R: Rng + ?Sized,
{
    let p = 1.0 / (sigma * (2.0 * PI).sqrt());
    let x: f32 = rng.random_range(-1.0..=1.0);
    let step = p - (-x * x / (2.0 * sigma)).exp() * p;
    step * x.signum()
}

/// Adds a [`pseudo_normal`] step to every weight in place.
pub fn mutate<R>(weights: &mut [f32], sigma: f32, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for w in weights {
        *w += pseudo_normal(rng, sigma);
    }
}
