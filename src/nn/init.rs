//! Weight initialization for dense layers.
//!
//! - Xavier/Glorot (Glorot & Bengio, 2010) - for tanh/sigmoid activations
//! - Kaiming/He (He et al., 2015) - for `ReLU`-like activations

use rand::rngs::StdRng;
use rand::Rng;

/// Xavier uniform: U(-a, a) with a = sqrt(6 / (`fan_in` + `fan_out`)).
pub(crate) fn xavier_uniform(n: usize, fan_in: usize, fan_out: usize, rng: &mut StdRng) -> Vec<f32> {
    let a = (6.0 / (fan_in + fan_out) as f32).sqrt();
    uniform(n, a, rng)
}

/// Kaiming uniform: U(-b, b) with b = sqrt(6 / `fan_in`).
pub(crate) fn kaiming_uniform(n: usize, fan_in: usize, rng: &mut StdRng) -> Vec<f32> {
    let bound = (6.0 / fan_in as f32).sqrt();
    uniform(n, bound, rng)
}

fn uniform(n: usize, bound: f32, rng: &mut StdRng) -> Vec<f32> {
    (0..n).map(|_| rng.gen_range(-bound..bound)).collect()
}
