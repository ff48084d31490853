//! Activation functions.

use crate::ActivationFn;

/// Smallest distance a predicted probability is allowed to get to 0 or 1.
///
/// `f32` can't represent `1.0 - 1e-7` exactly; it rounds to the next float
/// below 1.0, which is still strictly less than 1.
pub const PROBABILITY_EPSILON: f32 = 1e-7;

/// Clamp a probability into the open interval `(0, 1)` so that its logarithm,
/// and the logarithm of its complement, are finite.
pub fn clamp_probability(p: f32) -> f32 {
    p.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON)
}

/// The logistic function, a handy symmetric, s-shaped function.
#[derive(Debug, Clone, Copy)]
pub struct Sigmoid;

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

impl ActivationFn for Sigmoid {
    fn f(self, x: f32) -> f32 {
        sigmoid(x)
    }

    fn df(self, x: f32) -> f32 {
        let y = sigmoid(x);
        y * (1.0 - y)
    }
}
