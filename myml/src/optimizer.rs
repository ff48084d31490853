//! Gradient-descent update rules.

use ndarray::prelude::*;
use ndarray::Zip;

use crate::traits::Optimizer;

/// Plain stochastic gradient descent: `p -= rate * g`.
#[derive(Debug, Clone)]
pub struct Sgd {
    learning_rate: f32,
}

impl Sgd {
    pub fn new(learning_rate: f32) -> Self {
        Sgd { learning_rate }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, _row: usize, mut params: ArrayViewMut1<'_, f32>, grad: ArrayView1<'_, f32>) {
        assert_eq!(params.len(), grad.len());
        params.scaled_add(-self.learning_rate, &grad);
    }
}

/// Adagrad: each parameter gets its own learning rate, which shrinks as the
/// squared gradients for that parameter accumulate.
///
/// `accum` has the same shape as the table being trained.
#[derive(Debug, Clone)]
pub struct Adagrad {
    learning_rate: f32,
    epsilon: f32,
    accum: Array2<f32>,
}

impl Adagrad {
    pub const DEFAULT_EPSILON: f32 = 1e-7;

    pub fn new(num_rows: usize, dim: usize, learning_rate: f32) -> Self {
        Adagrad {
            learning_rate,
            epsilon: Self::DEFAULT_EPSILON,
            accum: Array2::zeros((num_rows, dim)),
        }
    }

    /// Squared gradients accumulated so far for one row.
    pub fn accumulated(&self, row: usize) -> ArrayView1<'_, f32> {
        self.accum.row(row)
    }
}

impl Optimizer for Adagrad {
    fn step(&mut self, row: usize, params: ArrayViewMut1<'_, f32>, grad: ArrayView1<'_, f32>) {
        assert_eq!(params.len(), grad.len());
        let rate = self.learning_rate;
        let epsilon = self.epsilon;
        Zip::from(params)
            .and(self.accum.row_mut(row))
            .and(grad)
            .for_each(|p, acc, &g| {
                *acc += g * g;
                *p -= rate * g / (acc.sqrt() + epsilon);
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sgd_step() {
        let mut p = array![1.0f32, 2.0];
        let g = array![0.5f32, -1.0];
        let mut sgd = Sgd::new(0.1);
        sgd.step(0, p.view_mut(), g.view());
        assert!((p[0] - 0.95).abs() < 1e-6);
        assert!((p[1] - 2.1).abs() < 1e-6);
    }

    #[test]
    fn adagrad_first_step_is_learning_rate() {
        // On the first step, g / sqrt(g^2) = sign(g), whatever the scale.
        let mut table = Array2::<f32>::zeros((3, 2));
        let mut opt = Adagrad::new(3, 2, 0.5);
        let g = array![1e-3f32, -40.0];
        opt.step(2, table.row_mut(2), g.view());
        assert!((table[[2, 0]] + 0.5).abs() < 1e-3);
        assert!((table[[2, 1]] - 0.5).abs() < 1e-3);
        assert_eq!(table.row(0), array![0.0f32, 0.0]);
        assert_eq!(opt.accumulated(1), array![0.0f32, 0.0]);
    }

    #[test]
    fn adagrad_steps_shrink() {
        let mut p = array![0.0f32];
        let mut opt = Adagrad::new(1, 1, 1.0);
        let g = array![1.0f32];
        let mut last = f32::INFINITY;
        for _ in 0..5 {
            let before = p[0];
            opt.step(0, p.view_mut(), g.view());
            let size = before - p[0];
            assert!(size > 0.0 && size < last);
            last = size;
        }
    }
}
