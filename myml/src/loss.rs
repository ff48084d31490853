//! Loss functions.

use ndarray::prelude::*;
use ndarray::Zip;

use crate::activation::clamp_probability;
use crate::traits::Loss;

/// Loss function for logistic regression. AKA binary cross-entropy.
///
/// Predictions are clamped away from 0 and 1 before taking logarithms, so the
/// loss is always finite.
#[derive(Debug, Clone, Copy)]
pub struct LogisticLoss;

impl LogisticLoss {
    /// Partial derivative of the mean loss with respect to the *logits* `z`,
    /// where `yh = sigmoid(z)`.
    ///
    /// This is `(yh - y) / n`. Unlike chaining `deriv` with the sigmoid's
    /// derivative, it does not vanish when `yh` saturates in `f32`.
    pub fn deriv_logits(&self, y: ArrayView1<'_, bool>, yh: ArrayView1<'_, f32>) -> Array1<f32> {
        assert_eq!(y.shape(), yh.shape());
        let n = y.len() as f32;
        Zip::from(&y)
            .and(yh)
            .map_collect(|&y, &yh| (yh - if y { 1.0 } else { 0.0 }) / n)
    }
}

impl<'a> Loss<Ix1, ArrayView1<'a, bool>> for LogisticLoss {
    fn loss(&self, y: ArrayView1<'a, bool>, yh: ArrayView1<'_, f32>) -> f32 {
        assert_eq!(y.shape(), yh.shape());
        Zip::from(&y)
            .and(yh)
            .map_collect(|&y, &yh| {
                let yh = clamp_probability(yh);
                let err = if y { yh } else { 1.0 - yh };
                -err.ln()
            })
            .mean()
            .unwrap_or(0.0)
    }

    // Compute partial derivative of loss with respect to yh.
    fn deriv(&self, y: ArrayView1<'a, bool>, yh: ArrayView1<'_, f32>) -> Array1<f32> {
        // When y == 0, we want the derivative of -log(1-yh)/n, or 1/(n*(1-yh)).
        // When y == 1, we want the derivative of -log(yh)/n, or -1/(n*yh).
        assert_eq!(y.shape(), yh.shape());
        let n = y.shape()[0];
        Zip::from(&y).and(yh).map_collect(|&y, &yh| {
            let yh = clamp_probability(yh);
            let d = if y { -yh } else { 1.0 - yh };
            1.0 / (n as f32 * d)
        })
    }

    fn accuracy(&self, y: ArrayView1<'a, bool>, yh: ArrayView1<'_, f32>) -> f32 {
        let n = y.shape()[0];
        if n == 0 {
            return 1.0;
        }
        let mut num_good = 0;
        Zip::from(y).and(yh).for_each(|&y, &yh| {
            if y == (yh >= 0.5) {
                num_good += 1;
            }
        });
        num_good as f32 / n as f32
    }
}
