use std::fmt::Debug;

use ndarray::prelude::*;

pub trait Loss<D: Dimension, Y>: Debug {
    fn loss(&self, y: Y, yh: ArrayView<'_, f32, D>) -> f32;
    fn accuracy(&self, y: Y, yh: ArrayView<'_, f32, D>) -> f32;
    fn deriv(&self, y: Y, yh: ArrayView<'_, f32, D>) -> Array<f32, D>;
}

pub trait ActivationFn: Copy + Clone + Debug {
    fn f(self, x: f32) -> f32;
    fn df(self, x: f32) -> f32;
}

/// A rule for turning gradients into parameter updates.
///
/// Parameters live in tables with one row per item (for example one row per
/// word). The optimizer is told which row it is updating so that adaptive
/// methods can keep per-parameter state alongside the table.
pub trait Optimizer: Debug {
    /// Subtract an update derived from `grad` from `params`, which is row
    /// `row` of the table this optimizer was created for.
    ///
    /// *Panics* if `params` and `grad` differ in length.
    fn step(&mut self, row: usize, params: ArrayViewMut1<'_, f32>, grad: ArrayView1<'_, f32>);
}
