//! Embedding tables: one dense vector per item.

use ndarray::prelude::*;
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

use crate::Optimizer;

/// A dense `[num_rows × dim]` matrix of `f32`. Row `i` is the embedding of
/// item `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    table: Array2<f32>,
}

impl Embedding {
    /// A table with every element drawn uniformly from `±0.5 / dim`, the
    /// usual word2vec initialization.
    ///
    /// *Panics* if `dim` is zero.
    pub fn random<R: Rng + ?Sized>(num_rows: usize, dim: usize, rng: &mut R) -> Self {
        assert!(dim > 0, "embedding dimension must be positive");
        let r = 0.5 / dim as f32;
        Embedding {
            table: Array::random_using((num_rows, dim), Uniform::new(-r, r), rng),
        }
    }

    pub fn from_array(table: Array2<f32>) -> Self {
        Embedding { table }
    }

    pub fn num_rows(&self) -> usize {
        self.table.nrows()
    }

    /// Embedding vector length.
    pub fn dim(&self) -> usize {
        self.table.ncols()
    }

    /// *Panics* if `i` is out of range.
    pub fn row(&self, i: usize) -> ArrayView1<'_, f32> {
        self.table.row(i)
    }

    pub fn row_mut(&mut self, i: usize) -> ArrayViewMut1<'_, f32> {
        self.table.row_mut(i)
    }

    /// Dot product of row `i` of `self` and row `j` of `other`.
    pub fn dot_rows(&self, i: usize, other: &Embedding, j: usize) -> f32 {
        self.row(i).dot(&other.row(j))
    }

    /// Apply one optimizer step to row `i`.
    pub fn update_row<O: Optimizer + ?Sized>(
        &mut self,
        optimizer: &mut O,
        i: usize,
        grad: ArrayView1<'_, f32>,
    ) {
        optimizer.step(i, self.table.row_mut(i), grad);
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.table.view()
    }

    /// The elements in row-major order: row `i` is `[i * dim..(i + 1) * dim]`.
    pub fn into_flat_vec(self) -> Vec<f32> {
        if self.table.is_standard_layout() {
            self.table.into_raw_vec()
        } else {
            self.table.iter().copied().collect()
        }
    }
}
