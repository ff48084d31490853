//! The skip-gram model: two embedding tables trained with negative sampling.

use std::collections::HashMap;

use myml::activation::{clamp_probability, Sigmoid};
use myml::loss::LogisticLoss;
use myml::optimizer::{Adagrad, Sgd};
use myml::{ActivationFn, Embedding, Loss, Optimizer};
use ndarray::prelude::*;
use rand::Rng;

use crate::config::OptimizerKind;
use crate::sampler::TrainingPair;
use crate::tokenizer::Vocabulary;
use crate::vectors::Vectors;

/// How the model did on one batch, measured before its update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchStats {
    /// Mean binary cross-entropy.
    pub loss: f32,
    /// Fraction of pairs whose score lands on the right side of 0.5.
    pub accuracy: f32,
}

pub struct SkipGramModel {
    /// The learned word vectors. Row `i` is the embedding of word `i`.
    pivots: Embedding,
    /// Vectors for words in the context role. Only used to train `pivots`.
    contexts: Embedding,
    pivot_optimizer: Box<dyn Optimizer>,
    context_optimizer: Box<dyn Optimizer>,
    loss: LogisticLoss,
}

fn new_optimizer(
    kind: OptimizerKind,
    num_rows: usize,
    dim: usize,
    learning_rate: f32,
) -> Box<dyn Optimizer> {
    match kind {
        OptimizerKind::Sgd => Box::new(Sgd::new(learning_rate)),
        OptimizerKind::Adagrad => Box::new(Adagrad::new(num_rows, dim, learning_rate)),
    }
}

impl SkipGramModel {
    /// Both tables start out with small random values.
    ///
    /// *Panics* if `dim` is zero; `Config::validate` rules that out.
    pub fn new<R: Rng + ?Sized>(
        num_rows: usize,
        dim: usize,
        optimizer: OptimizerKind,
        learning_rate: f32,
        rng: &mut R,
    ) -> Self {
        SkipGramModel {
            pivots: Embedding::random(num_rows, dim, rng),
            contexts: Embedding::random(num_rows, dim, rng),
            pivot_optimizer: new_optimizer(optimizer, num_rows, dim, learning_rate),
            context_optimizer: new_optimizer(optimizer, num_rows, dim, learning_rate),
            loss: LogisticLoss,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.pivots.num_rows()
    }

    pub fn dim(&self) -> usize {
        self.pivots.dim()
    }

    pub fn pivots(&self) -> &Embedding {
        &self.pivots
    }

    pub fn contexts(&self) -> &Embedding {
        &self.contexts
    }

    /// Predicted probability that `context` really occurs near `pivot`.
    /// Always strictly between 0 and 1.
    ///
    /// *Panics* if either index is out of range.
    pub fn score(&self, pivot: usize, context: usize) -> f32 {
        clamp_probability(Sigmoid.f(self.logit(pivot, context)))
    }

    fn logit(&self, pivot: usize, context: usize) -> f32 {
        self.pivots.dot_rows(pivot, &self.contexts, context)
    }

    /// Mean binary cross-entropy of the model's predictions on `pairs`,
    /// without training.
    pub fn evaluate(&self, pairs: &[TrainingPair]) -> f32 {
        let (y, yh) = self.predict(pairs);
        self.loss.loss(y.view(), yh.view())
    }

    fn predict(&self, pairs: &[TrainingPair]) -> (Array1<bool>, Array1<f32>) {
        let y = pairs.iter().map(|p| p.label).collect::<Array1<bool>>();
        let yh = pairs
            .iter()
            .map(|p| Sigmoid.f(self.logit(p.pivot, p.context)))
            .collect::<Array1<f32>>();
        (y, yh)
    }

    /// Take one gradient step on a batch of pairs. Returns the batch's mean
    /// loss, measured before the step.
    pub fn train_batch(&mut self, pairs: &[TrainingPair]) -> f32 {
        self.train_batch_stats(pairs).loss
    }

    /// Like `train_batch`, also reporting accuracy.
    ///
    /// Gradients are summed per row over the whole batch, then each touched
    /// row is updated once.
    pub fn train_batch_stats(&mut self, pairs: &[TrainingPair]) -> BatchStats {
        if pairs.is_empty() {
            return BatchStats {
                loss: 0.0,
                accuracy: 1.0,
            };
        }
        let (y, yh) = self.predict(pairs);
        let loss = self.loss.loss(y.view(), yh.view());
        let accuracy = self.loss.accuracy(y.view(), yh.view());
        let dz = self.loss.deriv_logits(y.view(), yh.view());

        let dim = self.dim();
        let mut pivot_grads: HashMap<usize, Array1<f32>> = HashMap::new();
        let mut context_grads: HashMap<usize, Array1<f32>> = HashMap::new();
        for (p, &dz) in pairs.iter().zip(dz.iter()) {
            // z = pivot · context, so ∂z/∂pivot = context and vice versa.
            pivot_grads
                .entry(p.pivot)
                .or_insert_with(|| Array1::zeros(dim))
                .scaled_add(dz, &self.contexts.row(p.context));
            context_grads
                .entry(p.context)
                .or_insert_with(|| Array1::zeros(dim))
                .scaled_add(dz, &self.pivots.row(p.pivot));
        }

        for (row, grad) in &pivot_grads {
            self.pivots
                .update_row(self.pivot_optimizer.as_mut(), *row, grad.view());
        }
        for (row, grad) in &context_grads {
            self.contexts
                .update_row(self.context_optimizer.as_mut(), *row, grad.view());
        }
        BatchStats { loss, accuracy }
    }

    /// Finish training: keep the pivot table, discard everything else.
    pub fn into_vectors(self, vocab: &Vocabulary) -> Vectors {
        let size = self.dim();
        Vectors::new(vocab.reverse(), size, self.pivots.into_flat_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pair(pivot: usize, context: usize, label: bool) -> TrainingPair {
        TrainingPair {
            pivot,
            context,
            label,
        }
    }

    #[test]
    fn scores_are_probabilities() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut model = SkipGramModel::new(4, 8, OptimizerKind::Sgd, 5.0, &mut rng);
        for p in 0..4 {
            for c in 0..4 {
                let s = model.score(p, c);
                assert!(s > 0.0 && s < 1.0);
            }
        }
        // Drive one pair far into saturation; the score must stay open.
        let batch = [pair(1, 2, true)];
        for _ in 0..200 {
            model.train_batch(&batch);
        }
        let s = model.score(1, 2);
        assert!(s > 0.99 && s < 1.0, "score = {s}");
    }

    #[test]
    fn training_reduces_loss() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut model = SkipGramModel::new(5, 6, OptimizerKind::Adagrad, 0.1, &mut rng);
        let batch = [
            pair(1, 2, true),
            pair(2, 1, true),
            pair(1, 3, false),
            pair(1, 4, false),
            pair(3, 4, true),
            pair(3, 1, false),
        ];
        let before = model.evaluate(&batch);
        let mut first = None;
        for _ in 0..100 {
            let loss = model.train_batch(&batch);
            first.get_or_insert(loss);
        }
        let after = model.evaluate(&batch);
        assert_eq!(first, Some(before));
        assert!(after < before * 0.5, "loss went from {before} to {after}");
        assert!(model.score(1, 2) > 0.5);
        assert!(model.score(1, 3) < 0.5);

        let stats = model.train_batch_stats(&batch);
        assert!(stats.loss < before * 0.5);
        assert!(stats.accuracy > 0.8, "accuracy = {}", stats.accuracy);
    }

    #[test]
    fn untouched_rows_do_not_move() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut model = SkipGramModel::new(6, 4, OptimizerKind::Sgd, 0.5, &mut rng);
        let row5 = model.pivots().row(5).to_owned();
        let ctx0 = model.contexts().row(0).to_owned();
        model.train_batch(&[pair(1, 2, true), pair(1, 3, false)]);
        assert_eq!(model.pivots().row(5), row5);
        assert_eq!(model.contexts().row(0), ctx0);
        assert_eq!(model.train_batch(&[]), 0.0);
        assert_eq!(model.train_batch_stats(&[]).accuracy, 1.0);
    }

    #[test]
    fn extracted_vectors_are_the_pivot_table() {
        let vocab = crate::tokenizer::Tokenizer::default().fit(["x y y"]);
        let mut rng = StdRng::seed_from_u64(4);
        let model = SkipGramModel::new(vocab.num_rows(), 3, OptimizerKind::Adagrad, 0.1, &mut rng);
        let row1 = model.pivots().row(1).to_vec();
        let vectors = model.into_vectors(&vocab);
        assert_eq!(vectors.num_words(), 2);
        assert_eq!(vectors.size(), 3);
        assert_eq!(&vectors[1], row1.as_slice());
        assert_eq!(vectors.word(1), "y");
    }
}
