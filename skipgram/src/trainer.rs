//! The training loop.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::Config;
use crate::corpus::DocumentSource;
use crate::error::Result;
use crate::model::SkipGramModel;
use crate::sampler::PairSampler;
use crate::tokenizer::{Tokenizer, Vocabulary};
use crate::vectors::Vectors;

/// Summary of one pass over the corpus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochStats {
    pub epoch: usize,
    /// Mean loss over every pair trained on, weighted by batch size.
    pub loss: f32,
    /// Fraction of pairs scored on the right side of 0.5, before each
    /// batch's update.
    pub accuracy: f32,
    pub pairs: usize,
}

/// Trains a skip-gram model over a document source.
pub struct Trainer<'a> {
    config: &'a Config,
    tokenizer: &'a Tokenizer,
    vocab: &'a Vocabulary,
    sampler: PairSampler,
    model: SkipGramModel,
    rng: StdRng,
    show_progress: bool,
}

impl<'a> Trainer<'a> {
    /// Validates `config` before allocating anything.
    pub fn new(config: &'a Config, tokenizer: &'a Tokenizer, vocab: &'a Vocabulary) -> Result<Self> {
        config.validate()?;
        info!("training with {config}");
        let mut rng = StdRng::seed_from_u64(config.seed);
        let model = SkipGramModel::new(
            vocab.num_rows(),
            config.embedding_dim,
            config.optimizer,
            config.learning_rate(),
            &mut rng,
        );
        let sampler = PairSampler::new(vocab, config.window_size, config.negative_samples)
            .with_subsampling(vocab, config.sample);
        Ok(Trainer {
            config,
            tokenizer,
            vocab,
            sampler,
            model,
            rng,
            show_progress: true,
        })
    }

    /// Turn the per-epoch progress bar on or off.
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Make one pass over `documents`: encode each one, sample its pairs,
    /// shuffle them and train in batches.
    pub fn train_epoch<D: DocumentSource + ?Sized>(
        &mut self,
        epoch: usize,
        documents: &D,
    ) -> Result<EpochStats> {
        let pb = if self.show_progress {
            ProgressBar::new(documents.num_documents() as u64)
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::with_template("epoch {prefix} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.set_prefix(format!("{}/{}", epoch + 1, self.config.n_epochs));

        let mut loss_total = 0.0f64;
        let mut num_correct = 0.0f64;
        let mut num_pairs = 0usize;
        for document in documents.documents() {
            let document = document?;
            let sequence = self.tokenizer.encode(self.vocab, &document);
            let mut pairs = self.sampler.pairs(&sequence, &mut self.rng);
            pairs.shuffle(&mut self.rng);
            for batch in pairs.chunks(self.config.batch_size) {
                let stats = self.model.train_batch_stats(batch);
                loss_total += stats.loss as f64 * batch.len() as f64;
                num_correct += stats.accuracy as f64 * batch.len() as f64;
                num_pairs += batch.len();
            }
            if num_pairs > 0 {
                pb.set_message(format!("loss={:.4}", loss_total / num_pairs as f64));
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        let (loss, accuracy) = if num_pairs == 0 {
            (0.0, 1.0)
        } else {
            (
                (loss_total / num_pairs as f64) as f32,
                (num_correct / num_pairs as f64) as f32,
            )
        };
        Ok(EpochStats {
            epoch,
            loss,
            accuracy,
            pairs: num_pairs,
        })
    }

    /// Run every epoch and hand back the trained pivot table.
    pub fn train<D: DocumentSource + ?Sized>(mut self, documents: &D) -> Result<Vectors> {
        let start = Instant::now();
        for epoch in 0..self.config.n_epochs {
            let stats = self.train_epoch(epoch, documents)?;
            info!(
                epoch = epoch + 1,
                loss = stats.loss,
                accuracy = stats.accuracy,
                pairs = stats.pairs,
                elapsed_secs = start.elapsed().as_secs_f64(),
                "finished epoch"
            );
        }
        debug!(rows = self.model.num_rows(), dim = self.model.dim(), "extracting pivot table");
        Ok(self.model.into_vectors(self.vocab))
    }
}

/// Build a vocabulary from `documents` and train on them, all with `config`.
pub fn train<D: DocumentSource + ?Sized>(config: &Config, documents: &D) -> Result<(Vocabulary, Vectors)> {
    config.validate()?;
    let tokenizer = Tokenizer::from_config(config);
    let vocab = tokenizer.fit_corpus(documents)?;
    let vectors = Trainer::new(config, &tokenizer, &vocab)?
        .show_progress(false)
        .train(documents)?;
    Ok((vocab, vectors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Metric;
    use crate::error::Error;

    fn small_config() -> Config {
        Config {
            embedding_dim: 8,
            window_size: 2,
            negative_samples: 2,
            n_epochs: 3,
            batch_size: 16,
            ..Config::default()
        }
    }

    #[test]
    fn bad_config_fails_before_training() {
        let config = Config {
            window_size: 0,
            ..Config::default()
        };
        let docs = vec!["a b c"];
        match train(&config, &docs) {
            Err(Error::Configuration { field, .. }) => assert_eq!(field, "window_size"),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn empty_corpus_trains_to_an_empty_table() {
        let docs: Vec<String> = vec![];
        let (vocab, vectors) = train(&small_config(), &docs).unwrap();
        assert!(vocab.is_empty());
        assert_eq!(vectors.num_words(), 0);
        assert_eq!(vectors.num_rows(), 1);
        assert!(matches!(
            vectors.nearest("anything", 0, Metric::Euclidean),
            Err(Error::Lookup(_))
        ));
    }

    #[test]
    fn loss_goes_down_over_epochs() {
        let docs = vec!["the quick brown fox jumps over the lazy dog"; 20];
        let config = Config {
            n_epochs: 6,
            ..small_config()
        };
        let tokenizer = Tokenizer::from_config(&config);
        let vocab = tokenizer.fit(&docs);
        let mut trainer = Trainer::new(&config, &tokenizer, &vocab)
            .unwrap()
            .show_progress(false);
        let first = trainer.train_epoch(0, &docs).unwrap();
        let mut last = first;
        for epoch in 1..config.n_epochs {
            last = trainer.train_epoch(epoch, &docs).unwrap();
        }
        assert!(first.pairs > 0);
        assert_eq!(first.pairs, last.pairs);
        assert!(last.loss < first.loss, "loss went from {} to {}", first.loss, last.loss);
        assert!((0.0..=1.0).contains(&first.accuracy));
        assert!(last.accuracy >= 0.5, "accuracy = {}", last.accuracy);
    }

    #[test]
    fn same_seed_same_vectors() {
        let docs = vec!["a b c d", "b c d e", "c d e a"];
        let (_, v1) = train(&small_config(), &docs).unwrap();
        let (_, v2) = train(&small_config(), &docs).unwrap();
        for i in 0..v1.num_rows() {
            assert_eq!(&v1[i], &v2[i]);
        }
    }
}
