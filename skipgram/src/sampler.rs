//! Turning sequences into skip-gram training pairs.

use rand::Rng;

use crate::tokenizer::Vocabulary;

/// Number of entries in the negative-sampling table.
pub const UNIGRAM_TABLE_SIZE: usize = 1_000_000;

/// How many times a negative draw that collides with a real context word is
/// retried before it's accepted anyway.
const MAX_REDRAWS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrainingPair {
    pub pivot: usize,
    pub context: usize,
    /// True if `context` really occurs near `pivot`; false for negative samples.
    pub label: bool,
}

/// Table for drawing negative samples: word `i` appears in proportion to
/// `count(i)^0.75`, so frequent words are drawn more often than rare ones,
/// but less overwhelmingly than their raw counts would suggest.
#[derive(Debug, Clone)]
pub struct UnigramTable {
    table: Vec<u32>,
}

impl UnigramTable {
    const POWER: f64 = 0.75;

    pub fn new(vocab: &Vocabulary, size: usize) -> Self {
        let n = vocab.len();
        if n == 0 || size == 0 {
            return UnigramTable { table: vec![] };
        }
        let weight = |i: usize| (vocab.count(i) as f64).powf(Self::POWER);
        let total = (1..=n).map(weight).sum::<f64>();

        let mut table = Vec::with_capacity(size);
        let mut i = 1;
        let mut cumulative = weight(i) / total;
        for a in 0..size {
            table.push(i as u32);
            if (a as f64 / size as f64) > cumulative && i < n {
                i += 1;
                cumulative += weight(i) / total;
            }
        }
        UnigramTable { table }
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Draw a word index. `None` if the vocabulary is empty.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.table.is_empty() {
            return None;
        }
        Some(self.table[rng.gen_range(0..self.table.len())] as usize)
    }
}

/// Generates positive pairs from a sliding window and negative pairs from a
/// unigram table.
#[derive(Debug, Clone)]
pub struct PairSampler {
    window: usize,
    negative: usize,
    table: UnigramTable,
    /// `keep[i]` is the probability of keeping word `i` when subsampling, or
    /// empty when subsampling is off.
    keep: Vec<f32>,
}

impl PairSampler {
    pub fn new(vocab: &Vocabulary, window: usize, negative: usize) -> Self {
        PairSampler {
            window,
            negative,
            table: UnigramTable::new(vocab, UNIGRAM_TABLE_SIZE),
            keep: vec![],
        }
    }

    /// Randomly discard occurrences of frequent words before windowing. Words
    /// appearing with frequency above `sample` are down-sampled; rare words
    /// are always kept.
    pub fn with_subsampling(mut self, vocab: &Vocabulary, sample: f32) -> Self {
        if sample <= 0.0 || vocab.is_empty() {
            self.keep.clear();
            return self;
        }
        let k = sample as f64 * vocab.total_count() as f64;
        self.keep = (0..vocab.num_rows())
            .map(|i| {
                let f = vocab.count(i) as f64;
                if f == 0.0 {
                    0.0
                } else {
                    (((f / k).sqrt() + 1.0) * k / f).min(1.0) as f32
                }
            })
            .collect();
        self
    }

    /// Drop words from `sequence` according to the subsampling probabilities.
    pub fn subsample<R: Rng + ?Sized>(&self, sequence: &[usize], rng: &mut R) -> Vec<usize> {
        if self.keep.is_empty() {
            return sequence.to_vec();
        }
        sequence
            .iter()
            .copied()
            .filter(|&w| {
                let p = self.keep.get(w).copied().unwrap_or(0.0);
                p >= 1.0 || rng.gen::<f32>() < p
            })
            .collect()
    }

    /// All training pairs for one sequence, subsampled first if enabled.
    ///
    /// Positives come first for each pivot, each followed by its negatives;
    /// callers that care should shuffle.
    pub fn pairs<R: Rng + ?Sized>(&self, sequence: &[usize], rng: &mut R) -> Vec<TrainingPair> {
        let sequence = self.subsample(sequence, rng);
        let mut pairs = vec![];
        for (i, &pivot) in sequence.iter().enumerate() {
            let start = i.saturating_sub(self.window);
            let stop = (i + self.window + 1).min(sequence.len());
            let neighbors = &sequence[start..stop];

            for (c, &context) in neighbors.iter().enumerate() {
                if start + c == i {
                    continue;
                }
                pairs.push(TrainingPair {
                    pivot,
                    context,
                    label: true,
                });
                for _ in 0..self.negative {
                    let Some(target) = self.draw_negative(pivot, neighbors, rng) else {
                        break;
                    };
                    pairs.push(TrainingPair {
                        pivot,
                        context: target,
                        label: false,
                    });
                }
            }
        }
        pairs
    }

    /// Draw a negative context for `pivot`, redrawing a few times if it hits
    /// the pivot or a word in its window. Collisions that survive the redraws
    /// are kept: negative sampling is noisy anyway.
    fn draw_negative<R: Rng + ?Sized>(
        &self,
        pivot: usize,
        neighbors: &[usize],
        rng: &mut R,
    ) -> Option<usize> {
        let mut target = self.table.sample(rng)?;
        for _ in 0..MAX_REDRAWS {
            if target != pivot && !neighbors.contains(&target) {
                break;
            }
            target = self.table.sample(rng)?;
        }
        Some(target)
    }
}
