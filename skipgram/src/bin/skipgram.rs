use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use skipgram::{Config, Corpus, Metric, OptimizerKind, Tokenizer, Trainer};

#[derive(Parser)]
#[command(about = "Train skip-gram word embeddings with negative sampling", long_about = None)]
struct Options {
    /// Train on the text files in DIR, one document per file
    #[arg(long, value_name = "DIR")]
    corpus: PathBuf,

    /// Save the word list and vectors (`words.txt`, `vectors.bin`) into DIR
    #[arg(long = "output", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Save the trained table as a single bincode FILE
    #[arg(long = "bincode", value_name = "FILE")]
    bincode_file: Option<PathBuf>,

    /// Set size of word vectors
    #[arg(long = "size", default_value_t = 25)]
    embedding_dim: usize,

    /// Set max skip length between words
    #[arg(long, default_value_t = 5)]
    window: usize,

    /// Number of negative examples per positive pair
    #[arg(long, default_value_t = 4)]
    negative: usize,

    /// Number of passes over the corpus
    #[arg(long, default_value_t = 5)]
    iter: usize,

    /// Keep at most N distinct words, the most frequent ones
    #[arg(long = "max-vocab", value_name = "N", default_value_t = 50_000)]
    max_vocab_size: usize,

    /// Number of training pairs per gradient step
    #[arg(long, value_name = "N", default_value_t = 256)]
    batch_size: usize,

    #[arg(long, value_enum, default_value_t = OptimizerKind::Adagrad)]
    optimizer: OptimizerKind,

    /// Set the learning rate; default is 0.025 for sgd and 0.05 for adagrad
    #[arg(long)]
    alpha: Option<f32>,

    /// Set threshold for occurrence of words. Those that appear with higher
    /// frequency in the training data will be randomly down-sampled; useful
    /// range is (0, 1e-5). 0 turns subsampling off
    #[arg(long, default_value_t = 0.0)]
    sample: f32,

    /// Random seed
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Distance used by --query
    #[arg(long, value_enum, default_value_t = Metric::Euclidean)]
    metric: Metric,

    /// Never answer a query with one of the N most common words
    #[arg(long = "ignore", value_name = "N", default_value_t = 50)]
    ignore_n_most_common: usize,

    /// After training, print the nearest neighbor of WORD (may be repeated)
    #[arg(long = "query", value_name = "WORD")]
    queries: Vec<String>,
}

impl Options {
    fn config(&self) -> Config {
        Config {
            max_vocab_size: self.max_vocab_size,
            embedding_dim: self.embedding_dim,
            window_size: self.window,
            negative_samples: self.negative,
            n_epochs: self.iter,
            ignore_n_most_common: self.ignore_n_most_common,
            batch_size: self.batch_size,
            optimizer: self.optimizer,
            learning_rate: self.alpha,
            sample: self.sample,
            seed: self.seed,
            metric: self.metric,
            ..Config::default()
        }
    }
}

fn run(options: Options) -> Result<()> {
    let config = options.config();
    config.validate()?;

    let corpus = Corpus::open(&options.corpus)
        .with_context(|| format!("error opening corpus {}", options.corpus.display()))?;
    info!(documents = corpus.files().len(), "reading corpus");

    let tokenizer = Tokenizer::from_config(&config);
    let vocab = tokenizer
        .fit_corpus(&corpus)
        .context("error building vocabulary")?;
    let vectors = Trainer::new(&config, &tokenizer, &vocab)?
        .train(&corpus)
        .context("error during training")?;

    if let Some(dir) = &options.output_dir {
        vectors
            .save_flat(dir)
            .with_context(|| format!("error saving vectors to {}", dir.display()))?;
        info!(dir = %dir.display(), "saved vectors");
    }
    if let Some(file) = &options.bincode_file {
        vectors
            .save_bincode(file)
            .with_context(|| format!("error saving vectors to {}", file.display()))?;
        info!(file = %file.display(), "saved vectors");
    }

    for query in &options.queries {
        match vectors.nearest(query, config.ignore_n_most_common, config.metric) {
            Ok(n) => println!("{query}\t{}\t{}", n.word, n.distance),
            Err(err) => println!("{query}\t{err}"),
        }
    }
    Ok(())
}

fn main() {
    skipgram::init_logging();

    let options = Options::parse();
    if let Err(err) = run(options) {
        eprintln!("{err:#}");
        process::exit(1);
    }
}
