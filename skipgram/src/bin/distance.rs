use std::io::Write;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use skipgram::{Error, Metric, Vectors};

#[derive(Parser)]
#[command(about = "Interactively find the nearest neighbors of words", long_about = None)]
struct Options {
    /// A table saved by `skipgram`: a directory holding `words.txt` and
    /// `vectors.bin`, or a bincode file.
    #[arg(value_name = "FILE_OR_DIR")]
    path: PathBuf,

    /// Skip the N most common words when looking for neighbors
    #[arg(long = "ignore", value_name = "N", default_value_t = 50)]
    ignore_n_most_common: usize,

    /// Number of closest words that will be shown
    #[arg(long, value_name = "N", default_value_t = 40)]
    top: usize,

    #[arg(long, value_enum, default_value_t = Metric::Euclidean)]
    metric: Metric,
}

fn run(options: Options) -> Result<()> {
    let vectors = Vectors::load(&options.path)
        .with_context(|| format!("error loading {}", options.path.display()))?;
    eprintln!(
        "{} words, {} dimensions",
        vectors.num_words(),
        vectors.size()
    );

    loop {
        print!("Enter word (EXIT to break): ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Err(err) => {
                eprintln!("error reading stdin: {err}");
                break;
            }
            Ok(0) => break,
            Ok(_) => {}
        }
        let word = line.trim();
        if word == "EXIT" {
            break;
        }
        if word.is_empty() {
            continue;
        }

        let neighbors = match vectors.neighbors(
            word,
            options.top,
            options.ignore_n_most_common,
            options.metric,
        ) {
            Ok(neighbors) => neighbors,
            Err(Error::Lookup(_)) => {
                println!("Out of dictionary word!");
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        if neighbors.is_empty() {
            println!(
                "No candidates left after skipping the {} most common words.",
                options.ignore_n_most_common
            );
            continue;
        }

        println!();
        println!("Word: {word}  Position in vocabulary: {}", vectors.lookup_word(word).unwrap_or(0));
        println!();
        println!("                                              Word       Distance");
        println!("------------------------------------------------------------------------");
        for n in &neighbors {
            println!("{:50}\t\t{}", n.word, n.distance);
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
