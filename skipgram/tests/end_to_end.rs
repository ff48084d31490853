use std::fs;

use skipgram::{distance, train, Config, Corpus, Error, Metric, Tokenizer, Trainer, Vectors};

fn cat_dog() -> Vec<&'static str> {
    vec!["the cat sat on the mat", "the dog sat on the rug"]
}

fn small_config() -> Config {
    Config {
        embedding_dim: 10,
        window_size: 2,
        negative_samples: 2,
        n_epochs: 5,
        batch_size: 32,
        ..Config::default()
    }
}

#[test]
fn test_query_respects_frequency_cutoff() {
    let (vocab, vectors) = train(&small_config(), &cat_dog()).unwrap();
    assert_eq!(vocab.len(), 7);
    assert_eq!(vectors.num_words(), 7);

    for metric in [Metric::Euclidean, Metric::Cosine] {
        let n = vectors.nearest("cat", 3, metric).unwrap();
        assert!(["mat", "dog", "rug"].contains(&n.word), "got {}", n.word);
        assert!(n.index > 3);

        let all = vectors.neighbors("cat", 10, 0, metric).unwrap();
        assert_eq!(all.len(), 6);
        assert!(all.iter().all(|n| n.word != "cat"));
        assert!(all.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    // With the default cutoff of 50 every word in this tiny corpus is skipped.
    match vectors.nearest("cat", Config::default().ignore_n_most_common, Metric::Euclidean) {
        Err(Error::NotFound {
            word,
            ignore_n_most_common,
        }) => {
            assert_eq!(word, "cat");
            assert_eq!(ignore_n_most_common, 50);
        }
        other => panic!("expected NotFound, got {other:?}"),
    }

    match vectors.nearest("zebra", 0, Metric::Euclidean) {
        Err(Error::Lookup(word)) => assert_eq!(word, "zebra"),
        other => panic!("expected Lookup, got {other:?}"),
    }
    // Lookups are exact; the tokenizer lowercased the corpus.
    assert!(matches!(vectors.vector("Cat"), Err(Error::Lookup(_))));
    assert_eq!(vectors.vector("cat").unwrap().len(), 10);
}

#[test]
fn test_dog_usually_beats_rug_as_a_neighbor_of_cat() {
    // With a window of 2, "cat" and "dog" both see exactly "the", "sat" and
    // "on"; "rug" sees only "on" and "the", and never shares a window with
    // "cat".
    let docs = cat_dog();
    let mut dog_first = 0;
    let runs = 30;
    for seed in 0..runs {
        let config = Config {
            window_size: 2,
            negative_samples: 4,
            n_epochs: 100,
            seed,
            ..small_config()
        };
        let (_, vectors) = train(&config, &docs).unwrap();
        let ranked = vectors
            .neighbors("cat", 10, 3, Metric::Euclidean)
            .unwrap()
            .iter()
            .map(|n| n.word)
            .collect::<Vec<_>>();
        assert_eq!(ranked.len(), 3);
        let rank = |w: &str| ranked.iter().position(|&r| r == w).unwrap();
        if rank("dog") < rank("rug") {
            dog_first += 1;
        }
    }
    assert!(
        dog_first * 3 >= runs * 2,
        "dog ranked ahead of rug in only {dog_first} of {runs} runs"
    );
}

/// "alpha" and "beta" always appear between the same words; "gamma" never
/// does. After training, alpha and beta should be each other's closest.
fn shared_context_corpus() -> Vec<String> {
    let mut docs = vec![];
    for i in 0..30 {
        docs.push("red green alpha blue white".to_string());
        docs.push("red green beta blue white".to_string());
        docs.push("cold hard gamma soft warm".to_string());
        if i % 3 == 0 {
            docs.push("white blue red green".to_string());
            docs.push("warm soft cold hard".to_string());
        }
    }
    docs
}

#[test]
fn test_shared_contexts_pull_words_together() {
    let docs = shared_context_corpus();
    let mut wins = 0;
    for seed in 1..=5 {
        let config = Config {
            n_epochs: 20,
            seed,
            ..small_config()
        };
        let (_, vectors) = train(&config, &docs).unwrap();
        let alpha = vectors.vector("alpha").unwrap();
        let beta = vectors.vector("beta").unwrap();
        let gamma = vectors.vector("gamma").unwrap();
        let ab = distance(Metric::Euclidean, alpha, beta);
        let ag = distance(Metric::Euclidean, alpha, gamma);
        let bg = distance(Metric::Euclidean, beta, gamma);
        if ab < ag && ab < bg {
            wins += 1;
        }
    }
    assert!(wins >= 4, "alpha and beta were closest for only {wins} of 5 seeds");
}

#[test]
fn test_corpus_directory_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let corpus_dir = tmp.path().join("corpus");
    fs::create_dir(&corpus_dir).unwrap();
    fs::write(corpus_dir.join("b.txt"), "The dog sat on the rug.").unwrap();
    fs::write(corpus_dir.join("a.txt"), "The cat sat on the mat.").unwrap();
    // Subdirectories are not documents.
    fs::create_dir(corpus_dir.join("nested")).unwrap();
    fs::write(corpus_dir.join("nested").join("c.txt"), "zebra zebra zebra").unwrap();

    let corpus = Corpus::open(&corpus_dir).unwrap();
    assert_eq!(corpus.files().len(), 2);
    assert!(corpus.files()[0].ends_with("a.txt"));

    let config = small_config();
    let tokenizer = Tokenizer::from_config(&config);
    let vocab = tokenizer.fit_corpus(&corpus).unwrap();
    assert_eq!(vocab.index_of("zebra"), None);
    // Same vocabulary as fitting the strings directly.
    let direct = tokenizer.fit(cat_dog());
    assert_eq!(vocab.reverse(), direct.reverse());

    let vectors = Trainer::new(&config, &tokenizer, &vocab)
        .unwrap()
        .show_progress(false)
        .train(&corpus)
        .unwrap();

    let out = tmp.path().join("out");
    vectors.save_flat(&out).unwrap();
    let words = fs::read_to_string(out.join(skipgram::WORDS_FILE)).unwrap();
    assert_eq!(words.lines().next(), Some(""));
    assert_eq!(words.lines().nth(1), Some("the"));
    let flat = Vectors::load(&out).unwrap();

    let snapshot = tmp.path().join("vectors.bincode");
    vectors.save_bincode(&snapshot).unwrap();
    let snap = Vectors::load(&snapshot).unwrap();

    for loaded in [&flat, &snap] {
        assert_eq!(loaded.size(), vectors.size());
        assert_eq!(loaded.words(), vectors.words());
        for i in 0..vectors.num_rows() {
            assert_eq!(&loaded[i], &vectors[i]);
        }
        assert_eq!(
            loaded.nearest("cat", 3, Metric::Euclidean).unwrap().word,
            vectors.nearest("cat", 3, Metric::Euclidean).unwrap().word
        );
    }
}

#[test]
fn test_missing_corpus_names_the_path() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("nope");
    match Corpus::open(&missing) {
        Err(Error::Io { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn test_subsampling_and_sgd_still_train() {
    let config = Config {
        optimizer: skipgram::OptimizerKind::Sgd,
        sample: 1e-3,
        ..small_config()
    };
    let (vocab, vectors) = train(&config, &cat_dog()).unwrap();
    assert_eq!(vectors.num_rows(), vocab.num_rows());
    for i in 0..vectors.num_rows() {
        assert!(vectors[i].iter().all(|x| x.is_finite()));
    }
}
