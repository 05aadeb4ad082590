use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use rapid_decipher::ciphers::BifidAlphabet;
use rapid_decipher::pipeline::{parse_pipeline, SearchContext, SearchRunner, SearchSpec, StageKind, TracingObserver};
use rapid_decipher::report::{format_plan, render_text, JsonReport};
use rapid_decipher::{CommonWords, KeyDictionary};

#[derive(Parser, Debug)]
#[command(
    name = "rapid-decipher",
    version,
    about = "Brute-force classical cipher pipelines and rank candidates by English-likeness",
    after_help = "Examples:\n  \
        rapid-decipher --pipeline caesar --ciphertext \"KHOOR ZRUOG\"\n  \
        rapid-decipher --pipeline \"caesar>bifid>xor\" --key-limit 100 --dry-run\n  \
        rapid-decipher --pipeline \"b64>xor\" --workers 8 --threshold 1.7"
)]
struct Cli {
    /// JSON search spec; explicit flags override its fields.
    #[arg(long)]
    spec: Option<PathBuf>,

    /// Stages joined by '>' (caesar, bifid, columnar, double_columnar, b64, xor, railfence, reverse).
    #[arg(long)]
    pipeline: Option<String>,

    #[arg(long)]
    ciphertext: String,

    /// Candidate keys, one per line.
    #[arg(long, default_value = "dictionary.txt")]
    dictionary: PathBuf,

    /// Common English words for the word score; falls back to the first
    /// 1000 dictionary keys.
    #[arg(long = "common-words", default_value = "common.txt")]
    common_words: PathBuf,

    /// Use the built-in English stop-word list instead of a file.
    #[arg(long = "builtin-common-words", action = ArgAction::SetTrue)]
    builtin_common_words: bool,

    /// Minimum score to report (0.0 to 2.0; about 1.7 for English).
    #[arg(long)]
    threshold: Option<f64>,

    /// Hits to display (0 = all).
    #[arg(long = "max-hits")]
    max_hits: Option<usize>,

    #[arg(long)]
    workers: Option<usize>,

    /// Parameter tuples per worker task.
    #[arg(long = "chunk-size")]
    chunk_size: Option<u64>,

    /// Progress line every N completed tasks (0 = never).
    #[arg(long = "progress-every")]
    progress_every: Option<u64>,

    /// Use only the first N dictionary keys (0 = all).
    #[arg(long = "key-limit")]
    key_limit: Option<usize>,

    /// Stop once this many hits were found.
    #[arg(long = "stop-after-hits")]
    stop_after_hits: Option<usize>,

    /// standard (5x5), base64 (8x8), or a custom square alphabet.
    #[arg(long = "bifid-alphabet")]
    bifid_alphabet: Option<String>,

    /// Bifid fractionation period (default: whole payload).
    #[arg(long = "bifid-period")]
    bifid_period: Option<usize>,

    /// Keep ciphertext characters outside the bifid alphabet.
    #[arg(long = "no-bifid-normalize", action = ArgAction::SetTrue)]
    no_bifid_normalize: bool,

    /// Treat unknown spec fields as errors.
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,

    /// Show the parameter space without searching.
    #[arg(long = "dry-run", action = ArgAction::SetTrue)]
    dry_run: bool,

    /// Print results as JSON.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

impl Cli {
    /// Spec file (or defaults) with every explicit flag applied on top.
    fn to_spec(&self) -> Result<SearchSpec> {
        let mut spec = match &self.spec {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read spec {}", path.display()))?;
                SearchSpec::from_json(&text)
                    .with_context(|| format!("failed to parse spec {}", path.display()))?
            }
            None => SearchSpec::new(""),
        };

        if let Some(pipeline) = &self.pipeline {
            spec.pipeline = pipeline.clone();
        }
        if spec.pipeline.trim().is_empty() && self.spec.is_none() {
            bail!("--pipeline is required when no --spec is given");
        }
        if let Some(threshold) = self.threshold {
            spec.threshold = threshold;
        }
        if let Some(max_hits) = self.max_hits {
            spec.runtime.max_hits = max_hits;
        }
        if let Some(workers) = self.workers {
            spec.runtime.workers = workers;
        }
        if let Some(chunk_size) = self.chunk_size {
            spec.runtime.chunk_size = chunk_size;
        }
        if let Some(every) = self.progress_every {
            spec.runtime.progress_every = every;
        }
        if let Some(limit) = self.key_limit {
            spec.runtime.key_limit = limit;
        }
        if let Some(hits) = self.stop_after_hits {
            spec.runtime.stop_after_hits = Some(hits);
        }
        if let Some(alphabet) = &self.bifid_alphabet {
            spec.bifid.alphabet = match alphabet.as_str() {
                "standard" => BifidAlphabet::Standard,
                "base64" => BifidAlphabet::Base64,
                custom => BifidAlphabet::Custom(custom.to_string()),
            };
        }
        if let Some(period) = self.bifid_period {
            spec.bifid.period = Some(period);
        }
        if self.no_bifid_normalize {
            spec.bifid.normalize_input = false;
        }
        if self.strict {
            spec.strict = true;
        }
        Ok(spec)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_keys(cli: &Cli, spec: &SearchSpec) -> Result<KeyDictionary> {
    let needs_keys = parse_pipeline(&spec.pipeline)
        .map(|stages| stages.iter().any(StageKind::uses_keys))
        .unwrap_or(false);
    match KeyDictionary::load(&cli.dictionary) {
        Ok(keys) => Ok(keys.limit(spec.runtime.key_limit)),
        Err(err) if needs_keys => Err(err)
            .with_context(|| format!("failed to read dictionary {}", cli.dictionary.display())),
        Err(err) => {
            tracing::debug!(error = %err, "no dictionary; pipeline has no key-based stages");
            Ok(KeyDictionary::default())
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let spec = cli.to_spec()?;

    let keys = load_keys(&cli, &spec)?;
    let common_words = if cli.builtin_common_words {
        CommonWords::english()
    } else {
        CommonWords::load_or_fallback(&cli.common_words, keys.as_slice())
    };
    tracing::debug!(keys = keys.len(), common_words = common_words.len(), "inputs loaded");

    let ctx = SearchContext::build(&spec, &cli.ciphertext, keys, common_words)?;
    let plan = ctx.search_plan();

    if cli.dry_run {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            println!("{}", format_plan(&plan));
        }
        return Ok(());
    }

    if !cli.json {
        println!("{}", format_plan(&plan));
    }
    let result = SearchRunner::new(&ctx).run(&mut TracingObserver);

    let max_hits = ctx.runtime().max_hits;
    if cli.json {
        println!("{}", JsonReport::new(&plan, &result, max_hits).to_json()?);
    } else {
        println!("{}", render_text(&result, max_hits));
    }
    Ok(())
}
