use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tokio::io::BufReader;

use morphan_bridge::bridge::Bridge;
use morphan_bridge::compat;
use morphan_bridge::consts::{DEFAULT_MAX_STRIPS, STDERR_TAG};
use morphan_bridge::engine::Engine;
use morphan_bridge::engine::lexicon::LexiconEngine;
use morphan_bridge::engine::remote::RemoteEngine;
use morphan_bridge::engine::suffix::{SuffixAnalyzer, SuffixEngine};

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum EngineKind {
    /// Markup-dictionary engine with shape classification
    Lexicon,
    /// Naive suffix-stripping analyzer only
    Suffix,
    /// Proxy to a remote morphology service
    Remote,
}

#[derive(Parser)]
#[command(name = "morphan-bridge", version, about = "JSON-over-stdio morphology bridge")]
struct Cli {
    /// Analysis engine backend
    #[arg(long, value_enum, default_value_t = EngineKind::Lexicon)]
    engine: EngineKind,

    /// Markup dictionary (TSV, token<TAB>analysis), repeatable; earlier
    /// files win on duplicate tokens
    #[arg(long)]
    markup: Vec<PathBuf>,

    /// Suffix rule set (JSON) for the suffix engine or the lexicon fallback
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Report out-of-vocabulary words as NR instead of consulting the
    /// suffix fallback
    #[arg(long, default_value_t = false)]
    no_fallback: bool,

    /// Base URL of the remote morphology service (remote engine only)
    #[arg(long)]
    endpoint: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Must happen before any engine is constructed.
    compat::ensure_getargspec();

    let suffix_analyzer = || -> anyhow::Result<SuffixAnalyzer> {
        match &cli.rules {
            Some(path) => SuffixAnalyzer::from_file(path, DEFAULT_MAX_STRIPS),
            None => Ok(SuffixAnalyzer::default_tatar(DEFAULT_MAX_STRIPS)),
        }
    };

    let engine: Box<dyn Engine> = match cli.engine {
        EngineKind::Lexicon => {
            let mut lexicon = LexiconEngine::new()?;
            for path in &cli.markup {
                let added = lexicon.load_markup(path)?;
                eprintln!("[{STDERR_TAG}] loaded {added} entries from {}", path.display());
            }
            if cli.no_fallback {
                Box::new(lexicon)
            } else {
                Box::new(lexicon.with_fallback(suffix_analyzer()?))
            }
        }
        EngineKind::Suffix => Box::new(SuffixEngine::new(suffix_analyzer()?)?),
        EngineKind::Remote => {
            let endpoint = cli
                .endpoint
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("--endpoint is required with --engine remote"))?;
            Box::new(RemoteEngine::connect(endpoint).await?)
        }
    };

    eprintln!("[{STDERR_TAG}] engine ready, version {}", engine.version());

    let bridge = Bridge::new(engine);
    let stdin = BufReader::new(tokio::io::stdin());
    bridge.run(stdin, tokio::io::stdout()).await?;

    eprintln!("[{STDERR_TAG}] stopped");
    Ok(())
}
