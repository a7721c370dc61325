use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

use verdant_analysis::extract::extract_claims;
use verdant_analysis::fingerprint::hash;
use verdant_analysis::normalize::normalize;
use verdant_analysis::pipeline::local_report;
use verdant_analysis::{Analyzer, build_backend, build_cache};
use verdant_config::VerdantConfig;

#[derive(Parser, Debug)]
#[command(name = "verdant")]
#[command(version, about = "Environmental claim analysis", long_about = None)]
pub struct Cli {
    /// YAML configuration file (defaults: ./verdant.yaml, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset; overrides logging.filter
    #[arg(long, global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze text through the cache and upstream service
    Analyze {
        #[command(flatten)]
        input: Input,
        /// Page the text came from
        #[arg(long)]
        url: Option<String>,
        /// Skip the upstream service and return the local placeholder
        #[arg(long, conflicts_with = "strict")]
        offline: bool,
        /// Fail instead of falling back to the local placeholder
        #[arg(long)]
        strict: bool,
    },
    /// Run the rule-based claim extractor only
    Extract {
        #[command(flatten)]
        input: Input,
    },
    /// Normalize a raw upstream payload (file or stdin)
    Normalize {
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Text the payload was produced for
        #[arg(long)]
        original_text: Option<String>,
    },
    /// Print the content fingerprint of a text
    Fingerprint {
        #[arg(short, long)]
        text: String,
    },
}

/// Text source: `--text`, `--file`, or stdin when neither is given.
#[derive(Args, Debug, Clone, Default)]
pub struct Input {
    #[arg(short, long, conflicts_with = "file")]
    pub text: Option<String>,
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

impl Input {
    pub fn read(&self) -> Result<String> {
        match (&self.text, &self.file) {
            (Some(t), _) => Ok(t.clone()),
            (None, Some(path)) => read_file(path),
            (None, None) => read_stdin(),
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run(cmd: Command, cfg: &VerdantConfig) -> Result<()> {
    match cmd {
        Command::Analyze {
            input,
            url,
            offline,
            strict,
        } => {
            let text = input.read()?;
            if text.trim().is_empty() {
                bail!("nothing to analyze: input is empty");
            }
            if offline {
                tracing::info!("analysis.offline");
                return print_json(&local_report(&text));
            }
            let backend = build_backend(&cfg.upstream)?;
            let analyzer = Analyzer::new(backend, build_cache(&cfg.cache));
            let report = if strict {
                analyzer.analyze(&text, url.as_deref()).await?
            } else {
                analyzer.analyze_or_placeholder(&text, url.as_deref()).await
            };
            if report.is_placeholder() {
                eprintln!("warning: analysis service unavailable, showing local placeholder");
            }
            print_json(&report)
        }
        Command::Extract { input } => {
            let text = input.read()?;
            print_json(&extract_claims(&text))
        }
        Command::Normalize {
            file,
            original_text,
        } => {
            let raw = match file {
                Some(path) => read_file(&path)?,
                None => read_stdin()?,
            };
            let payload: serde_json::Value =
                serde_json::from_str(&raw).context("payload is not valid JSON")?;
            print_json(&normalize(&payload, original_text.as_deref()))
        }
        Command::Fingerprint { text } => {
            println!("{}", hash(&text));
            Ok(())
        }
    }
}
