use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use refine_core::pii::{detect_pii, sanitize_description};
use refine_statement::{StatementTransformer, TransformWarning};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Parser, Debug)]
#[command(name = "refine", version, about = "Credit statement PII refiner")]
struct Cli {
    /// Config file (default: ~/.refiner/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a statement JSON file and print its normalized records
    Transform {
        /// Path to the statement JSON document
        #[arg(long)]
        input: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Also print non-fatal warnings to stderr
        #[arg(long)]
        warnings: bool,
    },

    /// Sanitize a single description and report any PII left behind
    Scan {
        text: String,
    },

    /// Write a default config file
    InitConfig,
}

fn init_logging(default_level: &str) {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn write_warnings(out: &mut impl Write, warnings: &[TransformWarning]) -> Result<()> {
    for w in warnings {
        writeln!(out, "warning: {w}")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::InitConfig => {
            config::init_config(cli.config.as_deref())?;
        }

        Command::Transform {
            input,
            pretty,
            warnings,
        } => {
            let cfg = config::load_config(cli.config.as_deref())?;
            init_logging(&cfg.logging.level);

            if !input.exists() {
                bail!("input not found: {}", input.display());
            }
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("read {}", input.display()))?;
            let doc: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("parse {}", input.display()))?;
            debug!(input = %input.display(), bytes = raw.len(), "loaded statement document");

            let transformer = StatementTransformer::new(cfg.transform);
            let refinement = transformer
                .refine(&doc)
                .with_context(|| format!("validate {}", input.display()))?;

            let out = if pretty {
                serde_json::to_string_pretty(&refinement.records)?
            } else {
                serde_json::to_string(&refinement.records)?
            };
            println!("{out}");

            if warnings {
                write_warnings(&mut std::io::stderr().lock(), &refinement.warnings)?;
            }
        }

        Command::Scan { text } => {
            let cleaned = sanitize_description(&text);
            println!("{cleaned}");
            let residual = detect_pii(&cleaned);
            if !residual.is_empty() {
                let labels: Vec<_> = residual.iter().map(|k| k.label()).collect();
                println!("residual: {}", labels.join(", "));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_are_one_line_each() {
        let warnings = vec![
            TransformWarning::DateParseFailure {
                field: "transactions[0].date".into(),
                value: "01/20/2024".into(),
            },
            TransformWarning::UnsupportedCurrency {
                record_id: "stmt-001".into(),
                currency: "XYZ".into(),
            },
        ];
        let mut buf = Vec::new();
        write_warnings(&mut buf, &warnings).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.starts_with("warning: ")));
        assert!(lines[0].contains("01/20/2024"));
    }

    #[test]
    fn test_transform_flags_parse() {
        let cli = Cli::try_parse_from(["refine", "transform", "--input", "s.json", "--warnings"])
            .unwrap();
        match cli.command {
            Command::Transform {
                warnings, pretty, ..
            } => {
                assert!(warnings);
                assert!(!pretty);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
