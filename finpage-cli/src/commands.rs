//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use finpage::config::GeneratorConfig;
use finpage::contracts::{ContractCatalog, ContractEntry, KEYWORD_INPUT};
use finpage::core::KeywordInput;
use finpage::facade::{failure_message, WebpageGenerator};
use finpage::observability;
use finpage::pipeline::{ExecutionMode, PipelineStrategy};
use serde_json::{json, Value};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// finpage: keyword-driven financial webpage generation.
#[derive(Parser, Debug)]
#[command(
    name = "finpage",
    version,
    about = "Generate SEO-structured financial webpages from keywords.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Stage scheduling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Execution {
    Sequential,
    Concurrent,
}

/// Top-level CLI subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Generate a webpage.
    Generate {
        /// Primary keyword, e.g. "best credit cards for travel".
        primary: String,

        /// Comma-separated secondary keywords.
        secondary: String,

        /// Path to a finpage.toml configuration file.
        #[arg(short, long, env = "FINPAGE_CONFIG")]
        config: Option<PathBuf>,

        /// Override the configured model.
        #[arg(long)]
        model: Option<String>,

        /// Override the configured provider base URL.
        #[arg(long)]
        base_url: Option<String>,

        /// Stage scheduling.
        #[arg(long, value_enum)]
        execution: Option<Execution>,

        /// Generate the whole page in one call.
        #[arg(long)]
        single_shot: bool,

        /// Print the outcome as JSON instead of raw HTML.
        #[arg(long)]
        json: bool,

        /// Write the HTML to this file.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Render a stage's prompt without calling the model.
    Prompt {
        /// Stage name (see `finpage contracts`).
        stage: String,

        /// Primary keyword.
        primary: String,

        /// Comma-separated secondary keywords.
        secondary: String,

        /// Configuration file whose prompt overrides apply.
        #[arg(short, long, env = "FINPAGE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Print a stage's output JSON Schema.
    Schema {
        /// Stage name (see `finpage contracts`).
        stage: String,
    },

    /// List the stage contracts.
    Contracts {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Installs the tracing subscriber for the selected format and verbosity.
pub(crate) fn init_tracing(cli: &Cli) -> Result<()> {
    let format = match cli.log_format {
        LogFormat::Text => observability::LogFormat::Text,
        LogFormat::Json => observability::LogFormat::Json,
    };
    observability::init_tracing(format, cli.verbose)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Dispatches a parsed command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            primary,
            secondary,
            config,
            model,
            base_url,
            execution,
            single_shot,
            json,
            out,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(model) = model {
                config.provider.model = model;
            }
            if let Some(base_url) = base_url {
                config.provider.base_url = base_url;
            }
            if let Some(execution) = execution {
                config.pipeline.execution = match execution {
                    Execution::Sequential => ExecutionMode::Sequential,
                    Execution::Concurrent => ExecutionMode::Concurrent,
                };
            }
            if single_shot {
                config.pipeline.strategy = PipelineStrategy::SingleShot;
            }
            cmd_generate(config, &primary, &secondary, json, out.as_deref()).await
        }
        Command::Prompt {
            stage,
            primary,
            secondary,
            config,
        } => cmd_prompt(&stage, &primary, &secondary, config.as_deref()),
        Command::Schema { stage } => cmd_schema(&stage),
        Command::Contracts { json } => cmd_contracts(json),
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(GeneratorConfig::default()),
    }
}

async fn cmd_generate(
    config: GeneratorConfig,
    primary: &str,
    secondary: &str,
    as_json: bool,
    out: Option<&Path>,
) -> Result<()> {
    info!(
        model = %config.provider.model,
        strategy = %config.pipeline.strategy,
        execution = %config.pipeline.execution,
        "Starting generation"
    );

    let generator = WebpageGenerator::from_config(config)
        .map_err(|e| anyhow!("{}: {e}", failure_message(&e)))?;
    let outcome = generator.generate_webpage(primary, secondary).await;

    if let (Some(path), Some(html)) = (out, outcome.content.as_deref()) {
        std::fs::write(path, html)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), bytes = html.len(), "Webpage written");
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if out.is_none() {
        if let Some(html) = &outcome.content {
            println!("{html}");
        }
    }

    if !outcome.success {
        bail!("{}", outcome.message);
    }
    Ok(())
}

fn lookup(stage: &str) -> Result<ContractEntry> {
    let catalog = ContractCatalog::standard();
    catalog.lookup(stage).cloned().ok_or_else(|| {
        anyhow!(
            "unknown stage '{stage}'; known stages: {}",
            catalog.names().join(", ")
        )
    })
}

fn cmd_prompt(stage: &str, primary: &str, secondary: &str, config: Option<&Path>) -> Result<()> {
    let entry = lookup(stage)?;
    let config = load_config(config)?;
    let template = match config.prompt_override(entry.name)? {
        Some(template) => {
            entry.check_template(&template)?;
            template
        }
        None => entry.template.clone(),
    };

    let input = serde_json::to_value(KeywordInput::new(primary, secondary))?;
    if let Err(violations) = KEYWORD_INPUT.validate(&input) {
        let details: Vec<String> = violations.iter().map(ToString::to_string).collect();
        bail!("invalid keywords: {}", details.join("; "));
    }
    let Value::Object(fields) = input else {
        bail!("keyword input did not serialize to an object");
    };

    info!(
        stage = entry.name,
        template_version = %template.version(),
        template_fingerprint = %template.fingerprint(),
        "Rendering prompt"
    );
    println!("{}", template.render(&fields)?);
    Ok(())
}

fn cmd_schema(stage: &str) -> Result<()> {
    let entry = lookup(stage)?;
    println!("{}", serde_json::to_string_pretty(&entry.output.to_json_schema())?);
    Ok(())
}

fn cmd_contracts(as_json: bool) -> Result<()> {
    let catalog = ContractCatalog::standard();
    catalog.validate()?;

    if as_json {
        let entries: Vec<Value> = catalog
            .entries()
            .iter()
            .map(|entry| {
                json!({
                    "stage": entry.name,
                    "fragment": entry.fragment.slug(),
                    "input": entry.input.name,
                    "output": entry.output.name,
                    "templateVersion": entry.template.version(),
                    "templateFingerprint": entry.template.fingerprint(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!(
        "{:<30} {:<18} {:<34} {:<8} FINGERPRINT",
        "STAGE", "FRAGMENT", "OUTPUT SCHEMA", "VERSION"
    );
    for entry in catalog.entries() {
        println!(
            "{:<30} {:<18} {:<34} {:<8} {}",
            entry.name,
            entry.fragment.slug(),
            entry.output.name,
            entry.template.version(),
            entry.template.fingerprint()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "finpage",
            "-v",
            "generate",
            "best credit cards for travel",
            "travel rewards, airline miles",
            "--execution",
            "concurrent",
            "--single-shot",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let Command::Generate {
            primary,
            execution,
            single_shot,
            json,
            out,
            ..
        } = cli.command
        else {
            panic!("expected generate");
        };
        assert_eq!(primary, "best credit cards for travel");
        assert_eq!(execution, Some(Execution::Concurrent));
        assert!(single_shot);
        assert!(json);
        assert!(out.is_none());
    }

    #[test]
    fn test_parse_global_log_format_after_subcommand() {
        let cli = Cli::try_parse_from(["finpage", "contracts", "--log-format", "json"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_lookup_unknown_stage() {
        let err = lookup("summarize").unwrap_err();
        assert!(err.to_string().contains("generate_faq_section"));
        assert_eq!(lookup("generate_faq_section").unwrap().name, "generate_faq_section");
    }
}
