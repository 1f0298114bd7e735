//! recipe-ctx — recover recipes and tool timelines from LLM generations
//!
//! Reads model replies or generation outputs from files or stdin and prints
//! the recovered structure as YAML or JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use recipe_ctx::input::InputSource;
use recipe_ctx::markdown::render_blocks;
use recipe_ctx::nutrition::{
    extract_nutrition_report, servings_count, NutritionReport, NutritionTotals,
};
use recipe_ctx::trace::{format_duration, ServiceTrace, TimelineEntry, TraceSummary};
use recipe_ctx::{analyze, parse, reconstruct};
use serde::Serialize;
use std::io::{self, Write};

/// Recover recipes and tool-call timelines from LLM generation output
#[derive(Parser)]
#[command(name = "recipe-ctx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a markdown recipe reply into a structured recipe
    Recipe {
        /// Input file, or `-` for stdin
        input: String,

        #[command(flatten)]
        options: OutputOptions,
    },

    /// Render markdown prose into paragraphs and lists
    Render {
        /// Input file, or `-` for stdin
        input: String,

        #[command(flatten)]
        options: OutputOptions,
    },

    /// Rebuild tool-call timelines from one or more generation outputs
    Trace {
        /// Generation output JSON files, or `-` for stdin
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Service label per input, in order (defaults to the file stem)
        #[arg(long = "service")]
        services: Vec<String>,

        #[command(flatten)]
        options: OutputOptions,
    },

    /// Parse the reply and rebuild the timeline of one generation output
    Analyze {
        /// Generation output JSON file, or `-` for stdin
        input: String,

        #[command(flatten)]
        options: OutputOptions,
    },

    /// Decode a nutrition-analysis reply
    Nutrition {
        /// Input file, or `-` for stdin
        input: String,

        /// Also report values per serving; free text such as "4-6 people"
        /// uses its leading number
        #[arg(long)]
        servings: Option<String>,

        #[command(flatten)]
        options: OutputOptions,
    },
}

#[derive(Parser, Clone)]
struct OutputOptions {
    /// Output format
    #[arg(long, default_value = "yaml", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TraceOutput<'a> {
    services: &'a [ServiceTrace],
    timeline: Vec<TimelineEntry<'a>>,
    summary: TraceSummary,
    total_duration_display: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NutritionOutput {
    #[serde(flatten)]
    report: NutritionReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    servings: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    per_serving: Option<NutritionTotals>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Recipe { input, options } => {
            let source = InputSource::parse(&input);
            let document = source.read_to_string()?;
            let recipe = parse(&document);
            tracing::info!(title = %recipe.title, "parsed recipe");
            output(&recipe, options.format)?;
        }
        Commands::Render { input, options } => {
            let document = InputSource::parse(&input).read_to_string()?;
            output(&render_blocks(&document), options.format)?;
        }
        Commands::Trace {
            inputs,
            services,
            options,
        } => {
            if services.len() > inputs.len() {
                anyhow::bail!(
                    "{} service labels given for {} inputs",
                    services.len(),
                    inputs.len()
                );
            }

            let mut traces = Vec::with_capacity(inputs.len());
            for (i, input) in inputs.iter().enumerate() {
                let source = InputSource::parse(input);
                let generation = source
                    .read_generation()
                    .with_context(|| format!("Failed to load trace input '{input}'"))?;
                let service = services.get(i).cloned().unwrap_or_else(|| source.name());
                traces.push(ServiceTrace {
                    invocations: reconstruct(
                        &generation.steps,
                        generation.overall_start_time,
                        generation.total_duration_ms,
                    ),
                    usage: generation.usage,
                    service,
                });
            }

            let summary = TraceSummary::from_services(&traces);
            let trace = TraceOutput {
                services: &traces,
                timeline: TraceSummary::timeline(&traces),
                total_duration_display: format_duration(summary.total_duration),
                summary,
            };
            output(&trace, options.format)?;
        }
        Commands::Analyze { input, options } => {
            let generation = InputSource::parse(&input).read_generation()?;
            output(&analyze(&generation), options.format)?;
        }
        Commands::Nutrition {
            input,
            servings,
            options,
        } => {
            let servings = match servings {
                Some(spec) => match servings_count(&spec) {
                    Some(n) => Some(n),
                    None => anyhow::bail!("No serving count in '{spec}'"),
                },
                None => None,
            };

            let text = InputSource::parse(&input).read_to_string()?;
            let report = extract_nutrition_report(&text);
            let per_serving = servings.map(|n| report.total_nutrition.per_serving(n));
            let nutrition = NutritionOutput {
                report,
                servings,
                per_serving,
            };
            output(&nutrition, options.format)?;
        }
    }

    Ok(())
}

fn output<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Yaml => {
            writeln!(handle, "---")?;
            let yaml = serde_yaml::to_string(value)?;
            write!(handle, "{}", yaml)?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            writeln!(handle, "{}", json)?;
        }
    }

    Ok(())
}
