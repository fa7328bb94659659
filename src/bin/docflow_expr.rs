//! Command-line interface for docflow expressions
//!
//! Evaluates single expressions or whole field definition files against a
//! document context, manages the counter file and prints the function
//! catalogue.

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use docflow_expr::counter::DEFAULT_RESET_VALUE;
use docflow_expr::{
    ContextBuilder, CounterCategory, CounterStore, EngineConfig, ExpressionEngine,
    FieldDefinition, FieldDocument, FieldEvaluator, FileCounterStore, InMemoryCounterStore,
    VariableContext, analyze_dependencies,
};
use log::{LevelFilter, debug};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "docflow-expr")]
#[command(about = "Evaluate document expressions, field definitions and counters")]
#[command(version)]
#[command(author = "OctoFHIR Team <funyloony@gmail.com>")]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Counter file; overrides the configured path
    #[arg(long, global = true)]
    counters: Option<PathBuf>,
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

/// Options describing the document an expression runs against
#[derive(Args)]
struct DocumentArgs {
    /// Variable as NAME=VALUE (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_variable)]
    vars: Vec<(String, String)>,
    /// Input file providing the file variables
    #[arg(long)]
    file: Option<PathBuf>,
    /// Watched root folder providing level0..levelN
    #[arg(long, requires = "file")]
    root: Option<PathBuf>,
    /// Text file with the recognized text of the document
    #[arg(long)]
    text: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one expression
    Evaluate {
        /// Expression to evaluate
        expression: String,
        #[command(flatten)]
        document: DocumentArgs,
    },
    /// Evaluate a field definition file in order
    Fields {
        /// JSON array of field definitions
        definitions: PathBuf,
        /// Previously stored field document to update
        #[arg(long)]
        document: Option<PathBuf>,
        /// Where to write the resulting document (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        context: DocumentArgs,
    },
    /// Inspect or change persistent counters
    Counters {
        #[command(subcommand)]
        action: CounterAction,
    },
    /// Print the function catalogue as markdown
    Functions,
    /// Report forward references and cycles in a field definition file
    Check {
        /// JSON array of field definitions
        definitions: PathBuf,
    },
}

#[derive(Subcommand)]
enum CounterAction {
    /// List counters
    List {
        /// Only this category
        #[arg(long)]
        category: Option<CounterCategory>,
    },
    /// Print a counter's next value
    Get {
        name: String,
        #[arg(long, default_value = "auto")]
        category: CounterCategory,
    },
    /// Set a counter's next value
    Set {
        name: String,
        value: i64,
        #[arg(long, default_value = "auto")]
        category: CounterCategory,
    },
    /// Restart a counter
    Reset {
        name: String,
        /// Value handed out next
        #[arg(long, default_value_t = DEFAULT_RESET_VALUE)]
        value: i64,
        #[arg(long, default_value = "auto")]
        category: CounterCategory,
    },
    /// Delete a counter
    Delete {
        name: String,
        #[arg(long, default_value = "auto")]
        category: CounterCategory,
    },
}

fn parse_variable(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    );
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let counters_path = cli.counters.clone().or_else(|| config.counters_path.clone());

    match cli.command {
        Commands::Evaluate {
            expression,
            document,
        } => {
            let engine = build_engine(config, counters_path.as_deref())?;
            let context = build_context(&engine, &document, None)?;
            println!("{}", engine.evaluate(&expression, &context));
        }
        Commands::Fields {
            definitions,
            document,
            output,
            context,
        } => {
            let fields = FieldDefinition::load_all(&definitions)?;
            let mut stored = match &document {
                Some(path) => FieldDocument::load(path)?,
                None => FieldDocument::new(),
            };
            let engine = build_engine(config, counters_path.as_deref())?;
            let mut variables = build_context(&engine, &context, Some(&stored))?;

            let evaluator = FieldEvaluator::new(engine);
            evaluator.evaluate_into(&fields, &mut variables, &mut stored);

            match output {
                Some(path) => {
                    stored.save(&path)?;
                    debug!("Wrote {} fields to {}", stored.len(), path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&stored)?),
            }
        }
        Commands::Counters { action } => {
            let path = counters_path
                .ok_or_else(|| anyhow!("no counter file given; use --counters or the config"))?;
            let store = FileCounterStore::open(&path)
                .with_context(|| format!("opening counter file {}", path.display()))?;
            run_counter_action(&store, action)?;
        }
        Commands::Functions => {
            let engine = build_engine(config, None)?;
            print!("{}", engine.registry().generate_function_docs());
        }
        Commands::Check { definitions } => {
            let fields = FieldDefinition::load_all(&definitions)?;
            let report = analyze_dependencies(&fields);
            print!("{report}");
            if !report.is_clean() {
                std::process::exit(2);
            }
        }
    }
    Ok(())
}

fn build_engine(config: EngineConfig, counters_path: Option<&Path>) -> Result<ExpressionEngine> {
    let counters: Arc<dyn CounterStore> = match counters_path {
        Some(path) => Arc::new(
            FileCounterStore::open(path)
                .with_context(|| format!("opening counter file {}", path.display()))?,
        ),
        None => Arc::new(InMemoryCounterStore::new()),
    };
    Ok(ExpressionEngine::builder()
        .with_config(config)
        .with_counters(counters)
        .build())
}

fn build_context(
    engine: &ExpressionEngine,
    args: &DocumentArgs,
    stored: Option<&FieldDocument>,
) -> Result<VariableContext> {
    let mut builder = ContextBuilder::from_engine(engine);
    if let Some(file) = &args.file {
        builder = builder.with_file(file);
        if let Some(root) = &args.root {
            builder = builder.with_hierarchy(file, root);
        }
    }
    if let Some(path) = &args.text {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading recognized text {}", path.display()))?;
        builder = builder.with_recognized_text(text);
    }
    if let Some(document) = stored {
        builder = builder.with_document(document);
    }
    Ok(builder.with_variables(args.vars.iter().cloned()).build())
}

fn run_counter_action(store: &FileCounterStore, action: CounterAction) -> Result<()> {
    match action {
        CounterAction::List { category } => {
            for counter in store.list_all()? {
                if category.is_none_or(|c| c == counter.category) {
                    println!("{}\t{}\t{}", counter.category, counter.name, counter.value);
                }
            }
        }
        CounterAction::Get { name, category } => match store.get(&name, category)? {
            Some(value) => println!("{value}"),
            None => bail!("counter {category}/{name} does not exist"),
        },
        CounterAction::Set {
            name,
            value,
            category,
        } => store.set(&name, category, value)?,
        CounterAction::Reset {
            name,
            value,
            category,
        } => store.reset(&name, category, value)?,
        CounterAction::Delete { name, category } => {
            if !store.delete(&name, category)? {
                bail!("counter {category}/{name} does not exist");
            }
        }
    }
    Ok(())
}
