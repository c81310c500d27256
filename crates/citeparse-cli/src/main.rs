use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use citeparse_core::config_file::{self, ConfigFile};
use citeparse_core::EntityRecognizer;
use citeparse_parsing::{
    FallbackPolicy, HeuristicRecognizer, NoopRecognizer, ParsingConfigBuilder, ReferenceParser,
    SplitMode,
};
use citeparse_store::ReferenceDb;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod output;

use output::{ColorMode, ReportFormat};

/// Citation parser - turn free-text reference strings into structured records
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file to use instead of the platform/.citeparse.toml cascade
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the reference database
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Parsing options shared by `parse` and `import`.
#[derive(clap::Args, Debug)]
struct ParseArgs {
    /// Input file with one reference per line; `-` or omitted reads stdin
    input: Option<PathBuf>,

    /// Join wrapped continuation lines onto the previous reference
    #[arg(long)]
    entries: bool,

    /// Skip structural patterns and use only field heuristics
    #[arg(long)]
    heuristic_only: bool,

    /// Entity recognizer consulted for institutions: heuristic or none
    #[arg(long)]
    recognizer: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse references and print the structured records
    Parse {
        #[command(flatten)]
        args: ParseArgs,

        /// Print records as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Path to output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse references and save them under a project
    Import {
        /// Project name (created if missing)
        #[arg(short, long)]
        project: String,

        #[command(flatten)]
        args: ParseArgs,
    },

    /// List projects
    Projects,

    /// List the stored references of a project, sorted by author
    List {
        #[arg(short, long)]
        project: String,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Delete a stored reference
    Delete {
        #[arg(long)]
        id: i64,
    },

    /// Export the references of a project
    Report {
        #[arg(short, long)]
        project: String,

        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Path to output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_config = match &cli.config {
        Some(path) => config_file::load_from_path(path)
            .with_context(|| format!("could not read config file {}", path.display()))?,
        None => config_file::load_config(),
    };

    match cli.command {
        Command::Parse {
            args,
            json,
            no_color,
            output,
        } => {
            let parser = build_parser(&file_config, &args)?;
            let blob = read_input(args.input.as_deref())?;
            let references = parser.parse_batch(&blob);

            let color = ColorMode(!no_color && !json && output.is_none());
            let mut writer = open_writer(output.as_deref())?;
            if json {
                serde_json::to_writer_pretty(&mut writer, &references)?;
                writeln!(writer)?;
            } else {
                output::print_references(&mut writer, &references, color)?;
            }
            Ok(())
        }
        Command::Import { project, args } => {
            let parser = build_parser(&file_config, &args)?;
            let blob = read_input(args.input.as_deref())?;
            let references = parser.parse_batch(&blob);

            let db = open_db(cli.db, &file_config)?;
            let project = db.ensure_project(&project)?;
            let ids = db.save_references(project.id, &references)?;
            println!(
                "Imported {} references into project '{}' (id {})",
                ids.len(),
                project.name,
                project.id
            );
            Ok(())
        }
        Command::Projects => {
            let db = open_db(cli.db, &file_config)?;
            output::print_projects(&mut std::io::stdout(), &db.list_projects()?)?;
            Ok(())
        }
        Command::List { project, no_color } => {
            let db = open_db(cli.db, &file_config)?;
            let project = db.project_by_name(&project)?;
            let stored = db.list_references(project.id)?;
            output::print_stored_list(&mut std::io::stdout(), &stored, ColorMode(!no_color))?;
            Ok(())
        }
        Command::Delete { id } => {
            let db = open_db(cli.db, &file_config)?;
            db.delete_reference(id)?;
            println!("Deleted reference {}", id);
            Ok(())
        }
        Command::Report {
            project,
            format,
            output,
        } => {
            let db = open_db(cli.db, &file_config)?;
            let project = db.project_by_name(&project)?;
            let stored = db.list_references(project.id)?;
            let content = output::export(&stored, format)?;
            let mut writer = open_writer(output.as_deref())?;
            writer.write_all(content.as_bytes())?;
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "citeparse=warn",
        1 => "citeparse=info",
        2 => "citeparse=debug",
        _ => "citeparse=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Resolve parsing settings: CLI flags > config file > defaults.
fn build_parser(file_config: &ConfigFile, args: &ParseArgs) -> anyhow::Result<ReferenceParser> {
    let mut builder = match &file_config.parsing {
        Some(section) => ParsingConfigBuilder::from_file_settings(section)?,
        None => ParsingConfigBuilder::new(),
    };
    if args.entries {
        builder = builder.split_mode(SplitMode::Entries);
    }
    if args.heuristic_only {
        builder = builder.fallback_policy(FallbackPolicy::HeuristicOnly);
    }
    let config = builder.build()?;

    let recognizer_name = args
        .recognizer
        .clone()
        .or_else(|| file_config.entities.as_ref().and_then(|e| e.recognizer.clone()))
        .unwrap_or_else(|| "none".to_string());
    let recognizer: Arc<dyn EntityRecognizer> = match recognizer_name.as_str() {
        "heuristic" => Arc::new(HeuristicRecognizer::new()),
        "none" => Arc::new(NoopRecognizer),
        other => anyhow::bail!("unknown entity recognizer '{}' (expected heuristic or none)", other),
    };

    Ok(ReferenceParser::with_config(config).with_recognizer(recognizer))
}

/// Resolve the database path: --db > CITEPARSE_DB > config file > platform default.
fn open_db(flag: Option<PathBuf>, file_config: &ConfigFile) -> anyhow::Result<ReferenceDb> {
    let path = flag
        .or_else(|| std::env::var("CITEPARSE_DB").ok().map(PathBuf::from))
        .or_else(|| {
            file_config
                .storage
                .as_ref()
                .and_then(|s| s.database_path.clone())
                .map(PathBuf::from)
        })
        .or_else(config_file::default_database_path)
        .context("could not determine a database path; pass --db or set CITEPARSE_DB")?;
    Ok(ReferenceDb::open(&path)?)
}

fn read_input(input: Option<&Path>) -> anyhow::Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display())),
        _ => {
            let mut blob = String::new();
            std::io::stdin().read_to_string(&mut blob)?;
            Ok(blob)
        }
    }
}

fn open_writer(output: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("could not create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    })
}
