mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pocket-cli", about = "Pocket Classroom study capsules", version)]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory from the config file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List capsules, most recently updated first
    List,

    /// Show a capsule's notes, flashcards and quiz
    Show {
        /// Capsule id (or unique title prefix)
        capsule: String,
    },

    /// Create a new capsule
    New {
        #[arg(long)]
        title: String,
        #[arg(long)]
        subject: Option<String>,
        /// Beginner, Intermediate, Advanced, ...
        #[arg(long)]
        level: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// A note (repeatable)
        #[arg(long = "note")]
        notes: Vec<String>,
        /// A flashcard as FRONT::BACK (repeatable)
        #[arg(long = "card")]
        cards: Vec<String>,
        /// A question as "QUESTION|CHOICE|CHOICE|...|ANSWER_INDEX" (repeatable)
        #[arg(long = "question")]
        questions: Vec<String>,
    },

    /// Delete a capsule and its progress
    Delete {
        capsule: String,
    },

    /// Export a capsule as interchange JSON
    Export {
        capsule: String,
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Import a capsule from an interchange JSON file (use "-" for stdin)
    Import {
        path: String,
    },

    /// Take a capsule's quiz interactively
    Quiz {
        capsule: String,
    },

    /// Mark a flashcard as known or unknown
    Cards {
        capsule: String,
        #[arg(value_enum)]
        mark: CardMark,
        /// Zero-based flashcard index
        index: usize,
    },

    /// Recompute the capsule index from stored capsules
    Reindex,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum CardMark {
    Known,
    Unknown,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let app = app::App::new(cli.config.as_deref(), cli.data_dir)?;

    match cli.command {
        Command::List => {
            commands::list::run(&app, &cli.format, use_color)?;
        }
        Command::Show { capsule } => {
            commands::show::run(&app, &capsule, &cli.format, use_color)?;
        }
        Command::New {
            title,
            subject,
            level,
            description,
            notes,
            cards,
            questions,
        } => {
            let form = commands::new::NewCapsule {
                title,
                subject,
                level,
                description,
                notes,
                cards,
                questions,
            };
            commands::new::run(&app, form, &cli.format)?;
        }
        Command::Delete { capsule } => {
            commands::delete::run(&app, &capsule, &cli.format)?;
        }
        Command::Export { capsule, output } => {
            commands::export::run(&app, &capsule, output.as_deref())?;
        }
        Command::Import { path } => {
            commands::import::run(&app, &path, &cli.format)?;
        }
        Command::Quiz { capsule } => {
            commands::quiz::run(&app, &capsule, use_color)?;
        }
        Command::Cards {
            capsule,
            mark,
            index,
        } => {
            commands::cards::run(&app, &capsule, mark, index, &cli.format)?;
        }
        Command::Reindex => {
            let count = app.state.capsules.rebuild_index()?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::json!({ "entries": count })),
                OutputFormat::Plain => println!("Index rebuilt: {} capsules", count),
            }
        }
    }

    Ok(())
}
