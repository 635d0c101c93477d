mod cmd;
mod context;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cmd::{job::JobSubcommand, keyword::KeywordSubcommand, post::PostSubcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "blogforge",
    about = "Automated blog content pipeline — keyword queue, generation runs, and the admin API",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to the content database
    #[arg(long, global = true, env = "BLOGFORGE_DB", default_value = "blogforge.redb")]
    db: PathBuf,

    /// Path to a pipeline config file (YAML)
    #[arg(long, global = true, env = "BLOGFORGE_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one generation run and wait for the outcome
    Run {
        /// Pin the run to a specific keyword
        #[arg(long)]
        keyword_id: Option<Uuid>,

        /// Pin the run to a specific topic
        #[arg(long)]
        topic_id: Option<Uuid>,

        /// Publish immediately when the quality floors are met
        #[arg(long)]
        autopublish: bool,

        /// Run against a throwaway store with a demo keyword and scripted backend
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage the keyword queue
    Keyword {
        #[command(subcommand)]
        subcommand: KeywordSubcommand,
    },

    /// Inspect job runs
    Job {
        #[command(subcommand)]
        subcommand: JobSubcommand,
    },

    /// Inspect generated posts
    Post {
        #[command(subcommand)]
        subcommand: PostSubcommand,
    },

    /// Run the admin API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "3141")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } | Commands::Run { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    // Logs go to stderr so `--json` output on stdout stays machine-parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run {
            keyword_id,
            topic_id,
            autopublish,
            dry_run,
        } => {
            cmd::run::run(
                &cli.db,
                cli.config.as_ref(),
                cmd::run::RunArgs {
                    keyword_id,
                    topic_id,
                    autopublish,
                    dry_run,
                },
                cli.json,
            )
            .await
        }
        Commands::Keyword { subcommand } => cmd::keyword::run(&cli.db, subcommand, cli.json),
        Commands::Job { subcommand } => cmd::job::run(&cli.db, subcommand, cli.json).await,
        Commands::Post { subcommand } => cmd::post::run(&cli.db, subcommand, cli.json),
        Commands::Serve { port } => cmd::serve::run(&cli.db, cli.config.as_ref(), port).await,
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
