use std::path::Path;
use std::time::Duration;

use clap::Subcommand;
use uuid::Uuid;

use blogforge_core::job::LogLevel;

use crate::context;
use crate::output::{print_json, print_table};

#[derive(Subcommand)]
pub enum JobSubcommand {
    /// List job runs, newest first
    List,
    /// Show one job run's progress and log
    Show {
        id: Uuid,
        /// Poll every 3 seconds until the run reaches a terminal status
        #[arg(long)]
        follow: bool,
    },
}

pub async fn run(db: &Path, subcmd: JobSubcommand, json: bool) -> anyhow::Result<()> {
    let store = context::open_store(db)?;
    match subcmd {
        JobSubcommand::List => {
            let runs = store.list_job_runs()?;
            if json {
                print_json(&runs)?;
            } else {
                let rows = runs
                    .iter()
                    .map(|r| {
                        vec![
                            r.id.to_string(),
                            r.status.as_str().to_string(),
                            format!("{:?}", r.stage).to_lowercase(),
                            r.started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                            r.duration_ms
                                .map(|ms| format!("{ms}ms"))
                                .unwrap_or_else(|| "-".to_string()),
                            r.error.clone().unwrap_or_else(|| "-".to_string()),
                        ]
                    })
                    .collect();
                print_table(&["id", "status", "stage", "started", "duration", "error"], rows);
            }
            Ok(())
        }
        JobSubcommand::Show { id, follow } => {
            let mut printed_logs = 0usize;
            loop {
                let progress = store.job_progress(id)?;
                if json && !follow {
                    return print_json(&progress);
                }
                for entry in progress.logs.iter().skip(printed_logs) {
                    let level = match entry.level {
                        LogLevel::Info => "info",
                        LogLevel::Warning => "warn",
                        LogLevel::Error => "error",
                    };
                    println!(
                        "{} [{level}] {}",
                        entry.timestamp.format("%H:%M:%S"),
                        entry.message
                    );
                }
                printed_logs = progress.logs.len();

                if progress.status.is_terminal() || !follow {
                    println!(
                        "status: {} (stage: {:?})",
                        progress.status.as_str(),
                        progress.stage
                    );
                    if let Some(slug) = &progress.post_slug {
                        println!("post: /blog/{slug}");
                    }
                    if let Some(error) = &progress.error {
                        println!("error: {error}");
                    }
                    return Ok(());
                }
                tokio::time::sleep(Duration::from_secs(3)).await;
            }
        }
    }
}
