use std::path::PathBuf;

use uuid::Uuid;

use blogforge_core::config::ConfigOverrides;
use blogforge_core::pipeline::RunRequest;
use blogforge_core::types::{Keyword, KeywordIntent};

use crate::context;
use crate::output::print_json;

pub struct RunArgs {
    pub keyword_id: Option<Uuid>,
    pub topic_id: Option<Uuid>,
    pub autopublish: bool,
    pub dry_run: bool,
}

/// `blogforge run` — execute one pipeline run and wait for the outcome.
///
/// `--dry-run` swaps in a throwaway store seeded with a demo keyword and the
/// scripted backend, leaving the real database untouched.
pub async fn run(
    db: &PathBuf,
    config_path: Option<&PathBuf>,
    args: RunArgs,
    json: bool,
) -> anyhow::Result<()> {
    let config = context::load_config(config_path)?;

    let _scratch;
    let store = if args.dry_run {
        let dir = tempfile::TempDir::new()?;
        let store = context::open_store(&dir.path().join("dry-run.redb"))?;
        store.insert_keyword(&Keyword::new(
            "pickleball courts",
            KeywordIntent::Informational,
            10,
        ))?;
        _scratch = dir;
        store
    } else {
        context::open_store(db)?
    };

    let pipeline = context::build_pipeline(store.clone(), config, args.dry_run)?;
    let request = RunRequest {
        keyword_id: args.keyword_id,
        topic_id: args.topic_id,
        overrides: ConfigOverrides {
            autopublish: args.autopublish.then_some(true),
            ..Default::default()
        },
    };

    let outcome = pipeline.run(request).await?;

    if json {
        print_json(&serde_json::json!({
            "success": outcome.success,
            "job_run_id": outcome.job_run_id,
            "post_id": outcome.post_id,
            "errors": outcome.errors,
            "warnings": outcome.warnings,
            "tokens": outcome.token_usage.total(),
        }))?;
    } else {
        println!("job run: {}", outcome.job_run_id);
        for warning in &outcome.warnings {
            println!("  warning: {warning}");
        }
        if let Some(post_id) = outcome.post_id {
            let post = store.post(post_id)?;
            println!(
                "created {} post \"{}\" ({} words) at /blog/{}",
                match post.status {
                    blogforge_core::types::PostStatus::Published => "published",
                    _ => "draft",
                },
                post.title,
                post.word_count,
                post.slug,
            );
        } else {
            for error in &outcome.errors {
                eprintln!("  error: {error}");
            }
        }
    }

    if !outcome.success {
        anyhow::bail!("pipeline run failed");
    }
    Ok(())
}
