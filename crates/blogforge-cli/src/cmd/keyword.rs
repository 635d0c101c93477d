use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use serde::Deserialize;

use blogforge_core::types::{Keyword, KeywordIntent};

use crate::context;
use crate::output::{print_json, print_table};

#[derive(Subcommand)]
pub enum KeywordSubcommand {
    /// Add a single keyword to the queue
    Add {
        text: String,
        #[arg(long, value_enum, default_value = "informational")]
        intent: IntentArg,
        #[arg(long, default_value_t = 0)]
        priority: i32,
    },
    /// Import keywords from a JSON file (array of {text, intent?, priority?})
    Import { file: PathBuf },
    /// List the keyword queue
    List,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum IntentArg {
    Informational,
    Transactional,
    Navigational,
    Commercial,
}

impl From<IntentArg> for KeywordIntent {
    fn from(value: IntentArg) -> Self {
        match value {
            IntentArg::Informational => KeywordIntent::Informational,
            IntentArg::Transactional => KeywordIntent::Transactional,
            IntentArg::Navigational => KeywordIntent::Navigational,
            IntentArg::Commercial => KeywordIntent::Commercial,
        }
    }
}

#[derive(Deserialize)]
struct ImportEntry {
    text: String,
    #[serde(default = "default_intent")]
    intent: KeywordIntent,
    #[serde(default)]
    priority: i32,
}

fn default_intent() -> KeywordIntent {
    KeywordIntent::Informational
}

pub fn run(db: &Path, subcmd: KeywordSubcommand, json: bool) -> anyhow::Result<()> {
    let store = context::open_store(db)?;
    match subcmd {
        KeywordSubcommand::Add {
            text,
            intent,
            priority,
        } => {
            let keyword = Keyword::new(text.trim(), intent.into(), priority);
            store.insert_keyword(&keyword)?;
            if json {
                print_json(&keyword)?;
            } else {
                println!("added keyword \"{}\" ({})", keyword.text, keyword.id);
            }
            Ok(())
        }
        KeywordSubcommand::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let entries: Vec<ImportEntry> =
                serde_json::from_str(&raw).context("expected a JSON array of keyword objects")?;
            let mut imported = 0usize;
            for entry in entries {
                if entry.text.trim().is_empty() {
                    continue;
                }
                store.insert_keyword(&Keyword::new(
                    entry.text.trim(),
                    entry.intent,
                    entry.priority,
                ))?;
                imported += 1;
            }
            if json {
                print_json(&serde_json::json!({ "imported": imported }))?;
            } else {
                println!("imported {imported} keywords");
            }
            Ok(())
        }
        KeywordSubcommand::List => {
            let keywords = store.list_keywords()?;
            if json {
                print_json(&keywords)?;
            } else {
                let rows = keywords
                    .iter()
                    .map(|k| {
                        vec![
                            k.id.to_string(),
                            k.text.clone(),
                            format!("{:?}", k.intent).to_lowercase(),
                            k.priority.to_string(),
                            format!("{:?}", k.status).to_lowercase(),
                            k.usage_count.to_string(),
                        ]
                    })
                    .collect();
                print_table(&["id", "text", "intent", "priority", "status", "uses"], rows);
            }
            Ok(())
        }
    }
}
