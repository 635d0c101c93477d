use std::path::Path;

use clap::Subcommand;

use crate::context;
use crate::output::{print_json, print_table};

#[derive(Subcommand)]
pub enum PostSubcommand {
    /// List posts, newest first
    List,
    /// Show one post by slug
    Show { slug: String },
}

pub fn run(db: &Path, subcmd: PostSubcommand, json: bool) -> anyhow::Result<()> {
    let store = context::open_store(db)?;
    match subcmd {
        PostSubcommand::List => {
            let posts = store.list_posts()?;
            if json {
                let list: Vec<serde_json::Value> = posts
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "id": p.id,
                            "title": p.title,
                            "slug": p.slug,
                            "status": p.status,
                            "word_count": p.word_count,
                            "created_at": p.created_at,
                        })
                    })
                    .collect();
                print_json(&list)?;
            } else {
                let rows = posts
                    .iter()
                    .map(|p| {
                        vec![
                            p.slug.clone(),
                            p.title.clone(),
                            format!("{:?}", p.status).to_lowercase(),
                            p.word_count.to_string(),
                            p.created_at.format("%Y-%m-%d").to_string(),
                        ]
                    })
                    .collect();
                print_table(&["slug", "title", "status", "words", "created"], rows);
            }
            Ok(())
        }
        PostSubcommand::Show { slug } => {
            let post = store.post_by_slug(&slug)?;
            if json {
                print_json(&post)?;
            } else {
                println!("{}", post.title);
                println!("slug:      {}", post.slug);
                println!("status:    {:?}", post.status);
                println!("words:     {}", post.word_count);
                println!("reading:   {} min", post.reading_time_minutes);
                println!("canonical: {}", post.canonical_url);
                println!("seo title: {}", post.seo_title);
                println!("meta:      {}", post.meta_description);
                println!("faqs:      {}", post.faqs.len());
                println!();
                println!("{}", post.content_markdown);
            }
            Ok(())
        }
    }
}
