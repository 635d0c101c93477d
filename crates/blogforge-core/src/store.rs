//! Persistent storage for pipeline records using redb.
//!
//! # Table design
//!
//! One table per record type, keyed by raw UUID bytes (16 bytes), values
//! JSON-encoded. The `post_keywords` join table uses a 32-byte composite
//! key `[post_id ++ keyword_id]`. Record counts are admin-tool scale, so
//! queries are full scans with in-memory filtering and sorting.
//!
//! `persist_run_artifacts` writes everything a successful run produces in a
//! single write transaction: the post, its keyword join row, its inserted
//! links, the keyword usage update, and the topic status flip commit
//! together or not at all.

use std::path::Path;

use chrono::Utc;
use redb::{Database, ReadableTable, TableDefinition};
use uuid::Uuid;

use crate::error::{BlogError, Result};
use crate::job::{JobProgress, JobRun, JobStatus, LogLevel, PipelineStage};
use crate::linker::PostSummary;
use crate::types::{
    Business, InsertedLink, Keyword, KeywordStatus, Post, PostKeyword, Topic, TopicStatus,
};

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

const KEYWORDS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("keywords");
const TOPICS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("topics");
const POSTS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("posts");
const POST_KEYWORDS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("post_keywords");
const LINKS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("links");
const BUSINESSES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("businesses");
const JOB_RUNS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("job_runs");

fn db_err(e: impl std::fmt::Display) -> BlogError {
    BlogError::Store(e.to_string())
}

fn join_key(post_id: Uuid, keyword_id: Uuid) -> [u8; 32] {
    let mut key = [0u8; 32];
    key[..16].copy_from_slice(post_id.as_bytes());
    key[16..].copy_from_slice(keyword_id.as_bytes());
    key
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Persistent store for keywords, topics, posts, links, businesses, and
/// job runs.
pub struct Store {
    db: Database,
}

impl Store {
    /// Open or create the database at `path`, creating all tables.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path).map_err(db_err)?;
        let wt = db.begin_write().map_err(db_err)?;
        wt.open_table(KEYWORDS).map_err(db_err)?;
        wt.open_table(TOPICS).map_err(db_err)?;
        wt.open_table(POSTS).map_err(db_err)?;
        wt.open_table(POST_KEYWORDS).map_err(db_err)?;
        wt.open_table(LINKS).map_err(db_err)?;
        wt.open_table(BUSINESSES).map_err(db_err)?;
        wt.open_table(JOB_RUNS).map_err(db_err)?;
        wt.commit().map_err(db_err)?;
        Ok(Self { db })
    }

    fn put<T: serde::Serialize>(
        &self,
        table: TableDefinition<&[u8], &[u8]>,
        key: &[u8],
        record: &T,
    ) -> Result<()> {
        let value = serde_json::to_vec(record)?;
        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut t = wt.open_table(table).map_err(db_err)?;
            t.insert(key, value.as_slice()).map_err(db_err)?;
        }
        wt.commit().map_err(db_err)?;
        Ok(())
    }

    fn get<T: serde::de::DeserializeOwned>(
        &self,
        table: TableDefinition<&[u8], &[u8]>,
        key: &[u8],
    ) -> Result<Option<T>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let t = rt.open_table(table).map_err(db_err)?;
        match t.get(key).map_err(db_err)? {
            Some(v) => Ok(Some(serde_json::from_slice(v.value())?)),
            None => Ok(None),
        }
    }

    fn scan<T: serde::de::DeserializeOwned>(
        &self,
        table: TableDefinition<&[u8], &[u8]>,
    ) -> Result<Vec<T>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let t = rt.open_table(table).map_err(db_err)?;
        let mut out = Vec::new();
        for entry in t.iter().map_err(db_err)? {
            let (_, v) = entry.map_err(db_err)?;
            out.push(serde_json::from_slice(v.value())?);
        }
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // Keywords
    // -----------------------------------------------------------------------

    pub fn insert_keyword(&self, keyword: &Keyword) -> Result<()> {
        self.put(KEYWORDS, keyword.id.as_bytes(), keyword)
    }

    pub fn keyword(&self, id: Uuid) -> Result<Keyword> {
        self.get(KEYWORDS, id.as_bytes())?
            .ok_or(BlogError::KeywordNotFound(id))
    }

    pub fn list_keywords(&self) -> Result<Vec<Keyword>> {
        let mut keywords: Vec<Keyword> = self.scan(KEYWORDS)?;
        keywords.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(keywords)
    }

    pub fn update_keyword(&self, keyword: &Keyword) -> Result<()> {
        self.insert_keyword(keyword)
    }

    /// The pending keyword with highest priority, ties broken by oldest
    /// `last_used_at` with never-used keywords first.
    pub fn select_pending_keyword(&self) -> Result<Option<Keyword>> {
        let mut pending: Vec<Keyword> = self
            .scan::<Keyword>(KEYWORDS)?
            .into_iter()
            .filter(|k| k.status == KeywordStatus::Pending)
            .collect();
        pending.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| match (a.last_used_at, b.last_used_at) {
                    (None, None) => std::cmp::Ordering::Equal,
                    (None, Some(_)) => std::cmp::Ordering::Less,
                    (Some(_), None) => std::cmp::Ordering::Greater,
                    (Some(x), Some(y)) => x.cmp(&y),
                })
        });
        Ok(pending.into_iter().next())
    }

    // -----------------------------------------------------------------------
    // Topics
    // -----------------------------------------------------------------------

    pub fn insert_topic(&self, topic: &Topic) -> Result<()> {
        self.put(TOPICS, topic.id.as_bytes(), topic)
    }

    /// Persist a batch of topic candidates in one transaction.
    pub fn insert_topics(&self, topics: &[Topic]) -> Result<()> {
        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut t = wt.open_table(TOPICS).map_err(db_err)?;
            for topic in topics {
                let value = serde_json::to_vec(topic)?;
                t.insert(topic.id.as_bytes().as_slice(), value.as_slice())
                    .map_err(db_err)?;
            }
        }
        wt.commit().map_err(db_err)?;
        Ok(())
    }

    pub fn topic(&self, id: Uuid) -> Result<Topic> {
        self.get(TOPICS, id.as_bytes())?
            .ok_or(BlogError::TopicNotFound(id))
    }

    pub fn topics_for_keyword(&self, keyword_id: Uuid) -> Result<Vec<Topic>> {
        let mut topics: Vec<Topic> = self
            .scan::<Topic>(TOPICS)?
            .into_iter()
            .filter(|t| t.keyword_id == keyword_id)
            .collect();
        topics.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(topics)
    }

    /// Highest-scoring approved topic for a keyword, if any.
    pub fn approved_topic_for(&self, keyword_id: Uuid) -> Result<Option<Topic>> {
        Ok(self
            .topics_for_keyword(keyword_id)?
            .into_iter()
            .find(|t| t.status == TopicStatus::Approved))
    }

    // -----------------------------------------------------------------------
    // Posts
    // -----------------------------------------------------------------------

    pub fn post(&self, id: Uuid) -> Result<Post> {
        self.get(POSTS, id.as_bytes())?
            .ok_or_else(|| BlogError::PostNotFound(id.to_string()))
    }

    pub fn post_by_slug(&self, slug: &str) -> Result<Post> {
        self.scan::<Post>(POSTS)?
            .into_iter()
            .find(|p| p.slug == slug)
            .ok_or_else(|| BlogError::PostNotFound(slug.to_string()))
    }

    pub fn list_posts(&self) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self.scan(POSTS)?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    pub fn existing_slugs(&self) -> Result<Vec<String>> {
        Ok(self.scan::<Post>(POSTS)?.into_iter().map(|p| p.slug).collect())
    }

    /// Most recent post titles, newest first, capped at `limit`.
    pub fn recent_post_titles(&self, limit: usize) -> Result<Vec<String>> {
        Ok(self
            .list_posts()?
            .into_iter()
            .take(limit)
            .map(|p| p.title)
            .collect())
    }

    /// True if another post (excluding `exclude_id`) already uses this slug
    /// or a case-insensitively identical title.
    pub fn find_duplicate(&self, slug: &str, title: &str, exclude_id: Option<Uuid>) -> Result<bool> {
        let title_lower = title.to_lowercase();
        Ok(self.scan::<Post>(POSTS)?.into_iter().any(|p| {
            Some(p.id) != exclude_id
                && (p.slug == slug || p.title.to_lowercase() == title_lower)
        }))
    }

    /// Link-discovery view of every stored post: summary fields plus the
    /// texts of its associated keywords.
    pub fn post_summaries(&self) -> Result<Vec<PostSummary>> {
        let joins: Vec<PostKeyword> = self.scan(POST_KEYWORDS)?;
        let keywords: Vec<Keyword> = self.scan(KEYWORDS)?;
        Ok(self
            .scan::<Post>(POSTS)?
            .into_iter()
            .map(|p| {
                let texts = joins
                    .iter()
                    .filter(|j| j.post_id == p.id)
                    .filter_map(|j| keywords.iter().find(|k| k.id == j.keyword_id))
                    .map(|k| k.text.clone())
                    .collect();
                PostSummary {
                    id: p.id,
                    slug: p.slug,
                    title: p.title,
                    excerpt: p.excerpt,
                    keywords: texts,
                }
            })
            .collect())
    }

    pub fn links_for_post(&self, post_id: Uuid) -> Result<Vec<InsertedLink>> {
        Ok(self
            .scan::<InsertedLink>(LINKS)?
            .into_iter()
            .filter(|l| l.source_post_id == post_id)
            .collect())
    }

    // -----------------------------------------------------------------------
    // Businesses
    // -----------------------------------------------------------------------

    pub fn insert_business(&self, business: &Business) -> Result<()> {
        self.put(BUSINESSES, business.id.as_bytes(), business)
    }

    pub fn list_businesses(&self) -> Result<Vec<Business>> {
        self.scan(BUSINESSES)
    }

    // -----------------------------------------------------------------------
    // Job runs
    // -----------------------------------------------------------------------

    pub fn insert_job_run(&self, run: &JobRun) -> Result<()> {
        self.put(JOB_RUNS, run.id.as_bytes(), run)
    }

    pub fn job_run(&self, id: Uuid) -> Result<JobRun> {
        self.get(JOB_RUNS, id.as_bytes())?
            .ok_or(BlogError::JobRunNotFound(id))
    }

    pub fn list_job_runs(&self) -> Result<Vec<JobRun>> {
        let mut runs: Vec<JobRun> = self.scan(JOB_RUNS)?;
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(runs)
    }

    fn update_job_run(&self, id: Uuid, mutate: impl FnOnce(&mut JobRun) -> Result<()>) -> Result<()> {
        let mut run = self.job_run(id)?;
        mutate(&mut run)?;
        self.put(JOB_RUNS, id.as_bytes(), &run)
    }

    pub fn append_job_log(&self, id: Uuid, level: LogLevel, message: &str) -> Result<()> {
        self.update_job_run(id, |run| {
            run.log(level, message);
            Ok(())
        })
    }

    pub fn set_job_stage(&self, id: Uuid, stage: PipelineStage) -> Result<()> {
        self.update_job_run(id, |run| {
            run.stage = stage;
            Ok(())
        })
    }

    /// Attach the records a run has resolved so far. `None` keeps the
    /// stored value.
    pub fn set_job_refs(
        &self,
        id: Uuid,
        keyword_id: Option<Uuid>,
        topic_id: Option<Uuid>,
        post_id: Option<Uuid>,
    ) -> Result<()> {
        self.update_job_run(id, |run| {
            if keyword_id.is_some() {
                run.keyword_id = keyword_id;
            }
            if topic_id.is_some() {
                run.topic_id = topic_id;
            }
            if post_id.is_some() {
                run.post_id = post_id;
            }
            Ok(())
        })
    }

    pub fn record_job_usage(&self, id: Uuid, usage: genai_client::TokenUsage) -> Result<()> {
        self.update_job_run(id, |run| {
            run.token_usage = Some(usage);
            Ok(())
        })
    }

    /// Terminal transition for a stored run; rejected if already terminal.
    pub fn finalize_job(&self, id: Uuid, status: JobStatus, error: Option<String>) -> Result<()> {
        self.update_job_run(id, |run| run.finalize(status, error))
    }

    /// Poller-facing view: run fields plus the slug of the produced post.
    pub fn job_progress(&self, id: Uuid) -> Result<JobProgress> {
        let run = self.job_run(id)?;
        let post_slug = match run.post_id {
            Some(post_id) => self.post(post_id).ok().map(|p| p.slug),
            None => None,
        };
        Ok(JobProgress {
            id: run.id,
            status: run.status,
            stage: run.stage,
            logs: run.logs,
            post_slug,
            error: run.error,
        })
    }

    // -----------------------------------------------------------------------
    // Run persistence
    // -----------------------------------------------------------------------

    /// Write everything a successful run produces in one transaction: the
    /// post, its primary keyword join row, every inserted link, the keyword
    /// usage update (`used`, count+1, `last_used_at=now`), and the topic's
    /// `used` flip. All-or-nothing.
    pub fn persist_run_artifacts(
        &self,
        post: &Post,
        keyword_id: Uuid,
        links: &[InsertedLink],
    ) -> Result<()> {
        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut posts = wt.open_table(POSTS).map_err(db_err)?;
            posts
                .insert(
                    post.id.as_bytes().as_slice(),
                    serde_json::to_vec(post)?.as_slice(),
                )
                .map_err(db_err)?;

            let mut joins = wt.open_table(POST_KEYWORDS).map_err(db_err)?;
            let join = PostKeyword {
                post_id: post.id,
                keyword_id,
                is_primary: true,
            };
            joins
                .insert(
                    join_key(post.id, keyword_id).as_slice(),
                    serde_json::to_vec(&join)?.as_slice(),
                )
                .map_err(db_err)?;

            let mut link_table = wt.open_table(LINKS).map_err(db_err)?;
            for link in links {
                link_table
                    .insert(
                        link.id.as_bytes().as_slice(),
                        serde_json::to_vec(link)?.as_slice(),
                    )
                    .map_err(db_err)?;
            }

            let mut keywords = wt.open_table(KEYWORDS).map_err(db_err)?;
            let mut keyword: Keyword = match keywords.get(keyword_id.as_bytes().as_slice()).map_err(db_err)? {
                Some(v) => serde_json::from_slice(v.value())?,
                None => return Err(BlogError::KeywordNotFound(keyword_id)),
            };
            keyword.status = KeywordStatus::Used;
            keyword.usage_count += 1;
            keyword.last_used_at = Some(Utc::now());
            keywords
                .insert(
                    keyword_id.as_bytes().as_slice(),
                    serde_json::to_vec(&keyword)?.as_slice(),
                )
                .map_err(db_err)?;

            let mut topics = wt.open_table(TOPICS).map_err(db_err)?;
            let mut topic: Topic = match topics.get(post.topic_id.as_bytes().as_slice()).map_err(db_err)? {
                Some(v) => serde_json::from_slice(v.value())?,
                None => return Err(BlogError::TopicNotFound(post.topic_id)),
            };
            topic.status = TopicStatus::Used;
            topics
                .insert(
                    post.topic_id.as_bytes().as_slice(),
                    serde_json::to_vec(&topic)?.as_slice(),
                )
                .map_err(db_err)?;
        }
        wt.commit().map_err(db_err)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
