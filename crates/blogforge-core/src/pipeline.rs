//! The generation orchestrator: keyword in, persisted article out.
//!
//! A run walks ten steps in strict order, logging each one to its job run
//! and updating the explicit stage field at every boundary. Failures abort
//! the run and finalize the job `failed` — except image generation, which
//! degrades to a warning, and quality-gate findings, which are data that
//! only gate the autopublish decision.
//!
//! All collaborators are injected: the store, the three backend traits, and
//! the resolved configuration. There is no global state and no retry logic;
//! a failed run is re-triggered by the caller.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use genai_client::{
    ImageGenerator, ImageStore, InternalMention, MentionKind, TextGenerator, TokenUsage,
};

use crate::config::{ConfigOverrides, PipelineConfig};
use crate::error::{BlogError, Result};
use crate::job::{JobRun, JobStatus, LogLevel, PipelineStage};
use crate::linker::{self, HeuristicMatcher};
use crate::markdown;
use crate::quality;
use crate::seo;
use crate::store::Store;
use crate::types::{
    ArticleContent, Faq, Keyword, LinkSuggestion, Post, PostStatus, Topic, TopicStatus,
};

/// Topic candidates requested when no approved topic exists.
const TOPIC_CANDIDATES: usize = 5;
/// FAQ entries requested per article.
const FAQ_COUNT: usize = 5;
/// Existing titles passed to topic ideation for duplicate avoidance.
const EXISTING_TITLE_CAP: usize = 50;
/// Business mentions offered as advisory context before generation.
const PRELIM_BUSINESS_CAP: usize = 3;

// ---------------------------------------------------------------------------
// Request / outcome
// ---------------------------------------------------------------------------

/// Caller inputs for one run. Everything is optional: an empty request
/// selects the next pending keyword under stored configuration.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub keyword_id: Option<Uuid>,
    pub topic_id: Option<Uuid>,
    pub overrides: ConfigOverrides,
}

/// What the caller gets back. Pipeline failures are reported here, not as
/// `Err` — the job run carries the same information for pollers.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub success: bool,
    pub post_id: Option<Uuid>,
    pub job_run_id: Uuid,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub token_usage: TokenUsage,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct Pipeline {
    store: Arc<Store>,
    text: Arc<dyn TextGenerator>,
    images: Arc<dyn ImageGenerator>,
    image_store: Arc<dyn ImageStore>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        store: Arc<Store>,
        text: Arc<dyn TextGenerator>,
        images: Arc<dyn ImageGenerator>,
        image_store: Arc<dyn ImageStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            text,
            images,
            image_store,
            config,
        }
    }

    /// Create and persist the job record before any work happens, so
    /// pollers can attach as soon as the caller has the id.
    pub fn prepare_job(&self) -> Result<JobRun> {
        let run = JobRun::start("blog_generation");
        self.store.insert_job_run(&run)?;
        Ok(run)
    }

    /// Run the full pipeline, creating the job record inline. Errors only
    /// if the job record itself cannot be written.
    pub async fn run(&self, request: RunRequest) -> Result<RunOutcome> {
        let job = self.prepare_job()?;
        Ok(self.execute_job(job.id, request).await)
    }

    /// Run the pipeline against an already-persisted job record. This is
    /// the entry point for callers that hand out the job id before the
    /// work starts (the HTTP trigger endpoint).
    pub async fn execute_job(&self, job_id: Uuid, request: RunRequest) -> RunOutcome {
        let mut warnings = Vec::new();
        let mut usage = TokenUsage::default();

        match self.execute(job_id, &request, &mut warnings, &mut usage).await {
            Ok(post_id) => {
                self.finalize(job_id, JobStatus::Completed, None, usage);
                info!(%job_id, %post_id, "pipeline run completed");
                RunOutcome {
                    success: true,
                    post_id: Some(post_id),
                    job_run_id: job_id,
                    errors: Vec::new(),
                    warnings,
                    token_usage: usage,
                }
            }
            Err(err) => {
                let message = err.to_string();
                warn!(%job_id, error = %message, "pipeline run failed");
                self.job_log(job_id, LogLevel::Error, &message);
                self.finalize(job_id, JobStatus::Failed, Some(message.clone()), usage);
                RunOutcome {
                    success: false,
                    post_id: None,
                    job_run_id: job_id,
                    errors: vec![message],
                    warnings,
                    token_usage: usage,
                }
            }
        }
    }

    async fn execute(
        &self,
        job_id: Uuid,
        request: &RunRequest,
        warnings: &mut Vec<String>,
        usage: &mut TokenUsage,
    ) -> Result<Uuid> {
        // 1. Configuration.
        self.stage(job_id, PipelineStage::ResolvingConfig);
        let config = self.config.merged(&request.overrides);
        self.job_log(job_id, LogLevel::Info, "configuration resolved");

        // 2. Keyword.
        self.stage(job_id, PipelineStage::SelectingKeyword);
        let keyword = self.select_keyword(request.keyword_id)?;
        self.store.set_job_refs(job_id, Some(keyword.id), None, None)?;
        self.job_log(
            job_id,
            LogLevel::Info,
            &format!("selected keyword \"{}\"", keyword.text),
        );

        // 3. Topic.
        self.stage(job_id, PipelineStage::ResolvingTopic);
        let topic = self.resolve_topic(request.topic_id, &keyword, usage).await?;
        self.store.set_job_refs(job_id, None, Some(topic.id), None)?;
        self.job_log(
            job_id,
            LogLevel::Info,
            &format!("resolved topic \"{}\"", topic.title),
        );

        // 4. Content generation.
        self.stage(job_id, PipelineStage::GeneratingContent);
        let summaries = self.store.post_summaries()?;
        let businesses = self.store.list_businesses()?;
        let mentions = preliminary_mentions(&topic.title, &summaries, &businesses);
        let settings = config.article_settings(mentions);
        let content = self.generate_content(&topic, &keyword, &settings).await?;
        usage.add(content.token_usage);
        let faqs = content.faqs;
        let mut body = content.body_markdown;
        self.job_log(
            job_id,
            LogLevel::Info,
            &format!("generated {} words", markdown::word_count(&body)),
        );

        // 5. Internal links, re-derived from the final body.
        self.stage(job_id, PipelineStage::InsertingLinks);
        let post_id = Uuid::new_v4();
        let suggestions = final_suggestions(&keyword.text, &body, &summaries, &businesses);
        let (linked, inserted) = linker::insert_links(
            &body,
            &suggestions,
            &HeuristicMatcher,
            post_id,
            config.max_internal_links,
        );
        body = linker::append_related_articles(&linked, &suggestions);
        self.job_log(
            job_id,
            LogLevel::Info,
            &format!("inserted {} internal links", inserted.len()),
        );

        // 6. SEO metadata.
        self.stage(job_id, PipelineStage::ProcessingSeo);
        let existing = self.store.existing_slugs()?;
        let slug = seo::generate_slug(&topic.title, &existing);
        let excerpt = markdown::excerpt(&body, 200);
        let seo_data = seo::SeoData {
            seo_title: seo::optimize_title(&topic.title, &keyword.text),
            meta_description: seo::optimize_description(&excerpt, &keyword.text),
            slug: slug.clone(),
            primary_keyword: keyword.text.clone(),
            canonical_url: seo::canonical_url(&config.site_base_url, &slug),
        };
        self.job_log(job_id, LogLevel::Info, &format!("slug \"{slug}\""));

        // 7. Images (non-fatal).
        self.stage(job_id, PipelineStage::GeneratingImages);
        let cover_image_url = self
            .upload_image(job_id, warnings, "cover", &slug, || async {
                self.images.generate_cover_image(&seo_data.seo_title).await
            })
            .await;
        let og_image_url = self
            .upload_image(job_id, warnings, "og", &slug, || async {
                self.images
                    .generate_og_image(&seo_data.seo_title, &excerpt)
                    .await
            })
            .await;

        // 8. Quality gate.
        self.stage(job_id, PipelineStage::EvaluatingQuality);
        let duplicate = self.store.find_duplicate(&slug, &topic.title, None)?;
        let report = quality::evaluate(&body, &seo_data, &faqs, &config.quality, duplicate);
        for finding in report.errors.iter().chain(report.warnings.iter()) {
            self.job_log(job_id, LogLevel::Warning, &format!("quality: {finding}"));
            warnings.push(format!("quality: {finding}"));
        }
        let publish = config.autopublish && report.meets_publishing_requirements();
        self.job_log(
            job_id,
            LogLevel::Info,
            &format!(
                "quality score {} -> {}",
                report.score,
                if publish { "publishing" } else { "saving as draft" }
            ),
        );

        // 9. Persist everything in one transaction.
        self.stage(job_id, PipelineStage::Persisting);
        let now = Utc::now();
        let post = Post {
            id: post_id,
            topic_id: topic.id,
            title: topic.title.clone(),
            slug,
            excerpt,
            content_html: markdown::to_html(&body),
            seo_title: seo_data.seo_title.clone(),
            meta_description: seo_data.meta_description.clone(),
            canonical_url: seo_data.canonical_url.clone(),
            cover_image_url,
            og_image_url,
            faqs,
            toc: markdown::toc(&body),
            reading_time_minutes: markdown::reading_time_minutes(&body),
            word_count: markdown::word_count(&body),
            status: if publish {
                PostStatus::Published
            } else {
                PostStatus::Draft
            },
            published_at: publish.then_some(now),
            scheduled_at: None,
            created_at: now,
            content_markdown: body,
        };
        self.store.persist_run_artifacts(&post, keyword.id, &inserted)?;
        self.store.set_job_refs(job_id, None, None, Some(post_id))?;
        self.job_log(job_id, LogLevel::Info, "post persisted");

        // 10. Finalization happens in execute_job.
        Ok(post_id)
    }

    /// The four ordered text-generation calls, bundled into one in-memory
    /// record. The returned usage covers exactly these calls.
    async fn generate_content(
        &self,
        topic: &Topic,
        keyword: &Keyword,
        settings: &genai_client::ArticleSettings,
    ) -> Result<ArticleContent> {
        let mut usage = TokenUsage::default();

        let outline = self
            .text
            .generate_outline(&topic.title, settings)
            .await
            .map_err(|e| BlogError::ContentGenerationFailed(e.to_string()))?;
        usage.add(outline.token_usage);

        let article = self
            .text
            .generate_article(&outline.data, settings, &keyword.text)
            .await
            .map_err(|e| BlogError::ContentGenerationFailed(e.to_string()))?;
        usage.add(article.token_usage);
        if article.data.trim().is_empty() {
            return Err(BlogError::ContentGenerationFailed(
                "generator returned an empty article body".into(),
            ));
        }

        let faq_gen = self
            .text
            .generate_faq(&article.data, &keyword.text, FAQ_COUNT)
            .await
            .map_err(|e| BlogError::ContentGenerationFailed(e.to_string()))?;
        usage.add(faq_gen.token_usage);
        let faqs: Vec<Faq> = faq_gen
            .data
            .into_iter()
            .map(|f| Faq {
                question: f.question,
                answer: f.answer,
            })
            .collect();

        let polished = self
            .text
            .polish_for_seo(&article.data, &keyword.text, &[])
            .await
            .map_err(|e| BlogError::ContentGenerationFailed(e.to_string()))?;
        usage.add(polished.token_usage);

        Ok(ArticleContent {
            outline: outline.data,
            body_markdown: polished.data.content,
            faqs,
            token_usage: usage,
        })
    }

    fn select_keyword(&self, keyword_id: Option<Uuid>) -> Result<Keyword> {
        match keyword_id {
            Some(id) => self.store.keyword(id),
            None => self
                .store
                .select_pending_keyword()?
                .ok_or(BlogError::NoKeywordAvailable),
        }
    }

    async fn resolve_topic(
        &self,
        topic_id: Option<Uuid>,
        keyword: &Keyword,
        usage: &mut TokenUsage,
    ) -> Result<Topic> {
        if let Some(id) = topic_id {
            return self.store.topic(id);
        }
        if let Some(topic) = self.store.approved_topic_for(keyword.id)? {
            return Ok(topic);
        }

        let existing_titles = self.store.recent_post_titles(EXISTING_TITLE_CAP)?;
        let generated = self
            .text
            .generate_topics(&keyword.text, TOPIC_CANDIDATES, &existing_titles)
            .await
            .map_err(|e| BlogError::TopicResolutionFailed(e.to_string()))?;
        usage.add(generated.token_usage);
        if generated.data.is_empty() {
            return Err(BlogError::TopicResolutionFailed(
                "generator produced no topic candidates".into(),
            ));
        }

        let candidates: Vec<Topic> = generated
            .data
            .into_iter()
            .map(|idea| Topic {
                id: Uuid::new_v4(),
                keyword_id: keyword.id,
                title: idea.title,
                angle: idea.angle,
                outline: idea.outline,
                score: idea.score,
                status: TopicStatus::Pending,
            })
            .collect();
        self.store.insert_topics(&candidates)?;

        // Highest-scoring candidate wins the run.
        candidates
            .into_iter()
            .max_by_key(|t| t.score)
            .ok_or_else(|| {
                BlogError::TopicResolutionFailed("generator produced no topic candidates".into())
            })
    }

    /// Generate + upload one image; every failure path degrades to a
    /// warning and a `None` URL.
    async fn upload_image<F, Fut>(
        &self,
        job_id: Uuid,
        warnings: &mut Vec<String>,
        label: &str,
        slug: &str,
        generate: F,
    ) -> Option<String>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = genai_client::Result<String>>,
    {
        let degraded = |warnings: &mut Vec<String>, detail: String| {
            let message = format!("{label} image skipped: {detail}");
            self.job_log(job_id, LogLevel::Warning, &message);
            warnings.push(message);
            None
        };
        let data = match generate().await {
            Ok(data) => data,
            Err(e) => return degraded(warnings, e.to_string()),
        };
        match self
            .image_store
            .upload(&data, &format!("{slug}-{label}.png"))
            .await
        {
            Ok(Some(url)) => Some(url),
            Ok(None) => degraded(warnings, "storage returned no URL".into()),
            Err(e) => degraded(warnings, e.to_string()),
        }
    }

    fn stage(&self, job_id: Uuid, stage: PipelineStage) {
        if let Err(e) = self.store.set_job_stage(job_id, stage) {
            warn!(%job_id, error = %e, "failed to record job stage");
        }
    }

    fn job_log(&self, job_id: Uuid, level: LogLevel, message: &str) {
        if let Err(e) = self.store.append_job_log(job_id, level, message) {
            warn!(%job_id, error = %e, "failed to append job log");
        }
    }

    fn finalize(&self, job_id: Uuid, status: JobStatus, error: Option<String>, usage: TokenUsage) {
        if let Err(e) = self.store.record_job_usage(job_id, usage) {
            warn!(%job_id, error = %e, "failed to record token usage");
        }
        if let Err(e) = self.store.finalize_job(job_id, status, error) {
            warn!(%job_id, error = %e, "failed to finalize job");
        }
    }
}

// ---------------------------------------------------------------------------
// Suggestion assembly
// ---------------------------------------------------------------------------

/// Advisory "entities the article may naturally mention", derived from the
/// topic title before generation.
fn preliminary_mentions(
    topic_title: &str,
    summaries: &[linker::PostSummary],
    businesses: &[crate::types::Business],
) -> Vec<InternalMention> {
    let mut mentions: Vec<InternalMention> = linker::by_text_overlap(topic_title, summaries)
        .into_iter()
        .map(|s| InternalMention {
            title: s.target_title,
            kind: MentionKind::Post,
        })
        .collect();
    mentions.extend(
        linker::related_businesses(topic_title, businesses)
            .into_iter()
            .take(PRELIM_BUSINESS_CAP)
            .map(|s| InternalMention {
                title: s.target_title,
                kind: MentionKind::Business,
            }),
    );
    mentions
}

/// All three strategies over the final body, deduped by target with the
/// highest score winning.
fn final_suggestions(
    keyword: &str,
    body: &str,
    summaries: &[linker::PostSummary],
    businesses: &[crate::types::Business],
) -> Vec<LinkSuggestion> {
    let mut best: HashMap<Uuid, LinkSuggestion> = HashMap::new();
    let all = linker::by_shared_keywords(&[keyword.to_string()], summaries)
        .into_iter()
        .chain(linker::by_text_overlap(body, summaries))
        .chain(linker::related_businesses(body, businesses));
    for suggestion in all {
        match best.get(&suggestion.target_id) {
            Some(existing) if existing.relevance_score >= suggestion.relevance_score => {}
            _ => {
                best.insert(suggestion.target_id, suggestion);
            }
        }
    }
    let mut merged: Vec<LinkSuggestion> = best.into_values().collect();
    merged.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    merged
}
