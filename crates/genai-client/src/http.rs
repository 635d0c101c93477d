//! JSON-over-HTTP implementation of the backend traits.
//!
//! Each trait method POSTs to one endpoint under the configured base URL and
//! deserializes the JSON body into the corresponding [`Gen`] envelope:
//!
//! ```text
//! POST {base}/v1/topics     POST {base}/v1/outline   POST {base}/v1/article
//! POST {base}/v1/faq        POST {base}/v1/polish
//! POST {base}/v1/images/cover   POST {base}/v1/images/og
//! POST {base}/v1/images/upload
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::backend::{ImageGenerator, ImageStore, Result, TextGenerator};
use crate::error::GenError;
use crate::types::{ArticleSettings, Gen, GeneratedFaq, Outline, Polished, TopicIdea};

// ─── HttpBackend ──────────────────────────────────────────────────────────

/// Client for a generative backend speaking the JSON protocol above.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
    api_key: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            api_key,
        }
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "genai backend call");

        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(GenError::Http(format!("{status}: {text}")));
        }
        serde_json::from_str(&text).map_err(|source| GenError::Parse { body: text, source })
    }
}

#[async_trait]
impl TextGenerator for HttpBackend {
    async fn generate_topics(
        &self,
        keyword: &str,
        count: usize,
        existing_titles: &[String],
    ) -> Result<Gen<Vec<TopicIdea>>> {
        self.post(
            "/v1/topics",
            json!({
                "keyword": keyword,
                "count": count,
                "existing_titles": existing_titles,
            }),
        )
        .await
    }

    async fn generate_outline(
        &self,
        topic: &str,
        settings: &ArticleSettings,
    ) -> Result<Gen<Outline>> {
        self.post("/v1/outline", json!({ "topic": topic, "settings": settings }))
            .await
    }

    async fn generate_article(
        &self,
        outline: &Outline,
        settings: &ArticleSettings,
        keyword: &str,
    ) -> Result<Gen<String>> {
        self.post(
            "/v1/article",
            json!({ "outline": outline, "settings": settings, "keyword": keyword }),
        )
        .await
    }

    async fn generate_faq(
        &self,
        body: &str,
        keyword: &str,
        count: usize,
    ) -> Result<Gen<Vec<GeneratedFaq>>> {
        self.post(
            "/v1/faq",
            json!({ "body": body, "keyword": keyword, "count": count }),
        )
        .await
    }

    async fn polish_for_seo(
        &self,
        body: &str,
        keyword: &str,
        secondary_keywords: &[String],
    ) -> Result<Gen<Polished>> {
        self.post(
            "/v1/polish",
            json!({
                "body": body,
                "keyword": keyword,
                "secondary_keywords": secondary_keywords,
            }),
        )
        .await
    }
}

#[async_trait]
impl ImageGenerator for HttpBackend {
    async fn generate_cover_image(&self, title: &str) -> Result<String> {
        let gen: Gen<String> = self
            .post("/v1/images/cover", json!({ "title": title }))
            .await?;
        Ok(gen.data)
    }

    async fn generate_og_image(&self, title: &str, excerpt: &str) -> Result<String> {
        let gen: Gen<String> = self
            .post("/v1/images/og", json!({ "title": title, "excerpt": excerpt }))
            .await?;
        Ok(gen.data)
    }
}

#[async_trait]
impl ImageStore for HttpBackend {
    async fn upload(&self, base64_data: &str, filename: &str) -> Result<Option<String>> {
        #[derive(serde::Deserialize)]
        struct UploadResponse {
            url: Option<String>,
        }
        let resp: UploadResponse = self
            .post(
                "/v1/images/upload",
                json!({ "data": base64_data, "filename": filename }),
            )
            .await
            .map_err(|e| GenError::Upload(e.to_string()))?;
        Ok(resp.url)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn topics_call_parses_envelope() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/topics")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":[{"title":"T1","angle":"a","outline":[],"score":70}],
                    "token_usage":{"input_tokens":12,"output_tokens":34}}"#,
            )
            .create_async()
            .await;

        let backend = HttpBackend::new(server.url(), None);
        let gen = backend
            .generate_topics("pickleball courts", 5, &[])
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(gen.data.len(), 1);
        assert_eq!(gen.data[0].title, "T1");
        assert_eq!(gen.token_usage.output_tokens, 34);
    }

    #[tokio::test]
    async fn non_success_status_is_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/article")
            .with_status(500)
            .with_body("backend overloaded")
            .create_async()
            .await;

        let backend = HttpBackend::new(server.url(), None);
        let outline = Outline {
            title: "T".into(),
            sections: vec![],
        };
        let settings = crate::mock::default_settings();
        let err = backend
            .generate_article(&outline, &settings, "kw")
            .await
            .unwrap_err();
        assert!(matches!(err, GenError::Http(_)), "got {err:?}");
        assert!(err.to_string().contains("backend overloaded"));
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/faq")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let backend = HttpBackend::new(server.url(), None);
        let err = backend.generate_faq("body", "kw", 5).await.unwrap_err();
        match err {
            GenError::Parse { body, .. } => assert_eq!(body, "not json"),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn upload_returns_url_field() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/images/upload")
            .with_status(200)
            .with_body(r#"{"url":"https://cdn.example.com/cover.png"}"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(server.url(), None);
        let url = backend.upload("aGVsbG8=", "cover.png").await.unwrap();
        assert_eq!(url.as_deref(), Some("https://cdn.example.com/cover.png"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let backend = HttpBackend::new("http://localhost:9000/", None);
        assert_eq!(backend.base_url, "http://localhost:9000");
    }
}
