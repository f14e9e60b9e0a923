//! HTTP Catalog Source
//!
//! Talks to the catalog API with `reqwest`, sending the session cookie on
//! every request and turning error bodies into [`SourceError`]s.

use kernel::error::problem::ProblemBody;
use reqwest::header::COOKIE;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{FetchError, SourceError};
use crate::model::{ChapterPayload, ChapterRecord, ItemEnvelope, ListingEnvelope, ListingQuery};
use crate::source::CatalogSource;

#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: reqwest::Client,
    chapters_url: Url,
    cookie_name: String,
    cookie: Option<String>,
}

impl HttpCatalogSource {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            chapters_url: config.endpoint("/api/chapters")?,
            cookie_name: config.session_cookie_name.clone(),
            cookie: None,
        })
    }

    /// Send `token` as the session cookie from now on
    pub fn with_session(mut self, token: &str) -> Self {
        self.cookie = Some(format!("{}={}", self.cookie_name, token));
        self
    }

    fn item_url(&self, chapter_id: &str) -> Url {
        let mut url = self.chapters_url.clone();
        // http(s) URLs always have path segments
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(chapter_id);
        }
        url
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, SourceError> {
        let req = match &self.cookie {
            Some(cookie) => req.header(COOKIE, cookie),
            None => req,
        };

        let res = req
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        tracing::debug!(status = status.as_u16(), "Catalog request failed");
        Err(match status {
            StatusCode::UNAUTHORIZED => SourceError::Unauthorized,
            StatusCode::FORBIDDEN => SourceError::Forbidden,
            s if s.is_server_error() => SourceError::Server {
                status: s.as_u16(),
            },
            s => SourceError::Rejected {
                status: s.as_u16(),
                problem: problem_body(res).await,
            },
        })
    }

    async fn read<T: DeserializeOwned>(res: Response) -> Result<T, SourceError> {
        res.json::<T>()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))
    }
}

/// Error body, or a minimal one when the server sent something else
async fn problem_body(res: Response) -> ProblemBody {
    let status = res.status();
    match res.json::<ProblemBody>().await {
        Ok(body) => body,
        Err(_) => ProblemBody {
            type_url: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            status: status.as_u16(),
            detail: format!("Request failed with status {}", status.as_u16()),
            code: None,
            action: None,
            errors: Vec::new(),
        },
    }
}

impl CatalogSource for HttpCatalogSource {
    async fn list_chapters(&self, query: &ListingQuery) -> Result<Vec<ChapterRecord>, SourceError> {
        let req = self
            .client
            .get(self.chapters_url.clone())
            .query(&query.to_pairs());
        let envelope: ListingEnvelope = Self::read(self.send(req).await?).await?;
        Ok(envelope.data)
    }

    async fn create_chapter(&self, payload: &ChapterPayload) -> Result<ChapterRecord, SourceError> {
        let req = self.client.post(self.chapters_url.clone()).json(payload);
        let envelope: ItemEnvelope<ChapterRecord> = Self::read(self.send(req).await?).await?;
        Ok(envelope.data)
    }

    async fn update_chapter(
        &self,
        chapter_id: &str,
        payload: &ChapterPayload,
    ) -> Result<ChapterRecord, SourceError> {
        let req = self.client.put(self.item_url(chapter_id)).json(payload);
        let envelope: ItemEnvelope<ChapterRecord> = Self::read(self.send(req).await?).await?;
        Ok(envelope.data)
    }

    async fn delete_chapter(&self, chapter_id: &str) -> Result<(), SourceError> {
        let req = self.client.delete(self.item_url(chapter_id));
        self.send(req).await?;
        Ok(())
    }
}
