//! HTTP Handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::error::field::FieldError;
use kernel::id::ChapterId;
use std::sync::Arc;

use crate::application::config::CatalogConfig;
use crate::application::get_chapter::GetChapterUseCase;
use crate::application::list_chapters::{ChapterCache, ListChaptersUseCase};
use crate::application::manage_chapter::ManageChapterUseCase;
use crate::domain::repository::ChapterRepository;
use crate::domain::services::{ChapterInput, parse_filter};
use crate::error::{CatalogError, CatalogResult};
use crate::presentation::dto::{
    ChapterDto, ChapterRequest, DeletedChapter, ItemResponse, ListQuery, ListResponse,
    MutationResponse,
};

/// Shared state for catalog handlers
pub struct CatalogAppState<R>
where
    R: ChapterRepository + Sync + 'static,
{
    pub repo: Arc<R>,
    pub cache: Arc<ChapterCache>,
    pub config: Arc<CatalogConfig>,
}

impl<R> Clone for CatalogAppState<R>
where
    R: ChapterRepository + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            cache: self.cache.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R> CatalogAppState<R>
where
    R: ChapterRepository + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: Arc<CatalogConfig>) -> Self {
        Self {
            repo,
            cache: Arc::new(ChapterCache::new(config.listing_freshness)),
            config,
        }
    }

    fn manage(&self) -> ManageChapterUseCase<R> {
        ManageChapterUseCase::new(self.repo.clone(), self.cache.clone())
    }
}

fn parse_id(raw: &str) -> CatalogResult<ChapterId> {
    raw.parse().map_err(|_| CatalogError::InvalidId)
}

/// Malformed JSON is a validation failure, not a bare 4xx text body
fn chapter_input(body: Result<Json<ChapterRequest>, JsonRejection>) -> CatalogResult<ChapterInput> {
    match body {
        Ok(Json(req)) => Ok(req.into()),
        Err(rejection) => Err(CatalogError::Validation(vec![FieldError::new(
            "body",
            rejection.body_text(),
        )])),
    }
}

/// GET /api/chapters
pub async fn list_chapters<R>(
    State(state): State<CatalogAppState<R>>,
    Query(query): Query<ListQuery>,
) -> CatalogResult<Json<ListResponse>>
where
    R: ChapterRepository + Sync + 'static,
{
    let filter = parse_filter(
        query.class_number.as_deref(),
        query.unit_name.as_deref(),
        query.search.as_deref(),
    )
    .map_err(CatalogError::Validation)?;

    let listing = ListChaptersUseCase::new(state.repo.clone(), state.cache.clone())
        .execute(filter)
        .await?;

    Ok(Json(ListResponse::new(&listing.chapters)))
}

/// GET /api/chapters/{id}
pub async fn get_chapter<R>(
    State(state): State<CatalogAppState<R>>,
    Path(id): Path<String>,
) -> CatalogResult<Json<ItemResponse>>
where
    R: ChapterRepository + Sync + 'static,
{
    let chapter_id = parse_id(&id)?;
    let chapter = GetChapterUseCase::new(state.repo.clone())
        .execute(&chapter_id)
        .await?;

    Ok(Json(ItemResponse {
        success: true,
        data: ChapterDto::from(&chapter),
    }))
}

/// POST /api/chapters
pub async fn create_chapter<R>(
    State(state): State<CatalogAppState<R>>,
    body: Result<Json<ChapterRequest>, JsonRejection>,
) -> CatalogResult<impl IntoResponse>
where
    R: ChapterRepository + Sync + 'static,
{
    let input = chapter_input(body)?;
    let chapter = state.manage().create(&input).await?;

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::new(
            "Chapter created successfully",
            ChapterDto::from(&chapter),
        )),
    ))
}

/// PUT /api/chapters/{id}
pub async fn update_chapter<R>(
    State(state): State<CatalogAppState<R>>,
    Path(id): Path<String>,
    body: Result<Json<ChapterRequest>, JsonRejection>,
) -> CatalogResult<Json<MutationResponse<ChapterDto>>>
where
    R: ChapterRepository + Sync + 'static,
{
    let chapter_id = parse_id(&id)?;
    let input = chapter_input(body)?;
    let chapter = state.manage().update(&chapter_id, &input).await?;

    Ok(Json(MutationResponse::new(
        "Chapter updated successfully",
        ChapterDto::from(&chapter),
    )))
}

/// DELETE /api/chapters/{id}
pub async fn delete_chapter<R>(
    State(state): State<CatalogAppState<R>>,
    Path(id): Path<String>,
) -> CatalogResult<Json<MutationResponse<DeletedChapter>>>
where
    R: ChapterRepository + Sync + 'static,
{
    let chapter_id = parse_id(&id)?;
    state.manage().delete(&chapter_id).await?;

    Ok(Json(MutationResponse::new(
        "Chapter deleted successfully",
        DeletedChapter {
            id: chapter_id.to_string(),
        },
    )))
}

/// POST /api/chapters/{id}/duplicate
pub async fn duplicate_chapter<R>(
    State(state): State<CatalogAppState<R>>,
    Path(id): Path<String>,
) -> CatalogResult<impl IntoResponse>
where
    R: ChapterRepository + Sync + 'static,
{
    let chapter_id = parse_id(&id)?;
    let copy = state.manage().duplicate(&chapter_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::new(
            "Chapter duplicated successfully",
            ChapterDto::from(&copy),
        )),
    ))
}
