//! Article request middlewares: body validation for creation and path
//! resolution for the single-article routes.

use anyhow::anyhow;
use axum::{
    body::{Body, to_bytes},
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use quill_core::AppError;

use super::model::{Article, CreateArticleDto};
use super::service::ArticleService;
use crate::state::AppState;
use crate::validator::format_errors;

pub const INVALID_ARTICLE_MESSAGE: &str = "Article is invalid";
pub const ARTICLE_NOT_FOUND_MESSAGE: &str = "No article with that identifier has been found";

const MAX_ARTICLE_BODY_BYTES: usize = 1024 * 1024;

/// Checks a creation body before the handler runs.
///
/// The body is buffered, parsed and validated; on success the trimmed
/// [`CreateArticleDto`] is added to the request extensions and the original
/// bytes are handed on.
pub async fn validate_article(req: Request, next: Next) -> Result<Response, AppError> {
    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, MAX_ARTICLE_BODY_BYTES)
        .await
        .map_err(|_| AppError::bad_request(anyhow!("Invalid request body")))?;

    let dto: CreateArticleDto = serde_json::from_slice(&bytes)
        .map_err(|e| AppError::bad_request(anyhow!("Invalid article: {e}")))?;
    dto.validate()
        .map_err(|errors| AppError::bad_request(anyhow!("{}", format_errors(&errors))))?;

    let mut req = Request::from_parts(parts, Body::from(bytes));
    req.extensions_mut().insert(dto.normalized());

    Ok(next.run(req).await)
}

/// Loads the article named by `{article_id}` into the request extensions.
#[instrument(skip(state, req, next))]
pub async fn article_by_id(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let id = Uuid::parse_str(&article_id)
        .map_err(|_| AppError::unauthorized(INVALID_ARTICLE_MESSAGE.to_string()))?;

    let article: Article = ArticleService::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::unauthorized(ARTICLE_NOT_FOUND_MESSAGE.to_string()))?;

    req.extensions_mut().insert(article);
    Ok(next.run(req).await)
}
