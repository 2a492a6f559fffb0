use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use tracing::instrument;

use quill_core::{AppError, PaginationParams};

use super::model::{Article, CreateArticleDto, PaginatedArticlesResponse, UpdateArticleDto};
use super::service::ArticleService;
use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

fn ensure_can_modify(auth_user: &AuthUser, article: &Article) -> Result<(), AppError> {
    if auth_user.is_admin() || article.is_authored_by(auth_user.user_id()?) {
        return Ok(());
    }
    Err(AppError::forbidden("User is not authorized".to_string()))
}

/// List articles
#[utoipa::path(
    get,
    path = "/api/articles",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated articles", body = PaginatedArticlesResponse)
    ),
    tag = "Articles"
)]
#[instrument(skip(state))]
pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedArticlesResponse>, AppError> {
    Ok(Json(ArticleService::list(&state.db, params).await?))
}

/// Create an article
#[utoipa::path(
    post,
    path = "/api/articles",
    request_body = CreateArticleDto,
    responses(
        (status = 201, description = "Article created", body = Article),
        (status = 400, description = "Invalid article", body = ErrorResponse),
        (status = 403, description = "Forbidden resource", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Articles"
)]
#[instrument(skip(state, dto))]
pub async fn create_article(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Extension(dto): Extension<CreateArticleDto>,
) -> Result<(StatusCode, Json<Article>), AppError> {
    let article = ArticleService::create(&state.db, auth_user.user_id()?, dto).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

/// Read an article
#[utoipa::path(
    get,
    path = "/api/articles/{article_id}",
    params(("article_id" = String, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Article", body = Article),
        (status = 401, description = "Invalid or unknown identifier", body = ErrorResponse)
    ),
    tag = "Articles"
)]
pub async fn read_article(Extension(article): Extension<Article>) -> Json<Article> {
    Json(article)
}

/// Update an article (author or admin)
#[utoipa::path(
    put,
    path = "/api/articles/{article_id}",
    params(("article_id" = String, Path, description = "Article ID")),
    request_body = UpdateArticleDto,
    responses(
        (status = 200, description = "Updated article", body = Article),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Articles"
)]
#[instrument(skip(state, article, dto), fields(article.id = %article.id))]
pub async fn update_article(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Extension(article): Extension<Article>,
    ValidatedJson(dto): ValidatedJson<UpdateArticleDto>,
) -> Result<Json<Article>, AppError> {
    ensure_can_modify(&auth_user, &article)?;
    Ok(Json(ArticleService::update(&state.db, article, dto).await?))
}

/// Delete an article (author or admin)
#[utoipa::path(
    delete,
    path = "/api/articles/{article_id}",
    params(("article_id" = String, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Deleted article", body = Article),
        (status = 403, description = "Not the author", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Articles"
)]
#[instrument(skip(state, article), fields(article.id = %article.id))]
pub async fn delete_article(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Extension(article): Extension<Article>,
) -> Result<Json<Article>, AppError> {
    ensure_can_modify(&auth_user, &article)?;
    Ok(Json(ArticleService::delete(&state.db, article).await?))
}
