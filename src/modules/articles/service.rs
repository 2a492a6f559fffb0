use anyhow::Context;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use quill_core::{AppError, PaginationParams};

use super::model::{Article, CreateArticleDto, PaginatedArticlesResponse, UpdateArticleDto};
use crate::metrics::track_article_created;

const ARTICLE_COLUMNS: &str = "id, title, content, user_id, created, updated";

pub struct ArticleService;

impl ArticleService {
    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        params: PaginationParams,
    ) -> Result<PaginatedArticlesResponse, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(db)
            .await
            .context("Failed to count articles")
            .map_err(AppError::database)?;

        let articles = sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY created DESC LIMIT $1 OFFSET $2"
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(db)
        .await
        .context("Failed to fetch articles")
        .map_err(AppError::database)?;

        Ok(PaginatedArticlesResponse::new(articles, total, &params))
    }

    #[instrument(skip(db))]
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Article>, AppError> {
        let article = sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch article")
        .map_err(AppError::database)?;

        Ok(article)
    }

    #[instrument(skip(db, dto))]
    pub async fn create(
        db: &PgPool,
        author_id: Uuid,
        dto: CreateArticleDto,
    ) -> Result<Article, AppError> {
        let dto = dto.normalized();
        let article = sqlx::query_as::<_, Article>(&format!(
            "INSERT INTO articles (id, title, content, user_id, created) \
             VALUES ($1, $2, $3, $4, now()) RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&dto.title)
        .bind(&dto.content)
        .bind(author_id)
        .fetch_one(db)
        .await
        .context("Failed to insert article")
        .map_err(AppError::database)?;

        track_article_created();
        tracing::info!(article.id = %article.id, author.id = %author_id, "article created");
        Ok(article)
    }

    #[instrument(skip(db, article, dto), fields(article.id = %article.id))]
    pub async fn update(
        db: &PgPool,
        article: Article,
        dto: UpdateArticleDto,
    ) -> Result<Article, AppError> {
        let title = dto
            .title
            .map(|t| t.trim().to_string())
            .unwrap_or(article.title);
        let content = dto
            .content
            .map(|c| c.trim().to_string())
            .unwrap_or(article.content);

        let updated = sqlx::query_as::<_, Article>(&format!(
            "UPDATE articles SET title = $2, content = $3, updated = now() \
             WHERE id = $1 RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(article.id)
        .bind(title)
        .bind(content)
        .fetch_one(db)
        .await
        .context("Failed to update article")
        .map_err(AppError::database)?;

        Ok(updated)
    }

    #[instrument(skip(db, article), fields(article.id = %article.id))]
    pub async fn delete(db: &PgPool, article: Article) -> Result<Article, AppError> {
        sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(article.id)
            .execute(db)
            .await
            .context("Failed to delete article")
            .map_err(AppError::database)?;

        tracing::info!("article deleted");
        Ok(article)
    }
}
