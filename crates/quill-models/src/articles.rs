//! Article domain model and DTOs.

use chrono::{DateTime, Utc};
use quill_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const TITLE_MAX_LENGTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// Author. Cleared if the author row is removed.
    pub user_id: Option<Uuid>,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

impl Article {
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.user_id == Some(user_id)
    }
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("title").with_message("Title cannot be blank".into()));
    }
    if trimmed.chars().count() > TITLE_MAX_LENGTH {
        return Err(ValidationError::new("title")
            .with_message(format!("Title cannot exceed {TITLE_MAX_LENGTH} characters").into()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateArticleDto {
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl CreateArticleDto {
    /// Trimmed copy, as stored.
    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateArticleDto {
    #[validate(custom(function = "validate_title"))]
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedArticlesResponse {
    pub data: Vec<Article>,
    pub meta: PaginationMeta,
}

impl PaginatedArticlesResponse {
    pub fn new(data: Vec<Article>, total: i64, params: &PaginationParams) -> Self {
        Self {
            data,
            meta: PaginationMeta::new(total, params),
        }
    }
}
