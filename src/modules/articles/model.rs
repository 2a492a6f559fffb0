pub use quill_models::articles::{
    Article, CreateArticleDto, PaginatedArticlesResponse, UpdateArticleDto,
};
