use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use rulehub_auth::RequireAuth;
use rulehub_core::error_builder;
use rulehub_core::problemdetails::{Problem, ProblemDetails};
use rulehub_core::ValidatedJson;
use rulehub_entities::types::MediaStatus;
use utoipa::OpenApi;
use uuid::Uuid;

use super::types::ArticlesAppState;
use crate::services::{ArticleView, CreateArticle, MediaView, UpdateArticle};

#[derive(OpenApi)]
#[openapi(
    paths(create_article, get_article, update_article),
    components(schemas(CreateArticle, UpdateArticle, ArticleView, MediaView, MediaStatus)),
    tags((name = "Articles", description = "Articles and their media"))
)]
pub struct ArticleApiDoc;

pub fn configure_routes() -> Router<Arc<ArticlesAppState>> {
    Router::new()
        .route("/articles", post(create_article))
        .route("/articles/", post(create_article))
        .route("/articles/{id}", get(get_article).put(update_article))
}

fn parse_article_id(raw: &str) -> Result<Uuid, Problem> {
    Uuid::parse_str(raw).map_err(|_| {
        error_builder::validation_error()
            .detail(format!("'{}' is not a valid article id", raw))
            .build()
    })
}

/// Create an article referencing previously uploaded media keys
#[utoipa::path(
    tag = "Articles",
    post,
    path = "/articles",
    request_body = CreateArticle,
    responses(
        (status = 201, description = "Article created", body = ArticleView),
        (status = 400, description = "Invalid title, content or media", body = ProblemDetails),
        (status = 401, description = "Unauthorized", body = ProblemDetails),
        (status = 503, description = "Object storage unreachable", body = ProblemDetails)
    ),
    security(("bearer_auth" = []))
)]
async fn create_article(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<ArticlesAppState>>,
    ValidatedJson(request): ValidatedJson<CreateArticle>,
) -> Result<impl IntoResponse, Problem> {
    let article = state
        .article_service
        .create_article(auth.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(article)))
}

#[utoipa::path(
    tag = "Articles",
    get,
    path = "/articles/{id}",
    params(("id" = String, Path, description = "Article id")),
    responses(
        (status = 200, description = "Article with fresh media URLs", body = ArticleView),
        (status = 400, description = "Malformed article id", body = ProblemDetails),
        (status = 404, description = "Article not found", body = ProblemDetails)
    )
)]
async fn get_article(
    State(state): State<Arc<ArticlesAppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Problem> {
    let id = parse_article_id(&id)?;
    let article = state.article_service.get_article(id).await?;
    Ok(Json(article))
}

/// Update title/content in place; a present `media` list replaces the set
#[utoipa::path(
    tag = "Articles",
    put,
    path = "/articles/{id}",
    params(("id" = String, Path, description = "Article id")),
    request_body = UpdateArticle,
    responses(
        (status = 200, description = "Article updated", body = ArticleView),
        (status = 400, description = "Malformed id or invalid fields", body = ProblemDetails),
        (status = 401, description = "Unauthorized", body = ProblemDetails),
        (status = 404, description = "Article not found", body = ProblemDetails),
        (status = 503, description = "Object storage unreachable", body = ProblemDetails)
    ),
    security(("bearer_auth" = []))
)]
async fn update_article(
    RequireAuth(_auth): RequireAuth,
    State(state): State<Arc<ArticlesAppState>>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateArticle>,
) -> Result<impl IntoResponse, Problem> {
    let id = parse_article_id(&id)?;
    let article = state.article_service.update_article(id, request).await?;
    Ok(Json(article))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_article_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_article_id(&id.to_string()).unwrap(), id);

        let problem = parse_article_id("not-a-uuid").unwrap_err();
        assert_eq!(problem.status_code, StatusCode::BAD_REQUEST);
    }
}
