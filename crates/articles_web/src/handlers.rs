use articles_core::{ArticleResponse, CreateArticleRequest, CreateArticleResponse, Error};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, warn};

use crate::error::{ApiError, INVALID_ID_MESSAGE};
use crate::AppState;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "alive" }))
}

/// `POST /api/v1/articles`
pub async fn create_article(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateArticleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateArticleResponse>), ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(layer = "handler", error = %rejection.body_text(), "invalid json request");
        ApiError::from(rejection)
    })?;

    match state.article_service.create(request).await {
        Ok(created) => Ok((StatusCode::CREATED, Json(created))),
        Err(e) => {
            log_service_error(&e, "failed to create article");
            Err(e.into())
        }
    }
}

/// `GET /api/v1/articles/:id`
pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let id = parse_article_id(&raw_id).ok_or_else(|| {
        warn!(layer = "handler", id_param = %raw_id, "invalid article id format");
        ApiError::bad_request(INVALID_ID_MESSAGE)
    })?;

    match state.article_service.get_by_id(id).await {
        Ok(article) => Ok(Json(article)),
        Err(e) => {
            log_service_error(&e, "failed to fetch article");
            Err(e.into())
        }
    }
}

fn parse_article_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id >= 0)
}

fn log_service_error(err: &Error, message: &str) {
    match err {
        Error::Validation(_) | Error::NotFound(_) => {
            warn!(layer = "handler", error = %err, "{message}")
        }
        _ => error!(layer = "handler", error = %err, "{message}"),
    }
}
