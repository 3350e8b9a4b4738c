use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::context::AppContext;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub async fn health(State(ctx): State<Arc<AppContext>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "dialect": ctx.store().dialect().name(),
        "debug": ctx.is_debug(),
    }))
}

pub async fn site_info(State(ctx): State<Arc<AppContext>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "basic": ctx.resolve("basic", ""),
        "upload": ctx.resolve("upload", ""),
    }))
}

pub async fn search(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    let Some(index) = ctx.index() else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "full-text index is disabled".to_string(),
            }),
        ));
    };

    let limit = params.limit.unwrap_or(10);
    let ids = index.search(&params.q, limit).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: e.to_string() }),
        )
    })?;

    Ok(Json(serde_json::json!({ "article_ids": ids })))
}
