use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use super::{ApiError, AppState};
use crate::knowledge::{
    self, DeleteOutcome, KnowledgeStore, ListRequest, ListResponse, NewEntry, SearchRequest,
    SearchResponse, StatsResponse, UpdateOutcome, WriteOutcome,
};

type ApiResult<T> = Result<Json<T>, ApiError>;

async fn blocking<T, F>(store: AppState, op: F) -> ApiResult<T>
where
    F: FnOnce(&KnowledgeStore) -> knowledge::Result<T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(move || op(&store)).await??;
    Ok(Json(outcome))
}

pub async fn write(
    State(store): State<AppState>,
    Json(entry): Json<NewEntry>,
) -> ApiResult<WriteOutcome> {
    blocking(store, move |s| s.write(&entry)).await
}

pub async fn search(
    State(store): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<SearchResponse> {
    blocking(store, move |s| s.search(&request.query, request.top_k)).await
}

pub async fn list(
    State(store): State<AppState>,
    Query(request): Query<ListRequest>,
) -> ApiResult<ListResponse> {
    blocking(store, move |s| s.list(&request)).await
}

pub async fn update(
    State(store): State<AppState>,
    Path(id): Path<String>,
    Json(entry): Json<NewEntry>,
) -> ApiResult<UpdateOutcome> {
    blocking(store, move |s| s.update(&id, &entry)).await
}

pub async fn remove(
    State(store): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeleteOutcome> {
    blocking(store, move |s| s.delete(&id)).await
}

pub async fn stats(State(store): State<AppState>) -> ApiResult<StatsResponse> {
    blocking(store, |s| s.stats()).await
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
