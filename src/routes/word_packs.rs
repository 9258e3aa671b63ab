use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    models::{WordPack, WordPackChanges, WordPackDetail},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateWordPackRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_public")]
    pub is_public: bool,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub words: Vec<String>,
}

fn default_public() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct AddWordsRequest {
    pub words: Vec<String>,
}

/// List selectable word packs, default first
pub async fn list_word_packs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<WordPack>>, ServiceError> {
    Ok(Json(state.service.list_word_packs().await?))
}

pub async fn create_word_pack(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateWordPackRequest>,
) -> Result<(StatusCode, Json<WordPackDetail>), ServiceError> {
    let detail = state
        .service
        .create_word_pack(
            &request.name,
            request.description,
            request.is_public,
            request.language.as_deref(),
            &request.words,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// A pack with all of its words
pub async fn get_word_pack(
    State(state): State<Arc<AppState>>,
    Path(pack_id): Path<Uuid>,
) -> Result<Json<WordPackDetail>, ServiceError> {
    Ok(Json(state.service.get_word_pack(pack_id).await?))
}

pub async fn update_word_pack(
    State(state): State<Arc<AppState>>,
    Path(pack_id): Path<Uuid>,
    Json(changes): Json<WordPackChanges>,
) -> Result<Json<WordPack>, ServiceError> {
    Ok(Json(state.service.update_word_pack(pack_id, changes).await?))
}

pub async fn delete_word_pack(
    State(state): State<Arc<AppState>>,
    Path(pack_id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.service.delete_word_pack(pack_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the pack with its updated word list
pub async fn add_words(
    State(state): State<Arc<AppState>>,
    Path(pack_id): Path<Uuid>,
    Json(request): Json<AddWordsRequest>,
) -> Result<Json<WordPackDetail>, ServiceError> {
    Ok(Json(state.service.add_words(pack_id, &request.words).await?))
}

pub async fn delete_word(
    State(state): State<Arc<AppState>>,
    Path((pack_id, word)): Path<(Uuid, String)>,
) -> Result<StatusCode, ServiceError> {
    state.service.delete_word(pack_id, &word).await?;
    Ok(StatusCode::NO_CONTENT)
}
