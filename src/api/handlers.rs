use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, RawQuery, State},
    Json,
};

use super::types::*;
use super::upload::{read_image_field, SpooledUpload};
use crate::recommend::{normalize, RecommendError, RecommendKind};
use crate::server::AppState;

async fn recommend_items(
    state: &AppState,
    kind: RecommendKind,
    query: Option<String>,
    body: &[u8],
) -> Result<Json<ItemsResponse>, RecommendError> {
    let request = normalize(kind, query.as_deref(), body)?;
    let items = state.recommender.recommend(&request).await?;
    Ok(Json(ItemsResponse { items }))
}

pub async fn recommend_movies(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Json<ItemsResponse>, RecommendError> {
    recommend_items(&state, RecommendKind::Movie, query, &body).await
}

pub async fn recommend_tvshows(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Json<ItemsResponse>, RecommendError> {
    recommend_items(&state, RecommendKind::TvShow, query, &body).await
}

pub async fn recommend_by_genre(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Json<ItemsResponse>, RecommendError> {
    recommend_items(&state, RecommendKind::Genre, query, &body).await
}

pub async fn recommend_by_description(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Json<ItemsResponse>, RecommendError> {
    recommend_items(&state, RecommendKind::Description, query, &body).await
}

pub async fn find_movie(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Json<ItemsResponse>, RecommendError> {
    recommend_items(&state, RecommendKind::FindMovie, query, &body).await
}

pub async fn search_by_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageSearchResponse>, RecommendError> {
    let mut multipart = multipart
        .map_err(|e| RecommendError::Malformed(format!("Error parsing multipart form: {}", e)))?;

    let (filename, data) = read_image_field(&mut multipart).await?;
    let upload = SpooledUpload::create(filename, data)
        .await?
        .into_upload()
        .await?;

    let result = state.recommender.search_by_image(upload).await?;

    Ok(Json(ImageSearchResponse {
        items: result.items,
        summary: result.summary,
    }))
}
