use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::directory::query::{
    find_active_by_username, latest_active, search_active, DirectoryFilter, TalentQuery,
};
use crate::directory::view::{load_public_profile, load_public_profiles, PublicProfile};
use crate::errors::AppError;
use crate::state::AppState;

/// GET /talents/public?search=&skill=&prodi=
pub async fn handle_list_talents(
    State(state): State<AppState>,
    Query(query): Query<TalentQuery>,
) -> Result<Json<Vec<PublicProfile>>, AppError> {
    let filter = DirectoryFilter::from(query);
    let rows = search_active(&state.db, &filter).await?;
    let profiles = load_public_profiles(&state.db, rows, state.photos.as_ref()).await?;
    Ok(Json(profiles))
}

/// GET /talents/public/latest
pub async fn handle_latest_talents(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicProfile>>, AppError> {
    let rows = latest_active(&state.db).await?;
    let profiles = load_public_profiles(&state.db, rows, state.photos.as_ref()).await?;
    Ok(Json(profiles))
}

/// GET /talents/public/:username
pub async fn handle_talent_detail(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PublicProfile>, AppError> {
    let row = find_active_by_username(&state.db, &username).await?;
    let profile = load_public_profile(&state.db, row, state.photos.as_ref()).await?;
    Ok(Json(profile))
}
