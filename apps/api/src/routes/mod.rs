pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, put},
    Router,
};

use crate::admin::handlers as admin;
use crate::cv::handlers as cv;
use crate::directory::handlers as directory;
use crate::experiences::handlers as experiences;
use crate::profiles::handlers as profiles;
use crate::skills::handlers as skills;
use crate::state::AppState;

/// Multipart framing on top of the raw photo bytes.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let photo_body_limit = state.config.max_photo_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/health", get(health::health_handler))
        // Account & own profile
        .route("/accounts/me", get(profiles::handle_account_me))
        .route(
            "/profile/me",
            get(profiles::handle_get_profile)
                .patch(profiles::handle_patch_profile)
                .delete(profiles::handle_delete_profile),
        )
        .route(
            "/profile/me/photo",
            put(profiles::handle_upload_photo)
                .delete(profiles::handle_delete_photo)
                .layer(DefaultBodyLimit::max(photo_body_limit)),
        )
        .route("/profile/me/cv", get(cv::handle_download_cv))
        // Skills
        .route(
            "/skills",
            get(skills::handle_list_skills).post(skills::handle_create_skill),
        )
        .route(
            "/skills/:id",
            get(skills::handle_get_skill)
                .put(skills::handle_update_skill)
                .patch(skills::handle_update_skill)
                .delete(skills::handle_delete_skill),
        )
        // Experiences
        .route(
            "/experiences",
            get(experiences::handle_list_experiences).post(experiences::handle_create_experience),
        )
        .route(
            "/experiences/:id",
            get(experiences::handle_get_experience)
                .put(experiences::handle_update_experience)
                .patch(experiences::handle_update_experience)
                .delete(experiences::handle_delete_experience),
        )
        // Public directory
        .route("/talents/public", get(directory::handle_list_talents))
        .route("/talents/public/latest", get(directory::handle_latest_talents))
        .route("/talents/public/:username", get(directory::handle_talent_detail))
        // Moderation
        .route("/admin/profiles", get(admin::handle_list_profiles))
        .route("/admin/profiles/:id/toggle", patch(admin::handle_toggle_profile))
        .with_state(state)
}
