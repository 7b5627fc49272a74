use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::media::handlers;
use crate::features::media::services::MediaService;

/// Create routes for the media feature.
///
/// `body_limit` caps the upload request body and should leave room for
/// multipart framing and base64 expansion on top of the file size limit.
pub fn routes(service: Arc<MediaService>, body_limit: usize) -> Router {
    Router::new()
        .route(
            "/api/media",
            get(handlers::list_media)
                .post(handlers::upload_media)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route(
            "/api/media/{id}",
            get(handlers::view_media)
                .post(handlers::rename_media)
                .delete(handlers::delete_media),
        )
        .route("/api/media/{id}/details", get(handlers::get_media_details))
        .route("/api/media/{id}/download", get(handlers::download_media))
        .route("/api/media/{id}/delete", post(handlers::delete_media_post))
        .with_state(service)
}
