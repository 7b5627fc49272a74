use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::media::{dtos as media_dtos, handlers as media_handlers, models as media_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Media
        media_handlers::list_media,
        media_handlers::view_media,
        media_handlers::get_media_details,
        media_handlers::download_media,
        media_handlers::upload_media,
        media_handlers::rename_media,
        media_handlers::delete_media,
        media_handlers::delete_media_post,
    ),
    components(
        schemas(
            // Shared
            Meta,
            auth::model::AuthenticatedUser,
            // Media
            media_models::MediaType,
            media_dtos::MediaResponseDto,
            media_dtos::UploadMediaDto,
            media_dtos::UploadMediaBase64Dto,
            media_dtos::RenameMediaDto,
            media_dtos::DeleteMediaResponseDto,
            ApiResponse<media_dtos::MediaResponseDto>,
            ApiResponse<Vec<media_dtos::MediaResponseDto>>,
            ApiResponse<media_dtos::DeleteMediaResponseDto>,
        )
    ),
    tags(
        (name = "media", description = "Upload, view, download, rename and delete .png and .mkv media"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "MediaVault API",
        version = "0.1.0",
        description = "API documentation for MediaVault",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
