#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;

#[cfg(test)]
use axum::{Extension, Router};

#[cfg(test)]
use uuid::Uuid;

#[cfg(test)]
pub fn create_test_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: Uuid::new_v4(),
    }
}

/// Attach `user` to every request, standing in for the JWT middleware
#[cfg(test)]
pub fn with_auth(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(Extension(user))
}

/// Encode a solid-color PNG of the given size
#[cfg(test)]
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    use image::{DynamicImage, ImageFormat};

    let img = DynamicImage::new_rgba8(width, height);
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Minimal Matroska payload: EBML magic followed by filler
#[cfg(test)]
pub fn create_test_mkv(len: usize) -> Vec<u8> {
    let mut data = vec![0x1A, 0x45, 0xDF, 0xA3];
    data.resize(len.max(4), 0x42);
    data
}

#[cfg(test)]
pub const TEST_JWT_SECRET: &str = "test-secret-with-enough-entropy";

#[cfg(test)]
pub const TEST_JWT_ISSUER: &str = "https://mediavault.test";

#[cfg(test)]
pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp() as u64
}

#[cfg(test)]
pub fn test_jwt_validator() -> crate::features::auth::JwtValidator {
    crate::features::auth::JwtValidator::new(
        TEST_JWT_SECRET,
        TEST_JWT_ISSUER,
        TEST_JWT_ISSUER,
        std::time::Duration::from_secs(0),
    )
}

/// Sign an HS256 token for `sub` issued by and for the test issuer
#[cfg(test)]
pub fn sign_test_token(sub: &str, secret: &str, exp: u64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = serde_json::json!({
        "sub": sub,
        "iss": TEST_JWT_ISSUER,
        "aud": TEST_JWT_ISSUER,
        "exp": exp,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
pub fn valid_token_for(user_id: Uuid) -> String {
    sign_test_token(&user_id.to_string(), TEST_JWT_SECRET, unix_now() + 3600)
}
