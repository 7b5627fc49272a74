mod media_handler;
mod upload_payload;

pub use media_handler::*;
pub use upload_payload::UploadPayload;
